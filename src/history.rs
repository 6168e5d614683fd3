//! Time-ordered predictions of a model's state.

/// Time of an invalid [`HistoryEntry`].
pub const INVALID_TIME: f64 = f64::MIN;

/// State and output values of a model at one point in time.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryEntry {
    pub time: f64,
    pub state: Vec<f64>,
    pub values: Vec<f64>,
}

impl Default for HistoryEntry {
    /// An invalid entry.
    fn default() -> Self {
        Self {
            time: INVALID_TIME,
            state: Vec::new(),
            values: Vec::new(),
        }
    }
}

impl HistoryEntry {
    pub fn new(time: f64, state: Vec<f64>, values: Vec<f64>) -> Self {
        Self {
            time,
            state,
            values,
        }
    }

    pub fn invalid() -> Self {
        Self::default()
    }

    /// Zero-filled entry with room for `n_states` states and `n_values` values.
    pub fn with_sizes(time: f64, n_states: usize, n_values: usize) -> Self {
        Self::new(time, vec![0.0; n_states], vec![0.0; n_values])
    }

    #[inline]
    pub fn is_valid(&self) -> bool {
        self.time != INVALID_TIME
    }
}

/// Linear interpolation between `(x0, y0)` and `(x1, y1)` at `x`.
#[inline]
pub fn interpolate_value(x: f64, x0: f64, y0: f64, x1: f64, y1: f64) -> f64 {
    if x == x1 {
        return y1;
    }
    y0 + (x - x0) * (y1 - y0) / (x1 - x0)
}

/// Entries ordered by strictly increasing time.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct History {
    entries: Vec<HistoryEntry>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `entry`. Entries not later than the newest one are rejected.
    pub fn push(&mut self, entry: HistoryEntry) -> bool {
        match self.entries.last() {
            Some(newest) if entry.time <= newest.time => {
                log::trace!(
                    "Dropping prediction at t = {} (newest is t = {})",
                    entry.time,
                    newest.time
                );
                false
            }
            _ => {
                self.entries.push(entry);
                true
            }
        }
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn oldest(&self) -> Option<&HistoryEntry> {
        self.entries.first()
    }

    pub fn newest(&self) -> Option<&HistoryEntry> {
        self.entries.last()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, HistoryEntry> {
        self.entries.iter()
    }

    /// The entry at `time`, linearly interpolated between its neighbours if there is no exact
    /// match. `None` if `time` lies outside the covered range.
    ///
    /// The search starts at the newest entry, which is the one asked for most of the time.
    pub fn state_at(&self, time: f64) -> Option<HistoryEntry> {
        let mut later: Option<&HistoryEntry> = None;
        for entry in self.entries.iter().rev() {
            if entry.time == time {
                return Some(entry.clone());
            }
            if entry.time < time {
                let later = later?;
                return Some(HistoryEntry {
                    time,
                    state: interpolate_all(time, entry, later, |e| &e.state),
                    values: interpolate_all(time, entry, later, |e| &e.values),
                });
            }
            later = Some(entry);
        }
        None
    }
}

fn interpolate_all<F>(time: f64, lo: &HistoryEntry, hi: &HistoryEntry, field: F) -> Vec<f64>
where
    F: Fn(&HistoryEntry) -> &Vec<f64>,
{
    field(lo)
        .iter()
        .zip(field(hi))
        .map(|(&y0, &y1)| interpolate_value(time, lo.time, y0, hi.time, y1))
        .collect()
}

impl<'a> IntoIterator for &'a History {
    type Item = &'a HistoryEntry;
    type IntoIter = std::slice::Iter<'a, HistoryEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn history() -> History {
        let mut history = History::new();
        assert!(history.push(HistoryEntry::new(0.0, vec![10.0], vec![1.0])));
        assert!(history.push(HistoryEntry::new(1.0, vec![20.0], vec![3.0])));
        assert!(history.push(HistoryEntry::new(2.0, vec![0.0], vec![-1.0])));
        history
    }

    #[test]
    fn test_interpolate_value() {
        assert_eq!(interpolate_value(0.0, 0.0, 10.0, 1.0, 20.0), 10.0);
        assert_eq!(interpolate_value(1.0, 0.0, 10.0, 1.0, 20.0), 20.0);
        assert_eq!(interpolate_value(0.25, 0.0, 10.0, 1.0, 20.0), 12.5);
        assert_eq!(interpolate_value(0.3, 0.1, 0.7, 0.3, 0.2), 0.2);
    }

    #[test]
    fn test_exact_match() {
        let h = history();
        let entry = h.state_at(1.0).unwrap();
        assert_eq!(entry, HistoryEntry::new(1.0, vec![20.0], vec![3.0]));
    }

    #[test]
    fn test_interpolated() {
        let h = history();
        let entry = h.state_at(0.5).unwrap();
        assert_eq!(entry.time, 0.5);
        assert_eq!(entry.state, [15.0]);
        assert_eq!(entry.values, [2.0]);

        let entry = h.state_at(1.5).unwrap();
        assert_eq!(entry.state, [10.0]);
        assert_eq!(entry.values, [1.0]);
    }

    #[test]
    fn test_out_of_range() {
        let h = history();
        assert!(h.state_at(-0.1).is_none());
        assert!(h.state_at(2.1).is_none());
        assert!(History::new().state_at(0.0).is_none());
    }

    #[test]
    fn test_strictly_increasing() {
        let mut h = history();
        assert!(!h.push(HistoryEntry::new(2.0, vec![1.0], vec![])));
        assert!(!h.push(HistoryEntry::new(1.5, vec![1.0], vec![])));
        assert_eq!(h.len(), 3);
        assert!(h.iter().zip(h.iter().skip(1)).all(|(a, b)| a.time < b.time));
    }

    #[test]
    fn test_invalid_entry() {
        assert!(!HistoryEntry::invalid().is_valid());
        assert!(HistoryEntry::with_sizes(0.0, 2, 1).is_valid());
    }
}
