/// Result of `initialize` and `event_update`, mirroring `fmiEventInfo`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EventInfo {
    /// The event iteration has converged.
    pub iteration_converged: bool,
    pub state_value_references_changed: bool,
    /// Continuous states were re-initialized by the event.
    pub state_values_changed: bool,
    pub terminate_simulation: bool,
    /// `next_event_time` holds the time of the next time event.
    pub upcoming_time_event: bool,
    pub next_event_time: f64,
}

impl Default for EventInfo {
    fn default() -> Self {
        Self {
            iteration_converged: true,
            state_value_references_changed: false,
            state_values_changed: false,
            terminate_simulation: false,
            upcoming_time_event: false,
            next_event_time: f64::INFINITY,
        }
    }
}

impl EventInfo {
    /// The time of the next time event, if the model announced one.
    pub fn next_time_event(&self) -> Option<f64> {
        self.upcoming_time_event.then_some(self.next_event_time)
    }
}

#[cfg(feature = "fmi1")]
impl From<&fmipp_sys::fmi1::fmiEventInfo> for EventInfo {
    fn from(info: &fmipp_sys::fmi1::fmiEventInfo) -> Self {
        Self {
            iteration_converged: info.iterationConverged != 0,
            state_value_references_changed: info.stateValueReferencesChanged != 0,
            state_values_changed: info.stateValuesChanged != 0,
            terminate_simulation: info.terminateSimulation != 0,
            upcoming_time_event: info.upcomingTimeEvent != 0,
            next_event_time: info.nextEventTime,
        }
    }
}
