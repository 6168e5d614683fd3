//! Look-ahead prediction of a model's state for a master algorithm.

use crate::{
    history::{History, HistoryEntry, INVALID_TIME},
    Error, FmiStatus, ModelWrapper, ValueReference,
};

/// Parameters of the look-ahead window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LookAheadParams {
    /// Length of the prediction window.
    pub horizon: f64,
    /// Distance between two predictions.
    pub step_size: f64,
    /// Step size handed to the integrator.
    pub integrator_step_size: f64,
}

impl Default for LookAheadParams {
    fn default() -> Self {
        Self {
            horizon: 0.1,
            step_size: 0.01,
            integrator_step_size: 0.001,
        }
    }
}

/// Decides when a prediction run stops for an event and what happens then.
pub trait EventPolicy {
    /// Called after every prediction step with the freshly predicted entry.
    fn check_for_event<W: ModelWrapper>(&mut self, wrapper: &W, _entry: &HistoryEntry) -> bool {
        wrapper.fmu().state_event_flag()
    }

    /// Called once an event stopped the prediction, with the model at the event time.
    fn handle_event<W: ModelWrapper>(&mut self, _wrapper: &mut W) {}
}

/// Stops at state events and does nothing else.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultEventPolicy;

impl EventPolicy for DefaultEventPolicy {}

/// Predicts the future states of a model and commits to them on request.
///
/// After [`Self::init`], every [`Self::sync`] commits the model to a time inside the last
/// prediction window and predicts a new window from there. The returned time tells the caller
/// when the next `sync` is due at the latest.
#[derive(Debug)]
pub struct IncrementalFmu<W: ModelWrapper, P: EventPolicy = DefaultEventPolicy> {
    wrapper: W,
    policy: P,
    input_refs: Vec<ValueReference>,
    output_refs: Vec<ValueReference>,
    predictions: History,
    current_state: HistoryEntry,
    params: LookAheadParams,
}

impl<W: ModelWrapper> IncrementalFmu<W> {
    pub fn new(wrapper: W) -> Self {
        Self::with_policy(wrapper, DefaultEventPolicy)
    }
}

impl<W: ModelWrapper, P: EventPolicy> IncrementalFmu<W, P> {
    pub fn with_policy(wrapper: W, policy: P) -> Self {
        Self {
            wrapper,
            policy,
            input_refs: Vec::new(),
            output_refs: Vec::new(),
            predictions: History::new(),
            current_state: HistoryEntry::invalid(),
            params: LookAheadParams::default(),
        }
    }

    fn resolve(&self, names: &[&str]) -> Result<Vec<ValueReference>, Error> {
        names
            .iter()
            .map(|&name| {
                self.wrapper
                    .fmu()
                    .value_reference(name)
                    .ok_or_else(|| Error::UnknownVariable {
                        name: name.to_owned(),
                    })
            })
            .collect()
    }

    /// Real variables written by [`Self::sync_with_inputs`].
    pub fn define_inputs(&mut self, names: &[&str]) -> Result<(), Error> {
        self.input_refs = self.resolve(names)?;
        Ok(())
    }

    /// Real variables sampled into every prediction.
    pub fn define_outputs(&mut self, names: &[&str]) -> Result<(), Error> {
        self.output_refs = self.resolve(names)?;
        Ok(())
    }

    /// Instantiate and initialize the model, set the start values of real variables and
    /// predict nothing but the state at `start_time`.
    ///
    /// # Panics
    /// If any of the look-ahead parameters is not positive.
    pub fn init(
        &mut self,
        instance_name: &str,
        start_values: &[(&str, f64)],
        start_time: f64,
        params: LookAheadParams,
    ) -> Result<(), Error> {
        assert!(params.horizon > 0.0, "look-ahead horizon must be positive");
        assert!(params.step_size > 0.0, "look-ahead step size must be positive");
        assert!(
            params.integrator_step_size > 0.0,
            "integrator step size must be positive"
        );
        self.params = params;

        let fmu = self.wrapper.fmu_mut();
        fmu.instantiate(instance_name, false)?;

        for &(name, value) in start_values {
            let vr = fmu
                .value_reference(name)
                .ok_or_else(|| Error::UnknownVariable {
                    name: name.to_owned(),
                })?;
            let status = fmu.set_value(vr, value);
            if !status.is_ok() {
                fmu.log(
                    status,
                    "init",
                    &format!("setting start value of '{name}' failed"),
                );
            }
        }

        fmu.initialize()?;
        fmu.set_time(start_time);
        fmu.raise_event();
        fmu.handle_events(start_time, false);
        fmu.refresh_event_indicators();

        self.current_state = self.capture();
        self.predictions.clear();
        self.predictions.push(self.current_state.clone());
        log::debug!("{instance_name}: initialized at t = {start_time}");
        Ok(())
    }

    /// Commit to `t1` and predict the window following it.
    ///
    /// Returns [`INVALID_TIME`] if `t1` is not covered by the current predictions, otherwise the
    /// end of the new window or the time of the first event in it.
    pub fn sync(&mut self, t0: f64, t1: f64) -> f64 {
        let t = self.update_state(t0, t1);
        if t == INVALID_TIME {
            return t;
        }
        self.predict_state(t1)
    }

    /// Like [`Self::sync`], writing `inputs` to the defined inputs after the commit.
    pub fn sync_with_inputs(&mut self, t0: f64, t1: f64, inputs: &[f64]) -> f64 {
        let t = self.update_state(t0, t1);
        if t == INVALID_TIME {
            return t;
        }
        let fmu = self.wrapper.fmu_mut();
        let status = fmu.set_values(&self.input_refs, inputs);
        if !status.is_ok() {
            fmu.log(status, "sync", &format!("setting inputs at t = {t1} failed"));
        }
        self.predict_state(t1)
    }

    /// Push the predicted state at `t1` into the model.
    pub fn update_state(&mut self, t0: f64, t1: f64) -> f64 {
        let Some(entry) = self.predictions.state_at(t1) else {
            log::debug!(
                "{}: sync({t0}, {t1}) outside of predicted range [{}, {}]",
                self.wrapper.fmu().instance_name(),
                self.predictions.oldest().map_or(INVALID_TIME, |e| e.time),
                self.predictions.newest().map_or(INVALID_TIME, |e| e.time),
            );
            return INVALID_TIME;
        };

        let fmu = self.wrapper.fmu_mut();
        if fmu.n_states() != 0 {
            fmu.set_continuous_states(&entry.state);
        }
        fmu.set_time(t1);
        fmu.refresh_event_indicators();

        self.current_state = entry;
        t1
    }

    /// Predict from the model's state at `t1` up to the end of the look-ahead window.
    pub fn predict_state(&mut self, t1: f64) -> f64 {
        self.wrapper.fmu_mut().reset_event_flags();
        self.predictions.clear();
        let start = self.capture();
        self.predictions.push(start);

        let LookAheadParams {
            horizon,
            step_size,
            integrator_step_size,
        } = self.params;
        let n_steps = ((horizon / step_size) - 1e-9).ceil().max(1.0) as usize;

        let mut t = t1;
        for step in 1..=n_steps {
            let target = if step == n_steps {
                t1 + horizon
            } else {
                t1 + step as f64 * step_size
            };
            self.wrapper.integrate(target, integrator_step_size);
            t = target;

            let entry = self.capture();
            if self.policy.check_for_event(&self.wrapper, &entry) {
                let fmu = self.wrapper.fmu_mut();
                let last_event_time = fmu.last_event_time();
                let event_time = if last_event_time.is_finite() {
                    last_event_time + integrator_step_size
                } else {
                    fmu.time()
                };
                fmu.set_time(event_time);
                let entry = self.capture();
                self.policy.handle_event(&mut self.wrapper);
                self.predictions.push(entry);
                log::trace!(
                    "{}: event predicted at t = {event_time}",
                    self.wrapper.fmu().instance_name()
                );
                return event_time;
            }
            self.predictions.push(entry);
        }
        t
    }

    /// Predicted entry at `time`, interpolated if needed. Invalid if out of range.
    pub fn get_state(&self, time: f64) -> HistoryEntry {
        self.predictions.state_at(time).unwrap_or_default()
    }

    fn capture(&mut self) -> HistoryEntry {
        let fmu = self.wrapper.fmu_mut();
        let mut entry = HistoryEntry::with_sizes(fmu.time(), fmu.n_states(), self.output_refs.len());
        if fmu.n_states() != 0 {
            fmu.get_continuous_states(&mut entry.state);
        }
        if !self.output_refs.is_empty() {
            let status = fmu.get_values(&self.output_refs, &mut entry.values);
            if status != FmiStatus::Ok {
                log::debug!(
                    "{}: reading outputs at t = {} returned {status}",
                    fmu.instance_name(),
                    entry.time
                );
            }
        }
        entry
    }

    /// The state committed by the last successful `sync`.
    pub fn current_state(&self) -> &HistoryEntry {
        &self.current_state
    }

    /// Output values committed by the last successful `sync`.
    pub fn current_outputs(&self) -> &[f64] {
        &self.current_state.values
    }

    pub fn predictions(&self) -> &History {
        &self.predictions
    }

    pub fn params(&self) -> &LookAheadParams {
        &self.params
    }

    pub fn policy(&self) -> &P {
        &self.policy
    }

    pub fn wrapper(&self) -> &W {
        &self.wrapper
    }

    pub fn wrapper_mut(&mut self) -> &mut W {
        &mut self.wrapper
    }
}
