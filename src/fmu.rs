//! The model wrapper: one model instance, its event state and its integrator.

use crate::{
    built_info,
    history::INVALID_TIME,
    integrator::{Integrator, IntegratorSettings, IntegratorType, OdeSystem},
    Error, EventInfo, FmiStatus, FmiValue, Logger, ModelExchange, ValueReference,
};

/// Upper bound on `event_update` calls per event.
pub const MAX_EVENT_ITERATIONS: usize = 5;

/// Phase of the event-handling protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EventMode {
    /// Continuous-time integration.
    #[default]
    Normal,
    /// A state event stopped the integrator. Integration stays frozen until the flag is
    /// acknowledged with [`Fmu::reset_event_flags`].
    EventPending,
    /// Inside the event-update iteration.
    EventUpdating,
}

/// Owns a model-exchange model and integrates its continuous states.
///
/// Event handling follows the FMI 1.0 protocol: after every accepted integrator step the event
/// indicators are checked for sign changes, time events are compared against the next event time
/// announced by the model, and `event_update` is iterated until the model reports convergence.
pub struct Fmu<M: ModelExchange> {
    model: M,
    instance_name: String,
    instantiated: bool,

    time: f64,
    n_states: usize,
    n_event_inds: usize,
    /// Scratch buffer for the continuous states during integration
    states: Vec<f64>,
    event_indicators: Vec<f64>,
    pre_event_indicators: Vec<f64>,
    event_info: EventInfo,

    state_event: bool,
    time_event: bool,
    call_event_update: bool,
    raised_event: bool,
    /// Set when a state event was found after a completed step, freezes the integrator
    state_event_flag: bool,
    next_event_time: f64,
    /// Time of the first event of the current integration pass
    last_event_time: f64,
    event_mode: EventMode,

    integrator: Integrator,
    logger: Logger,
    tolerance: Option<f64>,
}

impl<M: ModelExchange> Fmu<M> {
    /// Wrap `model`, integrating with Dormand-Prince.
    pub fn new(model: M) -> Self {
        Self::with_integrator(model, IntegratorType::default())
    }

    pub fn with_integrator(model: M, integrator: IntegratorType) -> Self {
        let n_states = model.num_states();
        let n_event_inds = model.num_event_indicators();
        Self {
            model,
            instance_name: String::new(),
            instantiated: false,
            time: 0.0,
            n_states,
            n_event_inds,
            states: vec![0.0; n_states],
            event_indicators: vec![0.0; n_event_inds],
            pre_event_indicators: vec![0.0; n_event_inds],
            event_info: EventInfo::default(),
            state_event: false,
            time_event: false,
            call_event_update: false,
            raised_event: false,
            state_event_flag: false,
            next_event_time: f64::INFINITY,
            last_event_time: f64::INFINITY,
            event_mode: EventMode::Normal,
            integrator: Integrator::new(integrator),
            logger: Logger::default(),
            tolerance: None,
        }
    }

    /// Create the model instance.
    pub fn instantiate(&mut self, instance_name: &str, logging_on: bool) -> Result<(), Error> {
        log::debug!(
            "Instantiating '{instance_name}' of {} with {} {}",
            self.model.model_identifier(),
            built_info::PKG_NAME,
            built_info::PKG_VERSION,
        );
        self.instance_name = instance_name.to_owned();
        self.event_indicators = vec![0.0; self.n_event_inds];
        self.pre_event_indicators = vec![0.0; self.n_event_inds];

        let status = self.model.instantiate(instance_name, logging_on);
        if !status.is_ok() {
            self.log(status, "instantiate", "instantiation failed");
            return Err(Error::Instantiation(status));
        }
        self.instantiated = true;
        Ok(())
    }

    /// Initialize the instance at time zero and clear all event flags.
    pub fn initialize(&mut self) -> Result<(), Error> {
        if !self.instantiated {
            return Err(Error::NotInstantiated);
        }
        self.set_time(0.0);

        let mut event_info = EventInfo::default();
        let status = self.model.initialize(self.tolerance, &mut event_info);
        if !status.is_ok() {
            self.log(status, "initialize", "initialization failed");
            return Err(Error::Initialization(status));
        }
        self.event_info = event_info;
        self.next_event_time = event_info.next_time_event().unwrap_or(f64::INFINITY);

        self.state_event = false;
        self.time_event = false;
        self.call_event_update = false;
        self.raised_event = false;
        self.state_event_flag = false;
        self.last_event_time = f64::INFINITY;
        self.event_mode = EventMode::Normal;

        self.refresh_event_indicators();
        Ok(())
    }

    pub fn terminate(&mut self) -> FmiStatus {
        self.model.terminate()
    }

    pub fn set_debug_logging(&mut self, logging_on: bool) -> FmiStatus {
        self.model.set_debug_logging(logging_on)
    }

    pub fn set_logger(&mut self, logger: Logger) {
        self.logger = logger;
    }

    /// Relative tolerance passed to the model's `initialize`.
    pub fn set_tolerance(&mut self, tolerance: Option<f64>) {
        self.tolerance = tolerance;
    }

    pub fn set_integrator_settings(&mut self, settings: IntegratorSettings) {
        self.integrator.set_settings(settings);
    }

    pub fn integrator_type(&self) -> IntegratorType {
        self.integrator.integrator_type()
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    pub fn model_mut(&mut self) -> &mut M {
        &mut self.model
    }

    pub fn instance_name(&self) -> &str {
        &self.instance_name
    }

    #[inline]
    pub fn time(&self) -> f64 {
        self.time
    }

    #[inline]
    pub fn n_states(&self) -> usize {
        self.n_states
    }

    #[inline]
    pub fn n_event_indicators(&self) -> usize {
        self.n_event_inds
    }

    /// Set the instance time.
    ///
    /// Meant for moving forward or re-synchronising to a time whose states the caller restores
    /// alongside. Stepping back on its own is what [`Self::rewind_time`] is for.
    pub fn set_time(&mut self, time: f64) -> FmiStatus {
        self.time = time;
        self.model.set_time(time)
    }

    /// Move time back by `delta`.
    ///
    /// The continuous states are left untouched: the caller has to restore states consistent
    /// with the new time itself.
    pub fn rewind_time(&mut self, delta: f64) -> FmiStatus {
        self.time -= delta;
        self.model.set_time(self.time)
    }

    pub fn get_continuous_states(&mut self, states: &mut [f64]) -> FmiStatus {
        self.model.get_continuous_states(states)
    }

    pub fn set_continuous_states(&mut self, states: &[f64]) -> FmiStatus {
        self.model.set_continuous_states(states)
    }

    pub fn get_derivatives(&mut self, derivatives: &mut [f64]) -> FmiStatus {
        self.model.get_derivatives(derivatives)
    }

    pub fn get_event_indicators(&mut self, indicators: &mut [f64]) -> FmiStatus {
        self.model.get_event_indicators(indicators)
    }

    /// Event indicators as read by the last event check.
    pub fn event_indicators(&self) -> &[f64] {
        &self.event_indicators
    }

    pub fn value_reference(&self, name: &str) -> Option<ValueReference> {
        self.model.value_reference(name)
    }

    pub fn set_value<T: FmiValue>(&mut self, vr: ValueReference, value: T) -> FmiStatus {
        T::set_values(&mut self.model, &[vr], &[value])
    }

    pub fn set_values<T: FmiValue>(&mut self, vrs: &[ValueReference], values: &[T]) -> FmiStatus {
        T::set_values(&mut self.model, vrs, values)
    }

    pub fn set_value_by_name<T: FmiValue>(&mut self, name: &str, value: T) -> FmiStatus {
        match self.lookup(name) {
            Ok(vr) => self.set_value(vr, value),
            Err(status) => status,
        }
    }

    pub fn get_value<T: FmiValue>(&mut self, vr: ValueReference) -> Result<T, FmiStatus> {
        let mut buf = [T::default()];
        T::get_values(&mut self.model, &[vr], &mut buf).ok()?;
        let [value] = buf;
        Ok(value)
    }

    pub fn get_values<T: FmiValue>(
        &mut self,
        vrs: &[ValueReference],
        values: &mut [T],
    ) -> FmiStatus {
        T::get_values(&mut self.model, vrs, values)
    }

    pub fn get_value_by_name<T: FmiValue>(&mut self, name: &str) -> Result<T, FmiStatus> {
        let vr = self.lookup(name)?;
        self.get_value(vr)
    }

    fn lookup(&self, name: &str) -> Result<ValueReference, FmiStatus> {
        self.value_reference(name).ok_or_else(|| {
            self.log(
                FmiStatus::Discard,
                "value",
                &format!("unknown variable name '{name}'"),
            );
            FmiStatus::Discard
        })
    }

    pub fn event_info(&self) -> &EventInfo {
        &self.event_info
    }

    /// A state event was found after a completed step and has not been acknowledged with
    /// [`Self::reset_event_flags`] yet.
    pub fn state_event_flag(&self) -> bool {
        self.state_event_flag
    }

    /// A time event was detected by the last event check.
    pub fn time_event(&self) -> bool {
        self.time_event
    }

    /// Time of the first event of the last integration pass, infinite if there was none.
    pub fn last_event_time(&self) -> f64 {
        self.last_event_time
    }

    pub fn next_event_time(&self) -> f64 {
        self.next_event_time
    }

    /// Phase of the event protocol. [`EventMode::EventUpdating`] only lasts while `event_update`
    /// is iterated.
    pub fn event_mode(&self) -> EventMode {
        self.event_mode
    }

    /// Request an event update on the next call to [`Self::handle_events`].
    pub fn raise_event(&mut self) {
        self.raised_event = true;
    }

    pub fn reset_event_flags(&mut self) {
        self.state_event_flag = false;
        self.event_mode = EventMode::Normal;
    }

    /// Integrate up to `tend` with integrator step size `delta_t`.
    ///
    /// Returns the time of the first event found on the way, or `tend` if there was none. In
    /// both cases the instance time is `tend` afterwards. An end time in the past is refused with
    /// [`INVALID_TIME`], leaving time and states untouched.
    pub fn integrate(&mut self, tend: f64, delta_t: f64) -> f64 {
        if tend < self.time {
            self.log(
                FmiStatus::Warning,
                "integrate",
                &format!("end time {tend} lies before current time {}", self.time),
            );
            return INVALID_TIME;
        }

        self.handle_events(0.0, false);
        self.last_event_time = f64::INFINITY;

        if self.n_states != 0 {
            let mut integrator = std::mem::take(&mut self.integrator);
            let mut states = std::mem::take(&mut self.states);
            states.resize(self.n_states, 0.0);
            self.model.get_continuous_states(&mut states);

            let t0 = self.time;
            integrator.integrate(self, &mut states, t0, tend - t0, delta_t);

            self.states = states;
            self.integrator = integrator;
            self.set_time(tend);
        } else {
            self.set_time(tend);
            self.handle_events(tend, true);
        }

        if self.last_event_time.is_finite() {
            self.last_event_time
        } else {
            tend
        }
    }

    /// Integrate up to `tend` in `nsteps` integrator steps.
    pub fn integrate_n(&mut self, tend: f64, nsteps: usize) -> f64 {
        let delta_t = (tend - self.time) / nsteps.max(1) as f64;
        self.integrate(tend, delta_t)
    }

    /// Check for events and process them.
    ///
    /// `t_stop` bounds the next time event if it lies ahead of the current time.
    /// `completed_integrator_step` tells the model that an integrator step was accepted.
    pub fn handle_events(&mut self, t_stop: f64, completed_integrator_step: bool) {
        self.process_events(t_stop, completed_integrator_step);
    }

    /// Returns true if an event update was performed.
    fn process_events(&mut self, t_stop: f64, completed_integrator_step: bool) -> bool {
        if self.n_event_inds != 0 {
            std::mem::swap(&mut self.pre_event_indicators, &mut self.event_indicators);
            self.model.get_event_indicators(&mut self.event_indicators);
            self.state_event |= self
                .pre_event_indicators
                .iter()
                .zip(&self.event_indicators)
                .any(|(pre, cur)| pre * cur < 0.0);
        }

        self.time_event = self.time > self.next_event_time;

        if completed_integrator_step {
            let mut call_event_update = false;
            self.model.completed_integrator_step(&mut call_event_update);
            self.call_event_update = call_event_update;
        }

        if !(self.call_event_update || self.state_event || self.time_event || self.raised_event) {
            return false;
        }
        log::trace!(
            "{}: event at t = {} (state: {}, time: {}, step: {}, raised: {})",
            self.instance_name,
            self.time,
            self.state_event,
            self.time_event,
            self.call_event_update,
            self.raised_event
        );

        if !self.state_event_flag && self.last_event_time == f64::INFINITY {
            self.last_event_time = self.time;
        }
        if self.state_event && completed_integrator_step {
            self.state_event_flag = true;
        }

        self.event_mode = EventMode::EventUpdating;
        self.event_info.iteration_converged = false;
        let mut iterations = 0;
        while !self.event_info.iteration_converged && iterations < MAX_EVENT_ITERATIONS {
            let status = self.model.event_update(true, &mut self.event_info);
            iterations += 1;
            if !status.is_ok() {
                self.log(status, "eventUpdate", "event update failed");
                break;
            }
        }
        if !self.event_info.iteration_converged {
            self.log(
                FmiStatus::Warning,
                "eventUpdate",
                &format!(
                    "event iteration did not converge within {MAX_EVENT_ITERATIONS} iterations at t = {}",
                    self.time
                ),
            );
        }
        if self.event_info.terminate_simulation {
            self.log(
                FmiStatus::Warning,
                "eventUpdate",
                "model requested to terminate the simulation",
            );
        }

        self.next_event_time = match self.event_info.next_time_event() {
            Some(t) if t_stop > self.time => t.min(t_stop),
            Some(t) => t,
            None => f64::INFINITY,
        };

        if self.n_event_inds != 0 {
            self.model.get_event_indicators(&mut self.event_indicators);
        }

        self.raised_event = false;
        self.state_event = false;
        self.call_event_update = false;
        self.event_mode = if self.state_event_flag {
            EventMode::EventPending
        } else {
            EventMode::Normal
        };
        true
    }

    /// Read the event indicators of the current state into both comparison buffers, so the next
    /// check only sees sign changes from here on.
    pub(crate) fn refresh_event_indicators(&mut self) {
        if self.n_event_inds != 0 {
            self.model.get_event_indicators(&mut self.event_indicators);
            self.pre_event_indicators
                .copy_from_slice(&self.event_indicators);
        }
    }

    /// Report `message` through the instance logger.
    pub(crate) fn log(&self, status: FmiStatus, category: &str, message: &str) {
        self.logger
            .log(&self.instance_name, status, category, message);
    }
}

impl<M: ModelExchange> OdeSystem for Fmu<M> {
    fn rhs(&mut self, x: &[f64], dxdt: &mut [f64], t: f64) {
        if self.state_event_flag {
            return;
        }
        self.set_time(t);
        self.model.set_continuous_states(x);
        self.model.get_derivatives(dxdt);
    }

    fn observe(&mut self, x: &mut [f64], t: f64) {
        if self.state_event_flag {
            return;
        }
        self.set_time(t);
        self.model.set_continuous_states(x);
        if self.process_events(t, true) && self.event_info.state_values_changed {
            self.model.get_continuous_states(x);
        }
    }

    fn halted(&self) -> bool {
        self.state_event_flag
    }
}

/// Cloning shares whatever the model shares between clones and yields an uninstantiated wrapper
/// with its own integrator.
impl<M: ModelExchange + Clone> Clone for Fmu<M> {
    fn clone(&self) -> Self {
        let mut fmu = Fmu::with_integrator(self.model.clone(), self.integrator_type());
        fmu.integrator.set_settings(*self.integrator.settings());
        fmu.logger = self.logger.clone();
        fmu.tolerance = self.tolerance;
        fmu
    }
}

impl<M: ModelExchange> std::fmt::Debug for Fmu<M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Fmu")
            .field("model", &self.model.model_identifier())
            .field("instance_name", &self.instance_name)
            .field("time", &self.time)
            .field("n_states", &self.n_states)
            .field("n_event_inds", &self.n_event_inds)
            .field("integrator", &self.integrator_type())
            .field("event_mode", &self.event_mode)
            .finish()
    }
}
