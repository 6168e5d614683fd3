//! Traits at the seams between the wrappers and the models they drive.

use crate::{EventInfo, FmiStatus, Fmu};

/// Opaque handle of a model variable, as used by the FMI 1.0 C API.
pub type ValueReference = fmipp_schema::ValueReference;

/// Interface of a model-exchange model.
///
/// Implemented for shared-library FMUs by [`crate::fmi1::Fmi1Instance`]. Any other type that can
/// compute derivatives and event indicators of a set of continuous states can implement it too,
/// which is how models written in Rust are driven by the same wrappers.
///
/// Every call returns an [`FmiStatus`]. Entry points a model does not support answer
/// [`FmiStatus::Discard`] by default.
pub trait ModelExchange {
    /// Prefix of the model's C symbols, also used as its registry key.
    fn model_identifier(&self) -> &str;

    /// Number of continuous states, fixed by the model description.
    fn num_states(&self) -> usize;

    /// Number of event indicators, fixed by the model description.
    fn num_event_indicators(&self) -> usize;

    /// Look up the value reference of the variable called `name`.
    fn value_reference(&self, name: &str) -> Option<ValueReference>;

    /// Create the model instance. Fails with `Fatal` if the model could not be created.
    fn instantiate(&mut self, instance_name: &str, logging_on: bool) -> FmiStatus;

    fn initialize(&mut self, tolerance: Option<f64>, event_info: &mut EventInfo) -> FmiStatus;

    fn set_time(&mut self, time: f64) -> FmiStatus;

    fn set_continuous_states(&mut self, states: &[f64]) -> FmiStatus;

    fn get_continuous_states(&mut self, states: &mut [f64]) -> FmiStatus;

    fn get_nominal_continuous_states(&mut self, nominals: &mut [f64]) -> FmiStatus {
        nominals.fill(1.0);
        FmiStatus::Ok
    }

    fn get_derivatives(&mut self, derivatives: &mut [f64]) -> FmiStatus;

    fn get_event_indicators(&mut self, indicators: &mut [f64]) -> FmiStatus;

    /// Inform the model that an integrator step was accepted. The model sets
    /// `call_event_update` if it wants an event update now.
    fn completed_integrator_step(&mut self, call_event_update: &mut bool) -> FmiStatus;

    fn event_update(&mut self, intermediate_results: bool, event_info: &mut EventInfo)
        -> FmiStatus;

    fn set_real(&mut self, vrs: &[ValueReference], values: &[f64]) -> FmiStatus;

    fn get_real(&mut self, vrs: &[ValueReference], values: &mut [f64]) -> FmiStatus;

    fn set_integer(&mut self, _vrs: &[ValueReference], _values: &[i32]) -> FmiStatus {
        FmiStatus::Discard
    }

    fn get_integer(&mut self, _vrs: &[ValueReference], _values: &mut [i32]) -> FmiStatus {
        FmiStatus::Discard
    }

    fn set_boolean(&mut self, _vrs: &[ValueReference], _values: &[bool]) -> FmiStatus {
        FmiStatus::Discard
    }

    fn get_boolean(&mut self, _vrs: &[ValueReference], _values: &mut [bool]) -> FmiStatus {
        FmiStatus::Discard
    }

    fn set_string(&mut self, _vrs: &[ValueReference], _values: &[String]) -> FmiStatus {
        FmiStatus::Discard
    }

    fn get_string(&mut self, _vrs: &[ValueReference], _values: &mut [String]) -> FmiStatus {
        FmiStatus::Discard
    }

    fn terminate(&mut self) -> FmiStatus {
        FmiStatus::Ok
    }

    fn set_debug_logging(&mut self, _logging_on: bool) -> FmiStatus {
        FmiStatus::Discard
    }

    /// The FMI-standard version string
    fn get_version(&self) -> &str {
        "1.0"
    }
}

/// Anything that owns an [`Fmu`] and can integrate it.
///
/// [`crate::IncrementalFmu`] is generic over this so it can drive either a plain [`Fmu`] or a
/// [`crate::RollbackFmu`].
pub trait ModelWrapper {
    type Model: ModelExchange;

    fn fmu(&self) -> &Fmu<Self::Model>;

    fn fmu_mut(&mut self) -> &mut Fmu<Self::Model>;

    /// Integrate up to `tend` with integrator step `delta_t`. See [`Fmu::integrate`].
    fn integrate(&mut self, tend: f64, delta_t: f64) -> f64 {
        self.fmu_mut().integrate(tend, delta_t)
    }
}

impl<M: ModelExchange> ModelWrapper for Fmu<M> {
    type Model = M;

    fn fmu(&self) -> &Fmu<M> {
        self
    }

    fn fmu_mut(&mut self) -> &mut Fmu<M> {
        self
    }
}
