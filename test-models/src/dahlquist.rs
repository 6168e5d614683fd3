use fmipp::{EventInfo, FmiStatus, ModelExchange, ValueReference};

use crate::{copy_into, fill_values, for_each_value};

const VR_X: ValueReference = 0;
const VR_DER_X: ValueReference = 1;
const VR_K: ValueReference = 2;

/// The Dahlquist test equation `x' = -k x`, with `x(0) = 1` and `k = 1`.
#[derive(Debug, Clone)]
pub struct Dahlquist {
    instantiated: bool,
    time: f64,
    x: f64,
    k: f64,
}

impl Default for Dahlquist {
    fn default() -> Self {
        Self {
            instantiated: false,
            time: 0.0,
            x: 1.0,
            k: 1.0,
        }
    }
}

impl Dahlquist {
    pub fn new() -> Self {
        Self::default()
    }

    /// The exact solution for the current parameter, starting from `x0` at time zero.
    pub fn exact(&self, x0: f64, t: f64) -> f64 {
        x0 * (-self.k * t).exp()
    }

    fn guard(&self) -> Result<(), FmiStatus> {
        if self.instantiated {
            Ok(())
        } else {
            Err(FmiStatus::Error)
        }
    }
}

impl ModelExchange for Dahlquist {
    fn model_identifier(&self) -> &str {
        "dahlquist"
    }

    fn num_states(&self) -> usize {
        1
    }

    fn num_event_indicators(&self) -> usize {
        0
    }

    fn value_reference(&self, name: &str) -> Option<ValueReference> {
        match name {
            "x" => Some(VR_X),
            "der(x)" => Some(VR_DER_X),
            "k" => Some(VR_K),
            _ => None,
        }
    }

    fn instantiate(&mut self, _instance_name: &str, _logging_on: bool) -> FmiStatus {
        *self = Self {
            instantiated: true,
            ..Self::default()
        };
        FmiStatus::Ok
    }

    fn initialize(&mut self, _tolerance: Option<f64>, event_info: &mut EventInfo) -> FmiStatus {
        if let Err(status) = self.guard() {
            return status;
        }
        *event_info = EventInfo::default();
        FmiStatus::Ok
    }

    fn set_time(&mut self, time: f64) -> FmiStatus {
        self.time = time;
        FmiStatus::Ok
    }

    fn set_continuous_states(&mut self, states: &[f64]) -> FmiStatus {
        match states {
            [x] => {
                self.x = *x;
                FmiStatus::Ok
            }
            _ => FmiStatus::Error,
        }
    }

    fn get_continuous_states(&mut self, states: &mut [f64]) -> FmiStatus {
        copy_into(states, &[self.x])
    }

    fn get_derivatives(&mut self, derivatives: &mut [f64]) -> FmiStatus {
        copy_into(derivatives, &[-self.k * self.x])
    }

    fn get_event_indicators(&mut self, indicators: &mut [f64]) -> FmiStatus {
        copy_into(indicators, &[])
    }

    fn completed_integrator_step(&mut self, call_event_update: &mut bool) -> FmiStatus {
        *call_event_update = false;
        FmiStatus::Ok
    }

    fn event_update(
        &mut self,
        _intermediate_results: bool,
        event_info: &mut EventInfo,
    ) -> FmiStatus {
        *event_info = EventInfo::default();
        FmiStatus::Ok
    }

    fn set_real(&mut self, vrs: &[ValueReference], values: &[f64]) -> FmiStatus {
        if let Err(status) = self.guard() {
            return status;
        }
        for_each_value(vrs, values, |vr, &value| match vr {
            VR_X => {
                self.x = value;
                FmiStatus::Ok
            }
            VR_K => {
                self.k = value;
                FmiStatus::Ok
            }
            _ => FmiStatus::Error,
        })
    }

    fn get_real(&mut self, vrs: &[ValueReference], values: &mut [f64]) -> FmiStatus {
        if let Err(status) = self.guard() {
            return status;
        }
        fill_values(vrs, values, |vr| match vr {
            VR_X => Some(self.x),
            VR_DER_X => Some(-self.k * self.x),
            VR_K => Some(self.k),
            _ => None,
        })
    }
}
