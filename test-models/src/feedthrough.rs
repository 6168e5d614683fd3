use fmipp::{EventInfo, FmiStatus, ModelExchange, ValueReference};

use crate::{copy_into, fill_values, for_each_value};

const VR_U: ValueReference = 0;
const VR_Y: ValueReference = 1;
const VR_GAIN: ValueReference = 2;

const VR_FLAG_IN: ValueReference = 0;
const VR_FLAG_OUT: ValueReference = 1;

const VR_LABEL: ValueReference = 0;

/// Stateless `y = gain * u`, plus a boolean and a string passed straight through.
#[derive(Debug, Clone)]
pub struct Feedthrough {
    instantiated: bool,
    u: f64,
    gain: f64,
    flag: bool,
    label: String,
}

impl Default for Feedthrough {
    fn default() -> Self {
        Self {
            instantiated: false,
            u: 0.0,
            gain: 1.0,
            flag: false,
            label: String::new(),
        }
    }
}

impl Feedthrough {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ModelExchange for Feedthrough {
    fn model_identifier(&self) -> &str {
        "feedthrough"
    }

    fn num_states(&self) -> usize {
        0
    }

    fn num_event_indicators(&self) -> usize {
        0
    }

    fn value_reference(&self, name: &str) -> Option<ValueReference> {
        match name {
            "u" => Some(VR_U),
            "y" => Some(VR_Y),
            "gain" => Some(VR_GAIN),
            "flag_in" => Some(VR_FLAG_IN),
            "flag_out" => Some(VR_FLAG_OUT),
            "label" => Some(VR_LABEL),
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
        *event_info = EventInfo::default();
        if self.instantiated {
            FmiStatus::Ok
        } else {
            FmiStatus::Error
        }
    }

    fn set_time(&mut self, _time: f64) -> FmiStatus {
        FmiStatus::Ok
    }

    fn set_continuous_states(&mut self, states: &[f64]) -> FmiStatus {
        copy_into(&mut [], states)
    }

    fn get_continuous_states(&mut self, states: &mut [f64]) -> FmiStatus {
        copy_into(states, &[])
    }

    fn get_derivatives(&mut self, derivatives: &mut [f64]) -> FmiStatus {
        copy_into(derivatives, &[])
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
        for_each_value(vrs, values, |vr, &value| {
            match vr {
                VR_U => self.u = value,
                VR_GAIN => self.gain = value,
                _ => return FmiStatus::Error,
            }
            FmiStatus::Ok
        })
    }

    fn get_real(&mut self, vrs: &[ValueReference], values: &mut [f64]) -> FmiStatus {
        fill_values(vrs, values, |vr| match vr {
            VR_U => Some(self.u),
            VR_Y => Some(self.gain * self.u),
            VR_GAIN => Some(self.gain),
            _ => None,
        })
    }

    fn set_boolean(&mut self, vrs: &[ValueReference], values: &[bool]) -> FmiStatus {
        for_each_value(vrs, values, |vr, &value| {
            if vr != VR_FLAG_IN {
                return FmiStatus::Error;
            }
            self.flag = value;
            FmiStatus::Ok
        })
    }

    fn get_boolean(&mut self, vrs: &[ValueReference], values: &mut [bool]) -> FmiStatus {
        fill_values(vrs, values, |vr| match vr {
            VR_FLAG_IN | VR_FLAG_OUT => Some(self.flag),
            _ => None,
        })
    }

    fn set_string(&mut self, vrs: &[ValueReference], values: &[String]) -> FmiStatus {
        for_each_value(vrs, values, |vr, value| {
            if vr != VR_LABEL {
                return FmiStatus::Error;
            }
            self.label = value.clone();
            FmiStatus::Ok
        })
    }

    fn get_string(&mut self, vrs: &[ValueReference], values: &mut [String]) -> FmiStatus {
        fill_values(vrs, values, |vr| (vr == VR_LABEL).then(|| self.label.clone()))
    }
}
