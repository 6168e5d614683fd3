use fmipp::{EventInfo, FmiStatus, ModelExchange, ValueReference};

use crate::{copy_into, fill_values, for_each_value};

const VR_H: ValueReference = 0;
const VR_DER_H: ValueReference = 1;
const VR_V: ValueReference = 2;
const VR_DER_V: ValueReference = 3;
const VR_G: ValueReference = 4;
const VR_E: ValueReference = 5;
/// Integer variable
const VR_BOUNCES: ValueReference = 0;

/// A ball dropped from `h = 1` onto the floor at `h = 0`.
///
/// The height is the single event indicator. On impact the velocity is reversed and damped by
/// the restitution coefficient `e`.
#[derive(Debug, Clone)]
pub struct BouncingBall {
    instantiated: bool,
    time: f64,
    h: f64,
    v: f64,
    g: f64,
    e: f64,
    bounces: i32,
}

impl Default for BouncingBall {
    fn default() -> Self {
        Self {
            instantiated: false,
            time: 0.0,
            h: 1.0,
            v: 0.0,
            g: 9.81,
            e: 0.7,
            bounces: 0,
        }
    }
}

impl BouncingBall {
    pub fn new() -> Self {
        Self::default()
    }

    /// Time of the first impact when dropped from rest at `h0`.
    pub fn first_impact(&self, h0: f64) -> f64 {
        (2.0 * h0 / self.g).sqrt()
    }

    fn guard(&self) -> Result<(), FmiStatus> {
        if self.instantiated {
            Ok(())
        } else {
            Err(FmiStatus::Error)
        }
    }
}

impl ModelExchange for BouncingBall {
    fn model_identifier(&self) -> &str {
        "bouncingBall"
    }

    fn num_states(&self) -> usize {
        2
    }

    fn num_event_indicators(&self) -> usize {
        1
    }

    fn value_reference(&self, name: &str) -> Option<ValueReference> {
        match name {
            "h" => Some(VR_H),
            "der(h)" => Some(VR_DER_H),
            "v" => Some(VR_V),
            "der(v)" => Some(VR_DER_V),
            "g" => Some(VR_G),
            "e" => Some(VR_E),
            "bounces" => Some(VR_BOUNCES),
            _ => None,
        }
    }

    fn instantiate(&mut self, instance_name: &str, _logging_on: bool) -> FmiStatus {
        log::trace!("{instance_name}: new bouncing ball");
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
            [h, v] => {
                self.h = *h;
                self.v = *v;
                FmiStatus::Ok
            }
            _ => FmiStatus::Error,
        }
    }

    fn get_continuous_states(&mut self, states: &mut [f64]) -> FmiStatus {
        copy_into(states, &[self.h, self.v])
    }

    fn get_nominal_continuous_states(&mut self, nominals: &mut [f64]) -> FmiStatus {
        copy_into(nominals, &[1.0, 1.0])
    }

    fn get_derivatives(&mut self, derivatives: &mut [f64]) -> FmiStatus {
        copy_into(derivatives, &[self.v, -self.g])
    }

    fn get_event_indicators(&mut self, indicators: &mut [f64]) -> FmiStatus {
        copy_into(indicators, &[self.h])
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
        if self.h <= 0.0 && self.v < 0.0 {
            self.h = 0.0;
            self.v = -self.e * self.v;
            self.bounces += 1;
            event_info.state_values_changed = true;
        }
        FmiStatus::Ok
    }

    fn set_real(&mut self, vrs: &[ValueReference], values: &[f64]) -> FmiStatus {
        if let Err(status) = self.guard() {
            return status;
        }
        for_each_value(vrs, values, |vr, &value| {
            match vr {
                VR_H => self.h = value,
                VR_V => self.v = value,
                VR_G => self.g = value,
                VR_E => self.e = value,
                _ => return FmiStatus::Error,
            }
            FmiStatus::Ok
        })
    }

    fn get_real(&mut self, vrs: &[ValueReference], values: &mut [f64]) -> FmiStatus {
        if let Err(status) = self.guard() {
            return status;
        }
        fill_values(vrs, values, |vr| match vr {
            VR_H => Some(self.h),
            VR_DER_H | VR_V => Some(self.v),
            VR_DER_V => Some(-self.g),
            VR_G => Some(self.g),
            VR_E => Some(self.e),
            _ => None,
        })
    }

    fn get_integer(&mut self, vrs: &[ValueReference], values: &mut [i32]) -> FmiStatus {
        if let Err(status) = self.guard() {
            return status;
        }
        fill_values(vrs, values, |vr| (vr == VR_BOUNCES).then_some(self.bounces))
    }
}
