use fmipp::{EventInfo, FmiStatus, ModelExchange, ValueReference};

use crate::{copy_into, fill_values};

const VR_COUNTER: ValueReference = 0;

/// No continuous states: a counter that steps up by one at every whole second.
///
/// All its events are time events announced through [`EventInfo::next_event_time`].
#[derive(Debug, Clone, Default)]
pub struct Stair {
    instantiated: bool,
    time: f64,
    counter: i32,
    next_step: f64,
}

impl Stair {
    pub fn new() -> Self {
        Self::default()
    }

    fn announce(&self, event_info: &mut EventInfo) {
        *event_info = EventInfo {
            upcoming_time_event: true,
            next_event_time: self.next_step,
            ..EventInfo::default()
        };
    }
}

impl ModelExchange for Stair {
    fn model_identifier(&self) -> &str {
        "stair"
    }

    fn num_states(&self) -> usize {
        0
    }

    fn num_event_indicators(&self) -> usize {
        0
    }

    fn value_reference(&self, name: &str) -> Option<ValueReference> {
        (name == "counter").then_some(VR_COUNTER)
    }

    fn instantiate(&mut self, _instance_name: &str, _logging_on: bool) -> FmiStatus {
        *self = Self {
            instantiated: true,
            ..Self::default()
        };
        FmiStatus::Ok
    }

    fn initialize(&mut self, _tolerance: Option<f64>, event_info: &mut EventInfo) -> FmiStatus {
        if !self.instantiated {
            return FmiStatus::Error;
        }
        self.counter = 1;
        self.next_step = self.time.floor() + 1.0;
        self.announce(event_info);
        FmiStatus::Ok
    }

    fn set_time(&mut self, time: f64) -> FmiStatus {
        self.time = time;
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
        while self.time >= self.next_step {
            self.counter += 1;
            self.next_step += 1.0;
        }
        self.announce(event_info);
        FmiStatus::Ok
    }

    fn set_real(&mut self, vrs: &[ValueReference], _values: &[f64]) -> FmiStatus {
        if vrs.is_empty() {
            FmiStatus::Ok
        } else {
            FmiStatus::Error
        }
    }

    fn get_real(&mut self, vrs: &[ValueReference], values: &mut [f64]) -> FmiStatus {
        let counter = self.counter as f64;
        fill_values(vrs, values, |vr| (vr == VR_COUNTER).then_some(counter))
    }

    fn get_integer(&mut self, vrs: &[ValueReference], values: &mut [i32]) -> FmiStatus {
        let counter = self.counter;
        fill_values(vrs, values, |vr| (vr == VR_COUNTER).then_some(counter))
    }
}
