use std::sync::{Arc, Mutex};

use assert_approx_eq::assert_approx_eq;
use fmipp::{
    EventInfo, EventMode, FmiStatus, Fmu, IntegratorSettings, IntegratorType, Logger,
    ModelExchange, ValueReference, INVALID_TIME,
};
use rstest::rstest;
use test_models::{BouncingBall, Dahlquist, Feedthrough, Stair};

fn dahlquist(integrator: IntegratorType) -> Fmu<Dahlquist> {
    let mut fmu = Fmu::with_integrator(Dahlquist::new(), integrator);
    fmu.instantiate("dahlquist", false).unwrap();
    fmu.initialize().unwrap();
    fmu
}

#[rstest]
#[case(IntegratorType::Euler, 5e-3)]
#[case(IntegratorType::RungeKutta4, 1e-8)]
#[case(IntegratorType::DormandPrince, 1e-4)]
#[case(IntegratorType::Fehlberg78, 1e-4)]
#[case(IntegratorType::BulirschStoer, 1e-4)]
#[case(IntegratorType::AdamsBashforthMoulton, 1e-6)]
fn test_dahlquist(#[case] integrator: IntegratorType, #[case] tolerance: f64) {
    let mut fmu = dahlquist(integrator);
    assert_eq!(fmu.integrator_type(), integrator);

    let t = fmu.integrate(1.0, 0.01);
    assert_eq!(t, 1.0);
    assert_eq!(fmu.time(), 1.0);

    let x: f64 = fmu.get_value_by_name("x").unwrap();
    assert_approx_eq!(x, (-1.0f64).exp(), tolerance);
}

#[rstest]
fn test_dahlquist_in_chunks(
    #[values(
        IntegratorType::Euler,
        IntegratorType::RungeKutta4,
        IntegratorType::DormandPrince,
        IntegratorType::Fehlberg78,
        IntegratorType::BulirschStoer,
        IntegratorType::AdamsBashforthMoulton
    )]
    integrator: IntegratorType,
) {
    let mut fmu = dahlquist(integrator);
    for k in 1..=10 {
        let tend = k as f64 * 0.1;
        assert_eq!(fmu.integrate(tend, 0.01), tend);
    }
    let x: f64 = fmu.get_value_by_name("x").unwrap();
    assert_approx_eq!(x, (-1.0f64).exp(), 5e-3);
}

#[test_log::test]
fn test_integrate_n() {
    let mut fmu = dahlquist(IntegratorType::RungeKutta4);
    assert_eq!(fmu.integrate_n(2.0, 200), 2.0);
    let x: f64 = fmu.get_value_by_name("x").unwrap();
    assert_approx_eq!(x, (-2.0f64).exp(), 1e-8);
}

#[test_log::test]
fn test_tighter_tolerances() {
    let mut fmu = Fmu::with_integrator(Dahlquist::new(), IntegratorType::DormandPrince);
    fmu.set_integrator_settings(IntegratorSettings {
        abs_tol: 1e-10,
        rel_tol: 1e-10,
        ..Default::default()
    });
    fmu.instantiate("dahlquist", false).unwrap();
    fmu.initialize().unwrap();
    fmu.integrate(1.0, 0.1);
    let x: f64 = fmu.get_value_by_name("x").unwrap();
    assert_approx_eq!(x, (-1.0f64).exp(), 1e-8);
}

#[test_log::test]
fn test_integrate_backwards_is_refused() {
    let mut fmu = dahlquist(IntegratorType::RungeKutta4);
    fmu.integrate(1.0, 0.1);
    let x: f64 = fmu.get_value_by_name("x").unwrap();

    let t = fmu.integrate(0.5, 0.1);
    assert_eq!(t, INVALID_TIME);
    assert!(t <= 0.5);
    assert_eq!(fmu.time(), 1.0);
    assert_eq!(fmu.get_value_by_name::<f64>("x"), Ok(x));
}

#[test_log::test]
fn test_not_instantiated() {
    let mut fmu = Fmu::new(Dahlquist::new());
    assert!(matches!(fmu.initialize(), Err(fmipp::Error::NotInstantiated)));
}

#[test_log::test]
fn test_bouncing_ball() {
    let mut fmu = Fmu::with_integrator(BouncingBall::new(), IntegratorType::RungeKutta4);
    fmu.instantiate("ball", false).unwrap();
    fmu.initialize().unwrap();
    let impact = fmu.model().first_impact(1.0);
    assert_eq!(fmu.event_mode(), EventMode::Normal);

    let t = fmu.integrate(1.0, 0.01);
    assert!(t > impact && t <= impact + 0.01 + 1e-9, "event at {t}");
    assert!(fmu.state_event_flag());
    assert_eq!(fmu.event_mode(), EventMode::EventPending);
    assert_eq!(fmu.time(), 1.0);

    assert_eq!(fmu.get_value_by_name::<i32>("bounces"), Ok(1));
    let h: f64 = fmu.get_value_by_name("h").unwrap();
    let v: f64 = fmu.get_value_by_name("v").unwrap();
    assert_eq!(h, 0.0);
    assert_approx_eq!(v, 0.7 * 9.81 * t, 1e-6);

    fmu.reset_event_flags();
    assert!(!fmu.state_event_flag());
    assert_eq!(fmu.event_mode(), EventMode::Normal);
}

#[test_log::test]
fn test_stair_time_events() {
    let mut fmu = Fmu::new(Stair::new());
    fmu.instantiate("stair", false).unwrap();
    fmu.initialize().unwrap();
    assert_eq!(fmu.next_event_time(), 1.0);

    assert_eq!(fmu.integrate(0.5, 0.1), 0.5);
    assert_eq!(fmu.get_value_by_name::<i32>("counter"), Ok(1));
    assert!(!fmu.time_event());

    assert_eq!(fmu.integrate(1.5, 0.1), 1.5);
    assert!(fmu.time_event());
    assert_eq!(fmu.event_mode(), EventMode::Normal);
    assert_eq!(fmu.get_value_by_name::<i32>("counter"), Ok(2));
    assert_eq!(fmu.next_event_time(), 2.0);

    fmu.integrate(3.5, 0.1);
    assert_eq!(fmu.get_value_by_name::<i32>("counter"), Ok(4));
    assert_eq!(fmu.get_value_by_name::<f64>("counter"), Ok(4.0));
}

#[test_log::test]
fn test_values_by_name() {
    let mut fmu = Fmu::new(Feedthrough::new());
    fmu.instantiate("feedthrough", false).unwrap();
    fmu.initialize().unwrap();

    assert_eq!(fmu.set_value_by_name("gain", 2.0), FmiStatus::Ok);
    assert_eq!(fmu.set_value_by_name("u", 1.5), FmiStatus::Ok);
    assert_eq!(fmu.get_value_by_name::<f64>("y"), Ok(3.0));

    assert_eq!(fmu.set_value_by_name("flag_in", true), FmiStatus::Ok);
    assert_eq!(fmu.get_value_by_name::<bool>("flag_out"), Ok(true));

    assert_eq!(
        fmu.set_value_by_name("label", "hello".to_owned()),
        FmiStatus::Ok
    );
    assert_eq!(
        fmu.get_value_by_name::<String>("label"),
        Ok("hello".to_owned())
    );

    let vrs: Vec<ValueReference> = ["u", "y"]
        .iter()
        .map(|name| fmu.value_reference(name).unwrap())
        .collect();
    let mut values = [0.0; 2];
    assert_eq!(fmu.get_values(&vrs, &mut values), FmiStatus::Ok);
    assert_eq!(values, [1.5, 3.0]);

    // Integer variables are not supported by this model
    assert_eq!(fmu.get_value_by_name::<i32>("u"), Err(FmiStatus::Discard));
}

#[test_log::test]
fn test_unknown_name() {
    let messages = Arc::new(Mutex::new(Vec::new()));
    let sink = messages.clone();

    let mut fmu = Fmu::new(Feedthrough::new());
    fmu.set_logger(Logger::new(move |instance, status, _category, message| {
        sink.lock()
            .unwrap()
            .push((instance.to_owned(), status, message.to_owned()));
    }));
    fmu.instantiate("feedthrough", false).unwrap();

    assert_eq!(fmu.get_value_by_name::<f64>("nope"), Err(FmiStatus::Discard));
    assert_eq!(fmu.set_value_by_name("nope", 1.0), FmiStatus::Discard);

    let messages = messages.lock().unwrap();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0].0, "feedthrough");
    assert_eq!(messages[0].1, FmiStatus::Discard);
    assert!(messages[0].2.contains("nope"));
}

/// Never converges its event iteration, and asks to terminate.
#[derive(Debug, Default, Clone)]
struct Restless {
    event_updates: usize,
}

impl ModelExchange for Restless {
    fn model_identifier(&self) -> &str {
        "restless"
    }

    fn num_states(&self) -> usize {
        0
    }

    fn num_event_indicators(&self) -> usize {
        0
    }

    fn value_reference(&self, _name: &str) -> Option<ValueReference> {
        None
    }

    fn instantiate(&mut self, _instance_name: &str, _logging_on: bool) -> FmiStatus {
        FmiStatus::Ok
    }

    fn initialize(&mut self, _tolerance: Option<f64>, event_info: &mut EventInfo) -> FmiStatus {
        *event_info = EventInfo::default();
        FmiStatus::Ok
    }

    fn set_time(&mut self, _time: f64) -> FmiStatus {
        FmiStatus::Ok
    }

    fn set_continuous_states(&mut self, _states: &[f64]) -> FmiStatus {
        FmiStatus::Ok
    }

    fn get_continuous_states(&mut self, _states: &mut [f64]) -> FmiStatus {
        FmiStatus::Ok
    }

    fn get_derivatives(&mut self, _derivatives: &mut [f64]) -> FmiStatus {
        FmiStatus::Ok
    }

    fn get_event_indicators(&mut self, _indicators: &mut [f64]) -> FmiStatus {
        FmiStatus::Ok
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
        self.event_updates += 1;
        *event_info = EventInfo {
            iteration_converged: false,
            terminate_simulation: true,
            ..EventInfo::default()
        };
        FmiStatus::Ok
    }

    fn set_real(&mut self, _vrs: &[ValueReference], _values: &[f64]) -> FmiStatus {
        FmiStatus::Discard
    }

    fn get_real(&mut self, _vrs: &[ValueReference], _values: &mut [f64]) -> FmiStatus {
        FmiStatus::Discard
    }
}

#[test_log::test]
fn test_event_iteration_limit() {
    let warnings = Arc::new(Mutex::new(Vec::new()));
    let sink = warnings.clone();

    let mut fmu = Fmu::new(Restless::default());
    fmu.set_logger(Logger::new(move |_instance, status, _category, message| {
        if status == FmiStatus::Warning {
            sink.lock().unwrap().push(message.to_owned());
        }
    }));
    fmu.instantiate("restless", false).unwrap();
    fmu.initialize().unwrap();

    fmu.raise_event();
    fmu.handle_events(0.0, false);
    assert_eq!(fmu.model().event_updates, 5);
    assert!(!fmu.event_info().iteration_converged);

    let warnings = warnings.lock().unwrap();
    assert_eq!(warnings.len(), 2);
    assert!(warnings[0].contains("did not converge"));
    assert!(warnings[1].contains("terminate"));
}

#[test_log::test]
fn test_no_event_without_cause() {
    let mut fmu = Fmu::new(Restless::default());
    fmu.instantiate("restless", false).unwrap();
    fmu.initialize().unwrap();
    fmu.handle_events(0.0, true);
    assert_eq!(fmu.model().event_updates, 0);
}

#[test_log::test]
fn test_clone_is_uninstantiated() {
    let mut fmu = dahlquist(IntegratorType::BulirschStoer);
    fmu.integrate(0.5, 0.1);

    let mut copy = fmu.clone();
    assert_eq!(copy.integrator_type(), IntegratorType::BulirschStoer);
    assert_eq!(copy.time(), 0.0);
    assert!(matches!(copy.initialize(), Err(fmipp::Error::NotInstantiated)));

    copy.instantiate("copy", false).unwrap();
    copy.initialize().unwrap();
    assert_eq!(copy.get_value_by_name::<f64>("x"), Ok(1.0));
}
