use std::sync::{Arc, Mutex};

use assert_approx_eq::assert_approx_eq;
use fmipp::{
    EventPolicy, FmiStatus, Fmu, HistoryEntry, IncrementalFmu, IntegratorType, Logger,
    LookAheadParams, ModelWrapper, RollbackFmu, INVALID_TIME,
};
use float_cmp::approx_eq;
use test_models::{BouncingBall, Dahlquist, Feedthrough};

fn dahlquist(params: LookAheadParams) -> IncrementalFmu<Fmu<Dahlquist>> {
    let mut inc = IncrementalFmu::new(Fmu::with_integrator(
        Dahlquist::new(),
        IntegratorType::RungeKutta4,
    ));
    inc.define_outputs(&["x"]).unwrap();
    inc.init("dahlquist", &[("k", 1.0)], 0.0, params).unwrap();
    inc
}

fn assert_monotonic(inc: &IncrementalFmu<impl ModelWrapper, impl EventPolicy>) {
    let times: Vec<f64> = inc.predictions().iter().map(|e| e.time).collect();
    assert!(
        times.windows(2).all(|w| w[0] < w[1]),
        "predictions not increasing: {times:?}"
    );
}

#[test_log::test]
fn test_first_sync() {
    let mut inc = dahlquist(LookAheadParams {
        horizon: 0.2,
        step_size: 0.1,
        integrator_step_size: 0.05,
    });
    assert_eq!(inc.predictions().len(), 1);
    assert_eq!(inc.current_state().time, 0.0);
    assert_eq!(inc.current_outputs(), &[1.0]);

    let t = inc.sync(-42.0, 0.0);
    assert_approx_eq!(t, 0.2, 1e-12);

    let predictions = inc.predictions();
    assert_eq!(predictions.oldest().unwrap().time, 0.0);
    assert!(predictions.newest().unwrap().time >= 0.2 - 1e-12);
    assert_eq!(predictions.len(), 3);
    assert_monotonic(&inc);

    for entry in predictions {
        assert_approx_eq!(entry.state[0], (-entry.time).exp(), 1e-6);
        assert_eq!(entry.values, entry.state);
    }
}

#[test_log::test]
fn test_commit_matches_prediction() {
    let mut inc = dahlquist(LookAheadParams {
        horizon: 0.2,
        step_size: 0.1,
        integrator_step_size: 0.05,
    });
    inc.sync(0.0, 0.0);

    // Between two predictions, so the committed state is interpolated
    let expected = inc.get_state(0.15);
    assert!(expected.is_valid());

    let t = inc.sync(0.0, 0.15);
    assert_approx_eq!(t, 0.35, 1e-12);
    assert_eq!(inc.current_state().state, expected.state);
    assert_eq!(inc.current_outputs(), expected.values.as_slice());

    let seeded = inc.get_state(0.15);
    assert_eq!(seeded.state, expected.state);
    assert_monotonic(&inc);
}

#[test_log::test]
fn test_out_of_range_sync() {
    let mut inc = dahlquist(LookAheadParams::default());
    inc.sync(0.0, 0.0);
    let time = inc.wrapper().fmu().time();
    let committed = inc.current_state().clone();

    assert_eq!(inc.sync(0.0, 5.0), INVALID_TIME);
    assert_eq!(inc.sync(0.0, -1.0), INVALID_TIME);
    assert_eq!(inc.wrapper().fmu().time(), time);
    assert_eq!(inc.current_state(), &committed);
    assert!(!inc.get_state(5.0).is_valid());
}

#[test_log::test]
fn test_sync_tracks_solution() {
    let mut inc = dahlquist(LookAheadParams {
        horizon: 0.2,
        step_size: 0.05,
        integrator_step_size: 0.01,
    });
    let mut t = 0.0;
    for _ in 0..10 {
        let next = inc.sync(t, t);
        assert!(next > t);
        assert_monotonic(&inc);
        t += 0.1;
    }
    let t = inc.sync(t, t);
    assert_approx_eq!(inc.current_state().state[0], (-1.0f64).exp(), 1e-8);
    assert!(approx_eq!(f64, t, 1.2, epsilon = 1e-9));
}

#[test_log::test]
fn test_stops_at_state_event() {
    let mut inc = IncrementalFmu::new(Fmu::with_integrator(
        BouncingBall::new(),
        IntegratorType::RungeKutta4,
    ));
    inc.define_outputs(&["h", "v"]).unwrap();
    inc.init(
        "ball",
        &[("e", 0.7)],
        0.0,
        LookAheadParams {
            horizon: 1.0,
            step_size: 0.1,
            integrator_step_size: 0.01,
        },
    )
    .unwrap();
    let impact = inc.wrapper().fmu().model().first_impact(1.0);

    let t = inc.sync(0.0, 0.0);
    assert!(t > impact && t <= impact + 0.02 + 1e-9, "event at {t}");
    assert_monotonic(&inc);

    let last = inc.predictions().newest().unwrap();
    assert_eq!(last.time, t);
    assert_eq!(last.values[0], 0.0);
    assert!(last.values[1] > 0.0);

    // Committing to the event time and predicting on lifts the ball again
    let next = inc.sync(t, t);
    assert!(next > t);
    assert!(inc.get_state(t + 0.1).values[0] > 0.0);
}

#[test_log::test]
fn test_inputs_apply_to_next_window() {
    let mut inc = IncrementalFmu::new(Fmu::new(Feedthrough::new()));
    inc.define_inputs(&["u"]).unwrap();
    inc.define_outputs(&["y"]).unwrap();
    inc.init("feedthrough", &[("gain", 2.0)], 0.0, LookAheadParams::default())
        .unwrap();

    let t = inc.sync_with_inputs(0.0, 0.0, &[1.5]);
    assert_approx_eq!(t, 0.1, 1e-12);
    assert_eq!(inc.current_outputs(), &[0.0]);
    assert!(inc.predictions().iter().all(|e| e.values == [3.0]));

    inc.sync(0.0, 0.05);
    assert_eq!(inc.current_outputs(), &[3.0]);
}

#[test_log::test]
fn test_write_failures_reach_instance_logger() {
    let messages = Arc::new(Mutex::new(Vec::new()));
    let sink = messages.clone();

    let mut inc = IncrementalFmu::new(Fmu::new(Feedthrough::new()));
    inc.wrapper_mut()
        .set_logger(Logger::new(move |instance, status, category, _message| {
            sink.lock()
                .unwrap()
                .push((instance.to_owned(), status, category.to_owned()));
        }));
    // `y` is an output, the model refuses writes to it
    inc.define_inputs(&["y"]).unwrap();
    inc.init("feedthrough", &[("y", 1.0)], 0.0, LookAheadParams::default())
        .unwrap();
    let t = inc.sync_with_inputs(0.0, 0.0, &[2.0]);
    assert_approx_eq!(t, 0.1, 1e-12);

    let messages = messages.lock().unwrap();
    assert_eq!(
        messages.as_slice(),
        [
            ("feedthrough".to_owned(), FmiStatus::Error, "init".to_owned()),
            ("feedthrough".to_owned(), FmiStatus::Error, "sync".to_owned()),
        ]
    );
}

#[test_log::test]
fn test_unknown_variables() {
    let mut inc = IncrementalFmu::new(Fmu::new(Dahlquist::new()));
    assert!(matches!(
        inc.define_outputs(&["x", "y"]),
        Err(fmipp::Error::UnknownVariable { name }) if name == "y"
    ));
    assert!(matches!(
        inc.init("dahlquist", &[("z", 1.0)], 0.0, LookAheadParams::default()),
        Err(fmipp::Error::UnknownVariable { .. })
    ));
}

/// Stops the prediction once the first output drops below a limit.
#[derive(Debug, Default)]
struct Threshold {
    limit: f64,
    events: usize,
}

impl EventPolicy for Threshold {
    fn check_for_event<W: ModelWrapper>(&mut self, _wrapper: &W, entry: &HistoryEntry) -> bool {
        entry.values[0] < self.limit
    }

    fn handle_event<W: ModelWrapper>(&mut self, _wrapper: &mut W) {
        self.events += 1;
    }
}

#[test_log::test]
fn test_custom_event_policy() {
    let mut inc = IncrementalFmu::with_policy(
        Fmu::with_integrator(Dahlquist::new(), IntegratorType::RungeKutta4),
        Threshold {
            limit: 0.95,
            events: 0,
        },
    );
    inc.define_outputs(&["x"]).unwrap();
    inc.init(
        "dahlquist",
        &[],
        0.0,
        LookAheadParams {
            horizon: 1.0,
            step_size: 0.01,
            integrator_step_size: 0.001,
        },
    )
    .unwrap();

    let t = inc.sync(0.0, 0.0);
    assert_approx_eq!(t, 0.06, 1e-9);
    assert_eq!(inc.policy().events, 1);
    assert_eq!(inc.predictions().newest().unwrap().time, t);
}

#[test_log::test]
fn test_rollback_wrapper() {
    let mut inc = IncrementalFmu::new(RollbackFmu::with_integrator(
        Dahlquist::new(),
        IntegratorType::RungeKutta4,
    ));
    inc.define_outputs(&["x"]).unwrap();
    inc.init("dahlquist", &[], 0.0, LookAheadParams::default())
        .unwrap();

    assert_approx_eq!(inc.sync(0.0, 0.0), 0.1, 1e-12);
    assert_approx_eq!(inc.sync(0.0, 0.05), 0.15, 1e-12);
    assert_approx_eq!(inc.current_state().state[0], (-0.05f64).exp(), 1e-8);
    assert_approx_eq!(inc.predictions().newest().unwrap().state[0], (-0.15f64).exp(), 1e-8);
}
