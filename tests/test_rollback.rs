use assert_approx_eq::assert_approx_eq;
use fmipp::{FmiStatus, IntegratorType, RollbackFmu, INVALID_TIME};
use test_models::{BouncingBall, Dahlquist};

fn dahlquist() -> RollbackFmu<Dahlquist> {
    let mut fmu = RollbackFmu::with_integrator(Dahlquist::new(), IntegratorType::RungeKutta4);
    fmu.instantiate("dahlquist", false).unwrap();
    fmu.initialize().unwrap();
    fmu
}

#[test_log::test]
fn test_rollback_before_snapshot_fails() {
    let mut fmu = dahlquist();
    assert_eq!(fmu.integrate(1.0, 0.1), 1.0);

    fmu.release_rollback_state();
    fmu.save_current_state_for_rollback();
    assert_eq!(fmu.rollback_state().unwrap().time, 1.0);

    assert_eq!(fmu.integrate(2.0, 0.1), 2.0);
    let x: f64 = fmu.get_value_by_name("x").unwrap();

    assert_eq!(fmu.integrate(0.5, 0.1), INVALID_TIME);
    assert_eq!(fmu.time(), 2.0);
    assert_eq!(fmu.get_value_by_name::<f64>("x"), Ok(x));
    assert_eq!(fmu.rollback(0.5), FmiStatus::Fatal);
    assert_eq!(fmu.time(), 2.0);
}

#[test_log::test]
fn test_rollback_without_snapshot_fails() {
    let mut fmu = dahlquist();
    assert!(fmu.rollback_state().is_none());
    assert_eq!(fmu.rollback(0.0), FmiStatus::Fatal);
}

#[test_log::test]
fn test_integrate_backwards() {
    let mut fmu = dahlquist();
    fmu.integrate(1.0, 0.01);
    assert_eq!(fmu.rollback_state().unwrap().time, 0.0);

    assert_eq!(fmu.integrate(0.5, 0.01), 0.5);
    assert_eq!(fmu.time(), 0.5);
    assert_approx_eq!(
        fmu.get_value_by_name::<f64>("x").unwrap(),
        (-0.5f64).exp(),
        1e-8
    );
}

#[test_log::test]
fn test_first_save_wins() {
    let mut fmu = dahlquist();
    fmu.save_current_state_for_rollback();
    fmu.integrate(1.0, 0.1);
    fmu.save_current_state_for_rollback();

    let snapshot = fmu.rollback_state().unwrap();
    assert_eq!(snapshot.time, 0.0);
    assert_eq!(snapshot.state, vec![1.0]);

    fmu.release_rollback_state();
    assert!(fmu.rollback_state().is_none());
    fmu.integrate(1.5, 0.1);
    assert_eq!(fmu.rollback_state().unwrap().time, 1.0);
}

#[test_log::test]
fn test_rollback_across_event() {
    let mut fmu = RollbackFmu::with_integrator(BouncingBall::new(), IntegratorType::RungeKutta4);
    fmu.instantiate("ball", false).unwrap();
    fmu.initialize().unwrap();

    let t = fmu.integrate(1.0, 0.01);
    assert!(t < 1.0);
    assert!(fmu.state_event_flag());

    assert_eq!(fmu.integrate(0.3, 0.01), 0.3);
    assert!(!fmu.state_event_flag());
    assert_approx_eq!(
        fmu.get_value_by_name::<f64>("h").unwrap(),
        1.0 - 0.5 * 9.81 * 0.3 * 0.3,
        1e-9
    );
    assert_approx_eq!(fmu.get_value_by_name::<f64>("v").unwrap(), -9.81 * 0.3, 1e-9);
}
