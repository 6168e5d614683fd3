//! Numerical integration of a model's continuous states.
//!
//! An [`Integrator`] advances the states of an [`OdeSystem`] over one span using one of the
//! [`IntegratorType`] algorithms. Fixed-step methods march with the requested step size,
//! error-controlled methods use it as the initial guess only.

use std::{fmt::Display, str::FromStr};

use crate::Error;

mod abm;
mod bulirsch_stoer;
mod dopri5;
mod euler;
mod rk4;
mod rkf78;

pub use abm::AdamsBashforthMoulton;
pub use bulirsch_stoer::BulirschStoer;
pub use dopri5::DormandPrince;
pub use euler::Euler;
pub use rk4::RungeKutta4;
pub use rkf78::Fehlberg78;

/// The system of ordinary differential equations seen by a stepper.
pub trait OdeSystem {
    /// Evaluate the right-hand side `dxdt = f(x, t)`.
    fn rhs(&mut self, x: &[f64], dxdt: &mut [f64], t: f64);

    /// Called once for every accepted step with the new state.
    ///
    /// The system may overwrite `x`, e.g. when an event re-initialized the states.
    fn observe(&mut self, x: &mut [f64], t: f64);

    /// When true, the stepper stops before taking another step.
    fn halted(&self) -> bool {
        false
    }
}

/// Available integration algorithms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum IntegratorType {
    /// Explicit Euler, fixed step.
    Euler,
    /// Classical 4th order Runge-Kutta, fixed step.
    RungeKutta4,
    /// Dormand-Prince 5(4), error controlled.
    #[default]
    DormandPrince,
    /// Runge-Kutta-Fehlberg 7(8), error controlled.
    Fehlberg78,
    /// Bulirsch-Stoer extrapolation, error controlled.
    BulirschStoer,
    /// Adams-Bashforth-Moulton order 5 predictor-corrector.
    ///
    /// Experimental: the multistep history is rebuilt with RK4 on every pass.
    AdamsBashforthMoulton,
}

impl IntegratorType {
    pub const ALL: [IntegratorType; 6] = [
        IntegratorType::Euler,
        IntegratorType::RungeKutta4,
        IntegratorType::DormandPrince,
        IntegratorType::Fehlberg78,
        IntegratorType::BulirschStoer,
        IntegratorType::AdamsBashforthMoulton,
    ];

    /// The short name, as accepted by [`FromStr`].
    pub fn short_name(self) -> &'static str {
        match self {
            IntegratorType::Euler => "eu",
            IntegratorType::RungeKutta4 => "rk",
            IntegratorType::DormandPrince => "dp",
            IntegratorType::Fehlberg78 => "fe",
            IntegratorType::BulirschStoer => "bs",
            IntegratorType::AdamsBashforthMoulton => "abm",
        }
    }

    pub fn is_adaptive(self) -> bool {
        matches!(
            self,
            IntegratorType::DormandPrince
                | IntegratorType::Fehlberg78
                | IntegratorType::BulirschStoer
        )
    }
}

impl Display for IntegratorType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.short_name())
    }
}

impl FromStr for IntegratorType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        IntegratorType::ALL
            .into_iter()
            .find(|ty| ty.short_name() == s)
            .ok_or_else(|| Error::UnknownIntegrator(s.to_owned()))
    }
}

impl TryFrom<u32> for IntegratorType {
    type Error = Error;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        IntegratorType::ALL
            .get(value as usize)
            .copied()
            .ok_or_else(|| Error::UnknownIntegrator(value.to_string()))
    }
}

/// Tuning of the error-controlled steppers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IntegratorSettings {
    pub abs_tol: f64,
    pub rel_tol: f64,
    /// Maximum number of attempted steps per integration pass.
    pub max_steps: usize,
    /// Steps are accepted unconditionally once the step size falls below this.
    pub min_step: f64,
}

impl Default for IntegratorSettings {
    fn default() -> Self {
        Self {
            abs_tol: 1e-6,
            rel_tol: 1e-6,
            max_steps: 100_000,
            min_step: 1e-12,
        }
    }
}

/// One concrete integration algorithm, with its scratch buffers.
#[derive(Debug, Clone)]
pub enum Stepper {
    Euler(Euler),
    RungeKutta4(RungeKutta4),
    DormandPrince(DormandPrince),
    Fehlberg78(Fehlberg78),
    BulirschStoer(BulirschStoer),
    AdamsBashforthMoulton(AdamsBashforthMoulton),
}

impl Stepper {
    pub fn create(ty: IntegratorType) -> Self {
        match ty {
            IntegratorType::Euler => Stepper::Euler(Euler::default()),
            IntegratorType::RungeKutta4 => Stepper::RungeKutta4(RungeKutta4::default()),
            IntegratorType::DormandPrince => Stepper::DormandPrince(DormandPrince::default()),
            IntegratorType::Fehlberg78 => Stepper::Fehlberg78(Fehlberg78::default()),
            IntegratorType::BulirschStoer => Stepper::BulirschStoer(BulirschStoer::default()),
            IntegratorType::AdamsBashforthMoulton => {
                log::warn!("Adams-Bashforth-Moulton stepper is experimental");
                Stepper::AdamsBashforthMoulton(AdamsBashforthMoulton::default())
            }
        }
    }

    pub fn integrator_type(&self) -> IntegratorType {
        match self {
            Stepper::Euler(_) => IntegratorType::Euler,
            Stepper::RungeKutta4(_) => IntegratorType::RungeKutta4,
            Stepper::DormandPrince(_) => IntegratorType::DormandPrince,
            Stepper::Fehlberg78(_) => IntegratorType::Fehlberg78,
            Stepper::BulirschStoer(_) => IntegratorType::BulirschStoer,
            Stepper::AdamsBashforthMoulton(_) => IntegratorType::AdamsBashforthMoulton,
        }
    }

    /// Advance `x` from `t` over `step_size`. Returns the time reached.
    pub fn invoke_method<S: OdeSystem + ?Sized>(
        &mut self,
        system: &mut S,
        x: &mut [f64],
        t: f64,
        step_size: f64,
        dt: f64,
        settings: &IntegratorSettings,
    ) -> f64 {
        match self {
            Stepper::Euler(s) => integrate_const(system, x, t, step_size, dt, |sys, x, t, h| {
                s.do_step(sys, x, t, h)
            }),
            Stepper::RungeKutta4(s) => {
                integrate_const(system, x, t, step_size, dt, |sys, x, t, h| {
                    s.do_step(sys, x, t, h)
                })
            }
            Stepper::DormandPrince(s) => integrate_adaptive(
                system,
                x,
                t,
                step_size,
                dt,
                settings,
                DormandPrince::ORDER,
                |sys, x, t, h, x_new, x_err| s.try_step(sys, x, t, h, x_new, x_err),
            ),
            Stepper::Fehlberg78(s) => integrate_adaptive(
                system,
                x,
                t,
                step_size,
                dt,
                settings,
                Fehlberg78::ORDER,
                |sys, x, t, h, x_new, x_err| s.try_step(sys, x, t, h, x_new, x_err),
            ),
            Stepper::BulirschStoer(s) => integrate_adaptive(
                system,
                x,
                t,
                step_size,
                dt,
                settings,
                BulirschStoer::ORDER,
                |sys, x, t, h, x_new, x_err| s.try_step(sys, x, t, h, x_new, x_err),
            ),
            Stepper::AdamsBashforthMoulton(s) => s.integrate(system, x, t, step_size, dt),
        }
    }
}

/// Drives a [`Stepper`] on behalf of a model.
#[derive(Debug, Clone)]
pub struct Integrator {
    stepper: Stepper,
    settings: IntegratorSettings,
}

impl Default for Integrator {
    fn default() -> Self {
        Self::new(IntegratorType::default())
    }
}

impl Integrator {
    pub fn new(ty: IntegratorType) -> Self {
        Self::with_settings(ty, IntegratorSettings::default())
    }

    pub fn with_settings(ty: IntegratorType, settings: IntegratorSettings) -> Self {
        Self {
            stepper: Stepper::create(ty),
            settings,
        }
    }

    pub fn integrator_type(&self) -> IntegratorType {
        self.stepper.integrator_type()
    }

    pub fn settings(&self) -> &IntegratorSettings {
        &self.settings
    }

    pub fn set_settings(&mut self, settings: IntegratorSettings) {
        self.settings = settings;
    }

    /// Integrate `system` from `t` over `step_size`, with `dt` as the (initial) step size.
    ///
    /// `x` holds the states at `t` on entry and the states at the returned time on exit.
    pub fn integrate<S: OdeSystem + ?Sized>(
        &mut self,
        system: &mut S,
        x: &mut [f64],
        t: f64,
        step_size: f64,
        dt: f64,
    ) -> f64 {
        log::trace!(
            "{} integrating [{t}, {}] with dt = {dt}",
            self.integrator_type(),
            t + step_size
        );
        self.stepper
            .invoke_method(system, x, t, step_size, dt, &self.settings)
    }
}

/// Relative span below which two times are treated as equal.
const TIME_EPS: f64 = 1e-12;

fn reached(t: f64, t_end: f64, span: f64) -> bool {
    t_end - t <= TIME_EPS * span.abs().max(1.0)
}

/// March with constant `dt`, shortening the last step so the pass ends on `t + span`.
fn integrate_const<S, F>(system: &mut S, x: &mut [f64], t0: f64, span: f64, dt: f64, mut step: F) -> f64
where
    S: OdeSystem + ?Sized,
    F: FnMut(&mut S, &mut [f64], f64, f64),
{
    if span <= 0.0 {
        return t0;
    }
    let t_end = t0 + span;
    let dt = if dt > 0.0 { dt.min(span) } else { span };
    let mut t = t0;
    while !reached(t, t_end, span) {
        if system.halted() {
            break;
        }
        let h = dt.min(t_end - t);
        step(&mut *system, &mut *x, t, h);
        t = if reached(t + h, t_end, span) { t_end } else { t + h };
        system.observe(x, t);
    }
    t
}

/// Scaled error of a trial step, `<= 1` means acceptable.
fn error_norm(x: &[f64], x_new: &[f64], x_err: &[f64], settings: &IntegratorSettings) -> f64 {
    x.iter()
        .zip(x_new)
        .zip(x_err)
        .map(|((&x0, &x1), &e)| {
            e.abs() / (settings.abs_tol + settings.rel_tol * x0.abs().max(x1.abs()))
        })
        .fold(0.0, f64::max)
}

/// Error-controlled driver shared by the embedded methods.
///
/// `try_step` writes the candidate state and an error estimate for a step of size `h`.
#[allow(clippy::too_many_arguments)]
fn integrate_adaptive<S, F>(
    system: &mut S,
    x: &mut [f64],
    t0: f64,
    span: f64,
    dt: f64,
    settings: &IntegratorSettings,
    order: u32,
    mut try_step: F,
) -> f64
where
    S: OdeSystem + ?Sized,
    F: FnMut(&mut S, &[f64], f64, f64, &mut [f64], &mut [f64]),
{
    if span <= 0.0 {
        return t0;
    }
    let t_end = t0 + span;
    let mut h = if dt > 0.0 { dt.min(span) } else { span };
    let mut t = t0;
    let mut x_new = vec![0.0; x.len()];
    let mut x_err = vec![0.0; x.len()];
    let grow = -1.0 / f64::from(order + 1);
    let shrink = -1.0 / f64::from(order);

    for _ in 0..settings.max_steps {
        if reached(t, t_end, span) || system.halted() {
            return t;
        }
        let h_try = h.min(t_end - t);
        try_step(&mut *system, &*x, t, h_try, &mut x_new, &mut x_err);
        let err = error_norm(x, &x_new, &x_err, settings);

        if err.is_nan() {
            h = (h_try * 0.2).max(settings.min_step);
            continue;
        }

        if err <= 1.0 || h_try <= settings.min_step {
            t = if reached(t + h_try, t_end, span) { t_end } else { t + h_try };
            x.copy_from_slice(&x_new);
            system.observe(x, t);
            let factor = if err == 0.0 {
                5.0
            } else {
                (0.9 * err.powf(grow)).clamp(0.2, 5.0)
            };
            // a step cut short by the end of the span says nothing about the step size
            h = if h_try < h { h.max(h_try * factor) } else { h_try * factor };
        } else {
            h = (h_try * (0.9 * err.powf(shrink)).max(0.2)).max(settings.min_step);
        }
    }

    log::warn!("Maximum number of {} steps reached at t = {t}", settings.max_steps);
    t
}

#[cfg(test)]
mod tests {
    use super::*;

    /// x' = -x
    pub(crate) struct Decay {
        pub observed: Vec<f64>,
    }

    impl OdeSystem for Decay {
        fn rhs(&mut self, x: &[f64], dxdt: &mut [f64], _t: f64) {
            dxdt[0] = -x[0];
        }

        fn observe(&mut self, _x: &mut [f64], t: f64) {
            self.observed.push(t);
        }
    }

    #[test]
    fn test_parse_short_names() {
        assert_eq!("eu".parse::<IntegratorType>().unwrap(), IntegratorType::Euler);
        assert_eq!("rk".parse::<IntegratorType>().unwrap(), IntegratorType::RungeKutta4);
        assert_eq!("dp".parse::<IntegratorType>().unwrap(), IntegratorType::DormandPrince);
        assert_eq!("fe".parse::<IntegratorType>().unwrap(), IntegratorType::Fehlberg78);
        assert_eq!("bs".parse::<IntegratorType>().unwrap(), IntegratorType::BulirschStoer);
        assert_eq!(
            "abm".parse::<IntegratorType>().unwrap(),
            IntegratorType::AdamsBashforthMoulton
        );
        assert!(matches!(
            "rk45".parse::<IntegratorType>(),
            Err(Error::UnknownIntegrator(name)) if name == "rk45"
        ));
        assert!(IntegratorType::try_from(6).is_err());
        assert_eq!(IntegratorType::try_from(1).unwrap(), IntegratorType::RungeKutta4);
    }

    #[test]
    fn test_fixed_step_lands_on_end() {
        let mut sys = Decay { observed: vec![] };
        let mut x = [1.0];
        let mut integrator = Integrator::new(IntegratorType::Euler);
        let t = integrator.integrate(&mut sys, &mut x, 0.0, 1.0, 0.3);
        assert_eq!(t, 1.0);
        assert_eq!(sys.observed.len(), 4);
        assert_eq!(*sys.observed.last().unwrap(), 1.0);
    }

    #[test]
    fn test_adaptive_grows_step() {
        let mut sys = Decay { observed: vec![] };
        let mut x = [1.0];
        let mut integrator = Integrator::new(IntegratorType::DormandPrince);
        let t = integrator.integrate(&mut sys, &mut x, 0.0, 1.0, 1e-4);
        assert_eq!(t, 1.0);
        // far fewer steps than a fixed 1e-4 grid would take
        assert!(sys.observed.len() < 100);
        assert!((x[0] - (-1.0f64).exp()).abs() < 1e-5);
    }

    #[test]
    fn test_empty_span() {
        let mut sys = Decay { observed: vec![] };
        let mut x = [1.0];
        let t = Integrator::default().integrate(&mut sys, &mut x, 2.0, 0.0, 0.1);
        assert_eq!(t, 2.0);
        assert!(sys.observed.is_empty());
        assert_eq!(x[0], 1.0);
    }
}
