use std::collections::VecDeque;

use super::{OdeSystem, RungeKutta4};

/// Number of past derivatives used by the order 5 formulas.
const STEPS: usize = 5;

/// Adams-Bashforth predictor coefficients, newest derivative first, over 720.
const AB5: [f64; STEPS] = [1901.0, -2774.0, 2616.0, -1274.0, 251.0];

/// Adams-Moulton corrector coefficients, predicted derivative first, over 720.
const AM5: [f64; STEPS] = [251.0, 646.0, -264.0, 106.0, -19.0];

/// Adams-Bashforth-Moulton predictor-corrector of order 5.
///
/// Experimental. The derivative history is not carried between passes: every call to
/// [`Self::integrate`] starts over with RK4 steps until enough history is available, and the
/// history is dropped whenever the observer changes the states.
#[derive(Debug, Clone, Default)]
pub struct AdamsBashforthMoulton {
    init: RungeKutta4,
    /// Derivatives at the last accepted points, newest first
    history: VecDeque<Vec<f64>>,
    predicted: Vec<f64>,
    dx: Vec<f64>,
    before_observe: Vec<f64>,
}

impl AdamsBashforthMoulton {
    /// March over `span` with steps of equal size no larger than `dt`.
    pub fn integrate<S: OdeSystem + ?Sized>(
        &mut self,
        system: &mut S,
        x: &mut [f64],
        t0: f64,
        span: f64,
        dt: f64,
    ) -> f64 {
        if span <= 0.0 {
            return t0;
        }
        let n = x.len();
        let steps = if dt > 0.0 {
            ((span / dt) - 1e-9).ceil().max(1.0) as usize
        } else {
            1
        };
        let h = span / steps as f64;
        self.history.clear();
        self.predicted.resize(n, 0.0);
        self.dx.resize(n, 0.0);

        let mut t = t0;
        for step in 1..=steps {
            if system.halted() {
                break;
            }

            let mut f0 = if self.history.len() == STEPS {
                self.history.pop_back().unwrap_or_default()
            } else {
                Vec::new()
            };
            f0.resize(n, 0.0);
            system.rhs(x, &mut f0, t);
            self.history.push_front(f0);

            if self.history.len() < STEPS {
                self.init.do_step(system, x, t, h);
            } else {
                for i in 0..n {
                    let sum: f64 = AB5.iter().zip(&self.history).map(|(c, f)| c * f[i]).sum();
                    self.predicted[i] = x[i] + h / 720.0 * sum;
                }
                system.rhs(&self.predicted, &mut self.dx, t + h);
                for i in 0..n {
                    let sum: f64 = AM5[1..]
                        .iter()
                        .zip(&self.history)
                        .map(|(c, f)| c * f[i])
                        .sum();
                    x[i] += h / 720.0 * (AM5[0] * self.dx[i] + sum);
                }
            }

            t = if step == steps { t0 + span } else { t0 + step as f64 * h };

            self.before_observe.clear();
            self.before_observe.extend_from_slice(x);
            system.observe(x, t);
            if self.before_observe != x {
                self.history.clear();
            }
        }
        t
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::integrator::tests::Decay;

    #[test]
    fn test_decay() {
        let mut sys = Decay { observed: vec![] };
        let mut x = [1.0];
        let t = AdamsBashforthMoulton::default().integrate(&mut sys, &mut x, 0.0, 1.0, 0.01);
        assert_eq!(t, 1.0);
        assert_eq!(sys.observed.len(), 100);
        assert!((x[0] - (-1.0f64).exp()).abs() < 1e-8);
    }
}
