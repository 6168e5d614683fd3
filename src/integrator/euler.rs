use super::OdeSystem;

/// Explicit Euler
#[derive(Debug, Clone, Default)]
pub struct Euler {
    /// Derivatives of continuous states
    dx: Vec<f64>,
}

impl Euler {
    pub fn do_step<S: OdeSystem + ?Sized>(&mut self, system: &mut S, x: &mut [f64], t: f64, h: f64) {
        self.dx.resize(x.len(), 0.0);
        system.rhs(x, &mut self.dx, t);
        for (xi, dxi) in x.iter_mut().zip(&self.dx) {
            *xi += h * dxi;
        }
    }
}
