use super::OdeSystem;

/// Classical Runge-Kutta method of order 4.
#[derive(Debug, Clone, Default)]
pub struct RungeKutta4 {
    k: [Vec<f64>; 4],
    tmp: Vec<f64>,
}

impl RungeKutta4 {
    pub fn do_step<S: OdeSystem + ?Sized>(&mut self, system: &mut S, x: &mut [f64], t: f64, h: f64) {
        let n = x.len();
        self.tmp.resize(n, 0.0);
        for k in &mut self.k {
            k.resize(n, 0.0);
        }
        let [k1, k2, k3, k4] = &mut self.k;

        system.rhs(x, k1, t);
        for i in 0..n {
            self.tmp[i] = x[i] + 0.5 * h * k1[i];
        }
        system.rhs(&self.tmp, k2, t + 0.5 * h);
        for i in 0..n {
            self.tmp[i] = x[i] + 0.5 * h * k2[i];
        }
        system.rhs(&self.tmp, k3, t + 0.5 * h);
        for i in 0..n {
            self.tmp[i] = x[i] + h * k3[i];
        }
        system.rhs(&self.tmp, k4, t + h);

        for i in 0..n {
            x[i] += h / 6.0 * (k1[i] + 2.0 * k2[i] + 2.0 * k3[i] + k4[i]);
        }
    }
}
