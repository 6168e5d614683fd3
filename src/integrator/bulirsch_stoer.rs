use super::OdeSystem;

/// Number of extrapolation levels.
const LEVELS: usize = 6;

/// Substep counts of the modified midpoint sequence, `n_k = 2(k + 1)`.
const fn substeps(k: usize) -> usize {
    2 * (k + 1)
}

/// Bulirsch-Stoer: modified midpoint steps with polynomial extrapolation in `h^2`.
///
/// The error estimate is the difference between the two most accurate entries of the last row
/// of the extrapolation table.
#[derive(Debug, Clone, Default)]
pub struct BulirschStoer {
    /// Extrapolation table, `table[k][j]`
    table: Vec<Vec<Vec<f64>>>,
    dx0: Vec<f64>,
    dx: Vec<f64>,
    z0: Vec<f64>,
    z1: Vec<f64>,
}

impl BulirschStoer {
    pub const ORDER: u32 = 2 * LEVELS as u32 - 2;

    pub fn try_step<S: OdeSystem + ?Sized>(
        &mut self,
        system: &mut S,
        x: &[f64],
        t: f64,
        h: f64,
        x_new: &mut [f64],
        x_err: &mut [f64],
    ) {
        let n = x.len();
        self.dx0.resize(n, 0.0);
        self.table.resize(LEVELS, Vec::new());
        for row in &mut self.table {
            row.resize(LEVELS, Vec::new());
            for entry in row.iter_mut() {
                entry.resize(n, 0.0);
            }
        }

        system.rhs(x, &mut self.dx0, t);

        for k in 0..LEVELS {
            let mut result = std::mem::take(&mut self.table[k][0]);
            self.modified_midpoint(system, x, t, h, substeps(k), &mut result);
            self.table[k][0] = result;

            for j in 1..=k {
                let ratio = substeps(k) as f64 / substeps(k - j) as f64;
                let denom = ratio * ratio - 1.0;
                for i in 0..n {
                    let a = self.table[k][j - 1][i];
                    let b = self.table[k - 1][j - 1][i];
                    self.table[k][j][i] = a + (a - b) / denom;
                }
            }
        }

        let last = &self.table[LEVELS - 1];
        for i in 0..n {
            x_new[i] = last[LEVELS - 1][i];
            x_err[i] = last[LEVELS - 1][i] - last[LEVELS - 2][i];
        }
    }

    fn modified_midpoint<S: OdeSystem + ?Sized>(
        &mut self,
        system: &mut S,
        x: &[f64],
        t: f64,
        big_h: f64,
        steps: usize,
        out: &mut [f64],
    ) {
        let n = x.len();
        let h = big_h / steps as f64;
        self.dx.resize(n, 0.0);
        self.z0.clear();
        self.z0.extend_from_slice(x);
        self.z1.resize(n, 0.0);
        for i in 0..n {
            self.z1[i] = x[i] + h * self.dx0[i];
        }

        for m in 1..steps {
            system.rhs(&self.z1, &mut self.dx, t + m as f64 * h);
            for i in 0..n {
                let z2 = self.z0[i] + 2.0 * h * self.dx[i];
                self.z0[i] = self.z1[i];
                self.z1[i] = z2;
            }
        }

        system.rhs(&self.z1, &mut self.dx, t + big_h);
        for i in 0..n {
            out[i] = 0.5 * (self.z0[i] + self.z1[i] + h * self.dx[i]);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::integrator::tests::Decay;

    #[test]
    fn test_single_step_accuracy() {
        let mut sys = Decay { observed: vec![] };
        let x = [1.0];
        let mut x_new = [0.0];
        let mut x_err = [0.0];
        BulirschStoer::default().try_step(&mut sys, &x, 0.0, 0.5, &mut x_new, &mut x_err);
        assert!((x_new[0] - (-0.5f64).exp()).abs() < 1e-10);
        assert!(x_err[0].abs() < 1e-6);
    }
}
