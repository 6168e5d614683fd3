use super::OdeSystem;

const STAGES: usize = 13;

const C: [f64; STAGES] = [
    0.0,
    2.0 / 27.0,
    1.0 / 9.0,
    1.0 / 6.0,
    5.0 / 12.0,
    1.0 / 2.0,
    5.0 / 6.0,
    1.0 / 6.0,
    2.0 / 3.0,
    1.0 / 3.0,
    1.0,
    0.0,
    1.0,
];

/// Row `i` holds the coefficients for stage `i + 1`.
#[rustfmt::skip]
const A: [&[f64]; STAGES - 1] = [
    &[2.0/27.0],
    &[1.0/36.0, 1.0/12.0],
    &[1.0/24.0, 0.0, 1.0/8.0],
    &[5.0/12.0, 0.0, -25.0/16.0, 25.0/16.0],
    &[1.0/20.0, 0.0, 0.0, 1.0/4.0, 1.0/5.0],
    &[-25.0/108.0, 0.0, 0.0, 125.0/108.0, -65.0/27.0, 125.0/54.0],
    &[31.0/300.0, 0.0, 0.0, 0.0, 61.0/225.0, -2.0/9.0, 13.0/900.0],
    &[2.0, 0.0, 0.0, -53.0/6.0, 704.0/45.0, -107.0/9.0, 67.0/90.0, 3.0],
    &[-91.0/108.0, 0.0, 0.0, 23.0/108.0, -976.0/135.0, 311.0/54.0, -19.0/60.0, 17.0/6.0, -1.0/12.0],
    &[2383.0/4100.0, 0.0, 0.0, -341.0/164.0, 4496.0/1025.0, -301.0/82.0, 2133.0/4100.0, 45.0/82.0, 45.0/164.0, 18.0/41.0],
    &[3.0/205.0, 0.0, 0.0, 0.0, 0.0, -6.0/41.0, -3.0/205.0, -3.0/41.0, 3.0/41.0, 6.0/41.0],
    &[-1777.0/4100.0, 0.0, 0.0, -341.0/164.0, 4496.0/1025.0, -289.0/82.0, 2193.0/4100.0, 51.0/82.0, 33.0/164.0, 12.0/41.0, 0.0, 1.0],
];

/// 8th order weights, used to propagate.
#[rustfmt::skip]
const B8: [f64; STAGES] = [
    0.0, 0.0, 0.0, 0.0, 0.0, 34.0/105.0, 9.0/35.0, 9.0/35.0, 9.0/280.0, 9.0/280.0, 0.0,
    41.0/840.0, 41.0/840.0,
];

const ERR: f64 = 41.0 / 840.0;

/// Runge-Kutta-Fehlberg 7(8) embedded pair with thirteen stages.
#[derive(Debug, Clone, Default)]
pub struct Fehlberg78 {
    k: Vec<Vec<f64>>,
    tmp: Vec<f64>,
}

impl Fehlberg78 {
    pub const ORDER: u32 = 7;

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
        self.tmp.resize(n, 0.0);
        self.k.resize(STAGES, Vec::new());
        for k in &mut self.k {
            k.resize(n, 0.0);
        }

        system.rhs(x, &mut self.k[0], t);
        for stage in 1..STAGES {
            let a = A[stage - 1];
            for i in 0..n {
                let sum: f64 = a.iter().zip(&self.k).map(|(a, k)| a * k[i]).sum();
                self.tmp[i] = x[i] + h * sum;
            }
            system.rhs(&self.tmp, &mut self.k[stage], t + C[stage] * h);
        }

        let k = &self.k;
        for i in 0..n {
            let sum: f64 = B8.iter().zip(k).map(|(b, k)| b * k[i]).sum();
            x_new[i] = x[i] + h * sum;
            x_err[i] = h * ERR * (k[0][i] + k[10][i] - k[11][i] - k[12][i]);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_consistent_tableau() {
        for (stage, row) in A.iter().enumerate() {
            let c: f64 = row.iter().sum();
            assert!((c - C[stage + 1]).abs() < 1e-14, "row {stage}");
        }
        let b: f64 = B8.iter().sum();
        assert!((b - 1.0).abs() < 1e-14);
    }
}
