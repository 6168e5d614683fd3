use super::OdeSystem;

const C2: f64 = 0.2;
const C3: f64 = 0.3;
const C4: f64 = 0.8;
const C5: f64 = 8.0 / 9.0;

const A21: f64 = 0.2;
const A31: f64 = 3.0 / 40.0;
const A32: f64 = 9.0 / 40.0;
const A41: f64 = 44.0 / 45.0;
const A42: f64 = -56.0 / 15.0;
const A43: f64 = 32.0 / 9.0;
const A51: f64 = 19372.0 / 6561.0;
const A52: f64 = -25360.0 / 2187.0;
const A53: f64 = 64448.0 / 6561.0;
const A54: f64 = -212.0 / 729.0;
const A61: f64 = 9017.0 / 3168.0;
const A62: f64 = -355.0 / 33.0;
const A63: f64 = 46732.0 / 5247.0;
const A64: f64 = 49.0 / 176.0;
const A65: f64 = -5103.0 / 18656.0;
const A71: f64 = 35.0 / 384.0;
const A73: f64 = 500.0 / 1113.0;
const A74: f64 = 125.0 / 192.0;
const A75: f64 = -2187.0 / 6784.0;
const A76: f64 = 11.0 / 84.0;

// difference between the 5th and 4th order solutions
const E1: f64 = 71.0 / 57600.0;
const E3: f64 = -71.0 / 16695.0;
const E4: f64 = 71.0 / 1920.0;
const E5: f64 = -17253.0 / 339200.0;
const E6: f64 = 22.0 / 525.0;
const E7: f64 = -1.0 / 40.0;

/// Dormand-Prince 5(4) embedded Runge-Kutta pair.
#[derive(Debug, Clone, Default)]
pub struct DormandPrince {
    k: [Vec<f64>; 7],
    tmp: Vec<f64>,
}

impl DormandPrince {
    pub const ORDER: u32 = 5;

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
        for k in &mut self.k {
            k.resize(n, 0.0);
        }
        let [k1, k2, k3, k4, k5, k6, k7] = &mut self.k;
        let tmp = &mut self.tmp;

        system.rhs(x, k1, t);
        for i in 0..n {
            tmp[i] = x[i] + h * A21 * k1[i];
        }
        system.rhs(tmp, k2, t + C2 * h);
        for i in 0..n {
            tmp[i] = x[i] + h * (A31 * k1[i] + A32 * k2[i]);
        }
        system.rhs(tmp, k3, t + C3 * h);
        for i in 0..n {
            tmp[i] = x[i] + h * (A41 * k1[i] + A42 * k2[i] + A43 * k3[i]);
        }
        system.rhs(tmp, k4, t + C4 * h);
        for i in 0..n {
            tmp[i] = x[i] + h * (A51 * k1[i] + A52 * k2[i] + A53 * k3[i] + A54 * k4[i]);
        }
        system.rhs(tmp, k5, t + C5 * h);
        for i in 0..n {
            tmp[i] = x[i]
                + h * (A61 * k1[i] + A62 * k2[i] + A63 * k3[i] + A64 * k4[i] + A65 * k5[i]);
        }
        system.rhs(tmp, k6, t + h);
        for i in 0..n {
            x_new[i] = x[i]
                + h * (A71 * k1[i] + A73 * k3[i] + A74 * k4[i] + A75 * k5[i] + A76 * k6[i]);
        }
        system.rhs(x_new, k7, t + h);
        for i in 0..n {
            x_err[i] = h
                * (E1 * k1[i] + E3 * k3[i] + E4 * k4[i] + E5 * k5[i] + E6 * k6[i] + E7 * k7[i]);
        }
    }
}
