//! Small model-exchange models implemented directly against [`fmipp::ModelExchange`].
//!
//! Each model behaves like a well-formed FMI 1.0 model: calls before `instantiate` fail with
//! `Error`, unknown value references fail with `Error` and event iterations converge in one pass.

mod bouncing_ball;
mod dahlquist;
mod feedthrough;
mod stair;

pub use bouncing_ball::BouncingBall;
pub use dahlquist::Dahlquist;
pub use feedthrough::Feedthrough;
pub use stair::Stair;

use fmipp::{FmiStatus, ValueReference};

/// Runs `f` on every `(vr, value)` pair, stopping at the first failure.
pub(crate) fn for_each_value<T>(
    vrs: &[ValueReference],
    values: &[T],
    mut f: impl FnMut(ValueReference, &T) -> FmiStatus,
) -> FmiStatus {
    if vrs.len() != values.len() {
        return FmiStatus::Error;
    }
    for (&vr, value) in vrs.iter().zip(values) {
        let status = f(vr, value);
        if !status.is_ok() {
            return status;
        }
    }
    FmiStatus::Ok
}

/// Fills `values` from `f`, stopping at the first unknown value reference.
pub(crate) fn fill_values<T>(
    vrs: &[ValueReference],
    values: &mut [T],
    mut f: impl FnMut(ValueReference) -> Option<T>,
) -> FmiStatus {
    if vrs.len() != values.len() {
        return FmiStatus::Error;
    }
    for (&vr, value) in vrs.iter().zip(values.iter_mut()) {
        match f(vr) {
            Some(v) => *value = v,
            None => {
                log::error!("Unknown value reference {vr}");
                return FmiStatus::Error;
            }
        }
    }
    FmiStatus::Ok
}

pub(crate) fn copy_into(dst: &mut [f64], src: &[f64]) -> FmiStatus {
    if dst.len() != src.len() {
        return FmiStatus::Error;
    }
    dst.copy_from_slice(src);
    FmiStatus::Ok
}
