use crate::{FmiStatus, ModelExchange, ValueReference};

/// Scalar types that can be read from and written to a model.
pub trait FmiValue: Sized + Clone + Default {
    fn set_values<M: ModelExchange + ?Sized>(
        model: &mut M,
        vrs: &[ValueReference],
        values: &[Self],
    ) -> FmiStatus;

    fn get_values<M: ModelExchange + ?Sized>(
        model: &mut M,
        vrs: &[ValueReference],
        values: &mut [Self],
    ) -> FmiStatus;
}

macro_rules! impl_fmi_value {
    ($ty:ty, $set:ident, $get:ident) => {
        impl FmiValue for $ty {
            #[inline]
            fn set_values<M: ModelExchange + ?Sized>(
                model: &mut M,
                vrs: &[ValueReference],
                values: &[Self],
            ) -> FmiStatus {
                model.$set(vrs, values)
            }

            #[inline]
            fn get_values<M: ModelExchange + ?Sized>(
                model: &mut M,
                vrs: &[ValueReference],
                values: &mut [Self],
            ) -> FmiStatus {
                model.$get(vrs, values)
            }
        }
    };
}

impl_fmi_value!(f64, set_real, get_real);
impl_fmi_value!(i32, set_integer, get_integer);
impl_fmi_value!(bool, set_boolean, get_boolean);
impl_fmi_value!(String, set_string, get_string);
