use super::*;

macro_rules! fmi1_binding {
    ($($(#[$required:ident])? $name:ident: $ty:ident,)*) => {
        /// Function table of one FMI 1.0 model-exchange shared library.
        ///
        /// Every entry is resolved as `<modelIdentifier>_<name>`. Entries the library does not
        /// export hold the `libloading` error instead of a function pointer.
        pub struct Fmi1Binding {
            __library: ::libloading::Library,
            $(pub $name: Result<$ty, ::libloading::Error>,)*
        }

        impl Fmi1Binding {
            /// Load the shared library at `path` and resolve its entry points.
            ///
            /// # Safety
            /// Loading a library runs its initialisation routines, see [`libloading::Library::new`].
            pub unsafe fn new<P>(path: P, model_identifier: &str) -> Result<Self, ::libloading::Error>
            where
                P: AsRef<::std::ffi::OsStr>,
            {
                let library = ::libloading::Library::new(path)?;
                Self::from_library(library, model_identifier)
            }

            /// # Safety
            /// The symbols found in `library` must have the FMI 1.0 signatures.
            pub unsafe fn from_library<L>(
                library: L,
                model_identifier: &str,
            ) -> Result<Self, ::libloading::Error>
            where
                L: Into<::libloading::Library>,
            {
                let __library = library.into();
                $(let $name = load::<$ty>(&__library, model_identifier, stringify!($name));)*
                Ok(Fmi1Binding {
                    __library,
                    $($name,)*
                })
            }

            /// Names of the required entry points the library does not export.
            pub fn missing_required(&self) -> Vec<&'static str> {
                let mut missing = Vec::new();
                $(fmi1_binding!(@check self, missing, $name $(, $required)?);)*
                missing
            }

            /// Names of the optional entry points the library does not export.
            pub fn missing_optional(&self) -> Vec<&'static str> {
                let mut missing = Vec::new();
                $(fmi1_binding!(@check_optional self, missing, $name $(, $required)?);)*
                missing
            }
        }
    };

    (@check $self:ident, $missing:ident, $name:ident, required) => {
        if $self.$name.is_err() {
            $missing.push(stringify!($name));
        }
    };
    (@check $self:ident, $missing:ident, $name:ident) => {};
    (@check_optional $self:ident, $missing:ident, $name:ident, required) => {};
    (@check_optional $self:ident, $missing:ident, $name:ident) => {
        if $self.$name.is_err() {
            $missing.push(stringify!($name));
        }
    };
}

unsafe fn load<T: Copy>(
    library: &::libloading::Library,
    model_identifier: &str,
    name: &str,
) -> Result<T, ::libloading::Error> {
    let symbol = format!("{model_identifier}_{name}");
    library.get::<T>(symbol.as_bytes()).map(|sym| *sym)
}

fmi1_binding! {
    fmiGetModelTypesPlatform: fmiGetModelTypesPlatformTYPE,
    fmiGetVersion: fmiGetVersionTYPE,
    #[required] fmiInstantiateModel: fmiInstantiateModelTYPE,
    #[required] fmiFreeModelInstance: fmiFreeModelInstanceTYPE,
    fmiSetDebugLogging: fmiSetDebugLoggingTYPE,
    #[required] fmiSetTime: fmiSetTimeTYPE,
    #[required] fmiSetContinuousStates: fmiSetContinuousStatesTYPE,
    #[required] fmiCompletedIntegratorStep: fmiCompletedIntegratorStepTYPE,
    #[required] fmiSetReal: fmiSetRealTYPE,
    fmiSetInteger: fmiSetIntegerTYPE,
    fmiSetBoolean: fmiSetBooleanTYPE,
    fmiSetString: fmiSetStringTYPE,
    #[required] fmiInitialize: fmiInitializeTYPE,
    #[required] fmiGetDerivatives: fmiGetDerivativesTYPE,
    #[required] fmiGetEventIndicators: fmiGetEventIndicatorsTYPE,
    #[required] fmiGetReal: fmiGetRealTYPE,
    fmiGetInteger: fmiGetIntegerTYPE,
    fmiGetBoolean: fmiGetBooleanTYPE,
    fmiGetString: fmiGetStringTYPE,
    #[required] fmiEventUpdate: fmiEventUpdateTYPE,
    #[required] fmiGetContinuousStates: fmiGetContinuousStatesTYPE,
    fmiGetNominalContinuousStates: fmiGetNominalContinuousStatesTYPE,
    fmiGetStateValueReferences: fmiGetStateValueReferencesTYPE,
    fmiTerminate: fmiTerminateTYPE,
}
