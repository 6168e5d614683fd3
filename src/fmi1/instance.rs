use std::{
    ffi::{CStr, CString},
    sync::Arc,
};

use super::{binding, CallbackFunctions, Fmi1Import};
use crate::{EventInfo, FmiStatus, ModelExchange, ValueReference};

/// Calls an entry point of the binding on the instance's component.
///
/// Answers `Error` without an instantiated component, `Discard` if the library does not export
/// the function.
macro_rules! ffi_call {
    ($self:ident . $func:ident ( $($arg:expr),* $(,)? )) => {{
        match (&$self.import.binding().$func, $self.component()) {
            (_, Err(status)) => status,
            (Err(_), _) => FmiStatus::Discard,
            (Ok(func), Ok(component)) => FmiStatus::from(unsafe { func(component, $($arg),*) }),
        }
    }};
}

/// One instance of an FMI 1.0 shared-library model.
///
/// Created uninstantiated by [`Fmi1Import::instance`]; the component exists between
/// [`ModelExchange::instantiate`] and drop.
pub struct Fmi1Instance {
    import: Arc<Fmi1Import>,
    /// Pointer to the raw FMI 1.0 instance, null until instantiated
    component: binding::fmiComponent,
    /// Kept alive as long as the component refers to them
    name: CString,
    guid: CString,
    initialized: bool,
}

impl std::fmt::Debug for Fmi1Instance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Fmi1Instance")
            .field("model_identifier", &self.import.model_identifier())
            .field("name", &self.name)
            .field("component", &self.component)
            .field("initialized", &self.initialized)
            .finish()
    }
}

impl Drop for Fmi1Instance {
    fn drop(&mut self) {
        self.free();
    }
}

impl Clone for Fmi1Instance {
    /// A fresh, uninstantiated instance of the same model.
    fn clone(&self) -> Self {
        Self::new(self.import.clone())
    }
}

impl Fmi1Instance {
    pub(super) fn new(import: Arc<Fmi1Import>) -> Self {
        Self {
            import,
            component: std::ptr::null_mut(),
            name: CString::default(),
            guid: CString::default(),
            initialized: false,
        }
    }

    pub fn import(&self) -> &Arc<Fmi1Import> {
        &self.import
    }

    pub fn is_instantiated(&self) -> bool {
        !self.component.is_null()
    }

    /// The `fmiModelTypesPlatform` string of the library, empty if not exported.
    pub fn get_types_platform(&self) -> &str {
        match &self.import.binding().fmiGetModelTypesPlatform {
            Ok(func) => unsafe { cstr_or_empty(func()) },
            Err(_) => "",
        }
    }

    fn component(&self) -> Result<binding::fmiComponent, FmiStatus> {
        if self.component.is_null() {
            log::error!(
                "{}: model is not instantiated",
                self.import.model_identifier()
            );
            Err(FmiStatus::Error)
        } else {
            Ok(self.component)
        }
    }

    fn free(&mut self) {
        if self.component.is_null() {
            return;
        }
        if self.initialized {
            self.terminate();
        }
        log::trace!("Freeing component {:?}", self.component);
        if let Ok(free) = &self.import.binding().fmiFreeModelInstance {
            unsafe { free(self.component) };
        }
        self.component = std::ptr::null_mut();
    }
}

/// Borrow a C string owned by the library for as long as `self` lives.
unsafe fn cstr_or_empty<'a>(ptr: *const std::ffi::c_char) -> &'a str {
    if ptr.is_null() {
        ""
    } else {
        CStr::from_ptr(ptr).to_str().unwrap_or_default()
    }
}

fn check_lengths(vrs: &[ValueReference], n_values: usize) -> Result<(), FmiStatus> {
    if vrs.len() == n_values {
        Ok(())
    } else {
        log::error!(
            "{} value references but {n_values} values",
            vrs.len()
        );
        Err(FmiStatus::Error)
    }
}

fn to_fmi_boolean(value: bool) -> binding::fmiBoolean {
    if value {
        binding::fmiTrue
    } else {
        binding::fmiFalse
    }
}

impl ModelExchange for Fmi1Instance {
    fn model_identifier(&self) -> &str {
        self.import.model_identifier()
    }

    fn num_states(&self) -> usize {
        self.import.model_description().num_states()
    }

    fn num_event_indicators(&self) -> usize {
        self.import.model_description().num_event_indicators()
    }

    fn value_reference(&self, name: &str) -> Option<ValueReference> {
        self.import.value_reference(name)
    }

    fn instantiate(&mut self, instance_name: &str, logging_on: bool) -> FmiStatus {
        self.free();
        self.initialized = false;

        let (Ok(name), Ok(guid)) = (
            CString::new(instance_name),
            CString::new(self.import.model_description().guid.as_str()),
        ) else {
            log::error!("Instance name or GUID contains a NUL byte");
            return FmiStatus::Error;
        };

        let Ok(instantiate) = &self.import.binding().fmiInstantiateModel else {
            return FmiStatus::Fatal;
        };

        log::trace!(
            "Instantiating '{instance_name}' of {} ({})",
            self.import.model_identifier(),
            self.get_types_platform()
        );
        let component = unsafe {
            instantiate(
                name.as_ptr(),
                guid.as_ptr(),
                CallbackFunctions::default().into(),
                to_fmi_boolean(logging_on),
            )
        };
        self.name = name;
        self.guid = guid;

        if component.is_null() {
            log::error!("{instance_name}: fmiInstantiateModel returned NULL");
            return FmiStatus::Fatal;
        }
        log::trace!("Created FMI 1.0 ME component {:?}", component);
        self.component = component;
        FmiStatus::Ok
    }

    fn initialize(&mut self, tolerance: Option<f64>, event_info: &mut EventInfo) -> FmiStatus {
        let mut raw = binding::fmiEventInfo::default();
        let status = ffi_call!(self.fmiInitialize(
            to_fmi_boolean(tolerance.is_some()),
            tolerance.unwrap_or(0.0),
            &mut raw
        ));
        *event_info = EventInfo::from(&raw);
        if status < FmiStatus::Error {
            self.initialized = true;
        }
        status
    }

    fn set_time(&mut self, time: f64) -> FmiStatus {
        ffi_call!(self.fmiSetTime(time))
    }

    fn set_continuous_states(&mut self, states: &[f64]) -> FmiStatus {
        ffi_call!(self.fmiSetContinuousStates(states.as_ptr(), states.len()))
    }

    fn get_continuous_states(&mut self, states: &mut [f64]) -> FmiStatus {
        ffi_call!(self.fmiGetContinuousStates(states.as_mut_ptr(), states.len()))
    }

    fn get_nominal_continuous_states(&mut self, nominals: &mut [f64]) -> FmiStatus {
        ffi_call!(self.fmiGetNominalContinuousStates(nominals.as_mut_ptr(), nominals.len()))
    }

    fn get_derivatives(&mut self, derivatives: &mut [f64]) -> FmiStatus {
        ffi_call!(self.fmiGetDerivatives(derivatives.as_mut_ptr(), derivatives.len()))
    }

    fn get_event_indicators(&mut self, indicators: &mut [f64]) -> FmiStatus {
        ffi_call!(self.fmiGetEventIndicators(indicators.as_mut_ptr(), indicators.len()))
    }

    fn completed_integrator_step(&mut self, call_event_update: &mut bool) -> FmiStatus {
        let mut raw = binding::fmiFalse;
        let status = ffi_call!(self.fmiCompletedIntegratorStep(&mut raw));
        *call_event_update = raw != binding::fmiFalse;
        status
    }

    fn event_update(
        &mut self,
        intermediate_results: bool,
        event_info: &mut EventInfo,
    ) -> FmiStatus {
        let mut raw = binding::fmiEventInfo::default();
        let status = ffi_call!(self.fmiEventUpdate(to_fmi_boolean(intermediate_results), &mut raw));
        *event_info = EventInfo::from(&raw);
        status
    }

    fn set_real(&mut self, vrs: &[ValueReference], values: &[f64]) -> FmiStatus {
        if let Err(status) = check_lengths(vrs, values.len()) {
            return status;
        }
        ffi_call!(self.fmiSetReal(vrs.as_ptr(), vrs.len(), values.as_ptr()))
    }

    fn get_real(&mut self, vrs: &[ValueReference], values: &mut [f64]) -> FmiStatus {
        if let Err(status) = check_lengths(vrs, values.len()) {
            return status;
        }
        ffi_call!(self.fmiGetReal(vrs.as_ptr(), vrs.len(), values.as_mut_ptr()))
    }

    fn set_integer(&mut self, vrs: &[ValueReference], values: &[i32]) -> FmiStatus {
        if let Err(status) = check_lengths(vrs, values.len()) {
            return status;
        }
        ffi_call!(self.fmiSetInteger(vrs.as_ptr(), vrs.len(), values.as_ptr()))
    }

    fn get_integer(&mut self, vrs: &[ValueReference], values: &mut [i32]) -> FmiStatus {
        if let Err(status) = check_lengths(vrs, values.len()) {
            return status;
        }
        ffi_call!(self.fmiGetInteger(vrs.as_ptr(), vrs.len(), values.as_mut_ptr()))
    }

    fn set_boolean(&mut self, vrs: &[ValueReference], values: &[bool]) -> FmiStatus {
        if let Err(status) = check_lengths(vrs, values.len()) {
            return status;
        }
        let raw: Vec<_> = values.iter().copied().map(to_fmi_boolean).collect();
        ffi_call!(self.fmiSetBoolean(vrs.as_ptr(), vrs.len(), raw.as_ptr()))
    }

    fn get_boolean(&mut self, vrs: &[ValueReference], values: &mut [bool]) -> FmiStatus {
        if let Err(status) = check_lengths(vrs, values.len()) {
            return status;
        }
        let mut raw = vec![binding::fmiFalse; values.len()];
        let status = ffi_call!(self.fmiGetBoolean(vrs.as_ptr(), vrs.len(), raw.as_mut_ptr()));
        for (value, raw) in values.iter_mut().zip(raw) {
            *value = raw != binding::fmiFalse;
        }
        status
    }

    fn set_string(&mut self, vrs: &[ValueReference], values: &[String]) -> FmiStatus {
        if let Err(status) = check_lengths(vrs, values.len()) {
            return status;
        }
        let Ok(cstrings) = values
            .iter()
            .map(|s| CString::new(s.as_str()))
            .collect::<Result<Vec<_>, _>>()
        else {
            log::error!("String value contains a NUL byte");
            return FmiStatus::Error;
        };
        let ptrs: Vec<_> = cstrings.iter().map(|s| s.as_ptr()).collect();
        ffi_call!(self.fmiSetString(vrs.as_ptr(), vrs.len(), ptrs.as_ptr()))
    }

    fn get_string(&mut self, vrs: &[ValueReference], values: &mut [String]) -> FmiStatus {
        if let Err(status) = check_lengths(vrs, values.len()) {
            return status;
        }
        let mut ptrs: Vec<binding::fmiString> = vec![std::ptr::null(); values.len()];
        let status = ffi_call!(self.fmiGetString(vrs.as_ptr(), vrs.len(), ptrs.as_mut_ptr()));
        if status < FmiStatus::Error {
            for (value, ptr) in values.iter_mut().zip(ptrs) {
                *value = unsafe { cstr_or_empty(ptr) }.to_owned();
            }
        }
        status
    }

    fn terminate(&mut self) -> FmiStatus {
        if !self.initialized {
            return FmiStatus::Ok;
        }
        self.initialized = false;
        ffi_call!(self.fmiTerminate())
    }

    fn set_debug_logging(&mut self, logging_on: bool) -> FmiStatus {
        ffi_call!(self.fmiSetDebugLogging(to_fmi_boolean(logging_on)))
    }

    /// The FMI-standard version string
    fn get_version(&self) -> &str {
        match &self.import.binding().fmiGetVersion {
            Ok(func) => unsafe { cstr_or_empty(func()) },
            Err(_) => &self.import.model_description().fmi_version,
        }
    }
}
