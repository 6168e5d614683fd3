//! FMI 1.0 model-exchange FMUs loaded from shared libraries.

mod import;
mod instance;
mod manager;

pub use fmipp_schema as schema;
pub use fmipp_sys::fmi1 as binding;
pub use import::Fmi1Import;
pub use instance::Fmi1Instance;
pub use manager::ModelManager;

#[repr(C)]
#[derive(Debug, Copy, Clone)]
pub struct CallbackFunctions {
    pub logger: binding::fmiCallbackLogger,
    pub allocate_memory: binding::fmiCallbackAllocateMemory,
    pub free_memory: binding::fmiCallbackFreeMemory,
}

impl Default for CallbackFunctions {
    fn default() -> Self {
        CallbackFunctions {
            logger: Some(binding::logger::fmipp_logger_handler as _),
            allocate_memory: Some(libc::calloc),
            free_memory: Some(libc::free),
        }
    }
}

impl From<CallbackFunctions> for binding::fmiCallbackFunctions {
    fn from(functions: CallbackFunctions) -> Self {
        binding::fmiCallbackFunctions {
            logger: functions.logger,
            allocateMemory: functions.allocate_memory,
            freeMemory: functions.free_memory,
        }
    }
}
