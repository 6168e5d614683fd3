use super::{fmiComponent, fmiStatus, fmiString};

/// Maps an FMI 1.0 status onto a `log` level.
pub fn status_level(status: fmiStatus) -> log::Level {
    match status {
        super::fmiStatus_fmiOK => log::Level::Info,
        super::fmiStatus_fmiWarning => log::Level::Warn,
        super::fmiStatus_fmiDiscard => log::Level::Trace,
        super::fmiStatus_fmiError | super::fmiStatus_fmiFatal => log::Level::Error,
        _ => log::Level::Error,
    }
}

unsafe fn str_or_null<'a>(s: fmiString) -> &'a str {
    if s.is_null() {
        "NULL"
    } else {
        std::ffi::CStr::from_ptr(s).to_str().unwrap_or("NULL")
    }
}

/// This function gets called from logger.c
#[no_mangle]
extern "C" fn fmipp_callback_log(
    _c: fmiComponent,
    instance_name: fmiString,
    status: fmiStatus,
    category: fmiString,
    message: fmiString,
) {
    let instance_name = unsafe { str_or_null(instance_name) };
    let category = unsafe { str_or_null(category) };
    let message = unsafe { str_or_null(message) };

    log::logger().log(
        &log::Record::builder()
            .args(format_args!("[{category}] {message}"))
            .level(status_level(status))
            .module_path(Some("logger"))
            .target(instance_name)
            .build(),
    );
}

#[link(name = "fmippLogger", kind = "static")]
extern "C" {
    /// Implemented in logger.c.
    /// Note: This can be re-implemented in pure Rust once the `c_variadic` feature stabilizes.
    pub fn fmipp_logger_handler(
        c: fmiComponent,
        instanceName: fmiString,
        status: fmiStatus,
        category: fmiString,
        message: fmiString,
        ...
    );
}
