use std::sync::Arc;

use crate::FmiStatus;

type LogFn = dyn Fn(&str, FmiStatus, &str, &str) + Send + Sync;

/// Logging callback of an [`crate::Fmu`].
///
/// Receives `(instance_name, status, category, message)`. The default forwards to the `log`
/// crate with the instance name as target, the same way messages from FMU binaries are routed.
#[derive(Clone)]
pub struct Logger(Arc<LogFn>);

impl Logger {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&str, FmiStatus, &str, &str) + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    #[inline]
    pub fn log(&self, instance_name: &str, status: FmiStatus, category: &str, message: &str) {
        (self.0)(instance_name, status, category, message)
    }
}

fn log_record(instance_name: &str, status: FmiStatus, category: &str, message: &str) {
    log::logger().log(
        &log::Record::builder()
            .args(format_args!("[{category}] {message}"))
            .level(status.level())
            .module_path(Some(module_path!()))
            .target(instance_name)
            .build(),
    );
}

impl Default for Logger {
    fn default() -> Self {
        Self::new(log_record)
    }
}

impl std::fmt::Debug for Logger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Logger(..)")
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    #[test]
    fn test_custom_logger() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let logger = Logger::new(move |name, status, category, msg| {
            sink.lock()
                .unwrap()
                .push(format!("{name}:{status}:{category}:{msg}"));
        });
        logger.log("inst", FmiStatus::Warning, "event", "not converged");
        assert_eq!(
            seen.lock().unwrap().as_slice(),
            ["inst:fmiWarning:event:not converged"]
        );
    }
}
