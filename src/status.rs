use std::fmt::Display;

/// Status returned by every call into a model, and by the hot-path operations built on them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum FmiStatus {
    /// All well
    #[default]
    Ok,
    /// Things are not quite right, but the computation can continue.
    Warning,
    /// The call did not take effect. The caller may retry, for example with a smaller step size
    /// or a different argument.
    Discard,
    /// The instance encountered an error and cannot be used any further.
    Error,
    /// The model computations are irreparably corrupted for all instances.
    Fatal,
}

impl FmiStatus {
    /// `Ok` or `Warning`
    #[inline]
    pub fn is_ok(self) -> bool {
        matches!(self, FmiStatus::Ok | FmiStatus::Warning)
    }

    #[inline]
    pub fn is_error(self) -> bool {
        matches!(self, FmiStatus::Error | FmiStatus::Fatal)
    }

    /// Convert to a `Result`, keeping `Warning` on the success side.
    #[inline]
    pub fn ok(self) -> Result<FmiStatus, FmiStatus> {
        if self.is_ok() {
            Ok(self)
        } else {
            Err(self)
        }
    }

    /// The more severe of two statuses.
    #[inline]
    pub fn worst(self, other: FmiStatus) -> FmiStatus {
        self.max(other)
    }

    pub fn level(self) -> log::Level {
        match self {
            FmiStatus::Ok => log::Level::Info,
            FmiStatus::Warning => log::Level::Warn,
            FmiStatus::Discard => log::Level::Trace,
            FmiStatus::Error | FmiStatus::Fatal => log::Level::Error,
        }
    }
}

impl Display for FmiStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            FmiStatus::Ok => "fmiOK",
            FmiStatus::Warning => "fmiWarning",
            FmiStatus::Discard => "fmiDiscard",
            FmiStatus::Error => "fmiError",
            FmiStatus::Fatal => "fmiFatal",
        };
        f.write_str(s)
    }
}

#[cfg(feature = "fmi1")]
impl From<fmipp_sys::fmi1::fmiStatus> for FmiStatus {
    fn from(status: fmipp_sys::fmi1::fmiStatus) -> Self {
        use fmipp_sys::fmi1 as binding;
        match status {
            binding::fmiStatus_fmiOK => FmiStatus::Ok,
            binding::fmiStatus_fmiWarning => FmiStatus::Warning,
            binding::fmiStatus_fmiDiscard => FmiStatus::Discard,
            binding::fmiStatus_fmiError => FmiStatus::Error,
            _ => FmiStatus::Fatal,
        }
    }
}
