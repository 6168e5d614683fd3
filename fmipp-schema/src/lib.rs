#![doc=include_str!( "../README.md")]
#![deny(unsafe_code)]
#![deny(clippy::all)]

use std::fmt::Display;

use thiserror::Error;
use yaserde::YaDeserialize;

mod model_description;
mod scalar_variable;
pub mod traits;

pub use model_description::{DefaultExperiment, Fmi1ModelDescription, ModelVariables};
pub use scalar_variable::{
    BooleanType, Causality, IntegerType, RealType, ScalarVariable, StringType, Variability,
};

/// Value reference of a scalar variable, as used by the FMI 1.0 C API.
pub type ValueReference = u32;

/// The major version of the FMI standard
#[derive(Debug, PartialEq, Eq)]
pub enum MajorVersion {
    FMI1,
    FMI2,
    FMI3,
}

impl Display for MajorVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MajorVersion::FMI1 => write!(f, "1.0"),
            MajorVersion::FMI2 => write!(f, "2.0"),
            MajorVersion::FMI3 => write!(f, "3.0"),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
    #[error("Variable {0} not found")]
    VariableNotFound(String),

    #[error(transparent)]
    Semver(#[from] lenient_semver::parser::OwnedError),

    #[error("Unsupported FMI version {0}")]
    UnsupportedVersion(String),

    #[error("Error parsing XML: {0}")]
    XmlParse(String),

    #[error("Error in model: {0}")]
    Model(String),
}

/// Default value for optional XML attributes whose Rust type implements `Default`.
#[inline]
fn default_wrapper<T: Default>() -> T {
    T::default()
}

/// Deserialize a model description from its XML text.
pub fn deserialize<T: YaDeserialize>(xml: &str) -> Result<T, Error> {
    yaserde::de::from_str(xml).map_err(|e| Error::XmlParse(e.to_string()))
}
