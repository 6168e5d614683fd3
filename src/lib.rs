//! The `fmipp` crate drives FMI 1.0 model-exchange FMUs: it integrates their continuous states
//! with a choice of ODE steppers, runs the FMI event-update protocol, predicts future states
//! ahead of a master algorithm and rolls an instance back to a saved state.
//!
//! The building blocks, bottom-up:
//!
//! * [`ModelExchange`]: the foreign model interface, implemented for shared-library FMUs by
//!   [`fmi1::Fmi1Instance`].
//! * [`Fmu`]: owns one model instance, its event state and an [`Integrator`].
//! * [`RollbackFmu`]: an [`Fmu`] that can integrate backwards to a saved snapshot.
//! * [`IncrementalFmu`]: look-ahead prediction on top of either of them.
//!
//! ## Examples
//!
//! ```rust,no_run
//! use fmipp::{fmi1::ModelManager, Fmu, IntegratorType};
//!
//! let mut manager = ModelManager::new();
//! let import = manager.load("path/to/bouncingBall.fmu").unwrap();
//!
//! let mut fmu = Fmu::with_integrator(import.instance(), IntegratorType::RungeKutta4);
//! fmu.instantiate("ball", false).unwrap();
//! fmu.initialize().unwrap();
//!
//! let t = fmu.integrate(1.0, 1e-3);
//! println!("stopped at {t}, h = {:?}", fmu.get_value_by_name::<f64>("h"));
//! ```
//!
//! ## Feature flags
#![doc = document_features::document_features!()]
#![deny(clippy::all)]

// Re-export the fmipp-schema crate
pub use fmipp_schema as schema;

mod event_info;
#[cfg(feature = "fmi1")]
pub mod fmi1;
mod fmu;
pub mod history;
mod incremental;
pub mod integrator;
mod logger;
mod rollback;
mod status;
pub mod traits;
mod value;

pub use event_info::EventInfo;
pub use fmu::{EventMode, Fmu};
pub use history::{History, HistoryEntry, INVALID_TIME};
pub use incremental::{DefaultEventPolicy, EventPolicy, IncrementalFmu, LookAheadParams};
pub use integrator::{Integrator, IntegratorSettings, IntegratorType, OdeSystem};
pub use logger::Logger;
pub use rollback::RollbackFmu;
pub use status::FmiStatus;
pub use traits::{ModelExchange, ModelWrapper, ValueReference};
pub use value::FmiValue;

pub mod built_info {
    // The file has been placed there by the build script.
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Error instantiating model: {0}")]
    Instantiation(FmiStatus),

    #[error("Error initializing model: {0}")]
    Initialization(FmiStatus),

    #[error("Instance has not been instantiated")]
    NotInstantiated,

    #[error("Unknown variable: {}", name)]
    UnknownVariable { name: String },

    #[error("Unknown integrator type: {0}")]
    UnknownIntegrator(String),

    #[error("Unsupported platform {os}/{arch}")]
    UnsupportedPlatform { os: String, arch: String },

    #[error("Unsupported FMI version: {0}")]
    UnsupportedFmiVersion(String),

    #[error("FMU archive structure is not as expected: {0}")]
    ArchiveStructure(String),

    #[error("Shared library does not export required functions: {0:?}")]
    MissingFunction(Vec<String>),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[cfg(feature = "fmi1")]
    #[error(transparent)]
    Zip(#[from] zip::result::ZipError),

    #[error(transparent)]
    Schema(#[from] fmipp_schema::Error),

    #[cfg(feature = "fmi1")]
    #[error(transparent)]
    LibLoading {
        #[from]
        source: libloading::Error,
    },
}
