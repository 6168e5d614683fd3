use std::{
    collections::HashMap,
    io::{Read, Seek},
    path::{Path, PathBuf},
    str::FromStr,
    sync::Arc,
};

use fmipp_schema::{traits::FmiModelDescription, MajorVersion};

use super::{binding, schema, Fmi1Instance};
use crate::{Error, ValueReference};

const MODEL_DESCRIPTION: &str = "modelDescription.xml";

/// Where the unpacked FMU lives.
#[derive(Debug)]
enum ArchiveDir {
    /// Extracted by us, removed on drop
    Temp(tempfile::TempDir),
    /// Unpacked by the user
    Path(PathBuf),
}

impl ArchiveDir {
    fn path(&self) -> &Path {
        match self {
            ArchiveDir::Temp(dir) => dir.path(),
            ArchiveDir::Path(path) => path,
        }
    }
}

/// An FMI 1.0 model-exchange FMU: the parsed model description and the resolved function table.
///
/// Shared between all instances of the model through an `Arc`.
pub struct Fmi1Import {
    /// Raw FMI 1.0 bindings. Dropped before the directory holding the library.
    binding: binding::Fmi1Binding,
    /// Parsed raw-schema model description
    model_description: schema::Fmi1ModelDescription,
    value_references: HashMap<String, ValueReference>,
    dir: ArchiveDir,
}

impl std::fmt::Debug for Fmi1Import {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Fmi1Import")
            .field("model_identifier", &self.model_description.model_identifier)
            .field("dir", &self.dir)
            .finish()
    }
}

impl Fmi1Import {
    /// Load an FMU from either a `.fmu` archive or a directory holding an unpacked one.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref();
        if path.is_dir() {
            log::debug!("Opening unpacked FMU {path:?}");
            Self::from_dir(ArchiveDir::Path(path.to_owned()))
        } else {
            log::debug!("Opening FMU file {path:?}");
            Self::new(std::fs::File::open(path)?)
        }
    }

    /// Extract an FMU archive into a temporary directory and load it.
    pub fn new<R: Read + Seek>(reader: R) -> Result<Self, Error> {
        let mut archive = zip::ZipArchive::new(reader)?;
        let temp_dir = tempfile::Builder::new().prefix("fmipp").tempdir()?;
        log::debug!("Extracting into {temp_dir:?}");
        archive.extract(&temp_dir)?;

        for fname in archive.file_names() {
            log::trace!("  - {}", fname);
        }

        Self::from_dir(ArchiveDir::Temp(temp_dir))
    }

    fn from_dir(dir: ArchiveDir) -> Result<Self, Error> {
        let descr_file_path = dir.path().join(MODEL_DESCRIPTION);
        if !descr_file_path.is_file() {
            return Err(Error::ArchiveStructure(format!(
                "missing {MODEL_DESCRIPTION} in {:?}",
                dir.path()
            )));
        }
        let descr_xml = std::fs::read_to_string(descr_file_path)?;
        let model_description = schema::Fmi1ModelDescription::from_str(&descr_xml)?;
        log::debug!(
            "Found FMI {} named '{}'",
            model_description.fmi_version,
            model_description.model_name
        );

        if model_description.major_version()? != MajorVersion::FMI1 {
            return Err(Error::UnsupportedFmiVersion(
                model_description.fmi_version.clone(),
            ));
        }
        model_description.validate()?;

        let model_identifier = &model_description.model_identifier;
        let lib_path = dir.path().join(shared_lib_path(model_identifier)?);
        log::trace!("Loading shared library {lib_path:?}");
        let binding = unsafe { binding::Fmi1Binding::new(&lib_path, model_identifier)? };

        let missing = binding.missing_required();
        if !missing.is_empty() {
            return Err(Error::MissingFunction(
                missing.into_iter().map(str::to_owned).collect(),
            ));
        }
        for name in binding.missing_optional() {
            log::warn!("{model_identifier}: optional function {name} is not available");
        }

        let value_references = model_description
            .get_model_variables()
            .map(|var| (var.name.clone(), var.value_reference))
            .collect();

        Ok(Self {
            binding,
            model_description,
            value_references,
            dir,
        })
    }

    /// Return the path to the extracted FMU
    pub fn archive_path(&self) -> &Path {
        self.dir.path()
    }

    pub fn model_description(&self) -> &schema::Fmi1ModelDescription {
        &self.model_description
    }

    pub fn model_identifier(&self) -> &str {
        &self.model_description.model_identifier
    }

    pub fn binding(&self) -> &binding::Fmi1Binding {
        &self.binding
    }

    pub fn value_reference(&self, name: &str) -> Option<ValueReference> {
        self.value_references.get(name).copied()
    }

    /// A new, uninstantiated model instance.
    pub fn instance(self: &Arc<Self>) -> Fmi1Instance {
        Fmi1Instance::new(self.clone())
    }
}

/// Path of the shared library inside the FMU, for the current platform.
pub fn shared_lib_path(model_identifier: &str) -> Result<PathBuf, Error> {
    let platform_folder = match (std::env::consts::OS, std::env::consts::ARCH) {
        ("windows", "x86_64") => "win64",
        ("windows", "x86") => "win32",
        ("linux", "x86_64") => "linux64",
        ("linux", "x86") => "linux32",
        ("macos", "x86_64") => "darwin64",
        ("macos", "x86") => "darwin32",
        _ => {
            return Err(Error::UnsupportedPlatform {
                os: std::env::consts::OS.to_string(),
                arch: std::env::consts::ARCH.to_string(),
            });
        }
    };
    let fname = format!("{model_identifier}{}", std::env::consts::DLL_SUFFIX);
    Ok(PathBuf::from("binaries").join(platform_folder).join(fname))
}
