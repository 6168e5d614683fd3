use std::{collections::HashMap, path::Path, sync::Arc};

use itertools::Itertools;

use super::Fmi1Import;
use crate::Error;

/// Registry of loaded FMUs, keyed by model identifier.
///
/// Loading the same model twice hands out the import that is already registered, so every
/// instance of a model shares one shared library.
#[derive(Debug, Default)]
pub struct ModelManager {
    imports: HashMap<String, Arc<Fmi1Import>>,
}

impl ModelManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the FMU at `path` (an archive or an unpacked directory), or return the registered
    /// import of the same model.
    pub fn load(&mut self, path: impl AsRef<Path>) -> Result<Arc<Fmi1Import>, Error> {
        let import = Fmi1Import::from_path(path)?;
        let model_identifier = import.model_identifier().to_owned();

        if let Some(existing) = self.imports.get(&model_identifier) {
            log::debug!("Model '{model_identifier}' already loaded");
            return Ok(existing.clone());
        }

        log::info!(
            "Loaded model '{model_identifier}' from {:?}",
            import.archive_path()
        );
        let import = Arc::new(import);
        self.imports.insert(model_identifier, import.clone());
        Ok(import)
    }

    pub fn get(&self, model_identifier: &str) -> Option<Arc<Fmi1Import>> {
        self.imports.get(model_identifier).cloned()
    }

    /// Forget a model. Instances still alive keep their library loaded.
    pub fn unload(&mut self, model_identifier: &str) -> bool {
        self.imports.remove(model_identifier).is_some()
    }

    /// Registered model identifiers, sorted.
    pub fn model_identifiers(&self) -> Vec<&str> {
        self.imports.keys().map(String::as_str).sorted().collect()
    }

    pub fn len(&self) -> usize {
        self.imports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.imports.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test_log::test]
    fn test_load_missing_file() {
        let mut manager = ModelManager::new();
        assert!(matches!(
            manager.load("does/not/exist.fmu"),
            Err(Error::Io(_))
        ));
        assert!(manager.is_empty());
        assert!(manager.get("dahlquist").is_none());
        assert!(!manager.unload("dahlquist"));
    }
}
