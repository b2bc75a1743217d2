//! In-memory fallback dataset used when the remote catalog is unreachable.

use std::collections::HashSet;
use std::path::Path;

use bazaar_core::{CatalogEntity, CatalogKind};
use serde::{Deserialize, Serialize};

use crate::error::CatalogError;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogDataset {
    #[serde(default)]
    pub studios: Vec<CatalogEntity>,
    #[serde(default)]
    pub materials: Vec<CatalogEntity>,
}

impl CatalogDataset {
    #[must_use]
    pub fn entities(&self, kind: CatalogKind) -> &[CatalogEntity] {
        match kind {
            CatalogKind::Studios => &self.studios,
            CatalogKind::Materials => &self.materials,
        }
    }

    /// Loads and validates a dataset file. Files ending in `.json` are read
    /// as JSON, everything else as YAML.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::DatasetIo`] if the file cannot be read,
    /// [`CatalogError::DatasetParse`] if it does not parse, or
    /// [`CatalogError::DatasetValidation`] if it fails validation.
    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let content = std::fs::read_to_string(path).map_err(|e| CatalogError::DatasetIo {
            path: path.display().to_string(),
            source: e,
        })?;

        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        let dataset: Self = if is_json {
            serde_json::from_str(&content).map_err(|e| CatalogError::DatasetParse {
                path: path.display().to_string(),
                reason: e.to_string(),
            })?
        } else {
            serde_yaml::from_str(&content).map_err(|e| CatalogError::DatasetParse {
                path: path.display().to_string(),
                reason: e.to_string(),
            })?
        };

        dataset.validate()?;
        tracing::debug!(
            path = %path.display(),
            studios = dataset.studios.len(),
            materials = dataset.materials.len(),
            "loaded catalog dataset"
        );
        Ok(dataset)
    }

    /// Checks that every entity has a non-blank id, unique within its kind.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::DatasetValidation`] on the first violation.
    pub fn validate(&self) -> Result<(), CatalogError> {
        for kind in [CatalogKind::Studios, CatalogKind::Materials] {
            let mut seen = HashSet::new();
            for entity in self.entities(kind) {
                let id = entity.id.trim();
                if id.is_empty() {
                    return Err(CatalogError::DatasetValidation(format!(
                        "{kind} entity \"{}\" has an empty id",
                        entity.title
                    )));
                }
                if !seen.insert(id) {
                    return Err(CatalogError::DatasetValidation(format!(
                        "duplicate {kind} id: '{id}'"
                    )));
                }
            }
        }
        Ok(())
    }
}
