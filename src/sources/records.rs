//! JSON-file-backed property source, used by the CLI driver and tests

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::Result;
use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;

use super::{ExternalGameRecord, PropertySource, SelectedProperty};
use crate::external::ExternalDatabase;
use crate::library::ClassificationTarget;

/// Failure decoding a records file.
#[derive(Debug, Error)]
pub enum RecordsError {
    #[error("failed to read records file {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid records file {path}")]
    Decode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// On-disk shape: an optional embedded property plus its game records.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RecordsFile {
    property: Option<SelectedProperty>,
    records: Vec<ExternalGameRecord>,
}

/// A property source backed by a records file on disk.
pub struct FileSource {
    path: PathBuf,
    database: ExternalDatabase,
    provider_name: String,
    targets: HashMap<String, ClassificationTarget>,
}

impl FileSource {
    pub fn new(
        path: impl Into<PathBuf>,
        database: ExternalDatabase,
        targets: HashMap<String, ClassificationTarget>,
    ) -> Self {
        Self {
            path: path.into(),
            database,
            provider_name: database.label().to_string(),
            targets,
        }
    }

    fn load(path: &Path) -> Result<RecordsFile, RecordsError> {
        let raw = std::fs::read_to_string(path).map_err(|source| RecordsError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&raw).map_err(|source| RecordsError::Decode {
            path: path.to_path_buf(),
            source,
        })
    }

    /// The property embedded in the records file, if any.
    pub fn embedded_property(&self) -> Result<Option<SelectedProperty>, RecordsError> {
        Ok(Self::load(&self.path)?.property)
    }
}

#[async_trait]
impl PropertySource for FileSource {
    fn external_database(&self) -> ExternalDatabase {
        self.database
    }

    fn provider_name(&self) -> &str {
        &self.provider_name
    }

    fn import_target(&self, property: &SelectedProperty) -> Option<ClassificationTarget> {
        self.targets.get(&property.kind.trim().to_lowercase()).copied()
    }

    async fn get_details(&self, _property: &SelectedProperty) -> Result<Vec<ExternalGameRecord>> {
        let file = Self::load(&self.path)?;
        Ok(file.records)
    }
}
