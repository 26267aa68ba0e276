//! Property sources: the capability seam to metadata plugins
//!
//! A source knows which external database its records belong to, how to map
//! its property categories onto classification targets, and how to resolve a
//! selected property into the game records associated with it. Network or
//! scraping details stay behind this trait.

pub mod records;

pub use records::FileSource;

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::external::{DbId, ExternalDatabase};
use crate::library::{ClassificationTarget, PlatformProperty};

/// External search item chosen by the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectedProperty {
    pub name: String,
    /// Source-side category tag ("genre", "concept", "trope", ...) used to
    /// resolve the classification target.
    pub kind: String,
    #[serde(default)]
    pub url: Option<String>,
}

impl SelectedProperty {
    pub fn new(name: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: kind.into(),
            url: None,
        }
    }
}

/// One externally-known game associated with the property being imported.
///
/// Built fresh per import from a source response and immutable afterwards;
/// never persisted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExternalGameRecord {
    /// Database-local identifier within the source's home database.
    pub id: Option<String>,
    /// Display names, primary first.
    pub names: Vec<String>,
    /// Canonical detail-page URL; also an id-extraction source when `id` is absent.
    pub url: Option<String>,
    /// Pre-resolved cross-references into other databases.
    pub external_ids: Vec<DbId>,
    /// Platforms narrowing which local games can match by name.
    pub platforms: Vec<PlatformProperty>,
}

impl ExternalGameRecord {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            names: vec![name.into()],
            ..Default::default()
        }
    }

    pub fn display_name(&self) -> &str {
        self.names
            .iter()
            .find(|n| !n.trim().is_empty())
            .map(String::as_str)
            .unwrap_or("<unnamed>")
    }

    /// Every id derivable from this record: its own id (or one extracted from
    /// its URL) within the home database, plus pre-resolved cross-references.
    pub fn derived_ids(&self, home: ExternalDatabase) -> Vec<DbId> {
        let mut ids: Vec<DbId> = Vec::new();
        if let Some(raw) = self
            .id
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
        {
            ids.push(home.id(raw));
        } else if let Some(url) = self.url.as_deref() {
            if let Some(db_id) = DbId::from_any_url(url) {
                ids.push(db_id);
            }
        }
        for db_id in &self.external_ids {
            if !ids.contains(db_id) {
                ids.push(db_id.clone());
            }
        }
        ids
    }
}

/// Capability interface implemented once per metadata source.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PropertySource: Send + Sync {
    /// Database this source's record ids belong to.
    fn external_database(&self) -> ExternalDatabase;

    /// Label used for links and notifications.
    fn provider_name(&self) -> &str;

    /// Classification target for a property kind; `None` when the kind has no
    /// configured mapping.
    fn import_target(&self, property: &SelectedProperty) -> Option<ClassificationTarget>;

    /// Resolve the selected property into its associated game records.
    async fn get_details(&self, property: &SelectedProperty) -> Result<Vec<ExternalGameRecord>>;
}
