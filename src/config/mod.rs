//! Configuration management
//!
//! Uses XDG-compliant paths:
//! - Config: ~/.config/tagsmith/config.toml

mod paths;

pub use paths::Paths;

use std::collections::HashMap;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tokio::fs;

use crate::import::normalize::DeflateOptions;
use crate::library::ClassificationTarget;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Matching-pass settings
    pub matching: MatchingSettings,

    /// Mapping from source property kind to classification target
    pub targets: HashMap<String, ClassificationTarget>,

    /// Paths configuration
    #[serde(skip)]
    pub paths: Paths,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            matching: MatchingSettings::default(),
            targets: default_targets(),
            paths: Paths::new(),
        }
    }
}

/// Default kind-to-target mapping, extended or overridden per install.
fn default_targets() -> HashMap<String, ClassificationTarget> {
    [
        ("genre", ClassificationTarget::Genre),
        ("theme", ClassificationTarget::Genre),
        ("tag", ClassificationTarget::Tag),
        ("concept", ClassificationTarget::Tag),
        ("trope", ClassificationTarget::Tag),
        ("feature", ClassificationTarget::Feature),
        ("series", ClassificationTarget::Series),
        ("franchise", ClassificationTarget::Series),
        ("group", ClassificationTarget::Series),
        ("category", ClassificationTarget::Category),
        ("developer", ClassificationTarget::Developer),
        ("publisher", ClassificationTarget::Publisher),
    ]
    .into_iter()
    .map(|(kind, target)| (kind.to_string(), target))
    .collect()
}

/// Settings for one matching run. Cloned into an immutable snapshot before
/// the parallel phase begins; workers never read live, mutable settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchingSettings {
    /// Worker cap for the matching pass; 0 derives it from available processors.
    pub max_concurrency: usize,

    /// Strip edition/subtitle markers when comparing titles.
    pub strip_editions: bool,

    /// Leading articles ignored when comparing titles.
    pub articles: Vec<String>,

    /// Append a provider link to each updated game.
    pub add_links: bool,

    /// Optional prefix for created property names (e.g. "[MobyGames] ").
    pub property_name_prefix: Option<String>,
}

impl Default for MatchingSettings {
    fn default() -> Self {
        Self {
            max_concurrency: 0,
            strip_editions: true,
            articles: vec!["the".to_string(), "a".to_string(), "an".to_string()],
            add_links: true,
            property_name_prefix: None,
        }
    }
}

impl MatchingSettings {
    /// Worker cap, always at least 1.
    pub fn effective_concurrency(&self) -> usize {
        if self.max_concurrency > 0 {
            return self.max_concurrency;
        }
        std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1)
    }

    /// Deflation options for the engine. Numeral harmonization is always on
    /// here so the index and the lookups normalize identically.
    pub fn deflate_options(&self) -> DeflateOptions {
        DeflateOptions {
            articles: self.articles.clone(),
            strip_editions: self.strip_editions,
            batch: true,
        }
    }
}

impl Config {
    /// Load configuration from disk, creating the default on first run.
    pub async fn load() -> Result<Self> {
        let paths = Paths::new();
        let config_path = paths.config_file();

        let mut config = if config_path.exists() {
            let content = fs::read_to_string(&config_path)
                .await
                .context("Failed to read config file")?;
            toml::from_str(&content).context("Failed to parse config file")?
        } else {
            let config = Config::default();
            config.save().await?;
            config
        };

        config.paths = paths;
        Ok(config)
    }

    /// Save configuration to disk
    pub async fn save(&self) -> Result<()> {
        let config_path = self.paths.config_file();

        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)
                .await
                .context("Failed to create config directory")?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(&config_path, content)
            .await
            .context("Failed to write config file")?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn effective_concurrency_is_never_zero() {
        let settings = MatchingSettings {
            max_concurrency: 0,
            ..Default::default()
        };
        assert!(settings.effective_concurrency() >= 1);

        let pinned = MatchingSettings {
            max_concurrency: 4,
            ..Default::default()
        };
        assert_eq!(pinned.effective_concurrency(), 4);
    }

    #[test]
    fn engine_deflate_options_always_use_batch_mode() {
        let settings = MatchingSettings::default();
        assert!(settings.deflate_options().batch);
    }

    #[test]
    fn default_targets_cover_the_common_kinds() {
        let config = Config::default();
        assert_eq!(
            config.targets.get("genre"),
            Some(&ClassificationTarget::Genre)
        );
        assert_eq!(
            config.targets.get("concept"),
            Some(&ClassificationTarget::Tag)
        );
        assert_eq!(
            config.targets.get("franchise"),
            Some(&ClassificationTarget::Series)
        );
    }

    #[test]
    fn config_roundtrips_through_toml() {
        let config = Config::default();
        let raw = toml::to_string_pretty(&config).unwrap();
        let parsed: Config = toml::from_str(&raw).unwrap();
        assert_eq!(
            parsed.matching.strip_editions,
            config.matching.strip_editions
        );
        assert_eq!(parsed.targets.len(), config.targets.len());
    }
}
