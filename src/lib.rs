//! tagsmith - bulk property matching and assignment for game libraries
//!
//! This crate provides the engine behind "apply this external tag/genre/
//! series to every matching game in my library":
//! - External-id cross-referencing over game links (authoritative matches)
//! - Fuzzy title deflation with platform-overlap gating (safe name matches)
//! - A reviewable, checkbox-driven proposal before anything is written
//! - Batched, idempotent library mutation with single-flush notifications

pub const APP_VERSION: &str = "0.2.1";

pub mod config;
pub mod external;
pub mod import;
pub mod library;
pub mod sources;
pub mod ui;

pub use config::Config;
pub use import::{BulkGamePropertyAssigner, ImportOutcome};
