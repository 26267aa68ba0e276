//! Seam to the host's dialog, progress and notification system
//!
//! The engine never talks to a real dialog layer; it drives this trait. The
//! CLI ships a console implementation, tests script their own.

pub mod console;

pub use console::{ConsoleUi, ReviewMode};

use std::sync::Arc;

use async_trait::async_trait;

use crate::import::review::GamePropertyImportPlan;
use crate::sources::SelectedProperty;

/// Terminal notices surfaced to the user at the end of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportNotice {
    /// The source returned no game records for the property.
    NoDetails,
    /// Matching finished with zero proposed games.
    NoMatchingGames,
    /// The property kind has no configured classification target.
    UnmappedPropertyCategory { kind: String },
    /// The approved plan was committed.
    Applied { updated: usize, skipped: usize },
}

/// Progress reporting for the matching pass; shared across workers.
pub trait ProgressScope: Send + Sync {
    fn tick(&self, done: usize, total: usize, message: &str);
    fn is_cancelled(&self) -> bool;
}

/// Host-dialog seam driven by the assigner.
#[async_trait]
pub trait BulkPropertyUi: Send + Sync {
    /// Ask the user to pick the external property; `None` cancels the run.
    async fn select_property(&self, provider: &str) -> Option<SelectedProperty>;

    /// Present the proposal for review. The implementation may drive the
    /// plan's check toggles before answering; `true` applies the plan.
    async fn review_plan(&self, plan: &mut GamePropertyImportPlan) -> bool;

    fn notify(&self, notice: ImportNotice);

    fn begin_progress(&self, total: usize) -> Arc<dyn ProgressScope>;
}
