//! Console implementation of the host-UI seam

use std::io::{self, BufRead, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use indicatif::{ProgressBar, ProgressStyle};

use super::{BulkPropertyUi, ImportNotice, ProgressScope};
use crate::import::review::GamePropertyImportPlan;
use crate::library::PlatformProperty;
use crate::sources::SelectedProperty;

/// How the console answers the review step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewMode {
    /// Print the plan and decline it (dry run).
    Preview,
    /// Print the plan and ask y/n on stdin.
    Prompt,
    /// Print the plan and approve it.
    AutoApprove,
}

pub struct ConsoleUi {
    property: SelectedProperty,
    mode: ReviewMode,
}

impl ConsoleUi {
    pub fn new(property: SelectedProperty, mode: ReviewMode) -> Self {
        Self { property, mode }
    }

    fn print_plan(plan: &GamePropertyImportPlan) {
        println!(
            "\n{} \"{}\" -> {} matching game(s):",
            plan.target.label(),
            plan.property_name,
            plan.entries.len()
        );
        for entry in &plan.entries {
            let platforms: Vec<&str> = entry
                .game
                .platforms
                .iter()
                .map(|p| match p {
                    PlatformProperty::Spec(id) => id.as_str(),
                    PlatformProperty::Name(name) => name.as_str(),
                })
                .collect();
            let mark = if entry.checked { "x" } else { " " };
            println!(
                "  [{}] {} ({}) via {} record(s)",
                mark,
                entry.game.name,
                if platforms.is_empty() {
                    "no platforms".to_string()
                } else {
                    platforms.join(", ")
                },
                entry.records.len()
            );
        }
        if plan.add_links {
            println!("  + a {} link will be added to each updated game", plan.provider);
        }
    }

    fn prompt_approval() -> bool {
        print!("Apply this assignment? [y/N] ");
        let _ = io::stdout().flush();
        let mut line = String::new();
        if io::stdin().lock().read_line(&mut line).is_err() {
            return false;
        }
        matches!(line.trim().to_lowercase().as_str(), "y" | "yes")
    }
}

#[async_trait]
impl BulkPropertyUi for ConsoleUi {
    async fn select_property(&self, _provider: &str) -> Option<SelectedProperty> {
        Some(self.property.clone())
    }

    async fn review_plan(&self, plan: &mut GamePropertyImportPlan) -> bool {
        Self::print_plan(plan);
        match self.mode {
            ReviewMode::Preview => false,
            ReviewMode::AutoApprove => true,
            ReviewMode::Prompt => tokio::task::block_in_place(Self::prompt_approval),
        }
    }

    fn notify(&self, notice: ImportNotice) {
        match notice {
            ImportNotice::NoDetails => eprintln!("No game records returned for this property."),
            ImportNotice::NoMatchingGames => eprintln!("No matching games found in the library."),
            ImportNotice::UnmappedPropertyCategory { kind } => {
                eprintln!("Property kind '{kind}' has no configured import target.")
            }
            ImportNotice::Applied { updated, skipped } => {
                eprintln!("Updated {updated} game(s), {skipped} already up to date.")
            }
        }
    }

    fn begin_progress(&self, total: usize) -> Arc<dyn ProgressScope> {
        let bar = ProgressBar::new(total as u64);
        bar.set_style(
            ProgressStyle::with_template("{bar:30} {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar()),
        );
        let cancelled = Arc::new(AtomicBool::new(false));
        {
            let cancelled = Arc::clone(&cancelled);
            let bar = bar.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    cancelled.store(true, Ordering::SeqCst);
                    bar.abandon_with_message("cancelling...");
                }
            });
        }
        Arc::new(ConsoleProgress { bar, cancelled })
    }
}

struct ConsoleProgress {
    bar: ProgressBar,
    cancelled: Arc<AtomicBool>,
}

impl ProgressScope for ConsoleProgress {
    fn tick(&self, done: usize, _total: usize, message: &str) {
        self.bar.set_position(done as u64);
        self.bar.set_message(message.to_string());
    }

    fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}
