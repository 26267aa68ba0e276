//! Bulk Property Import System
//!
//! This module matches one externally-sourced property (a tag, genre,
//! concept, series, ...) and its associated game records against the local
//! library, presents a reviewable proposal, and applies the approved
//! assignment as one batched, idempotent library update.

pub mod index;
pub mod normalize;
pub mod platforms;
pub mod review;

pub use index::GameMatchingHelper;
pub use normalize::{deflate, DeflateOptions};
pub use platforms::platforms_overlap;
pub use review::{GameCheckbox, GamePropertyImportPlan};

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use anyhow::{bail, Context, Result};
use chrono::Utc;
use futures::future::join_all;
use tokio::sync::Semaphore;
use uuid::Uuid;

use crate::config::MatchingSettings;
use crate::external::ExternalDatabase;
use crate::library::{Game, LibraryDatabase, Link};
use crate::sources::{ExternalGameRecord, PropertySource, SelectedProperty};
use crate::ui::{BulkPropertyUi, ImportNotice, ProgressScope};

/// Terminal state of one import run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportOutcome {
    /// User approved; counts of games persisted vs skipped as already current.
    Applied { updated: usize, skipped: usize },
    /// The source returned no game records.
    NoDetails,
    /// Matching finished (or was cancelled) with zero proposed games.
    NoMatchingGames,
    /// The property kind has no configured classification target.
    UnmappedProperty,
    /// The user declined selection or the plan; the library is untouched.
    Cancelled,
}

/// Orchestrates one property import end to end: select, fetch, match,
/// review, commit. Generic over the source so no per-provider rule is
/// hard-coded here.
pub struct BulkGamePropertyAssigner<S: PropertySource> {
    source: S,
    settings: MatchingSettings,
}

impl<S: PropertySource> BulkGamePropertyAssigner<S> {
    pub fn new(source: S, settings: MatchingSettings) -> Self {
        Self { source, settings }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Run one full import. Every early return before the commit step leaves
    /// the library untouched.
    pub async fn import_game_property(
        &self,
        db: &mut LibraryDatabase,
        ui: &dyn BulkPropertyUi,
    ) -> Result<ImportOutcome> {
        let Some(property) = ui.select_property(self.source.provider_name()).await else {
            return Ok(ImportOutcome::Cancelled);
        };

        let Some(target) = self.source.import_target(&property) else {
            tracing::error!(
                "no import target configured for property kind '{}'",
                property.kind
            );
            ui.notify(ImportNotice::UnmappedPropertyCategory {
                kind: property.kind.clone(),
            });
            return Ok(ImportOutcome::UnmappedProperty);
        };

        let records = self
            .source
            .get_details(&property)
            .await
            .with_context(|| format!("fetching records for '{}'", property.name))?;
        if records.is_empty() {
            ui.notify(ImportNotice::NoDetails);
            return Ok(ImportOutcome::NoDetails);
        }

        tracing::info!(
            records = records.len(),
            games = db.game_count(),
            "matching '{}' against the library",
            property.name
        );

        let snapshot = db.games_snapshot();
        let progress = ui.begin_progress(records.len());
        let matches = self
            .run_matching_pass(snapshot, records, Arc::clone(&progress))
            .await;

        if matches.is_empty() {
            ui.notify(ImportNotice::NoMatchingGames);
            return Ok(ImportOutcome::NoMatchingGames);
        }

        let mut plan = self.build_plan(&property, target, matches);
        if !ui.review_plan(&mut plan).await {
            return Ok(ImportOutcome::Cancelled);
        }

        let (updated, skipped) = self.update_games(db, &plan)?;
        ui.notify(ImportNotice::Applied { updated, skipped });
        Ok(ImportOutcome::Applied { updated, skipped })
    }

    /// Concurrent matching pass over an immutable snapshot of the library.
    ///
    /// Cancellation mid-pass yields an empty result rather than a partial,
    /// misleading review set. A failing record is logged and skipped.
    async fn run_matching_pass(
        &self,
        snapshot: Vec<Game>,
        records: Vec<ExternalGameRecord>,
        progress: Arc<dyn ProgressScope>,
    ) -> HashMap<Uuid, MatchedGame> {
        let mut helper = GameMatchingHelper::new(self.settings.deflate_options());
        {
            let progress = Arc::clone(&progress);
            if !helper.prepare(&snapshot, &move || progress.is_cancelled()) {
                tracing::info!("matching cancelled during index build");
                return HashMap::new();
            }
        }

        let helper = Arc::new(helper);
        let games: Arc<HashMap<Uuid, Game>> =
            Arc::new(snapshot.into_iter().map(|g| (g.id, g)).collect());
        let home = self.source.external_database();
        let total = records.len();

        let semaphore = Arc::new(Semaphore::new(self.settings.effective_concurrency()));
        let accumulator: Arc<Mutex<HashMap<Uuid, MatchedGame>>> =
            Arc::new(Mutex::new(HashMap::new()));
        let done = Arc::new(AtomicUsize::new(0));

        let mut handles = Vec::with_capacity(total);
        for record in records {
            let semaphore = Arc::clone(&semaphore);
            let helper = Arc::clone(&helper);
            let games = Arc::clone(&games);
            let accumulator = Arc::clone(&accumulator);
            let progress = Arc::clone(&progress);
            let done = Arc::clone(&done);

            handles.push(tokio::spawn(async move {
                let _permit = semaphore.acquire().await.unwrap();
                if progress.is_cancelled() {
                    return;
                }

                match match_record(&record, home, &helper, &games) {
                    Ok(ids) => {
                        if !ids.is_empty() {
                            let mut acc = accumulator.lock().unwrap();
                            for id in ids {
                                acc.entry(id)
                                    .or_insert_with(|| MatchedGame {
                                        game: games[&id].clone(),
                                        records: Vec::new(),
                                    })
                                    .records
                                    .push(record.clone());
                            }
                        }
                    }
                    Err(e) => {
                        tracing::warn!("skipping record '{}': {e:#}", record.display_name());
                    }
                }

                let finished = done.fetch_add(1, Ordering::SeqCst) + 1;
                progress.tick(finished, total, record.display_name());
            }));
        }
        join_all(handles).await;

        if progress.is_cancelled() {
            tracing::info!("matching cancelled; discarding partial results");
            return HashMap::new();
        }

        let mut acc = accumulator.lock().unwrap();
        std::mem::take(&mut *acc)
    }

    fn build_plan(
        &self,
        property: &SelectedProperty,
        target: crate::library::ClassificationTarget,
        matches: HashMap<Uuid, MatchedGame>,
    ) -> GamePropertyImportPlan {
        let mut entries: Vec<GameCheckbox> = matches
            .into_values()
            .map(|m| GameCheckbox::new(m.game, m.records))
            .collect();
        entries.sort_by(|a, b| a.game.sort_key().cmp(&b.game.sort_key()));

        let property_name = match &self.settings.property_name_prefix {
            Some(prefix) => format!("{prefix}{}", property.name),
            None => property.name.clone(),
        };

        GamePropertyImportPlan {
            property_name,
            target,
            provider: self.source.provider_name().to_string(),
            add_links: self.settings.add_links,
            entries,
        }
    }

    /// Apply the approved plan. Mutations run sequentially inside one
    /// buffered update scope; games that would not change are left alone so
    /// re-running an import is a no-op.
    fn update_games(
        &self,
        db: &mut LibraryDatabase,
        plan: &GamePropertyImportPlan,
    ) -> Result<(usize, usize)> {
        let mut updated = 0usize;
        let mut skipped = 0usize;

        let mut scope = db.buffer_update();
        for entry in plan.checked() {
            let object_id = scope.get_or_create(plan.target, &plan.property_name);

            let Some(mut game) = scope.game(&entry.game.id).cloned() else {
                tracing::warn!("game {} disappeared before commit", entry.game.id);
                continue;
            };

            let mut changed = false;

            let ids = game.classification_ids_mut(plan.target);
            if !ids.contains(&object_id) {
                ids.push(object_id);
                changed = true;
            }

            if plan.add_links {
                for record in &entry.records {
                    let Some(url) = record.url.as_deref().filter(|u| !u.trim().is_empty()) else {
                        continue;
                    };
                    if game.links.iter().any(|l| l.url == url) {
                        continue;
                    }
                    game.links.push(Link::new(plan.provider.clone(), url));
                    changed = true;
                }
            }

            if changed {
                game.modified = Some(Utc::now());
                scope.update_game(game)?;
                updated += 1;
            } else {
                skipped += 1;
            }
        }
        drop(scope);

        tracing::info!(
            updated,
            skipped,
            "assigned '{}' as {}",
            plan.property_name,
            plan.target.label()
        );
        Ok((updated, skipped))
    }
}

/// One matched library game and every record that matched it.
struct MatchedGame {
    game: Game,
    records: Vec<ExternalGameRecord>,
}

/// Match one record against the prepared indexes.
///
/// Id matches are authoritative and accepted unconditionally. Name matches
/// need platform corroboration: identical titles on disjoint platforms are
/// rejected rather than risk tagging an unrelated game.
fn match_record(
    record: &ExternalGameRecord,
    home: ExternalDatabase,
    helper: &GameMatchingHelper,
    games: &HashMap<Uuid, Game>,
) -> Result<Vec<Uuid>> {
    if record.names.iter().all(|n| n.trim().is_empty()) {
        bail!("record has no usable names");
    }

    let mut out: Vec<Uuid> = Vec::new();

    for db_id in record.derived_ids(home) {
        if let Some(ids) = helper.games_by_id(&db_id) {
            for id in ids {
                if !out.contains(id) {
                    out.push(*id);
                }
            }
        }
    }

    for name in &record.names {
        let Some(ids) = helper.games_by_name(name) else {
            continue;
        };
        for id in ids {
            if out.contains(id) {
                continue;
            }
            let Some(game) = games.get(id) else { continue };
            if platforms_overlap(&game.platforms, &record.platforms) {
                out.push(*id);
            }
        }
    }

    Ok(out)
}
