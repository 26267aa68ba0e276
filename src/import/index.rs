//! Per-run indexes over the local library for the matching pass
//!
//! Built once per import with [`GameMatchingHelper::prepare`], then read
//! concurrently by the matching workers. No index mutation happens after
//! `prepare` returns, so lookups need no locking; only the deflation memo
//! takes a lock, and only for names it has not seen yet.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use uuid::Uuid;

use super::normalize::{deflate, DeflateOptions};
use crate::external::{DbId, ExternalDatabase};
use crate::library::Game;

pub struct GameMatchingHelper {
    options: DeflateOptions,
    by_id: HashMap<DbId, HashSet<Uuid>>,
    by_name: HashMap<String, HashSet<Uuid>>,
    deflate_cache: Mutex<HashMap<String, String>>,
}

impl GameMatchingHelper {
    pub fn new(options: DeflateOptions) -> Self {
        Self {
            options,
            by_id: HashMap::new(),
            by_name: HashMap::new(),
            deflate_cache: Mutex::new(HashMap::new()),
        }
    }

    /// Index the full library in a single pass. Returns `false` if cancelled.
    ///
    /// Each game is indexed under every external id recognizable from its
    /// links (plus its plugin-assigned primary id when the owning plugin is a
    /// known library integration), and under exactly one deflated-name key.
    pub fn prepare(&mut self, games: &[Game], is_cancelled: &dyn Fn() -> bool) -> bool {
        for game in games {
            if is_cancelled() {
                return false;
            }

            for link in &game.links {
                if let Some(db_id) = DbId::from_any_url(&link.url) {
                    self.by_id.entry(db_id).or_default().insert(game.id);
                }
            }

            if let (Some(plugin), Some(raw)) = (game.source_plugin, game.source_game_id.as_deref())
            {
                for db in ExternalDatabase::ALL {
                    if db.library_plugins().contains(&plugin) {
                        self.by_id.entry(db.id(raw)).or_default().insert(game.id);
                    }
                }
            }

            let key = self.deflated(&game.name);
            if !key.is_empty() {
                self.by_name.entry(key).or_default().insert(game.id);
            }
        }
        true
    }

    pub fn games_by_id(&self, id: &DbId) -> Option<&HashSet<Uuid>> {
        self.by_id.get(id)
    }

    pub fn games_by_name(&self, name: &str) -> Option<&HashSet<Uuid>> {
        let key = self.deflated(name);
        if key.is_empty() {
            return None;
        }
        self.by_name.get(&key)
    }

    /// Memoized deflation; hot during the parallel match phase where many
    /// records share similar titles.
    pub fn deflated(&self, name: &str) -> String {
        if let Some(hit) = self.deflate_cache.lock().unwrap().get(name) {
            return hit.clone();
        }
        let key = deflate(name, &self.options);
        self.deflate_cache
            .lock()
            .unwrap()
            .insert(name.to_string(), key.clone());
        key
    }

    #[cfg(test)]
    fn cached_names(&self) -> usize {
        self.deflate_cache.lock().unwrap().len()
    }
}
