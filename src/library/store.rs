//! In-memory library store with buffered, batched change notifications

use std::collections::HashMap;
use std::path::Path;

use anyhow::{ensure, Context, Result};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{ClassificationTarget, DatabaseObject, Game, NamedCollection};

/// A change applied to the library, delivered to subscribers in batches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LibraryUpdate {
    GameUpdated { id: Uuid },
}

type Listener = Box<dyn Fn(&[LibraryUpdate]) + Send + Sync>;

/// The local game library: games plus the seven classification collections.
///
/// Game mutation goes through [`LibraryDatabase::buffer_update`], which queues
/// change notifications and flushes them once when the scope ends.
#[derive(Default)]
pub struct LibraryDatabase {
    games: HashMap<Uuid, Game>,
    genres: NamedCollection,
    tags: NamedCollection,
    features: NamedCollection,
    series: NamedCollection,
    categories: NamedCollection,
    developers: NamedCollection,
    publishers: NamedCollection,
    listeners: Vec<Listener>,
}

impl LibraryDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_game(&mut self, game: Game) {
        self.games.insert(game.id, game);
    }

    pub fn game(&self, id: &Uuid) -> Option<&Game> {
        self.games.get(id)
    }

    pub fn games(&self) -> impl Iterator<Item = &Game> {
        self.games.values()
    }

    pub fn game_count(&self) -> usize {
        self.games.len()
    }

    /// Owned copy of every game, taken once at the start of a matching run.
    pub fn games_snapshot(&self) -> Vec<Game> {
        self.games.values().cloned().collect()
    }

    pub fn collection(&self, target: ClassificationTarget) -> &NamedCollection {
        match target {
            ClassificationTarget::Genre => &self.genres,
            ClassificationTarget::Tag => &self.tags,
            ClassificationTarget::Feature => &self.features,
            ClassificationTarget::Series => &self.series,
            ClassificationTarget::Category => &self.categories,
            ClassificationTarget::Developer => &self.developers,
            ClassificationTarget::Publisher => &self.publishers,
        }
    }

    fn collection_mut(&mut self, target: ClassificationTarget) -> &mut NamedCollection {
        match target {
            ClassificationTarget::Genre => &mut self.genres,
            ClassificationTarget::Tag => &mut self.tags,
            ClassificationTarget::Feature => &mut self.features,
            ClassificationTarget::Series => &mut self.series,
            ClassificationTarget::Category => &mut self.categories,
            ClassificationTarget::Developer => &mut self.developers,
            ClassificationTarget::Publisher => &mut self.publishers,
        }
    }

    /// Register a change listener. Listeners receive one call per flushed batch.
    pub fn subscribe(&mut self, listener: impl Fn(&[LibraryUpdate]) + Send + Sync + 'static) {
        self.listeners.push(Box::new(listener));
    }

    fn emit(&self, events: &[LibraryUpdate]) {
        for listener in &self.listeners {
            listener(events);
        }
    }

    /// Open a buffered update scope. Notifications queue until the scope drops.
    pub fn buffer_update(&mut self) -> BufferedUpdate<'_> {
        BufferedUpdate {
            db: self,
            queued: Vec::new(),
        }
    }

    pub fn load_snapshot(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read library file {}", path.display()))?;
        let snapshot: LibrarySnapshot = serde_json::from_str(&raw)
            .with_context(|| format!("invalid library file {}", path.display()))?;
        Ok(snapshot.into())
    }

    pub fn save_snapshot(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let snapshot = LibrarySnapshot::from(self);
        let raw = serde_json::to_string_pretty(&snapshot)?;
        std::fs::write(path, raw)
            .with_context(|| format!("failed to write library file {}", path.display()))?;
        Ok(())
    }
}

/// Serializable form of the library, used by the CLI driver.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LibrarySnapshot {
    pub games: Vec<Game>,
    pub genres: Vec<DatabaseObject>,
    pub tags: Vec<DatabaseObject>,
    pub features: Vec<DatabaseObject>,
    pub series: Vec<DatabaseObject>,
    pub categories: Vec<DatabaseObject>,
    pub developers: Vec<DatabaseObject>,
    pub publishers: Vec<DatabaseObject>,
}

impl From<LibrarySnapshot> for LibraryDatabase {
    fn from(snapshot: LibrarySnapshot) -> Self {
        let mut db = LibraryDatabase::new();
        for game in snapshot.games {
            db.insert_game(game);
        }
        db.genres = snapshot.genres.into();
        db.tags = snapshot.tags.into();
        db.features = snapshot.features.into();
        db.series = snapshot.series.into();
        db.categories = snapshot.categories.into();
        db.developers = snapshot.developers.into();
        db.publishers = snapshot.publishers.into();
        db
    }
}

impl From<&LibraryDatabase> for LibrarySnapshot {
    fn from(db: &LibraryDatabase) -> Self {
        let mut games = db.games_snapshot();
        games.sort_by(|a, b| a.sort_key().cmp(&b.sort_key()));
        Self {
            games,
            genres: db.genres.clone().into(),
            tags: db.tags.clone().into(),
            features: db.features.clone().into(),
            series: db.series.clone().into(),
            categories: db.categories.clone().into(),
            developers: db.developers.clone().into(),
            publishers: db.publishers.clone().into(),
        }
    }
}

/// Mutation scope batching change notifications; flushes once on drop,
/// on every exit path.
pub struct BufferedUpdate<'a> {
    db: &'a mut LibraryDatabase,
    queued: Vec<LibraryUpdate>,
}

impl BufferedUpdate<'_> {
    pub fn game(&self, id: &Uuid) -> Option<&Game> {
        self.db.game(id)
    }

    pub fn get_or_create(&mut self, target: ClassificationTarget, name: &str) -> Uuid {
        self.db.collection_mut(target).get_or_create(name)
    }

    /// Replace a stored game. The game must already exist in the library.
    pub fn update_game(&mut self, game: Game) -> Result<()> {
        ensure!(
            self.db.games.contains_key(&game.id),
            "cannot update unknown game {}",
            game.id
        );
        let id = game.id;
        self.db.games.insert(id, game);
        self.queued.push(LibraryUpdate::GameUpdated { id });
        Ok(())
    }
}

impl Drop for BufferedUpdate<'_> {
    fn drop(&mut self) {
        if !self.queued.is_empty() {
            let events = std::mem::take(&mut self.queued);
            self.db.emit(&events);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn buffered_scope_flushes_notifications_once() {
        let mut db = LibraryDatabase::new();
        let a = Game::new("A");
        let b = Game::new("B");
        let (a_id, b_id) = (a.id, b.id);
        db.insert_game(a);
        db.insert_game(b);

        let batches = Arc::new(AtomicUsize::new(0));
        let events = Arc::new(AtomicUsize::new(0));
        {
            let batches = Arc::clone(&batches);
            let events = Arc::clone(&events);
            db.subscribe(move |updates| {
                batches.fetch_add(1, Ordering::SeqCst);
                events.fetch_add(updates.len(), Ordering::SeqCst);
            });
        }

        {
            let mut scope = db.buffer_update();
            let game_a = scope.game(&a_id).cloned().unwrap();
            let game_b = scope.game(&b_id).cloned().unwrap();
            scope.update_game(game_a).unwrap();
            scope.update_game(game_b).unwrap();
            assert_eq!(batches.load(Ordering::SeqCst), 0);
        }

        assert_eq!(batches.load(Ordering::SeqCst), 1);
        assert_eq!(events.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn empty_scope_emits_nothing() {
        let mut db = LibraryDatabase::new();
        let fired = Arc::new(AtomicUsize::new(0));
        {
            let fired = Arc::clone(&fired);
            db.subscribe(move |_| {
                fired.fetch_add(1, Ordering::SeqCst);
            });
        }
        {
            let _scope = db.buffer_update();
        }
        assert_eq!(fired.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn updating_unknown_game_fails() {
        let mut db = LibraryDatabase::new();
        let mut scope = db.buffer_update();
        let result = scope.update_game(Game::new("Ghost"));
        assert!(result.is_err());
    }

    #[test]
    fn snapshot_roundtrip_preserves_games_and_collections() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("library.json");

        let mut db = LibraryDatabase::new();
        let mut game = Game::new("Deus Ex");
        game.tag_ids.push(Uuid::new_v4());
        let game_id = game.id;
        db.insert_game(game);
        {
            let mut scope = db.buffer_update();
            scope.get_or_create(ClassificationTarget::Tag, "Cyberpunk");
        }

        db.save_snapshot(&path).unwrap();
        let restored = LibraryDatabase::load_snapshot(&path).unwrap();

        assert_eq!(restored.game_count(), 1);
        assert!(restored.game(&game_id).is_some());
        assert!(restored
            .collection(ClassificationTarget::Tag)
            .get_by_name("cyberpunk")
            .is_some());
    }
}
