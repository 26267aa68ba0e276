//! Host library model: games, classification objects and the store

mod store;

pub use store::{BufferedUpdate, LibraryDatabase, LibrarySnapshot, LibraryUpdate};

use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A platform attached to a game: either a normalized taxonomy id or free text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlatformProperty {
    /// Normalized platform-taxonomy id (e.g. "sony_playstation4").
    Spec(String),
    /// Free-text platform name as entered by the user or a plugin.
    Name(String),
}

/// A labeled URL attached to a game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    pub name: String,
    pub url: String,
}

impl Link {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
        }
    }
}

/// A game in the local library. Mutated only through the store's update API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Game {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub sorting_name: Option<String>,
    #[serde(default)]
    pub platforms: Vec<PlatformProperty>,
    #[serde(default)]
    pub links: Vec<Link>,
    #[serde(default)]
    pub release_date: Option<NaiveDate>,
    /// Host plugin that imported this game, if any.
    #[serde(default)]
    pub source_plugin: Option<Uuid>,
    /// Primary id assigned by the importing plugin (e.g. a store app id).
    #[serde(default)]
    pub source_game_id: Option<String>,
    #[serde(default)]
    pub modified: Option<DateTime<Utc>>,
    #[serde(default)]
    pub genre_ids: Vec<Uuid>,
    #[serde(default)]
    pub tag_ids: Vec<Uuid>,
    #[serde(default)]
    pub feature_ids: Vec<Uuid>,
    #[serde(default)]
    pub series_ids: Vec<Uuid>,
    #[serde(default)]
    pub category_ids: Vec<Uuid>,
    #[serde(default)]
    pub developer_ids: Vec<Uuid>,
    #[serde(default)]
    pub publisher_ids: Vec<Uuid>,
}

impl Game {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            sorting_name: None,
            platforms: Vec::new(),
            links: Vec::new(),
            release_date: None,
            source_plugin: None,
            source_game_id: None,
            modified: None,
            genre_ids: Vec::new(),
            tag_ids: Vec::new(),
            feature_ids: Vec::new(),
            series_ids: Vec::new(),
            category_ids: Vec::new(),
            developer_ids: Vec::new(),
            publisher_ids: Vec::new(),
        }
    }

    /// Key used to order games for review: sorting name (or name), then release date.
    pub fn sort_key(&self) -> (String, Option<NaiveDate>) {
        let name = self
            .sorting_name
            .as_deref()
            .unwrap_or(&self.name)
            .to_lowercase();
        (name, self.release_date)
    }

    pub fn classification_ids(&self, target: ClassificationTarget) -> &[Uuid] {
        match target {
            ClassificationTarget::Genre => &self.genre_ids,
            ClassificationTarget::Tag => &self.tag_ids,
            ClassificationTarget::Feature => &self.feature_ids,
            ClassificationTarget::Series => &self.series_ids,
            ClassificationTarget::Category => &self.category_ids,
            ClassificationTarget::Developer => &self.developer_ids,
            ClassificationTarget::Publisher => &self.publisher_ids,
        }
    }

    pub fn classification_ids_mut(&mut self, target: ClassificationTarget) -> &mut Vec<Uuid> {
        match target {
            ClassificationTarget::Genre => &mut self.genre_ids,
            ClassificationTarget::Tag => &mut self.tag_ids,
            ClassificationTarget::Feature => &mut self.feature_ids,
            ClassificationTarget::Series => &mut self.series_ids,
            ClassificationTarget::Category => &mut self.category_ids,
            ClassificationTarget::Developer => &mut self.developer_ids,
            ClassificationTarget::Publisher => &mut self.publisher_ids,
        }
    }
}

/// The classification fields a bulk import can write to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassificationTarget {
    Genre,
    Tag,
    Feature,
    Series,
    Category,
    Developer,
    Publisher,
}

impl ClassificationTarget {
    pub const ALL: [ClassificationTarget; 7] = [
        ClassificationTarget::Genre,
        ClassificationTarget::Tag,
        ClassificationTarget::Feature,
        ClassificationTarget::Series,
        ClassificationTarget::Category,
        ClassificationTarget::Developer,
        ClassificationTarget::Publisher,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            ClassificationTarget::Genre => "Genre",
            ClassificationTarget::Tag => "Tag",
            ClassificationTarget::Feature => "Feature",
            ClassificationTarget::Series => "Series",
            ClassificationTarget::Category => "Category",
            ClassificationTarget::Developer => "Developer",
            ClassificationTarget::Publisher => "Publisher",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "genre" | "genres" => Some(ClassificationTarget::Genre),
            "tag" | "tags" => Some(ClassificationTarget::Tag),
            "feature" | "features" => Some(ClassificationTarget::Feature),
            "series" => Some(ClassificationTarget::Series),
            "category" | "categories" => Some(ClassificationTarget::Category),
            "developer" | "developers" => Some(ClassificationTarget::Developer),
            "publisher" | "publishers" => Some(ClassificationTarget::Publisher),
            _ => None,
        }
    }
}

/// A named entity (tag, genre, company, ...) with a stable id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseObject {
    pub id: Uuid,
    pub name: String,
}

impl DatabaseObject {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
        }
    }
}

/// Named entities keyed by id, with case-insensitive name lookup and
/// create-on-demand semantics.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(from = "Vec<DatabaseObject>", into = "Vec<DatabaseObject>")]
pub struct NamedCollection {
    items: HashMap<Uuid, DatabaseObject>,
    by_name: HashMap<String, Uuid>,
}

impl NamedCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, id: &Uuid) -> Option<&DatabaseObject> {
        self.items.get(id)
    }

    pub fn get_by_name(&self, name: &str) -> Option<&DatabaseObject> {
        let key = name.trim().to_lowercase();
        self.by_name.get(&key).and_then(|id| self.items.get(id))
    }

    /// Look up by case-insensitive name, creating the object if absent.
    pub fn get_or_create(&mut self, name: &str) -> Uuid {
        let trimmed = name.trim();
        if let Some(existing) = self.get_by_name(trimmed) {
            return existing.id;
        }
        let object = DatabaseObject::new(trimmed);
        let id = object.id;
        self.by_name.insert(trimmed.to_lowercase(), id);
        self.items.insert(id, object);
        id
    }

    pub fn iter(&self) -> impl Iterator<Item = &DatabaseObject> {
        self.items.values()
    }
}

impl From<Vec<DatabaseObject>> for NamedCollection {
    fn from(items: Vec<DatabaseObject>) -> Self {
        let mut collection = NamedCollection::default();
        for object in items {
            collection.by_name.insert(object.name.trim().to_lowercase(), object.id);
            collection.items.insert(object.id, object);
        }
        collection
    }
}

impl From<NamedCollection> for Vec<DatabaseObject> {
    fn from(collection: NamedCollection) -> Self {
        let mut items: Vec<DatabaseObject> = collection.items.into_values().collect();
        items.sort_by(|a, b| a.name.cmp(&b.name));
        items
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_or_create_is_case_insensitive() {
        let mut tags = NamedCollection::new();
        let first = tags.get_or_create("Cyberpunk");
        let second = tags.get_or_create("  cyberPUNK ");
        assert_eq!(first, second);
        assert_eq!(tags.len(), 1);
        assert_eq!(tags.get(&first).unwrap().name, "Cyberpunk");
    }

    #[test]
    fn classification_accessors_cover_every_target() {
        let mut game = Game::new("Test");
        let id = Uuid::new_v4();
        for target in ClassificationTarget::ALL {
            game.classification_ids_mut(target).push(id);
        }
        for target in ClassificationTarget::ALL {
            assert_eq!(game.classification_ids(target), &[id]);
        }
    }

    #[test]
    fn sort_key_prefers_sorting_name() {
        let mut game = Game::new("The Witcher 3");
        game.sorting_name = Some("Witcher 3".to_string());
        assert_eq!(game.sort_key().0, "witcher 3");
    }

    #[test]
    fn target_parse_accepts_plural_forms() {
        assert_eq!(
            ClassificationTarget::parse("Tags"),
            Some(ClassificationTarget::Tag)
        );
        assert_eq!(ClassificationTarget::parse("unknown"), None);
    }

    #[test]
    fn named_collection_roundtrips_through_vec() {
        let mut genres = NamedCollection::new();
        genres.get_or_create("RPG");
        genres.get_or_create("Strategy");
        let items: Vec<DatabaseObject> = genres.clone().into();
        let restored = NamedCollection::from(items);
        assert_eq!(restored.len(), 2);
        assert!(restored.get_by_name("rpg").is_some());
    }
}
