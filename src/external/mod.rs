//! External database identifiers and URL-based id extraction

use regex_lite::Regex;
use serde::{Deserialize, Serialize};
use url::Url;
use uuid::{uuid, Uuid};

/// Host plugin id for libraries imported directly from Steam.
pub const STEAM_LIBRARY_PLUGIN: Uuid = uuid!("8c4e7da1-28ab-4e22-9f4b-2f4f6f2a1b53");

/// Host plugin id for libraries imported from the RAWG sync plugin.
pub const RAWG_LIBRARY_PLUGIN: Uuid = uuid!("3f0a9d62-91c7-4c3a-b0d3-6a5b6f0e84d9");

/// The external metadata databases the engine can cross-reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExternalDatabase {
    MobyGames,
    GiantBomb,
    Rawg,
    Steam,
    PcGamingWiki,
}

impl ExternalDatabase {
    pub const ALL: [ExternalDatabase; 5] = [
        ExternalDatabase::MobyGames,
        ExternalDatabase::GiantBomb,
        ExternalDatabase::Rawg,
        ExternalDatabase::Steam,
        ExternalDatabase::PcGamingWiki,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            ExternalDatabase::MobyGames => "MobyGames",
            ExternalDatabase::GiantBomb => "GiantBomb",
            ExternalDatabase::Rawg => "RAWG",
            ExternalDatabase::Steam => "Steam",
            ExternalDatabase::PcGamingWiki => "PCGamingWiki",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "mobygames" | "moby" => Some(ExternalDatabase::MobyGames),
            "giantbomb" => Some(ExternalDatabase::GiantBomb),
            "rawg" => Some(ExternalDatabase::Rawg),
            "steam" => Some(ExternalDatabase::Steam),
            "pcgamingwiki" | "pcgw" => Some(ExternalDatabase::PcGamingWiki),
            _ => None,
        }
    }

    /// Host library plugins whose primary game id is this database's id.
    pub fn library_plugins(&self) -> &'static [Uuid] {
        match self {
            ExternalDatabase::Steam => &[STEAM_LIBRARY_PLUGIN],
            ExternalDatabase::Rawg => &[RAWG_LIBRARY_PLUGIN],
            _ => &[],
        }
    }

    pub fn id(&self, raw: &str) -> DbId {
        DbId {
            database: *self,
            id: raw.to_string(),
        }
    }

    /// Extract this database's id from a detail-page URL.
    ///
    /// Foreign or malformed URLs yield `None`, never an error.
    pub fn id_from_url(&self, raw: &str) -> Option<DbId> {
        let url = Url::parse(raw.trim()).ok()?;
        if !matches!(url.scheme(), "http" | "https") {
            return None;
        }
        let host = url.host_str()?.trim_start_matches("www.");
        let mut segments = url.path_segments()?.filter(|s| !s.is_empty());
        match self {
            // https://www.mobygames.com/game/375/deus-ex/
            ExternalDatabase::MobyGames => {
                if host != "mobygames.com" || segments.next()? != "game" {
                    return None;
                }
                let id = segments.next()?;
                id.chars()
                    .all(|c| c.is_ascii_digit())
                    .then(|| self.id(id))
            }
            // https://www.giantbomb.com/deus-ex/3030-454/
            ExternalDatabase::GiantBomb => {
                if host != "giantbomb.com" {
                    return None;
                }
                let guid_re = Regex::new(r"^3030-\d+$").expect("valid regex");
                let guid = segments.find(|s| guid_re.is_match(s))?;
                Some(self.id(guid))
            }
            // https://rawg.io/games/deus-ex
            ExternalDatabase::Rawg => {
                if host != "rawg.io" || segments.next()? != "games" {
                    return None;
                }
                let slug = segments.next()?;
                (!slug.is_empty()).then(|| self.id(slug))
            }
            // https://store.steampowered.com/app/6910/Deus_Ex_Game_of_the_Year_Edition/
            ExternalDatabase::Steam => {
                if host != "store.steampowered.com" || segments.next()? != "app" {
                    return None;
                }
                let id = segments.next()?;
                id.chars()
                    .all(|c| c.is_ascii_digit())
                    .then(|| self.id(id))
            }
            // https://www.pcgamingwiki.com/wiki/Deus_Ex
            ExternalDatabase::PcGamingWiki => {
                if host != "pcgamingwiki.com" || segments.next()? != "wiki" {
                    return None;
                }
                let title = segments.next()?;
                (!title.is_empty()).then(|| self.id(title))
            }
        }
    }
}

/// A polymorphic external identifier: a game's id within one external database.
///
/// Equality is exact on both fields; ids are never normalized.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DbId {
    pub database: ExternalDatabase,
    pub id: String,
}

impl DbId {
    pub fn new(database: ExternalDatabase, id: impl Into<String>) -> Self {
        Self {
            database,
            id: id.into(),
        }
    }

    /// Try every known database shape against a URL.
    pub fn from_any_url(raw: &str) -> Option<DbId> {
        ExternalDatabase::ALL
            .iter()
            .find_map(|db| db.id_from_url(raw))
    }
}

impl std::fmt::Display for DbId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.database.label(), self.id)
    }
}
