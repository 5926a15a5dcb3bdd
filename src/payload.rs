//! Raider.IO wire payloads.
//!
//! Field names follow the API; Rust-side names are renamed where the API's
//! short names would be ambiguous inside this crate.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Affix {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Affix {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            id: None,
            description: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunRecord {
    #[serde(rename = "short_name")]
    pub dungeon_short_name: String,
    #[serde(rename = "dungeon")]
    pub dungeon_display_name: String,
    pub mythic_level: u32,
    #[serde(rename = "num_keystone_upgrades")]
    pub keystone_upgrades: u8,
    #[serde(default)]
    pub affixes: Vec<Affix>,
    pub clear_time_ms: u64,
    pub par_time_ms: u64,
    pub score: f64,
    #[serde(rename = "url")]
    pub detail_url: String,
}

impl RunRecord {
    pub fn leading_affix_name(&self) -> Option<&str> {
        self.affixes.first().map(|affix| affix.name.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ScoreSet {
    pub all: f64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ScoreSegment {
    #[serde(default)]
    pub score: f64,
    #[serde(default)]
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ScoreSegments {
    #[serde(default)]
    pub all: ScoreSegment,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeasonScores {
    #[serde(default)]
    pub season: String,
    pub scores: ScoreSet,
    #[serde(default)]
    pub segments: ScoreSegments,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CharacterProfile {
    pub name: String,
    #[serde(default)]
    pub region: String,
    #[serde(default)]
    pub realm: String,
    #[serde(default)]
    pub thumbnail_url: String,
    #[serde(default)]
    pub profile_url: String,
    #[serde(default)]
    pub mythic_plus_scores_by_season: Vec<SeasonScores>,
    #[serde(default)]
    pub mythic_plus_best_runs: Vec<RunRecord>,
    #[serde(default)]
    pub mythic_plus_alternate_runs: Vec<RunRecord>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaticDungeon {
    pub short_name: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaticSeason {
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub dungeons: Vec<StaticDungeon>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StaticSeasonData {
    #[serde(default)]
    pub seasons: Vec<StaticSeason>,
}

/// Error body Raider.IO embeds in place of the normal payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiErrorBody {
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    #[serde(default)]
    pub error: String,
    #[serde(default)]
    pub message: String,
}
