//! Versioned season configuration and roster resolution.
//!
//! A season profile pins everything that changes between Mythic+ seasons:
//! the expansion id to query, which `seasons[]` entry of the static data is
//! scored, dungeon background images, and an optional threshold override.

use std::collections::{BTreeMap, HashSet};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use crate::payload::{StaticSeason, StaticSeasonData};

pub const DEFAULT_SEASON: &str = "season-sl-4";
pub const DEFAULT_IMAGE_KEY: &str = "karazhan";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeasonDungeonSlot {
    pub short_name: String,
    pub display_name: String,
    pub image_key: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeasonProfile {
    pub slug: String,
    pub expansion_id: u32,
    /// `seasons[].slug` to score; `None` takes the first (current) entry.
    #[serde(default)]
    pub static_season_slug: Option<String>,
    #[serde(default)]
    pub image_keys: BTreeMap<String, String>,
    #[serde(default = "default_image_key")]
    pub default_image_key: String,
    /// Overrides the roster-derived per-card threshold.
    #[serde(default)]
    pub improvement_threshold: Option<f64>,
}

impl SeasonProfile {
    pub fn image_key_for(&self, short_name: &str) -> &str {
        self.image_keys
            .get(short_name)
            .map(String::as_str)
            .unwrap_or(&self.default_image_key)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeasonCatalog {
    pub profiles: Vec<SeasonProfile>,
}

#[derive(Debug, Error)]
pub enum SeasonConfigError {
    #[error("unknown season profile: {0}")]
    UnknownProfile(String),
    #[error("season {0} not present in static dungeon data")]
    SeasonNotFound(String),
    #[error("static dungeon data has no seasons")]
    NoSeasons,
    #[error("season {0} has an empty dungeon roster")]
    EmptyRoster(String),
    #[error("season {season} lists dungeon {short_name} more than once")]
    DuplicateDungeon { season: String, short_name: String },
    #[error("failed to read season catalog {path}: {source}")]
    CatalogIo {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse season catalog {path}: {source}")]
    CatalogParse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

impl SeasonCatalog {
    pub fn builtin() -> Self {
        let image_keys = [
            ("YARD", "mechagon"),
            ("WORK", "mechagon"),
            ("UPPR", "karazhan"),
            ("LOWR", "karazhan"),
            ("GMBT", "tazavesh"),
            ("STRT", "tazavesh"),
            ("ID", "irondocks"),
            ("GD", "grimraildepot"),
        ]
        .into_iter()
        .map(|(short, key)| (short.to_string(), key.to_string()))
        .collect();

        Self {
            profiles: vec![SeasonProfile {
                slug: DEFAULT_SEASON.to_string(),
                expansion_id: 8,
                static_season_slug: Some(DEFAULT_SEASON.to_string()),
                image_keys,
                default_image_key: DEFAULT_IMAGE_KEY.to_string(),
                improvement_threshold: None,
            }],
        }
    }

    pub fn from_json_file(path: &Path) -> Result<Self, SeasonConfigError> {
        let raw = fs::read(path).map_err(|source| SeasonConfigError::CatalogIo {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_slice(&raw).map_err(|source| SeasonConfigError::CatalogParse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn profile(&self, slug: &str) -> Result<&SeasonProfile, SeasonConfigError> {
        self.profiles
            .iter()
            .find(|profile| profile.slug == slug)
            .ok_or_else(|| SeasonConfigError::UnknownProfile(slug.to_string()))
    }
}

/// Selects a season profile from `KSM_SEASON` and, if set, the JSON catalog
/// at `KSM_SEASON_CATALOG`. Falls back to the built-in catalog.
pub fn season_profile_from_env() -> Result<SeasonProfile, SeasonConfigError> {
    season_profile_with_overrides(None, None)
}

/// Like [`season_profile_from_env`], with explicit values taking precedence
/// over the environment. Blank values count as unset.
pub fn season_profile_with_overrides(
    slug: Option<&str>,
    catalog_path: Option<&Path>,
) -> Result<SeasonProfile, SeasonConfigError> {
    let slug = slug
        .map(str::to_string)
        .or_else(|| env::var("KSM_SEASON").ok())
        .map(|raw| raw.trim().to_string())
        .filter(|raw| !raw.is_empty());

    let catalog_path = catalog_path
        .map(Path::to_path_buf)
        .filter(|path| !path.as_os_str().is_empty())
        .or_else(|| {
            env::var("KSM_SEASON_CATALOG")
                .ok()
                .map(|raw| raw.trim().to_string())
                .filter(|raw| !raw.is_empty())
                .map(PathBuf::from)
        });

    let catalog = match catalog_path {
        Some(path) => SeasonCatalog::from_json_file(&path)?,
        None => SeasonCatalog::builtin(),
    };

    select_profile(&catalog, slug.as_deref())
}

pub fn select_profile(
    catalog: &SeasonCatalog,
    slug: Option<&str>,
) -> Result<SeasonProfile, SeasonConfigError> {
    let profile = match slug {
        Some(slug) => catalog.profile(slug)?.clone(),
        None => catalog
            .profile(DEFAULT_SEASON)
            .or_else(|err| catalog.profiles.first().ok_or(err))?
            .clone(),
    };

    info!(
        component = "season",
        event = "season.selected",
        season = %profile.slug,
        expansion_id = profile.expansion_id
    );

    Ok(profile)
}

/// Ordered roster of dungeon slots for the profile's season.
pub fn resolve_roster(
    static_data: &StaticSeasonData,
    profile: &SeasonProfile,
) -> Result<Vec<SeasonDungeonSlot>, SeasonConfigError> {
    let season = select_static_season(static_data, profile)?;
    if season.dungeons.is_empty() {
        return Err(SeasonConfigError::EmptyRoster(season.slug.clone()));
    }

    let mut seen = HashSet::with_capacity(season.dungeons.len());
    let mut slots = Vec::with_capacity(season.dungeons.len());
    for dungeon in &season.dungeons {
        if !seen.insert(dungeon.short_name.as_str()) {
            return Err(SeasonConfigError::DuplicateDungeon {
                season: season.slug.clone(),
                short_name: dungeon.short_name.clone(),
            });
        }
        slots.push(SeasonDungeonSlot {
            short_name: dungeon.short_name.clone(),
            display_name: dungeon.name.clone(),
            image_key: profile.image_key_for(&dungeon.short_name).to_string(),
        });
    }

    Ok(slots)
}

fn select_static_season<'a>(
    static_data: &'a StaticSeasonData,
    profile: &SeasonProfile,
) -> Result<&'a StaticSeason, SeasonConfigError> {
    match &profile.static_season_slug {
        Some(slug) => static_data
            .seasons
            .iter()
            .find(|season| &season.slug == slug)
            .ok_or_else(|| SeasonConfigError::SeasonNotFound(slug.clone())),
        None => static_data.seasons.first().ok_or(SeasonConfigError::NoSeasons),
    }
}

fn default_image_key() -> String {
    DEFAULT_IMAGE_KEY.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::payload::StaticDungeon;
    use std::io::Write;

    fn dungeon(short_name: &str) -> StaticDungeon {
        StaticDungeon {
            short_name: short_name.to_string(),
            name: format!("Dungeon {short_name}"),
            id: None,
            slug: None,
        }
    }

    fn static_data(seasons: &[(&str, &[&str])]) -> StaticSeasonData {
        StaticSeasonData {
            seasons: seasons
                .iter()
                .map(|(slug, dungeons)| StaticSeason {
                    slug: slug.to_string(),
                    name: slug.to_string(),
                    dungeons: dungeons.iter().map(|short| dungeon(short)).collect(),
                })
                .collect(),
        }
    }

    #[test]
    fn roster_follows_static_order_and_maps_images() {
        let data = static_data(&[
            ("season-sl-4", &["ID", "GD", "NEW"]),
            ("season-sl-3", &["SD"]),
        ]);
        let profile = SeasonCatalog::builtin().profile(DEFAULT_SEASON).unwrap().clone();

        let roster = resolve_roster(&data, &profile).unwrap();
        let names: Vec<_> = roster.iter().map(|slot| slot.short_name.as_str()).collect();
        assert_eq!(names, vec!["ID", "GD", "NEW"]);
        assert_eq!(roster[0].image_key, "irondocks");
        assert_eq!(roster[2].image_key, DEFAULT_IMAGE_KEY);
    }

    #[test]
    fn pinned_season_is_found_even_when_not_first() {
        let data = static_data(&[("season-df-1", &["AA"]), ("season-sl-4", &["ID"])]);
        let profile = SeasonCatalog::builtin().profile(DEFAULT_SEASON).unwrap().clone();

        let roster = resolve_roster(&data, &profile).unwrap();
        assert_eq!(roster.len(), 1);
        assert_eq!(roster[0].short_name, "ID");
    }

    #[test]
    fn unpinned_profile_takes_first_season() {
        let data = static_data(&[("season-df-1", &["AA", "BB"]), ("season-sl-4", &["ID"])]);
        let mut profile = SeasonCatalog::builtin().profile(DEFAULT_SEASON).unwrap().clone();
        profile.static_season_slug = None;

        let roster = resolve_roster(&data, &profile).unwrap();
        assert_eq!(roster.len(), 2);
    }

    #[test]
    fn missing_season_empty_roster_and_duplicates_are_errors() {
        let profile = SeasonCatalog::builtin().profile(DEFAULT_SEASON).unwrap().clone();

        let missing = resolve_roster(&static_data(&[("season-df-1", &["AA"])]), &profile);
        assert!(matches!(missing, Err(SeasonConfigError::SeasonNotFound(_))));

        let empty = resolve_roster(&static_data(&[("season-sl-4", &[])]), &profile);
        assert!(matches!(empty, Err(SeasonConfigError::EmptyRoster(_))));

        let dup = resolve_roster(&static_data(&[("season-sl-4", &["ID", "ID"])]), &profile);
        assert!(matches!(dup, Err(SeasonConfigError::DuplicateDungeon { .. })));
    }

    #[test]
    fn catalog_file_loads_and_selects_by_slug() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"profiles":[{{"slug":"season-df-1","expansion_id":9,"improvement_threshold":100.0}}]}}"#
        )
        .unwrap();

        let catalog = SeasonCatalog::from_json_file(file.path()).unwrap();
        let profile = select_profile(&catalog, Some("season-df-1")).unwrap();
        assert_eq!(profile.expansion_id, 9);
        assert_eq!(profile.static_season_slug, None);
        assert_eq!(profile.default_image_key, DEFAULT_IMAGE_KEY);
        assert_eq!(profile.improvement_threshold, Some(100.0));

        let fallback = select_profile(&catalog, None).unwrap();
        assert_eq!(fallback.slug, "season-df-1");

        assert!(matches!(
            select_profile(&catalog, Some("season-x")),
            Err(SeasonConfigError::UnknownProfile(_))
        ));
    }

    #[test]
    fn explicit_overrides_pick_catalog_and_slug() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"profiles":[{{"slug":"season-df-1","expansion_id":9}},{{"slug":"season-df-2","expansion_id":9}}]}}"#
        )
        .unwrap();

        let profile =
            season_profile_with_overrides(Some(" season-df-2 "), Some(file.path())).unwrap();
        assert_eq!(profile.slug, "season-df-2");

        let missing = season_profile_with_overrides(
            Some("season-df-1"),
            Some(Path::new("/nonexistent/ksm-catalog.json")),
        );
        assert!(matches!(missing, Err(SeasonConfigError::CatalogIo { .. })));
    }
}
