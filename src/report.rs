//! Query validation and the end-to-end report pipeline.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use crate::affix::{collect_sourced_runs, partition_runs, AffixBucket};
use crate::matcher::{match_runs, unmatched_runs, CardKey, CardKeyError, DisplayCard};
use crate::payload::{CharacterProfile, StaticSeasonData};
use crate::raiderio::{HttpFetcher, RaiderIoClient};
use crate::season::{resolve_roster, SeasonConfigError, SeasonProfile};
use crate::threshold::{
    apply_improvement_flags, build_player_summary, improvement_threshold, PlayerSummary,
};

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("{0}")]
    InvalidInput(String),
    #[error("Raider.IO returned {status}: {message}")]
    Api { status: u16, message: String },
    #[error("request to Raider.IO failed: {0}")]
    Transport(String),
    #[error("unexpected Raider.IO payload: {0}")]
    Decode(String),
    #[error(transparent)]
    Season(#[from] SeasonConfigError),
    #[error("character has no current-season Mythic+ scores")]
    MissingSeasonScores,
    #[error("no completed run for card {0}")]
    CardNotFound(String),
}

impl From<CardKeyError> for ReportError {
    fn from(err: CardKeyError) -> Self {
        Self::InvalidInput(err.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Region {
    Us,
    Eu,
    Kr,
    Tw,
    Cn,
}

pub const ALL_REGIONS: [Region; 5] = [Region::Us, Region::Eu, Region::Kr, Region::Tw, Region::Cn];

impl Region {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Us => "us",
            Self::Eu => "eu",
            Self::Kr => "kr",
            Self::Tw => "tw",
            Self::Cn => "cn",
        }
    }
}

impl FromStr for Region {
    type Err = ReportError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let normalized = raw.trim().to_ascii_lowercase();
        ALL_REGIONS
            .into_iter()
            .find(|region| region.as_str() == normalized)
            .ok_or_else(|| ReportError::InvalidInput(format!("unknown region: {raw}")))
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportQuery {
    pub region: Region,
    pub realm: String,
    pub character: String,
}

impl ReportQuery {
    /// Trims inputs; realm and character name are required.
    pub fn new(region: &str, realm: &str, character: &str) -> Result<Self, ReportError> {
        let realm = realm.trim();
        let character = character.trim();
        if realm.is_empty() || character.is_empty() {
            return Err(ReportError::InvalidInput(
                "You must fill in all required fields before submitting".to_string(),
            ));
        }

        Ok(Self {
            region: region.parse()?,
            realm: realm.to_string(),
            character: character.to_string(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeystoneReport {
    pub season: String,
    pub summary: PlayerSummary,
    pub improvement_threshold: Option<f64>,
    pub fortified: Vec<DisplayCard>,
    pub tyrannical: Vec<DisplayCard>,
    pub flagged_cards: usize,
    pub unclassified_runs: usize,
    pub unmatched_runs: usize,
}

impl KeystoneReport {
    pub fn cards(&self, bucket: AffixBucket) -> &[DisplayCard] {
        match bucket {
            AffixBucket::Fortified => &self.fortified,
            AffixBucket::Tyrannical => &self.tyrannical,
        }
    }

    pub fn all_cards(&self) -> impl Iterator<Item = &DisplayCard> {
        self.fortified.iter().chain(self.tyrannical.iter())
    }

    pub fn incomplete_count(&self) -> usize {
        self.all_cards().filter(|card| card.is_incomplete()).count()
    }

    pub fn card(&self, key: &CardKey) -> Option<&DisplayCard> {
        self.cards(key.affix).iter().find(|card| &card.key == key)
    }

    /// Reverse lookup from a rendered element id to the run's detail page.
    pub fn detail_url_for_element(&self, element_id: &str) -> Result<&str, ReportError> {
        let key = CardKey::parse_element_id(element_id)?;
        self.card(&key)
            .and_then(|card| card.run.as_ref())
            .map(|run| run.detail_url.as_str())
            .ok_or_else(|| ReportError::CardNotFound(element_id.to_string()))
    }
}

/// Pure pipeline over already-fetched payloads. Same inputs, same report.
pub fn build_report(
    static_data: &StaticSeasonData,
    profile: &CharacterProfile,
    season: &SeasonProfile,
) -> Result<KeystoneReport, ReportError> {
    let roster = resolve_roster(static_data, season)?;
    let summary = build_player_summary(profile)?;

    let runs = collect_sourced_runs(profile);
    let partition = partition_runs(&runs);
    let unmatched = unmatched_runs(&roster, &runs).len();

    let mut fortified = match_runs(
        &roster,
        AffixBucket::Fortified,
        partition.bucket(AffixBucket::Fortified),
    );
    let mut tyrannical = match_runs(
        &roster,
        AffixBucket::Tyrannical,
        partition.bucket(AffixBucket::Tyrannical),
    );

    let threshold = season
        .improvement_threshold
        .or_else(|| improvement_threshold(fortified.len() + tyrannical.len()));
    let flagged = match threshold {
        Some(threshold) => apply_improvement_flags(
            fortified.iter_mut().chain(tyrannical.iter_mut()),
            &summary,
            threshold,
        ),
        None => 0,
    };

    if !partition.unclassified.is_empty() || unmatched > 0 {
        warn!(
            component = "report",
            event = "report.data_contract",
            character = %profile.name,
            unclassified_runs = partition.unclassified.len(),
            unmatched_runs = unmatched
        );
    }

    let report = KeystoneReport {
        season: season.slug.clone(),
        summary,
        improvement_threshold: threshold,
        fortified,
        tyrannical,
        flagged_cards: flagged,
        unclassified_runs: partition.unclassified.len(),
        unmatched_runs: unmatched,
    };

    info!(
        component = "report",
        event = "report.build.finish",
        character = %report.summary.name,
        season = %report.season,
        overall_score = report.summary.overall_score,
        keystone_master = report.summary.is_keystone_master,
        cards = report.fortified.len() + report.tyrannical.len(),
        incomplete = report.incomplete_count(),
        flagged = report.flagged_cards
    );

    Ok(report)
}

/// Static season data first, then the character; the second request is
/// only sent once the first succeeded.
pub fn run_report_query<F: HttpFetcher>(
    query: &ReportQuery,
    season: &SeasonProfile,
    client: &RaiderIoClient<F>,
) -> Result<KeystoneReport, ReportError> {
    info!(
        component = "report",
        event = "report.query.start",
        region = query.region.as_str(),
        realm = %query.realm,
        character = %query.character,
        season = %season.slug
    );

    let result = client
        .fetch_static_data(season.expansion_id)
        .and_then(|static_data| {
            let profile = client.fetch_character_profile(query)?;
            build_report(&static_data, &profile, season)
        });

    if let Err(err) = &result {
        warn!(
            component = "report",
            event = "report.query.error",
            region = query.region.as_str(),
            realm = %query.realm,
            character = %query.character,
            error = %err
        );
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_trims_and_requires_realm_and_character() {
        let query = ReportQuery::new("US", "  Area 52 ", " Tester ").unwrap();
        assert_eq!(query.region, Region::Us);
        assert_eq!(query.realm, "Area 52");
        assert_eq!(query.character, "Tester");

        assert!(matches!(
            ReportQuery::new("us", "", "Tester"),
            Err(ReportError::InvalidInput(_))
        ));
        assert!(matches!(
            ReportQuery::new("us", "Illidan", "   "),
            Err(ReportError::InvalidInput(_))
        ));
    }

    #[test]
    fn unknown_region_is_invalid_input() {
        let err = ReportQuery::new("moon", "Illidan", "Tester").unwrap_err();
        assert_eq!(err.to_string(), "unknown region: moon");
    }

    #[test]
    fn regions_parse_case_insensitively() {
        for region in ALL_REGIONS {
            let upper = region.as_str().to_uppercase();
            assert_eq!(upper.parse::<Region>().unwrap(), region);
        }
    }
}
