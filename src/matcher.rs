//! Matching of classified runs against the season roster.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::affix::{AffixBucket, RunSource, SourcedRun};
use crate::clear_time::{format_clear_time, is_timed, keystone_upgrade_marker};
use crate::season::SeasonDungeonSlot;

pub const INCOMPLETE_TITLE: &str = "Incomplete";

/// Typed key for one card: dungeon plus affix bucket.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CardKey {
    pub short_name: String,
    pub affix: AffixBucket,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CardKeyError {
    #[error("card id is missing the '-<affix>' suffix: {0}")]
    MissingSeparator(String),
    #[error("card id has an empty dungeon name: {0}")]
    EmptyDungeon(String),
    #[error("card id has an unknown affix code: {0}")]
    UnknownAffixCode(String),
}

impl CardKey {
    pub fn new(short_name: impl Into<String>, affix: AffixBucket) -> Self {
        Self {
            short_name: short_name.into(),
            affix,
        }
    }

    /// `<short_name>-<F|T>`, the id rendered pages and click lookups share.
    pub fn element_id(&self) -> String {
        format!("{}-{}", self.short_name, self.affix.code())
    }

    pub fn parse_element_id(raw: &str) -> Result<Self, CardKeyError> {
        let (short_name, code) = raw
            .rsplit_once('-')
            .ok_or_else(|| CardKeyError::MissingSeparator(raw.to_string()))?;
        if short_name.is_empty() {
            return Err(CardKeyError::EmptyDungeon(raw.to_string()));
        }

        let mut chars = code.chars();
        let affix = match (chars.next(), chars.next()) {
            (Some(code), None) => AffixBucket::from_code(code),
            _ => None,
        }
        .ok_or_else(|| CardKeyError::UnknownAffixCode(raw.to_string()))?;

        Ok(Self::new(short_name, affix))
    }
}

impl fmt::Display for CardKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.element_id())
    }
}

/// Display projection of the run chosen for a card.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardRun {
    pub source: RunSource,
    pub dungeon_name: String,
    pub mythic_level: u32,
    pub upgrade_marker: String,
    pub affixes: Vec<String>,
    pub clear_time: String,
    pub timed: bool,
    pub score: f64,
    pub detail_url: String,
}

impl CardRun {
    fn from_sourced(sourced: &SourcedRun) -> Self {
        let run = &sourced.run;
        Self {
            source: sourced.source,
            dungeon_name: run.dungeon_display_name.clone(),
            mythic_level: run.mythic_level,
            upgrade_marker: keystone_upgrade_marker(run.keystone_upgrades).to_string(),
            affixes: run.affixes.iter().map(|affix| affix.name.clone()).collect(),
            clear_time: format_clear_time(run.clear_time_ms),
            timed: is_timed(run.clear_time_ms, run.par_time_ms),
            score: run.score,
            detail_url: run.detail_url.clone(),
        }
    }

    /// `++15 Iron Docks`
    pub fn title(&self) -> String {
        format!(
            "{}{} {}",
            self.upgrade_marker, self.mythic_level, self.dungeon_name
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplayCard {
    pub key: CardKey,
    pub element_id: String,
    pub image_key: String,
    pub title: String,
    pub run: Option<CardRun>,
    pub needs_improvement: bool,
}

impl DisplayCard {
    pub fn incomplete(slot: &SeasonDungeonSlot, affix: AffixBucket) -> Self {
        let key = CardKey::new(slot.short_name.clone(), affix);
        Self {
            element_id: key.element_id(),
            key,
            image_key: slot.image_key.clone(),
            title: INCOMPLETE_TITLE.to_string(),
            run: None,
            needs_improvement: false,
        }
    }

    fn populated(slot: &SeasonDungeonSlot, affix: AffixBucket, sourced: &SourcedRun) -> Self {
        let run = CardRun::from_sourced(sourced);
        let key = CardKey::new(slot.short_name.clone(), affix);
        Self {
            element_id: key.element_id(),
            key,
            image_key: slot.image_key.clone(),
            title: run.title(),
            run: Some(run),
            needs_improvement: false,
        }
    }

    pub fn is_incomplete(&self) -> bool {
        self.run.is_none()
    }

    pub fn score(&self) -> Option<f64> {
        self.run.as_ref().map(|run| run.score)
    }
}

/// One card per roster slot, in roster order.
///
/// A slot takes the run with the same short name. When several qualify, a
/// best run beats an alternate run, and within one source the earliest run
/// in `runs` wins. Scores are not compared.
pub fn match_runs(
    roster: &[SeasonDungeonSlot],
    affix: AffixBucket,
    runs: &[SourcedRun],
) -> Vec<DisplayCard> {
    roster
        .iter()
        .map(|slot| match select_run(slot, runs) {
            Some(sourced) => {
                debug!(
                    component = "matcher",
                    event = "matcher.slot.matched",
                    dungeon = %slot.short_name,
                    affix = affix.name(),
                    source = ?sourced.source
                );
                DisplayCard::populated(slot, affix, sourced)
            }
            None => DisplayCard::incomplete(slot, affix),
        })
        .collect()
}

fn select_run<'a>(slot: &SeasonDungeonSlot, runs: &'a [SourcedRun]) -> Option<&'a SourcedRun> {
    runs.iter()
        .enumerate()
        .filter(|(_, sourced)| sourced.run.dungeon_short_name == slot.short_name)
        .min_by_key(|(position, sourced)| (sourced.source, *position))
        .map(|(_, sourced)| sourced)
}

/// Runs whose dungeon is not part of the roster, logged as warnings.
pub fn unmatched_runs<'a>(
    roster: &[SeasonDungeonSlot],
    runs: &'a [SourcedRun],
) -> Vec<&'a SourcedRun> {
    let known: HashSet<&str> = roster.iter().map(|slot| slot.short_name.as_str()).collect();

    runs.iter()
        .filter(|sourced| !known.contains(sourced.run.dungeon_short_name.as_str()))
        .inspect(|sourced| {
            warn!(
                component = "matcher",
                event = "matcher.unmatched_run",
                dungeon = %sourced.run.dungeon_short_name,
                source = ?sourced.source
            );
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::affix::tests::{best, run};

    fn roster(names: &[&str]) -> Vec<SeasonDungeonSlot> {
        names
            .iter()
            .map(|name| SeasonDungeonSlot {
                short_name: name.to_string(),
                display_name: format!("Dungeon {name}"),
                image_key: "karazhan".to_string(),
            })
            .collect()
    }

    fn alternate(short_name: &str, leading_affix: &str, score: f64) -> SourcedRun {
        SourcedRun {
            source: RunSource::Alternate,
            run: run(short_name, leading_affix, score),
        }
    }

    #[test]
    fn full_bucket_populates_every_slot_in_roster_order() {
        let slots = roster(&["ID", "GD", "YARD"]);
        let runs = vec![
            best("YARD", "Fortified", 3.0),
            best("ID", "Fortified", 1.0),
            best("GD", "Fortified", 2.0),
        ];

        let cards = match_runs(&slots, AffixBucket::Fortified, &runs);
        assert_eq!(cards.len(), 3);
        assert!(cards.iter().all(|card| !card.is_incomplete()));
        assert_eq!(cards[0].key.short_name, "ID");
        assert_eq!(cards[0].score(), Some(1.0));
        assert_eq!(cards[2].element_id, "YARD-F");
    }

    #[test]
    fn empty_bucket_yields_all_incomplete() {
        let slots = roster(&["ID", "GD"]);
        let cards = match_runs(&slots, AffixBucket::Tyrannical, &[]);

        assert_eq!(cards.len(), 2);
        for card in &cards {
            assert!(card.is_incomplete());
            assert_eq!(card.title, INCOMPLETE_TITLE);
            assert_eq!(card.score(), None);
        }
        assert_eq!(cards[1].element_id, "GD-T");
    }

    #[test]
    fn earlier_run_wins_within_same_source() {
        let slots = roster(&["ID"]);
        let runs = vec![best("ID", "Fortified", 50.0), best("ID", "Fortified", 150.0)];

        let cards = match_runs(&slots, AffixBucket::Fortified, &runs);
        assert_eq!(cards[0].score(), Some(50.0));
    }

    #[test]
    fn best_run_beats_alternate_regardless_of_position() {
        let slots = roster(&["ID"]);
        let runs = vec![
            alternate("ID", "Fortified", 200.0),
            best("ID", "Fortified", 90.0),
        ];

        let cards = match_runs(&slots, AffixBucket::Fortified, &runs);
        let chosen = cards[0].run.as_ref().unwrap();
        assert_eq!(chosen.source, RunSource::Best);
        assert_eq!(chosen.score, 90.0);
    }

    #[test]
    fn populated_card_carries_formatted_fields() {
        let slots = roster(&["ID"]);
        let mut sourced = best("ID", "Tyrannical", 140.2);
        sourced.run.keystone_upgrades = 2;
        sourced.run.clear_time_ms = 1_900_000;
        sourced.run.par_time_ms = 1_800_000;

        let cards = match_runs(&slots, AffixBucket::Tyrannical, &[sourced]);
        let card_run = cards[0].run.as_ref().unwrap();
        assert_eq!(cards[0].title, "++15 Dungeon ID");
        assert_eq!(card_run.clear_time, "00:31:40.000");
        assert!(!card_run.timed);
        assert_eq!(card_run.affixes.len(), 4);
    }

    #[test]
    fn runs_outside_roster_are_reported() {
        let slots = roster(&["ID"]);
        let runs = vec![best("ID", "Fortified", 1.0), best("SD", "Fortified", 2.0)];

        let unmatched = unmatched_runs(&slots, &runs);
        assert_eq!(unmatched.len(), 1);
        assert_eq!(unmatched[0].run.dungeon_short_name, "SD");
    }

    #[test]
    fn element_ids_parse_back_into_keys() {
        let key = CardKey::new("UPPR", AffixBucket::Tyrannical);
        assert_eq!(key.element_id(), "UPPR-T");
        assert_eq!(CardKey::parse_element_id("UPPR-T").unwrap(), key);
        assert_eq!(
            CardKey::parse_element_id("SOME-NAME-F").unwrap(),
            CardKey::new("SOME-NAME", AffixBucket::Fortified)
        );
    }

    #[test]
    fn malformed_element_ids_are_rejected() {
        assert!(matches!(
            CardKey::parse_element_id("UPPR"),
            Err(CardKeyError::MissingSeparator(_))
        ));
        assert!(matches!(
            CardKey::parse_element_id("-F"),
            Err(CardKeyError::EmptyDungeon(_))
        ));
        assert!(matches!(
            CardKey::parse_element_id("UPPR-X"),
            Err(CardKeyError::UnknownAffixCode(_))
        ));
        assert!(matches!(
            CardKey::parse_element_id("UPPR-FT"),
            Err(CardKeyError::UnknownAffixCode(_))
        ));
    }
}
