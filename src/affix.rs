//! Affix bucket classification of run records.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::payload::{CharacterProfile, RunRecord};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AffixBucket {
    Fortified,
    Tyrannical,
}

pub const ALL_BUCKETS: [AffixBucket; 2] = [AffixBucket::Fortified, AffixBucket::Tyrannical];

impl AffixBucket {
    pub fn name(self) -> &'static str {
        match self {
            Self::Fortified => "Fortified",
            Self::Tyrannical => "Tyrannical",
        }
    }

    /// Single-letter code used in rendered element ids.
    pub fn code(self) -> char {
        match self {
            Self::Fortified => 'F',
            Self::Tyrannical => 'T',
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        ALL_BUCKETS.into_iter().find(|bucket| bucket.name() == name)
    }

    pub fn from_code(code: char) -> Option<Self> {
        ALL_BUCKETS.into_iter().find(|bucket| bucket.code() == code)
    }
}

/// Which character list a run was taken from.
///
/// Ordering matters: `Best` sorts before `Alternate`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RunSource {
    Best,
    Alternate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourcedRun {
    pub source: RunSource,
    pub run: RunRecord,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct AffixPartition {
    pub fortified: Vec<SourcedRun>,
    pub tyrannical: Vec<SourcedRun>,
    pub unclassified: Vec<SourcedRun>,
}

impl AffixPartition {
    pub fn bucket(&self, bucket: AffixBucket) -> &[SourcedRun] {
        match bucket {
            AffixBucket::Fortified => &self.fortified,
            AffixBucket::Tyrannical => &self.tyrannical,
        }
    }
}

/// Best runs followed by alternate runs. Duplicates across the lists are kept.
pub fn collect_sourced_runs(profile: &CharacterProfile) -> Vec<SourcedRun> {
    let best = profile.mythic_plus_best_runs.iter().map(|run| SourcedRun {
        source: RunSource::Best,
        run: run.clone(),
    });
    let alternate = profile.mythic_plus_alternate_runs.iter().map(|run| SourcedRun {
        source: RunSource::Alternate,
        run: run.clone(),
    });

    best.chain(alternate).collect()
}

/// Order-preserving subsequence of `runs` whose first affix is `bucket`.
pub fn classify_runs(runs: &[SourcedRun], bucket: AffixBucket) -> Vec<SourcedRun> {
    runs.iter()
        .filter(|sourced| sourced.run.leading_affix_name() == Some(bucket.name()))
        .cloned()
        .collect()
}

/// Splits runs into both buckets in one pass.
///
/// Runs with no affixes or an unknown leading affix land in `unclassified`
/// and are reported with a warning; they never reach either bucket.
pub fn partition_runs(runs: &[SourcedRun]) -> AffixPartition {
    let mut partition = AffixPartition::default();

    for sourced in runs {
        match sourced.run.leading_affix_name().and_then(AffixBucket::from_name) {
            Some(AffixBucket::Fortified) => partition.fortified.push(sourced.clone()),
            Some(AffixBucket::Tyrannical) => partition.tyrannical.push(sourced.clone()),
            None => {
                warn!(
                    component = "affix",
                    event = "affix.unclassified",
                    dungeon = %sourced.run.dungeon_short_name,
                    source = ?sourced.source,
                    leading_affix = sourced.run.leading_affix_name().unwrap_or("<none>")
                );
                partition.unclassified.push(sourced.clone());
            }
        }
    }

    partition
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::payload::Affix;

    pub(crate) fn run(short_name: &str, leading_affix: &str, score: f64) -> RunRecord {
        let affixes = if leading_affix.is_empty() {
            Vec::new()
        } else {
            vec![
                Affix::named(leading_affix),
                Affix::named("Bolstering"),
                Affix::named("Explosive"),
                Affix::named("Encrypted"),
            ]
        };

        RunRecord {
            dungeon_short_name: short_name.to_string(),
            dungeon_display_name: format!("Dungeon {short_name}"),
            mythic_level: 15,
            keystone_upgrades: 1,
            affixes,
            clear_time_ms: 1_700_000,
            par_time_ms: 1_800_000,
            score,
            detail_url: format!("https://raider.io/mythic-plus-runs/{short_name}-{leading_affix}"),
        }
    }

    pub(crate) fn best(short_name: &str, leading_affix: &str, score: f64) -> SourcedRun {
        SourcedRun {
            source: RunSource::Best,
            run: run(short_name, leading_affix, score),
        }
    }

    #[test]
    fn classify_preserves_relative_order() {
        let runs = vec![
            best("ID", "Fortified", 1.0),
            best("GD", "Tyrannical", 2.0),
            best("YARD", "Fortified", 3.0),
        ];

        let fortified = classify_runs(&runs, AffixBucket::Fortified);
        let names: Vec<_> = fortified
            .iter()
            .map(|sourced| sourced.run.dungeon_short_name.as_str())
            .collect();
        assert_eq!(names, vec!["ID", "YARD"]);
    }

    #[test]
    fn buckets_are_disjoint_and_cover_known_affixes() {
        let runs = vec![
            best("ID", "Fortified", 1.0),
            best("GD", "Tyrannical", 2.0),
            best("WORK", "Tyrannical", 3.0),
        ];

        let fortified = classify_runs(&runs, AffixBucket::Fortified);
        let tyrannical = classify_runs(&runs, AffixBucket::Tyrannical);
        assert_eq!(fortified.len() + tyrannical.len(), runs.len());
        assert!(fortified.iter().all(|run| !tyrannical.contains(run)));
    }

    #[test]
    fn unknown_or_missing_leading_affix_is_excluded_from_both() {
        let runs = vec![
            best("ID", "Fortified", 1.0),
            best("GD", "Thundering", 2.0),
            best("WORK", "", 3.0),
        ];

        let fortified = classify_runs(&runs, AffixBucket::Fortified);
        let tyrannical = classify_runs(&runs, AffixBucket::Tyrannical);
        assert!(fortified.len() + tyrannical.len() < runs.len());

        let partition = partition_runs(&runs);
        assert_eq!(partition.fortified.len(), 1);
        assert!(partition.tyrannical.is_empty());
        assert_eq!(partition.unclassified.len(), 2);
    }

    #[test]
    fn duplicates_across_lists_are_retained_best_first() {
        let duplicate = run("ID", "Fortified", 100.0);
        let profile = CharacterProfile {
            name: "Tester".to_string(),
            region: "us".to_string(),
            realm: "Illidan".to_string(),
            thumbnail_url: String::new(),
            profile_url: String::new(),
            mythic_plus_scores_by_season: Vec::new(),
            mythic_plus_best_runs: vec![duplicate.clone()],
            mythic_plus_alternate_runs: vec![duplicate],
        };

        let runs = collect_sourced_runs(&profile);
        assert_eq!(runs.len(), 2);
        assert_eq!(runs[0].source, RunSource::Best);
        assert_eq!(runs[1].source, RunSource::Alternate);
    }

    #[test]
    fn codes_round_trip_through_bucket_lookup() {
        assert_eq!(AffixBucket::from_code('F'), Some(AffixBucket::Fortified));
        assert_eq!(AffixBucket::from_code('T'), Some(AffixBucket::Tyrannical));
        assert_eq!(AffixBucket::from_code('X'), None);
        assert!(RunSource::Best < RunSource::Alternate);
    }
}
