//! Offline payloads for the demo server source and tests.

use crate::payload::{
    Affix, CharacterProfile, RunRecord, ScoreSegment, ScoreSegments, ScoreSet, SeasonScores,
    StaticDungeon, StaticSeason, StaticSeasonData,
};
use crate::season::DEFAULT_SEASON;

pub const DEMO_DUNGEONS: [(&str, &str); 8] = [
    ("YARD", "Mechagon Junkyard"),
    ("WORK", "Mechagon Workshop"),
    ("UPPR", "Return to Karazhan: Upper"),
    ("LOWR", "Return to Karazhan: Lower"),
    ("GMBT", "Tazavesh: So'leah's Gambit"),
    ("STRT", "Tazavesh: Streets of Wonder"),
    ("ID", "Iron Docks"),
    ("GD", "Grimrail Depot"),
];

pub const DEMO_REGION: &str = "us";
pub const DEMO_REALM: &str = "Illidan";
pub const DEMO_CHARACTER: &str = "Demokeys";

const SEASONAL_AFFIXES: [&str; 3] = ["Bursting", "Storming", "Tormented"];

pub fn demo_static_data() -> StaticSeasonData {
    StaticSeasonData {
        seasons: vec![StaticSeason {
            slug: DEFAULT_SEASON.to_string(),
            name: "SL Season 4".to_string(),
            dungeons: DEMO_DUNGEONS
                .iter()
                .enumerate()
                .map(|(idx, (short_name, name))| StaticDungeon {
                    short_name: short_name.to_string(),
                    name: name.to_string(),
                    id: Some(idx as u32 + 1),
                    slug: None,
                })
                .collect(),
        }],
    }
}

/// Character one tier short of Keystone Master. Every dungeon has a best run
/// and an alternate run under the other affix, so all 16 cards are filled.
pub fn demo_character_profile() -> CharacterProfile {
    let mut best_runs = Vec::with_capacity(DEMO_DUNGEONS.len());
    let mut alternate_runs = Vec::with_capacity(DEMO_DUNGEONS.len());

    for (idx, (short_name, name)) in DEMO_DUNGEONS.iter().enumerate() {
        let (best_affix, alternate_affix) = if idx % 2 == 0 {
            ("Fortified", "Tyrannical")
        } else {
            ("Tyrannical", "Fortified")
        };
        let level = 14 + (idx as u32 % 3);

        best_runs.push(demo_run(
            short_name,
            name,
            best_affix,
            level,
            118.0 + idx as f64 * 2.5,
            idx,
        ));
        alternate_runs.push(demo_run(
            short_name,
            name,
            alternate_affix,
            level - 1,
            108.0 + idx as f64 * 2.0,
            idx + DEMO_DUNGEONS.len(),
        ));
    }

    CharacterProfile {
        name: DEMO_CHARACTER.to_string(),
        region: DEMO_REGION.to_string(),
        realm: DEMO_REALM.to_string(),
        thumbnail_url: "https://render.worldofwarcraft.com/us/character/illidan/demo-avatar.jpg"
            .to_string(),
        profile_url: "https://raider.io/characters/us/illidan/Demokeys".to_string(),
        mythic_plus_scores_by_season: vec![SeasonScores {
            season: DEFAULT_SEASON.to_string(),
            scores: ScoreSet { all: 1800.0 },
            segments: ScoreSegments {
                all: ScoreSegment {
                    score: 1800.0,
                    color: "#b35ee6".to_string(),
                },
            },
        }],
        mythic_plus_best_runs: best_runs,
        mythic_plus_alternate_runs: alternate_runs,
    }
}

fn demo_run(
    short_name: &str,
    name: &str,
    leading_affix: &str,
    mythic_level: u32,
    score: f64,
    run_id: usize,
) -> RunRecord {
    let par_time_ms = 1_800_000 + (run_id as u64 % 4) * 120_000;
    let clear_time_ms = if run_id % 5 == 4 {
        par_time_ms + 61_234
    } else {
        par_time_ms - 95_000 - run_id as u64 * 1_001
    };

    let mut affixes = vec![Affix::named(leading_affix)];
    affixes.extend(SEASONAL_AFFIXES.iter().map(|affix| Affix::named(*affix)));

    let keystone_upgrades = if clear_time_ms < par_time_ms {
        1 + (run_id % 3) as u8
    } else {
        0
    };

    RunRecord {
        dungeon_short_name: short_name.to_string(),
        dungeon_display_name: name.to_string(),
        mythic_level,
        keystone_upgrades,
        affixes,
        clear_time_ms,
        par_time_ms,
        score,
        detail_url: format!(
            "https://raider.io/mythic-plus-runs/{}/{}-{}-{}",
            DEFAULT_SEASON,
            9_000_000 + run_id,
            mythic_level,
            short_name.to_ascii_lowercase()
        ),
    }
}
