//! Keystone Master status and per-card improvement flags.

use serde::{Deserialize, Serialize};

use crate::matcher::DisplayCard;
use crate::payload::CharacterProfile;
use crate::report::ReportError;

pub const KEYSTONE_MASTER_SCORE: f64 = 2000.0;

pub const KEYSTONE_MASTER_MESSAGE: &str = "You are a Keystone Master!";
pub const NOT_YET_MESSAGE: &str = "Oof... You're not quite a Keystone Master just yet.";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerSummary {
    pub name: String,
    pub thumbnail_url: String,
    pub overall_score: f64,
    pub score_color: String,
    pub is_keystone_master: bool,
}

impl PlayerSummary {
    pub fn status_message(&self) -> &'static str {
        if self.is_keystone_master {
            KEYSTONE_MASTER_MESSAGE
        } else {
            NOT_YET_MESSAGE
        }
    }
}

pub fn is_keystone_master(overall_score: f64) -> bool {
    overall_score >= KEYSTONE_MASTER_SCORE
}

/// Reads the current-season entry (`mythic_plus_scores_by_season[0]`).
pub fn build_player_summary(profile: &CharacterProfile) -> Result<PlayerSummary, ReportError> {
    let season = profile
        .mythic_plus_scores_by_season
        .first()
        .ok_or(ReportError::MissingSeasonScores)?;
    let overall_score = season.scores.all;

    Ok(PlayerSummary {
        name: profile.name.clone(),
        thumbnail_url: profile.thumbnail_url.clone(),
        overall_score,
        score_color: season.segments.all.color.clone(),
        is_keystone_master: is_keystone_master(overall_score),
    })
}

/// Even share of the Keystone Master score per card (125 for 16 cards).
pub fn improvement_threshold(card_count: usize) -> Option<f64> {
    if card_count == 0 {
        return None;
    }
    Some(KEYSTONE_MASTER_SCORE / card_count as f64)
}

pub fn needs_improvement(score: f64, threshold: f64) -> bool {
    score < threshold
}

/// Flags populated cards below `threshold`. Players already at Keystone
/// Master get no flags at all.
pub fn apply_improvement_flags<'a>(
    cards: impl IntoIterator<Item = &'a mut DisplayCard>,
    summary: &PlayerSummary,
    threshold: f64,
) -> usize {
    let mut flagged = 0;
    for card in cards {
        card.needs_improvement = !summary.is_keystone_master
            && card
                .score()
                .map(|score| needs_improvement(score, threshold))
                .unwrap_or(false);
        if card.needs_improvement {
            flagged += 1;
        }
    }
    flagged
}
