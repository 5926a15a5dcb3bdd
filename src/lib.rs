//! Mythic+ Keystone Master progress reports built from Raider.IO data.
//!
//! Pipeline: static season data and character payloads are fetched, runs are
//! split into Fortified/Tyrannical buckets, matched against the season
//! roster, flagged against the improvement threshold, then rendered.

mod affix;
mod assets;
mod clear_time;
mod demo;
mod matcher;
mod observability;
mod payload;
mod raiderio;
mod render;
mod report;
mod season;
mod threshold;
mod web;

pub use affix::{
    classify_runs, collect_sourced_runs, partition_runs, AffixBucket, AffixPartition, RunSource,
    SourcedRun, ALL_BUCKETS,
};
pub use assets::{dungeon_image, dungeon_image_path, IMAGE_CONTENT_TYPE, IMAGE_ROUTE_PREFIX};
pub use clear_time::{format_clear_time, is_timed, keystone_upgrade_marker};
pub use demo::{
    demo_character_profile, demo_static_data, DEMO_CHARACTER, DEMO_DUNGEONS, DEMO_REALM,
    DEMO_REGION,
};
pub use matcher::{
    match_runs, unmatched_runs, CardKey, CardKeyError, CardRun, DisplayCard, INCOMPLETE_TITLE,
};
pub use observability::{
    init_logging, log_app_bind, log_app_start, log_source_selected, logging_config_from_env,
    LogFormat, LoggingConfig, LoggingInitError,
};
pub use payload::{
    Affix, ApiErrorBody, CharacterProfile, RunRecord, ScoreSegment, ScoreSegments, ScoreSet,
    SeasonScores, StaticDungeon, StaticSeason, StaticSeasonData,
};
pub use raiderio::{
    client_config_from_env, decode_response, ClientConfig, HttpFetcher, HttpResponse,
    RaiderIoClient, ReqwestBlockingFetcher, CHARACTER_FIELDS, DEFAULT_API_BASE_URL,
};
pub use render::{
    card_link, render_error_html, render_form_page, render_report_html, render_report_html_at,
    render_report_text, ERROR_DISMISS_MS,
};
pub use report::{
    build_report, run_report_query, KeystoneReport, Region, ReportError, ReportQuery, ALL_REGIONS,
};
pub use season::{
    resolve_roster, season_profile_from_env, season_profile_with_overrides, select_profile, SeasonCatalog, SeasonConfigError,
    SeasonDungeonSlot, SeasonProfile, DEFAULT_IMAGE_KEY, DEFAULT_SEASON,
};
pub use threshold::{
    apply_improvement_flags, build_player_summary, improvement_threshold, is_keystone_master,
    needs_improvement, PlayerSummary, KEYSTONE_MASTER_MESSAGE, KEYSTONE_MASTER_SCORE,
    NOT_YET_MESSAGE,
};
pub use web::{report_router, InMemoryReportSource, LiveReportSource, ReportSource};
