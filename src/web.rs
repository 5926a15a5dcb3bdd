//! HTTP routes: query form, HTML report, JSON snapshot, card click-through,
//! bundled dungeon images.

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Redirect, Response},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use tracing::{info, warn};

use crate::assets::{dungeon_image, IMAGE_CONTENT_TYPE};
use crate::demo::{demo_character_profile, demo_static_data};
use crate::payload::{CharacterProfile, StaticSeasonData};
use crate::raiderio::{ClientConfig, RaiderIoClient};
use crate::render::{render_error_html, render_form_page, render_report_html};
use crate::report::{build_report, run_report_query, KeystoneReport, ReportError, ReportQuery};
use crate::season::SeasonProfile;

/// Produces a fresh report per query. Implementations may block.
pub trait ReportSource: Send + Sync + 'static {
    fn report(&self, query: &ReportQuery) -> Result<KeystoneReport, ReportError>;
}

/// Queries Raider.IO for every request.
pub struct LiveReportSource {
    client_config: ClientConfig,
    season: SeasonProfile,
}

impl LiveReportSource {
    pub fn new(client_config: ClientConfig, season: SeasonProfile) -> Self {
        Self {
            client_config,
            season,
        }
    }
}

impl ReportSource for LiveReportSource {
    fn report(&self, query: &ReportQuery) -> Result<KeystoneReport, ReportError> {
        // Blocking client is built per query on the worker thread.
        let client = RaiderIoClient::new(self.client_config.clone())?;
        run_report_query(query, &self.season, &client)
    }
}

/// Serves reports from payloads held in memory, keyed by realm and character
/// name (case-insensitive).
#[derive(Clone)]
pub struct InMemoryReportSource {
    static_data: Arc<StaticSeasonData>,
    profiles: Arc<HashMap<(String, String), CharacterProfile>>,
    season: SeasonProfile,
}

impl InMemoryReportSource {
    pub fn new(
        static_data: StaticSeasonData,
        profiles: Vec<CharacterProfile>,
        season: SeasonProfile,
    ) -> Self {
        let profiles = profiles
            .into_iter()
            .map(|profile| (profile_key(&profile.realm, &profile.name), profile))
            .collect();
        Self {
            static_data: Arc::new(static_data),
            profiles: Arc::new(profiles),
            season,
        }
    }

    pub fn demo(season: SeasonProfile) -> Self {
        Self::new(demo_static_data(), vec![demo_character_profile()], season)
    }
}

impl ReportSource for InMemoryReportSource {
    fn report(&self, query: &ReportQuery) -> Result<KeystoneReport, ReportError> {
        let profile = self
            .profiles
            .get(&profile_key(&query.realm, &query.character))
            .ok_or_else(|| ReportError::Api {
                status: 400,
                message: "Could not find requested character".to_string(),
            })?;
        build_report(&self.static_data, profile, &self.season)
    }
}

fn profile_key(realm: &str, name: &str) -> (String, String) {
    (realm.trim().to_lowercase(), name.trim().to_lowercase())
}

pub fn report_router(source: Arc<dyn ReportSource>) -> Router {
    Router::new()
        .route("/", get(get_index))
        .route("/report", get(get_report_html))
        .route("/report/snapshot", get(get_report_snapshot))
        .route("/report/run", get(get_report_run))
        .route("/img/{file}", get(get_dungeon_image))
        .with_state(ReportAppState { source })
}

#[derive(Clone)]
struct ReportAppState {
    source: Arc<dyn ReportSource>,
}

#[derive(Debug, Default, Deserialize)]
struct ReportParams {
    region: Option<String>,
    realm: Option<String>,
    name: Option<String>,
    card: Option<String>,
}

impl ReportParams {
    fn query(&self) -> Result<ReportQuery, ReportError> {
        ReportQuery::new(
            self.region.as_deref().unwrap_or("us"),
            self.realm.as_deref().unwrap_or_default(),
            self.name.as_deref().unwrap_or_default(),
        )
    }
}

fn status_for(err: &ReportError) -> StatusCode {
    match err {
        ReportError::InvalidInput(_) | ReportError::Api { .. } => StatusCode::BAD_REQUEST,
        ReportError::CardNotFound(_) => StatusCode::NOT_FOUND,
        ReportError::MissingSeasonScores => StatusCode::UNPROCESSABLE_ENTITY,
        ReportError::Transport(_) | ReportError::Decode(_) | ReportError::Season(_) => {
            StatusCode::BAD_GATEWAY
        }
    }
}

async fn load_report(
    state: &ReportAppState,
    query: ReportQuery,
) -> Result<(ReportQuery, KeystoneReport), ReportError> {
    let source = Arc::clone(&state.source);
    tokio::task::spawn_blocking(move || -> Result<_, ReportError> {
        let report = source.report(&query)?;
        Ok((query, report))
    })
    .await
    .map_err(|err| ReportError::Transport(format!("report worker failed: {err}")))?
}

async fn get_dungeon_image(Path(file): Path<String>) -> Response {
    let image = file.strip_suffix(".svg").and_then(dungeon_image);
    match image {
        Some(svg) => (
            [
                (header::CONTENT_TYPE, IMAGE_CONTENT_TYPE),
                (header::CACHE_CONTROL, "public, max-age=86400"),
            ],
            svg,
        )
            .into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn get_index() -> impl IntoResponse {
    Html(render_form_page(None, None))
}

async fn get_report_html(
    State(state): State<ReportAppState>,
    Query(params): Query<ReportParams>,
) -> Response {
    let query = match params.query() {
        Ok(query) => query,
        Err(err) => return error_page(&err, None),
    };

    info!(
        component = "web",
        event = "http.report.request",
        region = query.region.as_str(),
        realm = %query.realm,
        character = %query.character
    );

    match load_report(&state, query.clone()).await {
        Ok((query, report)) => Html(render_report_html(&report, &query)).into_response(),
        Err(err) => error_page(&err, Some(&query)),
    }
}

async fn get_report_snapshot(
    State(state): State<ReportAppState>,
    Query(params): Query<ReportParams>,
) -> Response {
    let query = match params.query() {
        Ok(query) => query,
        Err(err) => return error_json(&err),
    };

    info!(
        component = "web",
        event = "http.snapshot.request",
        region = query.region.as_str(),
        realm = %query.realm,
        character = %query.character
    );

    match load_report(&state, query).await {
        Ok((_, report)) => Json(report).into_response(),
        Err(err) => error_json(&err),
    }
}

/// Re-runs the query and redirects to the detail page of the clicked card.
async fn get_report_run(
    State(state): State<ReportAppState>,
    Query(params): Query<ReportParams>,
) -> Response {
    let query = match params.query() {
        Ok(query) => query,
        Err(err) => return error_page(&err, None),
    };
    let Some(card) = params.card.clone() else {
        let err = ReportError::InvalidInput("missing card id".to_string());
        return error_page(&err, Some(&query));
    };

    info!(
        component = "web",
        event = "http.run.request",
        realm = %query.realm,
        character = %query.character,
        card = %card
    );

    let report = match load_report(&state, query.clone()).await {
        Ok((_, report)) => report,
        Err(err) => return error_page(&err, Some(&query)),
    };

    match report.detail_url_for_element(&card) {
        Ok(url) => Redirect::to(url).into_response(),
        Err(err) => error_page(&err, Some(&query)),
    }
}

fn error_page(err: &ReportError, query: Option<&ReportQuery>) -> Response {
    let status = status_for(err);
    warn!(
        component = "web",
        event = "http.error",
        status = status.as_u16(),
        error = %err
    );
    (status, Html(render_error_html(&err.to_string(), query))).into_response()
}

fn error_json(err: &ReportError) -> Response {
    let status = status_for(err);
    warn!(
        component = "web",
        event = "http.error",
        status = status.as_u16(),
        error = %err
    );
    (
        status,
        Json(serde_json::json!({
            "statusCode": status.as_u16(),
            "message": err.to_string(),
        })),
    )
        .into_response()
}
