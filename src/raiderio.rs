//! Raider.IO REST client: static season data and character profiles.

use std::env;
use std::time::{Duration, Instant};

use reqwest::Url;
use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};

use crate::payload::{ApiErrorBody, CharacterProfile, StaticSeasonData};
use crate::report::{ReportError, ReportQuery};

pub const DEFAULT_API_BASE_URL: &str = "https://raider.io/api/v1";
pub const CHARACTER_FIELDS: &str =
    "mythic_plus_scores_by_season:current,mythic_plus_best_runs,mythic_plus_alternate_runs";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub base_url: String,
    pub http_timeout_ms: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_BASE_URL.to_string(),
            http_timeout_ms: 10_000,
        }
    }
}

pub fn client_config_from_env() -> ClientConfig {
    let mut config = ClientConfig::default();

    if let Ok(base_url) = env::var("KSM_API_BASE_URL") {
        let trimmed = base_url.trim().trim_end_matches('/');
        if !trimmed.is_empty() {
            config.base_url = trimmed.to_string();
        }
    }

    if let Ok(timeout) = env::var("KSM_HTTP_TIMEOUT_MS") {
        if let Ok(parsed) = timeout.trim().parse::<u64>() {
            if parsed > 0 {
                config.http_timeout_ms = parsed;
            }
        }
    }

    config
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

pub trait HttpFetcher {
    fn get(&self, url: &Url) -> Result<HttpResponse, ReportError>;
}

pub struct ReqwestBlockingFetcher {
    client: reqwest::blocking::Client,
}

impl ReqwestBlockingFetcher {
    pub fn new(timeout_ms: u64) -> Result<Self, ReportError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_millis(timeout_ms))
            .build()
            .map_err(|err| ReportError::Transport(format!("HTTP client build error: {err}")))?;
        Ok(Self { client })
    }
}

impl HttpFetcher for ReqwestBlockingFetcher {
    fn get(&self, url: &Url) -> Result<HttpResponse, ReportError> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .map_err(|err| ReportError::Transport(err.to_string()))?;

        let status = response.status().as_u16();
        let body = response
            .bytes()
            .map_err(|err| ReportError::Transport(err.to_string()))?;

        Ok(HttpResponse {
            status,
            body: body.to_vec(),
        })
    }
}

pub struct RaiderIoClient<F = ReqwestBlockingFetcher> {
    config: ClientConfig,
    fetcher: F,
}

impl RaiderIoClient<ReqwestBlockingFetcher> {
    pub fn new(config: ClientConfig) -> Result<Self, ReportError> {
        let fetcher = ReqwestBlockingFetcher::new(config.http_timeout_ms)?;
        Ok(Self { config, fetcher })
    }
}

impl<F: HttpFetcher> RaiderIoClient<F> {
    pub fn with_fetcher(config: ClientConfig, fetcher: F) -> Self {
        Self { config, fetcher }
    }

    pub fn static_data_url(&self, expansion_id: u32) -> Result<Url, ReportError> {
        let expansion_id = expansion_id.to_string();
        self.endpoint(
            "mythic-plus/static-data",
            &[("expansion_id", expansion_id.as_str())],
        )
    }

    pub fn character_profile_url(&self, query: &ReportQuery) -> Result<Url, ReportError> {
        self.endpoint(
            "characters/profile",
            &[
                ("region", query.region.as_str()),
                ("realm", query.realm.as_str()),
                ("name", query.character.as_str()),
                ("fields", CHARACTER_FIELDS),
            ],
        )
    }

    pub fn fetch_static_data(&self, expansion_id: u32) -> Result<StaticSeasonData, ReportError> {
        let url = self.static_data_url(expansion_id)?;
        self.fetch_json("static_data", &url)
    }

    pub fn fetch_character_profile(
        &self,
        query: &ReportQuery,
    ) -> Result<CharacterProfile, ReportError> {
        let url = self.character_profile_url(query)?;
        self.fetch_json("character_profile", &url)
    }

    fn endpoint(&self, path: &str, params: &[(&str, &str)]) -> Result<Url, ReportError> {
        let raw = format!("{}/{}", self.config.base_url.trim_end_matches('/'), path);
        Url::parse_with_params(&raw, params)
            .map_err(|err| ReportError::InvalidInput(format!("invalid Raider.IO URL {raw}: {err}")))
    }

    fn fetch_json<T: DeserializeOwned>(&self, resource: &str, url: &Url) -> Result<T, ReportError> {
        let started = Instant::now();
        debug!(
            component = "raiderio",
            event = "raiderio.fetch.start",
            resource,
            url = %url
        );

        let response = self.fetcher.get(url).inspect_err(|err| {
            warn!(
                component = "raiderio",
                event = "raiderio.fetch.transport_error",
                resource,
                error = %err
            );
        })?;

        let decoded = decode_response(&response);
        match &decoded {
            Ok(_) => info!(
                component = "raiderio",
                event = "raiderio.fetch.finish",
                resource,
                status = response.status,
                bytes = response.body.len(),
                elapsed_ms = started.elapsed().as_millis() as u64
            ),
            Err(err) => warn!(
                component = "raiderio",
                event = "raiderio.fetch.error",
                resource,
                status = response.status,
                error = %err
            ),
        }

        decoded
    }
}

/// Error bodies (`{"statusCode": 400, ...}`) win over the HTTP status.
pub fn decode_response<T: DeserializeOwned>(response: &HttpResponse) -> Result<T, ReportError> {
    if let Ok(api_error) = serde_json::from_slice::<ApiErrorBody>(&response.body) {
        if api_error.status_code >= 400 {
            return Err(ReportError::Api {
                status: api_error.status_code,
                message: api_error.message,
            });
        }
    }

    if !(200..300).contains(&response.status) {
        return Err(ReportError::Api {
            status: response.status,
            message: format!("unexpected HTTP status {}", response.status),
        });
    }

    serde_json::from_slice(&response.body).map_err(|err| ReportError::Decode(err.to_string()))
}
