use std::{net::SocketAddr, sync::Arc};

use ksm::{
    client_config_from_env, init_logging, log_app_bind, log_app_start, log_source_selected,
    logging_config_from_env, report_router, season_profile_from_env, InMemoryReportSource,
    LiveReportSource, LoggingConfig, ReportSource, SeasonProfile,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let logging_cfg = logging_config_from_env(LoggingConfig::default());
    init_logging(&logging_cfg)?;
    log_app_start("report_server", &logging_cfg);

    let addr: SocketAddr = std::env::var("KSM_SERVER_ADDR")
        .unwrap_or_else(|_| "127.0.0.1:8080".to_string())
        .parse()?;

    let season = season_profile_from_env()?;
    let source = source_from_env(season);
    let app = report_router(source);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    let bound_addr = listener.local_addr()?;

    log_app_bind(bound_addr);
    axum::serve(listener, app).await?;

    Ok(())
}

fn source_from_env(season: SeasonProfile) -> Arc<dyn ReportSource> {
    let use_demo = std::env::var("KSM_USE_DEMO")
        .map(|raw| raw == "1" || raw.eq_ignore_ascii_case("true"))
        .unwrap_or(false);

    if use_demo {
        log_source_selected("demo", Some("KSM_USE_DEMO"), &season.slug);
        Arc::new(InMemoryReportSource::demo(season))
    } else {
        log_source_selected("raiderio", None, &season.slug);
        Arc::new(LiveReportSource::new(client_config_from_env(), season))
    }
}
