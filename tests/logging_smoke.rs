use std::io;
use std::io::Write;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::{Arc, Mutex};

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use ksm::{
    build_report, demo_character_profile, demo_static_data, log_app_bind, log_app_start,
    log_source_selected, report_router, Affix, InMemoryReportSource, LoggingConfig, RunRecord,
    SeasonCatalog, SeasonProfile, DEFAULT_SEASON,
};
use tower::util::ServiceExt;
use tracing::dispatcher::with_default;
use tracing::Level;
use tracing_subscriber::fmt::writer::MakeWriter;

#[derive(Clone, Default)]
struct SharedWriter {
    inner: Arc<Mutex<Vec<u8>>>,
}

impl SharedWriter {
    fn output_string(&self) -> String {
        let bytes = self
            .inner
            .lock()
            .expect("writer lock should not be poisoned");
        String::from_utf8_lossy(&bytes).to_string()
    }
}

struct SharedWriterGuard {
    inner: Arc<Mutex<Vec<u8>>>,
}

impl<'a> MakeWriter<'a> for SharedWriter {
    type Writer = SharedWriterGuard;

    fn make_writer(&'a self) -> Self::Writer {
        SharedWriterGuard {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl Write for SharedWriterGuard {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut out = self
            .inner
            .lock()
            .expect("writer lock should not be poisoned");
        out.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fn capture_logs(max_level: Level, f: impl FnOnce()) -> String {
    let writer = SharedWriter::default();
    let subscriber = tracing_subscriber::fmt()
        .json()
        .with_ansi(false)
        .with_max_level(max_level)
        .with_writer(writer.clone())
        .finish();
    let dispatch = tracing::Dispatch::new(subscriber);

    with_default(&dispatch, f);
    writer.output_string()
}

fn season() -> SeasonProfile {
    SeasonCatalog::builtin()
        .profile(DEFAULT_SEASON)
        .expect("built-in season exists")
        .clone()
}

fn stray_run(short_name: &str, leading_affix: &str) -> RunRecord {
    RunRecord {
        dungeon_short_name: short_name.to_string(),
        dungeon_display_name: short_name.to_string(),
        mythic_level: 12,
        keystone_upgrades: 0,
        affixes: vec![Affix::named(leading_affix)],
        clear_time_ms: 2_000_000,
        par_time_ms: 1_900_000,
        score: 80.0,
        detail_url: String::new(),
    }
}

#[test]
fn report_build_emits_finish_event() {
    let logs = capture_logs(Level::INFO, || {
        let report =
            build_report(&demo_static_data(), &demo_character_profile(), &season()).unwrap();
        assert_eq!(report.incomplete_count(), 0);
    });

    assert!(logs.contains("\"event\":\"report.build.finish\""));
    assert!(!logs.contains("\"event\":\"report.data_contract\""));
}

#[test]
fn stray_runs_are_logged_not_dropped_silently() {
    let mut profile = demo_character_profile();
    profile
        .mythic_plus_best_runs
        .push(stray_run("ID", "Thundering"));
    profile
        .mythic_plus_alternate_runs
        .push(stray_run("SD", "Fortified"));

    let logs = capture_logs(Level::INFO, || {
        let report = build_report(&demo_static_data(), &profile, &season()).unwrap();
        assert_eq!(report.unclassified_runs, 1);
        assert_eq!(report.unmatched_runs, 1);
    });

    assert!(logs.contains("\"event\":\"affix.unclassified\""));
    assert!(logs.contains("\"event\":\"matcher.unmatched_run\""));
    assert!(logs.contains("\"event\":\"report.data_contract\""));
}

#[test]
fn server_lifecycle_helpers_emit_baseline_events() {
    let logs = capture_logs(Level::INFO, || {
        let cfg = LoggingConfig::default();
        log_app_start("report_server", &cfg);
        log_source_selected("demo", Some("KSM_USE_DEMO"), DEFAULT_SEASON);
        log_app_bind(SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 8080));
    });

    assert!(logs.contains("\"event\":\"app.start\""));
    assert!(logs.contains("\"event\":\"source.selected\""));
    assert!(logs.contains("\"event\":\"app.bind\""));
}

#[test]
fn snapshot_route_emits_request_and_error_events() {
    let logs = capture_logs(Level::INFO, || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .expect("single-thread runtime should build");

        rt.block_on(async {
            let app = report_router(Arc::new(InMemoryReportSource::demo(season())));

            let response = app
                .clone()
                .oneshot(
                    Request::builder()
                        .uri("/report/snapshot?region=us&realm=Illidan&name=Demokeys")
                        .body(Body::empty())
                        .expect("request should build"),
                )
                .await
                .expect("snapshot request should succeed");
            assert_eq!(response.status(), StatusCode::OK);

            let response = app
                .oneshot(
                    Request::builder()
                        .uri("/report/snapshot?region=us&realm=&name=Demokeys")
                        .body(Body::empty())
                        .expect("request should build"),
                )
                .await
                .expect("snapshot request should complete");
            assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        });
    });

    assert!(logs.contains("\"event\":\"http.snapshot.request\""));
    assert!(logs.contains("\"event\":\"http.error\""));
}
