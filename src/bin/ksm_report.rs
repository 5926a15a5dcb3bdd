use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use ksm::{
    client_config_from_env, init_logging, log_app_start, logging_config_from_env,
    render_report_html, render_report_text, run_report_query, season_profile_with_overrides,
    InMemoryReportSource, KeystoneReport, LoggingConfig, RaiderIoClient, ReportQuery,
    ReportSource,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
    Html,
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Check a character's progress towards Keystone Master", long_about = None)]
struct Cli {
    /// Server region (us, eu, kr, tw, cn)
    region: String,

    /// Realm name, e.g. "Area 52"
    realm: String,

    /// Character name
    name: String,

    /// Season profile slug; defaults to KSM_SEASON or the built-in season
    #[arg(long)]
    season: Option<String>,

    /// JSON season catalog; defaults to KSM_SEASON_CATALOG or the built-in catalog
    #[arg(long)]
    catalog: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Use bundled demo payloads instead of calling Raider.IO (character us/Illidan/Demokeys)
    #[arg(long)]
    demo: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let logging_cfg = logging_config_from_env(LoggingConfig::cli());
    if let Err(err) = init_logging(&logging_cfg) {
        eprintln!("{err}");
        return ExitCode::FAILURE;
    }
    log_app_start("ksm_report", &logging_cfg);

    match run(&cli) {
        Ok(output) => {
            print!("{output}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<String, Box<dyn std::error::Error>> {
    let query = ReportQuery::new(&cli.region, &cli.realm, &cli.name)?;
    let season = season_profile_with_overrides(cli.season.as_deref(), cli.catalog.as_deref())?;

    let report = if cli.demo {
        InMemoryReportSource::demo(season).report(&query)?
    } else {
        let client = RaiderIoClient::new(client_config_from_env())?;
        run_report_query(&query, &season, &client)?
    };

    render(&report, &query, cli.format)
}

fn render(
    report: &KeystoneReport,
    query: &ReportQuery,
    format: OutputFormat,
) -> Result<String, Box<dyn std::error::Error>> {
    let output = match format {
        OutputFormat::Text => render_report_text(report),
        OutputFormat::Html => render_report_html(report, query),
        OutputFormat::Json => {
            let mut json = serde_json::to_string_pretty(report)?;
            json.push('\n');
            json
        }
    };
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cli(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("ksm_report").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn demo_mode_looks_up_the_requested_character() {
        let args = ["us", "illidan", "demokeys", "--demo", "--format", "json"];
        let output = run(&cli(&args)).unwrap();
        let report: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(report["summary"]["name"], "Demokeys");

        let err = run(&cli(&["us", "Illidan", "Nobody", "--demo"])).unwrap_err();
        assert!(err.to_string().contains("Could not find requested character"), "{err}");
    }

    #[test]
    fn demo_mode_still_validates_input() {
        let err = run(&cli(&["us", " ", "Demokeys", "--demo"])).unwrap_err();
        assert_eq!(
            err.to_string(),
            "You must fill in all required fields before submitting"
        );
    }
}
