//! CLI integration tests against real INI and CSV files on disk.
//!
//! Tests cover:
//! - Settings loading and relative data directories
//! - Exit codes for config, data and input failures
//! - Advisor built from files end to end
//! - Report formatting

mod common;

use clap::Parser;
use common::*;
use sellcast::cli::{self, Cli};
use sellcast::domain::advice::AdviceRequest;
use sellcast::domain::error::SellcastError;
use sellcast::domain::risk::AdvisoryRecord;
use sellcast::domain::trend::TrendDirection;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tempfile::TempDir;

struct Workspace {
    _dir: TempDir,
    config: PathBuf,
}

fn workspace(ini: &str) -> Workspace {
    let dir = TempDir::new().unwrap();
    let prices = dir.path().join("prices");
    fs::create_dir(&prices).unwrap();
    fs::write(
        prices.join("wheat_prices.csv"),
        price_csv("2026-02-01", &ramp(2200.0, 5.0, 45)),
    )
    .unwrap();
    fs::write(prices.join("broken_prices.csv"), "date,price\n2026-02-01,abc\n").unwrap();
    fs::write(
        prices.join("wheat_mandi.csv"),
        mandi_csv(
            "2026-03-01",
            &[
                ("Khanna", "Ludhiana", &ramp(2380.0, 5.0, 14)[..]),
                ("Rajpura", "Patiala", &[2400.0; 14][..]),
                ("Jagraon", "Ludhiana", &ramp(2300.0, -5.0, 14)[..]),
            ],
        ),
    )
    .unwrap();

    let config = dir.path().join("sellcast.ini");
    fs::write(&config, ini).unwrap();
    Workspace { _dir: dir, config }
}

const VALID_INI: &str = r#"
[data]
dir = prices
series_ttl_secs = 300
report_ttl_secs = 120

[simulation]
num_paths = 300

[msp]
wheat = 2425
"#;

fn run_args(args: &[&str]) -> ExitCode {
    let mut argv = vec!["sellcast"];
    argv.extend_from_slice(args);
    cli::run(Cli::try_parse_from(argv).unwrap())
}

fn config_arg(ws: &Workspace) -> &str {
    ws.config.to_str().unwrap()
}

mod config_loading {
    use super::*;

    #[test]
    fn relative_data_dir_follows_config_file() {
        let ws = workspace(VALID_INI);
        let settings = cli::load_settings(&ws.config).unwrap();
        assert_eq!(settings.data.dir, ws.config.parent().unwrap().join("prices"));
        assert_eq!(settings.simulation.num_paths, 300);
        assert_eq!(settings.msp.msp_for("wheat"), 2425.0);
    }

    #[test]
    fn absolute_data_dir_is_kept() {
        let ws = workspace("[data]\ndir = /opt/sellcast/prices\n");
        let settings = cli::load_settings(&ws.config).unwrap();
        assert_eq!(settings.data.dir, Path::new("/opt/sellcast/prices"));
    }

    #[test]
    fn missing_config_file_is_parse_error() {
        let err = cli::load_config(Path::new("/nonexistent/sellcast.ini")).unwrap_err();
        assert!(matches!(err, SellcastError::ConfigParse { .. }));
    }

    #[test]
    fn invalid_value_is_reported_with_key() {
        let ws = workspace("[projection]\nci_window = 0\n");
        let err = cli::load_settings(&ws.config).unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid config value [projection] ci_window: ci_window must be at least 1"
        );
    }
}

mod exit_codes {
    use super::*;

    #[test]
    fn validate_ok() {
        let ws = workspace(VALID_INI);
        assert_eq!(run_args(&["validate", "--config", config_arg(&ws)]), ExitCode::SUCCESS);
    }

    #[test]
    fn validate_rejects_bad_config() {
        let ws = workspace("[simulation]\nnum_paths = 0\n");
        assert_eq!(run_args(&["validate", "--config", config_arg(&ws)]), ExitCode::from(2));
    }

    #[test]
    fn trend_project_simulate_succeed() {
        let ws = workspace(VALID_INI);
        let cfg = config_arg(&ws);
        assert_eq!(run_args(&["trend", "--config", cfg, "--source", "wheat"]), ExitCode::SUCCESS);
        assert_eq!(
            run_args(&["project", "--config", cfg, "--source", "wheat", "--storage-cost", "2.5", "--days", "10"]),
            ExitCode::SUCCESS
        );
        assert_eq!(
            run_args(&["simulate", "--config", cfg, "--source", "wheat", "--days", "7", "--seed", "1"]),
            ExitCode::SUCCESS
        );
        assert_eq!(run_args(&["sources", "--config", cfg]), ExitCode::SUCCESS);
    }

    #[test]
    fn simulation_past_max_days_is_input_error() {
        let ws = workspace("[data]\ndir = prices\n[simulation]\nmax_days = 60\n");
        let cfg = config_arg(&ws);
        assert_eq!(
            run_args(&["simulate", "--config", cfg, "--source", "wheat", "--days", "61"]),
            ExitCode::from(4)
        );
        assert_eq!(
            run_args(&["simulate", "--config", cfg, "--source", "wheat", "--days", "60", "--seed", "2"]),
            ExitCode::SUCCESS
        );
    }

    #[test]
    fn huge_ttl_is_config_error() {
        let ws = workspace("[data]\ndir = prices\nseries_ttl_secs = 18446744073709551615\n");
        assert_eq!(
            run_args(&["trend", "--config", config_arg(&ws), "--source", "wheat"]),
            ExitCode::from(2)
        );
    }

    #[test]
    fn mandi_command() {
        let ws = workspace(VALID_INI);
        let cfg = config_arg(&ws);
        assert_eq!(
            run_args(&["mandi", "--config", cfg, "--commodity", "wheat", "--district", "Ludhiana"]),
            ExitCode::SUCCESS
        );
        assert_eq!(
            run_args(&["mandi", "--config", cfg, "--commodity", "cotton", "--district", "Ludhiana"]),
            ExitCode::from(3)
        );
    }

    #[test]
    fn broken_price_file_is_data_error() {
        let ws = workspace(VALID_INI);
        assert_eq!(
            run_args(&["trend", "--config", config_arg(&ws), "--source", "broken"]),
            ExitCode::from(3)
        );
    }

    #[test]
    fn zero_day_simulation_is_input_error() {
        let ws = workspace(VALID_INI);
        assert_eq!(
            run_args(&["simulate", "--config", config_arg(&ws), "--source", "wheat", "--days", "0"]),
            ExitCode::from(4)
        );
    }

    #[test]
    fn negative_storage_cost_is_input_error() {
        let ws = workspace(VALID_INI);
        assert_eq!(
            run_args(&[
                "project",
                "--config",
                config_arg(&ws),
                "--source",
                "wheat",
                "--storage-cost=-1",
            ]),
            ExitCode::from(4)
        );
    }

    #[test]
    fn stage_command() {
        assert_eq!(
            run_args(&["stage", "--crop", "wheat", "--sowing-date", "2025-11-01", "--today", "2026-03-01"]),
            ExitCode::SUCCESS
        );
        assert_eq!(
            run_args(&["stage", "--crop", "quinoa", "--sowing-date", "2025-11-01", "--today", "2026-03-01"]),
            ExitCode::from(4)
        );
        assert_eq!(
            run_args(&["stage", "--crop", "wheat", "--sowing-date", "01/11/2025"]),
            ExitCode::from(4)
        );
    }

    #[test]
    fn advise_with_soil_issues_and_horizon() {
        let ws = workspace(VALID_INI);
        assert_eq!(
            run_args(&[
                "advise",
                "--config",
                config_arg(&ws),
                "--source",
                "wheat",
                "--crop",
                "wheat",
                "--stage",
                "Maturity",
                "--soil-issue",
                "Low nitrogen",
                "--soil-issue",
                "Low zinc",
                "--days",
                "14",
                "--seed",
                "3",
            ]),
            ExitCode::SUCCESS
        );
    }
}

mod advice_from_files {
    use super::*;

    #[test]
    fn end_to_end_advice() {
        let ws = workspace(VALID_INI);
        let advisor = cli::build_advisor(cli::load_settings(&ws.config).unwrap());

        let mut request = AdviceRequest::new(
            "wheat",
            "wheat",
            AdvisoryRecord {
                crop_stage: "Harvest".into(),
                soil_advice: vec![],
            },
        );
        request.sell_after_days = Some(7);
        request.seed = Some(42);

        let advice = advisor.advise(&request).unwrap();
        assert_eq!(advice.as_of, date(2026, 3, 17));
        assert_eq!(advice.projection.current_price, 2420.0);
        assert_eq!(advice.fair_price.msp, 2425.0);
        assert!(!advice.fair_price.is_above_msp);
        assert_eq!(
            advice.strategy.sell_now_pct as u16 + advice.strategy.hold_pct as u16,
            100
        );
        assert_eq!(advice.simulation.as_ref().unwrap().days, 7);

        let text = cli::format_advice(&advice);
        assert!(text.contains("Advice for wheat as of 2026-03-17"));
        assert!(text.contains("market_trend"));
        assert!(text.contains("price_vs_avg"));
        assert!(text.contains("Confidence score of"));
    }

    #[test]
    fn trend_report_text() {
        let ws = workspace(VALID_INI);
        let advisor = cli::build_advisor(cli::load_settings(&ws.config).unwrap());
        let report = advisor.trend("wheat").unwrap();
        let text = cli::format_trend("wheat", &report);
        assert!(text.starts_with("Trend for wheat\n"));
        assert!(text.contains("direction       rising"));
    }

    #[test]
    fn mandi_comparison_from_files() {
        let ws = workspace(VALID_INI);
        let settings = cli::load_settings(&ws.config).unwrap();
        let store = cli::build_mandi_store(&settings);

        let cmp = store.compare("wheat", "ludhiana", "wheat").unwrap();
        assert_eq!(cmp.as_of, date(2026, 3, 14));
        assert_eq!(cmp.local_price, Some(2445.0));
        assert_eq!(cmp.best.mandi, "Khanna");
        assert_eq!(cmp.worst.mandi, "Jagraon");
        assert_eq!(cmp.worst.price, 2235.0);
        assert_eq!(cmp.msp, 2425.0);
        assert_eq!(cmp.is_above_msp, Some(true));
        assert_eq!(cmp.mandi_trends["Khanna"], TrendDirection::Rising);
        assert_eq!(cmp.mandi_trends["Rajpura"], TrendDirection::Stable);
        assert_eq!(cmp.mandi_trends["Jagraon"], TrendDirection::Falling);

        let text = cli::format_mandi(&cmp);
        assert!(text.starts_with("Mandi prices for wheat as of 2026-03-14\n"));
        assert!(text.contains("best            Khanna 2445.00"));

        let elsewhere = store.compare("wheat", "Bathinda", "wheat").unwrap();
        assert!(elsewhere.fair_price.is_none());
        assert!(cli::format_mandi(&elsewhere).contains("no mandi in Bathinda"));
    }

    #[test]
    fn parse_date_errors_are_input_errors() {
        assert!(matches!(
            cli::parse_date("2026-13-01", "today"),
            Err(SellcastError::InvalidInput { .. })
        ));
        assert_eq!(cli::parse_date(" 2026-01-05 ", "today").unwrap(), date(2026, 1, 5));
    }
}
