//! CLI definition and dispatch.

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use crate::adapters::csv_adapter::CsvPriceAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::mandi_csv_adapter::CsvMandiAdapter;
use crate::domain::advice::{AdviceRequest, SellAdvice, SellAdvisor};
use crate::domain::crop_stage::classify_stage;
use crate::domain::error::SellcastError;
use crate::domain::mandi::{MandiComparison, MandiStore};
use crate::domain::projection::{storage_outlook, ProjectionReport, StorageOutlook};
use crate::domain::risk::AdvisoryRecord;
use crate::domain::settings::{validate_config, Settings};
use crate::domain::simulation::SimulationReport;
use crate::domain::store::PriceStore;
use crate::domain::trend::TrendReport;

#[derive(Parser, Debug)]
#[command(name = "sellcast", about = "Commodity sale-timing advisor")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Classify the short-term price trend
    Trend {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(short, long)]
        source: String,
    },
    /// Project prices 7 and 14 days ahead
    Project {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(short, long)]
        source: String,
        /// Storage cost per quintal per day
        #[arg(long)]
        storage_cost: Option<f64>,
        /// Days of storage to cost
        #[arg(long, default_value_t = 7)]
        days: u32,
    },
    /// Monte Carlo simulation of selling after a number of days
    Simulate {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(short, long)]
        source: String,
        #[arg(long)]
        days: u32,
        #[arg(long, default_value_t = 50.0)]
        base_confidence: f64,
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Full sell/hold advice for a crop
    Advise {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(short, long)]
        source: String,
        #[arg(long)]
        crop: String,
        /// Crop growth stage, e.g. "Harvest"
        #[arg(long)]
        stage: String,
        /// Soil advisory line; repeat for several issues
        #[arg(long = "soil-issue")]
        soil_issues: Vec<String>,
        /// Also simulate selling after this many days
        #[arg(long)]
        days: Option<u32>,
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Compare the latest prices across mandis for a district
    Mandi {
        #[arg(short, long)]
        config: PathBuf,
        /// Commodity whose `<commodity>_mandi.csv` is read
        #[arg(long)]
        commodity: String,
        #[arg(long)]
        district: String,
        /// Crop whose MSP applies; defaults to the commodity
        #[arg(long)]
        crop: Option<String>,
    },
    /// Validate a configuration file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// List price sources available in the data directory
    Sources {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Classify the crop stage from the sowing date
    Stage {
        #[arg(long)]
        crop: String,
        #[arg(long)]
        sowing_date: String,
        /// Defaults to the local date
        #[arg(long)]
        today: Option<String>,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    let result = match cli.command {
        Command::Trend { config, source } => run_trend(&config, &source),
        Command::Project {
            config,
            source,
            storage_cost,
            days,
        } => run_project(&config, &source, storage_cost, days),
        Command::Simulate {
            config,
            source,
            days,
            base_confidence,
            seed,
        } => run_simulate(&config, &source, days, base_confidence, seed),
        Command::Advise {
            config,
            source,
            crop,
            stage,
            soil_issues,
            days,
            seed,
        } => {
            let mut request = AdviceRequest::new(
                &source,
                &crop,
                AdvisoryRecord {
                    crop_stage: stage,
                    soil_advice: soil_issues,
                },
            );
            request.sell_after_days = days;
            request.seed = seed;
            run_advise(&config, &request)
        }
        Command::Mandi {
            config,
            commodity,
            district,
            crop,
        } => run_mandi(&config, &commodity, &district, crop.as_deref()),
        Command::Validate { config } => run_validate(&config),
        Command::Sources { config } => run_sources(&config),
        Command::Stage {
            crop,
            sowing_date,
            today,
        } => run_stage(&crop, &sowing_date, today.as_deref()),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

pub fn load_config(path: &Path) -> Result<FileConfigAdapter, SellcastError> {
    FileConfigAdapter::from_file(path).map_err(|e| SellcastError::ConfigParse {
        file: path.display().to_string(),
        reason: e.to_string(),
    })
}

/// Settings from `path`. A relative data dir is taken relative to the config
/// file's directory.
pub fn load_settings(path: &Path) -> Result<Settings, SellcastError> {
    let adapter = load_config(path)?;
    let mut settings = Settings::from_config(&adapter)?;
    if settings.data.dir.is_relative() {
        if let Some(parent) = path.parent() {
            settings.data.dir = parent.join(&settings.data.dir);
        }
    }
    Ok(settings)
}

pub fn build_advisor(settings: Settings) -> SellAdvisor {
    let port = Arc::new(CsvPriceAdapter::new(settings.data.dir.clone()));
    let store = PriceStore::with_ttl(port, settings.data.series_ttl);
    SellAdvisor::new(store, settings)
}

pub fn build_mandi_store(settings: &Settings) -> MandiStore {
    let port = Arc::new(CsvMandiAdapter::new(settings.data.dir.clone()));
    MandiStore::new(port, settings.data.series_ttl, settings.msp.clone())
}

fn run_trend(config: &Path, source: &str) -> Result<(), SellcastError> {
    let advisor = build_advisor(load_settings(config)?);
    let report = advisor.trend(source)?;
    print!("{}", format_trend(source, &report));
    Ok(())
}

fn run_project(
    config: &Path,
    source: &str,
    storage_cost: Option<f64>,
    days: u32,
) -> Result<(), SellcastError> {
    let advisor = build_advisor(load_settings(config)?);
    let report = advisor.projection(source)?;
    print!("{}", format_projection(source, &report));
    if let Some(cost) = storage_cost {
        let outlook = storage_outlook(&report, days, cost)?;
        print!("{}", format_storage(days, &outlook));
    }
    Ok(())
}

fn run_simulate(
    config: &Path,
    source: &str,
    days: u32,
    base_confidence: f64,
    seed: Option<u64>,
) -> Result<(), SellcastError> {
    let advisor = build_advisor(load_settings(config)?);
    let report = advisor.simulate(source, days, base_confidence, seed)?;
    print!("{}", format_simulation(source, &report));
    Ok(())
}

fn run_advise(config: &Path, request: &AdviceRequest) -> Result<(), SellcastError> {
    let advisor = build_advisor(load_settings(config)?);
    let advice = advisor.advise(request)?;
    print!("{}", format_advice(&advice));
    Ok(())
}

fn run_mandi(
    config: &Path,
    commodity: &str,
    district: &str,
    crop: Option<&str>,
) -> Result<(), SellcastError> {
    let store = build_mandi_store(&load_settings(config)?);
    let comparison = store.compare(commodity, district, crop.unwrap_or(commodity))?;
    print!("{}", format_mandi(&comparison));
    Ok(())
}

fn run_validate(config: &Path) -> Result<(), SellcastError> {
    let adapter = load_config(config)?;
    validate_config(&adapter)?;
    println!("{} is valid", config.display());
    Ok(())
}

fn run_sources(config: &Path) -> Result<(), SellcastError> {
    let advisor = build_advisor(load_settings(config)?);
    for source in advisor.store().sources()? {
        println!("{source}");
    }
    Ok(())
}

fn run_stage(crop: &str, sowing_date: &str, today: Option<&str>) -> Result<(), SellcastError> {
    let sown = parse_date(sowing_date, "sowing date")?;
    let today = match today {
        Some(s) => parse_date(s, "today")?,
        None => chrono::Local::now().date_naive(),
    };
    let days = (today - sown).num_days();
    let stage = classify_stage(crop, days)?;
    println!("{crop}: day {days} since sowing, stage {stage}");
    Ok(())
}

pub fn parse_date(value: &str, what: &str) -> Result<NaiveDate, SellcastError> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|_| {
        SellcastError::invalid_input(format!("invalid {what} '{value}', expected YYYY-MM-DD"))
    })
}

pub fn format_trend(source: &str, r: &TrendReport) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Trend for {source}");
    let _ = writeln!(out, "  {:<16}{}{}", "direction", r.direction, if r.strong { " (strong)" } else { "" });
    let _ = writeln!(out, "  {:<16}{:.2}%", "strength", r.strength);
    let _ = writeln!(out, "  {:<16}{:.2}%", "momentum 7d", r.momentum_7d);
    let _ = writeln!(out, "  {:<16}{:.2}%", "momentum 14d", r.momentum_14d);
    let _ = writeln!(out, "  {:<16}{:.2}", "short avg", r.short_avg);
    let _ = writeln!(out, "  {:<16}{:.2}", "long avg", r.long_avg);
    let _ = writeln!(out, "  {:<16}{:.2}", "ema signal", r.ema_signal);
    let _ = writeln!(out, "  {}", r.advice);
    out
}

pub fn format_projection(source: &str, r: &ProjectionReport) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Projection for {source}");
    let _ = writeln!(out, "  {:<16}{:.2} ({:+.2}% on day)", "current", r.current_price, r.daily_change_pct);
    let _ = writeln!(out, "  {:<16}{:.2} / {:.2} / {:.2}", "ma 7/14/30", r.ma_7, r.ma_14, r.ma_30);
    let _ = writeln!(out, "  {:<16}{:.2}", "ema 14", r.ema_14);
    let _ = writeln!(out, "  {:<16}{} (slope {:.2})", "trend", r.trend_direction, r.trend_strength);
    let _ = writeln!(out, "  {:<16}{:.2}", "volatility", r.volatility);
    for (p, pct) in [(&r.projection_7d, r.pct_change_7d), (&r.projection_14d, r.pct_change_14d)] {
        let _ = writeln!(
            out,
            "  {:<16}{:.2} [{:.2}, {:.2}] ({:+.2}%)",
            format!("{} days", p.days_ahead),
            p.price,
            p.ci_low,
            p.ci_high,
            pct
        );
    }
    out
}

pub fn format_storage(days: u32, o: &StorageOutlook) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Storage for {days} days");
    let _ = writeln!(out, "  {:<16}{:.2}", "cost", o.storage_cost_total);
    let _ = writeln!(out, "  {:<16}{:.2}", "net price", o.projected_price_after_storage);
    let _ = writeln!(out, "  {:<16}{:+.2}%", "net profit", o.net_profit_pct);
    out
}

pub fn format_simulation(source: &str, r: &SimulationReport) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Simulation for {source}, selling in {} days", r.days);
    let _ = writeln!(out, "  {:<16}{:.2}", "current", r.current_price);
    let _ = writeln!(out, "  {:<16}{:.2} ({:+.2}%)", "mean", r.mean, r.pct_change);
    let _ = writeln!(out, "  {:<16}{:.2}", "median", r.median);
    let _ = writeln!(out, "  {:<16}{:.2} .. {:.2}", "p10 .. p90", r.p10, r.p90);
    let _ = writeln!(out, "  {:<16}{:.2}", "std", r.std);
    let _ = writeln!(out, "  {:<16}{:.1}%", "prob higher", r.prob_higher);
    let _ = writeln!(
        out,
        "  {:<16}{:.1} -> {:.1} ({:+.1})",
        "confidence", r.base_confidence, r.adjusted_confidence, r.confidence_adjustment
    );
    let _ = writeln!(out, "  {}", r.recommendation_text);
    out
}

pub fn format_mandi(c: &MandiComparison) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Mandi prices for {} as of {}", c.commodity, c.as_of);
    match c.local_price {
        Some(price) => {
            let _ = writeln!(out, "  {:<16}{:.2} ({})", "local", price, c.district);
        }
        None => {
            let _ = writeln!(out, "  {:<16}no mandi in {}", "local", c.district);
        }
    }
    let _ = writeln!(out, "  {:<16}{:.2}", "average", c.district_average);
    let _ = writeln!(out, "  {:<16}{:.2}", "historical avg", c.historical_average);
    let _ = writeln!(out, "  {:<16}{} {:.2}", "best", c.best.mandi, c.best.price);
    let _ = writeln!(out, "  {:<16}{} {:.2}", "worst", c.worst.mandi, c.worst.price);
    let _ = writeln!(out, "  {:<16}{:.0}", "msp", c.msp);
    if let Some(fp) = &c.fair_price {
        let _ = writeln!(
            out,
            "  {:<16}{:+.2}% vs avg, {:+.2}% vs MSP",
            "fair price", fp.vs_average_pct, fp.vs_msp_pct
        );
    }
    for (mandi, trend) in &c.mandi_trends {
        let _ = writeln!(out, "    {:<18}{}", mandi, trend);
    }
    out
}

pub fn format_advice(a: &SellAdvice) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Advice for {} as of {}", a.source, a.as_of);
    let _ = writeln!(out, "  {:<16}{:.1} - {}", "score", a.risk.score, a.risk.recommendation_tier);
    let _ = writeln!(out, "  {:<16}{}", "plan", a.strategy);
    for (factor, contribution) in &a.risk.factor_contributions {
        let _ = writeln!(out, "    {:<18}{}", factor.to_string(), contribution);
    }
    let _ = writeln!(out, "  {:<16}{} ({:.2}%)", "trend", a.trend.direction, a.trend.strength);
    let _ = writeln!(
        out,
        "  {:<16}{:.2} -> {:.2} in 7 days",
        "price", a.projection.current_price, a.projection.projection_7d.price
    );
    let _ = writeln!(
        out,
        "  {:<16}{:+.2}% vs avg, {:+.2}% vs MSP {:.0}",
        "fair price", a.fair_price.vs_average_pct, a.fair_price.vs_msp_pct, a.fair_price.msp
    );
    let _ = writeln!(out, "  {:<16}{} - {}", "volatility", a.volatility_alert.risk_level, a.volatility_alert.alert);
    if let Some(sim) = &a.simulation {
        let _ = writeln!(
            out,
            "  {:<16}{:.1}% higher in {} days, confidence {:.1}",
            "simulation", sim.prob_higher, sim.days, sim.adjusted_confidence
        );
        let _ = writeln!(out, "  {}", sim.recommendation_text);
    }
    let _ = writeln!(out, "  {}", a.risk.explanation);
    out
}
