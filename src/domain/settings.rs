//! Building and validating runtime settings from an INI [`ConfigPort`].
//!
//! Every key is optional and falls back to the built-in default. A key that is
//! present but unparseable or out of range is a `ConfigInvalid` error.

use crate::domain::crop_stage::CropStage;
use crate::domain::error::SellcastError;
use crate::domain::fair_price::MspTable;
use crate::domain::projection::ProjectionConfig;
use crate::domain::risk::RiskPolicy;
use crate::domain::simulation::SimulationConfig;
use crate::domain::strategy::{StrategyBand, StrategyPolicy};
use crate::domain::trend::TrendConfig;
use crate::ports::config_port::ConfigPort;
use std::path::PathBuf;
use std::time::Duration;

const MAX_PATHS: usize = 1_000_000;
const MAX_DAYS: usize = 3650;
/// One year.
const MAX_TTL_SECS: usize = 365 * 24 * 60 * 60;

#[derive(Debug, Clone, PartialEq)]
pub struct DataSettings {
    pub dir: PathBuf,
    pub series_ttl: Duration,
    pub report_ttl: Duration,
}

impl Default for DataSettings {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("data"),
            series_ttl: Duration::from_secs(300),
            report_ttl: Duration::from_secs(120),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Settings {
    pub data: DataSettings,
    pub trend: TrendConfig,
    pub projection: ProjectionConfig,
    pub simulation: SimulationConfig,
    pub risk: RiskPolicy,
    pub strategy: StrategyPolicy,
    pub msp: MspTable,
}

impl Settings {
    pub fn from_config(config: &dyn ConfigPort) -> Result<Self, SellcastError> {
        let settings = Settings {
            data: build_data(config)?,
            trend: build_trend(config)?,
            projection: build_projection(config)?,
            simulation: build_simulation(config)?,
            risk: build_risk(config)?,
            strategy: build_strategy(config)?,
            msp: build_msp(config)?,
        };
        tracing::debug!(dir = %settings.data.dir.display(), "settings loaded");
        Ok(settings)
    }
}

/// Check every section without keeping the result.
pub fn validate_config(config: &dyn ConfigPort) -> Result<(), SellcastError> {
    Settings::from_config(config).map(|_| ())
}

fn invalid(section: &str, key: &str, reason: impl Into<String>) -> SellcastError {
    SellcastError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason: reason.into(),
    }
}

fn read_f64(config: &dyn ConfigPort, section: &str, key: &str, default: f64) -> Result<f64, SellcastError> {
    match config.get_string(section, key) {
        None => Ok(default),
        Some(raw) => match raw.trim().parse::<f64>() {
            Ok(v) if v.is_finite() => Ok(v),
            _ => Err(invalid(section, key, format!("expected a number, got '{raw}'"))),
        },
    }
}

fn read_usize(config: &dyn ConfigPort, section: &str, key: &str, default: usize) -> Result<usize, SellcastError> {
    match config.get_string(section, key) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse::<usize>()
            .map_err(|_| invalid(section, key, format!("expected a non-negative integer, got '{raw}'"))),
    }
}

fn read_u8_pct(config: &dyn ConfigPort, section: &str, key: &str, default: u8) -> Result<u8, SellcastError> {
    let value = read_usize(config, section, key, default as usize)?;
    if value > 100 {
        return Err(invalid(section, key, "must be between 0 and 100"));
    }
    Ok(value as u8)
}

fn require(cond: bool, section: &str, key: &str, reason: &str) -> Result<(), SellcastError> {
    if cond { Ok(()) } else { Err(invalid(section, key, reason)) }
}

fn build_data(config: &dyn ConfigPort) -> Result<DataSettings, SellcastError> {
    let defaults = DataSettings::default();
    let dir = config
        .get_string("data", "dir")
        .map(|d| d.trim().to_string())
        .unwrap_or_else(|| defaults.dir.display().to_string());
    require(!dir.is_empty(), "data", "dir", "dir must not be empty")?;

    let series_ttl = read_usize(config, "data", "series_ttl_secs", defaults.series_ttl.as_secs() as usize)?;
    let report_ttl = read_usize(config, "data", "report_ttl_secs", defaults.report_ttl.as_secs() as usize)?;
    for (key, secs) in [("series_ttl_secs", series_ttl), ("report_ttl_secs", report_ttl)] {
        require(secs <= MAX_TTL_SECS, "data", key, "ttl must be at most 31536000 seconds")?;
    }

    Ok(DataSettings {
        dir: PathBuf::from(dir),
        series_ttl: Duration::from_secs(series_ttl as u64),
        report_ttl: Duration::from_secs(report_ttl as u64),
    })
}

fn build_trend(config: &dyn ConfigPort) -> Result<TrendConfig, SellcastError> {
    let d = TrendConfig::default();
    let s = "trend";
    let trend = TrendConfig {
        fast_span: read_usize(config, s, "fast_span", d.fast_span)?,
        slow_span: read_usize(config, s, "slow_span", d.slow_span)?,
        min_points: read_usize(config, s, "min_points", d.min_points)?,
        trend_band: read_f64(config, s, "trend_band", d.trend_band)?,
        strong_band: read_f64(config, s, "strong_band", d.strong_band)?,
        short_window: read_usize(config, s, "short_window", d.short_window)?,
        long_window: read_usize(config, s, "long_window", d.long_window)?,
    };

    require(trend.fast_span >= 1, s, "fast_span", "fast_span must be at least 1")?;
    require(trend.slow_span >= trend.fast_span, s, "slow_span", "slow_span must not be shorter than fast_span")?;
    require(trend.min_points >= 2, s, "min_points", "min_points must be at least 2")?;
    require(trend.trend_band >= 0.0, s, "trend_band", "trend_band must be non-negative")?;
    require(trend.strong_band >= trend.trend_band, s, "strong_band", "strong_band must not be below trend_band")?;
    require(trend.short_window >= 1, s, "short_window", "short_window must be at least 1")?;
    require(trend.long_window >= trend.short_window, s, "long_window", "long_window must not be shorter than short_window")?;
    Ok(trend)
}

fn build_projection(config: &dyn ConfigPort) -> Result<ProjectionConfig, SellcastError> {
    let d = ProjectionConfig::default();
    let s = "projection";
    let projection = ProjectionConfig {
        regression_window: read_usize(config, s, "regression_window", d.regression_window)?,
        max_degree: read_usize(config, s, "max_degree", d.max_degree)?,
        ema_span: read_usize(config, s, "ema_span", d.ema_span)?,
        poly_weight: read_f64(config, s, "poly_weight", d.poly_weight)?,
        ci_z: read_f64(config, s, "ci_z", d.ci_z)?,
        ci_window: read_usize(config, s, "ci_window", d.ci_window)?,
        volatility_window: read_usize(config, s, "volatility_window", d.volatility_window)?,
        slope_threshold: read_f64(config, s, "slope_threshold", d.slope_threshold)?,
    };

    require(projection.regression_window >= 1, s, "regression_window", "regression_window must be at least 1")?;
    require(projection.max_degree <= 3, s, "max_degree", "max_degree must be between 0 and 3")?;
    require(projection.ema_span >= 1, s, "ema_span", "ema_span must be at least 1")?;
    require((0.0..=1.0).contains(&projection.poly_weight), s, "poly_weight", "poly_weight must be between 0 and 1")?;
    require(projection.ci_z >= 0.0, s, "ci_z", "ci_z must be non-negative")?;
    require(projection.ci_window >= 1, s, "ci_window", "ci_window must be at least 1")?;
    require(projection.volatility_window >= 2, s, "volatility_window", "volatility_window must be at least 2")?;
    require(projection.slope_threshold >= 0.0, s, "slope_threshold", "slope_threshold must be non-negative")?;
    Ok(projection)
}

fn build_simulation(config: &dyn ConfigPort) -> Result<SimulationConfig, SellcastError> {
    let d = SimulationConfig::default();
    let s = "simulation";
    let simulation = SimulationConfig {
        num_paths: read_usize(config, s, "num_paths", d.num_paths)?,
        lookback: read_usize(config, s, "lookback", d.lookback)?,
        confidence_sensitivity: read_f64(config, s, "confidence_sensitivity", d.confidence_sensitivity)?,
        max_days: read_usize(config, s, "max_days", d.max_days as usize)?
            .try_into()
            .unwrap_or(u32::MAX),
    };

    require(
        (1..=MAX_PATHS).contains(&simulation.num_paths),
        s,
        "num_paths",
        "num_paths must be between 1 and 1000000",
    )?;
    require(simulation.lookback >= 2, s, "lookback", "lookback must be at least 2")?;
    require(
        simulation.confidence_sensitivity >= 0.0,
        s,
        "confidence_sensitivity",
        "confidence_sensitivity must be non-negative",
    )?;
    require(
        (1..=MAX_DAYS).contains(&(simulation.max_days as usize)),
        s,
        "max_days",
        "max_days must be between 1 and 3650",
    )?;
    Ok(simulation)
}

fn build_risk(config: &dyn ConfigPort) -> Result<RiskPolicy, SellcastError> {
    let d = RiskPolicy::default();
    let s = "risk";

    let mut stage_points = d.stage_points.clone();
    for stage in CropStage::ALL {
        let key = format!("stage_{}", stage.key());
        let points = read_f64(config, s, &key, d.stage_points(stage))?;
        stage_points.insert(stage, points);
    }

    let policy = RiskPolicy {
        baseline: read_f64(config, s, "baseline", d.baseline)?,
        trend_moderate_threshold: read_f64(config, s, "trend_moderate_threshold", d.trend_moderate_threshold)?,
        trend_strong_threshold: read_f64(config, s, "trend_strong_threshold", d.trend_strong_threshold)?,
        trend_weak_points: read_f64(config, s, "trend_weak_points", d.trend_weak_points)?,
        trend_moderate_points: read_f64(config, s, "trend_moderate_points", d.trend_moderate_points)?,
        trend_strong_points: read_f64(config, s, "trend_strong_points", d.trend_strong_points)?,
        stage_points,
        soil_healthy_points: read_f64(config, s, "soil_healthy_points", d.soil_healthy_points)?,
        soil_issue_points: read_f64(config, s, "soil_issue_points", d.soil_issue_points)?,
        soil_many_issues: read_usize(config, s, "soil_many_issues", d.soil_many_issues)?,
        soil_many_issues_points: read_f64(config, s, "soil_many_issues_points", d.soil_many_issues_points)?,
        projection_weight_7d: read_f64(config, s, "projection_weight_7d", d.projection_weight_7d)?,
        projection_weight_14d: read_f64(config, s, "projection_weight_14d", d.projection_weight_14d)?,
        projection_cap: read_f64(config, s, "projection_cap", d.projection_cap)?,
        volatility_low: read_f64(config, s, "volatility_low", d.volatility_low)?,
        volatility_high: read_f64(config, s, "volatility_high", d.volatility_high)?,
        volatility_moderate_divisor: read_f64(config, s, "volatility_moderate_divisor", d.volatility_moderate_divisor)?,
        volatility_high_divisor: read_f64(config, s, "volatility_high_divisor", d.volatility_high_divisor)?,
        volatility_cap: read_f64(config, s, "volatility_cap", d.volatility_cap)?,
        ma_deviation_band: read_f64(config, s, "ma_deviation_band", d.ma_deviation_band)?,
        ma_deviation_multiplier: read_f64(config, s, "ma_deviation_multiplier", d.ma_deviation_multiplier)?,
        ma_deviation_cap: read_f64(config, s, "ma_deviation_cap", d.ma_deviation_cap)?,
        tier_strong_sell: read_f64(config, s, "tier_strong_sell", d.tier_strong_sell)?,
        tier_moderate_sell: read_f64(config, s, "tier_moderate_sell", d.tier_moderate_sell)?,
        tier_caution: read_f64(config, s, "tier_caution", d.tier_caution)?,
        tier_neutral: read_f64(config, s, "tier_neutral", d.tier_neutral)?,
        tier_wait: read_f64(config, s, "tier_wait", d.tier_wait)?,
    };

    require((0.0..=100.0).contains(&policy.baseline), s, "baseline", "baseline must be between 0 and 100")?;
    require(
        policy.trend_strong_threshold >= policy.trend_moderate_threshold && policy.trend_moderate_threshold >= 0.0,
        s,
        "trend_strong_threshold",
        "trend thresholds must satisfy 0 <= moderate <= strong",
    )?;
    require(
        policy.volatility_high >= policy.volatility_low && policy.volatility_low >= 0.0,
        s,
        "volatility_high",
        "volatility bands must satisfy 0 <= low <= high",
    )?;
    require(policy.volatility_moderate_divisor > 0.0, s, "volatility_moderate_divisor", "divisor must be positive")?;
    require(policy.volatility_high_divisor > 0.0, s, "volatility_high_divisor", "divisor must be positive")?;
    for (key, cap) in [
        ("projection_cap", policy.projection_cap),
        ("volatility_cap", policy.volatility_cap),
        ("ma_deviation_cap", policy.ma_deviation_cap),
        ("ma_deviation_band", policy.ma_deviation_band),
    ] {
        require(cap >= 0.0, s, key, "must be non-negative")?;
    }

    let tiers = [
        ("tier_strong_sell", policy.tier_strong_sell),
        ("tier_moderate_sell", policy.tier_moderate_sell),
        ("tier_caution", policy.tier_caution),
        ("tier_neutral", policy.tier_neutral),
        ("tier_wait", policy.tier_wait),
    ];
    for (key, value) in tiers {
        require((0.0..=100.0).contains(&value), s, key, "tier threshold must be between 0 and 100")?;
    }
    for pair in tiers.windows(2) {
        require(pair[0].1 >= pair[1].1, s, pair[1].0, "tier thresholds must be descending")?;
    }
    Ok(policy)
}

fn build_strategy(config: &dyn ConfigPort) -> Result<StrategyPolicy, SellcastError> {
    let d = StrategyPolicy::default();
    let s = "strategy";
    let names = ["strong", "moderate", "cautious"];

    let mut bands = Vec::with_capacity(d.bands.len());
    for (name, default) in names.iter().zip(&d.bands) {
        let min_key = format!("{name}_min_score");
        let pct_key = format!("{name}_sell_pct");
        let min_score = read_f64(config, s, &min_key, default.min_score)?;
        require((0.0..=100.0).contains(&min_score), s, &min_key, "score threshold must be between 0 and 100")?;
        let pct = read_u8_pct(config, s, &pct_key, default.sell_now_pct)?;
        bands.push(StrategyBand::new(min_score, pct, &default.reason));
    }
    for (i, pair) in bands.windows(2).enumerate() {
        let key = format!("{}_min_score", names[i + 1]);
        require(pair[0].min_score >= pair[1].min_score, s, &key, "score thresholds must be descending")?;
    }

    let fallback_pct = read_u8_pct(config, s, "fallback_sell_pct", d.fallback.sell_now_pct)?;
    Ok(StrategyPolicy {
        bands,
        fallback: StrategyBand::new(0.0, fallback_pct, &d.fallback.reason),
    })
}

fn build_msp(config: &dyn ConfigPort) -> Result<MspTable, SellcastError> {
    let mut table = MspTable::default();
    for crop in config.keys("msp") {
        let price = read_f64(config, "msp", &crop, 0.0)?;
        require(price > 0.0, "msp", &crop, "MSP must be positive")?;
        table.set(&crop, price);
    }
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::file_config_adapter::FileConfigAdapter;

    fn settings(ini: &str) -> Result<Settings, SellcastError> {
        Settings::from_config(&FileConfigAdapter::from_string(ini).unwrap())
    }

    fn invalid_key(result: Result<Settings, SellcastError>) -> (String, String) {
        match result {
            Err(SellcastError::ConfigInvalid { section, key, .. }) => (section, key),
            other => panic!("expected ConfigInvalid, got {other:?}"),
        }
    }

    #[test]
    fn empty_config_gives_defaults() {
        let s = settings("").unwrap();
        assert_eq!(s, Settings::default());
        assert_eq!(s.data.series_ttl, Duration::from_secs(300));
        assert_eq!(s.data.report_ttl, Duration::from_secs(120));
    }

    #[test]
    fn overrides_are_applied() {
        let s = settings(
            "[data]\ndir = /srv/prices\nseries_ttl_secs = 60\n\
             [trend]\ntrend_band = 0.5\nstrong_band = 2\n\
             [projection]\nci_z = 2.58\n\
             [simulation]\nnum_paths = 2000\n\
             [risk]\nstage_harvest = 30\ntier_strong_sell = 85\n\
             [strategy]\nstrong_sell_pct = 70\n\
             [msp]\nwheat = 2425\nbarley = 1850\n",
        )
        .unwrap();
        assert_eq!(s.data.dir, PathBuf::from("/srv/prices"));
        assert_eq!(s.data.series_ttl, Duration::from_secs(60));
        assert_eq!(s.trend.trend_band, 0.5);
        assert_eq!(s.trend.strong_band, 2.0);
        assert_eq!(s.projection.ci_z, 2.58);
        assert_eq!(s.simulation.num_paths, 2000);
        assert_eq!(s.risk.stage_points(CropStage::Harvest), 30.0);
        assert_eq!(s.risk.stage_points(CropStage::Maturity), 12.0);
        assert_eq!(s.risk.tier_strong_sell, 85.0);
        assert_eq!(s.strategy.bands[0].sell_now_pct, 70);
        assert_eq!(s.msp.msp_for("wheat"), 2425.0);
        assert_eq!(s.msp.msp_for("barley"), 1850.0);
    }

    #[test]
    fn non_numeric_value_is_invalid() {
        let (section, key) = invalid_key(settings("[projection]\nci_z = wide\n"));
        assert_eq!((section.as_str(), key.as_str()), ("projection", "ci_z"));
    }

    #[test]
    fn zero_paths_is_invalid() {
        let (_, key) = invalid_key(settings("[simulation]\nnum_paths = 0\n"));
        assert_eq!(key, "num_paths");
    }

    #[test]
    fn ttl_beyond_a_year_is_invalid() {
        let (section, key) = invalid_key(settings("[data]\nseries_ttl_secs = 18446744073709551615\n"));
        assert_eq!((section.as_str(), key.as_str()), ("data", "series_ttl_secs"));
        let (_, key) = invalid_key(settings("[data]\nreport_ttl_secs = 31536001\n"));
        assert_eq!(key, "report_ttl_secs");
        assert_eq!(
            settings("[data]\nseries_ttl_secs = 31536000\n").unwrap().data.series_ttl,
            Duration::from_secs(31_536_000)
        );
    }

    #[test]
    fn max_days_is_read_and_bounded() {
        assert_eq!(settings("[simulation]\nmax_days = 90\n").unwrap().simulation.max_days, 90);
        let (_, key) = invalid_key(settings("[simulation]\nmax_days = 0\n"));
        assert_eq!(key, "max_days");
        let (_, key) = invalid_key(settings("[simulation]\nmax_days = 99999999999\n"));
        assert_eq!(key, "max_days");
    }

    #[test]
    fn poly_weight_out_of_range() {
        let (_, key) = invalid_key(settings("[projection]\npoly_weight = 1.5\n"));
        assert_eq!(key, "poly_weight");
    }

    #[test]
    fn strong_band_below_trend_band() {
        let (_, key) = invalid_key(settings("[trend]\ntrend_band = 2\nstrong_band = 1\n"));
        assert_eq!(key, "strong_band");
    }

    #[test]
    fn tiers_must_descend() {
        let (_, key) = invalid_key(settings("[risk]\ntier_caution = 70\n"));
        assert_eq!(key, "tier_caution");
    }

    #[test]
    fn strategy_pct_over_100() {
        let (_, key) = invalid_key(settings("[strategy]\nmoderate_sell_pct = 120\n"));
        assert_eq!(key, "moderate_sell_pct");
    }

    #[test]
    fn strategy_thresholds_must_descend() {
        let (_, key) = invalid_key(settings("[strategy]\ncautious_min_score = 90\n"));
        assert_eq!(key, "cautious_min_score");
    }

    #[test]
    fn msp_must_be_positive() {
        let (section, key) = invalid_key(settings("[msp]\nrice = -1\n"));
        assert_eq!((section.as_str(), key.as_str()), ("msp", "rice"));
    }

    /// Two-method port over `(section, key, value)` triples.
    struct TableConfig(Vec<(&'static str, &'static str, &'static str)>);

    impl ConfigPort for TableConfig {
        fn get_string(&self, section: &str, key: &str) -> Option<String> {
            self.0
                .iter()
                .find(|(s, k, _)| *s == section && *k == key)
                .map(|(_, _, v)| v.to_string())
        }

        fn keys(&self, section: &str) -> Vec<String> {
            self.0
                .iter()
                .filter(|(s, _, _)| *s == section)
                .map(|(_, k, _)| k.to_string())
                .collect()
        }
    }

    #[test]
    fn any_string_port_builds_settings() {
        let config = TableConfig(vec![
            ("simulation", "num_paths", "64"),
            ("projection", "ci_z", "2.58"),
            ("msp", "maize", "2090"),
        ]);
        let s = Settings::from_config(&config).unwrap();
        assert_eq!(s.simulation.num_paths, 64);
        assert_eq!(s.projection.ci_z, 2.58);
        assert_eq!(s.msp.msp_for("maize"), 2090.0);
    }

    #[test]
    fn validate_config_passes_defaults() {
        let adapter = FileConfigAdapter::from_string("[data]\ndir = prices\n").unwrap();
        assert!(validate_config(&adapter).is_ok());
    }
}
