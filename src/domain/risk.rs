//! Sell-confidence scoring.
//!
//! Starts from a neutral baseline and adds one signed contribution per factor:
//! market trend, crop stage, soil health, projected change, volatility and price
//! versus the 7-day average. The sum is clamped to [0, 100] and mapped to a
//! recommendation tier. Every weight and threshold lives in [`RiskPolicy`].

use crate::domain::crop_stage::{parse_stage, CropStage};
use crate::domain::projection::ProjectionReport;
use crate::domain::trend::{TrendDirection, TrendReport};
use std::collections::BTreeMap;
use std::fmt;

/// Output of the upstream crop/soil advisory collaborator.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct AdvisoryRecord {
    pub crop_stage: String,
    pub soil_advice: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RiskPolicy {
    pub baseline: f64,

    pub trend_moderate_threshold: f64,
    pub trend_strong_threshold: f64,
    pub trend_weak_points: f64,
    pub trend_moderate_points: f64,
    pub trend_strong_points: f64,

    pub stage_points: BTreeMap<CropStage, f64>,

    pub soil_healthy_points: f64,
    pub soil_issue_points: f64,
    /// More issues than this counts as widespread.
    pub soil_many_issues: usize,
    pub soil_many_issues_points: f64,

    pub projection_weight_7d: f64,
    pub projection_weight_14d: f64,
    pub projection_cap: f64,

    pub volatility_low: f64,
    pub volatility_high: f64,
    pub volatility_moderate_divisor: f64,
    pub volatility_high_divisor: f64,
    pub volatility_cap: f64,

    pub ma_deviation_band: f64,
    pub ma_deviation_multiplier: f64,
    pub ma_deviation_cap: f64,

    pub tier_strong_sell: f64,
    pub tier_moderate_sell: f64,
    pub tier_caution: f64,
    pub tier_neutral: f64,
    pub tier_wait: f64,
}

impl Default for RiskPolicy {
    fn default() -> Self {
        let stage_points = BTreeMap::from([
            (CropStage::Sowing, -25.0),
            (CropStage::Germination, -25.0),
            (CropStage::Tillering, -15.0),
            (CropStage::Flowering, -5.0),
            (CropStage::Maturity, 12.0),
            (CropStage::Harvest, 20.0),
            (CropStage::Unknown, -5.0),
        ]);

        Self {
            baseline: 50.0,
            trend_moderate_threshold: 2.0,
            trend_strong_threshold: 5.0,
            trend_weak_points: 5.0,
            trend_moderate_points: 15.0,
            trend_strong_points: 25.0,
            stage_points,
            soil_healthy_points: 5.0,
            soil_issue_points: -5.0,
            soil_many_issues: 3,
            soil_many_issues_points: -12.0,
            projection_weight_7d: 2.0,
            projection_weight_14d: 1.0,
            projection_cap: 20.0,
            volatility_low: 20.0,
            volatility_high: 50.0,
            volatility_moderate_divisor: 15.0,
            volatility_high_divisor: 10.0,
            volatility_cap: 15.0,
            ma_deviation_band: 2.0,
            ma_deviation_multiplier: 2.0,
            ma_deviation_cap: 8.0,
            tier_strong_sell: 80.0,
            tier_moderate_sell: 65.0,
            tier_caution: 50.0,
            tier_neutral: 35.0,
            tier_wait: 20.0,
        }
    }
}

impl RiskPolicy {
    pub fn stage_points(&self, stage: CropStage) -> f64 {
        self.stage_points
            .get(&stage)
            .or_else(|| self.stage_points.get(&CropStage::Unknown))
            .copied()
            .unwrap_or(0.0)
    }
}

/// Everything the scorer looks at, already reduced to numbers.
#[derive(Debug, Clone, PartialEq)]
pub struct RiskInputs {
    pub trend: TrendDirection,
    /// Regression slope from the projection, in price units per day.
    pub trend_strength: f64,
    pub stage: CropStage,
    pub soil_issues: usize,
    pub pct_change_7d: f64,
    pub pct_change_14d: f64,
    pub volatility: f64,
    pub current_price: f64,
    pub ma_7: f64,
}

impl RiskInputs {
    pub fn from_reports(
        advisory: &AdvisoryRecord,
        trend: &TrendReport,
        projection: &ProjectionReport,
    ) -> Self {
        Self {
            trend: trend.direction,
            trend_strength: projection.trend_strength,
            stage: parse_stage(&advisory.crop_stage),
            soil_issues: advisory.soil_advice.len(),
            pct_change_7d: projection.pct_change_7d,
            pct_change_14d: projection.pct_change_14d,
            volatility: projection.volatility,
            current_price: projection.current_price,
            ma_7: projection.ma_7,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum RiskFactor {
    MarketTrend,
    CropStage,
    SoilHealth,
    PriceProjection,
    Volatility,
    PriceVsAverage,
}

impl fmt::Display for RiskFactor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RiskFactor::MarketTrend => "market_trend",
            RiskFactor::CropStage => "crop_stage",
            RiskFactor::SoilHealth => "soil_health",
            RiskFactor::PriceProjection => "price_projection",
            RiskFactor::Volatility => "volatility",
            RiskFactor::PriceVsAverage => "price_vs_avg",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct FactorContribution {
    pub points: f64,
    pub reason: String,
}

impl FactorContribution {
    fn new(points: f64, reason: impl Into<String>) -> Self {
        Self {
            points,
            reason: reason.into(),
        }
    }
}

impl fmt::Display for FactorContribution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.points > 0.0 {
            write!(f, "+{:.1} ({})", self.points, self.reason)
        } else {
            write!(f, "{:.1} ({})", self.points, self.reason)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum RecommendationTier {
    StrongSell,
    ModerateSell,
    SellWithCaution,
    Neutral,
    Wait,
    DoNotSell,
}

impl fmt::Display for RecommendationTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RecommendationTier::StrongSell => "Strong Sell Opportunity",
            RecommendationTier::ModerateSell => "Moderate Sell Opportunity",
            RecommendationTier::SellWithCaution => "Sell with Caution",
            RecommendationTier::Neutral => "Neutral - Monitor Market",
            RecommendationTier::Wait => "High Risk - Wait Before Selling",
            RecommendationTier::DoNotSell => "Do Not Sell - Very Unfavorable",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct RiskReport {
    pub score: f64,
    pub factor_contributions: BTreeMap<RiskFactor, FactorContribution>,
    pub recommendation_tier: RecommendationTier,
    pub explanation: String,
}

fn finite_or_zero(v: f64) -> f64 {
    if v.is_finite() { v } else { 0.0 }
}

pub fn score_risk(inputs: &RiskInputs, policy: &RiskPolicy) -> RiskReport {
    let mut factors = BTreeMap::new();
    factors.insert(RiskFactor::MarketTrend, trend_factor(inputs, policy));
    factors.insert(RiskFactor::CropStage, stage_factor(inputs.stage, policy));
    factors.insert(RiskFactor::SoilHealth, soil_factor(inputs.soil_issues, policy));
    factors.insert(RiskFactor::PriceProjection, projection_factor(inputs, policy));
    factors.insert(RiskFactor::Volatility, volatility_factor(inputs.volatility, policy));
    factors.insert(RiskFactor::PriceVsAverage, price_vs_average_factor(inputs, policy));

    let raw: f64 = finite_or_zero(policy.baseline)
        + factors.values().map(|c| finite_or_zero(c.points)).sum::<f64>();
    let score = finite_or_zero(raw).clamp(0.0, 100.0);
    let recommendation_tier = tier_for(score, policy);

    let explanation = format!(
        "Confidence score of {score:.1}% calculated using: market trend (slope={:.2}), \
         crop stage ({}), soil health ({} issue(s)), 7-day projection ({:.2}%), \
         volatility ({:.2}), and price-to-average comparison.",
        finite_or_zero(inputs.trend_strength),
        inputs.stage,
        inputs.soil_issues,
        finite_or_zero(inputs.pct_change_7d),
        finite_or_zero(inputs.volatility),
    );

    tracing::debug!(score, tier = %recommendation_tier, "risk scored");

    RiskReport {
        score,
        factor_contributions: factors,
        recommendation_tier,
        explanation,
    }
}

pub fn tier_for(score: f64, policy: &RiskPolicy) -> RecommendationTier {
    if score >= policy.tier_strong_sell {
        RecommendationTier::StrongSell
    } else if score >= policy.tier_moderate_sell {
        RecommendationTier::ModerateSell
    } else if score >= policy.tier_caution {
        RecommendationTier::SellWithCaution
    } else if score >= policy.tier_neutral {
        RecommendationTier::Neutral
    } else if score >= policy.tier_wait {
        RecommendationTier::Wait
    } else {
        RecommendationTier::DoNotSell
    }
}

fn trend_factor(inputs: &RiskInputs, policy: &RiskPolicy) -> FactorContribution {
    let strength = finite_or_zero(inputs.trend_strength);
    let magnitude = strength.abs();
    let (points, band) = if magnitude > policy.trend_strong_threshold {
        (policy.trend_strong_points, "Strong")
    } else if magnitude > policy.trend_moderate_threshold {
        (policy.trend_moderate_points, "Moderate")
    } else {
        (policy.trend_weak_points, "Weak")
    };

    match inputs.trend {
        TrendDirection::Rising => {
            FactorContribution::new(points, format!("{band} uptrend, slope={strength:.2}"))
        }
        TrendDirection::Falling => {
            FactorContribution::new(-points, format!("{band} downtrend, slope={strength:.2}"))
        }
        TrendDirection::Stable => FactorContribution::new(0.0, "Stable market"),
        TrendDirection::InsufficientData => FactorContribution::new(0.0, "Unknown trend"),
    }
}

fn stage_factor(stage: CropStage, policy: &RiskPolicy) -> FactorContribution {
    let points = policy.stage_points(stage);
    let reason = match stage {
        CropStage::Harvest => "Harvest ready, ideal time to sell",
        CropStage::Maturity => "Approaching harvest",
        CropStage::Flowering => "Still flowering, wait recommended",
        CropStage::Tillering => "Too early, crop still growing",
        CropStage::Germination | CropStage::Sowing => "Way too early to sell",
        CropStage::Unknown => "Unknown stage, caution",
    };
    FactorContribution::new(points, reason)
}

fn soil_factor(issues: usize, policy: &RiskPolicy) -> FactorContribution {
    if issues > policy.soil_many_issues {
        FactorContribution::new(policy.soil_many_issues_points, "Multiple soil issues detected")
    } else if issues > 0 {
        FactorContribution::new(
            policy.soil_issue_points,
            format!("{issues} soil issue(s) detected"),
        )
    } else {
        FactorContribution::new(policy.soil_healthy_points, "Healthy soil")
    }
}

fn projection_factor(inputs: &RiskInputs, policy: &RiskPolicy) -> FactorContribution {
    let combined = finite_or_zero(inputs.pct_change_7d) * policy.projection_weight_7d
        + finite_or_zero(inputs.pct_change_14d) * policy.projection_weight_14d;
    let points = finite_or_zero(combined).clamp(-policy.projection_cap, policy.projection_cap);

    let reason = if points > 0.0 {
        "Prices expected to rise"
    } else if points < 0.0 {
        "Prices expected to fall"
    } else {
        "Flat price projection"
    };
    FactorContribution::new(points, reason)
}

fn volatility_factor(volatility: f64, policy: &RiskPolicy) -> FactorContribution {
    let v = finite_or_zero(volatility);
    if v > policy.volatility_high {
        let penalty = ((v - policy.volatility_high) / policy.volatility_high_divisor)
            .min(policy.volatility_cap);
        FactorContribution::new(-penalty, format!("High volatility, std dev {v:.2}"))
    } else if v > policy.volatility_low {
        let penalty = (v - policy.volatility_low) / policy.volatility_moderate_divisor;
        FactorContribution::new(-penalty, "Moderate volatility")
    } else {
        FactorContribution::new(0.0, "Low volatility, stable")
    }
}

fn price_vs_average_factor(inputs: &RiskInputs, policy: &RiskPolicy) -> FactorContribution {
    let current = finite_or_zero(inputs.current_price);
    let ma_7 = finite_or_zero(inputs.ma_7);
    if current <= 0.0 || ma_7 <= 0.0 {
        return FactorContribution::new(0.0, "No 7-day average available");
    }

    let deviation = (current - ma_7) / ma_7 * 100.0;
    if deviation > policy.ma_deviation_band {
        let points = (deviation * policy.ma_deviation_multiplier).min(policy.ma_deviation_cap);
        FactorContribution::new(points, "Price above 7-day average")
    } else if deviation < -policy.ma_deviation_band {
        let points = (deviation * policy.ma_deviation_multiplier).max(-policy.ma_deviation_cap);
        FactorContribution::new(points, "Price below 7-day average")
    } else {
        FactorContribution::new(0.0, "Price near average")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RiskLevel::Low => "Low",
            RiskLevel::Medium => "Medium",
            RiskLevel::High => "High",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct VolatilityAlert {
    pub risk_level: RiskLevel,
    pub alert: String,
}

pub fn volatility_alert(volatility: f64) -> VolatilityAlert {
    let (risk_level, alert) = if volatility > 150.0 {
        (RiskLevel::High, "High market volatility detected")
    } else if volatility > 80.0 {
        (RiskLevel::Medium, "Moderate volatility, monitor closely")
    } else {
        (RiskLevel::Low, "Stable market conditions")
    };
    VolatilityAlert {
        risk_level,
        alert: alert.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn neutral_inputs() -> RiskInputs {
        RiskInputs {
            trend: TrendDirection::Stable,
            trend_strength: 0.0,
            stage: CropStage::Flowering,
            soil_issues: 0,
            pct_change_7d: 0.0,
            pct_change_14d: 0.0,
            volatility: 10.0,
            current_price: 2000.0,
            ma_7: 2000.0,
        }
    }

    fn points(report: &RiskReport, factor: RiskFactor) -> f64 {
        report.factor_contributions[&factor].points
    }

    #[test]
    fn harvest_rising_market_is_strong_sell() {
        let inputs = RiskInputs {
            trend: TrendDirection::Rising,
            trend_strength: 6.0,
            stage: CropStage::Harvest,
            soil_issues: 0,
            pct_change_7d: 3.0,
            pct_change_14d: 0.0,
            volatility: 10.0,
            current_price: 2000.0,
            ma_7: 2000.0,
        };
        let report = score_risk(&inputs, &RiskPolicy::default());
        // 50 + 25 + 20 + 5 + 6 = 106, clamped
        assert_eq!(report.score, 100.0);
        assert_eq!(report.recommendation_tier, RecommendationTier::StrongSell);
        assert_eq!(report.recommendation_tier.to_string(), "Strong Sell Opportunity");
    }

    #[test]
    fn every_factor_is_reported() {
        let report = score_risk(&neutral_inputs(), &RiskPolicy::default());
        assert_eq!(report.factor_contributions.len(), 6);
        // 50 - 5 (flowering) + 5 (healthy soil)
        assert_relative_eq!(report.score, 50.0);
        assert_eq!(report.recommendation_tier, RecommendationTier::SellWithCaution);
    }

    #[test]
    fn trend_bands() {
        let policy = RiskPolicy::default();
        let mut inputs = neutral_inputs();
        inputs.trend = TrendDirection::Rising;
        for (strength, expected) in [(1.0, 5.0), (3.0, 15.0), (5.5, 25.0)] {
            inputs.trend_strength = strength;
            assert_eq!(points(&score_risk(&inputs, &policy), RiskFactor::MarketTrend), expected);
        }
        inputs.trend = TrendDirection::Falling;
        for (strength, expected) in [(-1.0, -5.0), (-3.0, -15.0), (-7.0, -25.0)] {
            inputs.trend_strength = strength;
            assert_eq!(points(&score_risk(&inputs, &policy), RiskFactor::MarketTrend), expected);
        }
        inputs.trend = TrendDirection::InsufficientData;
        assert_eq!(points(&score_risk(&inputs, &policy), RiskFactor::MarketTrend), 0.0);
    }

    #[test]
    fn stage_points_are_monotonic_toward_harvest() {
        let policy = RiskPolicy::default();
        let ordered = [
            CropStage::Sowing,
            CropStage::Germination,
            CropStage::Tillering,
            CropStage::Flowering,
            CropStage::Maturity,
            CropStage::Harvest,
        ];
        for pair in ordered.windows(2) {
            assert!(policy.stage_points(pair[0]) <= policy.stage_points(pair[1]));
        }
        assert_eq!(policy.stage_points(CropStage::Harvest), 20.0);
        assert_eq!(policy.stage_points(CropStage::Sowing), -25.0);
    }

    #[test]
    fn soil_issue_bands() {
        let policy = RiskPolicy::default();
        let mut inputs = neutral_inputs();
        for (issues, expected) in [(0, 5.0), (1, -5.0), (3, -5.0), (4, -12.0)] {
            inputs.soil_issues = issues;
            assert_eq!(points(&score_risk(&inputs, &policy), RiskFactor::SoilHealth), expected);
        }
    }

    #[test]
    fn projection_is_capped() {
        let policy = RiskPolicy::default();
        let mut inputs = neutral_inputs();
        inputs.pct_change_7d = 2.0;
        inputs.pct_change_14d = 1.5;
        assert_relative_eq!(points(&score_risk(&inputs, &policy), RiskFactor::PriceProjection), 5.5);
        inputs.pct_change_7d = 30.0;
        assert_eq!(points(&score_risk(&inputs, &policy), RiskFactor::PriceProjection), 20.0);
        inputs.pct_change_7d = -30.0;
        assert_eq!(points(&score_risk(&inputs, &policy), RiskFactor::PriceProjection), -20.0);
    }

    #[test]
    fn volatility_penalties() {
        let policy = RiskPolicy::default();
        let mut inputs = neutral_inputs();
        inputs.volatility = 20.0;
        assert_eq!(points(&score_risk(&inputs, &policy), RiskFactor::Volatility), 0.0);
        inputs.volatility = 35.0;
        assert_relative_eq!(points(&score_risk(&inputs, &policy), RiskFactor::Volatility), -1.0);
        inputs.volatility = 100.0;
        assert_relative_eq!(points(&score_risk(&inputs, &policy), RiskFactor::Volatility), -5.0);
        inputs.volatility = 1000.0;
        assert_eq!(points(&score_risk(&inputs, &policy), RiskFactor::Volatility), -15.0);
    }

    #[test]
    fn price_versus_average() {
        let policy = RiskPolicy::default();
        let mut inputs = neutral_inputs();
        inputs.current_price = 2060.0; // +3%
        assert_relative_eq!(points(&score_risk(&inputs, &policy), RiskFactor::PriceVsAverage), 6.0, epsilon = 1e-9);
        inputs.current_price = 2200.0; // +10%
        assert_eq!(points(&score_risk(&inputs, &policy), RiskFactor::PriceVsAverage), 8.0);
        inputs.current_price = 1800.0; // -10%
        assert_eq!(points(&score_risk(&inputs, &policy), RiskFactor::PriceVsAverage), -8.0);
        inputs.current_price = 2020.0; // +1%
        assert_eq!(points(&score_risk(&inputs, &policy), RiskFactor::PriceVsAverage), 0.0);
    }

    #[test]
    fn worst_case_clamps_to_zero() {
        let inputs = RiskInputs {
            trend: TrendDirection::Falling,
            trend_strength: -20.0,
            stage: CropStage::Sowing,
            soil_issues: 9,
            pct_change_7d: -15.0,
            pct_change_14d: -20.0,
            volatility: 500.0,
            current_price: 1500.0,
            ma_7: 2000.0,
        };
        let report = score_risk(&inputs, &RiskPolicy::default());
        assert_eq!(report.score, 0.0);
        assert_eq!(report.recommendation_tier, RecommendationTier::DoNotSell);
    }

    #[test]
    fn non_finite_inputs_contribute_nothing() {
        let mut inputs = neutral_inputs();
        inputs.pct_change_7d = f64::NAN;
        inputs.volatility = f64::INFINITY;
        inputs.trend_strength = f64::NEG_INFINITY;
        let report = score_risk(&inputs, &RiskPolicy::default());
        assert!(report.score.is_finite());
        assert_relative_eq!(report.score, 50.0);
    }

    #[test]
    fn tier_boundaries() {
        let policy = RiskPolicy::default();
        assert_eq!(tier_for(80.0, &policy), RecommendationTier::StrongSell);
        assert_eq!(tier_for(79.9, &policy), RecommendationTier::ModerateSell);
        assert_eq!(tier_for(65.0, &policy), RecommendationTier::ModerateSell);
        assert_eq!(tier_for(50.0, &policy), RecommendationTier::SellWithCaution);
        assert_eq!(tier_for(35.0, &policy), RecommendationTier::Neutral);
        assert_eq!(tier_for(20.0, &policy), RecommendationTier::Wait);
        assert_eq!(tier_for(19.9, &policy), RecommendationTier::DoNotSell);
    }

    #[test]
    fn advisory_record_feeds_stage_and_soil() {
        let advisory = AdvisoryRecord {
            crop_stage: "Harvest".into(),
            soil_advice: vec!["Apply lime".into(), "Add potassium".into()],
        };
        let stage = parse_stage(&advisory.crop_stage);
        assert_eq!(stage, CropStage::Harvest);
        assert_eq!(advisory.soil_advice.len(), 2);
    }

    #[test]
    fn contribution_display() {
        assert_eq!(FactorContribution::new(5.0, "Healthy soil").to_string(), "+5.0 (Healthy soil)");
        assert_eq!(FactorContribution::new(-12.0, "Many").to_string(), "-12.0 (Many)");
    }

    #[test]
    fn volatility_alert_levels() {
        assert_eq!(volatility_alert(200.0).risk_level, RiskLevel::High);
        assert_eq!(volatility_alert(150.0).risk_level, RiskLevel::Medium);
        assert_eq!(volatility_alert(81.0).risk_level, RiskLevel::Medium);
        assert_eq!(volatility_alert(80.0).risk_level, RiskLevel::Low);
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        fn any_direction() -> impl Strategy<Value = TrendDirection> {
            prop_oneof![
                Just(TrendDirection::Rising),
                Just(TrendDirection::Falling),
                Just(TrendDirection::Stable),
                Just(TrendDirection::InsufficientData),
            ]
        }

        fn any_stage() -> impl Strategy<Value = CropStage> {
            (0..CropStage::ALL.len()).prop_map(|i| CropStage::ALL[i])
        }

        proptest! {
            #[test]
            fn score_stays_in_range(
                trend in any_direction(),
                trend_strength in -1e6f64..1e6,
                stage in any_stage(),
                soil_issues in 0usize..20,
                pct_change_7d in -1e4f64..1e4,
                pct_change_14d in -1e4f64..1e4,
                volatility in 0.0f64..1e5,
                current_price in 0.0f64..1e5,
                ma_7 in 0.0f64..1e5,
            ) {
                let inputs = RiskInputs {
                    trend,
                    trend_strength,
                    stage,
                    soil_issues,
                    pct_change_7d,
                    pct_change_14d,
                    volatility,
                    current_price,
                    ma_7,
                };
                let report = score_risk(&inputs, &RiskPolicy::default());
                prop_assert!((0.0..=100.0).contains(&report.score));
                prop_assert_eq!(report.factor_contributions.len(), 6);
            }
        }
    }
}
