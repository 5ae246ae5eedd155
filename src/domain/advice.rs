//! End-to-end sell advice for one price source.
//!
//! Load the series, analyze trend, project (memoized per loaded series), score risk,
//! split the sale, and optionally simulate the chosen horizon using the risk
//! score as base confidence.

use crate::adapters::ttl_cache::TtlCache;
use crate::domain::error::SellcastError;
use crate::domain::fair_price::{fair_price, FairPrice};
use crate::domain::projection::{generate_projection, ProjectionReport};
use crate::domain::risk::{score_risk, volatility_alert, AdvisoryRecord, RiskInputs, RiskReport, VolatilityAlert};
use crate::domain::settings::Settings;
use crate::domain::simulation::{simulate_sell_decision, SimulationReport};
use crate::domain::store::PriceStore;
use crate::domain::strategy::{plan_for_score, StrategyPlan};
use crate::domain::trend::{analyze_trend, TrendReport};
use chrono::NaiveDate;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq)]
pub struct AdviceRequest {
    pub source: String,
    pub crop: String,
    pub advisory: AdvisoryRecord,
    /// When set, also simulate selling this many days from now.
    pub sell_after_days: Option<u32>,
    pub seed: Option<u64>,
}

impl AdviceRequest {
    pub fn new(source: &str, crop: &str, advisory: AdvisoryRecord) -> Self {
        Self {
            source: source.to_string(),
            crop: crop.to_string(),
            advisory,
            sell_after_days: None,
            seed: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct SellAdvice {
    pub source: String,
    pub as_of: NaiveDate,
    pub trend: TrendReport,
    pub projection: ProjectionReport,
    pub risk: RiskReport,
    pub strategy: StrategyPlan,
    pub simulation: Option<SimulationReport>,
    pub fair_price: FairPrice,
    pub volatility_alert: VolatilityAlert,
}

pub struct SellAdvisor {
    store: PriceStore,
    reports: TtlCache<String, Arc<ProjectionReport>>,
    settings: Settings,
}

impl SellAdvisor {
    pub fn new(store: PriceStore, settings: Settings) -> Self {
        let reports = TtlCache::new(settings.data.report_ttl);
        Self::with_report_cache(store, reports, settings)
    }

    pub fn with_report_cache(
        store: PriceStore,
        reports: TtlCache<String, Arc<ProjectionReport>>,
        settings: Settings,
    ) -> Self {
        Self {
            store,
            reports,
            settings,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn store(&self) -> &PriceStore {
        &self.store
    }

    pub fn trend(&self, source: &str) -> Result<TrendReport, SellcastError> {
        let series = self.store.load(source)?;
        analyze_trend(&series.prices(), &self.settings.trend)
    }

    /// Projection for the currently loaded series of `source`. Reports are
    /// keyed by the series' last date and length, so a reloaded series with
    /// new points never reuses a report built from the old one.
    pub fn projection(&self, source: &str) -> Result<Arc<ProjectionReport>, SellcastError> {
        let series = self.store.load(source)?;
        let key = format!("{}{}:{}", report_prefix(source), series.last_date(), series.len());
        self.reports.get_or_try_insert_with(key, || {
            tracing::debug!(source, "computing projection");
            generate_projection(&series, &self.settings.projection).map(Arc::new)
        })
    }

    pub fn simulate(
        &self,
        source: &str,
        days: u32,
        base_confidence: f64,
        seed: Option<u64>,
    ) -> Result<SimulationReport, SellcastError> {
        let series = self.store.load(source)?;
        simulate_sell_decision(&series.prices(), days, base_confidence, seed, &self.settings.simulation)
    }

    /// Drop the cached series and every report derived from it.
    pub fn refresh(&self, source: &str) {
        self.store.invalidate(source);
        self.reports.invalidate_prefix(&report_prefix(source));
    }

    pub fn advise(&self, request: &AdviceRequest) -> Result<SellAdvice, SellcastError> {
        let source = request.source.as_str();
        let series = self.store.load(source)?;
        let prices = series.prices();

        let trend = analyze_trend(&prices, &self.settings.trend)?;
        let projection = self.projection(source)?;

        let inputs = RiskInputs::from_reports(&request.advisory, &trend, &projection);
        let risk = score_risk(&inputs, &self.settings.risk);
        let strategy = plan_for_score(risk.score, &self.settings.strategy);

        let simulation = match request.sell_after_days {
            Some(days) => Some(simulate_sell_decision(
                &prices,
                days,
                risk.score,
                request.seed,
                &self.settings.simulation,
            )?),
            None => None,
        };

        let msp = self.settings.msp.msp_for(&request.crop);
        let fair_price = fair_price(projection.current_price, projection.ma_7, msp)?;
        let volatility_alert = volatility_alert(projection.volatility);

        tracing::info!(
            source,
            crop = %request.crop,
            stage = %inputs.stage,
            score = risk.score,
            tier = %risk.recommendation_tier,
            sell_now_pct = strategy.sell_now_pct,
            "advice ready"
        );

        Ok(SellAdvice {
            source: source.to_string(),
            as_of: series.last_date(),
            trend,
            projection: projection.as_ref().clone(),
            risk,
            strategy,
            simulation,
            fair_price,
            volatility_alert,
        })
    }
}

fn report_prefix(source: &str) -> String {
    format!("projection:{source}:")
}
