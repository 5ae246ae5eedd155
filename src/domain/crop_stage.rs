//! Crop growth stages shared by the stage classifier and the risk scorer.

use crate::domain::error::SellcastError;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum CropStage {
    Sowing,
    Germination,
    Tillering,
    Flowering,
    Maturity,
    Harvest,
    Unknown,
}

impl CropStage {
    pub const ALL: [CropStage; 7] = [
        CropStage::Sowing,
        CropStage::Germination,
        CropStage::Tillering,
        CropStage::Flowering,
        CropStage::Maturity,
        CropStage::Harvest,
        CropStage::Unknown,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            CropStage::Sowing => "Sowing",
            CropStage::Germination => "Germination",
            CropStage::Tillering => "Tillering",
            CropStage::Flowering => "Flowering",
            CropStage::Maturity => "Maturity",
            CropStage::Harvest => "Harvest",
            CropStage::Unknown => "Unknown",
        }
    }

    /// Lowercase identifier used as the config key for this stage.
    pub fn key(&self) -> &'static str {
        match self {
            CropStage::Sowing => "sowing",
            CropStage::Germination => "germination",
            CropStage::Tillering => "tillering",
            CropStage::Flowering => "flowering",
            CropStage::Maturity => "maturity",
            CropStage::Harvest => "harvest",
            CropStage::Unknown => "unknown",
        }
    }
}

impl fmt::Display for CropStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Case-insensitive. Unrecognized names parse to `Unknown`, never an error.
impl FromStr for CropStage {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let stage = match s.trim().to_lowercase().as_str() {
            "sowing" => CropStage::Sowing,
            "germination" => CropStage::Germination,
            "tillering" => CropStage::Tillering,
            "flowering" => CropStage::Flowering,
            "maturity" | "maturity & ripening" => CropStage::Maturity,
            "harvest" | "harvesting" => CropStage::Harvest,
            _ => CropStage::Unknown,
        };
        Ok(stage)
    }
}

/// Parse a stage name from an upstream advisory record.
pub fn parse_stage(s: &str) -> CropStage {
    s.parse().unwrap_or(CropStage::Unknown)
}

struct StageWindow {
    stage: CropStage,
    start_day: i64,
    end_day: i64,
}

const WHEAT_STAGES: [StageWindow; 6] = [
    StageWindow { stage: CropStage::Sowing, start_day: 0, end_day: 7 },
    StageWindow { stage: CropStage::Germination, start_day: 8, end_day: 21 },
    StageWindow { stage: CropStage::Tillering, start_day: 22, end_day: 45 },
    StageWindow { stage: CropStage::Flowering, start_day: 46, end_day: 75 },
    StageWindow { stage: CropStage::Maturity, start_day: 76, end_day: 110 },
    StageWindow { stage: CropStage::Harvest, start_day: 111, end_day: 130 },
];

pub const SUPPORTED_CROPS: [&str; 1] = ["wheat"];

/// Stage of `crop` after `days_since_sowing` days. Days outside the calendar
/// (negative, or past harvest) classify as `Unknown`.
pub fn classify_stage(crop: &str, days_since_sowing: i64) -> Result<CropStage, SellcastError> {
    let table: &[StageWindow] = match crop.trim().to_lowercase().as_str() {
        "wheat" => &WHEAT_STAGES,
        other => {
            return Err(SellcastError::invalid_input(format!(
                "unsupported crop for stage classification: {other}"
            )))
        }
    };

    Ok(table
        .iter()
        .find(|w| w.start_day <= days_since_sowing && days_since_sowing <= w.end_day)
        .map(|w| w.stage)
        .unwrap_or(CropStage::Unknown))
}
