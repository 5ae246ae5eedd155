//! Core domain types and logic.

pub mod error;
pub mod price_series;
pub mod indicator;
pub mod store;
pub mod trend;
pub mod projection;
pub mod simulation;
pub mod crop_stage;
pub mod risk;
pub mod strategy;
pub mod fair_price;
pub mod mandi;
pub mod settings;
pub mod advice;
