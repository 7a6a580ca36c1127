pub mod engine;
pub mod minimum_stock;
pub mod runout;

pub use engine::AlertEngine;

use crate::models::{Alert, ForecastResult, Supply};

/// Trait for stock alert rules
pub trait StockRule: Send + Sync {
    /// Unique identifier for this rule
    fn id(&self) -> &'static str;

    /// Human-readable name
    fn name(&self) -> &'static str;

    /// Evaluate the rule and return an alert if conditions are met
    fn evaluate(&self, supply: &Supply, forecast: &ForecastResult) -> Option<Alert>;
}
