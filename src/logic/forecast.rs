use super::calculations::{add_months, months_between, window_start};
use crate::models::{ForecastResult, Supply, UrgencyTier, UsageRecord};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

pub const DEFAULT_HISTORY_WINDOW_MONTHS: u32 = 6;

/// How the number of months covered by the usage history is estimated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MonthsOfData {
    /// Record count / 4, at least one month. Assumes roughly weekly usage
    /// entries; kept as the default so reports match the dashboard.
    #[default]
    RecordCount,
    /// Months between the earliest and latest record, at least one month.
    DateSpan,
}

impl MonthsOfData {
    fn observed_months(&self, records: &[&UsageRecord]) -> f64 {
        let months = match self {
            MonthsOfData::RecordCount => records.len() as f64 / 4.0,
            MonthsOfData::DateSpan => {
                let earliest = records.iter().map(|r| r.usage_date).min();
                let latest = records.iter().map(|r| r.usage_date).max();
                match (earliest, latest) {
                    (Some(first), Some(last)) => months_between(first, last),
                    _ => 0.0,
                }
            }
        };
        months.max(1.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForecastPolicy {
    #[serde(default = "default_window")]
    pub history_window_months: u32,
    #[serde(default)]
    pub months_of_data: MonthsOfData,
    /// Reorder when this many months of stock remain.
    #[serde(default = "default_lead")]
    pub reorder_lead_months: f64,
    /// Months of average usage to buy when reordering.
    #[serde(default = "default_buffer")]
    pub buffer_months: f64,
}

fn default_window() -> u32 {
    DEFAULT_HISTORY_WINDOW_MONTHS
}

fn default_lead() -> f64 {
    1.0
}

fn default_buffer() -> f64 {
    3.0
}

impl ForecastPolicy {
    pub fn with_window(mut self, months: u32) -> Self {
        self.history_window_months = months;
        self
    }
}

impl Default for ForecastPolicy {
    fn default() -> Self {
        Self {
            history_window_months: default_window(),
            months_of_data: MonthsOfData::default(),
            reorder_lead_months: default_lead(),
            buffer_months: default_buffer(),
        }
    }
}

/// Project how long a supply's stock will last from its recent usage.
///
/// `history` may contain records for other supplies; only this supply's
/// records dated within the window ending at `as_of` are used. Never fails:
/// with no usage in the window the runway is infinite.
pub fn forecast(
    supply: &Supply,
    history: &[UsageRecord],
    as_of: NaiveDate,
    history_window_months: u32,
) -> ForecastResult {
    let policy = ForecastPolicy::default().with_window(history_window_months);
    forecast_with_policy(supply, history, as_of, &policy)
}

pub fn forecast_with_policy(
    supply: &Supply,
    history: &[UsageRecord],
    as_of: NaiveDate,
    policy: &ForecastPolicy,
) -> ForecastResult {
    let start = window_start(as_of, policy.history_window_months);

    let window: Vec<&UsageRecord> = history
        .iter()
        .filter(|r| Some(r.supply_id) == supply.id)
        .filter(|r| r.usage_date >= start && r.usage_date <= as_of)
        .filter(|r| r.quantity_used.is_finite() && r.quantity_used >= 0.0)
        .collect();

    if window.is_empty() {
        return no_usage(supply);
    }

    let total: f64 = window.iter().map(|r| r.quantity_used).sum();
    let observed_months = policy.months_of_data.observed_months(&window);
    let average_monthly_usage = total / observed_months;

    if average_monthly_usage <= 0.0 {
        return ForecastResult {
            records_considered: window.len(),
            ..no_usage(supply)
        };
    }

    let stock = supply.stock_quantity.max(0.0);
    let estimated_months_remaining = stock / average_monthly_usage;
    let reorder_in = (estimated_months_remaining - policy.reorder_lead_months).max(0.0);

    debug!(
        supply = %supply.name,
        records = window.len(),
        observed_months,
        average_monthly_usage,
        estimated_months_remaining,
        "Computed supply forecast"
    );

    ForecastResult {
        supply_id: supply.id,
        supply_name: supply.name.clone(),
        current_stock: supply.stock_quantity,
        average_monthly_usage,
        estimated_months_remaining,
        recommended_purchase_date: add_months(as_of, reorder_in),
        recommended_quantity: average_monthly_usage * policy.buffer_months,
        urgency: UrgencyTier::from_months_remaining(estimated_months_remaining),
        records_considered: window.len(),
    }
}

fn no_usage(supply: &Supply) -> ForecastResult {
    ForecastResult {
        supply_id: supply.id,
        supply_name: supply.name.clone(),
        current_stock: supply.stock_quantity,
        average_monthly_usage: 0.0,
        estimated_months_remaining: f64::INFINITY,
        recommended_purchase_date: None,
        recommended_quantity: 0.0,
        urgency: UrgencyTier::Normal,
        records_considered: 0,
    }
}

/// Forecast every supply in the catalog against the same history.
pub fn forecast_all(
    supplies: &[Supply],
    history: &[UsageRecord],
    as_of: NaiveDate,
    policy: &ForecastPolicy,
) -> Vec<ForecastResult> {
    supplies
        .iter()
        .map(|s| forecast_with_policy(s, history, as_of, policy))
        .collect()
}
