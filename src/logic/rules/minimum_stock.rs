use super::StockRule;
use crate::models::{Alert, AlertCategory, ForecastResult, Severity, Supply};

/// Minimum stock rule - flags supplies at or below their reorder threshold
///
/// Severity levels:
/// - Warning: stock at or below the configured minimum
/// - Critical: nothing left on hand
///
/// Supplies without a threshold only alert once they are empty.
pub struct MinimumStockRule;

impl StockRule for MinimumStockRule {
    fn id(&self) -> &'static str {
        "minimum_stock"
    }

    fn name(&self) -> &'static str {
        "Below Minimum Stock"
    }

    fn evaluate(&self, supply: &Supply, forecast: &ForecastResult) -> Option<Alert> {
        if !supply.is_below_minimum() {
            return None;
        }

        let unit = supply.unit.symbol();
        let empty = supply.stock_quantity <= 0.0;
        let severity = if empty {
            Severity::Critical
        } else {
            Severity::Warning
        };

        let title = if empty {
            format!("{} Out of Stock", supply.name)
        } else {
            format!("{} Below Minimum", supply.name)
        };

        let description = format!(
            "{:.1} {} on hand against a minimum of {:.1} {}.",
            supply.stock_quantity, unit, supply.minimum_stock, unit
        );

        let shortfall = (supply.minimum_stock - supply.stock_quantity).max(0.0);
        let suggested = if forecast.has_usage_data() {
            forecast.recommended_quantity.max(shortfall)
        } else {
            shortfall
        };

        let mut alert = Alert::new(
            self.id(),
            AlertCategory::LowStock,
            severity,
            title,
            description,
        )
        .for_supply(supply.id, &supply.name)
        .with_data_point("Stock", format!("{:.1} {}", supply.stock_quantity, unit))
        .with_data_point("Minimum", format!("{:.1} {}", supply.minimum_stock, unit));

        if suggested > 0.0 {
            alert = alert.with_action(format!(
                "Purchase at least {:.1} {} of {}.",
                suggested, unit, supply.name
            ));
        }

        Some(alert)
    }
}
