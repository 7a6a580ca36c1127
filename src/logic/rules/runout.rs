use super::StockRule;
use crate::models::{Alert, AlertCategory, ForecastResult, Severity, Supply, UrgencyTier};

/// Runout forecast rule - warns when projected usage will exhaust a supply
///
/// Severity follows the forecast urgency tier:
/// - Critical: less than one month of stock
/// - Warning: up to two months of stock
pub struct RunoutRule;

impl StockRule for RunoutRule {
    fn id(&self) -> &'static str {
        "stock_runout"
    }

    fn name(&self) -> &'static str {
        "Projected Stock Runout"
    }

    fn evaluate(&self, supply: &Supply, forecast: &ForecastResult) -> Option<Alert> {
        let severity = match forecast.urgency {
            UrgencyTier::Urgent => Severity::Critical,
            UrgencyTier::Warning => Severity::Warning,
            UrgencyTier::Normal => return None,
        };

        let unit = supply.unit.symbol();
        let title = match forecast.urgency {
            UrgencyTier::Urgent => format!("{} Runs Out This Month", supply.name),
            _ => format!("{} Running Low", supply.name),
        };

        let description = format!(
            "At {:.1} {}/month the current {:.1} {} lasts about {} month(s).",
            forecast.average_monthly_usage,
            unit,
            forecast.current_stock,
            unit,
            forecast.months_remaining_label()
        );

        let purchase_by = forecast
            .recommended_purchase_date
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| "now".to_string());

        let alert = Alert::new(
            self.id(),
            AlertCategory::Runout,
            severity,
            title,
            description,
        )
        .for_supply(supply.id, &supply.name)
        .with_data_point(
            "Monthly Usage",
            format!("{:.1} {}", forecast.average_monthly_usage, unit),
        )
        .with_data_point("Months Remaining", forecast.months_remaining_label())
        .with_data_point("Purchase By", &purchase_by)
        .with_action(format!(
            "Order {:.1} {} of {} by {}.",
            forecast.recommended_quantity, unit, supply.name, purchase_by
        ));

        Some(alert)
    }
}
