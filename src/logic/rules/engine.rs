use super::{minimum_stock::MinimumStockRule, runout::RunoutRule, StockRule};
use crate::logic::forecast::{forecast_with_policy, ForecastPolicy};
use crate::models::{Alert, ForecastResult, Supply, UsageRecord};
use chrono::NaiveDate;

pub struct AlertEngine {
    rules: Vec<Box<dyn StockRule>>,
}

impl AlertEngine {
    pub fn new() -> Self {
        let rules: Vec<Box<dyn StockRule>> = vec![Box::new(MinimumStockRule), Box::new(RunoutRule)];

        Self { rules }
    }

    pub fn evaluate(&self, supply: &Supply, forecast: &ForecastResult) -> Vec<Alert> {
        self.rules
            .iter()
            .filter_map(|rule| rule.evaluate(supply, forecast))
            .collect()
    }

    pub fn evaluate_rule(
        &self,
        rule_id: &str,
        supply: &Supply,
        forecast: &ForecastResult,
    ) -> Option<Alert> {
        self.rules
            .iter()
            .find(|r| r.id() == rule_id)
            .and_then(|rule| rule.evaluate(supply, forecast))
    }

    /// Forecast every supply and collect all alerts, most severe first.
    pub fn evaluate_inventory(
        &self,
        supplies: &[Supply],
        history: &[UsageRecord],
        as_of: NaiveDate,
        policy: &ForecastPolicy,
    ) -> Vec<Alert> {
        let mut alerts: Vec<Alert> = supplies
            .iter()
            .flat_map(|supply| {
                let forecast = forecast_with_policy(supply, history, as_of, policy);
                self.evaluate(supply, &forecast)
            })
            .collect();

        alerts.sort_by(|a, b| {
            b.severity
                .cmp(&a.severity)
                .then_with(|| a.supply_name.cmp(&b.supply_name))
        });

        tracing::debug!(
            supplies = supplies.len(),
            alerts = alerts.len(),
            "Evaluated stock alerts"
        );

        alerts
    }

    pub fn list_rules(&self) -> Vec<(&'static str, &'static str)> {
        self.rules.iter().map(|r| (r.id(), r.name())).collect()
    }
}

impl Default for AlertEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Severity, SupplyCategory, UnitOfMeasure};

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 9, day).unwrap()
    }

    #[test]
    fn lists_rules() {
        let engine = AlertEngine::new();
        let ids: Vec<_> = engine.list_rules().into_iter().map(|(id, _)| id).collect();
        assert_eq!(ids, vec!["minimum_stock", "stock_runout"]);
    }

    #[test]
    fn inventory_alerts_are_sorted_by_severity() {
        let supplies = vec![
            // below minimum but no usage
            Supply::new("Adjuvante", SupplyCategory::Adjuvant, UnitOfMeasure::Liter)
                .with_id(1)
                .with_stock(5.0)
                .with_minimum(10.0),
            // empty and being used
            Supply::new("Glifosato", SupplyCategory::Herbicide, UnitOfMeasure::Liter)
                .with_id(2)
                .with_stock(0.0)
                .with_minimum(20.0),
            // healthy
            Supply::new("Ureia", SupplyCategory::Fertilizer, UnitOfMeasure::Kilogram)
                .with_id(3)
                .with_stock(1000.0)
                .with_minimum(100.0),
        ];
        let history = vec![
            UsageRecord::new(2, 10, 15.0, d(2)),
            UsageRecord::new(3, 10, 10.0, d(3)),
        ];

        let alerts = AlertEngine::new().evaluate_inventory(
            &supplies,
            &history,
            d(30),
            &ForecastPolicy::default(),
        );

        assert_eq!(alerts.len(), 3);
        assert_eq!(alerts[0].severity, Severity::Critical);
        assert_eq!(alerts[0].supply_name, "Glifosato");
        assert_eq!(alerts[1].severity, Severity::Critical);
        assert_eq!(alerts[1].supply_name, "Glifosato");
        assert_eq!(alerts[2].severity, Severity::Warning);
        assert_eq!(alerts[2].supply_name, "Adjuvante");
        assert!(alerts.iter().all(|a| a.supply_name != "Ureia"));
    }

    #[test]
    fn evaluate_single_rule() {
        let supply = Supply::new("Glifosato", SupplyCategory::Herbicide, UnitOfMeasure::Liter)
            .with_id(1)
            .with_stock(5.0)
            .with_minimum(10.0);
        let forecast = forecast_with_policy(&supply, &[], d(30), &ForecastPolicy::default());
        let engine = AlertEngine::new();

        assert!(engine
            .evaluate_rule("minimum_stock", &supply, &forecast)
            .is_some());
        assert!(engine
            .evaluate_rule("stock_runout", &supply, &forecast)
            .is_none());
        assert!(engine.evaluate_rule("unknown", &supply, &forecast).is_none());
    }
}
