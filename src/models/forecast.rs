use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// How soon a supply is expected to run out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum UrgencyTier {
    Normal,
    Warning,
    Urgent,
}

impl UrgencyTier {
    /// Under one month of stock is urgent; up to two months is a warning.
    pub fn from_months_remaining(months: f64) -> Self {
        if months < 1.0 {
            UrgencyTier::Urgent
        } else if months <= 2.0 {
            UrgencyTier::Warning
        } else {
            UrgencyTier::Normal
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            UrgencyTier::Normal => "Normal",
            UrgencyTier::Warning => "Warning",
            UrgencyTier::Urgent => "Urgent",
        }
    }
}

impl std::fmt::Display for UrgencyTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Derived stock runway for one supply. Recomputed on demand, never stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastResult {
    pub supply_id: Option<i64>,
    pub supply_name: String,
    pub current_stock: f64,
    pub average_monthly_usage: f64,
    /// `f64::INFINITY` when there is no usage in the window.
    #[serde(with = "infinite_as_null")]
    pub estimated_months_remaining: f64,
    pub recommended_purchase_date: Option<NaiveDate>,
    pub recommended_quantity: f64,
    pub urgency: UrgencyTier,
    pub records_considered: usize,
}

impl ForecastResult {
    pub fn has_usage_data(&self) -> bool {
        self.average_monthly_usage > 0.0
    }

    pub fn months_remaining_label(&self) -> String {
        if self.estimated_months_remaining.is_finite() {
            format!("{:.1}", self.estimated_months_remaining)
        } else {
            "no usage data".to_string()
        }
    }
}

/// JSON has no infinity; an unbounded runway serializes as `null`.
mod infinite_as_null {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &f64, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        if value.is_finite() {
            serializer.serialize_f64(*value)
        } else {
            serializer.serialize_none()
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<f64, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(f64::INFINITY))
    }
}

/// Usage totals for one (crop, supply) pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CultureConsumption {
    pub crop: String,
    pub supply_name: String,
    pub unit: String,
    pub total_quantity: f64,
    pub application_count: usize,
    pub total_cost: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConsumptionReport {
    pub entries: Vec<CultureConsumption>,
    /// Records dropped because their supply or planting area was not in the
    /// catalog.
    pub skipped_records: usize,
}

impl ConsumptionReport {
    pub fn total_cost(&self) -> f64 {
        self.entries.iter().map(|e| e.total_cost).sum()
    }

    pub fn for_crop<'a>(&'a self, crop: &'a str) -> impl Iterator<Item = &'a CultureConsumption> {
        self.entries.iter().filter(move |e| e.crop == crop)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn urgency_thresholds() {
        assert_eq!(UrgencyTier::from_months_remaining(0.0), UrgencyTier::Urgent);
        assert_eq!(UrgencyTier::from_months_remaining(0.99), UrgencyTier::Urgent);
        assert_eq!(UrgencyTier::from_months_remaining(1.0), UrgencyTier::Warning);
        assert_eq!(UrgencyTier::from_months_remaining(1.99), UrgencyTier::Warning);
        assert_eq!(UrgencyTier::from_months_remaining(2.0), UrgencyTier::Warning);
        assert_eq!(UrgencyTier::from_months_remaining(2.01), UrgencyTier::Normal);
        assert_eq!(
            UrgencyTier::from_months_remaining(f64::INFINITY),
            UrgencyTier::Normal
        );
    }

    #[test]
    fn urgency_ordering() {
        assert!(UrgencyTier::Urgent > UrgencyTier::Warning);
        assert!(UrgencyTier::Warning > UrgencyTier::Normal);
    }

    #[test]
    fn infinite_runway_serializes_as_null() {
        let result = ForecastResult {
            supply_id: Some(1),
            supply_name: "Glifosato".into(),
            current_stock: 100.0,
            average_monthly_usage: 0.0,
            estimated_months_remaining: f64::INFINITY,
            recommended_purchase_date: None,
            recommended_quantity: 0.0,
            urgency: UrgencyTier::Normal,
            records_considered: 0,
        };

        let json = serde_json::to_value(&result).unwrap();
        assert!(json["estimated_months_remaining"].is_null());
        assert_eq!(result.months_remaining_label(), "no usage data");

        let back: ForecastResult = serde_json::from_value(json).unwrap();
        assert!(back.estimated_months_remaining.is_infinite());
    }
}
