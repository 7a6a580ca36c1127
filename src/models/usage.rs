use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UsageRecord {
    pub id: Option<i64>,
    pub supply_id: i64,
    pub planting_area_id: i64,
    pub quantity_used: f64,
    pub usage_date: NaiveDate,
    pub responsible: Option<String>,
}

impl UsageRecord {
    pub fn new(supply_id: i64, planting_area_id: i64, quantity: f64, date: NaiveDate) -> Self {
        Self {
            id: None,
            supply_id,
            planting_area_id,
            quantity_used: quantity,
            usage_date: date,
            responsible: None,
        }
    }

    pub fn with_responsible(mut self, name: &str) -> Self {
        self.responsible = Some(name.to_string());
        self
    }
}

/// Expense entry the record store appends for every confirmed application.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinancialRecord {
    pub id: Option<i64>,
    pub kind: String,
    pub amount: f64,
    pub description: String,
    pub record_date: NaiveDate,
    pub application_id: Option<i64>,
}
