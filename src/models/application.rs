use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EquipmentType {
    GroundRig,
    Drone,
}

impl EquipmentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EquipmentType::GroundRig => "Ground Rig",
            EquipmentType::Drone => "Drone",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().replace(['-', ' ', '_'], "").as_str() {
            "groundrig" | "ground" | "pulverizador" | "terrestre" => Some(EquipmentType::GroundRig),
            "drone" => Some(EquipmentType::Drone),
            _ => None,
        }
    }

    pub fn all() -> &'static [EquipmentType] {
        &[EquipmentType::GroundRig, EquipmentType::Drone]
    }
}

impl std::fmt::Display for EquipmentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Conditions observed when the application was made.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    pub temperature_c: Option<f64>,
    pub humidity_percent: Option<f64>,
    pub wind_speed_kmh: Option<f64>,
}

impl WeatherSnapshot {
    pub fn is_empty(&self) -> bool {
        self.temperature_c.is_none()
            && self.humidity_percent.is_none()
            && self.wind_speed_kmh.is_none()
    }
}

/// A spray event as persisted in the application log. Never mutated once
/// written.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationEvent {
    pub id: Option<i64>,
    pub equipment_type: EquipmentType,
    pub supply_id: i64,
    pub planting_area_id: i64,
    pub application_date: NaiveDate,
    pub area_applied_ha: f64,
    pub dosage_per_ha: f64,
    pub product_volume_l: f64,
    pub mix_volume_l: f64,
    pub weather_snapshot: Option<WeatherSnapshot>,
    pub cost: f64,
    pub created_at: chrono::DateTime<Utc>,
}
