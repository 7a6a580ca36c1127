use crate::models::WeatherSnapshot;
use serde::{Deserialize, Serialize};

/// Spray-condition concern raised by the weather advisor. Advisory only,
/// never blocks recording an application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AdvisoryFlag {
    TemperatureOutOfRange,
    LowHumidity,
    HighWind,
}

impl AdvisoryFlag {
    pub fn as_str(&self) -> &'static str {
        match self {
            AdvisoryFlag::TemperatureOutOfRange => "Temperature out of range",
            AdvisoryFlag::LowHumidity => "Low humidity",
            AdvisoryFlag::HighWind => "High wind",
        }
    }

    pub fn guidance(&self) -> &'static str {
        match self {
            AdvisoryFlag::TemperatureOutOfRange => {
                "Droplets evaporate or the product volatilises outside the ideal \
                 temperature band. Prefer early morning or late afternoon."
            }
            AdvisoryFlag::LowHumidity => {
                "Dry air shortens droplet life and increases drift. Wait for \
                 humidity to recover."
            }
            AdvisoryFlag::HighWind => {
                "Strong wind carries the calda off target. Postpone or switch to \
                 coarser droplets."
            }
        }
    }
}

impl std::fmt::Display for AdvisoryFlag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SprayThresholds {
    #[serde(default = "default_min_temp")]
    pub min_temperature_c: f64,
    #[serde(default = "default_max_temp")]
    pub max_temperature_c: f64,
    #[serde(default = "default_min_humidity")]
    pub min_humidity_percent: f64,
    #[serde(default = "default_max_wind")]
    pub max_wind_kmh: f64,
}

fn default_min_temp() -> f64 {
    15.0
}

fn default_max_temp() -> f64 {
    25.0
}

fn default_min_humidity() -> f64 {
    55.0
}

fn default_max_wind() -> f64 {
    10.0
}

impl Default for SprayThresholds {
    fn default() -> Self {
        Self {
            min_temperature_c: default_min_temp(),
            max_temperature_c: default_max_temp(),
            min_humidity_percent: default_min_humidity(),
            max_wind_kmh: default_max_wind(),
        }
    }
}

/// Classify conditions against the standard spraying thresholds. Unknown
/// readings produce no flag.
pub fn assess_conditions(
    temperature_c: Option<f64>,
    humidity_percent: Option<f64>,
    wind_kmh: Option<f64>,
) -> Vec<AdvisoryFlag> {
    assess_conditions_with(
        &SprayThresholds::default(),
        temperature_c,
        humidity_percent,
        wind_kmh,
    )
}

pub fn assess_conditions_with(
    thresholds: &SprayThresholds,
    temperature_c: Option<f64>,
    humidity_percent: Option<f64>,
    wind_kmh: Option<f64>,
) -> Vec<AdvisoryFlag> {
    let mut flags = Vec::new();

    // Order is fixed: temperature, humidity, wind
    if let Some(temp) = temperature_c.filter(|t| t.is_finite()) {
        if temp < thresholds.min_temperature_c || temp > thresholds.max_temperature_c {
            flags.push(AdvisoryFlag::TemperatureOutOfRange);
        }
    }

    if let Some(humidity) = humidity_percent.filter(|h| h.is_finite()) {
        if humidity < thresholds.min_humidity_percent {
            flags.push(AdvisoryFlag::LowHumidity);
        }
    }

    if let Some(wind) = wind_kmh.filter(|w| w.is_finite()) {
        if wind > thresholds.max_wind_kmh {
            flags.push(AdvisoryFlag::HighWind);
        }
    }

    flags
}

pub fn assess_snapshot(thresholds: &SprayThresholds, snapshot: &WeatherSnapshot) -> Vec<AdvisoryFlag> {
    assess_conditions_with(
        thresholds,
        snapshot.temperature_c,
        snapshot.humidity_percent,
        snapshot.wind_speed_kmh,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nominal_conditions_have_no_flags() {
        assert!(assess_conditions(Some(20.0), Some(70.0), Some(5.0)).is_empty());
    }

    #[test]
    fn all_flags_in_fixed_order() {
        assert_eq!(
            assess_conditions(Some(30.0), Some(40.0), Some(15.0)),
            vec![
                AdvisoryFlag::TemperatureOutOfRange,
                AdvisoryFlag::LowHumidity,
                AdvisoryFlag::HighWind
            ]
        );
    }

    #[test]
    fn unknown_conditions_are_silent() {
        assert!(assess_conditions(None, None, None).is_empty());
        assert_eq!(
            assess_conditions(None, None, Some(12.0)),
            vec![AdvisoryFlag::HighWind]
        );
        assert!(assess_conditions(Some(f64::NAN), None, None).is_empty());
    }

    #[test]
    fn boundaries_are_inclusive_of_the_good_range() {
        assert!(assess_conditions(Some(15.0), Some(55.0), Some(10.0)).is_empty());
        assert!(assess_conditions(Some(25.0), None, None).is_empty());
        assert_eq!(
            assess_conditions(Some(14.9), None, None),
            vec![AdvisoryFlag::TemperatureOutOfRange]
        );
        assert_eq!(
            assess_conditions(Some(25.1), Some(54.9), Some(10.1)),
            vec![
                AdvisoryFlag::TemperatureOutOfRange,
                AdvisoryFlag::LowHumidity,
                AdvisoryFlag::HighWind
            ]
        );
    }

    #[test]
    fn cold_morning_flags_temperature_only() {
        assert_eq!(
            assess_conditions(Some(8.0), Some(90.0), Some(2.0)),
            vec![AdvisoryFlag::TemperatureOutOfRange]
        );
    }

    #[test]
    fn custom_thresholds() {
        let thresholds = SprayThresholds {
            max_wind_kmh: 15.0,
            ..Default::default()
        };
        assert!(assess_conditions_with(&thresholds, None, None, Some(12.0)).is_empty());
    }

    #[test]
    fn snapshot_assessment() {
        let snapshot = WeatherSnapshot {
            temperature_c: Some(22.0),
            humidity_percent: Some(48.0),
            wind_speed_kmh: None,
        };
        assert_eq!(
            assess_snapshot(&SprayThresholds::default(), &snapshot),
            vec![AdvisoryFlag::LowHumidity]
        );
    }
}
