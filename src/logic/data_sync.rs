use crate::config::Config;
use crate::datasources::OpenWeatherMapClient;
use crate::error::Result;
use crate::models::WeatherSnapshot;

/// Resolves the conditions to assess for a spray: readings the operator
/// typed in take priority, gaps are filled from OpenWeatherMap when it is
/// configured.
pub struct ConditionsService {
    openweathermap_client: Option<OpenWeatherMapClient>,
}

impl ConditionsService {
    pub fn new(config: &Config) -> Self {
        // Create OpenWeatherMap client if configured and enabled
        let openweathermap_client = config
            .openweathermap
            .as_ref()
            .filter(|c| c.enabled && !c.api_key.is_empty())
            .map(|c| {
                tracing::info!("OpenWeatherMap client configured for current conditions");
                OpenWeatherMapClient::new(c.clone())
            });

        if openweathermap_client.is_none() {
            tracing::info!("OpenWeatherMap not configured - using manual readings only");
        }

        Self {
            openweathermap_client,
        }
    }

    pub fn has_live_source(&self) -> bool {
        self.openweathermap_client.is_some()
    }

    pub async fn resolve(&self, manual: WeatherSnapshot) -> WeatherSnapshot {
        let complete = manual.temperature_c.is_some()
            && manual.humidity_percent.is_some()
            && manual.wind_speed_kmh.is_some();
        if complete {
            return manual;
        }

        let Some(ref client) = self.openweathermap_client else {
            return manual;
        };

        match client.fetch_current().await {
            Ok(live) => merge(manual, live),
            Err(e) => {
                tracing::warn!("Failed to fetch current conditions: {}", e);
                manual
            }
        }
    }

    pub async fn check_connection(&self) -> Result<Option<bool>> {
        match self.openweathermap_client {
            Some(ref client) => Ok(Some(client.test_connection().await?)),
            None => Ok(None),
        }
    }
}

/// Field-by-field merge preferring `primary`.
pub fn merge(primary: WeatherSnapshot, fallback: WeatherSnapshot) -> WeatherSnapshot {
    WeatherSnapshot {
        temperature_c: primary.temperature_c.or(fallback.temperature_c),
        humidity_percent: primary.humidity_percent.or(fallback.humidity_percent),
        wind_speed_kmh: primary.wind_speed_kmh.or(fallback.wind_speed_kmh),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manual_readings_win() {
        let manual = WeatherSnapshot {
            temperature_c: Some(18.0),
            humidity_percent: None,
            wind_speed_kmh: Some(3.0),
        };
        let live = WeatherSnapshot {
            temperature_c: Some(24.0),
            humidity_percent: Some(60.0),
            wind_speed_kmh: Some(12.0),
        };

        let merged = merge(manual, live);
        assert_eq!(merged.temperature_c, Some(18.0));
        assert_eq!(merged.humidity_percent, Some(60.0));
        assert_eq!(merged.wind_speed_kmh, Some(3.0));
    }

    #[tokio::test]
    async fn without_live_source_returns_manual() {
        let service = ConditionsService::new(&Config::default());
        assert!(!service.has_live_source());

        let manual = WeatherSnapshot {
            humidity_percent: Some(70.0),
            ..Default::default()
        };
        assert_eq!(service.resolve(manual).await, manual);
        assert_eq!(service.check_connection().await.unwrap(), None);
    }
}
