use crate::config::OpenWeatherMapConfig;
use crate::error::{Result, SafraError};
use crate::models::WeatherSnapshot;
use serde::Deserialize;

const API_BASE_URL: &str = "https://api.openweathermap.org/data/2.5";

/// m/s to km/h
const MS_TO_KMH: f64 = 3.6;

pub struct OpenWeatherMapClient {
    client: reqwest::Client,
    config: OpenWeatherMapConfig,
}

// OpenWeatherMap API response structures
#[derive(Debug, Deserialize)]
struct OwmCurrentResponse {
    main: OwmMain,
    #[serde(default)]
    wind: Option<OwmWind>,
    #[serde(default)]
    name: String,
}

#[derive(Debug, Deserialize)]
struct OwmMain {
    temp: f64,
    humidity: f64,
}

#[derive(Debug, Deserialize)]
struct OwmWind {
    speed: f64,
}

impl OpenWeatherMapClient {
    pub fn new(config: OpenWeatherMapConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    fn current_url(&self) -> String {
        format!(
            "{}/weather?lat={}&lon={}&appid={}&units=metric",
            API_BASE_URL, self.config.latitude, self.config.longitude, self.config.api_key
        )
    }

    /// Fetch current conditions at the configured farm location
    pub async fn fetch_current(&self) -> Result<WeatherSnapshot> {
        let response = self
            .client
            .get(self.current_url())
            .send()
            .await
            .map_err(|e| SafraError::DataSourceUnavailable(format!("OpenWeatherMap: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(SafraError::DataSourceUnavailable(format!(
                "OpenWeatherMap returned {}: {}",
                status, body
            )));
        }

        let owm_response: OwmCurrentResponse = response.json().await.map_err(|e| {
            SafraError::DataSourceUnavailable(format!(
                "Failed to parse OpenWeatherMap response: {}",
                e
            ))
        })?;

        tracing::debug!(location = %owm_response.name, "Fetched current conditions");

        Ok(convert_current(&owm_response))
    }

    /// Test connection to OpenWeatherMap API
    pub async fn test_connection(&self) -> Result<bool> {
        let response = self
            .client
            .get(self.current_url())
            .send()
            .await
            .map_err(|e| SafraError::DataSourceUnavailable(format!("OpenWeatherMap: {}", e)))?;

        Ok(response.status().is_success())
    }
}

fn convert_current(response: &OwmCurrentResponse) -> WeatherSnapshot {
    WeatherSnapshot {
        temperature_c: Some(response.main.temp),
        humidity_percent: Some(response.main.humidity),
        wind_speed_kmh: response.wind.as_ref().map(|w| w.speed * MS_TO_KMH),
    }
}
