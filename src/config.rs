use crate::error::{Result, SafraError};
use crate::logic::{ForecastPolicy, SprayRates, SprayThresholds};
use crate::models::EquipmentType;
use dialoguer::{Input, Password};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub farm: FarmConfig,
    #[serde(default)]
    pub spray_rates: SprayRates,
    #[serde(default)]
    pub spray_conditions: SprayThresholds,
    #[serde(default)]
    pub equipment: EquipmentConfig,
    #[serde(default)]
    pub forecast: ForecastPolicy,
    pub openweathermap: Option<OpenWeatherMapConfig>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FarmConfig {
    pub name: String,
    #[serde(default)]
    pub property: Option<String>,
}

/// Default tank capacities used when the caller does not give one.
#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
pub struct EquipmentConfig {
    #[serde(default = "default_ground_rig_tank")]
    pub ground_rig_tank_l: f64,
    #[serde(default = "default_drone_tank")]
    pub drone_tank_l: f64,
}

fn default_ground_rig_tank() -> f64 {
    2000.0
}

fn default_drone_tank() -> f64 {
    10.0
}

impl EquipmentConfig {
    pub fn tank_for(&self, equipment: EquipmentType) -> f64 {
        match equipment {
            EquipmentType::GroundRig => self.ground_rig_tank_l,
            EquipmentType::Drone => self.drone_tank_l,
        }
    }
}

impl Default for EquipmentConfig {
    fn default() -> Self {
        Self {
            ground_rig_tank_l: default_ground_rig_tank(),
            drone_tank_l: default_drone_tank(),
        }
    }
}

#[derive(Clone, Deserialize, Serialize)]
pub struct OpenWeatherMapConfig {
    pub api_key: String,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}

impl std::fmt::Debug for OpenWeatherMapConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenWeatherMapConfig")
            .field("api_key", &"[REDACTED]")
            .field("latitude", &self.latitude)
            .field("longitude", &self.longitude)
            .field("enabled", &self.enabled)
            .finish()
    }
}

impl Config {
    pub fn load(config_override: Option<PathBuf>) -> Result<Self> {
        let config_path = match config_override {
            Some(p) => p,
            None => Self::find_config_path()?,
        };

        if !config_path.exists() {
            return Err(SafraError::Config(format!(
                "Config file not found at {:?}. Run `safra init` to set up.",
                config_path
            )));
        }

        let config_str = std::fs::read_to_string(&config_path)
            .map_err(|e| SafraError::Config(format!("Failed to read config: {}", e)))?;

        let config = Self::from_yaml(&config_str)?;
        tracing::debug!(path = %config_path.display(), "Loaded configuration");

        Ok(config)
    }

    /// Load the config if one exists, otherwise fall back to defaults.
    /// An explicit path that does not exist is still an error.
    pub fn load_or_default(config_override: Option<PathBuf>) -> Result<Self> {
        if config_override.is_some() || Self::exists(None) {
            return Self::load(config_override);
        }
        tracing::info!("No configuration found, using defaults");
        Ok(Self::default())
    }

    /// Parse YAML after `${VAR}` substitution.
    pub fn from_yaml(content: &str) -> Result<Self> {
        let content = Self::substitute_env_vars(content)?;
        let config: Self = serde_yaml::from_str(&content)
            .map_err(|e| SafraError::Config(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject policy values that would produce meaningless forecasts.
    fn validate(&self) -> Result<()> {
        let forecast = &self.forecast;
        for (name, value) in [
            ("forecast.reorder_lead_months", forecast.reorder_lead_months),
            ("forecast.buffer_months", forecast.buffer_months),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(SafraError::Config(format!(
                    "{} must be a finite, non-negative number (got {})",
                    name, value
                )));
            }
        }
        Ok(())
    }

    /// Search for config.yaml in standard locations.
    /// Returns the path of the first found config, or the XDG default path if none found.
    fn find_config_path() -> Result<PathBuf> {
        // Try current directory first
        let local_config = PathBuf::from("config/config.yaml");
        if local_config.exists() {
            return Ok(local_config);
        }

        // Try XDG config directory
        if let Some(config_dir) = dirs::config_dir() {
            let xdg_config = config_dir.join("safra").join("config.yaml");
            if xdg_config.exists() {
                return Ok(xdg_config);
            }
        }

        Self::default_config_path()
    }

    /// Returns true if a config file can be found in any standard location.
    pub fn exists(config_override: Option<&PathBuf>) -> bool {
        match config_override {
            Some(p) => p.exists(),
            None => Self::find_config_path()
                .map(|p| p.exists())
                .unwrap_or(false),
        }
    }

    /// Default path for writing new config files (~/.config/safra/config.yaml).
    pub fn default_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| SafraError::Config("Cannot determine config directory".into()))?
            .join("safra");
        Ok(config_dir.join("config.yaml"))
    }

    /// Run interactive setup prompts and write config to disk.
    /// Returns the loaded Config and the path it was written to.
    pub fn setup_interactive() -> Result<(Self, PathBuf)> {
        let input_err = |e: dialoguer::Error| SafraError::Config(format!("Input error: {}", e));

        println!();
        println!("Let's set up Safra!");
        println!();

        // --- Farm ---
        println!("Farm");
        let farm_name: String = Input::new()
            .with_prompt("  Farm name")
            .default("Fazenda".into())
            .interact_text()
            .map_err(input_err)?;

        let property: String = Input::new()
            .with_prompt("  Property (optional)")
            .default(String::new())
            .allow_empty(true)
            .interact_text()
            .map_err(input_err)?;

        println!();

        // --- Equipment ---
        println!("Equipment");
        let ground_rig_tank_l: f64 = Input::new()
            .with_prompt("  Ground rig tank (L)")
            .default(default_ground_rig_tank())
            .interact_text()
            .map_err(input_err)?;

        let drone_tank_l: f64 = Input::new()
            .with_prompt("  Drone tank (L)")
            .default(default_drone_tank())
            .interact_text()
            .map_err(input_err)?;

        println!();

        // --- OpenWeatherMap (optional) ---
        println!("OpenWeatherMap (leave API key blank to skip)");
        let owm_api_key: String = Password::new()
            .with_prompt("  API key")
            .allow_empty_password(true)
            .interact()
            .map_err(input_err)?;

        let openweathermap = if owm_api_key.is_empty() {
            None
        } else {
            let latitude: f64 = Input::new()
                .with_prompt("  Latitude")
                .default(-21.17)
                .interact_text()
                .map_err(input_err)?;

            let longitude: f64 = Input::new()
                .with_prompt("  Longitude")
                .default(-47.81)
                .interact_text()
                .map_err(input_err)?;

            Some(OpenWeatherMapConfig {
                api_key: owm_api_key,
                latitude,
                longitude,
                enabled: true,
            })
        };

        println!();

        let config = Config {
            farm: FarmConfig {
                name: farm_name,
                property: (!property.is_empty()).then_some(property),
            },
            equipment: EquipmentConfig {
                ground_rig_tank_l,
                drone_tank_l,
            },
            openweathermap,
            ..Default::default()
        };

        // Write to default config path
        let config_path = Self::default_config_path()?;
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let yaml = serde_yaml::to_string(&config)
            .map_err(|e| SafraError::Config(format!("Failed to serialize config: {}", e)))?;

        // Write with a header comment
        let content = format!(
            "# Safra Configuration\n# Generated by `safra init`\n# Environment variable substitution (${{VAR}}) is supported.\n\n{}",
            yaml
        );
        std::fs::write(&config_path, content)?;

        println!("Configuration saved to {}", config_path.display());
        println!();

        Ok((config, config_path))
    }

    fn substitute_env_vars(content: &str) -> Result<String> {
        let mut result = content.to_string();

        // Find all ${VAR_NAME} patterns and substitute
        let re = regex_lite::Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}")
            .map_err(|e| SafraError::Config(format!("Invalid substitution pattern: {}", e)))?;

        for cap in re.captures_iter(content) {
            let var_name = &cap[1];
            let placeholder = &cap[0];
            if let Ok(value) = std::env::var(var_name) {
                result = result.replace(placeholder, &value);
            }
        }

        Ok(result)
    }

    pub fn data_dir(data_dir_override: Option<&PathBuf>) -> Result<PathBuf> {
        // CLI override takes priority
        if let Some(dir) = data_dir_override {
            std::fs::create_dir_all(dir)?;
            return Ok(dir.clone());
        }

        // Then check env var
        if let Ok(dir) = std::env::var("SAFRA_DATA_DIR") {
            let p = PathBuf::from(dir);
            std::fs::create_dir_all(&p)?;
            return Ok(p);
        }

        // Use XDG data directory
        let data_dir = dirs::data_dir()
            .ok_or_else(|| SafraError::Config("Cannot determine data directory".into()))?
            .join("safra");

        std::fs::create_dir_all(&data_dir)?;
        Ok(data_dir)
    }

    pub fn db_path(data_dir_override: Option<&PathBuf>) -> Result<PathBuf> {
        Ok(Self::data_dir(data_dir_override)?.join("safra.db"))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            farm: FarmConfig {
                name: "Fazenda".into(),
                property: None,
            },
            spray_rates: SprayRates::default(),
            spray_conditions: SprayThresholds::default(),
            equipment: EquipmentConfig::default(),
            forecast: ForecastPolicy::default(),
            openweathermap: None,
        }
    }
}
