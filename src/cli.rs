use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use safra_planner::models::{EquipmentType, SupplyCategory, UnitOfMeasure};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "safra",
    version,
    about = "Spray planning and input inventory forecasting for the farm"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to config.yaml
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Override SQLite data directory
    #[arg(short, long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Increase log verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Print results as JSON
    #[arg(long, global = true)]
    pub json: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Re-run interactive setup
    Init,
    /// Validate config and test connections
    Check,
    /// Compute spray mix (calda) volumes and tank refills
    Mix(MixArgs),
    /// Assess spraying conditions
    Conditions(WeatherArgs),
    /// Manage the supply catalog
    #[command(subcommand)]
    Supply(SupplyCommand),
    /// Manage planting areas
    #[command(subcommand)]
    Area(AreaCommand),
    /// Record a spray application
    Apply(ApplyArgs),
    /// Record manual consumption of a supply
    Usage(UsageArgs),
    /// Consumption totals per crop and supply
    Consumption,
    /// Stock runway and purchase recommendations
    Forecast {
        /// History window in months
        #[arg(short, long)]
        window: Option<u32>,
        /// Only forecast this supply
        #[arg(short, long)]
        supply: Option<i64>,
    },
    /// Stock alerts, most severe first
    Alerts,
}

#[derive(Args)]
pub struct MixArgs {
    /// Equipment: ground-rig or drone
    #[arg(short, long, value_parser = parse_equipment, default_value = "ground-rig")]
    pub equipment: EquipmentType,

    /// Area to treat in hectares
    #[arg(short, long)]
    pub area: f64,

    /// Product dosage in L/ha
    #[arg(long)]
    pub dosage: f64,

    /// Tank capacity in liters (defaults to the configured tank)
    #[arg(short, long)]
    pub tank: Option<f64>,
}

#[derive(Args, Default)]
pub struct WeatherArgs {
    /// Temperature in °C
    #[arg(long)]
    pub temperature: Option<f64>,

    /// Relative humidity in %
    #[arg(long)]
    pub humidity: Option<f64>,

    /// Wind speed in km/h
    #[arg(long)]
    pub wind: Option<f64>,

    /// Do not fill missing readings from OpenWeatherMap
    #[arg(long)]
    pub offline: bool,
}

#[derive(Subcommand)]
pub enum SupplyCommand {
    /// Add a supply to the catalog
    Add {
        name: String,
        #[arg(long, value_parser = parse_category)]
        category: SupplyCategory,
        #[arg(short, long, value_parser = parse_unit, default_value = "L")]
        unit: UnitOfMeasure,
        /// Current unit price
        #[arg(short, long, default_value_t = 0.0)]
        price: f64,
        /// Quantity in stock
        #[arg(short, long, default_value_t = 0.0)]
        stock: f64,
        /// Minimum stock threshold
        #[arg(short, long, default_value_t = 0.0)]
        minimum: f64,
    },
    /// List the catalog
    List,
    /// Add stock to an existing supply
    Restock { id: i64, quantity: f64 },
}

#[derive(Subcommand)]
pub enum AreaCommand {
    /// Add a planting area
    Add {
        name: String,
        #[arg(long)]
        crop: String,
        /// Size in hectares
        #[arg(long)]
        hectares: f64,
        /// Map color
        #[arg(long)]
        color: Option<String>,
    },
    /// List planting areas
    List,
}

#[derive(Args)]
pub struct ApplyArgs {
    #[arg(short, long, value_parser = parse_equipment, default_value = "ground-rig")]
    pub equipment: EquipmentType,

    /// Supply id
    #[arg(long)]
    pub supply: Option<i64>,

    /// Planting area id
    #[arg(long)]
    pub area: Option<i64>,

    /// Hectares treated
    #[arg(long)]
    pub hectares: f64,

    /// Product dosage in L/ha
    #[arg(long)]
    pub dosage: f64,

    /// Tank capacity in liters (defaults to the configured tank)
    #[arg(short, long)]
    pub tank: Option<f64>,

    /// Application date (YYYY-MM-DD), defaults to today
    #[arg(long)]
    pub date: Option<NaiveDate>,

    /// Cost override; otherwise priced at the supply's unit price
    #[arg(long)]
    pub cost: Option<f64>,

    #[command(flatten)]
    pub weather: WeatherArgs,
}

#[derive(Args)]
pub struct UsageArgs {
    /// Supply id
    #[arg(long)]
    pub supply: i64,

    /// Planting area id
    #[arg(long)]
    pub area: i64,

    /// Quantity consumed in the supply's unit
    #[arg(short, long)]
    pub quantity: f64,

    /// Usage date (YYYY-MM-DD), defaults to today
    #[arg(long)]
    pub date: Option<NaiveDate>,

    /// Person responsible
    #[arg(short, long)]
    pub responsible: Option<String>,
}

fn parse_equipment(s: &str) -> Result<EquipmentType, String> {
    EquipmentType::from_str(s).ok_or_else(|| format!("unknown equipment '{}'", s))
}

fn parse_category(s: &str) -> Result<SupplyCategory, String> {
    SupplyCategory::from_str(s).ok_or_else(|| {
        let known: Vec<_> = SupplyCategory::all().iter().map(|c| c.as_str()).collect();
        format!("unknown category '{}', expected one of: {}", s, known.join(", "))
    })
}

fn parse_unit(s: &str) -> Result<UnitOfMeasure, String> {
    UnitOfMeasure::from_str(s).ok_or_else(|| format!("unknown unit '{}'", s))
}
