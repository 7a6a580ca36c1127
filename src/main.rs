mod cli;

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use clap::Parser;
use cli::{ApplyArgs, AreaCommand, Cli, Commands, MixArgs, SupplyCommand, UsageArgs, WeatherArgs};
use safra_planner::config::Config;
use safra_planner::db::Database;
use safra_planner::error::SafraError;
use safra_planner::logic::advisor::assess_snapshot;
use safra_planner::logic::{
    aggregate_by_culture_and_supply, compute_mix_with_rates, coverage_warning, forecast_all,
    validate, AdvisoryFlag, AlertEngine, ApplicationDraft, ConditionsService, MixResult,
};
use safra_planner::models::{PlantingArea, Supply, UsageRecord, WeatherSnapshot};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    // Initialize logging; RUST_LOG wins over -v
    let default_level = match cli.verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Commands::Init = cli.command {
        Config::setup_interactive().context("Interactive setup failed")?;
        return Ok(());
    }

    let config = Config::load_or_default(cli.config.clone()).context("Configuration error")?;

    // The only place the clock is read
    let as_of = Local::now().date_naive();

    match cli.command {
        Commands::Init => Ok(()),
        Commands::Check => run_check(&cli, &config).await,
        Commands::Mix(ref args) => run_mix(cli.json, &config, args),
        Commands::Conditions(ref args) => run_conditions(cli.json, &config, args).await,
        Commands::Supply(ref cmd) => {
            let db = open_db(&cli)?;
            run_supply(cli.json, &db, cmd)
        }
        Commands::Area(ref cmd) => {
            let db = open_db(&cli)?;
            run_area(cli.json, &db, cmd)
        }
        Commands::Apply(ref args) => {
            let db = open_db(&cli)?;
            run_apply(cli.json, &config, &db, args, as_of).await
        }
        Commands::Usage(ref args) => {
            let db = open_db(&cli)?;
            run_usage(cli.json, &db, args, as_of)
        }
        Commands::Consumption => {
            let db = open_db(&cli)?;
            run_consumption(cli.json, &db)
        }
        Commands::Forecast { window, supply } => {
            let db = open_db(&cli)?;
            run_forecast(cli.json, &config, &db, as_of, window, supply)
        }
        Commands::Alerts => {
            let db = open_db(&cli)?;
            run_alerts(cli.json, &config, &db, as_of)
        }
    }
}

fn open_db(cli: &Cli) -> Result<Database> {
    Database::open(cli.data_dir.as_ref()).context("Failed to open database")
}

/// Print `value` as pretty JSON, or hand it to `text` for human output.
fn emit<T: Serialize>(json: bool, value: &T, text: impl FnOnce(&T)) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(value)?);
    } else {
        text(value);
    }
    Ok(())
}

async fn run_check(cli: &Cli, config: &Config) -> Result<()> {
    println!("Farm: {}", config.farm.name);
    if Config::exists(cli.config.as_ref()) {
        println!("Config: OK");
    } else {
        println!("Config: not found, using defaults (run `safra init`)");
    }

    let db = open_db(cli)?;
    println!("Database: {}", db.path().display());

    let service = ConditionsService::new(config);
    match service.check_connection().await {
        Ok(Some(true)) => println!("OpenWeatherMap: OK"),
        Ok(Some(false)) => println!("OpenWeatherMap: FAILED (check API key)"),
        Ok(None) => println!("OpenWeatherMap: not configured"),
        Err(e) => println!("OpenWeatherMap: OFFLINE ({})", e),
    }

    Ok(())
}

fn run_mix(json: bool, config: &Config, args: &MixArgs) -> Result<()> {
    let tank = args
        .tank
        .unwrap_or_else(|| config.equipment.tank_for(args.equipment));
    let mix = compute_mix_with_rates(
        &config.spray_rates,
        args.area,
        args.dosage,
        tank,
        args.equipment,
    )?;

    emit(json, &mix, print_mix)
}

fn print_mix(mix: &MixResult) {
    println!(
        "{} at {:.0} L/ha over {:.2} ha",
        mix.equipment_type, mix.spray_volume_per_ha, mix.area_ha
    );
    println!("  Total calda:   {:>10.2} L", mix.total_mix_volume_l);
    println!("  Product:       {:>10.2} L", mix.product_volume_l);
    println!("  Water:         {:>10.2} L", mix.diluent_volume_l);
    println!(
        "  Tank loads:    {:>10} x {:.0} L",
        mix.refill_count, mix.tank_capacity_l
    );
    println!(
        "  Per tank:      {:>10.2} ha, {:.2} L product",
        mix.hectares_per_tank, mix.product_per_tank_l
    );
}

#[derive(Serialize)]
struct ConditionsReport {
    conditions: WeatherSnapshot,
    flags: Vec<AdvisoryFlag>,
    suitable: bool,
}

async fn resolve_weather(config: &Config, args: &WeatherArgs) -> WeatherSnapshot {
    let manual = WeatherSnapshot {
        temperature_c: args.temperature,
        humidity_percent: args.humidity,
        wind_speed_kmh: args.wind,
    };
    if args.offline {
        return manual;
    }
    ConditionsService::new(config).resolve(manual).await
}

async fn run_conditions(json: bool, config: &Config, args: &WeatherArgs) -> Result<()> {
    let conditions = resolve_weather(config, args).await;
    let flags = assess_snapshot(&config.spray_conditions, &conditions);
    let report = ConditionsReport {
        conditions,
        suitable: flags.is_empty(),
        flags,
    };

    emit(json, &report, |r| {
        print_reading("Temperature", r.conditions.temperature_c, "°C");
        print_reading("Humidity", r.conditions.humidity_percent, "%");
        print_reading("Wind", r.conditions.wind_speed_kmh, "km/h");
        println!();
        if r.suitable {
            println!("No adverse conditions flagged.");
        }
        print_flags(&r.flags);
    })
}

fn print_reading(label: &str, value: Option<f64>, unit: &str) {
    match value {
        Some(v) => println!("{:<12} {:.1} {}", label, v, unit),
        None => println!("{:<12} unknown", label),
    }
}

fn print_flags(flags: &[AdvisoryFlag]) {
    for flag in flags {
        println!("! {}: {}", flag, flag.guidance());
    }
}

fn run_supply(json: bool, db: &Database, cmd: &SupplyCommand) -> Result<()> {
    match cmd {
        SupplyCommand::Add {
            name,
            category,
            unit,
            price,
            stock,
            minimum,
        } => {
            let supply = Supply::new(name, *category, *unit)
                .with_price(*price)
                .with_stock(*stock)
                .with_minimum(*minimum);
            let id = db.create_supply(&supply)?;
            let supply = supply.with_id(id);
            emit(json, &supply, |s| println!("Added supply #{}: {}", id, s.name))
        }
        SupplyCommand::List => {
            let supplies = db.list_supplies()?;
            emit(json, &supplies, |list| {
                for s in list {
                    println!(
                        "#{:<4} {:<28} {:<12} {:>10.2} {:<3} min {:>8.2} @ {:.2}{}",
                        s.id.unwrap_or_default(),
                        s.name,
                        s.category,
                        s.stock_quantity,
                        s.unit.symbol(),
                        s.minimum_stock,
                        s.unit_price,
                        if s.is_below_minimum() { "  LOW" } else { "" }
                    );
                }
            })
        }
        SupplyCommand::Restock { id, quantity } => {
            let supply = db.restock_supply(*id, *quantity)?;
            emit(json, &supply, |s| {
                println!(
                    "{} now at {:.2} {}",
                    s.name,
                    s.stock_quantity,
                    s.unit.symbol()
                )
            })
        }
    }
}

fn run_area(json: bool, db: &Database, cmd: &AreaCommand) -> Result<()> {
    match cmd {
        AreaCommand::Add {
            name,
            crop,
            hectares,
            color,
        } => {
            let mut area = PlantingArea::new(name, crop, *hectares);
            if let Some(color) = color {
                area = area.with_color(color);
            }
            let id = db.create_planting_area(&area)?;
            let area = area.with_id(id);
            emit(json, &area, |a| {
                println!("Added area #{}: {} ({}, {:.2} ha)", id, a.name, a.crop, a.area_hectares)
            })
        }
        AreaCommand::List => {
            let areas = db.list_planting_areas()?;
            emit(json, &areas, |list| {
                for a in list {
                    println!(
                        "#{:<4} {:<24} {:<16} {:>8.2} ha",
                        a.id.unwrap_or_default(),
                        a.name,
                        a.crop,
                        a.area_hectares
                    );
                }
            })
        }
    }
}

#[derive(Serialize)]
struct ApplyOutcome {
    application_id: i64,
    mix: Option<MixResult>,
    flags: Vec<AdvisoryFlag>,
    warnings: Vec<String>,
}

async fn run_apply(
    json: bool,
    config: &Config,
    db: &Database,
    args: &ApplyArgs,
    as_of: NaiveDate,
) -> Result<()> {
    let tank = args
        .tank
        .unwrap_or_else(|| config.equipment.tank_for(args.equipment));

    let mix = match compute_mix_with_rates(
        &config.spray_rates,
        args.hectares,
        args.dosage,
        tank,
        args.equipment,
    ) {
        Ok(mix) => Some(mix),
        Err(e @ SafraError::InvalidDosage { .. }) => return Err(e.into()),
        Err(e) => {
            // Reported below as a validation failure
            tracing::debug!("Mix not computed: {}", e);
            None
        }
    };

    let weather = resolve_weather(config, &args.weather).await;
    let flags = assess_snapshot(&config.spray_conditions, &weather);

    let mut draft = ApplicationDraft::new(args.equipment, args.date.unwrap_or(as_of))
        .with_dosage(args.hectares, args.dosage)
        .with_weather(weather);
    if let Some(id) = args.supply {
        draft = draft.with_supply(id);
    }
    if let Some(id) = args.area {
        draft = draft.with_area(id);
    }
    if let Some(mix) = mix {
        draft = draft.with_mix(mix);
    }
    if let Some(cost) = args.cost {
        draft = draft.with_cost(cost);
    }

    let validated = validate(&draft).map_err(SafraError::Validation)?;

    let mut warnings = Vec::new();
    if let Some(area) = db.get_planting_area(validated.planting_area_id)? {
        if let Some(warning) = coverage_warning(&validated, &area) {
            warnings.push(warning.to_string());
        }
    }

    let application_id = db.insert_application(&validated)?;

    let outcome = ApplyOutcome {
        application_id,
        mix: draft.mix,
        flags,
        warnings,
    };

    emit(json, &outcome, |o| {
        println!("Recorded application #{}", o.application_id);
        if let Some(ref mix) = o.mix {
            print_mix(mix);
        }
        for w in &o.warnings {
            println!("! {}", w);
        }
        print_flags(&o.flags);
    })
}

fn run_usage(json: bool, db: &Database, args: &UsageArgs, as_of: NaiveDate) -> Result<()> {
    let mut record = UsageRecord::new(
        args.supply,
        args.area,
        args.quantity,
        args.date.unwrap_or(as_of),
    );
    if let Some(ref name) = args.responsible {
        record = record.with_responsible(name);
    }

    let id = db.record_usage(&record)?;
    record.id = Some(id);

    emit(json, &record, |r| {
        println!(
            "Recorded usage #{}: {:.2} of supply #{} on area #{}",
            id, r.quantity_used, r.supply_id, r.planting_area_id
        )
    })
}

fn run_consumption(json: bool, db: &Database) -> Result<()> {
    let report = aggregate_by_culture_and_supply(
        &db.list_usage_records()?,
        &db.list_supplies()?,
        &db.list_planting_areas()?,
    );

    emit(json, &report, |r| {
        for e in &r.entries {
            println!(
                "{:<16} {:<28} {:>10.2} {:<3} {:>4} apps  {:>10.2}",
                e.crop, e.supply_name, e.total_quantity, e.unit, e.application_count, e.total_cost
            );
        }
        println!("Total cost: {:.2}", r.total_cost());
        if r.skipped_records > 0 {
            println!(
                "{} record(s) skipped: unknown supply or area",
                r.skipped_records
            );
        }
    })
}

fn run_forecast(
    json: bool,
    config: &Config,
    db: &Database,
    as_of: NaiveDate,
    window: Option<u32>,
    supply_id: Option<i64>,
) -> Result<()> {
    let policy = match window {
        Some(months) => config.forecast.with_window(months),
        None => config.forecast,
    };

    let mut supplies = db.list_supplies()?;
    if let Some(id) = supply_id {
        supplies.retain(|s| s.id == Some(id));
        if supplies.is_empty() {
            return Err(SafraError::NotFound(format!("supply {}", id)).into());
        }
    }

    let forecasts = forecast_all(&supplies, &db.list_usage_records()?, as_of, &policy);

    emit(json, &forecasts, |list| {
        for f in list {
            let purchase = f
                .recommended_purchase_date
                .map(|d| d.to_string())
                .unwrap_or_else(|| "-".into());
            println!(
                "{:<28} stock {:>9.2}  avg/mo {:>8.2}  months {:>13}  buy by {:<10}  qty {:>8.2}  {}",
                f.supply_name,
                f.current_stock,
                f.average_monthly_usage,
                f.months_remaining_label(),
                purchase,
                f.recommended_quantity,
                f.urgency
            );
        }
    })
}

fn run_alerts(json: bool, config: &Config, db: &Database, as_of: NaiveDate) -> Result<()> {
    let engine = AlertEngine::new();
    let alerts = engine.evaluate_inventory(
        &db.list_supplies()?,
        &db.list_usage_records()?,
        as_of,
        &config.forecast,
    );

    emit(json, &alerts, |list| {
        if list.is_empty() {
            println!("No stock alerts.");
        }
        for a in list {
            println!("{} [{}] {}", a.severity.symbol(), a.severity, a.title);
            println!("    {}", a.description);
            if let Some(ref action) = a.suggested_action {
                println!("    -> {}", action);
            }
        }
    })
}
