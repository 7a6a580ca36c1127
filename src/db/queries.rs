use crate::db::Database;
use crate::error::{Result, SafraError};
use crate::logic::ValidatedApplication;
use crate::models::{
    ApplicationEvent, EquipmentType, FinancialRecord, GeoPoint, PlantingArea, Supply,
    SupplyCategory, UnitOfMeasure, UsageRecord, WeatherSnapshot,
};
use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Connection, Row};
use tracing::{info, warn};

const DATE_FORMAT: &str = "%Y-%m-%d";

fn require_non_negative(field: &'static str, value: f64) -> Result<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(SafraError::InvalidInput { field })
    }
}

fn require_positive(field: &'static str, value: f64) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(SafraError::InvalidInput { field })
    }
}

fn parse_date(idx: usize, s: &str) -> rusqlite::Result<NaiveDate> {
    NaiveDate::parse_from_str(s, DATE_FORMAT)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

// Supply Queries

impl Database {
    pub fn create_supply(&self, supply: &Supply) -> Result<i64> {
        if supply.name.trim().is_empty() {
            return Err(SafraError::InvalidData("Supply name is required".into()));
        }
        require_non_negative("unit_price", supply.unit_price)?;
        require_non_negative("stock_quantity", supply.stock_quantity)?;
        require_non_negative("minimum_stock", supply.minimum_stock)?;

        self.with_conn(|conn| {
            let now = Utc::now().to_rfc3339();
            conn.execute(
                r#"
                INSERT INTO supplies
                    (name, category, unit, unit_price, stock_quantity, minimum_stock, created_at, updated_at)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
                "#,
                params![
                    supply.name.trim(),
                    format!("{:?}", supply.category),
                    format!("{:?}", supply.unit),
                    supply.unit_price,
                    supply.stock_quantity,
                    supply.minimum_stock,
                    now,
                    now,
                ],
            )?;
            let id = conn.last_insert_rowid();
            info!(supply_id = id, name = %supply.name, "Registered supply");
            Ok(id)
        })
    }

    pub fn get_supply(&self, id: i64) -> Result<Option<Supply>> {
        self.with_conn(|conn| fetch_supply(conn, id))
    }

    pub fn list_supplies(&self) -> Result<Vec<Supply>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare("SELECT * FROM supplies ORDER BY name, id")?;
            let supplies = stmt
                .query_map([], row_to_supply)?
                .filter_map(|r| {
                    r.map_err(|e| warn!(error = %e, "Skipping unreadable supply row"))
                        .ok()
                })
                .collect();
            Ok(supplies)
        })
    }

    /// Record a purchase: add `quantity` to the supply's stock.
    pub fn restock_supply(&self, id: i64, quantity: f64) -> Result<Supply> {
        require_positive("quantity", quantity)?;

        self.with_conn(|conn| {
            let updated = conn.execute(
                "UPDATE supplies SET stock_quantity = stock_quantity + ?1, updated_at = ?2 WHERE id = ?3",
                params![quantity, Utc::now().to_rfc3339(), id],
            )?;
            if updated == 0 {
                return Err(SafraError::NotFound(format!("supply {}", id)));
            }
            let supply = fetch_supply(conn, id)?
                .ok_or_else(|| SafraError::NotFound(format!("supply {}", id)))?;
            info!(supply_id = id, quantity, stock = supply.stock_quantity, "Restocked supply");
            Ok(supply)
        })
    }
}

fn fetch_supply(conn: &Connection, id: i64) -> Result<Option<Supply>> {
    conn.query_row("SELECT * FROM supplies WHERE id = ?1", [id], row_to_supply)
        .optional()
        .map_err(Into::into)
}

fn row_to_supply(row: &Row) -> rusqlite::Result<Supply> {
    let category_str: String = row.get("category")?;
    let unit_str: String = row.get("unit")?;

    let category = SupplyCategory::from_str(&category_str).unwrap_or_else(|| {
        warn!(
            category = %category_str,
            "Unknown supply category in database, defaulting to Other"
        );
        SupplyCategory::Other
    });
    let unit = UnitOfMeasure::from_str(&unit_str).unwrap_or_else(|| {
        warn!(unit = %unit_str, "Unknown unit in database, defaulting to Unit");
        UnitOfMeasure::Unit
    });

    Ok(Supply {
        id: Some(row.get("id")?),
        name: row.get("name")?,
        category,
        unit,
        unit_price: row.get("unit_price")?,
        stock_quantity: row.get("stock_quantity")?,
        minimum_stock: row.get("minimum_stock")?,
    })
}

// Planting Area Queries

impl Database {
    pub fn create_planting_area(&self, area: &PlantingArea) -> Result<i64> {
        if area.name.trim().is_empty() {
            return Err(SafraError::InvalidData("Planting area name is required".into()));
        }
        require_positive("area_hectares", area.area_hectares)?;
        let polygon = serde_json::to_string(&area.polygon)?;

        self.with_conn(|conn| {
            conn.execute(
                r#"
                INSERT INTO planting_areas (name, crop, area_hectares, polygon, color, property_id)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                "#,
                params![
                    area.name.trim(),
                    area.crop.trim(),
                    area.area_hectares,
                    polygon,
                    area.color,
                    area.property_id,
                ],
            )?;
            Ok(conn.last_insert_rowid())
        })
    }

    pub fn get_planting_area(&self, id: i64) -> Result<Option<PlantingArea>> {
        self.with_conn(|conn| fetch_planting_area(conn, id))
    }

    pub fn list_planting_areas(&self) -> Result<Vec<PlantingArea>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare("SELECT * FROM planting_areas ORDER BY name, id")?;
            let areas = stmt
                .query_map([], row_to_planting_area)?
                .filter_map(|r| {
                    r.map_err(|e| warn!(error = %e, "Skipping unreadable planting area row"))
                        .ok()
                })
                .collect();
            Ok(areas)
        })
    }
}

fn fetch_planting_area(conn: &Connection, id: i64) -> Result<Option<PlantingArea>> {
    conn.query_row(
        "SELECT * FROM planting_areas WHERE id = ?1",
        [id],
        row_to_planting_area,
    )
    .optional()
    .map_err(Into::into)
}

fn row_to_planting_area(row: &Row) -> rusqlite::Result<PlantingArea> {
    let polygon_str: String = row.get("polygon")?;
    let polygon: Vec<GeoPoint> = serde_json::from_str(&polygon_str).unwrap_or_else(|e| {
        warn!(error = %e, "Invalid polygon in database, ignoring geometry");
        Vec::new()
    });

    Ok(PlantingArea {
        id: Some(row.get("id")?),
        name: row.get("name")?,
        crop: row.get("crop")?,
        area_hectares: row.get("area_hectares")?,
        polygon,
        color: row.get("color")?,
        property_id: row.get("property_id")?,
    })
}

// Usage Queries

impl Database {
    /// Record consumption of a supply outside a spray application.
    /// Decrements stock in the same transaction.
    pub fn record_usage(&self, record: &UsageRecord) -> Result<i64> {
        require_positive("quantity_used", record.quantity_used)?;

        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;

            let supply = fetch_supply(&tx, record.supply_id)?
                .ok_or_else(|| SafraError::NotFound(format!("supply {}", record.supply_id)))?;
            fetch_planting_area(&tx, record.planting_area_id)?.ok_or_else(|| {
                SafraError::NotFound(format!("planting area {}", record.planting_area_id))
            })?;

            consume_stock(&tx, &supply, record.quantity_used)?;

            tx.execute(
                r#"
                INSERT INTO usage_records
                    (supply_id, planting_area_id, quantity_used, usage_date, responsible)
                VALUES (?1, ?2, ?3, ?4, ?5)
                "#,
                params![
                    record.supply_id,
                    record.planting_area_id,
                    record.quantity_used,
                    record.usage_date.format(DATE_FORMAT).to_string(),
                    record.responsible,
                ],
            )?;
            let id = tx.last_insert_rowid();
            tx.commit()?;

            Ok(id)
        })
    }

    pub fn list_usage_records(&self) -> Result<Vec<UsageRecord>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare("SELECT * FROM usage_records ORDER BY usage_date, id")?;
            let records = stmt
                .query_map([], row_to_usage_record)?
                .filter_map(|r| {
                    r.map_err(|e| warn!(error = %e, "Skipping unreadable usage row"))
                        .ok()
                })
                .collect();
            Ok(records)
        })
    }
}

/// Subtract from stock, refusing to go below zero.
fn consume_stock(conn: &Connection, supply: &Supply, quantity: f64) -> Result<f64> {
    let remaining = supply.stock_quantity - quantity;
    if remaining < -1e-9 {
        return Err(SafraError::InsufficientStock {
            supply: supply.name.clone(),
            available: supply.stock_quantity,
            requested: quantity,
        });
    }
    let remaining = remaining.max(0.0);

    conn.execute(
        "UPDATE supplies SET stock_quantity = ?1, updated_at = ?2 WHERE id = ?3",
        params![remaining, Utc::now().to_rfc3339(), supply.id],
    )?;

    if remaining <= supply.minimum_stock && supply.minimum_stock > 0.0 {
        warn!(
            supply = %supply.name,
            stock = remaining,
            minimum = supply.minimum_stock,
            "Supply is at or below its minimum stock"
        );
    }

    Ok(remaining)
}

fn row_to_usage_record(row: &Row) -> rusqlite::Result<UsageRecord> {
    let date_str: String = row.get("usage_date")?;

    Ok(UsageRecord {
        id: Some(row.get("id")?),
        supply_id: row.get("supply_id")?,
        planting_area_id: row.get("planting_area_id")?,
        quantity_used: row.get("quantity_used")?,
        usage_date: parse_date(4, &date_str)?,
        responsible: row.get("responsible")?,
    })
}

// Application Queries

impl Database {
    /// Persist a validated application atomically: decrement the supply by
    /// the product volume, append the event, its usage record and an expense
    /// entry. Any failure rolls the whole operation back.
    pub fn insert_application(&self, application: &ValidatedApplication) -> Result<i64> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;

            let supply = fetch_supply(&tx, application.supply_id)?.ok_or_else(|| {
                SafraError::NotFound(format!("supply {}", application.supply_id))
            })?;
            let area = fetch_planting_area(&tx, application.planting_area_id)?.ok_or_else(|| {
                SafraError::NotFound(format!("planting area {}", application.planting_area_id))
            })?;

            if application.area_applied_ha > area.area_hectares {
                warn!(
                    area = %area.name,
                    applied_ha = application.area_applied_ha,
                    plot_ha = area.area_hectares,
                    "Applied area exceeds planting area size"
                );
            }

            consume_stock(&tx, &supply, application.product_volume_l)?;

            let cost = application
                .cost
                .unwrap_or(application.product_volume_l * supply.unit_price);
            let date = application.application_date.format(DATE_FORMAT).to_string();
            let weather = application.weather.unwrap_or_default();

            tx.execute(
                r#"
                INSERT INTO application_events
                    (equipment_type, supply_id, planting_area_id, application_date,
                     area_applied_ha, dosage_per_ha, product_volume_l, mix_volume_l,
                     temperature_c, humidity_percent, wind_speed_kmh, cost, created_at)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)
                "#,
                params![
                    format!("{:?}", application.equipment_type),
                    application.supply_id,
                    application.planting_area_id,
                    date,
                    application.area_applied_ha,
                    application.dosage_per_ha,
                    application.product_volume_l,
                    application.mix_volume_l,
                    weather.temperature_c,
                    weather.humidity_percent,
                    weather.wind_speed_kmh,
                    cost,
                    Utc::now().to_rfc3339(),
                ],
            )?;
            let application_id = tx.last_insert_rowid();

            tx.execute(
                r#"
                INSERT INTO usage_records
                    (supply_id, planting_area_id, quantity_used, usage_date, application_id)
                VALUES (?1, ?2, ?3, ?4, ?5)
                "#,
                params![
                    application.supply_id,
                    application.planting_area_id,
                    application.product_volume_l,
                    date,
                    application_id,
                ],
            )?;

            tx.execute(
                r#"
                INSERT INTO financial_records (kind, amount, description, record_date, application_id)
                VALUES ('expense', ?1, ?2, ?3, ?4)
                "#,
                params![
                    cost,
                    format!(
                        "{} application on {} ({:.2} ha)",
                        supply.name, area.name, application.area_applied_ha
                    ),
                    date,
                    application_id,
                ],
            )?;

            tx.commit()?;

            info!(
                application_id,
                supply = %supply.name,
                area = %area.name,
                product_l = application.product_volume_l,
                "Recorded application"
            );

            Ok(application_id)
        })
    }

    pub fn list_applications(&self) -> Result<Vec<ApplicationEvent>> {
        self.with_conn(|conn| {
            let mut stmt =
                conn.prepare("SELECT * FROM application_events ORDER BY application_date DESC, id DESC")?;
            let events = stmt
                .query_map([], row_to_application)?
                .filter_map(|r| {
                    r.map_err(|e| warn!(error = %e, "Skipping unreadable application row"))
                        .ok()
                })
                .collect();
            Ok(events)
        })
    }

    pub fn list_financial_records(&self) -> Result<Vec<FinancialRecord>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare("SELECT * FROM financial_records ORDER BY record_date, id")?;
            let records = stmt
                .query_map([], |row| {
                    let date_str: String = row.get("record_date")?;
                    Ok(FinancialRecord {
                        id: Some(row.get("id")?),
                        kind: row.get("kind")?,
                        amount: row.get("amount")?,
                        description: row.get("description")?,
                        record_date: parse_date(4, &date_str)?,
                        application_id: row.get("application_id")?,
                    })
                })?
                .filter_map(|r| r.ok())
                .collect();
            Ok(records)
        })
    }
}

fn row_to_application(row: &Row) -> rusqlite::Result<ApplicationEvent> {
    let equipment_str: String = row.get("equipment_type")?;
    let date_str: String = row.get("application_date")?;
    let created_at_str: String = row.get("created_at")?;

    let weather = WeatherSnapshot {
        temperature_c: row.get("temperature_c")?,
        humidity_percent: row.get("humidity_percent")?,
        wind_speed_kmh: row.get("wind_speed_kmh")?,
    };

    let equipment_type = EquipmentType::from_str(&equipment_str).unwrap_or_else(|| {
        warn!(
            equipment_type = %equipment_str,
            "Unknown equipment_type in database, defaulting to GroundRig"
        );
        EquipmentType::GroundRig
    });

    Ok(ApplicationEvent {
        id: Some(row.get("id")?),
        equipment_type,
        supply_id: row.get("supply_id")?,
        planting_area_id: row.get("planting_area_id")?,
        application_date: parse_date(4, &date_str)?,
        area_applied_ha: row.get("area_applied_ha")?,
        dosage_per_ha: row.get("dosage_per_ha")?,
        product_volume_l: row.get("product_volume_l")?,
        mix_volume_l: row.get("mix_volume_l")?,
        weather_snapshot: (!weather.is_empty()).then_some(weather),
        cost: row.get("cost")?,
        created_at: DateTime::parse_from_rfc3339(&created_at_str)
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_else(|_| Utc::now()),
    })
}

trait OptionalExt<T> {
    fn optional(self) -> rusqlite::Result<Option<T>>;
}

impl<T> OptionalExt<T> for rusqlite::Result<T> {
    fn optional(self) -> rusqlite::Result<Option<T>> {
        match self {
            Ok(v) => Ok(Some(v)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::{compute_mix, validate, ApplicationDraft};

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 9, day).unwrap()
    }

    fn seeded() -> (Database, i64, i64) {
        let db = Database::open_in_memory().unwrap();
        let supply_id = db
            .create_supply(
                &Supply::new("Glifosato", SupplyCategory::Herbicide, UnitOfMeasure::Liter)
                    .with_price(30.0)
                    .with_stock(150.0)
                    .with_minimum(20.0),
            )
            .unwrap();
        let area_id = db
            .create_planting_area(
                &PlantingArea::new("Talhão 1", "Soja", 50.0).with_polygon(vec![
                    GeoPoint { lat: -21.1, lng: -47.8 },
                    GeoPoint { lat: -21.1, lng: -47.7 },
                    GeoPoint { lat: -21.2, lng: -47.7 },
                ]),
            )
            .unwrap();
        (db, supply_id, area_id)
    }

    fn validated(supply_id: i64, area_id: i64, area_ha: f64) -> ValidatedApplication {
        let mix = compute_mix(area_ha, 2.0, 2000.0, EquipmentType::GroundRig).unwrap();
        let draft = ApplicationDraft::new(EquipmentType::GroundRig, d(2))
            .with_supply(supply_id)
            .with_area(area_id)
            .with_dosage(area_ha, 2.0)
            .with_mix(mix)
            .with_weather(WeatherSnapshot {
                temperature_c: Some(22.0),
                humidity_percent: Some(65.0),
                wind_speed_kmh: Some(6.0),
            });
        validate(&draft).unwrap()
    }

    #[test]
    fn supply_round_trip() {
        let (db, supply_id, _) = seeded();
        let supply = db.get_supply(supply_id).unwrap().unwrap();

        assert_eq!(supply.name, "Glifosato");
        assert_eq!(supply.category, SupplyCategory::Herbicide);
        assert_eq!(supply.unit, UnitOfMeasure::Liter);
        assert_eq!(supply.stock_quantity, 150.0);
        assert!(db.get_supply(999).unwrap().is_none());
    }

    #[test]
    fn planting_area_round_trip() {
        let (db, _, area_id) = seeded();
        let area = db.get_planting_area(area_id).unwrap().unwrap();

        assert_eq!(area.crop, "Soja");
        assert_eq!(area.polygon.len(), 3);
        assert!(area.has_geometry());
    }

    #[test]
    fn rejects_invalid_registrations() {
        let db = Database::open_in_memory().unwrap();
        let negative = Supply::new("X", SupplyCategory::Other, UnitOfMeasure::Unit).with_stock(-1.0);
        assert!(matches!(
            db.create_supply(&negative),
            Err(SafraError::InvalidInput {
                field: "stock_quantity"
            })
        ));
        assert!(matches!(
            db.create_planting_area(&PlantingArea::new("T", "Soja", 0.0)),
            Err(SafraError::InvalidInput {
                field: "area_hectares"
            })
        ));
    }

    #[test]
    fn restock_adds_to_stock() {
        let (db, supply_id, _) = seeded();
        let supply = db.restock_supply(supply_id, 50.0).unwrap();
        assert_eq!(supply.stock_quantity, 200.0);

        assert!(matches!(
            db.restock_supply(999, 1.0),
            Err(SafraError::NotFound(_))
        ));
        assert!(matches!(
            db.restock_supply(supply_id, 0.0),
            Err(SafraError::InvalidInput { field: "quantity" })
        ));
    }

    #[test]
    fn application_insert_updates_stock_usage_and_finances() {
        let (db, supply_id, area_id) = seeded();
        let id = db.insert_application(&validated(supply_id, area_id, 50.0)).unwrap();

        let supply = db.get_supply(supply_id).unwrap().unwrap();
        assert_eq!(supply.stock_quantity, 50.0);

        let events = db.list_applications().unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].id, Some(id));
        assert_eq!(events[0].mix_volume_l, 15000.0);
        assert_eq!(events[0].cost, 3000.0);
        assert_eq!(
            events[0].weather_snapshot.and_then(|w| w.wind_speed_kmh),
            Some(6.0)
        );

        let usage = db.list_usage_records().unwrap();
        assert_eq!(usage.len(), 1);
        assert_eq!(usage[0].quantity_used, 100.0);
        assert_eq!(usage[0].usage_date, d(2));

        let finances = db.list_financial_records().unwrap();
        assert_eq!(finances.len(), 1);
        assert_eq!(finances[0].kind, "expense");
        assert_eq!(finances[0].amount, 3000.0);
        assert_eq!(finances[0].application_id, Some(id));
    }

    #[test]
    fn explicit_cost_overrides_price() {
        let (db, supply_id, area_id) = seeded();
        let mut application = validated(supply_id, area_id, 10.0);
        application.cost = Some(123.0);
        db.insert_application(&application).unwrap();

        assert_eq!(db.list_applications().unwrap()[0].cost, 123.0);
    }

    #[test]
    fn dangling_reference_rolls_back() {
        let (db, supply_id, _) = seeded();
        let err = db
            .insert_application(&validated(supply_id, 999, 10.0))
            .unwrap_err();

        assert!(matches!(err, SafraError::NotFound(_)));
        assert!(db.list_applications().unwrap().is_empty());
        assert_eq!(
            db.get_supply(supply_id).unwrap().unwrap().stock_quantity,
            150.0
        );
    }

    #[test]
    fn insufficient_stock_rolls_back() {
        let (db, supply_id, area_id) = seeded();
        // 100 ha x 2 L/ha = 200 L against 150 L on hand
        let err = db
            .insert_application(&validated(supply_id, area_id, 100.0))
            .unwrap_err();

        assert!(matches!(err, SafraError::InsufficientStock { .. }));
        assert!(db.list_applications().unwrap().is_empty());
        assert!(db.list_usage_records().unwrap().is_empty());
        assert!(db.list_financial_records().unwrap().is_empty());
        assert_eq!(
            db.get_supply(supply_id).unwrap().unwrap().stock_quantity,
            150.0
        );
    }

    #[test]
    fn manual_usage_decrements_stock() {
        let (db, supply_id, area_id) = seeded();
        db.record_usage(&UsageRecord::new(supply_id, area_id, 30.0, d(5)).with_responsible("João"))
            .unwrap();

        assert_eq!(
            db.get_supply(supply_id).unwrap().unwrap().stock_quantity,
            120.0
        );
        let usage = db.list_usage_records().unwrap();
        assert_eq!(usage[0].responsible.as_deref(), Some("João"));

        assert!(matches!(
            db.record_usage(&UsageRecord::new(supply_id, area_id, 500.0, d(6))),
            Err(SafraError::InsufficientStock { .. })
        ));
        assert!(matches!(
            db.record_usage(&UsageRecord::new(999, area_id, 1.0, d(6))),
            Err(SafraError::NotFound(_))
        ));
    }
}
