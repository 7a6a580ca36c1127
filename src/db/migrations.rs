use crate::db::Database;
use crate::error::Result;

const MIGRATIONS: &[&str] = &[
    // Migration 1: Initial schema
    r#"
    CREATE TABLE IF NOT EXISTS supplies (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        category TEXT NOT NULL,
        unit TEXT NOT NULL,
        unit_price REAL NOT NULL DEFAULT 0 CHECK (unit_price >= 0),
        stock_quantity REAL NOT NULL DEFAULT 0 CHECK (stock_quantity >= 0),
        minimum_stock REAL NOT NULL DEFAULT 0 CHECK (minimum_stock >= 0),
        created_at TEXT NOT NULL DEFAULT (datetime('now')),
        updated_at TEXT NOT NULL DEFAULT (datetime('now'))
    );

    CREATE TABLE IF NOT EXISTS planting_areas (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        crop TEXT NOT NULL,
        area_hectares REAL NOT NULL CHECK (area_hectares > 0),
        polygon TEXT NOT NULL DEFAULT '[]',
        color TEXT,
        property_id INTEGER,
        created_at TEXT NOT NULL DEFAULT (datetime('now'))
    );

    CREATE TABLE IF NOT EXISTS application_events (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        equipment_type TEXT NOT NULL,
        supply_id INTEGER NOT NULL REFERENCES supplies(id) ON DELETE RESTRICT,
        planting_area_id INTEGER NOT NULL REFERENCES planting_areas(id) ON DELETE RESTRICT,
        application_date TEXT NOT NULL,
        area_applied_ha REAL NOT NULL,
        dosage_per_ha REAL NOT NULL,
        product_volume_l REAL NOT NULL,
        mix_volume_l REAL NOT NULL,
        temperature_c REAL,
        humidity_percent REAL,
        wind_speed_kmh REAL,
        cost REAL NOT NULL DEFAULT 0,
        created_at TEXT NOT NULL DEFAULT (datetime('now'))
    );

    CREATE TABLE IF NOT EXISTS usage_records (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        supply_id INTEGER NOT NULL REFERENCES supplies(id) ON DELETE RESTRICT,
        planting_area_id INTEGER NOT NULL REFERENCES planting_areas(id) ON DELETE RESTRICT,
        quantity_used REAL NOT NULL CHECK (quantity_used >= 0),
        usage_date TEXT NOT NULL,
        responsible TEXT,
        application_id INTEGER REFERENCES application_events(id),
        created_at TEXT NOT NULL DEFAULT (datetime('now'))
    );

    CREATE TABLE IF NOT EXISTS financial_records (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        kind TEXT NOT NULL,
        amount REAL NOT NULL,
        description TEXT NOT NULL,
        record_date TEXT NOT NULL,
        application_id INTEGER REFERENCES application_events(id),
        created_at TEXT NOT NULL DEFAULT (datetime('now'))
    );

    CREATE TABLE IF NOT EXISTS schema_migrations (
        version INTEGER PRIMARY KEY,
        applied_at TEXT NOT NULL DEFAULT (datetime('now'))
    );
    "#,
    // Migration 2: Add indexes
    r#"
    CREATE INDEX IF NOT EXISTS idx_usage_records_supply_id
        ON usage_records(supply_id);
    CREATE INDEX IF NOT EXISTS idx_usage_records_date
        ON usage_records(usage_date);
    CREATE INDEX IF NOT EXISTS idx_application_events_date
        ON application_events(application_date);
    "#,
];

pub fn run(db: &Database) -> Result<()> {
    db.with_conn_mut(|conn| {
        // Ensure schema_migrations table exists
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS schema_migrations (
                version INTEGER PRIMARY KEY,
                applied_at TEXT NOT NULL DEFAULT (datetime('now'))
            );
            "#,
        )?;

        // Get current version
        let current_version: i32 = conn
            .query_row(
                "SELECT COALESCE(MAX(version), 0) FROM schema_migrations",
                [],
                |row| row.get(0),
            )
            .unwrap_or(0);

        // Apply pending migrations
        for (i, migration) in MIGRATIONS.iter().enumerate() {
            let version = (i + 1) as i32;
            if version > current_version {
                tracing::info!("Applying migration {}", version);
                let tx = conn.transaction()?;
                tx.execute_batch(migration)?;
                tx.execute(
                    "INSERT INTO schema_migrations (version) VALUES (?1)",
                    [version],
                )?;
                tx.commit()?;
            }
        }

        Ok(())
    })
}
