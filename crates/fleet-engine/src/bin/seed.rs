//! # Seed Data Generator
//!
//! Creates a development database with a small sample fleet and two
//! customers.
//!
//! ## Usage
//! ```bash
//! # Seed ./fleet_dev.db (default)
//! cargo run -p fleet-engine --bin seed
//!
//! # Specify database path
//! cargo run -p fleet-engine --bin seed -- --db ./data/fleet.db
//!
//! # Use the database configured in an engine.toml
//! cargo run -p fleet-engine --bin seed -- --config ./engine.toml
//! ```
//!
//! ## Generated Data
//! | Asset              | Plate  | Rate/day |
//! |--------------------|--------|----------|
//! | Toyota Camry 2022  | ABC123 | 50.00    |
//! | Honda Civic 2021   | XYZ789 | 45.00    |
//! | Ford Focus 2023    | DEF456 | 40.00    |
//!
//! plus customers John Doe and Jane Smith.

use std::env;
use std::path::PathBuf;

use fleet_core::{Money, NewAsset, NewCustomer};
use fleet_db::{Database, DbConfig};
use fleet_engine::telemetry::init_tracing;
use fleet_engine::EngineConfig;

/// (make, model, year, plate, color, daily rate)
const FLEET: &[(&str, &str, i32, &str, &str, &str)] = &[
    ("Toyota", "Camry", 2022, "ABC123", "White", "50.00"),
    ("Honda", "Civic", 2021, "XYZ789", "Blue", "45.00"),
    ("Ford", "Focus", 2023, "DEF456", "Red", "40.00"),
];

/// (name, email, phone, address)
const CUSTOMERS: &[(&str, &str, &str, &str)] = &[
    ("John Doe", "john@example.com", "123-456-7890", "123 Main St, City"),
    ("Jane Smith", "jane@example.com", "098-765-4321", "456 Oak Ave, Town"),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let args: Vec<String> = env::args().collect();

    let mut db_path: Option<PathBuf> = None;
    let mut config_path: Option<PathBuf> = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = Some(PathBuf::from(&args[i + 1]));
                    i += 1;
                }
            }
            "--config" | "-c" => {
                if i + 1 < args.len() {
                    config_path = Some(PathBuf::from(&args[i + 1]));
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Fleet Rental Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>        Database file path (default: ./fleet_dev.db)");
                println!("  -c, --config <PATH>    Take the database settings from an engine.toml");
                println!("  -h, --help             Show this help message");
                return Ok(());
            }
            other => eprintln!("Ignoring unknown argument: {}", other),
        }
        i += 1;
    }

    let config = match (db_path, config_path) {
        (Some(path), _) => DbConfig::new(path),
        (None, Some(path)) => EngineConfig::load(Some(path))?.db_config(),
        (None, None) => DbConfig::new("./fleet_dev.db"),
    };

    println!("🚗 Fleet Rental Seed Data Generator");
    println!("===================================");
    println!("Database: {}", config.database_path.display());
    println!();

    let db = Database::new(config).await?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let existing = db.assets().count().await?;
    if existing > 0 {
        println!("⚠ Database already has {} assets", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    println!();
    println!("Registering fleet...");
    for &(make, model, year, plate, color, rate) in FLEET {
        let rate: Money = rate.parse()?;
        let asset = NewAsset {
            make: make.to_string(),
            model: model.to_string(),
            year,
            license_plate: plate.to_string(),
            color: color.to_string(),
            daily_rate_cents: rate.cents(),
        };

        match db.assets().insert(&asset).await {
            Ok(asset) => println!(
                "  {} at {}/day",
                asset.label(),
                Money::from_cents(asset.daily_rate_cents)
            ),
            Err(e) => eprintln!("Failed to insert {}: {}", plate, e),
        }
    }

    println!();
    println!("Registering customers...");
    for &(name, email, phone, address) in CUSTOMERS {
        let customer = NewCustomer {
            name: name.to_string(),
            email: email.to_string(),
            phone: phone.to_string(),
            address: address.to_string(),
        };

        match db.customers().insert(&customer).await {
            Ok(customer) => println!("  {} <{}>", customer.name, customer.email),
            Err(e) => eprintln!("Failed to insert {}: {}", email, e),
        }
    }

    println!();
    println!(
        "✓ Seed complete: {} assets, {} customers",
        db.assets().count().await?,
        db.customers().count().await?
    );

    db.close().await;
    Ok(())
}
