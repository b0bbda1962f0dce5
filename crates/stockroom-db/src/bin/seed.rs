//! # Seed Data Generator
//!
//! Fills an inventory with demo items for development.
//!
//! ## Usage
//! ```bash
//! # 200 items into data/inventory.db (default)
//! cargo run -p stockroom-db --bin seed
//!
//! # Custom amount and file
//! cargo run -p stockroom-db --bin seed -- --count 50 --db ./dev/inventory.db
//!
//! # Into a MySQL server (falls back to --db if unreachable)
//! cargo run -p stockroom-db --bin seed -- --host localhost --user root --database shop
//! ```
//!
//! Codes look like `{CATEGORY}-{NNN}` and are unique, so re-running against a
//! seeded database is refused instead of failing row by row.

use std::env;

use stockroom_core::validation::{validate_code, validate_item_name};
use stockroom_core::DEFAULT_ACTOR;
use stockroom_db::{descriptor, ConnectionDescriptor, DbConfig, DbError, RecordStore};

/// Item categories for realistic test data
const CATEGORIES: &[(&str, &[&str])] = &[
    (
        "PWR",
        &[
            "Cordless Drill",
            "Hammer Drill",
            "Angle Grinder",
            "Circular Saw",
            "Jigsaw",
            "Orbital Sander",
            "Heat Gun",
            "Impact Driver",
        ],
    ),
    (
        "HND",
        &[
            "Claw Hammer",
            "Screwdriver Set",
            "Adjustable Wrench",
            "Pliers",
            "Utility Knife",
            "Tape Measure",
            "Spirit Level",
            "Hand Saw",
        ],
    ),
    (
        "FST",
        &[
            "Wood Screws 4x40",
            "Wood Screws 5x60",
            "Wall Plugs 6mm",
            "Wall Plugs 8mm",
            "Nails 50mm",
            "Hex Bolts M8",
            "Washers M8",
            "Nuts M8",
        ],
    ),
    (
        "PNT",
        &[
            "Wall Paint White 5L",
            "Primer 1L",
            "Paint Roller",
            "Brush 50mm",
            "Masking Tape",
            "Drop Cloth",
            "Wood Stain",
            "Varnish",
        ],
    ),
];

/// Variants appended to names so the catalogue grows past one pass.
const VARIANTS: &[&str] = &["", "Pro", "Compact", "XL", "Value Pack"];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    let mut count: usize = 200;
    let mut db_path = String::from(stockroom_db::store::DEFAULT_FALLBACK_PATH);
    let mut target = ConnectionDescriptor::default();

    let mut i = 1;
    while i < args.len() {
        let value = args.get(i + 1).cloned();
        match (args[i].as_str(), value) {
            ("--count" | "-c", Some(v)) => {
                count = v.parse().unwrap_or(count);
                i += 1;
            }
            ("--db" | "-d", Some(v)) => {
                db_path = v;
                i += 1;
            }
            ("--host", Some(v)) => {
                target.host = v;
                i += 1;
            }
            ("--port", Some(v)) => {
                target.port = descriptor::parse_port(Some(&v));
                i += 1;
            }
            ("--user", Some(v)) => {
                target.user = v;
                i += 1;
            }
            ("--password", Some(v)) => {
                target.password = v;
                i += 1;
            }
            ("--database", Some(v)) => {
                target.database = v;
                i += 1;
            }
            ("--help" | "-h", _) => {
                println!("Stockroom Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -c, --count <N>        Number of items to generate (default: 200)");
                println!("  -d, --db <PATH>        Embedded database file (default: data/inventory.db)");
                println!("      --host <HOST>      MySQL host (empty: embedded only)");
                println!("      --port <PORT>      MySQL port (default: 3306)");
                println!("      --user <USER>      MySQL user");
                println!("      --password <PW>    MySQL password");
                println!("      --database <DB>    MySQL database");
                println!("  -h, --help             Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }
    if target.port == 0 {
        target.port = descriptor::DEFAULT_MYSQL_PORT;
    }

    println!("🌱 Stockroom Seed Data Generator");
    println!("================================");
    println!("Items: {}", count);
    println!();

    let store = RecordStore::connect(target, DbConfig::new(&db_path)).await?;
    println!("✓ Connected ({} backend)", store.backend_kind().await);
    println!("✓ Schema ensured");

    let existing = store.items().count().await?;
    if existing > 0 {
        println!("⚠ Inventory already has {} items", existing);
        println!("  Skipping seed to avoid duplicate codes.");
        return Ok(());
    }

    println!();
    println!("Generating items...");

    let start = std::time::Instant::now();
    let mut generated = 0;

    'outer: for variant in VARIANTS {
        for (category, names) in CATEGORIES {
            for name in names.iter() {
                if generated >= count {
                    break 'outer;
                }

                let (name, code) = generate_item(category, name, variant, generated);
                let quantity = ((generated * 37) % 120) as u32;

                match store.items().add(&name, &code, quantity).await {
                    Ok(_) => {}
                    Err(DbError::DuplicateCode { code }) => {
                        eprintln!("Skipping duplicate code {}", code);
                        continue;
                    }
                    Err(e) => return Err(e.into()),
                }
                store
                    .logs()
                    .append(DEFAULT_ACTOR, &format!("Seeded {} (code {})", name, code))
                    .await?;

                generated += 1;
                if generated % 50 == 0 {
                    println!("  Generated {} items...", generated);
                }
            }
        }
    }

    println!();
    println!("✓ Generated {} items in {:?}", generated, start.elapsed());
    println!("✓ Seed complete!");

    store.close().await;
    Ok(())
}

/// Builds a validated (name, code) pair.
fn generate_item(category: &str, name: &str, variant: &str, index: usize) -> (String, String) {
    let full_name = if variant.is_empty() {
        name.to_string()
    } else {
        format!("{} {}", name, variant)
    };

    let name = validate_item_name(&full_name).unwrap_or(full_name);
    let raw_code = format!("{}-{:03}", category, index + 1);
    let code = validate_code(&raw_code).unwrap_or(raw_code);
    (name, code)
}

