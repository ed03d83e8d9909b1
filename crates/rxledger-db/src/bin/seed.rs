//! # Seed Data Generator
//!
//! Populates a ledger database with a demo pharmacy for development.
//!
//! ## Usage
//! ```bash
//! # 200 products (default)
//! cargo run -p rxledger-db --bin seed
//!
//! # custom amount and path
//! cargo run -p rxledger-db --bin seed -- --count 1000 --db ./data/ledger.db
//! ```
//!
//! Creates tenant `demo-tenant`, branch `main`, a handful of suppliers and
//! customers, and `count` products with SKU `{CLASS}-{NAME}-{NNN}`.

use chrono::Utc;
use rxledger_core::{Customer, Product, Supplier};
use rxledger_db::{Database, DbConfig, Scope};
use std::env;
use uuid::Uuid;

const TENANT_ID: &str = "demo-tenant";
const BRANCH_ID: &str = "main";

/// Therapeutic classes and products, for realistic names.
const CLASSES: &[(&str, &[&str])] = &[
    (
        "ANB",
        &[
            "Amoxicillin",
            "Azithromycin",
            "Ciprofloxacin",
            "Doxycycline",
            "Metronidazole",
            "Cefuroxime",
            "Clarithromycin",
            "Flucloxacillin",
        ],
    ),
    (
        "ANL",
        &[
            "Paracetamol",
            "Ibuprofen",
            "Diclofenac",
            "Naproxen",
            "Aspirin",
            "Tramadol",
        ],
    ),
    (
        "CVS",
        &[
            "Amlodipine",
            "Losartan",
            "Atorvastatin",
            "Metoprolol",
            "Hydrochlorothiazide",
            "Lisinopril",
        ],
    ),
    (
        "END",
        &["Metformin", "Glibenclamide", "Insulin Glargine", "Levothyroxine"],
    ),
    (
        "GIT",
        &["Omeprazole", "Ranitidine", "Loperamide", "Oral Rehydration Salts"],
    ),
];

/// Strengths / pack sizes with a price addon in cents.
const STRENGTHS: &[(&str, i64)] = &[
    ("250mg x10", 0),
    ("500mg x10", 150),
    ("500mg x20", 280),
    ("1g x10", 320),
    ("Syrup 100ml", 200),
];

const SUPPLIERS: &[&str] = &["Acme Pharma Distributors", "MedSupply Ltd", "Kibo Wholesale Chemists"];
const CUSTOMERS: &[&str] = &["Amina Njeri", "Brian Otieno", "Grace Wanjiku", "Joseph Kamau"];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    let mut count: usize = 200;
    let mut db_path = String::from("./rxledger_dev.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--count" | "-c" => {
                if i + 1 < args.len() {
                    count = args[i + 1].parse().unwrap_or(200);
                    i += 1;
                }
            }
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("rxledger Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -c, --count <N>    Number of products to generate (default: 200)");
                println!("  -d, --db <PATH>    Database file path (default: ./rxledger_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 rxledger Seed Data Generator");
    println!("==============================");
    println!("Database: {}", db_path);
    println!("Products: {}", count);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;
    println!("✓ Connected to database, migrations applied");

    let existing = db.products().count(TENANT_ID).await?;
    if existing > 0 {
        println!("⚠ Tenant {} already has {} products", TENANT_ID, existing);
        println!("  Skipping seed to avoid duplicates.");
        return Ok(());
    }

    let now = Utc::now();

    for name in SUPPLIERS {
        db.suppliers()
            .insert(&Supplier {
                id: Uuid::new_v4().to_string(),
                tenant_id: TENANT_ID.to_string(),
                name: name.to_string(),
                phone: None,
                email: Some(format!("orders@{}.example", name.split(' ').next().unwrap_or("supplier").to_lowercase())),
                created_at: now,
            })
            .await?;
    }
    println!("✓ {} suppliers", SUPPLIERS.len());

    for name in CUSTOMERS {
        db.customers()
            .insert(&Customer {
                id: Uuid::new_v4().to_string(),
                tenant_id: TENANT_ID.to_string(),
                name: name.to_string(),
                phone: None,
                email: None,
                created_at: now,
            })
            .await?;
    }
    println!("✓ {} customers", CUSTOMERS.len());

    println!();
    println!("Generating products...");
    let start = std::time::Instant::now();
    let mut generated = 0;

    'outer: for (class_idx, (class, names)) in CLASSES.iter().enumerate() {
        for (name_idx, name) in names.iter().enumerate() {
            for (strength_idx, (strength, addon)) in STRENGTHS.iter().enumerate() {
                if generated >= count {
                    break 'outer;
                }

                let seed = class_idx * 1000 + name_idx * 20 + strength_idx;
                let product = generate_product(class, name, strength, *addon, seed);

                if let Err(e) = db.products().insert(&product).await {
                    eprintln!("Failed to insert {}: {}", product.sku, e);
                    continue;
                }

                generated += 1;
                if generated % 50 == 0 {
                    println!("  Generated {} products...", generated);
                }
            }
        }
    }

    println!();
    println!("✓ Generated {} products in {:?}", generated, start.elapsed());

    let hits = db
        .products()
        .search(Scope::new(TENANT_ID, BRANCH_ID), "amox", 10)
        .await?;
    println!("  Search 'amox': {} results", hits.len());

    println!();
    println!("✓ Seed complete!");

    Ok(())
}

fn generate_product(class: &str, name: &str, strength: &str, addon: i64, seed: usize) -> Product {
    let now = Utc::now();
    let short: String = name.chars().filter(|c| c.is_ascii_alphabetic()).take(3).collect();

    Product {
        id: Uuid::new_v4().to_string(),
        tenant_id: TENANT_ID.to_string(),
        branch_id: BRANCH_ID.to_string(),
        sku: format!("{}-{}-{:03}", class, short.to_uppercase(), seed % 1000),
        name: format!("{} {}", name, strength),
        // 1.50 - 9.49 plus strength addon
        unit_price_cents: 150 + ((seed * 37) % 800) as i64 + addon,
        stock_quantity: (seed % 121) as i64,
        created_at: now,
        updated_at: now,
    }
}
