//! # Seed Data Generator
//!
//! Populates the database with a demo seller, products and offer codes for
//! development.
//!
//! ## Usage
//! ```bash
//! # Seed the database named by STOREFRONT_DATABASE_PATH (default: storefront.db)
//! cargo run -p storefront-db --bin seed
//!
//! # Specify database path
//! cargo run -p storefront-db --bin seed -- --db ./data/storefront.db
//! ```
//!
//! ## Generated Data
//! One seller ("Demo Seller") whose checkout form shows the offer code
//! field, enables tipping and asks a global "Company" field plus a terms
//! checkbox on the course. Products and codes:
//!
//! | Product      | Price   | Default code |
//! |--------------|---------|--------------|
//! | `ebook`      | $10.00  | `WELCOME20`  |
//! | `course`     | $50.00  | -            |
//! | `templates`  | $15.00  | -            |
//!
//! | Code         | Discount | Scope                | Limits                   |
//! |--------------|----------|----------------------|--------------------------|
//! | `WELCOME20`  | 20%      | ebook                | -                        |
//! | `SAVE4`      | $4.00    | ebook, course        | -                        |
//! | `BUNDLE3`    | $3.00    | templates            | minimum quantity 3       |
//! | `EVERYTHING` | 10%      | universal            | 100 uses                 |
//! | `LAUNCH`     | 50%      | course               | expired yesterday        |

use chrono::{Duration, Utc};
use std::env;
use storefront_core::{
    CheckoutFormSettings, CheckoutFormUpdate, CustomFieldInput, CustomFieldType, Discount, Money, OfferCode, Product,
    RecommendationType, Seller,
};
use storefront_db::{Database, StorefrontConfig};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Demo products: (permalink, name, price in cents)
const PRODUCTS: &[(&str, &str, i64)] = &[
    ("ebook", "Rust for Storefronts (Ebook)", 1000),
    ("course", "Rust for Storefronts (Video Course)", 5000),
    ("templates", "Checkout Templates", 1500),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut config = StorefrontConfig::load()?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&config.log_filter))
        .init();

    // Parse command line arguments
    let args: Vec<String> = env::args().collect();

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    config.database_path = args[i + 1].clone().into();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Storefront Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>    Database file path (default: $STOREFRONT_DATABASE_PATH)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 Storefront Seed Data Generator");
    println!("=================================");
    println!("Database: {}", config.database_path.display());
    println!();

    let db = Database::new(config.db_config()).await?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    if db.products().get_by_permalink("ebook").await?.is_some() {
        println!("⚠ Database already has demo data");
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    let seller = db.sellers().insert(&Seller::new("Demo Seller")).await?;

    let mut products = Vec::with_capacity(PRODUCTS.len());
    for (permalink, name, price_cents) in PRODUCTS {
        let product = db
            .products()
            .insert(&Product::new(&seller.id, *permalink, *name, *price_cents))
            .await?;
        println!("  Product {:<10} {}", product.unique_permalink, product.price());
        products.push(product);
    }

    let now = Utc::now();
    let codes = [
        OfferCode::new(&seller.id, "WELCOME20", Discount::Percentage(20)).for_products(["ebook"]),
        OfferCode::new(&seller.id, "SAVE4", Discount::Fixed(Money::from_cents(400))).for_products(["ebook", "course"]),
        OfferCode::new(&seller.id, "BUNDLE3", Discount::Fixed(Money::from_cents(300)))
            .for_products(["templates"])
            .minimum_quantity(3),
        OfferCode::new(&seller.id, "EVERYTHING", Discount::Percentage(10))
            .universal()
            .max_purchase_count(100),
        OfferCode::new(&seller.id, "LAUNCH", Discount::Percentage(50))
            .for_products(["course"])
            .valid_between(Some(now - Duration::days(30)), Some(now - Duration::days(1))),
    ];

    for code in &codes {
        db.offer_codes().insert(code).await?;
        println!("  Offer code {}", code.code);
    }

    if let Some(ebook) = products.iter().find(|p| p.unique_permalink == "ebook") {
        db.products()
            .set_default_offer_code(&ebook.id, Some(&codes[0].id))
            .await?;
        println!("  Default code for ebook: {}", codes[0].code);
    }

    let form = CheckoutFormUpdate {
        user: Some(CheckoutFormSettings {
            display_offer_code_field: true,
            recommendation_type: RecommendationType::OwnProducts,
            tipping_enabled: true,
        }),
        custom_fields: vec![
            CustomFieldInput {
                name: Some("Company".to_string()),
                global: Some(true),
                ..Default::default()
            },
            CustomFieldInput {
                field_type: Some(CustomFieldType::Terms),
                name: Some("https://example.com/course-terms".to_string()),
                required: Some(true),
                product_permalinks: Some(vec!["course".to_string()]),
                ..Default::default()
            },
        ],
    };
    let form = db.checkout_forms().update(&seller.id, &form).await?;
    println!("  Checkout form: {} custom fields", form.custom_fields.len());

    info!(seller_id = %seller.id, products = products.len(), offer_codes = codes.len(), "Seed complete");

    // Sample resolution: $4.00 off beats 20% of $10.00
    let sample = db
        .offer_resolution()
        .best_offer_code("ebook", Some("SAVE4"), None)
        .await?;

    println!();
    println!("Sample: best_offer_code(\"ebook\", \"SAVE4\", quantity 1)");
    println!("{}", serde_json::to_string_pretty(&sample)?);

    println!();
    println!("✓ Seed complete!");

    db.close().await;
    Ok(())
}
