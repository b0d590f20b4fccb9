//! Database seeder for Kasdes development and testing.
//!
//! Seeds demo cooperative units, tariffs, and a handful of transactions
//! for local development.
//!
//! Usage: cargo run --bin seeder

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use rust_decimal_macros::dec;

use kasdes_core::cache::AggregateCache;
use kasdes_core::ledger::{ExpenseInput, IncomeInput};
use kasdes_core::tariff::TariffInput;
use kasdes_core::unit::UnitKind;
use kasdes_db::{LedgerRepository, TariffRepository, UnitRepository};
use kasdes_shared::DatabaseConfig;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let database_url =
        std::env::var("DATABASE_URL").expect("DATABASE_URL must be set in environment");

    println!("Connecting to database...");
    let db = kasdes_db::connect(&DatabaseConfig {
        url: database_url,
        max_connections: 5,
        min_connections: 1,
    })
    .await
    .expect("Failed to connect to database");

    let cache = Arc::new(AggregateCache::new(64, Duration::from_secs(60)));
    let units = UnitRepository::new(db.clone(), Arc::clone(&cache));
    let tariffs = TariffRepository::new(db.clone());
    let ledger = LedgerRepository::new(db.clone(), Arc::clone(&cache));

    let existing = units
        .list_units()
        .await
        .expect("Failed to list units");

    let demo_units = [
        ("Lapangan Desa", UnitKind::SportsField, dec!(500_000)),
        ("Bumi Perkemahan", UnitKind::Campground, dec!(250_000)),
        ("Kios Desa", UnitKind::Kiosk, dec!(100_000)),
    ];

    for (name, kind, opening) in demo_units {
        if existing.iter().any(|u| u.name == name) {
            println!("  Unit {name} already exists, skipping...");
            continue;
        }

        println!("Seeding unit {name}...");
        let unit = units
            .create_unit(name, kind, opening)
            .await
            .expect("Failed to create unit");

        let demo_tariffs: &[(&str, rust_decimal::Decimal, &str)] = match kind {
            UnitKind::SportsField => &[
                ("hourly_rental", dec!(25_000), "hour"),
                ("tournament_day", dec!(400_000), "day"),
            ],
            UnitKind::Campground => &[("camping_night", dec!(50_000), "night")],
            _ => &[("daily_stall", dec!(15_000), "day")],
        };

        for (category, rate, uom) in demo_tariffs {
            tariffs
                .create(TariffInput {
                    unit_id: unit.id,
                    category: (*category).to_string(),
                    rate: *rate,
                    unit_of_measure: (*uom).to_string(),
                })
                .await
                .expect("Failed to create tariff");
            println!("  Created tariff {category}");
        }

        let (category, _, _) = demo_tariffs[0];
        let recorded = ledger
            .record_income(IncomeInput {
                unit_id: unit.id,
                tenant: "Karang Taruna".to_string(),
                category: category.to_string(),
                quantity: dec!(2),
                note: Some("seeded".to_string()),
                occurred_at: Utc::now(),
            })
            .await
            .expect("Failed to record income");
        println!(
            "  Recorded income {} (balance {})",
            recorded.income.amount, recorded.entry.balance_after
        );

        ledger
            .record_expense(ExpenseInput {
                unit_id: unit.id,
                category: "maintenance".to_string(),
                description: "Grass cutting and cleanup".to_string(),
                amount: dec!(20_000),
                occurred_at: Utc::now(),
            })
            .await
            .expect("Failed to record expense");
        println!("  Recorded maintenance expense");
    }

    println!("Seeding complete!");
}
