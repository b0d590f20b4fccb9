//! Core business logic for Kasdes.
//!
//! This crate contains pure business logic with ZERO web or database
//! dependencies. All domain types, chain math, and aggregation live here.
//!
//! # Modules
//!
//! - `unit` - Business unit reference data
//! - `ledger` - Balance chain math, recording and reconciliation rules
//! - `tariff` - Pricing rules for income transactions
//! - `reports` - Monthly/daily report aggregation
//! - `cache` - Time-boxed aggregate cache
//! - `dashboard` - Cross-unit rollup for the head-office view

pub mod cache;
pub mod dashboard;
pub mod ledger;
pub mod reports;
pub mod tariff;
pub mod unit;
