//! Pricing rules for income transactions.
//!
//! A tariff is pure reference data: (unit, category, rate, unit of measure).
//! Several tariffs per unit may exist over time for the same category; the
//! current one is the most recently created.

pub mod service;
pub mod types;

pub use service::TariffService;
pub use types::{Tariff, TariffInput};
