//! Tariff resolution and amount computation.

use rust_decimal::Decimal;

use super::types::{Tariff, TariffInput};
use crate::ledger::LedgerError;
use crate::ledger::validation::MAX_NAME_LEN;

/// Stateless tariff logic: pick the current rate, compute totals.
pub struct TariffService;

impl TariffService {
    /// Picks the current tariff for a category from a unit's tariffs.
    ///
    /// The current tariff is the most recently created one for the
    /// category; ties on `created_at` fall back to the larger (later) id
    /// since ids are time-ordered.
    #[must_use]
    pub fn current<'a>(tariffs: &'a [Tariff], category: &str) -> Option<&'a Tariff> {
        tariffs
            .iter()
            .filter(|t| t.category == category)
            .max_by_key(|t| (t.created_at, t.id.into_inner()))
    }

    /// Computes an income total from a tariff rate and quantity.
    #[must_use]
    pub fn compute_total(rate: Decimal, quantity: Decimal) -> Decimal {
        (rate * quantity).round_dp(2)
    }

    /// Validates a tariff before creation.
    ///
    /// # Errors
    ///
    /// Returns the first failing rule.
    pub fn validate(input: &TariffInput) -> Result<(), LedgerError> {
        if input.category.trim().is_empty() {
            return Err(LedgerError::EmptyCategory);
        }
        if input.category.len() > MAX_NAME_LEN {
            return Err(LedgerError::FieldTooLong {
                field: "category",
                max: MAX_NAME_LEN,
            });
        }
        if input.unit_of_measure.trim().is_empty() {
            return Err(LedgerError::EmptyDescription);
        }
        if input.rate <= Decimal::ZERO {
            return Err(LedgerError::NonPositiveAmount);
        }
        Ok(())
    }
}
