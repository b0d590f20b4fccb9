//! Business rule validation for ledger input.
//!
//! These checks run before anything is persisted; the API layer surfaces
//! the specific reason verbatim.

use super::error::LedgerError;
use super::types::{ExpenseInput, IncomeInput};
use rust_decimal::Decimal;

/// Maximum length for short text fields (tenant, category).
pub const MAX_NAME_LEN: usize = 120;

/// Maximum length for descriptions and notes.
pub const MAX_TEXT_LEN: usize = 500;

/// Validates an income input before recording.
///
/// # Errors
///
/// Returns the first failing rule.
pub fn validate_income(input: &IncomeInput) -> Result<(), LedgerError> {
    require_text("tenant", &input.tenant, MAX_NAME_LEN, LedgerError::EmptyTenant)?;
    require_text(
        "category",
        &input.category,
        MAX_NAME_LEN,
        LedgerError::EmptyCategory,
    )?;
    if input.quantity <= Decimal::ZERO {
        return Err(LedgerError::NonPositiveQuantity);
    }
    if let Some(note) = &input.note {
        if note.len() > MAX_TEXT_LEN {
            return Err(LedgerError::FieldTooLong {
                field: "note",
                max: MAX_TEXT_LEN,
            });
        }
    }
    Ok(())
}

/// Validates an expense input before recording.
///
/// # Errors
///
/// Returns the first failing rule.
pub fn validate_expense(input: &ExpenseInput) -> Result<(), LedgerError> {
    require_text(
        "category",
        &input.category,
        MAX_NAME_LEN,
        LedgerError::EmptyCategory,
    )?;
    require_text(
        "description",
        &input.description,
        MAX_TEXT_LEN,
        LedgerError::EmptyDescription,
    )?;
    validate_amount(input.amount)
}

/// Validates an edited amount (shared by income and expense edits).
///
/// # Errors
///
/// Returns `NonPositiveAmount` for zero or negative amounts.
pub fn validate_amount(amount: Decimal) -> Result<(), LedgerError> {
    if amount <= Decimal::ZERO {
        return Err(LedgerError::NonPositiveAmount);
    }
    Ok(())
}

fn require_text(
    field: &'static str,
    value: &str,
    max: usize,
    empty_err: LedgerError,
) -> Result<(), LedgerError> {
    if value.trim().is_empty() {
        return Err(empty_err);
    }
    if value.len() > max {
        return Err(LedgerError::FieldTooLong { field, max });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use kasdes_shared::types::UnitId;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    fn income(tenant: &str, category: &str, quantity: Decimal) -> IncomeInput {
        IncomeInput {
            unit_id: UnitId::new(),
            tenant: tenant.to_string(),
            category: category.to_string(),
            quantity,
            note: None,
            occurred_at: Utc::now(),
        }
    }

    fn expense(category: &str, description: &str, amount: Decimal) -> ExpenseInput {
        ExpenseInput {
            unit_id: UnitId::new(),
            category: category.to_string(),
            description: description.to_string(),
            amount,
            occurred_at: Utc::now(),
        }
    }

    #[test]
    fn test_valid_income_passes() {
        assert!(validate_income(&income("Karang Taruna", "hourly_rental", dec!(2))).is_ok());
    }

    #[rstest]
    #[case("", "hourly_rental", dec!(2))]
    #[case("   ", "hourly_rental", dec!(2))]
    fn test_income_requires_tenant(
        #[case] tenant: &str,
        #[case] category: &str,
        #[case] quantity: Decimal,
    ) {
        assert!(matches!(
            validate_income(&income(tenant, category, quantity)),
            Err(LedgerError::EmptyTenant)
        ));
    }

    #[rstest]
    #[case(dec!(0))]
    #[case(dec!(-1))]
    fn test_income_requires_positive_quantity(#[case] quantity: Decimal) {
        assert!(matches!(
            validate_income(&income("Tenant", "hourly_rental", quantity)),
            Err(LedgerError::NonPositiveQuantity)
        ));
    }

    #[test]
    fn test_income_note_length_capped() {
        let mut input = income("Tenant", "hourly_rental", dec!(1));
        input.note = Some("x".repeat(MAX_TEXT_LEN + 1));
        assert!(matches!(
            validate_income(&input),
            Err(LedgerError::FieldTooLong { field: "note", .. })
        ));
    }

    #[test]
    fn test_valid_expense_passes() {
        assert!(validate_expense(&expense("maintenance", "Net replacement", dec!(20_000))).is_ok());
    }

    #[test]
    fn test_expense_requires_description() {
        assert!(matches!(
            validate_expense(&expense("maintenance", "", dec!(100))),
            Err(LedgerError::EmptyDescription)
        ));
    }

    #[rstest]
    #[case(dec!(0))]
    #[case(dec!(-500))]
    fn test_expense_requires_positive_amount(#[case] amount: Decimal) {
        assert!(matches!(
            validate_expense(&expense("maintenance", "Paint", amount)),
            Err(LedgerError::NonPositiveAmount)
        ));
    }

    #[test]
    fn test_category_overlong() {
        let result = validate_expense(&expense(&"c".repeat(MAX_NAME_LEN + 1), "Paint", dec!(1)));
        assert!(matches!(
            result,
            Err(LedgerError::FieldTooLong {
                field: "category",
                ..
            })
        ));
    }
}
