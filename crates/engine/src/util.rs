//! Internal helpers for model validation and conversion.
//!
//! These utilities are **not** part of the public API. They centralize
//! validation and mapping logic so the engine enforces consistent invariants.

use unicode_normalization::UnicodeNormalization;
use uuid::Uuid;

use crate::{EngineError, MoneyCents, ResultEngine};

/// Parse a UUID from storage and return a labeled error on failure.
pub(crate) fn parse_uuid(value: &str, label: &str) -> ResultEngine<Uuid> {
    Uuid::parse_str(value).map_err(|_| EngineError::InvalidInput(format!("invalid {label} id")))
}

/// Same as [`parse_uuid`] for nullable columns.
pub(crate) fn parse_optional_uuid(value: Option<&str>, label: &str) -> ResultEngine<Option<Uuid>> {
    value.map(|v| parse_uuid(v, label)).transpose()
}

/// Trim and NFC-normalize a required text field.
pub(crate) fn normalize_required_text(value: &str, label: &str) -> ResultEngine<String> {
    let normalized: String = value.trim().nfc().collect();
    if normalized.is_empty() {
        return Err(EngineError::InvalidInput(format!(
            "{label} must not be empty"
        )));
    }
    Ok(normalized)
}

fn ensure_within_limit(amount: MoneyCents) -> ResultEngine<()> {
    if amount > MoneyCents::MAX_ENTRY {
        return Err(EngineError::InvalidAmount(format!(
            "amount must be <= {}",
            MoneyCents::MAX_ENTRY
        )));
    }
    Ok(())
}

/// Expenses may be zero (a placeholder to be edited later) but never negative.
pub(crate) fn ensure_expense_amount(amount: MoneyCents) -> ResultEngine<()> {
    if amount.is_negative() {
        return Err(EngineError::InvalidAmount(
            "amount must be >= 0".to_string(),
        ));
    }
    ensure_within_limit(amount)
}

/// Payments move real money: they must be strictly positive.
pub(crate) fn ensure_payment_amount(amount: MoneyCents) -> ResultEngine<()> {
    if !amount.is_positive() {
        return Err(EngineError::InvalidAmount(
            "amount must be > 0".to_string(),
        ));
    }
    ensure_within_limit(amount)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn required_text_is_trimmed_and_normalized() {
        // "e" + combining acute accent composes to a single "é".
        let value = normalize_required_text("  Cafe\u{301} ", "name").unwrap();
        assert_eq!(value, "Caf\u{e9}");
        assert!(normalize_required_text("   ", "name").is_err());
    }

    #[test]
    fn amount_rules_differ_for_expenses_and_payments() {
        assert!(ensure_expense_amount(MoneyCents::ZERO).is_ok());
        assert!(ensure_expense_amount(MoneyCents::new(-1)).is_err());
        assert!(ensure_payment_amount(MoneyCents::ZERO).is_err());
        assert!(ensure_payment_amount(MoneyCents::new(1)).is_ok());
    }

    #[test]
    fn amounts_above_the_entry_limit_are_rejected() {
        let limit = MoneyCents::MAX_ENTRY;
        let above = MoneyCents::new(limit.cents() + 1);
        assert!(ensure_expense_amount(limit).is_ok());
        assert!(ensure_payment_amount(limit).is_ok());
        assert!(matches!(
            ensure_expense_amount(above),
            Err(EngineError::InvalidAmount(_))
        ));
        assert!(matches!(
            ensure_payment_amount(MoneyCents::new(i64::MAX)),
            Err(EngineError::InvalidAmount(_))
        ));
    }
}
