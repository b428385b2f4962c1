//! Money calculation utilities using rust_decimal for precision
//!
//! All calculations are done using `Decimal` internally, then converted to
//! `f64` for storage/serialization.

use rust_decimal::prelude::*;

use crate::utils::AppError;

/// Rounding strategy for monetary values (2 decimal places, half-up)
const DECIMAL_PLACES: u32 = 2;

/// Maximum allowed price per unit
const MAX_PRICE: f64 = 1_000_000.0;
/// Maximum allowed quantity per line item
pub const MAX_QUANTITY: i64 = 9999;

/// Convert f64 to Decimal for calculation
#[inline]
pub fn to_decimal(value: f64) -> Decimal {
    Decimal::from_f64(value).unwrap_or_default()
}

/// Convert Decimal back to f64 for storage, rounded to 2 decimal places
#[inline]
pub fn to_f64(value: Decimal) -> f64 {
    value
        .round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
        .to_f64()
        .unwrap_or(0.0)
}

/// Round a monetary value to 2 decimal places
#[inline]
pub fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
}

/// Unit price × quantity for a single line item
pub fn line_total(unit_price: f64, quantity: i64) -> Decimal {
    to_decimal(unit_price) * Decimal::from(quantity)
}

/// Validate a price coming in from the API (finite, non-negative, bounded).
/// Failures are field-scoped, matching the other input validators.
pub fn validate_price(price: f64, field: &str) -> Result<(), AppError> {
    if !price.is_finite() {
        return Err(AppError::field(
            field,
            format!("{field} must be a finite number, got {price}"),
        ));
    }
    if price < 0.0 {
        return Err(AppError::field(
            field,
            format!("{field} must be non-negative, got {price}"),
        ));
    }
    if price > MAX_PRICE {
        return Err(AppError::field(
            field,
            format!("{field} exceeds maximum allowed ({MAX_PRICE}), got {price}"),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_total_is_exact() {
        // 0.1 * 3 is the classic f64 trap; Decimal keeps it exact
        let total = line_total(0.1, 3);
        assert_eq!(to_f64(total), 0.3);
    }

    #[test]
    fn totals_round_half_up() {
        // 10.005 exactly, constructed without an f64 round trip
        let total = Decimal::new(10_005, 3);
        assert_eq!(round_money(total), Decimal::new(1_001, 2));
        assert_eq!(to_f64(total), 10.01);
    }

    #[test]
    fn worked_example_from_catalogue() {
        // price 100.00 x qty 2 = 200.00
        let total = line_total(100.0, 2);
        assert_eq!(to_f64(total), 200.0);
    }

    #[test]
    fn rejects_negative_and_nan_prices_field_scoped() {
        for bad in [-1.0, f64::NAN, f64::INFINITY] {
            let err = validate_price(bad, "price").unwrap_err();
            assert!(matches!(err, AppError::Fields(_)));
        }
        assert!(validate_price(19.99, "price").is_ok());
    }
}
