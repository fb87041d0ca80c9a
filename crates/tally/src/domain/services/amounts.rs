//! Invoice arithmetic
//!
//! Unit prices and invoice totals under the 5% business tax. All rounding is
//! half away from zero; totals are whole currency units, unit prices keep two
//! decimal places.
//!
//! Two invoice formats exist:
//! - normal: item amounts exclude tax, tax is added on top
//! - dual: item amounts already include tax, the tax-excluded base is derived
//!
//! Stored amounts are `NUMERIC(12, 2)`: at most two decimal places and no
//! more than [`MAX_AMOUNT`].

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::domain::errors::DomainError;

/// Business tax rate (5%)
pub const TAX_RATE: Decimal = Decimal::from_parts(5, 0, 0, false, 2);

/// Largest storable amount or total, 9,999,999,999.99
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(3_567_587_327, 232, 0, false, 2);

/// Decimal places of item amounts and unit prices
pub const AMOUNT_DP: u32 = 2;

const ROUNDING: RoundingStrategy = RoundingStrategy::MidpointAwayFromZero;

/// Invoice-level totals, always whole numbers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceAmounts {
    pub tax_excluded_amount: Decimal,
    pub tax: Decimal,
    pub tax_included_amount: Decimal,
}

impl InvoiceAmounts {
    pub fn zero() -> Self {
        Self {
            tax_excluded_amount: Decimal::ZERO,
            tax: Decimal::ZERO,
            tax_included_amount: Decimal::ZERO,
        }
    }
}

/// Check an item amount fits storage: non-negative, two places, at most [`MAX_AMOUNT`]
pub fn validate_amount(amount: Decimal) -> Result<(), DomainError> {
    if amount < Decimal::ZERO {
        return Err(DomainError::validation("Amount must not be negative"));
    }
    if amount.normalize().scale() > AMOUNT_DP {
        return Err(DomainError::validation(format!(
            "Amount {} has more than {} decimal places",
            amount, AMOUNT_DP
        )));
    }
    if amount > MAX_AMOUNT {
        return Err(DomainError::validation(format!(
            "Amount {} exceeds the maximum of {}",
            amount, MAX_AMOUNT
        )));
    }
    Ok(())
}

/// `amount / quantity` rounded to two places; zero quantity yields zero
pub fn compute_unit_price(amount: Decimal, quantity: i32) -> Decimal {
    if quantity == 0 {
        return Decimal::ZERO;
    }

    amount
        .checked_div(Decimal::from(quantity))
        .map(|price| price.round_dp_with_strategy(AMOUNT_DP, ROUNDING))
        .unwrap_or(Decimal::ZERO)
}

/// Totals for a set of item amounts.
///
/// Arithmetic saturates at `Decimal::MAX`; bounded inputs never reach it.
pub fn compute_amounts<I>(amounts: I, is_dual_format: bool) -> InvoiceAmounts
where
    I: IntoIterator<Item = Decimal>,
{
    let sum = round_whole(
        amounts
            .into_iter()
            .fold(Decimal::ZERO, |acc, amount| acc.saturating_add(amount)),
    );

    if is_dual_format {
        // Tax is the residual so the three figures always reconcile.
        let tax_included_amount = sum;
        let tax_excluded_amount = round_whole(tax_included_amount / (Decimal::ONE + TAX_RATE));
        InvoiceAmounts {
            tax_excluded_amount,
            tax: tax_included_amount - tax_excluded_amount,
            tax_included_amount,
        }
    } else {
        let tax_excluded_amount = sum;
        let tax = round_whole(tax_excluded_amount.saturating_mul(TAX_RATE));
        InvoiceAmounts {
            tax_excluded_amount,
            tax,
            tax_included_amount: tax_excluded_amount.saturating_add(tax),
        }
    }
}

fn round_whole(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(0, ROUNDING)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn test_unit_price_divides_and_rounds() {
        assert_eq!(compute_unit_price(dec("100"), 2), dec("50"));
        assert_eq!(compute_unit_price(dec("10"), 3), dec("3.33"));
        assert_eq!(compute_unit_price(dec("2"), 3), dec("0.67"));
    }

    #[test]
    fn test_unit_price_midpoint_rounds_away_from_zero() {
        // 0.125 would become 0.12 under banker's rounding
        assert_eq!(compute_unit_price(dec("0.25"), 2), dec("0.13"));
        assert_eq!(compute_unit_price(dec("0.05"), 2), dec("0.03"));
    }

    #[test]
    fn test_unit_price_zero_quantity() {
        assert_eq!(compute_unit_price(dec("123.45"), 0), Decimal::ZERO);
    }

    #[test]
    fn test_normal_format_scenario() {
        let amounts = compute_amounts([dec("100"), dec("50")], false);
        assert_eq!(amounts.tax_excluded_amount, dec("150"));
        assert_eq!(amounts.tax, dec("8"));
        assert_eq!(amounts.tax_included_amount, dec("158"));
    }

    #[test]
    fn test_dual_format_scenario() {
        let amounts = compute_amounts([dec("100"), dec("50")], true);
        assert_eq!(amounts.tax_included_amount, dec("150"));
        assert_eq!(amounts.tax_excluded_amount, dec("143"));
        assert_eq!(amounts.tax, dec("7"));
    }

    #[test]
    fn test_tax_midpoint_rounds_up() {
        // 50 * 0.05 = 2.5, banker's rounding would give 2
        let amounts = compute_amounts([dec("50")], false);
        assert_eq!(amounts.tax, dec("3"));
        assert_eq!(amounts.tax_included_amount, dec("53"));
    }

    #[test]
    fn test_item_sum_is_rounded_before_tax() {
        let amounts = compute_amounts([dec("10.40"), dec("10.20")], false);
        assert_eq!(amounts.tax_excluded_amount, dec("21"));
        assert_eq!(amounts.tax, dec("1"));
    }

    #[test]
    fn test_empty_items_sum_to_zero() {
        assert_eq!(compute_amounts(Vec::new(), false), InvoiceAmounts::zero());
        assert_eq!(compute_amounts(Vec::new(), true), InvoiceAmounts::zero());
    }

    #[test]
    fn test_max_amount_matches_storage_column() {
        assert_eq!(MAX_AMOUNT, dec("9999999999.99"));
    }

    #[test]
    fn test_validate_amount_bounds() {
        assert!(validate_amount(dec("0")).is_ok());
        assert!(validate_amount(dec("10.12")).is_ok());
        assert!(validate_amount(dec("10.120")).is_ok());
        assert!(validate_amount(MAX_AMOUNT).is_ok());

        for bad in ["-1", "10.125", "10000000000"] {
            let err = validate_amount(dec(bad)).unwrap_err();
            assert!(matches!(err, DomainError::Validation(_)), "{}", bad);
        }
    }

    #[test]
    fn test_huge_amounts_saturate_instead_of_panicking() {
        let huge = dec("70000000000000000000000000000");

        let normal = compute_amounts([huge, huge], false);
        assert_eq!(normal.tax_included_amount, Decimal::MAX);

        let dual = compute_amounts([huge, huge], true);
        assert_eq!(dual.tax_excluded_amount + dual.tax, dual.tax_included_amount);
    }

    fn money() -> impl Strategy<Value = Decimal> {
        (0i64..100_000_000).prop_map(|cents| Decimal::new(cents, 2))
    }

    proptest! {
        #[test]
        fn prop_unit_price_is_two_place_quotient(amount in money(), quantity in 1i32..10_000) {
            let price = compute_unit_price(amount, quantity);
            prop_assert!(price.scale() <= 2);

            let error = (price * Decimal::from(quantity) - amount).abs();
            let tolerance = Decimal::new(5, 3) * Decimal::from(quantity);
            prop_assert!(error <= tolerance);
        }

        #[test]
        fn prop_unit_price_zero_quantity(amount in money()) {
            prop_assert_eq!(compute_unit_price(amount, 0), Decimal::ZERO);
        }

        #[test]
        fn prop_normal_format_reconciles(items in prop::collection::vec(money(), 0..20)) {
            let a = compute_amounts(items.iter().copied(), false);
            prop_assert_eq!(a.tax_included_amount, a.tax_excluded_amount + a.tax);
            prop_assert_eq!(a.tax, round_whole(a.tax_excluded_amount * TAX_RATE));
            prop_assert_eq!(a.tax_excluded_amount.fract(), Decimal::ZERO);
        }

        #[test]
        fn prop_dual_format_reconciles(items in prop::collection::vec(money(), 0..20)) {
            let a = compute_amounts(items.iter().copied(), true);
            prop_assert_eq!(a.tax_excluded_amount + a.tax, a.tax_included_amount);
            prop_assert_eq!(
                a.tax_excluded_amount,
                round_whole(a.tax_included_amount / dec("1.05"))
            );
        }

        #[test]
        fn prop_compute_is_idempotent(items in prop::collection::vec(money(), 0..20), dual in any::<bool>()) {
            let first = compute_amounts(items.iter().copied(), dual);
            let second = compute_amounts(items.iter().copied(), dual);
            prop_assert_eq!(first, second);
        }
    }
}
