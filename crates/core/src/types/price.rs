//! Price arithmetic for discount runs using decimal math.
//!
//! The compare-at price is treated as the variant's original price. Every
//! run recomputes from that baseline, which makes apply/reset cycles
//! idempotent:
//!
//! ```
//! use bulk_discount_core::{Discount, PriceAction, reprice};
//! use rust_decimal::Decimal;
//!
//! let discounted = reprice(None, Some("40.00"), PriceAction::Discount(Discount::from_f64(25.0).unwrap()));
//! assert_eq!(discounted.price, Decimal::new(3000, 2));
//! assert_eq!(discounted.compare_at_price, Decimal::new(4000, 2));
//!
//! // The stored compare-at price is the baseline for the reset.
//! let compare_at = discounted.compare_at_price.to_string();
//! let price = discounted.price.to_string();
//! let reset = reprice(Some(&compare_at), Some(&price), PriceAction::Reset);
//! assert_eq!(reset.price, Decimal::new(4000, 2));
//! ```

use core::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};

use super::discount::PriceAction;

/// Shopify stores prices in cents.
const PRICE_DECIMAL_PLACES: u32 = 2;

/// New price pair for a single variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Repricing {
    /// Price after the action, rounded to cents.
    pub price: Decimal,
    /// Baseline re-asserted as the compare-at price.
    pub compare_at_price: Decimal,
}

/// Parse a catalog price string.
///
/// Returns `None` when the price is absent, unparseable, or zero; all three
/// mean "no usable price" for baseline purposes.
#[must_use]
pub fn parse_price(raw: Option<&str>) -> Option<Decimal> {
    let value = Decimal::from_str(raw?.trim()).ok()?;
    (!value.is_zero()).then_some(value)
}

/// Price a discount is computed from: the compare-at price when usable,
/// else the current price when usable, else zero.
#[must_use]
pub fn baseline_price(compare_at_price: Option<&str>, price: Option<&str>) -> Decimal {
    parse_price(compare_at_price)
        .or_else(|| parse_price(price))
        .unwrap_or(Decimal::ZERO)
}

/// Compute the new price pair for a variant.
#[must_use]
pub fn reprice(compare_at_price: Option<&str>, price: Option<&str>, action: PriceAction) -> Repricing {
    let baseline = baseline_price(compare_at_price, price);
    let price = match action {
        PriceAction::Discount(discount) => (baseline * discount.multiplier())
            .round_dp_with_strategy(PRICE_DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero),
        PriceAction::Reset => baseline,
    };

    Repricing {
        price,
        compare_at_price: baseline,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::types::discount::Discount;

    fn discount(percent: f64) -> PriceAction {
        PriceAction::Discount(Discount::from_f64(percent).unwrap())
    }

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_parse_price_treats_zero_and_garbage_as_absent() {
        assert_eq!(parse_price(Some("19.99")), Some(dec("19.99")));
        assert_eq!(parse_price(Some(" 5 ")), Some(dec("5")));
        assert_eq!(parse_price(Some("0.00")), None);
        assert_eq!(parse_price(Some("abc")), None);
        assert_eq!(parse_price(Some("")), None);
        assert_eq!(parse_price(None), None);
    }

    #[test]
    fn test_baseline_prefers_compare_at_price() {
        assert_eq!(baseline_price(Some("50.00"), Some("40.00")), dec("50.00"));
        assert_eq!(baseline_price(Some("0.00"), Some("40.00")), dec("40.00"));
        assert_eq!(baseline_price(None, Some("40.00")), dec("40.00"));
        assert_eq!(baseline_price(Some("n/a"), None), Decimal::ZERO);
    }

    #[test]
    fn test_discount_is_relative_to_baseline() {
        let result = reprice(Some("100.00"), Some("90.00"), discount(20.0));
        assert_eq!(result.price, dec("80.00"));
        assert_eq!(result.compare_at_price, dec("100.00"));
    }

    #[test]
    fn test_discount_rounds_to_cents() {
        // 19.99 * 0.85 = 16.9915
        let result = reprice(None, Some("19.99"), discount(15.0));
        assert_eq!(result.price, dec("16.99"));

        // 0.05 * 0.5 = 0.025 rounds away from zero
        let result = reprice(None, Some("0.05"), discount(50.0));
        assert_eq!(result.price, dec("0.03"));
    }

    #[test]
    fn test_zero_and_full_discount() {
        assert_eq!(reprice(None, Some("12.34"), discount(0.0)).price, dec("12.34"));
        assert_eq!(reprice(None, Some("12.34"), discount(100.0)).price, Decimal::ZERO);
    }

    #[test]
    fn test_reset_restores_baseline() {
        let result = reprice(Some("25.00"), Some("20.00"), PriceAction::Reset);
        assert_eq!(result.price, dec("25.00"));
        assert_eq!(result.compare_at_price, dec("25.00"));
    }

    #[test]
    fn test_missing_prices_yield_zero() {
        let result = reprice(None, None, discount(30.0));
        assert_eq!(result.price, Decimal::ZERO);
        assert_eq!(result.compare_at_price, Decimal::ZERO);
    }

    #[test]
    fn test_apply_reset_round_trip() {
        for price in ["0.01", "1.00", "19.99", "249.50", "1000"] {
            for percent in [0.0, 1.0, 12.5, 33.0, 50.0, 99.0, 100.0] {
                let applied = reprice(None, Some(price), discount(percent));
                let compare_at = applied.compare_at_price.to_string();
                let current = applied.price.to_string();
                let reset = reprice(Some(&compare_at), Some(&current), PriceAction::Reset);
                assert_eq!(reset.price, dec(price), "price {price} at {percent}%");
            }
        }
    }

    #[test]
    fn test_repeated_apply_is_stable() {
        let once = reprice(None, Some("59.00"), discount(30.0));
        let compare_at = once.compare_at_price.to_string();
        let current = once.price.to_string();
        let twice = reprice(Some(&compare_at), Some(&current), discount(30.0));
        assert_eq!(once, twice);
    }
}
