//! Discount percentage type.

use core::fmt;

use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;

/// Errors that can occur when building a [`Discount`].
///
/// The messages are shown to merchants verbatim, so they match the wording of
/// the admin page.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum DiscountError {
    /// The percentage is below 0 or above 100.
    #[error("Discount must be between 0 and 100")]
    OutOfRange,
    /// The percentage is NaN or infinite.
    #[error("Discount must be a number")]
    NotFinite,
    /// A discount run was requested without a percentage.
    #[error("Discount is required")]
    Missing,
}

/// A percentage discount in the inclusive range 0-100.
///
/// ## Examples
///
/// ```
/// use bulk_discount_core::Discount;
/// use rust_decimal::Decimal;
///
/// let discount = Discount::from_f64(25.0).unwrap();
/// assert_eq!(discount.to_string(), "25");
/// assert_eq!(discount.multiplier(), Decimal::new(75, 2));
///
/// assert!(Discount::from_f64(-1.0).is_err());
/// assert!(Discount::from_f64(101.0).is_err());
/// assert!(Discount::from_f64(f64::NAN).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Discount(Decimal);

impl Discount {
    /// No discount. Used by reset runs.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Largest allowed percentage.
    pub const MAX_PERCENT: Decimal = Decimal::ONE_HUNDRED;

    /// Create a discount from a decimal percentage.
    ///
    /// # Errors
    ///
    /// Returns [`DiscountError::OutOfRange`] if `percent` is negative or
    /// greater than 100.
    pub fn new(percent: Decimal) -> Result<Self, DiscountError> {
        if (percent.is_sign_negative() && !percent.is_zero()) || percent > Self::MAX_PERCENT {
            return Err(DiscountError::OutOfRange);
        }
        Ok(Self(percent.normalize()))
    }

    /// Create a discount from a floating point percentage, as sent by the
    /// admin page.
    ///
    /// # Errors
    ///
    /// Returns [`DiscountError::NotFinite`] for NaN or infinite input and
    /// [`DiscountError::OutOfRange`] for values outside 0-100.
    pub fn from_f64(percent: f64) -> Result<Self, DiscountError> {
        if !percent.is_finite() {
            return Err(DiscountError::NotFinite);
        }
        if !(0.0..=100.0).contains(&percent) {
            return Err(DiscountError::OutOfRange);
        }
        let percent = Decimal::from_f64(percent).ok_or(DiscountError::NotFinite)?;
        Self::new(percent)
    }

    /// Factor applied to a baseline price: `1 - percent / 100`.
    #[must_use]
    pub fn multiplier(self) -> Decimal {
        Decimal::ONE - self.0 / Decimal::ONE_HUNDRED
    }
}

impl fmt::Display for Discount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.normalize())
    }
}

/// What a run does to the prices it selects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriceAction {
    /// Price becomes `baseline * (1 - discount / 100)`.
    Discount(Discount),
    /// Price returns to the baseline.
    Reset,
}

impl PriceAction {
    /// Effective discount; a reset is a 0% discount.
    #[must_use]
    pub const fn discount(self) -> Discount {
        match self {
            Self::Discount(discount) => discount,
            Self::Reset => Discount::ZERO,
        }
    }

    /// Build an action from an optional wire percentage.
    ///
    /// # Errors
    ///
    /// Returns [`DiscountError::Missing`] when no percentage was sent, or the
    /// validation error from [`Discount::from_f64`].
    pub fn discount_from_f64(percent: Option<f64>) -> Result<Self, DiscountError> {
        let percent = percent.ok_or(DiscountError::Missing)?;
        Discount::from_f64(percent).map(Self::Discount)
    }
}

impl fmt::Display for PriceAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Discount(discount) => write!(f, "discount {discount}%"),
            Self::Reset => f.write_str("reset"),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_bounds_are_inclusive() {
        assert!(Discount::from_f64(0.0).is_ok());
        assert!(Discount::from_f64(100.0).is_ok());
        assert_eq!(Discount::new(Decimal::ONE_HUNDRED).unwrap().multiplier(), Decimal::ZERO);
    }

    #[test]
    fn test_out_of_range_rejected() {
        assert_eq!(Discount::from_f64(-1.0), Err(DiscountError::OutOfRange));
        assert_eq!(Discount::from_f64(101.0), Err(DiscountError::OutOfRange));
        assert_eq!(Discount::from_f64(100.01), Err(DiscountError::OutOfRange));
        assert_eq!(
            Discount::new(Decimal::new(-5, 1)),
            Err(DiscountError::OutOfRange)
        );
    }

    #[test]
    fn test_non_finite_rejected() {
        assert_eq!(Discount::from_f64(f64::NAN), Err(DiscountError::NotFinite));
        assert_eq!(
            Discount::from_f64(f64::INFINITY),
            Err(DiscountError::NotFinite)
        );
    }

    #[test]
    fn test_display_is_normalized() {
        assert_eq!(Discount::from_f64(12.5).unwrap().to_string(), "12.5");
        assert_eq!(Discount::new(Decimal::new(2000, 2)).unwrap().to_string(), "20");
        assert_eq!(Discount::ZERO.to_string(), "0");
    }

    #[test]
    fn test_error_messages_match_admin_page() {
        assert_eq!(
            DiscountError::OutOfRange.to_string(),
            "Discount must be between 0 and 100"
        );
    }

    #[test]
    fn test_reset_is_zero_discount() {
        assert_eq!(PriceAction::Reset.discount(), Discount::ZERO);
        assert_eq!(PriceAction::Reset.to_string(), "reset");
    }

    #[test]
    fn test_discount_from_missing_percentage() {
        assert_eq!(
            PriceAction::discount_from_f64(None),
            Err(DiscountError::Missing)
        );
        assert_eq!(
            PriceAction::discount_from_f64(Some(10.0)).unwrap().to_string(),
            "discount 10%"
        );
    }
}
