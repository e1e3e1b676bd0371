//! Money-related definitions.

use std::{fmt, iter::Sum, ops, str::FromStr};

use rust_decimal::{prelude::ToPrimitive as _, Decimal};

/// Amount of money in US dollars.
///
/// Guaranteed to be non-negative.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Usd(Decimal);

impl Usd {
    /// Zero amount of [`Usd`].
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Creates a new [`Usd`] amount if the given `amount` is non-negative.
    #[must_use]
    pub fn new(amount: Decimal) -> Option<Self> {
        (amount >= Decimal::ZERO).then_some(Self(amount))
    }

    /// Creates a new [`Usd`] amount without performing any validation.
    ///
    /// # Safety
    ///
    /// The provided `amount` must be non-negative.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub const unsafe fn new_unchecked(amount: Decimal) -> Self {
        Self(amount)
    }

    /// Returns the [`Decimal`] amount of this [`Usd`].
    #[must_use]
    pub const fn amount(self) -> Decimal {
        self.0
    }

    /// Indicates whether this [`Usd`] amount is zero.
    #[must_use]
    pub fn is_zero(self) -> bool {
        self.0.is_zero()
    }
}

impl fmt::Display for Usd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Self(amount) = self;
        if amount.is_integer() {
            write!(f, "{}USD", amount.to_i128().expect("integer"))
        } else {
            write!(f, "{amount}USD")
        }
    }
}

impl FromStr for Usd {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let amount = s.strip_suffix("USD").ok_or("missing `USD` suffix")?;
        let amount = Decimal::from_str(amount).map_err(|_| "invalid amount")?;

        Self::new(amount).ok_or("negative amount")
    }
}

impl ops::Add for Usd {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl ops::AddAssign for Usd {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl Sum for Usd {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, ops::Add::add)
    }
}

impl ops::Mul<Decimal> for Usd {
    type Output = Self;

    fn mul(self, rhs: Decimal) -> Self::Output {
        Self(self.0 * rhs)
    }
}

impl ops::Div<Decimal> for Usd {
    type Output = Self;

    fn div(self, rhs: Decimal) -> Self::Output {
        Self(self.0 / rhs)
    }
}

#[cfg(test)]
mod spec {
    use std::str::FromStr as _;

    use rust_decimal::Decimal;

    use super::Usd;

    fn decimal(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn from_str() {
        assert_eq!(
            Usd::from_str("123.45USD").unwrap(),
            Usd::new(decimal("123.45")).unwrap(),
        );

        assert!(Usd::from_str("123.45").is_err());
        assert!(Usd::from_str("123.45usd").is_err());
        assert!(Usd::from_str("-1USD").is_err());

        assert!(Usd::from_str("123.00USD").is_ok());
        assert!(Usd::from_str("123USD").is_ok());
        assert!(Usd::from_str("0USD").is_ok());
    }

    #[test]
    fn to_string() {
        assert_eq!(
            Usd::new(decimal("123.45")).unwrap().to_string(),
            "123.45USD",
        );
        assert_eq!(Usd::new(decimal("123.0")).unwrap().to_string(), "123USD");
        assert_eq!(Usd::ZERO.to_string(), "0USD");
    }

    #[test]
    fn rejects_negative() {
        assert_eq!(Usd::new(decimal("-0.01")), None);
    }

    #[test]
    fn arithmetic() {
        let sum: Usd = [
            Usd::new(decimal("95.00")).unwrap(),
            Usd::new(decimal("4.75")).unwrap(),
            Usd::new(decimal("12.00")).unwrap(),
        ]
        .into_iter()
        .sum();

        assert_eq!(sum, Usd::new(decimal("111.75")).unwrap());
        assert_eq!(
            Usd::new(decimal("95.00")).unwrap() * decimal("2"),
            Usd::new(decimal("190.00")).unwrap(),
        );
        assert_eq!(
            Usd::new(decimal("24.00")).unwrap() / decimal("2"),
            Usd::new(decimal("12.00")).unwrap(),
        );
    }
}
