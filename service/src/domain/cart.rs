//! [`CartItem`] definitions.

#[cfg(doc)]
use common::DateTime;
use common::{unit, DateTimeOf};
use derive_more::Display;
use rust_decimal::Decimal;

use crate::domain::{product, user};
#[cfg(doc)]
use crate::domain::{Product, User};

/// Line of a [`User`]'s shopping cart.
///
/// At most one [`CartItem`] exists per `(user, product)` pair: multiplicity
/// is carried by the [`Quantity`] instead.
#[derive(Clone, Debug)]
pub struct CartItem {
    /// ID of the [`User`] owning the cart.
    pub user_id: user::Id,

    /// ID of the carted [`Product`].
    pub product_id: product::Id,

    /// [`Quantity`] of the carted [`Product`].
    pub quantity: Quantity,

    /// [`DateTime`] when this [`CartItem`] was added.
    pub created_at: CreationDateTime,
}

/// Quantity of a [`CartItem`].
///
/// Guaranteed to be at least `1`.
#[derive(Clone, Copy, Debug, Display, Eq, Ord, PartialEq, PartialOrd)]
pub struct Quantity(u32);

impl Quantity {
    /// [`Quantity`] of one.
    pub const ONE: Self = Self(1);

    /// Creates a new [`Quantity`] if the given `quantity` is at least `1`.
    #[must_use]
    pub const fn new(quantity: u32) -> Option<Self> {
        if quantity >= 1 {
            Some(Self(quantity))
        } else {
            None
        }
    }

    /// Returns this [`Quantity`] as a plain number.
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }

    /// Returns this [`Quantity`] increased by one.
    #[must_use]
    pub const fn incremented(self) -> Self {
        Self(self.0.saturating_add(1))
    }
}

impl From<Quantity> for Decimal {
    fn from(quantity: Quantity) -> Self {
        quantity.0.into()
    }
}

/// [`DateTime`] when a [`CartItem`] was added.
pub type CreationDateTime = DateTimeOf<(CartItem, unit::Creation)>;

#[cfg(test)]
mod spec {
    use super::Quantity;

    #[test]
    fn rejects_zero() {
        assert_eq!(Quantity::new(0), None);
        assert_eq!(Quantity::new(1), Some(Quantity::ONE));
    }

    #[test]
    fn increments() {
        assert_eq!(Quantity::ONE.incremented(), Quantity::new(2).unwrap());
    }
}
