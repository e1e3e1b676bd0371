//! Cart read model definitions.

use common::{Percent, Usd};
use rust_decimal::Decimal;

use crate::domain::{cart, Product};
#[cfg(doc)]
use crate::domain::{CartItem, User};

/// Line of a [`User`]'s cart: the carted [`Product`] joined with its
/// [`CartItem`].
#[derive(Clone, Debug)]
pub struct Line {
    /// The carted [`Product`].
    pub product: Product,

    /// [`cart::Quantity`] of the carted [`Product`].
    pub quantity: cart::Quantity,

    /// When the [`Product`] was added to the cart.
    pub added_at: cart::CreationDateTime,
}

impl Line {
    /// Returns the fiat cost of this [`Line`]: price times quantity.
    #[must_use]
    pub fn cost(&self) -> Usd {
        self.product.price * Decimal::from(self.quantity)
    }
}

/// Derived totals of a [`User`]'s cart.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Summary {
    /// Sum of all line costs.
    pub subtotal: Usd,

    /// Marketplace service fee.
    pub service_fee: Usd,

    /// Flat shipping cost, zero for an empty cart.
    pub shipping: Usd,

    /// Grand total owed at checkout.
    pub total: Usd,
}

impl Summary {
    /// Service fee charged on the subtotal.
    // SAFETY: `5` is within the `0..=100` range.
    #[expect(unsafe_code, reason = "invariants are preserved")]
    pub const SERVICE_FEE: Percent =
        unsafe { Percent::new_unchecked(Decimal::from_parts(5, 0, 0, false, 0)) };

    /// Flat shipping cost of a non-empty cart.
    // SAFETY: `12.00` is non-negative.
    #[expect(unsafe_code, reason = "invariants are preserved")]
    pub const SHIPPING: Usd =
        unsafe { Usd::new_unchecked(Decimal::from_parts(1200, 0, 0, false, 2)) };

    /// Derives a [`Summary`] from the provided cart [`Line`]s.
    ///
    /// An empty cart yields an all-zero [`Summary`].
    #[must_use]
    pub fn of(lines: &[Line]) -> Self {
        let subtotal: Usd = lines.iter().map(Line::cost).sum();
        let service_fee = Self::SERVICE_FEE.of(subtotal);
        let shipping = if lines.is_empty() {
            Usd::ZERO
        } else {
            Self::SHIPPING
        };

        Self {
            subtotal,
            service_fee,
            shipping,
            total: subtotal + service_fee + shipping,
        }
    }
}

#[cfg(test)]
mod spec {
    use common::{DateTime, Usd};

    use crate::domain::{
        cart::Quantity,
        product::{
            AcceptedCurrencies, Category, Condition, Description, Status,
            Title,
        },
        rate::Symbol,
        user, Product,
    };

    use super::{Line, Summary};

    fn usd(s: &str) -> Usd {
        Usd::new(s.parse().unwrap()).unwrap()
    }

    fn line(price: &str, quantity: u32) -> Line {
        Line {
            product: Product {
                id: crate::domain::product::Id::new(),
                title: Title::new("Wireless Headphones").unwrap(),
                description: Description::new("Noise-cancelling.").unwrap(),
                price: usd(price),
                condition: Condition::LikeNew,
                seller_id: user::Id::new(),
                category: Category::new("Electronics").unwrap(),
                images: vec![],
                accepted_currencies: AcceptedCurrencies::new([
                    Symbol::new("ETH").unwrap(),
                ])
                .unwrap(),
                status: Status::Available,
                defects: None,
                original_packaging: true,
                created_at: DateTime::now().coerce(),
            },
            quantity: Quantity::new(quantity).unwrap(),
            added_at: DateTime::now().coerce(),
        }
    }

    #[test]
    fn empty_cart_is_all_zero() {
        let summary = Summary::of(&[]);

        assert_eq!(summary.subtotal, Usd::ZERO);
        assert_eq!(summary.service_fee, Usd::ZERO);
        assert_eq!(summary.shipping, Usd::ZERO);
        assert_eq!(summary.total, Usd::ZERO);
    }

    #[test]
    fn single_item_matches_observed_totals() {
        let summary = Summary::of(&[line("95.00", 1)]);

        assert_eq!(summary.subtotal, usd("95.00"));
        assert_eq!(summary.service_fee, usd("4.75"));
        assert_eq!(summary.shipping, usd("12.00"));
        assert_eq!(summary.total, usd("111.75"));
    }

    #[test]
    fn total_is_subtotal_plus_fee_plus_shipping() {
        let summary = Summary::of(&[line("120.00", 2), line("85.00", 1)]);

        assert_eq!(summary.subtotal, usd("325.00"));
        assert_eq!(
            summary.total,
            summary.subtotal + summary.service_fee + summary.shipping,
        );
        assert_eq!(summary.service_fee, usd("16.25"));
    }

    #[test]
    fn quantity_multiplies_line_cost() {
        assert_eq!(line("85.00", 3).cost(), usd("255.00"));
    }
}
