//! [`Transaction`] definitions.

use std::fmt;

#[cfg(doc)]
use common::DateTime;
use common::{define_kind, unit, DateTimeOf, Usd};
use derive_more::{Display, Error, From, FromStr, Into};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{
    product,
    rate::{CryptoAmount, Symbol},
    user,
};
#[cfg(doc)]
use crate::domain::{Product, User};

/// Single buyer/seller exchange of one [`Product`].
#[derive(Clone, Debug)]
pub struct Transaction {
    /// ID of this [`Transaction`].
    pub id: Id,

    /// ID of the exchanged [`Product`].
    pub product_id: product::Id,

    /// ID of the buying [`User`].
    pub buyer_id: user::Id,

    /// ID of the selling [`User`].
    pub seller_id: user::Id,

    /// Fiat total owed by the buyer.
    pub amount: Usd,

    /// [`Symbol`] of the cryptocurrency the buyer pays with.
    pub crypto_currency: Symbol,

    /// Cryptocurrency equivalent of [`Transaction::amount`], converted once
    /// at creation and never recomputed.
    pub crypto_amount: CryptoAmount,

    /// Fiat value frozen at creation.
    ///
    /// Never changes afterwards, regardless of any exchange rate movement.
    pub fiat_locked: Usd,

    /// Current [`Stage`] of this [`Transaction`].
    pub stage: Stage,

    /// [`DateTime`] when this [`Transaction`] was created.
    pub created_at: CreationDateTime,

    /// [`DateTime`] when this [`Transaction`] was last updated.
    pub updated_at: UpdateDateTime,
}

/// ID of a [`Transaction`].
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    Deserialize,
    Display,
    Eq,
    From,
    FromStr,
    Hash,
    Into,
    PartialEq,
    Serialize,
)]
pub struct Id(Uuid);

impl Id {
    /// Creates a new random [`Id`].
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

define_kind! {
    #[doc = "Step of a [`Transaction`] protocol."]
    enum Step {
        #[doc = "The [`Product`] listing exists."]
        Listing = 1,

        #[doc = "Payment currency is selected and the [`Transaction`] \
                 is created."]
        Payment = 2,

        #[doc = "Buyer inspects the [`Product`] over a live call."]
        Verification = 3,

        #[doc = "Shipping is verified."]
        Shipping = 4,

        #[doc = "Buyer receives the [`Product`]."]
        Receiving = 5,
    }
}

impl Step {
    /// Creates a [`Step`] from its 1-based protocol number.
    #[must_use]
    pub fn from_number(number: u8) -> Option<Self> {
        match number {
            1 => Some(Self::Listing),
            2 => Some(Self::Payment),
            3 => Some(Self::Verification),
            4 => Some(Self::Shipping),
            5 => Some(Self::Receiving),
            _ => None,
        }
    }
}

define_kind! {
    #[doc = "Outcome status of a [`Transaction`]."]
    enum Status {
        #[doc = "No verification outcome yet."]
        Initiated = 1,

        #[doc = "Verification passed."]
        Approved = 2,

        #[doc = "Parties re-negotiated the terms."]
        Negotiated = 3,

        #[doc = "The exchange is called off."]
        Cancelled = 4,
    }
}

/// Stage of a [`Transaction`]: its protocol [`Step`] paired with its outcome
/// [`Status`].
///
/// All transitions go through [`Stage::advance()`], which validates them
/// against the protocol rules before anything is mutated.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Stage {
    /// Protocol [`Step`] the [`Transaction`] is at.
    step: Step,

    /// Outcome [`Status`] of the [`Transaction`].
    status: Status,
}

impl Stage {
    /// [`Stage`] a freshly created [`Transaction`] starts at.
    pub const INITIAL: Self = Self {
        step: Step::Listing,
        status: Status::Initiated,
    };

    /// Returns the protocol [`Step`] of this [`Stage`].
    #[must_use]
    pub const fn step(self) -> Step {
        self.step
    }

    /// Returns the outcome [`Status`] of this [`Stage`].
    #[must_use]
    pub const fn status(self) -> Status {
        self.status
    }

    /// Indicates whether this [`Stage`] is terminal.
    ///
    /// A terminal [`Transaction`] is either [`Cancelled`] or [`Approved`] at
    /// the [`Receiving`] step, and cannot be reopened.
    ///
    /// [`Approved`]: Status::Approved
    /// [`Cancelled`]: Status::Cancelled
    /// [`Receiving`]: Step::Receiving
    #[must_use]
    pub fn is_terminal(self) -> bool {
        self.status == Status::Cancelled || self.is_completed()
    }

    /// Indicates whether this [`Stage`] completes the protocol: [`Approved`]
    /// at the [`Receiving`] step.
    ///
    /// [`Approved`]: Status::Approved
    /// [`Receiving`]: Step::Receiving
    #[must_use]
    pub fn is_completed(self) -> bool {
        self.step == Step::Receiving && self.status == Status::Approved
    }

    /// Indicates whether this [`Stage`] is [`Cancelled`].
    ///
    /// [`Cancelled`]: Status::Cancelled
    #[must_use]
    pub fn is_cancelled(self) -> bool {
        self.status == Status::Cancelled
    }

    /// Advances this [`Stage`] to the provided [`Step`] with the provided
    /// outcome [`Status`].
    ///
    /// # Errors
    ///
    /// Errors without producing a new [`Stage`] if:
    /// - this [`Stage`] is terminal already;
    /// - the [`Step`] would decrease;
    /// - the outcome is not applicable at the target [`Step`]
    ///   ([`Initiated`] is only meaningful before [`Verification`], a
    ///   verification outcome only from it on, while [`Cancelled`] applies
    ///   anywhere).
    ///
    /// [`Initiated`]: Status::Initiated
    /// [`Cancelled`]: Status::Cancelled
    /// [`Verification`]: Step::Verification
    pub fn advance(
        self,
        to: Step,
        outcome: Status,
    ) -> Result<Self, InvalidTransitionError> {
        use InvalidTransitionError as E;

        if self.is_terminal() {
            return Err(E::Terminal(self));
        }

        if to.u8() < self.step.u8() {
            return Err(E::StepDecrease {
                from: self.step,
                to,
            });
        }

        let applicable = match outcome {
            Status::Cancelled => true,
            Status::Initiated => to.u8() < Step::Verification.u8(),
            Status::Approved | Status::Negotiated => {
                to.u8() >= Step::Verification.u8()
            }
        };
        if !applicable {
            return Err(E::OutcomeNotApplicable {
                step: to,
                status: outcome,
            });
        }

        Ok(Self {
            step: to,
            status: outcome,
        })
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Self { step, status } = self;
        write!(f, "{}:{status}", step.u8())
    }
}

/// Error of an illegal [`Stage`] transition.
#[derive(Clone, Copy, Debug, Display, Error)]
pub enum InvalidTransitionError {
    /// The [`Stage`] is terminal and cannot be reopened.
    #[display("`Stage({_0})` is terminal")]
    Terminal(#[error(not(source))] Stage),

    /// The [`Step`] would decrease.
    #[display("step cannot decrease: {from} -> {to}")]
    StepDecrease {
        /// Current [`Step`].
        from: Step,

        /// Requested [`Step`].
        to: Step,
    },

    /// The outcome [`Status`] is not applicable at the target [`Step`].
    #[display("`{status}` outcome is not applicable at `{step}` step")]
    OutcomeNotApplicable {
        /// Target [`Step`].
        step: Step,

        /// Requested outcome [`Status`].
        status: Status,
    },
}

/// [`DateTime`] when a [`Transaction`] was created.
pub type CreationDateTime = DateTimeOf<(Transaction, unit::Creation)>;

/// [`DateTime`] when a [`Transaction`] was last updated.
pub type UpdateDateTime = DateTimeOf<(Transaction, unit::Update)>;

#[cfg(test)]
mod spec {
    use super::{Stage, Status, Step};

    #[test]
    fn walks_the_happy_path() {
        let stage = Stage::INITIAL;
        assert_eq!(stage.step(), Step::Listing);
        assert_eq!(stage.status(), Status::Initiated);

        let stage = stage.advance(Step::Payment, Status::Initiated).unwrap();
        let stage =
            stage.advance(Step::Verification, Status::Approved).unwrap();
        let stage = stage.advance(Step::Shipping, Status::Approved).unwrap();
        assert!(!stage.is_terminal());

        let stage = stage.advance(Step::Receiving, Status::Approved).unwrap();
        assert!(stage.is_completed());
        assert!(stage.is_terminal());
    }

    #[test]
    fn rejects_step_decrease() {
        let stage = Stage::INITIAL
            .advance(Step::Shipping, Status::Approved)
            .unwrap();

        assert!(stage.advance(Step::Verification, Status::Approved).is_err());
    }

    #[test]
    fn rejects_reopening_cancelled() {
        let stage = Stage::INITIAL
            .advance(Step::Verification, Status::Cancelled)
            .unwrap();
        assert!(stage.is_cancelled());
        assert!(stage.is_terminal());

        assert!(stage.advance(Step::Shipping, Status::Approved).is_err());
    }

    #[test]
    fn rejects_reopening_completed() {
        let stage = Stage::INITIAL
            .advance(Step::Receiving, Status::Approved)
            .unwrap();

        assert!(stage.advance(Step::Receiving, Status::Negotiated).is_err());
        assert!(stage.advance(Step::Receiving, Status::Cancelled).is_err());
    }

    #[test]
    fn rejects_outcome_before_verification() {
        assert!(Stage::INITIAL
            .advance(Step::Payment, Status::Approved)
            .is_err());
        assert!(Stage::INITIAL
            .advance(Step::Payment, Status::Negotiated)
            .is_err());
    }

    #[test]
    fn rejects_initiated_outcome_after_verification() {
        assert!(Stage::INITIAL
            .advance(Step::Verification, Status::Initiated)
            .is_err());
    }

    #[test]
    fn cancels_at_any_step() {
        assert!(Stage::INITIAL
            .advance(Step::Listing, Status::Cancelled)
            .is_ok());
        assert!(Stage::INITIAL
            .advance(Step::Receiving, Status::Cancelled)
            .is_ok());

        let negotiated = Stage::INITIAL
            .advance(Step::Verification, Status::Negotiated)
            .unwrap();
        assert!(negotiated
            .advance(Step::Verification, Status::Cancelled)
            .is_ok());
    }

    #[test]
    fn allows_same_step_outcome_change() {
        let negotiated = Stage::INITIAL
            .advance(Step::Verification, Status::Negotiated)
            .unwrap();

        let approved = negotiated
            .advance(Step::Verification, Status::Approved)
            .unwrap();
        assert_eq!(approved.status(), Status::Approved);
    }

    #[test]
    fn step_from_number() {
        assert_eq!(Step::from_number(1), Some(Step::Listing));
        assert_eq!(Step::from_number(5), Some(Step::Receiving));
        assert_eq!(Step::from_number(0), None);
        assert_eq!(Step::from_number(6), None);
    }
}
