//! [`Product`] definitions.

use std::slice;

#[cfg(doc)]
use common::DateTime;
use common::{define_kind, unit, DateTimeOf, Usd};
use derive_more::{AsRef, Display, From, FromStr, Into};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{rate::Symbol, user};

/// Second-hand good listed for sale.
#[derive(Clone, Debug)]
pub struct Product {
    /// ID of this [`Product`].
    pub id: Id,

    /// [`Title`] of this [`Product`].
    pub title: Title,

    /// [`Description`] of this [`Product`].
    pub description: Description,

    /// Price of this [`Product`] in fiat.
    pub price: Usd,

    /// [`Condition`] this [`Product`] is in.
    pub condition: Condition,

    /// ID of the [`User`] selling this [`Product`].
    ///
    /// [`User`]: crate::domain::User
    pub seller_id: user::Id,

    /// [`Category`] of this [`Product`].
    pub category: Category,

    /// Images of this [`Product`], in presentation order.
    pub images: Vec<ImageUrl>,

    /// Cryptocurrencies accepted as payment for this [`Product`].
    pub accepted_currencies: AcceptedCurrencies,

    /// [`Status`] of this [`Product`].
    pub status: Status,

    /// Known [`Defects`] of this [`Product`], if any.
    pub defects: Option<Defects>,

    /// Indicator whether this [`Product`] comes in its original packaging.
    pub original_packaging: bool,

    /// [`DateTime`] when this [`Product`] was created.
    pub created_at: CreationDateTime,
}

/// ID of a [`Product`].
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

/// Title of a [`Product`].
#[derive(AsRef, Clone, Debug, Display, Eq, PartialEq)]
#[as_ref(str, String)]
pub struct Title(String);

impl Title {
    /// Creates a new [`Title`].
    ///
    /// # Safety
    ///
    /// The caller must ensure that the given `title` matches the format.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub unsafe fn new_unchecked(title: impl Into<String>) -> Self {
        Self(title.into())
    }

    /// Creates a new [`Title`] if the given `title` is valid.
    #[must_use]
    pub fn new(title: impl Into<String>) -> Option<Self> {
        let title = title.into();
        Self::check(&title).then_some(Self(title))
    }

    /// Checks whether the given `title` is a valid [`Title`].
    fn check(title: impl AsRef<str>) -> bool {
        let title = title.as_ref();
        title.trim() == title && !title.is_empty() && title.len() <= 256
    }
}

impl FromStr for Title {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Title`")
    }
}

/// Description of a [`Product`].
#[derive(AsRef, Clone, Debug, Display, Eq, PartialEq)]
#[as_ref(str, String)]
pub struct Description(String);

impl Description {
    /// Creates a new [`Description`].
    ///
    /// # Safety
    ///
    /// The caller must ensure that the given `description` matches the format.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub unsafe fn new_unchecked(description: impl Into<String>) -> Self {
        Self(description.into())
    }

    /// Creates a new [`Description`] if the given `description` is valid.
    #[must_use]
    pub fn new(description: impl Into<String>) -> Option<Self> {
        let description = description.into();
        Self::check(&description).then_some(Self(description))
    }

    /// Checks whether the given `description` is a valid [`Description`].
    fn check(description: impl AsRef<str>) -> bool {
        let description = description.as_ref();
        description.trim() == description
            && !description.is_empty()
            && description.len() <= 4096
    }
}

impl FromStr for Description {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Description`")
    }
}

/// Category of a [`Product`].
///
/// Free-form, seller-provided.
#[derive(AsRef, Clone, Debug, Display, Eq, PartialEq)]
#[as_ref(str, String)]
pub struct Category(String);

impl Category {
    /// Creates a new [`Category`].
    ///
    /// # Safety
    ///
    /// The caller must ensure that the given `category` matches the format.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub unsafe fn new_unchecked(category: impl Into<String>) -> Self {
        Self(category.into())
    }

    /// Creates a new [`Category`] if the given `category` is valid.
    #[must_use]
    pub fn new(category: impl Into<String>) -> Option<Self> {
        let category = category.into();
        Self::check(&category).then_some(Self(category))
    }

    /// Checks whether the given `category` is a valid [`Category`].
    fn check(category: impl AsRef<str>) -> bool {
        let category = category.as_ref();
        category.trim() == category
            && !category.is_empty()
            && category.len() <= 128
    }
}

impl FromStr for Category {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Category`")
    }
}

/// URL of a [`Product`] image.
#[derive(AsRef, Clone, Debug, Display, Eq, PartialEq)]
#[as_ref(str, String)]
pub struct ImageUrl(String);

impl ImageUrl {
    /// Creates a new [`ImageUrl`].
    ///
    /// # Safety
    ///
    /// The caller must ensure that the given `url` matches the format.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub unsafe fn new_unchecked(url: impl Into<String>) -> Self {
        Self(url.into())
    }

    /// Creates a new [`ImageUrl`] if the given `url` is valid.
    #[must_use]
    pub fn new(url: impl Into<String>) -> Option<Self> {
        let url = url.into();
        Self::check(&url).then_some(Self(url))
    }

    /// Checks whether the given `url` is a valid [`ImageUrl`].
    fn check(url: impl AsRef<str>) -> bool {
        let url = url.as_ref();
        !url.is_empty()
            && url.len() <= 2048
            && !url.chars().any(char::is_whitespace)
    }
}

impl FromStr for ImageUrl {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `ImageUrl`")
    }
}

/// Free-text description of a [`Product`]'s defects.
#[derive(AsRef, Clone, Debug, Display, Eq, PartialEq)]
#[as_ref(str, String)]
pub struct Defects(String);

impl Defects {
    /// Creates a new [`Defects`].
    ///
    /// # Safety
    ///
    /// The caller must ensure that the given `defects` matches the format.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub unsafe fn new_unchecked(defects: impl Into<String>) -> Self {
        Self(defects.into())
    }

    /// Creates a new [`Defects`] if the given `defects` is valid.
    #[must_use]
    pub fn new(defects: impl Into<String>) -> Option<Self> {
        let defects = defects.into();
        Self::check(&defects).then_some(Self(defects))
    }

    /// Checks whether the given `defects` is a valid [`Defects`].
    fn check(defects: impl AsRef<str>) -> bool {
        let defects = defects.as_ref();
        defects.trim() == defects
            && !defects.is_empty()
            && defects.len() <= 1024
    }
}

impl FromStr for Defects {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Defects`")
    }
}

/// Non-empty set of [`Symbol`]s accepted as payment for a [`Product`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AcceptedCurrencies(Vec<Symbol>);

impl AcceptedCurrencies {
    /// Creates a new [`AcceptedCurrencies`] set if the given `symbols` are
    /// non-empty, deduplicating them.
    #[must_use]
    pub fn new(symbols: impl IntoIterator<Item = Symbol>) -> Option<Self> {
        let mut out = Vec::new();
        for s in symbols {
            if !out.contains(&s) {
                out.push(s);
            }
        }
        (!out.is_empty()).then_some(Self(out))
    }

    /// Indicates whether the given [`Symbol`] is accepted.
    #[must_use]
    pub fn contains(&self, symbol: &Symbol) -> bool {
        self.0.contains(symbol)
    }

    /// Iterates over the accepted [`Symbol`]s.
    pub fn iter(&self) -> slice::Iter<'_, Symbol> {
        self.0.iter()
    }
}

impl<'s> IntoIterator for &'s AcceptedCurrencies {
    type IntoIter = slice::Iter<'s, Symbol>;
    type Item = &'s Symbol;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

define_kind! {
    #[doc = "Condition of a [`Product`]."]
    enum Condition {
        #[doc = "Never used."]
        New = 1,

        #[doc = "Used once or twice, as good as new."]
        LikeNew = 2,

        #[doc = "Light signs of use."]
        VeryGood = 3,

        #[doc = "Visible signs of use, fully functional."]
        Good = 4,

        #[doc = "Heavy signs of use, still functional."]
        Acceptable = 5,
    }
}

define_kind! {
    #[doc = "Status of a [`Product`]."]
    enum Status {
        #[doc = "Listed and open for checkout."]
        Available = 1,

        #[doc = "Reserved by an in-flight [`Transaction`].\n\n\
                 [`Transaction`]: crate::domain::Transaction"]
        Pending = 2,

        #[doc = "Sold via a completed [`Transaction`].\n\n\
                 [`Transaction`]: crate::domain::Transaction"]
        Sold = 3,
    }
}

impl Status {
    /// Indicates whether a transition from this [`Status`] into the `to` one
    /// is permitted.
    ///
    /// Permitted transitions are [`Available`] → [`Pending`] (checkout),
    /// [`Pending`] → [`Sold`] (completion) and [`Pending`] → [`Available`]
    /// (cancellation).
    ///
    /// [`Available`]: Status::Available
    /// [`Pending`]: Status::Pending
    /// [`Sold`]: Status::Sold
    #[must_use]
    pub fn permits(self, to: Self) -> bool {
        use Status as S;

        matches!(
            (self, to),
            (S::Available, S::Pending)
                | (S::Pending, S::Sold)
                | (S::Pending, S::Available),
        )
    }
}

/// [`DateTime`] when a [`Product`] was created.
pub type CreationDateTime = DateTimeOf<(Product, unit::Creation)>;

#[cfg(test)]
mod spec {
    use super::Status;

    #[test]
    fn status_transition_table() {
        use Status as S;

        assert!(S::Available.permits(S::Pending));
        assert!(S::Pending.permits(S::Sold));
        assert!(S::Pending.permits(S::Available));

        assert!(!S::Available.permits(S::Sold));
        assert!(!S::Available.permits(S::Available));
        assert!(!S::Sold.permits(S::Available));
        assert!(!S::Sold.permits(S::Pending));
        assert!(!S::Pending.permits(S::Pending));
    }
}
