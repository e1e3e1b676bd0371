//! [`Query`] collection related to [`Product`] listings.

use common::operations::By;

use crate::domain::{user, Product};
#[cfg(doc)]
use crate::Query;

use super::DatabaseQuery;

/// Queries all the listed [`Product`]s.
pub type All = DatabaseQuery<By<Vec<Product>, ()>>;

/// Queries the [`Product`]s listed by a seller.
pub type BySeller = DatabaseQuery<By<Vec<Product>, user::Id>>;
