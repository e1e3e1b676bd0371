//! [`Query`] collection related to [`Transaction`] listings.

use common::operations::By;

use crate::domain::{user, Transaction};
#[cfg(doc)]
use crate::Query;

use super::DatabaseQuery;

/// Queries all the [`Transaction`]s.
pub type All = DatabaseQuery<By<Vec<Transaction>, ()>>;

/// Queries the [`Transaction`]s a [`User`] participates in, on either side.
///
/// [`User`]: crate::domain::User
pub type ByUser = DatabaseQuery<By<Vec<Transaction>, user::Id>>;
