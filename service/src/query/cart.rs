//! [`Query`] collection related to a [`User`]'s cart.
//!
//! [`User`]: crate::domain::User

use common::operations::By;

use crate::{domain::user, read};
#[cfg(doc)]
use crate::Query;

use super::DatabaseQuery;

/// Queries the cart [`read::cart::Line`]s of a [`User`].
///
/// [`User`]: crate::domain::User
pub type ByUser = DatabaseQuery<By<Vec<read::cart::Line>, user::Id>>;
