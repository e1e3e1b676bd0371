//! [`Query`] collection related to [`CryptoRate`]s.

use common::operations::By;

use crate::domain::CryptoRate;
#[cfg(doc)]
use crate::Query;

use super::DatabaseQuery;

/// Queries all the known [`CryptoRate`]s.
pub type All = DatabaseQuery<By<Vec<CryptoRate>, ()>>;
