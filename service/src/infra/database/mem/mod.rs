//! In-memory [`Database`] implementation.
//!
//! Backs the whole storage seam with plain keyed maps behind a single
//! [`RwLock`]: every operation takes one guard, so each operation is atomic
//! with respect to all others, but nothing survives a restart.
//!
//! [`Database`]: super::Database

mod impls;

use std::{collections::HashMap, fmt, sync::Arc};

use derive_more::{Display, Error as StdError};
use tokio::sync::RwLock;

use crate::domain::{
    product, rate::Symbol, transaction, user, CartItem, CryptoRate, Product,
    Transaction, User,
};

/// In-memory [`Database`] client.
///
/// Cheap to clone: clones share the same underlying state.
///
/// [`Database`]: super::Database
#[derive(Clone, Debug, Default)]
pub struct InMemory {
    /// Shared [`State`] of this [`InMemory`] database.
    state: Arc<RwLock<State>>,
}

impl InMemory {
    /// Creates a new empty [`InMemory`] database.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquires a shared read guard of the [`State`].
    pub(super) async fn read(
        &self,
    ) -> tokio::sync::RwLockReadGuard<'_, State> {
        self.state.read().await
    }

    /// Acquires an exclusive write guard of the [`State`].
    pub(super) async fn write(
        &self,
    ) -> tokio::sync::RwLockWriteGuard<'_, State> {
        self.state.write().await
    }
}

/// Keyed maps holding all the stored entities.
#[derive(Debug, Default)]
pub(super) struct State {
    /// Stored [`User`]s.
    pub(super) users: HashMap<user::Id, User>,

    /// Stored [`Product`]s.
    pub(super) products: HashMap<product::Id, Product>,

    /// Stored [`Transaction`]s.
    pub(super) transactions: HashMap<transaction::Id, Transaction>,

    /// Stored [`CartItem`]s, keyed per `(user, product)` pair.
    ///
    /// The keying itself guarantees at most one cart line per pair.
    pub(super) cart: HashMap<(user::Id, product::Id), CartItem>,

    /// Stored [`CryptoRate`]s, keyed by [`Symbol`].
    pub(super) rates: HashMap<Symbol, CryptoRate>,
}

/// [`InMemory`] database error.
#[derive(Debug, Display, StdError)]
pub enum Error {
    /// Entity expected to be stored is missing.
    #[display("`{entity}(id: {id})` is missing")]
    Missing {
        /// Name of the missing entity.
        entity: &'static str,

        /// ID of the missing entity.
        id: String,
    },
}

impl Error {
    /// Creates a new [`Error::Missing`] for the provided entity.
    pub(super) fn missing(
        entity: &'static str,
        id: &dyn fmt::Display,
    ) -> Self {
        Self::Missing {
            entity,
            id: id.to_string(),
        }
    }
}
