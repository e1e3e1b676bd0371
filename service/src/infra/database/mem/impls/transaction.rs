//! [`Transaction`]-related [`Database`] implementations.

use common::operations::{By, Insert, Select, Swap};
use tracerr::Traced;

use crate::{
    domain::{transaction, user, Transaction},
    infra::{
        database::{self, mem, InMemory},
        Database,
    },
};

impl Database<Select<By<Option<Transaction>, transaction::Id>>> for InMemory {
    type Ok = Option<Transaction>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Transaction>, transaction::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();
        Ok(self.read().await.transactions.get(&id).cloned())
    }
}

impl Database<Select<By<Vec<Transaction>, ()>>> for InMemory {
    type Ok = Vec<Transaction>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(_): Select<By<Vec<Transaction>, ()>>,
    ) -> Result<Self::Ok, Self::Err> {
        let mut transactions: Vec<_> =
            self.read().await.transactions.values().cloned().collect();
        transactions.sort_by_key(|t| t.created_at);
        Ok(transactions)
    }
}

/// Selects all the [`Transaction`]s some [`User`] participates in, on either
/// side of the exchange.
///
/// [`User`]: crate::domain::User
impl Database<Select<By<Vec<Transaction>, user::Id>>> for InMemory {
    type Ok = Vec<Transaction>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Transaction>, user::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let user_id = by.into_inner();
        let mut transactions: Vec<_> = self
            .read()
            .await
            .transactions
            .values()
            .filter(|t| t.buyer_id == user_id || t.seller_id == user_id)
            .cloned()
            .collect();
        transactions.sort_by_key(|t| t.created_at);
        Ok(transactions)
    }
}

impl Database<Insert<Transaction>> for InMemory {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(tx): Insert<Transaction>,
    ) -> Result<Self::Ok, Self::Err> {
        drop(self.write().await.transactions.insert(tx.id, tx));
        Ok(())
    }
}

/// Compare-and-set of a [`Transaction`], expecting its current
/// [`transaction::Stage`].
///
/// Resolves with `false` (without mutating anything) if the stored
/// [`Transaction`]'s stage differs from the expected one, meaning a
/// concurrent advance won.
impl Database<Swap<By<Transaction, (transaction::Stage, Transaction)>>>
    for InMemory
{
    type Ok = bool;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Swap(by): Swap<By<Transaction, (transaction::Stage, Transaction)>>,
    ) -> Result<Self::Ok, Self::Err> {
        let (expected, replacement) = by.into_inner();

        let mut state = self.write().await;
        let stored =
            state.transactions.get_mut(&replacement.id).ok_or_else(|| {
                tracerr::new!(database::Error::from(mem::Error::missing(
                    "Transaction",
                    &replacement.id,
                )))
            })?;

        if stored.stage != expected {
            return Ok(false);
        }

        *stored = replacement;
        Ok(true)
    }
}
