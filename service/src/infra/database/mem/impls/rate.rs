//! [`CryptoRate`]-related [`Database`] implementations.

use common::operations::{By, Insert, Select};
use tracerr::Traced;

use crate::{
    domain::{rate::RateTable, CryptoRate},
    infra::{
        database::{self, InMemory},
        Database,
    },
};

impl Database<Select<By<Vec<CryptoRate>, ()>>> for InMemory {
    type Ok = Vec<CryptoRate>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(_): Select<By<Vec<CryptoRate>, ()>>,
    ) -> Result<Self::Ok, Self::Err> {
        let mut rates: Vec<_> =
            self.read().await.rates.values().cloned().collect();
        rates.sort_by(|a, b| {
            AsRef::<str>::as_ref(&a.symbol).cmp(AsRef::<str>::as_ref(&b.symbol))
        });
        Ok(rates)
    }
}

/// Selects the whole [`RateTable`] as a single consistent snapshot.
impl Database<Select<By<RateTable, ()>>> for InMemory {
    type Ok = RateTable;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(_): Select<By<RateTable, ()>>,
    ) -> Result<Self::Ok, Self::Err> {
        Ok(self.read().await.rates.values().cloned().collect())
    }
}

/// Upserts a [`CryptoRate`] under its [`Symbol`], replacing the previous
/// snapshot entry.
///
/// [`Symbol`]: crate::domain::rate::Symbol
impl Database<Insert<CryptoRate>> for InMemory {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(rate): Insert<CryptoRate>,
    ) -> Result<Self::Ok, Self::Err> {
        drop(self.write().await.rates.insert(rate.symbol.clone(), rate));
        Ok(())
    }
}
