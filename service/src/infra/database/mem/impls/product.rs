//! [`Product`]-related [`Database`] implementations.

use common::operations::{By, Insert, Select, Swap};
use tracerr::Traced;

use crate::{
    domain::{product, user, Product},
    infra::{
        database::{self, mem, InMemory},
        Database,
    },
};

impl Database<Select<By<Option<Product>, product::Id>>> for InMemory {
    type Ok = Option<Product>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Product>, product::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();
        Ok(self.read().await.products.get(&id).cloned())
    }
}

impl Database<Select<By<Vec<Product>, ()>>> for InMemory {
    type Ok = Vec<Product>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(_): Select<By<Vec<Product>, ()>>,
    ) -> Result<Self::Ok, Self::Err> {
        let mut products: Vec<_> =
            self.read().await.products.values().cloned().collect();
        products.sort_by_key(|p| p.created_at);
        Ok(products)
    }
}

impl Database<Select<By<Vec<Product>, user::Id>>> for InMemory {
    type Ok = Vec<Product>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Product>, user::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let seller_id = by.into_inner();
        let mut products: Vec<_> = self
            .read()
            .await
            .products
            .values()
            .filter(|p| p.seller_id == seller_id)
            .cloned()
            .collect();
        products.sort_by_key(|p| p.created_at);
        Ok(products)
    }
}

impl Database<Insert<Product>> for InMemory {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(product): Insert<Product>,
    ) -> Result<Self::Ok, Self::Err> {
        drop(self.write().await.products.insert(product.id, product));
        Ok(())
    }
}

/// Compare-and-set of a [`Product`], expecting its current
/// [`product::Status`].
///
/// Resolves with `false` (without mutating anything) if the stored
/// [`Product`]'s status differs from the expected one, which is how a lost
/// checkout race manifests.
impl Database<Swap<By<Product, (product::Status, Product)>>> for InMemory {
    type Ok = bool;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Swap(by): Swap<By<Product, (product::Status, Product)>>,
    ) -> Result<Self::Ok, Self::Err> {
        let (expected, replacement) = by.into_inner();

        let mut state = self.write().await;
        let stored = state.products.get_mut(&replacement.id).ok_or_else(
            || {
                tracerr::new!(database::Error::from(mem::Error::missing(
                    "Product",
                    &replacement.id,
                )))
            },
        )?;

        if stored.status != expected {
            return Ok(false);
        }

        *stored = replacement;
        Ok(true)
    }
}
