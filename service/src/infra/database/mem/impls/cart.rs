//! [`CartItem`]-related [`Database`] implementations.

use common::operations::{By, Delete, Insert, Select, Update};
use tracerr::Traced;

use crate::{
    domain::{product, user, CartItem},
    infra::{
        database::{self, mem, InMemory},
        Database,
    },
    read,
};

impl Database<Select<By<Option<CartItem>, (user::Id, product::Id)>>>
    for InMemory
{
    type Ok = Option<CartItem>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<CartItem>, (user::Id, product::Id)>>,
    ) -> Result<Self::Ok, Self::Err> {
        let key = by.into_inner();
        Ok(self.read().await.cart.get(&key).cloned())
    }
}

/// Selects all the cart [`read::cart::Line`]s of some [`User`], with their
/// [`Product`]s joined in.
///
/// [`Product`]: crate::domain::Product
/// [`User`]: crate::domain::User
impl Database<Select<By<Vec<read::cart::Line>, user::Id>>> for InMemory {
    type Ok = Vec<read::cart::Line>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<read::cart::Line>, user::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let user_id = by.into_inner();

        let state = self.read().await;
        let mut lines = Vec::new();
        for item in state.cart.values().filter(|i| i.user_id == user_id) {
            let product = state
                .products
                .get(&item.product_id)
                .cloned()
                .ok_or_else(|| {
                    tracerr::new!(database::Error::from(mem::Error::missing(
                        "Product",
                        &item.product_id,
                    )))
                })?;
            lines.push(read::cart::Line {
                product,
                quantity: item.quantity,
                added_at: item.created_at,
            });
        }
        lines.sort_by_key(|l| l.added_at);

        Ok(lines)
    }
}

impl Database<Insert<CartItem>> for InMemory {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(item): Insert<CartItem>,
    ) -> Result<Self::Ok, Self::Err> {
        self.execute(Update(item)).await.map_err(tracerr::wrap!())
    }
}

/// Upserts a [`CartItem`] under its `(user, product)` key, so the storage
/// itself cannot hold duplicated cart lines.
impl Database<Update<CartItem>> for InMemory {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(item): Update<CartItem>,
    ) -> Result<Self::Ok, Self::Err> {
        drop(
            self.write()
                .await
                .cart
                .insert((item.user_id, item.product_id), item),
        );
        Ok(())
    }
}

impl Database<Delete<By<CartItem, (user::Id, product::Id)>>> for InMemory {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Delete(by): Delete<By<CartItem, (user::Id, product::Id)>>,
    ) -> Result<Self::Ok, Self::Err> {
        let key = by.into_inner();
        drop(self.write().await.cart.remove(&key));
        Ok(())
    }
}

/// Clears the whole cart of some [`User`].
///
/// [`User`]: crate::domain::User
impl Database<Delete<By<Vec<CartItem>, user::Id>>> for InMemory {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Delete(by): Delete<By<Vec<CartItem>, user::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let user_id = by.into_inner();
        self.write().await.cart.retain(|(uid, _), _| *uid != user_id);
        Ok(())
    }
}
