//! [`Command`] for removing a [`Product`] from a [`User`]'s cart.
//!
//! [`Product`]: crate::domain::Product
//! [`User`]: crate::domain::User

use common::operations::{By, Delete};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{product, user, CartItem},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for removing a [`Product`] from a [`User`]'s cart.
///
/// Removing a [`Product`] that is not carted is a no-op.
///
/// [`Product`]: crate::domain::Product
/// [`User`]: crate::domain::User
#[derive(Clone, Copy, Debug)]
pub struct RemoveCartItem {
    /// ID of the [`User`] owning the cart.
    ///
    /// [`User`]: crate::domain::User
    pub user_id: user::Id,

    /// ID of the [`Product`] to remove.
    ///
    /// [`Product`]: crate::domain::Product
    pub product_id: product::Id,
}

impl<Db, F> Command<RemoveCartItem> for Service<Db, F>
where
    Db: Database<
        Delete<By<CartItem, (user::Id, product::Id)>>,
        Ok = (),
        Err = Traced<database::Error>,
    >,
{
    type Ok = ();
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: RemoveCartItem,
    ) -> Result<Self::Ok, Self::Err> {
        let RemoveCartItem {
            user_id,
            product_id,
        } = cmd;

        self.database()
            .execute(Delete(By::new((user_id, product_id))))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> ExecutionError))
    }
}

/// Error of [`RemoveCartItem`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),
}
