//! [`Command`] for clearing a [`User`]'s cart.
//!
//! [`User`]: crate::domain::User

use common::operations::{By, Delete};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{user, CartItem},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for clearing a [`User`]'s cart.
///
/// [`User`]: crate::domain::User
#[derive(Clone, Copy, Debug)]
pub struct ClearCart {
    /// ID of the [`User`] owning the cart.
    ///
    /// [`User`]: crate::domain::User
    pub user_id: user::Id,
}

impl<Db, F> Command<ClearCart> for Service<Db, F>
where
    Db: Database<
        Delete<By<Vec<CartItem>, user::Id>>,
        Ok = (),
        Err = Traced<database::Error>,
    >,
{
    type Ok = ();
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: ClearCart) -> Result<Self::Ok, Self::Err> {
        let ClearCart { user_id } = cmd;

        self.database()
            .execute(Delete(By::new(user_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> ExecutionError))
    }
}

/// Error of [`ClearCart`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),
}
