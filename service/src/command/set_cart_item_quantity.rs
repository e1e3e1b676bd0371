//! [`Command`] for changing the quantity of a cart line.

use common::operations::{By, Select, Update};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{cart, product, user, CartItem},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for changing the quantity of a cart line.
///
/// Quantities below `1` never reach this [`Command`]: they are unencodable
/// as a [`cart::Quantity`] and rejected at the boundary instead.
#[derive(Clone, Copy, Debug)]
pub struct SetCartItemQuantity {
    /// ID of the [`User`] owning the cart.
    ///
    /// [`User`]: crate::domain::User
    pub user_id: user::Id,

    /// ID of the carted [`Product`].
    ///
    /// [`Product`]: crate::domain::Product
    pub product_id: product::Id,

    /// New [`cart::Quantity`] of the line.
    pub quantity: cart::Quantity,
}

impl<Db, F> Command<SetCartItemQuantity> for Service<Db, F>
where
    Db: Database<
            Select<By<Option<CartItem>, (user::Id, product::Id)>>,
            Ok = Option<CartItem>,
            Err = Traced<database::Error>,
        > + Database<Update<CartItem>, Ok = (), Err = Traced<database::Error>>,
{
    type Ok = CartItem;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: SetCartItemQuantity,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let SetCartItemQuantity {
            user_id,
            product_id,
            quantity,
        } = cmd;

        let mut item = self
            .database()
            .execute(Select(By::<Option<CartItem>, _>::new((
                user_id, product_id,
            ))))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::ItemNotInCart(product_id))
            .map_err(tracerr::wrap!())?;

        item.quantity = quantity;
        self.database()
            .execute(Update(item.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        Ok(item)
    }
}

/// Error of [`SetCartItemQuantity`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// The [`Product`] is not in the cart.
    ///
    /// [`Product`]: crate::domain::Product
    #[display("`Product(id: {_0})` is not in the cart")]
    ItemNotInCart(#[error(not(source))] product::Id),
}
