//! [`Command`] definition.

pub mod add_cart_item;
pub mod advance_transaction_step;
pub mod authorize_user_session;
pub mod checkout_cart;
pub mod clear_cart;
pub mod create_product;
pub mod create_transaction;
pub mod create_user;
pub mod create_user_session;
pub mod remove_cart_item;
pub mod set_cart_item_quantity;
pub mod verify_token;

/// [`Command`] of the [`Service`].
///
/// [`Service`]: crate::Service
pub use common::Handler as Command;

pub use self::{
    add_cart_item::AddCartItem,
    advance_transaction_step::AdvanceTransactionStep,
    authorize_user_session::AuthorizeUserSession,
    checkout_cart::CheckoutCart, clear_cart::ClearCart,
    create_product::CreateProduct, create_transaction::CreateTransaction,
    create_user::CreateUser, create_user_session::CreateUserSession,
    remove_cart_item::RemoveCartItem,
    set_cart_item_quantity::SetCartItemQuantity, verify_token::VerifyToken,
};
