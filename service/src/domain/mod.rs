//! Domain entities definitions.

pub mod cart;
pub mod product;
pub mod rate;
pub mod transaction;
pub mod user;

pub use self::{
    cart::CartItem, product::Product, rate::CryptoRate,
    transaction::Transaction, user::User,
};
