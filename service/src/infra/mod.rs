//! Infrastructure layer.

pub mod database;
pub mod feed;

pub use self::{
    database::{Database, InMemory},
    feed::{Feed, Fixed},
};
