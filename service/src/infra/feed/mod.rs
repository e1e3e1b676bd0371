//! Market-data [`Feed`] implementations.
//!
//! The [`Feed`] is the external collaborator providing cryptocurrency
//! exchange rates and token-contract lookups. Which implementation backs it
//! is decided at composition time; everything else is generic over it.

pub mod fixed;

use derive_more::{Display, Error as StdError};

pub use self::fixed::Fixed;

/// External market-data collaborator.
pub use common::Handler as Feed;

/// [`Feed`] error.
#[derive(Clone, Copy, Debug, Display, StdError)]
pub enum Error {
    /// The feed is unreachable or returned an invalid response.
    #[display("market-data feed is unavailable")]
    Unavailable,
}
