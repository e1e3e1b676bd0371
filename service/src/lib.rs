//! Service contains the business logic of the application.

#![deny(
    nonstandard_style,
    rust_2018_idioms,
    rustdoc::all,
    trivial_casts,
    trivial_numeric_casts,
    unsafe_code
)]
#![forbid(non_ascii_idents)]
#![warn(
    clippy::allow_attributes,
    clippy::allow_attributes_without_reason,
    clippy::pedantic,
    clippy::wildcard_enum_match_arm,
    deprecated_in_future,
    missing_copy_implementations,
    missing_debug_implementations,
    missing_docs,
    unreachable_pub,
    unused_crate_dependencies,
    unused_import_braces,
    unused_labels,
    unused_lifetimes,
    unused_qualifications,
    unused_results
)]

pub mod command;
pub mod domain;
pub mod infra;
pub mod query;
pub mod read;
pub mod task;

use common::operations::{By, Start};
use derive_more::Debug;

#[cfg(doc)]
use infra::Database;

pub use self::{command::Command, query::Query, task::Task};

/// [`Service`] configuration.
#[derive(Clone, Debug)]
pub struct Config {
    /// [JWT] encoding key.
    ///
    /// [JWT]: https://datatracker.ietf.org/doc/html/rfc7519
    #[debug(skip)]
    pub jwt_encoding_key: jsonwebtoken::EncodingKey,

    /// [JWT] decoding key.
    ///
    /// [JWT]: https://datatracker.ietf.org/doc/html/rfc7519
    #[debug(skip)]
    pub jwt_decoding_key: jsonwebtoken::DecodingKey,

    /// [`task::RefreshRates`] configuration.
    pub refresh_rates: task::refresh_rates::Config,
}

/// Domain service.
#[derive(Clone, Debug)]
pub struct Service<Db, F> {
    /// Configuration of this [`Service`].
    config: Config,

    /// [`Database`] of this [`Service`].
    database: Db,

    /// Market-data [`Feed`] of this [`Service`].
    ///
    /// [`Feed`]: infra::Feed
    feed: F,
}

impl<Db, F> Service<Db, F> {
    /// Creates a new [`Service`] with the provided parameters, spawning its
    /// background [`Task`]s.
    pub fn new(config: Config, database: Db, feed: F) -> (Self, task::Background)
    where
        Self: Task<
                Start<
                    By<task::RefreshRates<Self>, task::refresh_rates::Config>,
                >,
                Ok = (),
                Err: std::error::Error,
            > + Clone
            + 'static,
    {
        let this = Service {
            config,
            database,
            feed,
        };

        let mut bg = task::Background::default();
        let svc = this.clone();
        bg.spawn(async move {
            svc.execute(Start(By::new(svc.config().refresh_rates))).await
        });

        (this, bg)
    }

    /// Returns [`Config`] of this [`Service`].
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Returns [`Database`] of this [`Service`].
    #[must_use]
    pub fn database(&self) -> &Db {
        &self.database
    }

    /// Returns the market-data [`Feed`] of this [`Service`].
    ///
    /// [`Feed`]: infra::Feed
    #[must_use]
    pub fn feed(&self) -> &F {
        &self.feed
    }
}

/// [`Config`] for tests.
#[cfg(test)]
pub(crate) fn test_config() -> Config {
    Config {
        jwt_encoding_key: jsonwebtoken::EncodingKey::from_secret(b"secret"),
        jwt_decoding_key: jsonwebtoken::DecodingKey::from_secret(b"secret"),
        refresh_rates: task::refresh_rates::Config {
            interval: std::time::Duration::from_secs(30),
        },
    }
}
