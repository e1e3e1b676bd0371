//! [`RefreshRates`] [`Task`].

use std::{convert::Infallible, error::Error, time};

use common::operations::{By, Insert, Perform, Select, Start};
use derive_more::{Display, Error as StdError, From};
use tokio::time::interval;
use tracerr::Traced;
use tracing as log;

use crate::{
    domain::CryptoRate,
    infra::{database, feed, Database, Feed},
    Service,
};

use super::Task;

/// Configuration for [`RefreshRates`] [`Task`].
#[derive(Clone, Copy, Debug)]
pub struct Config {
    /// Interval between [`CryptoRate`]s refreshes.
    pub interval: time::Duration,
}

/// [`Task`] periodically replacing the stored [`CryptoRate`]s with a fresh
/// [`Feed`] snapshot.
///
/// Only the rate table is touched: amounts already locked inside existing
/// transactions are never recomputed.
#[derive(Clone, Copy, Debug)]
pub struct RefreshRates<S> {
    /// [`Config`] of this [`Task`].
    config: Config,

    /// [`Service`] instance.
    service: S,
}

impl<Db, F> Task<Start<By<RefreshRates<Self>, Config>>> for Service<Db, F>
where
    RefreshRates<Service<Db, F>>:
        Task<Perform<()>, Ok = (), Err: Error> + Send + Sync + 'static,
    Self: Clone,
{
    type Ok = ();
    type Err = Infallible;

    async fn execute(
        &self,
        Start(by): Start<By<RefreshRates<Self>, Config>>,
    ) -> Result<Self::Ok, Self::Err> {
        let config = by.into_inner();
        let task = RefreshRates {
            config,
            service: self.clone(),
        };

        let mut interval = interval(task.config.interval);
        loop {
            let _ = interval.tick().await;
            _ = task.execute(Perform(())).await.map_err(|e| {
                log::error!("`task::RefreshRates` failed: {e}");
            });
        }
    }
}

impl<Db, F> Task<Perform<()>> for RefreshRates<Service<Db, F>>
where
    F: Feed<
        Select<By<Vec<CryptoRate>, ()>>,
        Ok = Vec<CryptoRate>,
        Err = Traced<feed::Error>,
    >,
    Db: Database<Insert<CryptoRate>, Ok = (), Err = Traced<database::Error>>,
{
    type Ok = ();
    type Err = Traced<ExecutionError>;

    async fn execute(&self, _: Perform<()>) -> Result<Self::Ok, Self::Err> {
        let rates = self
            .service
            .feed()
            .execute(Select(By::new(())))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> ExecutionError))?;

        let count = rates.len();
        for rate in rates {
            self.service
                .database()
                .execute(Insert(rate))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> ExecutionError))?;
        }
        log::debug!("refreshed {count} exchange rates");

        Ok(())
    }
}

/// Error of [`RefreshRates`] execution.
#[derive(Debug, Display, From, StdError)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// [`Feed`] error.
    #[display("`Feed` operation failed: {_0}")]
    Feed(feed::Error),
}
