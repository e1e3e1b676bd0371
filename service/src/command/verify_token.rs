//! [`Command`] for verifying a custom token contract.

use common::{
    operations::{By, Insert, Select},
    DateTime,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{
        rate::{Chain, ContractAddress, Token, TokenQuery},
        CryptoRate,
    },
    infra::{database, feed, Database, Feed},
    Service,
};

use super::Command;

/// [`Command`] for verifying a custom token contract via the market-data
/// [`Feed`].
///
/// On success the token's rate is stored alongside the built-in ones, so the
/// new [`Symbol`] immediately becomes convertible.
///
/// [`Symbol`]: crate::domain::rate::Symbol
#[derive(Clone, Debug)]
pub struct VerifyToken {
    /// [`ContractAddress`] of the token to verify.
    pub contract_address: ContractAddress,

    /// [`Chain`] the token lives on.
    pub chain: Chain,
}

impl<Db, F> Command<VerifyToken> for Service<Db, F>
where
    F: Feed<
        Select<By<Token, TokenQuery>>,
        Ok = Token,
        Err = Traced<feed::Error>,
    >,
    Db: Database<Insert<CryptoRate>, Ok = (), Err = Traced<database::Error>>,
{
    type Ok = Token;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: VerifyToken) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let VerifyToken {
            contract_address,
            chain,
        } = cmd;

        let token = self
            .feed()
            .execute(Select(By::<Token, _>::new(TokenQuery {
                contract_address,
                chain,
            })))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        self.database()
            .execute(Insert(CryptoRate {
                symbol: token.symbol.clone(),
                name: token.name.clone(),
                usd_rate: token.usd_rate,
                updated_at: DateTime::now().coerce(),
            }))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        Ok(token)
    }
}

/// Error of [`VerifyToken`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// [`Feed`] error.
    #[display("`Feed` operation failed: {_0}")]
    Feed(feed::Error),
}

#[cfg(test)]
mod spec {
    use common::operations::{By, Select};

    use crate::{
        domain::rate::{Chain, ContractAddress, RateTable},
        infra::{Database as _, Fixed, InMemory},
        Command as _, Service,
    };

    use super::VerifyToken;

    #[tokio::test]
    async fn verified_token_becomes_convertible() {
        let (service, _bg) =
            Service::new(crate::test_config(), InMemory::new(), Fixed);

        let token = service
            .execute(VerifyToken {
                contract_address: ContractAddress::new(
                    "0x1234567890abcdef1234567890abcdef12345678",
                )
                .unwrap(),
                chain: Chain::ethereum(),
            })
            .await
            .unwrap();
        assert!(token.verified);

        let table: RateTable = service
            .database()
            .execute(Select(By::<RateTable, _>::new(())))
            .await
            .unwrap();
        assert!(table.get(&token.symbol).is_some());
    }
}
