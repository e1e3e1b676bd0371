//! Built-in [`Fixed`] market-data feed.

use common::{
    operations::{By, Select},
    DateTime,
};
use rust_decimal::Decimal;
use tracerr::Traced;
use xxhash_rust::xxh3;

use crate::{
    domain::{
        rate::{CurrencyName, Rate, Symbol, Token, TokenQuery},
        CryptoRate,
    },
    infra::feed::{self, Feed},
};

/// [`Feed`] serving a built-in exchange rate table and fabricating token
/// lookups, without touching any real market or chain.
#[derive(Clone, Copy, Debug, Default)]
pub struct Fixed;

impl Fixed {
    /// Built-in `(symbol, name, usd_rate)` table.
    const TABLE: [(&'static str, &'static str, &'static str); 14] = [
        // Major chains
        ("BTC", "Bitcoin", "36245.78"),
        ("ETH", "Ethereum", "2412.35"),
        // Layer 2 solutions
        ("MATIC", "Polygon", "0.58"),
        ("ARB", "Arbitrum", "0.73"),
        ("OP", "Optimism", "1.92"),
        ("BASE", "Base", "0.87"),
        // Altcoins
        ("SOL", "Solana", "102.76"),
        ("ADA", "Cardano", "0.45"),
        ("AVAX", "Avalanche", "29.52"),
        // Memecoins
        ("DOGE", "Dogecoin", "0.082"),
        ("SHIB", "Shiba Inu", "0.00002"),
        ("PEPE", "Pepe", "0.0000099"),
        ("BONK", "Bonk", "0.000026"),
        ("WIF", "Dogwifhat", "0.22"),
    ];
}

impl Feed<Select<By<Vec<CryptoRate>, ()>>> for Fixed {
    type Ok = Vec<CryptoRate>;
    type Err = Traced<feed::Error>;

    async fn execute(
        &self,
        Select(_): Select<By<Vec<CryptoRate>, ()>>,
    ) -> Result<Self::Ok, Self::Err> {
        let now = DateTime::now();
        Ok(Self::TABLE
            .iter()
            .map(|(symbol, name, rate)| CryptoRate {
                symbol: symbol.parse().expect("valid built-in table"),
                name: name.parse().expect("valid built-in table"),
                usd_rate: Rate::new(rate.parse().expect("valid built-in table"))
                    .expect("valid built-in table"),
                updated_at: now.coerce(),
            })
            .collect())
    }
}

/// Fabricates a [`Token`] for any [`TokenQuery`], deriving its data from the
/// xxh3 hash of the contract address, so repeated lookups of the same address
/// resolve with the same token.
impl Feed<Select<By<Token, TokenQuery>>> for Fixed {
    type Ok = Token;
    type Err = Traced<feed::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Token, TokenQuery>>,
    ) -> Result<Self::Ok, Self::Err> {
        let TokenQuery {
            contract_address,
            chain,
        } = by.into_inner();

        let digest = xxh3::xxh3_64(
            AsRef::<str>::as_ref(&contract_address).as_bytes(),
        );

        let number = digest % 1000;
        let name = CurrencyName::new(format!("Custom Token {number}"))
            .expect("matches the format");
        let symbol = Symbol::new(format!("CT{}", number / 100))
            .expect("matches the format");

        // Scaled into the `(0, 10)` USD range.
        #[expect(clippy::cast_possible_wrap, reason = "bounded by the modulo")]
        let rate = Decimal::new((digest % 10_000_000).max(1) as i64, 6);

        Ok(Token {
            symbol,
            name,
            usd_rate: Rate::new(rate).expect("positive by construction"),
            contract_address,
            chain,
            verified: true,
        })
    }
}

#[cfg(test)]
mod spec {
    use common::operations::{By, Select};

    use crate::{
        domain::rate::{Chain, ContractAddress, Token, TokenQuery},
        infra::Feed as _,
    };

    use super::Fixed;

    #[tokio::test]
    async fn serves_the_full_table() {
        let rates = Fixed
            .execute(Select(By::<Vec<_>, _>::new(())))
            .await
            .unwrap();

        assert_eq!(rates.len(), 14);
        assert!(rates.iter().any(|r| AsRef::<str>::as_ref(&r.symbol) == "BTC"));
        assert!(rates.iter().any(|r| AsRef::<str>::as_ref(&r.symbol) == "WIF"));
    }

    #[tokio::test]
    async fn token_lookup_is_deterministic() {
        let query = || TokenQuery {
            contract_address: ContractAddress::new(
                "0x1234567890abcdef1234567890abcdef12345678",
            )
            .unwrap(),
            chain: Chain::ethereum(),
        };

        let a = Fixed
            .execute(Select(By::<Token, _>::new(query())))
            .await
            .unwrap();
        let b = Fixed
            .execute(Select(By::<Token, _>::new(query())))
            .await
            .unwrap();

        assert_eq!(a.symbol, b.symbol);
        assert_eq!(a.usd_rate, b.usd_rate);
        assert!(a.verified);
    }
}
