//! Cryptocurrency endpoints.

use axum::Json;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use service::{command, domain, query, Command as _, Query as _};

use crate::{define_error, AsError, Context, Error};

/// A [`domain::CryptoRate`], as exposed over the wire.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Rate {
    /// Ticker symbol of the currency.
    pub symbol: String,

    /// Human-readable name of the currency.
    pub name: String,

    /// USD price of one unit of the currency.
    pub usd_rate: Decimal,

    /// Conventional display precision of the currency, in decimal places.
    pub precision: u32,

    /// When this rate was last refreshed, as an RFC 3339 string.
    pub updated_at: String,
}

impl From<domain::CryptoRate> for Rate {
    fn from(rate: domain::CryptoRate) -> Self {
        Self {
            precision: rate.symbol.precision(),
            symbol: rate.symbol.to_string(),
            name: rate.name.to_string(),
            usd_rate: rate.usd_rate.decimal(),
            updated_at: rate.updated_at.to_rfc3339(),
        }
    }
}

/// Lists all the known exchange [`Rate`]s.
///
/// # Errors
///
/// - 500 on a storage failure.
pub async fn rates(ctx: Context) -> Result<Json<Vec<Rate>>, Error> {
    let rates = ctx
        .service()
        .execute(query::rates::All::by(()))
        .await
        .map_err(AsError::into_error)?;

    Ok(Json(rates.into_iter().map(Into::into).collect()))
}

/// Body of a token verification request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyTokenRequest {
    /// On-chain contract address of the token.
    pub contract_address: String,

    /// Chain the token lives on, `ethereum` if omitted.
    pub chain: Option<String>,
}

/// A verified token, as exposed over the wire.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Token {
    /// Ticker symbol of the token.
    pub symbol: String,

    /// Human-readable name of the token.
    pub name: String,

    /// USD price of one unit of the token.
    pub usd_rate: Decimal,

    /// Contract address the token was looked up by.
    pub contract_address: String,

    /// Chain the token lives on.
    pub chain: String,

    /// Whether the token contract has been verified.
    pub verified: bool,
}

/// Body of a successful token verification response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyTokenResponse {
    /// Always `true` on the success path.
    pub success: bool,

    /// The verified [`Token`].
    pub token: Token,
}

/// Verifies a custom token contract and stores its exchange rate.
///
/// # Errors
///
/// - 400 on a malformed contract address;
/// - 500 on a feed or storage failure.
pub async fn verify_token(
    ctx: Context,
    Json(req): Json<VerifyTokenRequest>,
) -> Result<Json<VerifyTokenResponse>, Error> {
    let VerifyTokenRequest {
        contract_address,
        chain,
    } = req;

    let contract_address =
        domain::rate::ContractAddress::new(contract_address)
            .ok_or_else(|| Error::from(CryptoError::InvalidContractAddress))?;
    let chain = match chain {
        Some(chain) => domain::rate::Chain::new(chain)
            .ok_or_else(|| Error::bad_request("`chain`: invalid `Chain`"))?,
        None => domain::rate::Chain::ethereum(),
    };

    let token = ctx
        .service()
        .execute(command::VerifyToken {
            contract_address,
            chain,
        })
        .await
        .map_err(AsError::into_error)?;

    Ok(Json(VerifyTokenResponse {
        success: true,
        token: Token {
            symbol: token.symbol.to_string(),
            name: token.name.to_string(),
            usd_rate: token.usd_rate.decimal(),
            contract_address: token.contract_address.to_string(),
            chain: token.chain.to_string(),
            verified: token.verified,
        },
    }))
}

impl AsError for command::verify_token::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::Feed(e) => e.try_as_error(),
        }
    }
}

define_error! {
    enum CryptoError {
        #[code = "INVALID_CONTRACT_ADDRESS"]
        #[status = BAD_REQUEST]
        #[message = "Invalid contract address format"]
        InvalidContractAddress,
    }
}
