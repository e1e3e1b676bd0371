//! Transaction lifecycle endpoints.

use axum::{
    extract::{Path, Query},
    Json,
};
use common::Usd;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use service::{
    command, domain,
    domain::transaction::{Status, Step},
    query, Command as _, Query as _,
};
use uuid::Uuid;

use crate::{define_error, AsError, Context, Error};

/// A [`domain::Transaction`], as exposed over the wire.
///
/// `currentStep` and `status` are the two projections of the internal stage.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    /// Unique identifier of this `Transaction`.
    pub id: Uuid,

    /// Identifier of the exchanged `Product`.
    pub product_id: Uuid,

    /// Identifier of the buying `User`.
    pub buyer_id: Uuid,

    /// Identifier of the selling `User`.
    pub seller_id: Uuid,

    /// Fiat total owed by the buyer, in USD.
    pub amount: Decimal,

    /// Symbol of the cryptocurrency the buyer pays with.
    pub crypto_currency: String,

    /// Cryptocurrency equivalent, locked at creation.
    pub crypto_amount: Decimal,

    /// Fiat value locked at creation, in USD.
    pub fiat_locked: Decimal,

    /// Outcome status of this `Transaction`.
    pub status: String,

    /// Protocol step this `Transaction` is at, `1..=5`.
    pub current_step: u8,

    /// When this `Transaction` was created, as an RFC 3339 string.
    pub created_at: String,

    /// When this `Transaction` was last updated, as an RFC 3339 string.
    pub updated_at: String,
}

impl From<domain::Transaction> for Transaction {
    fn from(tx: domain::Transaction) -> Self {
        Self {
            id: tx.id.into(),
            product_id: tx.product_id.into(),
            buyer_id: tx.buyer_id.into(),
            seller_id: tx.seller_id.into(),
            amount: tx.amount.amount(),
            crypto_currency: tx.crypto_currency.to_string(),
            crypto_amount: tx.crypto_amount.decimal(),
            fiat_locked: tx.fiat_locked.amount(),
            status: tx.stage.status().to_string(),
            current_step: tx.stage.step().u8(),
            created_at: tx.created_at.to_rfc3339(),
            updated_at: tx.updated_at.to_rfc3339(),
        }
    }
}

/// Query parameters of the transaction listing.
#[derive(Clone, Copy, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    /// Restricts the listing to one participant (buyer or seller).
    pub user_id: Option<Uuid>,
}

/// Lists [`Transaction`]s, optionally restricted to one participant.
///
/// # Errors
///
/// - 500 on a storage failure.
pub async fn list(
    ctx: Context,
    Query(params): Query<ListQuery>,
) -> Result<Json<Vec<Transaction>>, Error> {
    let transactions = if let Some(user_id) = params.user_id {
        ctx.service()
            .execute(query::transactions::ByUser::by(user_id.into()))
            .await
    } else {
        ctx.service().execute(query::transactions::All::by(())).await
    }
    .map_err(AsError::into_error)?;

    Ok(Json(transactions.into_iter().map(Into::into).collect()))
}

/// Returns a single [`Transaction`] by its ID.
///
/// # Errors
///
/// - 404 if no such `Transaction` exists;
/// - 500 on a storage failure.
pub async fn by_id(
    ctx: Context,
    Path(id): Path<Uuid>,
) -> Result<Json<Transaction>, Error> {
    ctx.service()
        .execute(query::transaction::ById::by(id.into()))
        .await
        .map_err(AsError::into_error)?
        .map(|t| Json(t.into()))
        .ok_or_else(|| TransactionError::NotFound.into())
}

/// Body of a checkout request.
///
/// Client-supplied `cryptoAmount`/`fiatLocked`/`sellerId` fields are ignored:
/// the conversion is performed and locked server-side against the current
/// rate table, and the seller is the one on the `Product`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRequest {
    /// Identifier of the `Product` to check out.
    pub product_id: Uuid,

    /// Identifier of the buying `User`.
    pub buyer_id: Uuid,

    /// Fiat total owed, in USD. Must be positive.
    pub amount: Decimal,

    /// Symbol of the cryptocurrency to pay with.
    pub crypto_currency: String,
}

/// Checks a `Product` out into a new [`Transaction`].
///
/// Requires an authorized session.
///
/// # Errors
///
/// - 400 on malformed fields, an unavailable `Product`, a not accepted
///   currency, or a missing exchange rate;
/// - 401 without a valid session;
/// - 404 if the `Product` or the buyer does not exist;
/// - 500 on a storage failure.
pub async fn create(
    ctx: Context,
    Json(req): Json<CreateRequest>,
) -> Result<(http::StatusCode, Json<Transaction>), Error> {
    drop(ctx.current_session().await?);

    let CreateRequest {
        product_id,
        buyer_id,
        amount,
        crypto_currency,
    } = req;

    let amount = Usd::new(amount)
        .filter(|a| !a.is_zero())
        .ok_or_else(|| Error::bad_request("`amount` must be positive"))?;
    let crypto_currency = crypto_currency
        .parse::<domain::rate::Symbol>()
        .map_err(|e| Error::bad_request(format!("`cryptoCurrency`: {e}")))?;

    let transaction = ctx
        .service()
        .execute(command::CreateTransaction {
            product_id: product_id.into(),
            buyer_id: buyer_id.into(),
            amount,
            crypto_currency,
        })
        .await
        .map_err(AsError::into_error)?;

    Ok((http::StatusCode::CREATED, Json(transaction.into())))
}

/// Body of a step advancement request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepRequest {
    /// Protocol step to advance to, `1..=5`.
    pub step: u8,

    /// Outcome of the advancement, `APPROVED` if omitted.
    pub status: Option<String>,
}

/// Advances a [`Transaction`] to the provided protocol step.
///
/// Requires an authorized session.
///
/// # Errors
///
/// - 400 on a malformed or illegal transition;
/// - 401 without a valid session;
/// - 404 if no such `Transaction` exists;
/// - 409 if a concurrent advancement won;
/// - 500 on a storage failure.
pub async fn advance_step(
    ctx: Context,
    Path(id): Path<Uuid>,
    Json(req): Json<StepRequest>,
) -> Result<Json<Transaction>, Error> {
    drop(ctx.current_session().await?);

    let StepRequest { step, status } = req;

    let step = Step::from_number(step)
        .ok_or_else(|| Error::bad_request("`step` must be within 1..=5"))?;
    let outcome = status
        .as_deref()
        .map(str::parse::<Status>)
        .transpose()
        .map_err(|_| Error::bad_request("`status`: invalid `Status`"))?
        .unwrap_or(Status::Approved);

    let transaction = ctx
        .service()
        .execute(command::AdvanceTransactionStep {
            transaction_id: id.into(),
            step,
            outcome,
        })
        .await
        .map_err(AsError::into_error)?;

    Ok(Json(transaction.into()))
}

impl AsError for command::create_transaction::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::BuyerNotExists(_) => Some(TransactionError::BuyerNotFound.into()),
            Self::ProductNotExists(_) => {
                Some(TransactionError::ProductNotFound.into())
            }
            Self::ProductUnavailable(_) => {
                Some(TransactionError::ProductNotAvailable.into())
            }
            Self::CurrencyNotAccepted(s) => Some(Error {
                code: "CURRENCY_NOT_ACCEPTED",
                status_code: http::StatusCode::BAD_REQUEST,
                message: format!("`{s}` is not accepted for this product"),
                backtrace: None,
            }),
            Self::RateNotFound(e) => Some(Error {
                code: "RATE_NOT_FOUND",
                status_code: http::StatusCode::BAD_REQUEST,
                message: e.to_string(),
                backtrace: None,
            }),
            Self::ZeroAmount => {
                Some(Error::bad_request("`amount` must be positive"))
            }
        }
    }
}

impl AsError for command::advance_transaction_step::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::TransactionNotExists(_) => {
                Some(TransactionError::NotFound.into())
            }
            Self::InvalidTransition(e) => Some(Error {
                code: "INVALID_TRANSITION",
                status_code: http::StatusCode::BAD_REQUEST,
                message: e.to_string(),
                backtrace: None,
            }),
            Self::StageOutdated(_) => {
                Some(TransactionError::StageOutdated.into())
            }
            Self::ProductNotExists(_) | Self::ProductNotPending(_) => None,
        }
    }
}

define_error! {
    enum TransactionError {
        #[code = "TRANSACTION_NOT_FOUND"]
        #[status = NOT_FOUND]
        #[message = "Transaction not found"]
        NotFound,

        #[code = "PRODUCT_NOT_FOUND"]
        #[status = NOT_FOUND]
        #[message = "Product not found"]
        ProductNotFound,

        #[code = "PRODUCT_NOT_AVAILABLE"]
        #[status = BAD_REQUEST]
        #[message = "Product is not available"]
        ProductNotAvailable,

        #[code = "BUYER_NOT_FOUND"]
        #[status = NOT_FOUND]
        #[message = "Buyer does not exist"]
        BuyerNotFound,

        #[code = "STAGE_OUTDATED"]
        #[status = CONFLICT]
        #[message = "Transaction was advanced concurrently"]
        StageOutdated,
    }
}
