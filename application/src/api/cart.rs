//! Shopping cart endpoints.

use axum::{extract::Path, Json};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use service::{command, domain, query, read, Command as _, Query as _};
use uuid::Uuid;

use crate::{define_error, AsError, Context, Error};

use super::{products, transactions};

/// A line of a cart, with its `Product` joined in.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Line {
    /// Identifier of the carted `Product`.
    pub product_id: Uuid,

    /// Quantity of the carted `Product`.
    pub quantity: u32,

    /// When the `Product` was added, as an RFC 3339 string.
    pub added_at: String,

    /// The carted `Product` itself.
    pub product: products::Product,
}

impl From<read::cart::Line> for Line {
    fn from(line: read::cart::Line) -> Self {
        Self {
            product_id: line.product.id.into(),
            quantity: line.quantity.get(),
            added_at: line.added_at.to_rfc3339(),
            product: line.product.into(),
        }
    }
}

/// A bare cart line, as returned by mutating endpoints.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    /// Identifier of the `User` owning the cart.
    pub user_id: Uuid,

    /// Identifier of the carted `Product`.
    pub product_id: Uuid,

    /// Quantity of the carted `Product`.
    pub quantity: u32,

    /// When the `Product` was added, as an RFC 3339 string.
    pub created_at: String,
}

impl From<domain::CartItem> for Item {
    fn from(item: domain::CartItem) -> Self {
        Self {
            user_id: item.user_id.into(),
            product_id: item.product_id.into(),
            quantity: item.quantity.get(),
            created_at: item.created_at.to_rfc3339(),
        }
    }
}

/// Derived totals of a cart.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    /// Sum of all line costs, in USD.
    pub subtotal: Decimal,

    /// Marketplace service fee, in USD.
    pub service_fee: Decimal,

    /// Flat shipping cost, in USD. Zero for an empty cart.
    pub shipping: Decimal,

    /// Grand total owed at checkout, in USD.
    pub total: Decimal,
}

impl From<read::cart::Summary> for Summary {
    fn from(summary: read::cart::Summary) -> Self {
        Self {
            subtotal: summary.subtotal.amount(),
            service_fee: summary.service_fee.amount(),
            shipping: summary.shipping.amount(),
            total: summary.total.amount(),
        }
    }
}

/// Lists the cart of a `User`.
///
/// # Errors
///
/// - 500 on a storage failure.
pub async fn list(
    ctx: Context,
    Path(user_id): Path<Uuid>,
) -> Result<Json<Vec<Line>>, Error> {
    let lines = ctx
        .service()
        .execute(query::cart::ByUser::by(user_id.into()))
        .await
        .map_err(AsError::into_error)?;

    Ok(Json(lines.into_iter().map(Into::into).collect()))
}

/// Returns the derived totals of a `User`'s cart.
///
/// # Errors
///
/// - 500 on a storage failure.
pub async fn summary(
    ctx: Context,
    Path(user_id): Path<Uuid>,
) -> Result<Json<Summary>, Error> {
    let lines = ctx
        .service()
        .execute(query::cart::ByUser::by(user_id.into()))
        .await
        .map_err(AsError::into_error)?;

    Ok(Json(read::cart::Summary::of(&lines).into()))
}

/// Body of an add-to-cart request.
#[derive(Clone, Copy, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddRequest {
    /// Identifier of the `User` owning the cart.
    pub user_id: Uuid,

    /// Identifier of the `Product` to add.
    pub product_id: Uuid,
}

/// Adds a `Product` to a cart, merging duplicates into the quantity.
///
/// Requires an authorized session.
///
/// # Errors
///
/// - 400 if the `Product` is not available;
/// - 401 without a valid session;
/// - 404 if the `Product` or the `User` does not exist;
/// - 500 on a storage failure.
pub async fn add(
    ctx: Context,
    Json(req): Json<AddRequest>,
) -> Result<(http::StatusCode, Json<Item>), Error> {
    drop(ctx.current_session().await?);

    let item = ctx
        .service()
        .execute(command::AddCartItem {
            user_id: req.user_id.into(),
            product_id: req.product_id.into(),
        })
        .await
        .map_err(AsError::into_error)?;

    Ok((http::StatusCode::CREATED, Json(item.into())))
}

/// Body of a quantity change request.
#[derive(Clone, Copy, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuantityRequest {
    /// New quantity of the line. Must be at least `1`.
    pub quantity: u32,
}

/// Changes the quantity of a cart line.
///
/// Requires an authorized session.
///
/// # Errors
///
/// - 400 on a quantity below `1`;
/// - 401 without a valid session;
/// - 404 if the `Product` is not in the cart;
/// - 500 on a storage failure.
pub async fn set_quantity(
    ctx: Context,
    Path((user_id, product_id)): Path<(Uuid, Uuid)>,
    Json(req): Json<QuantityRequest>,
) -> Result<Json<Item>, Error> {
    drop(ctx.current_session().await?);

    let quantity = domain::cart::Quantity::new(req.quantity)
        .ok_or_else(|| Error::bad_request("`quantity` must be at least 1"))?;

    let item = ctx
        .service()
        .execute(command::SetCartItemQuantity {
            user_id: user_id.into(),
            product_id: product_id.into(),
            quantity,
        })
        .await
        .map_err(AsError::into_error)?;

    Ok(Json(item.into()))
}

/// Removes a `Product` from a cart. A no-op if it is not carted.
///
/// Requires an authorized session.
///
/// # Errors
///
/// - 401 without a valid session;
/// - 500 on a storage failure.
pub async fn remove(
    ctx: Context,
    Path((user_id, product_id)): Path<(Uuid, Uuid)>,
) -> Result<http::StatusCode, Error> {
    drop(ctx.current_session().await?);

    ctx.service()
        .execute(command::RemoveCartItem {
            user_id: user_id.into(),
            product_id: product_id.into(),
        })
        .await
        .map_err(AsError::into_error)?;

    Ok(http::StatusCode::NO_CONTENT)
}

/// Clears the whole cart of a `User`.
///
/// Requires an authorized session.
///
/// # Errors
///
/// - 401 without a valid session;
/// - 500 on a storage failure.
pub async fn clear(
    ctx: Context,
    Path(user_id): Path<Uuid>,
) -> Result<http::StatusCode, Error> {
    drop(ctx.current_session().await?);

    ctx.service()
        .execute(command::ClearCart {
            user_id: user_id.into(),
        })
        .await
        .map_err(AsError::into_error)?;

    Ok(http::StatusCode::NO_CONTENT)
}

/// Body of a cart checkout request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutRequest {
    /// Symbol of the cryptocurrency to pay with.
    pub crypto_currency: String,
}

/// Checks out the whole cart: one `Transaction` per line, then the cart is
/// cleared.
///
/// Requires an authorized session.
///
/// # Errors
///
/// - 400 on an empty cart, an unavailable `Product`, a not accepted
///   currency, or a missing exchange rate;
/// - 401 without a valid session;
/// - 404 if the `User` does not exist;
/// - 500 on a storage failure.
pub async fn checkout(
    ctx: Context,
    Path(user_id): Path<Uuid>,
    Json(req): Json<CheckoutRequest>,
) -> Result<(http::StatusCode, Json<Vec<transactions::Transaction>>), Error> {
    drop(ctx.current_session().await?);

    let crypto_currency = req
        .crypto_currency
        .parse::<domain::rate::Symbol>()
        .map_err(|e| Error::bad_request(format!("`cryptoCurrency`: {e}")))?;

    let created = ctx
        .service()
        .execute(command::CheckoutCart {
            user_id: user_id.into(),
            crypto_currency,
        })
        .await
        .map_err(AsError::into_error)?;

    Ok((
        http::StatusCode::CREATED,
        Json(created.into_iter().map(Into::into).collect()),
    ))
}

impl AsError for command::add_cart_item::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::ProductNotExists(_) => Some(CartError::ProductNotFound.into()),
            Self::ProductUnavailable(_) => {
                Some(CartError::ProductNotAvailable.into())
            }
            Self::UserNotExists(_) => Some(CartError::UserNotFound.into()),
        }
    }
}

impl AsError for command::set_cart_item_quantity::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::ItemNotInCart(_) => Some(CartError::ItemNotInCart.into()),
        }
    }
}

impl AsError for command::remove_cart_item::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
        }
    }
}

impl AsError for command::clear_cart::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
        }
    }
}

impl AsError for command::checkout_cart::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::EmptyCart => Some(CartError::Empty.into()),
            Self::ProductUnavailable(_) => {
                Some(CartError::ProductNotAvailable.into())
            }
            Self::CurrencyNotAccepted(s) => Some(Error {
                code: "CURRENCY_NOT_ACCEPTED",
                status_code: http::StatusCode::BAD_REQUEST,
                message: format!("`{s}` is not accepted for a carted product"),
                backtrace: None,
            }),
            Self::RateNotFound(e) => Some(Error {
                code: "RATE_NOT_FOUND",
                status_code: http::StatusCode::BAD_REQUEST,
                message: e.to_string(),
                backtrace: None,
            }),
            Self::UserNotExists(_) => Some(CartError::UserNotFound.into()),
        }
    }
}

define_error! {
    enum CartError {
        #[code = "EMPTY_CART"]
        #[status = BAD_REQUEST]
        #[message = "Cart is empty"]
        Empty,

        #[code = "ITEM_NOT_IN_CART"]
        #[status = NOT_FOUND]
        #[message = "Product is not in the cart"]
        ItemNotInCart,

        #[code = "PRODUCT_NOT_FOUND"]
        #[status = NOT_FOUND]
        #[message = "Product not found"]
        ProductNotFound,

        #[code = "PRODUCT_NOT_AVAILABLE"]
        #[status = BAD_REQUEST]
        #[message = "Product is not available"]
        ProductNotAvailable,

        #[code = "USER_NOT_FOUND"]
        #[status = NOT_FOUND]
        #[message = "User does not exist"]
        UserNotFound,
    }
}
