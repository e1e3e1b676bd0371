//! Product catalog endpoints.

use axum::{
    extract::{Path, Query},
    Json,
};
use common::Usd;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use service::{command, domain, query, Command as _, Query as _};
use uuid::Uuid;

use crate::{define_error, AsError, Context, Error};

/// A listed [`domain::Product`], as exposed over the wire.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Unique identifier of this `Product`.
    pub id: Uuid,

    /// Title of this `Product`.
    pub title: String,

    /// Description of this `Product`.
    pub description: String,

    /// Fiat price of this `Product`, in USD.
    pub price: Decimal,

    /// Condition of this `Product`.
    pub condition: String,

    /// Identifier of the selling `User`.
    pub seller_id: Uuid,

    /// Category of this `Product`.
    pub category: String,

    /// Image URLs of this `Product`, in presentation order.
    pub images: Vec<String>,

    /// Cryptocurrencies accepted as payment.
    pub accepted_currencies: Vec<String>,

    /// Status of this `Product`.
    pub status: String,

    /// Known defects of this `Product`, if any.
    pub defects: Option<String>,

    /// Whether this `Product` comes in its original packaging.
    pub original_packaging: bool,

    /// When this `Product` was listed, as an RFC 3339 string.
    pub created_at: String,
}

impl From<domain::Product> for Product {
    fn from(product: domain::Product) -> Self {
        Self {
            id: product.id.into(),
            title: product.title.to_string(),
            description: product.description.to_string(),
            price: product.price.amount(),
            condition: product.condition.to_string(),
            seller_id: product.seller_id.into(),
            category: product.category.to_string(),
            images: product
                .images
                .iter()
                .map(ToString::to_string)
                .collect(),
            accepted_currencies: product
                .accepted_currencies
                .iter()
                .map(ToString::to_string)
                .collect(),
            status: product.status.to_string(),
            defects: product.defects.as_ref().map(ToString::to_string),
            original_packaging: product.original_packaging,
            created_at: product.created_at.to_rfc3339(),
        }
    }
}

/// Query parameters of the catalog listing.
#[derive(Clone, Copy, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    /// Restricts the listing to one seller.
    pub seller_id: Option<Uuid>,
}

/// Lists [`Product`]s, optionally restricted to one seller.
///
/// # Errors
///
/// - 500 on a storage failure.
pub async fn list(
    ctx: Context,
    Query(params): Query<ListQuery>,
) -> Result<Json<Vec<Product>>, Error> {
    let products = if let Some(seller_id) = params.seller_id {
        ctx.service()
            .execute(query::products::BySeller::by(seller_id.into()))
            .await
    } else {
        ctx.service().execute(query::products::All::by(())).await
    }
    .map_err(AsError::into_error)?;

    Ok(Json(products.into_iter().map(Into::into).collect()))
}

/// Returns a single [`Product`] by its ID.
///
/// # Errors
///
/// - 404 if no such `Product` exists;
/// - 500 on a storage failure.
pub async fn by_id(
    ctx: Context,
    Path(id): Path<Uuid>,
) -> Result<Json<Product>, Error> {
    ctx.service()
        .execute(query::product::ById::by(id.into()))
        .await
        .map_err(AsError::into_error)?
        .map(|p| Json(p.into()))
        .ok_or_else(|| ProductError::NotFound.into())
}

/// Body of a listing creation request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRequest {
    /// Title of the listing.
    pub title: String,

    /// Description of the listing.
    pub description: String,

    /// Fiat price, in USD. Must be positive.
    pub price: Decimal,

    /// Condition of the good.
    pub condition: String,

    /// Identifier of the selling `User`.
    pub seller_id: Uuid,

    /// Category of the good.
    pub category: String,

    /// Image URLs, in presentation order.
    #[serde(default)]
    pub images: Vec<String>,

    /// Cryptocurrencies accepted as payment. Must be non-empty.
    pub accepted_currencies: Vec<String>,

    /// Known defects, if any.
    pub defects: Option<String>,

    /// Whether the good comes in its original packaging.
    #[serde(default)]
    pub original_packaging: bool,
}

/// Lists a new [`Product`] with `AVAILABLE` status.
///
/// Requires an authorized session.
///
/// # Errors
///
/// - 400 on malformed fields;
/// - 401 without a valid session;
/// - 500 on a storage failure.
pub async fn create(
    ctx: Context,
    Json(req): Json<CreateRequest>,
) -> Result<(http::StatusCode, Json<Product>), Error> {
    drop(ctx.current_session().await?);

    let CreateRequest {
        title,
        description,
        price,
        condition,
        seller_id,
        category,
        images,
        accepted_currencies,
        defects,
        original_packaging,
    } = req;

    let price = Usd::new(price)
        .filter(|p| !p.is_zero())
        .ok_or_else(|| Error::bad_request("`price` must be positive"))?;
    let title = title
        .parse::<domain::product::Title>()
        .map_err(|e| Error::bad_request(format!("`title`: {e}")))?;
    let description = description
        .parse::<domain::product::Description>()
        .map_err(|e| Error::bad_request(format!("`description`: {e}")))?;
    let condition = condition
        .parse::<domain::product::Condition>()
        .map_err(|_| Error::bad_request("`condition`: invalid `Condition`"))?;
    let category = category
        .parse::<domain::product::Category>()
        .map_err(|e| Error::bad_request(format!("`category`: {e}")))?;
    let images = images
        .into_iter()
        .map(|url| url.parse::<domain::product::ImageUrl>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| Error::bad_request(format!("`images`: {e}")))?;
    let accepted_currencies = accepted_currencies
        .into_iter()
        .map(|s| s.parse::<domain::rate::Symbol>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| Error::bad_request(format!("`acceptedCurrencies`: {e}")))
        .map(domain::product::AcceptedCurrencies::new)?
        .ok_or_else(|| {
            Error::bad_request("`acceptedCurrencies` must be non-empty")
        })?;
    let defects = defects
        .map(|d| {
            d.parse::<domain::product::Defects>()
                .map_err(|e| Error::bad_request(format!("`defects`: {e}")))
        })
        .transpose()?;

    let product = ctx
        .service()
        .execute(command::CreateProduct {
            title,
            description,
            price,
            condition,
            seller_id: seller_id.into(),
            category,
            images,
            accepted_currencies,
            defects,
            original_packaging,
        })
        .await
        .map_err(AsError::into_error)?;

    Ok((http::StatusCode::CREATED, Json(product.into())))
}

impl AsError for command::create_product::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::SellerNotExists(_) => Some(ProductError::SellerNotFound.into()),
            Self::ZeroPrice => {
                Some(Error::bad_request("`price` must be positive"))
            }
        }
    }
}

define_error! {
    enum ProductError {
        #[code = "PRODUCT_NOT_FOUND"]
        #[status = NOT_FOUND]
        #[message = "Product not found"]
        NotFound,

        #[code = "SELLER_NOT_FOUND"]
        #[status = BAD_REQUEST]
        #[message = "Seller does not exist"]
        SellerNotFound,
    }
}
