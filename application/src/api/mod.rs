//! REST API definitions.

pub mod auth;
pub mod cart;
pub mod crypto;
pub mod products;
pub mod transactions;

use axum::{
    routing::{get, patch, post},
    Router,
};

/// Builds the [`Router`] of the whole REST API surface.
#[must_use]
pub fn router() -> Router {
    Router::new()
        .route("/api/auth/register", post(auth::register))
        .route("/api/auth/login", post(auth::login))
        .route("/api/auth/logout", post(auth::logout))
        .route(
            "/api/products",
            get(products::list).post(products::create),
        )
        .route("/api/products/:id", get(products::by_id))
        .route(
            "/api/transactions",
            get(transactions::list).post(transactions::create),
        )
        .route("/api/transactions/:id", get(transactions::by_id))
        .route(
            "/api/transactions/:id/step",
            patch(transactions::advance_step),
        )
        .route("/api/cart", post(cart::add))
        .route("/api/cart/:user_id", get(cart::list).delete(cart::clear))
        .route("/api/cart/:user_id/summary", get(cart::summary))
        .route("/api/cart/:user_id/checkout", post(cart::checkout))
        .route(
            "/api/cart/:user_id/:product_id",
            patch(cart::set_quantity).delete(cart::remove),
        )
        .route("/api/crypto/rates", get(crypto::rates))
        .route("/api/crypto/verify-token", post(crypto::verify_token))
}
