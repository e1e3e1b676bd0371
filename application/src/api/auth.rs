//! Authentication endpoints.

use axum::Json;
use secrecy::SecretBox;
use serde::{Deserialize, Serialize};
use service::{command, domain, Command as _};
use uuid::Uuid;

use crate::{define_error, AsError, Context, Error};

/// A [`domain::User`] of the system, as exposed over the wire.
///
/// The password hash never leaves the server.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Unique identifier of this `User`.
    pub id: Uuid,

    /// Unique name this `User` signs in with.
    pub username: String,

    /// Email address of this `User`.
    pub email: String,

    /// Role of this `User`.
    pub role: String,

    /// When this `User` was registered, as an RFC 3339 string.
    pub created_at: String,
}

impl From<domain::User> for User {
    fn from(user: domain::User) -> Self {
        Self {
            id: user.id.into(),
            username: user.username.to_string(),
            email: user.email.to_string(),
            role: user.role.to_string(),
            created_at: user.created_at.to_rfc3339(),
        }
    }
}

/// Body of a registration request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    /// Desired username.
    pub username: String,

    /// Desired password.
    pub password: String,

    /// Email address.
    pub email: String,

    /// Desired role, `BUYER` if omitted.
    pub role: Option<String>,
}

/// Registers a new [`User`].
///
/// # Errors
///
/// - 400 on malformed fields or an occupied username/email;
/// - 500 on a storage failure.
pub async fn register(
    ctx: Context,
    Json(req): Json<RegisterRequest>,
) -> Result<(http::StatusCode, Json<User>), Error> {
    let RegisterRequest {
        username,
        password,
        email,
        role,
    } = req;

    let username = username
        .parse::<domain::user::Username>()
        .map_err(|e| Error::bad_request(format!("`username`: {e}")))?;
    let password = domain::user::Password::new(password)
        .ok_or_else(|| Error::bad_request("`password`: invalid `Password`"))?;
    let email = email
        .parse::<domain::user::Email>()
        .map_err(|e| Error::bad_request(format!("`email`: {e}")))?;
    let role = role
        .as_deref()
        .unwrap_or("BUYER")
        .parse::<domain::user::Role>()
        .map_err(|_| Error::bad_request("`role`: invalid `Role`"))?;

    let user = ctx
        .service()
        .execute(command::CreateUser {
            username,
            password: SecretBox::new(Box::new(password)),
            email,
            role,
        })
        .await
        .map_err(AsError::into_error)?;

    Ok((http::StatusCode::CREATED, Json(user.into())))
}

/// Body of a login request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    /// Username to sign in with.
    pub username: String,

    /// Password to sign in with.
    pub password: String,
}

/// Body of a successful login response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    /// The signed-in `User`.
    pub user: User,

    /// Bearer token of the created session.
    pub token: String,

    /// When the session expires, as an RFC 3339 string.
    pub expires_at: String,
}

/// Signs a [`User`] in, issuing a session token.
///
/// # Errors
///
/// - 401 on wrong credentials;
/// - 500 on a storage failure.
pub async fn login(
    ctx: Context,
    Json(req): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, Error> {
    let LoginRequest { username, password } = req;

    let username = username
        .parse::<domain::user::Username>()
        .map_err(|_| Error::from(LoginError::InvalidCredentials))?;
    let password = domain::user::Password::new(password)
        .ok_or(LoginError::InvalidCredentials)?;

    let out = ctx
        .service()
        .execute(command::CreateUserSession::ByCredentials {
            username,
            password: SecretBox::new(Box::new(password)),
        })
        .await
        .map_err(AsError::into_error)?;

    Ok(Json(LoginResponse {
        user: out.user.into(),
        token: out.token.to_string(),
        expires_at: out.expires_at.to_rfc3339(),
    }))
}

/// Signs the current [`User`] out.
///
/// Sessions are stateless JWTs, so logging out amounts to the client
/// discarding its token; the endpoint exists for the boundary's completeness.
///
/// # Errors
///
/// Errors if the provided authentication token is invalid.
pub async fn logout(ctx: Context) -> Result<http::StatusCode, Error> {
    drop(ctx.try_current_session().await?);
    Ok(http::StatusCode::NO_CONTENT)
}

impl AsError for command::create_user::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::UsernameOccupied(_) => {
                Some(RegisterError::UsernameOccupied.into())
            }
            Self::EmailOccupied(_) => Some(RegisterError::EmailOccupied.into()),
        }
    }
}

impl AsError for command::create_user_session::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::WrongCredentials => Some(LoginError::InvalidCredentials.into()),
            Self::JsonWebTokenEncodeError(_) | Self::UserNotExists(_) => None,
        }
    }
}

define_error! {
    enum RegisterError {
        #[code = "USERNAME_OCCUPIED"]
        #[status = BAD_REQUEST]
        #[message = "Username already exists"]
        UsernameOccupied,

        #[code = "EMAIL_OCCUPIED"]
        #[status = BAD_REQUEST]
        #[message = "Email already exists"]
        EmailOccupied,
    }
}

define_error! {
    enum LoginError {
        #[code = "INVALID_CREDENTIALS"]
        #[status = UNAUTHORIZED]
        #[message = "Invalid credentials"]
        InvalidCredentials,
    }
}
