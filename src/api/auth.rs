//! Authentication endpoints
//!
//! Obtain a token pair, refresh the access token, verify any token and register a new user.

use axum::Extension;
use serde::Deserialize;
use serde::Serialize;

use crate::password;
use crate::storage::UserStore;
use crate::users::User;
use crate::users::normalize_email;

use super::Error;
use super::Form;
use super::JwtKeys;
use super::Success;
use super::current_user::INVALID_TOKEN;
use super::current_user::TokenPair;
use super::current_user::TokenType;
use super::current_user::decode_token;
use super::current_user::generate_token;
use super::current_user::generate_token_pair;

/// Obtain form
#[derive(Debug, Deserialize)]
pub struct ObtainForm {
    email: String,
    password: String,
}

/// Exchange credentials for an access and refresh token
pub async fn obtain<S>(
    Extension(storage): Extension<S>,
    Extension(jwt_keys): Extension<JwtKeys>,
    Form(form): Form<ObtainForm>,
) -> Result<Success<TokenPair>, Error>
where
    S: UserStore,
{
    let no_account = || Error::unauthorized("No active account found with the given credentials");

    let email = normalize_email(&form.email);

    let user = storage
        .find_single_user_by_email(&email)
        .await?
        .filter(|user| user.is_active)
        .ok_or_else(no_account)?;

    if !password::verify(&user.hashed_password, &form.password) {
        return Err(no_account());
    }

    tracing::debug!("Tokens obtained by {}", user.id);

    Ok(Success::ok(generate_token_pair(&jwt_keys, &user)?))
}

/// Refresh form
#[derive(Debug, Deserialize)]
pub struct RefreshForm {
    refresh: String,
}

/// Refresh response
#[derive(Debug, Serialize)]
pub struct RefreshResponse {
    access: String,
}

/// Exchange a refresh token for a new access token
pub async fn refresh<S>(
    Extension(storage): Extension<S>,
    Extension(jwt_keys): Extension<JwtKeys>,
    Form(form): Form<RefreshForm>,
) -> Result<Success<RefreshResponse>, Error>
where
    S: UserStore,
{
    let claims = decode_token(&jwt_keys, &form.refresh)?;

    if claims.token_type != TokenType::Refresh {
        return Err(Error::unauthorized(INVALID_TOKEN).with_description("Not a refresh token"));
    }

    let user = storage
        .find_single_user_by_id(&claims.sub)
        .await?
        .filter(|user| user.is_active && user.session_id == claims.jti)
        .ok_or_else(|| Error::unauthorized(INVALID_TOKEN).with_description("Session expired"))?;

    Ok(Success::ok(RefreshResponse {
        access: generate_token(&jwt_keys, &user, TokenType::Access)?,
    }))
}

/// Verify form
#[derive(Debug, Deserialize)]
pub struct VerifyForm {
    token: String,
}

/// Empty response of a valid token
#[derive(Debug, Serialize)]
pub struct Verified {}

/// Check the signature and expiry of a token, of any type
pub async fn verify(
    Extension(jwt_keys): Extension<JwtKeys>,
    Form(form): Form<VerifyForm>,
) -> Result<Success<Verified>, Error> {
    decode_token(&jwt_keys, &form.token)?;

    Ok(Success::ok(Verified {}))
}

/// Register form
#[derive(Debug, Deserialize)]
pub struct RegisterForm {
    email: String,
    password: String,
    password_confirm: String,
    #[serde(default)]
    name: String,
}

/// Register response
#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    email: String,
}

/// Register a new user
///
/// Nothing is stored unless every check passes
pub async fn register<S>(
    Extension(storage): Extension<S>,
    Form(form): Form<RegisterForm>,
) -> Result<Success<RegisterResponse>, Error>
where
    S: UserStore,
{
    let email = normalize_email(&form.email);

    if email.is_empty() {
        return Err(Error::bad_request("The given email must be set"));
    }

    if storage.find_single_user_by_email(&email).await?.is_some() {
        return Err(Error::bad_request("Email already exists"));
    }

    if form.password != form.password_confirm {
        return Err(Error::bad_request(
            "Password and confirm password must be the same",
        ));
    }

    let hashed_password = password::hash(&form.password).map_err(Error::internal_server_error)?;

    let user = User::new(&email, form.name.trim(), &hashed_password);

    storage.create_user(&user).await.map_err(|err| match err {
        // lost a race with another registration of the same email
        crate::storage::Error::Conflict(_) => Error::bad_request("Email already exists"),
        err => err.into(),
    })?;

    tracing::debug!("User {} registered", user.id);

    Ok(Success::ok(RegisterResponse { email: user.email }))
}
