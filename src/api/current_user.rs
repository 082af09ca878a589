//! Current user service
//!
//! Get the current user from the request based on the Authorization header

use std::marker::PhantomData;
use std::ops::Deref;
use std::sync::Arc;

use axum::Extension;
use axum::RequestPartsExt;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum_extra::TypedHeader;
use axum_extra::headers::Authorization;
use axum_extra::headers::authorization::Bearer;
use jsonwebtoken::DecodingKey;
use jsonwebtoken::EncodingKey;
use serde::Deserialize;
use serde::Serialize;
use uuid::Uuid;

use crate::api::Error;
use crate::storage::UserStore;
use crate::users::User;

/// Message for every token that does not authenticate
pub const INVALID_TOKEN: &str = "Given token not valid for any token type";

/// The keys used for encoding/decoding JWT tokens, with the lifetime of the tokens
#[derive(Clone)]
pub struct JwtKeys {
    /// The encoding key
    encoding: EncodingKey,

    /// The decoding key
    decoding: DecodingKey,

    /// Lifetime of access tokens, in seconds
    access_lifetime: i64,

    /// Lifetime of refresh tokens, in seconds
    refresh_lifetime: i64,
}

impl JwtKeys {
    /// Longest lifetime a token can have, ten years in seconds
    pub const MAX_LIFETIME: i64 = 10 * 365 * 86_400;

    /// Can tokens be issued with this lifetime, in seconds?
    pub fn is_valid_lifetime(lifetime: i64) -> bool {
        (1..=Self::MAX_LIFETIME).contains(&lifetime)
    }

    /// Create new encoding/decoding keys, derived from a secret
    pub fn new(secret: &[u8], access_lifetime: i64, refresh_lifetime: i64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            access_lifetime,
            refresh_lifetime,
        }
    }
}

/// What a token can be used for
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    /// Authenticates API calls
    Access,

    /// Only exchanges for a new access token
    Refresh,
}

/// The JWT claims to identifies a user
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Claims {
    /// The user ID
    pub sub: Uuid,

    /// Issued at, as UNIX timestamp
    pub iat: i64,

    /// Expires at, as UNIX timestamp
    pub exp: i64,

    /// A sessions ID, used to expire/invalidate tokens before the expiration date
    pub jti: Uuid,

    /// Access or refresh
    pub token_type: TokenType,
}

/// Access and refresh token served to the user
#[derive(Debug, Serialize)]
pub struct TokenPair {
    pub access: String,
    pub refresh: String,
}

/// Generate a signed token of the given type for a user
pub fn generate_token(
    jwt_keys: &JwtKeys,
    user: &User,
    token_type: TokenType,
) -> Result<String, Error> {
    use jsonwebtoken::Header;
    use jsonwebtoken::encode;

    let lifetime = match token_type {
        TokenType::Access => jwt_keys.access_lifetime,
        TokenType::Refresh => jwt_keys.refresh_lifetime,
    };

    let now = chrono::Utc::now().timestamp();
    let exp = now
        .checked_add(lifetime)
        .ok_or_else(|| Error::internal_server_error("Token expiry is out of range"))?;

    let claims = Claims {
        sub: user.id,
        iat: now,
        exp,
        jti: user.session_id,
        token_type,
    };

    encode(&Header::default(), &claims, &jwt_keys.encoding).map_err(Error::internal_server_error)
}

/// Generate an access and refresh token for a user
pub fn generate_token_pair(jwt_keys: &JwtKeys, user: &User) -> Result<TokenPair, Error> {
    Ok(TokenPair {
        access: generate_token(jwt_keys, user, TokenType::Access)?,
        refresh: generate_token(jwt_keys, user, TokenType::Refresh)?,
    })
}

/// Decode a token, checking its signature and expiry
pub fn decode_token(jwt_keys: &JwtKeys, token: &str) -> Result<Claims, Error> {
    use jsonwebtoken::Validation;
    use jsonwebtoken::decode;

    decode::<Claims>(token, &jwt_keys.decoding, &Validation::default())
        .map(|token_data| token_data.claims)
        .map_err(|err| Error::unauthorized(INVALID_TOKEN).with_description(err))
}

/// Current user service
///
/// Only an access token of an existing user, with a matching session, gets through
pub struct CurrentUser<S> {
    /// The actual user
    user: Arc<User>,

    storage: PhantomData<fn() -> S>,
}

impl<S> CurrentUser<S> {
    /// Create the current user from a user
    fn new(user: User) -> Self {
        Self {
            user: Arc::new(user),
            storage: PhantomData,
        }
    }
}

impl<S> Clone for CurrentUser<S> {
    fn clone(&self) -> Self {
        Self {
            user: Arc::clone(&self.user),
            storage: PhantomData,
        }
    }
}

impl<S> Deref for CurrentUser<S> {
    type Target = User;

    fn deref(&self) -> &Self::Target {
        &self.user
    }
}

impl<B, S> FromRequestParts<B> for CurrentUser<S>
where
    B: Send + Sync,
    S: UserStore,
{
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, state: &B) -> Result<Self, Self::Rejection> {
        // Extract the token from the authorization header
        let TypedHeader(Authorization(bearer)) =
            TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state)
                .await
                .map_err(|_| Error::unauthorized("Authentication credentials were not provided"))?;

        let Extension(jwt_keys) = parts
            .extract::<Extension<JwtKeys>>()
            .await
            .map_err(|_| Error::internal_server_error("Could not get JWT keys"))?;

        let Extension(storage) = parts
            .extract::<Extension<S>>()
            .await
            .map_err(|_| Error::internal_server_error("Could not get storage"))?;

        let claims = decode_token(&jwt_keys, bearer.token())?;

        if claims.token_type != TokenType::Access {
            return Err(Error::unauthorized(INVALID_TOKEN).with_description("Not an access token"));
        }

        let Some(user) = storage.find_single_user_by_id(&claims.sub).await? else {
            return Err(Error::unauthorized("User not found"));
        };

        // mechanism to invalidate JWT tokens
        if claims.jti != user.session_id || !user.is_active {
            return Err(Error::unauthorized(INVALID_TOKEN).with_description("Session expired"));
        }

        Ok(CurrentUser::new(user))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_pair_types() {
        let jwt_keys = JwtKeys::new(b"secret", 60, 120);
        let user = User::new("a@x.com", "", "hashed");

        let token_pair = generate_token_pair(&jwt_keys, &user).unwrap();

        let access = decode_token(&jwt_keys, &token_pair.access).unwrap();
        assert_eq!(TokenType::Access, access.token_type);
        assert_eq!(user.id, access.sub);
        assert_eq!(user.session_id, access.jti);
        assert_eq!(60, access.exp - access.iat);

        let refresh = decode_token(&jwt_keys, &token_pair.refresh).unwrap();
        assert_eq!(TokenType::Refresh, refresh.token_type);
        assert_eq!(120, refresh.exp - refresh.iat);
    }

    #[test]
    fn test_expired_token() {
        // well beyond the default leeway
        let jwt_keys = JwtKeys::new(b"secret", -600, -600);
        let user = User::new("a@x.com", "", "hashed");

        let token = generate_token(&jwt_keys, &user, TokenType::Access).unwrap();

        assert!(decode_token(&jwt_keys, &token).is_err());
    }

    #[test]
    fn test_lifetime_overflow_is_an_error() {
        let jwt_keys = JwtKeys::new(b"secret", i64::MAX, i64::MAX);
        let user = User::new("a@x.com", "", "hashed");

        let err = generate_token(&jwt_keys, &user, TokenType::Access).unwrap_err();
        assert_eq!(
            axum::http::StatusCode::INTERNAL_SERVER_ERROR,
            err.status_code()
        );
        assert!(generate_token_pair(&jwt_keys, &user).is_err());
    }

    #[test]
    fn test_valid_lifetimes() {
        assert!(JwtKeys::is_valid_lifetime(1));
        assert!(JwtKeys::is_valid_lifetime(86_400));
        assert!(JwtKeys::is_valid_lifetime(JwtKeys::MAX_LIFETIME));
        assert!(!JwtKeys::is_valid_lifetime(0));
        assert!(!JwtKeys::is_valid_lifetime(-600));
        assert!(!JwtKeys::is_valid_lifetime(JwtKeys::MAX_LIFETIME + 1));
        assert!(!JwtKeys::is_valid_lifetime(i64::MAX));
    }

    #[test]
    fn test_other_secret() {
        let jwt_keys = JwtKeys::new(b"secret", 60, 60);
        let other_jwt_keys = JwtKeys::new(b"other secret", 60, 60);
        let user = User::new("a@x.com", "", "hashed");

        let token = generate_token(&jwt_keys, &user, TokenType::Access).unwrap();

        assert!(decode_token(&other_jwt_keys, &token).is_err());
    }
}
