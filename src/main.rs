#![forbid(unsafe_code)]
#![warn(clippy::pedantic)]
// easier to use when using the functions as callback of foreign functions
#![allow(clippy::needless_pass_by_value)]

use std::net::SocketAddr;

use anyhow::Context;
use anyhow::Result;
use axum::Extension;
use axum::Router;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing_subscriber::prelude::*;

use crate::api::JwtKeys;
use crate::api::router;
use crate::storage::Storage;
use crate::storage::setup;
use crate::utils::env_var_or_else;
use crate::utils::parse_env_var_or;

mod api;
mod audit;
mod graceful_shutdown;
mod notebooks;
mod notes;
mod password;
mod storage;
#[cfg(test)]
mod tests;
mod users;
mod utils;

const DEFAULT_RUST_LOG: &str = "quire=debug,tower_http=debug";
const DEFAULT_ADDRESS: &str = "0.0.0.0:8000";

/// One day, in seconds
const DEFAULT_TOKEN_LIFETIME: i64 = 86_400;

#[tokio::main]
async fn main() -> Result<()> {
    setup_environment();
    setup_tracing();

    let app = setup_app().await?;

    let address = setup_address()?;
    let listener = TcpListener::bind(address)
        .await
        .with_context(|| format!("Could not listen on {address}"))?;

    tracing::info!("Listening on {}", address);

    axum::serve(listener, app)
        .with_graceful_shutdown(graceful_shutdown::handler())
        .await?;

    Ok(())
}

/// Create and setup the app with its dependencies
///
/// # Errors
///
/// Will return `Err` if any of its dependencies fail to load:
/// - Storage connection
/// - JWT configuration
pub async fn setup_app() -> Result<Router> {
    let jwt_keys = setup_jwt_keys()?;
    let storage = setup().await?;

    Ok(create_router(storage, jwt_keys))
}

/// Create the router for Quire
fn create_router<S: Storage>(storage: S, jwt_keys: JwtKeys) -> Router {
    Router::new()
        .nest("/api", router::<S>())
        .fallback(api::not_found)
        .layer(TraceLayer::new_for_http())
        .layer(Extension(storage))
        .layer(Extension(jwt_keys))
}

fn setup_environment() {
    dotenvy::dotenv().ok();
}

fn setup_tracing() {
    use tracing_subscriber::EnvFilter;
    use tracing_subscriber::fmt;
    use tracing_subscriber::registry;

    registry()
        .with(EnvFilter::new(env_var_or_else("RUST_LOG", || {
            DEFAULT_RUST_LOG.into()
        })))
        .with(fmt::layer())
        .init();
}

fn setup_jwt_keys() -> Result<JwtKeys> {
    use crate::password::generate;

    let jwt_secret = env_var_or_else("JWT_SECRET", || {
        let jwt_secret = generate();
        tracing::info!("`JWT_SECRET` is not set, generating temporary one: {jwt_secret}");
        jwt_secret
    });

    let access_lifetime = setup_token_lifetime("ACCESS_TOKEN_LIFETIME")?;
    let refresh_lifetime = setup_token_lifetime("REFRESH_TOKEN_LIFETIME")?;

    Ok(JwtKeys::new(
        jwt_secret.as_bytes(),
        access_lifetime,
        refresh_lifetime,
    ))
}

/// Token lifetime in seconds, between one second and [`JwtKeys::MAX_LIFETIME`]
fn setup_token_lifetime(var_name: &'static str) -> Result<i64> {
    let lifetime = parse_env_var_or(var_name, DEFAULT_TOKEN_LIFETIME)?;

    anyhow::ensure!(
        JwtKeys::is_valid_lifetime(lifetime),
        "`{var_name}` must be between 1 and {} seconds, got {lifetime}",
        JwtKeys::MAX_LIFETIME
    );

    Ok(lifetime)
}

fn setup_address() -> Result<SocketAddr> {
    let mut address =
        env_var_or_else("ADDRESS", || String::from(DEFAULT_ADDRESS)).parse::<SocketAddr>()?;

    // optional override of just the port
    let port = parse_env_var_or("PORT", address.port())?;
    address.set_port(port);

    Ok(address)
}
