//! All API endpoint setup

use axum::Json;
use axum::Router;
use axum::routing::get;
use axum::routing::patch;
use axum::routing::post;
use serde_json::Value;
use serde_json::json;

pub use current_user::CurrentUser;
pub use current_user::JwtKeys;
pub use request::Form;
pub use request::PathParameters;
pub use request::QueryParameters;
pub use response::Error;
pub use response::Message;
pub use response::Success;

use crate::notebooks::Notebook;
use crate::notes::Note;
use crate::storage::Storage;

mod auth;
mod crud;
mod current_user;
mod notebooks;
mod notes;
mod request;
mod response;
mod users;

/// Get the Axum router for all API routes
pub fn router<S: Storage>() -> Router {
    Router::new()
        .route("/auth/obtain", post(auth::obtain::<S>))
        .route("/auth/refresh", post(auth::refresh::<S>))
        .route("/auth/verify", post(auth::verify))
        .route("/auth/register", post(auth::register::<S>))
        .route("/users/me", get(users::me::<S>).delete(users::delete_me::<S>))
        .route(
            "/notebooks",
            get(crud::list::<Notebook, S>).post(crud::create::<Notebook, S>),
        )
        .route(
            "/notebooks/{notebook}",
            get(crud::single::<Notebook, S>)
                .put(crud::update::<Notebook, S>)
                .delete(crud::delete::<Notebook, S>),
        )
        .route(
            "/notes",
            get(crud::list::<Note, S>).post(crud::create::<Note, S>),
        )
        .route(
            "/notes/{note}",
            get(crud::single::<Note, S>)
                .put(crud::update::<Note, S>)
                .patch(notes::patch::<S>)
                .delete(crud::delete::<Note, S>),
        )
        .route(
            "/notes/set_note_book_none/{note}",
            patch(notes::set_note_book_none::<S>),
        )
        .route("/health", get(health))
}

/// Health check, does not touch the storage
async fn health() -> Json<Value> {
    Json(json!({ "status": "healthy" }))
}

/// Fallback for unknown routes
pub async fn not_found() -> Error {
    Error::not_found("Not Found")
}
