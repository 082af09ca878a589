//! User API management

use axum::Extension;
use serde::Serialize;
use uuid::Uuid;

use crate::storage::UserStore;

use super::CurrentUser;
use super::Error;
use super::Message;
use super::Success;

/// The user response information
///
/// A subset of all the information, ready to be serialized for the outside world
#[derive(Debug, Serialize)]
pub struct UserResponse {
    id: Uuid,
    email: String,
    name: String,
}

/// Get the current user
pub async fn me<S>(current_user: CurrentUser<S>) -> Success<UserResponse>
where
    S: UserStore,
{
    Success::ok(UserResponse {
        id: current_user.id,
        email: current_user.email.clone(),
        name: current_user.name.clone(),
    })
}

/// Soft-delete the current user
///
/// Their notebooks and notes stay where they are
pub async fn delete_me<S>(
    current_user: CurrentUser<S>,
    Extension(storage): Extension<S>,
) -> Result<Success<Message>, Error>
where
    S: UserStore,
{
    let user = storage.delete_user(&current_user).await?;

    tracing::debug!("User {} deleted", user.id);

    Ok(Success::ok(Message::success()))
}
