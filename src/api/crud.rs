//! Generic CRUD endpoints
//!
//! Written once against [`Resource`], registered per entity with a turbofish:
//! `get(crud::list::<Notebook, S>)`.

use axum::Extension;
use serde::Serialize;
use serde::de::DeserializeOwned;
use uuid::Uuid;

use crate::audit::Entity;
use crate::storage::Store;
use crate::storage::UserStore;

use super::CurrentUser;
use super::Error;
use super::Form;
use super::Message;
use super::PathParameters;
use super::QueryParameters;
use super::Success;

/// An entity served by the CRUD endpoints
pub trait Resource: Entity {
    /// Body of create and update requests
    type Body: DeserializeOwned + Send;

    /// Query parameters of the list request
    type Query: DeserializeOwned + Send;

    /// What the outside world gets to see
    type Response: Serialize;

    /// Name used in the logs
    const NAME: &'static str;

    /// Message for unknown or deleted IDs
    const NOT_FOUND: &'static str;

    /// Validate the body and turn it into the entity fields
    fn fields(body: Self::Body) -> Result<Self::Fields, Error>;

    /// Validate the query and turn it into a filter
    fn filter(query: Self::Query) -> Result<Self::Filter, Error>;

    fn to_response(&self) -> Self::Response;
}

/// Find an entity or fail with Not Found
pub async fn find<E, S>(storage: &S, id: &Uuid) -> Result<E, Error>
where
    E: Resource,
    S: Store<E>,
{
    <S as Store<E>>::find_single_by_id(storage, id)
        .await?
        .ok_or_else(|| Error::not_found(E::NOT_FOUND))
}

/// List all entities of the current user, newest first
pub async fn list<E, S>(
    current_user: CurrentUser<S>,
    Extension(storage): Extension<S>,
    QueryParameters(query): QueryParameters<E::Query>,
) -> Result<Success<Vec<E::Response>>, Error>
where
    E: Resource,
    S: Store<E> + UserStore,
{
    let filter = E::filter(query)?;

    let entities =
        <S as Store<E>>::find_all_by_owner(&storage, &current_user.id, &filter).await?;

    Ok(Success::ok(
        entities.iter().map(E::to_response).collect(),
    ))
}

/// Get a single entity
///
/// Any existing entity is returned, regardless of its owner
pub async fn single<E, S>(
    _current_user: CurrentUser<S>,
    Extension(storage): Extension<S>,
    PathParameters(id): PathParameters<Uuid>,
) -> Result<Success<E::Response>, Error>
where
    E: Resource,
    S: Store<E> + UserStore,
{
    let entity = find::<E, S>(&storage, &id).await?;

    Ok(Success::ok(entity.to_response()))
}

/// Create an entity owned by the current user
pub async fn create<E, S>(
    current_user: CurrentUser<S>,
    Extension(storage): Extension<S>,
    Form(body): Form<E::Body>,
) -> Result<Success<E::Response>, Error>
where
    E: Resource,
    S: Store<E> + UserStore,
{
    let entity = E::create(&current_user, E::fields(body)?);

    <S as Store<E>>::insert(&storage, &entity).await?;

    tracing::debug!("{} {} created by {}", E::NAME, entity.id(), current_user.id);

    Ok(Success::ok(entity.to_response()))
}

/// Overwrite all fields of an entity
pub async fn update<E, S>(
    current_user: CurrentUser<S>,
    Extension(storage): Extension<S>,
    PathParameters(id): PathParameters<Uuid>,
    Form(body): Form<E::Body>,
) -> Result<Success<E::Response>, Error>
where
    E: Resource,
    S: Store<E> + UserStore,
{
    let fields = E::fields(body)?;

    let entity = <S as Store<E>>::update_exclusive(&storage, &id, |entity| {
        entity.save(&current_user, fields);
    })
    .await?
    .ok_or_else(|| Error::not_found(E::NOT_FOUND))?;

    tracing::debug!("{} {id} updated by {}", E::NAME, current_user.id);

    Ok(Success::ok(entity.to_response()))
}

/// Soft-delete an entity
pub async fn delete<E, S>(
    current_user: CurrentUser<S>,
    Extension(storage): Extension<S>,
    PathParameters(id): PathParameters<Uuid>,
) -> Result<Success<Message>, Error>
where
    E: Resource,
    S: Store<E> + UserStore,
{
    let mut entity = find::<E, S>(&storage, &id).await?;

    entity.delete(&current_user);

    <S as Store<E>>::save(&storage, &entity).await?;

    tracing::debug!("{} {id} deleted by {}", E::NAME, current_user.id);

    Ok(Success::ok(Message::success()))
}
