//! All things related to the storage of users, notebooks and notes
//!
//! The storage handle is created once by the entry point and passed to every handler, there is no
//! global connection state.

use std::future::Future;

use thiserror::Error;
use uuid::Uuid;

use crate::audit::Entity;
use crate::notebooks::Notebook;
use crate::notes::Note;
use crate::users::User;

#[cfg_attr(feature = "postgres", allow(unused_imports))]
pub use memory::Memory;
#[cfg(feature = "postgres")]
pub use postgres::Postgres;

#[cfg_attr(feature = "postgres", allow(dead_code))]
mod memory;
#[cfg(feature = "postgres")]
mod postgres;

/// Setup the storage
#[cfg(not(feature = "postgres"))]
#[allow(clippy::unused_async)]
pub async fn setup() -> anyhow::Result<Memory> {
    tracing::info!("Using in-memory storage, data is lost on shutdown");

    Ok(Memory::new())
}

/// Setup the storage
#[cfg(feature = "postgres")]
pub async fn setup() -> anyhow::Result<Postgres> {
    Postgres::new().await
}

/// Storage errors
#[derive(Debug, Error)]
pub enum Error {
    /// A connection error with the storage
    #[error("Connection error: {0}")]
    Connection(String),

    /// A unique value is already taken
    #[error("Conflict: {0}")]
    Conflict(String),

    /// A reference to a row that does not exist
    #[error("Invalid reference: {0}")]
    InvalidReference(String),
}

/// Result type for all storage interactions
pub type Result<T> = core::result::Result<T, Error>;

/// Storage of users
pub trait UserStore: Clone + Send + Sync + 'static {
    /// Finds a single user by its email address
    ///
    /// Respects the soft-delete
    fn find_single_user_by_email(
        &self,
        email: &str,
    ) -> impl Future<Output = Result<Option<User>>> + Send;

    /// Finds a single user by its ID
    ///
    /// Respects the soft-delete
    fn find_single_user_by_id(&self, id: &Uuid) -> impl Future<Output = Result<Option<User>>> + Send;

    /// Create a single user
    ///
    /// Fails with [`Error::Conflict`] when the email is used by another user that is not deleted
    fn create_user(&self, user: &User) -> impl Future<Output = Result<()>> + Send;

    /// Soft-delete a user
    fn delete_user(&self, user: &User) -> impl Future<Output = Result<User>> + Send;
}

/// Storage of a single kind of entity
///
/// Lookups respect the soft-delete, there is no way around it.
pub trait Store<E: Entity>: Clone + Send + Sync + 'static {
    /// Find all entities created by `owner` that pass `filter`, newest first
    fn find_all_by_owner(
        &self,
        owner: &Uuid,
        filter: &E::Filter,
    ) -> impl Future<Output = Result<Vec<E>>> + Send;

    /// Find a single entity by ID
    fn find_single_by_id(&self, id: &Uuid) -> impl Future<Output = Result<Option<E>>> + Send;

    /// Persist a newly created entity
    fn insert(&self, entity: &E) -> impl Future<Output = Result<()>> + Send;

    /// Persist all fields of an existing entity
    fn save(&self, entity: &E) -> impl Future<Output = Result<()>> + Send;

    /// Lock an entity, change it with `apply` and save it
    ///
    /// Nobody else can change the entity between the read and the write. `None` when the entity
    /// does not exist.
    fn update_exclusive<F>(
        &self,
        id: &Uuid,
        apply: F,
    ) -> impl Future<Output = Result<Option<E>>> + Send
    where
        F: FnOnce(&mut E) + Send;
}

/// Storage with all supported operations
pub trait Storage: UserStore + Store<Notebook> + Store<Note> {}

impl<T> Storage for T where T: UserStore + Store<Notebook> + Store<Note> {}
