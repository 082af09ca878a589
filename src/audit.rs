//! Audit bookkeeping shared by every persisted entity
//!
//! Entities embed an [`Audit`] and implement [`Entity`], which provides the `create`, `save` and
//! `delete` lifecycle operations. These only change the entity in memory, persisting is up to the
//! [`Store`](crate::storage::Store) the caller passes it to.

use chrono::NaiveDateTime;
use chrono::Utc;
use uuid::Uuid;

use crate::users::User;

/// Lifecycle fields of an entity
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Audit {
    /// Creation date
    pub created_at: NaiveDateTime,

    /// The user that created the entity, also its owner
    pub created_by: Uuid,

    /// Last updated at
    pub updated_at: NaiveDateTime,

    /// The user that last saved the entity
    pub updated_by: Uuid,

    /// Is the entity soft-deleted?
    pub is_deleted: bool,

    /// Soft-deleted at
    pub deleted_at: Option<NaiveDateTime>,

    /// The user that soft-deleted the entity
    pub deleted_by: Option<Uuid>,
}

impl Audit {
    /// Audit fields for a new entity created by `actor`
    pub fn new(actor: &User) -> Self {
        let now = now();

        Self {
            created_at: now,
            created_by: actor.id,
            updated_at: now,
            updated_by: actor.id,
            is_deleted: false,
            deleted_at: None,
            deleted_by: None,
        }
    }

    /// Register a save by `actor`
    pub fn touch(&mut self, actor: &User) {
        self.updated_at = now();
        self.updated_by = actor.id;
    }

    /// Register a soft-delete by `actor`
    pub fn mark_deleted(&mut self, actor: &User) {
        self.is_deleted = true;
        self.deleted_at = Some(now());
        self.deleted_by = Some(actor.id);
    }
}

/// Current time, the way it is stored
pub fn now() -> NaiveDateTime {
    Utc::now().naive_utc()
}

/// A persisted entity with audit fields
pub trait Entity: Clone + Send + Sync + 'static {
    /// The entity specific fields, overwritten as a whole by `create` and `save`
    type Fields: Send;

    /// Narrows down the entities of an owner
    type Filter: Send + Sync;

    /// Build an entity from its parts
    fn build(id: Uuid, fields: Self::Fields, audit: Audit) -> Self;

    /// Overwrite the entity specific fields
    fn overwrite(&mut self, fields: Self::Fields);

    /// Does the entity pass the filter?
    fn matches(&self, filter: &Self::Filter) -> bool;

    fn id(&self) -> Uuid;

    fn audit(&self) -> &Audit;

    fn audit_mut(&mut self) -> &mut Audit;

    /// Create a new entity on behalf of `actor`, with a fresh ID
    fn create(actor: &User, fields: Self::Fields) -> Self {
        Self::build(Uuid::new_v4(), fields, Audit::new(actor))
    }

    /// Overwrite the fields on behalf of `actor`
    ///
    /// Ownership is not checked here, that is up to the caller
    fn save(&mut self, actor: &User, fields: Self::Fields) {
        self.overwrite(fields);
        self.touch(actor);
    }

    /// Register a save by `actor` without changing any fields
    fn touch(&mut self, actor: &User) {
        self.audit_mut().touch(actor);
    }

    /// Soft-delete on behalf of `actor`
    ///
    /// Does not cascade to entities referring to this one
    fn delete(&mut self, actor: &User) {
        self.audit_mut().mark_deleted(actor);
        self.touch(actor);
    }

    fn is_deleted(&self) -> bool {
        self.audit().is_deleted
    }

    fn is_owned_by(&self, user_id: &Uuid) -> bool {
        self.audit().created_by == *user_id
    }
}
