//! Memory storage
//!
//! Will be destroyed on system shutdown

use std::sync::Arc;

use tokio::sync::Mutex;
use uuid::Uuid;

use crate::audit::Entity;
use crate::notebooks::Notebook;
use crate::notes::Note;
use crate::notes::NoteFilter;
use crate::users::User;

use super::Error;
use super::Result;
use super::Store;
use super::UserStore;

/// Rows of a single entity, in insertion order
#[derive(Debug)]
struct Table<E> {
    rows: Arc<Mutex<Vec<E>>>,
}

impl<E> Clone for Table<E> {
    fn clone(&self) -> Self {
        Self {
            rows: Arc::clone(&self.rows),
        }
    }
}

impl<E: Entity> Table<E> {
    fn new() -> Self {
        Self {
            rows: Arc::new(Mutex::new(Vec::new())),
        }
    }

    async fn find_all_by_owner(&self, owner: &Uuid, filter: &E::Filter) -> Vec<E> {
        self.rows
            .lock()
            .await
            .iter()
            .rev()
            .filter(|row| !row.is_deleted() && row.is_owned_by(owner) && row.matches(filter))
            .cloned()
            .collect()
    }

    async fn find_single_by_id(&self, id: &Uuid) -> Option<E> {
        self.rows
            .lock()
            .await
            .iter()
            .find(|row| row.id() == *id && !row.is_deleted())
            .cloned()
    }

    /// Does a row exist, deleted or not?
    async fn contains(&self, id: &Uuid) -> bool {
        self.rows.lock().await.iter().any(|row| row.id() == *id)
    }

    async fn insert(&self, entity: &E) {
        self.rows.lock().await.push(entity.clone());
    }

    async fn save(&self, entity: &E) {
        if let Some(row) = self
            .rows
            .lock()
            .await
            .iter_mut()
            .find(|row| row.id() == entity.id())
        {
            *row = entity.clone();
        }
    }
}

/// An in-memory storage
///
/// Will be destroyed on system shutdown
#[derive(Clone, Debug)]
pub struct Memory {
    /// All users in storage
    users: Arc<Mutex<Vec<User>>>,

    /// All notebooks in storage
    notebooks: Table<Notebook>,

    /// All notes in storage
    notes: Table<Note>,
}

impl Memory {
    /// Create a new empty Memory storage
    pub fn new() -> Self {
        Self {
            users: Arc::new(Mutex::new(Vec::new())),
            notebooks: Table::new(),
            notes: Table::new(),
        }
    }

    /// A note can only refer to a notebook that exists
    async fn check_note_book(&self, note: &Note) -> Result<()> {
        if let Some(note_book_id) = &note.note_book_id {
            if !self.notebooks.contains(note_book_id).await {
                return Err(Error::InvalidReference(format!(
                    "notebook {note_book_id} does not exist"
                )));
            }
        }

        Ok(())
    }

    /// All notes in storage, including the soft-deleted ones
    #[cfg(test)]
    pub async fn all_notes(&self) -> Vec<Note> {
        self.notes.rows.lock().await.clone()
    }

    /// All notebooks in storage, including the soft-deleted ones
    #[cfg(test)]
    pub async fn all_notebooks(&self) -> Vec<Notebook> {
        self.notebooks.rows.lock().await.clone()
    }

    /// All users in storage, including the soft-deleted ones
    #[cfg(test)]
    pub async fn all_users(&self) -> Vec<User> {
        self.users.lock().await.clone()
    }
}

impl UserStore for Memory {
    async fn find_single_user_by_email(&self, email: &str) -> Result<Option<User>> {
        Ok(self
            .users
            .lock()
            .await
            .iter()
            .find(|user| user.email == email && !user.is_deleted)
            .cloned())
    }

    async fn find_single_user_by_id(&self, id: &Uuid) -> Result<Option<User>> {
        Ok(self
            .users
            .lock()
            .await
            .iter()
            .find(|user| &user.id == id && !user.is_deleted)
            .cloned())
    }

    async fn create_user(&self, user: &User) -> Result<()> {
        let mut users = self.users.lock().await;

        if users
            .iter()
            .any(|existing| existing.email == user.email && !existing.is_deleted)
        {
            return Err(Error::Conflict(format!("email {} is taken", user.email)));
        }

        users.push(user.clone());

        Ok(())
    }

    async fn delete_user(&self, user: &User) -> Result<User> {
        let mut users = self.users.lock().await;

        let stored = users
            .iter_mut()
            .find(|stored| stored.id == user.id)
            .ok_or_else(|| Error::InvalidReference(format!("user {} does not exist", user.id)))?;

        stored.delete();

        Ok(stored.clone())
    }
}

impl Store<Notebook> for Memory {
    async fn find_all_by_owner(&self, owner: &Uuid, filter: &()) -> Result<Vec<Notebook>> {
        Ok(self.notebooks.find_all_by_owner(owner, filter).await)
    }

    async fn find_single_by_id(&self, id: &Uuid) -> Result<Option<Notebook>> {
        Ok(self.notebooks.find_single_by_id(id).await)
    }

    async fn insert(&self, notebook: &Notebook) -> Result<()> {
        self.notebooks.insert(notebook).await;

        Ok(())
    }

    async fn save(&self, notebook: &Notebook) -> Result<()> {
        self.notebooks.save(notebook).await;

        Ok(())
    }

    async fn update_exclusive<F>(&self, id: &Uuid, apply: F) -> Result<Option<Notebook>>
    where
        F: FnOnce(&mut Notebook) + Send,
    {
        let mut notebooks = self.notebooks.rows.lock().await;

        Ok(notebooks
            .iter_mut()
            .find(|notebook| notebook.id == *id && !notebook.is_deleted())
            .map(|notebook| {
                apply(notebook);

                notebook.clone()
            }))
    }
}

impl Store<Note> for Memory {
    async fn find_all_by_owner(
        &self,
        owner: &Uuid,
        filter: &NoteFilter,
    ) -> Result<Vec<Note>> {
        Ok(self.notes.find_all_by_owner(owner, filter).await)
    }

    async fn find_single_by_id(&self, id: &Uuid) -> Result<Option<Note>> {
        Ok(self.notes.find_single_by_id(id).await)
    }

    async fn insert(&self, note: &Note) -> Result<()> {
        self.check_note_book(note).await?;
        self.notes.insert(note).await;

        Ok(())
    }

    async fn save(&self, note: &Note) -> Result<()> {
        self.check_note_book(note).await?;
        self.notes.save(note).await;

        Ok(())
    }

    async fn update_exclusive<F>(&self, id: &Uuid, apply: F) -> Result<Option<Note>>
    where
        F: FnOnce(&mut Note) + Send,
    {
        let mut notes = self.notes.rows.lock().await;

        let Some(row) = notes
            .iter_mut()
            .find(|note| note.id == *id && !note.is_deleted())
        else {
            return Ok(None);
        };

        // only write back once the reference is known to be valid
        let mut note = row.clone();
        apply(&mut note);
        self.check_note_book(&note).await?;
        *row = note.clone();

        Ok(Some(note))
    }
}
