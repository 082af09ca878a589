//! Postgres storage
//!
//! Queries are checked at runtime, so the crate builds without a database around.

use std::time::Duration;

use anyhow::Context;
use chrono::NaiveDateTime;
use sqlx::PgPool;
use sqlx::Postgres as Db;
use sqlx::QueryBuilder;
use sqlx::migrate::Migrator;
use sqlx::postgres::PgExecutor;
use sqlx::postgres::PgPoolOptions;
use uuid::Uuid;

use crate::audit::Audit;
use crate::audit::Entity;
use crate::notebooks::Notebook;
use crate::notes::Note;
use crate::notes::NoteFilter;
use crate::notes::NoteState;
use crate::notes::OtherUserPermission;
use crate::users::User;

use super::Error;
use super::Result;
use super::Store;
use super::UserStore;

/// Migrator to run migrations on startup
static MIGRATOR: Migrator = sqlx::migrate!();

const USER_COLUMNS: &str = "id, session_id, email, name, hashed_password, is_active, \
    is_deleted, created_at, updated_at, deleted_at";

const AUDIT_COLUMNS: &str =
    "created_at, created_by, updated_at, updated_by, is_deleted, deleted_at, deleted_by";

/// Postgres type for the note state
#[derive(Clone, Copy, PartialEq, Debug, sqlx::Type)]
#[sqlx(type_name = "note_state_type")]
#[sqlx(rename_all = "kebab-case")]
enum NoteStateType {
    /// Active
    Active,

    /// Archived
    Archived,

    /// Trashed
    Trashed,
}

impl NoteStateType {
    /// Create note state type from note state
    fn from_state(state: NoteState) -> Self {
        match state {
            NoteState::Active => Self::Active,
            NoteState::Archived => Self::Archived,
            NoteState::Trashed => Self::Trashed,
        }
    }

    /// Create note state from note state type
    fn to_state(self) -> NoteState {
        match self {
            Self::Active => NoteState::Active,
            Self::Archived => NoteState::Archived,
            Self::Trashed => NoteState::Trashed,
        }
    }
}

/// Postgres storage
#[derive(Clone)]
pub struct Postgres {
    /// Pool of connections
    connection_pool: PgPool,
}

impl Postgres {
    /// Create Postgres storage
    ///
    /// Use the `DATABASE_URL` environment variable
    ///
    /// Migrations will be run
    pub async fn new() -> anyhow::Result<Self> {
        let database_connection_string =
            std::env::var("DATABASE_URL").context("`DATABASE_URL` is not set")?;

        let connection_pool = PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&database_connection_string)
            .await
            .context("Could not connect to the database")?;

        Self::new_with_pool(connection_pool).await
    }

    /// Create Postgres storage with existing pool
    ///
    /// Migrations will be run
    pub async fn new_with_pool(connection_pool: PgPool) -> anyhow::Result<Self> {
        MIGRATOR
            .run(&connection_pool)
            .await
            .context("Migrations could not run")?;

        tracing::info!("Connected to Postgres, migrations are up to date");

        Ok(Self { connection_pool })
    }
}

/// Postgres version of user
#[derive(sqlx::FromRow)]
struct PostgresUser {
    id: Uuid,
    session_id: Uuid,
    email: String,
    name: String,
    hashed_password: String,
    is_active: bool,
    is_deleted: bool,
    created_at: NaiveDateTime,
    updated_at: NaiveDateTime,
    deleted_at: Option<NaiveDateTime>,
}

impl User {
    /// Create user from postgres version
    fn from_postgres_user(user: PostgresUser) -> Self {
        Self {
            id: user.id,
            session_id: user.session_id,
            email: user.email,
            name: user.name,
            hashed_password: user.hashed_password,
            is_active: user.is_active,
            is_deleted: user.is_deleted,
            created_at: user.created_at,
            updated_at: user.updated_at,
            deleted_at: user.deleted_at,
        }
    }
}

/// Postgres version of the audit columns, flattened into the entity rows
#[derive(sqlx::FromRow)]
struct PostgresAudit {
    created_at: NaiveDateTime,
    created_by: Uuid,
    updated_at: NaiveDateTime,
    updated_by: Uuid,
    is_deleted: bool,
    deleted_at: Option<NaiveDateTime>,
    deleted_by: Option<Uuid>,
}

impl Audit {
    /// Create audit fields from postgres version
    fn from_postgres_audit(audit: PostgresAudit) -> Self {
        Self {
            created_at: audit.created_at,
            created_by: audit.created_by,
            updated_at: audit.updated_at,
            updated_by: audit.updated_by,
            is_deleted: audit.is_deleted,
            deleted_at: audit.deleted_at,
            deleted_by: audit.deleted_by,
        }
    }
}

/// Postgres version of notebook
#[derive(sqlx::FromRow)]
struct PostgresNotebook {
    id: Uuid,
    title: String,
    #[sqlx(flatten)]
    audit: PostgresAudit,
}

impl Notebook {
    /// Create notebook from postgres version
    fn from_postgres_notebook(notebook: PostgresNotebook) -> Self {
        Self {
            id: notebook.id,
            title: notebook.title,
            audit: Audit::from_postgres_audit(notebook.audit),
        }
    }
}

/// Postgres version of note
#[derive(sqlx::FromRow)]
struct PostgresNote {
    id: Uuid,
    title: String,
    content: String,
    state: NoteStateType,
    note_book_id: Option<Uuid>,
    other_user_permission: i16,
    #[sqlx(flatten)]
    audit: PostgresAudit,
}

impl Note {
    /// Create note from postgres version
    fn from_postgres_note(note: PostgresNote) -> Result<Self> {
        let other_user_permission = OtherUserPermission::try_from(note.other_user_permission)
            .map_err(Error::Connection)?;

        Ok(Self {
            id: note.id,
            title: note.title,
            content: note.content,
            state: note.state.to_state(),
            note_book_id: note.note_book_id,
            other_user_permission,
            audit: Audit::from_postgres_audit(note.audit),
        })
    }
}

impl UserStore for Postgres {
    async fn find_single_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, PostgresUser>(&format!(
            r#"
            SELECT {USER_COLUMNS}
            FROM users
            WHERE is_deleted = FALSE
                AND email = $1
            LIMIT 1
            "#
        ))
        .bind(email)
        .fetch_optional(&self.connection_pool)
        .await
        .map_err(storage_error)?;

        Ok(user.map(User::from_postgres_user))
    }

    async fn find_single_user_by_id(&self, id: &Uuid) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, PostgresUser>(&format!(
            r#"
            SELECT {USER_COLUMNS}
            FROM users
            WHERE is_deleted = FALSE
                AND id = $1
            LIMIT 1
            "#
        ))
        .bind(id)
        .fetch_optional(&self.connection_pool)
        .await
        .map_err(storage_error)?;

        Ok(user.map(User::from_postgres_user))
    }

    async fn create_user(&self, user: &User) -> Result<()> {
        sqlx::query(&format!(
            r#"
            INSERT INTO users ({USER_COLUMNS})
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#
        ))
        .bind(user.id)
        .bind(user.session_id)
        .bind(&user.email)
        .bind(&user.name)
        .bind(&user.hashed_password)
        .bind(user.is_active)
        .bind(user.is_deleted)
        .bind(user.created_at)
        .bind(user.updated_at)
        .bind(user.deleted_at)
        .execute(&self.connection_pool)
        .await
        .map_err(storage_error)?;

        Ok(())
    }

    async fn delete_user(&self, user: &User) -> Result<User> {
        let user = sqlx::query_as::<_, PostgresUser>(&format!(
            r#"
            UPDATE users
            SET is_active = FALSE,
                is_deleted = TRUE,
                deleted_at = CURRENT_TIMESTAMP,
                updated_at = CURRENT_TIMESTAMP
            WHERE id = $1
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(user.id)
        .fetch_one(&self.connection_pool)
        .await
        .map_err(storage_error)?;

        Ok(User::from_postgres_user(user))
    }
}

impl Store<Notebook> for Postgres {
    async fn find_all_by_owner(&self, owner: &Uuid, _filter: &()) -> Result<Vec<Notebook>> {
        let notebooks = sqlx::query_as::<_, PostgresNotebook>(&format!(
            r#"
            SELECT id, title, {AUDIT_COLUMNS}
            FROM notebooks
            WHERE is_deleted = FALSE
                AND created_by = $1
            ORDER BY created_at DESC
            "#
        ))
        .bind(owner)
        .fetch_all(&self.connection_pool)
        .await
        .map_err(storage_error)?;

        Ok(notebooks
            .into_iter()
            .map(Notebook::from_postgres_notebook)
            .collect())
    }

    async fn find_single_by_id(&self, id: &Uuid) -> Result<Option<Notebook>> {
        let notebook = sqlx::query_as::<_, PostgresNotebook>(&format!(
            r#"
            SELECT id, title, {AUDIT_COLUMNS}
            FROM notebooks
            WHERE is_deleted = FALSE
                AND id = $1
            LIMIT 1
            "#
        ))
        .bind(id)
        .fetch_optional(&self.connection_pool)
        .await
        .map_err(storage_error)?;

        Ok(notebook.map(Notebook::from_postgres_notebook))
    }

    async fn insert(&self, notebook: &Notebook) -> Result<()> {
        sqlx::query(&format!(
            r#"
            INSERT INTO notebooks (id, title, {AUDIT_COLUMNS})
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#
        ))
        .bind(notebook.id)
        .bind(&notebook.title)
        .bind(notebook.audit.created_at)
        .bind(notebook.audit.created_by)
        .bind(notebook.audit.updated_at)
        .bind(notebook.audit.updated_by)
        .bind(notebook.audit.is_deleted)
        .bind(notebook.audit.deleted_at)
        .bind(notebook.audit.deleted_by)
        .execute(&self.connection_pool)
        .await
        .map_err(storage_error)?;

        Ok(())
    }

    async fn save(&self, notebook: &Notebook) -> Result<()> {
        save_notebook(&self.connection_pool, notebook).await
    }

    async fn update_exclusive<F>(&self, id: &Uuid, apply: F) -> Result<Option<Notebook>>
    where
        F: FnOnce(&mut Notebook) + Send,
    {
        let mut transaction = self.connection_pool.begin().await.map_err(storage_error)?;

        let notebook = sqlx::query_as::<_, PostgresNotebook>(&format!(
            r#"
            SELECT id, title, {AUDIT_COLUMNS}
            FROM notebooks
            WHERE is_deleted = FALSE
                AND id = $1
            FOR UPDATE
            "#
        ))
        .bind(id)
        .fetch_optional(&mut *transaction)
        .await
        .map_err(storage_error)?;

        // dropping the transaction rolls it back and releases the lock
        let Some(notebook) = notebook else {
            return Ok(None);
        };

        let mut notebook = Notebook::from_postgres_notebook(notebook);
        apply(&mut notebook);

        save_notebook(&mut *transaction, &notebook).await?;

        transaction.commit().await.map_err(storage_error)?;

        Ok(Some(notebook))
    }
}

/// Write all fields of a notebook
async fn save_notebook<'e, E>(executor: E, notebook: &Notebook) -> Result<()>
where
    E: PgExecutor<'e>,
{
    sqlx::query(
        r#"
        UPDATE notebooks
        SET title = $1,
            updated_at = $2,
            updated_by = $3,
            is_deleted = $4,
            deleted_at = $5,
            deleted_by = $6
        WHERE id = $7
        "#,
    )
    .bind(&notebook.title)
    .bind(notebook.audit.updated_at)
    .bind(notebook.audit.updated_by)
    .bind(notebook.audit.is_deleted)
    .bind(notebook.audit.deleted_at)
    .bind(notebook.audit.deleted_by)
    .bind(notebook.id)
    .execute(executor)
    .await
    .map_err(storage_error)?;

    Ok(())
}

impl Store<Note> for Postgres {
    async fn find_all_by_owner(&self, owner: &Uuid, filter: &NoteFilter) -> Result<Vec<Note>> {
        let mut query = QueryBuilder::<Db>::new(format!(
            "SELECT id, title, content, state, note_book_id, other_user_permission, {AUDIT_COLUMNS} \
            FROM notes \
            WHERE is_deleted = FALSE AND created_by = "
        ));
        query.push_bind(*owner);

        match filter {
            NoteFilter::All => {}
            NoteFilter::Archived => {
                query
                    .push(" AND state = ")
                    .push_bind(NoteStateType::Archived);
            }
            NoteFilter::Trashed => {
                query
                    .push(" AND state = ")
                    .push_bind(NoteStateType::Trashed);
            }
            NoteFilter::Notebook(Some(note_book_id)) => {
                query.push(" AND note_book_id = ").push_bind(*note_book_id);
            }
            NoteFilter::Notebook(None) => {
                query.push(" AND note_book_id IS NULL");
            }
        }

        query.push(" ORDER BY created_at DESC");

        let notes = query
            .build_query_as::<PostgresNote>()
            .fetch_all(&self.connection_pool)
            .await
            .map_err(storage_error)?;

        notes.into_iter().map(Note::from_postgres_note).collect()
    }

    async fn find_single_by_id(&self, id: &Uuid) -> Result<Option<Note>> {
        let note = sqlx::query_as::<_, PostgresNote>(&format!(
            r#"
            SELECT id, title, content, state, note_book_id, other_user_permission, {AUDIT_COLUMNS}
            FROM notes
            WHERE is_deleted = FALSE
                AND id = $1
            LIMIT 1
            "#
        ))
        .bind(id)
        .fetch_optional(&self.connection_pool)
        .await
        .map_err(storage_error)?;

        note.map(Note::from_postgres_note).transpose()
    }

    async fn insert(&self, note: &Note) -> Result<()> {
        sqlx::query(&format!(
            r#"
            INSERT INTO notes (
                id, title, content, state, note_book_id, other_user_permission, {AUDIT_COLUMNS}
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            "#
        ))
        .bind(note.id)
        .bind(&note.title)
        .bind(&note.content)
        .bind(NoteStateType::from_state(note.state))
        .bind(note.note_book_id)
        .bind(i16::from(note.other_user_permission))
        .bind(note.audit.created_at)
        .bind(note.audit.created_by)
        .bind(note.audit.updated_at)
        .bind(note.audit.updated_by)
        .bind(note.audit.is_deleted)
        .bind(note.audit.deleted_at)
        .bind(note.audit.deleted_by)
        .execute(&self.connection_pool)
        .await
        .map_err(storage_error)?;

        Ok(())
    }

    async fn save(&self, note: &Note) -> Result<()> {
        save_note(&self.connection_pool, note).await
    }

    async fn update_exclusive<F>(&self, id: &Uuid, apply: F) -> Result<Option<Note>>
    where
        F: FnOnce(&mut Note) + Send,
    {
        let mut transaction = self.connection_pool.begin().await.map_err(storage_error)?;

        let note = sqlx::query_as::<_, PostgresNote>(&format!(
            r#"
            SELECT id, title, content, state, note_book_id, other_user_permission, {AUDIT_COLUMNS}
            FROM notes
            WHERE is_deleted = FALSE
                AND id = $1
            FOR UPDATE
            "#
        ))
        .bind(id)
        .fetch_optional(&mut *transaction)
        .await
        .map_err(storage_error)?;

        let Some(note) = note else {
            return Ok(None);
        };

        let mut note = Note::from_postgres_note(note)?;
        apply(&mut note);

        save_note(&mut *transaction, &note).await?;

        transaction.commit().await.map_err(storage_error)?;

        Ok(Some(note))
    }
}

/// Write all fields of a note
async fn save_note<'e, E>(executor: E, note: &Note) -> Result<()>
where
    E: PgExecutor<'e>,
{
    sqlx::query(
        r#"
        UPDATE notes
        SET title = $1,
            content = $2,
            state = $3,
            note_book_id = $4,
            other_user_permission = $5,
            updated_at = $6,
            updated_by = $7,
            is_deleted = $8,
            deleted_at = $9,
            deleted_by = $10
        WHERE id = $11
        "#,
    )
    .bind(&note.title)
    .bind(&note.content)
    .bind(NoteStateType::from_state(note.state))
    .bind(note.note_book_id)
    .bind(i16::from(note.other_user_permission))
    .bind(note.audit.updated_at)
    .bind(note.audit.updated_by)
    .bind(note.audit.is_deleted)
    .bind(note.audit.deleted_at)
    .bind(note.audit.deleted_by)
    .bind(note.id())
    .execute(executor)
    .await
    .map_err(storage_error)?;

    Ok(())
}

/// Convert `SQLx` errors to storage errors
///
/// Constraint violations are caused by the values given, everything else is a connection error
fn storage_error(err: sqlx::Error) -> Error {
    if let sqlx::Error::Database(database_error) = &err {
        match database_error.kind() {
            sqlx::error::ErrorKind::UniqueViolation => {
                return Error::Conflict(database_error.message().to_string());
            }
            sqlx::error::ErrorKind::ForeignKeyViolation => {
                return Error::InvalidReference(database_error.message().to_string());
            }
            _ => {}
        }
    }

    Error::Connection(err.to_string())
}
