use chrono::naive::NaiveDateTime;
use uuid::Uuid;

use crate::audit::now;

/// A user, the actor behind every audited change
#[derive(Clone, Debug)]
pub struct User {
    pub id: Uuid,
    /// Rotating it invalidates all tokens of the user
    pub session_id: Uuid,
    pub email: String,
    pub name: String,
    pub hashed_password: String,
    pub is_active: bool,
    pub is_deleted: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
    pub deleted_at: Option<NaiveDateTime>,
}

impl User {
    /// A new active user with a fresh ID and session
    pub fn new(email: &str, name: &str, hashed_password: &str) -> Self {
        let now = now();

        Self {
            id: Uuid::new_v4(),
            session_id: Uuid::new_v4(),
            email: email.to_string(),
            name: name.to_string(),
            hashed_password: hashed_password.to_string(),
            is_active: true,
            is_deleted: false,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    /// Soft-delete the user, the row stays around for the audit fields referring to it
    pub fn delete(&mut self) {
        let now = now();

        self.is_active = false;
        self.is_deleted = true;
        self.deleted_at = Some(now);
        self.updated_at = now;
    }
}

/// Normalize an email address by lowercasing the domain part
///
/// Surrounding whitespace is trimmed, the local part is kept as is
pub fn normalize_email(email: &str) -> String {
    let email = email.trim();

    match email.rsplit_once('@') {
        Some((local, domain)) => format!("{local}@{}", domain.to_lowercase()),
        None => email.to_string(),
    }
}
