//! Notes

use serde::Deserialize;
use serde::Serialize;
use uuid::Uuid;

use crate::audit::Audit;
use crate::audit::Entity;
use crate::users::User;

/// Where a note shows up
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum NoteState {
    /// Regular note
    #[default]
    Active,

    /// Put away, but kept
    Archived,

    /// Waiting to be deleted
    Trashed,
}

impl NoteState {
    /// State described by the `is_archived`/`is_trash` flag pair
    ///
    /// `None` when both are set, a note can not be in both places
    pub fn from_flags(is_archived: bool, is_trash: bool) -> Option<Self> {
        match (is_archived, is_trash) {
            (false, false) => Some(Self::Active),
            (true, false) => Some(Self::Archived),
            (false, true) => Some(Self::Trashed),
            (true, true) => None,
        }
    }

    /// Apply optional flag changes to the current state
    ///
    /// Setting a flag moves the note there, clearing the flag of the current state makes the note
    /// active again; clearing any other flag is a no-op. Both flags set is rejected before it gets
    /// here.
    pub fn with_flags(self, is_archived: Option<bool>, is_trash: Option<bool>) -> Self {
        match (is_archived, is_trash) {
            (Some(true), _) => Self::Archived,
            (_, Some(true)) => Self::Trashed,
            (Some(false), _) if self == Self::Archived => Self::Active,
            (_, Some(false)) if self == Self::Trashed => Self::Active,
            _ => self,
        }
    }

    pub fn is_archived(self) -> bool {
        self == Self::Archived
    }

    pub fn is_trash(self) -> bool {
        self == Self::Trashed
    }
}

/// Permission of other users on a note
///
/// Stored and returned, but not enforced anywhere
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(try_from = "i16", into = "i16")]
pub enum OtherUserPermission {
    #[default]
    DoNothing,
    CanRead,
    CanEdit,
}

impl TryFrom<i16> for OtherUserPermission {
    type Error = String;

    fn try_from(value: i16) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::DoNothing),
            1 => Ok(Self::CanRead),
            2 => Ok(Self::CanEdit),
            other => Err(format!("unknown permission: {other}, expected 0, 1 or 2")),
        }
    }
}

impl From<OtherUserPermission> for i16 {
    fn from(permission: OtherUserPermission) -> Self {
        match permission {
            OtherUserPermission::DoNothing => 0,
            OtherUserPermission::CanRead => 1,
            OtherUserPermission::CanEdit => 2,
        }
    }
}

/// A note, optionally part of a notebook
#[derive(Clone, Debug)]
pub struct Note {
    /// Note ID
    pub id: Uuid,

    /// Title of the note
    pub title: String,

    /// Content of the note
    ///
    /// Can be anything
    pub content: String,

    /// Active, archived or trashed
    pub state: NoteState,

    /// The notebook the note is in
    ///
    /// Keeps pointing to a notebook after that notebook is soft-deleted
    pub note_book_id: Option<Uuid>,

    /// Inert permission for other users
    pub other_user_permission: OtherUserPermission,

    /// Lifecycle fields
    pub audit: Audit,
}

/// The note specific fields, as a whole
#[derive(Debug)]
pub struct NoteFields {
    pub title: String,
    pub content: String,
    pub state: NoteState,
    pub note_book_id: Option<Uuid>,
    pub other_user_permission: OtherUserPermission,
}

/// Partial changes to a note
///
/// `None` leaves the field as it is
#[derive(Debug, Default)]
pub struct NotePatch {
    pub title: Option<String>,
    pub content: Option<String>,
    pub is_archived: Option<bool>,
    pub is_trash: Option<bool>,
    pub note_book_id: Option<Uuid>,
    pub other_user_permission: Option<OtherUserPermission>,
}

/// Which notes of an owner to list
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NoteFilter {
    /// Every note, in any state
    All,

    /// Archived notes
    Archived,

    /// Trashed notes
    Trashed,

    /// Notes in a notebook, or in no notebook at all
    Notebook(Option<Uuid>),
}

impl Note {
    /// Overwrite only the fields that are given and differ from the current value
    ///
    /// The note is always touched, even when nothing changed
    pub fn patch(&mut self, actor: &User, patch: NotePatch) {
        if let Some(title) = patch.title {
            if title != self.title {
                self.title = title;
            }
        }

        if let Some(content) = patch.content {
            if content != self.content {
                self.content = content;
            }
        }

        let state = self.state.with_flags(patch.is_archived, patch.is_trash);
        if state != self.state {
            self.state = state;
        }

        if let Some(note_book_id) = patch.note_book_id {
            if Some(note_book_id) != self.note_book_id {
                self.note_book_id = Some(note_book_id);
            }
        }

        if let Some(permission) = patch.other_user_permission {
            if permission != self.other_user_permission {
                self.other_user_permission = permission;
            }
        }

        self.touch(actor);
    }

    /// Take the note out of its notebook
    pub fn clear_notebook(&mut self, actor: &User) {
        self.note_book_id = None;
        self.touch(actor);
    }
}

impl Entity for Note {
    type Fields = NoteFields;
    type Filter = NoteFilter;

    fn build(id: Uuid, fields: Self::Fields, audit: Audit) -> Self {
        Self {
            id,
            title: fields.title,
            content: fields.content,
            state: fields.state,
            note_book_id: fields.note_book_id,
            other_user_permission: fields.other_user_permission,
            audit,
        }
    }

    fn overwrite(&mut self, fields: Self::Fields) {
        self.title = fields.title;
        self.content = fields.content;
        self.state = fields.state;
        self.note_book_id = fields.note_book_id;
        self.other_user_permission = fields.other_user_permission;
    }

    fn matches(&self, filter: &Self::Filter) -> bool {
        match filter {
            NoteFilter::All => true,
            NoteFilter::Archived => self.state == NoteState::Archived,
            NoteFilter::Trashed => self.state == NoteState::Trashed,
            NoteFilter::Notebook(note_book_id) => self.note_book_id == *note_book_id,
        }
    }

    fn id(&self) -> Uuid {
        self.id
    }

    fn audit(&self) -> &Audit {
        &self.audit
    }

    fn audit_mut(&mut self) -> &mut Audit {
        &mut self.audit
    }
}
