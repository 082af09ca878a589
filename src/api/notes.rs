//! Note API management
//!
//! On top of the generic endpoints notes can be patched and taken out of their notebook.

use axum::Extension;
use chrono::NaiveDateTime;
use serde::Deserialize;
use serde::Serialize;
use uuid::Uuid;

use crate::notes::Note;
use crate::notes::NoteFields;
use crate::notes::NoteFilter;
use crate::notes::NotePatch;
use crate::notes::NoteState;
use crate::notes::OtherUserPermission;
use crate::storage::Store;
use crate::storage::UserStore;

use super::CurrentUser;
use super::Error;
use super::Form;
use super::PathParameters;
use super::Success;
use super::crud::Resource;
use super::notebooks::validate_title;

fn both_flags_error() -> Error {
    Error::bad_request("A note can not be archived and in the trash at the same time")
}

/// Note create and update form
///
/// Everything but the title is optional and falls back to its default
#[derive(Debug, Deserialize)]
pub struct NoteForm {
    title: String,

    #[serde(default)]
    content: String,

    #[serde(default)]
    is_archived: bool,

    #[serde(default)]
    is_trash: bool,

    #[serde(default, alias = "note_book_id")]
    note_book: Option<Uuid>,

    #[serde(default)]
    other_user_permission: OtherUserPermission,
}

/// Note patch form
///
/// Missing and `null` fields are left alone
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct NotePatchForm {
    title: Option<String>,
    content: Option<String>,
    is_archived: Option<bool>,
    is_trash: Option<bool>,
    #[serde(alias = "note_book_id")]
    note_book: Option<Uuid>,
    other_user_permission: Option<OtherUserPermission>,
}

impl NotePatchForm {
    fn into_patch(self) -> Result<NotePatch, Error> {
        if self.is_archived == Some(true) && self.is_trash == Some(true) {
            return Err(both_flags_error());
        }

        if let Some(title) = &self.title {
            validate_title(title)?;
        }

        Ok(NotePatch {
            title: self.title,
            content: self.content,
            is_archived: self.is_archived,
            is_trash: self.is_trash,
            note_book_id: self.note_book,
            other_user_permission: self.other_user_permission,
        })
    }
}

fn default_all() -> bool {
    true
}

/// Note list query
///
/// Only one of the filters is used: `all`, `is_archived`, `is_trash` and then `note_book_id`, in
/// that order
#[derive(Debug, Deserialize)]
pub struct NoteQuery {
    #[serde(default = "default_all")]
    all: bool,

    note_book_id: Option<Uuid>,

    #[serde(default)]
    is_archived: bool,

    #[serde(default)]
    is_trash: bool,
}

impl NoteQuery {
    fn to_filter(&self) -> NoteFilter {
        if self.all {
            NoteFilter::All
        } else if self.is_archived {
            NoteFilter::Archived
        } else if self.is_trash {
            NoteFilter::Trashed
        } else {
            NoteFilter::Notebook(self.note_book_id)
        }
    }
}

/// The note response information
#[derive(Debug, Serialize)]
pub struct NoteResponse {
    id: Uuid,
    title: String,
    content: String,
    is_archived: bool,
    is_trash: bool,
    note_book: Option<Uuid>,
    other_user_permission: OtherUserPermission,
    created_at: NaiveDateTime,
    created_by: Uuid,
    updated_at: NaiveDateTime,
    updated_by: Uuid,
}

impl Resource for Note {
    type Body = NoteForm;
    type Query = NoteQuery;
    type Response = NoteResponse;

    const NAME: &'static str = "Note";
    const NOT_FOUND: &'static str = "Note not found";

    fn fields(body: Self::Body) -> Result<Self::Fields, Error> {
        validate_title(&body.title)?;

        let state = NoteState::from_flags(body.is_archived, body.is_trash)
            .ok_or_else(both_flags_error)?;

        Ok(NoteFields {
            title: body.title,
            content: body.content,
            state,
            note_book_id: body.note_book,
            other_user_permission: body.other_user_permission,
        })
    }

    fn filter(query: Self::Query) -> Result<Self::Filter, Error> {
        Ok(query.to_filter())
    }

    fn to_response(&self) -> Self::Response {
        NoteResponse {
            id: self.id,
            title: self.title.clone(),
            content: self.content.clone(),
            is_archived: self.state.is_archived(),
            is_trash: self.state.is_trash(),
            note_book: self.note_book_id,
            other_user_permission: self.other_user_permission,
            created_at: self.audit.created_at,
            created_by: self.audit.created_by,
            updated_at: self.audit.updated_at,
            updated_by: self.audit.updated_by,
        }
    }
}

/// Overwrite only the given fields of a note
pub async fn patch<S>(
    current_user: CurrentUser<S>,
    Extension(storage): Extension<S>,
    PathParameters(id): PathParameters<Uuid>,
    Form(form): Form<NotePatchForm>,
) -> Result<Success<NoteResponse>, Error>
where
    S: Store<Note> + UserStore,
{
    let patch = form.into_patch()?;

    let note = <S as Store<Note>>::update_exclusive(&storage, &id, |note| {
        note.patch(&current_user, patch);
    })
    .await?
    .ok_or_else(|| Error::not_found(Note::NOT_FOUND))?;

    tracing::debug!("Note {id} patched by {}", current_user.id);

    Ok(Success::ok(note.to_response()))
}

/// Take a note out of its notebook
pub async fn set_note_book_none<S>(
    current_user: CurrentUser<S>,
    Extension(storage): Extension<S>,
    PathParameters(id): PathParameters<Uuid>,
) -> Result<Success<NoteResponse>, Error>
where
    S: Store<Note> + UserStore,
{
    let note = <S as Store<Note>>::update_exclusive(&storage, &id, |note| {
        note.clear_notebook(&current_user);
    })
    .await?
    .ok_or_else(|| Error::not_found(Note::NOT_FOUND))?;

    tracing::debug!("Note {id} taken out of its notebook by {}", current_user.id);

    Ok(Success::ok(note.to_response()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(all: bool, note_book_id: Option<Uuid>, is_archived: bool, is_trash: bool) -> NoteQuery {
        NoteQuery {
            all,
            note_book_id,
            is_archived,
            is_trash,
        }
    }

    #[test]
    fn test_filter_priority() {
        let note_book_id = Uuid::new_v4();

        assert_eq!(
            NoteFilter::All,
            query(true, Some(note_book_id), true, true).to_filter()
        );
        assert_eq!(
            NoteFilter::Archived,
            query(false, Some(note_book_id), true, true).to_filter()
        );
        assert_eq!(
            NoteFilter::Trashed,
            query(false, Some(note_book_id), false, true).to_filter()
        );
        assert_eq!(
            NoteFilter::Notebook(Some(note_book_id)),
            query(false, Some(note_book_id), false, false).to_filter()
        );
        assert_eq!(
            NoteFilter::Notebook(None),
            query(false, None, false, false).to_filter()
        );
    }

    #[test]
    fn test_form_accepts_note_book_id_alias() {
        let note_book_id = Uuid::new_v4();

        let form: NoteForm = serde_json::from_value(serde_json::json!({
            "title": "title",
            "note_book_id": note_book_id,
        }))
        .unwrap();

        assert_eq!(Some(note_book_id), form.note_book);
        assert_eq!("", form.content);
        assert_eq!(OtherUserPermission::DoNothing, form.other_user_permission);
    }

    #[test]
    fn test_both_flags_rejected() {
        let form: NoteForm = serde_json::from_value(serde_json::json!({
            "title": "title",
            "is_archived": true,
            "is_trash": true,
        }))
        .unwrap();
        assert!(Note::fields(form).is_err());

        let form: NotePatchForm = serde_json::from_value(serde_json::json!({
            "is_archived": true,
            "is_trash": true,
        }))
        .unwrap();
        assert!(form.into_patch().is_err());
    }

    #[test]
    fn test_patch_form_null_is_missing() {
        let form: NotePatchForm = serde_json::from_value(serde_json::json!({
            "title": null,
            "content": "new content",
        }))
        .unwrap();

        let patch = form.into_patch().unwrap();

        assert_eq!(None, patch.title);
        assert_eq!(Some("new content".to_string()), patch.content);
    }
}
