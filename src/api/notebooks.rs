//! Notebook API management

use chrono::NaiveDateTime;
use serde::Deserialize;
use serde::Serialize;
use uuid::Uuid;

use crate::notebooks::Notebook;
use crate::notebooks::NotebookFields;

use super::Error;
use super::crud::Resource;

/// Longest title a notebook or note can have, in characters
pub const MAX_TITLE_LENGTH: usize = 255;

/// Check the length of a title
pub fn validate_title(title: &str) -> Result<(), Error> {
    if title.chars().count() > MAX_TITLE_LENGTH {
        return Err(Error::bad_request(format!(
            "Title can not be longer than {MAX_TITLE_LENGTH} characters"
        )));
    }

    Ok(())
}

/// Notebook create and update form
#[derive(Debug, Deserialize)]
pub struct NotebookForm {
    title: String,
}

/// Notebooks can not be filtered, unknown parameters are ignored
#[derive(Debug, Deserialize)]
pub struct NotebookQuery {}

/// The notebook response information
#[derive(Debug, Serialize)]
pub struct NotebookResponse {
    id: Uuid,
    title: String,
    created_at: NaiveDateTime,
    created_by: Uuid,
    updated_at: NaiveDateTime,
    updated_by: Uuid,
}

impl Resource for Notebook {
    type Body = NotebookForm;
    type Query = NotebookQuery;
    type Response = NotebookResponse;

    const NAME: &'static str = "Notebook";
    const NOT_FOUND: &'static str = "Notebook not found";

    fn fields(body: Self::Body) -> Result<Self::Fields, Error> {
        validate_title(&body.title)?;

        Ok(NotebookFields { title: body.title })
    }

    fn filter(_query: Self::Query) -> Result<Self::Filter, Error> {
        Ok(())
    }

    fn to_response(&self) -> Self::Response {
        NotebookResponse {
            id: self.id,
            title: self.title.clone(),
            created_at: self.audit.created_at,
            created_by: self.audit.created_by,
            updated_at: self.audit.updated_at,
            updated_by: self.audit.updated_by,
        }
    }
}
