//! Notebooks

use uuid::Uuid;

use crate::audit::Audit;
use crate::audit::Entity;

/// A named group of notes
#[derive(Clone, Debug)]
pub struct Notebook {
    /// Notebook ID
    pub id: Uuid,

    /// Title of the notebook
    pub title: String,

    /// Lifecycle fields
    pub audit: Audit,
}

/// The notebook specific fields
#[derive(Debug)]
pub struct NotebookFields {
    /// Title of the notebook
    pub title: String,
}

impl Entity for Notebook {
    type Fields = NotebookFields;

    // notebooks are only scoped by their owner
    type Filter = ();

    fn build(id: Uuid, fields: Self::Fields, audit: Audit) -> Self {
        Self {
            id,
            title: fields.title,
            audit,
        }
    }

    fn overwrite(&mut self, fields: Self::Fields) {
        self.title = fields.title;
    }

    fn matches(&self, _filter: &Self::Filter) -> bool {
        true
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
