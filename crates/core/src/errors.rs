use thiserror::Error;

use crate::domain::approval::RequestCategory;
use crate::domain::requests::DocumentId;
use crate::validate::FieldError;

/// Tagged failure taxonomy for every workflow operation. Callers branch on
/// the variant; message text is for operators, not for dispatch.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum WorkflowError {
    #[error("validation failed: {}", format_fields(.0))]
    Validation(Vec<FieldError>),
    #[error("{entity} `{key}` was not found")]
    NotFound { entity: &'static str, key: String },
    #[error("no source synchronizer registered for category `{}`", .category.as_str())]
    SyncSkipped { category: RequestCategory },
    #[error("{} attachment deletion(s) failed", .0.len())]
    Attachments(Vec<AttachmentFailure>),
    #[error("persistence failure: {0}")]
    Persistence(String),
}

impl WorkflowError {
    pub fn not_found(entity: &'static str, key: impl Into<String>) -> Self {
        Self::NotFound { entity, key: key.into() }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AttachmentFailure {
    pub document_id: DocumentId,
    pub message: String,
}

fn format_fields(issues: &[FieldError]) -> String {
    issues
        .iter()
        .map(|issue| format!("{}: {}", issue.field, issue.message))
        .collect::<Vec<_>>()
        .join("; ")
}
