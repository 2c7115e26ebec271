use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use thiserror::Error;

use hrflow_core::domain::approval::{ApprovalStatus, RequestCategory};
use hrflow_core::domain::requests::DocumentId;
use hrflow_core::errors::WorkflowError;

pub mod approval_config;
pub mod approval_transaction;
pub mod requests;

pub use requests::{
    RequestStore, SqlEarlyOutPermitStore, SqlLatePermitStore, SqlLeaveSubmissionStore,
    SqlOutPermitStore, SqlOvertimeLetterStore,
};

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("decode error: {0}")]
    Decode(String),
}

impl From<RepositoryError> for WorkflowError {
    fn from(error: RepositoryError) -> Self {
        WorkflowError::Persistence(error.to_string())
    }
}

pub(crate) fn col<'r, T>(row: &'r SqliteRow, name: &str) -> Result<T, RepositoryError>
where
    T: sqlx::Decode<'r, sqlx::Sqlite> + sqlx::Type<sqlx::Sqlite>,
{
    row.try_get(name).map_err(|error| RepositoryError::Decode(error.to_string()))
}

pub(crate) fn decode_datetime(column: &str, value: &str) -> Result<DateTime<Utc>, RepositoryError> {
    DateTime::parse_from_rfc3339(value)
        .map(|parsed| parsed.with_timezone(&Utc))
        .map_err(|error| RepositoryError::Decode(format!("{column}: {error}")))
}

pub(crate) fn decode_date(column: &str, value: &str) -> Result<NaiveDate, RepositoryError> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|error| RepositoryError::Decode(format!("{column}: {error}")))
}

pub(crate) fn decode_time(column: &str, value: &str) -> Result<NaiveTime, RepositoryError> {
    NaiveTime::parse_from_str(value, "%H:%M")
        .map_err(|error| RepositoryError::Decode(format!("{column}: {error}")))
}

pub(crate) fn encode_date(value: NaiveDate) -> String {
    value.format("%Y-%m-%d").to_string()
}

pub(crate) fn encode_time(value: NaiveTime) -> String {
    value.format("%H:%M").to_string()
}

pub(crate) fn decode_status(column: &str, value: &str) -> Result<ApprovalStatus, RepositoryError> {
    ApprovalStatus::parse(value)
        .ok_or_else(|| RepositoryError::Decode(format!("{column}: unknown status `{value}`")))
}

pub(crate) fn decode_category(
    column: &str,
    value: &str,
) -> Result<RequestCategory, RepositoryError> {
    RequestCategory::parse(value)
        .ok_or_else(|| RepositoryError::Decode(format!("{column}: unknown category `{value}`")))
}

pub(crate) fn decode_documents(column: &str, value: &str) -> Result<Vec<DocumentId>, RepositoryError> {
    let ids: Vec<String> = serde_json::from_str(value)
        .map_err(|error| RepositoryError::Decode(format!("{column}: {error}")))?;
    Ok(ids.into_iter().map(DocumentId).collect())
}

pub(crate) fn encode_documents(ids: &[DocumentId]) -> String {
    let raw: Vec<&str> = ids.iter().map(|id| id.0.as_str()).collect();
    serde_json::to_string(&raw).unwrap_or_else(|_| "[]".to_string())
}
