//! Source synchronization: pushing a transaction's recomputed aggregate
//! status back onto the concrete request record that originated it.
//!
//! Dispatch is a registry keyed by category, populated once at startup.
//! Handlers stage their write on the orchestrator's connection so the
//! update commits atomically with the transaction and stamp changes.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use sqlx::SqliteConnection;

use hrflow_core::domain::approval::{ApprovalTransaction, RequestCategory};
use hrflow_core::errors::WorkflowError;

use crate::repositories::RepositoryError;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SyncOutcome {
    Applied,
    /// No source record carries this transaction key. Explicitly not an
    /// error; the caller proceeds and logs it.
    NoMatch,
}

#[async_trait]
pub trait SourceSync: Send + Sync {
    fn category(&self) -> RequestCategory;

    async fn apply(
        &self,
        conn: &mut SqliteConnection,
        transaction: &ApprovalTransaction,
    ) -> Result<SyncOutcome, RepositoryError>;
}

/// Handler for request tables that share the `approval_transaction_id` /
/// `approval_status` column pair. Every built-in category uses one of these;
/// a request type with a different persistence shape would bring its own
/// `SourceSync` implementation instead.
pub struct RequestTableSync {
    category: RequestCategory,
    table: &'static str,
}

impl RequestTableSync {
    pub fn new(category: RequestCategory, table: &'static str) -> Self {
        Self { category, table }
    }
}

#[async_trait]
impl SourceSync for RequestTableSync {
    fn category(&self) -> RequestCategory {
        self.category
    }

    async fn apply(
        &self,
        conn: &mut SqliteConnection,
        transaction: &ApprovalTransaction,
    ) -> Result<SyncOutcome, RepositoryError> {
        let sql = format!(
            "UPDATE {} SET approval_status = ?, updated_at = ? WHERE approval_transaction_id = ?",
            self.table
        );
        let result = sqlx::query(&sql)
            .bind(transaction.status.as_str())
            .bind(Utc::now().to_rfc3339())
            .bind(&transaction.id.0)
            .execute(conn)
            .await?;

        if result.rows_affected() == 0 {
            Ok(SyncOutcome::NoMatch)
        } else {
            Ok(SyncOutcome::Applied)
        }
    }
}

pub struct SyncRegistry {
    handlers: HashMap<RequestCategory, Arc<dyn SourceSync>>,
}

impl SyncRegistry {
    pub fn empty() -> Self {
        Self { handlers: HashMap::new() }
    }

    /// Registry covering every built-in request table.
    pub fn standard() -> Self {
        let mut registry = Self::empty();
        registry.register(Arc::new(RequestTableSync::new(
            RequestCategory::LeavePermit,
            "leave_submission",
        )));
        registry.register(Arc::new(RequestTableSync::new(
            RequestCategory::LatePermit,
            "late_permit",
        )));
        registry.register(Arc::new(RequestTableSync::new(
            RequestCategory::EarlyOutPermit,
            "early_out_permit",
        )));
        registry
            .register(Arc::new(RequestTableSync::new(RequestCategory::OutPermit, "out_permit")));
        registry.register(Arc::new(RequestTableSync::new(
            RequestCategory::OvertimeLetter,
            "overtime_letter",
        )));
        registry
    }

    /// Later registrations for the same category replace earlier ones.
    pub fn register(&mut self, handler: Arc<dyn SourceSync>) {
        self.handlers.insert(handler.category(), handler);
    }

    pub async fn apply(
        &self,
        conn: &mut SqliteConnection,
        transaction: &ApprovalTransaction,
    ) -> Result<SyncOutcome, WorkflowError> {
        let Some(handler) = self.handlers.get(&transaction.category) else {
            return Err(WorkflowError::SyncSkipped { category: transaction.category });
        };
        handler.apply(conn, transaction).await.map_err(WorkflowError::from)
    }
}

impl Default for SyncRegistry {
    fn default() -> Self {
        Self::standard()
    }
}
