//! Request-type adapters: the bridge between a concrete permit record and
//! its backing approval transaction.
//!
//! One generic adapter covers all five request types through the
//! `RequestStore` / `PermitRecord` traits. The adapter's own save and the
//! orchestrator's commit are separate units of work: if the record save
//! fails after the transaction committed, the transaction stays committed.

use std::sync::Arc;

use tracing::info;

use hrflow_core::approvals::{draft_stamps, ApprovalSelection};
use hrflow_core::context::ActingUser;
use hrflow_core::documents::DocumentStore;
use hrflow_core::domain::approval::{ApprovalStatus, TransactionForm};
use hrflow_core::domain::requests::{PermitRecord, RequestId};
use hrflow_core::errors::{AttachmentFailure, WorkflowError};

use crate::engine::ApprovalEngine;
use crate::repositories::RequestStore;

pub struct NewAttachment {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

pub struct PermitAdapter<S: RequestStore> {
    store: S,
    engine: Arc<ApprovalEngine>,
    documents: Arc<dyn DocumentStore>,
}

impl<S: RequestStore> PermitAdapter<S> {
    pub fn new(store: S, engine: Arc<ApprovalEngine>, documents: Arc<dyn DocumentStore>) -> Self {
        Self { store, engine, documents }
    }

    /// Save a permit record, creating or updating its backing approval
    /// transaction first so the record can mirror the resulting status.
    pub async fn submit(
        &self,
        actor: &ActingUser,
        mut record: S::Record,
        selections: &[ApprovalSelection],
        attachments: Vec<NewAttachment>,
    ) -> Result<RequestId, WorkflowError> {
        for attachment in attachments {
            let id = self
                .documents
                .upload(&attachment.file_name, &attachment.bytes)
                .await
                .map_err(|error| WorkflowError::Persistence(error.to_string()))?;
            record.attach_document(id);
        }

        let form = TransactionForm {
            id: record.approval_transaction_id().cloned(),
            employee_id: record.employee_id().clone(),
            transaction_date: chrono::Utc::now().date_naive(),
            category: S::Record::CATEGORY,
            status: ApprovalStatus::New,
            reject_reason: None,
            description: record.summary(),
            stamps: draft_stamps(selections),
        };
        let saved = self.engine.save_transaction(actor, form).await?;
        record.link_approval(saved.id, saved.status);

        self.store.save(&record).await?;

        info!(
            event_name = "workflow.request.submitted",
            request_id = %record.id().0,
            category = S::Record::CATEGORY.as_str(),
            status = saved.status.as_str(),
            "permit record submitted"
        );

        Ok(record.id().clone())
    }

    /// Delete a permit record. The backing transaction goes first and any
    /// failure there aborts the whole delete; attachment deletions are all
    /// attempted and their failures reported together, blocking removal of
    /// the record itself until every one succeeds.
    pub async fn delete(&self, id: &RequestId) -> Result<(), WorkflowError> {
        let record = self
            .store
            .find(id)
            .await?
            .ok_or_else(|| WorkflowError::not_found(S::Record::CATEGORY.as_str(), id.0.clone()))?;

        if let Some(transaction_id) = record.approval_transaction_id() {
            self.engine.delete_transaction(transaction_id).await?;
        }

        let mut failures = Vec::new();
        for document_id in record.document_ids() {
            if let Err(error) = self.documents.delete(document_id).await {
                failures.push(AttachmentFailure {
                    document_id: document_id.clone(),
                    message: error.to_string(),
                });
            }
        }
        if !failures.is_empty() {
            return Err(WorkflowError::Attachments(failures));
        }

        self.store.delete(id).await?;

        info!(
            event_name = "workflow.request.deleted",
            request_id = %id.0,
            category = S::Record::CATEGORY.as_str(),
            "permit record deleted"
        );

        Ok(())
    }
}
