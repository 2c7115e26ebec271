//! Transaction Orchestrator: the public surface of the approval workflow.
//!
//! Every operation runs inside one pool-scoped SQLite transaction; reads,
//! writes, and the source-record synchronization all stage on that
//! connection and commit together at the end. There is no optimistic
//! concurrency token on transactions or stamps: two concurrent saves of the
//! same key race, and the later commit's stamp replacement silently wins.

use chrono::Utc;
use tracing::{info, warn};

use hrflow_core::approvals::aggregate_status;
use hrflow_core::context::ActingUser;
use hrflow_core::domain::approval::{
    ApprovalStamp, ApprovalStampId, ApprovalStatus, ApprovalTransaction, ApprovalTransactionId,
    TransactionForm,
};
use hrflow_core::domain::config::{
    ApprovalConfig, ApprovalConfigId, Approver, ApproverId, ConfigForm,
};
use hrflow_core::errors::WorkflowError;
use hrflow_core::validate;

use crate::repositories::{approval_config, approval_transaction, RepositoryError};
use crate::sync::{SyncOutcome, SyncRegistry};
use crate::views::{ConfigListItem, ConfigView, Page, TransactionView};
use crate::DbPool;

/// Outcome of a transaction upsert: the resolved key plus the status the
/// committed row carries, so adapters can mirror it onto their own record.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SavedTransaction {
    pub id: ApprovalTransactionId,
    pub status: ApprovalStatus,
}

pub struct ApprovalEngine {
    pool: DbPool,
    sync: SyncRegistry,
}

impl ApprovalEngine {
    pub fn new(pool: DbPool, sync: SyncRegistry) -> Self {
        Self { pool, sync }
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }

    /// Upsert an approval transaction, replacing its stamp set wholesale
    /// when the form carries stamps.
    pub async fn save_transaction(
        &self,
        actor: &ActingUser,
        form: TransactionForm,
    ) -> Result<SavedTransaction, WorkflowError> {
        let issues = validate::validate_transaction(&form);
        if !issues.is_empty() {
            return Err(WorkflowError::Validation(issues));
        }

        let (id, minted) = match form.id.clone() {
            Some(id) if !id.is_empty() => (id, false),
            _ => (ApprovalTransactionId::generate(), true),
        };
        // a freshly minted transaction starts out waiting no matter what the
        // caller put in the form
        let submitted_status = if minted { ApprovalStatus::Waiting } else { form.status };

        let mut tx = self.pool.begin().await.map_err(RepositoryError::Database)?;
        let now = Utc::now();

        let record = match approval_transaction::find_by_id(&mut tx, &id).await? {
            None => {
                let record = ApprovalTransaction {
                    id: id.clone(),
                    employee_id: form.employee_id.clone(),
                    transaction_date: form.transaction_date,
                    category: form.category,
                    status: submitted_status,
                    reject_reason: form.reject_reason.clone(),
                    description: form.description.clone(),
                    created_at: now,
                    created_by: actor.audit_name().to_string(),
                    updated_at: now,
                    updated_by: actor.audit_name().to_string(),
                };
                approval_transaction::insert(&mut tx, &record).await?;
                record
            }
            Some(mut record) => {
                record.category = form.category;
                // the aggregate is recomputed from the stamps carried by this
                // form, not from whatever rows are currently stored
                record.status = aggregate_status(form.stamps.iter().map(|stamp| stamp.status));
                record.reject_reason = form.reject_reason.clone();
                record.description = form.description.clone();
                record.updated_at = now;
                record.updated_by = actor.audit_name().to_string();
                approval_transaction::update(&mut tx, &record).await?;

                match self.sync.apply(&mut tx, &record).await {
                    Ok(SyncOutcome::Applied) => {}
                    Ok(SyncOutcome::NoMatch) => {
                        info!(
                            event_name = "workflow.sync.no_match",
                            transaction_id = %record.id.0,
                            category = record.category.as_str(),
                            "no source record carries this transaction key"
                        );
                    }
                    Err(WorkflowError::SyncSkipped { category }) => {
                        warn!(
                            event_name = "workflow.sync.skipped",
                            transaction_id = %record.id.0,
                            category = category.as_str(),
                            "no synchronizer registered for category"
                        );
                    }
                    Err(error) => return Err(error),
                }
                record
            }
        };

        if !form.stamps.is_empty() {
            let stamps: Vec<ApprovalStamp> = form
                .stamps
                .iter()
                .map(|stamp| ApprovalStamp {
                    id: ApprovalStampId::generate(),
                    transaction_id: id.clone(),
                    employee_id: stamp.employee_id.clone(),
                    level: stamp.level,
                    status: stamp.status,
                    reject_reason: stamp.reject_reason.clone(),
                    stamped_at: stamp.stamped_at.unwrap_or(now),
                })
                .collect();

            let mut issues = Vec::new();
            for (index, stamp) in stamps.iter().enumerate() {
                issues.extend(validate::validate_stamp(index, stamp));
            }
            if !issues.is_empty() {
                // dropping the open transaction rolls back everything staged
                // above, so a failed stamp set leaves no trace
                return Err(WorkflowError::Validation(issues));
            }

            approval_transaction::delete_stamps(&mut tx, &id).await?;
            approval_transaction::insert_stamps(&mut tx, &stamps).await?;
        }

        tx.commit().await.map_err(RepositoryError::Database)?;

        info!(
            event_name = "workflow.transaction.saved",
            transaction_id = %record.id.0,
            category = record.category.as_str(),
            status = record.status.as_str(),
            actor = actor.audit_name(),
            "approval transaction saved"
        );

        Ok(SavedTransaction { id, status: record.status })
    }

    /// Delete a transaction and its stamps. The source record is left alone;
    /// the owning adapter decides what happens to it.
    pub async fn delete_transaction(
        &self,
        id: &ApprovalTransactionId,
    ) -> Result<(), WorkflowError> {
        let mut tx = self.pool.begin().await.map_err(RepositoryError::Database)?;

        if approval_transaction::find_by_id(&mut tx, id).await?.is_none() {
            return Err(WorkflowError::not_found("approval transaction", id.0.clone()));
        }

        approval_transaction::delete_stamps(&mut tx, id).await?;
        approval_transaction::delete(&mut tx, id).await?;
        tx.commit().await.map_err(RepositoryError::Database)?;

        info!(
            event_name = "workflow.transaction.deleted",
            transaction_id = %id.0,
            "approval transaction and stamps deleted"
        );

        Ok(())
    }

    pub async fn get_transaction(
        &self,
        id: &ApprovalTransactionId,
    ) -> Result<TransactionView, WorkflowError> {
        approval_transaction::load_view(&self.pool, id)
            .await?
            .ok_or_else(|| WorkflowError::not_found("approval transaction", id.0.clone()))
    }

    /// Upsert an approval config. A non-empty approver list is validated in
    /// full before any write, then replaces the stored set wholesale with
    /// freshly generated keys.
    pub async fn save_config(
        &self,
        actor: &ActingUser,
        form: ConfigForm,
    ) -> Result<ApprovalConfigId, WorkflowError> {
        let mut issues = validate::validate_config(&form);
        for (index, approver) in form.approvers.iter().enumerate() {
            issues.extend(validate::validate_approver(index, approver));
        }
        if !issues.is_empty() {
            return Err(WorkflowError::Validation(issues));
        }

        let id = match form.id.clone() {
            Some(id) if !id.is_empty() => id,
            _ => ApprovalConfigId::generate(),
        };

        let mut tx = self.pool.begin().await.map_err(RepositoryError::Database)?;
        let now = Utc::now();

        match approval_config::find_by_id(&mut tx, &id).await? {
            None => {
                let config = ApprovalConfig {
                    id: id.clone(),
                    organization_id: form.organization_id.clone(),
                    description: form.description.clone(),
                    created_at: now,
                    created_by: actor.audit_name().to_string(),
                    updated_at: now,
                    updated_by: actor.audit_name().to_string(),
                };
                approval_config::insert(&mut tx, &config).await?;
            }
            Some(existing) => {
                let config = ApprovalConfig {
                    id: id.clone(),
                    organization_id: form.organization_id.clone(),
                    description: form.description.clone(),
                    // original provenance survives every overwrite
                    created_at: existing.created_at,
                    created_by: existing.created_by,
                    updated_at: now,
                    updated_by: actor.audit_name().to_string(),
                };
                approval_config::update(&mut tx, &config).await?;
            }
        }

        if !form.approvers.is_empty() {
            approval_config::delete_approvers(&mut tx, &id).await?;
            let approvers: Vec<Approver> = form
                .approvers
                .iter()
                .map(|approver| Approver {
                    id: ApproverId::generate(),
                    config_id: id.clone(),
                    employee_id: approver.employee_id.clone(),
                    name: approver.name.clone(),
                    level: approver.level,
                    action: approver.action.clone(),
                })
                .collect();
            approval_config::insert_approvers(&mut tx, &approvers).await?;
        }

        tx.commit().await.map_err(RepositoryError::Database)?;

        info!(
            event_name = "workflow.config.saved",
            config_id = %id.0,
            approvers = form.approvers.len(),
            actor = actor.audit_name(),
            "approval config saved"
        );

        Ok(id)
    }

    pub async fn delete_config(&self, id: &ApprovalConfigId) -> Result<(), WorkflowError> {
        let mut tx = self.pool.begin().await.map_err(RepositoryError::Database)?;

        if approval_config::find_by_id(&mut tx, id).await?.is_none() {
            return Err(WorkflowError::not_found("approval config", id.0.clone()));
        }

        approval_config::delete_approvers(&mut tx, id).await?;
        approval_config::delete(&mut tx, id).await?;
        tx.commit().await.map_err(RepositoryError::Database)?;

        info!(
            event_name = "workflow.config.deleted",
            config_id = %id.0,
            "approval config and approvers deleted"
        );

        Ok(())
    }

    pub async fn get_config(&self, id: &ApprovalConfigId) -> Result<ConfigView, WorkflowError> {
        approval_config::load_view(&self.pool, id)
            .await?
            .ok_or_else(|| WorkflowError::not_found("approval config", id.0.clone()))
    }

    pub async fn list_configs(&self) -> Result<Vec<ConfigListItem>, WorkflowError> {
        Ok(approval_config::list(&self.pool).await?)
    }

    pub async fn paginate_configs(
        &self,
        page: u32,
        per_page: u32,
        search: Option<&str>,
    ) -> Result<Page<ConfigListItem>, WorkflowError> {
        Ok(approval_config::paginate(&self.pool, page, per_page, search).await?)
    }
}
