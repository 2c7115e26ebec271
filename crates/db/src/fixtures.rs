//! Deterministic demo dataset: one organization, a few employees, a
//! two-level approval config, and a leave submission routed through the
//! engine. Loading is idempotent; fixed keys make re-runs overwrite rather
//! than duplicate.

use std::sync::Arc;

use chrono::NaiveDate;

use hrflow_core::approvals::ApprovalSelection;
use hrflow_core::context::ActingUser;
use hrflow_core::documents::InMemoryDocumentStore;
use hrflow_core::domain::approval::{ApprovalStatus, ApprovalTransactionId};
use hrflow_core::domain::config::{ApprovalConfigId, ApproverForm, ConfigForm};
use hrflow_core::domain::directory::{EmployeeId, OrganizationId};
use hrflow_core::domain::requests::{LeaveSubmission, RequestId};
use hrflow_core::errors::WorkflowError;

use crate::adapters::PermitAdapter;
use crate::engine::ApprovalEngine;
use crate::repositories::{approval_config, approval_transaction, RepositoryError};
use crate::repositories::SqlLeaveSubmissionStore;
use crate::sync::SyncRegistry;
use crate::DbPool;

pub const SEED_ORGANIZATION_ID: &str = "ORG-JAKARTA-HQ";
pub const SEED_CONFIG_ID: &str = "CFG-LEAVE-STANDARD";
pub const SEED_LEAVE_REQUEST_ID: &str = "REQ-LEAVE-0001";
pub const SEED_LEAVE_TRANSACTION_ID: &str = "TXN-LEAVE-0001";

const SEED_EMPLOYEES: &[(&str, &str)] = &[
    ("EMP-0001", "Sari Wulandari"),
    ("EMP-0002", "Budi Santoso"),
    ("EMP-0003", "Ratna Dewi"),
];

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SeedSummary {
    pub organizations: usize,
    pub employees: usize,
    pub configs: usize,
    pub requests: usize,
}

#[derive(Clone, Debug)]
pub struct SeedVerification {
    pub all_present: bool,
    pub checks: Vec<(&'static str, bool)>,
}

pub struct SeedDataset;

impl SeedDataset {
    pub async fn load(pool: &DbPool) -> Result<SeedSummary, WorkflowError> {
        let actor = ActingUser::system();

        sqlx::query(
            "INSERT OR REPLACE INTO organization (id, company_code, company_name, name)
             VALUES (?, ?, ?, ?)",
        )
        .bind(SEED_ORGANIZATION_ID)
        .bind("NSM")
        .bind("Nusantara Sejahtera Makmur")
        .bind("Head Office Jakarta")
        .execute(pool)
        .await
        .map_err(RepositoryError::Database)?;

        for (id, full_name) in SEED_EMPLOYEES {
            sqlx::query(
                "INSERT OR REPLACE INTO employee (id, full_name, organization_id)
                 VALUES (?, ?, ?)",
            )
            .bind(id)
            .bind(full_name)
            .bind(SEED_ORGANIZATION_ID)
            .execute(pool)
            .await
            .map_err(RepositoryError::Database)?;
        }

        let engine = Arc::new(ApprovalEngine::new(pool.clone(), SyncRegistry::standard()));

        engine
            .save_config(
                &actor,
                ConfigForm {
                    id: Some(ApprovalConfigId(SEED_CONFIG_ID.to_string())),
                    organization_id: OrganizationId(SEED_ORGANIZATION_ID.to_string()),
                    description: "Standard leave sign-off".to_string(),
                    approvers: vec![
                        ApproverForm {
                            employee_id: EmployeeId("EMP-0002".to_string()),
                            name: "Budi Santoso".to_string(),
                            level: 1,
                            action: "Reviews".to_string(),
                        },
                        ApproverForm {
                            employee_id: EmployeeId("EMP-0003".to_string()),
                            name: "Ratna Dewi".to_string(),
                            level: 2,
                            action: "Approves".to_string(),
                        },
                    ],
                },
            )
            .await?;

        let adapter = PermitAdapter::new(
            SqlLeaveSubmissionStore::new(pool.clone()),
            engine,
            Arc::new(InMemoryDocumentStore::default()),
        );

        let now = chrono::Utc::now();
        let record = LeaveSubmission {
            id: RequestId(SEED_LEAVE_REQUEST_ID.to_string()),
            employee_id: EmployeeId("EMP-0001".to_string()),
            leave_type: "annual".to_string(),
            start_date: NaiveDate::from_ymd_opt(2026, 6, 8).unwrap_or_default(),
            end_date: NaiveDate::from_ymd_opt(2026, 6, 12).unwrap_or_default(),
            reason: "family trip".to_string(),
            approval_transaction_id: Some(ApprovalTransactionId(
                SEED_LEAVE_TRANSACTION_ID.to_string(),
            )),
            approval_status: ApprovalStatus::New,
            document_ids: vec![],
            created_at: now,
            updated_at: now,
        };
        let selections = vec![
            ApprovalSelection {
                employee_id: EmployeeId("EMP-0002".to_string()),
                name: "Budi Santoso".to_string(),
                level: 1,
                action: "Reviews".to_string(),
            },
            ApprovalSelection {
                employee_id: EmployeeId("EMP-0003".to_string()),
                name: "Ratna Dewi".to_string(),
                level: 2,
                action: "Approves".to_string(),
            },
        ];
        adapter.submit(&actor, record, &selections, Vec::new()).await?;

        Ok(SeedSummary {
            organizations: 1,
            employees: SEED_EMPLOYEES.len(),
            configs: 1,
            requests: 1,
        })
    }

    pub async fn verify(pool: &DbPool) -> Result<SeedVerification, RepositoryError> {
        let organization_present: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM organization WHERE id = ?")
                .bind(SEED_ORGANIZATION_ID)
                .fetch_one(pool)
                .await?;

        let employee_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM employee")
            .fetch_one(pool)
            .await?;

        let approver_count = approval_config::count_approvers(
            pool,
            &ApprovalConfigId(SEED_CONFIG_ID.to_string()),
        )
        .await?;

        let leave_present: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM leave_submission WHERE id = ?")
                .bind(SEED_LEAVE_REQUEST_ID)
                .fetch_one(pool)
                .await?;

        let stamps = approval_transaction::load_stamps(
            pool,
            &ApprovalTransactionId(SEED_LEAVE_TRANSACTION_ID.to_string()),
        )
        .await?;

        let checks = vec![
            ("organization", organization_present == 1),
            ("employees", employee_count >= SEED_EMPLOYEES.len() as i64),
            ("config-approvers", approver_count == 2),
            ("leave-submission", leave_present == 1),
            ("leave-stamps", stamps.len() == 2),
        ];
        let all_present = checks.iter().all(|(_, passed)| *passed);

        Ok(SeedVerification { all_present, checks })
    }
}
