use serde::Serialize;

use hrflow_core::domain::approval::{ApprovalStamp, ApprovalTransaction};
use hrflow_core::domain::config::{ApprovalConfig, ApprovalConfigId, Approver};
use hrflow_core::domain::directory::{Organization, OrganizationId};

/// One page of a search result.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: u32,
    pub per_page: u32,
    pub total: u64,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TransactionView {
    pub transaction: ApprovalTransaction,
    pub stamps: Vec<StampView>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct StampView {
    pub stamp: ApprovalStamp,
    pub approver_name: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ConfigView {
    pub config: ApprovalConfig,
    pub organization: Option<Organization>,
    pub approvers: Vec<ApproverView>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ApproverView {
    pub approver: Approver,
    pub employee_name: Option<String>,
}

/// Flattened row for config listings and paginated search.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ConfigListItem {
    pub id: ApprovalConfigId,
    pub organization_id: OrganizationId,
    pub organization_name: Option<String>,
    pub company_code: Option<String>,
    pub company_name: Option<String>,
    pub description: String,
    pub approver_count: i64,
}
