use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::directory::{EmployeeId, OrganizationId};

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ApprovalConfigId(pub String);

impl ApprovalConfigId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ApproverId(pub String);

impl ApproverId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

/// Organization-scoped definition of an approver chain.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApprovalConfig {
    pub id: ApprovalConfigId,
    pub organization_id: OrganizationId,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub created_by: String,
    pub updated_at: DateTime<Utc>,
    pub updated_by: String,
}

/// One entry in an approver chain. `level` is an ordering hint, not a
/// uniqueness constraint; `action` is a free-text label such as "Reviews"
/// or "Approves".
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Approver {
    pub id: ApproverId,
    pub config_id: ApprovalConfigId,
    pub employee_id: EmployeeId,
    pub name: String,
    pub level: i64,
    pub action: String,
}

/// Upsert payload for an approval config. A non-empty `approvers` list
/// replaces the stored approver set wholesale.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigForm {
    pub id: Option<ApprovalConfigId>,
    pub organization_id: OrganizationId,
    pub description: String,
    pub approvers: Vec<ApproverForm>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApproverForm {
    pub employee_id: EmployeeId,
    pub name: String,
    pub level: i64,
    pub action: String,
}
