use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::directory::EmployeeId;

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ApprovalTransactionId(pub String);

impl ApprovalTransactionId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ApprovalStampId(pub String);

impl ApprovalStampId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

/// Decision status shared by transactions (aggregate) and stamps (per
/// approver). A stamp is expected to stay within {Waiting, Approve, Reject,
/// Revision}; `New` only appears on freshly created transactions before the
/// first save recomputes the aggregate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApprovalStatus {
    New,
    Waiting,
    Approve,
    Reject,
    Revision,
}

impl ApprovalStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::New => "new",
            Self::Waiting => "waiting",
            Self::Approve => "approve",
            Self::Reject => "reject",
            Self::Revision => "revision",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "new" => Some(Self::New),
            "waiting" => Some(Self::Waiting),
            "approve" => Some(Self::Approve),
            "reject" => Some(Self::Reject),
            "revision" => Some(Self::Revision),
            _ => None,
        }
    }
}

/// Tag linking an approval transaction to the concrete request table that
/// originated it. The category decides which source record the synchronizer
/// must touch after the aggregate status changes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestCategory {
    LeavePermit,
    LatePermit,
    EarlyOutPermit,
    OutPermit,
    OvertimeLetter,
}

impl RequestCategory {
    pub const ALL: [RequestCategory; 5] = [
        Self::LeavePermit,
        Self::LatePermit,
        Self::EarlyOutPermit,
        Self::OutPermit,
        Self::OvertimeLetter,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::LeavePermit => "leave_permit",
            Self::LatePermit => "late_permit",
            Self::EarlyOutPermit => "early_out_permit",
            Self::OutPermit => "out_permit",
            Self::OvertimeLetter => "overtime_letter",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "leave_permit" => Some(Self::LeavePermit),
            "late_permit" => Some(Self::LatePermit),
            "early_out_permit" => Some(Self::EarlyOutPermit),
            "out_permit" => Some(Self::OutPermit),
            "overtime_letter" => Some(Self::OvertimeLetter),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApprovalTransaction {
    pub id: ApprovalTransactionId,
    pub employee_id: EmployeeId,
    pub transaction_date: NaiveDate,
    pub category: RequestCategory,
    pub status: ApprovalStatus,
    pub reject_reason: Option<String>,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub created_by: String,
    pub updated_at: DateTime<Utc>,
    pub updated_by: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApprovalStamp {
    pub id: ApprovalStampId,
    pub transaction_id: ApprovalTransactionId,
    pub employee_id: EmployeeId,
    pub level: i64,
    pub status: ApprovalStatus,
    pub reject_reason: Option<String>,
    pub stamped_at: DateTime<Utc>,
}

/// Upsert payload for an approval transaction. An absent or blank `id` asks
/// the orchestrator to mint a new transaction; stamps, when non-empty,
/// replace the stored stamp set wholesale.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionForm {
    pub id: Option<ApprovalTransactionId>,
    pub employee_id: EmployeeId,
    pub transaction_date: NaiveDate,
    pub category: RequestCategory,
    pub status: ApprovalStatus,
    pub reject_reason: Option<String>,
    pub description: String,
    pub stamps: Vec<StampForm>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StampForm {
    pub employee_id: EmployeeId,
    pub level: i64,
    pub status: ApprovalStatus,
    pub reject_reason: Option<String>,
    pub stamped_at: Option<DateTime<Utc>>,
}
