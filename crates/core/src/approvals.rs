//! Pure approval arithmetic: reducing a stamp set to one aggregate status,
//! and drafting pending stamps from approver selections.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::approval::{ApprovalStatus, StampForm};
use crate::domain::directory::EmployeeId;

/// Reduce a set of per-stamp decisions to the transaction-level status.
///
/// The fold is order-independent and level-agnostic: a reject anywhere wins,
/// then a revision request, then unanimity of approvals. Anything else,
/// including an empty set and a partial set of approvals, is still waiting.
pub fn aggregate_status<I>(statuses: I) -> ApprovalStatus
where
    I: IntoIterator<Item = ApprovalStatus>,
{
    let mut seen_any = false;
    let mut all_approve = true;
    let mut any_revision = false;

    for status in statuses {
        seen_any = true;
        match status {
            ApprovalStatus::Reject => return ApprovalStatus::Reject,
            ApprovalStatus::Revision => any_revision = true,
            ApprovalStatus::Approve => {}
            ApprovalStatus::New | ApprovalStatus::Waiting => all_approve = false,
        }
    }

    if any_revision {
        ApprovalStatus::Revision
    } else if seen_any && all_approve {
        ApprovalStatus::Approve
    } else {
        ApprovalStatus::Waiting
    }
}

/// One approver picked from a config chain when a request is submitted.
/// `action` mirrors the configured label; it is carried for display and is
/// not persisted on the stamp itself.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApprovalSelection {
    pub employee_id: EmployeeId,
    pub name: String,
    pub level: i64,
    pub action: String,
}

/// Convert approver selections into fresh pending stamps for inclusion in a
/// new transaction form.
pub fn draft_stamps(selections: &[ApprovalSelection]) -> Vec<StampForm> {
    draft_stamps_at(selections, None)
}

pub fn draft_stamps_at(
    selections: &[ApprovalSelection],
    stamped_at: Option<DateTime<Utc>>,
) -> Vec<StampForm> {
    selections
        .iter()
        .map(|selection| StampForm {
            employee_id: selection.employee_id.clone(),
            level: selection.level,
            status: ApprovalStatus::Waiting,
            reject_reason: None,
            stamped_at,
        })
        .collect()
}
