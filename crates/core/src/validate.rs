//! Field-level validation for workflow upsert payloads. Each function
//! returns every failure it finds so callers can surface them together
//! instead of stopping at the first.

use serde::{Deserialize, Serialize};

use crate::domain::approval::{ApprovalStamp, ApprovalStatus, TransactionForm};
use crate::domain::config::{ApproverForm, ConfigForm};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self { field: field.into(), message: message.into() }
    }
}

fn require(issues: &mut Vec<FieldError>, field: &str, value: &str, message: &str) {
    if value.trim().is_empty() {
        issues.push(FieldError::new(field, message));
    }
}

pub fn validate_config(form: &ConfigForm) -> Vec<FieldError> {
    let mut issues = Vec::new();
    require(
        &mut issues,
        "organization_id",
        &form.organization_id.0,
        "owning organization is required",
    );
    require(&mut issues, "description", &form.description, "description is required");
    issues
}

/// Approver forms are validated one by one after being stamped with the
/// resolved config key; the `index` keeps messages attributable when the
/// whole list is reported at once.
pub fn validate_approver(index: usize, form: &ApproverForm) -> Vec<FieldError> {
    let mut issues = Vec::new();
    require(
        &mut issues,
        &format!("approvers[{index}].employee_id"),
        &form.employee_id.0,
        "approver employee is required",
    );
    require(
        &mut issues,
        &format!("approvers[{index}].name"),
        &form.name,
        "approver name is required",
    );
    if form.level < 1 {
        issues.push(FieldError::new(
            format!("approvers[{index}].level"),
            "approver level must be at least 1",
        ));
    }
    require(
        &mut issues,
        &format!("approvers[{index}].action"),
        &form.action,
        "approver action label is required",
    );
    issues
}

pub fn validate_transaction(form: &TransactionForm) -> Vec<FieldError> {
    let mut issues = Vec::new();
    require(&mut issues, "employee_id", &form.employee_id.0, "submitting employee is required");
    issues
}

/// Stamps are validated after the orchestrator resolves their transaction
/// key, so only the decision fields are checked here.
pub fn validate_stamp(index: usize, stamp: &ApprovalStamp) -> Vec<FieldError> {
    let mut issues = Vec::new();
    require(
        &mut issues,
        &format!("stamps[{index}].employee_id"),
        &stamp.employee_id.0,
        "stamp approver is required",
    );
    if stamp.level < 1 {
        issues.push(FieldError::new(
            format!("stamps[{index}].level"),
            "stamp level must be at least 1",
        ));
    }
    if stamp.status == ApprovalStatus::Reject
        && stamp.reject_reason.as_deref().map(str::trim).unwrap_or("").is_empty()
    {
        issues.push(FieldError::new(
            format!("stamps[{index}].reject_reason"),
            "a reject decision requires a reason",
        ));
    }
    issues
}
