use serde::{Deserialize, Serialize};

use crate::domain::directory::EmployeeId;

/// The acting user for an operation, threaded explicitly into every call
/// that writes audit columns. Nothing here is resolved from ambient state.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActingUser {
    pub employee_id: EmployeeId,
    pub display_name: String,
}

impl ActingUser {
    pub fn new(employee_id: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self { employee_id: EmployeeId(employee_id.into()), display_name: display_name.into() }
    }

    /// Fallback identity for unattended callers such as the CLI seeder.
    pub fn system() -> Self {
        Self::new("system", "system")
    }

    /// Value written into CreatedBy/UpdatedBy columns.
    pub fn audit_name(&self) -> &str {
        &self.employee_id.0
    }
}
