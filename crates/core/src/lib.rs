pub mod approvals;
pub mod config;
pub mod context;
pub mod documents;
pub mod domain;
pub mod errors;
pub mod validate;

pub use approvals::{aggregate_status, draft_stamps, draft_stamps_at, ApprovalSelection};
pub use context::ActingUser;
pub use documents::{DocumentStore, DocumentStoreError, InMemoryDocumentStore};
pub use domain::approval::{
    ApprovalStamp, ApprovalStampId, ApprovalStatus, ApprovalTransaction, ApprovalTransactionId,
    RequestCategory, StampForm, TransactionForm,
};
pub use domain::config::{ApprovalConfig, ApprovalConfigId, Approver, ApproverForm, ApproverId, ConfigForm};
pub use domain::directory::{Employee, EmployeeId, Organization, OrganizationId};
pub use domain::requests::{
    DocumentId, EarlyOutPermit, LatePermit, LeaveSubmission, OutPermit, OvertimeLetter,
    PermitRecord, RequestId,
};
pub use errors::{AttachmentFailure, WorkflowError};
pub use validate::FieldError;
