pub mod adapters;
pub mod connection;
pub mod engine;
pub mod fixtures;
pub mod migrations;
pub mod repositories;
pub mod sync;
pub mod views;

pub use adapters::{NewAttachment, PermitAdapter};
pub use connection::{connect, connect_with_settings, DbPool};
pub use engine::{ApprovalEngine, SavedTransaction};
pub use fixtures::{SeedDataset, SeedSummary, SeedVerification};
pub use repositories::{
    RepositoryError, RequestStore, SqlEarlyOutPermitStore, SqlLatePermitStore,
    SqlLeaveSubmissionStore, SqlOutPermitStore, SqlOvertimeLetterStore,
};
pub use sync::{RequestTableSync, SourceSync, SyncOutcome, SyncRegistry};
pub use views::{ApproverView, ConfigListItem, ConfigView, Page, StampView, TransactionView};
