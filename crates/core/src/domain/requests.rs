use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::approval::{ApprovalStatus, ApprovalTransactionId, RequestCategory};
use crate::domain::directory::EmployeeId;

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RequestId(pub String);

impl RequestId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DocumentId(pub String);

/// Common surface the request-type adapter needs from a concrete request
/// record. The transaction link is a weak back-reference: the record points
/// at its transaction, never the other way around.
pub trait PermitRecord {
    const CATEGORY: RequestCategory;

    fn id(&self) -> &RequestId;
    fn employee_id(&self) -> &EmployeeId;
    /// One-line description pushed onto the backing approval transaction.
    fn summary(&self) -> String;
    fn approval_transaction_id(&self) -> Option<&ApprovalTransactionId>;
    fn link_approval(&mut self, transaction_id: ApprovalTransactionId, status: ApprovalStatus);
    fn document_ids(&self) -> &[DocumentId];
    fn attach_document(&mut self, id: DocumentId);
}

macro_rules! permit_record_common {
    ($category:expr, $summary:expr) => {
        const CATEGORY: RequestCategory = $category;

        fn id(&self) -> &RequestId {
            &self.id
        }

        fn employee_id(&self) -> &EmployeeId {
            &self.employee_id
        }

        fn summary(&self) -> String {
            ($summary)(self)
        }

        fn approval_transaction_id(&self) -> Option<&ApprovalTransactionId> {
            self.approval_transaction_id.as_ref()
        }

        fn link_approval(&mut self, transaction_id: ApprovalTransactionId, status: ApprovalStatus) {
            self.approval_transaction_id = Some(transaction_id);
            self.approval_status = status;
        }

        fn document_ids(&self) -> &[DocumentId] {
            &self.document_ids
        }

        fn attach_document(&mut self, id: DocumentId) {
            self.document_ids.push(id);
        }
    };
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaveSubmission {
    pub id: RequestId,
    pub employee_id: EmployeeId,
    pub leave_type: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub reason: String,
    pub approval_transaction_id: Option<ApprovalTransactionId>,
    pub approval_status: ApprovalStatus,
    pub document_ids: Vec<DocumentId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PermitRecord for LeaveSubmission {
    permit_record_common!(RequestCategory::LeavePermit, |record: &LeaveSubmission| format!(
        "{} leave {} to {}",
        record.leave_type, record.start_date, record.end_date
    ));
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LatePermit {
    pub id: RequestId,
    pub employee_id: EmployeeId,
    pub permit_date: NaiveDate,
    pub expected_arrival: NaiveTime,
    pub reason: String,
    pub approval_transaction_id: Option<ApprovalTransactionId>,
    pub approval_status: ApprovalStatus,
    pub document_ids: Vec<DocumentId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PermitRecord for LatePermit {
    permit_record_common!(RequestCategory::LatePermit, |record: &LatePermit| format!(
        "late arrival on {} around {}",
        record.permit_date, record.expected_arrival
    ));
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EarlyOutPermit {
    pub id: RequestId,
    pub employee_id: EmployeeId,
    pub permit_date: NaiveDate,
    pub leave_at: NaiveTime,
    pub reason: String,
    pub approval_transaction_id: Option<ApprovalTransactionId>,
    pub approval_status: ApprovalStatus,
    pub document_ids: Vec<DocumentId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PermitRecord for EarlyOutPermit {
    permit_record_common!(RequestCategory::EarlyOutPermit, |record: &EarlyOutPermit| format!(
        "early out on {} at {}",
        record.permit_date, record.leave_at
    ));
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutPermit {
    pub id: RequestId,
    pub employee_id: EmployeeId,
    pub permit_date: NaiveDate,
    pub leave_at: NaiveTime,
    pub return_at: NaiveTime,
    pub reason: String,
    pub approval_transaction_id: Option<ApprovalTransactionId>,
    pub approval_status: ApprovalStatus,
    pub document_ids: Vec<DocumentId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PermitRecord for OutPermit {
    permit_record_common!(RequestCategory::OutPermit, |record: &OutPermit| format!(
        "out of office on {} from {} to {}",
        record.permit_date, record.leave_at, record.return_at
    ));
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OvertimeLetter {
    pub id: RequestId,
    pub employee_id: EmployeeId,
    pub overtime_date: NaiveDate,
    pub start_at: NaiveTime,
    pub end_at: NaiveTime,
    pub description: String,
    pub approval_transaction_id: Option<ApprovalTransactionId>,
    pub approval_status: ApprovalStatus,
    pub document_ids: Vec<DocumentId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PermitRecord for OvertimeLetter {
    permit_record_common!(RequestCategory::OvertimeLetter, |record: &OvertimeLetter| format!(
        "overtime on {} from {} to {}",
        record.overtime_date, record.start_at, record.end_at
    ));
}
