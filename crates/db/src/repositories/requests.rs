//! Persistence for the five concrete request-record tables. Each store
//! exposes the same narrow surface the request-type adapter needs: find,
//! upsert, delete.

use async_trait::async_trait;
use sqlx::sqlite::SqliteRow;

use hrflow_core::domain::approval::ApprovalTransactionId;
use hrflow_core::domain::directory::EmployeeId;
use hrflow_core::domain::requests::{
    EarlyOutPermit, LatePermit, LeaveSubmission, OutPermit, OvertimeLetter, PermitRecord,
    RequestId,
};

use super::{
    col, decode_date, decode_datetime, decode_documents, decode_status, decode_time, encode_date,
    encode_documents, encode_time, RepositoryError,
};
use crate::DbPool;

#[async_trait]
pub trait RequestStore: Send + Sync {
    type Record: PermitRecord + Clone + Send + Sync;

    async fn find(&self, id: &RequestId) -> Result<Option<Self::Record>, RepositoryError>;
    async fn save(&self, record: &Self::Record) -> Result<(), RepositoryError>;
    async fn delete(&self, id: &RequestId) -> Result<u64, RepositoryError>;
}

fn transaction_link(row: &SqliteRow) -> Result<Option<ApprovalTransactionId>, RepositoryError> {
    Ok(col::<Option<String>>(row, "approval_transaction_id")?.map(ApprovalTransactionId))
}

pub struct SqlLeaveSubmissionStore {
    pool: DbPool,
}

impl SqlLeaveSubmissionStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn row_to_leave(row: &SqliteRow) -> Result<LeaveSubmission, RepositoryError> {
    Ok(LeaveSubmission {
        id: RequestId(col(row, "id")?),
        employee_id: EmployeeId(col(row, "employee_id")?),
        leave_type: col(row, "leave_type")?,
        start_date: decode_date("start_date", &col::<String>(row, "start_date")?)?,
        end_date: decode_date("end_date", &col::<String>(row, "end_date")?)?,
        reason: col(row, "reason")?,
        approval_transaction_id: transaction_link(row)?,
        approval_status: decode_status("approval_status", &col::<String>(row, "approval_status")?)?,
        document_ids: decode_documents("document_ids", &col::<String>(row, "document_ids")?)?,
        created_at: decode_datetime("created_at", &col::<String>(row, "created_at")?)?,
        updated_at: decode_datetime("updated_at", &col::<String>(row, "updated_at")?)?,
    })
}

#[async_trait]
impl RequestStore for SqlLeaveSubmissionStore {
    type Record = LeaveSubmission;

    async fn find(&self, id: &RequestId) -> Result<Option<LeaveSubmission>, RepositoryError> {
        let row = sqlx::query(
            "SELECT id, employee_id, leave_type, start_date, end_date, reason,
                    approval_transaction_id, approval_status, document_ids, created_at, updated_at
             FROM leave_submission WHERE id = ?",
        )
        .bind(&id.0)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(ref row) => Ok(Some(row_to_leave(row)?)),
            None => Ok(None),
        }
    }

    async fn save(&self, record: &LeaveSubmission) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT INTO leave_submission (id, employee_id, leave_type, start_date, end_date,
                                           reason, approval_transaction_id, approval_status,
                                           document_ids, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
             ON CONFLICT(id) DO UPDATE SET
                 employee_id = excluded.employee_id,
                 leave_type = excluded.leave_type,
                 start_date = excluded.start_date,
                 end_date = excluded.end_date,
                 reason = excluded.reason,
                 approval_transaction_id = excluded.approval_transaction_id,
                 approval_status = excluded.approval_status,
                 document_ids = excluded.document_ids,
                 updated_at = excluded.updated_at",
        )
        .bind(&record.id.0)
        .bind(&record.employee_id.0)
        .bind(&record.leave_type)
        .bind(encode_date(record.start_date))
        .bind(encode_date(record.end_date))
        .bind(&record.reason)
        .bind(record.approval_transaction_id.as_ref().map(|id| id.0.as_str()))
        .bind(record.approval_status.as_str())
        .bind(encode_documents(&record.document_ids))
        .bind(record.created_at.to_rfc3339())
        .bind(record.updated_at.to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn delete(&self, id: &RequestId) -> Result<u64, RepositoryError> {
        let result = sqlx::query("DELETE FROM leave_submission WHERE id = ?")
            .bind(&id.0)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}

pub struct SqlLatePermitStore {
    pool: DbPool,
}

impl SqlLatePermitStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn row_to_late(row: &SqliteRow) -> Result<LatePermit, RepositoryError> {
    Ok(LatePermit {
        id: RequestId(col(row, "id")?),
        employee_id: EmployeeId(col(row, "employee_id")?),
        permit_date: decode_date("permit_date", &col::<String>(row, "permit_date")?)?,
        expected_arrival: decode_time("expected_arrival", &col::<String>(row, "expected_arrival")?)?,
        reason: col(row, "reason")?,
        approval_transaction_id: transaction_link(row)?,
        approval_status: decode_status("approval_status", &col::<String>(row, "approval_status")?)?,
        document_ids: decode_documents("document_ids", &col::<String>(row, "document_ids")?)?,
        created_at: decode_datetime("created_at", &col::<String>(row, "created_at")?)?,
        updated_at: decode_datetime("updated_at", &col::<String>(row, "updated_at")?)?,
    })
}

#[async_trait]
impl RequestStore for SqlLatePermitStore {
    type Record = LatePermit;

    async fn find(&self, id: &RequestId) -> Result<Option<LatePermit>, RepositoryError> {
        let row = sqlx::query(
            "SELECT id, employee_id, permit_date, expected_arrival, reason,
                    approval_transaction_id, approval_status, document_ids, created_at, updated_at
             FROM late_permit WHERE id = ?",
        )
        .bind(&id.0)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(ref row) => Ok(Some(row_to_late(row)?)),
            None => Ok(None),
        }
    }

    async fn save(&self, record: &LatePermit) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT INTO late_permit (id, employee_id, permit_date, expected_arrival, reason,
                                      approval_transaction_id, approval_status, document_ids,
                                      created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
             ON CONFLICT(id) DO UPDATE SET
                 employee_id = excluded.employee_id,
                 permit_date = excluded.permit_date,
                 expected_arrival = excluded.expected_arrival,
                 reason = excluded.reason,
                 approval_transaction_id = excluded.approval_transaction_id,
                 approval_status = excluded.approval_status,
                 document_ids = excluded.document_ids,
                 updated_at = excluded.updated_at",
        )
        .bind(&record.id.0)
        .bind(&record.employee_id.0)
        .bind(encode_date(record.permit_date))
        .bind(encode_time(record.expected_arrival))
        .bind(&record.reason)
        .bind(record.approval_transaction_id.as_ref().map(|id| id.0.as_str()))
        .bind(record.approval_status.as_str())
        .bind(encode_documents(&record.document_ids))
        .bind(record.created_at.to_rfc3339())
        .bind(record.updated_at.to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn delete(&self, id: &RequestId) -> Result<u64, RepositoryError> {
        let result = sqlx::query("DELETE FROM late_permit WHERE id = ?")
            .bind(&id.0)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}

pub struct SqlEarlyOutPermitStore {
    pool: DbPool,
}

impl SqlEarlyOutPermitStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn row_to_early_out(row: &SqliteRow) -> Result<EarlyOutPermit, RepositoryError> {
    Ok(EarlyOutPermit {
        id: RequestId(col(row, "id")?),
        employee_id: EmployeeId(col(row, "employee_id")?),
        permit_date: decode_date("permit_date", &col::<String>(row, "permit_date")?)?,
        leave_at: decode_time("leave_at", &col::<String>(row, "leave_at")?)?,
        reason: col(row, "reason")?,
        approval_transaction_id: transaction_link(row)?,
        approval_status: decode_status("approval_status", &col::<String>(row, "approval_status")?)?,
        document_ids: decode_documents("document_ids", &col::<String>(row, "document_ids")?)?,
        created_at: decode_datetime("created_at", &col::<String>(row, "created_at")?)?,
        updated_at: decode_datetime("updated_at", &col::<String>(row, "updated_at")?)?,
    })
}

#[async_trait]
impl RequestStore for SqlEarlyOutPermitStore {
    type Record = EarlyOutPermit;

    async fn find(&self, id: &RequestId) -> Result<Option<EarlyOutPermit>, RepositoryError> {
        let row = sqlx::query(
            "SELECT id, employee_id, permit_date, leave_at, reason,
                    approval_transaction_id, approval_status, document_ids, created_at, updated_at
             FROM early_out_permit WHERE id = ?",
        )
        .bind(&id.0)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(ref row) => Ok(Some(row_to_early_out(row)?)),
            None => Ok(None),
        }
    }

    async fn save(&self, record: &EarlyOutPermit) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT INTO early_out_permit (id, employee_id, permit_date, leave_at, reason,
                                           approval_transaction_id, approval_status, document_ids,
                                           created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
             ON CONFLICT(id) DO UPDATE SET
                 employee_id = excluded.employee_id,
                 permit_date = excluded.permit_date,
                 leave_at = excluded.leave_at,
                 reason = excluded.reason,
                 approval_transaction_id = excluded.approval_transaction_id,
                 approval_status = excluded.approval_status,
                 document_ids = excluded.document_ids,
                 updated_at = excluded.updated_at",
        )
        .bind(&record.id.0)
        .bind(&record.employee_id.0)
        .bind(encode_date(record.permit_date))
        .bind(encode_time(record.leave_at))
        .bind(&record.reason)
        .bind(record.approval_transaction_id.as_ref().map(|id| id.0.as_str()))
        .bind(record.approval_status.as_str())
        .bind(encode_documents(&record.document_ids))
        .bind(record.created_at.to_rfc3339())
        .bind(record.updated_at.to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn delete(&self, id: &RequestId) -> Result<u64, RepositoryError> {
        let result = sqlx::query("DELETE FROM early_out_permit WHERE id = ?")
            .bind(&id.0)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}

pub struct SqlOutPermitStore {
    pool: DbPool,
}

impl SqlOutPermitStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn row_to_out(row: &SqliteRow) -> Result<OutPermit, RepositoryError> {
    Ok(OutPermit {
        id: RequestId(col(row, "id")?),
        employee_id: EmployeeId(col(row, "employee_id")?),
        permit_date: decode_date("permit_date", &col::<String>(row, "permit_date")?)?,
        leave_at: decode_time("leave_at", &col::<String>(row, "leave_at")?)?,
        return_at: decode_time("return_at", &col::<String>(row, "return_at")?)?,
        reason: col(row, "reason")?,
        approval_transaction_id: transaction_link(row)?,
        approval_status: decode_status("approval_status", &col::<String>(row, "approval_status")?)?,
        document_ids: decode_documents("document_ids", &col::<String>(row, "document_ids")?)?,
        created_at: decode_datetime("created_at", &col::<String>(row, "created_at")?)?,
        updated_at: decode_datetime("updated_at", &col::<String>(row, "updated_at")?)?,
    })
}

#[async_trait]
impl RequestStore for SqlOutPermitStore {
    type Record = OutPermit;

    async fn find(&self, id: &RequestId) -> Result<Option<OutPermit>, RepositoryError> {
        let row = sqlx::query(
            "SELECT id, employee_id, permit_date, leave_at, return_at, reason,
                    approval_transaction_id, approval_status, document_ids, created_at, updated_at
             FROM out_permit WHERE id = ?",
        )
        .bind(&id.0)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(ref row) => Ok(Some(row_to_out(row)?)),
            None => Ok(None),
        }
    }

    async fn save(&self, record: &OutPermit) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT INTO out_permit (id, employee_id, permit_date, leave_at, return_at, reason,
                                     approval_transaction_id, approval_status, document_ids,
                                     created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
             ON CONFLICT(id) DO UPDATE SET
                 employee_id = excluded.employee_id,
                 permit_date = excluded.permit_date,
                 leave_at = excluded.leave_at,
                 return_at = excluded.return_at,
                 reason = excluded.reason,
                 approval_transaction_id = excluded.approval_transaction_id,
                 approval_status = excluded.approval_status,
                 document_ids = excluded.document_ids,
                 updated_at = excluded.updated_at",
        )
        .bind(&record.id.0)
        .bind(&record.employee_id.0)
        .bind(encode_date(record.permit_date))
        .bind(encode_time(record.leave_at))
        .bind(encode_time(record.return_at))
        .bind(&record.reason)
        .bind(record.approval_transaction_id.as_ref().map(|id| id.0.as_str()))
        .bind(record.approval_status.as_str())
        .bind(encode_documents(&record.document_ids))
        .bind(record.created_at.to_rfc3339())
        .bind(record.updated_at.to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn delete(&self, id: &RequestId) -> Result<u64, RepositoryError> {
        let result = sqlx::query("DELETE FROM out_permit WHERE id = ?")
            .bind(&id.0)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}

pub struct SqlOvertimeLetterStore {
    pool: DbPool,
}

impl SqlOvertimeLetterStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn row_to_overtime(row: &SqliteRow) -> Result<OvertimeLetter, RepositoryError> {
    Ok(OvertimeLetter {
        id: RequestId(col(row, "id")?),
        employee_id: EmployeeId(col(row, "employee_id")?),
        overtime_date: decode_date("overtime_date", &col::<String>(row, "overtime_date")?)?,
        start_at: decode_time("start_at", &col::<String>(row, "start_at")?)?,
        end_at: decode_time("end_at", &col::<String>(row, "end_at")?)?,
        description: col(row, "description")?,
        approval_transaction_id: transaction_link(row)?,
        approval_status: decode_status("approval_status", &col::<String>(row, "approval_status")?)?,
        document_ids: decode_documents("document_ids", &col::<String>(row, "document_ids")?)?,
        created_at: decode_datetime("created_at", &col::<String>(row, "created_at")?)?,
        updated_at: decode_datetime("updated_at", &col::<String>(row, "updated_at")?)?,
    })
}

#[async_trait]
impl RequestStore for SqlOvertimeLetterStore {
    type Record = OvertimeLetter;

    async fn find(&self, id: &RequestId) -> Result<Option<OvertimeLetter>, RepositoryError> {
        let row = sqlx::query(
            "SELECT id, employee_id, overtime_date, start_at, end_at, description,
                    approval_transaction_id, approval_status, document_ids, created_at, updated_at
             FROM overtime_letter WHERE id = ?",
        )
        .bind(&id.0)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(ref row) => Ok(Some(row_to_overtime(row)?)),
            None => Ok(None),
        }
    }

    async fn save(&self, record: &OvertimeLetter) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT INTO overtime_letter (id, employee_id, overtime_date, start_at, end_at,
                                          description, approval_transaction_id, approval_status,
                                          document_ids, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
             ON CONFLICT(id) DO UPDATE SET
                 employee_id = excluded.employee_id,
                 overtime_date = excluded.overtime_date,
                 start_at = excluded.start_at,
                 end_at = excluded.end_at,
                 description = excluded.description,
                 approval_transaction_id = excluded.approval_transaction_id,
                 approval_status = excluded.approval_status,
                 document_ids = excluded.document_ids,
                 updated_at = excluded.updated_at",
        )
        .bind(&record.id.0)
        .bind(&record.employee_id.0)
        .bind(encode_date(record.overtime_date))
        .bind(encode_time(record.start_at))
        .bind(encode_time(record.end_at))
        .bind(&record.description)
        .bind(record.approval_transaction_id.as_ref().map(|id| id.0.as_str()))
        .bind(record.approval_status.as_str())
        .bind(encode_documents(&record.document_ids))
        .bind(record.created_at.to_rfc3339())
        .bind(record.updated_at.to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn delete(&self, id: &RequestId) -> Result<u64, RepositoryError> {
        let result = sqlx::query("DELETE FROM overtime_letter WHERE id = ?")
            .bind(&id.0)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}
