use sqlx::sqlite::SqliteRow;
use sqlx::SqliteConnection;

use hrflow_core::domain::approval::{
    ApprovalStamp, ApprovalStampId, ApprovalStatus, ApprovalTransaction, ApprovalTransactionId,
};
use hrflow_core::domain::directory::EmployeeId;

use super::{
    col, decode_category, decode_date, decode_datetime, decode_status, encode_date,
    RepositoryError,
};
use crate::views::{StampView, TransactionView};
use crate::DbPool;

fn row_to_transaction(row: &SqliteRow) -> Result<ApprovalTransaction, RepositoryError> {
    Ok(ApprovalTransaction {
        id: ApprovalTransactionId(col(row, "id")?),
        employee_id: EmployeeId(col(row, "employee_id")?),
        transaction_date: decode_date("transaction_date", &col::<String>(row, "transaction_date")?)?,
        category: decode_category("category", &col::<String>(row, "category")?)?,
        status: decode_status("status", &col::<String>(row, "status")?)?,
        reject_reason: col(row, "reject_reason")?,
        description: col(row, "description")?,
        created_at: decode_datetime("created_at", &col::<String>(row, "created_at")?)?,
        created_by: col(row, "created_by")?,
        updated_at: decode_datetime("updated_at", &col::<String>(row, "updated_at")?)?,
        updated_by: col(row, "updated_by")?,
    })
}

fn row_to_stamp(row: &SqliteRow) -> Result<ApprovalStamp, RepositoryError> {
    Ok(ApprovalStamp {
        id: ApprovalStampId(col(row, "id")?),
        transaction_id: ApprovalTransactionId(col(row, "approval_transaction_id")?),
        employee_id: EmployeeId(col(row, "employee_id")?),
        level: col(row, "level")?,
        status: decode_status("status", &col::<String>(row, "status")?)?,
        reject_reason: col(row, "reject_reason")?,
        stamped_at: decode_datetime("stamped_at", &col::<String>(row, "stamped_at")?)?,
    })
}

pub(crate) async fn find_by_id(
    conn: &mut SqliteConnection,
    id: &ApprovalTransactionId,
) -> Result<Option<ApprovalTransaction>, RepositoryError> {
    let row = sqlx::query(
        "SELECT id, employee_id, transaction_date, category, status, reject_reason,
                description, created_at, created_by, updated_at, updated_by
         FROM approval_transaction WHERE id = ?",
    )
    .bind(&id.0)
    .fetch_optional(conn)
    .await?;

    match row {
        Some(ref row) => Ok(Some(row_to_transaction(row)?)),
        None => Ok(None),
    }
}

pub(crate) async fn insert(
    conn: &mut SqliteConnection,
    transaction: &ApprovalTransaction,
) -> Result<(), RepositoryError> {
    sqlx::query(
        "INSERT INTO approval_transaction (id, employee_id, transaction_date, category, status,
                                           reject_reason, description, created_at, created_by,
                                           updated_at, updated_by)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&transaction.id.0)
    .bind(&transaction.employee_id.0)
    .bind(encode_date(transaction.transaction_date))
    .bind(transaction.category.as_str())
    .bind(transaction.status.as_str())
    .bind(&transaction.reject_reason)
    .bind(&transaction.description)
    .bind(transaction.created_at.to_rfc3339())
    .bind(&transaction.created_by)
    .bind(transaction.updated_at.to_rfc3339())
    .bind(&transaction.updated_by)
    .execute(conn)
    .await?;

    Ok(())
}

pub(crate) async fn update(
    conn: &mut SqliteConnection,
    transaction: &ApprovalTransaction,
) -> Result<(), RepositoryError> {
    sqlx::query(
        "UPDATE approval_transaction
         SET employee_id = ?, transaction_date = ?, category = ?, status = ?,
             reject_reason = ?, description = ?, updated_at = ?, updated_by = ?
         WHERE id = ?",
    )
    .bind(&transaction.employee_id.0)
    .bind(encode_date(transaction.transaction_date))
    .bind(transaction.category.as_str())
    .bind(transaction.status.as_str())
    .bind(&transaction.reject_reason)
    .bind(&transaction.description)
    .bind(transaction.updated_at.to_rfc3339())
    .bind(&transaction.updated_by)
    .bind(&transaction.id.0)
    .execute(conn)
    .await?;

    Ok(())
}

pub(crate) async fn delete(
    conn: &mut SqliteConnection,
    id: &ApprovalTransactionId,
) -> Result<u64, RepositoryError> {
    let result = sqlx::query("DELETE FROM approval_transaction WHERE id = ?")
        .bind(&id.0)
        .execute(conn)
        .await?;
    Ok(result.rows_affected())
}

pub(crate) async fn delete_stamps(
    conn: &mut SqliteConnection,
    transaction_id: &ApprovalTransactionId,
) -> Result<u64, RepositoryError> {
    let result = sqlx::query("DELETE FROM approval_stamp WHERE approval_transaction_id = ?")
        .bind(&transaction_id.0)
        .execute(conn)
        .await?;
    Ok(result.rows_affected())
}

pub(crate) async fn insert_stamps(
    conn: &mut SqliteConnection,
    stamps: &[ApprovalStamp],
) -> Result<(), RepositoryError> {
    for stamp in stamps {
        sqlx::query(
            "INSERT INTO approval_stamp (id, approval_transaction_id, employee_id, level,
                                         status, reject_reason, stamped_at)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&stamp.id.0)
        .bind(&stamp.transaction_id.0)
        .bind(&stamp.employee_id.0)
        .bind(stamp.level)
        .bind(stamp.status.as_str())
        .bind(&stamp.reject_reason)
        .bind(stamp.stamped_at.to_rfc3339())
        .execute(&mut *conn)
        .await?;
    }

    Ok(())
}

/// Resolve a transaction together with its stamps and the display name of
/// each stamping approver.
pub async fn load_view(
    pool: &DbPool,
    id: &ApprovalTransactionId,
) -> Result<Option<TransactionView>, RepositoryError> {
    let row = sqlx::query(
        "SELECT id, employee_id, transaction_date, category, status, reject_reason,
                description, created_at, created_by, updated_at, updated_by
         FROM approval_transaction WHERE id = ?",
    )
    .bind(&id.0)
    .fetch_optional(pool)
    .await?;

    let Some(ref row) = row else {
        return Ok(None);
    };
    let transaction = row_to_transaction(row)?;

    let stamp_rows = sqlx::query(
        "SELECT s.id, s.approval_transaction_id, s.employee_id, s.level, s.status,
                s.reject_reason, s.stamped_at, e.full_name AS approver_name
         FROM approval_stamp s
         LEFT JOIN employee e ON e.id = s.employee_id
         WHERE s.approval_transaction_id = ?
         ORDER BY s.level ASC, s.stamped_at ASC",
    )
    .bind(&id.0)
    .fetch_all(pool)
    .await?;

    let stamps = stamp_rows
        .iter()
        .map(|row| {
            Ok(StampView {
                stamp: row_to_stamp(row)?,
                approver_name: col(row, "approver_name")?,
            })
        })
        .collect::<Result<Vec<_>, RepositoryError>>()?;

    Ok(Some(TransactionView { transaction, stamps }))
}

/// Stamp rows for a transaction, oldest level first. Used by tests and the
/// seed verifier; the orchestrator always replaces rather than reads.
pub async fn load_stamps(
    pool: &DbPool,
    transaction_id: &ApprovalTransactionId,
) -> Result<Vec<ApprovalStamp>, RepositoryError> {
    let rows = sqlx::query(
        "SELECT id, approval_transaction_id, employee_id, level, status, reject_reason, stamped_at
         FROM approval_stamp
         WHERE approval_transaction_id = ?
         ORDER BY level ASC, stamped_at ASC",
    )
    .bind(&transaction_id.0)
    .fetch_all(pool)
    .await?;

    rows.iter().map(row_to_stamp).collect()
}

/// Direct status probe used by adapters and tests.
pub async fn load_status(
    pool: &DbPool,
    id: &ApprovalTransactionId,
) -> Result<Option<ApprovalStatus>, RepositoryError> {
    let row = sqlx::query("SELECT status FROM approval_transaction WHERE id = ?")
        .bind(&id.0)
        .fetch_optional(pool)
        .await?;

    match row {
        Some(ref row) => Ok(Some(decode_status("status", &col::<String>(row, "status")?)?)),
        None => Ok(None),
    }
}
