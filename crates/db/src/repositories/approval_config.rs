use sqlx::sqlite::SqliteRow;
use sqlx::SqliteConnection;

use hrflow_core::domain::config::{ApprovalConfig, ApprovalConfigId, Approver, ApproverId};
use hrflow_core::domain::directory::{EmployeeId, Organization, OrganizationId};

use super::{col, decode_datetime, RepositoryError};
use crate::views::{ApproverView, ConfigListItem, ConfigView, Page};
use crate::DbPool;

fn row_to_config(row: &SqliteRow) -> Result<ApprovalConfig, RepositoryError> {
    Ok(ApprovalConfig {
        id: ApprovalConfigId(col(row, "id")?),
        organization_id: OrganizationId(col(row, "organization_id")?),
        description: col(row, "description")?,
        created_at: decode_datetime("created_at", &col::<String>(row, "created_at")?)?,
        created_by: col(row, "created_by")?,
        updated_at: decode_datetime("updated_at", &col::<String>(row, "updated_at")?)?,
        updated_by: col(row, "updated_by")?,
    })
}

fn row_to_approver(row: &SqliteRow) -> Result<Approver, RepositoryError> {
    Ok(Approver {
        id: ApproverId(col(row, "id")?),
        config_id: ApprovalConfigId(col(row, "approval_config_id")?),
        employee_id: EmployeeId(col(row, "employee_id")?),
        name: col(row, "name")?,
        level: col(row, "level")?,
        action: col(row, "action")?,
    })
}

fn row_to_list_item(row: &SqliteRow) -> Result<ConfigListItem, RepositoryError> {
    Ok(ConfigListItem {
        id: ApprovalConfigId(col(row, "id")?),
        organization_id: OrganizationId(col(row, "organization_id")?),
        organization_name: col(row, "organization_name")?,
        company_code: col(row, "company_code")?,
        company_name: col(row, "company_name")?,
        description: col(row, "description")?,
        approver_count: col(row, "approver_count")?,
    })
}

pub(crate) async fn find_by_id(
    conn: &mut SqliteConnection,
    id: &ApprovalConfigId,
) -> Result<Option<ApprovalConfig>, RepositoryError> {
    let row = sqlx::query(
        "SELECT id, organization_id, description, created_at, created_by, updated_at, updated_by
         FROM approval_config WHERE id = ?",
    )
    .bind(&id.0)
    .fetch_optional(conn)
    .await?;

    match row {
        Some(ref row) => Ok(Some(row_to_config(row)?)),
        None => Ok(None),
    }
}

pub(crate) async fn insert(
    conn: &mut SqliteConnection,
    config: &ApprovalConfig,
) -> Result<(), RepositoryError> {
    sqlx::query(
        "INSERT INTO approval_config (id, organization_id, description, created_at, created_by,
                                      updated_at, updated_by)
         VALUES (?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&config.id.0)
    .bind(&config.organization_id.0)
    .bind(&config.description)
    .bind(config.created_at.to_rfc3339())
    .bind(&config.created_by)
    .bind(config.updated_at.to_rfc3339())
    .bind(&config.updated_by)
    .execute(conn)
    .await?;

    Ok(())
}

pub(crate) async fn update(
    conn: &mut SqliteConnection,
    config: &ApprovalConfig,
) -> Result<(), RepositoryError> {
    sqlx::query(
        "UPDATE approval_config
         SET organization_id = ?, description = ?, updated_at = ?, updated_by = ?
         WHERE id = ?",
    )
    .bind(&config.organization_id.0)
    .bind(&config.description)
    .bind(config.updated_at.to_rfc3339())
    .bind(&config.updated_by)
    .bind(&config.id.0)
    .execute(conn)
    .await?;

    Ok(())
}

pub(crate) async fn delete(
    conn: &mut SqliteConnection,
    id: &ApprovalConfigId,
) -> Result<u64, RepositoryError> {
    let result =
        sqlx::query("DELETE FROM approval_config WHERE id = ?").bind(&id.0).execute(conn).await?;
    Ok(result.rows_affected())
}

pub(crate) async fn delete_approvers(
    conn: &mut SqliteConnection,
    config_id: &ApprovalConfigId,
) -> Result<u64, RepositoryError> {
    let result = sqlx::query("DELETE FROM approver WHERE approval_config_id = ?")
        .bind(&config_id.0)
        .execute(conn)
        .await?;
    Ok(result.rows_affected())
}

pub(crate) async fn insert_approvers(
    conn: &mut SqliteConnection,
    approvers: &[Approver],
) -> Result<(), RepositoryError> {
    for approver in approvers {
        sqlx::query(
            "INSERT INTO approver (id, approval_config_id, employee_id, name, level, action)
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&approver.id.0)
        .bind(&approver.config_id.0)
        .bind(&approver.employee_id.0)
        .bind(&approver.name)
        .bind(approver.level)
        .bind(&approver.action)
        .execute(&mut *conn)
        .await?;
    }

    Ok(())
}

/// Resolve a config with its organization and its approver chain, each
/// approver joined with the employee's display name.
pub async fn load_view(
    pool: &DbPool,
    id: &ApprovalConfigId,
) -> Result<Option<ConfigView>, RepositoryError> {
    let row = sqlx::query(
        "SELECT c.id, c.organization_id, c.description, c.created_at, c.created_by,
                c.updated_at, c.updated_by,
                o.id AS org_id, o.company_code, o.company_name, o.name AS org_name
         FROM approval_config c
         LEFT JOIN organization o ON o.id = c.organization_id
         WHERE c.id = ?",
    )
    .bind(&id.0)
    .fetch_optional(pool)
    .await?;

    let Some(ref row) = row else {
        return Ok(None);
    };
    let config = row_to_config(row)?;
    let organization = match col::<Option<String>>(row, "org_id")? {
        Some(org_id) => Some(Organization {
            id: OrganizationId(org_id),
            company_code: col::<Option<String>>(row, "company_code")?.unwrap_or_default(),
            company_name: col::<Option<String>>(row, "company_name")?.unwrap_or_default(),
            name: col::<Option<String>>(row, "org_name")?.unwrap_or_default(),
        }),
        None => None,
    };

    let approver_rows = sqlx::query(
        "SELECT a.id, a.approval_config_id, a.employee_id, a.name, a.level, a.action,
                e.full_name AS employee_name
         FROM approver a
         LEFT JOIN employee e ON e.id = a.employee_id
         WHERE a.approval_config_id = ?
         ORDER BY a.level ASC, a.name ASC",
    )
    .bind(&id.0)
    .fetch_all(pool)
    .await?;

    let approvers = approver_rows
        .iter()
        .map(|row| {
            Ok(ApproverView {
                approver: row_to_approver(row)?,
                employee_name: col(row, "employee_name")?,
            })
        })
        .collect::<Result<Vec<_>, RepositoryError>>()?;

    Ok(Some(ConfigView { config, organization, approvers }))
}

const LIST_SELECT: &str = "SELECT c.id, c.organization_id, c.description,
        o.name AS organization_name, o.company_code, o.company_name,
        (SELECT COUNT(*) FROM approver a WHERE a.approval_config_id = c.id) AS approver_count
 FROM approval_config c
 LEFT JOIN organization o ON o.id = c.organization_id";

pub async fn list(pool: &DbPool) -> Result<Vec<ConfigListItem>, RepositoryError> {
    let sql = format!("{LIST_SELECT} ORDER BY c.updated_at DESC");
    let rows = sqlx::query(&sql).fetch_all(pool).await?;
    rows.iter().map(row_to_list_item).collect()
}

/// Case-insensitive substring search over company code, company name,
/// organization name, and config description.
pub async fn paginate(
    pool: &DbPool,
    page: u32,
    per_page: u32,
    search: Option<&str>,
) -> Result<Page<ConfigListItem>, RepositoryError> {
    let page = page.max(1);
    let per_page = per_page.clamp(1, 100);
    let pattern = search
        .map(str::trim)
        .filter(|term| !term.is_empty())
        .map(|term| format!("%{}%", term.to_lowercase()));

    let filter = " WHERE lower(IFNULL(o.company_code, '')) LIKE ?
        OR lower(IFNULL(o.company_name, '')) LIKE ?
        OR lower(IFNULL(o.name, '')) LIKE ?
        OR lower(c.description) LIKE ?";

    let (rows, total) = if let Some(ref pattern) = pattern {
        let sql = format!(
            "{LIST_SELECT}{filter} ORDER BY c.updated_at DESC LIMIT ? OFFSET ?"
        );
        let rows = sqlx::query(&sql)
            .bind(pattern)
            .bind(pattern)
            .bind(pattern)
            .bind(pattern)
            .bind(per_page)
            .bind((page - 1) * per_page)
            .fetch_all(pool)
            .await?;

        let count_sql = format!(
            "SELECT COUNT(*) AS total FROM approval_config c
             LEFT JOIN organization o ON o.id = c.organization_id{filter}"
        );
        let total: i64 = sqlx::query_scalar(&count_sql)
            .bind(pattern)
            .bind(pattern)
            .bind(pattern)
            .bind(pattern)
            .fetch_one(pool)
            .await?;
        (rows, total)
    } else {
        let sql = format!("{LIST_SELECT} ORDER BY c.updated_at DESC LIMIT ? OFFSET ?");
        let rows = sqlx::query(&sql)
            .bind(per_page)
            .bind((page - 1) * per_page)
            .fetch_all(pool)
            .await?;

        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM approval_config")
            .fetch_one(pool)
            .await?;
        (rows, total)
    };

    let items = rows.iter().map(row_to_list_item).collect::<Result<Vec<_>, _>>()?;
    Ok(Page { items, page, per_page, total: total.max(0) as u64 })
}

/// Count probe used by tests and the seed verifier.
pub async fn count_approvers(
    pool: &DbPool,
    config_id: &ApprovalConfigId,
) -> Result<i64, RepositoryError> {
    let total: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM approver WHERE approval_config_id = ?")
            .bind(&config_id.0)
            .fetch_one(pool)
            .await?;
    Ok(total)
}
