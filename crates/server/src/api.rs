//! JSON API for the approval workflow engine.
//!
//! Endpoints:
//! - `GET    /api/v1/approval-configs`            — paginate + search configs
//! - `POST   /api/v1/approval-configs`            — upsert a config (replaces approvers)
//! - `GET    /api/v1/approval-configs/{id}`       — config with organization and approvers
//! - `DELETE /api/v1/approval-configs/{id}`       — delete config and its approvers
//! - `POST   /api/v1/approval-transactions`       — upsert a transaction (replaces stamps)
//! - `GET    /api/v1/approval-transactions/{id}`  — transaction with stamps and approver names
//! - `DELETE /api/v1/approval-transactions/{id}`  — delete transaction and its stamps
//! - `POST   /api/v1/approval-stamps/draft`       — draft pending stamps from approver selections
//!
//! The acting user is taken from the `x-actor-id` / `x-actor-name` headers;
//! unidentified callers are audited as `system`.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use hrflow_core::approvals::{draft_stamps, ApprovalSelection};
use hrflow_core::context::ActingUser;
use hrflow_core::domain::approval::{
    ApprovalStatus, ApprovalTransactionId, RequestCategory, StampForm, TransactionForm,
};
use hrflow_core::domain::config::{ApprovalConfigId, ApproverForm, ConfigForm};
use hrflow_core::domain::directory::{EmployeeId, OrganizationId};
use hrflow_core::errors::WorkflowError;
use hrflow_core::validate::FieldError;
use hrflow_db::views::{ConfigListItem, ConfigView, Page, TransactionView};
use hrflow_db::ApprovalEngine;

#[derive(Clone)]
pub struct ApiState {
    engine: Arc<ApprovalEngine>,
}

pub fn router(engine: Arc<ApprovalEngine>) -> Router {
    Router::new()
        .route("/api/v1/approval-configs", get(list_configs).post(save_config))
        .route("/api/v1/approval-configs/{id}", get(get_config).delete(delete_config))
        .route("/api/v1/approval-transactions", post(save_transaction))
        .route(
            "/api/v1/approval-transactions/{id}",
            get(get_transaction).delete(delete_transaction),
        )
        .route("/api/v1/approval-stamps/draft", post(draft_stamp_set))
        .with_state(ApiState { engine })
}

// ---------------------------------------------------------------------------
// Request / Response types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct SaveTransactionRequest {
    pub id: Option<String>,
    pub employee_id: String,
    pub transaction_date: NaiveDate,
    pub category: RequestCategory,
    #[serde(default)]
    pub status: Option<ApprovalStatus>,
    pub reject_reason: Option<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub stamps: Vec<StampRequest>,
}

#[derive(Debug, Deserialize)]
pub struct StampRequest {
    pub employee_id: String,
    pub level: i64,
    pub status: ApprovalStatus,
    pub reject_reason: Option<String>,
    pub stamped_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize)]
pub struct SavedTransactionResponse {
    pub id: String,
    pub status: ApprovalStatus,
}

#[derive(Debug, Deserialize)]
pub struct SaveConfigRequest {
    pub id: Option<String>,
    pub organization_id: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub approvers: Vec<ApproverRequest>,
}

#[derive(Debug, Deserialize)]
pub struct ApproverRequest {
    pub employee_id: String,
    pub name: String,
    pub level: i64,
    pub action: String,
}

#[derive(Debug, Serialize)]
pub struct SavedConfigResponse {
    pub id: String,
}

#[derive(Debug, Serialize)]
pub struct DeletedResponse {
    pub success: bool,
}

#[derive(Debug, Deserialize)]
pub struct SelectionRequest {
    pub employee_id: String,
    pub name: String,
    pub level: i64,
    pub action: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct ConfigPageQuery {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    pub search: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<FieldError>>,
}

type ApiFailure = (StatusCode, Json<ApiError>);

fn failure(error: WorkflowError) -> ApiFailure {
    let status = match &error {
        WorkflowError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
        WorkflowError::NotFound { .. } => StatusCode::NOT_FOUND,
        WorkflowError::Attachments(_) => StatusCode::CONFLICT,
        WorkflowError::SyncSkipped { .. } | WorkflowError::Persistence(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    let details = match &error {
        WorkflowError::Validation(issues) => Some(issues.clone()),
        _ => None,
    };
    (status, Json(ApiError { error: error.to_string(), details }))
}

fn acting_user(headers: &HeaderMap) -> ActingUser {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(str::to_string)
    };

    match header("x-actor-id") {
        Some(id) => {
            let name = header("x-actor-name").unwrap_or_else(|| id.clone());
            ActingUser::new(id, name)
        }
        None => ActingUser::system(),
    }
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

pub async fn save_transaction(
    State(state): State<ApiState>,
    headers: HeaderMap,
    Json(body): Json<SaveTransactionRequest>,
) -> Result<Json<SavedTransactionResponse>, ApiFailure> {
    let actor = acting_user(&headers);
    let form = TransactionForm {
        id: body.id.map(ApprovalTransactionId),
        employee_id: EmployeeId(body.employee_id),
        transaction_date: body.transaction_date,
        category: body.category,
        status: body.status.unwrap_or(ApprovalStatus::New),
        reject_reason: body.reject_reason,
        description: body.description,
        stamps: body
            .stamps
            .into_iter()
            .map(|stamp| StampForm {
                employee_id: EmployeeId(stamp.employee_id),
                level: stamp.level,
                status: stamp.status,
                reject_reason: stamp.reject_reason,
                stamped_at: stamp.stamped_at,
            })
            .collect(),
    };

    let saved = state.engine.save_transaction(&actor, form).await.map_err(failure)?;
    Ok(Json(SavedTransactionResponse { id: saved.id.0, status: saved.status }))
}

pub async fn get_transaction(
    State(state): State<ApiState>,
    Path(id): Path<String>,
) -> Result<Json<TransactionView>, ApiFailure> {
    let view = state
        .engine
        .get_transaction(&ApprovalTransactionId(id))
        .await
        .map_err(failure)?;
    Ok(Json(view))
}

pub async fn delete_transaction(
    State(state): State<ApiState>,
    Path(id): Path<String>,
) -> Result<Json<DeletedResponse>, ApiFailure> {
    state
        .engine
        .delete_transaction(&ApprovalTransactionId(id))
        .await
        .map_err(failure)?;
    Ok(Json(DeletedResponse { success: true }))
}

pub async fn save_config(
    State(state): State<ApiState>,
    headers: HeaderMap,
    Json(body): Json<SaveConfigRequest>,
) -> Result<Json<SavedConfigResponse>, ApiFailure> {
    let actor = acting_user(&headers);
    let form = ConfigForm {
        id: body.id.map(ApprovalConfigId),
        organization_id: OrganizationId(body.organization_id),
        description: body.description,
        approvers: body
            .approvers
            .into_iter()
            .map(|approver| ApproverForm {
                employee_id: EmployeeId(approver.employee_id),
                name: approver.name,
                level: approver.level,
                action: approver.action,
            })
            .collect(),
    };

    let id = state.engine.save_config(&actor, form).await.map_err(failure)?;
    Ok(Json(SavedConfigResponse { id: id.0 }))
}

pub async fn get_config(
    State(state): State<ApiState>,
    Path(id): Path<String>,
) -> Result<Json<ConfigView>, ApiFailure> {
    let view = state.engine.get_config(&ApprovalConfigId(id)).await.map_err(failure)?;
    Ok(Json(view))
}

pub async fn delete_config(
    State(state): State<ApiState>,
    Path(id): Path<String>,
) -> Result<Json<DeletedResponse>, ApiFailure> {
    state.engine.delete_config(&ApprovalConfigId(id)).await.map_err(failure)?;
    Ok(Json(DeletedResponse { success: true }))
}

pub async fn list_configs(
    State(state): State<ApiState>,
    Query(query): Query<ConfigPageQuery>,
) -> Result<Json<Page<ConfigListItem>>, ApiFailure> {
    let page = state
        .engine
        .paginate_configs(
            query.page.unwrap_or(1),
            query.per_page.unwrap_or(20),
            query.search.as_deref(),
        )
        .await
        .map_err(failure)?;
    Ok(Json(page))
}

pub async fn draft_stamp_set(
    Json(body): Json<Vec<SelectionRequest>>,
) -> Json<Vec<StampForm>> {
    let selections: Vec<ApprovalSelection> = body
        .into_iter()
        .map(|selection| ApprovalSelection {
            employee_id: EmployeeId(selection.employee_id),
            name: selection.name,
            level: selection.level,
            action: selection.action,
        })
        .collect();
    Json(draft_stamps(&selections))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::extract::{Path, Query, State};
    use axum::http::{HeaderMap, HeaderValue, StatusCode};
    use axum::Json;
    use chrono::NaiveDate;

    use hrflow_core::domain::approval::{ApprovalStatus, RequestCategory};
    use hrflow_db::{connect_with_settings, migrations, ApprovalEngine, SyncRegistry};

    use super::{
        delete_transaction, draft_stamp_set, get_transaction, list_configs, save_config,
        save_transaction, ApiState, ConfigPageQuery, SaveConfigRequest, SaveTransactionRequest,
        SelectionRequest, StampRequest,
    };

    async fn state() -> ApiState {
        let pool = connect_with_settings("sqlite::memory:", 1, 30).await.expect("connect");
        migrations::run_pending(&pool).await.expect("migrations");
        ApiState { engine: Arc::new(ApprovalEngine::new(pool, SyncRegistry::standard())) }
    }

    fn actor_headers() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert("x-actor-id", HeaderValue::from_static("EMP-9000"));
        headers.insert("x-actor-name", HeaderValue::from_static("HR Operator"));
        headers
    }

    fn transaction_body(id: Option<String>, stamps: Vec<StampRequest>) -> SaveTransactionRequest {
        SaveTransactionRequest {
            id,
            employee_id: "EMP-0001".to_string(),
            transaction_date: NaiveDate::from_ymd_opt(2026, 2, 2).expect("date"),
            category: RequestCategory::LeavePermit,
            status: None,
            reject_reason: None,
            description: "annual leave".to_string(),
            stamps,
        }
    }

    #[tokio::test]
    async fn transaction_round_trip_through_the_handlers() {
        let state = state().await;

        let Json(saved) = save_transaction(
            State(state.clone()),
            actor_headers(),
            Json(transaction_body(None, vec![])),
        )
        .await
        .expect("save");
        assert_eq!(saved.status, ApprovalStatus::Waiting);

        let Json(resaved) = save_transaction(
            State(state.clone()),
            actor_headers(),
            Json(transaction_body(
                Some(saved.id.clone()),
                vec![
                    StampRequest {
                        employee_id: "EMP-0002".to_string(),
                        level: 1,
                        status: ApprovalStatus::Approve,
                        reject_reason: None,
                        stamped_at: None,
                    },
                    StampRequest {
                        employee_id: "EMP-0003".to_string(),
                        level: 2,
                        status: ApprovalStatus::Approve,
                        reject_reason: None,
                        stamped_at: None,
                    },
                ],
            )),
        )
        .await
        .expect("resave");
        assert_eq!(resaved.status, ApprovalStatus::Approve);

        let Json(view) = get_transaction(State(state.clone()), Path(saved.id.clone()))
            .await
            .expect("view");
        assert_eq!(view.stamps.len(), 2);
        assert_eq!(view.transaction.created_by, "EMP-9000");

        let Json(deleted) = delete_transaction(State(state.clone()), Path(saved.id.clone()))
            .await
            .expect("delete");
        assert!(deleted.success);

        let (status, _) = get_transaction(State(state), Path(saved.id))
            .await
            .expect_err("deleted transaction is gone");
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn invalid_config_payload_maps_to_unprocessable_entity() {
        let state = state().await;

        let (status, Json(body)) = save_config(
            State(state),
            actor_headers(),
            Json(SaveConfigRequest {
                id: None,
                organization_id: String::new(),
                description: String::new(),
                approvers: vec![],
            }),
        )
        .await
        .expect_err("empty payload fails validation");

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        let details = body.details.expect("validation details");
        assert_eq!(details.len(), 2);
    }

    #[tokio::test]
    async fn config_listing_paginates_through_the_handler() {
        let state = state().await;

        save_config(
            State(state.clone()),
            actor_headers(),
            Json(SaveConfigRequest {
                id: None,
                organization_id: "ORG-1".to_string(),
                description: "leave chain".to_string(),
                approvers: vec![],
            }),
        )
        .await
        .expect("save config");

        let Json(page) = list_configs(
            State(state),
            Query(ConfigPageQuery { page: None, per_page: None, search: None }),
        )
        .await
        .expect("list");
        assert_eq!(page.total, 1);
        assert_eq!(page.items[0].description, "leave chain");
    }

    #[tokio::test]
    async fn router_maps_an_unknown_transaction_to_not_found() {
        use tower::util::ServiceExt;

        let state = state().await;
        let app = super::router(state.engine.clone());

        let response = app
            .oneshot(
                axum::http::Request::builder()
                    .uri("/api/v1/approval-transactions/TXN-MISSING")
                    .body(axum::body::Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn drafted_stamps_come_back_waiting() {
        let Json(stamps) = draft_stamp_set(Json(vec![SelectionRequest {
            employee_id: "EMP-0002".to_string(),
            name: "Budi Santoso".to_string(),
            level: 1,
            action: "Approves".to_string(),
        }]))
        .await;

        assert_eq!(stamps.len(), 1);
        assert_eq!(stamps[0].status, ApprovalStatus::Waiting);
    }
}
