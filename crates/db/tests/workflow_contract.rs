//! End-to-end contract tests for the approval workflow engine: upsert and
//! replace semantics, cascading deletes, source synchronization, and the
//! adapter deletion contract.

use std::sync::Arc;

use chrono::{NaiveDate, NaiveTime, Utc};

use hrflow_core::approvals::ApprovalSelection;
use hrflow_core::context::ActingUser;
use hrflow_core::documents::InMemoryDocumentStore;
use hrflow_core::domain::approval::{
    ApprovalStatus, ApprovalTransactionId, RequestCategory, StampForm, TransactionForm,
};
use hrflow_core::domain::config::{ApprovalConfigId, ApproverForm, ConfigForm};
use hrflow_core::domain::directory::{EmployeeId, OrganizationId};
use hrflow_core::domain::requests::{LatePermit, LeaveSubmission, RequestId};
use hrflow_core::errors::WorkflowError;

use hrflow_db::repositories::{approval_config, approval_transaction};
use hrflow_db::{
    connect_with_settings, migrations, ApprovalEngine, PermitAdapter, RequestStore,
    SqlLatePermitStore, SqlLeaveSubmissionStore, SyncRegistry,
};

async fn setup() -> sqlx::SqlitePool {
    let pool = connect_with_settings("sqlite::memory:", 1, 30).await.expect("connect");
    migrations::run_pending(&pool).await.expect("migrations");
    pool
}

fn engine(pool: &sqlx::SqlitePool) -> ApprovalEngine {
    ApprovalEngine::new(pool.clone(), SyncRegistry::standard())
}

fn actor() -> ActingUser {
    ActingUser::new("EMP-9000", "HR Operator")
}

fn stamp(employee: &str, level: i64, status: ApprovalStatus) -> StampForm {
    StampForm {
        employee_id: EmployeeId(employee.to_string()),
        level,
        status,
        reject_reason: (status == ApprovalStatus::Reject)
            .then(|| "insufficient coverage during the period".to_string()),
        stamped_at: None,
    }
}

fn transaction_form(
    id: Option<&str>,
    category: RequestCategory,
    stamps: Vec<StampForm>,
) -> TransactionForm {
    TransactionForm {
        id: id.map(|value| ApprovalTransactionId(value.to_string())),
        employee_id: EmployeeId("EMP-0001".to_string()),
        transaction_date: NaiveDate::from_ymd_opt(2026, 2, 2).expect("date"),
        category,
        status: ApprovalStatus::New,
        reject_reason: None,
        description: "request sign-off".to_string(),
        stamps,
    }
}

fn leave_record(id: &str, transaction_id: Option<&str>) -> LeaveSubmission {
    let now = Utc::now();
    LeaveSubmission {
        id: RequestId(id.to_string()),
        employee_id: EmployeeId("EMP-0001".to_string()),
        leave_type: "annual".to_string(),
        start_date: NaiveDate::from_ymd_opt(2026, 3, 9).expect("date"),
        end_date: NaiveDate::from_ymd_opt(2026, 3, 13).expect("date"),
        reason: "family trip".to_string(),
        approval_transaction_id: transaction_id
            .map(|value| ApprovalTransactionId(value.to_string())),
        approval_status: ApprovalStatus::New,
        document_ids: vec![],
        created_at: now,
        updated_at: now,
    }
}

fn late_record(id: &str, transaction_id: Option<&str>) -> LatePermit {
    let now = Utc::now();
    LatePermit {
        id: RequestId(id.to_string()),
        employee_id: EmployeeId("EMP-0002".to_string()),
        permit_date: NaiveDate::from_ymd_opt(2026, 3, 9).expect("date"),
        expected_arrival: NaiveTime::from_hms_opt(10, 30, 0).expect("time"),
        reason: "school run".to_string(),
        approval_transaction_id: transaction_id
            .map(|value| ApprovalTransactionId(value.to_string())),
        approval_status: ApprovalStatus::New,
        document_ids: vec![],
        created_at: now,
        updated_at: now,
    }
}

async fn create_transaction(
    engine: &ApprovalEngine,
    category: RequestCategory,
) -> ApprovalTransactionId {
    let saved = engine
        .save_transaction(&actor(), transaction_form(None, category, vec![]))
        .await
        .expect("create transaction");
    assert_eq!(saved.status, ApprovalStatus::Waiting);
    saved.id
}

#[tokio::test]
async fn minted_transaction_starts_waiting() {
    let pool = setup().await;
    let engine = engine(&pool);

    let saved = engine
        .save_transaction(&actor(), transaction_form(None, RequestCategory::LeavePermit, vec![]))
        .await
        .expect("save");

    assert!(!saved.id.0.is_empty());
    assert_eq!(saved.status, ApprovalStatus::Waiting);
    let stored = approval_transaction::load_status(&pool, &saved.id).await.expect("load");
    assert_eq!(stored, Some(ApprovalStatus::Waiting));
}

#[tokio::test]
async fn full_approval_chain_aggregates_to_approve() {
    let pool = setup().await;
    let engine = engine(&pool);
    let id = create_transaction(&engine, RequestCategory::LeavePermit).await;

    let saved = engine
        .save_transaction(
            &actor(),
            transaction_form(
                Some(&id.0),
                RequestCategory::LeavePermit,
                vec![
                    stamp("EMP-0002", 1, ApprovalStatus::Approve),
                    stamp("EMP-0003", 2, ApprovalStatus::Approve),
                ],
            ),
        )
        .await
        .expect("resave");

    assert_eq!(saved.status, ApprovalStatus::Approve);
}

#[tokio::test]
async fn second_level_reject_overrides_first_level_approval() {
    let pool = setup().await;
    let engine = engine(&pool);
    let id = create_transaction(&engine, RequestCategory::LeavePermit).await;

    let saved = engine
        .save_transaction(
            &actor(),
            transaction_form(
                Some(&id.0),
                RequestCategory::LeavePermit,
                vec![
                    stamp("EMP-0002", 1, ApprovalStatus::Approve),
                    stamp("EMP-0003", 2, ApprovalStatus::Reject),
                ],
            ),
        )
        .await
        .expect("resave");

    assert_eq!(saved.status, ApprovalStatus::Reject);
}

#[tokio::test]
async fn undecided_level_keeps_the_transaction_waiting() {
    let pool = setup().await;
    let engine = engine(&pool);
    let id = create_transaction(&engine, RequestCategory::LeavePermit).await;

    let saved = engine
        .save_transaction(
            &actor(),
            transaction_form(
                Some(&id.0),
                RequestCategory::LeavePermit,
                vec![
                    stamp("EMP-0002", 1, ApprovalStatus::Approve),
                    stamp("EMP-0003", 2, ApprovalStatus::Waiting),
                ],
            ),
        )
        .await
        .expect("resave");

    assert_eq!(saved.status, ApprovalStatus::Waiting);
}

#[tokio::test]
async fn resaving_the_same_stamp_set_replaces_rows_with_fresh_keys() {
    let pool = setup().await;
    let engine = engine(&pool);
    let id = create_transaction(&engine, RequestCategory::LeavePermit).await;

    let stamps = vec![
        stamp("EMP-0002", 1, ApprovalStatus::Approve),
        stamp("EMP-0003", 2, ApprovalStatus::Waiting),
    ];

    engine
        .save_transaction(
            &actor(),
            transaction_form(Some(&id.0), RequestCategory::LeavePermit, stamps.clone()),
        )
        .await
        .expect("first save");
    let first = approval_transaction::load_stamps(&pool, &id).await.expect("load first");

    engine
        .save_transaction(
            &actor(),
            transaction_form(Some(&id.0), RequestCategory::LeavePermit, stamps),
        )
        .await
        .expect("second save");
    let second = approval_transaction::load_stamps(&pool, &id).await.expect("load second");

    assert_eq!(first.len(), 2);
    assert_eq!(second.len(), 2);
    for (before, after) in first.iter().zip(second.iter()) {
        assert_eq!(before.employee_id, after.employee_id);
        assert_eq!(before.level, after.level);
        assert_eq!(before.status, after.status);
        assert_ne!(before.id, after.id, "stamps are replaced, never patched in place");
    }
}

#[tokio::test]
async fn deleting_a_transaction_removes_all_of_its_stamps() {
    let pool = setup().await;
    let engine = engine(&pool);
    let id = create_transaction(&engine, RequestCategory::LeavePermit).await;

    engine
        .save_transaction(
            &actor(),
            transaction_form(
                Some(&id.0),
                RequestCategory::LeavePermit,
                vec![
                    stamp("EMP-0002", 1, ApprovalStatus::Approve),
                    stamp("EMP-0003", 2, ApprovalStatus::Waiting),
                ],
            ),
        )
        .await
        .expect("save with stamps");

    engine.delete_transaction(&id).await.expect("delete");

    let stamps = approval_transaction::load_stamps(&pool, &id).await.expect("load stamps");
    assert!(stamps.is_empty(), "no stamp row may reference a deleted transaction key");
    assert_eq!(approval_transaction::load_status(&pool, &id).await.expect("load"), None);
}

#[tokio::test]
async fn deleting_an_unknown_transaction_is_a_not_found_failure() {
    let pool = setup().await;
    let engine = engine(&pool);

    let error = engine
        .delete_transaction(&ApprovalTransactionId("TXN-MISSING".to_string()))
        .await
        .expect_err("delete should fail");

    assert!(matches!(error, WorkflowError::NotFound { entity: "approval transaction", .. }));
}

#[tokio::test]
async fn sync_updates_only_the_matching_leave_submission() {
    let pool = setup().await;
    let engine = engine(&pool);
    let id = create_transaction(&engine, RequestCategory::LeavePermit).await;

    let leave_store = SqlLeaveSubmissionStore::new(pool.clone());
    let late_store = SqlLatePermitStore::new(pool.clone());
    leave_store.save(&leave_record("REQ-L1", Some(&id.0))).await.expect("save leave 1");
    leave_store.save(&leave_record("REQ-L2", Some("TXN-OTHER"))).await.expect("save leave 2");
    late_store.save(&late_record("REQ-T1", Some(&id.0))).await.expect("save late");

    engine
        .save_transaction(
            &actor(),
            transaction_form(
                Some(&id.0),
                RequestCategory::LeavePermit,
                vec![
                    stamp("EMP-0002", 1, ApprovalStatus::Approve),
                    stamp("EMP-0003", 2, ApprovalStatus::Approve),
                ],
            ),
        )
        .await
        .expect("resave");

    let matched = leave_store
        .find(&RequestId("REQ-L1".to_string()))
        .await
        .expect("find")
        .expect("leave 1 exists");
    assert_eq!(matched.approval_status, ApprovalStatus::Approve);

    let unmatched = leave_store
        .find(&RequestId("REQ-L2".to_string()))
        .await
        .expect("find")
        .expect("leave 2 exists");
    assert_eq!(unmatched.approval_status, ApprovalStatus::New);

    // same transaction key in a different category's table is not touched
    let other_category = late_store
        .find(&RequestId("REQ-T1".to_string()))
        .await
        .expect("find")
        .expect("late permit exists");
    assert_eq!(other_category.approval_status, ApprovalStatus::New);
}

#[tokio::test]
async fn sync_without_a_source_record_is_a_silent_no_op() {
    let pool = setup().await;
    let engine = engine(&pool);
    let id = create_transaction(&engine, RequestCategory::OutPermit).await;

    let saved = engine
        .save_transaction(
            &actor(),
            transaction_form(
                Some(&id.0),
                RequestCategory::OutPermit,
                vec![stamp("EMP-0002", 1, ApprovalStatus::Approve)],
            ),
        )
        .await
        .expect("resave succeeds with nothing to synchronize");

    assert_eq!(saved.status, ApprovalStatus::Approve);
}

#[tokio::test]
async fn stamp_validation_failure_rolls_back_every_staged_write() {
    let pool = setup().await;
    let engine = engine(&pool);
    let id = create_transaction(&engine, RequestCategory::LeavePermit).await;

    engine
        .save_transaction(
            &actor(),
            transaction_form(
                Some(&id.0),
                RequestCategory::LeavePermit,
                vec![stamp("EMP-0002", 1, ApprovalStatus::Waiting)],
            ),
        )
        .await
        .expect("baseline save");
    let baseline = approval_transaction::load_stamps(&pool, &id).await.expect("baseline stamps");

    // a reject stamp without a reason fails validation after the transaction
    // row update and sync were staged; everything must roll back
    let invalid = StampForm {
        employee_id: EmployeeId("EMP-0003".to_string()),
        level: 2,
        status: ApprovalStatus::Reject,
        reject_reason: None,
        stamped_at: None,
    };
    let error = engine
        .save_transaction(
            &actor(),
            transaction_form(
                Some(&id.0),
                RequestCategory::LeavePermit,
                vec![stamp("EMP-0002", 1, ApprovalStatus::Approve), invalid],
            ),
        )
        .await
        .expect_err("invalid stamp set must abort the save");
    assert!(matches!(error, WorkflowError::Validation(_)));

    let after = approval_transaction::load_stamps(&pool, &id).await.expect("stamps after abort");
    assert_eq!(after, baseline, "the stored stamp set is untouched by the failed save");
    assert_eq!(
        approval_transaction::load_status(&pool, &id).await.expect("status"),
        Some(ApprovalStatus::Waiting),
    );
}

// Known race: there is no optimistic concurrency token on transactions or
// stamps, so two writers saving the same key interleave freely and the later
// commit's delete-then-insert silently clobbers the earlier one's stamps and
// aggregate. This test pins the last-writer-wins behavior down.
#[tokio::test]
async fn last_writer_wins_when_two_saves_target_one_transaction() {
    let pool = setup().await;
    let engine = engine(&pool);
    let id = create_transaction(&engine, RequestCategory::LeavePermit).await;

    let writer_a = engine
        .save_transaction(
            &ActingUser::new("EMP-0002", "Writer A"),
            transaction_form(
                Some(&id.0),
                RequestCategory::LeavePermit,
                vec![
                    stamp("EMP-0002", 1, ApprovalStatus::Approve),
                    stamp("EMP-0003", 2, ApprovalStatus::Approve),
                ],
            ),
        )
        .await
        .expect("writer A");
    assert_eq!(writer_a.status, ApprovalStatus::Approve);

    let writer_b = engine
        .save_transaction(
            &ActingUser::new("EMP-0003", "Writer B"),
            transaction_form(
                Some(&id.0),
                RequestCategory::LeavePermit,
                vec![stamp("EMP-0003", 2, ApprovalStatus::Reject)],
            ),
        )
        .await
        .expect("writer B");
    assert_eq!(writer_b.status, ApprovalStatus::Reject);

    let stamps = approval_transaction::load_stamps(&pool, &id).await.expect("stamps");
    assert_eq!(stamps.len(), 1, "writer A's stamp set is gone without a trace");
    assert_eq!(
        approval_transaction::load_status(&pool, &id).await.expect("status"),
        Some(ApprovalStatus::Reject),
    );
}

#[tokio::test]
async fn config_save_replaces_approvers_wholesale() {
    let pool = setup().await;
    let engine = engine(&pool);

    let approver = |employee: &str, level: i64| ApproverForm {
        employee_id: EmployeeId(employee.to_string()),
        name: format!("Approver {level}"),
        level,
        action: "Approves".to_string(),
    };

    let config_id = engine
        .save_config(
            &actor(),
            ConfigForm {
                id: None,
                organization_id: OrganizationId("ORG-1".to_string()),
                description: "standard chain".to_string(),
                approvers: vec![
                    approver("EMP-0002", 1),
                    approver("EMP-0003", 2),
                    approver("EMP-0004", 3),
                ],
            },
        )
        .await
        .expect("create config");
    assert_eq!(approval_config::count_approvers(&pool, &config_id).await.expect("count"), 3);

    engine
        .save_config(
            &actor(),
            ConfigForm {
                id: Some(config_id.clone()),
                organization_id: OrganizationId("ORG-1".to_string()),
                description: "shortened chain".to_string(),
                approvers: vec![approver("EMP-0002", 1), approver("EMP-0005", 2)],
            },
        )
        .await
        .expect("resave config");

    let view = engine.get_config(&config_id).await.expect("view");
    assert_eq!(view.config.description, "shortened chain");
    assert_eq!(view.approvers.len(), 2);
}

#[tokio::test]
async fn config_resave_preserves_original_provenance() {
    let pool = setup().await;
    let engine = engine(&pool);

    let config_id = engine
        .save_config(
            &ActingUser::new("EMP-0001", "First Author"),
            ConfigForm {
                id: None,
                organization_id: OrganizationId("ORG-1".to_string()),
                description: "initial".to_string(),
                approvers: vec![],
            },
        )
        .await
        .expect("create");

    engine
        .save_config(
            &ActingUser::new("EMP-0002", "Second Author"),
            ConfigForm {
                id: Some(config_id.clone()),
                organization_id: OrganizationId("ORG-1".to_string()),
                description: "revised".to_string(),
                approvers: vec![],
            },
        )
        .await
        .expect("update");

    let view = engine.get_config(&config_id).await.expect("view");
    assert_eq!(view.config.created_by, "EMP-0001");
    assert_eq!(view.config.updated_by, "EMP-0002");
    assert_eq!(view.config.description, "revised");
}

#[tokio::test]
async fn invalid_approver_aborts_the_whole_config_save() {
    let pool = setup().await;
    let engine = engine(&pool);

    let config_id = engine
        .save_config(
            &actor(),
            ConfigForm {
                id: None,
                organization_id: OrganizationId("ORG-1".to_string()),
                description: "chain".to_string(),
                approvers: vec![ApproverForm {
                    employee_id: EmployeeId("EMP-0002".to_string()),
                    name: "Reviewer".to_string(),
                    level: 1,
                    action: "Reviews".to_string(),
                }],
            },
        )
        .await
        .expect("create");
    let before = engine.get_config(&config_id).await.expect("view before");

    let error = engine
        .save_config(
            &actor(),
            ConfigForm {
                id: Some(config_id.clone()),
                organization_id: OrganizationId("ORG-1".to_string()),
                description: "chain".to_string(),
                approvers: vec![
                    ApproverForm {
                        employee_id: EmployeeId("EMP-0003".to_string()),
                        name: "Manager".to_string(),
                        level: 1,
                        action: "Approves".to_string(),
                    },
                    ApproverForm {
                        employee_id: EmployeeId(String::new()),
                        name: String::new(),
                        level: 0,
                        action: String::new(),
                    },
                ],
            },
        )
        .await
        .expect_err("an invalid approver fails the whole save");

    match error {
        WorkflowError::Validation(issues) => {
            assert!(issues.iter().all(|issue| issue.field.starts_with("approvers[1].")));
            assert_eq!(issues.len(), 4);
        }
        other => panic!("expected validation failure, got {other:?}"),
    }

    let after = engine.get_config(&config_id).await.expect("view after");
    assert_eq!(
        before.approvers, after.approvers,
        "no approver rows may change when validation fails",
    );
}

#[tokio::test]
async fn deleting_a_config_with_three_approvers_leaves_no_approver_rows() {
    let pool = setup().await;
    let engine = engine(&pool);

    let approver = |employee: &str, level: i64| ApproverForm {
        employee_id: EmployeeId(employee.to_string()),
        name: format!("Approver {level}"),
        level,
        action: "Approves".to_string(),
    };
    let config_id = engine
        .save_config(
            &actor(),
            ConfigForm {
                id: None,
                organization_id: OrganizationId("ORG-1".to_string()),
                description: "chain of three".to_string(),
                approvers: vec![
                    approver("EMP-0002", 1),
                    approver("EMP-0003", 2),
                    approver("EMP-0004", 3),
                ],
            },
        )
        .await
        .expect("create");

    engine.delete_config(&config_id).await.expect("delete");

    assert_eq!(approval_config::count_approvers(&pool, &config_id).await.expect("count"), 0);
    let error = engine.get_config(&config_id).await.expect_err("config is gone");
    assert!(matches!(error, WorkflowError::NotFound { entity: "approval config", .. }));
}

#[tokio::test]
async fn deleting_an_unknown_config_is_a_not_found_failure() {
    let pool = setup().await;
    let engine = engine(&pool);

    let error = engine
        .delete_config(&ApprovalConfigId("CFG-MISSING".to_string()))
        .await
        .expect_err("delete should fail");
    assert!(matches!(error, WorkflowError::NotFound { .. }));
}

#[tokio::test]
async fn paginated_search_matches_company_fields_case_insensitively() {
    let pool = setup().await;
    let engine = engine(&pool);

    sqlx::query(
        "INSERT INTO organization (id, company_code, company_name, name)
         VALUES ('ORG-1', 'NSM', 'Nusantara Sejahtera', 'Head Office')",
    )
    .execute(&pool)
    .await
    .expect("insert organization");

    engine
        .save_config(
            &actor(),
            ConfigForm {
                id: None,
                organization_id: OrganizationId("ORG-1".to_string()),
                description: "leave chain".to_string(),
                approvers: vec![],
            },
        )
        .await
        .expect("config 1");
    engine
        .save_config(
            &actor(),
            ConfigForm {
                id: None,
                organization_id: OrganizationId("ORG-UNKNOWN".to_string()),
                description: "overtime chain".to_string(),
                approvers: vec![],
            },
        )
        .await
        .expect("config 2");

    let by_company = engine.paginate_configs(1, 10, Some("nusantara")).await.expect("search");
    assert_eq!(by_company.total, 1);
    assert_eq!(by_company.items.len(), 1);
    assert_eq!(by_company.items[0].company_name.as_deref(), Some("Nusantara Sejahtera"));

    let by_description = engine.paginate_configs(1, 10, Some("OVERTIME")).await.expect("search");
    assert_eq!(by_description.total, 1);
    assert_eq!(by_description.items[0].description, "overtime chain");

    let everything = engine.paginate_configs(1, 10, None).await.expect("list");
    assert_eq!(everything.total, 2);
}

#[tokio::test]
async fn transaction_view_resolves_approver_display_names() {
    let pool = setup().await;
    let engine = engine(&pool);

    sqlx::query("INSERT INTO employee (id, full_name, organization_id) VALUES ('EMP-0002', 'Budi Santoso', NULL)")
        .execute(&pool)
        .await
        .expect("insert employee");

    let id = create_transaction(&engine, RequestCategory::LeavePermit).await;
    engine
        .save_transaction(
            &actor(),
            transaction_form(
                Some(&id.0),
                RequestCategory::LeavePermit,
                vec![
                    stamp("EMP-0002", 1, ApprovalStatus::Approve),
                    stamp("EMP-9999", 2, ApprovalStatus::Waiting),
                ],
            ),
        )
        .await
        .expect("resave");

    let view = engine.get_transaction(&id).await.expect("view");
    assert_eq!(view.stamps.len(), 2);
    assert_eq!(view.stamps[0].approver_name.as_deref(), Some("Budi Santoso"));
    assert_eq!(view.stamps[1].approver_name, None);
}

#[tokio::test]
async fn adapter_submit_links_transaction_and_stores_attachments() {
    let pool = setup().await;
    let engine = Arc::new(engine(&pool));
    let documents = Arc::new(InMemoryDocumentStore::default());
    let adapter =
        PermitAdapter::new(SqlLeaveSubmissionStore::new(pool.clone()), engine, documents.clone());

    let selections = vec![ApprovalSelection {
        employee_id: EmployeeId("EMP-0002".to_string()),
        name: "Budi Santoso".to_string(),
        level: 1,
        action: "Approves".to_string(),
    }];
    let attachments = vec![hrflow_db::NewAttachment {
        file_name: "medical-note.pdf".to_string(),
        bytes: b"pdf-bytes".to_vec(),
    }];

    let request_id = adapter
        .submit(&actor(), leave_record("REQ-L1", None), &selections, attachments)
        .await
        .expect("submit");

    let store = SqlLeaveSubmissionStore::new(pool.clone());
    let record = store.find(&request_id).await.expect("find").expect("record exists");
    let transaction_id = record.approval_transaction_id.clone().expect("linked transaction");
    assert_eq!(record.approval_status, ApprovalStatus::Waiting);
    assert_eq!(record.document_ids.len(), 1);
    assert!(documents.contains(&record.document_ids[0]));

    let stamps = approval_transaction::load_stamps(&pool, &transaction_id).await.expect("stamps");
    assert_eq!(stamps.len(), 1);
    assert_eq!(stamps[0].status, ApprovalStatus::Waiting);
}

#[tokio::test]
async fn adapter_delete_removes_transaction_documents_and_record() {
    let pool = setup().await;
    let engine = Arc::new(engine(&pool));
    let documents = Arc::new(InMemoryDocumentStore::default());
    let adapter = PermitAdapter::new(
        SqlLeaveSubmissionStore::new(pool.clone()),
        engine,
        documents.clone(),
    );

    let request_id = adapter
        .submit(
            &actor(),
            leave_record("REQ-L1", None),
            &[],
            vec![hrflow_db::NewAttachment {
                file_name: "itinerary.pdf".to_string(),
                bytes: b"bytes".to_vec(),
            }],
        )
        .await
        .expect("submit");

    let store = SqlLeaveSubmissionStore::new(pool.clone());
    let record = store.find(&request_id).await.expect("find").expect("exists");
    let transaction_id = record.approval_transaction_id.clone().expect("linked");

    adapter.delete(&request_id).await.expect("delete");

    assert!(store.find(&request_id).await.expect("find").is_none());
    assert_eq!(
        approval_transaction::load_status(&pool, &transaction_id).await.expect("status"),
        None
    );
    assert_eq!(documents.stored_count(), 0);
}

#[tokio::test]
async fn adapter_delete_aggregates_attachment_failures_and_keeps_the_record() {
    let pool = setup().await;
    let engine = Arc::new(engine(&pool));

    // submit with a working store so the record and transaction exist
    let upload_store = Arc::new(InMemoryDocumentStore::default());
    let adapter = PermitAdapter::new(
        SqlLeaveSubmissionStore::new(pool.clone()),
        engine.clone(),
        upload_store,
    );
    let request_id = adapter
        .submit(
            &actor(),
            leave_record("REQ-L1", None),
            &[],
            vec![
                hrflow_db::NewAttachment {
                    file_name: "a.pdf".to_string(),
                    bytes: b"a".to_vec(),
                },
                hrflow_db::NewAttachment {
                    file_name: "b.pdf".to_string(),
                    bytes: b"b".to_vec(),
                },
            ],
        )
        .await
        .expect("submit");

    let store = SqlLeaveSubmissionStore::new(pool.clone());
    let record = store.find(&request_id).await.expect("find").expect("exists");
    let transaction_id = record.approval_transaction_id.clone().expect("linked");

    // delete through a store where every attachment delete fails
    let failing = Arc::new(InMemoryDocumentStore::with_failing_deletes(
        record.document_ids.iter().map(|id| id.0.clone()).collect(),
    ));
    let deleting_adapter =
        PermitAdapter::new(SqlLeaveSubmissionStore::new(pool.clone()), engine, failing);

    let error = deleting_adapter.delete(&request_id).await.expect_err("delete must fail");
    match error {
        WorkflowError::Attachments(failures) => assert_eq!(failures.len(), 2),
        other => panic!("expected aggregated attachment failures, got {other:?}"),
    }

    // the record survives, but the backing transaction is already gone: the
    // engine's commit and the adapter's own step are not atomic together
    assert!(store.find(&request_id).await.expect("find").is_some());
    assert_eq!(
        approval_transaction::load_status(&pool, &transaction_id).await.expect("status"),
        None
    );
}

#[tokio::test]
async fn adapter_delete_aborts_when_the_transaction_delete_fails() {
    let pool = setup().await;
    let engine = Arc::new(engine(&pool));
    let documents = Arc::new(InMemoryDocumentStore::default());
    let store = SqlLeaveSubmissionStore::new(pool.clone());

    // record points at a transaction that does not exist
    store.save(&leave_record("REQ-L1", Some("TXN-GONE"))).await.expect("save record");

    let adapter = PermitAdapter::new(SqlLeaveSubmissionStore::new(pool.clone()), engine, documents);
    let error = adapter
        .delete(&RequestId("REQ-L1".to_string()))
        .await
        .expect_err("transaction delete failure aborts the whole delete");
    assert!(matches!(error, WorkflowError::NotFound { entity: "approval transaction", .. }));

    let survivor = SqlLeaveSubmissionStore::new(pool.clone())
        .find(&RequestId("REQ-L1".to_string()))
        .await
        .expect("find");
    assert!(survivor.is_some(), "the record must not be deleted");
}
