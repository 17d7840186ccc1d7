use super::*;

use axum::http::StatusCode;
use axum::routing::post;
use axum::Router;
use serial_test::serial;
use tower::ServiceExt;

use sps_shared::account::handle::*;
use sps_shared::account::{AccountStatus, Role};
use sps_shared::moderation::ActionLabel;
use sps_shared::Attachment;

fn review_app() -> Router {
    Router::new()
        .route(
            "/api/account/approve",
            post(crate::account::handle::approve_student),
        )
        .route(
            "/api/account/reject",
            post(crate::account::handle::reject_student),
        )
        .route(
            "/api/account/graduate",
            post(crate::account::handle::graduate_student),
        )
        .route(
            "/api/account/delete",
            post(crate::account::handle::delete_student),
        )
}

#[serial]
#[tokio::test]
async fn register_pending() {
    reset_all();

    let app = Router::new().route(
        "/api/account/register",
        post(crate::account::handle::register_student),
    );

    let descriptor = RegisterStudentDescriptor {
        email: "freshman@university.edu".to_string(),
        full_name: "Fresh Man".to_string(),
        national_id: "29805150100000".to_string(),
        document: Some(Attachment {
            extension: "pdf".to_string(),
            bytes: vec![0; 2048],
        }),
    };

    let response = app
        .oneshot(anonymous_request("/api/account/register", &descriptor))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response_json = response_json(response).await;
    let id = response_json["account_id"].as_u64().unwrap();

    crate::account::INSTANCE
        .with_account(id, |account| {
            assert_eq!(account.status(), AccountStatus::Pending);
            assert_eq!(account.role(), Role::Student);
        })
        .unwrap();
}

#[serial]
#[tokio::test]
async fn register_requires_document() {
    reset_all();

    let app = Router::new().route(
        "/api/account/register",
        post(crate::account::handle::register_student),
    );

    let descriptor = RegisterStudentDescriptor {
        email: "freshman@university.edu".to_string(),
        full_name: "Fresh Man".to_string(),
        national_id: "29805150100000".to_string(),
        document: None,
    };

    let response = app
        .oneshot(anonymous_request("/api/account/register", &descriptor))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(crate::account::INSTANCE.inner().read().is_empty());
}

#[serial]
#[tokio::test]
async fn register_validates_document() {
    reset_all();

    let app = Router::new().route(
        "/api/account/register",
        post(crate::account::handle::register_student),
    );

    // Disallowed extension.
    let descriptor = RegisterStudentDescriptor {
        email: "freshman@university.edu".to_string(),
        full_name: "Fresh Man".to_string(),
        national_id: "29805150100000".to_string(),
        document: Some(Attachment {
            extension: "exe".to_string(),
            bytes: vec![0; 16],
        }),
    };
    let response = app
        .clone()
        .oneshot(anonymous_request("/api/account/register", &descriptor))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Oversized file.
    let descriptor = RegisterStudentDescriptor {
        email: "freshman@university.edu".to_string(),
        full_name: "Fresh Man".to_string(),
        national_id: "29805150100000".to_string(),
        document: Some(Attachment {
            extension: "pdf".to_string(),
            bytes: vec![0; crate::resource::MAX_ATTACHMENT_SIZE + 1],
        }),
    };
    let response = app
        .oneshot(anonymous_request("/api/account/register", &descriptor))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    assert!(crate::account::INSTANCE.inner().read().is_empty());
}

#[serial]
#[tokio::test]
async fn register_refuses_duplicate_email() {
    reset_all();

    push_student("freshman", AccountStatus::Pending);

    let app = Router::new().route(
        "/api/account/register",
        post(crate::account::handle::register_student),
    );

    let descriptor = RegisterStudentDescriptor {
        email: "freshman@university.edu".to_string(),
        full_name: "Fresh Man".to_string(),
        national_id: "29805150100000".to_string(),
        document: Some(Attachment {
            extension: "pdf".to_string(),
            bytes: vec![0; 16],
        }),
    };

    let response = app
        .oneshot(anonymous_request("/api/account/register", &descriptor))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[serial]
#[tokio::test]
async fn approve_writes_audit_and_notifies() {
    reset_all();

    let student = push_student("freshman", AccountStatus::Pending);
    let admin = push_admin("admin");
    let app = review_app();

    let descriptor = ReviewStudentDescriptor { account: student };
    let response = app
        .clone()
        .oneshot(json_request("/api/account/approve", admin, &descriptor))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    crate::account::INSTANCE
        .with_account(student, |account| {
            assert_eq!(account.status(), AccountStatus::Approved)
        })
        .unwrap();

    {
        let actions = crate::moderation::INSTANCE.actions.read();
        assert_eq!(actions.len(), 1);
        assert_eq!(actions[0].admin, admin);
        assert_eq!(actions[0].action, ActionLabel::Approved);
        // No profile exists yet, so the reference stays empty.
        assert!(actions[0].student_profile.is_none());
    }
    assert_eq!(crate::account::notify::OUTBOX.lock().len(), 1);

    // Re-approving is a no-op: no duplicate audit record, no second mail.
    let response = app
        .oneshot(json_request("/api/account/approve", admin, &descriptor))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(crate::moderation::INSTANCE.actions.read().len(), 1);
    assert_eq!(crate::account::notify::OUTBOX.lock().len(), 1);
}

#[serial]
#[tokio::test]
async fn reject_writes_audit_without_notification() {
    reset_all();

    let student = push_student("freshman", AccountStatus::Pending);
    let admin = push_admin("admin");
    let app = review_app();

    let descriptor = ReviewStudentDescriptor { account: student };
    let response = app
        .clone()
        .oneshot(json_request("/api/account/reject", admin, &descriptor))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    crate::account::INSTANCE
        .with_account(student, |account| {
            assert_eq!(account.status(), AccountStatus::Rejected)
        })
        .unwrap();
    assert_eq!(
        crate::moderation::INSTANCE.actions.read()[0].action,
        ActionLabel::Rejected
    );
    assert!(crate::account::notify::OUTBOX.lock().is_empty());

    // A rejected account cannot be approved afterwards.
    let response = app
        .oneshot(json_request("/api/account/approve", admin, &descriptor))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[serial]
#[tokio::test]
async fn graduate_only_from_approved() {
    reset_all();

    let student = push_student("freshman", AccountStatus::Pending);
    let admin = push_admin("admin");
    let app = review_app();

    let descriptor = ReviewStudentDescriptor { account: student };

    // Pending accounts cannot graduate.
    let response = app
        .clone()
        .oneshot(json_request("/api/account/graduate", admin, &descriptor))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let response = app
        .clone()
        .oneshot(json_request("/api/account/approve", admin, &descriptor))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(json_request("/api/account/graduate", admin, &descriptor))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    crate::account::INSTANCE
        .with_account(student, |account| {
            assert_eq!(account.status(), AccountStatus::Graduated)
        })
        .unwrap();

    // Graduating twice is a no-op without a duplicate audit record.
    let audit_len = crate::moderation::INSTANCE.actions.read().len();
    let response = app
        .oneshot(json_request("/api/account/graduate", admin, &descriptor))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(crate::moderation::INSTANCE.actions.read().len(), audit_len);
}

#[serial]
#[tokio::test]
async fn review_requires_admin() {
    reset_all();

    let student = push_student("freshman", AccountStatus::Pending);
    let other = push_student("sophomore", AccountStatus::Approved);
    let app = review_app();

    let descriptor = ReviewStudentDescriptor { account: student };
    let response = app
        .oneshot(json_request("/api/account/approve", other, &descriptor))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    crate::account::INSTANCE
        .with_account(student, |account| {
            assert_eq!(account.status(), AccountStatus::Pending)
        })
        .unwrap();
    assert!(crate::moderation::INSTANCE.actions.read().is_empty());
}

#[serial]
#[tokio::test]
async fn delete_cascades_profile() {
    reset_all();

    let student = push_student("freshman", AccountStatus::Approved);
    let admin = push_admin("admin");
    let (profile_id, _) = push_profile(student);

    // An earlier decision referencing the profile.
    crate::moderation::INSTANCE.record(
        crate::moderation::DecisionRef::Student(Some(profile_id)),
        admin,
        ActionLabel::Approved,
    );

    let app = review_app();
    let descriptor = ReviewStudentDescriptor { account: student };
    let response = app
        .oneshot(json_request("/api/account/delete", admin, &descriptor))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    assert!(!crate::account::INSTANCE.contains(student));
    assert!(crate::profile::INSTANCE.profile_id_of(student).is_none());

    // The audit record survives with its profile reference cleared.
    let actions = crate::moderation::INSTANCE.actions.read();
    assert!(actions
        .iter()
        .all(|action| action.student_profile.is_none()));
    assert!(actions
        .iter()
        .any(|action| action.action == ActionLabel::Deleted));
}
