use super::*;

use axum::http::StatusCode;
use axum::routing::post;
use axum::Router;
use serial_test::serial;
use tower::ServiceExt;

use sps_shared::account::AccountStatus;
use sps_shared::moderation::ActionLabel;
use sps_shared::post::handle::*;
use sps_shared::post::PostStatus;
use sps_shared::Attachment;

fn post_app() -> Router {
    Router::new()
        .route("/api/post/create", post(crate::post::handle::create_post))
        .route("/api/post/edit", post(crate::post::handle::edit_post))
        .route("/api/post/delete", post(crate::post::handle::delete_post))
        .route("/api/post/report", post(crate::post::handle::report_post))
        .route("/api/post/approve", post(crate::post::handle::approve_post))
        .route("/api/post/reject", post(crate::post::handle::reject_post))
        .route("/api/post/feed", post(crate::post::handle::get_feed))
        .route("/api/post/mine", post(crate::post::handle::my_posts))
}

async fn create(app: &Router, author: u64, content: &str) -> u64 {
    let descriptor = CreatePostDescriptor {
        content: Some(content.to_string()),
        attachment: None,
    };
    let response = app
        .clone()
        .oneshot(json_request("/api/post/create", author, &descriptor))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    response_json(response).await["post_id"].as_u64().unwrap()
}

async fn feed_ids(app: &Router, viewer: u64) -> Vec<u64> {
    let response = app
        .clone()
        .oneshot(empty_request("/api/post/feed", viewer))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    response_json(response).await["posts"]
        .as_array()
        .unwrap()
        .iter()
        .map(|post| post["id"].as_u64().unwrap())
        .collect()
}

#[serial]
#[tokio::test]
async fn create_requires_content_or_attachment() {
    reset_all();

    let student = push_student("freshman", AccountStatus::Approved);
    let app = post_app();

    let descriptor = CreatePostDescriptor {
        content: None,
        attachment: None,
    };
    let response = app
        .clone()
        .oneshot(json_request("/api/post/create", student, &descriptor))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Whitespace-only text does not count as content.
    let descriptor = CreatePostDescriptor {
        content: Some("   ".to_string()),
        attachment: None,
    };
    let response = app
        .oneshot(json_request("/api/post/create", student, &descriptor))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    assert!(crate::post::INSTANCE.posts.read().is_empty());
}

#[serial]
#[tokio::test]
async fn create_validates_attachment() {
    reset_all();

    let student = push_student("freshman", AccountStatus::Approved);
    let app = post_app();

    let descriptor = CreatePostDescriptor {
        content: None,
        attachment: Some(Attachment {
            extension: "exe".to_string(),
            bytes: vec![0; 16],
        }),
    };
    let response = app
        .clone()
        .oneshot(json_request("/api/post/create", student, &descriptor))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let descriptor = CreatePostDescriptor {
        content: None,
        attachment: Some(Attachment {
            extension: "png".to_string(),
            bytes: vec![0; crate::resource::MAX_ATTACHMENT_SIZE + 1],
        }),
    };
    let response = app
        .oneshot(json_request("/api/post/create", student, &descriptor))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    assert!(crate::post::INSTANCE.posts.read().is_empty());
}

#[serial]
#[tokio::test]
async fn pending_accounts_cannot_post() {
    reset_all();

    let student = push_student("freshman", AccountStatus::Pending);
    let app = post_app();

    let descriptor = CreatePostDescriptor {
        content: Some("hello".to_string()),
        attachment: None,
    };
    let response = app
        .oneshot(json_request("/api/post/create", student, &descriptor))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[serial]
#[tokio::test]
async fn approval_and_edit_round_trip() {
    reset_all();

    let student = push_student("freshman", AccountStatus::Approved);
    let admin = push_admin("admin");
    let app = post_app();

    let post_id = create(&app, student, "hello").await;
    crate::post::INSTANCE
        .with_post(post_id, |post| assert_eq!(post.status, PostStatus::Pending))
        .unwrap();
    assert!(feed_ids(&app, student).await.is_empty());

    // Admin approval publishes the post.
    let descriptor = ReviewPostDescriptor { post: post_id };
    let response = app
        .clone()
        .oneshot(json_request("/api/post/approve", admin, &descriptor))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(feed_ids(&app, student).await, vec![post_id]);
    {
        let actions = crate::moderation::INSTANCE.actions.read();
        assert_eq!(actions.len(), 1);
        assert_eq!(actions[0].post, Some(post_id));
        assert_eq!(actions[0].action, ActionLabel::Approved);
    }

    // Approving an approved post is a no-op.
    let response = app
        .clone()
        .oneshot(json_request("/api/post/approve", admin, &descriptor))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(crate::moderation::INSTANCE.actions.read().len(), 1);

    // Any edit sends the post back to review and out of the feed.
    let descriptor = EditPostDescriptor {
        post: post_id,
        content: Some("hello world".to_string()),
        attachment: None,
    };
    let response = app
        .clone()
        .oneshot(json_request("/api/post/edit", student, &descriptor))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    crate::post::INSTANCE
        .with_post(post_id, |post| {
            assert_eq!(post.status, PostStatus::Pending);
            assert_eq!(post.content.as_deref(), Some("hello world"));
        })
        .unwrap();
    assert!(feed_ids(&app, student).await.is_empty());

    // Editing twice keeps the post pending, nothing accumulates.
    let response = app
        .clone()
        .oneshot(json_request("/api/post/edit", student, &descriptor))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    crate::post::INSTANCE
        .with_post(post_id, |post| assert_eq!(post.status, PostStatus::Pending))
        .unwrap();
}

#[serial]
#[tokio::test]
async fn edit_is_author_only() {
    reset_all();

    let author = push_student("freshman", AccountStatus::Approved);
    let other = push_student("sophomore", AccountStatus::Approved);
    let app = post_app();

    let post_id = create(&app, author, "hello").await;

    let descriptor = EditPostDescriptor {
        post: post_id,
        content: Some("hijacked".to_string()),
        attachment: None,
    };
    let response = app
        .oneshot(json_request("/api/post/edit", other, &descriptor))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    crate::post::INSTANCE
        .with_post(post_id, |post| {
            assert_eq!(post.content.as_deref(), Some("hello"))
        })
        .unwrap();
}

#[serial]
#[tokio::test]
async fn prohibited_content_is_blocked() {
    reset_all();

    let student = push_student("freshman", AccountStatus::Approved);
    let app = post_app();

    crate::filter::INSTANCE.add("spam").unwrap();

    let descriptor = CreatePostDescriptor {
        content: Some("this is SPAM content".to_string()),
        attachment: None,
    };
    let response = app
        .clone()
        .oneshot(json_request("/api/post/create", student, &descriptor))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert!(crate::post::INSTANCE.posts.read().is_empty());

    // Removing the word lifts the block without a restart.
    assert!(crate::filter::INSTANCE.remove("spam"));
    let response = app
        .oneshot(json_request("/api/post/create", student, &descriptor))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[serial]
#[tokio::test]
async fn report_is_monotonic() {
    reset_all();

    let author = push_student("freshman", AccountStatus::Approved);
    let reporter = push_student("sophomore", AccountStatus::Approved);
    let admin = push_admin("admin");
    let app = post_app();

    let post_id = create(&app, author, "hello").await;

    let descriptor = ReportPostDescriptor { post: post_id };
    let response = app
        .clone()
        .oneshot(json_request("/api/post/report", reporter, &descriptor))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // The default policy counts repeated reports and allows
    // self-reports, matching the legacy behavior.
    let response = app
        .clone()
        .oneshot(json_request("/api/post/report", reporter, &descriptor))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let response = app
        .clone()
        .oneshot(json_request("/api/post/report", author, &descriptor))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    crate::post::INSTANCE
        .with_post(post_id, |post| {
            assert!(post.is_reported);
            assert_eq!(post.reports_count, 3);
            assert_eq!(post.reporters.len(), 2);
        })
        .unwrap();

    // An admin decision does not unlatch the report flag.
    let response = app
        .oneshot(json_request(
            "/api/post/reject",
            admin,
            &ReviewPostDescriptor { post: post_id },
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    crate::post::INSTANCE
        .with_post(post_id, |post| {
            assert!(post.is_reported);
            assert_eq!(post.reports_count, 3);
        })
        .unwrap();
}

#[serial]
#[tokio::test]
async fn delete_clears_audit_refs() {
    reset_all();

    let author = push_student("freshman", AccountStatus::Approved);
    let admin = push_admin("admin");
    let app = post_app();

    let post_id = create(&app, author, "hello").await;
    let response = app
        .clone()
        .oneshot(json_request(
            "/api/post/approve",
            admin,
            &ReviewPostDescriptor { post: post_id },
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(json_request(
            "/api/post/delete",
            author,
            &DeletePostDescriptor { post: post_id },
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    assert!(!crate::post::INSTANCE.contains_id(post_id));
    // The approval record survives with its post reference cleared.
    let actions = crate::moderation::INSTANCE.actions.read();
    assert_eq!(actions.len(), 1);
    assert!(actions[0].post.is_none());
}

#[serial]
#[tokio::test]
async fn my_posts_shows_all_statuses() {
    reset_all();

    let author = push_student("freshman", AccountStatus::Approved);
    let other = push_student("sophomore", AccountStatus::Approved);
    let admin = push_admin("admin");
    let app = post_app();

    let first = create(&app, author, "first").await;
    let second = create(&app, author, "second").await;
    create(&app, other, "foreign").await;

    let response = app
        .clone()
        .oneshot(json_request(
            "/api/post/reject",
            admin,
            &ReviewPostDescriptor { post: first },
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .oneshot(empty_request("/api/post/mine", author))
        .await
        .unwrap();
    let mine: Vec<u64> = response_json(response).await["posts"]
        .as_array()
        .unwrap()
        .iter()
        .map(|post| post["id"].as_u64().unwrap())
        .collect();
    assert_eq!(mine.len(), 2);
    assert!(mine.contains(&first));
    assert!(mine.contains(&second));
}
