use axum::Json;
use serde_json::json;

use sps_shared::account::AccountStatus;
use sps_shared::moderation::DashboardInfo;
use sps_shared::post::PostStatus;

use crate::{Error, RequireRoleContext};

/// The admin dashboard: derived sums over the live counts, recomputed
/// on every request.
///
/// Url: `/api/moderation/dashboard`
///
/// Response body: `200` with [`DashboardInfo`]. (json)
pub async fn dashboard(ctx: RequireRoleContext) -> Result<Json<DashboardInfo>, Error> {
    ctx.require_admin()?;

    let counts = super::counts();
    Ok(Json(DashboardInfo {
        total_students: counts.approved_students,
        pending_requests: counts.pending_requests(),
        flagged_content: counts.flagged_content(),
    }))
}

/// The raw per-entity moderation counts.
///
/// Url: `/api/moderation/counts`
///
/// Response body: `200` with [`sps_shared::moderation::ModerationCounts`]. (json)
pub async fn moderation_counts(
    ctx: RequireRoleContext,
) -> Result<Json<sps_shared::moderation::ModerationCounts>, Error> {
    ctx.require_admin()?;
    Ok(Json(super::counts()))
}

/// Everything waiting for an admin decision on the registration side:
/// pending accounts together with pending posts.
///
/// Url: `/api/moderation/review-requests`
///
/// Response body: `200` with
/// `{ "pending_accounts": [_], "pending_posts": [_] }`. (json)
pub async fn review_requests(ctx: RequireRoleContext) -> Result<Json<serde_json::Value>, Error> {
    ctx.require_admin()?;

    let pending_accounts: Vec<_> = crate::account::INSTANCE
        .inner()
        .read()
        .iter()
        .map(|account| account.read())
        .filter(|account| account.status() == AccountStatus::Pending)
        .map(|account| {
            json!({
                "id": account.id(),
                "email": account.email().to_string(),
                "full_name": account.full_name(),
                "registration_time": account.registration_time(),
            })
        })
        .collect();

    let pending_posts: Vec<_> = crate::post::INSTANCE
        .posts
        .read()
        .iter()
        .map(|post| post.read())
        .filter(|post| post.status == PostStatus::Pending)
        .map(|post| post.clone())
        .collect();

    Ok(Json(json!({
        "pending_accounts": pending_accounts,
        "pending_posts": pending_posts,
    })))
}

/// The combined moderation view: pending posts and pending complaints,
/// newest first.
///
/// Url: `/api/moderation/queue`
///
/// Response body: `200` with
/// `{ "pending_posts": [_], "pending_complaints": [_] }`. (json)
pub async fn moderation_queue(ctx: RequireRoleContext) -> Result<Json<serde_json::Value>, Error> {
    ctx.require_admin()?;

    let mut pending_posts: Vec<_> = crate::post::INSTANCE
        .posts
        .read()
        .iter()
        .map(|post| post.read())
        .filter(|post| post.status == PostStatus::Pending)
        .map(|post| post.clone())
        .collect();
    pending_posts.sort_by(|a, b| b.created_at.cmp(&a.created_at));

    let mut pending_complaints: Vec<_> = crate::complaint::INSTANCE
        .complaints
        .read()
        .iter()
        .map(|complaint| complaint.read())
        .filter(|complaint| {
            complaint.status == sps_shared::complaint::ComplaintStatus::Pending
        })
        .map(|complaint| complaint.clone())
        .collect();
    pending_complaints.sort_by(|a, b| b.created_at.cmp(&a.created_at));

    Ok(Json(json!({
        "pending_posts": pending_posts,
        "pending_complaints": pending_complaints,
    })))
}

/// The reported-post queue, most reported first.
///
/// Url: `/api/moderation/reported`
///
/// Response body: `200` with `{ "posts": [_] }`. (json)
pub async fn reported_posts(ctx: RequireRoleContext) -> Result<Json<serde_json::Value>, Error> {
    ctx.require_admin()?;

    let mut posts: Vec<_> = crate::post::INSTANCE
        .posts
        .read()
        .iter()
        .map(|post| post.read())
        .filter(|post| post.is_reported)
        .map(|post| post.clone())
        .collect();
    posts.sort_by(|a, b| b.reports_count.cmp(&a.reports_count));

    Ok(Json(json!({ "posts": posts })))
}

/// All approved student accounts.
///
/// Url: `/api/moderation/active-students`
///
/// Response body: `200` with `{ "students": [_] }`. (json)
pub async fn active_students(ctx: RequireRoleContext) -> Result<Json<serde_json::Value>, Error> {
    ctx.require_admin()?;

    let students: Vec<_> = crate::account::INSTANCE
        .inner()
        .read()
        .iter()
        .map(|account| account.read())
        .filter(|account| {
            account.status() == AccountStatus::Approved
                && account.role() == sps_shared::account::Role::Student
        })
        .map(|account| {
            json!({
                "id": account.id(),
                "email": account.email().to_string(),
                "full_name": account.full_name(),
            })
        })
        .collect();

    Ok(Json(json!({ "students": students })))
}
