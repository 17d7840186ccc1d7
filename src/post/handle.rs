use axum::Json;
use serde_json::json;
use tracing::info;

use sps_shared::moderation::ActionLabel;
use sps_shared::post::handle::*;
use sps_shared::post::{Post, PostStatus};

use crate::moderation::DecisionRef;
use crate::{config, filter, moderation, resource, Error, RequireRoleContext};

/// Handle and create a new pending post.
///
/// A post must carry text content or an attachment; the text passes the
/// banned-word gate and the attachment is validated before anything is
/// persisted.
///
/// Url: `/api/post/create`
///
/// Request header: See [`crate::RequireRoleContext`].
///
/// Request body: See [`CreatePostDescriptor`].
///
/// Response body: `200` with `{ "post_id": _ }`. (json)
pub async fn create_post(
    ctx: RequireRoleContext,
    Json(descriptor): Json<CreatePostDescriptor>,
) -> Result<Json<serde_json::Value>, Error> {
    ctx.require_approved_student()?;

    let content = descriptor
        .content
        .filter(|content| !content.trim().is_empty());
    if content.is_none() && descriptor.attachment.is_none() {
        return Err(Error::PostEmpty);
    }

    if let Some(content) = &content {
        if filter::contains_prohibited_content(&*filter::INSTANCE, content)? {
            return Err(Error::ProhibitedContent);
        }
    }

    let attachment = match &descriptor.attachment {
        Some(attachment) => Some(resource::store(attachment)?),
        None => None,
    };

    let post = Post {
        id: super::new_post_id(),
        author: ctx.account_id,
        content,
        attachment,
        status: PostStatus::Pending,
        is_reported: false,
        reports_count: 0,
        reporters: Vec::new(),
        created_at: chrono::Utc::now(),
    };

    if !super::save_post(&post) {
        tracing::error!("error while saving post {}", post.id);
    }

    let id = post.id;
    super::INSTANCE.push(post);
    info!("post {id} created by account {}, pending review", ctx.account_id);

    Ok(Json(json!({ "post_id": id })))
}

/// Edit a post. Only the author may edit, and any edit resets the post
/// to pending so it goes through review again.
///
/// When a new attachment is supplied, the previous file is removed only
/// after the new one is durably stored.
///
/// Url: `/api/post/edit`
///
/// Request body: See [`EditPostDescriptor`].
pub async fn edit_post(
    ctx: RequireRoleContext,
    Json(descriptor): Json<EditPostDescriptor>,
) -> Result<Json<serde_json::Value>, Error> {
    ctx.require_approved_student()?;

    let content = descriptor
        .content
        .filter(|content| !content.trim().is_empty());
    if content.is_none() && descriptor.attachment.is_none() {
        return Err(Error::PostEmpty);
    }

    if let Some(content) = &content {
        if filter::contains_prohibited_content(&*filter::INSTANCE, content)? {
            return Err(Error::ProhibitedContent);
        }
    }

    super::INSTANCE.with_post(descriptor.post, |post| {
        if post.author != ctx.account_id {
            tracing::warn!(
                "account {} attempted to edit foreign post {}",
                ctx.account_id,
                post.id
            );
            return Err(Error::PermissionDenied);
        }
        Ok(())
    })??;

    // Store the replacement before touching the post: a failed write
    // must leave the currently referenced file untouched.
    let new_attachment = match &descriptor.attachment {
        Some(attachment) => Some(resource::store(attachment)?),
        None => None,
    };

    let old_attachment = super::INSTANCE.with_post_mut(descriptor.post, |post| {
        if post.author != ctx.account_id {
            return Err(Error::PermissionDenied);
        }
        if let Some(content) = content {
            post.content = Some(content);
        }
        let old = match new_attachment.clone() {
            Some(attachment) => post.attachment.replace(attachment),
            None => None,
        };
        post.status = PostStatus::Pending;
        if !super::save_post(post) {
            tracing::error!("error while saving post {}", post.id);
        }
        info!("post {} edited, back to pending review", post.id);
        Ok(old)
    })??;

    if let Some(old) = old_attachment {
        resource::delete(&old);
    }

    Ok(Json(json!({})))
}

/// Approve a pending post. Idempotent: approving an approved post is a
/// no-op and writes no duplicate audit record.
///
/// Url: `/api/post/approve`
///
/// Request body: See [`ReviewPostDescriptor`].
pub async fn approve_post(
    ctx: RequireRoleContext,
    Json(descriptor): Json<ReviewPostDescriptor>,
) -> Result<Json<serde_json::Value>, Error> {
    review_post(ctx, descriptor.post, PostStatus::Approved, ActionLabel::Approved)
}

/// Reject a pending post. Same idempotence rule as approval.
///
/// Url: `/api/post/reject`
///
/// Request body: See [`ReviewPostDescriptor`].
pub async fn reject_post(
    ctx: RequireRoleContext,
    Json(descriptor): Json<ReviewPostDescriptor>,
) -> Result<Json<serde_json::Value>, Error> {
    review_post(ctx, descriptor.post, PostStatus::Rejected, ActionLabel::Rejected)
}

/// Shared admin review path: the status write and its audit record
/// commit together under the post's write lock.
///
/// Not a request handling method.
fn review_post(
    ctx: RequireRoleContext,
    post_id: u64,
    to: PostStatus,
    label: ActionLabel,
) -> Result<Json<serde_json::Value>, Error> {
    ctx.require_admin()?;

    super::INSTANCE.with_post_mut(post_id, |post| {
        if post.status == to {
            return;
        }
        post.status = to;
        moderation::INSTANCE.record(DecisionRef::Post(post.id), ctx.account_id, label);
        if !super::save_post(post) {
            tracing::error!("error while saving post {}", post.id);
        }
        info!(
            "post {} marked {} by admin {}",
            post.id, to, ctx.account_id
        );
    })?;

    Ok(Json(json!({})))
}

/// Report a post. Any authenticated account may report; the reported
/// flag is a one-way latch and the counter never decreases.
///
/// Whether authors may report their own posts and whether repeated
/// reports keep counting are config switches.
///
/// Url: `/api/post/report`
///
/// Request body: See [`ReportPostDescriptor`].
///
/// Response body: `200` with `{ "reports_count": _ }`. (json)
pub async fn report_post(
    ctx: RequireRoleContext,
    Json(descriptor): Json<ReportPostDescriptor>,
) -> Result<Json<serde_json::Value>, Error> {
    let policy = config::INSTANCE.moderation;

    let count = super::INSTANCE.with_post_mut(descriptor.post, |post| {
        if !policy.allow_self_report && post.author == ctx.account_id {
            return Err(Error::PermissionDenied);
        }
        let repeat = post.reporters.contains(&ctx.account_id);
        if !repeat {
            post.reporters.push(ctx.account_id);
        }
        if !repeat || policy.count_repeat_reports {
            post.is_reported = true;
            post.reports_count += 1;
            if !super::save_post(post) {
                tracing::error!("error while saving post {}", post.id);
            }
            info!(
                "post {} reported by account {} ({} reports)",
                post.id, ctx.account_id, post.reports_count
            );
        }
        Ok(post.reports_count)
    })??;

    Ok(Json(json!({ "reports_count": count })))
}

/// Delete a post together with its attachment file. The author or an
/// admin may delete; audit records referencing the post keep existing
/// with the reference cleared.
///
/// Url: `/api/post/delete`
///
/// Request body: See [`DeletePostDescriptor`].
pub async fn delete_post(
    ctx: RequireRoleContext,
    Json(descriptor): Json<DeletePostDescriptor>,
) -> Result<Json<serde_json::Value>, Error> {
    super::INSTANCE.with_post(descriptor.post, |post| {
        if post.author == ctx.account_id {
            return Ok(());
        }
        match ctx.role() {
            Ok(role) if role.is_admin() => Ok(()),
            _ => {
                tracing::warn!(
                    "account {} attempted to delete foreign post {}",
                    ctx.account_id,
                    post.id
                );
                Err(Error::PermissionDenied)
            }
        }
    })??;

    if let Some(removed) = super::INSTANCE.take(descriptor.post) {
        moderation::INSTANCE.clear_post_refs(removed.id);
        if let Some(attachment) = &removed.attachment {
            resource::delete(attachment);
        }
        info!("post {} deleted by account {}", removed.id, ctx.account_id);
    }

    Ok(Json(json!({})))
}

/// Get the public feed: approved posts only, newest first.
///
/// Url: `/api/post/feed`
///
/// Response body: `200` with `{ "posts": [_] }`. (json)
pub async fn get_feed(ctx: RequireRoleContext) -> Result<Json<serde_json::Value>, Error> {
    let _ = ctx;
    let mut posts: Vec<_> = super::INSTANCE
        .posts
        .read()
        .iter()
        .map(|post| post.read())
        .filter(|post| post.status == PostStatus::Approved)
        .map(|post| post.clone())
        .collect();
    posts.sort_by(|a, b| b.created_at.cmp(&a.created_at));

    Ok(Json(json!({ "posts": posts })))
}

/// Get the caller's own posts, any status, newest first.
///
/// Url: `/api/post/mine`
///
/// Response body: `200` with `{ "posts": [_] }`. (json)
pub async fn my_posts(ctx: RequireRoleContext) -> Result<Json<serde_json::Value>, Error> {
    let mut posts: Vec<_> = super::INSTANCE
        .posts
        .read()
        .iter()
        .map(|post| post.read())
        .filter(|post| post.author == ctx.account_id)
        .map(|post| post.clone())
        .collect();
    posts.sort_by(|a, b| b.created_at.cmp(&a.created_at));

    Ok(Json(json!({ "posts": posts })))
}
