use axum::Json;
use serde_json::json;
use tracing::info;

use sps_shared::account::handle::*;
use sps_shared::moderation::ActionLabel;

use crate::moderation::DecisionRef;
use crate::{moderation, profile, resource, Error, RequireRoleContext};

use super::{notify, Account};

/// Register a new student account, pending admin review.
///
/// The identity document is required and validated (extension
/// allow-list, 5 MiB cap) before anything is persisted.
///
/// Url: `/api/account/register`
///
/// Request body: See [`RegisterStudentDescriptor`].
///
/// Response body: `200` with `{ "account_id": _ }`. (json)
pub async fn register_student(
    Json(descriptor): Json<RegisterStudentDescriptor>,
) -> Result<Json<serde_json::Value>, Error> {
    let email: lettre::Address = descriptor.email.parse()?;

    if super::INSTANCE.contains_email(&email) {
        return Err(Error::EmailTaken);
    }

    let document = descriptor.document.as_ref().ok_or(Error::DocumentMissing)?;
    let document_ref = resource::store(document)?;

    let account = Account::new(
        email,
        descriptor.full_name,
        descriptor.national_id,
        document_ref,
    );
    let id = account.id();

    if !account.save() {
        tracing::error!("error while saving account {id}");
    }
    super::INSTANCE.push(account);
    info!("student account registered (id {id}), waiting for review");

    Ok(Json(json!({ "account_id": id })))
}

/// View the caller's own review status, for the waiting and rejection
/// views.
///
/// Url: `/api/account/status`
///
/// Response body: `200` with `{ "status": _, "full_name": _ }`. (json)
pub async fn account_status(
    ctx: RequireRoleContext,
) -> Result<Json<serde_json::Value>, Error> {
    super::INSTANCE.with_account(ctx.account_id, |account| {
        Json(json!({
            "status": account.status(),
            "full_name": account.full_name(),
        }))
    })
}

/// Approve a pending student account.
///
/// The status write and its audit record commit together; the approval
/// email is fired afterwards and never rolls the decision back.
/// Re-approving an approved account is a no-op.
///
/// Url: `/api/account/approve`
///
/// Request body: See [`ReviewStudentDescriptor`].
pub async fn approve_student(
    ctx: RequireRoleContext,
    Json(descriptor): Json<ReviewStudentDescriptor>,
) -> Result<Json<serde_json::Value>, Error> {
    ctx.require_admin()?;

    let profile_ref = profile::INSTANCE.profile_id_of(descriptor.account);
    let notification = super::INSTANCE.with_account_mut(descriptor.account, |account| -> Result<_, Error> {
        let changed = account.approve()?;
        if !changed {
            return Ok(None);
        }
        moderation::INSTANCE.record(
            DecisionRef::Student(profile_ref),
            ctx.account_id,
            ActionLabel::Approved,
        );
        if !account.save() {
            tracing::error!("error while saving account {}", account.id());
        }
        info!(
            "account {} approved by admin {}",
            account.id(),
            ctx.account_id
        );
        Ok(Some((account.email().clone(), account.full_name().to_owned())))
    })??;

    if let Some((email, full_name)) = notification {
        notify::notify_approval(email, full_name);
    }

    Ok(Json(json!({})))
}

/// Reject a pending student account. No notification is sent.
///
/// Url: `/api/account/reject`
///
/// Request body: See [`ReviewStudentDescriptor`].
pub async fn reject_student(
    ctx: RequireRoleContext,
    Json(descriptor): Json<ReviewStudentDescriptor>,
) -> Result<Json<serde_json::Value>, Error> {
    ctx.require_admin()?;

    let profile_ref = profile::INSTANCE.profile_id_of(descriptor.account);
    super::INSTANCE.with_account_mut(descriptor.account, |account| -> Result<_, Error> {
        if account.reject()? {
            moderation::INSTANCE.record(
                DecisionRef::Student(profile_ref),
                ctx.account_id,
                ActionLabel::Rejected,
            );
            if !account.save() {
                tracing::error!("error while saving account {}", account.id());
            }
            info!(
                "account {} rejected by admin {}",
                account.id(),
                ctx.account_id
            );
        }
        Ok(())
    })??;

    Ok(Json(json!({})))
}

/// Mark an approved account as graduated.
///
/// Url: `/api/account/graduate`
///
/// Request body: See [`ReviewStudentDescriptor`].
pub async fn graduate_student(
    ctx: RequireRoleContext,
    Json(descriptor): Json<ReviewStudentDescriptor>,
) -> Result<Json<serde_json::Value>, Error> {
    ctx.require_admin()?;

    let profile_ref = profile::INSTANCE.profile_id_of(descriptor.account);
    super::INSTANCE.with_account_mut(descriptor.account, |account| -> Result<_, Error> {
        if account.mark_graduated()? {
            moderation::INSTANCE.record(
                DecisionRef::Student(profile_ref),
                ctx.account_id,
                ActionLabel::Graduated,
            );
            if !account.save() {
                tracing::error!("error while saving account {}", account.id());
            }
            info!(
                "account {} marked graduated by admin {}",
                account.id(),
                ctx.account_id
            );
        }
        Ok(())
    })??;

    Ok(Json(json!({})))
}

/// Delete a student account together with its profile. Irreversible.
///
/// Audit records referencing the removed profile keep existing with the
/// reference cleared.
///
/// Url: `/api/account/delete`
///
/// Request body: See [`ReviewStudentDescriptor`].
pub async fn delete_student(
    ctx: RequireRoleContext,
    Json(descriptor): Json<ReviewStudentDescriptor>,
) -> Result<Json<serde_json::Value>, Error> {
    ctx.require_admin()?;

    let document = super::INSTANCE.with_account(descriptor.account, |account| {
        account.document().clone()
    })?;

    if let Some(profile) = profile::INSTANCE.remove_by_account(descriptor.account) {
        moderation::INSTANCE.clear_profile_refs(profile.id);
        if let Some(image) = &profile.image {
            resource::delete(image);
        }
    }
    super::INSTANCE.remove(descriptor.account);
    if !document.is_empty() {
        resource::delete(&document);
    }

    moderation::INSTANCE.record(
        DecisionRef::Student(None),
        ctx.account_id,
        ActionLabel::Deleted,
    );
    info!(
        "account {} deleted by admin {}",
        descriptor.account, ctx.account_id
    );

    Ok(Json(json!({})))
}
