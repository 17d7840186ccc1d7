use axum::Json;
use serde_json::json;
use tracing::info;

use sps_shared::complaint::handle::*;
use sps_shared::complaint::{Complaint, ComplaintStatus};
use sps_shared::moderation::ActionLabel;

use crate::moderation::DecisionRef;
use crate::{moderation, Error, RequireRoleContext};

/// Submit a complaint. Subject and content are both required.
///
/// Url: `/api/complaint/create`
///
/// Request body: See [`CreateComplaintDescriptor`].
///
/// Response body: `200` with `{ "complaint_id": _ }`. (json)
pub async fn create_complaint(
    ctx: RequireRoleContext,
    Json(descriptor): Json<CreateComplaintDescriptor>,
) -> Result<Json<serde_json::Value>, Error> {
    ctx.require_approved_student()?;

    if descriptor.subject.trim().is_empty() || descriptor.content.trim().is_empty() {
        return Err(Error::ComplaintEmpty);
    }

    let complaint = Complaint {
        id: super::new_complaint_id(),
        author: ctx.account_id,
        subject: descriptor.subject,
        content: descriptor.content,
        status: ComplaintStatus::Pending,
        admin_comment: None,
        created_at: chrono::Utc::now(),
    };

    if !super::save_complaint(&complaint) {
        tracing::error!("error while saving complaint {}", complaint.id);
    }

    let id = complaint.id;
    super::INSTANCE.push(complaint);
    info!("complaint {id} submitted by account {}", ctx.account_id);

    Ok(Json(json!({ "complaint_id": id })))
}

/// Get the caller's own complaints, newest first.
///
/// Url: `/api/complaint/mine`
///
/// Response body: `200` with `{ "complaints": [_] }`. (json)
pub async fn my_complaints(ctx: RequireRoleContext) -> Result<Json<serde_json::Value>, Error> {
    let mut complaints: Vec<_> = super::INSTANCE
        .complaints
        .read()
        .iter()
        .map(|complaint| complaint.read())
        .filter(|complaint| complaint.author == ctx.account_id)
        .map(|complaint| complaint.clone())
        .collect();
    complaints.sort_by(|a, b| b.created_at.cmp(&a.created_at));

    Ok(Json(json!({ "complaints": complaints })))
}

/// The default admin queue: pending complaints only, newest first.
/// Assigned, resolved and contacted complaints are considered cleared
/// and leave this view.
///
/// Url: `/api/complaint/queue`
///
/// Response body: `200` with `{ "complaints": [_] }`. (json)
pub async fn pending_complaints(
    ctx: RequireRoleContext,
) -> Result<Json<serde_json::Value>, Error> {
    ctx.require_admin()?;

    let mut complaints: Vec<_> = super::INSTANCE
        .complaints
        .read()
        .iter()
        .map(|complaint| complaint.read())
        .filter(|complaint| complaint.status == ComplaintStatus::Pending)
        .map(|complaint| complaint.clone())
        .collect();
    complaints.sort_by(|a, b| b.created_at.cmp(&a.created_at));

    Ok(Json(json!({ "complaints": complaints })))
}

/// Apply an admin decision to a complaint. The status write and its
/// audit record commit together under the complaint's write lock.
///
/// Url: `/api/complaint/review`
///
/// Request body: See [`ReviewComplaintDescriptor`].
pub async fn review_complaint(
    ctx: RequireRoleContext,
    Json(descriptor): Json<ReviewComplaintDescriptor>,
) -> Result<Json<serde_json::Value>, Error> {
    ctx.require_admin()?;

    let label = match &descriptor.variant {
        ReviewComplaintVariant::AssignToTechnical => ActionLabel::Assigned,
        ReviewComplaintVariant::MarkResolved => ActionLabel::Resolved,
        ReviewComplaintVariant::ContactSender(_) => ActionLabel::Contacted,
    };

    super::INSTANCE.with_complaint_mut(descriptor.complaint, |complaint| -> Result<_, Error> {
        if super::apply_review(complaint, &descriptor.variant)? {
            moderation::INSTANCE.record(
                DecisionRef::Complaint(complaint.id),
                ctx.account_id,
                label,
            );
            if !super::save_complaint(complaint) {
                tracing::error!("error while saving complaint {}", complaint.id);
            }
            info!(
                "complaint {} marked {} by admin {}",
                complaint.id, complaint.status, ctx.account_id
            );
        }
        Ok(())
    })??;

    Ok(Json(json!({})))
}
