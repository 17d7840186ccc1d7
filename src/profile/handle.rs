use axum::{extract::Path, Json};
use rand::Rng;
use serde_json::json;
use tracing::info;

use sps_shared::profile::handle::*;
use sps_shared::profile::{PrivacyMode, StudentProfile};

use crate::{filter, resource, Error, RequireRoleContext};

use super::MAX_PROJECTS_LEN;

/// Create or update the caller's profile. Only approved students reach
/// this surface; the slug is assigned on first submission and never
/// changes afterwards.
///
/// All free-text fields pass the banned-word gate before anything is
/// persisted.
///
/// Url: `/api/profile/submit`
///
/// Request body: See [`SubmitProfileDescriptor`].
///
/// Response body: `200` with `{ "slug": _ }`. (json)
pub async fn submit_profile(
    ctx: RequireRoleContext,
    Json(descriptor): Json<SubmitProfileDescriptor>,
) -> Result<Json<serde_json::Value>, Error> {
    ctx.require_approved_student()?;

    for text in [
        &descriptor.bio,
        &descriptor.address,
        &descriptor.department,
        &descriptor.skills,
        &descriptor.interests,
        &descriptor.projects,
    ]
    .into_iter()
    .flatten()
    {
        if filter::contains_prohibited_content(&*filter::INSTANCE, text)? {
            return Err(Error::ProhibitedContent);
        }
    }

    if descriptor
        .projects
        .as_ref()
        .map_or(false, |projects| projects.len() > MAX_PROJECTS_LEN)
    {
        return Err(Error::ProjectsTooLong);
    }

    let new_image = match &descriptor.image {
        Some(attachment) => Some(resource::store(attachment)?),
        None => None,
    };

    let updated = super::INSTANCE.with_profile_mut(ctx.account_id, |profile| {
        apply_submission(profile, &descriptor);
        let old_image = match &new_image {
            Some(image) => profile.image.replace(image.clone()),
            None => None,
        };
        if !super::save_profile(profile) {
            tracing::error!("error while saving profile {}", profile.id);
        }
        (profile.slug.clone(), old_image)
    });

    let slug = match updated {
        Some((slug, old_image)) => {
            // The new image is durable by now, safe to drop the old file.
            if let Some(old) = old_image {
                resource::delete(&old);
            }
            slug
        }
        None => {
            let mut profile = StudentProfile {
                id: rand::thread_rng().gen(),
                account: ctx.account_id,
                bio: None,
                address: None,
                department: None,
                skills: None,
                interests: None,
                projects: None,
                github: None,
                linkedin: None,
                contact_email: None,
                image: new_image.clone(),
                slug: super::generate_slug(),
                privacy: PrivacyMode::Public,
            };
            apply_submission(&mut profile, &descriptor);
            let slug = profile.slug.clone();
            if !super::save_profile(&profile) {
                tracing::error!("error while saving profile {}", profile.id);
            }
            super::INSTANCE.push(profile);
            info!("profile created for account {}", ctx.account_id);
            slug
        }
    };

    Ok(Json(json!({ "slug": slug })))
}

fn apply_submission(profile: &mut StudentProfile, descriptor: &SubmitProfileDescriptor) {
    macro_rules! apply {
        ($($field:ident),* $(,)?) => {
            $(
                if let Some(value) = &descriptor.$field {
                    profile.$field = Some(value.clone());
                }
            )*
        };
    }
    apply!(
        bio,
        address,
        department,
        skills,
        interests,
        projects,
        github,
        linkedin,
        contact_email,
    );
}

/// Change who may open the caller's profile through its slug.
///
/// Url: `/api/profile/privacy`
///
/// Request body: See [`SetPrivacyDescriptor`].
pub async fn set_privacy(
    ctx: RequireRoleContext,
    Json(descriptor): Json<SetPrivacyDescriptor>,
) -> Result<Json<serde_json::Value>, Error> {
    ctx.require_approved_student()?;

    super::INSTANCE
        .with_profile_mut(ctx.account_id, |profile| {
            profile.privacy = descriptor.mode;
            if !super::save_profile(profile) {
                tracing::error!("error while saving profile {}", profile.id);
            }
        })
        .ok_or(Error::NoProfile)?;

    Ok(Json(json!({})))
}

/// View the caller's own profile.
///
/// Url: `/api/profile/mine`
///
/// Response body: `200` with `{ "profile": _ }`. (json)
pub async fn my_profile(ctx: RequireRoleContext) -> Result<Json<serde_json::Value>, Error> {
    ctx.require_approved_student()?;

    let profile = super::INSTANCE
        .with_profile_mut(ctx.account_id, |profile| profile.clone())
        .ok_or(Error::NoProfile)?;

    Ok(Json(json!({ "profile": profile })))
}

/// Open a profile through its public slug, honoring its privacy mode:
/// Public profiles are open to anyone, University profiles to any
/// authenticated account, Private profiles to the owner and admins.
///
/// Url: `/api/profile/view/:slug`
///
/// Response body: `200` with `{ "profile": _ }`. (json)
pub async fn view_profile(
    ctx: Option<RequireRoleContext>,
    Path(slug): Path<String>,
) -> Result<Json<serde_json::Value>, Error> {
    let profile = super::INSTANCE
        .by_slug(&slug)
        .ok_or(Error::ProfileNotFound(slug))?;

    match profile.privacy {
        PrivacyMode::Public => (),
        PrivacyMode::University => {
            if ctx.is_none() {
                return Err(Error::NotLoggedIn);
            }
        }
        PrivacyMode::Private => {
            let ctx = ctx.ok_or(Error::NotLoggedIn)?;
            if ctx.account_id != profile.account && !ctx.role()?.is_admin() {
                tracing::warn!(
                    "account {} denied access to private profile {}",
                    ctx.account_id,
                    profile.id
                );
                return Err(Error::PermissionDenied);
            }
        }
    }

    Ok(Json(json!({ "profile": profile })))
}
