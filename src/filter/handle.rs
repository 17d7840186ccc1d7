use axum::Json;
use serde_json::json;
use tracing::info;

use sps_shared::moderation::handle::*;

use crate::{Error, RequireRoleContext};

/// Add a word to the banned-word list.
///
/// Url: `/api/moderation/banned-words/add`
///
/// Request body: See [`AddBannedWordDescriptor`].
pub async fn add_banned_word(
    ctx: RequireRoleContext,
    Json(descriptor): Json<AddBannedWordDescriptor>,
) -> Result<Json<serde_json::Value>, Error> {
    ctx.require_admin()?;
    super::INSTANCE.add(&descriptor.word)?;
    info!("banned word added by account {}", ctx.account_id);
    Ok(Json(json!({})))
}

/// Remove a word from the banned-word list. Removing an unknown word is
/// not an error.
///
/// Url: `/api/moderation/banned-words/remove`
///
/// Request body: See [`RemoveBannedWordDescriptor`].
pub async fn remove_banned_word(
    ctx: RequireRoleContext,
    Json(descriptor): Json<RemoveBannedWordDescriptor>,
) -> Result<Json<serde_json::Value>, Error> {
    ctx.require_admin()?;
    let removed = super::INSTANCE.remove(&descriptor.word);
    if removed {
        info!("banned word removed by account {}", ctx.account_id);
    }
    Ok(Json(json!({ "removed": removed })))
}

/// List the banned words.
///
/// Url: `/api/moderation/banned-words`
///
/// Response body: `200` with `{ "words": [_] }`. (json)
pub async fn list_banned_words(
    ctx: RequireRoleContext,
) -> Result<Json<serde_json::Value>, Error> {
    ctx.require_admin()?;
    Ok(Json(json!({ "words": super::INSTANCE.list() })))
}
