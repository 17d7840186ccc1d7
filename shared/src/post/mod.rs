pub mod handle;

use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// A post authored by a student, subject to moderation.
///
/// A post carries non-empty text or an attachment, never neither.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Post {
    /// The only id of this post.
    pub id: u64,
    /// Author account id.
    pub author: u64,
    pub content: Option<String>,
    /// Reference to a stored attachment file, if any.
    pub attachment: Option<String>,
    pub status: PostStatus,
    /// One-way report latch. Never reverts through the report path.
    pub is_reported: bool,
    pub reports_count: u32,
    /// Accounts that reported this post.
    pub reporters: Vec<u64>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// Moderation status of a post.
///
/// Any edit resets the post to [`Self::Pending`] for re-review.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub enum PostStatus {
    /// Waiting for review. Visible to the author and admins only.
    Pending,
    /// Visible in public feeds.
    Approved,
    /// Turned down by an admin.
    Rejected,
}

impl PostStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PostStatus::Pending => "Pending",
            PostStatus::Approved => "Approved",
            PostStatus::Rejected => "Rejected",
        }
    }
}

impl Display for PostStatus {
    #[inline]
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
