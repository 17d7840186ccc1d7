pub mod handle;

use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Immutable record of a moderation decision.
///
/// At most one of the entity references is populated. References to a
/// deleted entity are cleared; the record itself is never removed.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct AdminAction {
    /// The only id of this record.
    pub id: u64,
    pub student_profile: Option<u64>,
    pub post: Option<u64>,
    pub complaint: Option<u64>,
    /// The acting admin's account id.
    pub admin: u64,
    pub action: ActionLabel,
    pub time: chrono::DateTime<chrono::Utc>,
}

/// What the admin decided.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub enum ActionLabel {
    Approved,
    Rejected,
    Graduated,
    Deleted,
    Assigned,
    Resolved,
    Contacted,
}

impl ActionLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionLabel::Approved => "Approved",
            ActionLabel::Rejected => "Rejected",
            ActionLabel::Graduated => "Graduated",
            ActionLabel::Deleted => "Deleted",
            ActionLabel::Assigned => "Assigned",
            ActionLabel::Resolved => "Resolved",
            ActionLabel::Contacted => "Contacted",
        }
    }
}

impl Display for ActionLabel {
    #[inline]
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-entity moderation counts, recomputed on every query.
#[derive(Serialize, Deserialize, Debug, Clone, Copy)]
pub struct ModerationCounts {
    /// Approved accounts with the Student role.
    pub approved_students: usize,
    pub pending_registrations: usize,
    pub pending_posts: usize,
    pub reported_posts: usize,
    pub pending_complaints: usize,
}

impl ModerationCounts {
    /// Pending registrations plus pending posts. Derived, never stored.
    #[inline]
    pub fn pending_requests(&self) -> usize {
        self.pending_registrations + self.pending_posts
    }

    /// Reported posts plus pending complaints. Derived, never stored.
    #[inline]
    pub fn flagged_content(&self) -> usize {
        self.reported_posts + self.pending_complaints
    }
}

/// The admin dashboard payload.
#[derive(Serialize, Deserialize, Debug, Clone, Copy)]
pub struct DashboardInfo {
    pub total_students: usize,
    pub pending_requests: usize,
    pub flagged_content: usize,
}
