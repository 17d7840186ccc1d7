pub mod handle;

use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// A support ticket raised by a student.
///
/// Never deleted in normal flow; resolved tickets simply leave
/// the default admin queue.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Complaint {
    /// The only id of this complaint.
    pub id: u64,
    /// Author account id.
    pub author: u64,
    pub subject: String,
    pub content: String,
    pub status: ComplaintStatus,
    /// Free-text comment stored when the sender was contacted.
    pub admin_comment: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// Triage status of a complaint.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub enum ComplaintStatus {
    /// Waiting in the admin queue.
    Pending,
    /// Handed to the technical team.
    Assigned,
    Resolved,
    /// The sender was contacted with an admin comment.
    Contacted,
}

impl ComplaintStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ComplaintStatus::Pending => "Pending",
            ComplaintStatus::Assigned => "Assigned",
            ComplaintStatus::Resolved => "Resolved",
            ComplaintStatus::Contacted => "Contacted",
        }
    }
}

impl Display for ComplaintStatus {
    #[inline]
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
