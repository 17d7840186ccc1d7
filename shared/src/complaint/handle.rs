use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize)]
pub struct CreateComplaintDescriptor {
    pub subject: String,
    pub content: String,
}

#[derive(Serialize, Deserialize)]
pub struct ReviewComplaintDescriptor {
    pub complaint: u64,
    pub variant: ReviewComplaintVariant,
}

#[derive(Serialize, Deserialize, Clone)]
pub enum ReviewComplaintVariant {
    /// Hand the complaint to the technical team.
    AssignToTechnical,
    MarkResolved,
    /// Contact the sender, storing the comment on the complaint.
    ContactSender(String),
}
