use serde::{Deserialize, Serialize};

use crate::Attachment;

#[derive(Serialize, Deserialize)]
pub struct RegisterStudentDescriptor {
    pub email: String,
    pub full_name: String,
    pub national_id: String,
    /// Scan of the student card or national id card.
    /// Registration is refused without it.
    pub document: Option<Attachment>,
}

#[derive(Serialize, Deserialize)]
pub struct ReviewStudentDescriptor {
    /// Id of the account under review.
    pub account: u64,
}
