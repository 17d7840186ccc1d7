use serde::{Deserialize, Serialize};

use crate::Attachment;

#[derive(Serialize, Deserialize)]
pub struct CreatePostDescriptor {
    pub content: Option<String>,
    pub attachment: Option<Attachment>,
}

#[derive(Serialize, Deserialize)]
pub struct EditPostDescriptor {
    pub post: u64,
    /// Replacement text content.
    pub content: Option<String>,
    /// Replacement attachment. The previous file is removed only
    /// after the new one is stored.
    pub attachment: Option<Attachment>,
}

#[derive(Serialize, Deserialize)]
pub struct ReviewPostDescriptor {
    pub post: u64,
}

#[derive(Serialize, Deserialize)]
pub struct ReportPostDescriptor {
    pub post: u64,
}

#[derive(Serialize, Deserialize)]
pub struct DeletePostDescriptor {
    pub post: u64,
}
