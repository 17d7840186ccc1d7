use serde::{Deserialize, Serialize};

use super::PrivacyMode;
use crate::Attachment;

/// Create-or-update payload for the caller's own profile.
#[derive(Serialize, Deserialize, Default)]
pub struct SubmitProfileDescriptor {
    pub bio: Option<String>,
    pub address: Option<String>,
    pub department: Option<String>,
    pub skills: Option<String>,
    pub interests: Option<String>,
    pub projects: Option<String>,
    pub github: Option<String>,
    pub linkedin: Option<String>,
    pub contact_email: Option<String>,
    pub image: Option<Attachment>,
}

#[derive(Serialize, Deserialize)]
pub struct SetPrivacyDescriptor {
    pub mode: PrivacyMode,
}
