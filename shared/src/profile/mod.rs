pub mod handle;

use serde::{Deserialize, Serialize};

/// The CV-style page owned by one approved account.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct StudentProfile {
    /// The only id of this profile.
    pub id: u64,
    /// Owning account id. At most one profile exists per account.
    pub account: u64,
    pub bio: Option<String>,
    pub address: Option<String>,
    pub department: Option<String>,
    pub skills: Option<String>,
    pub interests: Option<String>,
    pub projects: Option<String>,
    pub github: Option<String>,
    pub linkedin: Option<String>,
    pub contact_email: Option<String>,
    /// Reference to a stored profile image, if any.
    pub image: Option<String>,
    /// Opaque public lookup key. Generated once, immutable, unique.
    pub slug: String,
    pub privacy: PrivacyMode,
}

/// Who may open a profile through its slug.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub enum PrivacyMode {
    /// Anyone, authenticated or not.
    Public,
    /// Any authenticated account.
    University,
    /// The owner and admins only.
    Private,
}
