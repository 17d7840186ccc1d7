pub mod handle;

use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Review status of a registered account.
///
/// A fresh registration always starts as [`Self::Pending`] and is moved
/// by an admin decision only.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub enum AccountStatus {
    /// Registered and waiting for an admin review.
    Pending,
    /// Accepted by an admin. The only status allowed into
    /// student-only surfaces.
    Approved,
    /// Turned down by an admin.
    Rejected,
    /// An approved account whose owner has graduated.
    Graduated,
}

impl AccountStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountStatus::Pending => "Pending",
            AccountStatus::Approved => "Approved",
            AccountStatus::Rejected => "Rejected",
            AccountStatus::Graduated => "Graduated",
        }
    }
}

impl Display for AccountStatus {
    #[inline]
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Role of an account.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub enum Role {
    Student,
    Admin,
    SuperAdmin,
}

impl Role {
    /// Whether this role carries admin authority.
    #[inline]
    pub fn is_admin(&self) -> bool {
        matches!(self, Role::Admin | Role::SuperAdmin)
    }
}
