use axum::{async_trait, http::StatusCode, response::IntoResponse};
use serde::Serialize;
use sps_shared::account::Role;

pub mod config;

pub mod account;
pub mod complaint;
pub mod filter;
pub mod moderation;
pub mod post;
pub mod profile;

pub mod resource;

#[cfg(test)]
mod tests;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("post must carry text content or an attachment")]
    PostEmpty,
    #[error("subject and content are required")]
    ComplaintEmpty,
    #[error("identity document is required")]
    DocumentMissing,
    #[error("file type \"{0}\" is not allowed")]
    AttachmentExtension(String),
    #[error("file of {0} bytes exceeds the 5 MiB limit")]
    AttachmentTooLarge(usize),
    #[error("projects section is limited to 1024 characters")]
    ProjectsTooLong,
    #[error("text contains prohibited content")]
    ProhibitedContent,
    #[error("banned word cannot be empty")]
    BannedWordEmpty,
    #[error("word is already in the list")]
    BannedWordExists,
    #[error("invalid email address: {0}")]
    EmailAddress(lettre::address::AddressError),
    #[error("account with target email already exists")]
    EmailTaken,

    #[error("account {0} not found")]
    AccountNotFound(u64),
    #[error("post {0} not found")]
    PostNotFound(u64),
    #[error("complaint {0} not found")]
    ComplaintNotFound(u64),
    #[error("profile \"{0}\" not found")]
    ProfileNotFound(String),
    #[error("no profile exists for this account yet")]
    NoProfile,

    #[error("permission denied")]
    PermissionDenied,
    #[error("account is waiting for review")]
    AccountPending,
    #[error("account registration was rejected")]
    AccountRejected,
    #[error("cannot transition from {from} to {to}")]
    Transition {
        from: &'static str,
        to: &'static str,
    },

    #[error("not logged in")]
    NotLoggedIn,
    #[error("non-ascii header value: {0}")]
    HeaderNonAscii(axum::http::header::ToStrError),
    #[error("auth header is not a valid account id")]
    InvalidAuthHeader,

    #[error("email message error: {0}")]
    Lettre(lettre::error::Error),
    #[error("failed to send email")]
    Smtp(lettre::transport::smtp::Error),

    #[error("storage errored: {0}")]
    Storage(std::io::Error),
    #[error("data store errored: {0}")]
    Persistence(String),
}

impl Error {
    pub fn to_status_code(&self) -> StatusCode {
        match self {
            Error::AccountNotFound(_)
            | Error::PostNotFound(_)
            | Error::ComplaintNotFound(_)
            | Error::ProfileNotFound(_)
            | Error::NoProfile => StatusCode::NOT_FOUND,
            Error::PostEmpty
            | Error::ComplaintEmpty
            | Error::DocumentMissing
            | Error::AttachmentExtension(_)
            | Error::AttachmentTooLarge(_)
            | Error::ProjectsTooLong
            | Error::BannedWordEmpty
            | Error::EmailAddress(_) => StatusCode::BAD_REQUEST,
            Error::EmailTaken | Error::BannedWordExists | Error::Transition { .. } => {
                StatusCode::CONFLICT
            }
            Error::NotLoggedIn => StatusCode::UNAUTHORIZED,
            Error::HeaderNonAscii(_) | Error::InvalidAuthHeader => StatusCode::BAD_REQUEST,
            Error::Lettre(_) | Error::Smtp(_) | Error::Storage(_) | Error::Persistence(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            _ => StatusCode::FORBIDDEN,
        }
    }
}

impl IntoResponse for Error {
    #[inline]
    fn into_response(self) -> axum::response::Response {
        #[derive(Serialize)]
        struct ErrorInfo {
            error: String,
        }
        (
            self.to_status_code(),
            axum::Json(ErrorInfo {
                error: self.to_string(),
            }),
        )
            .into_response()
    }
}

/// Implements `From<T>` for [`Error`].
macro_rules! impl_from {
    ($($t:ty => $v:ident),* $(,)?) => {
        $(
            impl From<$t> for $crate::Error {
                #[inline]
                fn from(err: $t) -> Self {
                    Self::$v(err)
                }
            }
        )*
    };
}

impl_from! {
    lettre::address::AddressError => EmailAddress,
    lettre::error::Error => Lettre,
    lettre::transport::smtp::Error => Smtp,
    axum::http::header::ToStrError => HeaderNonAscii,
    std::io::Error => Storage,
}

/// Identity of the acting account, as supplied by the external auth layer
/// through the `AccountId` header. The role is resolved from the account
/// store; the credential check itself happens upstream.
pub struct RequireRoleContext {
    /// The only id of this account.
    pub account_id: u64,
}

impl RequireRoleContext {
    /// Role of the acting account.
    pub fn role(&self) -> Result<Role, Error> {
        account::INSTANCE.role_of(self.account_id)
    }

    /// Fails closed unless the acting account carries admin authority.
    pub fn require_admin(&self) -> Result<(), Error> {
        if self.role()?.is_admin() {
            Ok(())
        } else {
            tracing::warn!(
                "account {} attempted an admin-only action",
                self.account_id
            );
            Err(Error::PermissionDenied)
        }
    }

    /// Gate for student-only surfaces: the acting account must be a
    /// student whose registration has been approved. Pending and rejected
    /// accounts get their dedicated errors so the caller can route them
    /// to the waiting and rejection views.
    pub fn require_approved_student(&self) -> Result<(), Error> {
        use sps_shared::account::AccountStatus;

        account::INSTANCE.with_account(self.account_id, |account| {
            if account.role() != Role::Student {
                tracing::warn!(
                    "account {} attempted a student-only action",
                    self.account_id
                );
                return Err(Error::PermissionDenied);
            }
            match account.status() {
                AccountStatus::Approved => Ok(()),
                AccountStatus::Pending => Err(Error::AccountPending),
                AccountStatus::Rejected => Err(Error::AccountRejected),
                AccountStatus::Graduated => Err(Error::PermissionDenied),
            }
        })?
    }
}

#[async_trait]
impl<S> axum::extract::FromRequestParts<S> for RequireRoleContext
where
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        _: &S,
    ) -> Result<Self, Self::Rejection> {
        let account_id = parts
            .headers
            .get("AccountId")
            .ok_or(Error::NotLoggedIn)?
            .to_str()?
            .parse()
            .map_err(|_| Error::InvalidAuthHeader)?;

        if !account::INSTANCE.contains(account_id) {
            return Err(Error::NotLoggedIn);
        }

        Ok(Self { account_id })
    }
}
