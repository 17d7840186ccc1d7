pub mod account;
pub mod complaint;
pub mod moderation;
pub mod post;
pub mod profile;

use serde::{Deserialize, Serialize};

/// An uploaded file carried inside a request body.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Attachment {
    /// Declared file extension, without the leading dot.
    pub extension: String,
    pub bytes: Vec<u8>,
}
