use rand::Rng;
use sps_shared::Attachment;

use crate::Error;

/// File extensions accepted for identity documents and post attachments.
pub const ALLOWED_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "bmp", "pdf"];

/// Upload size cap in bytes (5 MiB).
pub const MAX_ATTACHMENT_SIZE: usize = 5 * 1024 * 1024;

/// An opaque reference to a stored file.
pub type FileRef = String;

/// Checks the declared extension and size of an upload. Runs before any
/// persistence so an invalid upload leaves no trace.
pub fn validate(attachment: &Attachment) -> Result<(), Error> {
    let ext = normalized_extension(attachment);
    if !ALLOWED_EXTENSIONS.contains(&ext.as_str()) {
        return Err(Error::AttachmentExtension(attachment.extension.clone()));
    }
    if attachment.bytes.len() > MAX_ATTACHMENT_SIZE {
        return Err(Error::AttachmentTooLarge(attachment.bytes.len()));
    }
    Ok(())
}

/// Validates and durably stores an upload, returning its reference.
///
/// A write failure is fatal to the enclosing operation.
pub fn store(attachment: &Attachment) -> Result<FileRef, Error> {
    validate(attachment)?;

    let file = format!(
        "uploads/{:032x}.{}",
        rand::thread_rng().gen::<u128>(),
        normalized_extension(attachment)
    );

    #[cfg(not(test))]
    {
        use std::io::Write;

        std::fs::create_dir_all("./data/uploads")?;
        let mut f = std::fs::File::create(format!("./data/{file}"))?;
        f.write_all(&attachment.bytes)?;
    }

    Ok(file)
}

/// Best-effort removal of a stored file. A failure is logged and the
/// orphaned file is left for out-of-band cleanup.
pub fn delete(file: &FileRef) {
    #[cfg(not(test))]
    if let Err(err) = std::fs::remove_file(format!("./data/{file}")) {
        tracing::error!("failed to remove stored file {file}: {err}");
    }

    #[cfg(test)]
    let _ = file;
}

fn normalized_extension(attachment: &Attachment) -> String {
    attachment
        .extension
        .trim_start_matches('.')
        .to_lowercase()
}
