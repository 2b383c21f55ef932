//! Message attachments.

use crate::error::{Error, Result};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use std::io::Read;
use std::path::Path;

/// A file attached to a message.
///
/// Content is held base64-encoded, ready for the request payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    /// File name shown to the recipient.
    pub name: String,
    /// MIME content type (e.g., `image/png`).
    pub content_type: String,
    /// Base64-encoded content.
    pub content: String,
    /// Size of the decoded content in bytes.
    pub size: usize,
}

impl Attachment {
    /// Creates an attachment from raw bytes.
    #[must_use]
    pub fn from_bytes(
        name: impl Into<String>,
        content_type: impl Into<String>,
        data: &[u8],
    ) -> Self {
        Self {
            name: name.into(),
            content_type: content_type.into(),
            content: STANDARD.encode(data),
            size: data.len(),
        }
    }

    /// Creates an attachment by draining a reader.
    ///
    /// # Errors
    ///
    /// Returns an error if reading fails.
    pub fn from_reader(
        name: impl Into<String>,
        content_type: impl Into<String>,
        mut reader: impl Read,
    ) -> Result<Self> {
        let mut data = Vec::new();
        reader.read_to_end(&mut data)?;
        Ok(Self::from_bytes(name, content_type, &data))
    }

    /// Creates an attachment from a file, named after the file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or the path has no
    /// file name.
    pub fn from_file(path: impl AsRef<Path>, content_type: impl Into<String>) -> Result<Self> {
        let path = path.as_ref();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| Error::MissingFileName(path.to_path_buf()))?;

        let data = std::fs::read(path).map_err(|source| Error::Attachment {
            path: path.to_path_buf(),
            source,
        })?;

        Ok(Self::from_bytes(name, content_type, &data))
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::redundant_clone,
    clippy::manual_string_new,
    clippy::needless_collect,
    clippy::unreadable_literal,
    clippy::used_underscore_items,
    clippy::similar_names
)]
mod tests {
    use super::*;

    #[test]
    fn test_from_bytes_encodes_base64() {
        let attachment = Attachment::from_bytes("hello.txt", "text/plain", b"Hello, World!");
        assert_eq!(attachment.name, "hello.txt");
        assert_eq!(attachment.content_type, "text/plain");
        assert_eq!(attachment.content, "SGVsbG8sIFdvcmxkIQ==");
        assert_eq!(attachment.size, 13);
    }

    #[test]
    fn test_from_reader() {
        let attachment =
            Attachment::from_reader("data.bin", "application/octet-stream", &[0u8, 1, 2][..])
                .unwrap();
        assert_eq!(attachment.content, "AAEC");
        assert_eq!(attachment.size, 3);
    }

    #[test]
    fn test_from_file_uses_file_name() {
        let path = std::env::temp_dir().join(format!("postmark-attach-{}.txt", std::process::id()));
        std::fs::write(&path, b"attached").unwrap();

        let attachment = Attachment::from_file(&path, "text/plain").unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(
            attachment.name,
            path.file_name().unwrap().to_string_lossy()
        );
        assert_eq!(attachment.content, STANDARD.encode(b"attached"));
    }

    #[test]
    fn test_from_file_missing() {
        let err = Attachment::from_file("/definitely/not/here/logo.png", "image/png").unwrap_err();
        assert!(matches!(err, Error::Attachment { .. }));
    }

    #[test]
    fn test_from_file_without_name() {
        let err = Attachment::from_file("/", "image/png").unwrap_err();
        assert!(matches!(err, Error::MissingFileName(_)));
    }
}
