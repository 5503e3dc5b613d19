use std::path::Path;

use crate::forms::FormError;

/// Uploads of this size or larger are refused.
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// An image picked for classification.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl ImageUpload {
    pub fn new(file_name: impl Into<String>, content_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: content_type.into(),
            bytes,
        }
    }

    /// Read a file from disk, guessing its MIME type from the extension.
    ///
    /// Oversized files are refused from their metadata, before any bytes
    /// are loaded.
    pub fn from_path(path: &Path) -> Result<Self, FormError> {
        let unreadable = |e: std::io::Error| FormError::Unreadable(e.to_string());
        let on_disk = std::fs::metadata(path).map_err(unreadable)?.len();
        let size = usize::try_from(on_disk).unwrap_or(usize::MAX);
        if size >= MAX_UPLOAD_BYTES {
            return Err(FormError::FileTooLarge { size });
        }
        let bytes = std::fs::read(path).map_err(unreadable)?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string());
        let content_type = mime_guess::from_path(path)
            .first_or_octet_stream()
            .essence_str()
            .to_string();
        Ok(Self::new(file_name, content_type, bytes))
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// `content_type` without surrounding whitespace, lowercased. This is
    /// what gets checked and what goes on the wire.
    pub fn mime_type(&self) -> String {
        self.content_type.trim().to_ascii_lowercase()
    }

    /// Only `image/*` content under the size cap may be sent.
    pub fn validate(&self) -> Result<(), FormError> {
        if !self.mime_type().starts_with("image/") {
            return Err(FormError::NotAnImage);
        }
        if self.bytes.len() >= MAX_UPLOAD_BYTES {
            return Err(FormError::FileTooLarge {
                size: self.bytes.len(),
            });
        }
        Ok(())
    }
}
