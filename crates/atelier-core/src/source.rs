//! Attachment source boundary trait.

use anyhow::Result;
use async_trait::async_trait;

/// A file-like input selected by the user.
///
/// This trait decouples the encoder from the raw file-reading mechanism.
/// The picker constrains selection to `image/*` and `audio/*` MIME types.
#[async_trait]
pub trait AttachmentSource: Send + Sync {
    /// MIME type reported by the picker for this source.
    fn mime_type(&self) -> &str;

    /// Reads the source bytes.
    ///
    /// # Returns
    ///
    /// - `Ok(bytes)`: The raw file content
    /// - `Err(_)`: The source is unreadable
    async fn read(&self) -> Result<Vec<u8>>;
}
