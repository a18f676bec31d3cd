//! Attachment types.
//!
//! An attachment is a base64-encoded payload plus its MIME type, ready for
//! backend transmission. The wire format carries the raw base64 string with
//! no `data:` URI prefix; the prefixed form exists only for local preview.

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use serde::{Deserialize, Serialize};

/// Classification of an attachment by its MIME type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttachmentKind {
    Image,
    Audio,
}

impl AttachmentKind {
    /// Classifies a MIME type.
    ///
    /// `image/*` maps to [`AttachmentKind::Image`]; anything else the file
    /// picker accepts is treated as audio.
    pub fn from_mime(mime_type: &str) -> Self {
        if mime_type.starts_with("image/") {
            Self::Image
        } else {
            Self::Audio
        }
    }
}

/// A transmissible attachment record.
///
/// Immutable once embedded in a message; attachments are owned by the
/// message that carries them and never shared across messages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    /// Base64 payload (no data-URI prefix).
    pub data: String,
    /// MIME type of the payload.
    pub mime_type: String,
    /// Client-side classification derived from the MIME type.
    pub kind: AttachmentKind,
}

impl Attachment {
    /// Encodes raw bytes into an attachment record.
    pub fn from_bytes(bytes: &[u8], mime_type: impl Into<String>) -> Self {
        let mime_type = mime_type.into();
        Self {
            data: BASE64_STANDARD.encode(bytes),
            kind: AttachmentKind::from_mime(&mime_type),
            mime_type,
        }
    }

    /// Reconstructs a displayable `data:` URI for local preview.
    ///
    /// Never used for backend transmission; the wire format is the bare
    /// base64 string.
    pub fn data_uri(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_image_mime_prefix() {
        assert_eq!(AttachmentKind::from_mime("image/png"), AttachmentKind::Image);
        assert_eq!(AttachmentKind::from_mime("image/webp"), AttachmentKind::Image);
    }

    #[test]
    fn classifies_everything_else_as_audio() {
        assert_eq!(AttachmentKind::from_mime("audio/mpeg"), AttachmentKind::Audio);
        assert_eq!(AttachmentKind::from_mime("audio/wav"), AttachmentKind::Audio);
    }

    #[test]
    fn data_uri_prefixes_mime_and_encoding() {
        let attachment = Attachment::from_bytes(b"hello", "image/png");
        assert_eq!(attachment.data, "aGVsbG8=");
        assert_eq!(attachment.data_uri(), "data:image/png;base64,aGVsbG8=");
    }
}
