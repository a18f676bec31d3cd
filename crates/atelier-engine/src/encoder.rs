//! Attachment encoding.
//!
//! Converts raw selected files into transmissible attachment records. An
//! unreadable source never yields a partial or corrupt record; it is
//! dropped from the batch.

use atelier_core::attachment::Attachment;
use atelier_core::error::{AtelierError, Result};
use atelier_core::source::AttachmentSource;

/// Encodes selected files into [`Attachment`] records.
pub struct AttachmentEncoder;

impl AttachmentEncoder {
    /// Encodes a single source.
    ///
    /// # Errors
    ///
    /// Returns [`AtelierError::Decode`] if the source bytes cannot be read.
    pub async fn encode(source: &dyn AttachmentSource) -> Result<Attachment> {
        let bytes = source
            .read()
            .await
            .map_err(|err| AtelierError::decode(format!("{err:#}")))?;
        Ok(Attachment::from_bytes(&bytes, source.mime_type()))
    }

    /// Encodes a batch of sources concurrently.
    ///
    /// Results are joined positionally, so the output preserves selection
    /// order no matter which encode completes first. Unreadable sources are
    /// dropped from the batch.
    pub async fn encode_all(sources: &[Box<dyn AttachmentSource>]) -> Vec<Attachment> {
        let encoded =
            futures::future::join_all(sources.iter().map(|source| Self::encode(source.as_ref())))
                .await;

        encoded
            .into_iter()
            .enumerate()
            .filter_map(|(position, result)| match result {
                Ok(attachment) => Some(attachment),
                Err(err) => {
                    tracing::debug!(position, error = %err, "dropping unreadable attachment");
                    None
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use atelier_core::attachment::AttachmentKind;

    /// Source that optionally fails and yields a configurable number of
    /// times before completing, to exercise out-of-order completion.
    struct MockSource {
        mime_type: String,
        bytes: Vec<u8>,
        readable: bool,
        yields: usize,
    }

    impl MockSource {
        fn new(mime_type: &str, bytes: &[u8]) -> Self {
            Self {
                mime_type: mime_type.to_string(),
                bytes: bytes.to_vec(),
                readable: true,
                yields: 0,
            }
        }

        fn unreadable(mime_type: &str) -> Self {
            Self {
                readable: false,
                ..Self::new(mime_type, b"")
            }
        }

        fn slow(mut self, yields: usize) -> Self {
            self.yields = yields;
            self
        }
    }

    #[async_trait]
    impl AttachmentSource for MockSource {
        fn mime_type(&self) -> &str {
            &self.mime_type
        }

        async fn read(&self) -> anyhow::Result<Vec<u8>> {
            for _ in 0..self.yields {
                tokio::task::yield_now().await;
            }
            if !self.readable {
                anyhow::bail!("device removed");
            }
            Ok(self.bytes.clone())
        }
    }

    #[tokio::test]
    async fn encode_classifies_by_mime_prefix() {
        let image = AttachmentEncoder::encode(&MockSource::new("image/png", b"png"))
            .await
            .unwrap();
        assert_eq!(image.kind, AttachmentKind::Image);

        let audio = AttachmentEncoder::encode(&MockSource::new("audio/mpeg", b"mp3"))
            .await
            .unwrap();
        assert_eq!(audio.kind, AttachmentKind::Audio);
    }

    #[tokio::test]
    async fn unreadable_source_is_a_decode_error() {
        let err = AttachmentEncoder::encode(&MockSource::unreadable("image/png"))
            .await
            .unwrap_err();
        assert!(err.is_decode());
    }

    #[tokio::test]
    async fn unreadable_source_never_enters_the_batch() {
        let sources: Vec<Box<dyn AttachmentSource>> = vec![
            Box::new(MockSource::new("image/png", b"first")),
            Box::new(MockSource::unreadable("audio/wav")),
            Box::new(MockSource::new("image/jpeg", b"third")),
        ];

        let attachments = AttachmentEncoder::encode_all(&sources).await;

        assert_eq!(attachments.len(), 2);
        assert_eq!(attachments[0].mime_type, "image/png");
        assert_eq!(attachments[1].mime_type, "image/jpeg");
    }

    #[tokio::test]
    async fn batch_preserves_selection_order_not_completion_order() {
        // The first selection finishes last; output order must not change.
        let sources: Vec<Box<dyn AttachmentSource>> = vec![
            Box::new(MockSource::new("image/png", b"slow").slow(8)),
            Box::new(MockSource::new("audio/mpeg", b"fast")),
        ];

        let attachments = AttachmentEncoder::encode_all(&sources).await;

        assert_eq!(attachments.len(), 2);
        assert_eq!(attachments[0].mime_type, "image/png");
        assert_eq!(attachments[1].mime_type, "audio/mpeg");
    }
}
