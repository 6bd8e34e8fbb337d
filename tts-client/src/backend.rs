use async_trait::async_trait;

use crate::error::{ExtractionError, SynthesisError};

/// A synthesis voice offered by the speech service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Voice {
    /// Opaque identifier, passed through unmodified to synthesis requests
    pub id: String,
    /// Human-readable name for selection UIs
    pub display_name: String,
}

/// Synthesized audio for exactly one text segment.
#[derive(Debug, Clone)]
pub struct AudioBlob {
    bytes: Vec<u8>,
}

impl AudioBlob {
    /// Wrap raw audio bytes returned by the backend.
    pub fn new(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Text recovered from an uploaded file.
#[derive(Debug, Clone)]
pub struct Extraction {
    /// The extracted plain text
    pub text: String,
    /// Whether the service cut the text to its input character ceiling
    pub truncated: bool,
}

/// Trait for speech service backends.
#[async_trait]
pub trait SpeechBackend: Send + Sync {
    /// List the voices the service offers, in service order.
    async fn voices(&self) -> Result<Vec<Voice>, SynthesisError>;

    /// Synthesize one text segment with the given voice.
    ///
    /// One network call per invocation; no retries at this layer.
    async fn synthesize(&self, text: &str, voice: &str) -> Result<AudioBlob, SynthesisError>;

    /// Extract plain text from an uploaded file.
    async fn extract_text(
        &self,
        filename: &str,
        content: Vec<u8>,
    ) -> Result<Extraction, ExtractionError>;

    /// Get the backend name for display.
    fn name(&self) -> &'static str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_audio_blob_accessors() {
        let blob = AudioBlob::new(vec![1, 2, 3]);
        assert_eq!(blob.len(), 3);
        assert!(!blob.is_empty());
        assert_eq!(blob.as_bytes(), &[1, 2, 3]);
        assert_eq!(blob.into_bytes(), vec![1, 2, 3]);
    }

    #[test]
    fn test_empty_audio_blob() {
        let blob = AudioBlob::new(Vec::new());
        assert!(blob.is_empty());
        assert_eq!(blob.len(), 0);
    }
}
