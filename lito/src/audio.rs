//! Full-audio assembly from per-segment blobs.

use tts_client::AudioBlob;

/// The complete, order-correct concatenation of all segments' audio.
#[derive(Debug, Clone)]
pub struct FullAudio {
    bytes: Vec<u8>,
}

impl FullAudio {
    /// Concatenate blobs in the order given (segment index order).
    pub fn concatenate(blobs: &[AudioBlob]) -> Self {
        let total = blobs.iter().map(|b| b.len()).sum();
        let mut bytes = Vec::with_capacity(total);
        for blob in blobs {
            bytes.extend_from_slice(blob.as_bytes());
        }
        Self { bytes }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}
