//! Mock speech backend for testing
//!
//! Provides a configurable backend that can simulate synthesis failures,
//! slow segments, and extraction results without a network.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use crate::backend::{AudioBlob, Extraction, SpeechBackend, Voice};
use crate::error::{ExtractionError, SynthesisError};

/// Scripted behavior for one synthesized text.
#[derive(Default)]
struct SegmentScript {
    delay: Option<Duration>,
    error: Option<SynthesisError>,
}

/// A mock backend for testing pipeline behavior.
///
/// Unscripted texts synthesize successfully; the returned audio bytes are
/// the text's own bytes, so assembled output is easy to assert on.
pub struct MockBackend {
    voices: Vec<Voice>,
    scripts: Mutex<HashMap<String, SegmentScript>>,
    extraction: Mutex<Option<Result<Extraction, ExtractionError>>>,
    synthesize_calls: AtomicUsize,
}

impl MockBackend {
    /// Create a backend that succeeds on everything.
    pub fn new() -> Self {
        Self {
            voices: vec![
                Voice {
                    id: "en-US-AvaNeural".to_string(),
                    display_name: "English (Female)".to_string(),
                },
                Voice {
                    id: "en-US-AndrewNeural".to_string(),
                    display_name: "English (Male)".to_string(),
                },
            ],
            scripts: Mutex::new(HashMap::new()),
            extraction: Mutex::new(None),
            synthesize_calls: AtomicUsize::new(0),
        }
    }

    /// Fail synthesis of the given text with the given error, every time.
    pub fn fail_on(self, text: &str, error: SynthesisError) -> Self {
        self.scripts
            .lock()
            .unwrap()
            .entry(text.to_string())
            .or_default()
            .error = Some(error);
        self
    }

    /// Delay synthesis of the given text.
    pub fn delay_on(self, text: &str, delay: Duration) -> Self {
        self.scripts
            .lock()
            .unwrap()
            .entry(text.to_string())
            .or_default()
            .delay = Some(delay);
        self
    }

    /// Make extraction return the given text.
    pub fn with_extraction(self, text: &str, truncated: bool) -> Self {
        *self.extraction.lock().unwrap() = Some(Ok(Extraction {
            text: text.to_string(),
            truncated,
        }));
        self
    }

    /// Make extraction fail with the given message.
    pub fn extraction_fails(self, message: &str) -> Self {
        *self.extraction.lock().unwrap() = Some(Err(ExtractionError::new(message)));
        self
    }

    /// Get the number of times synthesize() was called.
    pub fn synthesize_calls(&self) -> usize {
        self.synthesize_calls.load(Ordering::SeqCst)
    }
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SpeechBackend for MockBackend {
    async fn voices(&self) -> Result<Vec<Voice>, SynthesisError> {
        Ok(self.voices.clone())
    }

    async fn synthesize(&self, text: &str, _voice: &str) -> Result<AudioBlob, SynthesisError> {
        self.synthesize_calls.fetch_add(1, Ordering::SeqCst);

        let (delay, error) = {
            let scripts = self.scripts.lock().unwrap();
            match scripts.get(text) {
                Some(script) => (script.delay, script.error.as_ref().map(clone_error)),
                None => (None, None),
            }
        };

        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if let Some(error) = error {
            return Err(error);
        }

        Ok(AudioBlob::new(text.as_bytes().to_vec()))
    }

    async fn extract_text(
        &self,
        _filename: &str,
        content: Vec<u8>,
    ) -> Result<Extraction, ExtractionError> {
        let scripted = self.extraction.lock().unwrap();
        match scripted.as_ref() {
            Some(Ok(extraction)) => Ok(extraction.clone()),
            Some(Err(err)) => Err(ExtractionError::new(err.message.clone())),
            None => Ok(Extraction {
                text: String::from_utf8_lossy(&content).into_owned(),
                truncated: false,
            }),
        }
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}

/// Clone a SynthesisError (needed because SynthesisError doesn't implement Clone)
fn clone_error(err: &SynthesisError) -> SynthesisError {
    match err {
        SynthesisError::BackendUnavailable { message } => SynthesisError::BackendUnavailable {
            message: message.clone(),
        },
        SynthesisError::BackendRejected { status, message } => SynthesisError::BackendRejected {
            status: *status,
            message: message.clone(),
        },
        SynthesisError::TransportFailure { message } => SynthesisError::TransportFailure {
            message: message.clone(),
        },
    }
}
