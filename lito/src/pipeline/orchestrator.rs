//! The pipeline orchestrator: drives a conversion request end to end.
//!
//! Segment 1 is synthesized first and handed to the preview sink before any
//! other work starts, so the user hears audio as early as possible. The
//! remaining segments are synthesized concurrently and joined all-or-nothing;
//! assembly order is always segment index order, never completion order.

use std::sync::Arc;

use futures_util::future::join_all;
use log::debug;

use super::sinks::{AudioSink, StatusSink};
use super::{
    ConversionError, ConversionRequest, ConversionState, ConversionSummary, InputSource,
};
use crate::audio::FullAudio;
use crate::naming;
use crate::text::{self, Segment};
use tts_client::{AudioBlob, SpeechBackend, SynthesisError};

/// Drives conversion requests against a speech backend.
pub struct Orchestrator {
    backend: Arc<dyn SpeechBackend>,
    max_input_chars: usize,
    segment_chars: usize,
    state: ConversionState,
}

impl Orchestrator {
    /// Create an orchestrator with the given input and per-segment ceilings.
    pub fn new(
        backend: Arc<dyn SpeechBackend>,
        max_input_chars: usize,
        segment_chars: usize,
    ) -> Self {
        Self {
            backend,
            max_input_chars,
            segment_chars,
            state: ConversionState::Idle,
        }
    }

    /// Current pipeline state.
    pub fn state(&self) -> ConversionState {
        self.state
    }

    /// Run one conversion request.
    ///
    /// All prior state is discarded first. Every error is translated into a
    /// single status-sink message, and the processing indicator is cleared
    /// on every exit path, success or failure.
    pub async fn convert(
        &mut self,
        request: ConversionRequest,
        audio: &mut dyn AudioSink,
        status: &mut dyn StatusSink,
    ) -> Result<ConversionSummary, ConversionError> {
        self.state = ConversionState::Idle;
        status.set_busy(true);

        let result = self.drive(request, audio, status).await;

        match &result {
            Ok(_) => {
                self.state = ConversionState::Ready;
            }
            Err(err) => {
                self.state = ConversionState::Failed;
                status.error(&user_message(err));
            }
        }

        status.set_busy(false);
        result
    }

    async fn drive(
        &mut self,
        request: ConversionRequest,
        audio: &mut dyn AudioSink,
        status: &mut dyn StatusSink,
    ) -> Result<ConversionSummary, ConversionError> {
        self.state = ConversionState::ReadingInput;
        status.status("Reading input...");
        let text = self.resolve_input(&request.source, status).await?;

        self.state = ConversionState::Segmenting;
        let segments = text::segment_text(&text, self.segment_chars);
        if segments.is_empty() {
            // Unreachable given input validation, but never synthesize nothing.
            return Err(ConversionError::Validation(
                "Please enter some text.".to_string(),
            ));
        }
        debug!("segmented input into {} segment(s)", segments.len());

        self.state = ConversionState::SynthesizingPreview;
        status.status("Generating preview...");
        let first = self
            .backend
            .synthesize(&segments[0].text, &request.voice)
            .await?;

        self.state = ConversionState::PlayingPreview;
        audio.play_preview(&first);

        let full = if segments.len() > 1 {
            status.status("Playing preview... (generating full audio in background)");
            self.state = ConversionState::SynthesizingRemainder;
            let rest = self
                .synthesize_remainder(&segments[1..], &request.voice)
                .await?;

            let mut blobs = Vec::with_capacity(segments.len());
            blobs.push(first);
            blobs.extend(rest);
            FullAudio::concatenate(&blobs)
        } else {
            FullAudio::concatenate(std::slice::from_ref(&first))
        };

        let filename = naming::derive_filename(&text);
        audio.offer_full_playback(&full);
        audio.offer_download(&full, &filename);
        status.success(if segments.len() > 1 {
            "Full audio ready!"
        } else {
            "Audio ready!"
        });

        Ok(ConversionSummary {
            segment_count: segments.len(),
            filename,
            audio_bytes: full.len(),
        })
    }

    /// Resolve the request's source into the text to convert.
    async fn resolve_input(
        &self,
        source: &InputSource,
        status: &mut dyn StatusSink,
    ) -> Result<String, ConversionError> {
        match source {
            InputSource::Text(raw) => {
                let text = raw.trim().to_string();
                if text.is_empty() {
                    return Err(ConversionError::Validation(
                        "Please enter some text.".to_string(),
                    ));
                }
                let chars = text.chars().count();
                if chars > self.max_input_chars {
                    return Err(ConversionError::Validation(format!(
                        "Text is {} characters, over the {} character limit.",
                        chars, self.max_input_chars
                    )));
                }
                Ok(text)
            }
            InputSource::File(path) => {
                let content = tokio::fs::read(path).await?;
                let filename = path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| "upload".to_string());

                let extraction = self.backend.extract_text(&filename, content).await?;
                if extraction.truncated {
                    status.notice(&format!(
                        "Note: text was truncated to {} characters.",
                        self.max_input_chars
                    ));
                }
                Ok(extraction.text)
            }
        }
    }

    /// Fan out synthesis for all remaining segments and join on the full
    /// set. No request is cancelled when a sibling fails; results come back
    /// in segment order, so the first failing segment wins deterministically.
    async fn synthesize_remainder(
        &self,
        segments: &[Segment],
        voice: &str,
    ) -> Result<Vec<AudioBlob>, SynthesisError> {
        let tasks = segments.iter().map(|segment| {
            let backend = Arc::clone(&self.backend);
            let index = segment.index;
            async move {
                let blob = backend.synthesize(&segment.text, voice).await?;
                debug!("segment {} synthesized ({} bytes)", index, blob.len());
                Ok::<AudioBlob, SynthesisError>(blob)
            }
        });

        join_all(tasks).await.into_iter().collect()
    }
}

/// Translate a pipeline error into the single user-facing message.
///
/// The capacity condition gets distinct, actionable guidance; everything
/// else is surfaced verbatim.
fn user_message(err: &ConversionError) -> String {
    match err {
        ConversionError::Synthesis(synth) if synth.is_capacity() => {
            "The speech service is at capacity right now. Please try again in a few \
             minutes, or point lito at another server with --server."
                .to_string()
        }
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::time::Duration;
    use tts_client::MockBackend;

    #[derive(Default)]
    struct RecordingAudio {
        preview: Option<Vec<u8>>,
        full: Option<Vec<u8>>,
        download: Option<(Vec<u8>, String)>,
    }

    impl AudioSink for RecordingAudio {
        fn play_preview(&mut self, blob: &AudioBlob) {
            self.preview = Some(blob.as_bytes().to_vec());
        }

        fn offer_full_playback(&mut self, audio: &FullAudio) {
            self.full = Some(audio.as_bytes().to_vec());
        }

        fn offer_download(&mut self, audio: &FullAudio, filename: &str) {
            self.download = Some((audio.as_bytes().to_vec(), filename.to_string()));
        }
    }

    #[derive(Default)]
    struct RecordingStatus {
        statuses: Vec<String>,
        notices: Vec<String>,
        successes: Vec<String>,
        errors: Vec<String>,
        busy_transitions: Vec<bool>,
    }

    impl StatusSink for RecordingStatus {
        fn status(&mut self, message: &str) {
            self.statuses.push(message.to_string());
        }

        fn notice(&mut self, message: &str) {
            self.notices.push(message.to_string());
        }

        fn success(&mut self, message: &str) {
            self.successes.push(message.to_string());
        }

        fn error(&mut self, message: &str) {
            self.errors.push(message.to_string());
        }

        fn set_busy(&mut self, busy: bool) {
            self.busy_transitions.push(busy);
        }
    }

    fn text_request(text: &str) -> ConversionRequest {
        ConversionRequest {
            source: InputSource::Text(text.to_string()),
            voice: "en-US-AvaNeural".to_string(),
        }
    }

    fn orchestrator_with(backend: MockBackend, segment_chars: usize) -> Orchestrator {
        Orchestrator::new(Arc::new(backend), 1500, segment_chars)
    }

    #[tokio::test(start_paused = true)]
    async fn test_full_audio_in_segment_order_despite_completion_order() {
        // Segment 2 finishes long after segment 3; assembly order must not care.
        let backend = MockBackend::new().delay_on("Bbb.", Duration::from_secs(5));
        let mut orchestrator = orchestrator_with(backend, 4);
        let mut audio = RecordingAudio::default();
        let mut status = RecordingStatus::default();

        let summary = orchestrator
            .convert(text_request("Aaa. Bbb. Ccc."), &mut audio, &mut status)
            .await
            .unwrap();

        assert_eq!(summary.segment_count, 3);
        assert_eq!(audio.preview.as_deref(), Some(b"Aaa." as &[u8]));
        assert_eq!(audio.full.as_deref(), Some(b"Aaa.Bbb.Ccc." as &[u8]));
        let (download, filename) = audio.download.unwrap();
        assert_eq!(download, b"Aaa.Bbb.Ccc.");
        assert_eq!(filename, "lito_Aaa_Bbb_Ccc.mp3");
        assert_eq!(orchestrator.state(), ConversionState::Ready);
        assert!(status.statuses.iter().any(|s| s == "Generating preview..."));
        assert_eq!(status.successes, vec!["Full audio ready!"]);
    }

    #[tokio::test]
    async fn test_preview_survives_remainder_failure() {
        let backend = MockBackend::new().fail_on(
            "Ccc.",
            SynthesisError::BackendRejected {
                status: 500,
                message: "synthesis exploded".to_string(),
            },
        );
        let mut orchestrator = orchestrator_with(backend, 4);
        let mut audio = RecordingAudio::default();
        let mut status = RecordingStatus::default();

        let result = orchestrator
            .convert(text_request("Aaa. Bbb. Ccc."), &mut audio, &mut status)
            .await;

        assert!(matches!(result, Err(ConversionError::Synthesis(_))));
        assert_eq!(orchestrator.state(), ConversionState::Failed);
        // The preview was already delivered and is not retracted.
        assert_eq!(audio.preview.as_deref(), Some(b"Aaa." as &[u8]));
        assert!(audio.full.is_none());
        assert!(audio.download.is_none());
        assert_eq!(status.errors.len(), 1);
        assert!(status.errors[0].contains("synthesis exploded"));
    }

    #[tokio::test]
    async fn test_preview_failure_stops_before_remainder() {
        let backend = Arc::new(MockBackend::new().fail_on(
            "Aaa.",
            SynthesisError::TransportFailure {
                message: "connection refused".to_string(),
            },
        ));
        let mock = Arc::clone(&backend);
        let mut orchestrator = Orchestrator::new(backend, 1500, 4);
        let mut audio = RecordingAudio::default();
        let mut status = RecordingStatus::default();

        let result = orchestrator
            .convert(text_request("Aaa. Bbb. Ccc."), &mut audio, &mut status)
            .await;

        assert!(result.is_err());
        assert!(audio.preview.is_none());
        // Remaining segments were never submitted.
        assert_eq!(mock.synthesize_calls(), 1);
    }

    #[tokio::test]
    async fn test_single_segment_shortcut() {
        let backend = Arc::new(MockBackend::new());
        let mock = Arc::clone(&backend);
        let mut orchestrator = Orchestrator::new(backend, 1500, 800);
        let mut audio = RecordingAudio::default();
        let mut status = RecordingStatus::default();

        let summary = orchestrator
            .convert(text_request("Hello world."), &mut audio, &mut status)
            .await
            .unwrap();

        assert_eq!(summary.segment_count, 1);
        // No concurrent remainder step: exactly one synthesis call.
        assert_eq!(mock.synthesize_calls(), 1);
        assert_eq!(audio.preview.as_deref(), Some(b"Hello world." as &[u8]));
        assert_eq!(audio.full.as_deref(), Some(b"Hello world." as &[u8]));
        let (_, filename) = audio.download.unwrap();
        assert_eq!(filename, "lito_Hello_world.mp3");
        assert_eq!(status.successes, vec!["Audio ready!"]);
    }

    #[tokio::test]
    async fn test_empty_text_fails_validation() {
        let backend = MockBackend::new();
        let mut orchestrator = orchestrator_with(backend, 800);
        let mut audio = RecordingAudio::default();
        let mut status = RecordingStatus::default();

        let result = orchestrator
            .convert(text_request("   "), &mut audio, &mut status)
            .await;

        assert!(matches!(result, Err(ConversionError::Validation(_))));
        assert_eq!(orchestrator.state(), ConversionState::Failed);
        assert!(audio.preview.is_none());
    }

    #[tokio::test]
    async fn test_over_ceiling_text_fails_validation() {
        let backend = MockBackend::new();
        let mut orchestrator = Orchestrator::new(Arc::new(backend), 10, 800);
        let mut audio = RecordingAudio::default();
        let mut status = RecordingStatus::default();

        let result = orchestrator
            .convert(
                text_request("This text is longer than ten characters."),
                &mut audio,
                &mut status,
            )
            .await;

        match result {
            Err(ConversionError::Validation(message)) => {
                assert!(message.contains("10 character limit"));
            }
            other => panic!("Expected validation error, got {:?}", other.map(|_| ())),
        }
    }

    #[tokio::test]
    async fn test_capacity_failure_gets_actionable_message() {
        let backend = MockBackend::new().fail_on(
            "Hello world.",
            SynthesisError::BackendUnavailable {
                message: "demo at capacity".to_string(),
            },
        );
        let mut orchestrator = orchestrator_with(backend, 800);
        let mut audio = RecordingAudio::default();
        let mut status = RecordingStatus::default();

        let result = orchestrator
            .convert(text_request("Hello world."), &mut audio, &mut status)
            .await;

        assert!(result.is_err());
        assert_eq!(status.errors.len(), 1);
        assert!(status.errors[0].contains("at capacity"));
        assert!(status.errors[0].contains("try again"));
    }

    #[tokio::test]
    async fn test_busy_cleared_on_success_and_failure() {
        let backend = MockBackend::new();
        let mut orchestrator = orchestrator_with(backend, 800);
        let mut audio = RecordingAudio::default();
        let mut status = RecordingStatus::default();

        orchestrator
            .convert(text_request("Hello world."), &mut audio, &mut status)
            .await
            .unwrap();
        assert_eq!(status.busy_transitions, vec![true, false]);

        let mut status = RecordingStatus::default();
        orchestrator
            .convert(text_request(""), &mut audio, &mut status)
            .await
            .unwrap_err();
        assert_eq!(status.busy_transitions, vec![true, false]);
    }

    #[tokio::test]
    async fn test_file_input_with_truncation_notice() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"raw file body").unwrap();

        let backend = MockBackend::new().with_extraction("Extracted text.", true);
        let mut orchestrator = orchestrator_with(backend, 800);
        let mut audio = RecordingAudio::default();
        let mut status = RecordingStatus::default();

        let request = ConversionRequest {
            source: InputSource::File(file.path().to_path_buf()),
            voice: "en-US-AvaNeural".to_string(),
        };

        let summary = orchestrator
            .convert(request, &mut audio, &mut status)
            .await
            .unwrap();

        assert_eq!(summary.segment_count, 1);
        assert_eq!(status.notices.len(), 1);
        assert!(status.notices[0].contains("truncated"));
        assert!(status.errors.is_empty());
        assert_eq!(audio.preview.as_deref(), Some(b"Extracted text." as &[u8]));
    }

    #[tokio::test]
    async fn test_extraction_failure_propagates() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"binary junk").unwrap();

        let backend = MockBackend::new().extraction_fails("Could not extract text from file");
        let mut orchestrator = orchestrator_with(backend, 800);
        let mut audio = RecordingAudio::default();
        let mut status = RecordingStatus::default();

        let request = ConversionRequest {
            source: InputSource::File(file.path().to_path_buf()),
            voice: "en-US-AvaNeural".to_string(),
        };

        let result = orchestrator.convert(request, &mut audio, &mut status).await;

        assert!(matches!(result, Err(ConversionError::Extraction(_))));
        assert_eq!(status.errors.len(), 1);
        assert!(status.errors[0].contains("Could not extract text from file"));
    }

    #[tokio::test]
    async fn test_rerun_produces_identical_byte_length() {
        let backend = Arc::new(MockBackend::new());
        let mut orchestrator = Orchestrator::new(backend, 1500, 4);

        let mut lengths = Vec::new();
        for _ in 0..2 {
            let mut audio = RecordingAudio::default();
            let mut status = RecordingStatus::default();
            let summary = orchestrator
                .convert(text_request("Aaa. Bbb. Ccc."), &mut audio, &mut status)
                .await
                .unwrap();
            lengths.push(summary.audio_bytes);
            assert_eq!(audio.download.unwrap().0.len(), summary.audio_bytes);
        }
        assert_eq!(lengths[0], lengths[1]);
    }
}
