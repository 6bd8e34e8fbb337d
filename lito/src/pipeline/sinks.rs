//! Output sinks: where the pipeline delivers audio and status messages.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use log::{info, warn};

use crate::audio::FullAudio;
use tts_client::AudioBlob;

/// Receives the audio artifacts the pipeline produces.
pub trait AudioSink {
    /// Segment 1's audio, to play immediately.
    fn play_preview(&mut self, blob: &AudioBlob);

    /// The complete audio, for playback.
    fn offer_full_playback(&mut self, audio: &FullAudio);

    /// The complete audio plus its derived filename, for saving.
    fn offer_download(&mut self, audio: &FullAudio, filename: &str);
}

/// The single user-facing status/error surface.
pub trait StatusSink {
    /// Progress message for the current stage.
    fn status(&mut self, message: &str);

    /// Non-fatal notice (e.g. server-side truncation).
    fn notice(&mut self, message: &str);

    /// Terminal success message.
    fn success(&mut self, message: &str);

    /// Terminal failure message.
    fn error(&mut self, message: &str);

    /// Show or clear the processing indicator.
    fn set_busy(&mut self, busy: bool);
}

/// Writes pipeline output to the filesystem.
///
/// The preview lands in the temp directory so the user can start listening
/// while the remainder synthesizes; the full audio goes to `output` when
/// given, otherwise to the derived filename in the working directory.
pub struct FileSink {
    output: Option<PathBuf>,
    preview_path: Option<PathBuf>,
    download_path: Option<PathBuf>,
}

impl FileSink {
    pub fn new(output: Option<PathBuf>) -> Self {
        Self {
            output,
            preview_path: None,
            download_path: None,
        }
    }

    /// Where the preview was written, if it was.
    pub fn preview_path(&self) -> Option<&Path> {
        self.preview_path.as_deref()
    }

    /// Where the full audio was written, if it was.
    pub fn download_path(&self) -> Option<&Path> {
        self.download_path.as_deref()
    }
}

impl AudioSink for FileSink {
    fn play_preview(&mut self, blob: &AudioBlob) {
        let path = std::env::temp_dir().join("lito_preview.mp3");
        match fs::write(&path, blob.as_bytes()) {
            Ok(()) => {
                info!("preview written to {}", path.display());
                self.preview_path = Some(path);
            }
            Err(e) => warn!("could not write preview: {}", e),
        }
    }

    fn offer_full_playback(&mut self, _audio: &FullAudio) {
        // The saved download covers playback for a CLI.
    }

    fn offer_download(&mut self, audio: &FullAudio, filename: &str) {
        let path = self
            .output
            .clone()
            .unwrap_or_else(|| PathBuf::from(filename));
        match fs::write(&path, audio.as_bytes()) {
            Ok(()) => self.download_path = Some(path),
            Err(e) => warn!("could not write {}: {}", path.display(), e),
        }
    }
}

/// Prints status to stderr, with a spinner while a conversion is running.
pub struct ConsoleStatus {
    spinner: Option<ProgressBar>,
}

impl ConsoleStatus {
    pub fn new() -> Self {
        Self { spinner: None }
    }

    fn println(&self, message: &str) {
        match &self.spinner {
            Some(pb) => pb.println(message),
            None => eprintln!("{}", message),
        }
    }
}

impl Default for ConsoleStatus {
    fn default() -> Self {
        Self::new()
    }
}

impl StatusSink for ConsoleStatus {
    fn status(&mut self, message: &str) {
        match &self.spinner {
            Some(pb) => pb.set_message(message.to_string()),
            None => eprintln!("{}", message),
        }
    }

    fn notice(&mut self, message: &str) {
        self.println(message);
    }

    fn success(&mut self, message: &str) {
        self.println(message);
    }

    fn error(&mut self, message: &str) {
        self.println(message);
    }

    fn set_busy(&mut self, busy: bool) {
        if busy {
            let pb = ProgressBar::new_spinner();
            pb.set_style(
                ProgressStyle::default_spinner()
                    .template("{spinner:.green} {msg}")
                    .unwrap(),
            );
            pb.enable_steady_tick(Duration::from_millis(120));
            self.spinner = Some(pb);
        } else if let Some(pb) = self.spinner.take() {
            pb.finish_and_clear();
        }
    }
}
