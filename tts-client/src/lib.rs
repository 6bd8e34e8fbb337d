//! Shared speech-service client library for the lito workspace
//!
//! Provides a unified interface to a Lito-compatible speech service:
//! - Voice listing
//! - Per-segment speech synthesis
//! - Server-side text extraction from uploaded files

pub mod backend;
pub mod error;
pub mod mock;
pub mod remote;

pub use backend::{AudioBlob, Extraction, SpeechBackend, Voice};
pub use error::{ExtractionError, SynthesisError};
pub use mock::MockBackend;
pub use remote::RemoteBackend;
