//! Conversion pipeline: input resolution, segmentation, synthesis, assembly.

pub mod orchestrator;
pub mod sinks;

pub use orchestrator::Orchestrator;

use std::path::PathBuf;

use thiserror::Error;
use tts_client::{ExtractionError, SynthesisError};

/// Where the input text comes from.
#[derive(Debug, Clone)]
pub enum InputSource {
    /// Text entered directly by the user.
    Text(String),
    /// A file whose text the extraction service recovers.
    File(PathBuf),
}

/// A single conversion request entering the pipeline.
#[derive(Debug, Clone)]
pub struct ConversionRequest {
    pub source: InputSource,
    /// Voice identifier, passed through unmodified to synthesis
    pub voice: String,
}

/// Pipeline state for the current request.
///
/// Owned and mutated only by the orchestrator; discarded at the start of
/// the next request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConversionState {
    Idle,
    ReadingInput,
    Segmenting,
    SynthesizingPreview,
    PlayingPreview,
    SynthesizingRemainder,
    Ready,
    Failed,
}

/// Errors surfaced at the orchestrator boundary, one per failing stage.
#[derive(Error, Debug)]
pub enum ConversionError {
    /// Local, user-correctable input problem.
    #[error("{0}")]
    Validation(String),

    #[error(transparent)]
    Extraction(#[from] ExtractionError),

    #[error(transparent)]
    Synthesis(#[from] SynthesisError),

    /// The input file could not be read locally.
    #[error("Failed to read input file: {0}")]
    Io(#[from] std::io::Error),
}

/// Summary of a completed conversion.
#[derive(Debug, Clone)]
pub struct ConversionSummary {
    pub segment_count: usize,
    pub filename: String,
    pub audio_bytes: usize,
}
