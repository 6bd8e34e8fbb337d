use thiserror::Error;

/// Failure from the remote synthesis endpoint.
///
/// The variant is derived from the HTTP status and the structured error
/// payload, never from substring inspection of a message.
#[derive(Error, Debug)]
pub enum SynthesisError {
    /// The backend reported a capacity/overload condition.
    #[error("Speech service at capacity: {message}")]
    BackendUnavailable { message: String },

    /// The backend rejected the request for any other reason.
    #[error("Speech service rejected the request (HTTP {status}): {message}")]
    BackendRejected { status: u16, message: String },

    /// The request never produced a usable response.
    #[error("Could not reach the speech service: {message}")]
    TransportFailure { message: String },
}

impl SynthesisError {
    /// Whether this is the capacity condition that gets distinct
    /// user-facing guidance.
    pub fn is_capacity(&self) -> bool {
        matches!(self, SynthesisError::BackendUnavailable { .. })
    }
}

/// Failure from the remote text-extraction endpoint.
#[derive(Error, Debug)]
#[error("Text extraction failed: {message}")]
pub struct ExtractionError {
    pub message: String,
}

impl ExtractionError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
