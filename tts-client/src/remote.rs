//! HTTP client for a Lito-compatible speech service.
//!
//! Endpoints:
//! - `GET /api/voices` — ordered voice list
//! - `POST /api/tts` — JSON `{text, voice}`, binary audio on success
//! - `POST /api/extract-text` — multipart file upload, `{text, truncated}`

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};

use crate::backend::{AudioBlob, Extraction, SpeechBackend, Voice};
use crate::error::{ExtractionError, SynthesisError};

/// Client for a remote speech service.
pub struct RemoteBackend {
    base_url: String,
    client: Client,
}

impl RemoteBackend {
    /// Create a client against the given service base URL.
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: Client::new(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

// Wire types

#[derive(Debug, Serialize)]
struct TtsRequest<'a> {
    text: &'a str,
    voice: &'a str,
}

#[derive(Debug, Deserialize)]
struct VoiceEntry {
    id: String,
    #[serde(rename = "displayName")]
    display_name: String,
}

#[derive(Debug, Deserialize)]
struct ExtractResponse {
    text: String,
    #[serde(default)]
    truncated: bool,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    detail: String,
}

/// Pull the backend-provided detail out of an error body, falling back to
/// the raw body when it is not the structured payload.
fn error_detail(body: &str) -> String {
    match serde_json::from_str::<ErrorResponse>(body) {
        Ok(err) => err.detail,
        Err(_) => body.to_string(),
    }
}

/// Map a non-success synthesis response to its error kind.
///
/// HTTP 503 and 429 signal the capacity condition; everything else is a
/// plain rejection carrying the backend's detail message.
fn classify_synthesis_failure(status: StatusCode, body: &str) -> SynthesisError {
    let message = error_detail(body);
    match status.as_u16() {
        503 | 429 => SynthesisError::BackendUnavailable { message },
        code => SynthesisError::BackendRejected {
            status: code,
            message,
        },
    }
}

#[async_trait]
impl SpeechBackend for RemoteBackend {
    async fn voices(&self) -> Result<Vec<Voice>, SynthesisError> {
        let response = self
            .client
            .get(self.url("/api/voices"))
            .send()
            .await
            .map_err(|e| SynthesisError::TransportFailure {
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(classify_synthesis_failure(status, &body));
        }

        let entries: Vec<VoiceEntry> =
            response
                .json()
                .await
                .map_err(|e| SynthesisError::TransportFailure {
                    message: format!("Failed to parse voice list: {}", e),
                })?;

        Ok(entries
            .into_iter()
            .map(|entry| Voice {
                id: entry.id,
                display_name: entry.display_name,
            })
            .collect())
    }

    async fn synthesize(&self, text: &str, voice: &str) -> Result<AudioBlob, SynthesisError> {
        log::debug!("synthesizing {} chars with voice {}", text.len(), voice);

        let response = self
            .client
            .post(self.url("/api/tts"))
            .json(&TtsRequest { text, voice })
            .send()
            .await
            .map_err(|e| SynthesisError::TransportFailure {
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(classify_synthesis_failure(status, &body));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| SynthesisError::TransportFailure {
                message: format!("Failed to read audio body: {}", e),
            })?;

        Ok(AudioBlob::new(bytes.to_vec()))
    }

    async fn extract_text(
        &self,
        filename: &str,
        content: Vec<u8>,
    ) -> Result<Extraction, ExtractionError> {
        let part = Part::bytes(content).file_name(filename.to_string());
        let form = Form::new().part("file", part);

        let response = self
            .client
            .post(self.url("/api/extract-text"))
            .multipart(form)
            .send()
            .await
            .map_err(|e| ExtractionError::new(format!("Request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ExtractionError::new(error_detail(&body)));
        }

        let extract: ExtractResponse = response
            .json()
            .await
            .map_err(|e| ExtractionError::new(format!("Failed to parse response: {}", e)))?;

        Ok(Extraction {
            text: extract.text,
            truncated: extract.truncated,
        })
    }

    fn name(&self) -> &'static str {
        "remote"
    }
}
