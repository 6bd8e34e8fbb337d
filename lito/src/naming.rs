//! Output filename derivation.

/// Fallback when the input yields no usable slug.
pub const DEFAULT_FILENAME: &str = "lito_audio.mp3";

/// Derive a filesystem-safe output name from the source text.
///
/// Takes the first three whitespace-separated words, joins them with
/// underscores, and strips every character outside `[A-Za-z0-9_]`. Falls
/// back to [`DEFAULT_FILENAME`] when no alphanumeric content survives.
pub fn derive_filename(text: &str) -> String {
    let slug: String = text
        .split_whitespace()
        .take(3)
        .collect::<Vec<_>>()
        .join("_")
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_')
        .collect();

    if slug.chars().any(|c| c.is_ascii_alphanumeric()) {
        format!("lito_{}.mp3", slug)
    } else {
        DEFAULT_FILENAME.to_string()
    }
}
