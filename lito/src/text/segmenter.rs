//! Sentence-boundary segmentation for synthesis requests.

use once_cell::sync::Lazy;
use regex::Regex;

use super::Segment;

/// Sentence-like units: text through a run of terminal punctuation, or an
/// unterminated tail.
static SENTENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^.!?]+[.!?]+|[^.!?]+").expect("sentence pattern should compile"));

/// Split text into trimmed sentence-like units, dropping empties.
fn split_into_sentences(text: &str) -> Vec<&str> {
    SENTENCE
        .find_iter(text)
        .map(|m| m.as_str().trim())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Split input text into ordered, bounded-length segments.
///
/// Consecutive sentences are packed greedily into the current segment; when
/// appending the next sentence would push a non-empty segment past
/// `max_chars`, the segment is closed and the sentence starts a new one. A
/// single sentence longer than `max_chars` is kept whole rather than split
/// mid-sentence.
///
/// Non-empty input always yields at least one segment; text with no terminal
/// punctuation yields exactly one segment equal to the trimmed whole text.
pub fn segment_text(text: &str, max_chars: usize) -> Vec<Segment> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Vec::new();
    }

    let sentences = split_into_sentences(trimmed);
    if sentences.is_empty() {
        // Nothing but terminal punctuation; treat the whole text as one unit.
        return vec![Segment::new(1, trimmed.to_string())];
    }

    let mut chunks: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut current_chars = 0usize;

    for sentence in sentences {
        let sentence_chars = sentence.chars().count();

        if current.is_empty() {
            current.push_str(sentence);
            current_chars = sentence_chars;
        } else if current_chars + sentence_chars + 1 > max_chars {
            chunks.push(std::mem::take(&mut current));
            current.push_str(sentence);
            current_chars = sentence_chars;
        } else {
            current.push(' ');
            current.push_str(sentence);
            current_chars += sentence_chars + 1;
        }
    }

    if !current.is_empty() {
        chunks.push(current);
    }

    chunks
        .into_iter()
        .enumerate()
        .map(|(i, text)| Segment::new(i + 1, text))
        .collect()
}
