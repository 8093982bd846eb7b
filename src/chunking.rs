//! Fixed-window text splitting with overlap.
//!
//! [`split_text`] is the single chunk-boundary policy of the crate: pure,
//! deterministic, and character-based so that multi-byte scripts (Hebrew
//! documents are a first-class input) never get cut mid-codepoint.

use crate::error::{KbError, Result};

/// Split `text` into overlapping fixed-size windows of `chunk_size`
/// characters, each window starting `chunk_size - overlap` characters
/// after the previous one.
///
/// Behavior:
///
/// - `overlap >= chunk_size` is clamped to `chunk_size / 2` before
///   splitting, guarding against non-advancing windows.
/// - Text of at most `chunk_size` characters yields a single element
///   containing the whole text, even when it is empty; callers filter
///   empty documents upstream.
/// - The final window may be shorter than `chunk_size`.
///
/// # Errors
///
/// Returns [`KbError::InvalidConfiguration`] when `chunk_size` is zero.
pub fn split_text(text: &str, chunk_size: usize, overlap: usize) -> Result<Vec<String>> {
    if chunk_size == 0 {
        return Err(KbError::InvalidConfiguration(
            "chunk_size must be greater than zero".to_string(),
        ));
    }

    let overlap = if overlap >= chunk_size { chunk_size / 2 } else { overlap };

    let chars: Vec<char> = text.chars().collect();
    if chars.len() <= chunk_size {
        return Ok(vec![text.to_string()]);
    }

    // overlap < chunk_size holds after the clamp, so the step is non-zero.
    let step = chunk_size - overlap;
    let mut chunks = Vec::new();
    let mut start = 0;

    while start < chars.len() {
        let end = (start + chunk_size).min(chars.len());
        chunks.push(chars[start..end].iter().collect());
        start += step;
    }

    Ok(chunks)
}
