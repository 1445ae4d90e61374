#[cfg(test)]
mod tests;

use serde::{Deserialize, Serialize};
use tracing::debug;

/// A contiguous span of a source text. Offsets are character positions into
/// the text that produced the chunk, end exclusive. Spans of adjacent chunks
/// may overlap; sequence indices are strictly increasing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    pub text: String,
    /// 0-based sequence index within one source text.
    pub index: usize,
    pub start: usize,
    pub end: usize,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ChunkerConfig {
    /// Target chunk size in characters.
    pub chunk_size: usize,
    /// Characters of controlled overlap between adjacent chunks.
    pub overlap: usize,
    /// How far back from the tentative end to search for a boundary.
    pub boundary_window: usize,
}

impl Default for ChunkerConfig {
    #[inline]
    fn default() -> Self {
        Self {
            chunk_size: 1000,
            overlap: 200,
            boundary_window: 200,
        }
    }
}

/// Split `text` into overlapping, boundary-snapped chunks.
///
/// Deterministic, pure function of `text` and `config`. Empty input yields
/// zero chunks; input shorter than the chunk size yields exactly one chunk
/// covering the whole text.
///
/// Each window end is snapped backward to the nearest sentence boundary
/// (`[.!?]` followed by whitespace) within the boundary window, falling back
/// to a paragraph break (`\n\n`). A snapped window steps back by the overlap
/// before the next one starts; an unsnapped window advances by its full
/// width. The final window is never snapped, so the tail of the text is
/// always covered.
#[inline]
pub fn chunk_text(text: &str, config: &ChunkerConfig) -> Vec<Chunk> {
    if text.is_empty() {
        return Vec::new();
    }

    // Character-offset bookkeeping: byte position of each char, plus the
    // total byte length as a sentinel for end-of-text slicing.
    let mut byte_at: Vec<usize> = text.char_indices().map(|(b, _)| b).collect();
    byte_at.push(text.len());
    let chars: Vec<char> = text.chars().collect();
    let len = chars.len();

    let mut chunks = Vec::new();
    let mut start = 0usize;

    while start < len {
        let tentative = (start + config.chunk_size).min(len);

        let snapped = if tentative < len {
            snap_end(&chars, start, tentative, config.boundary_window)
        } else {
            None
        };
        let end = snapped.unwrap_or(tentative);

        let slice = text
            .get(byte_at[start]..byte_at[end])
            .unwrap_or_default()
            .to_string();
        chunks.push(Chunk {
            text: slice,
            index: chunks.len(),
            start,
            end,
        });

        if end == len {
            break;
        }

        // Step back by the overlap only when a boundary was found; an
        // unsnapped window advances by its full width. The previous-start
        // floor keeps the loop terminating for any parameter combination.
        start = if snapped.is_some() {
            end.saturating_sub(config.overlap).max(start + 1)
        } else {
            end
        };
    }

    debug!(
        "Chunked {} chars into {} chunks",
        len,
        chunks.len()
    );

    chunks
}

/// Find the boundary nearest to `tentative` within the last `window` chars of
/// the current span. Sentence boundaries win over paragraph breaks.
fn snap_end(chars: &[char], start: usize, tentative: usize, window: usize) -> Option<usize> {
    let floor = tentative.saturating_sub(window).max(start + 1);

    // Sentence boundary: [.!?] followed by whitespace. The chunk ends just
    // after the punctuation character.
    let mut i = tentative;
    while i > floor {
        i -= 1;
        if matches!(chars[i], '.' | '!' | '?')
            && chars.get(i + 1).is_some_and(|c| c.is_whitespace())
        {
            return Some(i + 1);
        }
    }

    // Paragraph break: a blank line fully inside the window. The chunk keeps
    // both newlines so the next chunk starts on fresh text.
    let mut i = tentative.saturating_sub(1);
    while i > floor {
        i -= 1;
        if chars[i] == '\n' && chars[i + 1] == '\n' {
            return Some(i + 2);
        }
    }

    None
}
