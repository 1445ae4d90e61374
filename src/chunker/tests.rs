use super::*;

fn cfg(chunk_size: usize, overlap: usize) -> ChunkerConfig {
    ChunkerConfig {
        chunk_size,
        overlap,
        boundary_window: 200,
    }
}

#[test]
fn empty_input_yields_no_chunks() {
    assert!(chunk_text("", &ChunkerConfig::default()).is_empty());
}

#[test]
fn short_input_yields_single_chunk() {
    let text = "A short paragraph well under the chunk size.";
    let chunks = chunk_text(text, &ChunkerConfig::default());

    assert_eq!(chunks.len(), 1);
    assert_eq!(chunks[0].start, 0);
    assert_eq!(chunks[0].end, text.chars().count());
    assert_eq!(chunks[0].text, text);
    assert_eq!(chunks[0].index, 0);
}

#[test]
fn coverage_has_no_gaps() {
    // Long text with boundaries scattered through it.
    let mut text = String::new();
    for i in 0..120 {
        text.push_str(&format!("Sentence number {} has some filler words. ", i));
    }

    let chunks = chunk_text(&text, &ChunkerConfig::default());
    let len = text.chars().count();

    assert!(!chunks.is_empty());
    assert_eq!(chunks[0].start, 0);
    assert_eq!(chunks.last().map(|c| c.end), Some(len));

    for (i, chunk) in chunks.iter().enumerate() {
        assert!(chunk.start < chunk.end, "chunk {} has empty span", i);
        assert_eq!(chunk.index, i);
        if i > 0 {
            // Gap-free: each chunk starts at or before the previous end.
            assert!(
                chunk.start <= chunks[i - 1].end,
                "gap between chunk {} and {}",
                i - 1,
                i
            );
            // Starts are strictly increasing.
            assert!(chunk.start > chunks[i - 1].start);
        }
    }
}

#[test]
fn deterministic_boundaries() {
    let text = "First sentence. Second sentence! Third? Fourth.\n\nNew paragraph here. "
        .repeat(40);
    let config = ChunkerConfig::default();

    let a = chunk_text(&text, &config);
    let b = chunk_text(&text, &config);
    assert_eq!(a, b);
}

#[test]
fn terminates_without_boundaries() {
    // No sentence or paragraph boundary anywhere; snapping never fires.
    let text = "x".repeat(5000);
    let chunks = chunk_text(&text, &ChunkerConfig::default());

    assert_eq!(chunks.len(), 5);
    for (i, chunk) in chunks.iter().enumerate() {
        // Full-width windows, back to back: no overlap without a boundary.
        assert_eq!(chunk.start, i * 1000);
        assert_eq!(chunk.end - chunk.start, 1000);
    }
    assert_eq!(chunks.last().map(|c| c.end), Some(5000));
}

#[test]
fn overlap_applies_only_after_a_snap() {
    // First window has no boundary and advances fully; the second window
    // snaps onto the period and the third steps back by the overlap.
    let text = format!("{}{}. {}", "a".repeat(60), "b".repeat(30), "c".repeat(60));
    let chunks = chunk_text(&text, &cfg(60, 10));

    assert_eq!(chunks[0].start, 0);
    assert_eq!(chunks[0].end, 60);
    assert_eq!(chunks[1].start, 60);
    assert_eq!(chunks[1].end, 91);
    assert!(chunks[1].text.ends_with('.'));
    assert_eq!(chunks[2].start, 81);
}

#[test]
fn snaps_to_sentence_boundary() {
    // One boundary in the middle; the window around 60 chars should snap
    // back to just after the period.
    let text = format!("{}. {}", "a".repeat(40), "b".repeat(40));
    let chunks = chunk_text(&text, &cfg(60, 10));

    assert_eq!(chunks[0].end, 41);
    assert!(chunks[0].text.ends_with('.'));
    // Overlap: next chunk steps back from the snapped end.
    assert_eq!(chunks[1].start, 31);
}

#[test]
fn falls_back_to_paragraph_break() {
    let text = format!("{}\n\n{}", "a".repeat(40), "b".repeat(40));
    let chunks = chunk_text(&text, &cfg(60, 10));

    // Snapped just past the blank line.
    assert_eq!(chunks[0].end, 42);
    assert!(chunks[0].text.ends_with("\n\n"));
}

#[test]
fn sentence_boundary_wins_over_paragraph() {
    let text = format!("{}\n\npadding. {}", "a".repeat(20), "b".repeat(40));
    let chunks = chunk_text(&text, &cfg(50, 5));

    // The period at offset 29 is nearer the tentative end than the blank
    // line, and sentence boundaries are preferred anyway.
    assert!(chunks[0].text.ends_with('.'));
}

#[test]
fn three_sentences_small_window() {
    let text = "Sentence one. Sentence two. Sentence three.";
    let len = text.chars().count();
    let chunks = chunk_text(text, &cfg(10, 3));

    assert!(!chunks.is_empty());
    for (i, chunk) in chunks.iter().enumerate() {
        assert!(chunk.start < chunk.end);
        assert!(chunk.end <= len);
        assert_eq!(chunk.index, i);
    }
    // At least one chunk snapped onto a sentence boundary.
    assert!(chunks.iter().any(|c| c.text.ends_with('.')));
    // The text is covered to the end.
    assert_eq!(chunks.last().map(|c| c.end), Some(len));
}

#[test]
fn multibyte_text_slices_on_char_boundaries() {
    let text = "Überraschung! Schön. ".repeat(100);
    let chunks = chunk_text(&text, &ChunkerConfig::default());

    let len = text.chars().count();
    for chunk in &chunks {
        assert!(!chunk.text.is_empty());
        assert!(chunk.end <= len);
        assert_eq!(chunk.text.chars().count(), chunk.end - chunk.start);
    }
}

#[test]
fn overlap_larger_than_progress_still_terminates() {
    // Misconfigured overlap close to the chunk size must not loop forever.
    let text = "word. ".repeat(200);
    let chunks = chunk_text(&text, &cfg(20, 19));

    assert!(!chunks.is_empty());
    assert_eq!(chunks.last().map(|c| c.end), Some(text.chars().count()));
    for pair in chunks.windows(2) {
        assert!(pair[1].start > pair[0].start);
    }
}
