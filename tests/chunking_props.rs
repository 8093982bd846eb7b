//! Property tests for the fixed-window chunker.

use docbase::split_text;
use proptest::prelude::*;

/// Rebuild the original text from windows produced with the given step,
/// dropping each window's overlap with the characters already covered.
fn reconstruct(chunks: &[String], step: usize) -> String {
    let mut out: Vec<char> = Vec::new();
    for (i, chunk) in chunks.iter().enumerate() {
        let start = i * step;
        let chars: Vec<char> = chunk.chars().collect();
        let skip = out.len().saturating_sub(start);
        if skip < chars.len() {
            out.extend(&chars[skip..]);
        }
    }
    out.into_iter().collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    /// Concatenating all chunks with overlap removed reconstructs the
    /// input exactly, for any text and any valid (chunk_size, overlap).
    #[test]
    fn chunks_cover_the_text_exactly(
        text in ".*",
        chunk_size in 1usize..50,
        overlap_frac in 0usize..50,
    ) {
        let overlap = overlap_frac % chunk_size;
        let chunks = split_text(&text, chunk_size, overlap).unwrap();
        let step = chunk_size - overlap;
        prop_assert_eq!(reconstruct(&chunks, step), text);
    }

    /// The chunker always terminates with a finite sequence whose last
    /// window ends exactly at the end of the text.
    #[test]
    fn last_window_reaches_the_end(
        text in ".+",
        chunk_size in 1usize..50,
        overlap_frac in 0usize..50,
    ) {
        let overlap = overlap_frac % chunk_size;
        let chunks = split_text(&text, chunk_size, overlap).unwrap();
        prop_assert!(!chunks.is_empty());
        prop_assert!(text.ends_with(chunks.last().unwrap().as_str()));
        prop_assert!(chunks.iter().all(|c| c.chars().count() <= chunk_size));
    }

    /// Supplying overlap >= chunk_size behaves exactly like an effective
    /// overlap of chunk_size / 2, and still terminates.
    #[test]
    fn excessive_overlap_is_clamped(
        text in ".*",
        chunk_size in 1usize..50,
        excess in 0usize..20,
    ) {
        let clamped = split_text(&text, chunk_size, chunk_size + excess).unwrap();
        let explicit = split_text(&text, chunk_size, chunk_size / 2).unwrap();
        prop_assert_eq!(clamped, explicit);
    }

    /// The chunker is a pure function: identical inputs give identical
    /// output.
    #[test]
    fn deterministic(
        text in ".*",
        chunk_size in 1usize..50,
        overlap in 0usize..50,
    ) {
        let a = split_text(&text, chunk_size, overlap).unwrap();
        let b = split_text(&text, chunk_size, overlap).unwrap();
        prop_assert_eq!(a, b);
    }
}
