//! `word_list` — Module to load and preprocess the fill vocabulary.
//!
//! This module is responsible for turning raw word-list text into the clean
//! vocabulary the solver consumes. The solver core itself performs no
//! normalization — whatever comes out of here is matched letter-for-letter
//! against the grid — so all cleanup happens in this one place.
//!
//! The parsing logic:
//! - Each line is either a bare word, or `word;score` in the common scored
//!   word-list format.
//! - Scored entries with scores below `min_score` are skipped; lines whose
//!   score fails to parse are skipped.
//! - Bare lines carry no score and are kept regardless of `min_score`.
//! - All words are normalized to uppercase (crossword grids are uppercase).
//! - The final list is deduplicated and sorted by length first, then
//!   alphabetically.
//!
//! The public API provides:
//! - `parse_from_str(...)` — works on any in-memory string.
//! - `load_from_path(...)` — convenience method to read from a file path.

use std::io;
use std::path::Path;

/// A processed, ready-to-use vocabulary.
///
/// The `words` vector contains all valid words (filtered, normalized,
/// deduplicated), already sorted by (length, alphabetical). Scores are not
/// stored: the solver only needs the words themselves.
#[derive(Debug, Clone)]
pub struct WordList {
    /// List of uppercase words.
    /// Example: `["ART", "CAT", "ACORN", ...]`
    pub words: Vec<String>,
}

impl WordList {
    /// Parse a raw word list from an in-memory string.
    ///
    /// # Arguments
    /// * `contents`  — The raw text, one word (or `word;score`) per line.
    /// * `min_score` — Scored entries below this are skipped.
    pub fn parse_from_str(contents: &str, min_score: i32) -> WordList {
        let mut words: Vec<String> = contents
            .lines()
            .filter_map(|raw_line| {
                let line = raw_line.trim();

                if line.is_empty() {
                    None
                } else if let Some((word_raw, score_raw)) = line.split_once(';') {
                    // Scored entry. A score that fails to parse invalidates the line.
                    let score: i32 = score_raw.trim().parse().ok()?;

                    if score < min_score {
                        None
                    } else {
                        Some(word_raw.trim().to_uppercase())
                    }
                } else {
                    // Bare word, no score to filter on.
                    Some(line.to_uppercase())
                }
            })
            .collect();

        // Deduplicate: sort alphabetically first, because `dedup()` only
        // removes adjacent duplicates.
        words.sort();
        words.dedup();

        // Final order: length first, then alphabetical.
        words.sort_by(|a, b| match a.len().cmp(&b.len()) {
            std::cmp::Ordering::Equal => a.cmp(b),
            other => other,
        });

        WordList { words }
    }

    /// Read a word list from a file path and parse it.
    ///
    /// # Errors
    ///
    /// Will return an `Error` if unable to read a file at `path`.
    pub fn load_from_path<P: AsRef<Path>>(path: P, min_score: i32) -> io::Result<WordList> {
        let path_ref = path.as_ref();

        let data = std::fs::read_to_string(path_ref).map_err(|e| {
            io::Error::new(
                e.kind(),
                format!("failed to read word list from '{}': {}", path_ref.display(), e),
            )
        })?;

        Ok(Self::parse_from_str(&data, min_score))
    }

    /// Borrow the words as `&str` slices, the shape the solver API expects.
    #[must_use]
    pub fn as_refs(&self) -> Vec<&str> {
        self.words.iter().map(String::as_str).collect()
    }
}
