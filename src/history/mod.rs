//! Transcription history and word accounting.
//!
//! Every successful transcription is appended to a durable local store
//! together with its word count, and a running word total is kept in step
//! with the entries.

pub mod storage;

pub use storage::{HistoryEntry, HistoryStore};

/// Counts whitespace-delimited words in a text.
///
/// Tokens are maximal runs of non-whitespace; empty tokens are discarded.
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_word_count_empty() {
        assert_eq!(word_count(""), 0);
        assert_eq!(word_count("   "), 0);
        assert_eq!(word_count("\t\n"), 0);
    }

    #[test]
    fn test_word_count_collapses_whitespace() {
        assert_eq!(word_count("  a   b "), 2);
        assert_eq!(word_count("one\ttwo\nthree"), 3);
    }

    #[test]
    fn test_word_count_single() {
        assert_eq!(word_count("hello"), 1);
    }
}
