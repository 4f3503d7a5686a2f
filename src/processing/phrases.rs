//! Candidate phrase splitting and cleanup for the embedding comparator

use unicode_segmentation::UnicodeSegmentation;

/// Characters that separate candidate phrases.
pub const PHRASE_DELIMITERS: &[char] = &['.', '•', '-', '\n', ',', ';', ':'];

/// Chunks must be longer than this...
pub const MIN_CHUNK_LEN: usize = 2;
/// ...and shorter than this.
pub const MAX_CHUNK_LEN: usize = 100;

/// Length in user-perceived characters.
pub fn phrase_len(text: &str) -> usize {
    text.graphemes(true).count()
}

/// Split text on [`PHRASE_DELIMITERS`], trim, and keep chunks whose length is
/// strictly between [`MIN_CHUNK_LEN`] and [`MAX_CHUNK_LEN`].
pub fn split_into_chunks(text: &str) -> Vec<String> {
    text.split(PHRASE_DELIMITERS)
        .map(str::trim)
        .filter(|chunk| {
            let len = phrase_len(chunk);
            len > MIN_CHUNK_LEN && len < MAX_CHUNK_LEN
        })
        .map(str::to_string)
        .collect()
}

/// Strip bullets, dashes, asterisks and whitespace from both ends, then lowercase.
pub fn clean_phrase(phrase: &str) -> String {
    phrase
        .trim_matches(|c: char| c.is_whitespace() || matches!(c, '-' | '•' | '*'))
        .trim()
        .to_lowercase()
}
