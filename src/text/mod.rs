// WHY: Offset-sensitive text primitives shared by the detector, tagger and chunk scanner
// All offsets are UTF-8 byte offsets on char boundaries; user-facing counts are in chars

pub mod normalization;
pub mod segmenter;

use serde::{Deserialize, Serialize};

pub use normalization::{collapse_whitespace, collapse_whitespace_into, normalize_text, normalize_text_into};
pub use segmenter::SentenceTable;

/// Half-open byte range `[start, end)` into an owning text
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        debug_assert!(start <= end, "span start {start} past end {end}");
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    /// Half-open overlap: touching spans do not overlap
    pub fn overlaps(&self, other: &Span) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// Shift both ends by `offset` (chunk-relative → document-absolute)
    pub fn offset_by(&self, offset: usize) -> Span {
        Span::new(self.start + offset, self.end + offset)
    }

    pub fn slice<'a>(&self, text: &'a str) -> &'a str {
        &text[self.start..self.end]
    }
}

impl From<(usize, usize)> for Span {
    fn from((start, end): (usize, usize)) -> Self {
        Span::new(start, end)
    }
}

/// Number of chars in `text`
/// WHY: rates are per 1,000 characters, never per 1,000 bytes
pub fn char_count(text: &str) -> usize {
    text.chars().count()
}

/// Byte offset reached after advancing `n` chars from `from`, clipped to `text.len()`
pub fn advance_chars(text: &str, from: usize, n: usize) -> usize {
    if n == 0 {
        return from;
    }
    text[from..]
        .char_indices()
        .nth(n)
        .map_or(text.len(), |(idx, _)| from + idx)
}
