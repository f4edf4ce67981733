// WHY: stage-2 matches live in the abstracted stream; hits must be reported in raw offsets
// Alignment uses only the piece map, so class tags may be longer or shorter than their words

use super::Piece;
use crate::text::Span;

/// Translates stream spans back to raw spans through an ordered piece map
#[derive(Debug, Clone, Copy)]
pub struct StreamRealigner<'a> {
    pieces: &'a [Piece],
}

impl<'a> StreamRealigner<'a> {
    /// Pieces must be in stream order without overlaps (see `TaggedStream::check`)
    pub fn new(pieces: &'a [Piece]) -> Self {
        Self { pieces }
    }

    /// Raw span covered by the stream span `[stream_start, stream_end)`
    ///
    /// Covers every piece from the first whose stream end exceeds `stream_start` to the last
    /// whose stream start precedes `stream_end`. Returns `None` when that piece range is empty.
    pub fn map(&self, stream_start: usize, stream_end: usize) -> Option<Span> {
        // WHY: ordered, non-overlapping pieces make both stream columns sorted
        let first = self.pieces.partition_point(|p| p.stream.end <= stream_start);
        let last = self
            .pieces
            .partition_point(|p| p.stream.start < stream_end)
            .checked_sub(1)?;

        if first >= self.pieces.len() || last < first {
            return None;
        }

        let covered = &self.pieces[first..=last];
        let raw_start = covered.iter().map(|p| p.raw.start).min()?;
        let raw_end = covered.iter().map(|p| p.raw.end).max()?;
        Some(Span::new(raw_start, raw_end))
    }
}
