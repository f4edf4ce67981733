// WHY: stage 2 consumes a part-of-speech abstraction of the text without owning the tagger
// Any tagger works as long as it reports a piece map from its stream back to raw offsets

pub mod cache;
pub mod lexicon;
pub mod realign;

use std::sync::Arc;

use crate::config::TaggerKind;
use crate::error::TaggerError;
use crate::text::Span;

pub use cache::{CacheStats, CachedTagger};
pub use lexicon::LexiconTagger;
pub use realign::StreamRealigner;

/// One token or whitespace run: where it sits in the stream and where it came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Piece {
    pub stream: Span,
    pub raw: Span,
}

/// Abstracted text plus the piece map aligning it to the raw input
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaggedStream {
    pub stream: String,
    pub pieces: Vec<Piece>,
}

impl TaggedStream {
    /// Append one piece, keeping stream offsets contiguous
    pub fn emit(&mut self, out: &str, raw: Span) {
        let start = self.stream.len();
        self.stream.push_str(out);
        self.pieces.push(Piece {
            stream: Span::new(start, self.stream.len()),
            raw,
        });
    }

    /// Check the invariants the realigner's binary search relies on
    pub fn check(&self, raw_len: usize, tagger: &'static str) -> Result<(), TaggerError> {
        let mut prev_end = 0;
        for piece in &self.pieces {
            if piece.stream.start < prev_end || piece.stream.start > piece.stream.end {
                return Err(TaggerError::InconsistentPieces {
                    tagger,
                    message: format!("stream piece {:?} out of order", piece.stream),
                });
            }
            if piece.stream.end > self.stream.len() || piece.raw.end > raw_len {
                return Err(TaggerError::InconsistentPieces {
                    tagger,
                    message: format!("piece {piece:?} exceeds its text"),
                });
            }
            prev_end = piece.stream.end;
        }
        Ok(())
    }
}

/// Capability interface for the stage-2 tagger
///
/// Implementations must be deterministic for identical input within one run and must emit
/// pieces in stream order without overlaps.
pub trait Tagger: Send + Sync {
    fn name(&self) -> &'static str;

    fn tag(&self, text: &str) -> Result<TaggedStream, TaggerError>;

    /// Memoization counters, for taggers that cache
    fn cache_stats(&self) -> Option<CacheStats> {
        None
    }
}

/// Identity tagger: the stream is the raw text, mapped by a single piece
#[derive(Debug, Clone, Copy, Default)]
pub struct PassthroughTagger;

impl Tagger for PassthroughTagger {
    fn name(&self) -> &'static str {
        "passthrough"
    }

    fn tag(&self, text: &str) -> Result<TaggedStream, TaggerError> {
        let mut tagged = TaggedStream::default();
        if !text.is_empty() {
            tagged.emit(text, Span::new(0, text.len()));
        }
        Ok(tagged)
    }
}

/// Build the configured tagger behind a session-scoped bounded cache
pub fn build_tagger(kind: TaggerKind, cache_capacity: usize) -> Arc<dyn Tagger> {
    match kind {
        TaggerKind::Lexicon => Arc::new(CachedTagger::new(LexiconTagger::with_default_lexicon(), cache_capacity)),
        TaggerKind::Passthrough => Arc::new(PassthroughTagger),
    }
}
