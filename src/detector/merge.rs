// WHY: several rules often fire on one contrast; counting must happen per sentence block
// Greedy coalescing over sorted ranges; the first candidate of a block names it

use serde::Serialize;

use crate::text::Span;

/// One rule firing, mapped to the inclusive sentence range it touches
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub lo: usize,
    pub hi: usize,
    pub raw: Span,
    pub rule: String,
    pub match_text: String,
}

/// Merged candidates with overlapping sentence ranges; one countable hit
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HitBlock {
    pub lo: usize,
    pub hi: usize,
    pub raw: Span,
    pub rule: String,
    pub match_text: String,
}

impl From<Candidate> for HitBlock {
    fn from(c: Candidate) -> Self {
        Self {
            lo: c.lo,
            hi: c.hi,
            raw: c.raw,
            rule: c.rule,
            match_text: c.match_text,
        }
    }
}

/// Coalesce candidates into hit blocks
///
/// Candidates are stably sorted by `(lo, hi, raw.start)`; a candidate joins the current block when
/// its `lo` does not exceed the block's `hi`. Joining widens `hi` and `raw.end` only. Adjacent
/// ranges (`lo == hi + 1`) stay separate.
pub fn merge_sentence_blocks(mut candidates: Vec<Candidate>) -> Vec<HitBlock> {
    candidates.sort_by_key(|c| (c.lo, c.hi, c.raw.start));

    let mut blocks: Vec<HitBlock> = Vec::new();
    for candidate in candidates {
        match blocks.last_mut() {
            Some(current) if candidate.lo <= current.hi => {
                current.hi = current.hi.max(candidate.hi);
                current.raw.end = current.raw.end.max(candidate.raw.end);
            }
            _ => blocks.push(candidate.into()),
        }
    }
    blocks
}
