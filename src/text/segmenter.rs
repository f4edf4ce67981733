// WHY: coverage accounting needs a gapless sentence table, not linguistically perfect sentences
// Every terminator closes a sentence; residue after the last one is a trailing fragment

use super::Span;

/// Sentence terminators; each one closes exactly one sentence
const TERMINATORS: [char; 3] = ['.', '!', '?'];

/// Ordered, contiguous, gapless sentence spans over `[0, text.len())`
///
/// Built once per text (or per chunk) and only read afterwards. Starts and ends are kept in
/// separate sorted columns so both coverage lookups are a single binary search.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SentenceTable {
    starts: Vec<usize>,
    ends: Vec<usize>,
}

impl SentenceTable {
    /// Segment normalized text into sentence spans
    pub fn build(text: &str) -> Self {
        let mut table = SentenceTable::default();
        let mut start = 0;

        for (idx, ch) in text.char_indices() {
            if TERMINATORS.contains(&ch) {
                let end = idx + ch.len_utf8();
                table.push(start, end);
                start = end;
            }
        }

        if start < text.len() {
            table.push(start, text.len());
        }

        table
    }

    fn push(&mut self, start: usize, end: usize) {
        self.starts.push(start);
        self.ends.push(end);
    }

    pub fn len(&self) -> usize {
        self.starts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.starts.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<Span> {
        Some(Span::new(*self.starts.get(index)?, *self.ends.get(index)?))
    }

    pub fn iter(&self) -> impl Iterator<Item = Span> + '_ {
        self.starts
            .iter()
            .zip(self.ends.iter())
            .map(|(&start, &end)| Span::new(start, end))
    }

    /// Map a raw span to the inclusive sentence-index range it touches
    ///
    /// `lo` is the first sentence whose end exceeds `start`, `hi` the last sentence whose start
    /// precedes `end`. Returns `None` when the span touches no sentence; callers drop the
    /// candidate instead of failing.
    pub fn covered_range(&self, start: usize, end: usize) -> Option<(usize, usize)> {
        if self.is_empty() || start >= end {
            return None;
        }

        let lo = self.ends.partition_point(|&e| e <= start);
        let hi = self.starts.partition_point(|&s| s < end).checked_sub(1)?;

        if lo >= self.len() || lo > hi {
            return None;
        }
        Some((lo, hi))
    }

    /// Span of the merged sentence block `[lo, hi]`
    pub fn block_span(&self, lo: usize, hi: usize) -> Option<Span> {
        if lo > hi {
            return None;
        }
        Some(Span::new(*self.starts.get(lo)?, *self.ends.get(hi)?))
    }
}
