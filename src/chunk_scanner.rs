// WHY: bound regex and tagger input on book-sized documents while counting each hit once
// Windows overlap so boundary matches survive; the coverage set removes the duplicates

use rand::Rng;
use tracing::debug;

use crate::config::ScanConfig;
use crate::detector::ContrastDetector;
use crate::reservoir::{draw_key, Reservoir, SampleItem};
use crate::text::{advance_chars, char_count, normalize_text, Span};

/// Overlapping windows of `chunk_size` chars, advancing `step` chars
///
/// The last window is clipped to the end of the text, and no window starts after one that
/// reached the end.
#[derive(Debug, Clone)]
pub struct ChunkWindows<'a> {
    text: &'a str,
    chunk_size: usize,
    step: usize,
    next_start: Option<usize>,
}

impl<'a> ChunkWindows<'a> {
    pub fn new(text: &'a str, chunk_size: usize, step: usize) -> Self {
        Self {
            text,
            chunk_size: chunk_size.max(1),
            step: step.max(1),
            next_start: (!text.is_empty()).then_some(0),
        }
    }
}

impl Iterator for ChunkWindows<'_> {
    type Item = Span;

    fn next(&mut self) -> Option<Span> {
        let start = self.next_start?;
        let end = advance_chars(self.text, start, self.chunk_size);
        self.next_start = if end >= self.text.len() {
            None
        } else {
            Some(advance_chars(self.text, start, self.step))
        };
        Some(Span::new(start, end))
    }
}

/// Sorted, pairwise disjoint spans already credited as hits in one document
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CoverageSet {
    spans: Vec<Span>,
}

impl CoverageSet {
    /// Half-open overlap with any covered span
    pub fn overlaps(&self, span: Span) -> bool {
        let idx = self.spans.partition_point(|s| s.end <= span.start);
        self.spans.get(idx).is_some_and(|s| s.start < span.end)
    }

    /// Insert, coalescing with overlapping or touching spans
    pub fn insert(&mut self, span: Span) {
        let first = self.spans.partition_point(|s| s.end < span.start);
        let last = self.spans.partition_point(|s| s.start <= span.end);

        let merged = self.spans[first..last]
            .iter()
            .fold(span, |acc, s| Span::new(acc.start.min(s.start), acc.end.max(s.end)));
        self.spans.splice(first..last, std::iter::once(merged));
    }

    pub fn len(&self) -> usize {
        self.spans.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }

    pub fn spans(&self) -> &[Span] {
        &self.spans
    }
}

/// Per-document totals
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DocumentScan {
    /// Characters after normalization
    pub chars: usize,
    /// Deduplicated hits
    pub hits: usize,
    pub windows: usize,
}

/// Scan one document window by window, offering counted hits to `reservoir`
///
/// `document` labels sample items. A key is drawn from `rng` for every counted hit, so the
/// sequence of draws depends only on the document and the seed.
pub fn scan_document<R: Rng + ?Sized>(
    raw: &str,
    document: &str,
    detector: &ContrastDetector,
    config: &ScanConfig,
    rng: &mut R,
    reservoir: &mut Reservoir,
) -> DocumentScan {
    let text = normalize_text(raw);
    let mut scan = DocumentScan {
        chars: char_count(&text),
        ..Default::default()
    };
    let mut coverage = CoverageSet::default();

    for window in ChunkWindows::new(&text, config.chunk_size, config.step()) {
        scan.windows += 1;
        let chunk = window.slice(&text);
        let detection = detector.detect(chunk);

        for block in &detection.blocks {
            let absolute = block.raw.offset_by(window.start);
            if coverage.overlaps(absolute) {
                continue;
            }
            coverage.insert(absolute);
            scan.hits += 1;

            let key = draw_key(rng);
            reservoir.offer(SampleItem {
                key,
                rule: block.rule.clone(),
                text: detection.block_text(chunk, block).to_string(),
                document: document.to_string(),
            });
        }
    }

    debug!(document, chars = scan.chars, hits = scan.hits, windows = scan.windows, "scanned document");
    scan
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::patterns::{Pattern, PatternConfig, RegexPattern};
    use crate::tagger::PassthroughTagger;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::sync::Arc;

    fn windows(text: &str, chunk_size: usize, step: usize) -> Vec<(usize, usize)> {
        ChunkWindows::new(text, chunk_size, step).map(|w| (w.start, w.end)).collect()
    }

    fn not_loud_detector() -> ContrastDetector {
        let pattern: Box<dyn Pattern> = Box::new(RegexPattern::new("NOT_LOUD", r"not loud").unwrap());
        let patterns = PatternConfig::new(vec![("NOT_LOUD".to_string(), pattern)], Vec::new()).unwrap();
        ContrastDetector::new(patterns, Arc::new(PassthroughTagger))
    }

    fn config(chunk_size: usize, overlap: usize) -> ScanConfig {
        ScanConfig { chunk_size, overlap, workers: 1, ..Default::default() }
    }

    #[test]
    fn test_windows_stop_at_end() {
        assert_eq!(windows("abcdefghij", 4, 3), vec![(0, 4), (3, 7), (6, 10)]);
        assert_eq!(windows("abcdefghij", 4, 4), vec![(0, 4), (4, 8), (8, 10)]);
        assert_eq!(windows("abc", 10, 5), vec![(0, 3)]);
        assert!(windows("", 10, 5).is_empty());
    }

    #[test]
    fn test_windows_count_chars_not_bytes() {
        let text = "ééééé";
        assert_eq!(windows(text, 2, 2), vec![(0, 4), (4, 8), (8, 10)]);
    }

    #[test]
    fn test_coverage_overlap_is_half_open() {
        let mut coverage = CoverageSet::default();
        coverage.insert(Span::new(10, 20));
        assert!(coverage.overlaps(Span::new(15, 25)));
        assert!(coverage.overlaps(Span::new(0, 11)));
        assert!(!coverage.overlaps(Span::new(20, 30)));
        assert!(!coverage.overlaps(Span::new(0, 10)));
    }

    #[test]
    fn test_coverage_insert_coalesces_touching() {
        let mut coverage = CoverageSet::default();
        coverage.insert(Span::new(30, 40));
        coverage.insert(Span::new(10, 20));
        coverage.insert(Span::new(20, 25));
        assert_eq!(coverage.spans(), &[Span::new(10, 25), Span::new(30, 40)]);
        coverage.insert(Span::new(22, 35));
        assert_eq!(coverage.spans(), &[Span::new(10, 40)]);
    }

    #[test]
    fn test_straddling_hit_counted_once() {
        let text = "abcdefghijkl not loud mnopqrstuvwxyz";
        let detector = not_loud_detector();
        let mut rng = StdRng::seed_from_u64(7);
        let mut reservoir = Reservoir::new(10);

        let scan = scan_document(text, "doc.txt", &detector, &config(30, 20), &mut rng, &mut reservoir);

        assert_eq!(scan.windows, 2);
        assert_eq!(scan.hits, 1);
        assert_eq!(scan.chars, 36);
        assert_eq!(reservoir.len(), 1);
    }

    #[test]
    fn test_empty_document_is_zero() {
        let detector = not_loud_detector();
        let mut rng = StdRng::seed_from_u64(7);
        let mut reservoir = Reservoir::new(10);
        let scan = scan_document("", "empty.txt", &detector, &config(30, 20), &mut rng, &mut reservoir);
        assert_eq!(scan, DocumentScan::default());
        assert!(reservoir.is_empty());
    }

    #[test]
    fn test_same_seed_same_samples() {
        let text = "It was not loud. Then not loud again. Still not loud.";
        let detector = not_loud_detector();
        let run = |seed: u64| {
            let mut rng = StdRng::seed_from_u64(seed);
            let mut reservoir = Reservoir::new(2);
            let scan = scan_document(text, "doc.txt", &detector, &config(20, 8), &mut rng, &mut reservoir);
            let keys: Vec<f64> = reservoir.into_sorted_vec().iter().map(|i| i.key).collect();
            (scan, keys)
        };
        let (scan, keys) = run(3);
        assert_eq!(scan.hits, 3);
        assert_eq!(keys.len(), 2);
        assert_eq!(run(3), (scan, keys));
    }
}
