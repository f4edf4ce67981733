//! Short-text scoring without chunking or sampling.
//!
//! Used for single passages (model outputs, CLI `score`), where the whole text is one unit.

use serde::Serialize;

use crate::detector::ContrastDetector;
use crate::text::{char_count, normalize_text};

/// Hits per 1,000 characters, `0.0` for empty input
pub fn rate_per_1000(hits: usize, chars: usize) -> f64 {
    if chars == 0 {
        0.0
    } else {
        hits as f64 * 1000.0 / chars as f64
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TextScore {
    pub hits: usize,
    pub chars: usize,
    pub rate_per_1k: f64,
}

/// One merged hit of a passage
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContrastMatch {
    /// Covered sentence block, trimmed
    pub sentence: String,
    pub rule: String,
    pub match_text: String,
}

/// Every hit block of `text`, in sentence order
pub fn extract_unique_matches(detector: &ContrastDetector, text: &str) -> Vec<ContrastMatch> {
    let normalized = normalize_text(text);
    let detection = detector.detect(&normalized);
    detection
        .blocks
        .iter()
        .map(|block| ContrastMatch {
            sentence: detection.block_text(&normalized, block).to_string(),
            rule: block.rule.clone(),
            match_text: block.match_text.clone(),
        })
        .collect()
}

/// Hit count and rate of one passage
pub fn score_text(detector: &ContrastDetector, text: &str) -> TextScore {
    let normalized = normalize_text(text);
    let hits = detector.detect(&normalized).blocks.len();
    let chars = char_count(&normalized);
    TextScore {
        hits,
        chars,
        rate_per_1k: rate_per_1000(hits, chars),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::patterns::PatternConfig;
    use crate::tagger::LexiconTagger;
    use std::sync::Arc;

    fn detector() -> ContrastDetector {
        ContrastDetector::new(
            PatternConfig::builtin().unwrap(),
            Arc::new(LexiconTagger::with_default_lexicon()),
        )
    }

    #[test]
    fn test_score_counts_blocks_per_thousand_chars() {
        let text = "It wasn\u{2019}t loud. It was deafening.";
        let score = score_text(&detector(), text);
        assert_eq!(score.hits, 1);
        assert_eq!(score.chars, 33);
        assert!((score.rate_per_1k - 1000.0 / 33.0).abs() < 1e-9);
    }

    #[test]
    fn test_empty_text_scores_zero() {
        let score = score_text(&detector(), "");
        assert_eq!(score, TextScore { hits: 0, chars: 0, rate_per_1k: 0.0 });
    }

    #[test]
    fn test_extract_reports_block_and_rule() {
        let matches = extract_unique_matches(&detector(), "Calm day. It wasn't loud. It was deafening.");
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].sentence, "It wasn't loud. It was deafening.");
        assert_eq!(matches[0].rule, "S1_PRON_BE_NOT_SEP_BE");
        assert_eq!(matches[0].match_text, "It wasn't loud. It was");
    }

    #[test]
    fn test_plain_prose_has_no_hits() {
        let matches = extract_unique_matches(&detector(), "The train left at noon. We waved.");
        assert!(matches.is_empty());
    }

    #[test]
    fn test_rate_helper() {
        assert_eq!(rate_per_1000(0, 0), 0.0);
        assert_eq!(rate_per_1000(3, 1500), 2.0);
    }
}
