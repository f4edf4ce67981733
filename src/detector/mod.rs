// WHY: one entry point turning a normalized text unit into countable hit blocks
// Stage 1 matches surface text, stage 2 the tagger stream; both land in raw offsets before merging

pub mod merge;

use std::sync::Arc;

use tracing::{debug, warn};

use crate::config::ScanConfig;
use crate::error::ScanError;
use crate::patterns::{PatternConfig, PatternSet};
use crate::tagger::{build_tagger, CacheStats, StreamRealigner, Tagger};
use crate::text::{SentenceTable, Span};

pub use merge::{merge_sentence_blocks, Candidate, HitBlock};

/// Sentence table and merged hit blocks of one text unit
#[derive(Debug, Clone, Default)]
pub struct Detection {
    pub table: SentenceTable,
    pub blocks: Vec<HitBlock>,
}

impl Detection {
    /// Trimmed text of the sentence block a hit covers
    pub fn block_text<'a>(&self, text: &'a str, block: &HitBlock) -> &'a str {
        self.table
            .block_span(block.lo, block.hi)
            .map_or("", |span| span.slice(text).trim())
    }
}

/// Dual-stage contrast detector over a fixed pattern configuration and tagger
///
/// Input text must already be normalized (see [`crate::text::normalize_text`]); all reported
/// offsets refer to that text.
pub struct ContrastDetector {
    patterns: PatternConfig,
    tagger: Arc<dyn Tagger>,
}

impl ContrastDetector {
    pub fn new(patterns: PatternConfig, tagger: Arc<dyn Tagger>) -> Self {
        Self { patterns, tagger }
    }

    /// Built-in library plus the configured tagger
    pub fn from_config(config: &ScanConfig) -> Result<Self, ScanError> {
        config.validate()?;
        let patterns = PatternConfig::builtin()?;
        config.check_overlap_covers(patterns.max_span_hint());
        let tagger = build_tagger(config.tagger, config.tagger_cache_capacity);
        debug!(
            surface = patterns.surface().len(),
            abstracted = patterns.abstracted().len(),
            tagger = tagger.name(),
            "detector ready"
        );
        Ok(Self::new(patterns, tagger))
    }

    pub fn patterns(&self) -> &PatternConfig {
        &self.patterns
    }

    pub fn tagger_name(&self) -> &'static str {
        self.tagger.name()
    }

    pub fn tagger_cache_stats(&self) -> Option<CacheStats> {
        self.tagger.cache_stats()
    }

    /// Segment `text` and return its merged hit blocks
    pub fn detect(&self, text: &str) -> Detection {
        let table = SentenceTable::build(text);
        let candidates = self.detect_candidates(text, &table);
        let blocks = merge_sentence_blocks(candidates);
        Detection { table, blocks }
    }

    /// Unmerged candidates of both stages, in rule order
    pub fn detect_candidates(&self, text: &str, table: &SentenceTable) -> Vec<Candidate> {
        let mut candidates = Vec::new();
        if table.is_empty() {
            return candidates;
        }

        collect_surface(self.patterns.surface(), text, table, &mut candidates);

        if !self.patterns.abstracted().is_empty() {
            self.collect_abstracted(text, table, &mut candidates);
        }

        candidates
    }

    fn collect_abstracted(&self, text: &str, table: &SentenceTable, out: &mut Vec<Candidate>) {
        let tagger = self.tagger.name();
        let tagged = match self
            .tagger
            .tag(text)
            .and_then(|tagged| tagged.check(text.len(), tagger).map(|()| tagged))
        {
            Ok(tagged) => tagged,
            Err(e) => {
                warn!(tagger, error = %e, "tagging failed, skipping stage 2 for this unit");
                return;
            }
        };

        let realigner = StreamRealigner::new(&tagged.pieces);
        for rule in self.patterns.abstracted().iter() {
            for stream_span in rule.pattern.find_spans(&tagged.stream) {
                let Some(raw) = realigner.map(stream_span.start, stream_span.end) else {
                    continue;
                };
                push_candidate(out, text, table, raw, &rule.rule_id);
            }
        }
    }
}

fn collect_surface(set: &PatternSet, text: &str, table: &SentenceTable, out: &mut Vec<Candidate>) {
    for rule in set.iter() {
        for raw in rule.pattern.find_spans(text) {
            push_candidate(out, text, table, raw, &rule.rule_id);
        }
    }
}

/// Map a raw span onto the sentence table; unmappable spans are dropped
fn push_candidate(out: &mut Vec<Candidate>, text: &str, table: &SentenceTable, raw: Span, rule: &str) {
    let Some((lo, hi)) = table.covered_range(raw.start, raw.end) else {
        return;
    };
    out.push(Candidate {
        lo,
        hi,
        raw,
        rule: rule.to_string(),
        match_text: raw.slice(text).trim().to_string(),
    });
}
