// WHY: one immutable configuration value flows from the CLI/TOML layer into the engine
// CLI flags override file values; validation runs once before any document is touched

use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, warn};

use crate::error::ConfigError;

/// Which tagger feeds stage 2
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum TaggerKind {
    /// Rule-based tagger replacing known lexical verbs with `VERB`
    #[default]
    Lexicon,
    /// Identity stream; stage-2 patterns see the raw text
    Passthrough,
}

/// Corpus scan configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScanConfig {
    /// Window size in characters
    pub chunk_size: usize,
    /// Characters shared by consecutive windows; must cover the longest real match
    pub overlap: usize,
    /// Reservoir capacity `k`
    pub sample_size: usize,
    /// Global seed; per-document seeds derive from it
    pub sample_seed: u64,
    /// Documents scanned concurrently
    pub workers: usize,
    pub tagger: TaggerKind,
    /// Entries kept by the session-scoped tagger cache
    pub tagger_cache_capacity: usize,
    /// File extension collected by discovery (without the dot)
    pub extension: String,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            chunk_size: 20_000,
            overlap: 500,
            sample_size: 300,
            sample_seed: 0,
            workers: num_cpus::get().max(1),
            tagger: TaggerKind::default(),
            tagger_cache_capacity: 1024,
            extension: "txt".to_string(),
        }
    }
}

impl ScanConfig {
    /// Parse a TOML document; missing keys fall back to defaults
    pub fn from_toml_str(content: &str, origin: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|source| ConfigError::Parse {
            path: origin.to_string(),
            source,
        })
    }

    /// Load a TOML config file
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let origin = path.display().to_string();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: origin.clone(),
            source,
        })?;
        debug!("Loaded scan config from {}", origin);
        Self::from_toml_str(&content, &origin)
    }

    /// Window advance in characters
    pub fn step(&self) -> usize {
        self.chunk_size.saturating_sub(self.overlap).max(1)
    }

    /// Reject configurations the engine cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.chunk_size == 0 {
            return Err(ConfigError::ZeroChunkSize);
        }
        if self.workers == 0 {
            return Err(ConfigError::ZeroWorkers);
        }
        if self.tagger_cache_capacity == 0 {
            return Err(ConfigError::ZeroCacheCapacity);
        }
        if self.overlap >= self.chunk_size {
            warn!(
                chunk_size = self.chunk_size,
                overlap = self.overlap,
                "overlap is not smaller than chunk_size; windows advance one character at a time"
            );
        }
        Ok(())
    }

    /// Warn when the overlap cannot contain the longest declared pattern span
    /// WHY: a match longer than the overlap can be split across windows and missed
    pub fn check_overlap_covers(&self, max_span_hint: Option<usize>) -> bool {
        match max_span_hint {
            Some(max_span) if max_span > self.overlap => {
                warn!(
                    overlap = self.overlap,
                    max_span,
                    "overlap is shorter than the longest declared pattern span; boundary matches may be missed"
                );
                false
            }
            _ => true,
        }
    }
}
