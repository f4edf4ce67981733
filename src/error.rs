//! Engine error types
//!
//! Only configuration defects are fatal. Tagging and alignment failures are recovered locally by
//! the detector, and document failures are recorded per file by the orchestrator.

use thiserror::Error;

/// Pattern provider misconfiguration, detected once at startup
#[derive(Error, Debug)]
pub enum PatternError {
    /// Expression failed to compile
    #[error("pattern {name}: invalid expression: {message}")]
    InvalidExpression { name: String, message: String },

    /// Rule names must be non-empty
    #[error("stage {stage} contains a pattern with an empty rule name")]
    EmptyName { stage: u8 },

    /// Rule names must be unique within a stage
    #[error("stage {stage} defines rule {name} more than once")]
    DuplicateName { stage: u8, name: String },

    /// Loaded count differs from what the provider promised
    #[error("stage {stage} expected {expected} patterns, got {actual}")]
    CountMismatch { stage: u8, expected: usize, actual: usize },

    /// Nothing to match with
    #[error("pattern configuration is empty")]
    Empty,
}

/// Tagger failure for one unit of text
#[derive(Error, Debug)]
pub enum TaggerError {
    #[error("tagger {tagger} failed: {message}")]
    Failed { tagger: &'static str, message: String },

    /// Piece map is not ordered or does not fit the produced stream
    #[error("tagger {tagger} produced an inconsistent piece map: {message}")]
    InconsistentPieces { tagger: &'static str, message: String },
}

/// Invalid scan configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("chunk_size must be greater than zero")]
    ZeroChunkSize,

    #[error("workers must be greater than zero")]
    ZeroWorkers,

    #[error("tagger_cache_capacity must be greater than zero")]
    ZeroCacheCapacity,

    #[error("failed to read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },
}

/// Top-level engine error
#[derive(Error, Debug)]
pub enum ScanError {
    #[error(transparent)]
    Pattern(#[from] PatternError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}
