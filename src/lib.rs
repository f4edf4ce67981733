pub mod chunk_scanner;
pub mod config;
pub mod detector;
pub mod discovery;
pub mod error;
pub mod hashing;
pub mod parallel_processing;
pub mod patterns;
pub mod reader;
pub mod report;
pub mod reservoir;
pub mod scorer;
pub mod tagger;
pub mod text;

// Re-export main types for convenient access
pub use config::{ScanConfig, TaggerKind};
pub use detector::{ContrastDetector, Detection, HitBlock};
pub use error::{ConfigError, PatternError, ScanError, TaggerError};
pub use patterns::{Pattern, PatternConfig, RegexPattern};
pub use tagger::{CacheStats, CachedTagger, LexiconTagger, PassthroughTagger, Tagger};
pub use text::{SentenceTable, Span};

// Re-export scanning entry points
pub use chunk_scanner::{scan_document, ChunkWindows, CoverageSet, DocumentScan};
pub use reservoir::{Reservoir, SampleItem};
pub use scorer::{extract_unique_matches, score_text, ContrastMatch, TextScore};

// Re-export corpus orchestration
pub use parallel_processing::{
    process_file, process_files_parallel, CorpusResult, FileStats, FileStatus, ScanContext,
};
