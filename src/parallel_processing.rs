// WHY: corpus scans fan out per document; only the consuming loop touches corpus totals
// Each task returns an immutable outcome, so results never depend on completion order

use futures::stream::{self, StreamExt};
use indicatif::{ProgressBar, ProgressStyle};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use crate::chunk_scanner::{scan_document, DocumentScan};
use crate::config::ScanConfig;
use crate::detector::ContrastDetector;
use crate::hashing::document_seed;
use crate::reader::{DocumentReader, ReaderConfig};
use crate::reservoir::{Reservoir, SampleItem};
use crate::scorer::rate_per_1000;

/// Processing status of one document
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FileStatus {
    Success,
    Failed,
}

/// Per-document statistics
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct FileStats {
    pub path: String,
    /// Characters after normalization
    pub chars: u64,
    /// Deduplicated hits
    pub hits: u64,
    pub rate_per_1000: f64,
    pub processing_time_ms: u64,
    pub status: FileStatus,
    /// Error message if processing failed
    pub error: Option<String>,
}

impl FileStats {
    fn success(path: String, scan: DocumentScan, elapsed: Duration) -> Self {
        Self {
            path,
            chars: scan.chars as u64,
            hits: scan.hits as u64,
            rate_per_1000: rate_per_1000(scan.hits, scan.chars),
            processing_time_ms: elapsed.as_millis() as u64,
            status: FileStatus::Success,
            error: None,
        }
    }

    fn failed(path: String, error: String, elapsed: Duration) -> Self {
        Self {
            path,
            chars: 0,
            hits: 0,
            rate_per_1000: 0.0,
            processing_time_ms: elapsed.as_millis() as u64,
            status: FileStatus::Failed,
            error: Some(error),
        }
    }
}

/// What one document task hands back to the aggregator
#[derive(Debug)]
pub struct FileOutcome {
    pub stats: FileStats,
    pub samples: Reservoir,
}

/// Shared, read-only inputs of every document task
#[derive(Clone)]
pub struct ScanContext {
    pub detector: Arc<ContrastDetector>,
    pub config: Arc<ScanConfig>,
    pub reader: Arc<DocumentReader>,
}

impl ScanContext {
    pub fn new(detector: Arc<ContrastDetector>, config: ScanConfig) -> Self {
        Self {
            detector,
            config: Arc::new(config),
            reader: Arc::new(DocumentReader::new(ReaderConfig::default())),
        }
    }
}

/// Read and scan one document; failures become a `failed` outcome, never an error
pub async fn process_file(path: PathBuf, ctx: ScanContext) -> FileOutcome {
    let start = Instant::now();
    let document = path.display().to_string();
    let empty = || Reservoir::new(ctx.config.sample_size);

    let text = match ctx.reader.read_document(&path).await {
        Ok((_, stats)) if stats.read_error.is_some() => {
            let error = stats.read_error.unwrap_or_default();
            return FileOutcome { stats: FileStats::failed(document, error, start.elapsed()), samples: empty() };
        }
        Ok((text, _)) => text,
        Err(e) => {
            return FileOutcome {
                stats: FileStats::failed(document, e.to_string(), start.elapsed()),
                samples: empty(),
            };
        }
    };

    // WHY: regex and tagging are CPU-bound; keep them off the async workers
    let task = {
        let ctx = ctx.clone();
        let document = document.clone();
        tokio::task::spawn_blocking(move || {
            let mut rng = StdRng::seed_from_u64(document_seed(ctx.config.sample_seed, &document));
            let mut reservoir = Reservoir::new(ctx.config.sample_size);
            let scan = scan_document(&text, &document, &ctx.detector, &ctx.config, &mut rng, &mut reservoir);
            (scan, reservoir)
        })
    };

    match task.await {
        Ok((scan, samples)) => {
            debug!("Processed {}: {} chars, {} hits", document, scan.chars, scan.hits);
            FileOutcome {
                stats: FileStats::success(document, scan, start.elapsed()),
                samples,
            }
        }
        Err(e) => {
            let error = format!("scan task failed: {e}");
            warn!("{}: {}", document, error);
            FileOutcome {
                stats: FileStats::failed(document, error, start.elapsed()),
                samples: empty(),
            }
        }
    }
}

/// Corpus totals, per-file statistics sorted by path, and the merged sample
#[derive(Debug, Clone)]
pub struct CorpusResult {
    pub file_stats: Vec<FileStats>,
    pub samples: Vec<SampleItem>,
    pub total_chars: u64,
    pub total_hits: u64,
    pub files_processed: u64,
    pub files_failed: u64,
    pub elapsed_ms: u64,
}

impl CorpusResult {
    /// Summed hits per 1,000 summed characters
    pub fn rate_per_1000(&self) -> f64 {
        rate_per_1000(self.total_hits as usize, self.total_chars as usize)
    }
}

/// Single-writer fold over document outcomes
#[derive(Debug)]
pub struct CorpusAccumulator {
    file_stats: Vec<FileStats>,
    reservoir: Reservoir,
    total_chars: u64,
    total_hits: u64,
    files_failed: u64,
}

impl CorpusAccumulator {
    pub fn new(sample_size: usize) -> Self {
        Self {
            file_stats: Vec::new(),
            reservoir: Reservoir::new(sample_size),
            total_chars: 0,
            total_hits: 0,
            files_failed: 0,
        }
    }

    pub fn absorb(&mut self, outcome: FileOutcome) {
        let FileOutcome { stats, samples } = outcome;
        match stats.status {
            FileStatus::Success => {
                self.total_chars += stats.chars;
                self.total_hits += stats.hits;
            }
            FileStatus::Failed => self.files_failed += 1,
        }
        self.reservoir.merge(samples);
        self.file_stats.push(stats);
    }

    pub fn finish(mut self, elapsed: Duration) -> CorpusResult {
        self.file_stats.sort_by(|a, b| a.path.cmp(&b.path));
        let files_processed = self.file_stats.len() as u64 - self.files_failed;
        CorpusResult {
            file_stats: self.file_stats,
            samples: self.reservoir.into_sorted_vec(),
            total_chars: self.total_chars,
            total_hits: self.total_hits,
            files_processed,
            files_failed: self.files_failed,
            elapsed_ms: elapsed.as_millis() as u64,
        }
    }
}

fn progress_bar(total: usize, show: bool) -> Option<ProgressBar> {
    if !show {
        return None;
    }
    let pb = ProgressBar::new(total as u64);
    if let Ok(style) = ProgressStyle::with_template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} files {msg}") {
        pb.set_style(style.progress_chars("##-"));
    }
    pb.enable_steady_tick(Duration::from_millis(100));
    Some(pb)
}

fn file_name(path: &str) -> &str {
    Path::new(path)
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or(path)
}

/// Scan every path with at most `config.workers` documents in flight
pub async fn process_files_parallel(paths: &[PathBuf], ctx: ScanContext, show_progress: bool) -> CorpusResult {
    let start = Instant::now();
    let workers = ctx.config.workers.max(1);
    info!("Scanning {} documents with {} workers", paths.len(), workers);

    let progress = progress_bar(paths.len(), show_progress);
    let mut accumulator = CorpusAccumulator::new(ctx.config.sample_size);

    let mut outcomes = stream::iter(paths.iter().cloned())
        .map(|path| process_file(path, ctx.clone()))
        .buffer_unordered(workers);

    while let Some(outcome) = outcomes.next().await {
        if outcome.stats.status == FileStatus::Failed {
            warn!(
                "Failed to process {}: {}",
                outcome.stats.path,
                outcome.stats.error.as_deref().unwrap_or("unknown error")
            );
        }
        if let Some(pb) = &progress {
            pb.set_message(format!("Processed: {}", file_name(&outcome.stats.path)));
            pb.inc(1);
        }
        accumulator.absorb(outcome);
    }

    if let Some(pb) = &progress {
        pb.finish_with_message("Complete");
    }

    if let Some(cache) = ctx.detector.tagger_cache_stats() {
        debug!(
            hits = cache.hits,
            misses = cache.misses,
            entries = cache.entries,
            "tagger cache at end of scan"
        );
    }

    let result = accumulator.finish(start.elapsed());
    info!(
        "Corpus scan complete: {} processed, {} failed, {} hits in {} chars",
        result.files_processed, result.files_failed, result.total_hits, result.total_chars
    );
    result
}
