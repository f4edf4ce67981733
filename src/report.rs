//! Result sinks: the human-readable summary on stdout and the JSON run report.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::config::ScanConfig;
use crate::parallel_processing::{CorpusResult, FileStats, FileStatus};
use crate::reservoir::SampleItem;
use crate::scorer::{ContrastMatch, TextScore};
use crate::text::collapse_whitespace;

/// Machine-readable record of one corpus run
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RunReport {
    /// Seconds since the Unix epoch when the report was built
    pub run_start: u64,
    pub total_processing_time_ms: u64,
    pub total_chars: u64,
    pub total_hits: u64,
    pub rate_per_1000: f64,
    pub files_processed: u64,
    pub files_failed: u64,
    pub config: ScanConfig,
    pub file_stats: Vec<FileStats>,
    pub samples: Vec<SampleItem>,
}

impl RunReport {
    pub fn new(result: &CorpusResult, config: &ScanConfig) -> Self {
        let now = SystemTime::now().duration_since(UNIX_EPOCH).map(|d| d.as_secs()).unwrap_or(0);
        Self {
            run_start: now.saturating_sub(result.elapsed_ms / 1000),
            total_processing_time_ms: result.elapsed_ms,
            total_chars: result.total_chars,
            total_hits: result.total_hits,
            rate_per_1000: result.rate_per_1000(),
            files_processed: result.files_processed,
            files_failed: result.files_failed,
            config: config.clone(),
            file_stats: result.file_stats.clone(),
            samples: result.samples.clone(),
        }
    }

    pub fn write_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("Failed to serialize run report")?;
        std::fs::write(path, json).with_context(|| format!("Failed to write stats to {}", path.display()))
    }
}

fn display_name(path: &str) -> &str {
    Path::new(path)
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or(path)
}

/// Per-file lines by descending rate, corpus totals, then the first `sample_size` samples
pub fn write_summary<W: Write>(out: &mut W, result: &CorpusResult, sample_size: usize) -> std::io::Result<()> {
    let mut ranked: Vec<&FileStats> = result
        .file_stats
        .iter()
        .filter(|s| s.status == FileStatus::Success)
        .collect();
    // stable: equal rates keep path order
    ranked.sort_by(|a, b| b.rate_per_1000.total_cmp(&a.rate_per_1000));

    for stats in ranked {
        writeln!(
            out,
            "{}\tchars={}\thits={}\trate_per_1k={:.3}",
            display_name(&stats.path),
            stats.chars,
            stats.hits,
            stats.rate_per_1000
        )?;
    }

    for stats in result.file_stats.iter().filter(|s| s.status == FileStatus::Failed) {
        writeln!(
            out,
            "{}\tFAILED\t{}",
            display_name(&stats.path),
            stats.error.as_deref().unwrap_or("unknown error")
        )?;
    }

    writeln!(out)?;
    writeln!(out, "CORPUS_BASELINE")?;
    writeln!(
        out,
        "rate_per_1k={:.3}\thits={}\tchars={}",
        result.rate_per_1000(),
        result.total_hits,
        result.total_chars
    )?;

    let n = sample_size.min(result.samples.len());
    if n > 0 {
        writeln!(out)?;
        writeln!(out, "SAMPLES n={n}")?;
        for (i, item) in result.samples.iter().take(n).enumerate() {
            writeln!(out, "{:03}. [{}] {}", i + 1, item.rule, collapse_whitespace(&item.text))?;
        }
    }
    Ok(())
}

/// Score line followed by one line per hit
pub fn write_score<W: Write>(out: &mut W, score: &TextScore, matches: &[ContrastMatch]) -> std::io::Result<()> {
    writeln!(
        out,
        "hits={}\tchars={}\trate_per_1k={:.3}",
        score.hits, score.chars, score.rate_per_1k
    )?;
    for (i, m) in matches.iter().enumerate() {
        writeln!(out, "{:03}. [{}] {}", i + 1, m.rule, collapse_whitespace(&m.sentence))?;
    }
    Ok(())
}
