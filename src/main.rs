use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::io::AsyncReadExt;
use tracing::{info, warn};

use contrast_scan::config::{ScanConfig, TaggerKind};
use contrast_scan::detector::ContrastDetector;
use contrast_scan::discovery;
use contrast_scan::parallel_processing::{process_files_parallel, ScanContext};
use contrast_scan::reader::{decode_dropping_invalid, read_document_async};
use contrast_scan::report::{write_score, write_summary, RunReport};
use contrast_scan::scorer::{extract_unique_matches, score_text};

#[derive(Parser, Debug)]
#[command(name = "contrast-scan")]
#[command(about = "Measures \"not X, but Y\" contrastive phrasing per 1,000 characters")]
#[command(version)]
struct Cli {
    /// TOML file with scan settings; flags override its values
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Scan a corpus directory and report the baseline rate
    Baseline {
        /// Root directory searched recursively for documents
        root_dir: PathBuf,

        #[command(flatten)]
        scan: ScanArgs,

        /// Suppress console progress bars
        #[arg(long)]
        no_progress: bool,

        /// Stats output file path
        #[arg(long)]
        stats_out: Option<PathBuf>,
    },
    /// Score one passage from a file or stdin and list its hits
    Score {
        /// Passage file; reads stdin when omitted
        file: Option<PathBuf>,

        /// Tagger feeding the second matching stage
        #[arg(long, value_enum)]
        tagger: Option<TaggerKind>,
    },
}

/// Flags overriding `ScanConfig` fields
#[derive(Args, Debug, Default)]
struct ScanArgs {
    /// Window size in characters
    #[arg(long)]
    chunk_size: Option<usize>,

    /// Characters shared by consecutive windows
    #[arg(long)]
    overlap: Option<usize>,

    /// Number of random hits to print across all files
    #[arg(long)]
    sample_size: Option<usize>,

    /// Seed for hit sampling
    #[arg(long)]
    sample_seed: Option<u64>,

    /// Documents scanned concurrently
    #[arg(long)]
    workers: Option<usize>,

    /// Tagger feeding the second matching stage
    #[arg(long, value_enum)]
    tagger: Option<TaggerKind>,

    /// Document extension to collect (without the dot)
    #[arg(long)]
    extension: Option<String>,
}

impl ScanArgs {
    fn apply(&self, config: &mut ScanConfig) {
        if let Some(v) = self.chunk_size {
            config.chunk_size = v;
        }
        if let Some(v) = self.overlap {
            config.overlap = v;
        }
        if let Some(v) = self.sample_size {
            config.sample_size = v;
        }
        if let Some(v) = self.sample_seed {
            config.sample_seed = v;
        }
        if let Some(v) = self.workers {
            config.workers = v;
        }
        if let Some(v) = self.tagger {
            config.tagger = v;
        }
        if let Some(v) = &self.extension {
            config.extension = v.clone();
        }
    }
}

fn load_config(path: Option<&Path>, overrides: &ScanArgs) -> Result<ScanConfig> {
    let mut config = match path {
        Some(path) => ScanConfig::from_toml_file(path)?,
        None => ScanConfig::default(),
    };
    overrides.apply(&mut config);
    config.validate()?;
    Ok(config)
}

async fn run_baseline(
    root_dir: PathBuf,
    config: ScanConfig,
    show_progress: bool,
    stats_out: Option<PathBuf>,
) -> Result<()> {
    // WHY: validate root directory exists early to fail fast with clear error
    if !root_dir.exists() {
        anyhow::bail!("Root directory does not exist: {}", root_dir.display());
    }
    if !root_dir.is_dir() {
        anyhow::bail!("Root path is not a directory: {}", root_dir.display());
    }

    let detector = Arc::new(ContrastDetector::from_config(&config)?);

    info!("Starting document discovery in: {}", root_dir.display());
    let paths = discovery::find_documents(&root_dir, &config.extension).await?;
    if paths.is_empty() {
        warn!("No *.{} documents found under {}", config.extension, root_dir.display());
    }

    let ctx = ScanContext::new(detector, config.clone());
    let result = process_files_parallel(&paths, ctx, show_progress).await;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    write_summary(&mut out, &result, config.sample_size)?;
    out.flush()?;

    if let Some(path) = stats_out {
        RunReport::new(&result, &config).write_json(&path)?;
        info!("Wrote run stats to {}", path.display());
    }
    Ok(())
}

async fn run_score(file: Option<PathBuf>, config: ScanConfig) -> Result<()> {
    let text = match file {
        Some(path) => read_document_async(&path).await?,
        None => {
            let mut bytes = Vec::new();
            tokio::io::stdin()
                .read_to_end(&mut bytes)
                .await
                .context("Failed to read passage from stdin")?;
            decode_dropping_invalid(&bytes).0
        }
    };

    let detector = ContrastDetector::from_config(&config)?;
    let score = score_text(&detector, &text);
    let matches = extract_unique_matches(&detector, &text);

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    write_score(&mut out, &score, &matches)?;
    out.flush()?;
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // WHY: structured JSON logs go to stderr so stdout carries only results
    tracing_subscriber::fmt()
        .with_target(false)
        .with_writer(std::io::stderr)
        .json()
        .init();

    let cli = Cli::parse();
    info!(?cli, "Parsed CLI arguments");

    match cli.command {
        Command::Baseline { root_dir, scan, no_progress, stats_out } => {
            let config = load_config(cli.config.as_deref(), &scan)?;
            run_baseline(root_dir, config, !no_progress, stats_out).await
        }
        Command::Score { file, tagger } => {
            let overrides = ScanArgs { tagger, ..Default::default() };
            let config = load_config(cli.config.as_deref(), &overrides)?;
            run_score(file, config).await
        }
    }
}
