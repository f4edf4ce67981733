// Integration test utilities and common code
// WHY: Centralized utilities avoid duplication across integration tests

#![allow(dead_code)]

pub mod fixtures;

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

use contrast_scan::{ContrastDetector, ScanConfig, ScanContext};

/// Test fixture helper for creating a temporary corpus directory
pub struct TestFixture {
    pub temp_dir: TempDir,
    pub root_path: PathBuf,
}

impl TestFixture {
    /// Create a new test fixture with temporary directory
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let root_path = temp_dir.path().to_path_buf();

        Self { temp_dir, root_path }
    }

    /// Create a document with given content, creating parent directories as needed
    pub fn create_document<P: AsRef<Path>>(&self, relative_path: P, content: &str) -> PathBuf {
        let file_path = self.root_path.join(relative_path);

        if let Some(parent) = file_path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent directories");
        }

        fs::write(&file_path, content).expect("Failed to write test file");
        file_path
    }

    /// Create a document from raw bytes (for invalid UTF-8 cases)
    pub fn create_raw_document<P: AsRef<Path>>(&self, relative_path: P, bytes: &[u8]) -> PathBuf {
        let file_path = self.root_path.join(relative_path);
        fs::write(&file_path, bytes).expect("Failed to write test file");
        file_path
    }

    /// Path inside the fixture that is never created
    pub fn missing_path(&self, name: &str) -> PathBuf {
        self.root_path.join(name)
    }

    /// Output path for `--stats-out`
    pub fn stats_path(&self) -> PathBuf {
        self.root_path.join("run_stats.json")
    }
}

/// Small-window configuration so short fixtures still span several windows
pub fn small_window_config(sample_size: usize, sample_seed: u64) -> ScanConfig {
    ScanConfig {
        chunk_size: 120,
        overlap: 60,
        sample_size,
        sample_seed,
        workers: 3,
        ..Default::default()
    }
}

/// Scan context over the builtin detector for `config`
pub fn scan_context(config: ScanConfig) -> ScanContext {
    let detector = ContrastDetector::from_config(&config).expect("builtin detector should build");
    ScanContext::new(Arc::new(detector), config)
}

/// Compare two strings line by line, providing detailed diff on mismatch
pub fn assert_lines_eq(actual: &str, expected: &str, context: &str) {
    let actual_lines: Vec<&str> = actual.lines().collect();
    let expected_lines: Vec<&str> = expected.lines().collect();

    if actual_lines.len() != expected_lines.len() {
        panic!(
            "{}: Line count mismatch. Expected {} lines, got {} lines\n{}",
            context,
            expected_lines.len(),
            actual_lines.len(),
            actual
        );
    }

    for (i, (actual_line, expected_line)) in actual_lines.iter().zip(expected_lines.iter()).enumerate() {
        if actual_line != expected_line {
            panic!(
                "{}: Line {} mismatch\nExpected: {}\nActual:   {}",
                context,
                i + 1,
                expected_line,
                actual_line
            );
        }
    }
}
