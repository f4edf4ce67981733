use anyhow::Result;
use std::path::Path;
use tokio::fs::File;
use tokio::io::{AsyncReadExt, BufReader};
use tracing::{debug, warn};

/// Configuration for document reading behavior
#[derive(Debug, Clone)]
pub struct ReaderConfig {
    /// Whether to fail fast on first error or report it in the stats
    pub fail_fast: bool,
    /// Buffer size for async reading (default: 64KB)
    pub buffer_size: usize,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            fail_fast: false,
            buffer_size: 64 * 1024,
        }
    }
}

/// Statistics for one document read
#[derive(Debug, Clone, Default)]
pub struct ReadStats {
    pub file_path: String,
    pub bytes_read: u64,
    /// Bytes discarded as invalid UTF-8
    pub bytes_dropped: u64,
    pub duration_ms: u64,
    pub read_error: Option<String>,
}

/// Decode UTF-8, dropping invalid byte sequences instead of replacing them
///
/// Returns the text and the number of bytes dropped.
pub fn decode_dropping_invalid(mut bytes: &[u8]) -> (String, usize) {
    let mut text = String::with_capacity(bytes.len());
    let mut dropped = 0;

    loop {
        match std::str::from_utf8(bytes) {
            Ok(valid) => {
                text.push_str(valid);
                return (text, dropped);
            }
            Err(e) => {
                let (valid, rest) = bytes.split_at(e.valid_up_to());
                // prefix is valid, so this borrows without replacement
                text.push_str(&String::from_utf8_lossy(valid));
                // WHY: `None` means the input ends mid-sequence
                let skip = e.error_len().unwrap_or(rest.len());
                dropped += skip;
                bytes = &rest[skip..];
            }
        }
    }
}

/// Async whole-document reader with lossy decoding
pub struct DocumentReader {
    config: ReaderConfig,
}

impl DocumentReader {
    pub fn new(config: ReaderConfig) -> Self {
        Self { config }
    }

    fn failure(&self, path: &Path, start: std::time::Instant, error_msg: String) -> Result<(String, ReadStats)> {
        warn!("{}", error_msg);
        if self.config.fail_fast {
            return Err(anyhow::anyhow!(error_msg));
        }
        let stats = ReadStats {
            file_path: path.display().to_string(),
            duration_ms: start.elapsed().as_millis() as u64,
            read_error: Some(error_msg),
            ..Default::default()
        };
        Ok((String::new(), stats))
    }

    /// Read a whole document; errors land in `ReadStats::read_error` unless `fail_fast` is set
    pub async fn read_document<P: AsRef<Path>>(&self, file_path: P) -> Result<(String, ReadStats)> {
        let path = file_path.as_ref();
        let start_time = std::time::Instant::now();

        debug!("Starting async read of document: {}", path.display());

        let file = match File::open(path).await {
            Ok(file) => file,
            Err(e) => {
                let error_msg = format!("Failed to open file {}: {}", path.display(), e);
                return self.failure(path, start_time, error_msg);
            }
        };

        // WHY: BufReader with custom buffer size reduces syscalls on large documents
        let mut reader = BufReader::with_capacity(self.config.buffer_size, file);
        let mut bytes = Vec::new();
        if let Err(e) = reader.read_to_end(&mut bytes).await {
            let error_msg = format!("Failed to read file {}: {}", path.display(), e);
            return self.failure(path, start_time, error_msg);
        }

        let (text, dropped) = decode_dropping_invalid(&bytes);
        if dropped > 0 {
            debug!(path = %path.display(), dropped, "dropped invalid UTF-8 bytes");
        }

        let stats = ReadStats {
            file_path: path.display().to_string(),
            bytes_read: bytes.len() as u64,
            bytes_dropped: dropped as u64,
            duration_ms: start_time.elapsed().as_millis() as u64,
            read_error: None,
        };

        debug!(
            "Read {}: {} bytes in {}ms",
            path.display(),
            stats.bytes_read,
            stats.duration_ms
        );
        Ok((text, stats))
    }
}

/// Read a single document with default configuration
pub async fn read_document_async<P: AsRef<Path>>(file_path: P) -> Result<String> {
    let reader = DocumentReader::new(ReaderConfig { fail_fast: true, ..Default::default() });
    let (text, _stats) = reader.read_document(file_path).await?;
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use tokio::fs;

    #[test]
    fn test_decode_drops_invalid_sequences() {
        let (text, dropped) = decode_dropping_invalid(b"ab\xFFcd\xC3\xA9e");
        assert_eq!(text, "abcdée");
        assert_eq!(dropped, 1);
    }

    #[test]
    fn test_decode_truncated_tail() {
        // first two bytes of a three-byte sequence
        let (text, dropped) = decode_dropping_invalid(b"ok\xE4\xB8");
        assert_eq!(text, "ok");
        assert_eq!(dropped, 2);
    }

    #[test]
    fn test_decode_keeps_literal_replacement_char() {
        let (text, dropped) = decode_dropping_invalid("a\u{FFFD}b".as_bytes());
        assert_eq!(text, "a\u{FFFD}b");
        assert_eq!(dropped, 0);
    }

    #[tokio::test]
    async fn test_read_valid_document() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("doc.txt");
        fs::write(&path, "Line 1\nLine 2").await.unwrap();

        let reader = DocumentReader::new(ReaderConfig::default());
        let (text, stats) = reader.read_document(&path).await.unwrap();

        assert_eq!(text, "Line 1\nLine 2");
        assert_eq!(stats.bytes_read, 13);
        assert!(stats.read_error.is_none());
    }

    #[tokio::test]
    async fn test_read_invalid_utf8_is_lossy() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("bad.txt");
        fs::write(&path, [b'H', b'i', 0xFF, 0xFE, b'!']).await.unwrap();

        let reader = DocumentReader::new(ReaderConfig::default());
        let (text, stats) = reader.read_document(&path).await.unwrap();

        assert_eq!(text, "Hi!");
        assert_eq!(stats.bytes_dropped, 2);
        assert!(stats.read_error.is_none());
    }

    #[tokio::test]
    async fn test_read_missing_document_reports_error() {
        let temp_dir = TempDir::new().unwrap();
        let reader = DocumentReader::new(ReaderConfig::default());

        let (text, stats) = reader.read_document(temp_dir.path().join("missing.txt")).await.unwrap();
        assert!(text.is_empty());
        assert!(stats.read_error.is_some());
    }

    #[tokio::test]
    async fn test_read_missing_document_fail_fast() {
        let temp_dir = TempDir::new().unwrap();
        let result = read_document_async(temp_dir.path().join("missing.txt")).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_small_buffer_reads_everything() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("large.txt");
        let content = "x".repeat(5000);
        fs::write(&path, &content).await.unwrap();

        let reader = DocumentReader::new(ReaderConfig { fail_fast: false, buffer_size: 512 });
        let (text, _) = reader.read_document(&path).await.unwrap();
        assert_eq!(text.len(), 5000);
    }
}
