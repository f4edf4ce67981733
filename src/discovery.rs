use anyhow::Result;
use futures::stream::{Stream, StreamExt};
use glob::glob;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info, warn};

/// Configuration for document discovery
#[derive(Debug, Clone)]
pub struct DiscoveryConfig {
    /// Extension (without the dot) of the documents to collect
    pub extension: String,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            extension: "txt".to_string(),
        }
    }
}

/// Result of discovery validation for one path
#[derive(Debug, Clone)]
pub struct FileValidation {
    pub path: PathBuf,
    pub error: Option<String>,
}

/// Discovers every `**/*.<extension>` file under `root_dir`.
/// Returns an async stream of validated file paths in glob order.
pub fn discover_files(
    root_dir: impl AsRef<Path>,
    config: DiscoveryConfig,
) -> impl Stream<Item = Result<FileValidation>> {
    let root_path = root_dir.as_ref().to_path_buf();

    futures::stream::unfold(
        DiscoveryState::new(root_path, config),
        |mut state| async move {
            state.next_file().await.map(|result| (result, state))
        },
    )
}

/// Internal state for discovery iteration
struct DiscoveryState {
    root_dir: PathBuf,
    config: DiscoveryConfig,
    glob_iter: Option<glob::Paths>,
}

impl DiscoveryState {
    fn new(root_dir: PathBuf, config: DiscoveryConfig) -> Self {
        Self {
            root_dir,
            config,
            glob_iter: None,
        }
    }

    fn pattern(&self) -> String {
        // WHY: glob metacharacters in the root must match literally
        let root = glob::Pattern::escape(&self.root_dir.display().to_string());
        format!("{}/**/*.{}", root, self.config.extension)
    }

    async fn next_file(&mut self) -> Option<Result<FileValidation>> {
        if self.glob_iter.is_none() {
            let pattern = self.pattern();
            debug!("Starting document discovery with pattern: {}", pattern);

            match glob(&pattern) {
                Ok(paths) => {
                    self.glob_iter = Some(paths);
                    info!("Document discovery initialized for root: {}", self.root_dir.display());
                }
                Err(e) => {
                    return Some(Err(anyhow::anyhow!("Failed to create glob pattern: {}", e)));
                }
            }
        }

        let glob_iter = self.glob_iter.as_mut()?;
        loop {
            match glob_iter.next()? {
                Ok(path) => {
                    debug!("Found document: {}", path.display());
                    return Some(Ok(self.validate_file(path).await));
                }
                // unreadable directories are skipped, the walk goes on
                Err(e) => warn!("Glob iteration error: {}", e),
            }
        }
    }

    /// Inaccessible paths are recorded, never fatal
    async fn validate_file(&self, path: PathBuf) -> FileValidation {
        match fs::metadata(&path).await {
            Ok(metadata) if metadata.is_file() => FileValidation { path, error: None },
            Ok(_) => {
                // directories named like documents, e.g. `notes.txt/`
                let error = format!("Path is not a file: {}", path.display());
                debug!("{}", error);
                FileValidation { path, error: Some(error) }
            }
            Err(e) => {
                let error = format!("Cannot access file {}: {}", path.display(), e);
                warn!("{}", error);
                FileValidation { path, error: Some(error) }
            }
        }
    }
}

/// Collect all discovered paths, sorted by path
pub async fn collect_discovered_files(
    root_dir: impl AsRef<Path>,
    config: DiscoveryConfig,
) -> Result<Vec<FileValidation>> {
    let mut files = Vec::new();
    let mut stream = Box::pin(discover_files(root_dir, config));

    while let Some(result) = stream.next().await {
        files.push(result?);
    }

    files.sort_by(|a, b| a.path.cmp(&b.path));

    let valid_count = files.iter().filter(|f| f.error.is_none()).count();
    let invalid_count = files.len() - valid_count;
    if invalid_count > 0 {
        warn!("Found {} paths with validation issues", invalid_count);
    }
    info!("Document discovery summary: {} valid, {} invalid", valid_count, invalid_count);

    Ok(files)
}

/// Sorted paths of every valid document under `root_dir`
pub async fn find_documents<P: AsRef<Path>>(root_dir: P, extension: &str) -> Result<Vec<PathBuf>> {
    let config = DiscoveryConfig {
        extension: extension.to_string(),
    };
    let validations = collect_discovered_files(root_dir, config).await?;

    Ok(validations
        .into_iter()
        .filter(|v| v.error.is_none())
        .map(|v| v.path)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    async fn create_test_file(dir: &Path, name: &str, content: &str) -> Result<PathBuf> {
        let file_path = dir.join(name);
        if let Some(parent) = file_path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&file_path, content).await?;
        Ok(file_path)
    }

    #[tokio::test]
    async fn test_discover_empty_directory() {
        let temp_dir = TempDir::new().unwrap();
        let files = collect_discovered_files(temp_dir.path(), DiscoveryConfig::default()).await.unwrap();
        assert!(files.is_empty());
    }

    #[tokio::test]
    async fn test_discover_matching_extension_recursively() {
        let temp_dir = TempDir::new().unwrap();
        create_test_file(temp_dir.path(), "b.txt", "Second").await.unwrap();
        create_test_file(temp_dir.path(), "nested/deeper/a.txt", "Nested").await.unwrap();
        create_test_file(temp_dir.path(), "notes.md", "Ignored").await.unwrap();

        let files = find_documents(temp_dir.path(), "txt").await.unwrap();
        let names: Vec<String> = files
            .iter()
            .map(|p| p.strip_prefix(temp_dir.path()).unwrap().to_string_lossy().replace('\\', "/"))
            .collect();
        assert_eq!(names, vec!["b.txt", "nested/deeper/a.txt"]);
    }

    #[tokio::test]
    async fn test_custom_extension() {
        let temp_dir = TempDir::new().unwrap();
        create_test_file(temp_dir.path(), "essay.md", "Markdown").await.unwrap();
        create_test_file(temp_dir.path(), "book.txt", "Text").await.unwrap();

        let files = find_documents(temp_dir.path(), "md").await.unwrap();
        assert_eq!(files.len(), 1);
        assert!(files[0].ends_with("essay.md"));
    }

    #[tokio::test]
    async fn test_directory_with_extension_is_flagged() {
        let temp_dir = TempDir::new().unwrap();
        tokio::fs::create_dir_all(temp_dir.path().join("folder.txt")).await.unwrap();
        create_test_file(temp_dir.path(), "real.txt", "content").await.unwrap();

        let files = collect_discovered_files(temp_dir.path(), DiscoveryConfig::default()).await.unwrap();
        assert_eq!(files.len(), 2);
        let flagged: Vec<_> = files.iter().filter(|f| f.error.is_some()).collect();
        assert_eq!(flagged.len(), 1);
        assert!(flagged[0].path.ends_with("folder.txt"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_dangling_symlink_is_recorded_not_fatal() {
        let temp_dir = TempDir::new().unwrap();
        create_test_file(temp_dir.path(), "real.txt", "content").await.unwrap();
        std::os::unix::fs::symlink(temp_dir.path().join("gone.txt"), temp_dir.path().join("dangling.txt")).unwrap();

        let files = collect_discovered_files(temp_dir.path(), DiscoveryConfig::default()).await.unwrap();
        assert_eq!(files.len(), 2);
        let dangling = files.iter().find(|f| f.path.ends_with("dangling.txt")).unwrap();
        assert!(dangling.error.as_deref().is_some_and(|e| e.starts_with("Cannot access file")));

        let valid = find_documents(temp_dir.path(), "txt").await.unwrap();
        assert_eq!(valid.len(), 1);
        assert!(valid[0].ends_with("real.txt"));
    }

    #[tokio::test]
    async fn test_invalid_utf8_is_still_discovered() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join("binary.txt"), [0xFF, 0xFE, 0xFD]).unwrap();

        let files = find_documents(temp_dir.path(), "txt").await.unwrap();
        assert_eq!(files.len(), 1);
    }
}
