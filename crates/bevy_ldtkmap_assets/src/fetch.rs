//! Text retrieval for project and level files.
//!
//! The typed graph never reads files itself. It is handed a [`TextFetcher`] and
//! asks it for the contents of a path; whether that path is read from disk, an
//! in-memory bundle, or an HTTP endpoint is decided once by the caller.

use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use bevy::platform::collections::HashMap;
use futures::future::{BoxFuture, FutureExt};
use thiserror::Error;

/// Error returned by a [`TextFetcher`].
///
/// Cloneable so that a single failed fetch can be reported to every caller
/// waiting on it.
#[derive(Debug, Clone, Error)]
pub enum FetchError {
    #[error("IO error reading '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: Arc<io::Error>,
    },

    #[error("No file at '{0}'")]
    NotFound(String),
}

/// Asynchronous source of text files.
///
/// Paths are forward-slash separated and relative to whatever root the
/// implementation was created with.
///
/// # Example
///
/// ```rust
/// use bevy_ldtkmap_assets::fetch::{MemoryTextFetcher, TextFetcher};
///
/// let fetcher = MemoryTextFetcher::default().with_file("world.ldtk", "{}");
/// let text = futures::executor::block_on(fetcher.fetch_text("world.ldtk")).unwrap();
/// assert_eq!(text, "{}");
/// ```
pub trait TextFetcher: Send + Sync + 'static {
    /// Fetch the full contents of `path` as UTF-8 text.
    fn fetch_text<'a>(&'a self, path: &'a str) -> BoxFuture<'a, Result<String, FetchError>>;
}

/// Reads files from the local filesystem below a root directory.
///
/// Reads go through `async-fs`, so a fetch never blocks the executor polling it.
#[derive(Debug, Clone, Default)]
pub struct FileTextFetcher {
    root: PathBuf,
}

impl FileTextFetcher {
    /// Create a fetcher resolving paths against `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The directory paths are resolved against.
    pub fn root(&self) -> &PathBuf {
        &self.root
    }
}

impl TextFetcher for FileTextFetcher {
    fn fetch_text<'a>(&'a self, path: &'a str) -> BoxFuture<'a, Result<String, FetchError>> {
        async move {
            let full_path = self.root.join(path);
            async_fs::read_to_string(&full_path).await.map_err(|e| {
                if e.kind() == io::ErrorKind::NotFound {
                    FetchError::NotFound(path.to_string())
                } else {
                    FetchError::Io {
                        path: path.to_string(),
                        source: Arc::new(e),
                    }
                }
            })
        }
        .boxed()
    }
}

/// Serves files from an in-memory map.
///
/// Useful for projects embedded with `include_str!` and for platforms without
/// filesystem access.
#[derive(Debug, Clone, Default)]
pub struct MemoryTextFetcher {
    files: HashMap<String, String>,
}

impl MemoryTextFetcher {
    /// Add a file, replacing any previous content at the same path.
    pub fn insert(&mut self, path: impl Into<String>, contents: impl Into<String>) {
        self.files.insert(path.into(), contents.into());
    }

    /// Builder form of [`insert`](Self::insert).
    pub fn with_file(mut self, path: impl Into<String>, contents: impl Into<String>) -> Self {
        self.insert(path, contents);
        self
    }

    /// Number of files held.
    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

impl TextFetcher for MemoryTextFetcher {
    fn fetch_text<'a>(&'a self, path: &'a str) -> BoxFuture<'a, Result<String, FetchError>> {
        let result = self
            .files
            .get(path)
            .cloned()
            .ok_or_else(|| FetchError::NotFound(path.to_string()));
        async move { result }.boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::executor::block_on;

    #[test]
    fn test_memory_fetcher_returns_contents() {
        let fetcher = MemoryTextFetcher::default().with_file("a/b.ldtkl", "level");
        assert_eq!(block_on(fetcher.fetch_text("a/b.ldtkl")).unwrap(), "level");
        assert_eq!(fetcher.len(), 1);
    }

    #[test]
    fn test_memory_fetcher_missing_file() {
        let fetcher = MemoryTextFetcher::default();
        let err = block_on(fetcher.fetch_text("missing.ldtk")).unwrap_err();
        assert!(matches!(err, FetchError::NotFound(path) if path == "missing.ldtk"));
    }

    #[test]
    fn test_file_fetcher_missing_file() {
        let fetcher = FileTextFetcher::new(std::env::temp_dir().join("bevy_ldtkmap_no_such_dir"));
        let err = block_on(fetcher.fetch_text("world.ldtk")).unwrap_err();
        assert!(matches!(err, FetchError::NotFound(_)));
    }

    #[test]
    fn test_file_fetcher_reads_file() {
        let dir = std::env::temp_dir().join(format!("bevy_ldtkmap_fetch_{}", std::process::id()));
        std::fs::create_dir_all(dir.join("levels")).unwrap();
        std::fs::write(dir.join("levels/one.ldtkl"), "{\"uid\":1}").unwrap();

        let fetcher = FileTextFetcher::new(&dir);
        let text = block_on(fetcher.fetch_text("levels/one.ldtkl")).unwrap();
        assert_eq!(text, "{\"uid\":1}");

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_file_fetcher_reads_concurrently() {
        let dir = std::env::temp_dir().join(format!("bevy_ldtkmap_join_{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("a.ldtkl"), "a").unwrap();
        std::fs::write(dir.join("b.ldtkl"), "b").unwrap();

        let fetcher = FileTextFetcher::new(&dir);
        let texts = block_on(futures::future::join_all([
            fetcher.fetch_text("a.ldtkl"),
            fetcher.fetch_text("b.ldtkl"),
            fetcher.fetch_text("c.ldtkl"),
        ]));

        assert_eq!(texts[0].as_deref().unwrap(), "a");
        assert_eq!(texts[1].as_deref().unwrap(), "b");
        assert!(matches!(&texts[2], Err(FetchError::NotFound(path)) if path == "c.ldtkl"));

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
