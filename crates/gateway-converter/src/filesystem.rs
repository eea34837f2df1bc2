//! Ephemeral files handed to and read back from the conversion tool.
//!
//! Names come from `tempfile`, never from the caller, so concurrent
//! conversions cannot collide. A [`TempResource`] deletes its file when
//! released or dropped, whichever comes first, and exactly once.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use bytes::Bytes;
use tempfile::TempPath;
use tracing::{debug, warn};

use crate::error::ConversionError;

/// Prefix of every temp file created by the gateway.
pub const TEMP_PREFIX: &str = "pandoc-gateway-";

/// Longest suffix kept after sanitizing.
const MAX_SUFFIX_LEN: usize = 32;

/// Creates temp resources under one root directory.
#[derive(Debug, Clone)]
pub struct TempResourceManager {
    root: PathBuf,
    live: Arc<AtomicUsize>,
}

impl TempResourceManager {
    /// Create a manager rooted at `root`, creating the directory if needed.
    ///
    /// The root must be valid UTF-8; every path handed out is then UTF-8 too.
    pub fn new(root: impl Into<PathBuf>) -> Result<Self, ConversionError> {
        let root = root.into();
        if root.to_str().is_none() {
            return Err(ConversionError::internal(format!(
                "Temp root is not valid UTF-8: {}",
                root.display()
            )));
        }
        std::fs::create_dir_all(&root)?;
        Ok(Self {
            root,
            live: Arc::new(AtomicUsize::new(0)),
        })
    }

    /// Root directory for temp files.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Number of acquired resources not yet released.
    pub fn live(&self) -> usize {
        self.live.load(Ordering::SeqCst)
    }

    /// Create a uniquely named file holding `content`.
    ///
    /// Pass empty content for an output placeholder.
    pub async fn acquire(
        &self,
        content: Bytes,
        suffix: &str,
    ) -> Result<TempResource, ConversionError> {
        let root = self.root.clone();
        let suffix = sanitize_suffix(suffix);

        let temp_path = tokio::task::spawn_blocking(move || -> std::io::Result<TempPath> {
            let mut file = tempfile::Builder::new()
                .prefix(TEMP_PREFIX)
                .suffix(&suffix)
                .tempfile_in(&root)?;
            file.write_all(&content)?;
            file.flush()?;
            Ok(file.into_temp_path())
        })
        .await??;

        self.live.fetch_add(1, Ordering::SeqCst);
        let location = temp_path.to_path_buf();
        debug!(path = %location.display(), "Acquired temp resource");

        Ok(TempResource {
            location,
            path: Some(temp_path),
            live: Arc::clone(&self.live),
        })
    }
}

/// One temp file, owned by a single conversion call.
#[derive(Debug)]
pub struct TempResource {
    location: PathBuf,
    path: Option<TempPath>,
    live: Arc<AtomicUsize>,
}

impl TempResource {
    /// Filesystem path of the resource.
    pub fn path(&self) -> &Path {
        &self.location
    }

    /// Delete the file. Never fails; problems are logged.
    pub fn release(mut self) {
        self.release_inner();
    }

    fn release_inner(&mut self) {
        let Some(temp_path) = self.path.take() else {
            return;
        };
        self.live.fetch_sub(1, Ordering::SeqCst);

        match temp_path.close() {
            Ok(()) => debug!(path = %self.location.display(), "Released temp resource"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.location.display(), "Temp resource already removed");
            }
            Err(e) => warn!(
                path = %self.location.display(),
                error = %e,
                "Failed to remove temp resource"
            ),
        }
    }
}

impl Drop for TempResource {
    fn drop(&mut self) {
        self.release_inner();
    }
}

/// Keep only characters that are safe inside a file name.
fn sanitize_suffix(suffix: &str) -> String {
    suffix
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_' | '+'))
        .take(MAX_SUFFIX_LEN)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entries(dir: &Path) -> usize {
        std::fs::read_dir(dir).expect("read_dir").count()
    }

    #[cfg(unix)]
    #[test]
    fn test_non_utf8_root_is_rejected() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let dir = tempfile::tempdir().expect("tempdir");
        let root = dir.path().join(OsStr::from_bytes(b"root-\xff"));

        let err = TempResourceManager::new(&root).unwrap_err();
        assert!(matches!(err, ConversionError::Internal(_)));
        assert!(!root.exists());
    }

    #[tokio::test]
    async fn test_acquire_writes_content() {
        let dir = tempfile::tempdir().expect("tempdir");
        let manager = TempResourceManager::new(dir.path()).expect("manager");

        let resource = manager
            .acquire(Bytes::from_static(b"# Hello"), ".md")
            .await
            .expect("acquire");

        let name = resource.path().file_name().and_then(|n| n.to_str()).expect("name");
        assert!(name.starts_with(TEMP_PREFIX));
        assert!(name.ends_with(".md"));
        assert_eq!(std::fs::read(resource.path()).expect("read"), b"# Hello");
        assert_eq!(manager.live(), 1);

        resource.release();
        assert_eq!(manager.live(), 0);
        assert_eq!(entries(dir.path()), 0);
    }

    #[tokio::test]
    async fn test_empty_placeholder() {
        let dir = tempfile::tempdir().expect("tempdir");
        let manager = TempResourceManager::new(dir.path()).expect("manager");

        let resource = manager.acquire(Bytes::new(), ".docx").await.expect("acquire");
        assert_eq!(std::fs::metadata(resource.path()).expect("meta").len(), 0);
    }

    #[tokio::test]
    async fn test_drop_releases() {
        let dir = tempfile::tempdir().expect("tempdir");
        let manager = TempResourceManager::new(dir.path()).expect("manager");

        {
            let _input = manager.acquire(Bytes::from_static(b"x"), ".html").await.expect("a");
            let _output = manager.acquire(Bytes::new(), ".txt").await.expect("b");
            assert_eq!(manager.live(), 2);
            assert_eq!(entries(dir.path()), 2);
        }

        assert_eq!(manager.live(), 0);
        assert_eq!(entries(dir.path()), 0);
    }

    #[tokio::test]
    async fn test_release_tolerates_missing_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let manager = TempResourceManager::new(dir.path()).expect("manager");

        let resource = manager.acquire(Bytes::new(), ".txt").await.expect("acquire");
        std::fs::remove_file(resource.path()).expect("remove");
        resource.release();
        assert_eq!(manager.live(), 0);
    }

    #[tokio::test]
    async fn test_concurrent_acquire_unique_paths() {
        let dir = tempfile::tempdir().expect("tempdir");
        let manager = TempResourceManager::new(dir.path()).expect("manager");

        let tasks = (0..64).map(|i| {
            let m = manager.clone();
            async move { m.acquire(Bytes::from(format!("doc {i}")), ".md").await }
        });
        let resources: Vec<TempResource> = futures::future::try_join_all(tasks)
            .await
            .expect("acquire all");

        let mut paths: Vec<_> = resources.iter().map(|r| r.path().to_path_buf()).collect();
        paths.sort();
        paths.dedup();
        assert_eq!(paths.len(), 64);

        drop(resources);
        assert_eq!(entries(dir.path()), 0);
    }

    #[test]
    fn test_sanitize_suffix() {
        assert_eq!(sanitize_suffix(".md"), ".md");
        assert_eq!(sanitize_suffix(".gfm+smart"), ".gfm+smart");
        assert_eq!(sanitize_suffix("./../../etc/passwd"), ".....etcpasswd");
        assert_eq!(sanitize_suffix(&format!(".{}", "a".repeat(100))).len(), MAX_SUFFIX_LEN);
    }
}
