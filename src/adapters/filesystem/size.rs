use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use walkdir::WalkDir;

use crate::error::AttributionError;
use crate::ports::SizeEstimator;

/// Sum the sizes of all regular files under `root`.
///
/// Symlinks are neither followed nor counted, except `root` itself: a process root
/// such as `/proc/<pid>/root` is a link that must be entered. Direct children of
/// `root` whose name is in `excluded` are pruned; deeper entries with the same name
/// are counted normally. With a `timeout`, the walk stops at the first entry
/// reached after it expires.
pub fn directory_size(
    root: &Path,
    excluded: &[String],
    timeout: Option<Duration>,
) -> Result<u64, AttributionError> {
    let deadline = timeout.map(|limit| (Instant::now() + limit, limit));
    let walker = WalkDir::new(root)
        .follow_links(false)
        .follow_root_links(true)
        .into_iter()
        .filter_entry(|entry| {
            entry.depth() != 1
                || !excluded
                    .iter()
                    .any(|name| entry.file_name() == name.as_str())
        });

    let mut total = 0u64;
    for entry in walker {
        if let Some((at, limit)) = deadline {
            if Instant::now() >= at {
                return Err(AttributionError::WalkTimeout(limit));
            }
        }

        let entry = entry?;
        if entry.file_type().is_file() {
            total += entry.metadata()?.len();
        }
    }

    Ok(total)
}

/// Size estimator backed by a blocking walkdir traversal
#[derive(Debug, Clone, Default)]
pub struct WalkdirSizeEstimator {
    timeout: Option<Duration>,
}

impl WalkdirSizeEstimator {
    pub fn new(timeout: Option<Duration>) -> Self {
        Self { timeout }
    }
}

#[async_trait]
impl SizeEstimator for WalkdirSizeEstimator {
    async fn estimate(&self, root: &Path, excluded: &[&str]) -> Result<u64, AttributionError> {
        let root: PathBuf = root.to_path_buf();
        let excluded: Vec<String> = excluded.iter().map(|s| s.to_string()).collect();

        let timeout = self.timeout;
        let walk = tokio::task::spawn_blocking(move || directory_size(&root, &excluded, timeout));

        // Backstop for a walk blocked in one syscall, which never reaches its next deadline check
        let joined = match timeout {
            Some(limit) => tokio::time::timeout(limit, walk)
                .await
                .map_err(|_| AttributionError::WalkTimeout(limit))?,
            None => walk.await,
        };

        Ok(joined??)
    }
}
