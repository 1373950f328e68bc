use std::fs;
use std::path::Path;

use async_trait::async_trait;

use crate::error::SourceError;
use crate::ports::{BlockStats, FilesystemStatsSource, MountInfo, MountSource};

use super::parser;
use super::ProcfsConfig;

/// Node-level source: filesystem stats via statvfs, mount table via procfs
pub struct ProcfsSystemSource {
    config: ProcfsConfig,
}

impl ProcfsSystemSource {
    pub fn new(config: ProcfsConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl FilesystemStatsSource for ProcfsSystemSource {
    async fn block_stats(&self, path: &Path) -> Result<BlockStats, SourceError> {
        let stat = nix::sys::statvfs::statvfs(path).map_err(|errno| SourceError::Statvfs {
            path: path.display().to_string(),
            errno,
        })?;

        Ok(BlockStats {
            blocks: stat.blocks() as u64,
            fragment_size: stat.fragment_size() as u64,
            blocks_free: stat.blocks_free() as u64,
        })
    }
}

#[async_trait]
impl MountSource for ProcfsSystemSource {
    async fn list_mounts(&self) -> Result<Vec<MountInfo>, SourceError> {
        let mounts_path = self.config.proc_path.join("mounts");
        let mounts_content = fs::read_to_string(&mounts_path)?;

        Ok(parser::parse_mounts(&mounts_content))
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    #[tokio::test]
    async fn test_block_stats_of_tempdir() {
        let dir = TempDir::new().unwrap();
        let source = ProcfsSystemSource::new(ProcfsConfig::new("/proc"));

        let stats = source.block_stats(dir.path()).await.unwrap();
        assert!(stats.fragment_size > 0);
        assert!(stats.blocks_free <= stats.blocks);
    }

    #[tokio::test]
    async fn test_block_stats_missing_path() {
        let source = ProcfsSystemSource::new(ProcfsConfig::new("/proc"));
        let err = source
            .block_stats(Path::new("/nonexistent/kubedisk"))
            .await
            .unwrap_err();
        assert!(matches!(err, SourceError::Statvfs { .. }));
    }

    #[tokio::test]
    async fn test_list_mounts() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("mounts"),
            "overlay /var/lib/x/abc/rootfs overlay rw 0 0\n",
        )
        .unwrap();
        let source = ProcfsSystemSource::new(ProcfsConfig::new(dir.path()));

        let mounts = source.list_mounts().await.unwrap();
        assert_eq!(mounts.len(), 1);
        assert_eq!(mounts[0].mount_point, "/var/lib/x/abc/rootfs");
    }
}
