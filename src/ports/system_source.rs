use std::path::Path;

use async_trait::async_trait;

use crate::error::SourceError;

/// Raw block figures of a mounted filesystem
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockStats {
    pub blocks: u64,
    pub fragment_size: u64,
    pub blocks_free: u64,
}

/// Port for filesystem-wide statistics
#[async_trait]
pub trait FilesystemStatsSource: Send + Sync {
    async fn block_stats(&self, path: &Path) -> Result<BlockStats, SourceError>;
}
