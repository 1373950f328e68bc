use std::path::Path;

use async_trait::async_trait;

use crate::error::AttributionError;

/// Port for computing the on-disk footprint of a directory tree
#[async_trait]
pub trait SizeEstimator: Send + Sync {
    /// Sum the sizes of regular files under `root`.
    ///
    /// Direct children of `root` named in `excluded` are skipped. A partial sum is
    /// never returned: any unreadable entry fails the whole estimate.
    async fn estimate(&self, root: &Path, excluded: &[&str]) -> Result<u64, AttributionError>;
}
