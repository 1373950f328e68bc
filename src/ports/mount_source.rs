use async_trait::async_trait;

use crate::error::SourceError;

/// One entry of the mount table
#[allow(dead_code)]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MountInfo {
    pub device: String,
    pub mount_point: String,
    pub filesystem: String,
}

/// Port for enumerating mounts
#[async_trait]
pub trait MountSource: Send + Sync {
    /// List every mount, in mount-table order
    async fn list_mounts(&self) -> Result<Vec<MountInfo>, SourceError>;
}
