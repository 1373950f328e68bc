use std::path::PathBuf;

use async_trait::async_trait;

use crate::error::SourceError;

/// Port for reading per-process state
#[async_trait]
pub trait ProcessSource: Send + Sync {
    /// List all live process ids
    async fn list_pids(&self) -> Result<Vec<u32>, SourceError>;

    /// Read the cgroup membership descriptor; `None` if the process has none
    async fn read_cgroup(&self, pid: u32) -> Result<Option<String>, SourceError>;

    /// Read the raw NUL-separated command line
    async fn read_cmdline(&self, pid: u32) -> Result<Vec<u8>, SourceError>;

    /// Path through which the process's root filesystem can be read
    fn root_path(&self, pid: u32) -> PathBuf;
}
