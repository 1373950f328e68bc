use std::time::Duration;

use thiserror::Error;

/// Failure reading from an OS-level source (procfs, statvfs)
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("statvfs failed on {path}: {errno}")]
    Statvfs { path: String, errno: nix::errno::Errno },
}

impl SourceError {
    /// True when the error means the process is gone rather than unreadable.
    pub fn is_vanished_process(&self) -> bool {
        match self {
            Self::Io(err) => {
                err.kind() == std::io::ErrorKind::NotFound
                    || err.raw_os_error() == Some(nix::errno::Errno::ESRCH as i32)
            }
            _ => false,
        }
    }
}

/// Failure attributing a single candidate; always recoverable
#[derive(Debug, Error)]
pub enum AttributionError {
    #[error(transparent)]
    Source(#[from] SourceError),

    #[error("size walk failed: {0}")]
    Walk(#[from] walkdir::Error),

    #[error("size walk timed out after {0:?}")]
    WalkTimeout(Duration),

    #[error("size walk task failed: {0}")]
    WalkTask(#[from] tokio::task::JoinError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid runtime config: {0}")]
    RuntimeConfig(#[from] serde_json::Error),

    #[error("missing annotation: {0}")]
    MissingAnnotation(&'static str),
}

/// Failure that aborts the whole collection
#[derive(Debug, Error)]
pub enum CollectError {
    #[error("failed to read node disk stats: {0}")]
    NodeStats(#[source] SourceError),

    #[error("failed to enumerate candidates: {0}")]
    Enumeration(#[source] SourceError),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid value for {key}: {value}")]
    Invalid { key: &'static str, value: String },
}
