mod parser;
mod process;
mod system;

use std::path::PathBuf;

pub use process::ProcfsProcessSource;
pub use system::ProcfsSystemSource;

/// Configuration for procfs paths (useful when the host /proc is mounted elsewhere)
#[derive(Debug, Clone)]
pub struct ProcfsConfig {
    pub proc_path: PathBuf,
}

impl ProcfsConfig {
    pub fn new(proc_path: impl Into<PathBuf>) -> Self {
        Self {
            proc_path: proc_path.into(),
        }
    }
}

/// Combined adapter for both system and process sources
#[derive(Debug, Clone)]
pub struct ProcfsAdapter {
    config: ProcfsConfig,
}

impl ProcfsAdapter {
    pub fn new(config: ProcfsConfig) -> Self {
        Self { config }
    }

    pub fn system_source(&self) -> ProcfsSystemSource {
        ProcfsSystemSource::new(self.config.clone())
    }

    pub fn process_source(&self) -> ProcfsProcessSource {
        ProcfsProcessSource::new(self.config.clone())
    }
}
