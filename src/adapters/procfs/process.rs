use std::fs;
use std::path::PathBuf;

use async_trait::async_trait;

use crate::error::SourceError;
use crate::ports::ProcessSource;

use super::parser;
use super::ProcfsConfig;

/// Process source implementation using procfs
pub struct ProcfsProcessSource {
    config: ProcfsConfig,
}

impl ProcfsProcessSource {
    pub fn new(config: ProcfsConfig) -> Self {
        Self { config }
    }

    fn pid_path(&self, pid: u32) -> PathBuf {
        self.config.proc_path.join(pid.to_string())
    }
}

#[async_trait]
impl ProcessSource for ProcfsProcessSource {
    async fn list_pids(&self) -> Result<Vec<u32>, SourceError> {
        let mut pids = Vec::new();

        for entry in fs::read_dir(&self.config.proc_path)? {
            let entry = entry?;
            let file_name = entry.file_name();

            if let Some(pid) = parser::parse_pid(&file_name.to_string_lossy()) {
                pids.push(pid);
            }
        }

        // read_dir order is unspecified; keep discovery order stable across runs
        pids.sort_unstable();
        Ok(pids)
    }

    async fn read_cgroup(&self, pid: u32) -> Result<Option<String>, SourceError> {
        match fs::read_to_string(self.pid_path(pid).join("cgroup")) {
            Ok(content) => Ok(Some(content)),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    async fn read_cmdline(&self, pid: u32) -> Result<Vec<u8>, SourceError> {
        Ok(fs::read(self.pid_path(pid).join("cmdline"))?)
    }

    fn root_path(&self, pid: u32) -> PathBuf {
        self.pid_path(pid).join("root")
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    fn fake_proc() -> TempDir {
        let dir = TempDir::new().unwrap();
        for pid in ["300", "12", "1"] {
            fs::create_dir(dir.path().join(pid)).unwrap();
        }
        fs::create_dir(dir.path().join("self")).unwrap();
        fs::write(dir.path().join("uptime"), "1.0 1.0\n").unwrap();
        fs::write(dir.path().join("12/cgroup"), "0::/kubepods/x\n").unwrap();
        fs::write(dir.path().join("12/cmdline"), b"/pause\0").unwrap();
        dir
    }

    #[tokio::test]
    async fn test_list_pids_sorted() {
        let proc = fake_proc();
        let source = ProcfsProcessSource::new(ProcfsConfig::new(proc.path()));
        assert_eq!(source.list_pids().await.unwrap(), vec![1, 12, 300]);
    }

    #[tokio::test]
    async fn test_list_pids_missing_proc() {
        let source = ProcfsProcessSource::new(ProcfsConfig::new("/nonexistent/kubedisk/proc"));
        assert!(source.list_pids().await.is_err());
    }

    #[tokio::test]
    async fn test_read_cgroup_and_cmdline() {
        let proc = fake_proc();
        let source = ProcfsProcessSource::new(ProcfsConfig::new(proc.path()));

        assert_eq!(
            source.read_cgroup(12).await.unwrap().as_deref(),
            Some("0::/kubepods/x\n")
        );
        assert_eq!(source.read_cgroup(300).await.unwrap(), None);
        assert_eq!(source.read_cmdline(12).await.unwrap(), b"/pause\0".to_vec());
        assert!(source.read_cmdline(1).await.is_err());
        assert_eq!(source.root_path(12), proc.path().join("12").join("root"));
    }
}
