use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use serde::Deserialize;

use crate::domain::PodRef;
use crate::error::ConfigError;

/// Environment variable naming an optional TOML config file
pub const CONFIG_FILE_ENV: &str = "KUBEDISK_CONFIG";

/// Container discovery strategy
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    #[default]
    Process,
    Mount,
}

impl FromStr for BackendKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "process" => Ok(Self::Process),
            "mount" => Ok(Self::Mount),
            other => Err(other.to_string()),
        }
    }
}

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub backend: BackendKind,
    pub proc_path: PathBuf,
    /// Mount point whose capacity is reported as node disk stats
    pub root_path: PathBuf,
    pub rootfs_suffix: String,
    pub walk_timeout_secs: Option<u64>,
    pub log_level: String,
    pub pretty: bool,
    pub current_pod_uid: Option<String>,
    pub current_pod_name: Option<String>,
    pub current_pod_namespace: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend: BackendKind::Process,
            proc_path: PathBuf::from("/proc"),
            root_path: PathBuf::from("/"),
            rootfs_suffix: "/rootfs".to_string(),
            walk_timeout_secs: None,
            log_level: "info".to_string(),
            pretty: false,
            current_pod_uid: None,
            current_pod_name: None,
            current_pod_namespace: None,
        }
    }
}

impl Config {
    /// Defaults, then the file named by `KUBEDISK_CONFIG`, then environment overrides.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_with(|key| env::var(key).ok())
    }

    pub fn load_with(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let lookup = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let mut config = match lookup(CONFIG_FILE_ENV) {
            Some(path) => Self::from_file(Path::new(&path))?,
            None => Self::default(),
        };
        config.apply_env(lookup)?;

        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;

        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<(), ConfigError> {
        if let Some(value) = lookup("KUBEDISK_BACKEND") {
            self.backend = value.parse().map_err(|value| ConfigError::Invalid {
                key: "KUBEDISK_BACKEND",
                value,
            })?;
        }
        if let Some(value) = lookup("KUBEDISK_PROC_PATH") {
            self.proc_path = PathBuf::from(value);
        }
        if let Some(value) = lookup("KUBEDISK_ROOT_PATH") {
            self.root_path = PathBuf::from(value);
        }
        if let Some(value) = lookup("KUBEDISK_ROOTFS_SUFFIX") {
            self.rootfs_suffix = value;
        }
        if let Some(value) = lookup("KUBEDISK_WALK_TIMEOUT") {
            let secs = value.trim().parse().map_err(|_| ConfigError::Invalid {
                key: "KUBEDISK_WALK_TIMEOUT",
                value: value.clone(),
            })?;
            self.walk_timeout_secs = Some(secs);
        }
        if let Some(value) = lookup("KUBEDISK_LOG_LEVEL") {
            self.log_level = value;
        }
        if let Some(value) = lookup("KUBEDISK_PRETTY") {
            self.pretty = matches!(value.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes");
        }
        if let Some(value) = lookup("CURRENT_POD_UID") {
            self.current_pod_uid = Some(value);
        }
        if let Some(value) = lookup("CURRENT_POD_NAME") {
            self.current_pod_name = Some(value);
        }
        if let Some(value) = lookup("CURRENT_POD_NAMESPACE") {
            self.current_pod_namespace = Some(value);
        }

        Ok(())
    }

    /// Per-container walk limit; zero means unbounded
    pub fn walk_timeout(&self) -> Option<Duration> {
        self.walk_timeout_secs
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
    }

    pub fn current_pod_uid(&self) -> Option<&str> {
        self.current_pod_uid.as_deref().filter(|uid| !uid.is_empty())
    }

    /// The collector's own pod by name, when both name and namespace are known
    pub fn current_pod(&self) -> Option<PodRef> {
        match (
            self.current_pod_name.as_deref().filter(|s| !s.is_empty()),
            self.current_pod_namespace.as_deref().filter(|s| !s.is_empty()),
        ) {
            (Some(name), Some(namespace)) => Some(PodRef::new(name, namespace)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use tempfile::TempDir;

    use super::*;

    fn load(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::load_with(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[]).unwrap();
        assert_eq!(config.backend, BackendKind::Process);
        assert_eq!(config.proc_path, PathBuf::from("/proc"));
        assert_eq!(config.root_path, PathBuf::from("/"));
        assert_eq!(config.rootfs_suffix, "/rootfs");
        assert_eq!(config.walk_timeout(), None);
        assert_eq!(config.current_pod_uid(), None);
        assert_eq!(config.current_pod(), None);
        assert!(!config.pretty);
    }

    #[test]
    fn test_env_overrides() {
        let config = load(&[
            ("KUBEDISK_BACKEND", "Mount"),
            ("KUBEDISK_PROC_PATH", "/host/proc"),
            ("KUBEDISK_WALK_TIMEOUT", "30"),
            ("KUBEDISK_PRETTY", "true"),
            ("CURRENT_POD_UID", "1234-abcd"),
            ("CURRENT_POD_NAME", "kubedisk-x"),
            ("CURRENT_POD_NAMESPACE", "monitoring"),
        ])
        .unwrap();

        assert_eq!(config.backend, BackendKind::Mount);
        assert_eq!(config.proc_path, PathBuf::from("/host/proc"));
        assert_eq!(config.walk_timeout(), Some(Duration::from_secs(30)));
        assert!(config.pretty);
        assert_eq!(config.current_pod_uid(), Some("1234-abcd"));
        assert_eq!(config.current_pod(), Some(PodRef::new("kubedisk-x", "monitoring")));
    }

    #[test]
    fn test_empty_env_values_are_unset() {
        let config = load(&[("CURRENT_POD_UID", ""), ("KUBEDISK_BACKEND", "  ")]).unwrap();
        assert_eq!(config.current_pod_uid(), None);
        assert_eq!(config.backend, BackendKind::Process);
    }

    #[test]
    fn test_pod_name_without_namespace_excludes_nothing() {
        let config = load(&[("CURRENT_POD_NAME", "kubedisk-x")]).unwrap();
        assert_eq!(config.current_pod(), None);
    }

    #[test]
    fn test_zero_timeout_is_unbounded() {
        let config = load(&[("KUBEDISK_WALK_TIMEOUT", "0")]).unwrap();
        assert_eq!(config.walk_timeout(), None);
    }

    #[test]
    fn test_invalid_values() {
        assert!(matches!(
            load(&[("KUBEDISK_BACKEND", "docker")]),
            Err(ConfigError::Invalid { key: "KUBEDISK_BACKEND", .. })
        ));
        assert!(matches!(
            load(&[("KUBEDISK_WALK_TIMEOUT", "soon")]),
            Err(ConfigError::Invalid { key: "KUBEDISK_WALK_TIMEOUT", .. })
        ));
    }

    #[test]
    fn test_file_then_env() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("kubedisk.toml");
        fs::write(
            &path,
            "backend = \"mount\"\nrootfs_suffix = \"/rootfs\"\nwalk_timeout_secs = 120\nlog_level = \"debug\"\n",
        )
        .unwrap();
        let path = path.display().to_string();

        let config = load(&[(CONFIG_FILE_ENV, path.as_str()), ("KUBEDISK_LOG_LEVEL", "warn")]).unwrap();

        assert_eq!(config.backend, BackendKind::Mount);
        assert_eq!(config.walk_timeout(), Some(Duration::from_secs(120)));
        assert_eq!(config.log_level, "warn");
        assert_eq!(config.proc_path, PathBuf::from("/proc"));
    }

    #[test]
    fn test_file_errors() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bad.toml");
        fs::write(&path, "no_such_key = 1\n").unwrap();

        assert!(matches!(Config::from_file(&path), Err(ConfigError::Parse { .. })));
        assert!(matches!(
            Config::from_file(&dir.path().join("missing.toml")),
            Err(ConfigError::Read { .. })
        ));
    }
}
