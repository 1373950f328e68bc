use std::fmt::Display;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// Identifiers resolved for a candidate before it failed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PartialIdentity {
    pub pod_uid: Option<String>,
    pub container_id: Option<String>,
}

/// Human-readable description of one failed attribution attempt
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Warning(String);

impl Warning {
    pub fn for_process(pid: u32, partial: &PartialIdentity, error: &impl Display) -> Self {
        Self(format!(
            "failed to extract information for process id {} (pod_uid={}, container_id={}): {}",
            pid,
            partial.pod_uid.as_deref().unwrap_or("none"),
            partial.container_id.as_deref().unwrap_or("none"),
            error
        ))
    }

    pub fn for_container_dir(dir: &Path, error: &impl Display) -> Self {
        Self(format!(
            "failed to get container information from {}: {}",
            dir.display(),
            error
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for Warning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_process_warning_without_identity() {
        let warning = Warning::for_process(42, &PartialIdentity::default(), &"permission denied");
        assert_eq!(
            warning.as_str(),
            "failed to extract information for process id 42 (pod_uid=none, container_id=none): permission denied"
        );
    }

    #[test]
    fn test_process_warning_with_partial_identity() {
        let partial = PartialIdentity {
            pod_uid: Some("abc-def".to_string()),
            container_id: None,
        };
        let warning = Warning::for_process(7, &partial, &"gone");
        assert!(warning.as_str().contains("pod_uid=abc-def, container_id=none"));
    }

    #[test]
    fn test_container_dir_warning() {
        let warning = Warning::for_container_dir(Path::new("/run/k8s/abc"), &"bad json");
        assert_eq!(
            warning.to_string(),
            "failed to get container information from /run/k8s/abc: bad json"
        );
    }
}
