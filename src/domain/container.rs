use serde::{Deserialize, Serialize};

use super::{PodRef, PodScoped};

/// Id reported for pause containers in the process backend
pub const PAUSE_CONTAINER_ID: &str = "pause-container";

/// Name reported for sandbox containers in the mount backend
pub const PAUSE_CONTAINER_NAME: &str = "__pause-container__";

/// Unique identifier for a container
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContainerId(String);

impl ContainerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn pause() -> Self {
        Self::new(PAUSE_CONTAINER_ID)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ContainerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A container attributed to a pod by its process cgroup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerDiskInfo {
    pub container_id: ContainerId,
    pub pod_uid: String,
    pub disk_size: u64,
}

impl ContainerDiskInfo {
    pub fn new(container_id: ContainerId, pod_uid: impl Into<String>, disk_size: u64) -> Self {
        Self {
            container_id,
            pod_uid: pod_uid.into(),
            disk_size,
        }
    }
}

impl PodScoped for ContainerDiskInfo {
    type Pod = String;

    fn pod(&self) -> &String {
        &self.pod_uid
    }
}

/// Container type as annotated by the CRI runtime
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContainerKind {
    Sandbox,
    Container,
}

impl ContainerKind {
    pub fn from_annotation(value: &str) -> Self {
        match value {
            "sandbox" => Self::Sandbox,
            _ => Self::Container,
        }
    }

    pub fn is_sandbox(&self) -> bool {
        matches!(self, Self::Sandbox)
    }
}

/// A container read from its runtime state directory (mount backend)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeContainer {
    pub id: ContainerId,
    pub kind: ContainerKind,
    pub name: Option<String>,
    pub pod: PodRef,
    pub disk_size: u64,
}

impl RuntimeContainer {
    /// Name used in reports; sandboxes have no meaningful name of their own.
    pub fn display_name(&self) -> Option<&str> {
        if self.kind.is_sandbox() {
            Some(PAUSE_CONTAINER_NAME)
        } else {
            self.name.as_deref()
        }
    }
}

impl PodScoped for RuntimeContainer {
    type Pod = PodRef;

    fn pod(&self) -> &PodRef {
        &self.pod
    }
}
