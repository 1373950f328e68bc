//! Mapping from OS-level state to container runtime identity.
//!
//! Two strategies live here. The process strategy matches a process's cgroup
//! descriptor against known runtime path conventions. The mount strategy reads
//! the CRI annotations from the OCI config next to a container's rootfs.

use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use serde::Deserialize;
use tracing::trace;

use crate::domain::{ContainerId, ContainerKind, PartialIdentity, PodRef};
use crate::error::AttributionError;
use crate::ports::ProcessSource;

/// argv of the infrastructure container that holds a pod's namespaces
const PAUSE_ARGV: &[&str] = &["/pause"];

const CONTAINER_TYPE_ANNOTATION: &str = "io.kubernetes.cri.container-type";
const CONTAINER_NAME_ANNOTATION: &str = "io.kubernetes.cri.container-name";
const POD_NAME_ANNOTATION: &str = "io.kubernetes.cri.sandbox-name";
const POD_NAMESPACE_ANNOTATION: &str = "io.kubernetes.cri.sandbox-namespace";

/// A known cgroup path convention. Every pattern captures `pod` and `container`.
struct CgroupPattern {
    runtime: &'static str,
    regex: Regex,
}

/// Evaluated in order, first match wins. New formats go at the end.
static CGROUP_PATTERNS: LazyLock<Vec<CgroupPattern>> = LazyLock::new(|| {
    [
        (
            "kubepods-cgroupfs",
            r"^\d+:[^:]*:/kubepods/[^/]+/pod(?P<pod>[^/]+)/(?P<container>[0-9a-f]{64})",
        ),
        (
            "docker-cgroupfs",
            r"^\d+:[^:]*:/docker/pod(?P<pod>[^/]+)/(?P<container>[0-9a-f]{64})",
        ),
        (
            "docker-nested",
            r"^\d+:[^:]*:/docker/.*/pod(?P<pod>[^/]+)/(?P<container>[0-9a-f]{64})",
        ),
        (
            "kubepods-nested",
            r"^\d+:[^:]*:/kubepods/.*/pod(?P<pod>[^/]+)/(?P<container>[0-9a-f]{64})",
        ),
        (
            "systemd-docker",
            r"^\d+:[^:]*:/kubepods\.slice/kubepods-[^/]+\.slice/kubepods-[^/]+-pod(?P<pod>[^/]+)\.slice/docker-(?P<container>[0-9a-f]{64})",
        ),
        (
            "kubepods-guaranteed",
            r"^\d+:[^:]*:/kubepods/pod(?P<pod>[^/]+)/(?P<container>[0-9a-f]{64})",
        ),
        (
            "systemd-containerd",
            r"^\d+:[^:]*:/kubepods\.slice/(?:kubepods-[^/]+\.slice/)?kubepods-(?:[^/]+-)?pod(?P<pod>[^/]+)\.slice/cri-containerd-(?P<container>[0-9a-f]{64})\.scope",
        ),
        (
            "systemd-crio",
            r"^\d+:[^:]*:/kubepods\.slice/(?:kubepods-[^/]+\.slice/)?kubepods-(?:[^/]+-)?pod(?P<pod>[^/]+)\.slice/crio-(?P<container>[0-9a-f]{64})\.scope",
        ),
    ]
    .into_iter()
    .map(|(runtime, pattern)| CgroupPattern {
        runtime,
        regex: Regex::new(pattern).expect("cgroup patterns are valid"),
    })
    .collect()
});

/// Identity extracted from a cgroup descriptor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CgroupIdentity {
    pub pod_uid: String,
    pub container_id: ContainerId,
    pub runtime: &'static str,
}

/// Match a cgroup descriptor line by line; `None` if no line is a known container path.
pub fn match_cgroup(content: &str) -> Option<CgroupIdentity> {
    content.lines().find_map(|line| {
        CGROUP_PATTERNS.iter().find_map(|pattern| {
            let caps = pattern.regex.captures(line)?;
            Some(CgroupIdentity {
                // systemd slice names encode dashes in the pod UID as underscores
                pod_uid: caps["pod"].replace('_', "-"),
                container_id: ContainerId::new(&caps["container"]),
                runtime: pattern.runtime,
            })
        })
    })
}

/// True when a raw NUL-separated command line is exactly the pause invocation.
pub fn is_pause_cmdline(raw: &[u8]) -> bool {
    raw.split(|b| *b == 0)
        .filter(|arg| !arg.is_empty())
        .eq(PAUSE_ARGV.iter().map(|arg| arg.as_bytes()))
}

/// Identity of a container process
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessIdentity {
    pub pod_uid: String,
    /// Runtime-assigned id, even for pause containers
    pub container_id: ContainerId,
    pub is_pause: bool,
}

impl ProcessIdentity {
    /// Id to report. Runtime APIs cannot describe a pause container by its real id.
    pub fn reported_id(&self) -> ContainerId {
        if self.is_pause {
            ContainerId::pause()
        } else {
            self.container_id.clone()
        }
    }
}

/// Resolve the container a process belongs to.
///
/// Returns `Ok(None)` for processes that are not in a recognized container,
/// including ones that exited before their cgroup or command line could be read. Identifiers are
/// written to `partial` as soon as they are known so a later failure can report them.
pub async fn resolve_process(
    source: &dyn ProcessSource,
    pid: u32,
    partial: &mut PartialIdentity,
) -> Result<Option<ProcessIdentity>, AttributionError> {
    let cgroup = match source.read_cgroup(pid).await {
        Ok(Some(content)) => content,
        Ok(None) => return Ok(None),
        Err(err) if err.is_vanished_process() => return Ok(None),
        Err(err) => return Err(err.into()),
    };

    let Some(matched) = match_cgroup(&cgroup) else {
        return Ok(None);
    };
    trace!(pid, runtime = matched.runtime, "matched container cgroup");
    partial.pod_uid = Some(matched.pod_uid.clone());
    partial.container_id = Some(matched.container_id.to_string());

    let cmdline = match source.read_cmdline(pid).await {
        Ok(cmdline) => cmdline,
        Err(err) if err.is_vanished_process() => return Ok(None),
        Err(err) => return Err(err.into()),
    };

    Ok(Some(ProcessIdentity {
        pod_uid: matched.pod_uid,
        container_id: matched.container_id,
        is_pause: is_pause_cmdline(&cmdline),
    }))
}

#[derive(Debug, Deserialize)]
struct RuntimeSpec {
    #[serde(default)]
    annotations: HashMap<String, String>,
}

/// Identity of a container read from its runtime state directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeIdentity {
    pub id: ContainerId,
    pub kind: ContainerKind,
    pub name: Option<String>,
    pub pod: PodRef,
}

/// Extract identity from the OCI config of a CRI-managed container.
pub fn parse_runtime_config(id: ContainerId, json: &str) -> Result<RuntimeIdentity, AttributionError> {
    let spec: RuntimeSpec = serde_json::from_str(json)?;
    let required = |key: &'static str| {
        spec.annotations
            .get(key)
            .cloned()
            .ok_or(AttributionError::MissingAnnotation(key))
    };

    let kind = ContainerKind::from_annotation(&required(CONTAINER_TYPE_ANNOTATION)?);
    let pod = PodRef::new(required(POD_NAME_ANNOTATION)?, required(POD_NAMESPACE_ANNOTATION)?);

    Ok(RuntimeIdentity {
        id,
        kind,
        name: spec.annotations.get(CONTAINER_NAME_ANNOTATION).cloned(),
        pod,
    })
}

/// Resolve the container whose state directory is `container_dir`.
///
/// The directory's basename is the container id; its `config.json` holds the annotations.
pub fn resolve_container_dir(container_dir: &Path) -> Result<RuntimeIdentity, AttributionError> {
    let id = container_dir
        .file_name()
        .map(|name| ContainerId::new(name.to_string_lossy()))
        .unwrap_or_else(|| ContainerId::new(container_dir.display().to_string()));

    let json = fs::read_to_string(container_dir.join("config.json"))?;
    parse_runtime_config(id, &json)
}
