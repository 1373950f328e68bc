use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::domain::{
    ContainerDiskInfo, ContainerId, PartialIdentity, PodScoped, RuntimeContainer, Warning,
};
use crate::error::{AttributionError, CollectError};
use crate::ports::{MountSource, ProcessSource, SizeEstimator};

use super::identity;

/// Top-level names under a process root that lead back into the host or procfs
pub const PROCESS_ROOT_EXCLUDES: [&str; 2] = ["proc", "host"];

/// Successful records and warnings of one discovery pass, both in discovery order
#[derive(Debug)]
pub struct DiscoveryOutcome<T> {
    pub records: Vec<T>,
    pub warnings: Vec<Warning>,
}

impl<T> Default for DiscoveryOutcome<T> {
    fn default() -> Self {
        Self {
            records: Vec::new(),
            warnings: Vec::new(),
        }
    }
}

impl<T> DiscoveryOutcome<T> {
    fn record(&mut self, candidate: Candidate<T>) {
        match candidate {
            Candidate::Attributed(record) => self.records.push(record),
            Candidate::Skipped => {}
            Candidate::Failed(warning) => self.warnings.push(warning),
        }
    }
}

/// Result of processing a single candidate
#[derive(Debug)]
enum Candidate<T> {
    Attributed(T),
    /// Not a container, or a container already attributed
    Skipped,
    Failed(Warning),
}

/// Enumerates the containers on the node and sizes each one
#[async_trait]
pub trait DiscoveryBackend: Send + Sync {
    type Record: PodScoped + Send;

    /// Fails only if candidates cannot be enumerated at all.
    async fn discover(&self) -> Result<DiscoveryOutcome<Self::Record>, CollectError>;
}

/// Discovery through the process table and per-process cgroups
pub struct ProcessDiscovery {
    source: Arc<dyn ProcessSource>,
    estimator: Arc<dyn SizeEstimator>,
}

impl ProcessDiscovery {
    pub fn new(source: Arc<dyn ProcessSource>, estimator: Arc<dyn SizeEstimator>) -> Self {
        Self { source, estimator }
    }

    async fn attribute(&self, pid: u32, seen: &mut HashSet<ContainerId>) -> Candidate<ContainerDiskInfo> {
        let mut partial = PartialIdentity::default();

        match self.try_attribute(pid, seen, &mut partial).await {
            Ok(Some(info)) => Candidate::Attributed(info),
            Ok(None) => Candidate::Skipped,
            Err(err) => {
                warn!(pid, pod_uid = ?partial.pod_uid, container_id = ?partial.container_id, "attribution failed: {}", err);
                Candidate::Failed(Warning::for_process(pid, &partial, &err))
            }
        }
    }

    async fn try_attribute(
        &self,
        pid: u32,
        seen: &mut HashSet<ContainerId>,
        partial: &mut PartialIdentity,
    ) -> Result<Option<ContainerDiskInfo>, AttributionError> {
        let Some(identity) = identity::resolve_process(self.source.as_ref(), pid, partial).await? else {
            return Ok(None);
        };

        // Dedup on the runtime id so distinct pause containers stay distinct
        if seen.contains(&identity.container_id) {
            return Ok(None);
        }

        let root = self.source.root_path(pid);
        let disk_size = self.estimator.estimate(&root, &PROCESS_ROOT_EXCLUDES).await?;
        seen.insert(identity.container_id.clone());

        debug!(
            pid,
            pod_uid = %identity.pod_uid,
            container_id = %identity.container_id,
            disk_size,
            "attributed container"
        );

        Ok(Some(ContainerDiskInfo::new(
            identity.reported_id(),
            identity.pod_uid,
            disk_size,
        )))
    }
}

#[async_trait]
impl DiscoveryBackend for ProcessDiscovery {
    type Record = ContainerDiskInfo;

    async fn discover(&self) -> Result<DiscoveryOutcome<ContainerDiskInfo>, CollectError> {
        let pids = self
            .source
            .list_pids()
            .await
            .map_err(CollectError::Enumeration)?;
        debug!("scanning {} processes", pids.len());

        let mut seen = HashSet::new();
        let mut outcome = DiscoveryOutcome::default();
        for pid in pids {
            let candidate = self.attribute(pid, &mut seen).await;
            outcome.record(candidate);
        }

        Ok(outcome)
    }
}

/// Discovery through container rootfs mounts and runtime state directories
pub struct MountDiscovery {
    mounts: Arc<dyn MountSource>,
    estimator: Arc<dyn SizeEstimator>,
    rootfs_suffix: String,
}

impl MountDiscovery {
    pub fn new(
        mounts: Arc<dyn MountSource>,
        estimator: Arc<dyn SizeEstimator>,
        rootfs_suffix: impl Into<String>,
    ) -> Self {
        Self {
            mounts,
            estimator,
            rootfs_suffix: rootfs_suffix.into(),
        }
    }

    async fn attribute(&self, rootfs: &Path, seen: &mut HashSet<ContainerId>) -> Candidate<RuntimeContainer> {
        let container_dir = rootfs.parent().unwrap_or(rootfs);

        match self.try_attribute(container_dir, rootfs, seen).await {
            Ok(Some(container)) => Candidate::Attributed(container),
            Ok(None) => Candidate::Skipped,
            Err(err) => {
                warn!(container_dir = %container_dir.display(), "attribution failed: {}", err);
                Candidate::Failed(Warning::for_container_dir(container_dir, &err))
            }
        }
    }

    async fn try_attribute(
        &self,
        container_dir: &Path,
        rootfs: &Path,
        seen: &mut HashSet<ContainerId>,
    ) -> Result<Option<RuntimeContainer>, AttributionError> {
        let identity = identity::resolve_container_dir(container_dir)?;
        if seen.contains(&identity.id) {
            return Ok(None);
        }

        let disk_size = self.estimator.estimate(rootfs, &[]).await?;
        seen.insert(identity.id.clone());

        let container = RuntimeContainer {
            id: identity.id,
            kind: identity.kind,
            name: identity.name,
            pod: identity.pod,
            disk_size,
        };
        debug!(
            pod = %container.pod,
            container_id = %container.id,
            disk_size,
            "attributed container"
        );

        Ok(Some(container))
    }
}

#[async_trait]
impl DiscoveryBackend for MountDiscovery {
    type Record = RuntimeContainer;

    async fn discover(&self) -> Result<DiscoveryOutcome<RuntimeContainer>, CollectError> {
        let mounts = self
            .mounts
            .list_mounts()
            .await
            .map_err(CollectError::Enumeration)?;

        let rootfs_mounts: Vec<PathBuf> = mounts
            .into_iter()
            .filter(|m| m.mount_point.ends_with(&self.rootfs_suffix))
            .map(|m| PathBuf::from(m.mount_point))
            .collect();
        debug!("scanning {} rootfs mounts", rootfs_mounts.len());

        let mut seen = HashSet::new();
        let mut outcome = DiscoveryOutcome::default();
        for rootfs in &rootfs_mounts {
            let candidate = self.attribute(rootfs, &mut seen).await;
            outcome.record(candidate);
        }

        Ok(outcome)
    }
}
