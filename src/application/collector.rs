use std::path::{Path, PathBuf};
use std::sync::Arc;

use indexmap::IndexMap;
use tracing::info;

use crate::config::Config;
use crate::domain::{DiskStats, PodRef, PodScoped, Report, Warning};
use crate::error::CollectError;
use crate::ports::FilesystemStatsSource;

use super::aggregation::group_by_pod;
use super::discovery::{DiscoveryBackend, MountDiscovery, ProcessDiscovery};

/// Discovery strategy used for a run; results of the two are never merged
pub enum Backend {
    Process(ProcessDiscovery),
    Mount(MountDiscovery),
}

/// Identity of the pod the collector runs in, per backend identity space
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelfExclusion {
    pub pod_uid: Option<String>,
    pub pod: Option<PodRef>,
}

impl SelfExclusion {
    pub fn from_config(config: &Config) -> Self {
        Self {
            pod_uid: config.current_pod_uid().map(str::to_string),
            pod: config.current_pod(),
        }
    }
}

/// Runs one full collection: node stats, discovery, aggregation, report
pub struct CollectorService {
    stats_source: Arc<dyn FilesystemStatsSource>,
    root_path: PathBuf,
    backend: Backend,
    exclusion: SelfExclusion,
}

impl CollectorService {
    pub fn new(
        stats_source: Arc<dyn FilesystemStatsSource>,
        root_path: impl Into<PathBuf>,
        backend: Backend,
        exclusion: SelfExclusion,
    ) -> Self {
        Self {
            stats_source,
            root_path: root_path.into(),
            backend,
            exclusion,
        }
    }

    pub async fn collect(&self) -> Result<Report, CollectError> {
        let disk_stats = node_disk_stats(self.stats_source.as_ref(), &self.root_path).await?;

        let report = match &self.backend {
            Backend::Process(discovery) => {
                let (pods, warnings) = collect_pods(discovery, self.exclusion.pod_uid.as_ref()).await?;
                Report::by_pod_uid(disk_stats, pods, warnings)
            }
            Backend::Mount(discovery) => {
                let (pods, warnings) = collect_pods(discovery, self.exclusion.pod.as_ref()).await?;
                Report::by_pod_name(disk_stats, pods, warnings)
            }
        };

        info!(
            used_percent = report.disk_stats.usage_percent(),
            pods = report.pod_count(),
            containers = report.container_count(),
            warnings = report.warnings().len(),
            "collection finished"
        );

        Ok(report)
    }
}

/// Root filesystem capacity
pub async fn node_disk_stats(
    source: &dyn FilesystemStatsSource,
    path: &Path,
) -> Result<DiskStats, CollectError> {
    let stats = source
        .block_stats(path)
        .await
        .map_err(CollectError::NodeStats)?;

    Ok(DiskStats::from_blocks(
        stats.blocks,
        stats.fragment_size,
        stats.blocks_free,
    ))
}

type PodGroups<T> = IndexMap<<T as PodScoped>::Pod, Vec<T>>;

async fn collect_pods<B: DiscoveryBackend>(
    backend: &B,
    current_pod: Option<&<B::Record as PodScoped>::Pod>,
) -> Result<(PodGroups<B::Record>, Vec<Warning>), CollectError> {
    let outcome = backend.discover().await?;
    Ok((group_by_pod(outcome.records, current_pod), outcome.warnings))
}
