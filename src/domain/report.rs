use indexmap::IndexMap;
use serde::Serialize;

use super::{ContainerDiskInfo, ContainerId, DiskStats, PodRef, RuntimeContainer, Warning};

/// Final artifact of a collection run
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub disk_stats: DiskStats,
    #[serde(flatten)]
    pub pods: PodsSection,
}

/// Per-pod breakdown, keyed on the wire by the backend that produced it
#[derive(Debug, Clone, Serialize)]
pub enum PodsSection {
    #[serde(rename = "pods_disk_info")]
    ByUid(PodsDistribution<PodUidEntry>),
    #[serde(rename = "pods_disk_distribution")]
    ByName(PodsDistribution<PodNameEntry>),
}

#[derive(Debug, Clone, Serialize)]
pub struct PodsDistribution<E> {
    pub pods_distribution: Vec<E>,
    pub warnings: Vec<Warning>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PodUidEntry {
    pub pod_uid: String,
    pub containers: Vec<ContainerEntry>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ContainerEntry {
    pub container_id: ContainerId,
    pub disk_size: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct PodNameEntry {
    pub pod_namespace: String,
    pub pod_name: String,
    pub containers: Vec<NamedContainerEntry>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NamedContainerEntry {
    pub container_name: Option<String>,
    pub disk_size: u64,
}

impl Report {
    /// Compose a report from process-backend results.
    pub fn by_pod_uid(
        disk_stats: DiskStats,
        pods: IndexMap<String, Vec<ContainerDiskInfo>>,
        warnings: Vec<Warning>,
    ) -> Self {
        let pods_distribution = pods
            .into_iter()
            .map(|(pod_uid, containers)| PodUidEntry {
                pod_uid,
                containers: containers
                    .into_iter()
                    .map(|c| ContainerEntry {
                        container_id: c.container_id,
                        disk_size: c.disk_size,
                    })
                    .collect(),
            })
            .collect();

        Self {
            disk_stats,
            pods: PodsSection::ByUid(PodsDistribution {
                pods_distribution,
                warnings,
            }),
        }
    }

    /// Compose a report from mount-backend results.
    pub fn by_pod_name(
        disk_stats: DiskStats,
        pods: IndexMap<PodRef, Vec<RuntimeContainer>>,
        warnings: Vec<Warning>,
    ) -> Self {
        let pods_distribution = pods
            .into_iter()
            .map(|(pod, containers)| PodNameEntry {
                pod_namespace: pod.namespace,
                pod_name: pod.name,
                containers: containers
                    .iter()
                    .map(|c| NamedContainerEntry {
                        container_name: c.display_name().map(str::to_string),
                        disk_size: c.disk_size,
                    })
                    .collect(),
            })
            .collect();

        Self {
            disk_stats,
            pods: PodsSection::ByName(PodsDistribution {
                pods_distribution,
                warnings,
            }),
        }
    }

    pub fn pod_count(&self) -> usize {
        match &self.pods {
            PodsSection::ByUid(d) => d.pods_distribution.len(),
            PodsSection::ByName(d) => d.pods_distribution.len(),
        }
    }

    pub fn container_count(&self) -> usize {
        match &self.pods {
            PodsSection::ByUid(d) => d.pods_distribution.iter().map(|p| p.containers.len()).sum(),
            PodsSection::ByName(d) => d.pods_distribution.iter().map(|p| p.containers.len()).sum(),
        }
    }

    pub fn warnings(&self) -> &[Warning] {
        match &self.pods {
            PodsSection::ByUid(d) => &d.warnings,
            PodsSection::ByName(d) => &d.warnings,
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::domain::{ContainerKind, PartialIdentity};

    #[test]
    fn test_pod_uid_report_shape() {
        let mut pods = IndexMap::new();
        pods.insert(
            "abc-def".to_string(),
            vec![ContainerDiskInfo::new(ContainerId::new("c1"), "abc-def", 10)],
        );
        let warning = Warning::for_process(9, &PartialIdentity::default(), &"boom");

        let report = Report::by_pod_uid(DiskStats::from_blocks(10, 100, 4), pods, vec![warning]);

        assert_eq!(
            serde_json::to_value(&report).unwrap(),
            json!({
                "disk_stats": {"total": 1000, "used": 600, "available_to_root": 400},
                "pods_disk_info": {
                    "pods_distribution": [
                        {"pod_uid": "abc-def", "containers": [{"container_id": "c1", "disk_size": 10}]}
                    ],
                    "warnings": [
                        "failed to extract information for process id 9 (pod_uid=none, container_id=none): boom"
                    ]
                }
            })
        );
        assert_eq!(report.pod_count(), 1);
        assert_eq!(report.container_count(), 1);
        assert_eq!(report.warnings().len(), 1);
    }

    #[test]
    fn test_pod_name_report_shape() {
        let pod = PodRef::new("web-0", "shop");
        let mut pods = IndexMap::new();
        pods.insert(
            pod.clone(),
            vec![
                RuntimeContainer {
                    id: ContainerId::new("s1"),
                    kind: ContainerKind::Sandbox,
                    name: None,
                    pod: pod.clone(),
                    disk_size: 1,
                },
                RuntimeContainer {
                    id: ContainerId::new("c1"),
                    kind: ContainerKind::Container,
                    name: Some("nginx".to_string()),
                    pod,
                    disk_size: 2,
                },
            ],
        );

        let report = Report::by_pod_name(DiskStats::from_blocks(0, 4096, 0), pods, Vec::new());

        assert_eq!(
            serde_json::to_value(&report).unwrap(),
            json!({
                "disk_stats": {"total": 0, "used": 0, "available_to_root": 0},
                "pods_disk_distribution": {
                    "pods_distribution": [{
                        "pod_namespace": "shop",
                        "pod_name": "web-0",
                        "containers": [
                            {"container_name": "__pause-container__", "disk_size": 1},
                            {"container_name": "nginx", "disk_size": 2}
                        ]
                    }],
                    "warnings": []
                }
            })
        );
        assert_eq!(report.container_count(), 2);
    }

    #[test]
    fn test_empty_report_still_serializes() {
        let report = Report::by_pod_uid(DiskStats::from_blocks(1, 1, 1), IndexMap::new(), Vec::new());
        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["pods_disk_info"]["pods_distribution"], json!([]));
        assert_eq!(report.pod_count(), 0);
    }
}
