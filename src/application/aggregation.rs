use indexmap::IndexMap;
use tracing::debug;

use crate::domain::PodScoped;

/// Group records by pod, dropping the pod the collector itself runs in.
///
/// Pods come out in first-seen order and containers keep their discovery order
/// within each pod.
pub fn group_by_pod<T: PodScoped>(
    records: impl IntoIterator<Item = T>,
    current_pod: Option<&T::Pod>,
) -> IndexMap<T::Pod, Vec<T>> {
    let mut pods: IndexMap<T::Pod, Vec<T>> = IndexMap::new();
    let mut excluded = 0usize;

    for record in records {
        if current_pod.is_some_and(|own| record.pod() == own) {
            excluded += 1;
            continue;
        }
        pods.entry(record.pod().clone()).or_default().push(record);
    }

    if excluded > 0 {
        debug!("excluded {} containers of the current pod", excluded);
    }

    pods
}
