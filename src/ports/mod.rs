pub mod mount_source;
pub mod process_source;
pub mod size_estimator;
pub mod system_source;

pub use mount_source::{MountInfo, MountSource};
pub use process_source::ProcessSource;
pub use size_estimator::SizeEstimator;
pub use system_source::{BlockStats, FilesystemStatsSource};
