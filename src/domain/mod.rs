pub mod container;
pub mod disk;
pub mod pod;
pub mod report;
pub mod warning;

pub use container::{ContainerDiskInfo, ContainerId, ContainerKind, RuntimeContainer};
pub use disk::DiskStats;
pub use pod::{PodRef, PodScoped};
pub use report::Report;
pub use warning::{PartialIdentity, Warning};
