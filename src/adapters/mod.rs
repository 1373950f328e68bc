pub mod filesystem;
pub mod procfs;

pub use filesystem::WalkdirSizeEstimator;
pub use procfs::{ProcfsAdapter, ProcfsConfig};
