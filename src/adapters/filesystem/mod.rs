mod size;

pub use size::WalkdirSizeEstimator;
