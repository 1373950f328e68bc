pub mod aggregation;
pub mod collector;
pub mod discovery;
pub mod identity;

pub use collector::{Backend, CollectorService, SelfExclusion};
pub use discovery::{MountDiscovery, ProcessDiscovery};
