use std::hash::Hash;

use serde::{Deserialize, Serialize};

/// Pod identity as read from CRI annotations
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PodRef {
    pub name: String,
    pub namespace: String,
}

impl PodRef {
    pub fn new(name: impl Into<String>, namespace: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: namespace.into(),
        }
    }
}

impl std::fmt::Display for PodRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.namespace, self.name)
    }
}

/// Anything that belongs to exactly one pod
pub trait PodScoped {
    type Pod: Clone + Eq + Hash;

    fn pod(&self) -> &Self::Pod;
}
