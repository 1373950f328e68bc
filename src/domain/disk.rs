use serde::{Deserialize, Serialize};

/// Node-wide capacity snapshot of the root filesystem
///
/// `total == used + available_to_root` always holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiskStats {
    pub total: u64,
    pub used: u64,
    pub available_to_root: u64,
}

impl DiskStats {
    /// Build stats from raw statvfs block figures.
    ///
    /// `free_blocks` counts the blocks free to a privileged user (`f_bfree`), so
    /// reserved blocks are reported as available.
    pub fn from_blocks(blocks: u64, fragment_size: u64, free_blocks: u64) -> Self {
        let total = blocks.saturating_mul(fragment_size);
        // A filesystem mid-resize can briefly report more free than total blocks.
        let available_to_root = free_blocks.min(blocks).saturating_mul(fragment_size);

        Self {
            total,
            used: total - available_to_root,
            available_to_root,
        }
    }

    pub fn usage_percent(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        (self.used as f64 / self.total as f64) * 100.0
    }
}
