//! PMGR MMIO regions
//!
//! The PMGR node's `reg` property lists its MMIO regions. Power-state and
//! config-register addresses are offsets from one of these, chosen by a small
//! region selector.

use crate::error::{PmgrError, Result};
use serde::Deserialize;

/// One MMIO region (already translated to a physical address)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct Region {
    /// Physical base address
    pub base: u64,
    /// Size in bytes
    pub size: u64,
}

impl Region {
    /// Create a region
    pub const fn new(base: u64, size: u64) -> Self {
        Self { base, size }
    }

    /// Whether `addr` falls inside this region
    pub const fn contains(&self, addr: u64) -> bool {
        addr >= self.base && addr - self.base < self.size
    }
}

/// Maps a region selector to its MMIO region
pub trait RegionResolver {
    /// Resolve a region selector
    ///
    /// # Errors
    ///
    /// Returns `PmgrError::RegionNotFound` for an unknown selector.
    fn region(&self, selector: u32) -> Result<Region>;

    /// Base address of a region
    ///
    /// # Errors
    ///
    /// Returns `PmgrError::RegionNotFound` for an unknown selector.
    fn region_base(&self, selector: u32) -> Result<u64> {
        self.region(selector).map(|r| r.base)
    }
}

/// Region list taken from the PMGR node, indexed by selector
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegionTable {
    regions: Vec<Region>,
}

impl RegionTable {
    /// Create a table from the node's `reg` list
    pub fn new(regions: Vec<Region>) -> Self {
        Self { regions }
    }

    /// Regions in selector order
    pub fn regions(&self) -> &[Region] {
        &self.regions
    }
}

impl RegionResolver for RegionTable {
    fn region(&self, selector: u32) -> Result<Region> {
        self.regions
            .get(selector as usize)
            .copied()
            .ok_or(PmgrError::RegionNotFound {
                selector,
                count: self.regions.len(),
            })
    }
}
