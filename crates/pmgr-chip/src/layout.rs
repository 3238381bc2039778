//! Config-register base layouts.
//!
//! Clock, power-domain and event control registers live in one of four
//! control blocks. Each block starts at a fixed offset inside one of the
//! PMGR node's MMIO regions. The mapping is chip-generation specific and is
//! not described anywhere in the firmware hardware description, so it has to
//! be supplied from outside.
//!
//! ```text
//! block  region  offset     note
//! ─────  ──────  ─────────  ──────────────
//!   0      1     0x34100    unverified
//!   1      0     0x34100
//!   2      0     0x7c100
//!   3      0     0x78100
//! ```
//! (reference layout)

use crate::regs::CTL_BLOCK_COUNT;
use std::fmt;
use std::str::FromStr;

/// Location of one control block: PMGR region selector plus byte offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BlockBase {
    /// Index into the PMGR node's `reg` list.
    pub region: u32,
    /// Byte offset from the region base.
    pub offset: u64,
}

impl BlockBase {
    /// Create a block base.
    #[must_use]
    pub const fn new(region: u32, offset: u64) -> Self {
        Self { region, offset }
    }
}

impl fmt::Display for BlockBase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{:#x}", self.region, self.offset)
    }
}

/// Per-variant config-register base layout, one entry per control block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConfigLayout {
    /// Block bases indexed by `ctl_block`.
    pub blocks: [BlockBase; CTL_BLOCK_COUNT],
}

impl ConfigLayout {
    /// Layout observed on the reference chip generation.
    pub const REFERENCE: Self = Self {
        blocks: [
            BlockBase::new(1, 0x34100), // unverified
            BlockBase::new(0, 0x34100),
            BlockBase::new(0, 0x7c100),
            BlockBase::new(0, 0x78100),
        ],
    };

    /// Block base for `ctl_block`, or `None` outside the table.
    #[must_use]
    pub fn block(&self, ctl_block: u32) -> Option<BlockBase> {
        self.blocks.get(ctl_block as usize).copied()
    }
}

impl Default for ConfigLayout {
    fn default() -> Self {
        Self::REFERENCE
    }
}

impl fmt::Display for ConfigLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, block) in self.blocks.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{block}")?;
        }
        Ok(())
    }
}

/// Error parsing a [`ConfigLayout`] from text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayoutParseError {
    reason: String,
}

impl LayoutParseError {
    fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

impl fmt::Display for LayoutParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid config layout: {}", self.reason)
    }
}

impl std::error::Error for LayoutParseError {}

fn parse_number(text: &str) -> Result<u64, LayoutParseError> {
    let text = text.trim();
    let parsed = match text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        Some(hex) => u64::from_str_radix(hex, 16),
        None => text.parse(),
    };
    parsed.map_err(|e| LayoutParseError::new(format!("bad number {text:?}: {e}")))
}

impl FromStr for BlockBase {
    type Err = LayoutParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (region, offset) = s
            .split_once(':')
            .ok_or_else(|| LayoutParseError::new(format!("expected region:offset, got {s:?}")))?;
        let region = u32::try_from(parse_number(region)?)
            .map_err(|_| LayoutParseError::new(format!("region selector {region:?} too large")))?;
        Ok(Self::new(region, parse_number(offset)?))
    }
}

/// Parses `"region:offset,region:offset,region:offset,region:offset"`.
impl FromStr for ConfigLayout {
    type Err = LayoutParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(',').collect();
        if parts.len() != CTL_BLOCK_COUNT {
            return Err(LayoutParseError::new(format!(
                "expected {CTL_BLOCK_COUNT} blocks, got {}",
                parts.len()
            )));
        }

        let mut blocks = [BlockBase::new(0, 0); CTL_BLOCK_COUNT];
        for (slot, part) in blocks.iter_mut().zip(parts) {
            *slot = part.parse()?;
        }
        Ok(Self { blocks })
    }
}
