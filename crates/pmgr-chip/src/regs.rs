//! PMGR register geometry.
//!
//! ```text
//! control register   = config_base[ctl_block] + ctl_idx * CTL_STRIDE
//! power-state reg    = region_base(ps.reg) + ps.offset + psidx * PS_STRIDE
//! ```
//!
//! The config bases come from [`crate::layout`]; the region bases come from
//! the PMGR node's `reg` property.

// ── Strides ──────────────────────────────────────────────────────────────────

/// Stride between consecutive control registers within one control block.
pub const CTL_STRIDE: u64 = 0x10;

/// Stride between consecutive device power-state registers within a PsReg bank.
pub const PS_STRIDE: u64 = 0x8;

/// Number of control blocks addressable by `ctl_block`.
pub const CTL_BLOCK_COUNT: usize = 4;

// ── Ids ──────────────────────────────────────────────────────────────────────

/// Id value meaning "no reference" in parent slots and power-domain fields.
pub const ID_NONE: u32 = 0;

/// Clock ids below this value name fixed clocks.
///
/// Ids at or above it name boot clocks: `BOOT_CLOCK_ID_BASE + n` refers to
/// slot `n` of the I/O root's `clock-frequencies` arrays.
pub const BOOT_CLOCK_ID_BASE: u32 = 256;

// ── Device flag bits ─────────────────────────────────────────────────────────

/// Bit definitions for the 8-bit device `flags` field.
///
/// Only two bits have a known meaning. The rest are rendered by position.
pub mod flags {
    /// Device has its own control register.
    pub const HAS_CTL: u8 = 0x20;
    /// Device has no power-state register.
    pub const NO_PS: u8 = 0x10;

    /// One letter per flag bit, most significant bit first.
    ///
    /// Upper-case letters mark bits with a known meaning.
    pub const LETTERS: [char; 8] = ['a', 'b', 'C', 'd', 'e', 'f', 'g', 'h'];

    /// Render a flag byte as eight columns, MSB first, blank for clear bits.
    #[must_use]
    pub fn render(value: u8) -> String {
        LETTERS
            .iter()
            .enumerate()
            .map(|(i, &c)| if value & (1 << (7 - i)) != 0 { c } else { ' ' })
            .collect()
    }
}
