//! Boot clock descriptor encoding.
//!
//! Each slot of the I/O root's `clock-frequencies-regs` array is a 64-bit
//! word. The top byte selects how the frequency is derived; the low 56 bits
//! are the tag-specific payload.
//!
//! ```text
//!  63      56 55                                                0
//! ┌──────────┬───────────────────────────────────────────────────┐
//! │   tag    │ payload (constant or register address)            │
//! └──────────┴───────────────────────────────────────────────────┘
//! ```

/// Bit position of the source-type tag.
pub const TAG_SHIFT: u32 = 56;

/// Mask selecting the 56-bit payload.
pub const PAYLOAD_MASK: u64 = (1 << TAG_SHIFT) - 1;

/// Source-type tag values.
pub mod tag {
    /// Payload is the frequency itself.
    pub const FIXED: u8 = 0x9c;
    /// Payload is a register address, read once (meaning unverified).
    pub const REG_A0: u8 = 0xa0;
    /// Payload is a register address, read once (meaning unverified).
    pub const REG_A1: u8 = 0xa1;
    /// Payload is a register address, read once (meaning unverified).
    pub const REG_A4: u8 = 0xa4;
    /// Payload is a register address, read once (meaning unverified).
    pub const REG_A5: u8 = 0xa5;
    /// Payload is the base of an NCO register block.
    pub const NCO: u8 = 0xa8;

    /// All tags whose payload is a single register address.
    pub const REGISTER: &[u8] = &[REG_A0, REG_A1, REG_A4, REG_A5];
}

/// Number of 32-bit configuration words in an NCO block.
pub const NCO_WORDS: usize = 6;

/// Stride between NCO configuration words.
pub const NCO_STRIDE: u64 = 4;

/// Split a raw descriptor into `(tag, payload)`.
#[must_use]
pub const fn split(raw: u64) -> (u8, u64) {
    ((raw >> TAG_SHIFT) as u8, raw & PAYLOAD_MASK)
}

/// Build a raw descriptor from a tag and payload (payload is truncated to 56 bits).
#[must_use]
pub const fn compose(tag: u8, payload: u64) -> u64 {
    ((tag as u64) << TAG_SHIFT) | (payload & PAYLOAD_MASK)
}
