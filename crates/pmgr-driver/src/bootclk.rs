//! Boot clock source decoding
//!
//! Decoding happens in two steps. [`ClockSource::from_raw`] classifies a
//! descriptor by its tag without touching hardware; [`BootClockDecoder`]
//! then performs the register reads the source needs. Keeping the steps
//! apart lets a report show where a value should have come from even when
//! the read fails.

use crate::error::Result;
use crate::reader::RegisterReader;
use pmgr_chip::bootclk::{self, tag, NCO_STRIDE, NCO_WORDS};

/// Where a boot clock's frequency comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockSource {
    /// Constant frequency carried in the descriptor
    Fixed(u64),
    /// Single register read at `addr`
    Register {
        /// Source-type tag (one of [`tag::REGISTER`])
        tag: u8,
        /// Register address
        addr: u64,
    },
    /// NCO register block starting at `base`
    Nco {
        /// Address of the first configuration word
        base: u64,
    },
    /// Tag with no known decoding
    Unknown {
        /// Source-type tag
        tag: u8,
        /// Undecoded payload
        payload: u64,
    },
}

impl ClockSource {
    /// Classify a raw 64-bit descriptor by its top byte
    pub const fn from_raw(raw: u64) -> Self {
        let (t, payload) = bootclk::split(raw);
        match t {
            tag::FIXED => Self::Fixed(payload),
            tag::REG_A0 | tag::REG_A1 | tag::REG_A4 | tag::REG_A5 => Self::Register {
                tag: t,
                addr: payload,
            },
            tag::NCO => Self::Nco { base: payload },
            _ => Self::Unknown { tag: t, payload },
        }
    }

    /// Short variant name
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Fixed(_) => "fixed",
            Self::Register { .. } => "regval",
            Self::Nco { .. } => "nco",
            Self::Unknown { .. } => "unknown",
        }
    }
}

/// Decoded boot clock value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootClockSource {
    /// Constant frequency
    Fixed(u64),
    /// Value of the source register. The tag is kept: the four register tags
    /// share a read procedure but may not share a meaning.
    RegisterValue {
        /// Source-type tag
        tag: u8,
        /// Register contents
        value: u32,
    },
    /// The six NCO configuration words, in address order
    Nco([u32; NCO_WORDS]),
    /// Opaque descriptor
    Unknown {
        /// Source-type tag
        tag: u8,
        /// Undecoded payload
        payload: u64,
    },
}

/// Reads the registers a boot clock source refers to
#[derive(Debug)]
pub struct BootClockDecoder<R> {
    reader: R,
}

impl<R: RegisterReader> BootClockDecoder<R> {
    /// Create a decoder reading through `reader`
    pub const fn new(reader: R) -> Self {
        Self { reader }
    }

    /// Decode a source, reading each needed register exactly once
    ///
    /// # Errors
    ///
    /// Returns `PmgrError::Access` if any required register read fails.
    pub fn decode(&self, source: &ClockSource) -> Result<BootClockSource> {
        match *source {
            ClockSource::Fixed(freq) => Ok(BootClockSource::Fixed(freq)),
            ClockSource::Register { tag, addr } => Ok(BootClockSource::RegisterValue {
                tag,
                value: self.reader.read32(addr)?,
            }),
            ClockSource::Nco { base } => {
                let mut words = [0u32; NCO_WORDS];
                for (i, word) in words.iter_mut().enumerate() {
                    *word = self.reader.read32(base + i as u64 * NCO_STRIDE)?;
                }
                Ok(BootClockSource::Nco(words))
            }
            ClockSource::Unknown { tag, payload } => {
                tracing::debug!("Unknown boot clock tag {tag:#x} (payload {payload:#x})");
                Ok(BootClockSource::Unknown { tag, payload })
            }
        }
    }

    /// Classify and decode a raw descriptor
    ///
    /// # Errors
    ///
    /// Returns `PmgrError::Access` if any required register read fails.
    pub fn decode_raw(&self, raw: u64) -> Result<BootClockSource> {
        self.decode(&ClockSource::from_raw(raw))
    }
}
