//! Error types for PMGR decoding and register access

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for PMGR operations
pub type Result<T> = std::result::Result<T, PmgrError>;

/// Kind of record an id refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordKind {
    /// PMGR device
    Device,
    /// Power domain
    PowerDomain,
    /// Clock
    Clock,
    /// Power-state register descriptor (indexed by position)
    PsReg,
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Device => write!(f, "device"),
            Self::PowerDomain => write!(f, "power domain"),
            Self::Clock => write!(f, "clock"),
            Self::PsReg => write!(f, "ps-reg"),
        }
    }
}

/// Errors that can occur while decoding a PMGR description
#[derive(Debug, Error)]
pub enum PmgrError {
    /// Two records of the same kind share an id
    #[error("Duplicate {kind} id {id}")]
    DuplicateId {
        /// Record table the collision was found in
        kind: RecordKind,
        /// Colliding id
        id: u32,
    },

    /// A nonzero reference does not resolve
    #[error("Dangling {kind} reference #{id}")]
    DanglingReference {
        /// Record table that was searched
        kind: RecordKind,
        /// Unresolved id
        id: u32,
    },

    /// Control block outside the config base table
    #[error("Control block {ctl_block} outside config base table (have {count} blocks)")]
    Configuration {
        /// Requested control block
        ctl_block: u32,
        /// Number of known control blocks
        count: usize,
    },

    /// A live register read failed
    #[error("Register read @ {addr:#x} failed: {reason}")]
    Access {
        /// Address that was read
        addr: u64,
        /// Reason for failure
        reason: String,
    },

    /// Address computation left the 64-bit address space
    #[error("Address overflow: {base:#x} + {offset:#x}")]
    AddressOverflow {
        /// Base address
        base: u64,
        /// Offset added to it
        offset: u64,
    },

    /// Region selector not present in the PMGR node's `reg` list
    #[error("Region {selector} not found (have {count} regions)")]
    RegionNotFound {
        /// Requested region selector
        selector: u32,
        /// Number of regions available
        count: usize,
    },

    /// Hardware description is structurally invalid
    #[error("Malformed hardware description: {reason}")]
    MalformedDescription {
        /// Reason for rejection
        reason: String,
    },

    /// Register snapshot is structurally invalid
    #[error("Invalid register snapshot: {reason}")]
    InvalidSnapshot {
        /// Reason for rejection
        reason: String,
    },

    /// Description or snapshot file could not be read
    #[error("Cannot read {}: {source}", path.display())]
    File {
        /// File that was opened
        path: PathBuf,
        /// Underlying I/O error
        source: std::io::Error,
    },

    /// I/O error
    #[error("I/O error: {source}")]
    Io {
        /// Underlying I/O error
        #[from]
        source: std::io::Error,
    },

    /// JSON decoding failed
    #[error("JSON error: {source}")]
    Json {
        /// Underlying serde error
        #[from]
        source: serde_json::Error,
    },
}

impl PmgrError {
    /// Create a dangling reference error
    pub const fn dangling(kind: RecordKind, id: u32) -> Self {
        Self::DanglingReference { kind, id }
    }

    /// Create a register access error
    pub fn access(addr: u64, reason: impl Into<String>) -> Self {
        Self::Access {
            addr,
            reason: reason.into(),
        }
    }

    /// Create a malformed description error
    pub fn malformed(reason: impl Into<String>) -> Self {
        Self::MalformedDescription {
            reason: reason.into(),
        }
    }

    /// Create an invalid snapshot error
    pub fn invalid_snapshot(reason: impl Into<String>) -> Self {
        Self::InvalidSnapshot {
            reason: reason.into(),
        }
    }

    /// Create a file error
    pub fn file(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::File {
            path: path.into(),
            source,
        }
    }
}
