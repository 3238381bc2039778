//! Live register access
//!
//! Every read is a single 32-bit, read-only bus transaction. Nothing is
//! cached or retried; a failed read is returned to the caller, who renders
//! the value as unknown.

use crate::error::Result;
use std::fmt::Debug;

/// 32-bit register reader
///
/// Injected into the survey and the boot clock decoder. Implementations:
/// - `DevMem`: live physical reads through `/dev/mem`
/// - `RegisterSnapshot`: values recorded from an earlier run
/// - `Offline`: no register access at all
pub trait RegisterReader: Debug {
    /// Read one 32-bit register at a physical address
    ///
    /// # Errors
    ///
    /// Returns `PmgrError::Access` if the address cannot be read.
    fn read32(&self, addr: u64) -> Result<u32>;

    /// Short description for logs and report headers
    fn describe(&self) -> String;
}

impl<T: RegisterReader + ?Sized> RegisterReader for &T {
    fn read32(&self, addr: u64) -> Result<u32> {
        (**self).read32(addr)
    }

    fn describe(&self) -> String {
        (**self).describe()
    }
}

impl<T: RegisterReader + ?Sized> RegisterReader for Box<T> {
    fn read32(&self, addr: u64) -> Result<u32> {
        (**self).read32(addr)
    }

    fn describe(&self) -> String {
        (**self).describe()
    }
}
