//! Reader with no register access

use crate::error::{PmgrError, Result};
use crate::reader::RegisterReader;

/// Reader that refuses every access
#[derive(Debug, Clone, Copy, Default)]
pub struct Offline;

impl RegisterReader for Offline {
    fn read32(&self, addr: u64) -> Result<u32> {
        Err(PmgrError::access(addr, "no register access configured"))
    }

    fn describe(&self) -> String {
        "offline".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_read_fails() {
        assert!(matches!(
            Offline.read32(0x1000),
            Err(PmgrError::Access { addr: 0x1000, .. })
        ));
    }
}
