//! PMGR record types
//!
//! Records are deserialized verbatim from the hardware description and never
//! modified afterwards. Fields named `unk*` are passed through as raw
//! integers; their meaning is not known yet.
//!
//! Id 0 is the "no reference" sentinel in every field that refers to another
//! record (`Device::pd`, `Device::parents`). It is never a valid target id.

use pmgr_chip::regs::ID_NONE;
use serde::Deserialize;

/// PMGR-managed device
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Device {
    /// Device id (unique within the device table)
    pub id: u32,
    /// Device name
    pub name: String,
    /// Index into the PsReg table
    pub psreg: u32,
    /// Register index within the PsReg bank
    pub psidx: u32,
    /// Flag byte, see [`pmgr_chip::regs::flags`]
    pub flags: u8,
    /// Control block index
    pub ctl_block: u32,
    /// Control register index within the block
    pub ctl_idx: u32,
    /// Owning power domain id (0 = none)
    pub pd: u32,
    /// Parent device ids in slot order (0 = empty slot)
    pub parents: Vec<u32>,
    /// Opaque
    pub unk1_0: u32,
    /// Opaque
    pub unk1_1: u32,
    /// Opaque
    pub unk2_0: u32,
    /// Opaque, possibly power-state configuration
    pub ps_cfg16: u32,
    /// Opaque
    pub unk2_3: u32,
    /// Opaque
    pub unk3: u32,
}

impl Device {
    /// Whether the device carries a power-state register reference.
    ///
    /// Devices with `psreg == 0 && psidx == 0` manage no power state through
    /// a PsReg bank and have no power-state address.
    pub const fn has_power_state(&self) -> bool {
        self.psreg != 0 || self.psidx != 0
    }

    /// Owning power domain id, `None` for the sentinel.
    pub const fn power_domain(&self) -> Option<u32> {
        if self.pd == ID_NONE {
            None
        } else {
            Some(self.pd)
        }
    }

    /// Whether any parent slot is occupied.
    pub fn has_parents(&self) -> bool {
        self.parents.iter().any(|&id| id != ID_NONE)
    }
}

/// Power domain
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PowerDomain {
    /// Power domain id
    pub id: u32,
    /// Power domain name
    pub name: String,
    /// Control block index
    pub ctl_block: u32,
    /// Control register index within the block
    pub ctl_idx: u32,
}

/// Clock
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Clock {
    /// Clock id
    pub id: u32,
    /// Clock name
    pub name: String,
    /// Control block index
    pub ctl_block: u32,
    /// Control register index within the block
    pub ctl_idx: u32,
    /// Opaque
    pub unk: u32,
}

/// PMGR event
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Event {
    /// Event id
    pub id: u32,
    /// Event name
    pub name: String,
    /// Primary control block index
    pub ctl_block: u32,
    /// Primary control register index
    pub ctl_idx: u32,
    /// Secondary control block index
    pub ctl2_block: u32,
    /// Secondary control register index (0 = no secondary register)
    pub ctl2_idx: u32,
    /// Opaque
    pub unk1: u32,
    /// Opaque
    pub unk2: u32,
    /// Opaque
    pub unk3: u32,
}

impl Event {
    /// Secondary `(ctl_block, ctl_idx)` pair, if present.
    pub const fn secondary(&self) -> Option<(u32, u32)> {
        if self.ctl2_idx == 0 {
            None
        } else {
            Some((self.ctl2_block, self.ctl2_idx))
        }
    }
}

/// Power-state register bank descriptor
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PsReg {
    /// PMGR region selector
    pub reg: u32,
    /// Byte offset within the region
    pub offset: u64,
    /// Bit mask
    pub mask: u32,
}

/// Power-gate register descriptor
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PwrgateReg {
    /// PMGR region selector
    pub reg: u32,
    /// Byte offset within the region
    pub offset: u64,
    /// Bit mask
    pub mask: u32,
    /// Opaque
    pub unk: u32,
}

/// Device node under the I/O tree root.
///
/// Only the dependency lists matter here. Absent and empty lists both mean
/// "no dependency edges".
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct IoDevice {
    /// Full node path, e.g. `/arm-io/uart0`
    pub path: String,
    /// Consumed clock ids
    pub clock_ids: Option<Vec<u32>>,
    /// Clock-gating PMGR device ids
    pub clock_gates: Option<Vec<u32>>,
    /// Power-gating PMGR device ids
    pub power_gates: Option<Vec<u32>>,
}

/// One boot clock slot of the I/O tree root
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BootClock {
    /// Slot index
    pub index: usize,
    /// Nominal frequency in Hz
    pub frequency: u32,
    /// Raw tagged descriptor, see [`pmgr_chip::bootclk`]
    pub descriptor: u64,
    /// Consumer count field
    pub nclk: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn power_state_presence() {
        let none = Device::default();
        assert!(!none.has_power_state());

        let idx_only = Device { psidx: 3, ..Device::default() };
        assert!(idx_only.has_power_state());

        let reg_only = Device { psreg: 1, ..Device::default() };
        assert!(reg_only.has_power_state());
    }

    #[test]
    fn sentinel_power_domain() {
        assert_eq!(Device::default().power_domain(), None);
        assert_eq!(Device { pd: 7, ..Device::default() }.power_domain(), Some(7));
    }

    #[test]
    fn empty_parent_slots() {
        assert!(!Device { parents: vec![0, 0], ..Device::default() }.has_parents());
        assert!(Device { parents: vec![0, 4], ..Device::default() }.has_parents());
    }

    #[test]
    fn event_secondary_requires_nonzero_index() {
        let ev = Event { ctl2_block: 2, ctl2_idx: 0, ..Event::default() };
        assert_eq!(ev.secondary(), None);

        let ev = Event { ctl2_block: 2, ctl2_idx: 5, ..Event::default() };
        assert_eq!(ev.secondary(), Some((2, 5)));
    }

    #[test]
    fn missing_fields_default() {
        let dev: Device = serde_json::from_str(r#"{"id": 4, "name": "UART0"}"#).unwrap();
        assert_eq!(dev.id, 4);
        assert!(dev.parents.is_empty());
        assert!(!dev.has_power_state());

        let io: IoDevice = serde_json::from_str(r#"{"path": "/arm-io/uart0"}"#).unwrap();
        assert!(io.clock_ids.is_none());
    }
}
