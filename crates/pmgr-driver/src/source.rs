//! Hardware description loading
//!
//! The firmware hardware description is parsed elsewhere and handed over as
//! JSON: the PMGR node's record tables and MMIO regions, plus the I/O tree
//! root's device list and boot clock arrays.

use crate::error::{PmgrError, Result};
use crate::model::{BootClock, Clock, Device, Event, IoDevice, PowerDomain, PsReg, PwrgateReg};
use crate::region::{Region, RegionTable};
use serde::Deserialize;
use std::path::Path;

/// PMGR node contents
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PmgrNode {
    /// MMIO regions, indexed by region selector
    pub reg: Vec<Region>,
    /// Device table
    pub devices: Vec<Device>,
    /// Power domain table
    pub power_domains: Vec<PowerDomain>,
    /// Clock table
    pub clocks: Vec<Clock>,
    /// Event table
    pub events: Vec<Event>,
    /// Power-state register banks
    pub ps_regs: Vec<PsReg>,
    /// Power-gate registers
    pub pwrgate_regs: Vec<PwrgateReg>,
}

impl PmgrNode {
    /// Region table for the node's `reg` list
    pub fn region_table(&self) -> RegionTable {
        RegionTable::new(self.reg.clone())
    }
}

/// I/O tree root contents
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct IoRoot {
    /// Every device below the root, in tree order
    pub devices: Vec<IoDevice>,
    /// Nominal boot clock frequencies
    pub clock_frequencies: Vec<u32>,
    /// Tagged boot clock descriptors
    pub clock_frequencies_regs: Vec<u64>,
    /// Boot clock consumer counts
    pub clock_frequencies_nclk: Vec<u32>,
}

impl IoRoot {
    /// Zip the parallel boot clock arrays into slots
    ///
    /// # Errors
    ///
    /// Returns `PmgrError::MalformedDescription` if the three arrays differ
    /// in length.
    pub fn boot_clocks(&self) -> Result<Vec<BootClock>> {
        let n = self.clock_frequencies.len();
        if self.clock_frequencies_regs.len() != n || self.clock_frequencies_nclk.len() != n {
            return Err(PmgrError::malformed(format!(
                "boot clock arrays differ in length: frequencies={n}, regs={}, nclk={}",
                self.clock_frequencies_regs.len(),
                self.clock_frequencies_nclk.len()
            )));
        }

        Ok(self
            .clock_frequencies
            .iter()
            .zip(&self.clock_frequencies_regs)
            .zip(&self.clock_frequencies_nclk)
            .enumerate()
            .map(|(index, ((&frequency, &descriptor), &nclk))| BootClock {
                index,
                frequency,
                descriptor,
                nclk,
            })
            .collect())
    }
}

/// Structured hardware description
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HardwareDescription {
    /// PMGR node
    pub pmgr: PmgrNode,
    /// I/O tree root
    #[serde(default)]
    pub arm_io: IoRoot,
}

impl HardwareDescription {
    /// Parse a description from JSON text
    ///
    /// # Errors
    ///
    /// Returns `PmgrError::Json` if the text is not a valid description.
    pub fn from_json(text: &str) -> Result<Self> {
        let desc: Self = serde_json::from_str(text)?;
        tracing::debug!(
            "Description: {} devices, {} power domains, {} clocks, {} events, {} I/O devices",
            desc.pmgr.devices.len(),
            desc.pmgr.power_domains.len(),
            desc.pmgr.clocks.len(),
            desc.pmgr.events.len(),
            desc.arm_io.devices.len()
        );
        Ok(desc)
    }

    /// Load a description from disk
    ///
    /// # Errors
    ///
    /// Returns `PmgrError::File` if the file cannot be read, otherwise as
    /// [`HardwareDescription::from_json`].
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| PmgrError::file(path, e))?;
        let desc = Self::from_json(&text)?;
        tracing::info!("Loaded hardware description from {}", path.display());
        Ok(desc)
    }
}
