//! Control and power-state register address resolution
//!
//! ```text
//! ctl register  = config_base[ctl_block] + ctl_idx * 0x10
//! config_base   = region_base(layout[ctl_block].region) + layout[ctl_block].offset
//! ps register   = region_base(ps_regs[psreg].reg) + ps_regs[psreg].offset + psidx * 8
//! ```

use crate::error::{PmgrError, RecordKind, Result};
use crate::model::{Clock, Device, Event, PowerDomain, PsReg};
use crate::region::RegionResolver;
use pmgr_chip::layout::{BlockBase, ConfigLayout};
use pmgr_chip::regs::{CTL_BLOCK_COUNT, CTL_STRIDE, PS_STRIDE};

/// Resolved addresses of an event's control registers
#[derive(Debug)]
pub struct EventAddresses {
    /// Primary control register
    pub primary: Result<u64>,
    /// Secondary control register, only when the event declares one
    pub secondary: Option<Result<u64>>,
}

fn offset_address(base: u64, offset: u64) -> Result<u64> {
    base.checked_add(offset)
        .ok_or(PmgrError::AddressOverflow { base, offset })
}

fn block_base<R: RegionResolver>(regions: &R, block: BlockBase) -> Result<u64> {
    offset_address(regions.region_base(block.region)?, block.offset)
}

/// Computes absolute register addresses for PMGR entities
#[derive(Debug, Clone)]
pub struct AddressResolver<R> {
    regions: R,
    layout: ConfigLayout,
    config_bases: [Option<u64>; CTL_BLOCK_COUNT],
}

impl<R: RegionResolver> AddressResolver<R> {
    /// Build the config base table for `layout` over `regions`
    ///
    /// A block whose region the PMGR node does not have stays unresolved;
    /// only entities in that block fail.
    pub fn new(layout: ConfigLayout, regions: R) -> Self {
        let mut config_bases = [None; CTL_BLOCK_COUNT];
        for (i, (base, block)) in config_bases.iter_mut().zip(layout.blocks).enumerate() {
            match block_base(&regions, block) {
                Ok(addr) => *base = Some(addr),
                Err(e) => tracing::warn!("Config block {i} ({block}): {e}"),
            }
        }

        tracing::debug!("Config bases ({layout}): {config_bases:#x?}");

        Self {
            regions,
            layout,
            config_bases,
        }
    }

    /// Layout the table was built from
    pub const fn layout(&self) -> &ConfigLayout {
        &self.layout
    }

    /// Config base addresses indexed by control block, `None` where the
    /// block's region could not be resolved
    pub const fn config_bases(&self) -> &[Option<u64>; CTL_BLOCK_COUNT] {
        &self.config_bases
    }

    /// Region resolver backing this table
    pub const fn regions(&self) -> &R {
        &self.regions
    }

    /// Base address of a control block
    ///
    /// # Errors
    ///
    /// Returns `PmgrError::Configuration` if `ctl_block` is outside the table,
    /// or the region error that left the block unresolved.
    pub fn config_base(&self, ctl_block: u32) -> Result<u64> {
        let i = ctl_block as usize;
        let block = self.layout.block(ctl_block).ok_or(PmgrError::Configuration {
            ctl_block,
            count: CTL_BLOCK_COUNT,
        })?;
        match self.config_bases[i] {
            Some(base) => Ok(base),
            None => block_base(&self.regions, block),
        }
    }

    /// Address of control register `ctl_idx` in `ctl_block`
    ///
    /// # Errors
    ///
    /// Returns `PmgrError::Configuration` if `ctl_block` is outside the table,
    /// or the error of an unresolved block.
    pub fn ctl_address(&self, ctl_block: u32, ctl_idx: u32) -> Result<u64> {
        offset_address(self.config_base(ctl_block)?, u64::from(ctl_idx) * CTL_STRIDE)
    }

    /// Control register of a clock
    ///
    /// # Errors
    ///
    /// Returns `PmgrError::Configuration` if the clock's block is unknown.
    pub fn clock_address(&self, clk: &Clock) -> Result<u64> {
        self.ctl_address(clk.ctl_block, clk.ctl_idx)
    }

    /// Control register of a power domain
    ///
    /// # Errors
    ///
    /// Returns `PmgrError::Configuration` if the domain's block is unknown.
    pub fn power_domain_address(&self, pd: &PowerDomain) -> Result<u64> {
        self.ctl_address(pd.ctl_block, pd.ctl_idx)
    }

    /// Primary and, if declared, secondary control registers of an event
    pub fn event_addresses(&self, ev: &Event) -> EventAddresses {
        EventAddresses {
            primary: self.ctl_address(ev.ctl_block, ev.ctl_idx),
            secondary: ev
                .secondary()
                .map(|(block, idx)| self.ctl_address(block, idx)),
        }
    }

    /// Power-state register of a device
    ///
    /// `Ok(None)` when the device has no power-state reference
    /// (`psreg == 0 && psidx == 0`); that is not an error.
    ///
    /// # Errors
    ///
    /// Returns `PmgrError::DanglingReference` if `psreg` is not a valid PsReg
    /// index, `PmgrError::RegionNotFound` if the PsReg names an unknown
    /// region, or `PmgrError::AddressOverflow` if the sum leaves the address
    /// space.
    pub fn power_state_address(&self, dev: &Device, ps_regs: &[PsReg]) -> Result<Option<u64>> {
        if !dev.has_power_state() {
            return Ok(None);
        }

        let ps = ps_regs
            .get(dev.psreg as usize)
            .ok_or(PmgrError::dangling(RecordKind::PsReg, dev.psreg))?;
        let region = self.regions.region(ps.reg)?;
        let addr = offset_address(
            offset_address(region.base, ps.offset)?,
            u64::from(dev.psidx) * PS_STRIDE,
        )?;
        if !region.contains(addr) {
            tracing::warn!(
                "{}: ps register {addr:#x} outside region {} ({:#x}+{:#x})",
                dev.name,
                ps.reg,
                region.base,
                region.size
            );
        }

        tracing::trace!("{}: ps {}:{} -> {addr:#x}", dev.name, dev.psreg, dev.psidx);
        Ok(Some(addr))
    }
}
