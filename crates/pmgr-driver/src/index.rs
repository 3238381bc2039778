//! Id lookup tables
//!
//! Borrowing maps from id to record for devices, power domains and clocks.
//! Built once per survey; the records stay owned by the description.

use crate::error::{PmgrError, RecordKind, Result};
use crate::model::{Clock, Device, PowerDomain};
use pmgr_chip::regs::ID_NONE;
use std::collections::HashMap;

fn index_by_id<'a, T>(
    records: &'a [T],
    kind: RecordKind,
    id_of: impl Fn(&T) -> u32,
) -> Result<HashMap<u32, &'a T>> {
    let mut map = HashMap::with_capacity(records.len());
    for record in records {
        let id = id_of(record);
        if map.insert(id, record).is_some() {
            tracing::error!("Duplicate {kind} id {id}");
            return Err(PmgrError::DuplicateId { kind, id });
        }
    }
    Ok(map)
}

/// Id indexes over the PMGR record tables
#[derive(Debug)]
pub struct PmgrIndex<'a> {
    devices: HashMap<u32, &'a Device>,
    power_domains: HashMap<u32, &'a PowerDomain>,
    clocks: HashMap<u32, &'a Clock>,
}

impl<'a> PmgrIndex<'a> {
    /// Build the indexes
    ///
    /// # Errors
    ///
    /// Returns `PmgrError::DuplicateId` if two records of one kind share an id.
    pub fn build(
        devices: &'a [Device],
        power_domains: &'a [PowerDomain],
        clocks: &'a [Clock],
    ) -> Result<Self> {
        let index = Self {
            devices: index_by_id(devices, RecordKind::Device, |d| d.id)?,
            power_domains: index_by_id(power_domains, RecordKind::PowerDomain, |p| p.id)?,
            clocks: index_by_id(clocks, RecordKind::Clock, |c| c.id)?,
        };

        tracing::debug!(
            "Indexed {} devices, {} power domains, {} clocks",
            index.devices.len(),
            index.power_domains.len(),
            index.clocks.len()
        );

        Ok(index)
    }

    /// Look up a device by id
    ///
    /// # Errors
    ///
    /// Returns `PmgrError::DanglingReference` if no device has this id.
    pub fn device(&self, id: u32) -> Result<&'a Device> {
        self.devices
            .get(&id)
            .copied()
            .ok_or(PmgrError::dangling(RecordKind::Device, id))
    }

    /// Look up a power domain by id
    ///
    /// # Errors
    ///
    /// Returns `PmgrError::DanglingReference` if no power domain has this id.
    pub fn power_domain(&self, id: u32) -> Result<&'a PowerDomain> {
        self.power_domains
            .get(&id)
            .copied()
            .ok_or(PmgrError::dangling(RecordKind::PowerDomain, id))
    }

    /// Look up a clock by id
    ///
    /// # Errors
    ///
    /// Returns `PmgrError::DanglingReference` if no clock has this id.
    pub fn clock(&self, id: u32) -> Result<&'a Clock> {
        self.clocks
            .get(&id)
            .copied()
            .ok_or(PmgrError::dangling(RecordKind::Clock, id))
    }

    /// Resolve a device's power domain: `Ok(None)` for the id 0 sentinel.
    ///
    /// # Errors
    ///
    /// Returns `PmgrError::DanglingReference` for a nonzero, unknown id.
    pub fn power_domain_of(&self, dev: &Device) -> Result<Option<&'a PowerDomain>> {
        dev.power_domain().map(|id| self.power_domain(id)).transpose()
    }

    /// Resolve every parent slot of a device, in slot order.
    ///
    /// Empty slots (id 0) resolve to `Ok(None)`. An unknown nonzero id only
    /// fails its own slot.
    pub fn parents_of(&self, dev: &Device) -> Vec<Result<Option<&'a Device>>> {
        dev.parents
            .iter()
            .map(|&id| {
                if id == ID_NONE {
                    Ok(None)
                } else {
                    self.device(id).map(Some)
                }
            })
            .collect()
    }

    /// Number of indexed devices
    pub fn device_count(&self) -> usize {
        self.devices.len()
    }
}
