//! Best-effort PMGR survey
//!
//! Combines the id index, dependency graph, address resolver and register
//! reader into per-entity reports. Only duplicate ids, which invalidate every
//! later lookup, stop the survey. Everything else is recorded on the entity
//! it concerns and the survey moves on.

use crate::bootclk::{BootClockDecoder, BootClockSource, ClockSource};
use crate::error::Result;
use crate::graph::{Consumer, DependencyGraph};
use crate::index::PmgrIndex;
use crate::model::{BootClock, Clock, Device, Event, PowerDomain, PsReg, PwrgateReg};
use crate::reader::RegisterReader;
use crate::region::RegionTable;
use crate::resolver::AddressResolver;
use crate::source::HardwareDescription;
use pmgr_chip::layout::ConfigLayout;
use pmgr_chip::regs::{flags, BOOT_CLOCK_ID_BASE, CTL_BLOCK_COUNT};

/// Power-state register location and its live value
#[derive(Debug)]
pub struct PowerStateReading {
    /// Register address
    pub addr: u64,
    /// Register contents
    pub value: Result<u32>,
}

/// One PMGR device
#[derive(Debug)]
pub struct DeviceReport<'a> {
    /// Position in the device table
    pub position: usize,
    /// Device record
    pub device: &'a Device,
    /// Flag byte rendered as `abCdefgh` columns
    pub flags: String,
    /// Power-state register; `Ok(None)` when the device has none
    pub power_state: Result<Option<PowerStateReading>>,
    /// Owning power domain; `Ok(None)` when the device has none
    pub power_domain: Result<Option<&'a PowerDomain>>,
    /// Parent slots in order; `Ok(None)` for empty slots
    pub parents: Vec<Result<Option<&'a Device>>>,
    /// I/O-tree slots gating on this device
    pub users: Vec<Consumer>,
}

/// One clock
#[derive(Debug)]
pub struct ClockReport<'a> {
    /// Position in the clock table
    pub position: usize,
    /// Clock record
    pub clock: &'a Clock,
    /// Control register address
    pub addr: Result<u64>,
}

/// One power domain
#[derive(Debug)]
pub struct PowerDomainReport<'a> {
    /// Position in the power domain table
    pub position: usize,
    /// Power domain record
    pub domain: &'a PowerDomain,
    /// Control register address
    pub addr: Result<u64>,
}

/// One event
#[derive(Debug)]
pub struct EventReport<'a> {
    /// Position in the event table
    pub position: usize,
    /// Event record
    pub event: &'a Event,
    /// Primary control register address
    pub addr: Result<u64>,
    /// Secondary control register address, when declared
    pub addr2: Option<Result<u64>>,
}

/// A fixed clock id and its consumers
#[derive(Debug)]
pub struct FixedClockReport {
    /// Clock id (below [`BOOT_CLOCK_ID_BASE`])
    pub id: u32,
    /// I/O-tree slots consuming the clock
    pub users: Vec<Consumer>,
}

/// One boot clock slot
#[derive(Debug)]
pub struct BootClockReport {
    /// Slot from the I/O root
    pub slot: BootClock,
    /// Source classified from the descriptor tag
    pub source: ClockSource,
    /// Decoded value
    pub value: Result<BootClockSource>,
    /// I/O-tree slots consuming clock id `BOOT_CLOCK_ID_BASE + index`
    pub users: Vec<Consumer>,
}

/// Complete survey output
#[derive(Debug)]
pub struct PmgrReport<'a> {
    /// Config layout in use
    pub layout: ConfigLayout,
    /// Config bases derived from the layout, `None` for unresolved blocks
    pub config_bases: [Option<u64>; CTL_BLOCK_COUNT],
    /// Register reader description
    pub reader: String,
    /// Power-state register banks
    pub ps_regs: &'a [PsReg],
    /// Power-gate registers
    pub pwrgate_regs: &'a [PwrgateReg],
    /// Devices in table order
    pub devices: Vec<DeviceReport<'a>>,
    /// Clocks in table order
    pub clocks: Vec<ClockReport<'a>>,
    /// Power domains in table order
    pub power_domains: Vec<PowerDomainReport<'a>>,
    /// Events in table order
    pub events: Vec<EventReport<'a>>,
    /// Fixed clock ids that have consumers, ascending
    pub fixed_clocks: Vec<FixedClockReport>,
    /// Boot clock slots, or why the arrays could not be read
    pub boot_clocks: Result<Vec<BootClockReport>>,
}

impl PmgrReport<'_> {
    /// Number of per-entity errors recorded anywhere in the report
    pub fn error_count(&self) -> usize {
        let devices: usize = self
            .devices
            .iter()
            .map(|d| {
                let ps = match &d.power_state {
                    Err(_) | Ok(Some(PowerStateReading { value: Err(_), .. })) => 1,
                    Ok(_) => 0,
                };
                ps + usize::from(d.power_domain.is_err())
                    + d.parents.iter().filter(|p| p.is_err()).count()
            })
            .sum();
        let clocks = self.clocks.iter().filter(|c| c.addr.is_err()).count();
        let domains = self.power_domains.iter().filter(|p| p.addr.is_err()).count();
        let events: usize = self
            .events
            .iter()
            .map(|e| usize::from(e.addr.is_err()) + usize::from(matches!(e.addr2, Some(Err(_)))))
            .sum();
        let boot = match &self.boot_clocks {
            Ok(slots) => slots.iter().filter(|b| b.value.is_err()).count(),
            Err(_) => 1,
        };
        devices + clocks + domains + events + boot
    }
}

/// Survey over one hardware description
#[derive(Debug)]
pub struct Survey<'a, R> {
    desc: &'a HardwareDescription,
    index: PmgrIndex<'a>,
    graph: DependencyGraph,
    resolver: AddressResolver<RegionTable>,
    reader: R,
}

impl<'a, R: RegisterReader> Survey<'a, R> {
    /// Index the description and build the config base table
    ///
    /// # Errors
    ///
    /// Returns `PmgrError::DuplicateId` for a malformed record table. A
    /// layout block that does not fit the PMGR node only fails the entities
    /// in that block.
    pub fn new(desc: &'a HardwareDescription, layout: ConfigLayout, reader: R) -> Result<Self> {
        let pmgr = &desc.pmgr;
        let index = PmgrIndex::build(&pmgr.devices, &pmgr.power_domains, &pmgr.clocks)?;
        let graph = DependencyGraph::build(&desc.arm_io.devices);
        let resolver = AddressResolver::new(layout, pmgr.region_table());

        tracing::info!("Survey ready: layout {layout}, reader {}", reader.describe());

        Ok(Self {
            desc,
            index,
            graph,
            resolver,
            reader,
        })
    }

    /// Hardware description under survey
    pub const fn description(&self) -> &'a HardwareDescription {
        self.desc
    }

    /// Register reader
    pub const fn reader(&self) -> &R {
        &self.reader
    }

    /// Id index
    pub const fn index(&self) -> &PmgrIndex<'a> {
        &self.index
    }

    /// Dependency graph
    pub const fn graph(&self) -> &DependencyGraph {
        &self.graph
    }

    /// Address resolver
    pub const fn resolver(&self) -> &AddressResolver<RegionTable> {
        &self.resolver
    }

    fn power_state(&self, dev: &Device) -> Result<Option<PowerStateReading>> {
        let Some(addr) = self.resolver.power_state_address(dev, &self.desc.pmgr.ps_regs)? else {
            return Ok(None);
        };
        let value = self.reader.read32(addr);
        if let Err(e) = &value {
            tracing::warn!("{}: power state: {e}", dev.name);
        }
        Ok(Some(PowerStateReading { addr, value }))
    }

    /// Report every PMGR device
    pub fn devices(&self) -> Vec<DeviceReport<'a>> {
        self.desc
            .pmgr
            .devices
            .iter()
            .enumerate()
            .map(|(position, device)| {
                let power_state = self.power_state(device);
                if let Err(e) = &power_state {
                    tracing::warn!("{}: {e}", device.name);
                }
                let power_domain = self.index.power_domain_of(device);
                if let Err(e) = &power_domain {
                    tracing::warn!("{}: {e}", device.name);
                }

                DeviceReport {
                    position,
                    device,
                    flags: flags::render(device.flags),
                    power_state,
                    power_domain,
                    parents: self.index.parents_of(device),
                    users: self.graph.dev_users(device.id).to_vec(),
                }
            })
            .collect()
    }

    /// Report every clock
    pub fn clocks(&self) -> Vec<ClockReport<'a>> {
        self.desc
            .pmgr
            .clocks
            .iter()
            .enumerate()
            .map(|(position, clock)| ClockReport {
                position,
                clock,
                addr: self.resolver.clock_address(clock),
            })
            .collect()
    }

    /// Report every power domain
    pub fn power_domains(&self) -> Vec<PowerDomainReport<'a>> {
        self.desc
            .pmgr
            .power_domains
            .iter()
            .enumerate()
            .map(|(position, domain)| PowerDomainReport {
                position,
                domain,
                addr: self.resolver.power_domain_address(domain),
            })
            .collect()
    }

    /// Report every event
    pub fn events(&self) -> Vec<EventReport<'a>> {
        self.desc
            .pmgr
            .events
            .iter()
            .enumerate()
            .map(|(position, event)| {
                let addrs = self.resolver.event_addresses(event);
                EventReport {
                    position,
                    event,
                    addr: addrs.primary,
                    addr2: addrs.secondary,
                }
            })
            .collect()
    }

    /// Fixed clock ids that have at least one consumer
    pub fn fixed_clocks(&self) -> Vec<FixedClockReport> {
        self.graph
            .clocks()
            .filter(|&(id, _)| id < BOOT_CLOCK_ID_BASE)
            .map(|(id, users)| FixedClockReport {
                id,
                users: users.to_vec(),
            })
            .collect()
    }

    /// Decode every boot clock slot
    ///
    /// # Errors
    ///
    /// Returns `PmgrError::MalformedDescription` if the boot clock arrays
    /// differ in length. Read failures are kept per slot.
    pub fn boot_clocks(&self) -> Result<Vec<BootClockReport>> {
        let decoder = BootClockDecoder::new(&self.reader);

        Ok(self
            .desc
            .arm_io
            .boot_clocks()?
            .into_iter()
            .map(|slot| {
                let source = ClockSource::from_raw(slot.descriptor);
                let value = decoder.decode(&source);
                if let Err(e) = &value {
                    tracing::warn!("boot clock #{}: {e}", slot.index);
                }
                let id = u32::try_from(slot.index)
                    .ok()
                    .and_then(|i| i.checked_add(BOOT_CLOCK_ID_BASE));
                BootClockReport {
                    slot,
                    source,
                    value,
                    users: id.map(|id| self.graph.clock_users(id).to_vec()).unwrap_or_default(),
                }
            })
            .collect())
    }

    /// Run every section
    pub fn report(&self) -> PmgrReport<'a> {
        let report = PmgrReport {
            layout: *self.resolver.layout(),
            config_bases: *self.resolver.config_bases(),
            reader: self.reader.describe(),
            ps_regs: &self.desc.pmgr.ps_regs,
            pwrgate_regs: &self.desc.pmgr.pwrgate_regs,
            devices: self.devices(),
            clocks: self.clocks(),
            power_domains: self.power_domains(),
            events: self.events(),
            fixed_clocks: self.fixed_clocks(),
            boot_clocks: self.boot_clocks(),
        };

        tracing::info!(
            "Surveyed {} devices, {} clocks, {} power domains, {} events ({} errors)",
            report.devices.len(),
            report.clocks.len(),
            report.power_domains.len(),
            report.events.len(),
            report.error_count()
        );

        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{PmgrError, RecordKind};
    use crate::model::IoDevice;
    use crate::readers::{Offline, RegisterSnapshot};
    use crate::region::Region;
    use crate::source::{IoRoot, PmgrNode};
    use pmgr_chip::bootclk::compose;

    const R0: u64 = 0x1000_0000;
    const R1: u64 = 0x2000_0000;

    fn description() -> HardwareDescription {
        HardwareDescription {
            pmgr: PmgrNode {
                reg: vec![Region::new(R0, 0x10_0000), Region::new(R1, 0x10_0000)],
                devices: vec![
                    Device { id: 1, name: "SIO".into(), psreg: 0, psidx: 1, pd: 2, ..Device::default() },
                    Device { id: 2, name: "SPI0".into(), parents: vec![0, 0, 3], ..Device::default() },
                ],
                power_domains: vec![PowerDomain { id: 2, name: "PD_AON".into(), ctl_block: 1, ctl_idx: 1 }],
                clocks: vec![Clock { id: 5, name: "CLK_UART".into(), ctl_block: 7, ..Clock::default() }],
                events: vec![Event { id: 1, name: "EV".into(), ctl_block: 2, ctl_idx: 3, ..Event::default() }],
                ps_regs: vec![PsReg { reg: 0, offset: 0x100, mask: 0xf }],
                pwrgate_regs: vec![],
            },
            arm_io: IoRoot {
                devices: vec![IoDevice {
                    path: "/arm-io/spi0".into(),
                    clock_ids: Some(vec![5, BOOT_CLOCK_ID_BASE]),
                    clock_gates: Some(vec![1]),
                    power_gates: None,
                }],
                clock_frequencies: vec![24_000_000],
                clock_frequencies_regs: vec![compose(0x9c, 24_000_000)],
                clock_frequencies_nclk: vec![1],
            },
        }
    }

    #[test]
    fn device_without_power_state_has_no_address() {
        let desc = description();
        let survey = Survey::new(&desc, ConfigLayout::REFERENCE, Offline).unwrap();
        let devices = survey.devices();
        assert!(matches!(devices[1].power_state, Ok(None)));
    }

    #[test]
    fn failed_read_keeps_address() {
        let desc = description();
        let survey = Survey::new(&desc, ConfigLayout::REFERENCE, Offline).unwrap();
        let devices = survey.devices();
        let reading = devices[0].power_state.as_ref().unwrap().as_ref().unwrap();
        assert_eq!(reading.addr, R0 + 0x100 + 8);
        assert!(matches!(reading.value, Err(PmgrError::Access { .. })));
    }

    #[test]
    fn live_read_fills_value() {
        let desc = description();
        let snap: RegisterSnapshot = [(R0 + 0x108, 0xf)].into_iter().collect();
        let survey = Survey::new(&desc, ConfigLayout::REFERENCE, snap).unwrap();
        let devices = survey.devices();
        let reading = devices[0].power_state.as_ref().unwrap().as_ref().unwrap();
        assert_eq!(*reading.value.as_ref().unwrap(), 0xf);
        assert_eq!(devices[0].power_domain.as_ref().unwrap().unwrap().name, "PD_AON");
        assert_eq!(devices[0].users[0].to_string(), "/arm-io/spi0.clkgate[0]");
    }

    #[test]
    fn dangling_parent_does_not_fail_device() {
        let desc = description();
        let survey = Survey::new(&desc, ConfigLayout::REFERENCE, Offline).unwrap();
        let devices = survey.devices();
        let parents = &devices[1].parents;
        assert!(matches!(parents[0], Ok(None)));
        assert!(matches!(parents[1], Ok(None)));
        assert!(matches!(
            parents[2],
            Err(PmgrError::DanglingReference { kind: RecordKind::Device, id: 3 })
        ));
        assert!(matches!(devices[1].power_domain, Ok(None)));
    }

    #[test]
    fn bad_ctl_block_is_per_clock() {
        let desc = description();
        let survey = Survey::new(&desc, ConfigLayout::REFERENCE, Offline).unwrap();
        let report = survey.report();
        assert!(matches!(
            report.clocks[0].addr,
            Err(PmgrError::Configuration { ctl_block: 7, .. })
        ));
        assert_eq!(report.power_domains[0].addr.as_ref().unwrap(), &(R0 + 0x34100 + 0x10));
        assert_eq!(report.events[0].addr.as_ref().unwrap(), &(R0 + 0x7c100 + 0x30));
    }

    #[test]
    fn fixed_and_boot_clock_users_split_at_base() {
        let desc = description();
        let survey = Survey::new(&desc, ConfigLayout::REFERENCE, Offline).unwrap();

        let fixed = survey.fixed_clocks();
        assert_eq!(fixed.len(), 1);
        assert_eq!(fixed[0].id, 5);

        let boot = survey.boot_clocks().unwrap();
        assert_eq!(boot[0].value.as_ref().unwrap(), &BootClockSource::Fixed(24_000_000));
        assert_eq!(boot[0].users[0].to_string(), "/arm-io/spi0.clk[1]");
    }

    #[test]
    fn error_count_covers_sections() {
        let desc = description();
        let survey = Survey::new(&desc, ConfigLayout::REFERENCE, Offline).unwrap();
        // SIO ps read, SPI0 parent #3, clock ctl block 7
        assert_eq!(survey.report().error_count(), 3);
    }

    #[test]
    fn missing_layout_region_keeps_other_sections() {
        let mut desc = description();
        desc.pmgr.reg.truncate(1);
        desc.pmgr.clocks[0].ctl_block = 0;
        let survey = Survey::new(&desc, ConfigLayout::REFERENCE, Offline).unwrap();
        let report = survey.report();

        assert_eq!(report.config_bases[0], None);
        assert!(matches!(
            report.clocks[0].addr,
            Err(PmgrError::RegionNotFound { selector: 1, count: 1 })
        ));
        assert_eq!(report.power_domains[0].addr.as_ref().unwrap(), &(R0 + 0x34100 + 0x10));

        let reading = report.devices[0].power_state.as_ref().unwrap().as_ref().unwrap();
        assert_eq!(reading.addr, R0 + 0x108);
        let boot = report.boot_clocks.as_ref().unwrap();
        assert_eq!(boot[0].value.as_ref().unwrap(), &BootClockSource::Fixed(24_000_000));
    }

    #[test]
    fn overflowing_ps_offset_fails_one_device() {
        let mut desc = description();
        desc.pmgr.ps_regs[0].offset = u64::MAX;
        let survey = Survey::new(&desc, ConfigLayout::REFERENCE, Offline).unwrap();
        let devices = survey.devices();

        assert!(matches!(devices[0].power_state, Err(PmgrError::AddressOverflow { .. })));
        assert!(matches!(devices[1].power_state, Ok(None)));
    }

    #[test]
    fn duplicate_ids_stop_the_survey() {
        let mut desc = description();
        desc.pmgr.devices[1].id = 1;
        assert!(matches!(
            Survey::new(&desc, ConfigLayout::REFERENCE, Offline),
            Err(PmgrError::DuplicateId { .. })
        ));
    }
}
