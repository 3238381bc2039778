//! End-to-end survey tests
//!
//! A small PMGR description and register snapshot are written to disk and
//! surveyed through the public API, the same way the CLI does it.

use pmgr_driver::{
    BootClockSource, ClockSource, ConfigLayout, DevMem, HardwareDescription, Offline, PmgrError,
    RecordKind, RegisterSnapshot, Survey,
};
use std::fs;
use tempfile::TempDir;

const PMGR_JSON: &str = r#"{
  "pmgr": {
    "reg": [
      { "base": 9557770240, "size": 1048576 },
      { "base": 9618063360, "size": 262144 }
    ],
    "devices": [
      { "id": 1, "name": "SIO_BUSIF", "psreg": 0, "psidx": 0, "flags": 16 },
      { "id": 2, "name": "SIO", "psreg": 1, "psidx": 4, "flags": 32, "pd": 10, "parents": [1, 0] },
      { "id": 3, "name": "UART0", "psreg": 1, "psidx": 5, "parents": [2, 0, 9] },
      { "id": 4, "name": "GHOST", "psreg": 7, "psidx": 1, "pd": 11 }
    ],
    "power_domains": [
      { "id": 10, "name": "PD_SIO", "ctl_block": 1, "ctl_idx": 2 }
    ],
    "clocks": [
      { "id": 20, "name": "CLK_UART", "ctl_block": 2, "ctl_idx": 4, "unk": 3 },
      { "id": 21, "name": "CLK_NEW", "ctl_block": 5, "ctl_idx": 1 }
    ],
    "events": [
      { "id": 1, "name": "EV_ONE", "ctl_block": 3, "ctl_idx": 1 },
      { "id": 2, "name": "EV_TWO", "ctl_block": 3, "ctl_idx": 2, "ctl2_block": 0, "ctl2_idx": 6 }
    ],
    "ps_regs": [
      { "reg": 0, "offset": 256, "mask": 15 },
      { "reg": 0, "offset": 512, "mask": 15 }
    ],
    "pwrgate_regs": [
      { "reg": 0, "offset": 1024, "mask": 1, "unk": 0 }
    ]
  },
  "arm_io": {
    "devices": [
      { "path": "/arm-io/uart0", "clock_ids": [20, 256], "clock_gates": [3], "power_gates": [2] },
      { "path": "/arm-io/sio", "clock_gates": [2] },
      { "path": "/arm-io/gpio" }
    ],
    "clock_frequencies": [24000000, 0, 0, 0],
    "clock_frequencies_regs": [
      11240984669940758016,
      11529215046605344768,
      12105675798908772352,
      18374686479671623680
    ],
    "clock_frequencies_nclk": [1, 1, 1, 0]
  }
}"#;

// 0x9c00_0000_016e_3600  fixed 24 MHz
// 0xa000_0000_2000_1000  regval @ 0x2000_1000
// 0xa800_0000_2000_2000  nco @ 0x2000_2000
// 0xff00_0000_0000_0000  unknown
const R0: u64 = 0x2_39b0_0000;

const SNAPSHOT_JSON: &str = r#"{
  "0x239b00220": "0x0f",
  "0x20001000": "0xdeadbeef",
  "0x20002000": 0, "0x20002004": 1, "0x20002008": 2,
  "0x2000200c": 3, "0x20002010": 4, "0x20002014": 5
}"#;

fn write_fixtures() -> TempDir {
    let dir = TempDir::new().expect("tempdir");
    fs::write(dir.path().join("pmgr.json"), PMGR_JSON).expect("write description");
    fs::write(dir.path().join("regs.json"), SNAPSHOT_JSON).expect("write snapshot");
    dir
}

fn load() -> (TempDir, HardwareDescription, RegisterSnapshot) {
    let dir = write_fixtures();
    let desc = HardwareDescription::from_file(dir.path().join("pmgr.json")).expect("description");
    let regs = RegisterSnapshot::from_file(dir.path().join("regs.json")).expect("snapshot");
    (dir, desc, regs)
}

#[test]
fn descriptors_decode_as_expected() {
    let (_dir, desc, _) = load();
    let sources: Vec<ClockSource> = desc
        .arm_io
        .clock_frequencies_regs
        .iter()
        .map(|&raw| ClockSource::from_raw(raw))
        .collect();
    assert_eq!(sources[0], ClockSource::Fixed(24_000_000));
    assert_eq!(sources[1], ClockSource::Register { tag: 0xa0, addr: 0x2000_1000 });
    assert_eq!(sources[2], ClockSource::Nco { base: 0x2000_2000 });
    assert_eq!(sources[3], ClockSource::Unknown { tag: 0xff, payload: 0 });
}

#[test]
fn full_survey_with_snapshot() {
    let (_dir, desc, regs) = load();
    let survey = Survey::new(&desc, ConfigLayout::REFERENCE, regs).expect("survey");
    let report = survey.report();

    // Devices
    let sio_busif = &report.devices[0];
    assert!(matches!(sio_busif.power_state, Ok(None)));
    assert_eq!(sio_busif.flags, "   d    ");

    let sio = &report.devices[1];
    let reading = sio.power_state.as_ref().unwrap().as_ref().unwrap();
    assert_eq!(reading.addr, R0 + 0x200 + 4 * 8);
    assert_eq!(*reading.value.as_ref().unwrap(), 0x0f);
    assert_eq!(sio.power_domain.as_ref().unwrap().unwrap().name, "PD_SIO");
    assert_eq!(sio.parents[0].as_ref().unwrap().unwrap().name, "SIO_BUSIF");
    let users: Vec<String> = sio.users.iter().map(ToString::to_string).collect();
    assert_eq!(users, ["/arm-io/uart0.pwrgate[0]", "/arm-io/sio.clkgate[0]"]);

    let uart = &report.devices[2];
    assert!(matches!(
        uart.power_state.as_ref().unwrap().as_ref().unwrap().value,
        Err(PmgrError::Access { .. })
    ));
    assert!(matches!(
        uart.parents[2],
        Err(PmgrError::DanglingReference { kind: RecordKind::Device, id: 9 })
    ));

    let ghost = &report.devices[3];
    assert!(matches!(
        ghost.power_state,
        Err(PmgrError::DanglingReference { kind: RecordKind::PsReg, id: 7 })
    ));
    assert!(matches!(
        ghost.power_domain,
        Err(PmgrError::DanglingReference { kind: RecordKind::PowerDomain, id: 11 })
    ));

    // Clocks, domains, events
    assert_eq!(*report.clocks[0].addr.as_ref().unwrap(), R0 + 0x7c100 + 0x40);
    assert!(matches!(
        report.clocks[1].addr,
        Err(PmgrError::Configuration { ctl_block: 5, count: 4 })
    ));
    assert_eq!(*report.power_domains[0].addr.as_ref().unwrap(), R0 + 0x34100 + 0x20);
    assert_eq!(*report.events[0].addr.as_ref().unwrap(), R0 + 0x78100 + 0x10);
    assert!(report.events[0].addr2.is_none());
    let addr2 = report.events[1].addr2.as_ref().unwrap().as_ref().unwrap();
    assert_eq!(report.config_bases[0].map(|base| base + 0x60), Some(*addr2));

    // Fixed clocks
    assert_eq!(report.fixed_clocks.len(), 1);
    assert_eq!(report.fixed_clocks[0].id, 20);
    assert_eq!(report.fixed_clocks[0].users[0].to_string(), "/arm-io/uart0.clk[0]");

    // Boot clocks
    let boot = report.boot_clocks.as_ref().unwrap();
    assert_eq!(boot.len(), 4);
    assert_eq!(*boot[0].value.as_ref().unwrap(), BootClockSource::Fixed(24_000_000));
    assert_eq!(boot[0].users[0].to_string(), "/arm-io/uart0.clk[1]");
    assert_eq!(
        *boot[1].value.as_ref().unwrap(),
        BootClockSource::RegisterValue { tag: 0xa0, value: 0xdead_beef }
    );
    assert_eq!(*boot[2].value.as_ref().unwrap(), BootClockSource::Nco([0, 1, 2, 3, 4, 5]));
    assert_eq!(
        *boot[3].value.as_ref().unwrap(),
        BootClockSource::Unknown { tag: 0xff, payload: 0 }
    );
    assert!(boot[1].users.is_empty());
}

#[test]
fn offline_survey_still_resolves_addresses() {
    let (_dir, desc, _) = load();
    let survey = Survey::new(&desc, ConfigLayout::REFERENCE, Offline).expect("survey");
    let report = survey.report();

    let sio = report.devices[1].power_state.as_ref().unwrap().as_ref().unwrap();
    assert_eq!(sio.addr, R0 + 0x220);
    assert!(sio.value.is_err());

    let boot = report.boot_clocks.as_ref().unwrap();
    assert!(boot[0].value.is_ok());
    assert!(matches!(boot[1].value, Err(PmgrError::Access { addr: 0x2000_1000, .. })));
    assert_eq!(boot[1].source, ClockSource::Register { tag: 0xa0, addr: 0x2000_1000 });
}

#[test]
fn custom_layout_changes_bases() {
    let (_dir, desc, _) = load();
    let layout: ConfigLayout = "0:0x1000,0:0x2000,1:0x3000,1:0x4000".parse().unwrap();
    let survey = Survey::new(&desc, layout, Offline).expect("survey");
    let clocks = survey.clocks();
    assert_eq!(*clocks[0].addr.as_ref().unwrap(), 0x2_3d48_0000 + 0x3000 + 0x40);
}

#[test]
fn layout_outside_node_regions_fails_per_block() {
    let (_dir, desc, regs) = load();
    let layout: ConfigLayout = "2:0,0:0,0:0,0:0".parse().unwrap();
    let survey = Survey::new(&desc, layout, regs).expect("survey");
    let report = survey.report();

    assert_eq!(report.config_bases[0], None);
    assert!(matches!(
        report.events[1].addr2,
        Some(Err(PmgrError::RegionNotFound { selector: 2, count: 2 }))
    ));
    assert_eq!(*report.clocks[0].addr.as_ref().unwrap(), R0 + 0x40);
    assert_eq!(*report.events[1].addr.as_ref().unwrap(), R0 + 0x20);

    // Sections that never touch a config base are unaffected
    let sio = report.devices[1].power_state.as_ref().unwrap().as_ref().unwrap();
    assert_eq!(*sio.value.as_ref().unwrap(), 0x0f);
    assert_eq!(report.fixed_clocks.len(), 1);
    let boot = report.boot_clocks.as_ref().unwrap();
    assert_eq!(*boot[0].value.as_ref().unwrap(), BootClockSource::Fixed(24_000_000));
}

#[test]
fn missing_description_file() {
    let dir = TempDir::new().expect("tempdir");
    assert!(matches!(
        HardwareDescription::from_file(dir.path().join("absent.json")),
        Err(PmgrError::File { .. })
    ));
}

#[test]
#[ignore] // Requires root and live PMGR hardware
fn devmem_survey() {
    let (_dir, desc, _) = load();
    let mem = DevMem::open().expect("open /dev/mem");
    let survey = Survey::new(&desc, ConfigLayout::REFERENCE, mem).expect("survey");
    println!("{} errors", survey.report().error_count());
}
