//! Text rendering of survey sections.
//!
//! Column layout follows the long-standing PMGR dump format so output can be
//! diffed against older captures. Values that could not be produced are shown
//! as `?` on the entity's line, with the reason on an indented `!` line below.

use pmgr_driver::survey::{
    BootClockReport, ClockReport, DeviceReport, EventReport, FixedClockReport, PowerDomainReport,
};
use pmgr_driver::{BootClockSource, Consumer, PmgrError, RegisterReader, Survey};
use std::fmt::Write as _;

/// Survey over whichever reader the command line selected.
pub type LiveSurvey<'a> = Survey<'a, Box<dyn RegisterReader>>;

pub fn print_all(survey: &LiveSurvey<'_>) {
    let report = survey.report();

    print_layout(survey);
    println!();
    print_regs(survey);
    println!();
    println!("=== Devices ===");
    report.devices.iter().for_each(print_device);
    println!();
    println!("=== Clocks ===");
    report.clocks.iter().for_each(print_clock);
    println!();
    println!("=== Power Domains ===");
    report.power_domains.iter().for_each(print_domain);
    println!();
    println!("=== Events ===");
    report.events.iter().for_each(print_event);
    println!();
    print_fixed_clocks(&report.fixed_clocks);
    println!();
    print_boot_clocks(&report.boot_clocks);

    println!();
    println!("{} errors", report.error_count());
}

pub fn print_layout(survey: &LiveSurvey<'_>) {
    let resolver = survey.resolver();
    println!("=== Config Layout ===");
    println!("Layout : {}", resolver.layout());
    println!("Reader : {}", survey.reader().describe());
    for (block, layout) in (0u32..).zip(resolver.layout().blocks) {
        let base = match resolver.config_base(block) {
            Ok(base) => format!("{base:#x}"),
            Err(e) => format!("? ({e})"),
        };
        println!(" block {block}: {:<10} -> {base}", layout.to_string());
    }
}

fn print_regs(survey: &LiveSurvey<'_>) {
    let pmgr = &survey.description().pmgr;

    println!("=== PS Regs ===");
    for (i, r) in pmgr.ps_regs.iter().enumerate() {
        println!(" #{i:2} reg: {} off: {:05x} mask:{:08x}", r.reg, r.offset, r.mask);
    }

    println!();
    println!("=== Pwrgate Regs ===");
    for (i, r) in pmgr.pwrgate_regs.iter().enumerate() {
        println!(
            " #{i:2} reg: {} off: {:05x} mask:{:08x} unk:{:08x}",
            r.reg, r.offset, r.mask, r.unk
        );
    }
}

pub fn print_devices(survey: &LiveSurvey<'_>) {
    println!("=== Devices ===");
    survey.devices().iter().for_each(print_device);
}

fn print_device(r: &DeviceReport<'_>) {
    let d = r.device;
    let mut line = format!(
        " #{:3} {:20} id: {:3} psreg: {:2}:{:2}  flags:{}  unk1_0: {:3} unk1_1: {:3}  ctl: {}:{:#04x}  unk3: {:3} {:2} {:2} {:3}",
        r.position,
        d.name,
        d.id,
        d.psreg,
        d.psidx,
        r.flags,
        d.unk1_0,
        d.unk1_1,
        d.ctl_block,
        d.ctl_idx,
        d.unk3,
        d.unk2_0,
        d.ps_cfg16,
        d.unk2_3
    );
    let mut errors = Vec::new();

    match &r.power_state {
        Ok(Some(ps)) => match &ps.value {
            Ok(v) => {
                let _ = write!(line, " @ {:#x} = {v:#010x}", ps.addr);
            }
            Err(e) => {
                let _ = write!(line, " @ {:#x} = ?", ps.addr);
                errors.push(e);
            }
        },
        Ok(None) => {}
        Err(e) => {
            line.push_str(" @ ?");
            errors.push(e);
        }
    }

    match &r.power_domain {
        Ok(Some(pd)) => {
            let _ = write!(line, " pd: {}", pd.name);
        }
        Ok(None) => {}
        Err(e) => {
            let _ = write!(line, " pd: #{}", d.pd);
            errors.push(e);
        }
    }

    if d.has_parents() {
        let names: Vec<String> = r
            .parents
            .iter()
            .zip(&d.parents)
            .filter_map(|(parent, &id)| match parent {
                Ok(Some(p)) => Some(p.name.clone()),
                Ok(None) => None,
                Err(_) => Some(format!("#{id}")),
            })
            .collect();
        let _ = write!(line, " parents: {}", names.join(", "));
        errors.extend(r.parents.iter().filter_map(|p| p.as_ref().err()));
    }

    println!("{line}");
    print_errors(errors);
    print_users(&r.users);
}

pub fn print_clocks(survey: &LiveSurvey<'_>) {
    println!("=== Clocks ===");
    survey.clocks().iter().for_each(print_clock);
    println!();
    print_fixed_clocks(&survey.fixed_clocks());
    println!();
    print_boot_clocks(&survey.boot_clocks());
}

fn print_fixed_clocks(fixed: &[FixedClockReport]) {
    println!("=== Fixed Clocks ===");
    for f in fixed {
        println!(" #{}", f.id);
        print_users(&f.users);
    }
}

fn print_boot_clocks(boot: &Result<Vec<BootClockReport>, PmgrError>) {
    println!("=== Boot Clocks ===");
    match boot {
        Ok(slots) => slots.iter().for_each(print_boot_clock),
        Err(e) => println!("  ! {e}"),
    }
}

fn print_clock(r: &ClockReport<'_>) {
    let c = r.clock;
    println!(
        " #{:3} {:20} id: {:3} reg:{}:{:#04x} ({}) unk:{:#x}",
        r.position,
        c.name,
        c.id,
        c.ctl_block,
        c.ctl_idx,
        addr(&r.addr),
        c.unk
    );
    print_errors(r.addr.as_ref().err());
}

fn print_boot_clock(r: &BootClockReport) {
    let slot = &r.slot;
    let value = match &r.value {
        Ok(BootClockSource::Fixed(freq)) => format!("fixed: {freq}"),
        Ok(BootClockSource::RegisterValue { tag, value }) => format!("regval {tag:#x}: {value:#x}"),
        Ok(BootClockSource::Nco(words)) => {
            let words: Vec<String> = words.iter().map(|w| format!("{w:#x}")).collect();
            format!("nco: {}", words.join(" "))
        }
        Ok(BootClockSource::Unknown { tag, payload }) => format!("? {tag:#x}/{payload:#x}"),
        Err(_) => format!("{}: ?", r.source.kind()),
    };
    println!(
        " #{}: {:11} {} {:#x}/{:#x}: {value}",
        slot.index,
        slot.frequency,
        slot.nclk,
        slot.descriptor >> pmgr_driver::chip::TAG_SHIFT,
        slot.descriptor & pmgr_driver::chip::PAYLOAD_MASK
    );
    print_errors(r.value.as_ref().err());
    print_users(&r.users);
}

pub fn print_domains(survey: &LiveSurvey<'_>) {
    println!("=== Power Domains ===");
    survey.power_domains().iter().for_each(print_domain);
}

fn print_domain(r: &PowerDomainReport<'_>) {
    let pd = r.domain;
    println!(
        " #{:3} {:20} id: {:3} reg:{}:{:#04x} ({})",
        r.position,
        pd.name,
        pd.id,
        pd.ctl_block,
        pd.ctl_idx,
        addr(&r.addr)
    );
    print_errors(r.addr.as_ref().err());
}

pub fn print_events(survey: &LiveSurvey<'_>) {
    println!("=== Events ===");
    survey.events().iter().for_each(print_event);
}

fn print_event(r: &EventReport<'_>) {
    let e = r.event;
    let mut line = format!(
        " #{:3} {:20} id: {:3} reg:{}:{:#04x} ({})",
        r.position,
        e.name,
        e.id,
        e.ctl_block,
        e.ctl_idx,
        addr(&r.addr)
    );
    if let Some(addr2) = &r.addr2 {
        let _ = write!(line, " reg2:{}:{:#04x} ({})", e.ctl2_block, e.ctl2_idx, addr(addr2));
    }
    let _ = write!(line, " {:#x} {:#x} {:#x}", e.unk1, e.unk2, e.unk3);
    println!("{line}");

    print_errors(r.addr.as_ref().err());
    print_errors(r.addr2.as_ref().and_then(|a| a.as_ref().err()));
}

fn addr(a: &Result<u64, PmgrError>) -> String {
    match a {
        Ok(a) => format!("{a:#x}"),
        Err(_) => "?".into(),
    }
}

fn print_errors<'e>(errors: impl IntoIterator<Item = &'e PmgrError>) {
    for e in errors {
        println!("  ! {e}");
    }
}

fn print_users(users: &[Consumer]) {
    for u in users {
        println!("  User: {u}");
    }
}
