//! SoC Power Manager (PMGR) topology decoding.
//!
//! Turns a firmware hardware description into a queryable model of PMGR
//! devices, power domains, clocks and events, resolves each entity's
//! control register from its compact block/index encoding, and decodes the
//! boot clock descriptors of the I/O tree root. Strictly read-only: the only
//! hardware access is single 32-bit register reads through an injected
//! [`RegisterReader`].
//!
//! # Pipeline
//!
//! ```text
//! HardwareDescription ──► PmgrIndex ──┬──► AddressResolver ──► register reads
//!         │                           │
//!         └──► DependencyGraph ───────┴──► Survey ──► PmgrReport
//!                                       BootClockDecoder
//! ```
//!
//! # Quick start
//!
//! ```no_run
//! use pmgr_driver::{ConfigLayout, HardwareDescription, RegisterSnapshot, Survey};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let desc = HardwareDescription::from_file("pmgr.json")?;
//! let regs = RegisterSnapshot::from_file("regs.json")?;
//! let survey = Survey::new(&desc, ConfigLayout::REFERENCE, regs)?;
//!
//! for clk in survey.clocks() {
//!     match clk.addr {
//!         Ok(addr) => println!("{:20} {addr:#x}", clk.clock.name),
//!         Err(e) => println!("{:20} {e}", clk.clock.name),
//!     }
//! }
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::doc_markdown)]

pub mod bootclk;
mod error;
pub mod graph;
mod index;
pub mod model;
mod reader;
pub mod readers;
pub mod region;
mod resolver;
pub mod source;
pub mod survey;

/// Silicon constants (re-exported from pmgr-chip).
pub mod chip {
    pub use pmgr_chip::bootclk::{tag, NCO_WORDS, PAYLOAD_MASK, TAG_SHIFT};
    pub use pmgr_chip::regs::{flags, BOOT_CLOCK_ID_BASE, CTL_BLOCK_COUNT, CTL_STRIDE, ID_NONE, PS_STRIDE};
}

pub use bootclk::{BootClockDecoder, BootClockSource, ClockSource};
pub use error::{PmgrError, RecordKind, Result};
pub use graph::{Consumer, ConsumerKind, DependencyGraph};
pub use index::PmgrIndex;
pub use model::{BootClock, Clock, Device, Event, IoDevice, PowerDomain, PsReg, PwrgateReg};
pub use pmgr_chip::layout::{BlockBase, ConfigLayout, LayoutParseError};
pub use reader::RegisterReader;
pub use readers::{DevMem, Offline, RegisterSnapshot};
pub use region::{Region, RegionResolver, RegionTable};
pub use resolver::{AddressResolver, EventAddresses};
pub use source::{HardwareDescription, IoRoot, PmgrNode};
pub use survey::{PmgrReport, Survey};

/// Commonly used types.
pub mod prelude {
    pub use crate::{
        AddressResolver, BootClockDecoder, BootClockSource, ConfigLayout, DependencyGraph,
        HardwareDescription, PmgrError, PmgrIndex, RegisterReader, RegisterSnapshot, Result,
        Survey,
    };
}
