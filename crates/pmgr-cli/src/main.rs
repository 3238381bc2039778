//! `pmgr`: command-line PMGR topology dump.
//!
//! ```text
//! USAGE:
//!   pmgr dump    <description.json>   Every section
//!   pmgr devices <description.json>   PMGR devices with power state
//!   pmgr clocks  <description.json>   Clocks, fixed clocks, boot clocks
//!   pmgr domains <description.json>   Power domains
//!   pmgr events  <description.json>   Events
//!   pmgr layout  <description.json>   Effective config base table
//!
//! OPTIONS:
//!   --layout <sel:off,...>   Config base layout      [env: PMGR_CFG_LAYOUT]
//!   --snapshot <file>        Recorded register values [env: PMGR_SNAPSHOT]
//!   --devmem                 Live reads via /dev/mem (root)
//! ```

mod report;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use pmgr_driver::{
    ConfigLayout, DevMem, HardwareDescription, Offline, RegisterReader, RegisterSnapshot, Survey,
};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "pmgr", about = "SoC power manager topology dump", version)]
struct Cli {
    #[command(subcommand)]
    command: Cmd,
}

#[derive(Subcommand)]
enum Cmd {
    /// Print every section.
    Dump(Target),
    /// PMGR devices with power-state registers, domains, parents and users.
    Devices(Target),
    /// Clock control registers, fixed clock users and boot clocks.
    Clocks(Target),
    /// Power domain control registers.
    Domains(Target),
    /// Event control registers.
    Events(Target),
    /// Config base table derived from the layout.
    Layout(Target),
}

#[derive(Args)]
struct Target {
    /// Hardware description (JSON).
    description: PathBuf,

    /// Config base layout: four region:offset pairs, one per control block.
    #[arg(long, env = "PMGR_CFG_LAYOUT", default_value_t = ConfigLayout::REFERENCE)]
    layout: ConfigLayout,

    /// Register snapshot (JSON) to read values from.
    #[arg(long, env = "PMGR_SNAPSHOT", conflicts_with = "devmem")]
    snapshot: Option<PathBuf>,

    /// Read live registers through /dev/mem.
    #[arg(long)]
    devmem: bool,
}

impl Target {
    fn reader(&self) -> Result<Box<dyn RegisterReader>> {
        if self.devmem {
            return Ok(Box::new(DevMem::open().context("live register access")?));
        }
        if let Some(path) = &self.snapshot {
            return Ok(Box::new(RegisterSnapshot::from_file(path)?));
        }
        Ok(Box::new(Offline))
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Cmd::Dump(t) => run(&t, report::print_all)?,
        Cmd::Devices(t) => run(&t, report::print_devices)?,
        Cmd::Clocks(t) => run(&t, report::print_clocks)?,
        Cmd::Domains(t) => run(&t, report::print_domains)?,
        Cmd::Events(t) => run(&t, report::print_events)?,
        Cmd::Layout(t) => run(&t, report::print_layout)?,
    }

    Ok(())
}

fn run(target: &Target, print: fn(&report::LiveSurvey<'_>)) -> Result<()> {
    let desc = HardwareDescription::from_file(&target.description)?;
    let reader = target.reader()?;
    tracing::debug!("Reading registers via {}", reader.describe());
    let survey = Survey::new(&desc, target.layout, reader)
        .with_context(|| format!("cannot survey {}", target.description.display()))?;

    print(&survey);
    Ok(())
}
