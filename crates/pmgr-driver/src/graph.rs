//! Reverse dependency maps over the I/O tree
//!
//! The I/O tree holds more devices than the PMGR does. Each node may name
//! the clocks it consumes and the PMGR devices that gate its clock or power.
//! These maps answer "who uses clock N" and "who depends on PMGR device N".

use crate::model::IoDevice;
use std::collections::BTreeMap;
use std::fmt;

/// How a consumer refers to the id
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConsumerKind {
    /// Listed in `clock_ids`
    Clock,
    /// Listed in `clock_gates`
    ClockGate,
    /// Listed in `power_gates`
    PowerGate,
}

impl ConsumerKind {
    /// Slot label used in consumer identifiers
    pub const fn label(self) -> &'static str {
        match self {
            Self::Clock => "clk",
            Self::ClockGate => "clkgate",
            Self::PowerGate => "pwrgate",
        }
    }
}

/// One dependency slot of an I/O-tree device
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Consumer {
    /// I/O-tree node path
    pub path: String,
    /// List the id was found in
    pub kind: ConsumerKind,
    /// Position within that list
    pub slot: usize,
}

impl fmt::Display for Consumer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}[{}]", self.path, self.kind.label(), self.slot)
    }
}

/// Consumer maps keyed by clock id and by PMGR device id
#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    clock_users: BTreeMap<u32, Vec<Consumer>>,
    dev_users: BTreeMap<u32, Vec<Consumer>>,
}

fn add_edges(
    map: &mut BTreeMap<u32, Vec<Consumer>>,
    path: &str,
    kind: ConsumerKind,
    ids: Option<&[u32]>,
) -> usize {
    let ids = ids.unwrap_or_default();
    for (slot, &id) in ids.iter().enumerate() {
        map.entry(id).or_default().push(Consumer {
            path: path.to_string(),
            kind,
            slot,
        });
    }
    ids.len()
}

impl DependencyGraph {
    /// Scan every I/O-tree device, in order.
    ///
    /// Absent or empty lists contribute nothing. Never fails.
    pub fn build(devices: &[IoDevice]) -> Self {
        let mut graph = Self::default();
        let mut edges = 0;

        for dev in devices {
            edges += add_edges(
                &mut graph.clock_users,
                &dev.path,
                ConsumerKind::Clock,
                dev.clock_ids.as_deref(),
            );
            edges += add_edges(
                &mut graph.dev_users,
                &dev.path,
                ConsumerKind::ClockGate,
                dev.clock_gates.as_deref(),
            );
            edges += add_edges(
                &mut graph.dev_users,
                &dev.path,
                ConsumerKind::PowerGate,
                dev.power_gates.as_deref(),
            );
        }

        tracing::debug!(
            "Dependency graph: {edges} edges from {} I/O devices ({} clocks, {} PMGR devices referenced)",
            devices.len(),
            graph.clock_users.len(),
            graph.dev_users.len()
        );

        graph
    }

    /// Consumers of a clock id, in declaration order
    pub fn clock_users(&self, clock_id: u32) -> &[Consumer] {
        self.clock_users.get(&clock_id).map(Vec::as_slice).unwrap_or_default()
    }

    /// Consumers gating on a PMGR device id, in declaration order
    pub fn dev_users(&self, device_id: u32) -> &[Consumer] {
        self.dev_users.get(&device_id).map(Vec::as_slice).unwrap_or_default()
    }

    /// All referenced clock ids with their consumers, ascending by id
    pub fn clocks(&self) -> impl Iterator<Item = (u32, &[Consumer])> {
        self.clock_users.iter().map(|(&id, users)| (id, users.as_slice()))
    }

    /// All referenced PMGR device ids with their consumers, ascending by id
    pub fn devices(&self) -> impl Iterator<Item = (u32, &[Consumer])> {
        self.dev_users.iter().map(|(&id, users)| (id, users.as_slice()))
    }
}
