//! Recorded register values
//!
//! A snapshot is a JSON object from address to value. Keys are hex (`0x`
//! prefix) or decimal strings; values are integers or strings in the same
//! notation:
//!
//! ```json
//! { "0x23b700420": "0x0f", "0x23b7c1000": 24000000 }
//! ```

use crate::error::{PmgrError, Result};
use crate::reader::RegisterReader;
use serde_json::Value;
use std::collections::HashMap;
use std::path::Path;

fn parse_int(text: &str) -> Option<u64> {
    let text = text.trim();
    match text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        Some(hex) => u64::from_str_radix(&hex.replace('_', ""), 16).ok(),
        None => text.parse().ok(),
    }
}

/// Address-to-value table standing in for live hardware
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegisterSnapshot {
    values: HashMap<u64, u32>,
    source: Option<String>,
}

impl RegisterSnapshot {
    /// Empty snapshot
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a JSON snapshot
    ///
    /// # Errors
    ///
    /// Returns `PmgrError::Json` for invalid JSON and
    /// `PmgrError::InvalidSnapshot` for keys or values that are not 32-bit
    /// register values at numeric addresses.
    pub fn from_json(text: &str) -> Result<Self> {
        let raw: HashMap<String, Value> = serde_json::from_str(text)?;
        let mut values = HashMap::with_capacity(raw.len());

        for (key, value) in raw {
            let addr = parse_int(&key)
                .ok_or_else(|| PmgrError::invalid_snapshot(format!("bad address {key:?}")))?;
            let parsed = match &value {
                Value::Number(n) => n.as_u64(),
                Value::String(s) => parse_int(s),
                _ => None,
            };
            let word = parsed
                .and_then(|v| u32::try_from(v).ok())
                .ok_or_else(|| {
                    PmgrError::invalid_snapshot(format!("bad value {value} @ {addr:#x}"))
                })?;
            values.insert(addr, word);
        }

        Ok(Self {
            values,
            source: None,
        })
    }

    /// Load a JSON snapshot from disk
    ///
    /// # Errors
    ///
    /// Returns `PmgrError::File` if the file cannot be read, otherwise as
    /// [`RegisterSnapshot::from_json`].
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| PmgrError::file(path, e))?;
        let mut snapshot = Self::from_json(&text)?;
        snapshot.source = Some(path.display().to_string());

        tracing::info!("Loaded {} register values from {}", snapshot.len(), path.display());
        Ok(snapshot)
    }

    /// Record a value
    pub fn insert(&mut self, addr: u64, value: u32) {
        self.values.insert(addr, value);
    }

    /// Number of recorded registers
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether nothing is recorded
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl FromIterator<(u64, u32)> for RegisterSnapshot {
    fn from_iter<I: IntoIterator<Item = (u64, u32)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
            source: None,
        }
    }
}

impl RegisterReader for RegisterSnapshot {
    fn read32(&self, addr: u64) -> Result<u32> {
        let value = self
            .values
            .get(&addr)
            .copied()
            .ok_or_else(|| PmgrError::access(addr, "not present in snapshot"))?;
        tracing::trace!("Snapshot read32 @ {addr:#x} = {value:#x}");
        Ok(value)
    }

    fn describe(&self) -> String {
        match &self.source {
            Some(path) => format!("snapshot {path}"),
            None => format!("snapshot ({} registers)", self.values.len()),
        }
    }
}
