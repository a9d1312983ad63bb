//! Domain identity and status snapshot types

use crate::domain::{FrequencyTable, FrequencyUnit, Governor};
use crate::sysfs::layout::parse_core_dir;
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;

/// Identity of a controllable clock domain
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DomainId {
    /// A CPU core by index
    Cpu(u32),
    /// The GPU
    Gpu,
}

impl DomainId {
    /// Unit in which this domain's frequencies are expressed
    pub const fn unit(&self) -> FrequencyUnit {
        match self {
            DomainId::Cpu(_) => FrequencyUnit::KHz,
            DomainId::Gpu => FrequencyUnit::Hz,
        }
    }
}

impl fmt::Display for DomainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DomainId::Cpu(core) => write!(f, "cpu{}", core),
            DomainId::Gpu => f.write_str("gpu"),
        }
    }
}

/// Where a domain's frequency table came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FrequencySource {
    /// Read from the hardware's available-frequencies list
    #[default]
    Hardware,
    /// Built-in best-effort table, not queried from hardware
    Fallback,
}

impl fmt::Display for FrequencySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FrequencySource::Hardware => f.write_str("hardware"),
            FrequencySource::Fallback => f.write_str("fallback (built-in table)"),
        }
    }
}

/// Point-in-time status of one domain
///
/// Fields that could not be read are `None` rather than failing the snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainSnapshot {
    /// Current frequency in the domain's native unit
    pub current_freq: Option<u64>,
    /// Current scaling governor
    pub governor: Option<Governor>,
    /// Legal frequency steps
    pub available_freqs: FrequencyTable,
    /// Origin of `available_freqs`
    #[serde(default)]
    pub freq_source: FrequencySource,
    /// Control directory bound at discovery
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

impl DomainSnapshot {
    /// Whether manual frequency writes are currently accepted
    pub fn is_userspace(&self) -> bool {
        self.governor.as_ref().is_some_and(Governor::is_userspace)
    }
}

/// Per-core CPU snapshots, ordered by core index
///
/// Serialized as a map keyed `cpu0`, `cpu1`, ... in ascending core order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CpuStatus(BTreeMap<u32, DomainSnapshot>);

impl CpuStatus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, core: u32, snapshot: DomainSnapshot) {
        self.0.insert(core, snapshot);
    }

    pub fn get(&self, core: u32) -> Option<&DomainSnapshot> {
        self.0.get(&core)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Snapshots in ascending core order
    pub fn iter(&self) -> impl Iterator<Item = (u32, &DomainSnapshot)> {
        self.0.iter().map(|(core, snapshot)| (*core, snapshot))
    }
}

impl FromIterator<(u32, DomainSnapshot)> for CpuStatus {
    fn from_iter<I: IntoIterator<Item = (u32, DomainSnapshot)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl Serialize for CpuStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (core, snapshot) in &self.0 {
            map.serialize_entry(&DomainId::Cpu(*core).to_string(), snapshot)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for CpuStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = BTreeMap::<String, DomainSnapshot>::deserialize(deserializer)?;
        raw.into_iter()
            .map(|(key, snapshot)| {
                parse_core_dir(&key)
                    .map(|core| (core, snapshot))
                    .ok_or_else(|| serde::de::Error::custom(format!("invalid core key '{}'", key)))
            })
            .collect()
    }
}
