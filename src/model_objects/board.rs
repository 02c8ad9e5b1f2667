use crate::clock_tree::{ClockLookup, ClockSpec, ClockTree, ClockTreeBuilder, LockClass};
use crate::errors::{ClockError, ClockResult};
use crate::hardware::SocFamily;
use crate::profiles::{ClockProfile, OperationSets};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// The clock topologies of a board, one per SoC family it can carry.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq, Serialize)]
pub struct BoardDescription {
    pub name: String,
    pub topologies: Vec<Topology>,
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq, Serialize)]
pub struct Topology {
    pub soc: SocFamily,
    #[serde(default)]
    pub locks: Vec<LockDescription>,
    pub clocks: Vec<ClockDescription>,
    #[serde(default)]
    pub lookups: Vec<LookupDescription>,
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq, Serialize)]
pub struct LockDescription {
    pub name: String,
    pub class: LockClass,
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq, Serialize)]
pub struct ClockDescription {
    pub name: String,
    #[serde(default = "no_profile")]
    pub profile: ClockProfile,
    #[serde(default)]
    pub rate: Option<u64>,
    #[serde(default)]
    pub selector: u32,
    #[serde(default)]
    pub io_base: usize,
    #[serde(default)]
    pub lock: Option<String>,
    #[serde(default)]
    pub parent: Option<String>,
    #[serde(default)]
    pub bus_parent: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub parents: Vec<String>,
}

fn no_profile() -> ClockProfile {
    ClockProfile::None
}

/// Registration of a clock under a device and/or connection name.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq, Serialize)]
pub struct LookupDescription {
    pub clock: String,
    #[serde(default)]
    pub dev_id: Option<String>,
    #[serde(default)]
    pub con_id: Option<String>,
}

impl BoardDescription {
    pub fn from_json(json: &str) -> ClockResult<BoardDescription> {
        serde_json::from_str(json)
            .map_err(|err| ClockError::invalid(format!("malformed board description: {err}")))
    }

    pub fn topology(&self, soc: SocFamily) -> Option<&Topology> {
        self.topologies.iter().find(|topology| topology.soc == soc)
    }
}

/// Reads a board description from a JSON file.
pub fn read_json_board<P: AsRef<Path>>(path: P) -> ClockResult<BoardDescription> {
    let path = path.as_ref();
    let json = fs::read_to_string(path).map_err(|err| {
        ClockError::invalid(format!("could not read {}: {err}", path.display()))
    })?;
    BoardDescription::from_json(&json)
}

impl Topology {
    /// Turns the description into a builder whose clocks use the shared `operations`.
    pub fn builder(&self, operations: &OperationSets) -> ClockResult<ClockTreeBuilder> {
        let mut builder = ClockTreeBuilder::new();
        for lock in &self.locks {
            builder.add_lock(&lock.name, lock.class);
        }

        for clock in &self.clocks {
            let spec = ClockSpec {
                name: clock.name.clone(),
                rate: clock.rate,
                selector: clock.selector,
                io_base: clock.io_base,
                lock: clock.lock.clone(),
                ops: operations.get(clock.profile)?,
                parent: clock.parent.clone(),
                bus_parent: clock.bus_parent.clone(),
                source: clock.source.clone(),
                parents: clock.parents.clone(),
            };
            builder.add_clock(spec);
        }
        Ok(builder)
    }

    pub fn register_lookups(&self, tree: &ClockTree, lookup: &ClockLookup) -> ClockResult<()> {
        for entry in &self.lookups {
            let clock = tree.find(&entry.clock).ok_or_else(|| {
                ClockError::invalid(format!("lookup refers to unknown clock {}", entry.clock))
            })?;
            lookup.register(clock, entry.dev_id.as_deref(), entry.con_id.as_deref());
        }
        Ok(())
    }
}
