use crate::clock_tree::clock_node::ClockId;
use parking_lot::RwLock;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClockLookupEntry {
    pub clock: ClockId,
    pub dev_id: Option<String>,
    pub con_id: Option<String>,
}

/// Directory mapping (device, connection) names to clocks.
///
/// An entry without a device or connection name matches any value for that field.
/// Lookup picks the most specific entry: a device match weighs more than a
/// connection match, and the first registered entry wins a tie.
#[derive(Debug, Default)]
pub struct ClockLookup {
    entries: RwLock<Vec<ClockLookupEntry>>,
}

impl ClockLookup {
    pub fn new() -> ClockLookup {
        ClockLookup::default()
    }

    pub fn register(&self, clock: ClockId, dev_id: Option<&str>, con_id: Option<&str>) {
        self.entries.write().push(ClockLookupEntry {
            clock,
            dev_id: dev_id.map(str::to_string),
            con_id: con_id.map(str::to_string),
        });
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    pub fn find(&self, dev_id: Option<&str>, con_id: Option<&str>) -> Option<ClockId> {
        let entries = self.entries.read();
        let mut best: Option<(u8, ClockId)> = None;

        for entry in entries.iter() {
            let mut score = 0;
            if let Some(wanted) = &entry.dev_id {
                if dev_id != Some(wanted.as_str()) {
                    continue;
                }
                score += 2;
            }
            if let Some(wanted) = &entry.con_id {
                if con_id != Some(wanted.as_str()) {
                    continue;
                }
                score += 1;
            }

            if best.map_or(true, |(best_score, _)| score > best_score) {
                best = Some((score, entry.clock));
                if score == 3 {
                    break;
                }
            }
        }
        best.map(|(_, clock)| clock)
    }
}
