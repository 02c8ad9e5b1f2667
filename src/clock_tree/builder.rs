use crate::clock_tree::clock_node::{ClockId, ClockNode};
use crate::clock_tree::clock_ops::ClockOps;
use crate::clock_tree::lock::{LockClass, LockRef, LockTable};
use crate::clock_tree::ClockTree;
use crate::errors::{ClockError, ClockResult};
use log::debug;
use std::collections::HashMap;
use std::sync::Arc;

/// Description of one clock, with relations given by name.
#[derive(Clone, Default)]
pub struct ClockSpec {
    pub name: String,
    pub rate: Option<u64>,
    pub selector: u32,
    pub io_base: usize,
    pub lock: Option<String>,
    pub ops: Option<Arc<dyn ClockOps>>,
    pub parent: Option<String>,
    pub bus_parent: Option<String>,
    pub source: Option<String>,
    pub parents: Vec<String>,
}

impl ClockSpec {
    pub fn new(name: &str) -> ClockSpec {
        ClockSpec {
            name: name.to_string(),
            ..ClockSpec::default()
        }
    }

    pub fn rate(mut self, rate: u64) -> Self {
        self.rate = Some(rate);
        self
    }

    pub fn selector(mut self, selector: u32) -> Self {
        self.selector = selector;
        self
    }

    pub fn io_base(mut self, io_base: usize) -> Self {
        self.io_base = io_base;
        self
    }

    /// Guards the clock with the named dedicated lock instead of the fallback lock.
    pub fn lock(mut self, lock: &str) -> Self {
        self.lock = Some(lock.to_string());
        self
    }

    pub fn ops(mut self, ops: Arc<dyn ClockOps>) -> Self {
        self.ops = Some(ops);
        self
    }

    pub fn parent(mut self, parent: &str) -> Self {
        self.parent = Some(parent.to_string());
        self
    }

    pub fn bus_parent(mut self, bus_parent: &str) -> Self {
        self.bus_parent = Some(bus_parent.to_string());
        self
    }

    pub fn source(mut self, source: &str) -> Self {
        self.source = Some(source.to_string());
        self
    }

    pub fn parents(mut self, parents: &[&str]) -> Self {
        self.parents = parents.iter().map(|p| p.to_string()).collect();
        self
    }
}

/// Collects locks and clocks and checks the topology once before handing out a
/// [ClockTree].
///
/// Checked here, not on the runtime path:
/// - names are unique and every relation names a known clock or lock,
/// - the parent, bus parent and source relations form no cycle,
/// - no clock on an atomic lock depends on a clock behind a sleeping lock, and no
///   clock whose operations may sleep is put on an atomic lock,
/// - no dependency path returns to a lock it left for another one.
#[derive(Default)]
pub struct ClockTreeBuilder {
    locks: LockTable,
    specs: Vec<ClockSpec>,
}

impl ClockTreeBuilder {
    pub fn new() -> ClockTreeBuilder {
        ClockTreeBuilder::default()
    }

    pub fn lock(mut self, name: &str, class: LockClass) -> Self {
        self.add_lock(name, class);
        self
    }

    pub fn add_lock(&mut self, name: &str, class: LockClass) -> LockRef {
        self.locks.add(name, class)
    }

    pub fn clock(mut self, spec: ClockSpec) -> Self {
        self.add_clock(spec);
        self
    }

    /// Adds a clock and returns the id it will have in the built tree.
    pub fn add_clock(&mut self, spec: ClockSpec) -> ClockId {
        self.specs.push(spec);
        self.specs.len() - 1
    }

    pub fn build(self) -> ClockResult<ClockTree> {
        let mut names: HashMap<String, ClockId> = HashMap::new();
        for (id, spec) in self.specs.iter().enumerate() {
            if names.insert(spec.name.clone(), id).is_some() {
                return Err(ClockError::invalid(format!(
                    "clock {} is declared twice",
                    spec.name
                )));
            }
        }

        let lookup = |owner: &str, name: &str| -> ClockResult<ClockId> {
            names.get(name).copied().ok_or_else(|| {
                ClockError::invalid(format!("clock {owner} refers to unknown clock {name}"))
            })
        };
        let resolve = |owner: &str, name: &Option<String>| -> ClockResult<Option<ClockId>> {
            name.as_deref().map(|name| lookup(owner, name)).transpose()
        };

        let mut nodes = Vec::with_capacity(self.specs.len());
        for spec in &self.specs {
            let lock = match &spec.lock {
                None => LockRef::Fallback,
                Some(lock) => self.locks.find(lock).ok_or_else(|| {
                    ClockError::invalid(format!("clock {} uses unknown lock {lock}", spec.name))
                })?,
            };

            let mut node = ClockNode::new(
                spec.name.clone(),
                spec.rate,
                spec.selector,
                spec.io_base,
                lock,
                spec.ops.clone(),
            );
            node.set_parent_ref(resolve(&spec.name, &spec.parent)?);
            node.bus_parent = resolve(&spec.name, &spec.bus_parent)?;
            node.source = resolve(&spec.name, &spec.source)?;
            node.parents = spec
                .parents
                .iter()
                .map(|parent| lookup(&spec.name, parent))
                .collect::<ClockResult<Vec<ClockId>>>()?;
            nodes.push(node);
        }

        check_acyclic(&nodes)?;
        check_lock_classes(&nodes, &self.locks)?;
        check_lock_reentry(&nodes, &self.locks)?;

        debug!(
            "Built clock tree with {} clocks and {} dedicated locks",
            nodes.len(),
            self.locks.len()
        );
        Ok(ClockTree {
            nodes,
            locks: self.locks,
            names,
        })
    }
}

/// Clocks a node depends on when it is enabled.
fn dependencies(node: &ClockNode) -> impl Iterator<Item = ClockId> {
    node.parent()
        .into_iter()
        .chain(node.bus_parent)
        .chain(node.source)
        .chain(node.parents.clone())
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Visit {
    New,
    Active,
    Done,
}

fn check_acyclic(nodes: &[ClockNode]) -> ClockResult<()> {
    let mut state = vec![Visit::New; nodes.len()];

    for root in 0..nodes.len() {
        if state[root] != Visit::New {
            continue;
        }
        // Iterative depth-first walk; the stack holds a node and its pending edges.
        let mut stack = vec![(root, dependencies(&nodes[root]).collect::<Vec<_>>())];
        state[root] = Visit::Active;

        while let Some((current, pending)) = stack.last_mut() {
            let current = *current;
            let Some(next) = pending.pop() else {
                state[current] = Visit::Done;
                stack.pop();
                continue;
            };
            match state[next] {
                Visit::Active => {
                    return Err(ClockError::invalid(format!(
                        "clock {} depends on itself through {}",
                        nodes[next].name, nodes[current].name
                    )));
                }
                Visit::New => {
                    state[next] = Visit::Active;
                    stack.push((next, dependencies(&nodes[next]).collect()));
                }
                Visit::Done => {}
            }
        }
    }
    Ok(())
}

fn check_lock_classes(nodes: &[ClockNode], locks: &LockTable) -> ClockResult<()> {
    let name = |lock: LockRef| locks.name(lock).unwrap_or_default();

    for node in nodes {
        if locks.class(node.lock) != Some(LockClass::Atomic) {
            continue;
        }
        if node.ops().map_or(false, |ops| ops.may_sleep()) {
            return Err(ClockError::invalid(format!(
                "clock {} may sleep but is guarded by atomic lock {}",
                node.name,
                name(node.lock)
            )));
        }
        for dependency in dependencies(node) {
            let other = &nodes[dependency];
            if other.lock != node.lock && locks.class(other.lock) == Some(LockClass::Sleeping) {
                return Err(ClockError::invalid(format!(
                    "clock {} is guarded by atomic lock {} but depends on {} behind sleeping lock {}",
                    node.name,
                    name(node.lock),
                    other.name,
                    name(other.lock)
                )));
            }
        }
    }
    Ok(())
}

/// Rejects a lock that comes back further up a dependency path after another lock
/// was taken in between. The walks only elide the lock of the clock right below, so
/// such a path would take the lock twice.
fn check_lock_reentry(nodes: &[ClockNode], locks: &LockTable) -> ClockResult<()> {
    for start in 0..nodes.len() {
        let mut paths = vec![(start, vec![nodes[start].lock])];

        while let Some((current, held)) = paths.pop() {
            let lock = nodes[current].lock;
            for next in dependencies(&nodes[current]) {
                let next_lock = nodes[next].lock;
                if next_lock == lock {
                    paths.push((next, held.clone()));
                    continue;
                }
                if held.contains(&next_lock) {
                    return Err(ClockError::invalid(format!(
                        "enabling clock {} would take lock {} again at {}",
                        nodes[start].name,
                        locks.name(next_lock).unwrap_or_default(),
                        nodes[next].name
                    )));
                }
                let mut held = held.clone();
                held.push(next_lock);
                paths.push((next, held));
            }
        }
    }
    Ok(())
}
