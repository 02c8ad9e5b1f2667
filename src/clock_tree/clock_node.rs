use crate::clock_tree::clock_ops::ClockOps;
use crate::clock_tree::lock::LockRef;
use std::fmt;
use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};
use std::sync::Arc;

/// Index of a clock in its [crate::clock_tree::ClockTree].
pub type ClockId = usize;

const NO_PARENT: usize = usize::MAX;

/// A modeled hardware clock gate, divider or PLL output.
///
/// The mutable parts (enable count and functional parent) are only written while
/// the lock named by `lock` is held. They are atomics so that readers outside the
/// lock still see a consistent value.
pub struct ClockNode {
    pub name: String,
    enabled: AtomicU32,
    /// Fixed rate, used when the operation set has no rate query.
    pub rate: Option<u64>,
    /// Opaque hardware selector (register bits, controller clock id).
    pub selector: u32,
    /// Register block base, interpreted only by the operation set.
    pub io_base: usize,
    pub lock: LockRef,
    pub ops: Option<Arc<dyn ClockOps>>,
    parent: AtomicUsize,
    pub bus_parent: Option<ClockId>,
    /// Clock gating the register block of a kernel clock.
    pub source: Option<ClockId>,
    /// Valid candidates for reparenting, in priority order.
    pub parents: Vec<ClockId>,
}

impl ClockNode {
    pub(crate) fn new(
        name: String,
        rate: Option<u64>,
        selector: u32,
        io_base: usize,
        lock: LockRef,
        ops: Option<Arc<dyn ClockOps>>,
    ) -> ClockNode {
        ClockNode {
            name,
            enabled: AtomicU32::new(0),
            rate,
            selector,
            io_base,
            lock,
            ops,
            parent: AtomicUsize::new(NO_PARENT),
            bus_parent: None,
            source: None,
            parents: vec![],
        }
    }

    pub fn enable_count(&self) -> u32 {
        self.enabled.load(Ordering::Acquire)
    }

    pub fn is_enabled(&self) -> bool {
        self.enable_count() > 0
    }

    /// The functional parent, i.e. the clock supplying this clock's rate.
    pub fn parent(&self) -> Option<ClockId> {
        match self.parent.load(Ordering::Acquire) {
            NO_PARENT => None,
            id => Some(id),
        }
    }

    pub fn ops(&self) -> Option<&dyn ClockOps> {
        self.ops.as_deref()
    }

    // The setters below must only be called with `self.lock` held.

    pub(crate) fn set_parent_ref(&self, parent: Option<ClockId>) {
        self.parent
            .store(parent.unwrap_or(NO_PARENT), Ordering::Release);
    }

    pub(crate) fn increment(&self) -> u32 {
        self.enabled.fetch_add(1, Ordering::AcqRel) + 1
    }

    /// Returns the new count, or `None` if the count already was zero.
    pub(crate) fn decrement(&self) -> Option<u32> {
        self.enabled
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |count| {
                count.checked_sub(1)
            })
            .ok()
            .map(|previous| previous - 1)
    }
}

impl fmt::Debug for ClockNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClockNode")
            .field("name", &self.name)
            .field("enabled", &self.enable_count())
            .field("rate", &self.rate)
            .field("selector", &format_args!("{:#x}", self.selector))
            .field("io_base", &format_args!("{:#x}", self.io_base))
            .field("lock", &self.lock)
            .field("parent", &self.parent())
            .field("bus_parent", &self.bus_parent)
            .field("source", &self.source)
            .field("parents", &self.parents)
            .finish()
    }
}
