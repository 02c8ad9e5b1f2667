/// Reference-counted clock tree.
///
/// Clocks form a forest where each clock may depend on a functional parent (its rate
/// source) and a bus parent (gating register access). Enabling a clock enables its
/// ancestors first; disabling the last reference tears them down in reverse order.
///
/// Locking: every clock is guarded either by the shared fallback lock or by a
/// dedicated lock. The recursive walks carry a [LockToken] for the lock already held
/// and skip taking a parent's lock when it is the same one.
pub mod builder;
pub mod clock_node;
pub mod clock_ops;
pub mod lock;
pub mod lookup;
pub mod tree;

pub use builder::{ClockSpec, ClockTreeBuilder};
pub use clock_node::{ClockId, ClockNode};
pub use clock_ops::{ClockOps, OpContext};
pub use lock::{LockClass, LockRef, LockToken};
pub use lookup::ClockLookup;
pub use tree::ClockTree;
