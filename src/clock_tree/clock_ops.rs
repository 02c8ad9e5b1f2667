use crate::clock_tree::clock_node::{ClockId, ClockNode};
use crate::clock_tree::lock::LockToken;
use crate::clock_tree::ClockTree;
use crate::errors::{ClockError, ClockResult};

/// What an operation is invoked on: the clock, the tree it lives in, and the lock
/// the tree holds on its behalf.
///
/// Only the tree creates contexts, always for one of its own clocks.
pub struct OpContext<'a> {
    pub(crate) tree: &'a ClockTree,
    pub(crate) clock: ClockId,
    pub(crate) held: LockToken,
}

impl<'a> OpContext<'a> {
    pub fn tree(&self) -> &'a ClockTree {
        self.tree
    }

    pub fn clock(&self) -> ClockId {
        self.clock
    }

    /// Token of the lock held for [OpContext::clock], to pass on to nested walks.
    pub fn held(&self) -> LockToken {
        self.held
    }

    pub fn node(&self) -> &'a ClockNode {
        self.tree.node_unchecked(self.clock)
    }

    pub fn name(&self) -> &'a str {
        &self.node().name
    }
}

/// Hardware capabilities of a clock.
///
/// Every method is optional. The defaults describe an absent capability: enable and
/// disable do nothing, there is no dynamic rate, rate changes are unsupported and
/// reparenting is left to the tree. One instance may be shared by many clocks.
pub trait ClockOps: Send + Sync {
    /// Gates the clock on. Runs with the clock's lock held and its parents enabled.
    fn enable(&self, _ctx: &OpContext<'_>) -> ClockResult<()> {
        Ok(())
    }

    /// Gates the clock off. Failures are reported by the implementation itself.
    fn disable(&self, _ctx: &OpContext<'_>) {}

    /// Current rate as reported by hardware, `None` if the clock cannot tell.
    fn get_rate(&self, _ctx: &OpContext<'_>) -> Option<u64> {
        None
    }

    fn round_rate(&self, _ctx: &OpContext<'_>, _rate: u64) -> ClockResult<u64> {
        Err(ClockError::Unsupported)
    }

    fn set_rate(&self, _ctx: &OpContext<'_>, _rate: u64) -> ClockResult<()> {
        Err(ClockError::Unsupported)
    }

    /// Custom reparenting. `None` lets the tree switch the parent itself.
    fn set_parent(&self, _ctx: &OpContext<'_>, _parent: ClockId) -> Option<ClockResult<()>> {
        None
    }

    /// True if enable or disable may block. Such clocks need a sleeping lock.
    fn may_sleep(&self) -> bool {
        false
    }
}
