use crate::clock_tree::clock_node::{ClockId, ClockNode};
use crate::clock_tree::clock_ops::OpContext;
use crate::clock_tree::lock::{LockTable, LockToken};
use crate::errors::{ClockError, ClockResult};
use log::{debug, warn};
use std::collections::HashMap;

/// Owner of every clock node and lock of a board.
///
/// Nodes refer to each other by [ClockId]. The tree is built once by
/// [crate::clock_tree::ClockTreeBuilder] and lives as long as the platform.
#[derive(Debug)]
pub struct ClockTree {
    pub(crate) nodes: Vec<ClockNode>,
    pub(crate) locks: LockTable,
    pub(crate) names: HashMap<String, ClockId>,
}

impl ClockTree {
    pub fn find(&self, name: &str) -> Option<ClockId> {
        self.names.get(name).copied()
    }

    pub fn node(&self, clock: ClockId) -> Option<&ClockNode> {
        self.nodes.get(clock)
    }

    pub(crate) fn node_unchecked(&self, clock: ClockId) -> &ClockNode {
        &self.nodes[clock]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ClockId, &ClockNode)> {
        self.nodes.iter().enumerate()
    }

    /// Enable count of `clock`, 0 for an unknown clock.
    pub fn enable_count(&self, clock: ClockId) -> u32 {
        self.node(clock).map_or(0, ClockNode::enable_count)
    }

    pub fn parent(&self, clock: ClockId) -> Option<ClockId> {
        self.node(clock).and_then(ClockNode::parent)
    }

    pub fn bus_parent(&self, clock: ClockId) -> Option<ClockId> {
        self.node(clock).and_then(|node| node.bus_parent)
    }

    fn checked(&self, clock: ClockId) -> ClockResult<&ClockNode> {
        self.node(clock)
            .ok_or_else(|| ClockError::invalid(format!("no clock with id {clock}")))
    }

    /// Enables `clock`, enabling its bus parent and then its functional parent first.
    ///
    /// Only the first enable reaches hardware. If any step fails, the parents that
    /// were already enabled are disabled again and the error is returned unchanged.
    pub fn enable(&self, clock: ClockId) -> ClockResult<()> {
        self.enable_nested(Some(clock), LockToken::unlocked())
    }

    /// Drops one enable reference of `clock`.
    ///
    /// When the count reaches zero, the clock is gated off and its functional and bus
    /// parents are released. Disabling a clock that is not enabled is a caller bug; it
    /// is logged and reported as [ClockError::AlreadyDisabled] without touching state.
    pub fn disable(&self, clock: ClockId) -> ClockResult<()> {
        let node = self.checked(clock)?;
        if self.disable_nested(Some(clock), LockToken::unlocked()) {
            Ok(())
        } else {
            warn!("clock {}: disable without matching enable", node.name);
            Err(ClockError::AlreadyDisabled {
                name: node.name.clone(),
            })
        }
    }

    /// Enable walk for callers that already hold the lock named by `held`.
    ///
    /// Used by operation sets that must power another clock while running under the
    /// tree's lock. A `None` clock is a successful no-op.
    pub fn enable_nested(&self, clock: Option<ClockId>, held: LockToken) -> ClockResult<()> {
        let Some(id) = clock else {
            return Ok(());
        };
        let node = self.checked(id)?;
        let _guard = self.locks.acquire(node.lock, held);
        let token = LockToken::held(node.lock);

        if !node.is_enabled() {
            let parent = node.parent();
            self.enable_nested(node.bus_parent, token)?;

            if let Err(err) = self.enable_nested(parent, token) {
                self.disable_nested(node.bus_parent, token);
                return Err(err);
            }

            if let Some(ops) = node.ops() {
                let ctx = OpContext {
                    tree: self,
                    clock: id,
                    held: token,
                };
                if let Err(err) = ops.enable(&ctx) {
                    debug!("clock {}: enable failed: {err}", node.name);
                    self.disable_nested(parent, token);
                    self.disable_nested(node.bus_parent, token);
                    return Err(err);
                }
            }
            debug!("clock {}: enabled", node.name);
        }
        node.increment();

        Ok(())
    }

    /// Disable walk for callers that already hold the lock named by `held`.
    ///
    /// Returns false if the clock was not enabled or does not exist. A `None` clock
    /// counts as released.
    pub fn disable_nested(&self, clock: Option<ClockId>, held: LockToken) -> bool {
        let Some(id) = clock else {
            return true;
        };
        let Some(node) = self.node(id) else {
            warn!("clock {id}: disable of unknown clock");
            return false;
        };
        let _guard = self.locks.acquire(node.lock, held);
        let token = LockToken::held(node.lock);

        match node.decrement() {
            None => false,
            Some(0) => {
                if let Some(ops) = node.ops() {
                    ops.disable(&OpContext {
                        tree: self,
                        clock: id,
                        held: token,
                    });
                }
                debug!("clock {}: disabled", node.name);
                self.disable_nested(node.parent(), token);
                self.disable_nested(node.bus_parent, token);
                true
            }
            Some(_) => true,
        }
    }

    /// Effective rate of `clock`: the hardware rate, else the non-zero fixed rate, else
    /// the rate of the functional parent. 0 if none of the chain knows its rate.
    pub fn get_rate(&self, clock: ClockId) -> u64 {
        if self.node(clock).is_none() {
            return 0;
        }
        self.get_rate_nested(Some(clock), LockToken::unlocked())
    }

    fn get_rate_nested(&self, clock: Option<ClockId>, held: LockToken) -> u64 {
        let Some(id) = clock else {
            return 0;
        };
        let node = &self.nodes[id];
        let _guard = self.locks.acquire(node.lock, held);
        let token = LockToken::held(node.lock);

        let hardware_rate = node.ops().and_then(|ops| {
            ops.get_rate(&OpContext {
                tree: self,
                clock: id,
                held: token,
            })
        });
        // A fixed rate of 0 means the rate is not known.
        match (hardware_rate, node.rate.filter(|rate| *rate != 0)) {
            (Some(rate), _) | (None, Some(rate)) => rate,
            (None, None) => self.get_rate_nested(node.parent(), token),
        }
    }

    /// Closest rate the clock itself can produce for `rate`.
    pub fn round_rate(&self, clock: ClockId, rate: u64) -> ClockResult<u64> {
        let node = self.checked(clock)?;
        let _guard = self.locks.acquire(node.lock, LockToken::unlocked());
        let ctx = OpContext {
            tree: self,
            clock,
            held: LockToken::held(node.lock),
        };
        match node.ops() {
            Some(ops) => ops.round_rate(&ctx, rate),
            None => Err(ClockError::Unsupported),
        }
    }

    /// Like [ClockTree::round_rate], but asks the functional parent of `clock`.
    ///
    /// For clocks whose rate is entirely set by their parent. Only the parent is locked,
    /// and not at all when it shares the lock of `clock`.
    pub fn round_rate_rec(&self, clock: ClockId, rate: u64) -> ClockResult<u64> {
        let (parent, ctx) = self.parent_context(clock)?;
        let _guard = self
            .locks
            .acquire(parent.lock, LockToken::held(self.nodes[clock].lock));
        match parent.ops() {
            Some(ops) => ops.round_rate(&ctx, rate),
            None => Err(ClockError::Unsupported),
        }
    }

    pub fn set_rate(&self, clock: ClockId, rate: u64) -> ClockResult<()> {
        let node = self.checked(clock)?;
        let _guard = self.locks.acquire(node.lock, LockToken::unlocked());
        let ctx = OpContext {
            tree: self,
            clock,
            held: LockToken::held(node.lock),
        };
        match node.ops() {
            Some(ops) => ops.set_rate(&ctx, rate),
            None => Err(ClockError::Unsupported),
        }
    }

    /// Sets the rate of the functional parent of `clock`, locking as
    /// [ClockTree::round_rate_rec] does.
    pub fn set_rate_rec(&self, clock: ClockId, rate: u64) -> ClockResult<()> {
        let (parent, ctx) = self.parent_context(clock)?;
        let _guard = self
            .locks
            .acquire(parent.lock, LockToken::held(self.nodes[clock].lock));
        match parent.ops() {
            Some(ops) => ops.set_rate(&ctx, rate),
            None => Err(ClockError::Unsupported),
        }
    }

    fn parent_context(&self, clock: ClockId) -> ClockResult<(&ClockNode, OpContext<'_>)> {
        let node = self.checked(clock)?;
        let parent_id = node
            .parent()
            .ok_or_else(|| ClockError::invalid(format!("clock {} has no parent", node.name)))?;
        let parent = &self.nodes[parent_id];
        let ctx = OpContext {
            tree: self,
            clock: parent_id,
            held: LockToken::held(parent.lock),
        };
        Ok((parent, ctx))
    }

    /// Switches the functional parent of `clock` to `parent`.
    ///
    /// `parent` must be one of the clock's allowed parents. If the operation set has
    /// its own reparenting it does the switch. Otherwise an enabled clock enables the
    /// new parent before releasing the old one, so it is never left unpowered. On
    /// failure nothing changes.
    pub fn set_parent(&self, clock: ClockId, parent: ClockId) -> ClockResult<()> {
        let node = self.checked(clock)?;
        if node.parents.is_empty() {
            return Err(ClockError::invalid(format!(
                "clock {} has no selectable parents",
                node.name
            )));
        }
        if !node.parents.contains(&parent) {
            return Err(ClockError::invalid(format!(
                "clock {parent} is not a valid parent of {}",
                node.name
            )));
        }

        let _guard = self.locks.acquire(node.lock, LockToken::unlocked());
        let token = LockToken::held(node.lock);
        let ctx = OpContext {
            tree: self,
            clock,
            held: token,
        };

        match node.ops().and_then(|ops| ops.set_parent(&ctx, parent)) {
            Some(result) => result?,
            None if node.is_enabled() => {
                self.enable_nested(Some(parent), token)?;
                self.disable_nested(node.parent(), token);
            }
            None => {}
        }
        node.set_parent_ref(Some(parent));
        debug!(
            "clock {}: parent is now {}",
            node.name, self.nodes[parent].name
        );

        Ok(())
    }
}
