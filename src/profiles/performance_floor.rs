use crate::clock_tree::LockToken;
use crate::errors::{ClockError, ClockResult};
use crate::hardware::{ClockController, QosDomain};
use log::{debug, error};
use parking_lot::Mutex;
use std::sync::Arc;

/// Shared system-wide performance floor, reference counted across clocks.
///
/// The first request raises the floor at the controller and the last release drops
/// it. Callers run inside a clock operation and must pass the token of the clock lock
/// they hold: the floor's own mutex only protects the counter, the clock lock orders
/// the request against that clock's enable and disable.
pub struct PerformanceFloor {
    controller: Arc<dyn ClockController>,
    domain: QosDomain,
    owner: String,
    level: u32,
    requests: Mutex<u32>,
}

impl PerformanceFloor {
    pub fn new(
        controller: Arc<dyn ClockController>,
        domain: QosDomain,
        owner: &str,
        level: u32,
    ) -> PerformanceFloor {
        PerformanceFloor {
            controller,
            domain,
            owner: owner.to_string(),
            level,
            requests: Mutex::new(0),
        }
    }

    /// Application processor at 100% operating point, requested on behalf of clocks.
    pub fn ape_opp100(controller: Arc<dyn ClockController>) -> PerformanceFloor {
        PerformanceFloor::new(controller, QosDomain::ApeOpp, "clock", 100)
    }

    pub fn requests(&self) -> u32 {
        *self.requests.lock()
    }

    pub fn request(&self, held: LockToken) -> ClockResult<()> {
        debug_assert!(held.is_held(), "performance floor requested outside a clock lock");
        let mut requests = self.requests.lock();

        if *requests == 0 {
            self.controller
                .request_performance_floor(self.domain, &self.owner, self.level)?;
            debug!("{:?} floor raised to {} by {}", self.domain, self.level, self.owner);
        }
        *requests += 1;

        Ok(())
    }

    /// Drops one request. Releasing more often than requested is a caller bug and is
    /// reported as [ClockError::AlreadyDisabled].
    pub fn release(&self, held: LockToken) -> ClockResult<()> {
        debug_assert!(held.is_held(), "performance floor released outside a clock lock");
        let mut requests = self.requests.lock();

        match *requests {
            0 => {
                error!("{:?} floor released without a request", self.domain);
                Err(ClockError::AlreadyDisabled {
                    name: format!("{:?} performance floor", self.domain),
                })
            }
            1 => {
                *requests = 0;
                debug!("{:?} floor released by {}", self.domain, self.owner);
                self.controller
                    .release_performance_floor(self.domain, &self.owner)
            }
            _ => {
                *requests -= 1;
                Ok(())
            }
        }
    }
}
