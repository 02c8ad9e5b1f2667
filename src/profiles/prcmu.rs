use crate::clock_tree::{ClockOps, OpContext};
use crate::errors::{ClockError, ClockResult};
use crate::hardware::ClockController;
use crate::profiles::performance_floor::PerformanceFloor;
use log::error;
use std::sync::Arc;

/// Clocks owned by the power and clock control unit, switched by request.
pub struct ControllerClockOps {
    controller: Arc<dyn ClockController>,
    scalable: bool,
}

impl ControllerClockOps {
    /// Fixed clock: enable, disable and rate query only.
    pub fn new(controller: Arc<dyn ClockController>) -> ControllerClockOps {
        ControllerClockOps {
            controller,
            scalable: false,
        }
    }

    /// Clock whose rate can also be rounded and changed.
    pub fn scalable(controller: Arc<dyn ClockController>) -> ControllerClockOps {
        ControllerClockOps {
            controller,
            scalable: true,
        }
    }
}

impl ClockOps for ControllerClockOps {
    fn enable(&self, ctx: &OpContext<'_>) -> ClockResult<()> {
        self.controller.request_clock(ctx.node().selector, true)
    }

    fn disable(&self, ctx: &OpContext<'_>) {
        if let Err(err) = self.controller.request_clock(ctx.node().selector, false) {
            error!("clock: failed to disable {}: {err}", ctx.name());
        }
    }

    fn get_rate(&self, ctx: &OpContext<'_>) -> Option<u64> {
        Some(self.controller.clock_rate(ctx.node().selector))
    }

    fn round_rate(&self, ctx: &OpContext<'_>, rate: u64) -> ClockResult<u64> {
        if !self.scalable {
            return Err(ClockError::Unsupported);
        }
        self.controller.round_clock_rate(ctx.node().selector, rate)
    }

    fn set_rate(&self, ctx: &OpContext<'_>, rate: u64) -> ClockResult<()> {
        if !self.scalable {
            return Err(ClockError::Unsupported);
        }
        self.controller.set_clock_rate(ctx.node().selector, rate)
    }
}

/// Controller clocks that only run correctly with the application processor at full
/// performance. The floor is held for as long as the clock is enabled.
pub struct FullPerformanceClockOps {
    controller: Arc<dyn ClockController>,
    floor: Arc<PerformanceFloor>,
}

impl FullPerformanceClockOps {
    pub fn new(
        controller: Arc<dyn ClockController>,
        floor: Arc<PerformanceFloor>,
    ) -> FullPerformanceClockOps {
        FullPerformanceClockOps { controller, floor }
    }
}

impl ClockOps for FullPerformanceClockOps {
    fn enable(&self, ctx: &OpContext<'_>) -> ClockResult<()> {
        if let Err(err) = self.floor.request(ctx.held()) {
            error!(
                "clock: failed to request full performance for {}: {err}",
                ctx.name()
            );
            return Err(err);
        }
        if let Err(err) = self.controller.request_clock(ctx.node().selector, true) {
            // The clock never ran, so the floor is not needed.
            if let Err(release_err) = self.floor.release(ctx.held()) {
                error!(
                    "clock: failed to drop full performance for {}: {release_err}",
                    ctx.name()
                );
            }
            return Err(err);
        }
        Ok(())
    }

    fn disable(&self, ctx: &OpContext<'_>) {
        // A clock that may still run keeps the floor raised.
        let result = self
            .controller
            .request_clock(ctx.node().selector, false)
            .and_then(|_| self.floor.release(ctx.held()));
        if let Err(err) = result {
            error!("clock: failed to disable {}: {err}", ctx.name());
        }
    }

    fn get_rate(&self, ctx: &OpContext<'_>) -> Option<u64> {
        Some(self.controller.clock_rate(ctx.node().selector))
    }

    fn may_sleep(&self) -> bool {
        true
    }
}
