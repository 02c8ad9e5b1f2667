use crate::clock_tree::{ClockOps, OpContext};
use crate::errors::{ClockError, ClockResult};
use crate::hardware::RegisterIo;
use std::hint;
use std::sync::Arc;

/// Register offsets of a peripheral reset and clock controller block.
pub const PRCC_PCKEN: usize = 0x0;
pub const PRCC_PCKDIS: usize = 0x4;
pub const PRCC_KCKEN: usize = 0x8;
pub const PRCC_KCKDIS: usize = 0xC;
pub const PRCC_PCKSR: usize = 0x10;
pub const PRCC_KCKSR: usize = 0x14;

/// Writes `selector` to the enable register and spins until the status register
/// shows it. Hardware always acknowledges, so there is no timeout.
fn gate_on(registers: &dyn RegisterIo, io_base: usize, enable: usize, status: usize, selector: u32) {
    registers.write32(io_base + enable, selector);
    while registers.read32(io_base + status) & selector == 0 {
        hint::spin_loop();
    }
}

/// Bus (peripheral) clock gate.
pub struct PeripheralClockOps {
    registers: Arc<dyn RegisterIo>,
}

impl PeripheralClockOps {
    pub fn new(registers: Arc<dyn RegisterIo>) -> PeripheralClockOps {
        PeripheralClockOps { registers }
    }
}

impl ClockOps for PeripheralClockOps {
    fn enable(&self, ctx: &OpContext<'_>) -> ClockResult<()> {
        let node = ctx.node();
        gate_on(
            self.registers.as_ref(),
            node.io_base,
            PRCC_PCKEN,
            PRCC_PCKSR,
            node.selector,
        );
        Ok(())
    }

    fn disable(&self, ctx: &OpContext<'_>) {
        let node = ctx.node();
        self.registers
            .write32(node.io_base + PRCC_PCKDIS, node.selector);
    }
}

/// Kernel (functional) clock gate.
///
/// Its registers are only reachable while the clock named as the node's `source` runs,
/// so each register access is bracketed by enabling and disabling that clock.
pub struct KernelClockOps {
    registers: Arc<dyn RegisterIo>,
    rate_from_parent: bool,
}

impl KernelClockOps {
    pub fn new(registers: Arc<dyn RegisterIo>) -> KernelClockOps {
        KernelClockOps {
            registers,
            rate_from_parent: false,
        }
    }

    /// Kernel clock whose rate is rounded and set on its functional parent.
    pub fn with_parent_rate(registers: Arc<dyn RegisterIo>) -> KernelClockOps {
        KernelClockOps {
            registers,
            rate_from_parent: true,
        }
    }
}

impl ClockOps for KernelClockOps {
    fn enable(&self, ctx: &OpContext<'_>) -> ClockResult<()> {
        let node = ctx.node();
        ctx.tree().enable_nested(node.source, ctx.held())?;

        gate_on(
            self.registers.as_ref(),
            node.io_base,
            PRCC_KCKEN,
            PRCC_KCKSR,
            node.selector,
        );

        ctx.tree().disable_nested(node.source, ctx.held());
        Ok(())
    }

    fn disable(&self, ctx: &OpContext<'_>) {
        let node = ctx.node();
        let source_enabled = ctx.tree().enable_nested(node.source, ctx.held()).is_ok();

        self.registers
            .write32(node.io_base + PRCC_KCKDIS, node.selector);

        if source_enabled {
            ctx.tree().disable_nested(node.source, ctx.held());
        }
    }

    fn round_rate(&self, ctx: &OpContext<'_>, rate: u64) -> ClockResult<u64> {
        if !self.rate_from_parent {
            return Err(ClockError::Unsupported);
        }
        ctx.tree().round_rate_rec(ctx.clock(), rate)
    }

    fn set_rate(&self, ctx: &OpContext<'_>, rate: u64) -> ClockResult<()> {
        if !self.rate_from_parent {
            return Err(ClockError::Unsupported);
        }
        ctx.tree().set_rate_rec(ctx.clock(), rate)
    }
}
