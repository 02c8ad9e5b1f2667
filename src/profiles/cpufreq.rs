use crate::clock_tree::{ClockOps, OpContext};
use crate::hardware::CpuFrequency;
use std::sync::Arc;

/// Clock running at a fixed fraction of the current CPU frequency.
pub struct CpuDerivedClockOps {
    cpufreq: Arc<dyn CpuFrequency>,
    divisor: u64,
}

impl CpuDerivedClockOps {
    pub fn new(cpufreq: Arc<dyn CpuFrequency>, divisor: u64) -> CpuDerivedClockOps {
        CpuDerivedClockOps {
            cpufreq,
            divisor: divisor.max(1),
        }
    }

    /// The SMP local timer, clocked at half the CPU rate.
    pub fn smp_twd(cpufreq: Arc<dyn CpuFrequency>) -> CpuDerivedClockOps {
        CpuDerivedClockOps::new(cpufreq, 2)
    }
}

impl ClockOps for CpuDerivedClockOps {
    fn get_rate(&self, _ctx: &OpContext<'_>) -> Option<u64> {
        Some(self.cpufreq.current_rate() / self.divisor)
    }
}
