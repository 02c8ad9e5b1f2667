/// Operation sets for the clocks of the platform.
///
/// - PRCC: gates in a peripheral register block, polled until acknowledged.
/// - PRCMU: clocks switched by request to the power and clock control unit,
///   optionally holding a full performance floor while enabled.
/// - CPU derived: rate follows the CPU frequency.
pub mod cpufreq;
pub mod performance_floor;
pub mod prcc;
pub mod prcmu;

use crate::clock_tree::ClockOps;
use crate::errors::{ClockError, ClockResult};
use crate::hardware::{ClockController, CpuFrequency, RegisterIo};
use cpufreq::CpuDerivedClockOps;
use performance_floor::PerformanceFloor;
use prcc::{KernelClockOps, PeripheralClockOps};
use prcmu::{ControllerClockOps, FullPerformanceClockOps};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ClockProfile {
    /// No hardware operations; the clock only forwards enable and rate.
    None,
    PrccPeripheral,
    PrccKernel,
    /// Kernel clock whose rate is controlled by its parent.
    PrccKernelRec,
    Prcmu,
    PrcmuScalable,
    PrcmuOpp100,
    SmpTwd,
}

/// Hardware collaborators the operation sets drive.
#[derive(Clone)]
pub struct Hardware {
    pub registers: Arc<dyn RegisterIo>,
    pub controller: Arc<dyn ClockController>,
    pub cpufreq: Option<Arc<dyn CpuFrequency>>,
}

/// One shared instance of every operation set, bound to the same hardware.
pub struct OperationSets {
    pub prcc_peripheral: Arc<dyn ClockOps>,
    pub prcc_kernel: Arc<dyn ClockOps>,
    pub prcc_kernel_rec: Arc<dyn ClockOps>,
    pub prcmu: Arc<dyn ClockOps>,
    pub prcmu_scalable: Arc<dyn ClockOps>,
    pub prcmu_opp100: Arc<dyn ClockOps>,
    pub smp_twd: Option<Arc<dyn ClockOps>>,
    pub floor: Arc<PerformanceFloor>,
}

impl OperationSets {
    pub fn new(hardware: &Hardware) -> OperationSets {
        let floor = Arc::new(PerformanceFloor::ape_opp100(Arc::clone(
            &hardware.controller,
        )));
        OperationSets {
            prcc_peripheral: Arc::new(PeripheralClockOps::new(Arc::clone(&hardware.registers))),
            prcc_kernel: Arc::new(KernelClockOps::new(Arc::clone(&hardware.registers))),
            prcc_kernel_rec: Arc::new(KernelClockOps::with_parent_rate(Arc::clone(
                &hardware.registers,
            ))),
            prcmu: Arc::new(ControllerClockOps::new(Arc::clone(&hardware.controller))),
            prcmu_scalable: Arc::new(ControllerClockOps::scalable(Arc::clone(
                &hardware.controller,
            ))),
            prcmu_opp100: Arc::new(FullPerformanceClockOps::new(
                Arc::clone(&hardware.controller),
                Arc::clone(&floor),
            )),
            smp_twd: hardware.cpufreq.as_ref().map(|cpufreq| {
                Arc::new(CpuDerivedClockOps::smp_twd(Arc::clone(cpufreq))) as Arc<dyn ClockOps>
            }),
            floor,
        }
    }

    pub fn get(&self, profile: ClockProfile) -> ClockResult<Option<Arc<dyn ClockOps>>> {
        let ops = match profile {
            ClockProfile::None => return Ok(None),
            ClockProfile::PrccPeripheral => &self.prcc_peripheral,
            ClockProfile::PrccKernel => &self.prcc_kernel,
            ClockProfile::PrccKernelRec => &self.prcc_kernel_rec,
            ClockProfile::Prcmu => &self.prcmu,
            ClockProfile::PrcmuScalable => &self.prcmu_scalable,
            ClockProfile::PrcmuOpp100 => &self.prcmu_opp100,
            ClockProfile::SmpTwd => self.smp_twd.as_ref().ok_or_else(|| {
                ClockError::invalid("smp-twd clock needs a cpu frequency source")
            })?,
        };
        Ok(Some(Arc::clone(ops)))
    }
}
