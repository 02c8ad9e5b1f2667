//! In-process stand-ins for the clock hardware.
//!
//! The PRCC blocks are modeled as 4 KiB register windows that acknowledge gate
//! writes in their status registers, and the control unit as a table of clock
//! states and rates that records every request it receives.

use crate::errors::{ClockError, ClockResult, EIO};
use crate::hardware::{ClockController, CpuFrequency, QosDomain, RegisterIo};
use crate::profiles::prcc::{
    PRCC_KCKDIS, PRCC_KCKEN, PRCC_KCKSR, PRCC_PCKDIS, PRCC_PCKEN, PRCC_PCKSR,
};
use crate::profiles::Hardware;
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::sync::Arc;

const WINDOW_MASK: usize = 0xFFF;

#[derive(Debug, Default)]
pub struct SimulatedRegisters {
    values: Mutex<HashMap<usize, u32>>,
    writes: Mutex<Vec<(usize, u32)>>,
    /// Status reads that still return 0 before the hardware acknowledges.
    pending_polls: AtomicU32,
    ack_delay: AtomicU32,
}

impl SimulatedRegisters {
    pub fn new() -> SimulatedRegisters {
        SimulatedRegisters::default()
    }

    /// Makes every gate acknowledge only after `polls` status reads.
    pub fn with_ack_delay(polls: u32) -> SimulatedRegisters {
        let registers = SimulatedRegisters::default();
        registers.ack_delay.store(polls, Ordering::Relaxed);
        registers
    }

    pub fn value(&self, address: usize) -> u32 {
        self.values.lock().get(&address).copied().unwrap_or(0)
    }

    pub fn writes(&self) -> Vec<(usize, u32)> {
        self.writes.lock().clone()
    }

    /// Whether the peripheral gate `selector` of the block at `io_base` is on.
    pub fn peripheral_gated(&self, io_base: usize, selector: u32) -> bool {
        self.value(io_base + PRCC_PCKSR) & selector == selector
    }

    pub fn kernel_gated(&self, io_base: usize, selector: u32) -> bool {
        self.value(io_base + PRCC_KCKSR) & selector == selector
    }
}

impl RegisterIo for SimulatedRegisters {
    fn read32(&self, address: usize) -> u32 {
        let offset = address & WINDOW_MASK;
        if (offset == PRCC_PCKSR || offset == PRCC_KCKSR)
            && self
                .pending_polls
                .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| n.checked_sub(1))
                .is_ok()
        {
            return 0;
        }
        self.value(address)
    }

    fn write32(&self, address: usize, value: u32) {
        self.writes.lock().push((address, value));
        let base = address & !WINDOW_MASK;
        let mut values = self.values.lock();

        match address & WINDOW_MASK {
            PRCC_PCKEN => *values.entry(base + PRCC_PCKSR).or_default() |= value,
            PRCC_PCKDIS => *values.entry(base + PRCC_PCKSR).or_default() &= !value,
            PRCC_KCKEN => *values.entry(base + PRCC_KCKSR).or_default() |= value,
            PRCC_KCKDIS => *values.entry(base + PRCC_KCKSR).or_default() &= !value,
            _ => {
                values.insert(address, value);
                return;
            }
        }
        self.pending_polls
            .store(self.ack_delay.load(Ordering::Relaxed), Ordering::Release);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FloorEvent {
    Raised(QosDomain, u32),
    Released(QosDomain),
}

/// Control unit keeping clock states and rates in memory.
#[derive(Debug)]
pub struct SimulatedController {
    running: Mutex<HashMap<u32, bool>>,
    rates: Mutex<HashMap<u32, u64>>,
    requests: Mutex<Vec<(u32, bool)>>,
    floor_events: Mutex<Vec<FloorEvent>>,
    failing: Mutex<HashSet<u32>>,
    failing_floor: Mutex<bool>,
    failing_floor_release: Mutex<bool>,
    rate_step: u64,
}

impl Default for SimulatedController {
    fn default() -> Self {
        SimulatedController::new()
    }
}

impl SimulatedController {
    pub fn new() -> SimulatedController {
        SimulatedController {
            running: Mutex::new(HashMap::new()),
            rates: Mutex::new(HashMap::new()),
            requests: Mutex::new(vec![]),
            floor_events: Mutex::new(vec![]),
            failing: Mutex::new(HashSet::new()),
            failing_floor: Mutex::new(false),
            failing_floor_release: Mutex::new(false),
            rate_step: 1_000_000,
        }
    }

    pub fn with_rate(self, selector: u32, rate: u64) -> Self {
        self.rates.lock().insert(selector, rate);
        self
    }

    /// Makes requests for `selector` fail with an I/O error.
    pub fn fail_clock(&self, selector: u32) {
        self.failing.lock().insert(selector);
    }

    pub fn fail_floor(&self, fail: bool) {
        *self.failing_floor.lock() = fail;
    }

    pub fn fail_floor_release(&self, fail: bool) {
        *self.failing_floor_release.lock() = fail;
    }

    pub fn is_running(&self, selector: u32) -> bool {
        self.running.lock().get(&selector).copied().unwrap_or(false)
    }

    pub fn requests(&self) -> Vec<(u32, bool)> {
        self.requests.lock().clone()
    }

    pub fn floor_events(&self) -> Vec<FloorEvent> {
        self.floor_events.lock().clone()
    }

    pub fn floor_raised(&self) -> usize {
        self.floor_events()
            .iter()
            .filter(|event| matches!(event, FloorEvent::Raised(..)))
            .count()
    }

    pub fn floor_released(&self) -> usize {
        self.floor_events()
            .iter()
            .filter(|event| matches!(event, FloorEvent::Released(..)))
            .count()
    }
}

impl ClockController for SimulatedController {
    fn request_clock(&self, selector: u32, enable: bool) -> ClockResult<()> {
        self.requests.lock().push((selector, enable));
        if self.failing.lock().contains(&selector) {
            return Err(ClockError::hardware(EIO));
        }
        self.running.lock().insert(selector, enable);
        Ok(())
    }

    fn clock_rate(&self, selector: u32) -> u64 {
        self.rates.lock().get(&selector).copied().unwrap_or(0)
    }

    fn round_clock_rate(&self, selector: u32, rate: u64) -> ClockResult<u64> {
        if self.failing.lock().contains(&selector) {
            return Err(ClockError::hardware(EIO));
        }
        Ok((rate / self.rate_step).max(1) * self.rate_step)
    }

    fn set_clock_rate(&self, selector: u32, rate: u64) -> ClockResult<()> {
        let rounded = self.round_clock_rate(selector, rate)?;
        self.rates.lock().insert(selector, rounded);
        Ok(())
    }

    fn request_performance_floor(&self, domain: QosDomain, _owner: &str, level: u32) -> ClockResult<()> {
        if *self.failing_floor.lock() {
            return Err(ClockError::hardware(EIO));
        }
        self.floor_events.lock().push(FloorEvent::Raised(domain, level));
        Ok(())
    }

    fn release_performance_floor(&self, domain: QosDomain, _owner: &str) -> ClockResult<()> {
        if *self.failing_floor_release.lock() {
            return Err(ClockError::hardware(EIO));
        }
        self.floor_events.lock().push(FloorEvent::Released(domain));
        Ok(())
    }
}

#[derive(Debug)]
pub struct SimulatedCpuFrequency {
    rate: AtomicU64,
}

impl SimulatedCpuFrequency {
    pub fn new(rate: u64) -> SimulatedCpuFrequency {
        SimulatedCpuFrequency {
            rate: AtomicU64::new(rate),
        }
    }

    pub fn set(&self, rate: u64) {
        self.rate.store(rate, Ordering::Relaxed);
    }
}

impl CpuFrequency for SimulatedCpuFrequency {
    fn current_rate(&self) -> u64 {
        self.rate.load(Ordering::Relaxed)
    }
}

/// A complete set of simulated hardware, with handles kept for inspection.
pub struct SimulatedHardware {
    pub registers: Arc<SimulatedRegisters>,
    pub controller: Arc<SimulatedController>,
    pub cpufreq: Arc<SimulatedCpuFrequency>,
}

impl SimulatedHardware {
    pub fn new() -> SimulatedHardware {
        SimulatedHardware {
            registers: Arc::new(SimulatedRegisters::new()),
            controller: Arc::new(SimulatedController::new()),
            cpufreq: Arc::new(SimulatedCpuFrequency::new(800_000_000)),
        }
    }

    pub fn hardware(&self) -> Hardware {
        Hardware {
            registers: self.registers.clone(),
            controller: self.controller.clone(),
            cpufreq: Some(self.cpufreq.clone()),
        }
    }
}

impl Default for SimulatedHardware {
    fn default() -> Self {
        SimulatedHardware::new()
    }
}
