use crate::errors::ClockResult;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Memory-mapped 32-bit register access.
pub trait RegisterIo: Send + Sync {
    fn read32(&self, address: usize) -> u32;
    fn write32(&self, address: usize, value: u32);
}

/// Domain of a performance floor request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum QosDomain {
    /// Operating point of the application processor subsystem.
    ApeOpp,
    /// Operating point of the DDR controller.
    DdrOpp,
}

/// Clock and power control unit driven through requests rather than registers.
///
/// Errors carry the controller status unchanged.
pub trait ClockController: Send + Sync {
    fn request_clock(&self, selector: u32, enable: bool) -> ClockResult<()>;
    fn clock_rate(&self, selector: u32) -> u64;
    fn round_clock_rate(&self, selector: u32, rate: u64) -> ClockResult<u64>;
    fn set_clock_rate(&self, selector: u32, rate: u64) -> ClockResult<()>;
    fn request_performance_floor(&self, domain: QosDomain, owner: &str, level: u32) -> ClockResult<()>;
    fn release_performance_floor(&self, domain: QosDomain, owner: &str) -> ClockResult<()>;
}

/// Current CPU frequency as reported by the frequency scaling driver.
pub trait CpuFrequency: Send + Sync {
    fn current_rate(&self) -> u64;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SocFamily {
    U8500,
    U5500,
}

impl fmt::Display for SocFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SocFamily::U8500 => write!(f, "u8500"),
            SocFamily::U5500 => write!(f, "u5500"),
        }
    }
}

/// Identifies the SoC the kernel runs on.
pub trait PlatformIdentity {
    fn soc_family(&self) -> Option<SocFamily>;
}

impl PlatformIdentity for Option<SocFamily> {
    fn soc_family(&self) -> Option<SocFamily> {
        *self
    }
}
