use crate::clock_tree::{ClockId, ClockLookup, ClockSpec, ClockTree};
use crate::errors::{ClockError, ClockResult, EIO};
use crate::hardware::{PlatformIdentity, SocFamily};
use crate::model_objects::BoardDescription;
use crate::profiles::{Hardware, OperationSets};
use log::{error, info};
use std::sync::atomic::{AtomicBool, Ordering};

/// Name and device of the SMP local timer clock.
pub const SMP_TWD: &str = "smp_twd";

/// Everything clock related on a running platform.
pub struct Clocks {
    pub soc: SocFamily,
    pub tree: ClockTree,
    pub lookup: ClockLookup,
    pub operations: OperationSets,
}

impl Clocks {
    /// Finds the clock a device should use, see [ClockLookup::find].
    pub fn get(&self, dev_id: Option<&str>, con_id: Option<&str>) -> Option<ClockId> {
        self.lookup.find(dev_id, con_id)
    }
}

/// One-time clock setup for a board.
pub struct ClockPlatform {
    board: BoardDescription,
    hardware: Hardware,
    initialized: AtomicBool,
}

impl ClockPlatform {
    pub fn new(board: BoardDescription, hardware: Hardware) -> ClockPlatform {
        ClockPlatform {
            board,
            hardware,
            initialized: AtomicBool::new(false),
        }
    }

    /// Identifies the SoC, builds its clock tree and registers the lookups.
    ///
    /// Succeeds at most once. An unknown SoC is fatal and reported as an I/O failure.
    pub fn init(&self, identity: &dyn PlatformIdentity) -> ClockResult<Clocks> {
        if self
            .initialized
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(ClockError::invalid("clocks are already initialized"));
        }

        let result = self.init_once(identity);
        if result.is_err() {
            self.initialized.store(false, Ordering::Release);
        }
        result
    }

    fn init_once(&self, identity: &dyn PlatformIdentity) -> ClockResult<Clocks> {
        let Some(soc) = identity.soc_family() else {
            error!("clock: unknown SoC, no topology to instantiate");
            return Err(ClockError::hardware(EIO));
        };
        let topology = self.board.topology(soc).ok_or_else(|| {
            ClockError::invalid(format!("board {} has no clocks for {soc}", self.board.name))
        })?;

        let operations = OperationSets::new(&self.hardware);
        let mut builder = topology.builder(&operations)?;
        let twd = match &operations.smp_twd {
            Some(ops) if !topology.clocks.iter().any(|c| c.name == SMP_TWD) => {
                Some(builder.add_clock(ClockSpec::new(SMP_TWD).ops(ops.clone())))
            }
            _ => None,
        };
        let tree = builder.build()?;

        let lookup = ClockLookup::new();
        topology.register_lookups(&tree, &lookup)?;
        if let Some(twd) = twd {
            lookup.register(twd, Some(SMP_TWD), None);
        }

        info!(
            "clock: {} clocks and {} lookups registered for {soc} on {}",
            tree.len(),
            lookup.len(),
            self.board.name
        );
        Ok(Clocks {
            soc,
            tree,
            lookup,
            operations,
        })
    }
}
