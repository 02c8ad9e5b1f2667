use lazy_static::lazy_static;
use parking_lot::{Mutex, MutexGuard};
use serde::{Deserialize, Serialize};

lazy_static! {
    /// Process-wide lock shared by every clock without a dedicated lock.
    static ref FALLBACK_LOCK: Mutex<()> = Mutex::new(());
}

/// Handle of a dedicated lock, only handed out by the [LockTable] that owns it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LockId(usize);

/// Whether the critical section of a lock may block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LockClass {
    /// Non-sleeping section. Operations run under it must never block.
    Atomic,
    /// Operations run under it may block, e.g. waiting on an external controller.
    Sleeping,
}

/// The lock guarding a clock node, compared by identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LockRef {
    Fallback,
    Dedicated(LockId),
}

/// Identity of the lock the caller already holds.
///
/// Passed down the recursive enable/disable walk. When a parent is guarded by the
/// same lock as the token, acquisition is skipped, so a group of clocks sharing one
/// lock behaves as a single atomic unit without re-entrant locks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LockToken(Option<LockRef>);

impl LockToken {
    /// Token for a caller holding no clock lock.
    pub const fn unlocked() -> LockToken {
        LockToken(None)
    }

    pub const fn held(lock: LockRef) -> LockToken {
        LockToken(Some(lock))
    }

    pub fn holds(&self, lock: LockRef) -> bool {
        self.0 == Some(lock)
    }

    pub fn is_held(&self) -> bool {
        self.0.is_some()
    }
}

#[derive(Debug)]
pub struct DedicatedLock {
    pub name: String,
    pub class: LockClass,
    mutex: Mutex<()>,
}

/// Owner of all dedicated locks of a clock tree.
#[derive(Debug, Default)]
pub struct LockTable {
    locks: Vec<DedicatedLock>,
}

impl LockTable {
    pub fn new() -> LockTable {
        LockTable { locks: vec![] }
    }

    pub fn add(&mut self, name: &str, class: LockClass) -> LockRef {
        self.locks.push(DedicatedLock {
            name: name.to_string(),
            class,
            mutex: Mutex::new(()),
        });
        LockRef::Dedicated(LockId(self.locks.len() - 1))
    }

    pub fn len(&self) -> usize {
        self.locks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }

    pub fn contains(&self, lock: LockRef) -> bool {
        match lock {
            LockRef::Fallback => true,
            LockRef::Dedicated(LockId(id)) => id < self.locks.len(),
        }
    }

    /// Class of `lock`, `None` if it is a dedicated lock of another table.
    pub fn class(&self, lock: LockRef) -> Option<LockClass> {
        match lock {
            LockRef::Fallback => Some(LockClass::Atomic),
            LockRef::Dedicated(LockId(id)) => self.locks.get(id).map(|lock| lock.class),
        }
    }

    pub fn name(&self, lock: LockRef) -> Option<&str> {
        match lock {
            LockRef::Fallback => Some("fallback"),
            LockRef::Dedicated(LockId(id)) => self.locks.get(id).map(|lock| lock.name.as_str()),
        }
    }

    pub fn find(&self, name: &str) -> Option<LockRef> {
        self.locks
            .iter()
            .position(|lock| lock.name == name)
            .map(|id| LockRef::Dedicated(LockId(id)))
    }

    /// Takes `lock` unless `held` already names it. `None` means acquisition was elided.
    ///
    /// # Panics
    ///
    /// If `lock` is a dedicated lock of another table. Clock trees only pass their own.
    pub fn acquire(&self, lock: LockRef, held: LockToken) -> Option<MutexGuard<'_, ()>> {
        if held.holds(lock) {
            return None;
        }
        match lock {
            LockRef::Fallback => Some(FALLBACK_LOCK.lock()),
            LockRef::Dedicated(LockId(id)) => Some(self.locks[id].mutex.lock()),
        }
    }
}
