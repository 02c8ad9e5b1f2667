use thiserror::Error;

/// Errno-style status used by [ClockError::HardwareFailure] for I/O errors.
pub const EIO: i32 = -5;

/// Errors reported by the clock tree and its operation sets.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClockError {
    /// A clock that does not exist was named, or a parent candidate is not allowed.
    #[error("invalid argument: {reason}")]
    InvalidArgument { reason: String },

    /// The operation set of the clock does not implement the operation.
    #[error("operation not supported")]
    Unsupported,

    /// An external collaborator (register block, clock controller) failed.
    /// The status is forwarded unchanged.
    #[error("hardware failure (status {code})")]
    HardwareFailure { code: i32 },

    /// A clock was disabled more times than it was enabled.
    #[error("clock '{name}' is already disabled")]
    AlreadyDisabled { name: String },
}

impl ClockError {
    pub fn invalid(reason: impl Into<String>) -> ClockError {
        ClockError::InvalidArgument {
            reason: reason.into(),
        }
    }

    pub fn hardware(code: i32) -> ClockError {
        ClockError::HardwareFailure { code }
    }
}

pub type ClockResult<T> = Result<T, ClockError>;
