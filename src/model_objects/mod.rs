pub mod board;

pub use board::{BoardDescription, ClockDescription, LockDescription, LookupDescription, Topology};
