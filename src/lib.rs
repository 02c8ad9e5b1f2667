pub mod clock_tree;
pub mod errors;
pub mod hardware;
pub mod logging;
pub mod model_objects;
pub mod platform;
pub mod profiles;
pub mod simulation;

pub use clock_tree::{ClockId, ClockLookup, ClockOps, ClockSpec, ClockTree, ClockTreeBuilder};
pub use errors::{ClockError, ClockResult};
pub use model_objects::board::read_json_board;
pub use platform::{ClockPlatform, Clocks};
