//! Typed models of engine-reported state.
//!
//! Everything here is validated once when it arrives from the engine and is
//! read-only afterwards. The consultation state machine replaces these
//! snapshots wholesale after every transition.

mod analytics;
mod memory;
mod rule;
mod session;
mod validation;
mod view;

pub use analytics::*;
pub use memory::*;
pub use rule::*;
pub use session::*;
pub use validation::*;
pub use view::*;
