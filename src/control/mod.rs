//! Control primitives shared by the decision components.
//!
//! - [`gate`]: clamping, debounce and rate/delta acceptance gates.
//! - [`proportional`]: dead-band proportional setpoint controller.

pub mod gate;
pub mod proportional;
