//! Decision core: pure domain logic, zero I/O.
//!
//! The three components that turn telemetry into actuation and alarms:
//! the aggression alarm monitor, the lighting setpoint regulator and the
//! feed batch scheduler.  Each owns its per-entity state outright and
//! talks to the outside world only through the port traits in [`ports`],
//! keeping this layer fully testable without a bus or a real clock.

pub mod alarm;
pub mod feeding;
pub mod lighting;
pub mod ports;
