//! Integration test driver for `tests/integration/` submodule.
//!
//! Each `mod` below maps to a file that exercises one component (or a
//! chain of them) against mock sinks and a simulated clock.  Nothing here
//! touches stdin, stdout or the wall clock.

mod alarm_tests;
mod feeding_tests;
mod lighting_tests;
mod mock_sink;
