//! Henhouse control core.
//!
//! Turns per-hen telemetry (aggression, hunger) into lighting setpoints,
//! batched feed dispensing and alarms.  The decision components live in
//! [`app`] behind the port traits in [`app::ports`]; [`adapters`] supplies
//! clocks, sinks and config storage; [`runtime`] wires everything onto a
//! single-threaded executor with one bounded mailbox per component.

#![deny(unused_must_use)]

pub mod adapters;
pub mod app;
pub mod config;
pub mod control;
pub mod entity;
pub mod error;
pub mod messages;
pub mod runtime;
