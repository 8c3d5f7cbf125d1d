//! Port traits: the hexagonal boundary between decision logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ component (domain)
//! ```
//!
//! Driven adapters (clocks, event sinks, config storage) implement these
//! traits.  The components consume them via generics, so the decision
//! core never touches the transport or the system clock directly.

use core::time::Duration;

use log::warn;

use crate::config::SystemConfig;
use crate::error::{ConfigError, SendError};
use crate::messages::Outbound;

// ───────────────────────────────────────────────────────────────
// Clock port
// ───────────────────────────────────────────────────────────────

/// Monotonic time source.  All cooldowns, debounce windows and update
/// intervals are measured against this, never against wall-clock time.
pub trait Clock {
    /// Time elapsed since the clock's origin.  Never goes backwards.
    fn now(&self) -> Duration;
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now(&self) -> Duration {
        (**self).now()
    }
}

// ───────────────────────────────────────────────────────────────
// Event sink port (domain → entities / logging / UI / other components)
// ───────────────────────────────────────────────────────────────

/// Components emit every [`Outbound`] message through this port.
/// Delivery is fire-and-forget: a failure is reported back but the
/// component never retries and never rolls back its own state.
pub trait EventSink {
    fn emit(&mut self, event: Outbound) -> Result<(), SendError>;
}

impl<S: EventSink + ?Sized> EventSink for &mut S {
    fn emit(&mut self, event: Outbound) -> Result<(), SendError> {
        (**self).emit(event)
    }
}

/// Collecting sink, handy for tests and offline replay.
impl EventSink for Vec<Outbound> {
    fn emit(&mut self, event: Outbound) -> Result<(), SendError> {
        self.push(event);
        Ok(())
    }
}

/// Emit and log a failure.  Used by every component for outbound traffic.
pub fn emit_best_effort<S: EventSink + ?Sized>(sink: &mut S, event: Outbound) {
    let kind = event.kind().to_owned();
    if let Err(e) = sink.emit(event) {
        warn!("send {kind} failed: {e}");
    }
}

// ───────────────────────────────────────────────────────────────
// Configuration port
// ───────────────────────────────────────────────────────────────

/// Loads and persists system configuration.
///
/// Implementations MUST validate before persisting.  Invalid ranges are
/// rejected with [`ConfigError::ValidationFailed`], not silently clamped.
pub trait ConfigPort {
    /// Load configuration.  Returns [`SystemConfig::default()`] if no
    /// stored config exists.
    fn load(&self) -> Result<SystemConfig, ConfigError>;

    /// Validate and persist configuration.
    fn save(&self, config: &SystemConfig) -> Result<(), ConfigError>;
}
