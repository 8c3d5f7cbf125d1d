//! Unified error types for the henhouse control core.
//!
//! One enum per failure domain.  None of these are fatal inside the
//! decision components: decode failures drop the message and
//! send failures are logged and forgotten.  Only configuration errors stop
//! the process, and only at startup.

use core::fmt;

// ---------------------------------------------------------------------------
// Decode errors
// ---------------------------------------------------------------------------

/// Reasons an inbound envelope is dropped.
///
/// Unknown topics and unknown `type` values are not errors; the decoder
/// reports those as "nothing to do".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeError {
    /// Body is not a JSON object.
    InvalidJson,
    /// Envelope carries no `topic` field.
    MissingTopic,
    /// A known message type had missing or mistyped fields.
    Malformed(&'static str),
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidJson => write!(f, "body is not a JSON object"),
            Self::MissingTopic => write!(f, "missing topic"),
            Self::Malformed(kind) => write!(f, "malformed {kind} payload"),
        }
    }
}

impl std::error::Error for DecodeError {}

// ---------------------------------------------------------------------------
// Send errors
// ---------------------------------------------------------------------------

/// Outbound delivery failures.  Never retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendError {
    /// Destination mailbox is at capacity.
    MailboxFull,
    /// Sink has been shut down.
    Closed,
    /// Underlying writer failed.
    Io,
}

impl fmt::Display for SendError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MailboxFull => write!(f, "mailbox full"),
            Self::Closed => write!(f, "sink closed"),
            Self::Io => write!(f, "I/O error"),
        }
    }
}

impl std::error::Error for SendError {}

// ---------------------------------------------------------------------------
// Configuration errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// File exists but is not valid config JSON.
    Corrupted(String),
    /// A config field failed range validation.
    /// The `&'static str` describes which field and why.
    ValidationFailed(&'static str),
    /// Generic I/O error reading or writing the file.
    IoError,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Corrupted(msg) => write!(f, "config corrupted: {msg}"),
            Self::ValidationFailed(msg) => write!(f, "validation failed: {msg}"),
            Self::IoError => write!(f, "I/O error"),
        }
    }
}

impl std::error::Error for ConfigError {}
