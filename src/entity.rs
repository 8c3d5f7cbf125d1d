//! Entity identifiers.
//!
//! Every sensor/actuator unit (a hen) is addressed by an opaque string,
//! typically the sender's bare or full XMPP address.  Identifiers live in a
//! fixed-capacity buffer so per-entity maps never chase a heap pointer for
//! the key; anything longer than [`ENTITY_ID_CAP`] bytes is rejected as
//! malformed at decode time.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

/// Maximum identifier length in bytes.  Fits `node@domain/resource`
/// addresses with generous parts.
pub const ENTITY_ID_CAP: usize = 256;

/// Opaque entity identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String")]
pub struct EntityId(heapless::String<ENTITY_ID_CAP>);

impl EntityId {
    /// Build an identifier.  Returns `None` for empty or over-long input.
    pub fn new(id: &str) -> Option<Self> {
        if id.is_empty() {
            return None;
        }
        let mut s = heapless::String::new();
        s.push_str(id).ok()?;
        Some(Self(s))
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl AsRef<str> for EntityId {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

/// Error returned when parsing an [`EntityId`] from a string fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidEntityId;

impl fmt::Display for InvalidEntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "entity id must be 1..={ENTITY_ID_CAP} bytes")
    }
}

impl TryFrom<String> for EntityId {
    type Error = InvalidEntityId;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(&s).ok_or(InvalidEntityId)
    }
}

impl FromStr for EntityId {
    type Err = InvalidEntityId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or(InvalidEntityId)
    }
}
