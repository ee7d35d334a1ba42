//! Core data types exchanged between the provider runtime and the bridge.

use serde::{Deserialize, Serialize};
use tracing_core::Level;
use uuid::Uuid;

use std::{fmt, ops, time::SystemTime};

use crate::EventPayload;

/// Identity of a trace provider, supplied by the provider runtime at discovery time.
///
/// A provider is identified by a human-readable name *and* a unique id. The id matters:
/// two differently-versioned providers can share a name (see
/// [`LEGACY_CORE_ID`](crate::filter::LEGACY_CORE_ID)), and only the id tells them apart.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProviderIdentity {
    /// Human-readable provider name.
    pub name: String,
    /// Unique id of this provider instance.
    pub unique_id: Uuid,
}

impl ProviderIdentity {
    /// Creates a new identity.
    pub fn new(name: impl Into<String>, unique_id: Uuid) -> Self {
        Self {
            name: name.into(),
            unique_id,
        }
    }
}

impl fmt::Display for ProviderIdentity {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{} {{{}}}", self.name, self.unique_id)
    }
}

/// Severity of a trace event, or a subscription threshold when passed to
/// [`ProviderControl::enable()`](crate::ProviderControl::enable()).
///
/// Levels follow the provider runtime's severity ladder. As a threshold,
/// [`Self::LogAlways`] requests delivery of every event regardless of its level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TraceLevel {
    /// Matches all events when used as a subscription threshold.
    LogAlways,
    /// Critical error.
    Critical,
    /// Recoverable error.
    Error,
    /// Warning.
    Warning,
    /// Informational message.
    Informational,
    /// Verbose / debugging output.
    Verbose,
}

impl From<Level> for TraceLevel {
    fn from(level: Level) -> Self {
        match level {
            Level::ERROR => Self::Error,
            Level::WARN => Self::Warning,
            Level::INFO => Self::Informational,
            Level::DEBUG | Level::TRACE => Self::Verbose,
        }
    }
}

/// Keyword bitmask attached to trace events and subscriptions.
///
/// Keyword bits are defined by each provider; the bridge itself only ever subscribes
/// with [`Self::ALL`], so no event is pre-filtered by keyword.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventKeywords(pub u64);

impl EventKeywords {
    /// Empty keyword mask.
    pub const NONE: Self = Self(0);
    /// Unrestricted keyword mask (all bits set).
    pub const ALL: Self = Self(u64::MAX);

    /// Checks whether all bits of `other` are set in this mask.
    pub fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }
}

impl ops::BitOr for EventKeywords {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self::Output {
        Self(self.0 | rhs.0)
    }
}

impl ops::BitAnd for EventKeywords {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self::Output {
        Self(self.0 & rhs.0)
    }
}

/// One emitted trace event's structured data.
///
/// Records are produced by the provider runtime once per emitted event and handed to the
/// bridge, which forwards them to the [`LogSink`](crate::LogSink) unmodified. The bridge
/// never persists records.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TraceRecord {
    /// Identity of the provider that emitted the event.
    pub provider: ProviderIdentity,
    /// Provider-scoped event id.
    pub event_id: u32,
    /// Severity of the event.
    pub level: TraceLevel,
    /// Keyword bits the event was emitted with.
    pub keywords: EventKeywords,
    /// Structured event fields.
    pub payload: EventPayload,
    /// Wall-clock time at which the event was emitted, assigned by the runtime.
    pub timestamp: SystemTime,
}
