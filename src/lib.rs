//! Bridging trace providers to an external log sink.
//!
//! This crate targets environments where the default trace-collection pipeline is
//! unavailable (e.g., a constrained hosting sandbox that cannot attach standard trace
//! listeners). The core type is [`TraceBridge`], a filtering/dispatch layer between a
//! process-wide trace-provider runtime and a [`LogSink`]:
//!
//! - At discovery time, the bridge decides per [`ProviderIdentity`] whether to subscribe,
//!   using a fixed [allow-list](filter) with a legacy-id exclusion. Accepted providers
//!   are enabled at full verbosity; nothing is pre-filtered by level or keyword.
//! - At emission time, every [`TraceRecord`] from an enabled provider is forwarded to the
//!   sink unmodified. Sink failures (errors and panics alike) are contained so that a
//!   misbehaving sink cannot destabilize tracing for the whole process.
//!
//! The provider runtime is injected, not ambient: the runtime (or a test fake) drives the
//! bridge through [`TraceBridge::on_provider_created()`] and
//! [`TraceBridge::on_event_written()`]. The bridge owns no threads, queues or global
//! state.
//!
//! # Examples
//!
//! ```
//! use tracing_bridge::{
//!     filter, EventKeywords, EventPayload, ProviderControl, ProviderIdentity, SinkError,
//!     TraceBridge, TraceLevel, TraceRecord,
//! };
//!
//! use std::{
//!     sync::{Arc, Mutex},
//!     time::SystemTime,
//! };
//!
//! // A provider as the runtime would present it on discovery.
//! struct Provider {
//!     identity: ProviderIdentity,
//!     subscription: Option<(TraceLevel, EventKeywords)>,
//! }
//!
//! impl ProviderControl for Provider {
//!     fn identity(&self) -> &ProviderIdentity {
//!         &self.identity
//!     }
//!
//!     fn enable(&mut self, level: TraceLevel, keywords: EventKeywords) {
//!         self.subscription = Some((level, keywords));
//!     }
//! }
//!
//! // Collect forwarded records in memory.
//! let records = Arc::new(Mutex::new(vec![]));
//! let sink_records = Arc::clone(&records);
//! let bridge = TraceBridge::new(move |record: &TraceRecord| {
//!     sink_records.lock().unwrap().push(record.clone());
//!     Ok::<_, SinkError>(())
//! });
//!
//! // The runtime presents a provider; the bridge subscribes at full verbosity.
//! let mut provider = Provider {
//!     identity: ProviderIdentity::new(
//!         filter::EXTENSION_PROVIDER,
//!         uuid::uuid!("9702be8f-d2cd-4ff7-9b5e-6d7caccf7d25"),
//!     ),
//!     subscription: None,
//! };
//! bridge.on_provider_created(&mut provider);
//! assert_eq!(
//!     provider.subscription,
//!     Some((TraceLevel::LogAlways, EventKeywords::ALL))
//! );
//!
//! // The runtime delivers an event; the bridge forwards it to the sink.
//! let mut payload = EventPayload::new();
//! payload.insert("message", "orchestration started".into());
//! bridge.on_event_written(&TraceRecord {
//!     provider: provider.identity.clone(),
//!     event_id: 101,
//!     level: TraceLevel::Informational,
//!     keywords: EventKeywords::NONE,
//!     payload,
//!     timestamp: SystemTime::now(),
//! });
//!
//! let records = records.lock().unwrap();
//! assert_eq!(records.len(), 1);
//! assert_eq!(records[0].payload["message"], "orchestration started");
//! ```

// Documentation settings.
#![doc(html_root_url = "https://docs.rs/tracing-bridge/0.1.0")]
// Linter settings.
#![warn(missing_debug_implementations, missing_docs, bare_trait_objects)]
#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::must_use_candidate, clippy::module_name_repetitions)]

mod bridge;
pub mod filter;
mod types;
mod value;
mod values;

pub use crate::{
    bridge::{LogSink, ProviderControl, SinkError, TraceBridge},
    types::{EventKeywords, ProviderIdentity, TraceLevel, TraceRecord},
    value::{DebugObject, PayloadValue},
    values::EventPayload,
};

#[cfg(doctest)]
doc_comment::doctest!("../README.md");
