//! The bridge proper: subscription at discovery time, forwarding at emission time.

use uuid::Uuid;

use std::{
    collections::HashSet,
    error, fmt,
    panic::{self, AssertUnwindSafe},
    sync::{
        atomic::{AtomicU64, Ordering},
        Mutex,
    },
};

use crate::{filter, EventKeywords, ProviderIdentity, TraceLevel, TraceRecord};

/// Error raised by a [`LogSink`] while logging a record.
///
/// The bridge never inspects sink errors; it only counts them
/// (see [`TraceBridge::sink_failures()`]), so any boxed error will do.
pub type SinkError = Box<dyn error::Error + Send + Sync>;

/// External logging destination that receives forwarded [`TraceRecord`]s.
///
/// A sink is constructed by the caller and injected into [`TraceBridge::new()`]; the
/// bridge does not own its lifecycle and never closes it. The logging operation is
/// expected to be fast and non-blocking — it runs synchronously on whatever thread
/// emitted the trace event.
///
/// The trait is implemented for compatible closures, which is handy in tests:
///
/// ```
/// use tracing_bridge::{SinkError, TraceBridge, TraceRecord};
///
/// let bridge = TraceBridge::new(|record: &TraceRecord| {
///     println!("{}: event #{}", record.provider, record.event_id);
///     Ok::<_, SinkError>(())
/// });
/// # drop(bridge);
/// ```
pub trait LogSink: Send + Sync {
    /// Accepts one record and performs a side effect (writes / ships it).
    ///
    /// # Errors
    ///
    /// May fail with a sink-defined error. Failures are contained by the bridge and
    /// never propagate back to the emitting caller.
    fn log(&self, record: &TraceRecord) -> Result<(), SinkError>;
}

impl<F> LogSink for F
where
    F: Fn(&TraceRecord) -> Result<(), SinkError> + Send + Sync,
{
    fn log(&self, record: &TraceRecord) -> Result<(), SinkError> {
        self(record)
    }
}

/// Runtime-side control surface for one discovered provider.
///
/// The provider runtime (or a test fake) presents each discovered provider to the bridge
/// through this trait: [`Self::identity()`] drives the filtering decision, and
/// [`Self::enable()`] requests event delivery for accepted providers.
pub trait ProviderControl {
    /// Returns the identity of this provider.
    fn identity(&self) -> &ProviderIdentity;

    /// Requests that the runtime begin delivering this provider's events at the specified
    /// severity threshold and keyword mask.
    fn enable(&mut self, level: TraceLevel, keywords: EventKeywords);
}

/// Bridge between a process-wide trace-provider runtime and a [`LogSink`].
///
/// The bridge is a passive observer driven entirely by runtime callbacks; it owns no
/// threads, queues or buffers. The runtime calls [`Self::on_provider_created()`] once per
/// discovered provider, and then [`Self::on_event_written()`] once per event emitted by a
/// provider the bridge enabled. Both calls are cheap and non-blocking; forwarding happens
/// synchronously on the emitting thread, so per-provider, per-thread emission order is
/// preserved by construction.
///
/// A failing sink cannot destabilize the tracing subsystem: both `Err` returns and panics
/// from [`LogSink::log()`] are contained in the forwarding call and surface only through
/// the [`Self::sink_failures()`] counter.
///
/// # Examples
///
/// See [crate-level docs](index.html) for an example of usage.
pub struct TraceBridge<S> {
    sink: S,
    enabled: Mutex<HashSet<Uuid>>,
    sink_failures: AtomicU64,
}

impl<S> fmt::Debug for TraceBridge<S> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("TraceBridge")
            .field("enabled", &self.enabled)
            .field("sink_failures", &self.sink_failures)
            .finish_non_exhaustive()
    }
}

#[allow(clippy::missing_panics_doc)] // lock poisoning propagation
impl<S: LogSink> TraceBridge<S> {
    /// Creates a bridge bound to the specified sink. The sink reference is read-only
    /// afterwards; the bridge never reassigns or closes it.
    pub fn new(sink: S) -> Self {
        Self {
            sink,
            enabled: Mutex::new(HashSet::new()),
            sink_failures: AtomicU64::new(0),
        }
    }

    /// Discovery callback, to be invoked by the provider runtime once per known provider.
    ///
    /// If the provider's identity matches the [allow-list](crate::filter), event delivery
    /// is enabled at the broadest severity ([`TraceLevel::LogAlways`]) and the
    /// unrestricted keyword mask ([`EventKeywords::ALL`]). Unrecognized providers are
    /// left untouched. Re-discovering an already enabled provider is a no-op, so enabling
    /// happens at most once per provider identity.
    pub fn on_provider_created(&self, provider: &mut dyn ProviderControl) {
        let unique_id = {
            let identity = provider.identity();
            if !filter::matches(identity) {
                return;
            }
            identity.unique_id
        };
        if self.enabled.lock().unwrap().insert(unique_id) {
            provider.enable(TraceLevel::LogAlways, EventKeywords::ALL);
        }
    }

    /// Forwarding callback, to be invoked by the provider runtime once per event emitted
    /// by an enabled provider.
    ///
    /// The record is handed to the sink unmodified; no transformation, filtering or
    /// buffering takes place. Sink failures — both `Err` returns and panics — are
    /// contained here and only increment [`Self::sink_failures()`]; they never cross back
    /// into the runtime's dispatch path.
    pub fn on_event_written(&self, record: &TraceRecord) {
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| self.sink.log(record)));
        if !matches!(outcome, Ok(Ok(()))) {
            self.sink_failures.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Returns the number of providers enabled so far.
    pub fn enabled_providers(&self) -> usize {
        self.enabled.lock().unwrap().len()
    }

    /// Returns the number of contained sink failures. This is the bridge's only
    /// diagnostic channel; failures are not reported anywhere else.
    pub fn sink_failures(&self) -> u64 {
        self.sink_failures.load(Ordering::Relaxed)
    }
}
