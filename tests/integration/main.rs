//! Integration tests for the trace bridge, driven by a fake provider registry.

use uuid::{uuid, Uuid};

use std::{
    sync::{Arc, Mutex},
    thread,
    time::{Duration, SystemTime},
};


use tracing_bridge::{
    filter, EventKeywords, EventPayload, LogSink, ProviderControl, ProviderIdentity, SinkError,
    TraceBridge, TraceLevel, TraceRecord,
};

const CURRENT_CORE_ID: Uuid = uuid!("64aef265-1d18-4e90-973b-2f2bbe331318");
const STORAGE_ID: Uuid = uuid!("27ca4d47-7d14-4938-9081-2b350938345b");

#[derive(Debug)]
struct FakeProvider {
    identity: ProviderIdentity,
    subscription: Option<(TraceLevel, EventKeywords)>,
    enable_calls: usize,
}

impl FakeProvider {
    fn new(name: &str, unique_id: Uuid) -> Self {
        Self {
            identity: ProviderIdentity::new(name, unique_id),
            subscription: None,
            enable_calls: 0,
        }
    }

    /// Produces a record the way the runtime would: only enabled providers deliver.
    fn emit(&self, event_id: u32, payload: EventPayload) -> Option<TraceRecord> {
        self.subscription.map(|(level, keywords)| {
            debug_assert_eq!(level, TraceLevel::LogAlways);
            debug_assert_eq!(keywords, EventKeywords::ALL);
            TraceRecord {
                provider: self.identity.clone(),
                event_id,
                level: TraceLevel::Informational,
                keywords: EventKeywords(0b1),
                payload,
                timestamp: SystemTime::now(),
            }
        })
    }
}

impl ProviderControl for FakeProvider {
    fn identity(&self) -> &ProviderIdentity {
        &self.identity
    }

    fn enable(&mut self, level: TraceLevel, keywords: EventKeywords) {
        self.enable_calls += 1;
        self.subscription = Some((level, keywords));
    }
}

#[derive(Debug, Default)]
struct FakeRegistry {
    providers: Vec<FakeProvider>,
}

impl FakeRegistry {
    fn push(&mut self, name: &str, unique_id: Uuid) -> usize {
        self.providers.push(FakeProvider::new(name, unique_id));
        self.providers.len() - 1
    }

    fn discover(&mut self, bridge: &TraceBridge<impl LogSink>) {
        for provider in &mut self.providers {
            bridge.on_provider_created(provider);
        }
    }

    fn emit(
        &self,
        bridge: &TraceBridge<impl LogSink>,
        provider_idx: usize,
        event_id: u32,
        payload: EventPayload,
    ) {
        if let Some(record) = self.providers[provider_idx].emit(event_id, payload) {
            bridge.on_event_written(&record);
        }
    }
}

#[derive(Debug, Clone, Default)]
struct MemorySink {
    records: Arc<Mutex<Vec<TraceRecord>>>,
}

impl MemorySink {
    fn records(&self) -> Vec<TraceRecord> {
        self.records.lock().unwrap().clone()
    }
}

impl LogSink for MemorySink {
    fn log(&self, record: &TraceRecord) -> Result<(), SinkError> {
        self.records.lock().unwrap().push(record.clone());
        Ok(())
    }
}

fn message_payload(message: &str) -> EventPayload {
    let mut payload = EventPayload::new();
    payload.insert("message", message.into());
    payload
}

#[test]
fn recognized_providers_are_subscribed_at_full_verbosity() {
    let bridge = TraceBridge::new(MemorySink::default());
    let mut registry = FakeRegistry::default();
    for name in [
        filter::AZURE_STORAGE_PROVIDER,
        filter::SQL_PROVIDER,
        filter::EXTENSION_PROVIDER,
    ] {
        registry.push(name, STORAGE_ID);
    }
    registry.push(filter::CORE_PROVIDER, CURRENT_CORE_ID);
    registry.discover(&bridge);

    assert_eq!(bridge.enabled_providers(), 4);
    for provider in &registry.providers {
        assert_eq!(
            provider.subscription,
            Some((TraceLevel::LogAlways, EventKeywords::ALL)),
            "{}",
            provider.identity
        );
    }
}

#[test]
fn duplicate_core_providers_are_told_apart_by_id() {
    let bridge = TraceBridge::new(MemorySink::default());
    let mut registry = FakeRegistry::default();
    let legacy = registry.push(filter::CORE_PROVIDER, filter::LEGACY_CORE_ID);
    let current = registry.push(filter::CORE_PROVIDER, CURRENT_CORE_ID);
    let unknown = registry.push("UnknownProvider", STORAGE_ID);
    registry.discover(&bridge);

    assert_eq!(bridge.enabled_providers(), 1);
    assert_eq!(registry.providers[legacy].subscription, None);
    assert_eq!(registry.providers[unknown].subscription, None);
    assert_eq!(
        registry.providers[current].subscription,
        Some((TraceLevel::LogAlways, EventKeywords::ALL))
    );
}

#[test]
fn rediscovery_enables_a_provider_once() {
    let bridge = TraceBridge::new(MemorySink::default());
    let mut registry = FakeRegistry::default();
    registry.push(filter::SQL_PROVIDER, STORAGE_ID);
    registry.discover(&bridge);
    registry.discover(&bridge);

    assert_eq!(bridge.enabled_providers(), 1);
    assert_eq!(registry.providers[0].enable_calls, 1);
}

#[test]
fn records_are_forwarded_unmodified_in_emission_order() {
    let sink = MemorySink::default();
    let bridge = TraceBridge::new(sink.clone());
    let mut registry = FakeRegistry::default();
    let provider = registry.push(filter::EXTENSION_PROVIDER, STORAGE_ID);
    registry.discover(&bridge);

    for event_id in 0..10 {
        registry.emit(
            &bridge,
            provider,
            event_id,
            message_payload(&format!("event #{event_id}")),
        );
    }

    let records = sink.records();
    assert_eq!(records.len(), 10);
    for (i, record) in records.iter().enumerate() {
        assert_eq!(record.event_id, i as u32);
        assert_eq!(record.provider.name, filter::EXTENSION_PROVIDER);
        assert_eq!(record.level, TraceLevel::Informational);
        assert_eq!(record.payload["message"], format!("event #{i}").as_str());
    }
    assert_eq!(bridge.sink_failures(), 0);
}

#[test]
fn rejected_providers_never_deliver() {
    let sink = MemorySink::default();
    let bridge = TraceBridge::new(sink.clone());
    let mut registry = FakeRegistry::default();
    let legacy = registry.push(filter::CORE_PROVIDER, filter::LEGACY_CORE_ID);
    let unknown = registry.push("UnknownProvider", STORAGE_ID);
    registry.discover(&bridge);

    registry.emit(&bridge, legacy, 1, message_payload("dropped"));
    registry.emit(&bridge, unknown, 2, message_payload("dropped"));
    assert!(sink.records().is_empty());
}

#[test]
fn sink_errors_do_not_interrupt_forwarding() {
    #[derive(Debug, Clone, Default)]
    struct FlakySink {
        inner: MemorySink,
    }

    impl LogSink for FlakySink {
        fn log(&self, record: &TraceRecord) -> Result<(), SinkError> {
            if record.event_id == 1 {
                return Err("transient sink outage".into());
            }
            self.inner.log(record)
        }
    }

    let sink = FlakySink::default();
    let bridge = TraceBridge::new(sink.clone());
    let mut registry = FakeRegistry::default();
    let provider = registry.push(filter::AZURE_STORAGE_PROVIDER, STORAGE_ID);
    registry.discover(&bridge);

    for event_id in 0..4 {
        registry.emit(&bridge, provider, event_id, message_payload("flaky"));
    }

    let delivered: Vec<_> = sink
        .inner
        .records()
        .iter()
        .map(|record| record.event_id)
        .collect();
    assert_eq!(delivered, [0, 2, 3]);
    assert_eq!(bridge.sink_failures(), 1);
}

#[test]
fn sink_panics_are_contained() {
    #[derive(Debug, Clone, Default)]
    struct PanickySink {
        inner: MemorySink,
    }

    impl LogSink for PanickySink {
        fn log(&self, record: &TraceRecord) -> Result<(), SinkError> {
            assert_ne!(record.event_id, 1, "poisoned record");
            self.inner.log(record)
        }
    }

    let sink = PanickySink::default();
    let bridge = TraceBridge::new(sink.clone());
    let mut registry = FakeRegistry::default();
    let provider = registry.push(filter::SQL_PROVIDER, STORAGE_ID);
    registry.discover(&bridge);

    // Silence the panic hook for the expected sink panic.
    let hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(|_| {}));
    for event_id in 0..3 {
        registry.emit(&bridge, provider, event_id, message_payload("panicky"));
    }
    std::panic::set_hook(hook);

    let delivered: Vec<_> = sink
        .inner
        .records()
        .iter()
        .map(|record| record.event_id)
        .collect();
    assert_eq!(delivered, [0, 2]);
    assert_eq!(bridge.sink_failures(), 1);
}

#[test]
fn per_provider_order_is_preserved_across_threads() {
    const EVENTS_PER_PROVIDER: u32 = 100;

    let sink = MemorySink::default();
    let bridge = TraceBridge::new(sink.clone());
    let mut registry = FakeRegistry::default();
    let storage = registry.push(filter::AZURE_STORAGE_PROVIDER, STORAGE_ID);
    let core = registry.push(filter::CORE_PROVIDER, CURRENT_CORE_ID);
    registry.discover(&bridge);

    thread::scope(|scope| {
        for provider_idx in [storage, core] {
            let bridge = &bridge;
            let registry = &registry;
            scope.spawn(move || {
                for event_id in 0..EVENTS_PER_PROVIDER {
                    registry.emit(bridge, provider_idx, event_id, EventPayload::new());
                }
            });
        }
    });

    let records = sink.records();
    assert_eq!(records.len(), 2 * EVENTS_PER_PROVIDER as usize);
    for name in [filter::AZURE_STORAGE_PROVIDER, filter::CORE_PROVIDER] {
        let ids: Vec<_> = records
            .iter()
            .filter(|record| record.provider.name == name)
            .map(|record| record.event_id)
            .collect();
        let expected: Vec<_> = (0..EVENTS_PER_PROVIDER).collect();
        assert_eq!(ids, expected, "{name}");
    }
    assert_eq!(bridge.sink_failures(), 0);
}

#[test]
fn serialized_record_shape() {
    let mut payload = EventPayload::new();
    payload.insert("message", "taken".into());
    payload.insert("partition", 7_u64.into());
    let record = TraceRecord {
        provider: ProviderIdentity::new(filter::CORE_PROVIDER, CURRENT_CORE_ID),
        event_id: 42,
        level: TraceLevel::Warning,
        keywords: EventKeywords(0b100),
        payload,
        timestamp: SystemTime::UNIX_EPOCH + Duration::from_secs(1_700_000_000),
    };

    let json = serde_json::to_value(&record).unwrap();
    assert_eq!(
        json,
        serde_json::json!({
            "provider": {
                "name": "DurableTask-Core",
                "unique_id": "64aef265-1d18-4e90-973b-2f2bbe331318",
            },
            "event_id": 42,
            "level": "warning",
            "keywords": 4,
            "payload": {
                "message": { "string": "taken" },
                "partition": { "u_int": 7 },
            },
            "timestamp": {
                "secs_since_epoch": 1_700_000_000,
                "nanos_since_epoch": 0,
            },
        })
    );

    let restored: TraceRecord = serde_json::from_value(json).unwrap();
    assert_eq!(restored.provider, record.provider);
    assert_eq!(restored.payload, record.payload);
    assert_eq!(restored.timestamp, record.timestamp);
}
