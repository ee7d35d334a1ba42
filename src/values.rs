//! `EventPayload` and closely related types.

use serde::{
    de::{MapAccess, Visitor},
    ser::SerializeMap,
    Deserialize, Deserializer, Serialize, Serializer,
};
use tracing_core::{
    field::{Field, ValueSet, Visit},
    span::Record,
    Event,
};

use std::{fmt, mem, ops};

use crate::PayloadValue;

/// Structured payload of a [`TraceRecord`]: a collection of named [`PayloadValue`]s.
///
/// Functionally this collection is similar to a `HashMap<String, PayloadValue>`,
/// with the key difference that the order of [iteration](Self::iter()) is the insertion
/// order. If a value is updated, it preserves its old placement.
///
/// [`TraceRecord`]: crate::TraceRecord
#[derive(Clone, Default, PartialEq)]
pub struct EventPayload {
    inner: Vec<(String, PayloadValue)>,
}

impl fmt::Debug for EventPayload {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = formatter.debug_map();
        for (key, value) in &self.inner {
            map.entry(key, value);
        }
        map.finish()
    }
}

impl EventPayload {
    /// Creates a new empty payload.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a payload from the values in the specified value set.
    pub fn from_values(values: &ValueSet<'_>) -> Self {
        let mut visitor = PayloadVisitor::default();
        values.record(&mut visitor);
        visitor.payload
    }

    /// Creates a payload from the values in the specified span record.
    pub fn from_record(values: &Record<'_>) -> Self {
        let mut visitor = PayloadVisitor::default();
        values.record(&mut visitor);
        visitor.payload
    }

    /// Creates a payload from the values in the specified tracing event.
    pub fn from_event(event: &Event<'_>) -> Self {
        let mut visitor = PayloadVisitor::default();
        event.record(&mut visitor);
        visitor.payload
    }

    /// Returns the number of stored values.
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Checks whether this payload is empty.
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Returns the value with the specified name, or `None` if it is not set.
    pub fn get(&self, key: &str) -> Option<&PayloadValue> {
        self.inner.iter().find_map(|(existing_key, value)| {
            if existing_key == key {
                Some(value)
            } else {
                None
            }
        })
    }

    /// Iterates over the contained name-value pairs in insertion order.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = (&str, &PayloadValue)> + '_ {
        self.inner.iter().map(|(key, value)| (key.as_str(), value))
    }

    /// Inserts a value with the specified name. If a value with the same name was present
    /// previously, it is overwritten and returned.
    pub fn insert(&mut self, key: impl Into<String>, value: PayloadValue) -> Option<PayloadValue> {
        let key = key.into();
        let position = self
            .inner
            .iter()
            .position(|(existing_key, _)| *existing_key == key);
        if let Some(position) = position {
            let place = &mut self.inner[position].1;
            Some(mem::replace(place, value))
        } else {
            self.inner.push((key, value));
            None
        }
    }
}

impl ops::Index<&str> for EventPayload {
    type Output = PayloadValue;

    fn index(&self, index: &str) -> &Self::Output {
        self.get(index)
            .unwrap_or_else(|| panic!("value `{index}` is not defined"))
    }
}

impl<S: Into<String>> FromIterator<(S, PayloadValue)> for EventPayload {
    fn from_iter<I: IntoIterator<Item = (S, PayloadValue)>>(iter: I) -> Self {
        let mut this = Self::new();
        this.extend(iter);
        this
    }
}

impl<S: Into<String>> Extend<(S, PayloadValue)> for EventPayload {
    fn extend<I: IntoIterator<Item = (S, PayloadValue)>>(&mut self, iter: I) {
        for (name, value) in iter {
            self.insert(name, value);
        }
    }
}

impl IntoIterator for EventPayload {
    type Item = (String, PayloadValue);
    type IntoIter = std::vec::IntoIter<(String, PayloadValue)>;

    fn into_iter(self) -> Self::IntoIter {
        self.inner.into_iter()
    }
}

impl Serialize for EventPayload {
    fn serialize<Ser: Serializer>(&self, serializer: Ser) -> Result<Ser::Ok, Ser::Error> {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (name, value) in self.iter() {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for EventPayload {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct MapVisitor;

        impl<'v> Visitor<'v> for MapVisitor {
            type Value = EventPayload;

            fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
                formatter.write_str("map of name-value entries")
            }

            fn visit_map<A: MapAccess<'v>>(self, mut map: A) -> Result<Self::Value, A::Error> {
                let mut payload = EventPayload {
                    inner: Vec::with_capacity(map.size_hint().unwrap_or(0)),
                };
                while let Some((name, value)) = map.next_entry::<String, _>()? {
                    payload.insert(name, value);
                }
                Ok(payload)
            }
        }

        deserializer.deserialize_map(MapVisitor)
    }
}

#[derive(Debug, Default)]
struct PayloadVisitor {
    payload: EventPayload,
}

impl Visit for PayloadVisitor {
    fn record_f64(&mut self, field: &Field, value: f64) {
        self.payload.insert(field.name(), value.into());
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.payload.insert(field.name(), value.into());
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.payload.insert(field.name(), value.into());
    }

    fn record_i128(&mut self, field: &Field, value: i128) {
        self.payload.insert(field.name(), value.into());
    }

    fn record_u128(&mut self, field: &Field, value: u128) {
        self.payload.insert(field.name(), value.into());
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.payload.insert(field.name(), value.into());
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        self.payload.insert(field.name(), value.into());
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        self.payload.insert(field.name(), PayloadValue::debug(value));
    }
}
