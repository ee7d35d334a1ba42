//! `PayloadValue` and closely related types.

use serde::{Deserialize, Serialize};

use std::fmt;

/// Opaque wrapper for a [`Debug`](fmt::Debug)gable object recorded as a payload field.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DebugObject(String);

impl fmt::Debug for DebugObject {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(&self.0)
    }
}

/// Returns the [`Debug`](fmt::Debug) representation of the object.
impl AsRef<str> for DebugObject {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Value of a single structured field in a [`TraceRecord`] payload.
///
/// [`TraceRecord`]: crate::TraceRecord
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum PayloadValue {
    /// Boolean value.
    Bool(bool),
    /// Signed integer value.
    Int(i128),
    /// Unsigned integer value.
    UInt(u128),
    /// Floating-point value.
    Float(f64),
    /// String value.
    String(String),
    /// Opaque object implementing the [`Debug`](fmt::Debug) trait.
    Object(DebugObject),
}

impl PayloadValue {
    /// Creates a value from the [`Debug`](fmt::Debug) representation of `object`.
    pub fn debug(object: &dyn fmt::Debug) -> Self {
        Self::Object(DebugObject(format!("{object:?}")))
    }

    /// Returns value as a Boolean, or `None` if it's not a Boolean value.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(value) => Some(*value),
            _ => None,
        }
    }

    /// Returns value as a signed integer, or `None` if it's not one.
    pub fn as_int(&self) -> Option<i128> {
        match self {
            Self::Int(value) => Some(*value),
            _ => None,
        }
    }

    /// Returns value as an unsigned integer, or `None` if it's not one.
    pub fn as_uint(&self) -> Option<u128> {
        match self {
            Self::UInt(value) => Some(*value),
            _ => None,
        }
    }

    /// Returns value as a floating-point value, or `None` if it's not one.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Self::Float(value) => Some(*value),
            _ => None,
        }
    }

    /// Returns value as a string, or `None` if it's not one.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(value) => Some(value),
            _ => None,
        }
    }

    /// Returns value as a [`Debug`](fmt::Debug) string output, or `None` if this value
    /// is not [`Self::Object`].
    pub fn as_debug_str(&self) -> Option<&str> {
        match self {
            Self::Object(value) => Some(&value.0),
            _ => None,
        }
    }
}

macro_rules! impl_value_conversions {
    (PayloadValue :: $variant:ident ($source:ty)) => {
        impl From<$source> for PayloadValue {
            fn from(value: $source) -> Self {
                Self::$variant(value.into())
            }
        }

        impl PartialEq<$source> for PayloadValue {
            fn eq(&self, other: &$source) -> bool {
                match (self, &PayloadValue::from(*other)) {
                    (Self::$variant(value), Self::$variant(other)) => value == other,
                    _ => false,
                }
            }
        }

        impl PartialEq<PayloadValue> for $source {
            fn eq(&self, other: &PayloadValue) -> bool {
                other == self
            }
        }
    };
}

impl_value_conversions!(PayloadValue::Bool(bool));
impl_value_conversions!(PayloadValue::Int(i128));
impl_value_conversions!(PayloadValue::Int(i64));
impl_value_conversions!(PayloadValue::UInt(u128));
impl_value_conversions!(PayloadValue::UInt(u64));
impl_value_conversions!(PayloadValue::Float(f64));

impl From<&str> for PayloadValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_owned())
    }
}

impl From<String> for PayloadValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl PartialEq<str> for PayloadValue {
    fn eq(&self, other: &str) -> bool {
        match self {
            Self::String(value) => value == other,
            _ => false,
        }
    }
}

impl PartialEq<PayloadValue> for str {
    fn eq(&self, other: &PayloadValue) -> bool {
        other == self
    }
}

impl PartialEq<&str> for PayloadValue {
    fn eq(&self, other: &&str) -> bool {
        match self {
            Self::String(value) => value == *other,
            _ => false,
        }
    }
}

impl PartialEq<PayloadValue> for &str {
    fn eq(&self, other: &PayloadValue) -> bool {
        other == self
    }
}
