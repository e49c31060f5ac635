//! Price adjustments on menu options.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A price adjustment such as `"+50"`, `"-20"`, `"100"` or `"+20 บาท"`.
///
/// The text is kept as entered, trimmed. Owners type currency marks and
/// thousands separators, and an explicit `+` must survive a round trip
/// through the backend, so nothing is reformatted.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PriceDelta(String);

impl PriceDelta {
    /// Any non-blank text.
    pub fn parse(text: &str) -> Option<Self> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return None;
        }
        Some(Self(trimmed.to_string()))
    }

    /// From a JSON value: numbers are stringified, strings are trimmed.
    pub fn from_json(value: &serde_json::Value) -> Option<Self> {
        match value {
            serde_json::Value::String(s) => Self::parse(s),
            serde_json::Value::Number(n) => Self::parse(&n.to_string()),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PriceDelta {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Serialize for PriceDelta {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for PriceDelta {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = serde_json::Value::deserialize(deserializer)?;
        Self::from_json(&value)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid price delta: {}", value)))
    }
}
