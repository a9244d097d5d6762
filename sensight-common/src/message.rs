use serde::{Deserialize, Serialize};
use std::fmt;

/// A scalar payload carried by a [`Message`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum Value {
    /// Whole-number reading (moisture, lux, battery level).
    Integer(i64),

    /// Fractional reading (temperature).
    Float(f64),

    /// Text payload (availability markers, firmware strings).
    Text(String),
}

impl Value {
    /// Render the payload bytes sent on the wire.
    ///
    /// Payloads are plain text so any subscriber can consume them without
    /// knowing the encoding, e.g. `21.5`, `42` or `online`.
    pub fn to_payload(&self) -> Vec<u8> {
        self.to_string().into_bytes()
    }

    /// Interpret the value as a float, if numeric.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Integer(v) => Some(*v as f64),
            Value::Float(v) => Some(*v),
            Value::Text(_) => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Integer(v) => write!(f, "{}", v),
            Value::Float(v) => write!(f, "{}", v),
            Value::Text(v) => f.write_str(v),
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Integer(v)
    }
}

impl From<u32> for Value {
    fn from(v: u32) -> Self {
        Value::Integer(i64::from(v))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

/// Binary availability marker published on a device's availability topic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Availability {
    Online,
    Offline,
}

impl Availability {
    /// Get the payload string for this state.
    pub fn as_str(&self) -> &'static str {
        match self {
            Availability::Online => "online",
            Availability::Offline => "offline",
        }
    }
}

impl fmt::Display for Availability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A topic-addressed message handed to the publish/subscribe layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Full topic (key expression) the payload is published on.
    pub topic: String,

    /// Scalar payload.
    pub payload: Value,

    /// Whether the transport should keep this as the last known value.
    pub retain: bool,
}

impl Message {
    /// Create a new message.
    pub fn new(topic: impl Into<String>, payload: impl Into<Value>, retain: bool) -> Self {
        Self {
            topic: topic.into(),
            payload: payload.into(),
            retain,
        }
    }

    /// Create a retained sensor reading.
    pub fn reading(topic: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(topic, value, true)
    }

    /// Create a retained availability marker.
    pub fn availability(topic: impl Into<String>, state: Availability) -> Self {
        Self::new(topic, state.as_str(), true)
    }

    /// Return the availability state carried by this message, if any.
    pub fn availability_state(&self) -> Option<Availability> {
        match &self.payload {
            Value::Text(text) if text == "online" => Some(Availability::Online),
            Value::Text(text) if text == "offline" => Some(Availability::Offline),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_payload_rendering() {
        assert_eq!(Value::from(21.5).to_payload(), b"21.5".to_vec());
        assert_eq!(Value::from(42i64).to_payload(), b"42".to_vec());
        assert_eq!(Value::from("online").to_payload(), b"online".to_vec());
        assert_eq!(Value::from(1.0).to_string(), "1");
    }

    #[test]
    fn test_value_as_f64() {
        assert_eq!(Value::Integer(7).as_f64(), Some(7.0));
        assert_eq!(Value::Float(0.5).as_f64(), Some(0.5));
        assert_eq!(Value::Text("x".into()).as_f64(), None);
    }

    #[test]
    fn test_availability_message() {
        let msg = Message::availability("sensight/miflora/herbs/availability", Availability::Offline);

        assert!(msg.retain);
        assert_eq!(msg.payload, Value::Text("offline".to_string()));
        assert_eq!(msg.availability_state(), Some(Availability::Offline));
    }

    #[test]
    fn test_reading_is_not_availability() {
        let msg = Message::reading("sensight/miflora/herbs/moisture", 35i64);

        assert!(msg.retain);
        assert_eq!(msg.availability_state(), None);
    }
}
