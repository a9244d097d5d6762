use crate::error::{Error, Result};

/// Default topic prefix for all SenSight traffic.
pub const KEY_PREFIX: &str = "sensight";

/// Default prefix under which discovery descriptors are announced.
pub const DISCOVERY_PREFIX: &str = "homeassistant";

/// Last topic segment of a device's availability topic.
pub const AVAILABILITY_SEGMENT: &str = "availability";

/// Characters that cannot appear inside a single topic segment.
const RESERVED_CHARS: &[char] = &['/', '*', '#', '?', '$'];

/// Builder for the topics a worker publishes on.
///
/// Topics follow the pattern:
/// `<prefix>/<device>/<attribute>` for readings and
/// `<prefix>/<device>/availability` for availability markers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicBuilder {
    prefix: String,
}

impl TopicBuilder {
    /// Create a builder for the given prefix (e.g. `sensight/miflora`).
    pub fn new(prefix: impl Into<String>) -> Self {
        let prefix: String = prefix.into();
        Self {
            prefix: prefix.trim_end_matches('/').to_string(),
        }
    }

    /// Get the topic prefix.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Build the topic for one reading of a device.
    ///
    /// # Example
    /// ```
    /// use sensight_common::topic::TopicBuilder;
    ///
    /// let topics = TopicBuilder::new("sensight/miflora");
    /// assert_eq!(topics.reading("herbs", "moisture"), "sensight/miflora/herbs/moisture");
    /// ```
    pub fn reading(&self, device: &str, attribute: &str) -> String {
        format!("{}/{}/{}", self.prefix, device, attribute)
    }

    /// Build the availability topic of a device.
    ///
    /// # Example
    /// ```
    /// use sensight_common::topic::TopicBuilder;
    ///
    /// let topics = TopicBuilder::new("sensight/miflora");
    /// assert_eq!(topics.availability("herbs"), "sensight/miflora/herbs/availability");
    /// ```
    pub fn availability(&self, device: &str) -> String {
        self.reading(device, AVAILABILITY_SEGMENT)
    }

    /// Build a wildcard matching every topic of a device.
    pub fn device_wildcard(&self, device: &str) -> String {
        format!("{}/{}/**", self.prefix, device)
    }

    /// Build the bridge status key.
    ///
    /// # Example
    /// ```
    /// use sensight_common::topic::TopicBuilder;
    ///
    /// let topics = TopicBuilder::new("sensight/miflora");
    /// assert_eq!(topics.status_key(), "sensight/miflora/@/status");
    /// ```
    pub fn status_key(&self) -> String {
        format!("{}/@/status", self.prefix)
    }

    /// Split a topic published by this builder into device and attribute.
    ///
    /// Returns `None` if the topic lives outside the prefix or does not have
    /// exactly two segments after it.
    pub fn parse<'a>(&self, topic: &'a str) -> Option<ParsedTopic<'a>> {
        let rest = topic.strip_prefix(self.prefix.as_str())?.strip_prefix('/')?;
        let (device, attribute) = rest.split_once('/')?;

        if device.is_empty() || attribute.is_empty() || attribute.contains('/') {
            return None;
        }

        Some(ParsedTopic { device, attribute })
    }
}

/// Parsed components of a worker topic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParsedTopic<'a> {
    pub device: &'a str,
    pub attribute: &'a str,
}

impl ParsedTopic<'_> {
    /// Whether this is an availability topic.
    pub fn is_availability(&self) -> bool {
        self.attribute == AVAILABILITY_SEGMENT
    }
}

/// Build the topic a discovery descriptor is announced on.
///
/// # Example
/// ```
/// use sensight_common::topic::discovery_topic;
///
/// assert_eq!(
///     discovery_topic("homeassistant", "sensor", "C47C8D6A1234", "miflora_herbs_light"),
///     "homeassistant/sensor/C47C8D6A1234/miflora_herbs_light/config"
/// );
/// ```
pub fn discovery_topic(prefix: &str, component: &str, node_id: &str, object_id: &str) -> String {
    format!(
        "{}/{}/{}/{}/config",
        prefix.trim_end_matches('/'),
        component,
        node_id,
        object_id
    )
}

/// Check that a value can be used as a single topic segment.
pub fn validate_segment(segment: &str) -> Result<()> {
    if segment.is_empty() {
        return Err(Error::Topic("segment cannot be empty".to_string()));
    }

    if segment
        .chars()
        .any(|c| c.is_whitespace() || RESERVED_CHARS.contains(&c))
    {
        return Err(Error::Topic(format!(
            "'{}' contains whitespace or one of {:?}",
            segment, RESERVED_CHARS
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_topic_builder() {
        let topics = TopicBuilder::new("sensight/miflora/");

        assert_eq!(topics.prefix(), "sensight/miflora");
        assert_eq!(
            topics.reading("herbs", "temperature"),
            "sensight/miflora/herbs/temperature"
        );
        assert_eq!(
            topics.availability("herbs"),
            "sensight/miflora/herbs/availability"
        );
        assert_eq!(topics.device_wildcard("herbs"), "sensight/miflora/herbs/**");
        assert_eq!(topics.status_key(), "sensight/miflora/@/status");
    }

    #[test]
    fn test_parse_topic() {
        let topics = TopicBuilder::new("sensight/miflora");

        let parsed = topics.parse("sensight/miflora/herbs/light").unwrap();
        assert_eq!(parsed.device, "herbs");
        assert_eq!(parsed.attribute, "light");
        assert!(!parsed.is_availability());

        let parsed = topics.parse("sensight/miflora/herbs/availability").unwrap();
        assert!(parsed.is_availability());
    }

    #[test]
    fn test_parse_foreign_topic() {
        let topics = TopicBuilder::new("sensight/miflora");

        assert!(topics.parse("other/miflora/herbs/light").is_none());
        assert!(topics.parse("sensight/miflorafoo/herbs/light").is_none());
        assert!(topics.parse("sensight/miflora/herbs").is_none());
        assert!(topics.parse("sensight/miflora/herbs/a/b").is_none());
    }

    #[test]
    fn test_discovery_topic_trailing_slash() {
        assert_eq!(
            discovery_topic("homeassistant/", "sensor", "AABB", "miflora_herbs_light"),
            "homeassistant/sensor/AABB/miflora_herbs_light/config"
        );
    }

    #[test]
    fn test_validate_segment() {
        assert!(validate_segment("herbs").is_ok());
        assert!(validate_segment("living-room_2").is_ok());
        assert!(validate_segment("").is_err());
        assert!(validate_segment("living room").is_err());
        assert!(validate_segment("a/b").is_err());
        assert!(validate_segment("wild*").is_err());
        assert!(validate_segment("$sys").is_err());
    }
}
