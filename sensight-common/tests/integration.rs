//! Integration tests for sensight-common library.

use sensight_common::{
    Availability, DiscoveryDevice, DiscoveryMessage, Message, SensorDiscovery, TopicBuilder,
    Value, discovery_topic, parse_config,
};

#[test]
fn test_reading_topic_round_trip() {
    let topics = TopicBuilder::new("sensight/miflora");

    let msg = Message::reading(topics.reading("ficus", "conductivity"), 350i64);
    let parsed = topics.parse(&msg.topic).expect("topic should parse");

    assert_eq!(parsed.device, "ficus");
    assert_eq!(parsed.attribute, "conductivity");
    assert_eq!(msg.payload.to_payload(), b"350".to_vec());
}

#[test]
fn test_availability_topic_matches_discovery() {
    let topics = TopicBuilder::new("sensight/miflora");
    let msg = Message::availability(topics.availability("ficus"), Availability::Online);

    let descriptor = SensorDiscovery {
        unique_id: "sensight/AABB/miflora_ficus_battery".to_string(),
        state_topic: topics.reading("ficus", "battery"),
        availability_topic: topics.availability("ficus"),
        name: "miflora_ficus_battery".to_string(),
        device: DiscoveryDevice {
            identifiers: vec!["AA:BB".to_string()],
            manufacturer: "Xiaomi".to_string(),
            model: "MiFlora".to_string(),
            name: "miflora_ficus".to_string(),
        },
        unit_of_measurement: Some("%".to_string()),
        icon: None,
        device_class: Some("battery".to_string()),
    };

    assert_eq!(msg.topic, descriptor.availability_topic);
    assert_eq!(msg.availability_state(), Some(Availability::Online));

    let announcement = DiscoveryMessage {
        topic: discovery_topic("homeassistant", "sensor", "AABB", "miflora_ficus_battery"),
        descriptor,
    };
    let json: serde_json::Value =
        serde_json::from_slice(&announcement.to_payload().unwrap()).unwrap();

    assert_eq!(json["availability_topic"], "sensight/miflora/ficus/availability");
    assert_eq!(json["device_class"], "battery");
    assert!(json.get("icon").is_none());
}

#[test]
fn test_value_kinds_render_as_text() {
    let cases = [
        (Value::Float(21.4), "21.4"),
        (Value::Integer(-3), "-3"),
        (Value::Text("offline".to_string()), "offline"),
    ];

    for (value, expected) in cases {
        assert_eq!(String::from_utf8(value.to_payload()).unwrap(), expected);
    }
}

#[test]
fn test_parse_config_error_is_reported() {
    #[derive(Debug, serde::Deserialize)]
    struct Empty {}

    let result: sensight_common::Result<Empty> = parse_config("{ not json5");
    assert!(result.is_err());
}
