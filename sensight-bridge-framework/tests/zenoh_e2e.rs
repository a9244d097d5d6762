//! End-to-end tests with Zenoh pub/sub.
//!
//! These tests verify that worker output can be published and received
//! through a live Zenoh session.
//!
//! Note: Zenoh requires multi-thread tokio runtime.
//! Each test uses a unique key prefix to avoid interference.

use std::sync::Arc;
use std::time::Duration;

use futures::StreamExt;
use futures::stream::BoxStream;
use sensight_bridge_framework::worker::{announce, publish_cycle};
use sensight_bridge_framework::{Availability, DiscoveryMessage, Message, Publisher, Worker};
use sensight_common::{DiscoveryDevice, SensorDiscovery, TopicBuilder};

/// Generate a unique test prefix to avoid test interference.
fn unique_prefix() -> String {
    use std::time::{SystemTime, UNIX_EPOCH};
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    format!("test_{}", nanos)
}

async fn open_session() -> Arc<zenoh::Session> {
    Arc::new(
        zenoh::open(zenoh::Config::default())
            .await
            .expect("Failed to open Zenoh session"),
    )
}

type SampleSubscriber =
    zenoh::pubsub::Subscriber<zenoh::handlers::FifoChannelHandler<zenoh::sample::Sample>>;

async fn recv_text(subscriber: &SampleSubscriber) -> (String, String) {
    let sample = tokio::time::timeout(Duration::from_secs(5), subscriber.recv_async())
        .await
        .expect("Timeout waiting for message")
        .expect("Failed to receive message");

    let payload = String::from_utf8(sample.payload().to_bytes().to_vec()).expect("utf8 payload");
    (sample.key_expr().to_string(), payload)
}

/// A volatile and a retained message both reach a live subscriber.
#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_publish_messages() {
    let prefix = unique_prefix();
    let session = open_session().await;
    let topics = TopicBuilder::new(&prefix);

    let subscriber = session
        .declare_subscriber(format!("{}/**", prefix))
        .await
        .expect("Failed to create subscriber");
    tokio::time::sleep(Duration::from_millis(100)).await;

    let publisher = Publisher::new(session.clone(), &prefix);

    let volatile = Message::new(topics.reading("herbs", "temperature"), 21.5, false);
    publisher.publish(&volatile).await.expect("volatile publish");
    let (key, payload) = recv_text(&subscriber).await;
    assert_eq!(key, format!("{}/herbs/temperature", prefix));
    assert_eq!(payload, "21.5");

    let retained = Message::availability(topics.availability("herbs"), Availability::Online);
    publisher.publish(&retained).await.expect("retained publish");
    let (key, payload) = recv_text(&subscriber).await;
    assert_eq!(key, format!("{}/herbs/availability", prefix));
    assert_eq!(payload, "online");
    assert_eq!(publisher.retained_key_count().await, 1);

    drop(subscriber);
    drop(publisher);
    session.close().await.expect("Failed to close session");
}

struct FixedWorker {
    topics: TopicBuilder,
    discovery_prefix: String,
}

impl Worker for FixedWorker {
    fn name(&self) -> &str {
        "fixed"
    }

    fn device_count(&self) -> usize {
        1
    }

    fn discovery(&self) -> Vec<DiscoveryMessage> {
        vec![DiscoveryMessage {
            topic: format!("{}/sensor/AABB/fixed_herbs_battery/config", self.discovery_prefix),
            descriptor: SensorDiscovery {
                unique_id: "sensight/AABB/fixed_herbs_battery".to_string(),
                state_topic: self.topics.reading("herbs", "battery"),
                availability_topic: self.topics.availability("herbs"),
                name: "fixed_herbs_battery".to_string(),
                device: DiscoveryDevice {
                    identifiers: vec!["AA:BB".to_string()],
                    manufacturer: "Xiaomi".to_string(),
                    model: "MiFlora".to_string(),
                    name: "fixed_herbs".to_string(),
                },
                unit_of_measurement: Some("%".to_string()),
                icon: None,
                device_class: Some("battery".to_string()),
            },
        }]
    }

    fn run_cycle(&mut self) -> BoxStream<'_, Message> {
        futures::stream::iter(vec![
            Message::reading(self.topics.reading("herbs", "battery"), 97i64),
            Message::availability(self.topics.availability("herbs"), Availability::Online),
        ])
        .boxed()
    }
}

/// Discovery and one cycle of a worker arrive in order.
#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_worker_cycle_over_zenoh() {
    let prefix = unique_prefix();
    let session = open_session().await;

    let subscriber = session
        .declare_subscriber(format!("{}/**", prefix))
        .await
        .expect("Failed to create subscriber");
    tokio::time::sleep(Duration::from_millis(100)).await;

    let publisher = Publisher::new(session.clone(), format!("{}/miflora", prefix));
    let mut worker = FixedWorker {
        topics: TopicBuilder::new(format!("{}/miflora", prefix)),
        discovery_prefix: format!("{}/homeassistant", prefix),
    };

    let stats = announce(&worker, &publisher).await;
    assert_eq!(stats.success, 1);
    let (key, payload) = recv_text(&subscriber).await;
    assert!(key.ends_with("/config"));
    let json: serde_json::Value = serde_json::from_str(&payload).unwrap();
    assert_eq!(json["device_class"], "battery");

    let stats = publish_cycle(&mut worker, &publisher).await;
    assert_eq!(stats.success, 2);
    assert_eq!(stats.failed, 0);

    let (_, battery) = recv_text(&subscriber).await;
    let (_, availability) = recv_text(&subscriber).await;
    assert_eq!(battery, "97");
    assert_eq!(availability, "online");

    drop(subscriber);
    drop(publisher);
    session.close().await.expect("Failed to close session");
}
