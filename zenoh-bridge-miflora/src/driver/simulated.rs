//! Simulated MiFlora backend.
//!
//! Readings follow a bounded random walk seeded from the device address, so
//! each simulated plant behaves consistently across restarts.

use std::hash::{DefaultHasher, Hash, Hasher};
use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use sensight_common::Value;

use super::{DriverError, SensorDriver};
use crate::catalog::Attribute;

#[derive(Debug, Clone, Copy, PartialEq)]
struct Snapshot {
    temperature: f64,
    moisture: i64,
    light: i64,
    conductivity: i64,
    battery: i64,
}

impl Snapshot {
    fn value(&self, attribute: Attribute) -> Value {
        match attribute {
            Attribute::Temperature => Value::Float(self.temperature),
            Attribute::Moisture => Value::Integer(self.moisture),
            Attribute::Light => Value::Integer(self.light),
            Attribute::Conductivity => Value::Integer(self.conductivity),
            Attribute::Battery => Value::Integer(self.battery),
        }
    }
}

/// Backend producing plausible plant-sensor readings.
#[derive(Debug)]
pub struct SimulatedDriver {
    address: String,
    rng: StdRng,
    latency: Duration,
    failure_rate: f64,
    state: Snapshot,
    cached: Option<Snapshot>,
}

impl SimulatedDriver {
    pub fn new(address: impl Into<String>) -> Self {
        let address = address.into();
        let mut hasher = DefaultHasher::new();
        address.hash(&mut hasher);
        let mut rng = StdRng::seed_from_u64(hasher.finish());

        let state = Snapshot {
            temperature: rng.random_range(16.0..26.0),
            moisture: rng.random_range(20..60),
            light: rng.random_range(200..5000),
            conductivity: rng.random_range(150..1200),
            battery: rng.random_range(60..=100),
        };

        Self {
            address,
            rng,
            latency: Duration::ZERO,
            failure_rate: 0.0,
            state,
            cached: None,
        }
    }

    /// Sleep this long on every device access.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Probability that a poll fails with [`DriverError::Unreachable`].
    pub fn with_failure_rate(mut self, rate: f64) -> Self {
        self.failure_rate = rate.clamp(0.0, 1.0);
        self
    }

    fn step(&mut self) -> Snapshot {
        let rng = &mut self.rng;
        let s = &mut self.state;

        s.temperature = round1((s.temperature + rng.random_range(-0.5..0.5)).clamp(5.0, 40.0));
        s.moisture = (s.moisture + rng.random_range(-2..=2)).clamp(0, 100);
        s.light = (s.light + rng.random_range(-250..=250)).clamp(0, 100_000);
        s.conductivity = (s.conductivity + rng.random_range(-20..=20)).clamp(0, 6000);
        if rng.random_bool(0.02) {
            s.battery = (s.battery - 1).max(0);
        }

        *s
    }

    fn fetch(&mut self) -> Result<Snapshot, DriverError> {
        if !self.latency.is_zero() {
            std::thread::sleep(self.latency);
        }

        if self.failure_rate > 0.0 && self.rng.random_bool(self.failure_rate) {
            return Err(DriverError::Unreachable {
                address: self.address.clone(),
                message: "no advertisement received".to_string(),
            });
        }

        Ok(self.step())
    }
}

impl SensorDriver for SimulatedDriver {
    fn clear_cache(&mut self) {
        self.cached = None;
    }

    fn read_attribute(&mut self, attribute: Attribute) -> Result<Value, DriverError> {
        let snapshot = match self.cached {
            Some(snapshot) => snapshot,
            None => {
                let snapshot = self.fetch()?;
                self.cached = Some(snapshot);
                snapshot
            }
        };

        Ok(snapshot.value(attribute))
    }
}

fn round1(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}
