//! Scriptable driver for tests.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use sensight_common::Value;

use super::{DriverError, SensorDriver};
use crate::catalog::Attribute;

/// Outcome of one scripted poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollStep {
    /// Every attribute reads successfully.
    Succeed,
    /// The device is unreachable.
    Fail,
    /// The read blocks for the given duration, then succeeds.
    Hang(Duration),
}

/// Driver whose polls follow a script.
///
/// Each `clear_cache` starts a new poll and consumes the next step; once the
/// script is exhausted every poll succeeds. Clones share the same script, so
/// a test can keep a handle after the driver has been boxed.
#[derive(Debug, Clone)]
pub struct ScriptedDriver {
    address: String,
    steps: Arc<Mutex<VecDeque<PollStep>>>,
    current: Option<PollStep>,
    polls: Arc<Mutex<usize>>,
}

impl ScriptedDriver {
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            steps: Arc::new(Mutex::new(VecDeque::new())),
            current: None,
            polls: Arc::new(Mutex::new(0)),
        }
    }

    /// Driver running the given steps in order.
    pub fn with_steps(address: impl Into<String>, steps: impl IntoIterator<Item = PollStep>) -> Self {
        let driver = Self::new(address);
        for step in steps {
            driver.push(step);
        }
        driver
    }

    /// Append a step to the script.
    pub fn push(&self, step: PollStep) {
        self.steps
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(step);
    }

    /// Number of polls started so far.
    pub fn polls(&self) -> usize {
        *self.polls.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Fixed reading returned for an attribute.
    pub fn reading(attribute: Attribute) -> Value {
        match attribute {
            Attribute::Temperature => Value::Float(21.5),
            Attribute::Moisture => Value::Integer(42),
            Attribute::Light => Value::Integer(1200),
            Attribute::Conductivity => Value::Integer(350),
            Attribute::Battery => Value::Integer(98),
        }
    }

    fn next_step(&self) -> PollStep {
        self.steps
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front()
            .unwrap_or(PollStep::Succeed)
    }
}

impl SensorDriver for ScriptedDriver {
    fn clear_cache(&mut self) {
        *self.polls.lock().unwrap_or_else(PoisonError::into_inner) += 1;
        self.current = Some(self.next_step());
    }

    fn read_attribute(&mut self, attribute: Attribute) -> Result<Value, DriverError> {
        let step = self.current.take().unwrap_or(PollStep::Succeed);

        match step {
            PollStep::Fail => {
                self.current = Some(PollStep::Fail);
                Err(DriverError::Unreachable {
                    address: self.address.clone(),
                    message: "scripted failure".to_string(),
                })
            }
            PollStep::Hang(duration) => {
                std::thread::sleep(duration);
                Ok(Self::reading(attribute))
            }
            PollStep::Succeed => Ok(Self::reading(attribute)),
        }
    }
}
