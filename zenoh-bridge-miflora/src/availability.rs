//! Consecutive-failure tracking per device.

use std::collections::HashMap;

/// Availability derived from the failure count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AvailabilityStatus {
    Available,
    Unavailable,
}

/// Failure counter of one device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AvailabilityState {
    fail_count: u32,
    max_fail_count: u32,
}

impl AvailabilityState {
    pub fn new(max_fail_count: u32) -> Self {
        Self {
            fail_count: 0,
            max_fail_count,
        }
    }

    pub fn fail_count(&self) -> u32 {
        self.fail_count
    }

    pub fn max_fail_count(&self) -> u32 {
        self.max_fail_count
    }

    pub fn status(&self) -> AvailabilityStatus {
        if self.fail_count > self.max_fail_count {
            AvailabilityStatus::Unavailable
        } else {
            AvailabilityStatus::Available
        }
    }

    pub fn is_available(&self) -> bool {
        self.status() == AvailabilityStatus::Available
    }

    /// Reset after a successful poll.
    pub fn record_success(&mut self) {
        self.fail_count = 0;
    }

    /// Count a failed poll.
    ///
    /// Returns `true` only when this failure moved the device from
    /// available to unavailable.
    pub fn record_failure(&mut self) -> bool {
        let was_available = self.is_available();
        self.fail_count = self.fail_count.saturating_add(1);
        was_available && !self.is_available()
    }
}

/// Availability state of every registered device, keyed by device name.
#[derive(Debug, Clone)]
pub struct AvailabilityTracker {
    max_fail_count: u32,
    states: HashMap<String, AvailabilityState>,
}

impl AvailabilityTracker {
    pub fn new(max_fail_count: u32) -> Self {
        Self {
            max_fail_count,
            states: HashMap::new(),
        }
    }

    /// Start tracking a device; an already-registered device keeps its state.
    pub fn register(&mut self, device: &str) {
        let max = self.max_fail_count;
        self.states
            .entry(device.to_string())
            .or_insert_with(|| AvailabilityState::new(max));
    }

    pub fn get(&self, device: &str) -> Option<&AvailabilityState> {
        self.states.get(device)
    }

    pub fn fail_count(&self, device: &str) -> u32 {
        self.get(device).map(AvailabilityState::fail_count).unwrap_or(0)
    }

    pub fn record_success(&mut self, device: &str) {
        self.state_mut(device).record_success();
    }

    /// Count a failure; `true` when the device just went offline.
    pub fn record_failure(&mut self, device: &str) -> bool {
        self.state_mut(device).record_failure()
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    fn state_mut(&mut self, device: &str) -> &mut AvailabilityState {
        let max = self.max_fail_count;
        self.states
            .entry(device.to_string())
            .or_insert_with(|| AvailabilityState::new(max))
    }
}
