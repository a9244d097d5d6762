//! Registered devices.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, TryLockError};

use crate::driver::SensorDriver;

/// Driver handle shared between the orchestrator and an in-flight poll.
pub type SharedDriver = Arc<Mutex<Box<dyn SensorDriver>>>;

/// A sensor registered with the worker.
///
/// Identity is fixed at registration; the driver handle is only touched by
/// one poll at a time.
pub struct Device {
    name: String,
    address: String,
    driver: SharedDriver,
}

impl Device {
    /// Register a device with its driver backend.
    pub fn new(
        name: impl Into<String>,
        address: impl Into<String>,
        driver: Box<dyn SensorDriver>,
    ) -> Self {
        Self {
            name: name.into(),
            address: address.into(),
            driver: Arc::new(Mutex::new(driver)),
        }
    }

    /// Unique device name, used in topics.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Physical (Bluetooth MAC) address.
    pub fn address(&self) -> &str {
        &self.address
    }

    /// Clone the shared driver handle for a poll.
    pub fn driver(&self) -> SharedDriver {
        Arc::clone(&self.driver)
    }
}

impl std::fmt::Debug for Device {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Device")
            .field("name", &self.name)
            .field("address", &self.address)
            .finish_non_exhaustive()
    }
}

/// Whether a read is still holding the driver.
pub(crate) fn is_busy(driver: &SharedDriver) -> bool {
    matches!(driver.try_lock(), Err(TryLockError::WouldBlock))
}

/// Lock a driver, recovering it if a previous poll panicked while holding it.
pub(crate) fn lock_driver(driver: &SharedDriver) -> MutexGuard<'_, Box<dyn SensorDriver>> {
    driver.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::ScriptedDriver;

    #[test]
    fn test_busy_while_locked() {
        let device = Device::new("herbs", "AA:BB", Box::new(ScriptedDriver::new("AA:BB")));
        let driver = device.driver();
        assert!(!is_busy(&driver));

        let guard = lock_driver(&driver);
        assert!(is_busy(&device.driver()));
        drop(guard);

        assert!(!is_busy(&driver));
    }
}
