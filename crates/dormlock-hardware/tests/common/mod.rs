//! Shared helpers for the pin controller integration tests.

#![allow(dead_code)]

use dormlock_core::{LockConfig, PinId, UnlockPolicy};
use dormlock_hardware::PinController;
use dormlock_hardware::mock::{MockGpio, MockGpioHandle};
use std::time::Duration;

pub const MOTION_PIN: u32 = 5;
pub const LOCK_PIN: u32 = 4;

pub fn pin(id: u32) -> PinId {
    PinId::new(id)
}

/// Configuration used throughout the tests: a 5 second unlock window.
pub fn config(policy: UnlockPolicy) -> LockConfig {
    LockConfig::default()
        .with_motion_pin(pin(MOTION_PIN))
        .with_lock_pin(pin(LOCK_PIN))
        .with_unlock_duration(Duration::from_secs(5))
        .with_unlock_policy(policy)
}

/// An initialized controller on a fully available simulated platform.
pub fn initialized(policy: UnlockPolicy) -> (PinController<MockGpio>, MockGpioHandle) {
    let (gpio, handle) = MockGpio::new();
    let mut controller = PinController::new(gpio, config(policy));
    assert!(controller.initialize(), "simulated platform should initialize");
    (controller, handle)
}

pub fn secs(s: u64) -> Duration {
    Duration::from_secs(s)
}
