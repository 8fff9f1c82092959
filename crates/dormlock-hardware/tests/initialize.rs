//! Integration tests for pin controller initialization.
//!
//! These run the controller against the simulated platform in every
//! availability scenario and check both the reported result and which
//! platform calls were (and were not) made.

mod common;

use common::*;
use dormlock_core::UnlockPolicy;
use dormlock_hardware::mock::{MockGpio, PlatformCall};
use dormlock_hardware::{
    GpioPin, HardwareError, LockState, PinController, PinMode, PinRole, PinValue,
};

#[test]
fn test_no_controller_fails_without_touching_pins() {
    let (gpio, handle) = MockGpio::without_controller();
    let mut controller = PinController::new(gpio, config(UnlockPolicy::Independent));

    assert!(!controller.initialize());
    assert!(!controller.is_initialized());
    assert!(controller.motion_pin().is_none());

    let calls: Vec<_> = handle.calls().into_iter().map(|c| c.call).collect();
    assert_eq!(calls, vec![PlatformCall::Discover { found: false }]);
    assert!(!handle.touched_pins());
}

#[test]
fn test_no_controller_error_kind() {
    let (gpio, _handle) = MockGpio::without_controller();
    let mut controller = PinController::new(gpio, config(UnlockPolicy::Independent));

    assert_eq!(controller.try_initialize(), Err(HardwareError::NoController));
}

#[test]
fn test_motion_pin_unavailable_never_claims_lock_pin() {
    let (gpio, handle) = MockGpio::builder().unavailable_pin(pin(MOTION_PIN)).build();
    let mut controller = PinController::new(gpio, config(UnlockPolicy::Independent));

    assert!(!controller.initialize());

    assert!(!handle.was_opened(pin(LOCK_PIN)));
    assert!(handle.writes(pin(LOCK_PIN)).is_empty());
    assert_eq!(handle.mode(pin(LOCK_PIN)), None);
    assert_eq!(handle.mode(pin(MOTION_PIN)), None);
    assert!(controller.motion_pin().is_none());
}

#[test]
fn test_motion_pin_unavailable_error_kind() {
    let (gpio, _handle) = MockGpio::builder().unavailable_pin(pin(MOTION_PIN)).build();
    let mut controller = PinController::new(gpio, config(UnlockPolicy::Independent));

    assert_eq!(
        controller.try_initialize(),
        Err(HardwareError::pin_unavailable(pin(MOTION_PIN), PinRole::Motion))
    );
}

#[test]
fn test_lock_pin_unavailable_leaves_controller_unset() {
    let (gpio, handle) = MockGpio::builder().unavailable_pin(pin(LOCK_PIN)).build();
    let mut controller = PinController::new(gpio, config(UnlockPolicy::Independent));

    let err = controller.try_initialize().unwrap_err();
    assert_eq!(
        err,
        HardwareError::pin_unavailable(pin(LOCK_PIN), PinRole::Lock)
    );
    assert!(err.is_absence());

    // The motion pin was configured before the failure, then released.
    assert_eq!(handle.mode(pin(MOTION_PIN)), Some(PinMode::Input));
    assert!(!handle.was_opened(pin(MOTION_PIN)));
    assert!(controller.motion_pin().is_none());
    assert!(controller.lock_state().is_none());
    assert!(handle.writes(pin(LOCK_PIN)).is_empty());
}

#[test]
fn test_mode_fault_is_reported_as_failure() {
    let (gpio, handle) = MockGpio::builder().failing_mode(pin(LOCK_PIN)).build();
    let mut controller = PinController::new(gpio, config(UnlockPolicy::Independent));

    let err = controller.try_initialize().unwrap_err();
    assert!(matches!(err, HardwareError::ModeChangeFailed { .. }));
    assert!(!err.is_absence());
    assert!(handle.writes(pin(LOCK_PIN)).is_empty());
    assert!(!controller.is_initialized());
}

#[test]
fn test_lock_write_fault_fails_initialize() {
    let (gpio, _handle) = MockGpio::builder().failing_writes(pin(LOCK_PIN)).build();
    let mut controller = PinController::new(gpio, config(UnlockPolicy::Independent));

    assert!(!controller.initialize());
    assert!(!controller.is_initialized());
}

#[test]
fn test_initialize_retries_after_transient_fault() {
    let (gpio, handle) = MockGpio::builder().failing_writes(pin(LOCK_PIN)).build();
    let mut controller = PinController::new(gpio, config(UnlockPolicy::Independent));

    assert!(!controller.initialize());
    assert!(!handle.was_opened(pin(MOTION_PIN)));
    assert!(!handle.was_opened(pin(LOCK_PIN)));

    handle.set_write_failure(pin(LOCK_PIN), false);

    assert_eq!(controller.try_initialize(), Ok(()));
    assert!(controller.is_initialized());
    assert_eq!(handle.last_written(pin(LOCK_PIN)), Some(PinValue::High));
    assert_eq!(controller.lock_state(), Some(LockState::Locked));
}

#[test]
fn test_initialize_succeeds_once_pins_are_released() {
    let (gpio, handle) = MockGpio::new();
    let mut holder = PinController::new(gpio.clone(), config(UnlockPolicy::Independent));
    let mut controller = PinController::new(gpio, config(UnlockPolicy::Independent));

    assert!(holder.initialize());
    assert!(!controller.initialize());

    drop(holder);
    assert!(!handle.was_opened(pin(MOTION_PIN)));
    assert!(controller.initialize());
}

#[test]
fn test_missing_high_numbered_pin_fails_initialize() {
    let (gpio, handle) = MockGpio::builder().pin_count(28).build();
    let config = config(UnlockPolicy::Independent).with_lock_pin(pin(100));
    let mut controller = PinController::new(gpio, config);

    assert!(!controller.initialize());
    assert_eq!(
        controller.try_initialize(),
        Err(HardwareError::pin_unavailable(pin(100), PinRole::Lock))
    );
    assert!(handle.writes(pin(100)).is_empty());
    assert!(!handle.was_opened(pin(MOTION_PIN)));
}

#[test]
fn test_high_numbered_pins_initialize() {
    let (gpio, handle) = MockGpio::new();
    let config = config(UnlockPolicy::Independent)
        .with_motion_pin(pin(496))
        .with_lock_pin(pin(497));
    let mut controller = PinController::new(gpio, config);

    assert!(controller.initialize());
    assert_eq!(handle.last_written(pin(497)), Some(PinValue::High));
    assert_eq!(controller.motion_pin().unwrap().id(), pin(496));
}

#[test]
fn test_successful_initialize_locks_door() {
    let (controller, handle) = initialized(UnlockPolicy::Independent);

    assert!(controller.is_initialized());
    assert_eq!(handle.mode(pin(MOTION_PIN)), Some(PinMode::Input));
    assert_eq!(handle.mode(pin(LOCK_PIN)), Some(PinMode::Output));
    assert_eq!(handle.last_written(pin(LOCK_PIN)), Some(PinValue::High));
    assert_eq!(controller.lock_state(), Some(LockState::Locked));
    assert_eq!(controller.pending_relocks(), 0);
}

#[test]
fn test_initialize_call_order() {
    let (_controller, handle) = initialized(UnlockPolicy::Independent);

    let calls: Vec<_> = handle.calls().into_iter().map(|c| c.call).collect();
    assert_eq!(
        calls,
        vec![
            PlatformCall::Discover { found: true },
            PlatformCall::Open {
                pin: pin(MOTION_PIN),
                granted: true
            },
            PlatformCall::SetMode {
                pin: pin(MOTION_PIN),
                mode: PinMode::Input,
                ok: true
            },
            PlatformCall::Open {
                pin: pin(LOCK_PIN),
                granted: true
            },
            PlatformCall::SetMode {
                pin: pin(LOCK_PIN),
                mode: PinMode::Output,
                ok: true
            },
            PlatformCall::Write {
                pin: pin(LOCK_PIN),
                value: PinValue::High,
                ok: true
            },
        ]
    );
}

#[test]
fn test_motion_pin_matches_configured_pin() {
    let (controller, handle) = initialized(UnlockPolicy::Independent);

    let motion = controller.motion_pin().expect("motion pin after initialize");
    let opened = handle
        .opened_pin(pin(MOTION_PIN))
        .expect("mock handed out the motion pin");

    assert_eq!(motion, &opened);
    assert_eq!(motion.id(), pin(MOTION_PIN));
    assert_ne!(handle.opened_pin(pin(LOCK_PIN)).as_ref(), Some(motion));
}

#[test]
fn test_motion_pin_delivers_sensor_edges() {
    let (controller, handle) = initialized(UnlockPolicy::Independent);
    let mut events = controller.subscribe_motion().unwrap();

    handle.set_input(pin(MOTION_PIN), PinValue::High);

    let edge = events.try_recv().expect("rising edge");
    assert_eq!(edge.pin, pin(MOTION_PIN));
    assert!(edge.is_rising());
    assert_eq!(
        controller.motion_pin().unwrap().read().unwrap(),
        PinValue::High
    );
}

#[test]
fn test_motion_pin_read_fault_is_reported() {
    let (gpio, _handle) = MockGpio::builder().failing_reads(pin(MOTION_PIN)).build();
    let mut controller = PinController::new(gpio, config(UnlockPolicy::Independent));
    assert!(controller.initialize());

    let err = controller.motion_pin().unwrap().read().unwrap_err();
    assert!(matches!(err, HardwareError::ReadFailed { .. }));
    assert!(!err.is_absence());
}

#[test]
fn test_motion_pin_unset_before_initialize() {
    let (gpio, _handle) = MockGpio::new();
    let controller = PinController::new(gpio, config(UnlockPolicy::Independent));
    assert!(controller.motion_pin().is_none());
}

#[test]
fn test_pins_claimed_by_another_owner() {
    let (gpio, _handle) = MockGpio::new();
    let mut first = PinController::new(gpio.clone(), config(UnlockPolicy::Independent));
    let mut second = PinController::new(gpio, config(UnlockPolicy::Independent));

    assert!(first.initialize());
    assert_eq!(
        second.try_initialize(),
        Err(HardwareError::pin_unavailable(pin(MOTION_PIN), PinRole::Motion))
    );
}
