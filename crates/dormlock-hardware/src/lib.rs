//! GPIO access for the dormlock motion-sensing door controller.
//!
//! The device watches a PIR motion sensor and drives an electric door lock.
//! This crate owns the hardware side of that: acquiring the GPIO controller,
//! configuring the sensor input and the lock output, and running time-bounded
//! unlock windows that always end with the door locked again.
//!
//! # Design
//!
//! - **Capability traits**: the platform is reached only through
//!   [`GpioPlatform`], [`GpioController`] and [`GpioPin`], so the controller
//!   runs unchanged against real hardware or the simulated platform in
//!   [`mock`].
//! - **Fail-safe**: a successful initialization leaves the lock pin high
//!   (locked) before anything else runs, and dropping the controller locks
//!   the door.
//! - **Non-blocking unlock**: [`PinController::unlock_door`] returns at once;
//!   the re-lock runs on a tokio timer and never delays motion events.
//! - **Absence is not a fault**: a device without GPIO makes
//!   [`PinController::initialize`] return `false`, nothing more.
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//! use dormlock_core::LockConfig;
//! use dormlock_hardware::{LockState, PinController, PinValue};
//! use dormlock_hardware::mock::MockGpio;
//!
//! #[tokio::main(flavor = "current_thread", start_paused = true)]
//! async fn main() {
//!     let (gpio, handle) = MockGpio::new();
//!     let config = LockConfig::default().with_unlock_duration(Duration::from_secs(5));
//!     let lock_pin = config.lock_pin;
//!
//!     let mut controller = PinController::new(gpio, config);
//!     assert!(controller.initialize());
//!     assert_eq!(handle.last_written(lock_pin), Some(PinValue::High));
//!
//!     controller.unlock_door();
//!     assert_eq!(controller.lock_state(), Some(LockState::Unlocked));
//!
//!     tokio::time::sleep(Duration::from_secs(6)).await;
//!     assert_eq!(controller.lock_state(), Some(LockState::Locked));
//! }
//! ```
//!
//! # Error Handling
//!
//! Fallible operations return [`Result<T>`][error::Result] with
//! [`HardwareError`]. [`PinController::initialize`] collapses every failure
//! into `false`; [`PinController::try_initialize`] reports which step failed.

pub mod controller;
pub mod error;
pub mod mock;
pub mod traits;
pub mod types;

// Re-export commonly used types for convenience
pub use controller::{PinController, PlatformPin};
pub use error::{HardwareError, Result};
pub use traits::{GpioController, GpioPin, GpioPlatform};
pub use types::{LockState, PinEdge, PinEvents, PinMode, PinRole, PinValue};
