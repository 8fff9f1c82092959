//! GPIO capability traits.
//!
//! The pin controller only needs four things from a platform: find the GPIO
//! controller, open a pin by number, switch a pin's direction and drive an
//! output. These traits capture exactly that, plus edge subscription so the
//! application can listen to the motion sensor.
//!
//! Every operation is synchronous. Pin I/O on the supported platforms is a
//! register or character-device write that completes immediately, and the
//! only waiting the controller does (the unlock window) happens on a tokio
//! timer, not inside these calls.
//!
//! # Implementing a platform
//!
//! ```
//! use dormlock_core::PinId;
//! use dormlock_hardware::traits::{GpioController, GpioPlatform};
//! use dormlock_hardware::mock::{MockController, MockGpio};
//!
//! /// A board that only exposes GPIO when a HAT is attached.
//! struct HatBoard {
//!     hat_present: bool,
//!     gpio: MockGpio,
//! }
//!
//! impl GpioPlatform for HatBoard {
//!     type Controller = MockController;
//!
//!     fn discover_controller(&self) -> Option<MockController> {
//!         if self.hat_present {
//!             self.gpio.discover_controller()
//!         } else {
//!             None
//!         }
//!     }
//! }
//!
//! let (gpio, _handle) = MockGpio::new();
//! let board = HatBoard { hat_present: false, gpio };
//! assert!(board.discover_controller().is_none());
//! ```

use crate::error::Result;
use crate::types::{PinEvents, PinMode, PinValue};
use dormlock_core::PinId;

/// Entry point into a platform's GPIO subsystem.
pub trait GpioPlatform: Send + Sync {
    /// Controller handle produced by discovery.
    type Controller: GpioController;

    /// Locate the platform's GPIO controller.
    ///
    /// Returns `None` when the device has no usable GPIO. That is a capability
    /// gap, not a fault, so it is not reported as an error.
    fn discover_controller(&self) -> Option<Self::Controller>;
}

/// An acquired GPIO controller.
pub trait GpioController: Send + Sync {
    /// Pin handle type produced by this controller.
    type Pin: GpioPin;

    /// Open (claim) a pin by identifier.
    ///
    /// Returns `None` if the identifier does not exist on this controller or
    /// the pin is already claimed.
    fn open_pin(&self, id: PinId) -> Option<Self::Pin>;
}

/// An opened GPIO pin.
///
/// Methods take `&self` so a pin can be shared between the controller and the
/// tasks that drive it; implementations provide their own synchronization.
pub trait GpioPin: Send + Sync + 'static {
    /// Identifier this pin was opened with.
    fn id(&self) -> PinId;

    /// Switch the pin between input and output.
    ///
    /// # Errors
    ///
    /// Returns `HardwareError::ModeChangeFailed` if the platform rejects the
    /// mode change.
    fn set_mode(&self, mode: PinMode) -> Result<()>;

    /// Drive an output pin.
    ///
    /// # Errors
    ///
    /// Returns `HardwareError::WriteFailed` if the pin is not an output or the
    /// platform reports a fault.
    fn write(&self, value: PinValue) -> Result<()>;

    /// Sample the current level of the pin.
    ///
    /// # Errors
    ///
    /// Returns `HardwareError::ReadFailed` if the platform reports a fault.
    fn read(&self) -> Result<PinValue>;

    /// Subscribe to level changes on this pin.
    ///
    /// Edges are delivered independently of anything else the controller is
    /// doing, including a pending unlock window.
    fn subscribe(&self) -> PinEvents;
}
