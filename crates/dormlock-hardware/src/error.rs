//! Error types for GPIO operations.
//!
//! The absence cases (`NoController`, `PinUnavailable`) are expected on
//! machines without usable GPIO and are reported through
//! [`PinController::initialize`](crate::PinController::initialize) as a plain
//! `false`. The remaining variants describe platform faults.

use crate::types::PinRole;
use dormlock_core::PinId;

/// Result type alias for hardware operations.
pub type Result<T> = std::result::Result<T, HardwareError>;

/// Errors that can occur while driving the GPIO subsystem.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HardwareError {
    /// The platform exposes no GPIO controller.
    #[error("No GPIO controller available")]
    NoController,

    /// A pin could not be opened (invalid identifier or already claimed).
    #[error("{role} pin {pin} unavailable")]
    PinUnavailable { pin: PinId, role: PinRole },

    /// Switching a pin between input and output failed.
    #[error("Failed to set mode of pin {pin}: {message}")]
    ModeChangeFailed { pin: PinId, message: String },

    /// Driving an output pin failed.
    #[error("Failed to write pin {pin}: {message}")]
    WriteFailed { pin: PinId, message: String },

    /// Sampling an input pin failed.
    #[error("Failed to read pin {pin}: {message}")]
    ReadFailed { pin: PinId, message: String },

    /// The operation needs a successfully initialized controller.
    #[error("Pin controller is not initialized")]
    NotInitialized,

    /// The lock configuration was rejected.
    #[error("Invalid configuration: {0}")]
    Config(#[from] dormlock_core::Error),
}

impl HardwareError {
    /// Create a new pin unavailable error.
    pub fn pin_unavailable(pin: PinId, role: PinRole) -> Self {
        Self::PinUnavailable { pin, role }
    }

    /// Create a new mode change error.
    pub fn mode_change(pin: PinId, message: impl Into<String>) -> Self {
        Self::ModeChangeFailed {
            pin,
            message: message.into(),
        }
    }

    /// Create a new write error.
    pub fn write_failed(pin: PinId, message: impl Into<String>) -> Self {
        Self::WriteFailed {
            pin,
            message: message.into(),
        }
    }

    /// Create a new read error.
    pub fn read_failed(pin: PinId, message: impl Into<String>) -> Self {
        Self::ReadFailed {
            pin,
            message: message.into(),
        }
    }

    /// Whether this error means "the hardware is not there" rather than
    /// "the hardware misbehaved".
    pub fn is_absence(&self) -> bool {
        matches!(self, Self::NoController | Self::PinUnavailable { .. })
    }
}
