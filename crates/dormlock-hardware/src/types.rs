//! Value types shared by the GPIO traits, the simulated platform and the
//! pin controller.

use chrono::{DateTime, Utc};
use dormlock_core::PinId;
use serde::{Deserialize, Serialize};
use std::fmt;
use tokio::sync::broadcast::{
    self,
    error::{RecvError, TryRecvError},
};

/// Direction of a GPIO pin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PinMode {
    Input,
    Output,
}

/// Electrical level of a GPIO pin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PinValue {
    Low,
    High,
}

impl PinValue {
    pub fn is_high(&self) -> bool {
        matches!(self, Self::High)
    }
}

/// Logical state of the door lock.
///
/// The lock relay is active-low: the door is held locked while the pin is
/// high, so a pin that was never driven low can never leave the door open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LockState {
    Locked,
    Unlocked,
}

impl LockState {
    /// Level the lock pin must be driven to for this state.
    pub fn pin_value(&self) -> PinValue {
        match self {
            Self::Locked => PinValue::High,
            Self::Unlocked => PinValue::Low,
        }
    }

    /// Lock state implied by a level observed on the lock pin.
    pub fn from_pin_value(value: PinValue) -> Self {
        match value {
            PinValue::High => Self::Locked,
            PinValue::Low => Self::Unlocked,
        }
    }
}

impl fmt::Display for LockState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Locked => write!(f, "Locked"),
            Self::Unlocked => write!(f, "Unlocked"),
        }
    }
}

/// What a pin is used for by the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PinRole {
    /// PIR motion sensor input.
    Motion,

    /// Door lock relay output.
    Lock,
}

impl fmt::Display for PinRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Motion => write!(f, "Motion"),
            Self::Lock => write!(f, "Lock"),
        }
    }
}

/// A level change observed on an input pin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PinEdge {
    /// Pin that changed.
    pub pin: PinId,

    /// Level after the change.
    pub value: PinValue,

    /// Wall-clock time the change was detected.
    pub detected_at: DateTime<Utc>,
}

impl PinEdge {
    pub fn new(pin: PinId, value: PinValue) -> Self {
        Self {
            pin,
            value,
            detected_at: Utc::now(),
        }
    }

    /// Rising edge: for a PIR sensor this is the start of a motion event.
    pub fn is_rising(&self) -> bool {
        self.value.is_high()
    }
}

/// Subscription to the edges of one input pin.
///
/// Obtained from [`GpioPin::subscribe`](crate::traits::GpioPin::subscribe).
/// Subscribers that fall behind lose the oldest edges instead of stalling the
/// pin's event source.
#[derive(Debug)]
pub struct PinEvents {
    rx: broadcast::Receiver<PinEdge>,
}

impl PinEvents {
    pub fn new(rx: broadcast::Receiver<PinEdge>) -> Self {
        Self { rx }
    }

    /// Wait for the next edge.
    ///
    /// Returns `None` once the pin's event source is gone.
    pub async fn recv(&mut self) -> Option<PinEdge> {
        loop {
            match self.rx.recv().await {
                Ok(edge) => return Some(edge),
                Err(RecvError::Lagged(skipped)) => {
                    tracing::debug!(skipped, "pin event subscriber lagged");
                }
                Err(RecvError::Closed) => return None,
            }
        }
    }

    /// Take the next edge if one is already queued.
    pub fn try_recv(&mut self) -> Option<PinEdge> {
        loop {
            match self.rx.try_recv() {
                Ok(edge) => return Some(edge),
                Err(TryRecvError::Lagged(skipped)) => {
                    tracing::debug!(skipped, "pin event subscriber lagged");
                }
                Err(TryRecvError::Empty | TryRecvError::Closed) => return None,
            }
        }
    }
}
