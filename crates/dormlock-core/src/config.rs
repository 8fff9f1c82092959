//! Lock configuration supplied by the embedding application.
//!
//! The door controller never reads files or the environment itself. The
//! application builds a [`LockConfig`] (or deserializes one from whatever
//! format it uses) and hands it over.
//!
//! ```
//! use std::time::Duration;
//! use dormlock_core::{LockConfig, PinId, UnlockPolicy};
//!
//! # fn main() -> dormlock_core::Result<()> {
//! let config = LockConfig::default()
//!     .with_motion_pin(PinId::new(17))
//!     .with_lock_pin(PinId::new(27))
//!     .with_unlock_duration(Duration::from_secs(5))
//!     .with_unlock_policy(UnlockPolicy::Extend);
//!
//! config.validate()?;
//! # Ok(())
//! # }
//! ```

use crate::{
    Result,
    constants::{
        DEFAULT_LOCK_PIN, DEFAULT_MOTION_PIN, DEFAULT_UNLOCK_DURATION_SECS,
        MAX_UNLOCK_DURATION_SECS,
    },
    error::Error,
    types::PinId,
};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// What happens when an unlock is requested while the door is already open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnlockPolicy {
    /// Every request runs its own re-lock timer.
    ///
    /// Overlapping requests each write `Unlocked` and each write `Locked`
    /// when their own window elapses, so the earliest timer closes the door
    /// even if a later request is still inside its window.
    #[default]
    Independent,

    /// A single re-lock timer that later requests push back.
    ///
    /// The door re-locks once, one full window after the most recent request.
    Extend,
}

/// Pin assignment and timing for the motion sensor and door lock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockConfig {
    /// Input pin wired to the PIR sensor.
    pub motion_pin: PinId,

    /// Output pin wired to the lock relay.
    pub lock_pin: PinId,

    /// How long an unlock request keeps the door open.
    #[serde(rename = "unlock_duration_secs", with = "duration_secs")]
    pub unlock_duration: Duration,

    /// Handling of overlapping unlock requests.
    #[serde(default)]
    pub unlock_policy: UnlockPolicy,
}

impl Default for LockConfig {
    fn default() -> Self {
        Self {
            motion_pin: PinId::new(DEFAULT_MOTION_PIN),
            lock_pin: PinId::new(DEFAULT_LOCK_PIN),
            unlock_duration: Duration::from_secs(DEFAULT_UNLOCK_DURATION_SECS),
            unlock_policy: UnlockPolicy::default(),
        }
    }
}

impl LockConfig {
    pub fn with_motion_pin(mut self, pin: PinId) -> Self {
        self.motion_pin = pin;
        self
    }

    pub fn with_lock_pin(mut self, pin: PinId) -> Self {
        self.lock_pin = pin;
        self
    }

    pub fn with_unlock_duration(mut self, duration: Duration) -> Self {
        self.unlock_duration = duration;
        self
    }

    pub fn with_unlock_policy(mut self, policy: UnlockPolicy) -> Self {
        self.unlock_policy = policy;
        self
    }

    /// Check the configuration for values that cannot describe a working door.
    ///
    /// # Errors
    /// - `Error::InvalidDuration` if the unlock duration is zero or longer
    ///   than [`MAX_UNLOCK_DURATION_SECS`].
    /// - `Error::Config` if both roles are assigned the same pin.
    pub fn validate(&self) -> Result<()> {
        if self.unlock_duration.is_zero() {
            return Err(Error::invalid_duration("unlock duration must be positive"));
        }

        if self.unlock_duration > Duration::from_secs(MAX_UNLOCK_DURATION_SECS) {
            return Err(Error::invalid_duration(format!(
                "unlock duration must be at most {MAX_UNLOCK_DURATION_SECS}s, got {:.3}s",
                self.unlock_duration.as_secs_f64()
            )));
        }

        if self.motion_pin == self.lock_pin {
            return Err(Error::config(format!(
                "motion pin and lock pin are both {}",
                self.motion_pin
            )));
        }

        Ok(())
    }
}

mod duration_secs {
    use serde::{Deserialize, Deserializer, Serializer, de::Error as _};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(duration.as_secs_f64())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let secs = f64::deserialize(deserializer)?;
        Duration::try_from_secs_f64(secs)
            .map_err(|e| D::Error::custom(format!("invalid unlock duration {secs}: {e}")))
    }
}
