//! Default wiring and timing constants for the door controller.
//!
//! The embedding application normally supplies its own [`LockConfig`]; these
//! values describe the reference wiring (PIR sensor output on pin 5, lock
//! relay on pin 4) and are what [`LockConfig::default`] uses.
//!
//! ```
//! use dormlock_core::constants::*;
//!
//! assert_ne!(DEFAULT_MOTION_PIN, DEFAULT_LOCK_PIN);
//! assert!(DEFAULT_UNLOCK_DURATION_SECS <= MAX_UNLOCK_DURATION_SECS);
//! ```
//!
//! [`LockConfig`]: crate::LockConfig
//! [`LockConfig::default`]: crate::LockConfig

// ============================================================================
// Pin identifiers
// ============================================================================

/// Pin the PIR motion sensor output is wired to.
pub const DEFAULT_MOTION_PIN: u32 = 5;

/// Pin driving the door-lock relay. High keeps the door locked.
pub const DEFAULT_LOCK_PIN: u32 = 4;

// ============================================================================
// Timing
// ============================================================================

/// How long the door stays unlocked after an unlock request, in seconds.
pub const DEFAULT_UNLOCK_DURATION_SECS: u64 = 10;

/// Upper bound on the configurable unlock window, in seconds.
///
/// Anything longer is almost certainly a unit mistake (milliseconds passed as
/// seconds) and would leave the door open for minutes.
pub const MAX_UNLOCK_DURATION_SECS: u64 = 300;
