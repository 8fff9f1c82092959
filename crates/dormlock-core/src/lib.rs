//! Hardware-independent vocabulary for the dormlock door controller.
//!
//! This crate holds the pieces of the door controller that do not touch a GPIO
//! subsystem: pin identifiers, the lock configuration supplied by the embedding
//! application, and the defaults used when no configuration is given.

pub mod config;
pub mod constants;
pub mod error;
pub mod types;

pub use config::{LockConfig, UnlockPolicy};
pub use error::{Error, Result};
pub use types::PinId;

/// Version info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
