//! Simulated GPIO platform for testing and development.
//!
//! This module provides a GPIO platform that runs without hardware. It records
//! every call made against it and lets tests drive input pins programmatically.

pub mod gpio;

// Re-export commonly used types
pub use gpio::{
    MockController, MockGpio, MockGpioBuilder, MockGpioHandle, MockPin, PlatformCall,
    RecordedCall,
};
