use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("Invalid pin identifier: {message}")]
    InvalidPinId { message: String },

    #[error("Invalid duration: {message}")]
    InvalidDuration { message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },
}

impl Error {
    pub fn invalid_pin_id(message: impl Into<String>) -> Self {
        Self::InvalidPinId {
            message: message.into(),
        }
    }

    pub fn invalid_duration(message: impl Into<String>) -> Self {
        Self::InvalidDuration {
            message: message.into(),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
