use crate::{Result, error::Error};
use serde::{Deserialize, Serialize};
use std::fmt;

/// GPIO pin identifier as used by the platform's pin numbering scheme.
///
/// Any number is accepted here. Whether a pin exists is up to the platform:
/// opening an identifier the board does not have simply fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PinId(u32);

impl PinId {
    /// Create a new pin identifier.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        PinId(id)
    }

    /// Get the raw pin identifier.
    #[must_use]
    pub fn as_u32(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for PinId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for PinId {
    type Err = Error;

    /// # Errors
    /// Returns `Error::InvalidPinId` if the input is not a non-negative integer.
    fn from_str(s: &str) -> Result<Self> {
        let id: u32 = s
            .trim()
            .parse()
            .map_err(|_| Error::invalid_pin_id(format!("Invalid pin ID: {s}")))?;
        Ok(PinId(id))
    }
}

impl From<u32> for PinId {
    fn from(id: u32) -> Self {
        PinId(id)
    }
}

impl From<PinId> for u32 {
    fn from(id: PinId) -> Self {
        id.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(0)]
    #[case(4)]
    #[case(64)]
    #[case(512)]
    #[case(u32::MAX)]
    fn test_pin_id_accepts_any_number(#[case] id: u32) {
        assert_eq!(PinId::new(id).as_u32(), id);
        assert_eq!(PinId::from(id), PinId::new(id));
    }

    #[rstest]
    #[case("5", 5)]
    #[case(" 17 ", 17)]
    #[case("0", 0)]
    #[case("496", 496)]
    fn test_pin_id_from_str(#[case] input: &str, #[case] expected: u32) {
        let pin: PinId = input.parse().unwrap();
        assert_eq!(pin.as_u32(), expected);
    }

    #[rstest]
    #[case("")]
    #[case("abc")]
    #[case("-1")]
    #[case("4.5")]
    fn test_pin_id_from_str_invalid(#[case] input: &str) {
        let err = input.parse::<PinId>().unwrap_err();
        assert!(matches!(err, Error::InvalidPinId { .. }));
    }

    #[test]
    fn test_pin_id_display() {
        assert_eq!(PinId::new(4).to_string(), "4");
    }

    #[test]
    fn test_pin_id_serde_is_plain_number() {
        let pin: PinId = serde_json::from_str("300").unwrap();
        assert_eq!(pin.as_u32(), 300);
        assert_eq!(serde_json::to_string(&pin).unwrap(), "300");

        assert!(serde_json::from_str::<PinId>("-3").is_err());
    }
}
