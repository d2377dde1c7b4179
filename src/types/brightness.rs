// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Raw brightness as reported by the bulb.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::ValueError;

use super::Dimmer;

/// Brightness on the bulb's raw scale (25-255).
///
/// The bulb cannot go darker than 25 while on; conversion to and from the
/// host's percentage scale maps 25 to 0% and 255 to 100%.
///
/// # Examples
///
/// ```
/// use tuya_bulb::types::{Brightness, Dimmer};
///
/// let raw = Brightness::from_level(Dimmer::new(50).unwrap());
/// assert_eq!(raw.value(), 140);
/// assert_eq!(raw.to_level().value(), 50);
///
/// assert_eq!(Brightness::MAX.to_level(), Dimmer::MAX);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct Brightness(u8);

impl Brightness {
    /// Lowest raw value the bulb accepts (night light).
    pub const MIN: Self = Self(25);

    /// Highest raw value (full brightness).
    pub const MAX: Self = Self(255);

    const SPAN: u16 = 230;

    /// Creates a raw brightness.
    ///
    /// # Errors
    ///
    /// Returns `ValueError::OutOfRange` if value is below 25.
    pub fn new(value: u8) -> Result<Self, ValueError> {
        if value < Self::MIN.0 {
            return Err(ValueError::OutOfRange {
                min: u16::from(Self::MIN.0),
                max: u16::from(Self::MAX.0),
                actual: u16::from(value),
            });
        }
        Ok(Self(value))
    }

    /// Creates a raw brightness, raising values below 25 to 25.
    #[must_use]
    pub const fn clamped(value: u8) -> Self {
        if value < Self::MIN.0 {
            Self::MIN
        } else {
            Self(value)
        }
    }

    /// Converts a host level to the raw scale, rounding to nearest.
    #[must_use]
    pub fn from_level(level: Dimmer) -> Self {
        let scaled = (u16::from(level.value()) * Self::SPAN + 50) / 100;
        // Safe: level <= 100 so scaled <= 230
        #[allow(clippy::cast_possible_truncation)]
        let scaled = scaled as u8;
        Self(Self::MIN.0 + scaled)
    }

    /// Converts to a host level, rounding down.
    #[must_use]
    pub fn to_level(&self) -> Dimmer {
        let offset = u16::from(self.0 - Self::MIN.0);
        // Safe: offset <= 230 so the quotient is at most 100
        #[allow(clippy::cast_possible_truncation)]
        let level = (offset * 100 / Self::SPAN) as u8;
        Dimmer::clamped(level)
    }

    /// Returns the raw value.
    #[must_use]
    pub const fn value(&self) -> u8 {
        self.0
    }
}

impl<'de> Deserialize<'de> for Brightness {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = u8::deserialize(deserializer)?;
        Ok(Self::clamped(raw))
    }
}

impl fmt::Display for Brightness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn brightness_rejects_values_below_floor() {
        assert!(Brightness::new(24).is_err());
        assert_eq!(Brightness::new(25).unwrap(), Brightness::MIN);
    }

    #[test]
    fn from_level_endpoints() {
        assert_eq!(Brightness::from_level(Dimmer::OFF), Brightness::MIN);
        assert_eq!(Brightness::from_level(Dimmer::MAX), Brightness::MAX);
    }

    #[test]
    fn from_level_rounds_to_nearest() {
        // 33 * 2.3 = 75.9
        assert_eq!(Brightness::from_level(Dimmer::new(33).unwrap()).value(), 101);
        // 50 * 2.3 = 115
        assert_eq!(Brightness::from_level(Dimmer::new(50).unwrap()).value(), 140);
        // 1 * 2.3 = 2.3
        assert_eq!(Brightness::from_level(Dimmer::new(1).unwrap()).value(), 27);
    }

    #[test]
    fn to_level_rounds_down() {
        assert_eq!(Brightness::MIN.to_level().value(), 0);
        assert_eq!(Brightness::MAX.to_level().value(), 100);
        assert_eq!(Brightness::clamped(140).to_level().value(), 50);
        // 229 * 100 / 230 = 99.56
        assert_eq!(Brightness::clamped(254).to_level().value(), 99);
    }

    #[test]
    fn deserialize_clamps_low_values() {
        let raw: Brightness = serde_json::from_str("10").unwrap();
        assert_eq!(raw, Brightness::MIN);
        let raw: Brightness = serde_json::from_str("200").unwrap();
        assert_eq!(raw.value(), 200);
    }

    #[test]
    fn deserialize_rejects_out_of_type_values() {
        assert!(serde_json::from_str::<Brightness>("300").is_err());
        assert!(serde_json::from_str::<Brightness>("\"140\"").is_err());
    }
}
