// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Host-facing level.
//!
//! Hosts speak in percentages; the bulb speaks in its own raw scale (see
//! [`Brightness`](super::Brightness)).

use std::fmt;

use crate::error::ValueError;

const LEVEL_CEILING: u8 = 100;

/// Level shown by the host, 0 to 100 percent.
///
/// A bulb that is off is always presented at [`Dimmer::OFF`].
///
/// # Examples
///
/// ```
/// use tuya_bulb::types::Dimmer;
///
/// let half = Dimmer::new(50)?;
/// assert_eq!(half.to_string(), "50%");
/// assert!(Dimmer::new(120).is_err());
///
/// // Host integers are saturated rather than rejected
/// assert_eq!(Dimmer::saturating_from(-7), Dimmer::OFF);
/// # Ok::<(), tuya_bulb::ValueError>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Dimmer(u8);

impl Dimmer {
    /// Level of a bulb that is off.
    pub const OFF: Self = Self(0);

    /// Full level.
    pub const MAX: Self = Self(LEVEL_CEILING);

    /// Validates a level.
    ///
    /// # Errors
    ///
    /// Returns `ValueError::OutOfRange` above 100.
    pub fn new(level: u8) -> Result<Self, ValueError> {
        match level {
            0..=LEVEL_CEILING => Ok(Self(level)),
            _ => Err(ValueError::OutOfRange {
                min: 0,
                max: u16::from(LEVEL_CEILING),
                actual: u16::from(level),
            }),
        }
    }

    /// Builds a level, capping it at 100.
    #[must_use]
    pub const fn clamped(level: u8) -> Self {
        if level > LEVEL_CEILING {
            Self::MAX
        } else {
            Self(level)
        }
    }

    /// Builds a level from an untrusted host integer.
    #[must_use]
    pub fn saturating_from(level: i64) -> Self {
        let capped = level.clamp(0, i64::from(LEVEL_CEILING));
        // Safe: capped lies in 0..=100
        Self(u8::try_from(capped).unwrap_or(LEVEL_CEILING))
    }

    /// Returns the percentage.
    #[must_use]
    pub const fn value(&self) -> u8 {
        self.0
    }

    /// Returns true at level 0.
    #[must_use]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for Dimmer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0)
    }
}

impl TryFrom<u8> for Dimmer {
    type Error = ValueError;

    fn try_from(level: u8) -> Result<Self, Self::Error> {
        Self::new(level)
    }
}

impl From<Dimmer> for u8 {
    fn from(level: Dimmer) -> Self {
        level.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_whole_percentage_range() {
        assert!((0..=100).all(|level| Dimmer::new(level).is_ok()));
    }

    #[test]
    fn rejects_above_hundred() {
        match Dimmer::new(101) {
            Err(ValueError::OutOfRange { max, actual, .. }) => {
                assert_eq!((max, actual), (100, 101));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn clamped_caps_at_max() {
        assert_eq!(Dimmer::clamped(99).value(), 99);
        assert_eq!(Dimmer::clamped(u8::MAX), Dimmer::MAX);
    }

    #[test]
    fn host_integers_saturate() {
        assert_eq!(Dimmer::saturating_from(i64::MIN), Dimmer::OFF);
        assert_eq!(Dimmer::saturating_from(80).value(), 80);
        assert_eq!(Dimmer::saturating_from(i64::MAX), Dimmer::MAX);
    }

    #[test]
    fn off_level_is_zero() {
        assert!(Dimmer::OFF.is_zero());
        assert!(!Dimmer::MAX.is_zero());
        assert_eq!(u8::from(Dimmer::default()), 0);
    }

    #[test]
    fn shown_as_percentage() {
        assert_eq!(Dimmer::clamped(7).to_string(), "7%");
    }
}
