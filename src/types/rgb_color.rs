// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! RGB color type and the bulb's colour encoding.

use std::fmt;
use std::str::FromStr;

use crate::error::ValueError;

use super::ColourValue;

/// Colour requested by a host, one byte per channel.
///
/// # Examples
///
/// ```
/// use tuya_bulb::types::RgbColor;
///
/// let red = RgbColor::from((255, 0, 0));
/// assert_eq!(red.to_hex(), "ff0000");
/// assert_eq!(red.to_colour_value().as_str(), "ff00000000ffff");
///
/// let parsed: RgbColor = "#FF0000".parse().unwrap();
/// assert_eq!(parsed, red);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct RgbColor {
    red: u8,
    green: u8,
    blue: u8,
}

impl RgbColor {
    /// Pure white, which hosts also use to request white mode.
    pub const WHITE: Self = Self::new(255, 255, 255);

    /// Builds a colour from its channels.
    #[must_use]
    pub const fn new(red: u8, green: u8, blue: u8) -> Self {
        Self { red, green, blue }
    }

    /// Parses an RGB color from a `#RRGGBB` or `RRGGBB` hex string.
    ///
    /// # Errors
    ///
    /// Returns `ValueError::InvalidHexColor` if the string is not six hex
    /// digits.
    pub fn from_hex(hex: &str) -> Result<Self, ValueError> {
        let digits = hex.trim_start_matches('#');
        if digits.len() != 6 || !digits.is_ascii() {
            return Err(ValueError::InvalidHexColor(hex.to_string()));
        }
        let channel = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&digits[range], 16)
                .map_err(|_| ValueError::InvalidHexColor(hex.to_string()))
        };
        Ok(Self::new(channel(0..2)?, channel(2..4)?, channel(4..6)?))
    }

    /// Returns the red component.
    #[must_use]
    pub const fn red(&self) -> u8 {
        self.red
    }

    /// Returns the green component.
    #[must_use]
    pub const fn green(&self) -> u8 {
        self.green
    }

    /// Returns the blue component.
    #[must_use]
    pub const fn blue(&self) -> u8 {
        self.blue
    }

    /// Returns true for pure white.
    #[must_use]
    pub fn is_white(&self) -> bool {
        *self == Self::WHITE
    }

    /// Returns the color as lowercase hex without a prefix.
    #[must_use]
    pub fn to_hex(&self) -> String {
        format!("{:02x}{:02x}{:02x}", self.red, self.green, self.blue)
    }

    /// Encodes the color the way the bulb stores it in its colour data point.
    ///
    /// The value is the RGB hex followed by the HSV triple: hue in whole
    /// degrees (4 hex digits), then saturation and value scaled to 0-255
    /// (2 hex digits each). All components are truncated, not rounded.
    #[must_use]
    pub fn to_colour_value(&self) -> ColourValue {
        let (h, s, v) = self.to_hsv();
        // Safe: h in [0, 1), s and v in [0, 1]
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let (hue, sat, val) = (
            (h * 360.0) as u16,
            (s * 255.0) as u8,
            (v * 255.0) as u8,
        );
        ColourValue::new(format!("{}{hue:04x}{sat:02x}{val:02x}", self.to_hex()))
    }

    /// Returns (hue, saturation, value), each as a fraction in [0, 1].
    #[allow(clippy::many_single_char_names)]
    fn to_hsv(self) -> (f64, f64, f64) {
        let r = f64::from(self.red) / 255.0;
        let g = f64::from(self.green) / 255.0;
        let b = f64::from(self.blue) / 255.0;

        let max = r.max(g).max(b);
        let min = r.min(g).min(b);
        let delta = max - min;
        if delta == 0.0 {
            return (0.0, 0.0, max);
        }

        let rc = (max - r) / delta;
        let gc = (max - g) / delta;
        let bc = (max - b) / delta;
        #[allow(clippy::float_cmp)]
        let sector = if r == max {
            bc - gc
        } else if g == max {
            2.0 + rc - bc
        } else {
            4.0 + gc - rc
        };

        ((sector / 6.0).rem_euclid(1.0), delta / max, max)
    }
}

impl fmt::Display for RgbColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.to_hex())
    }
}

impl FromStr for RgbColor {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl From<(u8, u8, u8)> for RgbColor {
    fn from((red, green, blue): (u8, u8, u8)) -> Self {
        Self::new(red, green, blue)
    }
}
