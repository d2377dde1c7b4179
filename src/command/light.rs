// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Color payload sent by the host with a "Set Color" command.

use serde::Deserialize;

use crate::error::CommandError;
use crate::types::RgbColor;

/// Color mode flag carried in the host's color payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColorMode {
    /// Plain white; only the level matters.
    White,
    /// White with a color temperature.
    Temperature,
    /// RGB color.
    Rgb,
    /// RGB plus white channels.
    Custom,
}

impl ColorMode {
    /// Maps the numeric flag used by the host.
    #[must_use]
    pub const fn from_flag(flag: u8) -> Option<Self> {
        match flag {
            1 => Some(Self::White),
            2 => Some(Self::Temperature),
            3 => Some(Self::Rgb),
            4 => Some(Self::Custom),
            _ => None,
        }
    }
}

/// Host color payload, e.g. `{"m":3,"r":255,"g":0,"b":0,"t":0,"cw":0,"ww":0}`.
///
/// Only the mode flag and the RGB channels are used.
///
/// # Examples
///
/// ```
/// use tuya_bulb::command::{ColorPayload, ColorTarget};
/// use tuya_bulb::types::RgbColor;
///
/// let payload = ColorPayload::parse(r#"{"r":255,"g":0,"b":0,"m":3}"#).unwrap();
/// assert_eq!(payload.target().unwrap(), ColorTarget::Rgb(RgbColor::new(255, 0, 0)));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct ColorPayload {
    /// Raw mode flag.
    pub m: u8,
    /// Red channel.
    #[serde(default)]
    pub r: u8,
    /// Green channel.
    #[serde(default)]
    pub g: u8,
    /// Blue channel.
    #[serde(default)]
    pub b: u8,
}

/// What a color payload asks the bulb to render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColorTarget {
    /// White mode at the command's level.
    White,
    /// Colour mode with the given color.
    Rgb(RgbColor),
}

impl ColorPayload {
    /// Decodes the host's JSON payload.
    ///
    /// # Errors
    ///
    /// Returns `CommandError::InvalidColorPayload` if the JSON is invalid or
    /// lacks the mode flag.
    pub fn parse(json: &str) -> Result<Self, CommandError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Returns the RGB channels.
    #[must_use]
    pub const fn rgb(&self) -> RgbColor {
        RgbColor::new(self.r, self.g, self.b)
    }

    /// Resolves the payload to a white or colour target.
    ///
    /// White is chosen for the white flag, and for the RGB flag when the
    /// color is pure white.
    ///
    /// # Errors
    ///
    /// Returns `CommandError::InvalidColorMode` for any other flag.
    pub fn target(&self) -> Result<ColorTarget, CommandError> {
        match ColorMode::from_flag(self.m) {
            Some(ColorMode::White) => Ok(ColorTarget::White),
            Some(ColorMode::Rgb) if self.rgb().is_white() => Ok(ColorTarget::White),
            Some(ColorMode::Rgb) => Ok(ColorTarget::Rgb(self.rgb())),
            _ => Err(CommandError::InvalidColorMode(self.m)),
        }
    }
}
