// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Host commands and their translation to data point requests.
//!
//! | Host name | Command | Requested data points |
//! |-----------|---------|-----------------------|
//! | `Off` | [`BulbCommand::Off`] | on = false |
//! | `On` | [`BulbCommand::On`] | on = true |
//! | `Set Level` | [`BulbCommand::SetLevel`] | on, white, brightness from level |
//! | `Set Color` | [`BulbCommand::SetColor`] | as `Set Level`, or on, colour, colour value |
//! | `Set Full` | [`BulbCommand::SetFull`] | on, white, brightness 255 |
//! | `Set Night` | [`BulbCommand::SetNight`] | on, white, brightness 25 |
//!
//! # Examples
//!
//! ```
//! use tuya_bulb::command::BulbCommand;
//! use tuya_bulb::protocol::JsonCodec;
//!
//! let codec = JsonCodec::new("bf0123");
//! let command = BulbCommand::parse("Set Level", 50, "").unwrap();
//! let desired = command.to_desired(&codec);
//!
//! assert_eq!(
//!     serde_json::to_string(&desired).unwrap(),
//!     r#"{"1":true,"2":"white","3":140}"#
//! );
//! ```

mod light;

pub use light::{ColorMode, ColorPayload, ColorTarget};

use std::fmt;

use crate::error::CommandError;
use crate::protocol::Codec;
use crate::state::DesiredState;
use crate::types::{Brightness, Dimmer};

/// A command the host can issue to the bulb.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BulbCommand {
    /// Switch off.
    Off,
    /// Switch on, keeping mode and brightness.
    On,
    /// Switch on in white mode at a level.
    SetLevel(Dimmer),
    /// Switch on in white or colour mode.
    SetColor {
        /// Level used when the target is white.
        level: Dimmer,
        /// White or RGB target.
        target: ColorTarget,
    },
    /// Switch on in white mode at full brightness.
    SetFull,
    /// Switch on in white mode at the lowest brightness.
    SetNight,
}

impl BulbCommand {
    /// Translates a host command.
    ///
    /// `level` is the host's 0-100 level (clamped) and `color` the JSON color
    /// payload, which is only read for `"Set Color"`.
    ///
    /// # Errors
    ///
    /// - `CommandError::UnknownCommand` for an unrecognized name
    /// - `CommandError::InvalidColorPayload` if the color JSON cannot be read
    /// - `CommandError::InvalidColorMode` if the color mode is unsupported
    pub fn parse(name: &str, level: i64, color: &str) -> Result<Self, CommandError> {
        let level = Dimmer::saturating_from(level);
        match name {
            "Off" => Ok(Self::Off),
            "On" => Ok(Self::On),
            "Set Level" => Ok(Self::SetLevel(level)),
            "Set Color" => {
                let target = ColorPayload::parse(color)?.target()?;
                Ok(Self::SetColor { level, target })
            }
            "Set Full" => Ok(Self::SetFull),
            "Set Night" => Ok(Self::SetNight),
            _ => Err(CommandError::UnknownCommand(name.to_string())),
        }
    }

    /// Returns the host name of this command.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Off => "Off",
            Self::On => "On",
            Self::SetLevel(_) => "Set Level",
            Self::SetColor { .. } => "Set Color",
            Self::SetFull => "Set Full",
            Self::SetNight => "Set Night",
        }
    }

    /// Returns the data points this command requests.
    ///
    /// Every command except `Off` forces the bulb on.
    #[must_use]
    pub fn to_desired<C: Codec + ?Sized>(&self, codec: &C) -> DesiredState {
        match *self {
            Self::Off => DesiredState::power(false),
            Self::On => DesiredState::power(true),
            Self::SetLevel(level)
            | Self::SetColor {
                level,
                target: ColorTarget::White,
            } => DesiredState::white(Brightness::from_level(level)),
            Self::SetColor {
                target: ColorTarget::Rgb(color),
                ..
            } => DesiredState::colour(codec.encode_colour(color)),
            Self::SetFull => DesiredState::white(Brightness::MAX),
            Self::SetNight => DesiredState::white(Brightness::MIN),
        }
    }
}

impl fmt::Display for BulbCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SetLevel(level) | Self::SetColor { level, .. } => {
                write!(f, "{} ({level})", self.name())
            }
            _ => f.write_str(self.name()),
        }
    }
}
