// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Observed bulb state and its host presentation.

use serde::{Deserialize, Serialize};

use crate::types::{Brightness, ColourValue, Dimmer, LightMode};

/// A complete snapshot of the bulb as reported in a status frame.
///
/// Every field is required: a snapshot missing any of the four data points
/// is never constructed.
///
/// # Examples
///
/// ```
/// use tuya_bulb::state::BulbState;
/// use tuya_bulb::types::LightMode;
///
/// let state: BulbState = serde_json::from_str(
///     r#"{"1":true,"2":"white","3":140,"5":"ff00000000ffff"}"#,
/// ).unwrap();
///
/// assert!(state.is_on());
/// assert_eq!(state.mode(), &LightMode::White);
/// assert_eq!(state.brightness().value(), 140);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulbState {
    #[serde(rename = "1")]
    on: bool,
    #[serde(rename = "2")]
    mode: LightMode,
    #[serde(rename = "3")]
    brightness: Brightness,
    #[serde(rename = "5")]
    colour: ColourValue,
}

impl BulbState {
    /// Creates a snapshot from its four data points.
    #[must_use]
    pub fn new(on: bool, mode: LightMode, brightness: Brightness, colour: ColourValue) -> Self {
        Self {
            on,
            mode,
            brightness,
            colour,
        }
    }

    /// Returns true if the bulb is switched on.
    #[must_use]
    pub fn is_on(&self) -> bool {
        self.on
    }

    /// Returns the light mode.
    #[must_use]
    pub fn mode(&self) -> &LightMode {
        &self.mode
    }

    /// Returns the raw brightness.
    #[must_use]
    pub fn brightness(&self) -> Brightness {
        self.brightness
    }

    /// Returns the encoded colour.
    #[must_use]
    pub fn colour(&self) -> &ColourValue {
        &self.colour
    }

    /// Returns what the host should display for this snapshot.
    #[must_use]
    pub fn presentation(&self) -> Presentation {
        if self.on {
            Presentation::on(self.brightness.to_level())
        } else {
            Presentation::off()
        }
    }
}

/// Host-facing view of the bulb: on/off and a percentage level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Presentation {
    /// Whether the bulb is on.
    pub on: bool,
    /// Level in percent; always 0 when off.
    pub level: Dimmer,
}

impl Presentation {
    /// Presentation for a bulb that is on at `level`.
    #[must_use]
    pub const fn on(level: Dimmer) -> Self {
        Self { on: true, level }
    }

    /// Presentation for a bulb that is off.
    #[must_use]
    pub const fn off() -> Self {
        Self {
            on: false,
            level: Dimmer::OFF,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state(on: bool, raw: u8) -> BulbState {
        BulbState::new(
            on,
            LightMode::White,
            Brightness::clamped(raw),
            ColourValue::new("ffffff000000ff"),
        )
    }

    #[test]
    fn presentation_scales_brightness_when_on() {
        assert_eq!(state(true, 255).presentation(), Presentation::on(Dimmer::MAX));
        assert_eq!(state(true, 140).presentation().level.value(), 50);
    }

    #[test]
    fn presentation_at_floor_is_zero_percent_on() {
        let p = state(true, 25).presentation();
        assert!(p.on);
        assert_eq!(p.level, Dimmer::OFF);
    }

    #[test]
    fn presentation_off_ignores_brightness() {
        assert_eq!(state(false, 255).presentation(), Presentation::off());
    }

    #[test]
    fn deserialize_ignores_extra_data_points() {
        let parsed: BulbState = serde_json::from_str(
            r#"{"1":false,"2":"colour","3":25,"4":12,"5":"00ff0000780ff"}"#,
        )
        .unwrap();
        assert!(!parsed.is_on());
        assert_eq!(parsed.mode(), &LightMode::Colour);
    }
}
