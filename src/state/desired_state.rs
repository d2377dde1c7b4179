// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Partial state requested by a command.
//!
//! A [`DesiredState`] only names the data points a command wants to change.
//! The same value serves as the body of the set frame and as the reference
//! a later status is compared against.
//!
//! # Examples
//!
//! ```
//! use tuya_bulb::state::DesiredState;
//! use tuya_bulb::types::{Brightness, LightMode};
//!
//! let desired = DesiredState::power(true)
//!     .with_mode(LightMode::White)
//!     .with_brightness(Brightness::MAX);
//!
//! assert_eq!(
//!     serde_json::to_string(&desired).unwrap(),
//!     r#"{"1":true,"2":"white","3":255}"#
//! );
//! ```

use serde::{Deserialize, Serialize};

use crate::types::{Brightness, ColourValue, LightMode};

use super::{BulbState, DpsIndex};

/// A partial map of data points to set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DesiredState {
    #[serde(rename = "1", default, skip_serializing_if = "Option::is_none")]
    on: Option<bool>,
    #[serde(rename = "2", default, skip_serializing_if = "Option::is_none")]
    mode: Option<LightMode>,
    #[serde(rename = "3", default, skip_serializing_if = "Option::is_none")]
    brightness: Option<Brightness>,
    #[serde(rename = "5", default, skip_serializing_if = "Option::is_none")]
    colour: Option<ColourValue>,
}

impl DesiredState {
    /// Creates an empty request.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a request that only switches power.
    #[must_use]
    pub fn power(on: bool) -> Self {
        Self {
            on: Some(on),
            ..Self::default()
        }
    }

    /// Switches on in white mode at the given raw brightness.
    #[must_use]
    pub fn white(brightness: Brightness) -> Self {
        Self::power(true)
            .with_mode(LightMode::White)
            .with_brightness(brightness)
    }

    /// Switches on in colour mode with the given encoded colour.
    #[must_use]
    pub fn colour(colour: ColourValue) -> Self {
        Self::power(true)
            .with_mode(LightMode::Colour)
            .with_colour(colour)
    }

    /// Sets the power data point.
    #[must_use]
    pub fn with_power(mut self, on: bool) -> Self {
        self.on = Some(on);
        self
    }

    /// Sets the mode data point.
    #[must_use]
    pub fn with_mode(mut self, mode: LightMode) -> Self {
        self.mode = Some(mode);
        self
    }

    /// Sets the brightness data point.
    #[must_use]
    pub fn with_brightness(mut self, brightness: Brightness) -> Self {
        self.brightness = Some(brightness);
        self
    }

    /// Sets the colour data point.
    #[must_use]
    pub fn with_colour(mut self, colour: ColourValue) -> Self {
        self.colour = Some(colour);
        self
    }

    /// Requested power, if any.
    #[must_use]
    pub fn on(&self) -> Option<bool> {
        self.on
    }

    /// Requested mode, if any.
    #[must_use]
    pub fn mode(&self) -> Option<&LightMode> {
        self.mode.as_ref()
    }

    /// Requested raw brightness, if any.
    #[must_use]
    pub fn brightness(&self) -> Option<Brightness> {
        self.brightness
    }

    /// Requested colour, if any.
    #[must_use]
    pub fn colour_value(&self) -> Option<&ColourValue> {
        self.colour.as_ref()
    }

    /// Returns true if no data point is requested.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.indices().is_empty()
    }

    /// Returns the requested indices in ascending order.
    #[must_use]
    pub fn indices(&self) -> Vec<DpsIndex> {
        let mut indices = Vec::with_capacity(4);
        if self.on.is_some() {
            indices.push(DpsIndex::On);
        }
        if self.mode.is_some() {
            indices.push(DpsIndex::Mode);
        }
        if self.brightness.is_some() {
            indices.push(DpsIndex::Brightness);
        }
        if self.colour.is_some() {
            indices.push(DpsIndex::Colour);
        }
        indices
    }

    /// Returns the requested indices whose observed value differs.
    #[must_use]
    pub fn mismatches(&self, observed: &BulbState) -> Vec<DpsIndex> {
        let mut differing = Vec::new();
        if self.on.is_some_and(|on| on != observed.is_on()) {
            differing.push(DpsIndex::On);
        }
        if self.mode.as_ref().is_some_and(|mode| mode != observed.mode()) {
            differing.push(DpsIndex::Mode);
        }
        if self
            .brightness
            .is_some_and(|brightness| brightness != observed.brightness())
        {
            differing.push(DpsIndex::Brightness);
        }
        if self
            .colour
            .as_ref()
            .is_some_and(|colour| colour != observed.colour())
        {
            differing.push(DpsIndex::Colour);
        }
        differing
    }

    /// Returns true if every requested data point matches `observed`.
    #[must_use]
    pub fn is_satisfied_by(&self, observed: &BulbState) -> bool {
        self.mismatches(observed).is_empty()
    }
}
