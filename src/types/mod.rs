// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Value types for bulb control.
//!
//! Each type keeps its value within the range the bulb or the host accepts.
//!
//! # Types
//!
//! - [`Dimmer`] - Host brightness level (0-100%)
//! - [`Brightness`] - Raw bulb brightness (25-255)
//! - [`RgbColor`] - RGB color and its colour encoding
//! - [`LightMode`] - White or colour rendering
//! - [`ColourValue`] - Encoded colour as stored by the bulb

mod brightness;
mod dimmer;
mod mode;
mod rgb_color;

pub use brightness::Brightness;
pub use dimmer::Dimmer;
pub use mode::{ColourValue, LightMode};
pub use rgb_color::RgbColor;
