// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Light mode and colour value types.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Rendering mode reported in the mode data point.
///
/// Only white and colour are ever requested. Bulbs also report modes such
/// as `scene` or `music`; those are kept verbatim in [`LightMode::Other`].
///
/// # Examples
///
/// ```
/// use tuya_bulb::types::LightMode;
///
/// assert_eq!(LightMode::White.as_str(), "white");
/// assert_eq!(serde_json::to_string(&LightMode::Colour).unwrap(), "\"colour\"");
///
/// let scene: LightMode = serde_json::from_str("\"scene\"").unwrap();
/// assert_eq!(scene, LightMode::Other("scene".into()));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum LightMode {
    /// White light; brightness comes from the brightness data point.
    White,
    /// Colour light; the colour data point is in effect.
    Colour,
    /// Any other mode the bulb reports.
    Other(String),
}

impl LightMode {
    /// Returns the wire string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::White => "white",
            Self::Colour => "colour",
            Self::Other(mode) => mode,
        }
    }
}

impl From<String> for LightMode {
    fn from(mode: String) -> Self {
        match mode.as_str() {
            "white" => Self::White,
            "colour" => Self::Colour,
            _ => Self::Other(mode),
        }
    }
}

impl From<LightMode> for String {
    fn from(mode: LightMode) -> Self {
        match mode {
            LightMode::Other(mode) => mode,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for LightMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Encoded colour as stored by the bulb.
///
/// The content is opaque to the reconciler: it is only compared for
/// equality against what the bulb reports back.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ColourValue(String);

impl ColourValue {
    /// Wraps an encoded colour string.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Returns the encoded string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ColourValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
