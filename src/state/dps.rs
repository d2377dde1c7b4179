// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Data point indices used by the bulb.

use std::fmt;

/// Index of a data point ("DPS") the bulb exposes.
///
/// Only the four indices needed to describe the light are modelled.
///
/// # Examples
///
/// ```
/// use tuya_bulb::state::DpsIndex;
///
/// assert_eq!(DpsIndex::Brightness.key(), "3");
/// assert_eq!(DpsIndex::REQUIRED.len(), 4);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DpsIndex {
    /// Power switch (boolean).
    On,
    /// Light mode (`white` or `colour`).
    Mode,
    /// Raw brightness (25-255).
    Brightness,
    /// Encoded colour.
    Colour,
}

impl DpsIndex {
    /// Indices that must all be present for a status to be usable.
    pub const REQUIRED: [Self; 4] = [Self::On, Self::Mode, Self::Brightness, Self::Colour];

    /// Returns the numeric index.
    #[must_use]
    pub const fn value(&self) -> u8 {
        match self {
            Self::On => 1,
            Self::Mode => 2,
            Self::Brightness => 3,
            Self::Colour => 5,
        }
    }

    /// Returns the key used in the JSON `dps` object.
    #[must_use]
    pub const fn key(&self) -> &'static str {
        match self {
            Self::On => "1",
            Self::Mode => "2",
            Self::Brightness => "3",
            Self::Colour => "5",
        }
    }
}

impl fmt::Display for DpsIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_match_values() {
        for index in DpsIndex::REQUIRED {
            assert_eq!(index.key(), index.value().to_string());
        }
    }
}
