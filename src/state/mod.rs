// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Bulb state types.
//!
//! [`BulbState`] is what the bulb reports, [`DesiredState`] is what a
//! command asks for, and [`Presentation`] is what the host displays.
//!
//! # Examples
//!
//! ```
//! use tuya_bulb::state::{BulbState, DesiredState};
//! use tuya_bulb::types::{Brightness, ColourValue, LightMode};
//!
//! let observed = BulbState::new(
//!     true,
//!     LightMode::White,
//!     Brightness::clamped(140),
//!     ColourValue::new("ffffff000000ff"),
//! );
//!
//! assert!(DesiredState::power(true).is_satisfied_by(&observed));
//! assert!(!DesiredState::white(Brightness::MAX).is_satisfied_by(&observed));
//! ```

mod bulb_state;
mod desired_state;
mod dps;

pub use bulb_state::{BulbState, Presentation};
pub use desired_state::DesiredState;
pub use dps::DpsIndex;
