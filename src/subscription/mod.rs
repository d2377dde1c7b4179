// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Delivery of state updates to the host.
//!
//! The reconciler reports every successfully parsed status through a
//! [`PresentationSink`]. Updates flow one way: nothing a sink does feeds
//! back into reconciliation.
//!
//! Closures implement the trait directly; [`CallbackRegistry`] fans updates
//! out to any number of subscribers.
//!
//! ```
//! use tuya_bulb::subscription::PresentationSink;
//! use tuya_bulb::types::Dimmer;
//!
//! let sink = |on: bool, level: Dimmer| println!("bulb on={on} level={level}");
//! sink.notify_state(true, Dimmer::MAX);
//! ```

mod callback;

pub use callback::{CallbackRegistry, SubscriptionId};

use crate::types::Dimmer;

/// Receiver of "the bulb is now on/off at this level" updates.
///
/// When off, `level` is always [`Dimmer::OFF`].
pub trait PresentationSink {
    /// Reports the bulb's current presentation.
    fn notify_state(&self, is_on: bool, level: Dimmer);
}

impl<F> PresentationSink for F
where
    F: Fn(bool, Dimmer),
{
    fn notify_state(&self, is_on: bool, level: Dimmer) {
        self(is_on, level);
    }
}
