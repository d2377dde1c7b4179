// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Wire-level pieces of the local protocol.
//!
//! - [`Codec`]: builds outbound frames ([`JsonCodec`] for plaintext bodies)
//! - [`extract_state`]: turns inbound bytes into a [`BulbState`](crate::state::BulbState)
//! - [`Transport`]: non-blocking connection ([`TcpTransport`] over tokio)
//!
//! The bulb does not acknowledge set frames and carries no request ids, so
//! correlation between what was sent and what comes back is left to the
//! [`Reconciler`](crate::reconciler::Reconciler).

mod codec;
mod frame;
#[cfg(feature = "tcp")]
mod tcp;
mod transport;

pub use codec::{Codec, JsonCodec};
pub use frame::extract_state;
#[cfg(feature = "tcp")]
pub use tcp::{DEFAULT_RECONNECT_INTERVAL, TcpTransport};
pub use transport::{ConnectionState, Transport, TransportEvent};

/// TCP port the bulb listens on for local control.
pub const DEFAULT_PORT: u16 = 6668;
