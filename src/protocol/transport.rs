// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Connection abstraction used by the reconciler.

use std::fmt;

use crate::error::TransportError;

/// Lifecycle of the connection to the bulb.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionState {
    /// No socket is open and no attempt is in progress.
    #[default]
    Disconnected,
    /// A connect attempt is in progress.
    Connecting,
    /// The socket is open.
    Connected,
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Disconnected => write!(f, "disconnected"),
            Self::Connecting => write!(f, "connecting"),
            Self::Connected => write!(f, "connected"),
        }
    }
}

/// Events a transport reports back once its operations complete.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    /// Outcome of a connect attempt.
    Connected(Result<(), TransportError>),
    /// Bytes received from the bulb.
    Message(Vec<u8>),
    /// The connection was closed by the peer or failed.
    Disconnected,
}

/// A connection to the bulb with fire-and-forget operations.
///
/// None of the methods block. Completion of [`connect`](Transport::connect)
/// and arrival of data are reported later as [`TransportEvent`]s, which the
/// owner feeds back into the reconciler. Transports never retry on their
/// own.
pub trait Transport {
    /// Starts a connect attempt.
    fn connect(&mut self);

    /// Queues bytes for sending. Dropped if not connected.
    fn send(&mut self, frame: Vec<u8>);

    /// Closes the connection.
    fn disconnect(&mut self);

    /// Returns the current connection state.
    fn state(&self) -> ConnectionState;

    /// Returns true if the socket is open.
    fn is_connected(&self) -> bool {
        self.state() == ConnectionState::Connected
    }

    /// Returns true if a connect attempt is in progress.
    fn is_connecting(&self) -> bool {
        self.state() == ConnectionState::Connecting
    }
}
