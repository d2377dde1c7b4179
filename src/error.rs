// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for the `tuya_bulb` library.
//!
//! Frame and transport failures are recovered inside the reconciler and are
//! only surfaced through logging. Command failures are returned to the
//! caller that issued the command.

use thiserror::Error;

use crate::state::DpsIndex;

/// The main error type for this library.
#[derive(Debug, Error)]
pub enum Error {
    /// Error occurred during value validation.
    #[error("value error: {0}")]
    Value(#[from] ValueError),

    /// An inbound frame could not be turned into a bulb state.
    #[error("frame error: {0}")]
    Frame(#[from] FrameError),

    /// A host command was rejected before submission.
    #[error("command error: {0}")]
    Command(#[from] CommandError),

    /// The connection to the bulb failed.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),
}

/// Errors related to value validation and constraints.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValueError {
    /// A numeric value is outside the allowed range.
    #[error("value {actual} is out of range [{min}, {max}]")]
    OutOfRange {
        /// Minimum allowed value.
        min: u16,
        /// Maximum allowed value.
        max: u16,
        /// The actual value that was provided.
        actual: u16,
    },

    /// A hex color string could not be parsed.
    #[error("invalid hex color: {0}")]
    InvalidHexColor(String),
}

/// Errors raised while extracting a bulb state from an inbound frame.
///
/// All variants are handled the same way by the reconciler: the pending
/// request is sent again.
#[derive(Debug, Error)]
pub enum FrameError {
    /// The buffer does not contain the status object start marker.
    #[error("no status object found in frame")]
    UnrecognizedFrame,

    /// The status object is not terminated within the buffer.
    #[error("status object is truncated")]
    TruncatedFrame,

    /// The status object is not valid JSON or has unexpected value types.
    #[error("malformed status payload: {0}")]
    MalformedPayload(#[from] serde_json::Error),

    /// A required data point is missing from the status object.
    #[error("status is missing data point {0}")]
    IncompleteState(DpsIndex),
}

/// Errors raised while translating a host command.
#[derive(Debug, Error)]
pub enum CommandError {
    /// The color payload requested a mode the bulb cannot render.
    #[error("invalid mode to set the color: {0}")]
    InvalidColorMode(u8),

    /// The command name is not one the bulb understands.
    #[error("undefined command: {0}")]
    UnknownCommand(String),

    /// The color payload could not be decoded.
    #[error("invalid color payload: {0}")]
    InvalidColorPayload(#[from] serde_json::Error),
}

/// Errors related to the connection with the bulb.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// The bulb's host is not reachable.
    ///
    /// Connect failures of this kind are not retried immediately.
    #[error("no route to host")]
    NoRouteToHost,

    /// The bulb refused the connection.
    #[error("connection refused")]
    Refused,

    /// Connecting took longer than the configured timeout.
    #[error("connection timed out after {0} ms")]
    TimedOut(u64),

    /// Any other socket failure.
    #[error("connection failed ({code}): {description}")]
    Io {
        /// OS error code, or -1 when none is available.
        code: i32,
        /// Human readable description.
        description: String,
    },

    /// The session task is no longer running.
    #[error("session closed")]
    SessionClosed,
}

impl TransportError {
    /// OS error code reported for "no route to host".
    pub const EHOSTUNREACH: i32 = 113;

    /// Maps an I/O error from a connect attempt.
    #[must_use]
    pub fn from_io(err: &std::io::Error) -> Self {
        use std::io::ErrorKind;

        if err.raw_os_error() == Some(Self::EHOSTUNREACH) || err.kind() == ErrorKind::HostUnreachable
        {
            return Self::NoRouteToHost;
        }
        match err.kind() {
            ErrorKind::ConnectionRefused => Self::Refused,
            ErrorKind::TimedOut => Self::TimedOut(0),
            _ => Self::Io {
                code: err.raw_os_error().unwrap_or(-1),
                description: err.to_string(),
            },
        }
    }
}

/// A specialized Result type for this library.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn value_error_display() {
        let err = ValueError::OutOfRange {
            min: 25,
            max: 255,
            actual: 300,
        };
        assert_eq!(err.to_string(), "value 300 is out of range [25, 255]");
    }

    #[test]
    fn frame_error_display() {
        let err = FrameError::IncompleteState(DpsIndex::Colour);
        assert_eq!(err.to_string(), "status is missing data point 5");
    }

    #[test]
    fn error_from_command_error() {
        let err: Error = CommandError::InvalidColorMode(4).into();
        assert!(matches!(
            err,
            Error::Command(CommandError::InvalidColorMode(4))
        ));
    }

    #[test]
    fn transport_error_from_host_unreachable() {
        let io = std::io::Error::from_raw_os_error(TransportError::EHOSTUNREACH);
        assert_eq!(TransportError::from_io(&io), TransportError::NoRouteToHost);
    }

    #[test]
    fn transport_error_from_refused() {
        let io = std::io::Error::from(std::io::ErrorKind::ConnectionRefused);
        assert_eq!(TransportError::from_io(&io), TransportError::Refused);
    }

    #[test]
    fn transport_error_from_other_io() {
        let io = std::io::Error::other("boom");
        assert!(matches!(
            TransportError::from_io(&io),
            TransportError::Io { code: -1, .. }
        ));
    }
}
