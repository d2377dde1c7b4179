// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Outbound frame construction.

use serde::Serialize;

use crate::state::DesiredState;
use crate::types::{ColourValue, RgbColor};

/// Builds the frames sent to the bulb.
///
/// Implementations are stateless: the same input always yields an
/// equivalent frame. Encryption and binary framing live behind this trait.
pub trait Codec {
    /// Builds a status query frame.
    fn status_frame(&self) -> Vec<u8>;

    /// Builds a frame that sets the given data points.
    fn set_frame(&self, desired: &DesiredState) -> Vec<u8>;

    /// Encodes a color for the colour data point.
    fn encode_colour(&self, color: RgbColor) -> ColourValue {
        color.to_colour_value()
    }
}

/// Codec producing the plaintext JSON bodies of the local protocol.
///
/// # Examples
///
/// ```
/// use tuya_bulb::protocol::{Codec, JsonCodec};
///
/// let codec = JsonCodec::new("bf0123");
/// assert_eq!(
///     codec.status_frame(),
///     br#"{"gwId":"bf0123","devId":"bf0123"}"#.to_vec()
/// );
/// ```
#[derive(Debug, Clone)]
pub struct JsonCodec {
    device_id: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct StatusQuery<'a> {
    gw_id: &'a str,
    dev_id: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SetCommand<'a> {
    dev_id: &'a str,
    uid: &'a str,
    t: String,
    dps: &'a DesiredState,
}

impl JsonCodec {
    /// Creates a codec for the bulb with the given device id.
    #[must_use]
    pub fn new(device_id: impl Into<String>) -> Self {
        Self {
            device_id: device_id.into(),
        }
    }

    /// Returns the device id.
    #[must_use]
    pub fn device_id(&self) -> &str {
        &self.device_id
    }

    fn to_bytes<T: Serialize>(body: &T) -> Vec<u8> {
        // Serializing these plain structs cannot fail
        serde_json::to_vec(body).unwrap_or_default()
    }
}

impl Codec for JsonCodec {
    fn status_frame(&self) -> Vec<u8> {
        Self::to_bytes(&StatusQuery {
            gw_id: &self.device_id,
            dev_id: &self.device_id,
        })
    }

    fn set_frame(&self, desired: &DesiredState) -> Vec<u8> {
        Self::to_bytes(&SetCommand {
            dev_id: &self.device_id,
            uid: "",
            t: chrono::Utc::now().timestamp().to_string(),
            dps: desired,
        })
    }
}
