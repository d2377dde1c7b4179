// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Extraction of a bulb status from raw inbound bytes.
//!
//! Replies arrive as binary frames whose payload is a JSON status object.
//! Rather than decoding the framing, the status object is located by its
//! literal start marker and cut at the first `}}` that follows it.

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::error::FrameError;
use crate::state::{BulbState, DpsIndex};

/// Literal that opens a status object.
const FRAME_START: &[u8] = br#"{"devId"#;

/// Literal that closes a status object (end of `dps`, end of object).
const FRAME_END: &[u8] = b"}}";

#[derive(Debug, Deserialize)]
struct StatusObject {
    #[serde(default)]
    dps: Map<String, Value>,
}

/// Extracts the bulb state from a buffer that contains a status object
/// surrounded by arbitrary bytes.
///
/// # Errors
///
/// - [`FrameError::UnrecognizedFrame`] if the start marker is absent
/// - [`FrameError::TruncatedFrame`] if no `}}` follows the start marker
/// - [`FrameError::MalformedPayload`] if the object is not valid JSON or a
///   data point has the wrong type
/// - [`FrameError::IncompleteState`] if a required data point is missing
///
/// # Examples
///
/// ```
/// use tuya_bulb::protocol::extract_state;
///
/// let frame = b"\x00\x00\x55\xaa{\"devId\":\"bf01\",\"dps\":{\"1\":true,\"2\":\"white\",\"3\":255,\"5\":\"ffffff000000ff\"}}\x00\x00\xaa\x55";
/// let state = extract_state(frame).unwrap();
/// assert!(state.is_on());
/// ```
pub fn extract_state(data: &[u8]) -> Result<BulbState, FrameError> {
    let start = find(data, FRAME_START).ok_or(FrameError::UnrecognizedFrame)?;
    // The end marker is searched only after the start so that a stray `}}`
    // in leading noise is ignored.
    let object = &data[start..];
    let end = find(object, FRAME_END).ok_or(FrameError::TruncatedFrame)? + FRAME_END.len();

    let status: StatusObject = serde_json::from_slice(&object[..end])?;

    if let Some(missing) = DpsIndex::REQUIRED
        .into_iter()
        .find(|index| !status.dps.contains_key(index.key()))
    {
        return Err(FrameError::IncompleteState(missing));
    }

    Ok(serde_json::from_value(Value::Object(status.dps))?)
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}
