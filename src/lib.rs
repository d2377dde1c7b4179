// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! `tuya_bulb` - Local control of Tuya smart bulbs.
//!
//! Tuya bulbs accept "set" frames without acknowledging them and answer
//! status queries without saying which request they answer. This library
//! keeps a bulb in the state its host asked for by pairing every set frame
//! with a status query and re-sending until the bulb reports the requested
//! data points.
//!
//! # Supported Features
//!
//! - **Power control**: on, off
//! - **White mode**: 0-100% level, full and night presets
//! - **Colour mode**: RGB colors encoded for data point 5
//! - **Status reporting**: on/off and level, pushed to subscribers
//!
//! # Data Points
//!
//! | Index | Meaning | Values |
//! |-------|---------|--------|
//! | 1 | power | `true` / `false` |
//! | 2 | mode | `"white"` / `"colour"` |
//! | 3 | brightness | 25-255 |
//! | 5 | colour | 14 hex digits |
//!
//! # Quick Start
//!
//! ```no_run
//! use tuya_bulb::device::{Bulb, BulbConfig};
//! use tuya_bulb::types::{Dimmer, RgbColor};
//!
//! #[tokio::main]
//! async fn main() -> tuya_bulb::Result<()> {
//!     let bulb = Bulb::connect(BulbConfig::new("192.168.1.40", "bf0123456789abcdef"));
//!
//!     bulb.on_change(|presentation| {
//!         println!("on={} level={}", presentation.on, presentation.level);
//!     });
//!
//!     bulb.set_level(Dimmer::new(60)?).await?;
//!     bulb.set_color(RgbColor::from_hex("#ff8000")?).await?;
//!
//!     // Host-style commands
//!     bulb.handle_command("Set Color", 80, r#"{"m":3,"r":0,"g":0,"b":255}"#).await?;
//!
//!     bulb.shutdown().await;
//!     Ok(())
//! }
//! ```
//!
//! # Without a Runtime
//!
//! The [`Reconciler`](reconciler::Reconciler) is a plain state machine that
//! any event loop can drive with its own [`Transport`](protocol::Transport).

pub mod command;
#[cfg(feature = "tcp")]
pub mod device;
pub mod error;
pub mod protocol;
pub mod reconciler;
pub mod state;
pub mod subscription;
pub mod types;

pub use command::{BulbCommand, ColorPayload, ColorTarget};
#[cfg(feature = "tcp")]
pub use device::{Bulb, BulbConfig};
pub use error::{CommandError, Error, FrameError, Result, TransportError, ValueError};
pub use protocol::{Codec, JsonCodec, Transport};
pub use reconciler::{Pending, Reconciler, ReconcilerConfig, Request, RetryPolicy};
pub use state::{BulbState, DesiredState, DpsIndex, Presentation};
pub use subscription::{CallbackRegistry, PresentationSink, SubscriptionId};
pub use types::{Brightness, ColourValue, Dimmer, LightMode, RgbColor};
