// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Integration tests for `Bulb` sessions against a simulated bulb on loopback.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use serde_json::{Value, json};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio::time::timeout;
use tuya_bulb::device::{Bulb, BulbConfig};
use tuya_bulb::reconciler::ReconcilerConfig;
use tuya_bulb::state::Presentation;
use tuya_bulb::types::{Dimmer, LightMode, RgbColor};

// ============================================================================
// Simulated bulb
// ============================================================================

#[derive(Debug, Clone)]
struct Dps {
    on: bool,
    mode: String,
    brightness: u64,
    colour: String,
}

impl Dps {
    fn white(on: bool, brightness: u64) -> Self {
        Self {
            on,
            mode: "white".to_string(),
            brightness,
            colour: "ffffff000000ff".to_string(),
        }
    }

    fn apply(&mut self, dps: &Value) {
        if let Some(on) = dps["1"].as_bool() {
            self.on = on;
        }
        if let Some(mode) = dps["2"].as_str() {
            self.mode = mode.to_string();
        }
        if let Some(brightness) = dps["3"].as_u64() {
            self.brightness = brightness;
        }
        if let Some(colour) = dps["5"].as_str() {
            self.colour = colour.to_string();
        }
    }

    fn reply(&self) -> Vec<u8> {
        let mut frame = b"\x00\x00\x55\xaa\x00\x00\x00\x00\x00\x00\x00\x0a".to_vec();
        frame.extend(
            json!({
                "devId": "bf0123",
                "dps": {
                    "1": self.on,
                    "2": self.mode,
                    "3": self.brightness,
                    "5": self.colour,
                }
            })
            .to_string()
            .bytes(),
        );
        frame.extend(b"\x00\x00\xaa\x55");
        frame
    }
}

#[derive(Debug, Default)]
struct Behavior {
    /// Set frames to drop before applying any.
    ignore_sets: usize,
    /// Close the first connection after this many status replies.
    hang_up_after: Option<usize>,
}

#[derive(Debug, Default)]
struct Counters {
    connections: usize,
    sets: usize,
    queries: usize,
}

struct FakeBulb {
    port: u16,
    dps: Arc<Mutex<Dps>>,
    counters: Arc<Mutex<Counters>>,
}

impl FakeBulb {
    async fn start(initial: Dps, behavior: Behavior) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let dps = Arc::new(Mutex::new(initial));
        let counters = Arc::new(Mutex::new(Counters::default()));

        let served_dps = Arc::clone(&dps);
        let served_counters = Arc::clone(&counters);
        tokio::spawn(async move {
            let mut behavior = behavior;
            while let Ok((socket, _)) = listener.accept().await {
                served_counters.lock().connections += 1;
                serve(socket, &served_dps, &served_counters, &mut behavior).await;
            }
        });

        Self {
            port,
            dps,
            counters,
        }
    }

    fn config(&self) -> BulbConfig {
        BulbConfig::new("127.0.0.1", "bf0123")
            .with_port(self.port)
            .with_heartbeat_interval(Duration::from_secs(60))
            .with_reconnect_interval(Duration::ZERO)
            .with_reconciler(ReconcilerConfig::default())
    }
}

/// Splits complete JSON bodies off the front of `buffer`.
fn split_frames(buffer: &[u8]) -> (Vec<Value>, usize) {
    let mut stream = serde_json::Deserializer::from_slice(buffer).into_iter::<Value>();
    let mut frames = Vec::new();
    let mut consumed = 0;
    while let Some(Ok(frame)) = stream.next() {
        frames.push(frame);
        consumed = stream.byte_offset();
    }
    (frames, consumed)
}

async fn serve(
    mut socket: TcpStream,
    dps: &Mutex<Dps>,
    counters: &Mutex<Counters>,
    behavior: &mut Behavior,
) {
    let mut buffer = Vec::new();
    let mut chunk = [0u8; 1024];
    loop {
        let n = match socket.read(&mut chunk).await {
            Ok(0) | Err(_) => return,
            Ok(n) => n,
        };
        buffer.extend_from_slice(&chunk[..n]);
        let (frames, consumed) = split_frames(&buffer);
        buffer.drain(..consumed);

        for frame in frames {
            if let Some(requested) = frame.get("dps") {
                counters.lock().sets += 1;
                if behavior.ignore_sets > 0 {
                    behavior.ignore_sets -= 1;
                } else {
                    dps.lock().apply(requested);
                }
            } else if frame.get("gwId").is_some() {
                counters.lock().queries += 1;
                let reply = dps.lock().reply();
                if socket.write_all(&reply).await.is_err() {
                    return;
                }
                if let Some(left) = behavior.hang_up_after.as_mut() {
                    *left -= 1;
                    if *left == 0 {
                        behavior.hang_up_after = None;
                        return;
                    }
                }
            }
        }
    }
}

// ============================================================================
// Helpers
// ============================================================================

fn watch(bulb: &Bulb) -> mpsc::UnboundedReceiver<Presentation> {
    let (tx, rx) = mpsc::unbounded_channel();
    bulb.on_change(move |presentation| {
        let _ = tx.send(presentation);
    });
    rx
}

async fn wait_for(rx: &mut mpsc::UnboundedReceiver<Presentation>, expected: Presentation) {
    let seen = timeout(Duration::from_secs(5), async {
        while let Some(presentation) = rx.recv().await {
            if presentation == expected {
                return true;
            }
        }
        false
    })
    .await;
    assert!(matches!(seen, Ok(true)), "bulb never reported {expected:?}");
}

fn level(value: u8) -> Presentation {
    Presentation::on(Dimmer::new(value).unwrap())
}

// ============================================================================
// Tests
// ============================================================================

#[tokio::test]
async fn initial_status_is_reported() {
    let fake = FakeBulb::start(Dps::white(true, 140), Behavior::default()).await;
    let bulb = Bulb::connect(fake.config());
    let mut changes = watch(&bulb);

    wait_for(&mut changes, level(50)).await;
    assert_eq!(bulb.presentation(), Some(level(50)));

    bulb.shutdown().await;
}

#[tokio::test]
async fn set_level_converges() {
    let fake = FakeBulb::start(Dps::white(false, 255), Behavior::default()).await;
    let bulb = Bulb::connect(fake.config());
    let mut changes = watch(&bulb);
    wait_for(&mut changes, Presentation::off()).await;

    bulb.set_level(Dimmer::new(50).unwrap()).await.unwrap();
    wait_for(&mut changes, level(50)).await;

    let state = bulb.state().unwrap();
    assert!(state.is_on());
    assert_eq!(state.mode(), &LightMode::White);
    assert_eq!(state.brightness().value(), 140);
    assert_eq!(fake.counters.lock().sets, 1);

    bulb.shutdown().await;
}

#[tokio::test]
async fn dropped_set_is_retried() {
    let behavior = Behavior {
        ignore_sets: 1,
        ..Behavior::default()
    };
    let fake = FakeBulb::start(Dps::white(false, 255), behavior).await;
    let bulb = Bulb::connect(fake.config());
    let mut changes = watch(&bulb);
    wait_for(&mut changes, Presentation::off()).await;

    bulb.power_on().await.unwrap();
    wait_for(&mut changes, level(100)).await;

    assert_eq!(fake.counters.lock().sets, 2);
    bulb.shutdown().await;
}

#[tokio::test]
async fn colour_reaches_bulb() {
    let fake = FakeBulb::start(Dps::white(false, 255), Behavior::default()).await;
    let bulb = Bulb::connect(fake.config());
    let mut changes = watch(&bulb);
    wait_for(&mut changes, Presentation::off()).await;

    bulb.set_color(RgbColor::new(255, 0, 0)).await.unwrap();
    wait_for(&mut changes, level(100)).await;

    let dps = fake.dps.lock().clone();
    assert_eq!(dps.mode, "colour");
    assert_eq!(dps.colour, "ff00000000ffff");
    bulb.shutdown().await;
}

#[tokio::test]
async fn host_white_colour_uses_level() {
    let fake = FakeBulb::start(Dps::white(false, 255), Behavior::default()).await;
    let bulb = Bulb::connect(fake.config());
    let mut changes = watch(&bulb);
    wait_for(&mut changes, Presentation::off()).await;

    bulb.handle_command("Set Color", 80, r#"{"m":3,"r":255,"g":255,"b":255}"#)
        .await
        .unwrap();
    wait_for(&mut changes, level(80)).await;

    assert_eq!(fake.dps.lock().brightness, 209);
    bulb.shutdown().await;
}

#[tokio::test]
async fn reconnects_after_bulb_hangs_up() {
    let behavior = Behavior {
        hang_up_after: Some(1),
        ..Behavior::default()
    };
    let fake = FakeBulb::start(Dps::white(true, 255), behavior).await;
    // Short heartbeat so an unanswered command is re-sent quickly
    let bulb = Bulb::connect(
        fake.config()
            .with_heartbeat_interval(Duration::from_millis(100)),
    );
    let mut changes = watch(&bulb);
    wait_for(&mut changes, level(100)).await;
    tokio::time::sleep(Duration::from_millis(100)).await;

    bulb.power_off().await.unwrap();
    wait_for(&mut changes, Presentation::off()).await;

    assert_eq!(fake.counters.lock().connections, 2);
    bulb.shutdown().await;
}

#[tokio::test]
async fn night_preset_and_poll() {
    let fake = FakeBulb::start(Dps::white(true, 255), Behavior::default()).await;
    let bulb = Bulb::connect(fake.config());
    let mut changes = watch(&bulb);
    wait_for(&mut changes, level(100)).await;

    bulb.set_night().await.unwrap();
    wait_for(&mut changes, level(0)).await;

    let queries = fake.counters.lock().queries;
    bulb.poll().unwrap();
    let polled = timeout(Duration::from_secs(5), async {
        while fake.counters.lock().queries == queries {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await;
    assert!(polled.is_ok());

    bulb.shutdown().await;
}
