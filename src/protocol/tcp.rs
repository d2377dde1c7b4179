// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! TCP transport backed by tokio.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::Instant;

use crate::error::TransportError;
use crate::protocol::{ConnectionState, Transport, TransportEvent};

/// Size of the buffer used for each socket read.
const READ_BUFFER_SIZE: usize = 1024;

/// Default minimum spacing between two connect attempts.
pub const DEFAULT_RECONNECT_INTERVAL: Duration = Duration::from_secs(1);

/// TCP connection to a bulb.
///
/// Every operation returns immediately. Connect outcomes, received bytes and
/// connection loss are pushed to the event channel given at construction.
/// Each connect attempt gets a new generation number; events from tasks of
/// an older generation are discarded, so a late result from a superseded
/// attempt never reaches the reconciler.
///
/// Connect attempts are spaced at least `reconnect_interval` apart. A
/// request arriving sooner starts an attempt that waits out the remainder,
/// so a bulb that refuses connections is not hammered.
///
/// Must be used from within a tokio runtime.
#[derive(Debug)]
pub struct TcpTransport {
    address: String,
    connect_timeout: Duration,
    reconnect_interval: Duration,
    events: mpsc::UnboundedSender<TransportEvent>,
    link: Arc<Mutex<Link>>,
}

#[derive(Debug, Default)]
struct Link {
    state: ConnectionState,
    generation: u64,
    writer: Option<mpsc::UnboundedSender<Vec<u8>>>,
    tasks: Vec<JoinHandle<()>>,
    last_attempt: Option<Instant>,
}

impl Link {
    fn reset(&mut self) {
        self.generation += 1;
        self.state = ConnectionState::Disconnected;
        self.writer = None;
        for task in self.tasks.drain(..) {
            task.abort();
        }
    }
}

impl TcpTransport {
    /// Creates a transport for `address` (`host:port`).
    #[must_use]
    pub fn new(
        address: impl Into<String>,
        connect_timeout: Duration,
        events: mpsc::UnboundedSender<TransportEvent>,
    ) -> Self {
        Self {
            address: address.into(),
            connect_timeout,
            reconnect_interval: DEFAULT_RECONNECT_INTERVAL,
            events,
            link: Arc::new(Mutex::new(Link::default())),
        }
    }

    /// Sets the minimum spacing between connect attempts.
    #[must_use]
    pub fn with_reconnect_interval(mut self, interval: Duration) -> Self {
        self.reconnect_interval = interval;
        self
    }

    /// Returns the remote address.
    #[must_use]
    pub fn address(&self) -> &str {
        &self.address
    }
}

impl Transport for TcpTransport {
    fn connect(&mut self) {
        let (generation, delay) = {
            let mut link = self.link.lock();
            if link.state != ConnectionState::Disconnected {
                return;
            }
            let now = Instant::now();
            let delay = link.last_attempt.map_or(Duration::ZERO, |last| {
                self.reconnect_interval
                    .saturating_sub(now.saturating_duration_since(last))
            });
            link.tasks.retain(|task| !task.is_finished());
            link.generation += 1;
            link.state = ConnectionState::Connecting;
            link.last_attempt = Some(now + delay);
            (link.generation, delay)
        };

        tracing::debug!(
            address = %self.address,
            generation,
            delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
            "Connecting to bulb"
        );

        let attempt = tokio::spawn(open(
            self.address.clone(),
            delay,
            self.connect_timeout,
            self.events.clone(),
            Arc::clone(&self.link),
            generation,
        ));
        self.link.lock().tasks.push(attempt);
    }

    fn send(&mut self, frame: Vec<u8>) {
        let link = self.link.lock();
        match &link.writer {
            Some(writer) => {
                tracing::trace!(bytes = frame.len(), "Queueing frame");
                let _ = writer.send(frame);
            }
            None => tracing::debug!("Dropping frame, bulb not connected"),
        }
    }

    fn disconnect(&mut self) {
        tracing::debug!(address = %self.address, "Disconnecting from bulb");
        self.link.lock().reset();
    }

    fn state(&self) -> ConnectionState {
        self.link.lock().state
    }
}

impl Drop for TcpTransport {
    fn drop(&mut self) {
        self.link.lock().reset();
    }
}

/// Connect attempt for one generation.
async fn open(
    address: String,
    delay: Duration,
    connect_timeout: Duration,
    events: mpsc::UnboundedSender<TransportEvent>,
    link: Arc<Mutex<Link>>,
    generation: u64,
) {
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }

    let outcome = match tokio::time::timeout(connect_timeout, TcpStream::connect(&address)).await {
        Ok(Ok(stream)) => Ok(stream),
        Ok(Err(e)) => Err(TransportError::from_io(&e)),
        Err(_) => Err(TransportError::TimedOut(
            u64::try_from(connect_timeout.as_millis()).unwrap_or(u64::MAX),
        )),
    };

    let mut guard = link.lock();
    if guard.generation != generation {
        tracing::trace!(generation, "Discarding superseded connect attempt");
        return;
    }

    match outcome {
        Ok(stream) => {
            if let Err(e) = stream.set_nodelay(true) {
                tracing::debug!(error = %e, "Failed to disable Nagle");
            }
            let (reader, writer) = stream.into_split();
            let (frames_tx, frames_rx) = mpsc::unbounded_channel();

            guard.state = ConnectionState::Connected;
            guard.writer = Some(frames_tx);
            // Reported before the reader starts so no message precedes it
            let _ = events.send(TransportEvent::Connected(Ok(())));

            guard.tasks.push(tokio::spawn(write_loop(writer, frames_rx)));
            guard.tasks.push(tokio::spawn(read_loop(
                reader,
                events,
                Arc::clone(&link),
                generation,
            )));
        }
        Err(err) => {
            guard.state = ConnectionState::Disconnected;
            let _ = events.send(TransportEvent::Connected(Err(err)));
        }
    }
}

async fn write_loop(mut writer: OwnedWriteHalf, mut frames: mpsc::UnboundedReceiver<Vec<u8>>) {
    while let Some(frame) = frames.recv().await {
        if let Err(e) = writer.write_all(&frame).await {
            tracing::debug!(error = %e, "Write to bulb failed");
            break;
        }
    }
    let _ = writer.shutdown().await;
}

async fn read_loop(
    mut reader: OwnedReadHalf,
    events: mpsc::UnboundedSender<TransportEvent>,
    link: Arc<Mutex<Link>>,
    generation: u64,
) {
    let mut buffer = vec![0u8; READ_BUFFER_SIZE];
    loop {
        match reader.read(&mut buffer).await {
            Ok(0) => break,
            Ok(n) => {
                tracing::trace!(bytes = n, "Received data from bulb");
                if events
                    .send(TransportEvent::Message(buffer[..n].to_vec()))
                    .is_err()
                {
                    return;
                }
            }
            Err(e) => {
                tracing::debug!(error = %e, "Read from bulb failed");
                break;
            }
        }
    }

    let mut guard = link.lock();
    if guard.generation == generation {
        guard.state = ConnectionState::Disconnected;
        guard.writer = None;
        let _ = events.send(TransportEvent::Disconnected);
    }
}
