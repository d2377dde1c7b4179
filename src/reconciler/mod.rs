// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Drives the bulb towards the state the host asked for.
//!
//! The bulb never acknowledges a set frame and its replies carry no request
//! id. The [`Reconciler`] therefore keeps a single pending request and, after
//! each set frame, asks for the bulb's status. A request is only settled
//! once a status reply shows every requested data point at its target
//! value; otherwise the request is sent again.
//!
//! The reconciler is a synchronous state machine. It never blocks and never
//! spawns: its owner feeds it transport events ([`Reconciler::on_connect`],
//! [`Reconciler::on_message`], [`Reconciler::on_disconnect`]), heartbeat
//! ticks ([`Reconciler::tick`]) and host commands, one at a time.
//!
//! # Examples
//!
//! ```
//! use tuya_bulb::protocol::{ConnectionState, JsonCodec, Transport};
//! use tuya_bulb::reconciler::{Pending, Reconciler, ReconcilerConfig};
//! use tuya_bulb::types::Dimmer;
//!
//! #[derive(Default)]
//! struct Loopback {
//!     state: ConnectionState,
//!     sent: Vec<Vec<u8>>,
//! }
//!
//! impl Transport for Loopback {
//!     fn connect(&mut self) { self.state = ConnectionState::Connected; }
//!     fn send(&mut self, frame: Vec<u8>) { self.sent.push(frame); }
//!     fn disconnect(&mut self) { self.state = ConnectionState::Disconnected; }
//!     fn state(&self) -> ConnectionState { self.state }
//! }
//!
//! let sink = |on: bool, level: Dimmer| println!("on={on} level={level}");
//! let mut reconciler = Reconciler::new(
//!     JsonCodec::new("bf0123"),
//!     Loopback::default(),
//!     sink,
//!     ReconcilerConfig::default(),
//! );
//!
//! reconciler.start();
//! reconciler.on_connect(Ok(()));
//! assert_eq!(reconciler.pending(), &Pending::Status);
//!
//! reconciler.on_message(br#"{"devId":"bf0123","dps":{"1":true,"2":"white","3":255,"5":"ffffff000000ff"}}"#);
//! assert_eq!(reconciler.pending(), &Pending::Idle);
//! ```

mod config;

pub use config::{DEFAULT_HEARTBEAT_BASE_FREQ, ReconcilerConfig, RetryPolicy};

use std::fmt;

use crate::command::BulbCommand;
use crate::error::{CommandError, TransportError};
use crate::protocol::{Codec, Transport, extract_state};
use crate::state::{BulbState, DesiredState};
use crate::subscription::PresentationSink;

/// Something to ask the bulb.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    /// Read the current state.
    Status,
    /// Set the given data points, then read the state back.
    Command(DesiredState),
}

impl From<DesiredState> for Request {
    fn from(desired: DesiredState) -> Self {
        Self::Command(desired)
    }
}

/// The request awaiting confirmation.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Pending {
    /// Nothing is pending; inbound data is ignored.
    #[default]
    Idle,
    /// A status reply is awaited.
    Status,
    /// A status reply matching the desired state is awaited.
    Command(DesiredState),
}

impl Pending {
    /// Returns true if nothing is pending.
    #[must_use]
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    /// Returns the request to send again, if any.
    #[must_use]
    pub fn request(&self) -> Option<Request> {
        match self {
            Self::Idle => None,
            Self::Status => Some(Request::Status),
            Self::Command(desired) => Some(Request::Command(desired.clone())),
        }
    }
}

impl fmt::Display for Pending {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => f.write_str("idle"),
            Self::Status => f.write_str("status"),
            Self::Command(_) => f.write_str("command"),
        }
    }
}

/// Single-slot request reconciler for one bulb.
///
/// At most one request is outstanding. A command always takes the slot,
/// replacing whatever was there. A status request only takes an empty slot,
/// so periodic polling never cancels a command still being retried.
pub struct Reconciler<C, T, S> {
    codec: C,
    transport: T,
    sink: S,
    config: ReconcilerConfig,
    pending: Pending,
    attempts: u32,
    /// Pending request already written to the current connection.
    dispatched: bool,
    silent_ticks: u32,
    heartbeat_countdown: u32,
    last_state: Option<BulbState>,
}

impl<C, T, S> Reconciler<C, T, S>
where
    C: Codec,
    T: Transport,
    S: PresentationSink,
{
    /// Creates an idle reconciler.
    #[must_use]
    pub fn new(codec: C, transport: T, sink: S, config: ReconcilerConfig) -> Self {
        let heartbeat_countdown = config.heartbeat_base_freq.max(1);
        Self {
            codec,
            transport,
            sink,
            config,
            pending: Pending::Idle,
            attempts: 0,
            dispatched: false,
            silent_ticks: 0,
            heartbeat_countdown,
            last_state: None,
        }
    }

    /// Queues a status read and opens the connection.
    pub fn start(&mut self) {
        tracing::debug!("Starting bulb reconciliation");
        self.submit(Request::Status);
    }

    /// Drops the pending request and closes the connection.
    pub fn stop(&mut self) {
        tracing::debug!(pending = %self.pending, "Stopping bulb reconciliation");
        self.settle();
        if self.transport.is_connected() || self.transport.is_connecting() {
            self.transport.disconnect();
        }
    }

    /// Submits a request.
    ///
    /// A command replaces the pending request. A status request is recorded
    /// only when nothing is pending. Either way the submitted request is
    /// sent right away if connected; otherwise a connection is opened and
    /// the pending request goes out once it is established.
    pub fn submit(&mut self, request: Request) {
        match &request {
            Request::Status if !self.pending.is_idle() => {
                tracing::trace!(pending = %self.pending, "Keeping pending request");
            }
            Request::Status => self.arm(Pending::Status),
            Request::Command(desired) => self.arm(Pending::Command(desired.clone())),
        }
        self.transmit(&request);
    }

    /// Translates and submits a host command.
    ///
    /// # Errors
    ///
    /// Returns a `CommandError` if the command cannot be translated; the
    /// pending request is left untouched in that case.
    pub fn handle_command(
        &mut self,
        name: &str,
        level: i64,
        color: &str,
    ) -> Result<(), CommandError> {
        let command = BulbCommand::parse(name, level, color).inspect_err(|e| {
            tracing::warn!(command = name, error = %e, "Rejected host command");
        })?;
        self.execute(command);
        Ok(())
    }

    /// Submits an already translated command.
    pub fn execute(&mut self, command: BulbCommand) {
        let desired = command.to_desired(&self.codec);
        tracing::debug!(%command, ?desired, "Executing command");
        self.submit(Request::Command(desired));
    }

    /// Handles the outcome of a connect attempt.
    ///
    /// On success the pending request is sent, unless it already went out
    /// on this connection. "No route to host" is left to the next
    /// heartbeat; any other failure reconnects at once.
    pub fn on_connect(&mut self, result: Result<(), TransportError>) {
        if result.is_err() {
            self.dispatched = false;
        }
        match result {
            Ok(()) if self.dispatched => {
                tracing::debug!(pending = %self.pending, "Connected to bulb, request already sent");
            }
            Ok(()) => {
                tracing::debug!(pending = %self.pending, "Connected to bulb");
                if let Some(request) = self.pending.request() {
                    self.transmit(&request);
                }
            }
            Err(TransportError::NoRouteToHost) => {
                tracing::debug!("No route to bulb, waiting for next heartbeat");
            }
            Err(e) => {
                tracing::debug!(error = %e, "Connect to bulb failed, reconnecting");
                if self.transport.is_connected() {
                    self.transport.disconnect();
                }
                if !self.transport.is_connecting() {
                    self.transport.connect();
                }
            }
        }
    }

    /// Handles bytes received from the bulb.
    ///
    /// Ignored while idle. A reply that cannot be read causes the pending
    /// request to be sent again. A readable reply is always reported to the
    /// sink, then settles the request if the bulb has converged.
    pub fn on_message(&mut self, data: &[u8]) {
        if self.pending.is_idle() {
            tracing::trace!(bytes = data.len(), "Ignoring data, nothing pending");
            return;
        }

        let state = match extract_state(data) {
            Ok(state) => state,
            Err(e) => {
                tracing::debug!(error = %e, pending = %self.pending, "Unusable reply, re-sending");
                self.retry();
                return;
            }
        };

        self.silent_ticks = 0;
        let presentation = state.presentation();
        self.sink.notify_state(presentation.on, presentation.level);

        let mismatches = match &self.pending {
            Pending::Command(desired) => desired.mismatches(&state),
            Pending::Idle | Pending::Status => Vec::new(),
        };
        self.last_state = Some(state);

        if mismatches.is_empty() {
            tracing::debug!(request = %self.pending, attempts = self.attempts, "Request settled");
            self.settle();
        } else {
            tracing::debug!(?mismatches, attempts = self.attempts, "Bulb not converged, re-sending");
            self.retry();
        }
    }

    /// Handles loss of the connection.
    ///
    /// The pending request is kept; it goes out again on the next retry or
    /// heartbeat, which reconnects first.
    pub fn on_disconnect(&mut self) {
        tracing::debug!(pending = %self.pending, "Bulb connection closed");
        self.dispatched = false;
    }

    /// Advances the heartbeat by one tick.
    ///
    /// Every `heartbeat_base_freq` ticks a status request is submitted. A
    /// pending request that has gone unanswered for the configured number
    /// of ticks is sent again.
    pub fn tick(&mut self) {
        if !self.pending.is_idle() {
            self.silent_ticks += 1;
            if self.config.retry.is_silent_too_long(self.silent_ticks) {
                tracing::debug!(
                    request = %self.pending,
                    ticks = self.silent_ticks,
                    "No reply from bulb, re-sending"
                );
                self.silent_ticks = 0;
                self.retry();
            }
        }

        self.heartbeat_countdown = self.heartbeat_countdown.saturating_sub(1);
        if self.heartbeat_countdown == 0 {
            self.heartbeat_countdown = self.config.heartbeat_base_freq.max(1);
            tracing::trace!("Heartbeat status poll");
            self.submit(Request::Status);
        }
    }

    /// Returns the pending request.
    #[must_use]
    pub fn pending(&self) -> &Pending {
        &self.pending
    }

    /// Returns the last state read from the bulb.
    #[must_use]
    pub fn last_state(&self) -> Option<&BulbState> {
        self.last_state.as_ref()
    }

    /// Returns how many times the pending request has been dispatched.
    #[must_use]
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &ReconcilerConfig {
        &self.config
    }

    /// Returns the codec.
    #[must_use]
    pub fn codec(&self) -> &C {
        &self.codec
    }

    /// Returns the transport.
    #[must_use]
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Returns the transport mutably.
    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Returns the sink.
    #[must_use]
    pub fn sink(&self) -> &S {
        &self.sink
    }

    fn arm(&mut self, pending: Pending) {
        self.pending = pending;
        self.attempts = 1;
        self.dispatched = false;
        self.silent_ticks = 0;
    }

    fn settle(&mut self) {
        self.pending = Pending::Idle;
        self.attempts = 0;
        self.dispatched = false;
        self.silent_ticks = 0;
    }

    fn retry(&mut self) {
        let Some(request) = self.pending.request() else {
            return;
        };
        if !self.config.retry.allows_another(self.attempts) {
            tracing::warn!(
                request = %self.pending,
                attempts = self.attempts,
                "Bulb never confirmed request, giving up"
            );
            self.settle();
            return;
        }
        self.attempts += 1;
        self.transmit(&request);
    }

    fn transmit(&mut self, request: &Request) {
        if self.transport.is_connected() {
            if let Request::Command(desired) = request {
                self.transport.send(self.codec.set_frame(desired));
            }
            self.transport.send(self.codec.status_frame());
            self.silent_ticks = 0;
            // A bare status read does not deliver a pending command
            if matches!(request, Request::Command(_)) || self.pending == Pending::Status {
                self.dispatched = true;
            }
        } else if !self.transport.is_connecting() {
            tracing::debug!(state = %self.transport.state(), "Bulb not connected, connecting");
            self.transport.connect();
        }
    }
}

impl<C, T: Transport, S> fmt::Debug for Reconciler<C, T, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Reconciler")
            .field("connection", &self.transport.state())
            .field("pending", &self.pending)
            .field("attempts", &self.attempts)
            .field("dispatched", &self.dispatched)
            .field("silent_ticks", &self.silent_ticks)
            .field("heartbeat_countdown", &self.heartbeat_countdown)
            .field("last_state", &self.last_state)
            .finish_non_exhaustive()
    }
}
