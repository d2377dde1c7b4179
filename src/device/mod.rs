// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Async handle to a bulb reachable over TCP.
//!
//! [`Bulb::connect`] spawns one tokio task that owns the
//! [`Reconciler`] and its [`TcpTransport`]. Host calls, transport events and
//! heartbeat ticks are all funneled into that task, so the reconciler only
//! ever handles one event at a time.
//!
//! ```no_run
//! use tuya_bulb::device::{Bulb, BulbConfig};
//! use tuya_bulb::types::Dimmer;
//!
//! # async fn example() -> tuya_bulb::Result<()> {
//! let bulb = Bulb::connect(BulbConfig::new("192.168.1.40", "bf0123456789abcdef"));
//!
//! bulb.on_change(|presentation| {
//!     println!("on={} level={}", presentation.on, presentation.level);
//! });
//!
//! bulb.set_level(Dimmer::new(50)?).await?;
//! bulb.shutdown().await;
//! # Ok(())
//! # }
//! ```

mod config;

pub use config::{BulbConfig, DEFAULT_CONNECT_TIMEOUT, DEFAULT_HEARTBEAT_INTERVAL};

use std::sync::Arc;

use parking_lot::RwLock;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

use crate::command::{BulbCommand, ColorTarget};
use crate::error::{CommandError, Error, TransportError};
use crate::protocol::{JsonCodec, TcpTransport, TransportEvent};
use crate::reconciler::{Reconciler, Request};
use crate::state::{BulbState, Presentation};
use crate::subscription::{CallbackRegistry, PresentationSink, SubscriptionId};
use crate::types::{Dimmer, RgbColor};

type Ack = oneshot::Sender<Result<(), CommandError>>;

/// Work queued for the session task.
#[derive(Debug)]
enum SessionEvent {
    Execute(BulbCommand, Ack),
    Host {
        name: String,
        level: i64,
        color: String,
        ack: Ack,
    },
    Poll,
    Shutdown,
}

/// Forwards reconciler updates to the shared registry.
struct RegistrySink(Arc<CallbackRegistry>);

impl PresentationSink for RegistrySink {
    fn notify_state(&self, is_on: bool, level: Dimmer) {
        self.0.notify_state(is_on, level);
    }
}

type SessionReconciler = Reconciler<JsonCodec, TcpTransport, RegistrySink>;

/// Handle to a running bulb session.
///
/// Dropping the handle ends the session and closes the connection.
#[derive(Debug)]
pub struct Bulb {
    events: mpsc::UnboundedSender<SessionEvent>,
    callbacks: Arc<CallbackRegistry>,
    state: Arc<RwLock<Option<BulbState>>>,
    task: JoinHandle<()>,
}

impl Bulb {
    /// Starts a session with the bulb described by `config`.
    ///
    /// Returns immediately; the connection is opened and the first status
    /// read in the background. Must be called within a tokio runtime.
    #[must_use]
    pub fn connect(config: BulbConfig) -> Self {
        let (transport_tx, transport_rx) = mpsc::unbounded_channel();
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let callbacks = Arc::new(CallbackRegistry::new());
        let state = Arc::new(RwLock::new(None));

        let transport = TcpTransport::new(config.address(), config.connect_timeout, transport_tx)
            .with_reconnect_interval(config.reconnect_interval);
        let reconciler = Reconciler::new(
            JsonCodec::new(config.device_id.clone()),
            transport,
            RegistrySink(Arc::clone(&callbacks)),
            config.reconciler.clone(),
        );

        tracing::info!(
            address = %config.address(),
            device_id = %config.device_id,
            "Starting bulb session"
        );

        let task = tokio::spawn(run_session(
            reconciler,
            transport_rx,
            events_rx,
            config.heartbeat_interval,
            Arc::clone(&state),
        ));

        Self {
            events: events_tx,
            callbacks,
            state,
            task,
        }
    }

    /// Turns the bulb on.
    ///
    /// # Errors
    ///
    /// Returns `TransportError::SessionClosed` if the session has ended.
    pub async fn power_on(&self) -> Result<(), Error> {
        self.execute(BulbCommand::On).await
    }

    /// Turns the bulb off.
    ///
    /// # Errors
    ///
    /// Returns `TransportError::SessionClosed` if the session has ended.
    pub async fn power_off(&self) -> Result<(), Error> {
        self.execute(BulbCommand::Off).await
    }

    /// Turns the bulb on in white mode at `level`.
    ///
    /// # Errors
    ///
    /// Returns `TransportError::SessionClosed` if the session has ended.
    pub async fn set_level(&self, level: Dimmer) -> Result<(), Error> {
        self.execute(BulbCommand::SetLevel(level)).await
    }

    /// Turns the bulb on showing `color`.
    ///
    /// Pure white selects white mode at full level.
    ///
    /// # Errors
    ///
    /// Returns `TransportError::SessionClosed` if the session has ended.
    pub async fn set_color(&self, color: RgbColor) -> Result<(), Error> {
        let target = if color.is_white() {
            ColorTarget::White
        } else {
            ColorTarget::Rgb(color)
        };
        self.execute(BulbCommand::SetColor {
            level: Dimmer::MAX,
            target,
        })
        .await
    }

    /// Turns the bulb on in white mode at full brightness.
    ///
    /// # Errors
    ///
    /// Returns `TransportError::SessionClosed` if the session has ended.
    pub async fn set_full(&self) -> Result<(), Error> {
        self.execute(BulbCommand::SetFull).await
    }

    /// Turns the bulb on in white mode at its lowest brightness.
    ///
    /// # Errors
    ///
    /// Returns `TransportError::SessionClosed` if the session has ended.
    pub async fn set_night(&self) -> Result<(), Error> {
        self.execute(BulbCommand::SetNight).await
    }

    /// Submits a command.
    ///
    /// Resolves once the command is queued with the bulb, not once the bulb
    /// confirms it; watch [`on_change`](Self::on_change) for that.
    ///
    /// # Errors
    ///
    /// Returns `TransportError::SessionClosed` if the session has ended.
    pub async fn execute(&self, command: BulbCommand) -> Result<(), Error> {
        let (ack, reply) = oneshot::channel();
        self.send(SessionEvent::Execute(command, ack))?;
        Self::wait(reply).await
    }

    /// Submits a command by its host name.
    ///
    /// # Errors
    ///
    /// - `CommandError` if the command cannot be translated
    /// - `TransportError::SessionClosed` if the session has ended
    pub async fn handle_command(&self, name: &str, level: i64, color: &str) -> Result<(), Error> {
        let (ack, reply) = oneshot::channel();
        self.send(SessionEvent::Host {
            name: name.to_string(),
            level,
            color: color.to_string(),
            ack,
        })?;
        Self::wait(reply).await
    }

    /// Asks the bulb for its status without waiting for the heartbeat.
    ///
    /// Has no effect on a pending command.
    ///
    /// # Errors
    ///
    /// Returns `TransportError::SessionClosed` if the session has ended.
    pub fn poll(&self) -> Result<(), Error> {
        self.send(SessionEvent::Poll)
    }

    /// Returns the last state read from the bulb.
    #[must_use]
    pub fn state(&self) -> Option<BulbState> {
        self.state.read().clone()
    }

    /// Returns the last presentation reported to subscribers.
    #[must_use]
    pub fn presentation(&self) -> Option<Presentation> {
        self.callbacks.last()
    }

    /// Registers a callback for every status read from the bulb.
    pub fn on_report<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(Presentation) + Send + Sync + 'static,
    {
        self.callbacks.on_report(callback)
    }

    /// Registers a callback for changes in what the bulb shows.
    pub fn on_change<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(Presentation) + Send + Sync + 'static,
    {
        self.callbacks.on_change(callback)
    }

    /// Removes a callback.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.callbacks.unsubscribe(id)
    }

    /// Returns true while the session task is running.
    #[must_use]
    pub fn is_running(&self) -> bool {
        !self.task.is_finished()
    }

    /// Ends the session and waits for the connection to close.
    pub async fn shutdown(self) {
        let _ = self.events.send(SessionEvent::Shutdown);
        if let Err(e) = self.task.await {
            tracing::warn!(error = %e, "Bulb session task failed");
        }
    }

    fn send(&self, event: SessionEvent) -> Result<(), Error> {
        self.events
            .send(event)
            .map_err(|_| Error::Transport(TransportError::SessionClosed))
    }

    async fn wait(reply: oneshot::Receiver<Result<(), CommandError>>) -> Result<(), Error> {
        match reply.await {
            Ok(result) => result.map_err(Error::Command),
            Err(_) => Err(Error::Transport(TransportError::SessionClosed)),
        }
    }
}

/// Session task: the only owner of the reconciler.
async fn run_session(
    mut reconciler: SessionReconciler,
    mut transport_events: mpsc::UnboundedReceiver<TransportEvent>,
    mut events: mpsc::UnboundedReceiver<SessionEvent>,
    heartbeat_interval: std::time::Duration,
    state: Arc<RwLock<Option<BulbState>>>,
) {
    let period = heartbeat_interval.max(std::time::Duration::from_millis(1));
    let mut heartbeat = tokio::time::interval_at(Instant::now() + period, period);
    heartbeat.set_missed_tick_behavior(MissedTickBehavior::Delay);

    reconciler.start();

    loop {
        tokio::select! {
            Some(event) = transport_events.recv() => match event {
                TransportEvent::Connected(result) => reconciler.on_connect(result),
                TransportEvent::Message(data) => reconciler.on_message(&data),
                TransportEvent::Disconnected => reconciler.on_disconnect(),
            },
            event = events.recv() => match event {
                Some(SessionEvent::Execute(command, ack)) => {
                    reconciler.execute(command);
                    let _ = ack.send(Ok(()));
                }
                Some(SessionEvent::Host { name, level, color, ack }) => {
                    let _ = ack.send(reconciler.handle_command(&name, level, &color));
                }
                Some(SessionEvent::Poll) => reconciler.submit(Request::Status),
                Some(SessionEvent::Shutdown) | None => break,
            },
            _ = heartbeat.tick() => reconciler.tick(),
        }

        let latest = reconciler.last_state();
        let changed = state.read().as_ref() != latest;
        if changed {
            *state.write() = latest.cloned();
        }
    }

    reconciler.stop();
    tracing::info!("Bulb session ended");
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn unreachable_config() -> BulbConfig {
        BulbConfig::new("127.0.0.1", "bf01")
            .with_port(1)
            .with_connect_timeout(Duration::from_millis(100))
            .with_heartbeat_interval(Duration::from_secs(60))
    }

    #[tokio::test]
    async fn invalid_host_command_is_returned() {
        let bulb = Bulb::connect(unreachable_config());

        let err = bulb.handle_command("Dance", 0, "").await.unwrap_err();
        assert!(matches!(err, Error::Command(CommandError::UnknownCommand(_))));

        bulb.shutdown().await;
    }

    #[tokio::test]
    async fn commands_are_accepted_while_disconnected() {
        let bulb = Bulb::connect(unreachable_config());

        bulb.power_on().await.unwrap();
        bulb.set_color(RgbColor::new(0, 0, 255)).await.unwrap();
        bulb.poll().unwrap();
        assert!(bulb.state().is_none());
        assert!(bulb.is_running());

        bulb.shutdown().await;
    }

    #[tokio::test]
    async fn subscriptions_go_through_registry() {
        let bulb = Bulb::connect(unreachable_config());
        let id = bulb.on_change(|_| {});
        assert!(bulb.unsubscribe(id));
        assert!(!bulb.unsubscribe(id));
        assert!(bulb.presentation().is_none());
        bulb.shutdown().await;
    }
}
