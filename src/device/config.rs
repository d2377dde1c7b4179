// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Connection settings for a bulb session.

use std::time::Duration;

use crate::protocol::{DEFAULT_PORT, DEFAULT_RECONNECT_INTERVAL};
use crate::reconciler::ReconcilerConfig;

/// Default time between heartbeat ticks.
pub const DEFAULT_HEARTBEAT_INTERVAL: Duration = Duration::from_secs(10);

/// Default time allowed for a TCP connect.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Configuration for a [`Bulb`](super::Bulb) session.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use tuya_bulb::device::BulbConfig;
///
/// let config = BulbConfig::new("192.168.1.40", "bf0123456789abcdef")
///     .with_heartbeat_interval(Duration::from_secs(5));
///
/// assert_eq!(config.address(), "192.168.1.40:6668");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BulbConfig {
    /// Bulb host name or IP address.
    pub host: String,
    /// Bulb TCP port.
    pub port: u16,
    /// Device id the bulb was paired with.
    pub device_id: String,
    /// Time between heartbeat ticks.
    pub heartbeat_interval: Duration,
    /// Time allowed for a TCP connect.
    pub connect_timeout: Duration,
    /// Minimum spacing between connect attempts.
    pub reconnect_interval: Duration,
    /// Polling and retry behavior.
    pub reconciler: ReconcilerConfig,
}

impl BulbConfig {
    /// Creates a configuration with default settings.
    #[must_use]
    pub fn new(host: impl Into<String>, device_id: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port: DEFAULT_PORT,
            device_id: device_id.into(),
            heartbeat_interval: DEFAULT_HEARTBEAT_INTERVAL,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            reconnect_interval: DEFAULT_RECONNECT_INTERVAL,
            reconciler: ReconcilerConfig::default(),
        }
    }

    /// Sets the TCP port.
    #[must_use]
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Sets the time between heartbeat ticks.
    #[must_use]
    pub fn with_heartbeat_interval(mut self, interval: Duration) -> Self {
        self.heartbeat_interval = interval;
        self
    }

    /// Sets the connect timeout.
    #[must_use]
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Sets the minimum spacing between connect attempts.
    #[must_use]
    pub fn with_reconnect_interval(mut self, interval: Duration) -> Self {
        self.reconnect_interval = interval;
        self
    }

    /// Sets the reconciler configuration.
    #[must_use]
    pub fn with_reconciler(mut self, reconciler: ReconcilerConfig) -> Self {
        self.reconciler = reconciler;
        self
    }

    /// Returns the `host:port` address.
    ///
    /// IPv6 literals are bracketed (`[fe80::1]:6668`).
    #[must_use]
    pub fn address(&self) -> String {
        let host = self.host.trim_start_matches('[').trim_end_matches(']');
        if host.contains(':') {
            format!("[{host}]:{}", self.port)
        } else {
            format!("{host}:{}", self.port)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reconciler::RetryPolicy;

    #[test]
    fn defaults() {
        let config = BulbConfig::new("bulb.local", "id");
        assert_eq!(config.port, 6668);
        assert_eq!(config.heartbeat_interval, Duration::from_secs(10));
        assert_eq!(config.connect_timeout, Duration::from_secs(5));
        assert_eq!(config.reconciler, ReconcilerConfig::default());
    }

    #[test]
    fn builder_overrides() {
        let config = BulbConfig::new("10.0.0.2", "id")
            .with_port(7000)
            .with_connect_timeout(Duration::from_millis(250))
            .with_reconnect_interval(Duration::ZERO)
            .with_reconciler(ReconcilerConfig::new().with_retry(RetryPolicy::unbounded()));

        assert_eq!(config.address(), "10.0.0.2:7000");
        assert_eq!(config.connect_timeout, Duration::from_millis(250));
        assert_eq!(config.reconnect_interval, Duration::ZERO);
        assert_eq!(config.reconciler.retry, RetryPolicy::unbounded());
    }

    #[test]
    fn ipv6_host_is_bracketed() {
        let config = BulbConfig::new("fe80::1", "id");
        assert_eq!(config.address(), "[fe80::1]:6668");
        assert!(config.address().parse::<std::net::SocketAddr>().is_ok());

        let bracketed = BulbConfig::new("[::1]", "id").with_port(7000);
        assert_eq!(bracketed.address(), "[::1]:7000");
    }
}
