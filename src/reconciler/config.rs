// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Reconciler configuration.

/// Default number of heartbeat ticks between two status polls.
pub const DEFAULT_HEARTBEAT_BASE_FREQ: u32 = 6;

/// Configuration for a [`Reconciler`](super::Reconciler).
///
/// # Examples
///
/// ```
/// use tuya_bulb::reconciler::{ReconcilerConfig, RetryPolicy};
///
/// let config = ReconcilerConfig::new()
///     .with_heartbeat_base_freq(3)
///     .with_retry(RetryPolicy::unbounded());
///
/// assert_eq!(config.heartbeat_base_freq, 3);
/// assert_eq!(config.retry.max_attempts, None);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconcilerConfig {
    /// Number of heartbeat ticks between two status polls (at least 1).
    pub heartbeat_base_freq: u32,
    /// Retry behavior for unanswered or unconfirmed requests.
    pub retry: RetryPolicy,
}

impl ReconcilerConfig {
    /// Creates a configuration with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the number of ticks between status polls.
    ///
    /// A value of 0 is treated as 1.
    #[must_use]
    pub fn with_heartbeat_base_freq(mut self, ticks: u32) -> Self {
        self.heartbeat_base_freq = ticks.max(1);
        self
    }

    /// Sets the retry policy.
    #[must_use]
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }
}

impl Default for ReconcilerConfig {
    fn default() -> Self {
        Self {
            heartbeat_base_freq: DEFAULT_HEARTBEAT_BASE_FREQ,
            retry: RetryPolicy::default(),
        }
    }
}

/// How long a request may stay unresolved.
///
/// A request is dispatched again when a reply cannot be parsed, when the
/// reply shows the bulb has not converged, or when `silence_ticks` heartbeat
/// ticks pass without any usable reply. After `max_attempts` dispatches the
/// request is abandoned and the reconciler returns to idle.
///
/// [`RetryPolicy::unbounded`] disables both limits: requests are retried
/// only on replies and never abandoned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Ticks without a usable reply before re-sending (None = never).
    pub silence_ticks: Option<u32>,
    /// Dispatches before giving up (None = never give up).
    pub max_attempts: Option<u32>,
}

impl RetryPolicy {
    /// Creates a policy with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a policy that never times out and never gives up.
    #[must_use]
    pub const fn unbounded() -> Self {
        Self {
            silence_ticks: None,
            max_attempts: None,
        }
    }

    /// Sets the number of silent ticks before re-sending.
    #[must_use]
    pub fn with_silence_ticks(mut self, ticks: u32) -> Self {
        self.silence_ticks = Some(ticks.max(1));
        self
    }

    /// Sets the maximum number of dispatches.
    #[must_use]
    pub fn with_max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = Some(attempts.max(1));
        self
    }

    /// Returns true if a request dispatched `attempts` times may be sent again.
    #[must_use]
    pub fn allows_another(&self, attempts: u32) -> bool {
        self.max_attempts.is_none_or(|max| attempts < max)
    }

    /// Returns true if `ticks` silent ticks warrant a re-send.
    #[must_use]
    pub fn is_silent_too_long(&self, ticks: u32) -> bool {
        self.silence_ticks.is_some_and(|limit| ticks >= limit)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            silence_ticks: Some(3),
            max_attempts: Some(10),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_defaults() {
        let config = ReconcilerConfig::default();
        assert_eq!(config.heartbeat_base_freq, 6);
        assert_eq!(config.retry, RetryPolicy::default());
    }

    #[test]
    fn zero_base_freq_is_raised() {
        assert_eq!(
            ReconcilerConfig::new()
                .with_heartbeat_base_freq(0)
                .heartbeat_base_freq,
            1
        );
    }

    #[test]
    fn bounded_policy_limits_attempts() {
        let policy = RetryPolicy::new().with_max_attempts(3);
        assert!(policy.allows_another(1));
        assert!(policy.allows_another(2));
        assert!(!policy.allows_another(3));
    }

    #[test]
    fn unbounded_policy_never_stops() {
        let policy = RetryPolicy::unbounded();
        assert!(policy.allows_another(u32::MAX - 1));
        assert!(!policy.is_silent_too_long(1000));
    }

    #[test]
    fn silence_threshold() {
        let policy = RetryPolicy::new().with_silence_ticks(2);
        assert!(!policy.is_silent_too_long(1));
        assert!(policy.is_silent_too_long(2));
    }
}
