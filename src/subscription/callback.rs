// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Callback management for presentation updates.
//!
//! - [`SubscriptionId`] - Handle for unsubscribing
//! - [`CallbackRegistry`] - Report and change subscribers

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::{Mutex, RwLock};

use crate::state::Presentation;
use crate::types::Dimmer;

use super::PresentationSink;

/// Handle returned when subscribing, used to unsubscribe.
///
/// Handles are never reused by the registry that issued them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SubscriptionId(u64);

impl SubscriptionId {
    /// Returns the numeric handle.
    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "sub#{}", self.0)
    }
}

/// When a subscriber is invoked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Trigger {
    Report,
    Change,
}

#[derive(Clone)]
struct Subscriber {
    trigger: Trigger,
    callback: Arc<dyn Fn(Presentation) + Send + Sync>,
}

/// Registry of presentation callbacks.
///
/// Two kinds of subscription are offered:
///
/// - [`on_report`](Self::on_report) fires for every parsed status, even if
///   nothing changed
/// - [`on_change`](Self::on_change) fires only when the presentation differs
///   from the previous one
///
/// Subscribers run in subscription order on the thread that delivers the
/// update, with no lock held.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use std::sync::atomic::{AtomicUsize, Ordering};
/// use tuya_bulb::subscription::{CallbackRegistry, PresentationSink};
/// use tuya_bulb::types::Dimmer;
///
/// let registry = CallbackRegistry::new();
/// let changes = Arc::new(AtomicUsize::new(0));
/// let counter = Arc::clone(&changes);
/// registry.on_change(move |_| {
///     counter.fetch_add(1, Ordering::SeqCst);
/// });
///
/// registry.notify_state(true, Dimmer::MAX);
/// registry.notify_state(true, Dimmer::MAX);
/// assert_eq!(changes.load(Ordering::SeqCst), 1);
/// ```
#[derive(Default)]
pub struct CallbackRegistry {
    issued: AtomicU64,
    subscribers: RwLock<BTreeMap<SubscriptionId, Subscriber>>,
    last: Mutex<Option<Presentation>>,
}

impl CallbackRegistry {
    /// Creates a registry with no subscribers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn subscribe<F>(&self, trigger: Trigger, callback: F) -> SubscriptionId
    where
        F: Fn(Presentation) + Send + Sync + 'static,
    {
        let handle = SubscriptionId(self.issued.fetch_add(1, Ordering::Relaxed) + 1);
        let subscriber = Subscriber {
            trigger,
            callback: Arc::new(callback),
        };
        self.subscribers.write().insert(handle, subscriber);
        handle
    }

    /// Registers a callback for every reported presentation.
    pub fn on_report<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(Presentation) + Send + Sync + 'static,
    {
        self.subscribe(Trigger::Report, callback)
    }

    /// Registers a callback for presentation changes.
    pub fn on_change<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(Presentation) + Send + Sync + 'static,
    {
        self.subscribe(Trigger::Change, callback)
    }

    /// Drops a subscriber. Returns false for an unknown handle.
    pub fn unsubscribe(&self, handle: SubscriptionId) -> bool {
        self.subscribers.write().remove(&handle).is_some()
    }

    /// Drops every subscriber.
    pub fn clear(&self) {
        self.subscribers.write().clear();
    }

    /// Returns the last presentation dispatched, if any.
    #[must_use]
    pub fn last(&self) -> Option<Presentation> {
        *self.last.lock()
    }

    /// Returns the number of subscribers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.subscribers.read().len()
    }

    /// Returns true when nobody is subscribed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.subscribers.read().is_empty()
    }

    /// Dispatches a presentation to the registered callbacks.
    pub fn dispatch(&self, presentation: Presentation) {
        let previous = self.last.lock().replace(presentation);
        let changed = previous != Some(presentation);
        if changed {
            tracing::debug!(on = presentation.on, level = %presentation.level, "Presentation changed");
        }

        // Snapshot so callbacks may (un)subscribe without deadlocking
        let due: Vec<Subscriber> = self
            .subscribers
            .read()
            .values()
            .filter(|s| changed || s.trigger == Trigger::Report)
            .cloned()
            .collect();
        for subscriber in due {
            (subscriber.callback)(presentation);
        }
    }
}

impl std::fmt::Debug for CallbackRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CallbackRegistry")
            .field("subscribers", &self.len())
            .field("last", &self.last())
            .finish_non_exhaustive()
    }
}

impl PresentationSink for CallbackRegistry {
    fn notify_state(&self, is_on: bool, level: Dimmer) {
        let presentation = if is_on {
            Presentation::on(level)
        } else {
            Presentation::off()
        };
        self.dispatch(presentation);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    fn counter() -> (Arc<AtomicUsize>, impl Fn(Presentation) + Send + Sync + 'static) {
        let count = Arc::new(AtomicUsize::new(0));
        let inner = Arc::clone(&count);
        (count, move |_| {
            inner.fetch_add(1, Ordering::SeqCst);
        })
    }

    #[test]
    fn subscription_ids_are_unique() {
        let registry = CallbackRegistry::new();
        let a = registry.on_report(|_| {});
        let b = registry.on_change(|_| {});
        assert_ne!(a, b);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn report_fires_every_time() {
        let registry = CallbackRegistry::new();
        let (count, callback) = counter();
        registry.on_report(callback);

        registry.notify_state(false, Dimmer::OFF);
        registry.notify_state(false, Dimmer::OFF);
        assert_eq!(count.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn change_fires_only_on_difference() {
        let registry = CallbackRegistry::new();
        let (count, callback) = counter();
        registry.on_change(callback);

        registry.notify_state(true, Dimmer::clamped(50));
        registry.notify_state(true, Dimmer::clamped(50));
        registry.notify_state(true, Dimmer::clamped(51));
        assert_eq!(count.load(Ordering::SeqCst), 2);
        assert_eq!(registry.last(), Some(Presentation::on(Dimmer::clamped(51))));
    }

    #[test]
    fn off_reports_zero_level() {
        let registry = CallbackRegistry::new();
        registry.notify_state(false, Dimmer::MAX);
        assert_eq!(registry.last(), Some(Presentation::off()));
    }

    #[test]
    fn unsubscribe_stops_dispatch() {
        let registry = CallbackRegistry::new();
        let (count, callback) = counter();
        let id = registry.on_report(callback);

        assert!(registry.unsubscribe(id));
        assert!(!registry.unsubscribe(id));
        registry.notify_state(true, Dimmer::MAX);
        assert_eq!(count.load(Ordering::SeqCst), 0);
        assert!(registry.is_empty());
    }

    #[test]
    fn clear_drops_all_subscribers() {
        let registry = CallbackRegistry::default();
        registry.on_report(|_| {});
        registry.on_change(|_| {});
        registry.clear();
        assert!(registry.is_empty());
    }

    #[test]
    fn handles_count_up_and_display() {
        let registry = CallbackRegistry::new();
        let first = registry.on_change(|_| {});
        let second = registry.on_change(|_| {});
        assert_eq!((first.value(), second.value()), (1, 2));
        assert_eq!(second.to_string(), "sub#2");
    }

    #[test]
    fn mixed_subscribers_on_repeat() {
        let registry = CallbackRegistry::new();
        let (reports, on_report) = counter();
        let (changes, on_change) = counter();
        registry.on_report(on_report);
        registry.on_change(on_change);

        for _ in 0..3 {
            registry.notify_state(true, Dimmer::MAX);
        }
        assert_eq!(reports.load(Ordering::SeqCst), 3);
        assert_eq!(changes.load(Ordering::SeqCst), 1);
    }
}
