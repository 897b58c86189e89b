//! Notification fan-out.
//!
//! Inbound messages that do not correlate to a pending request are
//! broadcast by event name. Each name gets its own channel, so subscribers
//! of one event never observe another's traffic.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use serde_json::Value;
use tokio::sync::broadcast;

const CHANNEL_CAPACITY: usize = 64;

/// A server-pushed message delivered to subscribers.
#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    /// Namespaced event name, e.g. `engine::state`.
    pub event: String,
    /// The full decoded message as received.
    pub message: Value,
}

/// Registry of per-event broadcast channels, shared between the client
/// task and its handles.
#[derive(Debug, Clone, Default)]
pub(crate) struct EventBus {
    channels: Arc<Mutex<HashMap<String, broadcast::Sender<Notification>>>>,
}

impl EventBus {
    pub(crate) fn subscribe(&self, event: &str) -> broadcast::Receiver<Notification> {
        let mut channels = self.lock();
        channels
            .entry(event.to_string())
            .or_insert_with(|| broadcast::channel(CHANNEL_CAPACITY).0)
            .subscribe()
    }

    /// Deliver a message to every subscriber of `event`. Messages for
    /// events nobody subscribed to are dropped.
    pub(crate) fn publish(&self, event: &str, message: Value) {
        let mut channels = self.lock();
        let Some(sender) = channels.get(event) else {
            return;
        };
        let notification = Notification {
            event: event.to_string(),
            message,
        };
        if sender.send(notification).is_err() {
            // Every receiver is gone; drop the channel so the entry does
            // not accumulate.
            channels.remove(event);
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, broadcast::Sender<Notification>>> {
        self.channels.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
