//! Transport client for a rackwire audio-processing engine.
//!
//! The engine speaks a JSON-RPC-2.0-flavored protocol over a persistent
//! WebSocket. This crate owns that socket: it correlates requests with
//! their responses, queues calls issued while offline, broadcasts
//! server-pushed notifications, and reconnects forever on a fixed delay.
//!
//! Collaborators hold a [`Client`] handle: [`Client::send`] issues calls,
//! [`Client::notifications`] subscribes to named engine events, and
//! [`Client::connectivity`] observes Open/Closed transitions.

mod bus;
mod catalog;
mod client;
mod session;

pub use bus::Notification;
pub use catalog::{banks, visible_units, Bank, UnitInfo};
pub use client::{Client, ClientError, Reply, RECONNECT_DELAY};
pub use rackwire_core::{Config, WireFormat};
