//! Core types for the rackwire engine control protocol.
//!
//! This crate provides the protocol primitives: the JSON-RPC-style wire
//! envelope, frame encoding, the static method and topic tables, and the
//! startup configuration. It performs no I/O; the transport client lives
//! in `rackwire-client`.

mod config;
mod envelope;
mod framing;
mod methods;

pub use config::{Config, DEFAULT_HOST, DEFAULT_PORT};
pub use envelope::{Inbound, Request, PROTOCOL_VERSION};
pub use framing::{encode_frame, frame_payloads, FrameDecodeError, InFrame, OutFrame, WireFormat};
pub use methods::{
    notification_topic, requires_reply, LISTEN_METHOD, NOTIFY_NAMESPACE, SUBSCRIBE_TOPICS,
};

/// Connection lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// Establishing connection.
    Connecting,
    /// Normal operation.
    Open,
    /// Connection lost; a replacement will be attempted.
    Closed,
}
