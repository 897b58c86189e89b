//! Wire envelope types.
//!
//! Outbound requests are JSON-RPC-2.0-flavored. Inbound traffic is looser:
//! the engine replies with bare `{id, result}` objects and pushes
//! notifications as `{method, ...}` objects, so inbound payloads are
//! classified for routing rather than strictly typed.

use serde::Serialize;
use serde_json::Value;

/// Version marker carried by every outbound request.
pub const PROTOCOL_VERSION: &str = "2.0";

/// Outbound request envelope.
///
/// The `id` is present only for methods the engine answers with a
/// correlated response; fire-and-forget calls omit it entirely.
#[derive(Debug, Clone, Serialize)]
pub struct Request {
    pub jsonrpc: &'static str,
    pub method: String,
    pub params: Vec<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
}

impl Request {
    pub fn new(method: impl Into<String>, params: Vec<Value>, id: Option<u64>) -> Self {
        Self {
            jsonrpc: PROTOCOL_VERSION,
            method: method.into(),
            params,
            id,
        }
    }
}

/// A decoded inbound payload, classified for routing.
#[derive(Debug, Clone, PartialEq)]
pub enum Inbound {
    /// Reply to a request we issued: `{id, result}`.
    Response { id: u64, result: Value },
    /// Server-pushed notification: `{method, ...}`. The full message is
    /// retained for delivery to subscribers.
    Notification { method: String, message: Value },
}

impl Inbound {
    /// Classify one decoded JSON payload.
    ///
    /// A payload with an integer `id` is a response, whatever else it
    /// carries. A payload without one routes by its `method`. Payloads
    /// with neither have no routing destination and yield `None`.
    pub fn classify(value: Value) -> Option<Inbound> {
        if let Some(id) = value.get("id").and_then(Value::as_u64) {
            let result = value.get("result").cloned().unwrap_or(Value::Null);
            return Some(Inbound::Response { id, result });
        }
        let method = value.get("method").and_then(Value::as_str)?.to_string();
        Some(Inbound::Notification {
            method,
            message: value,
        })
    }
}
