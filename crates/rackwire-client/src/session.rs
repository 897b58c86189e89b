//! Connection-independent client state.
//!
//! [`Session`] is the single-threaded core of the client: the
//! pending-request table, the offline queue, the correlation-id counter,
//! and inbound routing. It holds no socket — the driver in [`crate::client`]
//! feeds it events and transmits the frames it returns, which keeps the
//! correlation and queueing behavior testable without a transport.

use std::collections::{HashMap, VecDeque};

use serde_json::Value;
use tokio::sync::{oneshot, watch};

use rackwire_core::{
    encode_frame, frame_payloads, notification_topic, requires_reply, ConnectionState, InFrame,
    Inbound, OutFrame, Request, WireFormat, LISTEN_METHOD, SUBSCRIBE_TOPICS,
};

use crate::bus::EventBus;
use crate::client::{ClientError, ReplyResult};

type ReplySlot = oneshot::Sender<ReplyResult>;

struct QueuedCall {
    method: String,
    params: Vec<Value>,
    slot: ReplySlot,
}

pub(crate) struct Session {
    state: ConnectionState,
    format: WireFormat,
    /// Next correlation id. Monotonic for the client's lifetime; never
    /// reset on reconnect.
    next_id: u64,
    pending: HashMap<u64, ReplySlot>,
    queue: VecDeque<QueuedCall>,
    bus: EventBus,
    connectivity: watch::Sender<bool>,
}

impl Session {
    pub(crate) fn new(format: WireFormat, bus: EventBus, connectivity: watch::Sender<bool>) -> Self {
        Self {
            state: ConnectionState::Connecting,
            format,
            next_id: 1,
            pending: HashMap::new(),
            queue: VecDeque::new(),
            bus,
            connectivity,
        }
    }

    /// A new connection attempt is starting.
    pub(crate) fn connecting(&mut self) {
        self.state = ConnectionState::Connecting;
    }

    /// Issue a call. Returns the frame to transmit, or `None` if the call
    /// was queued because the connection is not open.
    pub(crate) fn call(
        &mut self,
        method: String,
        params: Vec<Value>,
        slot: ReplySlot,
    ) -> Option<OutFrame> {
        if self.state != ConnectionState::Open {
            tracing::debug!(method = %method, "queued while offline");
            self.queue.push_back(QueuedCall {
                method,
                params,
                slot,
            });
            return None;
        }
        self.transmit(method, params, Some(slot))
    }

    /// The connection just opened: announce the subscription topics, then
    /// replay the offline queue in the order the calls were issued. Every
    /// returned frame must be transmitted before any new call is accepted.
    pub(crate) fn connection_opened(&mut self) -> Vec<OutFrame> {
        self.state = ConnectionState::Open;
        self.connectivity.send_replace(true);

        let mut frames = Vec::with_capacity(self.queue.len() + 1);
        let topics = SUBSCRIBE_TOPICS.iter().map(|t| Value::from(*t)).collect();
        frames.extend(self.transmit(LISTEN_METHOD.to_string(), topics, None));

        if !self.queue.is_empty() {
            tracing::debug!(queued = self.queue.len(), "replaying offline queue");
        }
        while let Some(call) = self.queue.pop_front() {
            frames.extend(self.transmit(call.method, call.params, Some(call.slot)));
        }
        frames
    }

    /// The connection is gone, cleanly or not. Idempotent: a second close
    /// (e.g. an error followed by the close event) is a no-op.
    pub(crate) fn connection_closed(&mut self) {
        if self.state == ConnectionState::Closed {
            return;
        }
        self.state = ConnectionState::Closed;
        self.connectivity.send_replace(false);

        if !self.pending.is_empty() {
            tracing::debug!(
                stranded = self.pending.len(),
                "rejecting requests stranded by connection loss"
            );
        }
        for (_, slot) in self.pending.drain() {
            let _ = slot.send(Err(ClientError::ConnectionReplaced));
        }
    }

    /// Route one inbound frame. Malformed payloads are logged and skipped
    /// without affecting their siblings.
    pub(crate) fn frame_received(&mut self, frame: InFrame) {
        let payloads = match frame_payloads(frame) {
            Ok(payloads) => payloads,
            Err(e) => {
                tracing::warn!(error = %e, "discarding undecodable frame");
                return;
            }
        };

        for payload in payloads {
            let value: Value = match serde_json::from_str(&payload) {
                Ok(value) => value,
                Err(e) => {
                    tracing::warn!(error = %e, "discarding malformed payload");
                    continue;
                }
            };
            tracing::trace!(payload = %value, "rx");

            match Inbound::classify(value) {
                Some(Inbound::Response { id, result }) => match self.pending.remove(&id) {
                    Some(slot) => {
                        let _ = slot.send(Ok(Some(result)));
                    }
                    None => tracing::debug!(id, "response without a pending request"),
                },
                Some(Inbound::Notification { method, message }) => {
                    self.bus.publish(&notification_topic(&method), message);
                }
                None => tracing::debug!("payload with neither id nor method"),
            }
        }
    }

    /// Encode and account for one outbound call: allocate a correlation id
    /// and register the pending slot for reply-required methods, resolve
    /// the slot immediately for fire-and-forget ones.
    fn transmit(
        &mut self,
        method: String,
        params: Vec<Value>,
        slot: Option<ReplySlot>,
    ) -> Option<OutFrame> {
        let id = requires_reply(&method).then(|| self.fresh_id());
        let request = Request::new(method, params, id);
        let json = match serde_json::to_string(&request) {
            Ok(json) => json,
            Err(e) => {
                tracing::warn!(method = %request.method, error = %e, "dropping unserializable request");
                return None;
            }
        };
        tracing::debug!(method = %request.method, id = ?id, "tx");

        match (id, slot) {
            (Some(id), Some(slot)) => {
                self.pending.insert(id, slot);
            }
            (None, Some(slot)) => {
                let _ = slot.send(Ok(None));
            }
            (_, None) => {}
        }
        Some(encode_frame(self.format, json))
    }

    fn fresh_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }
}
