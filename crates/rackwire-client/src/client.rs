//! The connection driver and public client handle.
//!
//! One tokio task owns the socket and the [`Session`]. Handles talk to it
//! over a command channel, so inbound frames, timer firings, and outbound
//! sends are serialized on a single logical thread. The task reconnects
//! forever on a fixed delay; callers never see "currently offline".

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Duration;

use futures_util::stream::SplitSink;
use futures_util::{SinkExt, StreamExt};
use serde_json::Value;
use tokio::net::TcpStream;
use tokio::sync::{broadcast, mpsc, oneshot, watch};
use tokio::time::sleep;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

use rackwire_core::{notification_topic, Config, InFrame, OutFrame};

use crate::bus::{EventBus, Notification};
use crate::session::Session;

/// Delay between reconnect attempts. Fixed: no exponential growth, no
/// jitter, no retry cap.
pub const RECONNECT_DELAY: Duration = Duration::from_secs(2);

/// Errors surfaced through a [`Reply`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ClientError {
    /// The connection was replaced before the response arrived.
    #[error("connection replaced before a reply arrived")]
    ConnectionReplaced,
    /// The client has shut down.
    #[error("client closed")]
    Closed,
}

pub(crate) type ReplyResult = Result<Option<Value>, ClientError>;

struct Call {
    method: String,
    params: Vec<Value>,
    slot: oneshot::Sender<ReplyResult>,
}

type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Handle to the transport client. Cloneable; every clone drives the same
/// connection.
#[derive(Debug, Clone)]
pub struct Client {
    commands: mpsc::UnboundedSender<Call>,
    bus: EventBus,
    connectivity: watch::Receiver<bool>,
}

impl Client {
    /// Start the client against `config`'s endpoint. Must be called from
    /// within a tokio runtime.
    ///
    /// The connection is established (and re-established after loss) in
    /// the background; calls issued before the first open are queued and
    /// replayed once the engine is reachable.
    pub fn start(config: Config) -> Client {
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (connectivity_tx, connectivity_rx) = watch::channel(false);
        let bus = EventBus::default();
        let session = Session::new(config.wire_format, bus.clone(), connectivity_tx);

        tokio::spawn(run(config, session, command_rx));

        Client {
            commands: command_tx,
            bus,
            connectivity: connectivity_rx,
        }
    }

    /// Issue a call to the engine.
    ///
    /// Methods on the reply-required list resolve with `Some(result)` once
    /// the correlated response arrives; every other method resolves with
    /// `None` when the call is transmitted. Calls issued while the
    /// connection is down are queued silently and replayed on the next
    /// open — being offline is never an error.
    pub fn send(&self, method: impl Into<String>, params: Vec<Value>) -> Reply {
        let (slot, rx) = oneshot::channel();
        let call = Call {
            method: method.into(),
            params,
            slot,
        };
        match self.commands.send(call) {
            Ok(()) => Reply(ReplyInner::Pending(rx)),
            Err(_) => Reply(ReplyInner::Closed),
        }
    }

    /// Subscribe to engine notifications for one method, e.g. `"state"`.
    /// Every subscriber of a method receives every matching message.
    pub fn notifications(&self, method: &str) -> broadcast::Receiver<Notification> {
        self.bus.subscribe(&notification_topic(method))
    }

    /// Watch connectivity: `true` while the connection is open. Fires on
    /// every Open/Closed transition.
    pub fn connectivity(&self) -> watch::Receiver<bool> {
        self.connectivity.clone()
    }
}

/// Future returned by [`Client::send`]. Resolves exactly once; a request
/// stranded by a connection replacement resolves with
/// [`ClientError::ConnectionReplaced`].
#[derive(Debug)]
pub struct Reply(ReplyInner);

#[derive(Debug)]
enum ReplyInner {
    Pending(oneshot::Receiver<ReplyResult>),
    Closed,
}

impl Future for Reply {
    type Output = ReplyResult;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match &mut self.get_mut().0 {
            ReplyInner::Pending(rx) => Pin::new(rx).poll(cx).map(|received| match received {
                Ok(result) => result,
                Err(_) => Err(ClientError::Closed),
            }),
            ReplyInner::Closed => Poll::Ready(Err(ClientError::Closed)),
        }
    }
}

/// Connection loop: connect, drive, close, wait, repeat. Returns only
/// when every [`Client`] handle is gone.
async fn run(config: Config, mut session: Session, mut commands: mpsc::UnboundedReceiver<Call>) {
    let url = config.url();
    loop {
        session.connecting();
        tracing::debug!(url = %url, "connecting");

        let connect = connect_async(url.clone());
        tokio::pin!(connect);
        let socket = loop {
            tokio::select! {
                connected = &mut connect => match connected {
                    Ok((socket, _)) => break Some(socket),
                    Err(e) => {
                        tracing::warn!(error = %e, "connect failed");
                        break None;
                    }
                },
                command = commands.recv() => match command {
                    Some(call) => {
                        // Not open yet, so the session queues the call.
                        let _ = session.call(call.method, call.params, call.slot);
                    }
                    None => return,
                },
            }
        };

        if let Some(socket) = socket {
            if drive(&mut session, &mut commands, socket).await {
                return;
            }
        }
        // A failed connect counts as a close: connectivity drops and the
        // reconnect timer is armed, same as a runtime loss.
        session.connection_closed();

        tracing::debug!(delay = ?RECONNECT_DELAY, "reconnecting after delay");
        let delay = sleep(RECONNECT_DELAY);
        tokio::pin!(delay);
        loop {
            tokio::select! {
                () = &mut delay => break,
                command = commands.recv() => match command {
                    Some(call) => {
                        let _ = session.call(call.method, call.params, call.slot);
                    }
                    None => return,
                },
            }
        }
    }
}

/// Pump one open connection until it dies. Returns `true` when the client
/// should shut down because every handle is gone.
async fn drive(
    session: &mut Session,
    commands: &mut mpsc::UnboundedReceiver<Call>,
    socket: Socket,
) -> bool {
    let (mut sink, mut stream) = socket.split();
    tracing::info!("connected");

    // Subscription call and queue replay go out before any new command is
    // accepted.
    for frame in session.connection_opened() {
        if let Err(e) = send_frame(&mut sink, frame).await {
            tracing::warn!(error = %e, "send failed during replay");
            return false;
        }
    }

    loop {
        tokio::select! {
            command = commands.recv() => {
                let Some(call) = command else { return true };
                if let Some(frame) = session.call(call.method, call.params, call.slot) {
                    if let Err(e) = send_frame(&mut sink, frame).await {
                        tracing::warn!(error = %e, "send failed");
                        return false;
                    }
                }
            }
            inbound = stream.next() => if route_inbound(session, inbound) {
                return false;
            },
        }
    }
}

/// Handle one item from the socket stream. Returns `true` when the
/// connection is finished and the caller should tear it down.
fn route_inbound(
    session: &mut Session,
    inbound: Option<Result<Message, tokio_tungstenite::tungstenite::Error>>,
) -> bool {
    match inbound {
        Some(Ok(Message::Text(text))) => {
            session.frame_received(InFrame::Text(text.to_string()));
            false
        }
        Some(Ok(Message::Binary(bytes))) => {
            session.frame_received(InFrame::Binary(bytes.to_vec()));
            false
        }
        Some(Ok(Message::Close(_))) => {
            tracing::info!("engine closed the connection");
            true
        }
        // Ping/pong are answered by the websocket layer.
        Some(Ok(_)) => false,
        Some(Err(e)) => {
            // Returning tears the socket down before the reconnect timer
            // is armed.
            tracing::warn!(error = %e, "socket error");
            true
        }
        None => {
            tracing::info!("connection lost");
            true
        }
    }
}

async fn send_frame(
    sink: &mut SplitSink<Socket, Message>,
    frame: OutFrame,
) -> Result<(), tokio_tungstenite::tungstenite::Error> {
    let message = match frame {
        OutFrame::Text(text) => Message::Text(text.into()),
        OutFrame::Binary(bytes) => Message::Binary(bytes.into()),
    };
    sink.send(message).await
}
