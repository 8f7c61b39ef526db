//! One broker connection per subscription.
//!
//! # Lifecycle
//! ```text
//! new() ──connect()──▶ Connecting ──handshake ok──▶ Open ──close()/peer close──▶ Closed
//!                          │                          │
//!                          └──────transport error─────┴──────────────────────▶ Errored
//! ```
//!
//! # Design Decisions
//! - Listeners can be registered before `connect()` so no early event is missed
//! - Outbound frames go through an unbounded channel, sent while holding the
//!   link lock, so caller order is wire order
//! - No reconnection: a closed or errored socket stays that way

use futures_util::{SinkExt, StreamExt};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, Weak};
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio_tungstenite::{connect_async, tungstenite::Message};
use uuid::Uuid;

use crate::error::{codes, HancockResult};
use crate::ledger::Ledger;
use crate::observability::metrics;
use crate::socket::listeners::{ListenerId, ListenerRegistry};
use crate::socket::message::{
    parse_inbound, EventKind, SocketEvent, SocketMessage, SocketStatus, WatchKind, WatchTarget,
};

/// Observable connection state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SocketState {
    Connecting,
    Open,
    Closed,
    Errored,
}

enum Link {
    Connecting,
    Open(mpsc::UnboundedSender<Message>),
    Closed,
    Errored,
}

impl Link {
    fn state(&self) -> SocketState {
        match self {
            Link::Connecting => SocketState::Connecting,
            Link::Open(_) => SocketState::Open,
            Link::Closed => SocketState::Closed,
            Link::Errored => SocketState::Errored,
        }
    }
}

struct Shared {
    id: Uuid,
    url: String,
    link: Mutex<Link>,
    listeners: ListenerRegistry,
}

impl Shared {
    fn link(&self) -> MutexGuard<'_, Link> {
        // A panicking listener must not wedge the socket.
        self.link.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Move to a terminal state unless one was already reached.
    fn finish(&self, terminal: Link) -> bool {
        let mut link = self.link();
        match *link {
            Link::Closed | Link::Errored => false,
            _ => {
                *link = terminal;
                true
            }
        }
    }

    fn emit(&self, event: SocketEvent) {
        self.listeners.emit(&event);
    }

    fn fail(&self, message: &str, cause: tokio_tungstenite::tungstenite::Error) {
        tracing::warn!(socket_id = %self.id, url = %self.url, error = %cause, "{}", message);
        if self.finish(Link::Errored) {
            self.emit(SocketEvent::Error(
                codes::SOCKET.build().with_message(message).with_extended(cause),
            ));
        }
    }

    fn handle_text(&self, text: &str) {
        match parse_inbound(text) {
            Ok(event) => {
                metrics::record_socket_frame("inbound", event.kind().as_str());
                tracing::debug!(socket_id = %self.id, kind = %event.kind(), "Frame received");
                self.emit(event);
            }
            Err(rejection) => {
                metrics::record_frame_dropped(rejection.as_str());
                tracing::warn!(
                    socket_id = %self.id,
                    reason = rejection.as_str(),
                    "Discarding unreadable broker frame"
                );
            }
        }
    }
}

/// Connection to the broker's event stream.
///
/// Dropping the handle closes the connection.
pub struct EventSocket {
    shared: Arc<Shared>,
    consumer: Option<String>,
    status: Option<SocketStatus>,
    ledger: Arc<dyn Ledger>,
    started: AtomicBool,
}

impl EventSocket {
    /// Create a socket for `url` without connecting.
    pub fn new(
        url: impl Into<String>,
        consumer: Option<String>,
        status: Option<SocketStatus>,
        ledger: Arc<dyn Ledger>,
    ) -> Self {
        let consumer = consumer.filter(|c| !c.is_empty());
        Self {
            shared: Arc::new(Shared {
                id: Uuid::new_v4(),
                url: url.into(),
                link: Mutex::new(Link::Connecting),
                listeners: ListenerRegistry::new(),
            }),
            consumer,
            status,
            ledger,
            started: AtomicBool::new(false),
        }
    }

    /// Start the connection task on the current tokio runtime. Later calls do nothing.
    ///
    /// Outside a runtime the socket moves to `Errored` and a `SOCKET` error is returned.
    pub fn connect(&self) -> HancockResult<()> {
        if self.started.swap(true, Ordering::AcqRel) {
            return Ok(());
        }
        if self.state() != SocketState::Connecting {
            return Ok(());
        }
        let handle = match Handle::try_current() {
            Ok(handle) => handle,
            Err(e) => {
                self.shared.finish(Link::Errored);
                return Err(codes::SOCKET
                    .build()
                    .with_message("No tokio runtime to drive the event socket")
                    .with_extended(e));
            }
        };
        tracing::debug!(socket_id = %self.shared.id, url = %self.shared.url, "Connecting to broker");
        handle.spawn(run(self.shared.clone()));
        Ok(())
    }

    pub fn on<F>(&self, kind: EventKind, callback: F) -> ListenerId
    where
        F: Fn(&SocketEvent) + Send + Sync + 'static,
    {
        self.shared.listeners.on(kind, callback)
    }

    pub fn once<F>(&self, kind: EventKind, callback: F) -> ListenerId
    where
        F: Fn(&SocketEvent) + Send + Sync + 'static,
    {
        self.shared.listeners.once(kind, callback)
    }

    pub fn off(&self, id: ListenerId) -> bool {
        self.shared.listeners.off(id)
    }

    /// Cloneable handle for sending watch commands, e.g. from a listener.
    pub fn sender(&self) -> SocketSender {
        SocketSender {
            shared: Arc::downgrade(&self.shared),
            consumer: self.consumer.clone(),
            status: self.status,
            ledger: self.ledger.clone(),
        }
    }

    pub fn send_message(&self, kind: WatchKind, body: Vec<String>) -> bool {
        self.sender().send_message(kind, body)
    }

    pub fn watch(&self, target: WatchTarget, entries: &[String]) -> bool {
        self.sender().watch(target, entries)
    }

    pub fn unwatch(&self, target: WatchTarget, entries: &[String]) -> bool {
        self.sender().unwatch(target, entries)
    }

    pub fn watch_transfers(&self, addresses: &[String]) -> bool {
        self.watch(WatchTarget::Transfers, addresses)
    }

    pub fn unwatch_transfers(&self, addresses: &[String]) -> bool {
        self.unwatch(WatchTarget::Transfers, addresses)
    }

    pub fn watch_transactions(&self, addresses: &[String]) -> bool {
        self.watch(WatchTarget::Transactions, addresses)
    }

    pub fn unwatch_transactions(&self, addresses: &[String]) -> bool {
        self.unwatch(WatchTarget::Transactions, addresses)
    }

    pub fn watch_contract_transactions(&self, contracts: &[String]) -> bool {
        self.watch(WatchTarget::ContractTransactions, contracts)
    }

    pub fn unwatch_contract_transactions(&self, contracts: &[String]) -> bool {
        self.unwatch(WatchTarget::ContractTransactions, contracts)
    }

    pub fn watch_contract_events(&self, contracts: &[String]) -> bool {
        self.watch(WatchTarget::ContractEvents, contracts)
    }

    pub fn unwatch_contract_events(&self, contracts: &[String]) -> bool {
        self.unwatch(WatchTarget::ContractEvents, contracts)
    }

    pub fn watch_contract_deployments(&self, addresses: &[String]) -> bool {
        self.watch(WatchTarget::ContractDeployments, addresses)
    }

    pub fn unwatch_contract_deployments(&self, addresses: &[String]) -> bool {
        self.unwatch(WatchTarget::ContractDeployments, addresses)
    }

    /// Terminate the connection. Later sends are no-ops.
    pub fn close(&self) {
        // Dropping the outbound sender tells the task to send a close frame.
        if self.shared.finish(Link::Closed) {
            tracing::debug!(socket_id = %self.shared.id, "Event socket closed");
        }
    }

    pub fn state(&self) -> SocketState {
        self.shared.link().state()
    }

    pub fn id(&self) -> Uuid {
        self.shared.id
    }

    pub fn url(&self) -> &str {
        &self.shared.url
    }

    pub fn consumer(&self) -> Option<&str> {
        self.consumer.as_deref()
    }

    pub fn status(&self) -> Option<SocketStatus> {
        self.status
    }
}

impl Drop for EventSocket {
    fn drop(&mut self) {
        self.close();
    }
}

impl std::fmt::Debug for EventSocket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventSocket")
            .field("id", &self.shared.id)
            .field("url", &self.shared.url)
            .field("state", &self.state())
            .field("consumer", &self.consumer)
            .field("status", &self.status)
            .finish()
    }
}

/// Sends watch commands over an [`EventSocket`].
///
/// Holds the socket weakly; once the socket is gone every send is a no-op.
#[derive(Clone)]
pub struct SocketSender {
    shared: Weak<Shared>,
    consumer: Option<String>,
    status: Option<SocketStatus>,
    ledger: Arc<dyn Ledger>,
}

impl SocketSender {
    /// Transmit a frame. Returns false, sending nothing, when `body` is empty or
    /// the socket is not open.
    pub fn send_message(&self, kind: WatchKind, body: Vec<String>) -> bool {
        if body.is_empty() {
            return false;
        }
        let Some(shared) = self.shared.upgrade() else {
            metrics::record_frame_dropped("socket_dropped");
            return false;
        };

        let message = SocketMessage {
            kind,
            body,
            consumer: self.consumer.clone(),
            status: self.status,
        };
        let text = match serde_json::to_string(&message) {
            Ok(text) => text,
            Err(e) => {
                tracing::error!(socket_id = %shared.id, error = %e, "Failed to encode frame");
                return false;
            }
        };

        let link = shared.link();
        let Link::Open(tx) = &*link else {
            metrics::record_frame_dropped("not_open");
            tracing::debug!(socket_id = %shared.id, kind = kind.as_str(), "Socket not open, frame skipped");
            return false;
        };
        let sent = tx.send(Message::text(text)).is_ok();
        drop(link);

        if sent {
            metrics::record_socket_frame("outbound", kind.as_str());
            tracing::debug!(socket_id = %shared.id, kind = kind.as_str(), "Frame queued");
        }
        sent
    }

    /// Normalize `entries` and send the watch command for `target`.
    pub fn watch(&self, target: WatchTarget, entries: &[String]) -> bool {
        self.send_message(target.watch_kind(), self.normalize(entries))
    }

    /// Normalize `entries` and send the unwatch command for `target`.
    pub fn unwatch(&self, target: WatchTarget, entries: &[String]) -> bool {
        self.send_message(target.unwatch_kind(), self.normalize(entries))
    }

    fn normalize(&self, entries: &[String]) -> Vec<String> {
        entries
            .iter()
            .filter(|e| !e.trim().is_empty())
            .map(|e| self.ledger.normalize_address_or_alias(e))
            .collect()
    }
}

impl std::fmt::Debug for SocketSender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SocketSender")
            .field("consumer", &self.consumer)
            .field("status", &self.status)
            .finish()
    }
}

async fn run(shared: Arc<Shared>) {
    let stream = match connect_async(shared.url.as_str()).await {
        Ok((stream, _)) => stream,
        Err(e) => {
            shared.fail("Could not connect to broker", e);
            return;
        }
    };
    let (mut write, mut read) = stream.split();
    let (tx, mut rx) = mpsc::unbounded_channel::<Message>();

    let opened = {
        let mut link = shared.link();
        if matches!(*link, Link::Connecting) {
            *link = Link::Open(tx);
            true
        } else {
            false
        }
    };
    if !opened {
        // Closed while the handshake was in flight.
        let _ = write.send(Message::Close(None)).await;
        shared.emit(SocketEvent::Closed);
        return;
    }
    tracing::info!(socket_id = %shared.id, url = %shared.url, "Event socket open");
    shared.emit(SocketEvent::Opened);

    loop {
        tokio::select! {
            outbound = rx.recv() => match outbound {
                Some(message) => {
                    if let Err(e) = write.send(message).await {
                        shared.fail("Failed to send frame", e);
                        return;
                    }
                }
                None => {
                    // Closed locally.
                    let _ = write.send(Message::Close(None)).await;
                    shared.emit(SocketEvent::Closed);
                    return;
                }
            },
            inbound = read.next() => match inbound {
                Some(Ok(Message::Text(text))) => shared.handle_text(text.as_str()),
                Some(Ok(Message::Binary(bytes))) => match std::str::from_utf8(&bytes) {
                    Ok(text) => shared.handle_text(text),
                    Err(_) => {
                        metrics::record_frame_dropped("not_utf8");
                        tracing::warn!(socket_id = %shared.id, "Discarding binary frame");
                    }
                },
                Some(Ok(Message::Close(_))) | None => {
                    tracing::info!(socket_id = %shared.id, "Broker closed the connection");
                    shared.finish(Link::Closed);
                    shared.emit(SocketEvent::Closed);
                    return;
                }
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    shared.fail("Event socket transport error", e);
                    return;
                }
            },
        }
    }
}
