//! Broker wire format.
//!
//! Outbound frames are [`SocketMessage`]s; inbound frames are JSON objects with a
//! `kind` discriminator, surfaced as [`SocketEvent`]s.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

use crate::error::HancockError;

/// Outbound command kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WatchKind {
    #[serde(rename = "watch-transfers")]
    WatchTransfers,
    #[serde(rename = "watch-transactions")]
    WatchTransactions,
    #[serde(rename = "watch-contracts-transactions")]
    WatchContractTransactions,
    #[serde(rename = "watch-contracts-events")]
    WatchContractEvents,
    #[serde(rename = "watch-contracts-deployments")]
    WatchContractDeployments,
    #[serde(rename = "unwatch-transfers")]
    UnwatchTransfers,
    #[serde(rename = "unwatch-transactions")]
    UnwatchTransactions,
    #[serde(rename = "unwatch-contracts-transactions")]
    UnwatchContractTransactions,
    #[serde(rename = "unwatch-contracts-events")]
    UnwatchContractEvents,
    #[serde(rename = "unwatch-contracts-deployments")]
    UnwatchContractDeployments,
}

impl WatchKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            WatchKind::WatchTransfers => "watch-transfers",
            WatchKind::WatchTransactions => "watch-transactions",
            WatchKind::WatchContractTransactions => "watch-contracts-transactions",
            WatchKind::WatchContractEvents => "watch-contracts-events",
            WatchKind::WatchContractDeployments => "watch-contracts-deployments",
            WatchKind::UnwatchTransfers => "unwatch-transfers",
            WatchKind::UnwatchTransactions => "unwatch-transactions",
            WatchKind::UnwatchContractTransactions => "unwatch-contracts-transactions",
            WatchKind::UnwatchContractEvents => "unwatch-contracts-events",
            WatchKind::UnwatchContractDeployments => "unwatch-contracts-deployments",
        }
    }
}

/// Entity family a subscription watches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WatchTarget {
    Transfers,
    Transactions,
    ContractTransactions,
    ContractEvents,
    ContractDeployments,
}

impl WatchTarget {
    pub fn watch_kind(&self) -> WatchKind {
        match self {
            WatchTarget::Transfers => WatchKind::WatchTransfers,
            WatchTarget::Transactions => WatchKind::WatchTransactions,
            WatchTarget::ContractTransactions => WatchKind::WatchContractTransactions,
            WatchTarget::ContractEvents => WatchKind::WatchContractEvents,
            WatchTarget::ContractDeployments => WatchKind::WatchContractDeployments,
        }
    }

    pub fn unwatch_kind(&self) -> WatchKind {
        match self {
            WatchTarget::Transfers => WatchKind::UnwatchTransfers,
            WatchTarget::Transactions => WatchKind::UnwatchTransactions,
            WatchTarget::ContractTransactions => WatchKind::UnwatchContractTransactions,
            WatchTarget::ContractEvents => WatchKind::UnwatchContractEvents,
            WatchTarget::ContractDeployments => WatchKind::UnwatchContractDeployments,
        }
    }
}

/// Confirmation level a subscription asks the broker for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SocketStatus {
    Mined,
    Pending,
}

impl SocketStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SocketStatus::Mined => "mined",
            SocketStatus::Pending => "pending",
        }
    }
}

impl fmt::Display for SocketStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outbound watch/unwatch frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SocketMessage {
    pub kind: WatchKind,
    pub body: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub consumer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<SocketStatus>,
}

/// Event kinds listeners subscribe to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// Connection established (local).
    Opened,
    /// Broker handshake completed.
    Ready,
    Tx,
    ContractTransaction,
    ContractEvent,
    ContractDeployment,
    /// Broker error frame or transport failure.
    Error,
    /// Connection terminated (local).
    Closed,
    /// Any other ledger-defined kind.
    Other(String),
}

impl EventKind {
    /// Map an inbound `kind` discriminator.
    pub fn from_wire(kind: &str) -> Self {
        match kind {
            "ready" => EventKind::Ready,
            "tx" => EventKind::Tx,
            "smartcontract-transaction" => EventKind::ContractTransaction,
            "smartcontract-event" => EventKind::ContractEvent,
            "smartcontract-deployment" => EventKind::ContractDeployment,
            "error" => EventKind::Error,
            other => EventKind::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            EventKind::Opened => "opened",
            EventKind::Ready => "ready",
            EventKind::Tx => "tx",
            EventKind::ContractTransaction => "smartcontract-transaction",
            EventKind::ContractEvent => "smartcontract-event",
            EventKind::ContractDeployment => "smartcontract-deployment",
            EventKind::Error => "error",
            EventKind::Closed => "closed",
            EventKind::Other(kind) => kind,
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Event delivered to listeners.
#[derive(Debug, Clone)]
pub enum SocketEvent {
    Opened,
    /// Inbound broker frame; `payload` is the whole parsed object.
    Message { kind: EventKind, payload: Value },
    /// Transport failure.
    Error(HancockError),
    Closed,
}

impl SocketEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            SocketEvent::Opened => EventKind::Opened,
            SocketEvent::Message { kind, .. } => kind.clone(),
            SocketEvent::Error(_) => EventKind::Error,
            SocketEvent::Closed => EventKind::Closed,
        }
    }

    /// Parsed frame, for `Message` events.
    pub fn payload(&self) -> Option<&Value> {
        match self {
            SocketEvent::Message { payload, .. } => Some(payload),
            _ => None,
        }
    }
}

/// Why an inbound frame produced no event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameRejection {
    NotJson,
    MissingKind,
}

impl FrameRejection {
    pub fn as_str(&self) -> &'static str {
        match self {
            FrameRejection::NotJson => "not_json",
            FrameRejection::MissingKind => "missing_kind",
        }
    }
}

/// Parse one inbound text frame into an event.
pub fn parse_inbound(text: &str) -> Result<SocketEvent, FrameRejection> {
    let payload: Value = serde_json::from_str(text).map_err(|_| FrameRejection::NotJson)?;
    let kind = payload
        .get("kind")
        .and_then(Value::as_str)
        .filter(|k| !k.is_empty())
        .map(EventKind::from_wire)
        .ok_or(FrameRejection::MissingKind)?;
    Ok(SocketEvent::Message { kind, payload })
}
