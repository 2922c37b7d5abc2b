//! Session state - the observable connection record

use serde::{Deserialize, Serialize};

pub const ZERO_BALANCE: &str = "0";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionStatus {
    #[default]
    Disconnected,
    Connecting,
    Connected,
}

impl ConnectionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConnectionStatus::Disconnected => "disconnected",
            ConnectionStatus::Connecting => "connecting",
            ConnectionStatus::Connected => "connected",
        }
    }
}

/// Address and balance only exist while connected.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub(crate) enum Connection {
    #[default]
    Disconnected,
    Connecting,
    Connected { address: String, balance: String },
}

impl Connection {
    pub(crate) fn connected(address: impl Into<String>) -> Self {
        Connection::Connected { address: address.into(), balance: ZERO_BALANCE.into() }
    }

    pub(crate) fn address(&self) -> Option<&str> {
        match self {
            Connection::Connected { address, .. } => Some(address),
            _ => None,
        }
    }

    pub(crate) fn snapshot(&self) -> SessionSnapshot {
        match self {
            Connection::Disconnected => SessionSnapshot::default(),
            Connection::Connecting => SessionSnapshot { status: ConnectionStatus::Connecting, ..Default::default() },
            Connection::Connected { address, balance } => SessionSnapshot {
                status: ConnectionStatus::Connected,
                address: Some(address.clone()),
                balance: balance.clone(),
            },
        }
    }
}

/// What consumers read: `{status, address, balance}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub status: ConnectionStatus,
    pub address: Option<String>,
    pub balance: String,
}

impl Default for SessionSnapshot {
    fn default() -> Self {
        Self { status: ConnectionStatus::Disconnected, address: None, balance: ZERO_BALANCE.into() }
    }
}

impl SessionSnapshot {
    pub fn is_connected(&self) -> bool { self.status == ConnectionStatus::Connected }
    pub fn is_connecting(&self) -> bool { self.status == ConnectionStatus::Connecting }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshots_hold_invariants() {
        let disconnected = Connection::Disconnected.snapshot();
        assert_eq!(disconnected, SessionSnapshot::default());
        assert_eq!(disconnected.address, None);
        assert_eq!(disconnected.balance, "0");

        let connecting = Connection::Connecting.snapshot();
        assert!(connecting.is_connecting());
        assert_eq!(connecting.address, None);
        assert_eq!(connecting.balance, "0");

        let connected = Connection::connected("0xabc").snapshot();
        assert!(connected.is_connected());
        assert_eq!(connected.address.as_deref(), Some("0xabc"));
    }

    #[test]
    fn status_serializes_lowercase() {
        let json = serde_json::to_value(SessionSnapshot::default()).unwrap();
        assert_eq!(json["status"], "disconnected");
        assert_eq!(ConnectionStatus::Connecting.as_str(), "connecting");
    }
}
