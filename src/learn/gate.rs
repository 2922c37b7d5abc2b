//! Access gate - content that needs a connected wallet

use crate::session::SessionSnapshot;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AccessDenied {
    #[error("connect your wallet to access this page")]
    NotConnected,
    #[error("wallet connection in progress")]
    Connecting,
}

/// The connected address, or why the page should show the connect prompt.
pub fn require_connected(snapshot: &SessionSnapshot) -> Result<&str, AccessDenied> {
    match snapshot.address.as_deref() {
        Some(address) if snapshot.is_connected() => Ok(address),
        _ if snapshot.is_connecting() => Err(AccessDenied::Connecting),
        _ => Err(AccessDenied::NotConnected),
    }
}
