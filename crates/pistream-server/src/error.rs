//! Error types for the streaming server.
//!
//! [`SessionError`] covers everything that can go wrong while pushing a
//! snapshot to a peer. The session driver treats every variant as "peer
//! gone" and closes only the affected session.

/// Errors raised by a [`SnapshotSink`](crate::session::SnapshotSink).
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The snapshot could not be encoded as JSON.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The transport refused the message; the peer is gone.
    #[error("send failed: {0}")]
    Send(String),
}
