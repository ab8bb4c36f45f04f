//! `WebSocket` handler for the pi stream.
//!
//! Clients connect to `GET /ws` and receive one JSON-encoded
//! [`Snapshot`] per series term. The socket is split: the driver owns the
//! sending half, and a reader task watches the receiving half so that a
//! Close frame or a dropped connection cancels the session at its next
//! loop boundary. Client payloads are ignored.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket};
use axum::extract::{State, WebSocketUpgrade};
use axum::response::IntoResponse;
use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use pistream_core::Snapshot;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::error::SessionError;
use crate::session::{SnapshotSink, run_session};
use crate::state::AppState;

/// Upgrade an HTTP request to a `WebSocket` connection and start a session.
///
/// # Route
///
/// `GET /ws`
pub async fn ws_stream(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_ws(socket, state))
}

/// Sending half of a client socket.
pub struct WsSink {
    sender: SplitSink<WebSocket, Message>,
}

impl SnapshotSink for WsSink {
    async fn send(&mut self, snapshot: &Snapshot) -> Result<(), SessionError> {
        let json = serde_json::to_string(snapshot)?;
        self.sender
            .send(Message::Text(json.into()))
            .await
            .map_err(|e| SessionError::Send(e.to_string()))
    }
}

/// Run one session over an upgraded socket and release it afterwards.
async fn handle_ws(socket: WebSocket, state: Arc<AppState>) {
    let guard = state.begin_session();
    let session = guard.id();
    info!(
        session,
        active_sessions = state.active_sessions(),
        "Client connected"
    );

    let (sender, receiver) = socket.split();
    let cancel = state.shutdown.child_token();
    let reader = tokio::spawn(watch_peer(session, receiver, cancel.clone()));

    let mut sink = WsSink { sender };
    let summary = run_session(session, &mut sink, &state.settings, &cancel).await;

    cancel.cancel();
    reader.abort();
    if let Err(e) = sink.sender.close().await {
        debug!(session, error = %e, "WebSocket close failed");
    }

    summary.log();
    drop(guard);
    info!(
        session,
        active_sessions = state.active_sessions(),
        "Client disconnected"
    );
}

/// Cancel the session once the peer closes, errors, or goes away.
async fn watch_peer(session: u64, mut receiver: SplitStream<WebSocket>, cancel: CancellationToken) {
    loop {
        tokio::select! {
            () = cancel.cancelled() => return,
            msg = receiver.next() => match msg {
                Some(Ok(Message::Close(_))) | None => {
                    debug!(session, "WebSocket client closed the connection");
                    cancel.cancel();
                    return;
                }
                Some(Err(e)) => {
                    debug!(session, error = %e, "WebSocket receive error");
                    cancel.cancel();
                    return;
                }
                Some(Ok(_)) => {
                    // Client payloads carry no meaning for the stream.
                }
            },
        }
    }
}
