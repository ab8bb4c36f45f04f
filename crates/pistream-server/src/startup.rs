//! Background startup helper.
//!
//! [`spawn_server`] runs the server on its own Tokio task so a caller (an
//! embedding binary or a test) can keep working alongside it and stop it
//! by cancelling [`AppState::shutdown`].

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use crate::server::{ServerError, serve};
use crate::state::AppState;

/// Spawn the server on an already bound listener.
///
/// Returns the bound address (useful when binding port 0) and the task
/// handle, which completes after graceful shutdown.
///
/// # Errors
///
/// Returns [`ServerError::Bind`] if the listener has no local address.
pub fn spawn_server(
    listener: TcpListener,
    state: Arc<AppState>,
) -> Result<(SocketAddr, JoinHandle<()>), ServerError> {
    let addr = listener
        .local_addr()
        .map_err(|e| ServerError::Bind(format!("no local address: {e}")))?;

    let handle = tokio::spawn(async move {
        if let Err(e) = serve(listener, state).await {
            tracing::error!(error = %e, "pistream server exited with error");
        }
    });

    tracing::info!(%addr, "pistream server spawned on background task");

    Ok((addr, handle))
}
