//! HTTP and `WebSocket` surface for pistream.
//!
//! This crate provides an Axum server that exposes:
//!
//! - **`WebSocket` endpoint** (`/ws`) that streams successive approximations
//!   of pi, one JSON message per series term, to each connected client
//! - **Bootstrap page** (`GET /`) that connects to `/ws` and renders the
//!   streamed value
//! - **Health endpoint** (`GET /api/health`) reporting live sessions
//!
//! # Architecture
//!
//! Every connection gets its own [`SeriesState`](pistream_core::SeriesState),
//! owned by the session driver in [`session`] and never shared. The heavy
//! arithmetic of each step runs on Tokio's blocking pool, so a session only
//! suspends while a step is computed, while a message is being sent, or
//! during the pacing pause. Server shutdown is a
//! [`CancellationToken`](tokio_util::sync::CancellationToken) that every
//! session observes at its next loop boundary.

pub mod error;
pub mod handlers;
pub mod router;
pub mod server;
pub mod session;
pub mod startup;
pub mod state;
pub mod ws;

// Re-export primary types for convenience.
pub use router::build_router;
pub use server::{ServerConfig, ServerError, start_server};
pub use session::{SessionEnd, SessionSettings, SessionSummary, SnapshotSink, run_session};
pub use startup::spawn_server;
pub use state::AppState;
