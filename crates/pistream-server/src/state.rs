//! Shared application state for the streaming server.
//!
//! [`AppState`] holds only what is common to all sessions: the session
//! settings derived from configuration, the server-wide shutdown token, and
//! counters for live and total sessions. Series state is never stored here;
//! each session owns its own.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use pistream_core::StreamConfig;
use tokio_util::sync::CancellationToken;

use crate::session::SessionSettings;

/// Shared state for the Axum application.
///
/// Wrapped in [`Arc`] and injected via Axum's `State` extractor.
#[derive(Debug)]
pub struct AppState {
    /// Settings every new session starts from.
    pub settings: SessionSettings,
    /// Cancelled when the server shuts down. Sessions derive child tokens.
    pub shutdown: CancellationToken,
    /// Sessions currently running.
    active: AtomicU64,
    /// Identifier for the next session.
    next_id: AtomicU64,
}

impl AppState {
    /// Create state from the full configuration.
    pub fn new(config: &StreamConfig) -> Self {
        Self::with_settings(SessionSettings::from_config(config))
    }

    /// Create state from explicit session settings.
    pub fn with_settings(settings: SessionSettings) -> Self {
        Self {
            settings,
            shutdown: CancellationToken::new(),
            active: AtomicU64::new(0),
            next_id: AtomicU64::new(1),
        }
    }

    /// Register a new session. The returned guard unregisters it on drop.
    pub fn begin_session(self: &Arc<Self>) -> SessionGuard {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.active.fetch_add(1, Ordering::AcqRel);
        SessionGuard {
            state: Arc::clone(self),
            id,
        }
    }

    /// Number of sessions currently running.
    pub fn active_sessions(&self) -> u64 {
        self.active.load(Ordering::Acquire)
    }

    /// Number of sessions started since the server came up.
    pub fn total_sessions(&self) -> u64 {
        self.next_id.load(Ordering::Relaxed).saturating_sub(1)
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(&StreamConfig::default())
    }
}

/// Registration of one live session.
#[derive(Debug)]
pub struct SessionGuard {
    state: Arc<AppState>,
    id: u64,
}

impl SessionGuard {
    /// Identifier of this session, unique for the server's lifetime.
    pub const fn id(&self) -> u64 {
        self.id
    }
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        self.state.active.fetch_sub(1, Ordering::AcqRel);
    }
}
