//! Streaming session driver.
//!
//! [`run_session`] owns one connection's series computation from start to
//! finish:
//!
//! 1. **Running** -- add one term (on the blocking pool), build a
//!    [`Snapshot`], send it, pause on the configured cadence, repeat.
//! 2. **Closing** -- entered exactly once, when a send fails, when the
//!    cancellation token fires, or when a step fails internally.
//! 3. **Terminated** -- the [`SessionSummary`] is returned; no further
//!    steps run.
//!
//! There is no natural end: the series has no last term, so absent a
//! disconnect or cancellation the loop runs forever.

use std::future::Future;

use pistream_core::config::{LoggingConfig, SeriesConfig};
use pistream_core::progress::{self, log_step};
use pistream_core::{Cadence, SeriesState, Snapshot, SnapshotPolicy, StreamConfig};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use crate::error::SessionError;

/// Destination for a session's snapshots.
///
/// Any error from [`send`](SnapshotSink::send) is read as "peer
/// disconnected" and ends the session; sends are never retried.
pub trait SnapshotSink: Send {
    /// Deliver one snapshot to the peer.
    fn send(
        &mut self,
        snapshot: &Snapshot,
    ) -> impl Future<Output = Result<(), SessionError>> + Send;
}

impl SnapshotSink for mpsc::Sender<Snapshot> {
    async fn send(&mut self, snapshot: &Snapshot) -> Result<(), SessionError> {
        mpsc::Sender::send(self, snapshot.clone())
            .await
            .map_err(|_closed| SessionError::Send("receiver dropped".to_owned()))
    }
}

/// Everything a session needs from configuration.
#[derive(Debug, Clone)]
pub struct SessionSettings {
    /// Starting precision and growth schedule.
    pub series: SeriesConfig,
    /// Snapshot window and label.
    pub snapshot: SnapshotPolicy,
    /// Pacing between messages.
    pub cadence: Cadence,
    /// Progress log frequency.
    pub logging: LoggingConfig,
}

impl SessionSettings {
    /// Settings from the full configuration.
    pub fn from_config(config: &StreamConfig) -> Self {
        Self {
            series: config.series,
            snapshot: SnapshotPolicy::from_config(&config.snapshot),
            cadence: Cadence::from_config(&config.cadence),
            logging: config.logging,
        }
    }
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self::from_config(&StreamConfig::default())
    }
}

/// Why a session reached Closing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEnd {
    /// A send failed; the peer is gone.
    Disconnected,
    /// The cancellation token fired (server shutdown or peer close).
    Cancelled,
    /// A step failed unexpectedly.
    Internal(String),
}

/// Final observation of a terminated session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSummary {
    /// Session identifier.
    pub session: u64,
    /// Why the session ended.
    pub end: SessionEnd,
    /// Terms added to the series.
    pub iterations: u64,
    /// Snapshots delivered successfully.
    pub messages_sent: u64,
    /// Precision in effect at the end.
    pub precision: u64,
    /// Digits in the accumulator at the end, excluding the radix point.
    pub digits_computed: u64,
    /// Leading characters of the final value.
    pub preview: String,
}

impl SessionSummary {
    /// Emit the end-of-session log line.
    pub fn log(&self) {
        info!(
            session = self.session,
            end = ?self.end,
            iterations = self.iterations,
            messages_sent = self.messages_sent,
            precision = self.precision,
            digits_computed = self.digits_computed,
            preview = %self.preview,
            "Session finished"
        );
    }
}

/// Drive one session until the peer goes away or `cancel` fires.
///
/// Returns once the session has entered Closing; the caller releases the
/// connection. Failures are never propagated: they end this session only.
pub async fn run_session<S: SnapshotSink>(
    session: u64,
    sink: &mut S,
    settings: &SessionSettings,
    cancel: &CancellationToken,
) -> SessionSummary {
    let mut state = SeriesState::new(&settings.series);
    let mut messages_sent: u64 = 0;
    let mut last: Option<Snapshot> = None;

    info!(
        session,
        precision = state.precision(),
        "Series computation started"
    );

    let (end, state) = loop {
        if cancel.is_cancelled() {
            break (SessionEnd::Cancelled, Some(state));
        }

        let snapshot = match advance(session, state, settings).await {
            Ok((next, snapshot)) => {
                state = next;
                snapshot
            }
            Err(message) => {
                error!(session, error = %message, "Series step failed");
                break (SessionEnd::Internal(message), None);
            }
        };

        let sent = tokio::select! {
            biased;
            () = cancel.cancelled() => break (SessionEnd::Cancelled, Some(state)),
            result = sink.send(&snapshot) => result,
        };
        if let Err(e) = sent {
            debug!(session, error = %e, "Snapshot send failed, closing session");
            break (SessionEnd::Disconnected, Some(state));
        }
        messages_sent = messages_sent.saturating_add(1);
        last = Some(snapshot);

        if settings.cadence.should_pause(state.terms()) {
            tokio::select! {
                biased;
                () = cancel.cancelled() => break (SessionEnd::Cancelled, Some(state)),
                () = tokio::time::sleep(settings.cadence.pause()) => {}
            }
        }
    };

    let closing = match state {
        Some(state) => tokio::task::spawn_blocking(move || {
            (
                state.terms(),
                state.precision(),
                progress::computed_digits(&state),
                progress::preview(&state),
            )
        })
        .await
        .ok(),
        None => None,
    };
    let (iterations, precision, digits_computed, preview) =
        closing.unwrap_or_else(|| match last {
            Some(s) => (s.iterations, s.precision, s.digits, s.current_pi),
            None => (0, 0, 0, String::new()),
        });

    SessionSummary {
        session,
        end,
        iterations,
        messages_sent,
        precision,
        digits_computed,
        preview,
    }
}

/// Add one term, log it and build its snapshot on the blocking pool, so
/// big-number arithmetic and rendering never stall the async workers.
/// A panic inside the step surfaces as `Err`.
async fn advance(
    session: u64,
    mut state: SeriesState,
    settings: &SessionSettings,
) -> Result<(SeriesState, Snapshot), String> {
    let policy = settings.snapshot.clone();
    let logging = settings.logging;
    tokio::task::spawn_blocking(move || {
        let report = state.step();
        log_step(session, &report, &state, &logging);
        let snapshot = policy.snapshot(&state);
        (state, snapshot)
    })
    .await
    .map_err(|e| format!("step task failed: {e}"))
}
