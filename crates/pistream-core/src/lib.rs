//! Incremental evaluation of the Bailey-Borwein-Plouffe series for pi.
//!
//! This crate owns everything a streaming session needs that is not I/O:
//!
//! - [`decimal`] -- a decimal context that rounds every operation to a
//!   configurable number of significant digits.
//! - [`series`] -- [`SeriesState`], which adds exactly one series term per
//!   call to [`SeriesState::step`] and grows its precision on a schedule.
//! - [`snapshot`] -- turns a [`SeriesState`] into the display-truncated
//!   [`Snapshot`] pushed to clients.
//! - [`cadence`] -- the pacing policy between outbound messages.
//! - [`config`] -- typed configuration loaded from `pistream-config.yaml`.
//! - [`progress`] -- structured progress logging for a running series.
//!
//! The crate performs no network I/O and never sleeps. State is owned
//! by exactly one session and is never shared.
//!
//! [`SeriesState`]: series::SeriesState
//! [`SeriesState::step`]: series::SeriesState::step
//! [`Snapshot`]: snapshot::Snapshot

pub mod cadence;
pub mod config;
pub mod decimal;
pub mod progress;
pub mod series;
pub mod snapshot;

pub use cadence::Cadence;
pub use config::{ConfigError, StreamConfig};
pub use series::{PrecisionChange, PrecisionPolicy, SeriesState, StepReport};
pub use snapshot::{Snapshot, SnapshotPolicy};
