//! Display snapshots of a running series.
//!
//! A [`Snapshot`] is derived fresh from a [`SeriesState`] after every step
//! and has no identity of its own. The value is the plain rendering of the
//! accumulator cut to a window that starts at `initial_width` characters
//! and widens by one character per term, capped at the full rendering.

use serde::{Deserialize, Serialize};

use crate::config::SnapshotConfig;
use crate::decimal::{render_prefix, rendered_len};
use crate::series::SeriesState;

/// One outbound message. Serializes to exactly
/// `{"current_pi", "iterations", "method", "digits"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Truncated accumulator text.
    pub current_pi: String,
    /// Number of terms summed.
    pub iterations: u64,
    /// Method label.
    pub method: String,
    /// Characters shown, excluding the radix point.
    pub digits: u64,
    /// Precision the next term will use. Not sent on the wire.
    #[serde(skip)]
    pub precision: u64,
}

/// Builds [`Snapshot`]s from series state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotPolicy {
    initial_width: u64,
    method: String,
}

impl SnapshotPolicy {
    /// Policy from the `snapshot` configuration section.
    pub fn from_config(config: &SnapshotConfig) -> Self {
        Self {
            initial_width: config.initial_width,
            method: config.method.clone(),
        }
    }

    /// Characters to show once term `term_index` has been added.
    pub const fn window(&self, term_index: u64) -> u64 {
        self.initial_width.saturating_add(term_index)
    }

    /// Snapshot of `state` after its most recent step.
    ///
    /// A state with no terms yet is treated like term zero.
    pub fn snapshot(&self, state: &SeriesState) -> Snapshot {
        let k = state.last_term_index().unwrap_or(0);
        let accumulator = state.accumulator();
        let width = self.window(k).min(rendered_len(accumulator));
        let current_pi = render_prefix(accumulator, width);
        let shown = u64::try_from(current_pi.len()).unwrap_or(u64::MAX);

        Snapshot {
            current_pi,
            iterations: state.terms(),
            method: self.method.clone(),
            digits: shown.saturating_sub(1),
            precision: state.precision(),
        }
    }
}

impl Default for SnapshotPolicy {
    fn default() -> Self {
        Self::from_config(&SnapshotConfig::default())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::series::PrecisionPolicy;

    fn state(precision: u64) -> SeriesState {
        SeriesState::with_policy(
            precision,
            PrecisionPolicy {
                increment: 0,
                interval: 1000,
                max: None,
            },
        )
    }

    #[test]
    fn first_snapshot_shows_initial_window() {
        let mut series = state(400);
        series.step();
        let snap = SnapshotPolicy::default().snapshot(&series);
        assert_eq!(snap.current_pi.len(), 100);
        assert_eq!(snap.digits, 99);
        assert_eq!(snap.iterations, 1);
        assert_eq!(snap.method, "BBP Formula");
        assert_eq!(snap.precision, 400);
        assert!(snap.current_pi.starts_with("3.1333"));
    }

    #[test]
    fn window_widens_by_one_per_term() {
        let mut series = state(400);
        let policy = SnapshotPolicy::default();
        let mut previous = None;
        for k in 0..30u64 {
            series.step();
            let snap = policy.snapshot(&series);
            assert_eq!(snap.current_pi.len() as u64, 100 + k);
            assert_eq!(snap.iterations, k + 1);
            if let Some(prev) = previous {
                assert_eq!(snap.current_pi.len(), prev + 1);
            }
            previous = Some(snap.current_pi.len());
        }
    }

    #[test]
    fn window_is_capped_at_computed_length() {
        let mut series = state(40);
        for _ in 0..5 {
            series.step();
        }
        let snap = SnapshotPolicy::default().snapshot(&series);
        // 40 significant digits plus the radix point.
        assert_eq!(snap.current_pi.len(), 41);
        assert_eq!(snap.digits, 40);
    }

    #[test]
    fn wire_format_has_fixed_field_set() {
        let mut series = state(200);
        series.step();
        let snap = SnapshotPolicy::default().snapshot(&series);
        let json = serde_json::to_value(&snap).unwrap();
        let obj = json.as_object().unwrap();
        let mut keys: Vec<&str> = obj.keys().map(String::as_str).collect();
        keys.sort_unstable();
        assert_eq!(keys, ["current_pi", "digits", "iterations", "method"]);
        assert_eq!(json["iterations"], 1);
        assert_eq!(json["method"], "BBP Formula");
    }

    #[test]
    fn custom_label_and_width() {
        let policy = SnapshotPolicy::from_config(&SnapshotConfig {
            initial_width: 10,
            method: "BBP".to_owned(),
        });
        let mut series = state(100);
        series.step();
        series.step();
        let snap = policy.snapshot(&series);
        assert_eq!(snap.current_pi.len(), 11);
        assert_eq!(snap.method, "BBP");
    }
}
