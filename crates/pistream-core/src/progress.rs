//! Structured progress logging for a running series.
//!
//! Logging reads the step report and state but never feeds back into the
//! arithmetic. Float conversions here are for display only.

use bigdecimal::BigDecimal;
use num_traits::ToPrimitive;
use tracing::{debug, info};

use crate::config::LoggingConfig;
use crate::decimal::{DecimalContext, render_prefix, rendered_len};
use crate::series::{SeriesState, StepReport};

/// Characters of the accumulator shown in periodic progress lines.
const PROGRESS_PREVIEW_WIDTH: u64 = 50;

/// Characters of the accumulator shown in the end-of-session summary.
pub const SUMMARY_PREVIEW_WIDTH: u64 = 100;

/// Significant digits kept before converting a value to `f64`.
const DISPLAY_DIGITS: u64 = 17;

/// Emit the log lines due after `report`.
///
/// - precision growth: always, at `info`
/// - progress (term, magnitude, value prefix): every
///   `progress_log_interval` terms, at `info`
/// - the four sub-terms: every `detail_log_interval` terms, at `debug`
pub fn log_step(session: u64, report: &StepReport, state: &SeriesState, config: &LoggingConfig) {
    if let Some(change) = report.precision_change {
        info!(
            session,
            term = report.term_index,
            from = change.from,
            to = change.to,
            "Precision increased"
        );
    }

    if is_due(report.term_index, config.progress_log_interval) {
        info!(
            session,
            iteration = report.term_index.saturating_add(1),
            term = display_f64(&report.term),
            value = %render_prefix(state.accumulator(), PROGRESS_PREVIEW_WIDTH),
            "Series progress"
        );
    }

    if is_due(report.term_index, config.detail_log_interval) {
        let parts = &report.sub_terms;
        debug!(
            session,
            term = report.term_index,
            a = display_f64(&parts.a),
            b = display_f64(&parts.b),
            c = display_f64(&parts.c),
            d = display_f64(&parts.d),
            "Term components 4/(8k+1), 2/(8k+4), 1/(8k+5), 1/(8k+6)"
        );
    }
}

/// Number of digits the accumulator renders with, excluding the radix point.
pub fn computed_digits(state: &SeriesState) -> u64 {
    rendered_len(state.accumulator()).saturating_sub(1)
}

/// Leading characters of the accumulator for summaries.
pub fn preview(state: &SeriesState) -> String {
    render_prefix(state.accumulator(), SUMMARY_PREVIEW_WIDTH)
}

const fn is_due(term_index: u64, interval: u64) -> bool {
    interval != 0 && term_index % interval == 0
}

fn display_f64(value: &BigDecimal) -> f64 {
    DecimalContext::new(DISPLAY_DIGITS)
        .round(value.clone())
        .to_f64()
        .unwrap_or(f64::NAN)
}
