//! Term-by-term evaluation of the Bailey-Borwein-Plouffe series.
//!
//! ```text
//! pi = sum over k >= 0 of 16^-k * (4/(8k+1) - 2/(8k+4) - 1/(8k+5) - 1/(8k+6))
//! ```
//!
//! [`SeriesState`] adds exactly one term per [`step`](SeriesState::step).
//! Every operation of a step is rounded at the precision in effect when the
//! step starts. Precision grows on the schedule given by [`PrecisionPolicy`]
//! and the new precision applies only to later terms; digits already folded
//! into the accumulator are never recomputed.
//!
//! The weight `16^-k` is carried exactly as `625^k * 10^(-4k)`. Its mantissa
//! is updated by one small multiplication per step, so no power is ever
//! recomputed from scratch and the exponent can grow without bound.

use bigdecimal::BigDecimal;
use num_bigint::BigInt;
use num_traits::Zero;

use crate::config::SeriesConfig;
use crate::decimal::DecimalContext;

/// `16^-1 = 625 * 10^-4`.
const WEIGHT_FACTOR: u32 = 625;

/// Decimal places added to the weight per term.
const WEIGHT_SCALE_STEP: i64 = 4;

/// When and by how much precision grows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrecisionPolicy {
    /// Digits added at each growth point.
    pub increment: u64,
    /// Growth happens after terms whose index is a positive multiple of this.
    pub interval: u64,
    /// Optional ceiling.
    pub max: Option<u64>,
}

impl PrecisionPolicy {
    /// Build the policy from the `series` configuration section.
    pub const fn from_config(config: &SeriesConfig) -> Self {
        Self {
            increment: config.precision_increment,
            interval: config.growth_interval,
            max: config.max_precision,
        }
    }

    /// Precision to use after term `term_index` has been added, or `None`
    /// if it stays at `current`.
    pub fn next_precision(&self, term_index: u64, current: u64) -> Option<u64> {
        if term_index == 0 || self.interval == 0 || term_index % self.interval != 0 {
            return None;
        }
        let mut next = current.saturating_add(self.increment);
        if let Some(max) = self.max {
            next = next.min(max);
        }
        (next > current).then_some(next)
    }
}

/// A precision increase that happened during a step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrecisionChange {
    /// Precision used for the term that triggered the change.
    pub from: u64,
    /// Precision for all following terms.
    pub to: u64,
}

/// The four rational parts of one term, before weighting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubTerms {
    /// `4 / (8k + 1)`
    pub a: BigDecimal,
    /// `2 / (8k + 4)`
    pub b: BigDecimal,
    /// `1 / (8k + 5)`
    pub c: BigDecimal,
    /// `1 / (8k + 6)`
    pub d: BigDecimal,
}

/// What a single [`SeriesState::step`] did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepReport {
    /// Index `k` of the term just added.
    pub term_index: u64,
    /// The weighted term `16^-k * (a - b - c - d)` that was added.
    pub term: BigDecimal,
    /// The unweighted parts of the term.
    pub sub_terms: SubTerms,
    /// Set when precision grew after this term.
    pub precision_change: Option<PrecisionChange>,
}

/// Per-session state of the series evaluation.
///
/// Created fresh for every connection and owned exclusively by the session
/// driving it. There is no last term: `step` can be called forever.
#[derive(Debug, Clone)]
pub struct SeriesState {
    /// Running sum of all terms added so far.
    accumulator: BigDecimal,
    /// Index of the next term to add; equals the number of terms summed.
    next_index: u64,
    /// Arithmetic context; its precision only ever grows.
    context: DecimalContext,
    /// `625^k` for the next term, the exact mantissa of `16^-k`.
    weight_mantissa: BigInt,
    /// Growth schedule.
    policy: PrecisionPolicy,
}

impl SeriesState {
    /// Fresh state: accumulator zero, no terms, initial precision.
    pub fn new(config: &SeriesConfig) -> Self {
        Self::with_policy(config.initial_precision, PrecisionPolicy::from_config(config))
    }

    /// Fresh state with an explicit starting precision and policy.
    pub fn with_policy(initial_precision: u64, policy: PrecisionPolicy) -> Self {
        Self {
            accumulator: BigDecimal::zero(),
            next_index: 0,
            context: DecimalContext::new(initial_precision),
            weight_mantissa: BigInt::from(1u8),
            policy,
        }
    }

    /// Add the next term of the series.
    ///
    /// All arithmetic uses the precision in effect at the start of the call.
    /// If the term index is a positive multiple of the growth interval the
    /// precision is raised afterwards.
    pub fn step(&mut self) -> StepReport {
        let k = self.next_index;
        let eight_k = k.saturating_mul(8);
        let ctx = &self.context;

        let sub_terms = SubTerms {
            a: ctx.div(4, eight_k.saturating_add(1)),
            b: ctx.div(2, eight_k.saturating_add(4)),
            c: ctx.div(1, eight_k.saturating_add(5)),
            d: ctx.div(1, eight_k.saturating_add(6)),
        };

        let mut series = ctx.sub(&sub_terms.a, &sub_terms.b);
        series = ctx.sub(&series, &sub_terms.c);
        series = ctx.sub(&series, &sub_terms.d);

        let weight_scale = i64::try_from(k)
            .unwrap_or(i64::MAX)
            .saturating_mul(WEIGHT_SCALE_STEP);
        let weight = ctx.round(BigDecimal::new(self.weight_mantissa.clone(), weight_scale));

        let term = ctx.mul(&weight, &series);
        self.accumulator = ctx.add(&self.accumulator, &term);
        self.weight_mantissa *= WEIGHT_FACTOR;

        let current = self.context.precision();
        let precision_change = self
            .policy
            .next_precision(k, current)
            .map(|to| {
                self.context.set_precision(to);
                PrecisionChange { from: current, to }
            });

        self.next_index = k.saturating_add(1);

        StepReport {
            term_index: k,
            term,
            sub_terms,
            precision_change,
        }
    }

    /// The running sum.
    pub const fn accumulator(&self) -> &BigDecimal {
        &self.accumulator
    }

    /// Number of terms summed so far.
    pub const fn terms(&self) -> u64 {
        self.next_index
    }

    /// Index of the most recently added term, if any.
    pub const fn last_term_index(&self) -> Option<u64> {
        self.next_index.checked_sub(1)
    }

    /// Significant digits the next term will be computed with.
    pub fn precision(&self) -> u64 {
        self.context.precision()
    }
}
