//! Decimal arithmetic context with a runtime-adjustable precision.
//!
//! [`DecimalContext`] plays the role of a decimal "context": every result it
//! produces is rounded to [`precision`](DecimalContext::precision)
//! significant digits. Raising the precision affects only results computed
//! afterwards; values already produced keep the digits they were rounded to.
//!
//! Values are [`BigDecimal`], so there is no binary floating point anywhere
//! in the arithmetic path and results are reproducible digit for digit.
//! Rendering to text is done by [`render_prefix`] and [`rendered_len`],
//! which always produce plain positional notation (never exponential).

use std::num::NonZeroU64;

use bigdecimal::{BigDecimal, Context, RoundingMode};
use num_bigint::{BigInt, Sign};
use num_traits::{One, Zero};

/// Arbitrary-precision decimal context.
///
/// Wraps a [`bigdecimal::Context`] with half-to-even rounding and caches
/// the scale factor used by [`div`](DecimalContext::div).
#[derive(Debug, Clone)]
pub struct DecimalContext {
    /// Precision and rounding mode applied to every result.
    inner: Context,
    /// Cached `10^precision`, the scale factor for quotients.
    unit: BigInt,
}

impl DecimalContext {
    /// Create a context retaining `precision` significant digits.
    ///
    /// A precision of zero is raised to one.
    pub fn new(precision: u64) -> Self {
        let precision = non_zero(precision);
        Self {
            inner: Context::new(precision, RoundingMode::HalfEven),
            unit: power_of_ten(precision.get()),
        }
    }

    /// Number of significant digits currently retained.
    pub fn precision(&self) -> u64 {
        self.inner.precision().get()
    }

    /// Change the precision for all subsequent operations.
    pub fn set_precision(&mut self, precision: u64) {
        let precision = non_zero(precision);
        if precision != self.inner.precision() {
            self.inner = self.inner.with_precision(precision);
            self.unit = power_of_ten(precision.get());
        }
    }

    /// Round `value` to the context precision.
    ///
    /// Values that already fit are returned untouched; they are never padded
    /// with trailing zeros.
    pub fn round(&self, value: BigDecimal) -> BigDecimal {
        if value.digits() <= self.precision() {
            return value;
        }
        // Multiplying by one rounds the mantissa in place instead of
        // converting it digit by digit as `round_decimal` does.
        self.inner.multiply(&value, &BigDecimal::one())
    }

    /// Quotient `numerator / denominator` to the context precision.
    ///
    /// Scaled big-integer division yields at least one digit past the
    /// precision. A nonzero remainder is kept as a trailing sticky digit so
    /// the final rounding sees that the quotient is inexact. Returns zero
    /// for a zero denominator.
    pub fn div(&self, numerator: u64, denominator: u64) -> BigDecimal {
        if denominator == 0 || numerator == 0 {
            return BigDecimal::zero();
        }
        let guard = decimal_digits(denominator);
        let scaled = &self.unit * power_of_ten(guard) * BigInt::from(numerator);
        let divisor = BigInt::from(denominator);
        let remainder = &scaled % &divisor;
        let mut quotient = scaled / divisor;
        let mut scale = self.precision().saturating_add(guard);
        if !remainder.is_zero() {
            quotient = quotient * 10u32 + 1u32;
            scale = scale.saturating_add(1);
        }
        let scale = i64::try_from(scale).unwrap_or(i64::MAX);
        self.round(BigDecimal::new(quotient, scale))
    }

    /// `a - b` rounded to the context precision.
    pub fn sub(&self, a: &BigDecimal, b: &BigDecimal) -> BigDecimal {
        self.round(a - b)
    }

    /// `a + b` rounded to the context precision.
    pub fn add(&self, a: &BigDecimal, b: &BigDecimal) -> BigDecimal {
        self.round(a + b)
    }

    /// `a * b` rounded to the context precision.
    pub fn mul(&self, a: &BigDecimal, b: &BigDecimal) -> BigDecimal {
        self.round(a * b)
    }
}

fn non_zero(precision: u64) -> NonZeroU64 {
    NonZeroU64::new(precision).unwrap_or(NonZeroU64::MIN)
}

/// `10^exponent` as a big integer.
pub fn power_of_ten(exponent: u64) -> BigInt {
    let exponent = usize::try_from(exponent).unwrap_or(usize::MAX);
    num_traits::pow(BigInt::from(10u8), exponent)
}

/// Number of decimal digits in `n` (one for zero).
pub const fn decimal_digits(mut n: u64) -> u64 {
    let mut digits = 1;
    while n >= 10 {
        n /= 10;
        digits += 1;
    }
    digits
}

/// Length in characters of the plain rendering of `value`.
///
/// Matches `render_prefix(value, u64::MAX).len()` without building the
/// string, which is expensive for values with many thousands of digits.
pub fn rendered_len(value: &BigDecimal) -> u64 {
    let (mantissa, scale) = value.as_bigint_and_exponent();
    let digits = value.digits();
    let sign = u64::from(mantissa.sign() == Sign::Minus);
    let body = if scale <= 0 {
        digits.saturating_add(scale.unsigned_abs())
    } else {
        let scale = scale.unsigned_abs();
        if digits > scale {
            // "123.456"
            digits.saturating_add(1)
        } else {
            // "0." followed by the fraction padded to `scale` places.
            scale.saturating_add(2)
        }
    };
    sign.saturating_add(body)
}

/// The first `width` characters of the plain rendering of `value`.
///
/// Only the leading mantissa digits that can appear in the prefix are
/// converted to text, so the cost tracks `width` rather than the full
/// precision of `value`. If the rendering is shorter than `width` the
/// whole rendering is returned.
pub fn render_prefix(value: &BigDecimal, width: u64) -> String {
    let (mantissa, scale) = value.as_bigint_and_exponent();
    let digits = value.digits();
    let keep = digits.min(width.max(1));
    let dropped = digits.saturating_sub(keep);

    let mantissa = if dropped == 0 {
        mantissa
    } else {
        mantissa / power_of_ten(dropped)
    };
    let scale = scale.saturating_sub(i64::try_from(dropped).unwrap_or(i64::MAX));

    let mut text = render_plain(&mantissa, scale);
    let limit = usize::try_from(width).unwrap_or(usize::MAX);
    text.truncate(limit);
    text
}

/// Plain positional rendering of `mantissa * 10^(-scale)`.
fn render_plain(mantissa: &BigInt, scale: i64) -> String {
    let negative = mantissa.sign() == Sign::Minus;
    let digits = mantissa.magnitude().to_string();
    let mut out = String::with_capacity(digits.len().saturating_add(3));
    if negative {
        out.push('-');
    }

    if scale <= 0 {
        out.push_str(&digits);
        let zeros = usize::try_from(scale.unsigned_abs()).unwrap_or(usize::MAX);
        out.extend(std::iter::repeat_n('0', zeros));
        return out;
    }

    let scale = usize::try_from(scale.unsigned_abs()).unwrap_or(usize::MAX);
    if digits.len() > scale {
        let (int_part, frac_part) = digits.split_at(digits.len().saturating_sub(scale));
        out.push_str(int_part);
        out.push('.');
        out.push_str(frac_part);
    } else {
        out.push_str("0.");
        out.extend(std::iter::repeat_n('0', scale.saturating_sub(digits.len())));
        out.push_str(&digits);
    }
    out
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
pub(crate) mod tests {
    use std::cmp::Ordering;
    use std::str::FromStr;

    use super::*;

    fn dec(s: &str) -> BigDecimal {
        BigDecimal::from_str(s).unwrap()
    }

    /// `num / den` rounded half-to-even to `precision` significant digits,
    /// using exact integer arithmetic only.
    pub(crate) fn correctly_rounded(num: &BigInt, den: &BigInt, precision: u64) -> BigDecimal {
        if num.is_zero() {
            return BigDecimal::zero();
        }
        let negative = (num.sign() == Sign::Minus) != (den.sign() == Sign::Minus);
        let num = BigInt::from(num.magnitude().clone());
        let den = BigInt::from(den.magnitude().clone());
        let target = usize::try_from(precision).unwrap();
        let digit_count = |n: &BigInt| if n.is_zero() { 0 } else { n.to_string().len() };

        // Shift until the integer quotient has exactly `precision` digits.
        let mut shift = i64::try_from(precision).unwrap()
            + i64::try_from(digit_count(&den)).unwrap()
            - i64::try_from(digit_count(&num)).unwrap();
        let (quotient, remainder, divisor) = loop {
            let (n, d) = if shift >= 0 {
                (&num * power_of_ten(shift.unsigned_abs()), den.clone())
            } else {
                (num.clone(), &den * power_of_ten(shift.unsigned_abs()))
            };
            let q = &n / &d;
            match digit_count(&q).cmp(&target) {
                Ordering::Greater => shift -= 1,
                Ordering::Less => shift += 1,
                Ordering::Equal => break (q, &n % &d, d),
            }
        };

        let up = match (remainder * 2u32).cmp(&divisor) {
            Ordering::Greater => true,
            Ordering::Equal => quotient.bit(0),
            Ordering::Less => false,
        };
        let quotient = if up { quotient + 1u32 } else { quotient };
        let quotient = if negative { -quotient } else { quotient };
        BigDecimal::new(quotient, shift)
    }

    /// `value` rounded to `precision` digits by [`correctly_rounded`].
    pub(crate) fn rounded_exactly(value: &BigDecimal, precision: u64) -> BigDecimal {
        let (mantissa, scale) = value.as_bigint_and_exponent();
        if scale >= 0 {
            correctly_rounded(&mantissa, &power_of_ten(scale.unsigned_abs()), precision)
        } else {
            let whole = mantissa * power_of_ten(scale.unsigned_abs());
            correctly_rounded(&whole, &BigInt::from(1u8), precision)
        }
    }

    #[test]
    fn division_is_correctly_rounded() {
        for precision in [1, 2, 7, 20, 50] {
            let ctx = DecimalContext::new(precision);
            for denominator in 1..400u64 {
                for numerator in [1u64, 2, 4] {
                    let expected = correctly_rounded(
                        &BigInt::from(numerator),
                        &BigInt::from(denominator),
                        precision,
                    );
                    assert_eq!(
                        ctx.div(numerator, denominator),
                        expected,
                        "{numerator}/{denominator} at precision {precision}"
                    );
                }
            }
        }
    }

    #[test]
    fn series_denominators_are_correctly_rounded() {
        for precision in [20, 100] {
            let ctx = DecimalContext::new(precision);
            for k in 0..2000u64 {
                for (numerator, offset) in [(4u64, 1u64), (2, 4), (1, 5), (1, 6)] {
                    let denominator = 8 * k + offset;
                    let expected = correctly_rounded(
                        &BigInt::from(numerator),
                        &BigInt::from(denominator),
                        precision,
                    );
                    assert_eq!(
                        ctx.div(numerator, denominator),
                        expected,
                        "{numerator}/{denominator} at precision {precision}"
                    );
                }
            }
        }
    }

    #[test]
    fn division_rounds_up_when_digits_follow_a_five() {
        assert_eq!(render_prefix(&DecimalContext::new(1).div(1, 22), 100), "0.05");
        assert_eq!(
            render_prefix(&DecimalContext::new(20).div(1, 54), 100),
            "0.018518518518518518519"
        );
        assert_eq!(
            render_prefix(&DecimalContext::new(20).div(1, 86), 100),
            "0.011627906976744186047"
        );
    }

    #[test]
    fn operations_round_the_exact_result_once() {
        let ctx = DecimalContext::new(12);
        let a = ctx.div(1, 7);
        let b = ctx.div(2, 13);
        let c = ctx.div(1, 625);
        for (got, exact) in [
            (ctx.add(&a, &b), &a + &b),
            (ctx.sub(&a, &b), &a - &b),
            (ctx.sub(&c, &a), &c - &a),
            (ctx.mul(&a, &b), &a * &b),
            (ctx.mul(&b, &c), &b * &c),
        ] {
            assert_eq!(got, rounded_exactly(&exact, 12));
        }
    }

    #[test]
    fn division_keeps_requested_significant_digits() {
        let ctx = DecimalContext::new(10);
        let third = ctx.div(1, 3);
        assert_eq!(third.digits(), 10);
        assert_eq!(render_prefix(&third, 100), "0.3333333333");
    }

    #[test]
    fn division_rounds_last_digit() {
        let ctx = DecimalContext::new(5);
        assert_eq!(render_prefix(&ctx.div(2, 3), 100), "0.66667");
        assert_eq!(render_prefix(&ctx.div(4, 1), 100), "4.0000");
    }

    #[test]
    fn rounding_ties_go_to_even() {
        let ctx = DecimalContext::new(2);
        assert_eq!(render_prefix(&ctx.round(dec("0.125")), 100), "0.12");
        assert_eq!(render_prefix(&ctx.round(dec("0.135")), 100), "0.14");
        assert_eq!(render_prefix(&ctx.round(dec("-0.126")), 100), "-0.13");
    }

    #[test]
    fn zero_denominator_yields_zero() {
        let ctx = DecimalContext::new(5);
        assert!(ctx.div(1, 0).is_zero());
    }

    #[test]
    fn round_never_pads_short_values() {
        let ctx = DecimalContext::new(50);
        let value = dec("0.5");
        assert_eq!(ctx.round(value.clone()), value);
        assert_eq!(ctx.round(value).digits(), 1);
    }

    #[test]
    fn precision_change_affects_only_later_results() {
        let mut ctx = DecimalContext::new(5);
        let before = ctx.div(1, 7);
        ctx.set_precision(12);
        let after = ctx.div(1, 7);
        assert_eq!(before.digits(), 5);
        assert_eq!(after.digits(), 12);
        assert_eq!(ctx.precision(), 12);
    }

    #[test]
    fn zero_precision_is_raised_to_one() {
        let ctx = DecimalContext::new(0);
        assert_eq!(ctx.precision(), 1);
    }

    #[test]
    fn decimal_digit_counts() {
        assert_eq!(decimal_digits(0), 1);
        assert_eq!(decimal_digits(9), 1);
        assert_eq!(decimal_digits(10), 2);
        assert_eq!(decimal_digits(1_000_001), 7);
    }

    #[test]
    fn rendering_matches_positional_notation() {
        let cases = [
            ("3.14159", "3.14159"),
            ("0.00125", "0.00125"),
            ("-2.5", "-2.5"),
            ("42", "42"),
            ("1.2E+3", "1200"),
        ];
        for (input, expected) in cases {
            let value = dec(input);
            assert_eq!(render_prefix(&value, 100), expected, "input {input}");
            assert_eq!(rendered_len(&value), expected.len() as u64, "input {input}");
        }
    }

    #[test]
    fn prefix_truncates_without_rounding() {
        let value = dec("3.14159265358979");
        assert_eq!(render_prefix(&value, 6), "3.1415");
        assert_eq!(render_prefix(&value, 1), "3");
    }

    #[test]
    fn prefix_keeps_leading_zeros_of_small_values() {
        let value = dec("0.000123456");
        assert_eq!(render_prefix(&value, 7), "0.00012");
    }

    #[test]
    fn prefix_of_large_integer_keeps_leading_digits() {
        let value = dec("987654321");
        assert_eq!(render_prefix(&value, 4), "9876");
    }
}
