use std::fmt::Write;

use crate::prefix_for_exponent;

/// Largest power of ten we apply in a single multiplication. Anything larger would overflow to
/// infinity before the value is brought back into range.
const MAX_SCALE_STEP: i32 = 300;

/// Renders `value` with `significant_digits` significant digits, `decimal_places` of which come
/// after the decimal point, followed by a space and an SI prefix character.
///
/// The mantissa is right-aligned in a field of `significant_digits - decimal_places` integer
/// digits, so values of the same precision line up.
///
/// See [package-level documentation][crate] for the exact rules.
///
/// # Panics
///
/// In debug builds, panics if `decimal_places >= significant_digits`. Release builds clamp
/// `decimal_places` to `significant_digits - 1` instead.
///
/// # Example
///
/// ```
/// assert_eq!(sig_fmt::format(600e-9, 4, 1), "600.0 n");
/// assert_eq!(sig_fmt::format(f64::NAN, 3, 1), "NaN");
/// ```
#[must_use]
pub fn format(value: f64, significant_digits: u8, decimal_places: u8) -> String {
    debug_assert!(
        decimal_places < significant_digits,
        "decimal places ({decimal_places}) must be less than significant digits ({significant_digits})"
    );

    let significant_digits = significant_digits.max(1);
    let decimal_places = decimal_places.min(significant_digits.saturating_sub(1));

    render(value, significant_digits, decimal_places)
}

/// Same as [`format()`] but reports invalid precision as an error instead of treating it as a
/// programming error.
///
/// # Example
///
/// ```
/// assert!(sig_fmt::try_format(1.0, 2, 2).is_err());
/// assert_eq!(sig_fmt::try_format(1.0, 2, 1).unwrap(), "1.0  ");
/// ```
pub fn try_format(value: f64, significant_digits: u8, decimal_places: u8) -> crate::Result<String> {
    if decimal_places >= significant_digits {
        return Err(crate::Error::InvalidPrecision {
            significant_digits,
            decimal_places,
        });
    }

    Ok(render(value, significant_digits, decimal_places))
}

/// Renders with already validated precision (`decimal_places < significant_digits`).
pub(crate) fn render(value: f64, significant_digits: u8, decimal_places: u8) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }

    if value.is_infinite() {
        return if value.is_sign_positive() { "INF" } else { "-INF" }.to_string();
    }

    let width = mantissa_width(significant_digits, decimal_places);
    let magnitude = value.abs();

    // Subnormals are clamped to zero, they carry no meaningful precision.
    if magnitude < f64::MIN_POSITIVE {
        return render_zero(decimal_places, width);
    }

    let integer_digits = i32::from(significant_digits.saturating_sub(decimal_places));
    let decimals = i32::from(decimal_places);

    let mut exponent = group_exponent(decimal_exponent(magnitude), integer_digits);
    let mut scaled = scaled_mantissa(magnitude, exponent, decimals);

    // Rounding may carry the mantissa into one more integer digit than we have room for
    // (e.g. 99.96 -> 100.0 with two integer digits). Move up one prefix and round again.
    if scaled >= 10_f64.powi(integer_digits.saturating_add(decimals)) {
        exponent = exponent.saturating_add(3);
        scaled = scaled_mantissa(magnitude, exponent, decimals);
    }

    // With fewer than three significant digits some values fall between prefix groups, e.g. 40
    // with one digit would round to "0 k". A nonzero value never renders as zero: it either
    // rounds up to the smallest mantissa of its group or moves down one group, where it takes
    // more integer digits than requested.
    if scaled == 0.0 {
        let lower_exponent = exponent.saturating_sub(3);
        let lower_scaled = scaled_mantissa(magnitude, lower_exponent, decimals);

        if lower_scaled >= HALF_GROUP {
            scaled = 1.0;
        } else {
            exponent = lower_exponent;
            scaled = lower_scaled;
        }
    }

    let mut mantissa = String::new();

    if value.is_sign_negative() {
        mantissa.push('-');
    }

    push_mantissa(&mut mantissa, scaled, decimal_places);

    let mut text = format!("{mantissa:>width$}");

    if let Some(prefix) = prefix_for_exponent(exponent) {
        text.push(' ');
        text.push(prefix);
    } else {
        write!(text, "e{exponent}").expect("writing to a String cannot fail");
    }

    text
}

/// A mantissa one group down that rounds to at least this many units rounds to one unit in the
/// group above.
const HALF_GROUP: f64 = 500.0;

/// Characters in the mantissa of a non-negative value: the integer digits plus the decimal point
/// and the decimals, if any.
pub(crate) fn mantissa_width(significant_digits: u8, decimal_places: u8) -> usize {
    let integer_digits = usize::from(significant_digits.saturating_sub(decimal_places));

    if decimal_places == 0 {
        integer_digits
    } else {
        integer_digits
            .saturating_add(1)
            .saturating_add(usize::from(decimal_places))
    }
}

fn render_zero(decimal_places: u8, width: usize) -> String {
    let mut mantissa = String::from("0");

    if decimal_places > 0 {
        mantissa.push('.');
        mantissa.extend(std::iter::repeat_n('0', usize::from(decimal_places)));
    }

    format!("{mantissa:>width$}  ")
}

/// `floor(log10(magnitude))`, corrected for `log10` being off by one ulp near exact powers of ten.
#[expect(
    clippy::cast_possible_truncation,
    reason = "log10 of a finite f64 is within +-400, which always fits"
)]
#[cfg_attr(test, mutants::skip)] // The corrections only matter on platforms with an inexact log10.
fn decimal_exponent(magnitude: f64) -> i32 {
    let mut exponent = magnitude.log10().floor() as i32;

    let normalized = scale_by_power_of_ten(magnitude, exponent.saturating_neg());

    if normalized >= 10.0 {
        exponent = exponent.saturating_add(1);
    } else if normalized < 1.0 {
        exponent = exponent.saturating_sub(1);
    }

    exponent
}

/// The smallest multiple of 3 that leaves at most `integer_digits` digits before the decimal
/// point of a value whose decimal exponent is `exponent`.
fn group_exponent(exponent: i32, integer_digits: i32) -> i32 {
    let lowest = exponent
        .saturating_add(1)
        .saturating_sub(integer_digits);

    let group = lowest.div_euclid(3).saturating_mul(3);

    if group < lowest {
        group.saturating_add(3)
    } else {
        group
    }
}

/// Returns `magnitude / 10^exponent * 10^decimals`, rounded half away from zero.
///
/// The result is an integer-valued float whose digits are the rendered mantissa.
fn scaled_mantissa(magnitude: f64, exponent: i32, decimals: i32) -> f64 {
    scale_by_power_of_ten(magnitude, decimals.saturating_sub(exponent)).round()
}

/// Multiplies by `10^power`, splitting the operation to avoid intermediate overflow.
fn scale_by_power_of_ten(mut value: f64, mut power: i32) -> f64 {
    while power > MAX_SCALE_STEP {
        value *= 10_f64.powi(MAX_SCALE_STEP);
        power = power.saturating_sub(MAX_SCALE_STEP);
    }

    while power < -MAX_SCALE_STEP {
        value /= 10_f64.powi(MAX_SCALE_STEP);
        power = power.saturating_add(MAX_SCALE_STEP);
    }

    // Dividing by an exact power of ten rounds once, multiplying by the reciprocal twice.
    if power >= 0 {
        value * 10_f64.powi(power)
    } else {
        value / 10_f64.powi(power.saturating_neg())
    }
}

/// Appends the digits of `scaled` with a decimal point inserted `decimal_places` from the right.
fn push_mantissa(text: &mut String, scaled: f64, decimal_places: u8) {
    // An integer-valued f64 prints its exact decimal expansion with zero precision.
    let digits = format!("{scaled:.0}");
    let decimal_places = usize::from(decimal_places);

    if decimal_places == 0 {
        text.push_str(&digits);
        return;
    }

    // At least one digit before the decimal point.
    let padded = format!("{digits:0>width$}", width = decimal_places + 1);

    // Digits are ASCII, so any index is a char boundary.
    let (integer_part, fraction_part) = padded.split_at(padded.len() - decimal_places);

    text.push_str(integer_part);
    text.push('.');
    text.push_str(fraction_part);
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn special_values() {
        assert_eq!(format(f64::NAN, 1, 0), "NaN");
        assert_eq!(format(f64::INFINITY, 1, 0), "INF");
        assert_eq!(format(f64::NEG_INFINITY, 1, 0), "-INF");
    }

    #[test]
    fn zero_has_blank_prefix() {
        assert_eq!(format(0.0, 1, 0), "0  ");
        assert_eq!(format(-0.0, 1, 0), "0  ");
        assert_eq!(format(0.0, 3, 2), "0.00  ");
    }

    #[test]
    fn subnormal_is_clamped_to_zero() {
        let subnormal = f64::MIN_POSITIVE / 4.0;
        assert!(subnormal > 0.0);

        assert_eq!(format(subnormal, 3, 1), " 0.0  ");
        assert_eq!(format(-subnormal, 3, 1), " 0.0  ");
    }

    #[test]
    fn smallest_normal_is_not_clamped() {
        let text = format(f64::MIN_POSITIVE, 3, 1);
        assert!(text.contains('e'), "{text}");
        assert!(!text.starts_with("0.0"), "{text}");
    }

    #[test]
    fn plain_values() {
        assert_eq!(format(1.0, 1, 0), "1  ");
        assert_eq!(format(5.0, 2, 1), "5.0  ");
        assert_eq!(format(12.345, 3, 1), "12.3  ");
        assert_eq!(format(123.45, 4, 1), "123.5  ");
    }

    #[test]
    fn nanoseconds() {
        assert_eq!(format(600e-9, 4, 1), "600.0 n");
        assert_eq!(format(200e-9, 4, 1), "200.0 n");
        assert_eq!(format(1.5e-9, 4, 1), "  1.5 n");
    }

    #[test]
    fn prefix_is_chosen_so_integer_digits_fit() {
        // Two integer digits available: 123 ns does not fit, so it is rendered in microseconds.
        assert_eq!(format(123e-9, 3, 1), " 0.1 u");

        // Three integer digits available: it fits.
        assert_eq!(format(123e-9, 4, 1), "123.0 n");
    }

    #[test]
    fn rounding_carry_moves_to_next_prefix() {
        // 995 ns has three integer digits, so with two available it is 0.995 us -> 1.0 us.
        assert_eq!(format(995e-9, 3, 1), " 1.0 u");

        // 99.96 fits in two integer digits but rounds to 100.0, which does not.
        assert_eq!(format(99.96, 3, 1), " 0.1 k");

        // 999.96 with three integer digits rounds to 1000.0 and must carry.
        assert_eq!(format(999.96e-9, 4, 1), "  1.0 u");

        // 9.995 with one integer digit rounds to 10.00 and must carry.
        assert_eq!(format(9.995e3, 3, 2), "0.01 M");
    }

    #[test]
    fn no_carry_when_rounded_mantissa_still_fits() {
        assert_eq!(format(9.96, 3, 1), "10.0  ");
        assert_eq!(format(999.94e-9, 4, 1), "999.9 n");
    }

    #[test]
    fn half_rounds_away_from_zero() {
        assert_eq!(format(2.5, 1, 0), "3  ");
        assert_eq!(format(-2.5, 1, 0), "-3  ");
        assert_eq!(format(0.125, 3, 2), "0.13  ");
    }

    #[test]
    fn negative_values() {
        assert_eq!(format(-600e-9, 4, 1), "-600.0 n");
        assert_eq!(format(-12_345.0, 4, 1), "-12.3 k");
    }

    #[test]
    fn nonzero_never_renders_as_zero() {
        // Between prefix groups: one group down, with more integer digits than requested.
        assert_eq!(format(40.0, 1, 0), "40  ");
        assert_eq!(format(4e-4, 1, 0), "400 u");
        assert_eq!(format(123e-9, 2, 0), "123 n");
        assert_eq!(format(-0.04, 1, 0), "-40 m");
        assert_eq!(format(40.0, 2, 1), "40.0  ");

        // Close enough to the group above to round up into it.
        assert_eq!(format(0.4996, 1, 0), "1  ");
        assert_eq!(format(49.96, 2, 1), "0.1 k");

        // A carry that would land on zero in the group above stays in its own group.
        assert_eq!(format(9.6, 1, 0), "10  ");
        assert_eq!(format(9.96, 2, 1), "10.0  ");

        // Beyond the prefix table as well.
        assert_eq!(format(1e-34, 1, 0), "100e-36");
    }

    #[test]
    fn width_is_constant_for_precision() {
        for (significant_digits, decimal_places) in [(3, 0), (3, 1), (4, 1), (5, 3), (8, 2)] {
            let width = format(1.0, significant_digits, decimal_places).len();

            // Stays within the prefix table for every precision above.
            let mut value = 1e-24;
            while value < 1e24 {
                for candidate in [value, value * 1.5, value * 9.999, value * 99.5, value * 999.5] {
                    let text = format(candidate, significant_digits, decimal_places);
                    assert_eq!(
                        text.len(),
                        width,
                        "{text:?} for {candidate:e} at ({significant_digits}, {decimal_places})"
                    );
                }

                value *= 10.0;
            }

            assert_eq!(format(0.0, significant_digits, decimal_places).len(), width);
        }
    }

    #[test]
    fn mantissa_is_right_aligned() {
        assert_eq!(format(1e-6, 4, 1), "  1.0 u");
        assert_eq!(format(600e-9, 4, 1), "600.0 n");
        assert_eq!(format(-1e-6, 4, 1), " -1.0 u");
        assert_eq!(format(0.0, 4, 1), "  0.0  ");
    }

    #[test]
    fn mantissa_width_examples() {
        assert_eq!(mantissa_width(1, 0), 1);
        assert_eq!(mantissa_width(4, 1), 5);
        assert_eq!(mantissa_width(3, 2), 4);
    }

    #[test]
    fn table_extremes() {
        assert_eq!(format(1e-30, 2, 0), " 1 q");
        assert_eq!(format(5e30, 2, 0), " 5 Q");
    }

    #[test]
    fn out_of_table_uses_scientific_form() {
        assert_eq!(format(1e33, 2, 0), " 1e33");
        assert_eq!(format(2e-33, 2, 0), " 2e-33");
        assert_eq!(format(-1.5e40, 3, 1), "-15.0e39");
    }

    #[test]
    fn fraction_only_mantissa() {
        assert_eq!(format(0.05, 3, 2), "0.05  ");
        assert_eq!(format(0.5, 2, 1), "0.5  ");

        // With a single integer digit, thousandths still get their own prefix.
        assert_eq!(format(0.004, 4, 3), "4.000 m");
    }

    #[test]
    fn try_format_rejects_invalid_precision() {
        assert!(matches!(
            try_format(1.0, 1, 1),
            Err(crate::Error::InvalidPrecision {
                significant_digits: 1,
                decimal_places: 1
            })
        ));

        assert!(try_format(1.0, 0, 0).is_err());
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic]
    fn format_panics_on_invalid_precision_in_debug() {
        let _text = format(1.0, 2, 2);
    }

    #[test]
    fn group_exponent_examples() {
        assert_eq!(group_exponent(-7, 2), -6);
        assert_eq!(group_exponent(-7, 3), -9);
        assert_eq!(group_exponent(1, 2), 0);
        assert_eq!(group_exponent(33, 2), 33);
        assert_eq!(group_exponent(0, 1), 0);
    }

    #[test]
    fn decimal_exponent_at_powers_of_ten() {
        assert_eq!(decimal_exponent(1.0), 0);
        assert_eq!(decimal_exponent(1000.0), 3);
        assert_eq!(decimal_exponent(999.999), 2);
        assert_eq!(decimal_exponent(2e-9), -9);
    }
}
