//! Formatting an already formatted (and therefore already rounded) value must not change it.

#![allow(clippy::indexing_slicing, reason = "panic is fine in tests")]

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

const PREFIXES: &str = "qryzafpnum kMGTPEZYRQ";

/// Reads back the numeric value of a rendered string.
fn parse_rendered(text: &str) -> f64 {
    // Drop the alignment padding in front of the mantissa.
    let text = text.trim_start();

    if let Some((mantissa, prefix)) = text.rsplit_once(' ') {
        // The blank prefix leaves an empty string after the last space.
        let mantissa = mantissa.trim_end();
        let prefix = prefix.chars().next().unwrap_or(' ');

        let index = PREFIXES
            .chars()
            .position(|c| c == prefix)
            .expect("every rendered prefix is in the table");

        let exponent = i32::try_from(index).unwrap() * 3 - 30;

        mantissa.parse::<f64>().unwrap() * 10_f64.powi(exponent)
    } else {
        let (mantissa, exponent) = text.split_once('e').expect("scientific form");
        mantissa.parse::<f64>().unwrap() * 10_f64.powi(exponent.parse::<i32>().unwrap())
    }
}

#[test]
fn parse_rendered_reads_all_forms() {
    assert!((parse_rendered("  1.0 u") - 1e-6).abs() < 1e-18);
    assert!((parse_rendered("12.5  ") - 12.5).abs() < 1e-12);
    assert!((parse_rendered("-3 k") + 3000.0).abs() < 1e-9);
    assert!((parse_rendered("15.0e39") - 1.5e40).abs() < 1e26);
    assert!((parse_rendered(" 1e33") - 1e33).abs() < 1e19);
}

#[test]
fn reformatting_is_idempotent() {
    let mut rng = SmallRng::seed_from_u64(0x5EED);

    for _ in 0..20_000 {
        let significant_digits: u8 = rng.random_range(1..=8);
        let decimal_places: u8 = rng.random_range(0..significant_digits);

        let mantissa: f64 = rng.random_range(1.0..10.0);
        let exponent: i32 = rng.random_range(-35..=35);
        let sign = if rng.random_bool(0.5) { 1.0 } else { -1.0 };

        let value = sign * mantissa * 10_f64.powi(exponent);

        let first = sig_fmt::format(value, significant_digits, decimal_places);
        let second = sig_fmt::format(parse_rendered(&first), significant_digits, decimal_places);

        assert_eq!(
            first, second,
            "{value:e} with precision ({significant_digits}, {decimal_places})"
        );
    }
}

#[test]
fn values_between_prefixes_reformat_identically() {
    for (value, significant_digits, decimal_places) in [
        (40.0, 1, 0),
        (4e-4, 1, 0),
        (123e-9, 2, 0),
        (0.4996, 1, 0),
        (49.96, 2, 1),
        (9.6, 1, 0),
        (1e-34, 1, 0),
    ] {
        let first = sig_fmt::format(value, significant_digits, decimal_places);
        let second = sig_fmt::format(parse_rendered(&first), significant_digits, decimal_places);

        assert_eq!(
            first, second,
            "{value:e} with precision ({significant_digits}, {decimal_places})"
        );
        assert!(parse_rendered(&first).abs() > 0.0, "{value:e} rendered as {first:?}");
    }
}

#[test]
fn carried_values_reformat_identically() {
    for (value, significant_digits, decimal_places) in
        [(995e-9, 3, 1), (99.96, 3, 1), (999.96e-9, 4, 1), (9.995e3, 3, 2)]
    {
        let first = sig_fmt::format(value, significant_digits, decimal_places);
        let second = sig_fmt::format(parse_rendered(&first), significant_digits, decimal_places);

        assert_eq!(first, second);
    }
}
