//! Renders a range of durations at a few common precisions.

fn main() {
    let durations_seconds = [
        0.0, 1.5e-9, 123e-9, 995e-9, 42.7e-6, 0.003_25, 1.0, 61.5, 12_345.0,
    ];

    for (significant_digits, decimal_places) in [(2, 0), (3, 1), (4, 1), (5, 3)] {
        println!(
            "Precision: {significant_digits} significant digits, {decimal_places} decimal places"
        );

        for seconds in durations_seconds {
            let text = sig_fmt::format(seconds, significant_digits, decimal_places);
            println!("  {seconds:>12e} -> {text}s");
        }
    }
}
