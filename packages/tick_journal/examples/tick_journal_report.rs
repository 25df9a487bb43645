//! Measures a few kinds of work and prints a report to stdout.
//!
//! Calibration and thread pinning emit `tracing` events, shown here on stderr.
//!
//! Run with: `cargo run --example tick_journal_report`.
#![expect(
    clippy::arithmetic_side_effects,
    reason = "this is example code that does not need production-level safety"
)]

use std::fmt::Write;
use std::hint::black_box;

use tick_journal::{
    CalibrationSnapshot, Direction, Info, IoSink, Journal, ReportOptions, SortKey,
    StatisticsOptions,
};

fn main() {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_writer(std::io::stderr)
        .init();

    println!("{}", Info::current());
    println!();

    let journal = Journal::builder()
        .statistics(StatisticsOptions::new())
        .build();

    let formatting = journal.entry("string_formatting");
    for round in 0..100 {
        let _meter = formatting.measure_amount(50);

        let mut text = String::new();
        for item in 0..50 {
            write!(text, "round {round} item {item}; ").expect("writing to a String cannot fail");
        }
        black_box(text);
    }

    let sorting = journal.entry("vector_sorting");
    for round in 0..100_u64 {
        let mut values = (0..1_000_u64)
            .map(|value| value.wrapping_mul(2_654_435_761).wrapping_add(round))
            .collect::<Vec<_>>();

        sorting.time(|| values.sort_unstable());
        black_box(values);
    }

    // Too cheap to stand out from the cost of measuring it.
    let noop = journal.entry("noop");
    for _ in 0..100 {
        noop.time(|| black_box(()));
    }

    for _ in 0..10 {
        let _meter = tick_journal::meter!("global_call_site");
        black_box((0..10_000_u64).sum::<u64>());
    }

    let options = ReportOptions::new()
        .title("tick_journal example")
        .sort(SortKey::Time)
        .direction(Direction::Descending)
        .show_duration(true)
        .show_unit(true)
        .show_resolution(true)
        .show_overhead(true);

    let calibration = CalibrationSnapshot::current();
    let mut sink = IoSink::new(std::io::stdout().lock());

    journal
        .report(&options, &calibration, &mut sink)
        .expect("stdout accepts the report");

    println!();

    tick_journal::global()
        .report(&ReportOptions::new().title("global journal"), &calibration, &mut sink)
        .expect("stdout accepts the report");
}
