#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Low-overhead named timers that accumulate hardware clock ticks and report them as a table.
//!
//! Code regions are wrapped with a [`Meter`] that measures the elapsed ticks of the region and
//! adds them to a named entry of a [`Journal`]. Recording into an existing entry is lock-free,
//! so meters can be placed on hot paths and used from any number of threads at once.
//!
//! Ticks only become durations after calibration: a [`CalibrationSnapshot`] describes how long
//! one tick is and how many ticks the instrumentation itself costs. The report subtracts that
//! cost from every entry, flags entries whose totals are indistinguishable from the cost of
//! measuring them as "insignificant" and renders the rest as an aligned table.
//!
//! The package is a development tool for finding out where time goes. It offers no wall-clock
//! accuracy guarantees, only self-consistent relative timings.
//!
//! This is part of the [Folo project](https://github.com/folo-rs/folo) that provides mechanisms for
//! high-performance hardware-aware programming in Rust.
//!
//! # Example
//!
//! ```
//! use tick_journal::{CalibrationSnapshot, Journal, ReportOptions, SortKey, StringSink};
//!
//! let journal = Journal::new();
//!
//! let parse = journal.entry("parse");
//! let store = journal.entry("store");
//!
//! for chunk in 0..10_u64 {
//!     {
//!         let _meter = parse.measure();
//!         std::hint::black_box(chunk * 2);
//!     }
//!
//!     // One call that processed 100 items.
//!     let _meter = store.measure_amount(100);
//!     std::hint::black_box(chunk * 3);
//! }
//!
//! let calibration = CalibrationSnapshot::current();
//!
//! let mut sink = StringSink::new();
//! journal
//!     .report(
//!         &ReportOptions::new().title("Pipeline").sort(SortKey::Name),
//!         &calibration,
//!         &mut sink,
//!     )
//!     .unwrap();
//!
//! println!("{}", sink.text());
//! ```
//!
//! # Call sites
//!
//! The [`meter!`] macro binds a call site to an entry of the process-wide [`global()`] journal
//! once and then only pays for the two tick reads and the atomic additions:
//!
//! ```
//! fn handle_request() {
//!     let _meter = tick_journal::meter!("handle_request");
//!     // ...
//! }
//!
//! handle_request();
//!
//! assert!(tick_journal::global().len() >= 1);
//! ```
//!
//! # Filtered statistics
//!
//! A journal built with [`JournalBuilder::statistics()`] additionally tracks a running mean and
//! variance of the per-unit cost of each call. Samples that deviate from the running mean by
//! more than a configurable number of standard deviations (e.g. a call that was preempted by the
//! scheduler) are excluded from the filtered statistics but still counted in the raw totals.
//!
//! # Calibration
//!
//! The first call to [`CalibrationSnapshot::current()`] measures the tick source, which busy-waits
//! for a few hundred milliseconds with the calling thread pinned to its current processor.
//! Calibration progress and results are logged via `tracing` at the `debug` level; degraded
//! precision (e.g. failure to pin the thread) is logged at the `warn` level.

mod affinity;
mod calibration;
mod calibration_settings;
mod call_site;
mod entry;
mod entry_handle;
mod error;
mod filtered_stats;
mod info;
mod journal;
mod journal_builder;
mod line_sink;
mod meter;
mod pal;
mod report;
mod report_options;

pub(crate) use affinity::*;
pub use calibration::*;
pub use calibration_settings::*;
pub use call_site::*;
pub use entry::*;
pub use entry_handle::*;
pub use error::*;
pub use filtered_stats::*;
pub use info::*;
pub use journal::*;
pub use journal_builder::*;
pub use line_sink::*;
pub use meter::*;
pub use pal::ticks;
pub use report::*;
pub use report_options::*;

pub(crate) const ERR_POISONED_LOCK: &str =
    "encountered poisoned lock - program validity cannot be guaranteed";
