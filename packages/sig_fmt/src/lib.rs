#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Renders floating point quantities (typically durations in seconds) with a caller-chosen number
//! of significant digits and decimal places, automatically picking an SI magnitude prefix.
//!
//! This is part of the [Folo project](https://github.com/folo-rs/folo) that provides mechanisms for
//! high-performance hardware-aware programming in Rust.
//!
//! # Format
//!
//! The output is the mantissa, a space and a single-character SI prefix:
//!
//! * `q r y z a f p n u m` for 10^-30 through 10^-3,
//! * a space for 10^0,
//! * `k M G T P E Z Y R Q` for 10^3 through 10^30.
//!
//! The caller appends the unit, e.g. `s` for seconds. Micro is rendered as the ASCII `u`.
//!
//! The mantissa has `significant_digits - decimal_places` positions before the decimal point and
//! exactly `decimal_places` digits after it. It is right-aligned within those positions, so every
//! non-negative value inside the prefix table renders with the same width for a given precision.
//! A minus sign takes a spare leading position if there is one and widens the output by one
//! character otherwise. When rounding pushes the mantissa over its integer positions (e.g.
//! `999.96 ns` with three integer positions), the value moves up to the next prefix instead.
//!
//! With fewer than three significant digits some values fall between two prefixes (e.g. `40`
//! with one significant digit). A nonzero value is never rendered as zero: such values round up
//! to the smallest mantissa of the upper prefix when they are at least halfway there, otherwise
//! they use the lower prefix with more integer digits than requested (`40  `).
//!
//! Magnitudes beyond the prefix table are rendered in plain scientific form (` 1e33`).
//!
//! Special values have fixed renderings: `NaN`, `INF`, `-INF`. Zero and values smaller than the
//! smallest normal `f64` are rendered as zero with a blank prefix.
//!
//! # Example
//!
//! ```
//! assert_eq!(sig_fmt::format(0.0, 1, 0), "0  ");
//! assert_eq!(sig_fmt::format(1.5e-6, 3, 1), " 1.5 u");
//! assert_eq!(sig_fmt::format(995e-9, 3, 1), " 1.0 u");
//! assert_eq!(sig_fmt::format(12_345.0, 4, 1), " 12.3 k");
//! assert_eq!(sig_fmt::format(600e-9, 4, 1), "600.0 n");
//!
//! let precision = sig_fmt::Precision::new(4, 1).unwrap();
//! println!("Elapsed: {}s", precision.format(0.000_123_4));
//! ```
//!
//! # Contract violations
//!
//! `decimal_places` must be less than `significant_digits`. [`format()`] treats a violation as a
//! programming error: it panics in debug builds and clamps the decimal places in release builds.
//! Use [`try_format()`] or [`Precision::new()`] to validate untrusted input.

mod error;
mod format;
mod precision;
mod prefix;

pub use error::*;
pub use format::*;
pub use precision::*;
pub(crate) use prefix::*;
