//! Platform Abstraction Layer (PAL). Everything that touches the tick counter, the wall clock or
//! the scheduler goes through the `Platform` trait so that it can be faked in tests.

mod abstractions;
mod facade;
mod tick_counter;

pub(crate) use abstractions::*;
pub(crate) use facade::*;

#[cfg(target_os = "linux")]
mod linux;
#[cfg(target_os = "linux")]
pub(crate) use linux::*;

#[cfg(windows)]
mod windows;
#[cfg(windows)]
pub(crate) use windows::*;

#[cfg(not(any(target_os = "linux", windows)))]
mod unsupported;
#[cfg(not(any(target_os = "linux", windows)))]
pub(crate) use unsupported::*;

#[cfg(test)]
mod fake;
#[cfg(test)]
pub(crate) use fake::*;

/// Reads the raw tick counter used by every [`Meter`][crate::Meter].
///
/// Ticks are monotonically non-decreasing within a process. Their duration is not fixed; use a
/// [`CalibrationSnapshot`][crate::CalibrationSnapshot] to convert them to seconds.
///
/// On `x86_64` this is the processor time-stamp counter. Elsewhere it is the number of
/// nanoseconds since the first tick was read in this process.
///
/// # Example
///
/// ```
/// let before = tick_journal::ticks();
/// let after = tick_journal::ticks();
///
/// assert!(after >= before);
/// ```
#[inline]
#[must_use]
pub fn ticks() -> u64 {
    tick_counter::read()
}
