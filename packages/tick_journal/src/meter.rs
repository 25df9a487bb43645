use std::marker::PhantomData;

use crate::EntryHandle;

/// Measures one call of a code region, from creation until drop.
///
/// When the meter is dropped, the ticks elapsed since its creation are recorded into its entry
/// together with the amount of work the call processed. This happens exactly once, on every
/// exit path of the enclosing scope: normal completion, early return, `?` and unwinding.
///
/// Elapsed ticks are clamped at zero, so a tick source that moves backwards (e.g. after the
/// thread migrates between processors with unsynchronized counters) never records a huge
/// wrapped-around value.
///
/// A meter is bound to the thread that created it.
///
/// # Example
///
/// ```
/// use tick_journal::Journal;
///
/// fn parse(journal: &Journal, input: &str) -> Result<u32, std::num::ParseIntError> {
///     let entry = journal.entry("parse");
///     let _meter = entry.measure();
///
///     // Recorded even when this returns early with an error.
///     input.trim().parse()
/// }
///
/// let journal = Journal::new();
///
/// assert!(parse(&journal, "42").is_ok());
/// assert!(parse(&journal, "forty-two").is_err());
///
/// assert_eq!(journal.entry("parse").snapshot().calls(), 2);
/// ```
#[derive(Debug)]
#[must_use = "a meter measures until it is dropped; binding it to `_` drops it immediately"]
pub struct Meter<'h> {
    handle: &'h EntryHandle,
    amount: u64,
    start_ticks: u64,

    _single_threaded: PhantomData<*const ()>,
}

impl<'h> Meter<'h> {
    #[inline]
    pub(crate) fn new(handle: &'h EntryHandle, amount: u64) -> Self {
        debug_assert!(amount >= 1, "metered amount must be at least 1");

        let mut meter = Self {
            handle,
            amount: amount.max(1),
            start_ticks: 0,
            _single_threaded: PhantomData,
        };

        // Last, so that setting up the meter is not part of the measurement.
        meter.start_ticks = handle.read_ticks();

        meter
    }

    /// Ends the measurement now instead of at the end of the scope.
    #[inline]
    pub fn finish(self) {
        drop(self);
    }
}

impl Drop for Meter<'_> {
    #[inline]
    fn drop(&mut self) {
        let end_ticks = self.handle.read_ticks();

        self.handle
            .record(end_ticks.saturating_sub(self.start_ticks), self.amount);
    }
}
