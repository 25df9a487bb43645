use std::sync::Arc;

use crate::pal::Platform;
use crate::{Entry, EntrySnapshot, JournalState, Meter};

/// Records measurements into one entry of a [`Journal`][crate::Journal].
///
/// Obtained from [`Journal::entry()`][crate::Journal::entry]. Cloning a handle is cheap and all
/// clones refer to the same entry. Handles can be shared between threads and recording through
/// them never takes a lock that is shared with other entries.
///
/// A handle must not be used after its journal has been closed. Doing so panics in debug builds
/// and is ignored in release builds.
///
/// # Example
///
/// ```
/// use tick_journal::Journal;
///
/// let journal = Journal::new();
/// let checksum = journal.entry("checksum");
///
/// let data = vec![1_u8; 4096];
///
/// let sum = checksum.time(|| data.iter().map(|&b| u64::from(b)).sum::<u64>());
/// assert_eq!(sum, 4096);
///
/// assert_eq!(checksum.snapshot().calls(), 1);
/// ```
#[derive(Clone, Debug)]
pub struct EntryHandle {
    entry: Arc<Entry>,
    journal: Arc<JournalState>,

    // The journal epoch this handle was issued in.
    epoch: u64,
}

impl EntryHandle {
    pub(crate) fn new(entry: Arc<Entry>, journal: Arc<JournalState>, epoch: u64) -> Self {
        Self {
            entry,
            journal,
            epoch,
        }
    }

    /// Name of the entry.
    #[must_use]
    pub fn name(&self) -> &str {
        self.entry.name()
    }

    /// Adds one call that took `ticks` ticks and processed `amount` units of work.
    ///
    /// This is what a [`Meter`] does when it is dropped. Use it directly to record measurements
    /// taken with [`ticks()`][crate::ticks] or by other means.
    ///
    /// # Panics
    ///
    /// In debug builds, panics if `amount` is zero or if the journal has been closed.
    /// Release builds record an `amount` of zero as 1 and ignore records into closed journals.
    #[inline]
    pub fn record(&self, ticks: u64, amount: u64) {
        let open = self.journal.is_epoch(self.epoch);
        debug_assert!(open, "entry handle used after its journal was closed");

        if open {
            self.entry.record(ticks, amount);
        }
    }

    /// Starts measuring one call that processes one unit of work.
    ///
    /// The measurement is recorded when the returned meter is dropped.
    #[inline]
    pub fn measure(&self) -> Meter<'_> {
        Meter::new(self, 1)
    }

    /// Starts measuring one call that processes `amount` units of work.
    ///
    /// The report divides the time of the call by `amount`, so a meter around a batch of 1000
    /// operations yields the average time of one operation.
    ///
    /// # Panics
    ///
    /// In debug builds, panics if `amount` is zero. Release builds treat zero as 1.
    #[inline]
    pub fn measure_amount(&self, amount: u64) -> Meter<'_> {
        Meter::new(self, amount)
    }

    /// Measures one call of `f`, returning its result.
    #[inline]
    pub fn time<R>(&self, f: impl FnOnce() -> R) -> R {
        let _meter = self.measure();
        f()
    }

    /// Reads the current values of the entry.
    #[must_use]
    pub fn snapshot(&self) -> EntrySnapshot {
        self.entry.snapshot()
    }

    #[inline]
    pub(crate) fn read_ticks(&self) -> u64 {
        self.journal.platform().ticks()
    }
}
