use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::{ERR_POISONED_LOCK, FilteredSnapshot, FilteredStats, StatisticsOptions};

// Counters only ever grow (until reset) and are read back only for reporting, so no ordering
// relative to other memory is needed.
const COUNTER_ORDERING: Ordering = Ordering::Relaxed;

/// One named accumulator of a journal.
///
/// The raw counters are updated with atomic additions. The filtered statistics, if enabled,
/// have a lock of their own that is never shared with another entry or with the journal.
#[derive(Debug)]
pub(crate) struct Entry {
    name: String,

    calls: AtomicU64,
    amount: AtomicU64,
    ticks: AtomicU64,

    filtered: Option<Mutex<FilteredStats>>,
}

impl Entry {
    pub(crate) fn new(name: String, statistics: Option<StatisticsOptions>) -> Self {
        Self {
            name,
            calls: AtomicU64::new(0),
            amount: AtomicU64::new(0),
            ticks: AtomicU64::new(0),
            filtered: statistics.map(|options| Mutex::new(FilteredStats::new(options))),
        }
    }

    pub(crate) fn name(&self) -> &str {
        &self.name
    }

    /// Adds one call that took `ticks` ticks and processed `amount` units.
    #[inline]
    pub(crate) fn record(&self, ticks: u64, amount: u64) {
        debug_assert!(amount >= 1, "recorded amount must be at least 1");
        let amount = amount.max(1);

        self.calls.fetch_add(1, COUNTER_ORDERING);
        self.amount.fetch_add(amount, COUNTER_ORDERING);
        self.ticks.fetch_add(ticks, COUNTER_ORDERING);

        if let Some(filtered) = &self.filtered {
            filtered.lock().expect(ERR_POISONED_LOCK).add(ticks, amount);
        }
    }

    pub(crate) fn reset(&self) {
        self.calls.store(0, COUNTER_ORDERING);
        self.amount.store(0, COUNTER_ORDERING);
        self.ticks.store(0, COUNTER_ORDERING);

        if let Some(filtered) = &self.filtered {
            filtered.lock().expect(ERR_POISONED_LOCK).reset();
        }
    }

    /// Reads the counters. A record in progress on another thread may be partially visible.
    pub(crate) fn snapshot(&self) -> EntrySnapshot {
        EntrySnapshot {
            name: self.name.clone(),
            calls: self.calls.load(COUNTER_ORDERING),
            amount: self.amount.load(COUNTER_ORDERING),
            ticks: self.ticks.load(COUNTER_ORDERING),
            filtered: self
                .filtered
                .as_ref()
                .map(|filtered| filtered.lock().expect(ERR_POISONED_LOCK).snapshot()),
        }
    }
}

/// Point-in-time copy of the counters of one journal entry.
#[derive(Clone, Debug, PartialEq)]
pub struct EntrySnapshot {
    name: String,
    calls: u64,
    amount: u64,
    ticks: u64,
    filtered: Option<FilteredSnapshot>,
}

impl EntrySnapshot {
    /// Name of the entry, unique within its journal.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of recorded calls.
    #[must_use]
    pub fn calls(&self) -> u64 {
        self.calls
    }

    /// Sum of the amounts of all recorded calls. At least [`calls()`][Self::calls].
    #[must_use]
    pub fn amount(&self) -> u64 {
        self.amount
    }

    /// Sum of the ticks of all recorded calls, without any overhead correction.
    #[must_use]
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Outlier-filtered statistics, if the journal tracks them.
    #[must_use]
    pub fn filtered(&self) -> Option<&FilteredSnapshot> {
        self.filtered.as_ref()
    }
}
