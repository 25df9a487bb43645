use std::ops::ControlFlow;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, OnceLock};

use foldhash::{HashMap, HashMapExt};

use crate::pal::{Platform, PlatformFacade};
use crate::{
    CalibrationSnapshot, ERR_POISONED_LOCK, Entry, EntryHandle, EntrySnapshot, JournalBuilder,
    LineSink, ReportError, ReportOptions, StatisticsOptions, render,
};

/// State shared between a journal and all handles to its entries.
#[derive(Debug)]
pub(crate) struct JournalState {
    // Incremented when the journal is closed, invalidating every handle issued before.
    epoch: AtomicU64,

    platform: PlatformFacade,
}

impl JournalState {
    #[inline]
    pub(crate) fn is_epoch(&self, epoch: u64) -> bool {
        self.epoch.load(Ordering::Acquire) == epoch
    }

    #[inline]
    pub(crate) fn platform(&self) -> &PlatformFacade {
        &self.platform
    }
}

/// A registry of named measurement entries.
///
/// Entries are created on first lookup by name and live until the journal is closed. Looking up
/// the same name again, from any thread, returns a handle to the same entry.
///
/// # Example
///
/// ```
/// use std::ops::ControlFlow;
///
/// use tick_journal::Journal;
///
/// let journal = Journal::new();
///
/// journal.entry("b").record(200, 1);
/// journal.entry("a").record(100, 1);
/// journal.entry("b").record(300, 1);
///
/// let mut names = Vec::new();
/// let _: ControlFlow<()> = journal.enumerate(|entry| {
///     names.push(format!("{}={}", entry.name(), entry.ticks()));
///     ControlFlow::Continue(())
/// });
///
/// assert_eq!(names, ["a=100", "b=500"]);
/// ```
#[derive(Debug)]
pub struct Journal {
    entries: Mutex<HashMap<String, Arc<Entry>>>,

    state: Arc<JournalState>,
    statistics: Option<StatisticsOptions>,

    created_ticks: u64,
}

impl Journal {
    /// Creates a journal without filtered statistics.
    #[must_use]
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// Starts building a journal with custom settings.
    #[must_use]
    pub fn builder() -> JournalBuilder {
        JournalBuilder::new()
    }

    pub(crate) fn new_with(
        statistics: Option<StatisticsOptions>,
        platform: PlatformFacade,
    ) -> Self {
        let created_ticks = platform.ticks();

        Self {
            entries: Mutex::new(HashMap::new()),
            state: Arc::new(JournalState {
                epoch: AtomicU64::new(0),
                platform,
            }),
            statistics,
            created_ticks,
        }
    }

    /// Returns a handle to the entry with the given name, creating the entry if it does not
    /// exist yet.
    ///
    /// This takes the journal lock. Keep the handle around instead of looking the entry up again
    /// on hot paths.
    #[must_use]
    pub fn entry(&self, name: &str) -> EntryHandle {
        let entry = {
            let mut entries = self.entries.lock().expect(ERR_POISONED_LOCK);

            if let Some(existing) = entries.get(name) {
                Arc::clone(existing)
            } else {
                let created = Arc::new(Entry::new(name.to_string(), self.statistics));
                entries.insert(name.to_string(), Arc::clone(&created));
                created
            }
        };

        EntryHandle::new(entry, Arc::clone(&self.state), self.epoch())
    }

    /// Visits a snapshot of every entry, in ascending order of name.
    ///
    /// The journal lock is only held while collecting the list of entries, not while visiting
    /// them, so the visitor may itself use the journal. Returning [`ControlFlow::Break`] from
    /// the visitor stops the enumeration and is returned to the caller.
    pub fn enumerate<B>(
        &self,
        mut visit: impl FnMut(&EntrySnapshot) -> ControlFlow<B>,
    ) -> ControlFlow<B> {
        let mut entries = {
            let entries = self.entries.lock().expect(ERR_POISONED_LOCK);
            entries.values().map(Arc::clone).collect::<Vec<_>>()
        };

        entries.sort_unstable_by(|a, b| a.name().cmp(b.name()));

        for entry in entries {
            if let ControlFlow::Break(value) = visit(&entry.snapshot()) {
                return ControlFlow::Break(value);
            }
        }

        ControlFlow::Continue(())
    }

    /// Zeroes the counters of the entry with the given name. Handles to it remain valid.
    ///
    /// Returns `false` if there is no such entry.
    pub fn reset(&self, name: &str) -> bool {
        let entry = self
            .entries
            .lock()
            .expect(ERR_POISONED_LOCK)
            .get(name)
            .map(Arc::clone);

        let Some(entry) = entry else {
            return false;
        };

        entry.reset();
        true
    }

    /// Zeroes the counters of every entry. Handles remain valid.
    pub fn reset_all(&self) {
        let entries = {
            let entries = self.entries.lock().expect(ERR_POISONED_LOCK);
            entries.values().map(Arc::clone).collect::<Vec<_>>()
        };

        for entry in entries {
            entry.reset();
        }
    }

    /// Closes the journal, releasing all entries. Equivalent to dropping it.
    ///
    /// Handles to entries of a closed journal must no longer be used.
    pub fn close(self) {
        drop(self);
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.lock().expect(ERR_POISONED_LOCK).len()
    }

    /// Whether the journal has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Ticks elapsed since the journal was created.
    #[must_use]
    pub fn elapsed_ticks(&self) -> u64 {
        self.state.platform().ticks().saturating_sub(self.created_ticks)
    }

    /// Renders a report of all entries into `sink`. See [`render()`][crate::render].
    ///
    /// # Errors
    ///
    /// Returns [`ReportError::Stopped`] if the sink asks to stop before the report is complete.
    pub fn report(
        &self,
        options: &ReportOptions,
        calibration: &CalibrationSnapshot,
        sink: &mut impl LineSink,
    ) -> Result<usize, ReportError> {
        render(self, options, calibration, sink)
    }

    fn epoch(&self) -> u64 {
        self.state.epoch.load(Ordering::Acquire)
    }
}

impl Default for Journal {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Journal {
    fn drop(&mut self) {
        self.state.epoch.fetch_add(1, Ordering::AcqRel);

        // A poisoned lock is no reason to panic while dropping.
        let entries = match self.entries.get_mut() {
            Ok(entries) => entries,
            Err(poisoned) => poisoned.into_inner(),
        };

        entries.clear();
    }
}

/// The process-wide journal used by [`CallSite`][crate::CallSite] and [`meter!`][crate::meter].
///
/// Created on first use and never closed.
///
/// # Example
///
/// ```
/// let handle = tick_journal::global().entry("startup");
/// handle.record(1234, 1);
///
/// assert!(tick_journal::global().entry("startup").snapshot().calls() >= 1);
/// ```
#[must_use]
pub fn global() -> &'static Journal {
    static GLOBAL: OnceLock<Journal> = OnceLock::new();

    GLOBAL.get_or_init(Journal::new)
}
