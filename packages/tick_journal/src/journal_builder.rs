use crate::pal::PlatformFacade;
use crate::{Journal, StatisticsOptions};

/// Creates instances of [`Journal`].
///
/// Use [`Journal::builder()`] to create a new instance of this builder.
///
/// # Example
///
/// ```
/// use tick_journal::{Journal, StatisticsOptions};
///
/// let journal = Journal::builder()
///     .statistics(StatisticsOptions::default())
///     .build();
///
/// let entry = journal.entry("decode");
/// entry.record(1000, 10);
///
/// let filtered = *entry.snapshot().filtered().unwrap();
/// assert_eq!(filtered.mean_ticks(), 100.0);
/// ```
#[derive(Debug)]
pub struct JournalBuilder {
    statistics: Option<StatisticsOptions>,
    platform: PlatformFacade,
}

impl JournalBuilder {
    pub(crate) fn new() -> Self {
        Self {
            statistics: None,
            platform: PlatformFacade::real(),
        }
    }

    /// Enables outlier-filtered running statistics for every entry of the journal.
    ///
    /// Filtered statistics cost a per-entry lock on every record. By default they are disabled
    /// and recording only performs atomic additions.
    #[must_use]
    pub fn statistics(self, options: StatisticsOptions) -> Self {
        Self {
            statistics: Some(options),
            ..self
        }
    }

    #[must_use]
    pub(crate) fn platform(self, platform: PlatformFacade) -> Self {
        Self { platform, ..self }
    }

    /// Creates the journal.
    #[must_use]
    pub fn build(self) -> Journal {
        Journal::new_with(self.statistics, self.platform)
    }
}
