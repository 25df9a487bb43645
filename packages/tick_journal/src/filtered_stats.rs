/// Configures the outlier-filtered running statistics of journal entries.
///
/// Each recorded call contributes one sample: its ticks divided by its amount. Samples that
/// deviate from the running mean by more than `outlier_threshold` standard deviations are
/// "bounces". They still count towards the raw totals of the entry but not towards the
/// filtered statistics.
///
/// # Example
///
/// ```
/// use tick_journal::{Journal, StatisticsOptions};
///
/// let journal = Journal::builder()
///     .statistics(StatisticsOptions::new().outlier_threshold(4.0))
///     .build();
///
/// let entry = journal.entry("lookup");
/// entry.record(100, 1);
///
/// let snapshot = entry.snapshot();
/// assert_eq!(snapshot.filtered().unwrap().calls(), 1);
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StatisticsOptions {
    warmup_samples: u64,
    outlier_threshold: f64,
}

impl StatisticsOptions {
    /// Creates options with default values.
    #[must_use]
    pub fn new() -> Self {
        Self {
            warmup_samples: 8,
            outlier_threshold: 3.0,
        }
    }

    /// How many samples must be in the filtered statistics before any sample can be rejected.
    ///
    /// Default: 8.
    #[must_use]
    pub fn warmup_samples(self, warmup_samples: u64) -> Self {
        Self {
            warmup_samples,
            ..self
        }
    }

    /// How many standard deviations away from the running mean a sample may be before it is
    /// rejected.
    ///
    /// Default: 3.0.
    #[must_use]
    pub fn outlier_threshold(self, outlier_threshold: f64) -> Self {
        Self {
            outlier_threshold,
            ..self
        }
    }
}

impl Default for StatisticsOptions {
    fn default() -> Self {
        Self::new()
    }
}

/// Welford running mean and variance over the per-unit ticks of each call.
#[derive(Debug)]
pub(crate) struct FilteredStats {
    options: StatisticsOptions,

    calls: u64,
    amount: u64,
    mean: f64,
    sum_of_squares: f64,
    bounces: u64,
}

impl FilteredStats {
    pub(crate) fn new(options: StatisticsOptions) -> Self {
        Self {
            options,
            calls: 0,
            amount: 0,
            mean: 0.0,
            sum_of_squares: 0.0,
            bounces: 0,
        }
    }

    #[expect(
        clippy::cast_precision_loss,
        reason = "statistics tolerate precision loss beyond 2^52 ticks"
    )]
    pub(crate) fn add(&mut self, ticks: u64, amount: u64) {
        let sample = ticks as f64 / amount as f64;

        if self.is_outlier(sample) {
            self.bounces = self.bounces.wrapping_add(1);
            return;
        }

        self.calls = self.calls.wrapping_add(1);
        self.amount = self.amount.wrapping_add(amount);

        let mean_before = self.mean;
        self.mean += (sample - mean_before) / self.calls as f64;
        self.sum_of_squares += (sample - mean_before) * (sample - self.mean);
    }

    fn is_outlier(&self, sample: f64) -> bool {
        if self.calls < self.options.warmup_samples {
            return false;
        }

        let std_dev = std_dev(self.calls, self.sum_of_squares);

        // All samples so far were identical, nothing to compare against.
        if std_dev <= 0.0 {
            return false;
        }

        (sample - self.mean).abs() > self.options.outlier_threshold * std_dev
    }

    pub(crate) fn reset(&mut self) {
        *self = Self::new(self.options);
    }

    pub(crate) fn snapshot(&self) -> FilteredSnapshot {
        FilteredSnapshot {
            calls: self.calls,
            amount: self.amount,
            mean_ticks: self.mean,
            sum_of_squares: self.sum_of_squares,
            bounces: self.bounces,
        }
    }
}

#[expect(
    clippy::cast_precision_loss,
    reason = "statistics tolerate precision loss beyond 2^52 calls"
)]
fn std_dev(calls: u64, sum_of_squares: f64) -> f64 {
    if calls == 0 {
        return 0.0;
    }

    (sum_of_squares / calls as f64).max(0.0).sqrt()
}

/// Point-in-time copy of the filtered statistics of an entry.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FilteredSnapshot {
    calls: u64,
    amount: u64,
    mean_ticks: f64,
    sum_of_squares: f64,
    bounces: u64,
}

impl FilteredSnapshot {
    /// Calls that were not rejected as outliers.
    #[must_use]
    pub fn calls(&self) -> u64 {
        self.calls
    }

    /// Total amount of the calls that were not rejected as outliers.
    #[must_use]
    pub fn amount(&self) -> u64 {
        self.amount
    }

    /// Running mean of ticks per unit of amount.
    #[must_use]
    pub fn mean_ticks(&self) -> f64 {
        self.mean_ticks
    }

    /// Sum of squared deviations from the running mean.
    #[must_use]
    pub fn sum_of_squares(&self) -> f64 {
        self.sum_of_squares
    }

    /// Calls that were rejected as outliers.
    #[must_use]
    pub fn bounces(&self) -> u64 {
        self.bounces
    }

    /// Population standard deviation of ticks per unit of amount.
    #[must_use]
    pub fn std_dev_ticks(&self) -> f64 {
        std_dev(self.calls, self.sum_of_squares)
    }

    /// Standard deviation relative to the mean.
    ///
    /// `None` if there are no samples or the mean is not positive.
    #[must_use]
    pub fn coefficient_of_variation(&self) -> Option<f64> {
        if self.calls == 0 || self.mean_ticks <= 0.0 {
            return None;
        }

        Some(self.std_dev_ticks() / self.mean_ticks)
    }
}
