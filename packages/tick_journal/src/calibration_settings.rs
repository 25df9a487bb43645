use std::num::NonZero;
use std::time::Duration;

/// Fewer trials would leave nothing after discarding the highest and lowest sample.
const MIN_TRIALS: usize = 3;

const DEFAULT_LOOP_ITERATIONS: NonZero<u32> = NonZero::new(1000).unwrap();
const DEFAULT_EXTRA_CALLS: NonZero<u32> = NonZero::new(4).unwrap();

/// Tunes how [`CalibrationSnapshot::measure()`][crate::CalibrationSnapshot::measure] measures
/// the tick source.
///
/// The defaults favor precision over speed: a default calibration busy-waits for roughly
/// `trials * wall_interval` (about 150 ms) plus a few milliseconds of timing loops.
///
/// # Example
///
/// ```
/// use std::time::Duration;
///
/// use tick_journal::{CalibrationSettings, CalibrationSnapshot};
///
/// // A quick and rough calibration.
/// let settings = CalibrationSettings::new()
///     .trials(3)
///     .wall_interval(Duration::from_millis(2));
///
/// let snapshot = CalibrationSnapshot::measure(&settings);
/// assert!(snapshot.seconds_per_tick() > 0.0);
/// ```
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CalibrationSettings {
    trials: usize,
    wall_interval: Duration,
    loop_iterations: NonZero<u32>,
    extra_calls: NonZero<u32>,
    spin_limit: u64,
}

impl CalibrationSettings {
    /// Creates settings with default values.
    #[must_use]
    pub fn new() -> Self {
        Self {
            trials: 7,
            wall_interval: Duration::from_millis(20),
            loop_iterations: DEFAULT_LOOP_ITERATIONS,
            extra_calls: DEFAULT_EXTRA_CALLS,
            spin_limit: 10_000_000,
        }
    }

    /// How many times each quantity is measured. The highest and lowest results are discarded
    /// and the rest averaged.
    ///
    /// Default: 7. Values below 3 are raised to 3.
    #[must_use]
    pub fn trials(self, trials: usize) -> Self {
        Self {
            trials: trials.max(MIN_TRIALS),
            ..self
        }
    }

    /// How long each seconds-per-tick trial compares the tick source against the wall clock.
    ///
    /// Default: 20 milliseconds.
    #[must_use]
    pub fn wall_interval(self, wall_interval: Duration) -> Self {
        Self {
            wall_interval,
            ..self
        }
    }

    /// Iterations of each overhead measurement loop.
    ///
    /// Default: 1000.
    #[must_use]
    pub fn loop_iterations(self, loop_iterations: NonZero<u32>) -> Self {
        Self {
            loop_iterations,
            ..self
        }
    }

    /// Additional calls per iteration in the "dirty" overhead measurement loop.
    ///
    /// Default: 4.
    #[must_use]
    pub fn extra_calls(self, extra_calls: NonZero<u32>) -> Self {
        Self {
            extra_calls,
            ..self
        }
    }

    /// How many reads of a tick source that does not advance are tolerated before its
    /// resolution is declared unmeasurable.
    ///
    /// Default: 10 000 000.
    #[must_use]
    pub fn spin_limit(self, spin_limit: u64) -> Self {
        Self { spin_limit, ..self }
    }

    pub(crate) fn trial_count(&self) -> usize {
        self.trials
    }

    pub(crate) fn interval(&self) -> Duration {
        self.wall_interval
    }

    pub(crate) fn iterations(&self) -> u32 {
        self.loop_iterations.get()
    }

    pub(crate) fn extra_calls_per_iteration(&self) -> u32 {
        self.extra_calls.get()
    }

    pub(crate) fn max_spins(&self) -> u64 {
        self.spin_limit
    }
}

impl Default for CalibrationSettings {
    fn default() -> Self {
        Self::new()
    }
}
