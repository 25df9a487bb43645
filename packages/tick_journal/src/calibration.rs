use std::hint::black_box;
use std::sync::{Arc, OnceLock};

use arc_swap::ArcSwap;
use tracing::{debug, warn};

use crate::pal::{Platform, PlatformFacade};
use crate::{CalibrationSettings, Journal, StatisticsOptions, ThreadPin};

/// Measured properties of the tick source, used to turn ticks into seconds and to correct
/// measurements for the cost of measuring.
///
/// A snapshot never changes once created. Recalibrating publishes a new snapshot and leaves
/// existing ones untouched.
///
/// # Example
///
/// ```
/// use tick_journal::CalibrationSnapshot;
///
/// // Explicit values make reports reproducible.
/// let calibration = CalibrationSnapshot::from_parts(1e-9, 20.0, 1.0, 35e-9);
///
/// assert!((calibration.ticks_to_seconds(1000.0) - 1e-6).abs() < 1e-15);
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CalibrationSnapshot {
    seconds_per_tick: f64,
    clock_overhead_ticks: f64,
    clock_resolution_ticks: f64,
    instrumentation_overhead_seconds: f64,
}

static CURRENT: OnceLock<ArcSwap<CalibrationSnapshot>> = OnceLock::new();

impl CalibrationSnapshot {
    /// Creates a snapshot from known values instead of measuring them.
    #[must_use]
    pub fn from_parts(
        seconds_per_tick: f64,
        clock_overhead_ticks: f64,
        clock_resolution_ticks: f64,
        instrumentation_overhead_seconds: f64,
    ) -> Self {
        Self {
            seconds_per_tick,
            clock_overhead_ticks,
            clock_resolution_ticks,
            instrumentation_overhead_seconds,
        }
    }

    /// The process-wide snapshot, measured with default settings on first use.
    ///
    /// The first call busy-waits while calibrating (a few hundred milliseconds). Concurrent
    /// first calls wait for the same calibration.
    #[must_use]
    pub fn current() -> Arc<Self> {
        CURRENT
            .get_or_init(|| ArcSwap::from_pointee(Self::measure(&CalibrationSettings::default())))
            .load_full()
    }

    /// Measures a fresh snapshot with default settings and publishes it as the process-wide
    /// snapshot returned by [`current()`][Self::current].
    ///
    /// Snapshots obtained earlier remain valid and unchanged.
    #[must_use]
    pub fn recalibrate() -> Arc<Self> {
        let fresh = Arc::new(Self::measure(&CalibrationSettings::default()));

        CURRENT
            .get_or_init(|| ArcSwap::new(Arc::clone(&fresh)))
            .store(Arc::clone(&fresh));

        fresh
    }

    /// Measures a snapshot without publishing it.
    #[must_use]
    pub fn measure(settings: &CalibrationSettings) -> Self {
        Calibrator::new(PlatformFacade::real(), settings).run()
    }

    /// Duration of one tick.
    #[must_use]
    pub fn seconds_per_tick(&self) -> f64 {
        self.seconds_per_tick
    }

    /// Ticks consumed by one read of the tick source. Subtracted once per recorded call.
    #[must_use]
    pub fn clock_overhead_ticks(&self) -> f64 {
        self.clock_overhead_ticks
    }

    /// Smallest observable difference between two tick readings.
    #[must_use]
    pub fn clock_resolution_ticks(&self) -> f64 {
        self.clock_resolution_ticks
    }

    /// Time taken by one complete meter round-trip, including recording into a journal with
    /// filtered statistics.
    #[must_use]
    pub fn instrumentation_overhead_seconds(&self) -> f64 {
        self.instrumentation_overhead_seconds
    }

    /// Converts a tick count to seconds.
    #[must_use]
    pub fn ticks_to_seconds(&self, ticks: f64) -> f64 {
        ticks * self.seconds_per_tick
    }

    /// Whether the smallest observable tick step is longer than [`COARSE_RESOLUTION_SECONDS`].
    pub(crate) fn has_coarse_resolution(&self) -> bool {
        self.ticks_to_seconds(self.clock_resolution_ticks) > COARSE_RESOLUTION_SECONDS
    }
}

/// Tick steps longer than this make short regions read as zero or as one whole step, so
/// calibration warns about them. A modern cycle counter steps in well under a nanosecond.
pub(crate) const COARSE_RESOLUTION_SECONDS: f64 = 100e-9;

/// Performs one calibration run against a platform.
#[derive(Debug)]
struct Calibrator<'s> {
    platform: PlatformFacade,
    settings: &'s CalibrationSettings,
}

impl<'s> Calibrator<'s> {
    fn new(platform: PlatformFacade, settings: &'s CalibrationSettings) -> Self {
        Self { platform, settings }
    }

    fn run(&self) -> CalibrationSnapshot {
        let _pin = ThreadPin::new(&self.platform);

        let seconds_per_tick = self.trimmed_mean_of(|| self.seconds_per_tick_trial());
        let clock_overhead_ticks = self.trimmed_mean_of(|| self.clock_overhead_trial());
        let clock_resolution_ticks = self.clock_resolution();
        let instrumentation_overhead_ticks =
            self.trimmed_mean_of(|| self.instrumentation_overhead_trial());

        let snapshot = CalibrationSnapshot::from_parts(
            seconds_per_tick,
            clock_overhead_ticks,
            clock_resolution_ticks,
            instrumentation_overhead_ticks * seconds_per_tick,
        );

        debug!(
            seconds_per_tick,
            clock_overhead_ticks,
            clock_resolution_ticks,
            instrumentation_overhead_seconds = snapshot.instrumentation_overhead_seconds,
            "tick source calibrated"
        );

        if snapshot.has_coarse_resolution() {
            warn!(
                resolution_seconds = snapshot.ticks_to_seconds(clock_resolution_ticks),
                threshold_seconds = COARSE_RESOLUTION_SECONDS,
                "tick source resolution is coarse; short regions will be imprecise"
            );
        }

        snapshot
    }

    fn trimmed_mean_of(&self, mut trial: impl FnMut() -> f64) -> f64 {
        let samples = (0..self.settings.trial_count())
            .map(|_| trial())
            .collect::<Vec<_>>();

        trimmed_mean(samples)
    }

    /// Compares the tick source against the wall clock over one wall interval.
    #[expect(
        clippy::cast_precision_loss,
        reason = "tick deltas over milliseconds are far below 2^52"
    )]
    fn seconds_per_tick_trial(&self) -> f64 {
        let platform = &self.platform;
        let interval = self.settings.interval();

        // Start right after the wall clock moves, so the measured interval begins at a
        // wall clock boundary.
        let initial = platform.now();
        let mut boundary = platform.now();
        let mut spins = 0_u64;

        while boundary == initial && spins < self.settings.max_spins() {
            boundary = platform.now();
            spins = spins.saturating_add(1);
        }

        let start_ticks = platform.ticks();

        loop {
            let elapsed = platform.now().saturating_duration_since(boundary);

            if elapsed >= interval {
                let end_ticks = platform.ticks();
                let ticks = end_ticks.saturating_sub(start_ticks);

                if ticks == 0 {
                    warn!(
                        interval_seconds = interval.as_secs_f64(),
                        "tick source did not advance during calibration interval"
                    );
                }

                return elapsed.as_secs_f64() / ticks.max(1) as f64;
            }
        }
    }

    /// Ticks consumed by one read of the tick source.
    fn clock_overhead_trial(&self) -> f64 {
        let platform = &self.platform;

        self.differential(|| {
            black_box(platform.ticks());
        })
    }

    /// Ticks consumed by one complete meter round-trip into a journal with statistics.
    fn instrumentation_overhead_trial(&self) -> f64 {
        let journal = Journal::builder()
            .statistics(StatisticsOptions::default())
            .platform(self.platform.clone())
            .build();

        let handle = journal.entry("calibration");

        self.differential(|| {
            handle.measure().finish();
        })
    }

    /// Times `iterations` calls of `operation` ("pure") against `iterations` calls each followed
    /// by `extra_calls` more ("dirty"). The difference cancels the fixed cost of the loop itself.
    #[expect(
        clippy::cast_precision_loss,
        reason = "tick counts of short loops are far below 2^52"
    )]
    fn differential(&self, mut operation: impl FnMut()) -> f64 {
        let platform = &self.platform;
        let iterations = self.settings.iterations();
        let extra_calls = self.settings.extra_calls_per_iteration();

        let start = platform.ticks();
        for _ in 0..iterations {
            operation();
        }
        let pure = platform.ticks().saturating_sub(start);

        let start = platform.ticks();
        for _ in 0..iterations {
            operation();

            for _ in 0..extra_calls {
                operation();
            }
        }
        let dirty = platform.ticks().saturating_sub(start);

        let extra_total = u64::from(iterations).saturating_mul(u64::from(extra_calls));

        // Noise can make the dirty loop look faster than the pure one.
        ((dirty as f64 - pure as f64) / extra_total as f64).max(0.0)
    }

    /// The smallest tick step, or 1 if the tick source never advances.
    #[expect(
        clippy::cast_precision_loss,
        reason = "tick steps are far below 2^52"
    )]
    fn clock_resolution(&self) -> f64 {
        let mut samples = Vec::with_capacity(self.settings.trial_count());

        for _ in 0..self.settings.trial_count() {
            let Some(step) = self.smallest_tick_step() else {
                warn!(
                    spin_limit = self.settings.max_spins(),
                    "tick source did not advance; assuming a resolution of one tick"
                );
                return 1.0;
            };

            samples.push(step as f64);
        }

        trimmed_mean(samples)
    }

    fn smallest_tick_step(&self) -> Option<u64> {
        let platform = &self.platform;
        let mut smallest: Option<u64> = None;

        for _ in 0..STEPS_PER_RESOLUTION_TRIAL {
            let start = platform.ticks();
            let mut spins = 0_u64;

            let step = loop {
                let current = platform.ticks();

                if current > start {
                    break current.wrapping_sub(start);
                }

                spins = spins.saturating_add(1);

                if spins >= self.settings.max_spins() {
                    return None;
                }
            };

            smallest = Some(smallest.map_or(step, |smallest| smallest.min(step)));
        }

        smallest
    }
}

/// Tick transitions observed per resolution trial; the smallest step among them counts.
const STEPS_PER_RESOLUTION_TRIAL: usize = 16;

/// Mean after discarding the highest and the lowest sample (if there are at least three).
#[expect(
    clippy::cast_precision_loss,
    reason = "sample counts are tiny"
)]
fn trimmed_mean(mut samples: Vec<f64>) -> f64 {
    samples.sort_unstable_by(f64::total_cmp);

    let kept = match samples.as_slice() {
        [] => return 0.0,
        [_, middle @ .., _] if !middle.is_empty() => middle,
        all => all,
    };

    kept.iter().sum::<f64>() / kept.len() as f64
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use std::num::NonZero;
    use std::thread;
    use std::time::Duration;

    use super::*;
    use crate::pal::FakePlatform;

    fn assert_close(actual: f64, expected: f64) {
        let tolerance = expected.abs() * 1e-3;

        assert!(
            (actual - expected).abs() <= tolerance,
            "{actual} is not within 0.1% of {expected}"
        );
    }

    fn quick_settings() -> CalibrationSettings {
        CalibrationSettings::new()
            .trials(5)
            .wall_interval(Duration::from_micros(100))
            .loop_iterations(NonZero::new(200).unwrap())
            .extra_calls(NonZero::new(3).unwrap())
            .spin_limit(1000)
    }

    #[test]
    fn trimmed_mean_drops_extremes() {
        assert_close(trimmed_mean(vec![100.0, 1.0, 2.0, 3.0, -50.0]), 2.0);
        assert_close(trimmed_mean(vec![4.0, 6.0]), 5.0);
        assert_close(trimmed_mean(vec![7.0]), 7.0);
        assert!(trimmed_mean(Vec::new()).abs() < f64::EPSILON);
    }

    #[test]
    fn fake_platform_calibrates_exactly() {
        let fake = FakePlatform::new();
        fake.set_nanos_per_call(10);
        fake.set_ticks_per_nano(3);

        let settings = quick_settings();
        let snapshot = Calibrator::new(PlatformFacade::from(fake.clone()), &settings).run();

        // Three ticks per nanosecond.
        assert_close(snapshot.seconds_per_tick(), 1e-9 / 3.0);

        // Every read of the tick source advances the virtual clock by 10 ns = 30 ticks.
        assert_close(snapshot.clock_overhead_ticks(), 30.0);
        assert_close(snapshot.clock_resolution_ticks(), 30.0);

        // A meter round-trip reads the tick source twice: 20 ns.
        assert_close(snapshot.instrumentation_overhead_seconds(), 20e-9);

        assert_eq!(fake.pin_count(), 1);
        assert_eq!(fake.restore_count(), 1);
    }

    #[test]
    fn coarse_tick_source_still_calibrates() {
        // One tick per nanosecond but every read costs a microsecond, so the tick source
        // appears to step in whole microseconds.
        let fake = FakePlatform::new();
        fake.set_nanos_per_call(1000);

        let settings = quick_settings();
        let snapshot = Calibrator::new(PlatformFacade::from(fake), &settings).run();

        assert_close(snapshot.clock_resolution_ticks(), 1000.0);
        assert_close(snapshot.seconds_per_tick(), 1e-9);
        assert!(snapshot.has_coarse_resolution());
    }

    #[test]
    fn coarse_resolution_threshold() {
        let fine = CalibrationSnapshot::from_parts(1e-9, 20.0, 30.0, 35e-9);
        let coarse = CalibrationSnapshot::from_parts(1e-9, 20.0, 1000.0, 35e-9);
        let frozen = CalibrationSnapshot::from_parts(1e-9, 0.0, 1.0, 0.0);

        assert!(!fine.has_coarse_resolution());
        assert!(coarse.has_coarse_resolution());
        assert!(!frozen.has_coarse_resolution());
    }

    #[test]
    fn nanosecond_steps_are_not_coarse() {
        let fake = FakePlatform::new();
        fake.set_nanos_per_call(10);
        fake.set_ticks_per_nano(3);

        let settings = quick_settings();
        let snapshot = Calibrator::new(PlatformFacade::from(fake), &settings).run();

        // 30 ticks of a third of a nanosecond each is a 10 ns step.
        assert!(!snapshot.has_coarse_resolution());
    }

    #[test]
    fn frozen_tick_source_degrades_gracefully() {
        let fake = FakePlatform::new();
        fake.freeze_ticks();

        let settings = quick_settings();
        let snapshot = Calibrator::new(PlatformFacade::from(fake), &settings).run();

        assert_close(snapshot.clock_resolution_ticks(), 1.0);
        assert!(snapshot.clock_overhead_ticks().abs() < f64::EPSILON);
        assert!(snapshot.seconds_per_tick().is_finite());
        assert!(snapshot.seconds_per_tick() > 0.0);
    }

    #[test]
    fn pin_failure_still_calibrates() {
        let fake = FakePlatform::new();
        fake.fail_pinning();

        let settings = quick_settings();
        let snapshot = Calibrator::new(PlatformFacade::from(fake.clone()), &settings).run();

        assert_close(snapshot.seconds_per_tick(), 1e-9);
        assert_eq!(fake.restore_count(), 0);
    }

    #[test]
    fn real_platform_produces_sane_values() {
        let settings = CalibrationSettings::new()
            .trials(3)
            .wall_interval(Duration::from_millis(2));

        let snapshot = CalibrationSnapshot::measure(&settings);

        // Anything between a 100 GHz and a 1 Hz tick is plausible.
        assert!(snapshot.seconds_per_tick() > 1e-11);
        assert!(snapshot.seconds_per_tick() < 1.0);
        assert!(snapshot.clock_overhead_ticks() >= 0.0);
        assert!(snapshot.clock_resolution_ticks() >= 1.0);
        assert!(snapshot.instrumentation_overhead_seconds() >= 0.0);
    }

    #[test]
    fn current_is_stable_until_recalibrated() {
        let first = CalibrationSnapshot::current();
        let second = CalibrationSnapshot::current();
        assert!(Arc::ptr_eq(&first, &second));

        let old = *first;
        let fresh = CalibrationSnapshot::recalibrate();

        // The old snapshot is untouched and the fresh one is now current.
        assert_eq!(*first, old);
        assert!(Arc::ptr_eq(&fresh, &CalibrationSnapshot::current()));
    }

    #[test]
    fn concurrent_first_use_shares_one_snapshot() {
        let snapshots = thread::scope(|scope| {
            let threads = (0..4)
                .map(|_| scope.spawn(CalibrationSnapshot::current))
                .collect::<Vec<_>>();

            threads
                .into_iter()
                .map(|thread| *thread.join().unwrap())
                .collect::<Vec<_>>()
        });

        // Another test may recalibrate in between, so only sanity is checked here.
        for snapshot in snapshots {
            assert!(snapshot.seconds_per_tick() > 0.0);
        }
    }

    #[test]
    fn from_parts_round_trips() {
        let snapshot = CalibrationSnapshot::from_parts(2e-9, 15.0, 3.0, 40e-9);

        assert_close(snapshot.seconds_per_tick(), 2e-9);
        assert_close(snapshot.clock_overhead_ticks(), 15.0);
        assert_close(snapshot.clock_resolution_ticks(), 3.0);
        assert_close(snapshot.instrumentation_overhead_seconds(), 40e-9);
        assert_close(snapshot.ticks_to_seconds(500.0), 1e-6);
    }
}
