use std::collections::VecDeque;
use std::io;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use crate::ERR_POISONED_LOCK;
use crate::pal::{Platform, SavedAffinity};

/// Processors the fake thread is allowed to run on before it is pinned.
const FAKE_AFFINITY: [usize; 4] = [0, 1, 2, 3];

#[derive(Debug)]
struct FakePlatformState {
    epoch: Instant,

    // Virtual time, advanced by every call to `ticks()` or `now()`.
    virtual_nanos: u64,
    nanos_per_call: u64,
    ticks_per_nano: u64,

    ticks_frozen: bool,

    // Consumed by `ticks()` before falling back to virtual time.
    scripted_ticks: VecDeque<u64>,

    pinning_fails: bool,
    pin_count: usize,
    restore_count: usize,
}

/// Deterministic platform driven by a virtual clock.
///
/// Every call to `ticks()` or `now()` advances the virtual clock by a fixed number of
/// nanoseconds, so code that measures the platform against itself (calibration) produces
/// exactly predictable results. Clones share the same state.
#[derive(Clone, Debug)]
pub(crate) struct FakePlatform {
    state: Arc<Mutex<FakePlatformState>>,
}

impl FakePlatform {
    /// One tick per nanosecond, one nanosecond per call.
    pub(crate) fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(FakePlatformState {
                epoch: Instant::now(),
                virtual_nanos: 0,
                nanos_per_call: 1,
                ticks_per_nano: 1,
                ticks_frozen: false,
                scripted_ticks: VecDeque::new(),
                pinning_fails: false,
                pin_count: 0,
                restore_count: 0,
            })),
        }
    }

    pub(crate) fn set_nanos_per_call(&self, nanos: u64) {
        self.state.lock().expect(ERR_POISONED_LOCK).nanos_per_call = nanos;
    }

    pub(crate) fn set_ticks_per_nano(&self, ticks: u64) {
        self.state.lock().expect(ERR_POISONED_LOCK).ticks_per_nano = ticks;
    }

    /// The tick counter stops advancing while virtual wall-clock time keeps going.
    pub(crate) fn freeze_ticks(&self) {
        self.state.lock().expect(ERR_POISONED_LOCK).ticks_frozen = true;
    }

    /// The next calls to `ticks()` return exactly these values, in order.
    pub(crate) fn push_ticks(&self, ticks: &[u64]) {
        self.state
            .lock()
            .expect(ERR_POISONED_LOCK)
            .scripted_ticks
            .extend(ticks);
    }

    pub(crate) fn fail_pinning(&self) {
        self.state.lock().expect(ERR_POISONED_LOCK).pinning_fails = true;
    }

    pub(crate) fn pin_count(&self) -> usize {
        self.state.lock().expect(ERR_POISONED_LOCK).pin_count
    }

    pub(crate) fn restore_count(&self) -> usize {
        self.state.lock().expect(ERR_POISONED_LOCK).restore_count
    }
}

impl FakePlatformState {
    fn advance(&mut self) {
        self.virtual_nanos = self.virtual_nanos.saturating_add(self.nanos_per_call);
    }
}

impl Platform for FakePlatform {
    fn ticks(&self) -> u64 {
        let mut state = self.state.lock().expect(ERR_POISONED_LOCK);

        if let Some(ticks) = state.scripted_ticks.pop_front() {
            return ticks;
        }

        state.advance();

        if state.ticks_frozen {
            0
        } else {
            state.virtual_nanos.saturating_mul(state.ticks_per_nano)
        }
    }

    fn now(&self) -> Instant {
        let mut state = self.state.lock().expect(ERR_POISONED_LOCK);

        state.advance();

        state
            .epoch
            .checked_add(Duration::from_nanos(state.virtual_nanos))
            .unwrap_or(state.epoch)
    }

    fn pin_current_thread(&self) -> io::Result<SavedAffinity> {
        let mut state = self.state.lock().expect(ERR_POISONED_LOCK);

        if state.pinning_fails {
            return Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                "fake platform refuses to pin",
            ));
        }

        state.pin_count = state.pin_count.saturating_add(1);

        Ok(SavedAffinity::new(FAKE_AFFINITY.to_vec()))
    }

    fn restore_affinity(&self, saved: &SavedAffinity) -> io::Result<()> {
        assert_eq!(saved.processors(), FAKE_AFFINITY);

        let mut state = self.state.lock().expect(ERR_POISONED_LOCK);
        state.restore_count = state.restore_count.saturating_add(1);

        Ok(())
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn every_call_advances_virtual_time() {
        let platform = FakePlatform::new();
        platform.set_nanos_per_call(10);

        assert_eq!(platform.ticks(), 10);
        assert_eq!(platform.ticks(), 20);

        let first = platform.now();
        let second = platform.now();
        assert_eq!(second.duration_since(first), Duration::from_nanos(10));

        assert_eq!(platform.ticks(), 50);
    }

    #[test]
    fn ticks_scale_with_rate() {
        let platform = FakePlatform::new();
        platform.set_ticks_per_nano(3);

        assert_eq!(platform.ticks(), 3);
        assert_eq!(platform.ticks(), 6);
    }

    #[test]
    fn scripted_ticks_come_first() {
        let platform = FakePlatform::new();
        platform.push_ticks(&[100, 50]);

        assert_eq!(platform.ticks(), 100);
        assert_eq!(platform.ticks(), 50);
        assert_eq!(platform.ticks(), 1);
    }

    #[test]
    fn frozen_ticks_do_not_move() {
        let platform = FakePlatform::new();
        platform.freeze_ticks();

        assert_eq!(platform.ticks(), 0);
        assert_eq!(platform.ticks(), 0);

        let first = platform.now();
        assert!(platform.now() > first);
    }

    #[test]
    fn pinning_is_counted_and_shared_between_clones() {
        let platform = FakePlatform::new();
        let clone = platform.clone();

        let saved = platform.pin_current_thread().unwrap();
        clone.restore_affinity(&saved).unwrap();

        assert_eq!(clone.pin_count(), 1);
        assert_eq!(platform.restore_count(), 1);

        clone.fail_pinning();
        platform.pin_current_thread().unwrap_err();
    }
}
