use std::cell::RefCell;
use std::marker::PhantomData;

use tracing::{debug, warn};

use crate::pal::{Platform, PlatformFacade, SavedAffinity};

#[derive(Debug)]
struct PinState {
    depth: usize,

    // `None` while unpinned or if pinning failed.
    saved: Option<SavedAffinity>,
}

thread_local! {
    static PIN_STATE: RefCell<PinState> = const {
        RefCell::new(PinState {
            depth: 0,
            saved: None,
        })
    };
}

/// Keeps the current thread on the processor it was running on when the outermost guard was
/// created. Guards nest: only the outermost one pins and only its drop restores the affinity.
///
/// Pinning is best-effort. Failure is logged and the guard behaves as if the pin succeeded.
#[derive(Debug)]
pub(crate) struct ThreadPin {
    platform: PlatformFacade,

    _single_threaded: PhantomData<*const ()>,
}

impl ThreadPin {
    pub(crate) fn new(platform: &PlatformFacade) -> Self {
        PIN_STATE.with_borrow_mut(|state| {
            if state.depth == 0 {
                match platform.pin_current_thread() {
                    Ok(saved) => {
                        debug!(
                            processors = saved.processors().len(),
                            "pinned thread to its current processor"
                        );
                        state.saved = Some(saved);
                    }
                    Err(error) => {
                        warn!(%error, "failed to pin thread; calibration will be less precise");
                    }
                }
            }

            state.depth = state.depth.saturating_add(1);
        });

        Self {
            platform: platform.clone(),
            _single_threaded: PhantomData,
        }
    }

    #[cfg(test)]
    fn depth() -> usize {
        PIN_STATE.with_borrow(|state| state.depth)
    }
}

impl Drop for ThreadPin {
    fn drop(&mut self) {
        PIN_STATE.with_borrow_mut(|state| {
            state.depth = state.depth.saturating_sub(1);

            if state.depth != 0 {
                return;
            }

            let Some(saved) = state.saved.take() else {
                return;
            };

            if let Err(error) = self.platform.restore_affinity(&saved) {
                warn!(%error, "failed to restore thread affinity after calibration");
            }
        });
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use std::io;
    use std::thread;

    use static_assertions::assert_not_impl_any;

    use super::*;
    use crate::pal::{FakePlatform, MockPlatform};

    assert_not_impl_any!(ThreadPin: Send, Sync);

    #[test]
    fn nested_guards_pin_once() {
        thread::spawn(|| {
            let fake = FakePlatform::new();
            let platform = PlatformFacade::from(fake.clone());

            let outer = ThreadPin::new(&platform);
            let inner = ThreadPin::new(&platform);

            assert_eq!(ThreadPin::depth(), 2);
            assert_eq!(fake.pin_count(), 1);

            drop(inner);
            assert_eq!(fake.restore_count(), 0);

            drop(outer);
            assert_eq!(fake.restore_count(), 1);
            assert_eq!(ThreadPin::depth(), 0);

            // A new outermost guard pins again.
            let again = ThreadPin::new(&platform);
            assert_eq!(fake.pin_count(), 2);
            drop(again);
            assert_eq!(fake.restore_count(), 2);
        })
        .join()
        .unwrap();
    }

    #[test]
    fn failed_pin_is_not_fatal_and_not_restored() {
        thread::spawn(|| {
            let fake = FakePlatform::new();
            fake.fail_pinning();
            let platform = PlatformFacade::from(fake.clone());

            let pin = ThreadPin::new(&platform);
            assert_eq!(ThreadPin::depth(), 1);
            drop(pin);

            assert_eq!(fake.restore_count(), 0);
            assert_eq!(ThreadPin::depth(), 0);
        })
        .join()
        .unwrap();
    }

    #[test]
    fn failed_restore_is_not_fatal() {
        thread::spawn(|| {
            let mut mock = MockPlatform::new();
            mock.expect_pin_current_thread()
                .times(1)
                .returning(|| Ok(SavedAffinity::new(vec![7])));
            mock.expect_restore_affinity()
                .times(1)
                .withf(|saved| saved.processors() == [7])
                .returning(|_| Err(io::Error::other("restore refused")));

            let platform = PlatformFacade::from_mock(mock);

            drop(ThreadPin::new(&platform));
            assert_eq!(ThreadPin::depth(), 0);
        })
        .join()
        .unwrap();
    }
}
