use std::io;
use std::time::Instant;

use crate::pal::{Platform, SavedAffinity, tick_counter};

/// Platform without thread pinning support. Calibration still works, only with more jitter.
#[derive(Debug, Default)]
pub(crate) struct BuildTargetPlatform;

pub(crate) static BUILD_TARGET_PLATFORM: BuildTargetPlatform = BuildTargetPlatform;

impl Platform for BuildTargetPlatform {
    #[inline]
    fn ticks(&self) -> u64 {
        tick_counter::read()
    }

    fn now(&self) -> Instant {
        Instant::now()
    }

    fn pin_current_thread(&self) -> io::Result<SavedAffinity> {
        Err(io::Error::new(
            io::ErrorKind::Unsupported,
            "thread pinning is not supported on this platform",
        ))
    }

    fn restore_affinity(&self, _saved: &SavedAffinity) -> io::Result<()> {
        Err(io::Error::new(
            io::ErrorKind::Unsupported,
            "thread pinning is not supported on this platform",
        ))
    }
}
