use std::io;
use std::time::Instant;

use windows::Win32::System::Threading::{
    GetCurrentProcessorNumber, GetCurrentThread, SetThreadAffinityMask,
};

use crate::pal::{Platform, SavedAffinity, tick_counter};

#[derive(Debug, Default)]
pub(crate) struct BuildTargetPlatform;

pub(crate) static BUILD_TARGET_PLATFORM: BuildTargetPlatform = BuildTargetPlatform;

/// Replaces the affinity mask of the current thread, returning the previous mask.
fn set_current_thread_affinity_mask(mask: usize) -> io::Result<usize> {
    // SAFETY: No safety requirements. The pseudo-handle needs no cleanup.
    let thread = unsafe { GetCurrentThread() };

    // SAFETY: The pseudo-handle of the current thread is always valid.
    let previous = unsafe { SetThreadAffinityMask(thread, mask) };

    // Zero means failure, with the reason in the last error code.
    if previous == 0 {
        Err(io::Error::last_os_error())
    } else {
        Ok(previous)
    }
}

// Error paths require OS-level failures that are impractical to trigger in tests.
#[cfg_attr(coverage_nightly, coverage(off))]
impl Platform for BuildTargetPlatform {
    #[inline]
    fn ticks(&self) -> u64 {
        tick_counter::read()
    }

    fn now(&self) -> Instant {
        Instant::now()
    }

    fn pin_current_thread(&self) -> io::Result<SavedAffinity> {
        // SAFETY: No safety requirements.
        let current = unsafe { GetCurrentProcessorNumber() };

        // The processor number is relative to the processor group of the thread, which is also
        // what the affinity mask is relative to.
        let mask = 1_usize.checked_shl(current).ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::Unsupported,
                format!("processor {current} does not fit in an affinity mask"),
            )
        })?;

        let previous = set_current_thread_affinity_mask(mask)?;

        let processors = (0..usize::BITS)
            .filter(|&bit| (previous >> bit) & 1 == 1)
            .map(|bit| bit as usize)
            .collect();

        Ok(SavedAffinity::new(processors))
    }

    fn restore_affinity(&self, saved: &SavedAffinity) -> io::Result<()> {
        let mask = saved
            .processors()
            .iter()
            .filter_map(|&index| u32::try_from(index).ok())
            .filter_map(|index| 1_usize.checked_shl(index))
            .fold(0, |mask, bit| mask | bit);

        set_current_thread_affinity_mask(mask).map(|_| ())
    }
}
