use std::time::Instant;
use std::{io, mem};

use libc::cpu_set_t;

use crate::pal::{Platform, SavedAffinity, tick_counter};

#[derive(Debug, Default)]
pub(crate) struct BuildTargetPlatform;

pub(crate) static BUILD_TARGET_PLATFORM: BuildTargetPlatform = BuildTargetPlatform;

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
        let original = sched_getaffinity_current()?;

        let capacity = usize::try_from(libc::CPU_SETSIZE).unwrap_or_default();

        let processors = (0..capacity)
            .filter(|&index| {
                // SAFETY: The index is within the bounds of the set.
                unsafe { libc::CPU_ISSET(index, &original) }
            })
            .collect::<Vec<_>>();

        // SAFETY: No safety requirements.
        let current = unsafe { libc::sched_getcpu() };

        // Negative means failure, with the reason in errno.
        let Ok(current) = usize::try_from(current) else {
            return Err(io::Error::last_os_error());
        };

        // SAFETY: All zeroes is a valid cpu_set_t.
        let mut pinned: cpu_set_t = unsafe { mem::zeroed() };

        // SAFETY: The operating system never reports a processor index outside the set.
        unsafe { libc::CPU_SET(current, &mut pinned) };

        sched_setaffinity_current(&pinned)?;

        Ok(SavedAffinity::new(processors))
    }

    fn restore_affinity(&self, saved: &SavedAffinity) -> io::Result<()> {
        // SAFETY: All zeroes is a valid cpu_set_t.
        let mut cpuset: cpu_set_t = unsafe { mem::zeroed() };

        for &index in saved.processors() {
            // SAFETY: The indexes were read from a set of the same size.
            unsafe { libc::CPU_SET(index, &mut cpuset) };
        }

        sched_setaffinity_current(&cpuset)
    }
}

fn sched_getaffinity_current() -> io::Result<cpu_set_t> {
    // SAFETY: All zeroes is a valid cpu_set_t.
    let mut cpuset: cpu_set_t = unsafe { mem::zeroed() };

    // 0 means current thread.
    // SAFETY: No safety requirements beyond passing valid arguments.
    let result = unsafe { libc::sched_getaffinity(0, size_of::<cpu_set_t>(), &raw mut cpuset) };

    if result == 0 {
        Ok(cpuset)
    } else {
        Err(io::Error::last_os_error())
    }
}

fn sched_setaffinity_current(cpuset: &cpu_set_t) -> io::Result<()> {
    // 0 means current thread.
    // SAFETY: No safety requirements beyond passing valid arguments.
    let result = unsafe { libc::sched_setaffinity(0, size_of::<cpu_set_t>(), cpuset) };

    if result == 0 {
        Ok(())
    } else {
        Err(io::Error::last_os_error())
    }
}
