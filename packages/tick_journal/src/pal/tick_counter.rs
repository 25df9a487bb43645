#[cfg(all(target_arch = "x86_64", not(miri)))]
#[inline]
pub(crate) fn read() -> u64 {
    // SAFETY: RDTSC is present on every x86_64 processor and has no preconditions.
    unsafe { core::arch::x86_64::_rdtsc() }
}

#[cfg(any(not(target_arch = "x86_64"), miri))]
#[inline]
pub(crate) fn read() -> u64 {
    use std::sync::OnceLock;
    use std::time::Instant;

    static EPOCH: OnceLock<Instant> = OnceLock::new();

    let epoch = EPOCH.get_or_init(Instant::now);

    // Saturates after ~584 years of uptime.
    u64::try_from(epoch.elapsed().as_nanos()).unwrap_or(u64::MAX)
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn never_goes_backwards() {
        let mut previous = read();

        for _ in 0..10_000 {
            let current = read();
            assert!(current >= previous);
            previous = current;
        }
    }
}
