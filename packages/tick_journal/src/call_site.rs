use std::sync::OnceLock;

use crate::{EntryHandle, Meter, global};

/// A static measurement point bound to an entry of the [`global()`] journal.
///
/// The entry is looked up on first use only. Every later measurement goes straight to the
/// cached handle without touching the journal lock.
///
/// The [`meter!`][crate::meter] macro declares a call site and starts measuring in one step.
///
/// # Example
///
/// ```
/// use tick_journal::CallSite;
///
/// static COMPRESS: CallSite = CallSite::new("compress");
///
/// fn compress(data: &[u8]) -> usize {
///     let _meter = COMPRESS.measure_amount(data.len().max(1) as u64);
///     data.len() / 2
/// }
///
/// compress(&[0; 1024]);
///
/// assert_eq!(COMPRESS.handle().snapshot().amount(), 1024);
/// ```
#[derive(Debug)]
pub struct CallSite {
    name: &'static str,
    handle: OnceLock<EntryHandle>,
}

impl CallSite {
    /// Declares a call site for the entry with the given name.
    #[must_use]
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            handle: OnceLock::new(),
        }
    }

    /// Name of the entry.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Handle to the entry, created on first use.
    pub fn handle(&self) -> &EntryHandle {
        self.handle.get_or_init(|| global().entry(self.name))
    }

    /// Starts measuring one call that processes one unit of work.
    #[inline]
    pub fn measure(&self) -> Meter<'_> {
        self.handle().measure()
    }

    /// Starts measuring one call that processes `amount` units of work.
    #[inline]
    pub fn measure_amount(&self, amount: u64) -> Meter<'_> {
        self.handle().measure_amount(amount)
    }
}

/// Measures the rest of the enclosing scope into an entry of the [`global()`] journal.
///
/// Declares a hidden static [`CallSite`] for the name, so the journal lookup happens only the
/// first time the macro is reached. Evaluates to a [`Meter`] that must be bound to a variable.
///
/// # Example
///
/// ```
/// fn load(path: &str) -> usize {
///     let _meter = tick_journal::meter!("load");
///     path.len()
/// }
///
/// fn load_all(paths: &[&str]) -> usize {
///     // One call that processed `paths.len()` units.
///     let _meter = tick_journal::meter!("load_all", paths.len() as u64);
///     paths.iter().map(|path| load(path)).sum()
/// }
///
/// load_all(&["a.txt", "b.txt"]);
///
/// let all = tick_journal::global().entry("load_all").snapshot();
/// assert_eq!(all.calls(), 1);
/// assert_eq!(all.amount(), 2);
/// ```
#[macro_export]
macro_rules! meter {
    ($name:expr) => {
        $crate::meter!($name, 1)
    };
    ($name:expr, $amount:expr) => {{
        static CALL_SITE: $crate::CallSite = $crate::CallSite::new($name);
        CALL_SITE.measure_amount($amount)
    }};
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use static_assertions::assert_impl_all;

    use super::*;

    assert_impl_all!(CallSite: Send, Sync);

    #[test]
    fn binds_once_to_global_entry() {
        static SITE: CallSite = CallSite::new("call_site_binds_once");

        SITE.measure().finish();
        SITE.measure_amount(3).finish();

        assert_eq!(SITE.name(), "call_site_binds_once");
        assert!(std::ptr::eq(SITE.handle(), SITE.handle()));

        let snapshot = global().entry("call_site_binds_once").snapshot();
        assert_eq!(snapshot.calls(), 2);
        assert_eq!(snapshot.amount(), 4);
    }

    #[test]
    fn macro_records_into_global() {
        fn metered() {
            let _meter = crate::meter!("call_site_macro");
        }

        fn metered_amount() {
            let _meter = crate::meter!("call_site_macro_amount", 10);
        }

        metered();
        metered();
        metered_amount();

        assert_eq!(global().entry("call_site_macro").snapshot().calls(), 2);
        assert_eq!(
            global().entry("call_site_macro_amount").snapshot().amount(),
            10
        );
    }
}
