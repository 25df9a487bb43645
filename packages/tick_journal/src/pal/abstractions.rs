use std::fmt::Debug;
use std::io;
use std::time::Instant;

#[cfg_attr(test, mockall::automock)]
pub(crate) trait Platform: Debug + Send + Sync + 'static {
    /// Current value of the tick counter.
    fn ticks(&self) -> u64;

    /// Current wall-clock time, used as the reference when calibrating ticks.
    fn now(&self) -> Instant;

    /// Restricts the current thread to the processor it is currently running on.
    ///
    /// Returns the affinity the thread had before, to be handed back to `restore_affinity()`.
    fn pin_current_thread(&self) -> io::Result<SavedAffinity>;

    fn restore_affinity(&self, saved: &SavedAffinity) -> io::Result<()>;
}

/// The set of processors a thread was allowed to run on before it was pinned.
#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) struct SavedAffinity {
    processors: Vec<usize>,
}

impl SavedAffinity {
    pub(crate) fn new(processors: Vec<usize>) -> Self {
        Self { processors }
    }

    pub(crate) fn processors(&self) -> &[usize] {
        &self.processors
    }
}
