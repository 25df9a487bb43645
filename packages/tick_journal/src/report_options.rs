/// Which value orders the rows of a report.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
#[non_exhaustive]
pub enum SortKey {
    /// Entry name, lexicographically.
    Name,

    /// Total corrected time of the entry.
    #[default]
    Time,

    /// Average corrected time per unit of amount.
    Speed,

    /// Total amount of work processed.
    Amount,
}

/// Direction of the report sort order.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
#[non_exhaustive]
pub enum Direction {
    /// Smallest first.
    Ascending,

    /// Largest first.
    #[default]
    Descending,
}

/// Controls what a report contains and how its rows are ordered.
///
/// All switches are independent of each other.
///
/// # Example
///
/// ```
/// use tick_journal::{Direction, ReportOptions, SortKey};
///
/// let options = ReportOptions::new()
///     .title("Startup")
///     .sort(SortKey::Amount)
///     .direction(Direction::Ascending)
///     .show_duration(true)
///     .show_overhead(true);
/// ```
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ReportOptions {
    title: Option<String>,
    sort: SortKey,
    direction: Direction,
    show_overhead: bool,
    show_unit: bool,
    show_duration: bool,
    show_resolution: bool,
    hide_header: bool,
    subtract_overhead: bool,
}

impl ReportOptions {
    /// Creates options with default values: no title, sorted by time in descending order,
    /// header shown, no preamble lines, clock overhead subtracted.
    #[must_use]
    pub fn new() -> Self {
        Self {
            title: None,
            sort: SortKey::default(),
            direction: Direction::default(),
            show_overhead: false,
            show_unit: false,
            show_duration: false,
            show_resolution: false,
            hide_header: false,
            subtract_overhead: true,
        }
    }

    /// A line printed before everything else.
    #[must_use]
    pub fn title(self, title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..self
        }
    }

    /// Which value orders the rows. Default: [`SortKey::Time`].
    #[must_use]
    pub fn sort(self, sort: SortKey) -> Self {
        Self { sort, ..self }
    }

    /// Order of the rows. Default: [`Direction::Descending`].
    #[must_use]
    pub fn direction(self, direction: Direction) -> Self {
        Self { direction, ..self }
    }

    /// Adds a line with the calibrated clock overhead and instrumentation overhead.
    #[must_use]
    pub fn show_overhead(self, show_overhead: bool) -> Self {
        Self {
            show_overhead,
            ..self
        }
    }

    /// Adds a line with the duration of one tick.
    #[must_use]
    pub fn show_unit(self, show_unit: bool) -> Self {
        Self { show_unit, ..self }
    }

    /// Adds a line with the time elapsed since the journal was created.
    #[must_use]
    pub fn show_duration(self, show_duration: bool) -> Self {
        Self {
            show_duration,
            ..self
        }
    }

    /// Adds a line with the calibrated clock resolution.
    #[must_use]
    pub fn show_resolution(self, show_resolution: bool) -> Self {
        Self {
            show_resolution,
            ..self
        }
    }

    /// Omits the column header line.
    #[must_use]
    pub fn hide_header(self, hide_header: bool) -> Self {
        Self {
            hide_header,
            ..self
        }
    }

    /// Whether the clock overhead of every call is subtracted from the totals. Default: `true`.
    #[must_use]
    pub fn subtract_overhead(self, subtract_overhead: bool) -> Self {
        Self {
            subtract_overhead,
            ..self
        }
    }

    pub(crate) fn title_text(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub(crate) fn sort_key(&self) -> SortKey {
        self.sort
    }

    pub(crate) fn sort_direction(&self) -> Direction {
        self.direction
    }

    pub(crate) fn shows_overhead(&self) -> bool {
        self.show_overhead
    }

    pub(crate) fn shows_unit(&self) -> bool {
        self.show_unit
    }

    pub(crate) fn shows_duration(&self) -> bool {
        self.show_duration
    }

    pub(crate) fn shows_resolution(&self) -> bool {
        self.show_resolution
    }

    pub(crate) fn hides_header(&self) -> bool {
        self.hide_header
    }

    pub(crate) fn subtracts_overhead(&self) -> bool {
        self.subtract_overhead
    }
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self::new()
    }
}
