use std::cmp::Ordering;
use std::ops::ControlFlow;

use sig_fmt::Precision;

use crate::{
    CalibrationSnapshot, Direction, EntrySnapshot, Journal, LineSink, ReportError, ReportOptions,
    SortKey,
};

/// Times are rendered with up to three integer digits and one decimal, e.g. `123.4 us`.
const TIME_PRECISION: Precision = match Precision::new(4, 1) {
    Ok(precision) => precision,
    Err(_) => panic!("4 significant digits with 1 decimal place is a valid precision"),
};

const COLUMN_SEPARATOR: &str = "  ";

const INSIGNIFICANT: &str = "insignificant";
const NOT_AVAILABLE: &str = "-";

/// Tie-breakers, in priority order, after the primary sort key.
const TIE_BREAK_ORDER: [SortKey; 4] = [
    SortKey::Time,
    SortKey::Speed,
    SortKey::Amount,
    SortKey::Name,
];

/// Renders a report of all entries of `journal` into `sink`, one line at a time.
///
/// The report consists of optional preamble lines (title, duration, unit, resolution and
/// overhead, in that order), a header line and one line per entry:
///
/// * `Name`: the entry name.
/// * `Average`: corrected time per unit of amount.
/// * `Total`: corrected total time.
/// * `Amount`: total units of work.
/// * `CV`: coefficient of variation of the filtered statistics, present only if the journal
///   tracks them.
///
/// Corrected time is the tick total minus the calibrated clock overhead of each call, converted
/// to seconds. An entry whose tick total does not exceed what the instrument itself could
/// account for (the clock overhead of each call plus the clock resolution scaled by the square
/// root of the number of calls) is shown as `insignificant` instead of a time.
///
/// Returns the sum of the output units reported by the sink.
///
/// # Errors
///
/// Returns [`ReportError::Stopped`] if the sink asks to stop before the report is complete.
///
/// # Example
///
/// ```
/// use tick_journal::{CalibrationSnapshot, Journal, ReportOptions, StringSink, render};
///
/// let journal = Journal::new();
/// let entry = journal.entry("X");
///
/// for ticks in [100, 200, 300] {
///     entry.record(ticks, 1);
/// }
///
/// let calibration = CalibrationSnapshot::from_parts(1e-9, 0.0, 1.0, 0.0);
///
/// let mut sink = StringSink::new();
/// render(&journal, &ReportOptions::new(), &calibration, &mut sink).unwrap();
///
/// let row = sink.lines().nth(1).unwrap();
/// assert!(row.contains("200.0 ns"));
/// assert!(row.contains("600.0 ns"));
/// ```
pub fn render(
    journal: &Journal,
    options: &ReportOptions,
    calibration: &CalibrationSnapshot,
    sink: &mut impl LineSink,
) -> Result<usize, ReportError> {
    let mut rows = Vec::with_capacity(journal.len());

    let _: ControlFlow<()> = journal.enumerate(|entry| {
        rows.push(Row::new(entry.clone(), options, calibration));
        ControlFlow::Continue(())
    });

    sort_rows(&mut rows, options.sort_key(), options.sort_direction());

    let mut output = Output::new(sink);

    for line in preamble(journal, options, calibration) {
        output.emit(&line)?;
    }

    let table = Table::new(&rows, options);

    if !options.hides_header() {
        output.emit(&table.header())?;
    }

    for cells in table.rows() {
        output.emit(&table.line(cells))?;
    }

    Ok(output.written)
}

/// Renders seconds with a magnitude prefix, e.g. ` 12.5 ms`. Every non-negative value has the
/// same width.
fn format_seconds(seconds: f64) -> String {
    format!("{}s", TIME_PRECISION.format(seconds))
}

/// Same as [`format_seconds()`] without the alignment padding, for running text.
fn describe_seconds(seconds: f64) -> String {
    format_seconds(seconds).trim_start().to_string()
}

/// Sums the sink's output and turns a stop request into an error.
struct Output<'s, S> {
    sink: &'s mut S,
    written: usize,
}

impl<'s, S> Output<'s, S>
where
    S: LineSink,
{
    fn new(sink: &'s mut S) -> Self {
        Self { sink, written: 0 }
    }

    fn emit(&mut self, line: &str) -> Result<(), ReportError> {
        match self.sink.write_line(line) {
            ControlFlow::Continue(units) => {
                self.written = self.written.saturating_add(units);
                Ok(())
            }
            ControlFlow::Break(()) => Err(ReportError::Stopped {
                written: self.written,
            }),
        }
    }
}

#[expect(
    clippy::cast_precision_loss,
    reason = "report values tolerate precision loss beyond 2^52"
)]
fn preamble(
    journal: &Journal,
    options: &ReportOptions,
    calibration: &CalibrationSnapshot,
) -> Vec<String> {
    let mut lines = Vec::new();

    if let Some(title) = options.title_text() {
        lines.push(title.to_string());
    }

    if options.shows_duration() {
        let seconds = calibration.ticks_to_seconds(journal.elapsed_ticks() as f64);
        lines.push(format!("Duration: {}", describe_seconds(seconds)));
    }

    if options.shows_unit() {
        lines.push(format!(
            "Unit: {} per tick",
            describe_seconds(calibration.seconds_per_tick())
        ));
    }

    if options.shows_resolution() {
        let ticks = calibration.clock_resolution_ticks();
        lines.push(format!(
            "Resolution: {ticks:.1} ticks ({})",
            describe_seconds(calibration.ticks_to_seconds(ticks))
        ));
    }

    if options.shows_overhead() {
        let ticks = calibration.clock_overhead_ticks();
        lines.push(format!(
            "Overhead: {ticks:.1} ticks per clock read ({}), {} per measurement",
            describe_seconds(calibration.ticks_to_seconds(ticks)),
            describe_seconds(calibration.instrumentation_overhead_seconds())
        ));
    }

    lines
}

/// One entry with its calibrated values.
#[derive(Debug)]
struct Row {
    entry: EntrySnapshot,
    total_seconds: f64,
    average_seconds: f64,
    significant: bool,
}

impl Row {
    #[expect(
        clippy::cast_precision_loss,
        reason = "report values tolerate precision loss beyond 2^52"
    )]
    fn new(
        entry: EntrySnapshot,
        options: &ReportOptions,
        calibration: &CalibrationSnapshot,
    ) -> Self {
        let calls = entry.calls() as f64;
        let ticks = entry.ticks() as f64;

        let overhead_ticks = calibration.clock_overhead_ticks() * calls;
        let budget_ticks = overhead_ticks + calibration.clock_resolution_ticks() * calls.sqrt();

        let corrected_ticks = if options.subtracts_overhead() {
            (ticks - overhead_ticks).max(0.0)
        } else {
            ticks
        };

        let total_seconds = calibration.ticks_to_seconds(corrected_ticks);

        let average_seconds = if entry.amount() == 0 {
            0.0
        } else {
            total_seconds / entry.amount() as f64
        };

        Self {
            significant: entry.calls() > 0 && ticks > budget_ticks,
            entry,
            total_seconds,
            average_seconds,
        }
    }

    fn compare_by(&self, other: &Self, key: SortKey) -> Ordering {
        match key {
            SortKey::Name => self.entry.name().cmp(other.entry.name()),
            SortKey::Time => self.total_seconds.total_cmp(&other.total_seconds),
            SortKey::Speed => self.average_seconds.total_cmp(&other.average_seconds),
            SortKey::Amount => self.entry.amount().cmp(&other.entry.amount()),
        }
    }

    fn average_cell(&self) -> String {
        if self.entry.calls() == 0 {
            NOT_AVAILABLE.to_string()
        } else if !self.significant {
            INSIGNIFICANT.to_string()
        } else {
            format_seconds(self.average_seconds)
        }
    }

    fn total_cell(&self) -> String {
        if self.entry.calls() == 0 || !self.significant {
            NOT_AVAILABLE.to_string()
        } else {
            format_seconds(self.total_seconds)
        }
    }

    fn coefficient_of_variation_cell(&self) -> String {
        self.entry
            .filtered()
            .and_then(|filtered| filtered.coefficient_of_variation())
            .map_or_else(
                || NOT_AVAILABLE.to_string(),
                |cv| format!("{:.1}%", cv * 100.0),
            )
    }
}

/// Orders by the primary key in the requested direction, then by the remaining numeric keys in
/// the same direction, then by name ascending. Names are unique, so the order is total.
fn sort_rows(rows: &mut [Row], key: SortKey, direction: Direction) {
    rows.sort_by(|a, b| {
        let directed = |ordering: Ordering| match direction {
            Direction::Ascending => ordering,
            Direction::Descending => ordering.reverse(),
        };

        let primary = directed(a.compare_by(b, key));

        TIE_BREAK_ORDER
            .iter()
            .filter(|&&tie_break| tie_break != key)
            .fold(primary, |ordering, &tie_break| {
                ordering.then_with(|| match tie_break {
                    SortKey::Name => a.compare_by(b, SortKey::Name),
                    numeric => directed(a.compare_by(b, numeric)),
                })
            })
    });
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Alignment {
    Left,
    Right,
}

#[derive(Debug)]
struct Column {
    header: String,
    alignment: Alignment,
    width: usize,
}

/// Formatted cells with the column widths they need.
#[derive(Debug)]
struct Table {
    columns: Vec<Column>,
    rows: Vec<Vec<String>>,
}

impl Table {
    fn new(rows: &[Row], options: &ReportOptions) -> Self {
        let with_statistics = rows.iter().any(|row| row.entry.filtered().is_some());

        let marker = match options.sort_direction() {
            Direction::Ascending => " ^",
            Direction::Descending => " v",
        };

        let header = |title: &str, key: Option<SortKey>| {
            if key == Some(options.sort_key()) {
                format!("{title}{marker}")
            } else {
                title.to_string()
            }
        };

        let mut columns = vec![
            (header("Name", Some(SortKey::Name)), Alignment::Left),
            (header("Average", Some(SortKey::Speed)), Alignment::Right),
            (header("Total", Some(SortKey::Time)), Alignment::Right),
            (header("Amount", Some(SortKey::Amount)), Alignment::Right),
        ];

        if with_statistics {
            columns.push((header("CV", None), Alignment::Right));
        }

        let cells = rows
            .iter()
            .map(|row| {
                let mut cells = vec![
                    row.entry.name().to_string(),
                    row.average_cell(),
                    row.total_cell(),
                    row.entry.amount().to_string(),
                ];

                if with_statistics {
                    cells.push(row.coefficient_of_variation_cell());
                }

                cells
            })
            .collect::<Vec<_>>();

        let columns = columns
            .into_iter()
            .enumerate()
            .map(|(index, (header, alignment))| {
                let width = cells
                    .iter()
                    .filter_map(|row| row.get(index))
                    .map(|cell| cell.chars().count())
                    .chain([header.chars().count()])
                    .max()
                    .unwrap_or_default();

                Column {
                    header,
                    alignment,
                    width,
                }
            })
            .collect();

        Self {
            columns,
            rows: cells,
        }
    }

    fn header(&self) -> String {
        let headers = self
            .columns
            .iter()
            .map(|column| column.header.as_str())
            .collect::<Vec<_>>();

        self.line(&headers)
    }

    fn rows(&self) -> impl Iterator<Item = &[String]> {
        self.rows.iter().map(Vec::as_slice)
    }

    fn line<S>(&self, cells: &[S]) -> String
    where
        S: AsRef<str>,
    {
        let padded = self
            .columns
            .iter()
            .zip(cells)
            .map(|(column, cell)| {
                let cell = cell.as_ref();
                let width = column.width;

                match column.alignment {
                    Alignment::Left => format!("{cell:<width$}"),
                    Alignment::Right => format!("{cell:>width$}"),
                }
            })
            .collect::<Vec<_>>();

        padded.join(COLUMN_SEPARATOR).trim_end().to_string()
    }
}
