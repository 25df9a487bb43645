use thiserror::Error;

/// Errors that can occur when rendering a report.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ReportError {
    /// The line sink asked to stop before the report was complete.
    #[error("the line sink stopped the report early, after {written} units of output")]
    Stopped {
        /// Sum of the output units reported by the sink for the lines it accepted.
        written: usize,
    },
}
