use thiserror::Error;

/// Errors that can occur when validating formatting parameters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// The caller asked for at least as many decimal places as significant digits, which leaves
    /// no room for the integer part of the mantissa.
    #[error(
        "invalid precision: {decimal_places} decimal places requested with only {significant_digits} significant digits"
    )]
    InvalidPrecision {
        /// The requested number of significant digits.
        significant_digits: u8,

        /// The requested number of decimal places.
        decimal_places: u8,
    },
}

/// A specialized `Result` type for formatting operations, returning the crate's
/// [`Error`] type as the error value.
pub(crate) type Result<T> = std::result::Result<T, Error>;
