use crate::{mantissa_width, render};

/// A validated pair of significant digits and decimal places.
///
/// Useful when the same precision is applied to many values, e.g. every cell of a table column.
///
/// # Example
///
/// ```
/// use sig_fmt::Precision;
///
/// let precision = Precision::new(4, 1).unwrap();
///
/// assert_eq!(precision.format(0.000_002_5), "  2.5 u");
/// assert_eq!(precision.format(0.000_002_5).len(), precision.width());
/// assert_eq!(precision.format(0.000_600_0).len(), precision.width());
///
/// assert!(Precision::new(2, 2).is_err());
/// ```
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Precision {
    significant_digits: u8,
    decimal_places: u8,
}

impl Precision {
    /// Creates a precision specification.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidPrecision`][crate::Error::InvalidPrecision] if `decimal_places` is
    /// not less than `significant_digits`.
    pub const fn new(significant_digits: u8, decimal_places: u8) -> crate::Result<Self> {
        if decimal_places >= significant_digits {
            return Err(crate::Error::InvalidPrecision {
                significant_digits,
                decimal_places,
            });
        }

        Ok(Self {
            significant_digits,
            decimal_places,
        })
    }

    /// Number of significant digits.
    #[must_use]
    pub const fn significant_digits(&self) -> u8 {
        self.significant_digits
    }

    /// Number of digits after the decimal point.
    #[must_use]
    pub const fn decimal_places(&self) -> u8 {
        self.decimal_places
    }

    /// Renders `value` with this precision. See [`format()`][crate::format].
    #[must_use]
    pub fn format(&self, value: f64) -> String {
        render(value, self.significant_digits, self.decimal_places)
    }

    /// The width of [`format()`][Self::format] output for zero and for every non-negative value
    /// whose magnitude is within the prefix table.
    ///
    /// With fewer than three significant digits, values that fall between two prefixes are
    /// wider. See [package-level documentation][crate].
    #[must_use]
    pub fn width(&self) -> usize {
        // Mantissa + space + prefix.
        mantissa_width(self.significant_digits, self.decimal_places).saturating_add(2)
    }

    /// The widest output [`format()`][Self::format] produces for any value whose magnitude is
    /// within the prefix table (including special values and a minus sign).
    ///
    /// Values beyond the prefix table use scientific notation and may be wider, as may values
    /// between two prefixes when there are fewer than three significant digits.
    #[must_use]
    pub fn max_width(&self) -> usize {
        // A minus sign adds at most one character. "-INF" is never wider than this.
        self.width().saturating_add(1).max("-INF".len())
    }
}
