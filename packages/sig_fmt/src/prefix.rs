/// SI prefixes in ascending order of magnitude, three decades apart.
///
/// The entry at [`UNIT_PREFIX_INDEX`] stands for 10^0 and is rendered as a blank.
const PREFIXES: [char; 21] = [
    'q', 'r', 'y', 'z', 'a', 'f', 'p', 'n', 'u', 'm', ' ', 'k', 'M', 'G', 'T', 'P', 'E', 'Z', 'Y',
    'R', 'Q',
];

const UNIT_PREFIX_INDEX: i32 = 10;

/// Decimal exponent of the smallest prefix in the table (`q`).
pub(crate) const MIN_PREFIX_EXPONENT: i32 = -30;

/// Decimal exponent of the largest prefix in the table (`Q`).
pub(crate) const MAX_PREFIX_EXPONENT: i32 = 30;

/// Returns the SI prefix for a decimal exponent that is a multiple of three, or `None` if the
/// exponent is outside the table.
pub(crate) fn prefix_for_exponent(exponent: i32) -> Option<char> {
    if !(MIN_PREFIX_EXPONENT..=MAX_PREFIX_EXPONENT).contains(&exponent) {
        return None;
    }

    debug_assert_eq!(exponent.rem_euclid(3), 0, "prefix exponents are multiples of 3");

    let index = UNIT_PREFIX_INDEX.checked_add(exponent.div_euclid(3))?;

    usize::try_from(index)
        .ok()
        .and_then(|index| PREFIXES.get(index))
        .copied()
}
