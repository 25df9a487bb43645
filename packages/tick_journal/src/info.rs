use std::fmt::{self, Display};
use std::sync::Arc;

use crate::CalibrationSnapshot;

/// Hours between 2020-01-01T00:00:00Z and the time this package was built.
const BUILD_NUMBER: &str = env!("TICK_JOURNAL_BUILD_NUMBER");

/// Whether the package was compiled with debug assertions.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[non_exhaustive]
pub enum BuildType {
    /// Debug assertions enabled: contract violations panic.
    Debug,

    /// Debug assertions disabled: contract violations are clamped to safe values.
    Release,
}

impl Display for BuildType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Debug => write!(f, "debug"),
            Self::Release => write!(f, "release"),
        }
    }
}

/// Version, build and calibration details of this package in the current process.
///
/// # Example
///
/// ```
/// use tick_journal::Info;
///
/// let info = Info::current();
///
/// let (major, minor, patch) = info.version();
/// println!("tick_journal {major}.{minor}.{patch}");
/// println!("{info}");
/// ```
#[derive(Clone, Debug)]
pub struct Info {
    version: (u16, u16, u16),
    build_number: u32,
    build_type: BuildType,
    calibration: Arc<CalibrationSnapshot>,
}

impl Info {
    /// Collects the details, calibrating the tick source if that has not happened yet.
    #[must_use]
    pub fn current() -> Self {
        Self::with_calibration(CalibrationSnapshot::current())
    }

    fn with_calibration(calibration: Arc<CalibrationSnapshot>) -> Self {
        Self {
            version: (
                parse_version_part(env!("CARGO_PKG_VERSION_MAJOR")),
                parse_version_part(env!("CARGO_PKG_VERSION_MINOR")),
                parse_version_part(env!("CARGO_PKG_VERSION_PATCH")),
            ),
            build_number: BUILD_NUMBER.parse().unwrap_or_default(),
            build_type: if cfg!(debug_assertions) {
                BuildType::Debug
            } else {
                BuildType::Release
            },
            calibration,
        }
    }

    /// Package version as `(major, minor, patch)`.
    #[must_use]
    pub fn version(&self) -> (u16, u16, u16) {
        self.version
    }

    /// Hours between 2020-01-01T00:00:00Z and the build of this package.
    ///
    /// Builds that set `SOURCE_DATE_EPOCH` use that time instead of the actual build time.
    #[must_use]
    pub fn build_number(&self) -> u32 {
        self.build_number
    }

    /// Whether the package was compiled with debug assertions.
    #[must_use]
    pub fn build_type(&self) -> BuildType {
        self.build_type
    }

    /// The calibration in effect when the details were collected.
    #[must_use]
    pub fn calibration(&self) -> &CalibrationSnapshot {
        &self.calibration
    }
}

impl Display for Info {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (major, minor, patch) = self.version;
        let tick = sig_fmt::format(self.calibration.seconds_per_tick(), 4, 1);

        write!(
            f,
            "tick_journal {major}.{minor}.{patch} build {} ({}), ",
            self.build_number, self.build_type,
        )?;

        write!(
            f,
            "tick {}s, resolution {:.1} ticks, overhead {:.1} ticks",
            tick.trim_start(),
            self.calibration.clock_resolution_ticks(),
            self.calibration.clock_overhead_ticks(),
        )
    }
}

fn parse_version_part(part: &str) -> u16 {
    part.parse().unwrap_or_default()
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    fn fixed() -> Info {
        Info::with_calibration(Arc::new(CalibrationSnapshot::from_parts(
            2.5e-10, 18.0, 22.0, 30e-9,
        )))
    }

    #[test]
    fn version_matches_package() {
        let (major, minor, patch) = fixed().version();

        assert_eq!(
            format!("{major}.{minor}.{patch}"),
            env!("CARGO_PKG_VERSION")
        );
    }

    #[test]
    fn build_number_is_after_epoch() {
        // Any build of this code happens after 2025-01-01.
        assert!(fixed().build_number() > 43_800);
    }

    #[test]
    fn build_type_follows_debug_assertions() {
        let expected = if cfg!(debug_assertions) {
            BuildType::Debug
        } else {
            BuildType::Release
        };

        assert_eq!(fixed().build_type(), expected);
    }

    #[test]
    fn display_is_one_line_summary() {
        let text = fixed().to_string();

        assert!(text.starts_with("tick_journal "));
        assert!(text.contains("tick 250.0 ps,"));
        assert!(text.contains("resolution 22.0 ticks"));
        assert!(text.contains("overhead 18.0 ticks"));
        assert!(!text.contains('\n'));
    }

    #[test]
    fn display_has_no_alignment_padding() {
        let info = Info::with_calibration(Arc::new(CalibrationSnapshot::from_parts(
            1e-9, 18.0, 22.0, 30e-9,
        )));

        assert!(info.to_string().contains(", tick 1.0 ns,"));
    }

    #[test]
    fn current_uses_current_calibration() {
        let info = Info::current();

        assert!(info.calibration().seconds_per_tick() > 0.0);
    }

    #[test]
    fn parse_version_part_tolerates_garbage() {
        assert_eq!(parse_version_part("12"), 12);
        assert_eq!(parse_version_part("x"), 0);
    }
}
