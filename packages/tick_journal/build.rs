//! Derives the build number: whole hours elapsed between 2020-01-01T00:00:00Z and the build.
//!
//! Reproducible builds can pin the build time via `SOURCE_DATE_EPOCH` (seconds since 1970).

use std::time::{SystemTime, UNIX_EPOCH};

/// 2020-01-01T00:00:00Z as seconds since the Unix epoch.
const BUILD_NUMBER_EPOCH_SECONDS: u64 = 1_577_836_800;

const SECONDS_PER_HOUR: u64 = 3600;

fn main() {
    println!("cargo:rerun-if-env-changed=SOURCE_DATE_EPOCH");

    let build_seconds = std::env::var("SOURCE_DATE_EPOCH")
        .ok()
        .and_then(|value| value.trim().parse::<u64>().ok())
        .unwrap_or_else(|| {
            SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map_or(0, |elapsed| elapsed.as_secs())
        });

    let build_number = build_seconds
        .saturating_sub(BUILD_NUMBER_EPOCH_SECONDS)
        .checked_div(SECONDS_PER_HOUR)
        .unwrap_or_default();

    println!("cargo:rustc-env=TICK_JOURNAL_BUILD_NUMBER={build_number}");
}
