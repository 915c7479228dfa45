//! Shared helpers for calendar-date arithmetic and numeric clamping.
//!
//! All date handling works on `NaiveDate`: the scheduler reasons about whole
//! calendar days in the job site's local calendar, never about instants.

use chrono::{Duration, NaiveDate};

/// Clamp a score into [0, 1].
///
/// Returns 0 for non-finite inputs (NaN, ±Inf) so a malformed forecast value
/// can never make a day look better than it is.
pub(crate) fn clamp_unit(v: f64) -> f64 {
    if !v.is_finite() {
        tracing::warn!("clamp_unit received non-finite value {}, defaulting to 0", v);
        return 0.0;
    }
    v.clamp(0.0, 1.0)
}

/// The date `offset` days after `start`.
pub(crate) fn add_days(start: NaiveDate, offset: u32) -> NaiveDate {
    start + Duration::days(i64::from(offset))
}

/// `n` consecutive calendar dates beginning at `start`.
pub fn consecutive_dates(start: NaiveDate, n: u32) -> Vec<NaiveDate> {
    (0..n).map(|i| add_days(start, i)).collect()
}

/// Whether `dates` is a run of exactly consecutive calendar days.
///
/// Empty and single-element slices are trivially consecutive.
pub fn is_consecutive_run(dates: &[NaiveDate]) -> bool {
    dates.windows(2).all(|w| w[0].succ_opt() == Some(w[1]))
}

/// Sort and de-duplicate a list of dates.
pub(crate) fn sorted_unique_dates(dates: &[NaiveDate]) -> Vec<NaiveDate> {
    let mut out = dates.to_vec();
    out.sort_unstable();
    out.dedup();
    out
}

/// Every calendar day from `first` to `last` inclusive. Empty if `last < first`.
pub(crate) fn date_range_inclusive(first: NaiveDate, last: NaiveDate) -> Vec<NaiveDate> {
    first
        .iter_days()
        .take_while(|d| *d <= last)
        .collect()
}

/// Stable 64-bit FNV-1a hash, used to derive per-location simulation seeds.
///
/// `std`'s `DefaultHasher` is not guaranteed stable across releases, which
/// would break reproducibility of simulated forecasts.
pub(crate) fn fnv1a_64(s: &str) -> u64 {
    const OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
    const PRIME: u64 = 0x0000_0100_0000_01b3;
    s.bytes()
        .fold(OFFSET, |hash, b| (hash ^ u64::from(b)).wrapping_mul(PRIME))
}
