//! Contiguous work-window search.
//!
//! Given scored candidate days in chronological order, find the run of `D`
//! exactly consecutive calendar dates with the highest mean suitability.
//! Candidates may have gaps (the caller's availability is arbitrary), so a
//! window is accepted only if its dates step by exactly one day.

use chrono::{Duration, NaiveDate};

use crate::errors::AppError;
use crate::helpers::is_consecutive_run;
use crate::models::ScoredDay;

/// Reason reported when no window of the required length exists.
pub const INSUFFICIENT_CONSECUTIVE_DATES: &str = "insufficient consecutive available dates";

/// How many fallback dates to suggest when no window is found.
pub const SUGGESTED_DATES_LIMIT: usize = 3;

/// The winning window.
#[derive(Debug, Clone, PartialEq)]
pub struct WindowMatch<'a> {
    pub start_date: NaiveDate,
    pub average_score: f64,
    pub days: &'a [ScoredDay],
}

/// Why no window could be chosen.
#[derive(Debug, Clone, PartialEq)]
pub struct WindowFailure {
    pub reason: String,
    /// Individually best days, best first, regardless of contiguity
    pub suggested_dates: Vec<NaiveDate>,
}

/// Result of a window search.
#[derive(Debug, Clone, PartialEq)]
pub enum WindowOutcome<'a> {
    Found(WindowMatch<'a>),
    NotFound(WindowFailure),
}

/// Whether the `duration` days starting at `days[start]` are consecutive.
fn window_is_consecutive(days: &[ScoredDay], start: usize, duration: usize) -> bool {
    let first = days[start].date;
    days[start..start + duration]
        .iter()
        .enumerate()
        .all(|(j, day)| first + Duration::days(j as i64) == day.date)
}

fn mean_score(days: &[ScoredDay]) -> f64 {
    days.iter().map(|d| d.score).sum::<f64>() / days.len() as f64
}

/// Up to `limit` highest-scoring dates, earlier date first on ties.
pub fn top_scoring_dates(days: &[ScoredDay], limit: usize) -> Vec<NaiveDate> {
    let mut ranked: Vec<&ScoredDay> = days.iter().collect();
    ranked.sort_by(|a, b| b.score.total_cmp(&a.score).then(a.date.cmp(&b.date)));
    ranked.into_iter().take(limit).map(|d| d.date).collect()
}

/// Find the best window of `duration` consecutive days.
///
/// `days` must be sorted by date with no duplicates. Windows are scanned in
/// chronological order and the earliest start wins ties, so the result is
/// deterministic. A zero duration or unsorted input is a caller bug and
/// returns `AppError::InvalidInput`.
pub fn find_best_window(
    days: &[ScoredDay],
    duration: u32,
) -> Result<WindowOutcome<'_>, AppError> {
    if duration == 0 {
        return Err(AppError::InvalidInput(
            "project duration must be at least one day".to_string(),
        ));
    }
    let dates: Vec<NaiveDate> = days.iter().map(|d| d.date).collect();
    if !dates.windows(2).all(|w| w[0] < w[1]) {
        return Err(AppError::InvalidInput(
            "candidate days must be strictly chronological".to_string(),
        ));
    }

    let duration = duration as usize;
    let failure = || WindowFailure {
        reason: INSUFFICIENT_CONSECUTIVE_DATES.to_string(),
        suggested_dates: top_scoring_dates(days, SUGGESTED_DATES_LIMIT),
    };

    if days.len() < duration {
        tracing::debug!(
            "Only {} candidate days for a {}-day project",
            days.len(),
            duration
        );
        return Ok(WindowOutcome::NotFound(failure()));
    }

    let mut best: Option<WindowMatch<'_>> = None;
    for start in 0..=(days.len() - duration) {
        if !window_is_consecutive(days, start, duration) {
            continue;
        }
        let window = &days[start..start + duration];
        let average = mean_score(window);
        // Strictly greater keeps the earliest start on ties.
        if best.as_ref().map_or(true, |b| average > b.average_score) {
            best = Some(WindowMatch {
                start_date: window[0].date,
                average_score: average,
                days: window,
            });
        }
    }

    match best {
        Some(found) => {
            debug_assert!(is_consecutive_run(
                &found.days.iter().map(|d| d.date).collect::<Vec<_>>()
            ));
            Ok(WindowOutcome::Found(found))
        }
        None => Ok(WindowOutcome::NotFound(failure())),
    }
}
