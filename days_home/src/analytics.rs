//! Queries over interval rows: superlatives, home stay ranking, and the most
//! recent home stay comparable to the current one.

use std::cmp::{Ordering, Reverse};

use crate::{IntervalRow, StaysError};

fn non_empty(rows: &[IntervalRow]) -> Result<&[IntervalRow], StaysError> {
    if rows.is_empty() {
        Err(StaysError::EmptyInput)
    } else {
        Ok(rows)
    }
}

/// Row with the longest trip; the earliest one wins a tie.
pub fn longest_trip(rows: &[IntervalRow]) -> Result<&IntervalRow, StaysError> {
    non_empty(rows)?
        .iter()
        .min_by_key(|row| Reverse(row.trip.duration_days))
        .ok_or(StaysError::EmptyInput)
}

/// Row with the longest home stay; the earliest one wins a tie.
pub fn longest_home(rows: &[IntervalRow]) -> Result<&IntervalRow, StaysError> {
    non_empty(rows)?
        .iter()
        .min_by_key(|row| Reverse(row.home.duration_days))
        .ok_or(StaysError::EmptyInput)
}

// Longer home stays first, then more recent ones.
fn home_rank_order(a: &IntervalRow, b: &IntervalRow) -> Ordering {
    b.home
        .duration_days
        .cmp(&a.home.duration_days)
        .then_with(|| b.home.start.cmp(&a.home.start))
}

/// Every row, ordered from the longest home stay to the shortest.
///
/// Equal durations are ordered most recent first; rows without home dates
/// sort after dated rows of the same duration.
pub fn ranked_home_stays(rows: &[IntervalRow]) -> Result<Vec<&IntervalRow>, StaysError> {
    let mut ranked: Vec<&IntervalRow> = non_empty(rows)?.iter().collect();
    ranked.sort_by(|a, b| home_rank_order(a, b));
    Ok(ranked)
}

/// The ranking from [`ranked_home_stays`], cut after the current (last) row.
///
/// The length of the result is the current home stay's rank.
pub fn top_home_stays_until_current(
    rows: &[IntervalRow],
) -> Result<Vec<&IntervalRow>, StaysError> {
    let current = non_empty(rows)?.last().ok_or(StaysError::EmptyInput)?;
    let mut ranked = ranked_home_stays(rows)?;
    if let Some(pos) = ranked.iter().position(|row| std::ptr::eq(*row, current)) {
        ranked.truncate(pos + 1);
    }
    Ok(ranked)
}

/// The latest earlier row whose home stay lasted at least as long as the
/// current one.
pub fn most_recent_comparable_home(rows: &[IntervalRow]) -> Result<&IntervalRow, StaysError> {
    let (current, earlier) = non_empty(rows)?
        .split_last()
        .ok_or(StaysError::EmptyInput)?;
    let current_days = current.home.duration_days;

    earlier
        .iter()
        .filter(|row| row.home.duration_days >= current_days)
        .min_by_key(|row| Reverse(row.home.start))
        .ok_or(StaysError::NoComparableStay)
}
