//! Console text for trips, stays and the analytics queries.

use chrono::NaiveDate;

use crate::analytics::{
    longest_home, longest_trip, most_recent_comparable_home, top_home_stays_until_current,
};
use crate::{IntervalRow, StaysError, TripGroup};

const PRINT_DATE_FORMAT: &str = "%a %d %b %Y";

pub fn format_date(date: NaiveDate) -> String {
    date.format(PRINT_DATE_FORMAT).to_string()
}

/// `"<start> - <end> (N days)"`, or just `"(N days)"` without dates.
pub fn format_span(start: Option<NaiveDate>, end: Option<NaiveDate>, days: i64) -> String {
    match (start, end) {
        (Some(start), Some(end)) => format!(
            "{} - {} ({} days)",
            format_date(start),
            format_date(end),
            days
        ),
        _ => format!("({} days)", days),
    }
}

fn trip_span(row: &IntervalRow) -> String {
    format_span(
        Some(row.trip.start),
        Some(row.trip.end),
        row.trip.duration_days,
    )
}

fn home_span(row: &IntervalRow) -> String {
    format_span(row.home.start, row.home.end, row.home.duration_days)
}

pub fn grouped_trips_lines(groups: &[TripGroup]) -> Vec<String> {
    let mut lines = Vec::new();
    for group in groups {
        lines.push(format!(
            "{} - {}",
            format_date(group.start),
            format_date(group.end)
        ));
        lines.extend(group.cities.iter().map(|city| format!("   {}", city)));
        lines.push(String::new());
    }
    lines
}

pub fn stays_lines(rows: &[IntervalRow]) -> Vec<String> {
    let mut lines = Vec::new();
    for row in rows {
        lines.push(format!("Trip {}", trip_span(row)));
        lines.push(format!("Home {}", home_span(row)));
        lines.push(String::new());
    }
    lines
}

pub fn superlative_lines(rows: &[IntervalRow]) -> Result<Vec<String>, StaysError> {
    let max_trip = longest_trip(rows)?;
    let max_home = longest_home(rows)?;
    Ok(vec![
        format!("Max trip: {}", trip_span(max_trip)),
        format!("Max home: {}", home_span(max_home)),
        String::new(),
    ])
}

pub fn top_home_stays_lines(rows: &[IntervalRow]) -> Result<Vec<String>, StaysError> {
    let top = top_home_stays_until_current(rows)?;
    let mut lines = vec!["Top home stays:".to_string()];
    for (idx, row) in top.iter().enumerate() {
        lines.push(format!("#{}:\t{}", idx + 1, home_span(row)));
    }
    lines.push(String::new());
    Ok(lines)
}

/// Fails with [`StaysError::NoComparableStay`] when no earlier home stay
/// qualifies; callers may report that and carry on.
pub fn comparable_home_lines(rows: &[IntervalRow]) -> Result<Vec<String>, StaysError> {
    let found = most_recent_comparable_home(rows)?;
    let current_days = rows
        .last()
        .map(|row| row.home.duration_days)
        .ok_or(StaysError::EmptyInput)?;
    Ok(vec![
        format!(
            "Most recent home stay equal to or greater than current {} days home:",
            current_days
        ),
        home_span(found),
        String::new(),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{build_rows, group_trips, normalize_stays, RawStay};

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn history() -> (Vec<TripGroup>, Vec<IntervalRow>) {
        let raw = vec![
            RawStay::new("Paris", "2", "2024-01-05"),
            RawStay::new("Lyon", "1", "2024-01-06"),
            RawStay::new("Berlin", "3", "2024-01-20"),
            RawStay::new("Madrid", "1", "2024-02-01"),
        ];
        let stays = normalize_stays(&raw).unwrap();
        let groups = group_trips(&stays, 1);
        let rows = build_rows(&groups, date("2024-02-05"));
        (groups, rows)
    }

    #[test]
    fn dates_use_weekday_day_month_year() {
        assert_eq!(format_date(date("2024-01-06")), "Sat 06 Jan 2024");
    }

    #[test]
    fn span_without_dates_shows_only_duration() {
        assert_eq!(format_span(None, None, 0), "(0 days)");
        assert_eq!(
            format_span(Some(date("2024-01-01")), Some(date("2024-01-02")), 2),
            "Mon 01 Jan 2024 - Tue 02 Jan 2024 (2 days)"
        );
    }

    #[test]
    fn grouped_trips_list_cities() {
        let (groups, _) = history();
        let lines = grouped_trips_lines(&groups);
        assert_eq!(lines[0], "Wed 03 Jan 2024 - Sat 06 Jan 2024");
        assert_eq!(lines[1], "   Paris");
        assert_eq!(lines[2], "   Lyon");
        assert_eq!(lines[3], "");
    }

    #[test]
    fn stays_show_trip_then_home() {
        let (_, rows) = history();
        let lines = stays_lines(&rows);
        assert_eq!(lines.len(), rows.len() * 3);
        assert_eq!(
            lines[1],
            "Home Sun 07 Jan 2024 - Tue 16 Jan 2024 (10 days)"
        );
    }

    #[test]
    fn superlatives() {
        let (_, rows) = history();
        let lines = superlative_lines(&rows).unwrap();
        assert_eq!(lines[0], "Max trip: Wed 03 Jan 2024 - Sat 06 Jan 2024 (4 days)");
        assert_eq!(lines[1], "Max home: Sun 07 Jan 2024 - Tue 16 Jan 2024 (10 days)");
    }

    #[test]
    fn top_home_stays_are_numbered_up_to_current() {
        let (_, rows) = history();
        let lines = top_home_stays_lines(&rows).unwrap();
        assert_eq!(lines[0], "Top home stays:");
        assert_eq!(
            lines[1],
            "#1:\tSun 21 Jan 2024 - Tue 30 Jan 2024 (10 days)"
        );
        assert_eq!(lines[3], "#3:\tFri 02 Feb 2024 - Mon 05 Feb 2024 (4 days)");
        assert_eq!(lines.len(), 5);
    }

    #[test]
    fn comparable_home_lines_name_current_duration() {
        let (_, rows) = history();
        let lines = comparable_home_lines(&rows).unwrap();
        assert_eq!(
            lines[0],
            "Most recent home stay equal to or greater than current 4 days home:"
        );
        assert_eq!(lines[1], "Sun 21 Jan 2024 - Tue 30 Jan 2024 (10 days)");
    }
}
