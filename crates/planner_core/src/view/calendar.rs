//! Week navigation helpers for the calendar strip.

use chrono::{Datelike, Duration, NaiveDate};

/// Sunday on or before `date`.
pub fn week_start(date: NaiveDate) -> NaiveDate {
    let offset = i64::from(date.weekday().num_days_from_sunday());
    date - Duration::days(offset)
}

/// The seven days, Sunday through Saturday, of the week containing `date`.
pub fn week_days(date: NaiveDate) -> Vec<NaiveDate> {
    let start = week_start(date);
    (0..7).map(|offset| start + Duration::days(offset)).collect()
}

/// Moves `date` by whole weeks; negative values go back.
pub fn shift_week(date: NaiveDate, weeks: i64) -> NaiveDate {
    date + Duration::weeks(weeks)
}

#[cfg(test)]
mod tests {
    use super::{shift_week, week_days, week_start};
    use chrono::{Datelike, NaiveDate, Weekday};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn week_start_is_previous_or_same_sunday() {
        // 2026-03-04 is a Wednesday.
        assert_eq!(week_start(date(2026, 3, 4)), date(2026, 3, 1));
        assert_eq!(week_start(date(2026, 3, 1)), date(2026, 3, 1));
        assert_eq!(week_start(date(2026, 3, 7)), date(2026, 3, 1));
    }

    #[test]
    fn week_days_spans_sunday_to_saturday_across_month_end() {
        let days = week_days(date(2026, 4, 2));
        assert_eq!(days.len(), 7);
        assert_eq!(days[0], date(2026, 3, 29));
        assert_eq!(days[0].weekday(), Weekday::Sun);
        assert_eq!(days[6], date(2026, 4, 4));
    }

    #[test]
    fn shift_week_moves_both_directions() {
        assert_eq!(shift_week(date(2026, 3, 4), 1), date(2026, 3, 11));
        assert_eq!(shift_week(date(2026, 3, 4), -1), date(2026, 2, 25));
    }
}
