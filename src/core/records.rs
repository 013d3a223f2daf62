//! Write-path helpers for dated sub-records (educations, experiences).

use chrono::{Datelike, NaiveDate};

/// Records that can be ordered by when they started.
pub trait Dated {
    fn start_date(&self) -> NaiveDate;
}

/// Index of the record with the latest start date; the first one wins a tie.
pub fn latest_index<T: Dated>(records: &[T]) -> Option<usize> {
    let mut latest: Option<(usize, NaiveDate)> = None;
    for (index, record) in records.iter().enumerate() {
        let start = record.start_date();
        match latest {
            Some((_, best)) if start <= best => {}
            _ => latest = Some((index, start)),
        }
    }
    latest.map(|(index, _)| index)
}

/// One flag per record, `true` only at [`latest_index`].
pub fn latest_flags<T: Dated>(records: &[T]) -> Vec<bool> {
    let latest = latest_index(records);
    (0..records.len()).map(|index| Some(index) == latest).collect()
}

/// Whole months from `start` to `end`, never negative.
#[must_use]
pub fn months_between(start: NaiveDate, end: NaiveDate) -> i32 {
    let month = |date: NaiveDate| i32::try_from(date.month()).unwrap_or_default();
    let mut months = (end.year() - start.year()) * 12 + month(end) - month(start);
    if end.day() < start.day() {
        months -= 1;
    }
    months.max(0)
}

/// Sum of whole years per record: `Σ duration_months / 12`.
pub fn total_years<I>(durations_in_months: I) -> i32
where
    I: IntoIterator<Item = i32>,
{
    durations_in_months.into_iter().map(|months| months / 12).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Stint(NaiveDate);

    impl Dated for Stint {
        fn start_date(&self) -> NaiveDate {
            self.0
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_latest_is_max_start_date() {
        let records = [Stint(date(2019, 1, 1)), Stint(date(2022, 6, 1)), Stint(date(2020, 3, 1))];
        assert_eq!(latest_index(&records), Some(1));
        assert_eq!(latest_flags(&records), vec![false, true, false]);
    }

    #[test]
    fn test_first_wins_on_tie() {
        let records = [Stint(date(2021, 1, 1)), Stint(date(2021, 1, 1))];
        assert_eq!(latest_flags(&records), vec![true, false]);
    }

    #[test]
    fn test_empty_batch_has_no_latest() {
        let records: [Stint; 0] = [];
        assert_eq!(latest_index(&records), None);
        assert!(latest_flags(&records).is_empty());
    }

    #[test]
    fn test_months_between() {
        assert_eq!(months_between(date(2019, 1, 1), date(2021, 1, 1)), 24);
        assert_eq!(months_between(date(2019, 1, 15), date(2019, 3, 14)), 1);
        assert_eq!(months_between(date(2022, 1, 1), date(2021, 1, 1)), 0);
    }

    #[test]
    fn test_total_years_uses_integer_division_per_record() {
        assert_eq!(total_years([24, 18, 11]), 3);
        assert_eq!(total_years(std::iter::empty()), 0);
    }
}
