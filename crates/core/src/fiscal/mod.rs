//! Fiscal year and period lifecycle.
//!
//! Periods own the posting window: journal entries are only accepted into
//! Open periods, and the Open -> Closed -> Locked progression is one-way.

pub mod error;
pub mod types;

pub use error::FiscalError;
pub use types::{FiscalPeriod, FiscalYear, PeriodStatus};

use chrono::{Datelike, Days, Months, NaiveDate};

/// Validates that `start_date` is strictly before `end_date`.
///
/// # Errors
///
/// Returns `FiscalError::InvalidDateRange` otherwise.
pub fn validate_date_range(start_date: NaiveDate, end_date: NaiveDate) -> Result<(), FiscalError> {
    if start_date >= end_date {
        return Err(FiscalError::InvalidDateRange);
    }
    Ok(())
}

/// Checks if two date ranges overlap.
///
/// Two ranges [a_start, a_end] and [b_start, b_end] overlap if:
/// a_start <= b_end AND a_end >= b_start
#[must_use]
pub fn date_ranges_overlap(
    a_start: NaiveDate,
    a_end: NaiveDate,
    b_start: NaiveDate,
    b_end: NaiveDate,
) -> bool {
    a_start <= b_end && a_end >= b_start
}

/// Splits a fiscal year date range into contiguous monthly period ranges.
///
/// Each period runs from the first day of a calendar month (or the year
/// start date for the first period) to the last day of that month (or the
/// year end date for the final period).
#[must_use]
pub fn monthly_period_ranges(
    start_date: NaiveDate,
    end_date: NaiveDate,
) -> Vec<(NaiveDate, NaiveDate)> {
    let mut ranges = Vec::new();
    let mut cursor = start_date;

    while cursor <= end_date {
        let next_month_start = cursor
            .with_day(1)
            .and_then(|d| d.checked_add_months(Months::new(1)))
            .unwrap_or(end_date);
        let month_end = next_month_start
            .checked_sub_days(Days::new(1))
            .unwrap_or(end_date);
        let period_end = month_end.min(end_date);

        ranges.push((cursor, period_end));

        let Some(next) = period_end.checked_add_days(Days::new(1)) else {
            break;
        };
        cursor = next;
    }

    ranges
}

/// Verifies that periods are contiguous and non-overlapping.
///
/// Expects the slice ordered by sequence number; each period must start
/// the day after its predecessor ends.
///
/// # Errors
///
/// Returns `FiscalError::PeriodsNotContiguous` on a gap or overlap.
pub fn validate_contiguous(periods: &[FiscalPeriod]) -> Result<(), FiscalError> {
    for pair in periods.windows(2) {
        let expected = pair[0].end_date.checked_add_days(Days::new(1));
        if expected != Some(pair[1].start_date) {
            return Err(FiscalError::PeriodsNotContiguous {
                first: pair[0].sequence,
                second: pair[1].sequence,
            });
        }
    }
    Ok(())
}

/// Validates the preconditions for closing a period.
///
/// A period closes only when it is Open, every journal entry dated inside
/// it is Posted or Cancelled (no Drafts outstanding), and all earlier
/// periods in the year are already closed.
///
/// # Errors
///
/// Returns the specific `FiscalError` for the violated precondition.
pub fn validate_close(
    status: PeriodStatus,
    outstanding_drafts: usize,
    earlier_periods_open: bool,
) -> Result<(), FiscalError> {
    status.validate_transition(PeriodStatus::Closed)?;
    if outstanding_drafts > 0 {
        return Err(FiscalError::DraftEntriesOutstanding(outstanding_drafts));
    }
    if earlier_periods_open {
        return Err(FiscalError::EarlierPeriodsOpen);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tessera_shared::types::{FiscalPeriodId, FiscalYearId};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn period(seq: i32, start: NaiveDate, end: NaiveDate) -> FiscalPeriod {
        FiscalPeriod {
            id: FiscalPeriodId::new(),
            fiscal_year_id: FiscalYearId::new(),
            sequence: seq,
            name: format!("Period {seq}"),
            start_date: start,
            end_date: end,
            status: PeriodStatus::Open,
        }
    }

    #[test]
    fn test_validate_date_range() {
        assert!(validate_date_range(date(2026, 1, 1), date(2026, 12, 31)).is_ok());
        assert!(validate_date_range(date(2026, 12, 31), date(2026, 1, 1)).is_err());
        assert!(validate_date_range(date(2026, 1, 1), date(2026, 1, 1)).is_err());
    }

    #[test]
    fn test_date_ranges_overlap() {
        assert!(date_ranges_overlap(
            date(2026, 1, 1),
            date(2026, 6, 30),
            date(2026, 6, 1),
            date(2026, 12, 31),
        ));
        assert!(!date_ranges_overlap(
            date(2026, 1, 1),
            date(2026, 6, 30),
            date(2026, 7, 1),
            date(2026, 12, 31),
        ));
    }

    #[test]
    fn test_monthly_period_ranges_calendar_year() {
        let ranges = monthly_period_ranges(date(2026, 1, 1), date(2026, 12, 31));
        assert_eq!(ranges.len(), 12);
        assert_eq!(ranges[0], (date(2026, 1, 1), date(2026, 1, 31)));
        assert_eq!(ranges[1], (date(2026, 2, 1), date(2026, 2, 28)));
        assert_eq!(ranges[11], (date(2026, 12, 1), date(2026, 12, 31)));
    }

    #[test]
    fn test_monthly_period_ranges_partial_months() {
        let ranges = monthly_period_ranges(date(2026, 1, 15), date(2026, 3, 10));
        assert_eq!(
            ranges,
            vec![
                (date(2026, 1, 15), date(2026, 1, 31)),
                (date(2026, 2, 1), date(2026, 2, 28)),
                (date(2026, 3, 1), date(2026, 3, 10)),
            ]
        );
    }

    #[test]
    fn test_monthly_ranges_are_contiguous() {
        let ranges = monthly_period_ranges(date(2026, 4, 1), date(2027, 3, 31));
        let periods: Vec<FiscalPeriod> = ranges
            .iter()
            .enumerate()
            .map(|(i, (s, e))| period(i32::try_from(i).unwrap() + 1, *s, *e))
            .collect();
        assert!(validate_contiguous(&periods).is_ok());
    }

    #[test]
    fn test_contiguity_detects_gap() {
        let periods = vec![
            period(1, date(2026, 1, 1), date(2026, 1, 31)),
            period(2, date(2026, 2, 2), date(2026, 2, 28)),
        ];
        assert!(matches!(
            validate_contiguous(&periods),
            Err(FiscalError::PeriodsNotContiguous { first: 1, second: 2 })
        ));
    }

    #[test]
    fn test_contiguity_detects_overlap() {
        let periods = vec![
            period(1, date(2026, 1, 1), date(2026, 1, 31)),
            period(2, date(2026, 1, 31), date(2026, 2, 28)),
        ];
        assert!(validate_contiguous(&periods).is_err());
    }

    #[test]
    fn test_validate_close_happy_path() {
        assert!(validate_close(PeriodStatus::Open, 0, false).is_ok());
    }

    #[test]
    fn test_validate_close_with_drafts() {
        assert!(matches!(
            validate_close(PeriodStatus::Open, 3, false),
            Err(FiscalError::DraftEntriesOutstanding(3))
        ));
    }

    #[test]
    fn test_validate_close_earlier_open() {
        assert!(matches!(
            validate_close(PeriodStatus::Open, 0, true),
            Err(FiscalError::EarlierPeriodsOpen)
        ));
    }

    #[test]
    fn test_validate_close_already_closed() {
        assert!(validate_close(PeriodStatus::Closed, 0, false).is_err());
    }
}
