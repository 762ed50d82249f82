use std::iter::FusedIterator;

use chrono::NaiveDate;
use serde::Serialize;

use super::dates::format_iso;
use super::overlap::{Reserved, is_date_booked};
use super::policy::BookingPolicy;

/// One free day, with its canonical `YYYY-MM-DD` form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailableDate {
    pub date: NaiveDate,
    pub date_string: String,
}

/// Lazy walk over `[start, end]`, yielding days that pass the booking
/// policy and are not covered by any reserved range.
///
/// A clone continues from the same day; call [`available_dates`] again to
/// start over.
#[derive(Debug)]
pub struct AvailableDates<'a, R> {
    policy: &'a BookingPolicy,
    reserved: &'a [R],
    next: Option<NaiveDate>,
    end: NaiveDate,
}

impl<R> Clone for AvailableDates<'_, R> {
    fn clone(&self) -> Self {
        Self {
            policy: self.policy,
            reserved: self.reserved,
            next: self.next,
            end: self.end,
        }
    }
}

pub fn available_dates<'a, R: Reserved>(
    policy: &'a BookingPolicy,
    reserved: &'a [R],
    start: NaiveDate,
    end: NaiveDate,
) -> AvailableDates<'a, R> {
    AvailableDates {
        policy,
        reserved,
        next: (start <= end).then_some(start),
        end,
    }
}

impl<R: Reserved> Iterator for AvailableDates<'_, R> {
    type Item = AvailableDate;

    fn next(&mut self) -> Option<AvailableDate> {
        while let Some(day) = self.next {
            self.next = day.succ_opt().filter(|d| *d <= self.end);
            if !self.policy.is_bookable(day) || is_date_booked(self.reserved, day, None) {
                continue;
            }
            return Some(AvailableDate {
                date: day,
                date_string: format_iso(day),
            });
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self
            .next
            .map(|d| (self.end - d).num_days() as usize + 1)
            .unwrap_or(0);
        (0, Some(remaining))
    }
}

impl<R: Reserved> FusedIterator for AvailableDates<'_, R> {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CalendarEntry, DateRange};
    use ulid::Ulid;

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn entry(a: &str, b: &str) -> CalendarEntry {
        CalendarEntry::new(Ulid::new(), DateRange::new(day(a), day(b)).unwrap())
    }

    fn policy() -> BookingPolicy {
        BookingPolicy::new(day("2025-05-08"))
    }

    fn strings(it: impl Iterator<Item = AvailableDate>) -> Vec<String> {
        it.map(|d| d.date_string).collect()
    }

    #[test]
    fn skips_mondays_and_booked_days() {
        let p = policy();
        let cal = vec![entry("2025-06-03", "2025-06-04")];
        // 2025-06-01 Sun .. 2025-06-07 Sat; 06-02 is a Monday.
        let got = strings(available_dates(&p, &cal, day("2025-06-01"), day("2025-06-07")));
        assert_eq!(got, vec!["2025-06-01", "2025-06-05", "2025-06-06", "2025-06-07"]);
    }

    #[test]
    fn window_before_floor_is_empty() {
        let p = policy();
        let cal: Vec<CalendarEntry> = Vec::new();
        let mut it = available_dates(&p, &cal, day("2025-04-01"), day("2025-05-07"));
        assert!(it.next().is_none());
        assert!(it.next().is_none());
    }

    #[test]
    fn reversed_window_is_empty() {
        let p = policy();
        let cal: Vec<CalendarEntry> = Vec::new();
        assert_eq!(available_dates(&p, &cal, day("2025-06-07"), day("2025-06-01")).count(), 0);
    }

    #[test]
    fn fully_booked_window_is_empty() {
        let p = policy();
        let cal = vec![entry("2025-06-01", "2025-06-30")];
        assert_eq!(available_dates(&p, &cal, day("2025-06-01"), day("2025-06-30")).count(), 0);
    }

    #[test]
    fn single_day_window() {
        let p = policy();
        let cal: Vec<CalendarEntry> = Vec::new();
        let got: Vec<_> = available_dates(&p, &cal, day("2025-06-03"), day("2025-06-03")).collect();
        assert_eq!(got.len(), 1);
        assert_eq!(got[0].date, day("2025-06-03"));
        assert_eq!(got[0].date_string, "2025-06-03");
    }

    #[test]
    fn clone_resumes_from_same_point() {
        let p = policy();
        let cal: Vec<CalendarEntry> = Vec::new();
        let mut it = available_dates(&p, &cal, day("2025-06-03"), day("2025-06-07"));
        it.next();
        let rest_a = strings(it.clone());
        let rest_b = strings(it);
        assert_eq!(rest_a, rest_b);
        assert_eq!(rest_a, vec!["2025-06-04", "2025-06-05", "2025-06-06", "2025-06-07"]);
    }

    #[test]
    fn size_hint_bounds_remaining_days() {
        let p = policy();
        let cal: Vec<CalendarEntry> = Vec::new();
        let it = available_dates(&p, &cal, day("2025-06-01"), day("2025-06-07"));
        assert_eq!(it.size_hint(), (0, Some(7)));
    }
}
