use chrono::NaiveDate;
use ulid::Ulid;

use crate::model::{Booking, CalendarEntry, DateRange};

/// Anything that occupies an inclusive day range on a venue calendar.
pub trait Reserved {
    fn range(&self) -> DateRange;
    fn booking_id(&self) -> Ulid;
}

impl Reserved for CalendarEntry {
    fn range(&self) -> DateRange {
        CalendarEntry::range(self)
    }

    fn booking_id(&self) -> Ulid {
        self.booking_id
    }
}

impl Reserved for Booking {
    fn range(&self) -> DateRange {
        Booking::range(self)
    }

    fn booking_id(&self) -> Ulid {
        self.id
    }
}

/// True iff `day` falls inside any range not owned by `exclude`.
///
/// Scans every entry; the result does not depend on the order of `ranges`.
pub fn is_date_booked<'a, R, I>(ranges: I, day: NaiveDate, exclude: Option<Ulid>) -> bool
where
    R: Reserved + 'a,
    I: IntoIterator<Item = &'a R>,
{
    ranges
        .into_iter()
        .filter(|r| exclude != Some(r.booking_id()))
        .any(|r| r.range().contains(day))
}

/// True iff any range shares at least one day with `candidate`.
pub fn has_overlap<'a, R, I>(ranges: I, candidate: &DateRange) -> bool
where
    R: Reserved + 'a,
    I: IntoIterator<Item = &'a R>,
{
    ranges.into_iter().any(|r| r.range().overlaps(candidate))
}

/// Every booking id whose range overlaps `candidate`, in input order.
pub fn conflicting<'a, R, I>(ranges: I, candidate: &DateRange) -> Vec<Ulid>
where
    R: Reserved + 'a,
    I: IntoIterator<Item = &'a R>,
{
    ranges
        .into_iter()
        .filter(|r| r.range().overlaps(candidate))
        .map(|r| r.booking_id())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn range(a: &str, b: &str) -> DateRange {
        DateRange::new(day(a), day(b)).unwrap()
    }

    fn entry(a: &str, b: &str) -> CalendarEntry {
        CalendarEntry::new(Ulid::new(), range(a, b))
    }

    #[test]
    fn shared_boundary_day_overlaps() {
        let cal = vec![entry("2025-06-01", "2025-06-03")];
        assert!(has_overlap(&cal, &range("2025-06-03", "2025-06-04")));
    }

    #[test]
    fn adjacent_day_does_not_overlap() {
        let cal = vec![entry("2025-06-01", "2025-06-03")];
        assert!(!has_overlap(&cal, &range("2025-06-04", "2025-06-05")));
    }

    #[test]
    fn candidate_enclosing_existing_overlaps() {
        let cal = vec![entry("2025-06-10", "2025-06-11")];
        assert!(has_overlap(&cal, &range("2025-06-01", "2025-06-30")));
    }

    #[test]
    fn overlap_is_symmetric_and_reflexive() {
        let pairs = [
            (range("2025-06-01", "2025-06-03"), range("2025-06-03", "2025-06-04")),
            (range("2025-06-01", "2025-06-03"), range("2025-06-04", "2025-06-05")),
            (range("2025-06-01", "2025-06-30"), range("2025-06-10", "2025-06-11")),
            (range("2025-06-05", "2025-06-05"), range("2025-06-05", "2025-06-05")),
        ];
        for (a, b) in pairs {
            assert_eq!(a.overlaps(&b), b.overlaps(&a), "{a:?} vs {b:?}");
            assert!(a.overlaps(&a));
            assert!(b.overlaps(&b));
        }
    }

    #[test]
    fn order_independent() {
        let mut cal = vec![
            entry("2025-07-01", "2025-07-02"),
            entry("2025-06-01", "2025-06-03"),
            entry("2025-08-01", "2025-08-05"),
        ];
        let candidate = range("2025-06-02", "2025-06-02");
        let forward = has_overlap(&cal, &candidate);
        cal.reverse();
        assert_eq!(forward, has_overlap(&cal, &candidate));
        assert!(forward);
    }

    #[test]
    fn empty_calendar_never_overlaps() {
        let cal: Vec<CalendarEntry> = Vec::new();
        assert!(!has_overlap(&cal, &range("2025-06-01", "2025-06-03")));
        assert!(!is_date_booked(&cal, day("2025-06-01"), None));
    }

    #[test]
    fn date_booked_inclusive_bounds() {
        let cal = vec![entry("2025-06-01", "2025-06-03")];
        assert!(is_date_booked(&cal, day("2025-06-01"), None));
        assert!(is_date_booked(&cal, day("2025-06-02"), None));
        assert!(is_date_booked(&cal, day("2025-06-03"), None));
        assert!(!is_date_booked(&cal, day("2025-05-31"), None));
        assert!(!is_date_booked(&cal, day("2025-06-04"), None));
    }

    #[test]
    fn excluded_booking_never_reports_booked() {
        let own = entry("2025-06-01", "2025-06-03");
        let cal = vec![own.clone()];
        for d in ["2025-06-01", "2025-06-02", "2025-06-03"] {
            assert!(!is_date_booked(&cal, day(d), Some(own.booking_id)));
        }
    }

    #[test]
    fn exclusion_only_skips_that_booking() {
        let own = entry("2025-06-01", "2025-06-03");
        let other = entry("2025-06-03", "2025-06-05");
        let cal = vec![own.clone(), other];
        assert!(!is_date_booked(&cal, day("2025-06-01"), Some(own.booking_id)));
        assert!(is_date_booked(&cal, day("2025-06-03"), Some(own.booking_id)));
    }

    #[test]
    fn conflicting_lists_every_hit() {
        let a = entry("2025-06-01", "2025-06-03");
        let b = entry("2025-06-05", "2025-06-06");
        let c = entry("2025-06-10", "2025-06-12");
        let cal = vec![a.clone(), b.clone(), c];
        let hits = conflicting(&cal, &range("2025-06-03", "2025-06-05"));
        assert_eq!(hits, vec![a.booking_id, b.booking_id]);
    }
}
