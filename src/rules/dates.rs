use chrono::{
    DateTime, Datelike, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc, Weekday,
};

/// The single declared time zone every day boundary is computed in.
///
/// Instants are converted into this offset before their calendar day is
/// taken, so "which day is it" never depends on the host's local zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeReference {
    offset: FixedOffset,
}

impl Default for TimeReference {
    fn default() -> Self {
        Self::utc()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid date format")]
pub struct DateParseError;

impl TimeReference {
    pub fn utc() -> Self {
        Self {
            offset: FixedOffset::east_opt(0).expect("zero offset is valid"),
        }
    }

    pub fn new(offset: FixedOffset) -> Self {
        Self { offset }
    }

    /// Parse an offset of the form `+HH:MM`, `-HH:MM`, `Z` or `UTC`.
    pub fn parse_offset(s: &str) -> Option<Self> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("z") || s.eq_ignore_ascii_case("utc") {
            return Some(Self::utc());
        }
        let (sign, rest) = match s.as_bytes().first()? {
            b'+' => (1, &s[1..]),
            b'-' => (-1, &s[1..]),
            _ => return None,
        };
        let (h, m) = rest.split_once(':')?;
        let h: i32 = h.parse().ok()?;
        let m: i32 = m.parse().ok()?;
        if !(0..=23).contains(&h) || !(0..=59).contains(&m) {
            return None;
        }
        FixedOffset::east_opt(sign * (h * 3600 + m * 60)).map(Self::new)
    }

    pub fn offset(&self) -> FixedOffset {
        self.offset
    }

    /// Calendar day of `instant` in the reference zone.
    pub fn day_of<Tz: TimeZone>(&self, instant: &DateTime<Tz>) -> NaiveDate {
        instant.with_timezone(&self.offset).date_naive()
    }

    pub fn today(&self, now: DateTime<Utc>) -> NaiveDate {
        self.day_of(&now)
    }

    /// `instant` with its time set to 00:00:00.000 in the reference zone.
    pub fn start_of_day<Tz: TimeZone>(&self, instant: &DateTime<Tz>) -> DateTime<FixedOffset> {
        self.at(self.day_of(instant), NaiveTime::MIN)
    }

    /// `instant` with its time set to 23:59:59.999 in the reference zone.
    pub fn end_of_day<Tz: TimeZone>(&self, instant: &DateTime<Tz>) -> DateTime<FixedOffset> {
        let last_ms = NaiveTime::from_hms_milli_opt(23, 59, 59, 999).expect("valid time");
        self.at(self.day_of(instant), last_ms)
    }

    pub fn same_day<A: TimeZone, B: TimeZone>(&self, a: &DateTime<A>, b: &DateTime<B>) -> bool {
        let (a, b) = (self.day_of(a), self.day_of(b));
        a.year() == b.year() && a.month() == b.month() && a.day() == b.day()
    }

    pub fn is_monday<Tz: TimeZone>(&self, instant: &DateTime<Tz>) -> bool {
        is_monday(self.day_of(instant))
    }

    /// Midnight of `day` in the reference zone.
    pub fn start_of(&self, day: NaiveDate) -> DateTime<FixedOffset> {
        self.at(day, NaiveTime::MIN)
    }

    fn at(&self, day: NaiveDate, time: NaiveTime) -> DateTime<FixedOffset> {
        // A fixed offset has no gaps or folds, so the mapping is always single.
        self.offset
            .from_local_datetime(&day.and_time(time))
            .single()
            .expect("fixed offsets map local times uniquely")
    }

    /// Parse a client-supplied date into an instant.
    ///
    /// Accepts `YYYY-MM-DD` (midnight in the reference zone), RFC 3339, and
    /// naive `YYYY-MM-DDTHH:MM:SS[.fff]` (interpreted in the reference zone).
    pub fn parse(&self, input: &str) -> Result<DateTime<FixedOffset>, DateParseError> {
        let input = input.trim();
        if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
            return Ok(dt);
        }
        if let Ok(day) = NaiveDate::parse_from_str(input, "%Y-%m-%d") {
            return Ok(self.start_of(day));
        }
        for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M"] {
            if let Ok(naive) = NaiveDateTime::parse_from_str(input, fmt) {
                return self
                    .offset
                    .from_local_datetime(&naive)
                    .single()
                    .ok_or(DateParseError);
            }
        }
        Err(DateParseError)
    }

    /// Parse straight to the calendar day in the reference zone.
    pub fn parse_day(&self, input: &str) -> Result<NaiveDate, DateParseError> {
        self.parse(input).map(|dt| self.day_of(&dt))
    }
}

/// ISO Monday check on an already-normalized day.
pub fn is_monday(day: NaiveDate) -> bool {
    day.weekday() == Weekday::Mon
}

/// Canonical `YYYY-MM-DD` form.
pub fn format_iso(day: NaiveDate) -> String {
    day.format("%Y-%m-%d").to_string()
}

/// Long form for user-facing messages, e.g. "May 8, 2025".
pub fn format_long(day: NaiveDate) -> String {
    day.format("%B %-d, %Y").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn start_and_end_of_day_utc() {
        let tr = TimeReference::utc();
        let t = DateTime::parse_from_rfc3339("2025-06-03T15:42:10.123Z").unwrap();
        assert_eq!(tr.start_of_day(&t).to_rfc3339(), "2025-06-03T00:00:00+00:00");
        assert_eq!(
            tr.end_of_day(&t).to_rfc3339(),
            "2025-06-03T23:59:59.999+00:00"
        );
    }

    #[test]
    fn day_boundary_follows_reference_offset() {
        // 23:30 UTC on a Sunday is already Monday in UTC+02:00.
        let t = DateTime::parse_from_rfc3339("2025-05-11T23:30:00Z").unwrap();
        let utc = TimeReference::utc();
        let east = TimeReference::parse_offset("+02:00").unwrap();
        assert_eq!(utc.day_of(&t), day("2025-05-11"));
        assert!(!utc.is_monday(&t));
        assert_eq!(east.day_of(&t), day("2025-05-12"));
        assert!(east.is_monday(&t));
    }

    #[test]
    fn same_day_ignores_time() {
        let tr = TimeReference::utc();
        let a = DateTime::parse_from_rfc3339("2025-06-10T00:00:00Z").unwrap();
        let b = DateTime::parse_from_rfc3339("2025-06-10T23:59:59Z").unwrap();
        let c = DateTime::parse_from_rfc3339("2025-06-11T00:00:00Z").unwrap();
        assert!(tr.same_day(&a, &b));
        assert!(!tr.same_day(&b, &c));
    }

    #[test]
    fn monday_detection() {
        assert!(is_monday(day("2025-05-12")));
        assert!(!is_monday(day("2025-05-13")));
        assert!(!is_monday(day("2025-05-11")));
    }

    #[test]
    fn parse_accepts_common_shapes() {
        let tr = TimeReference::utc();
        assert_eq!(tr.parse_day("2025-06-03").unwrap(), day("2025-06-03"));
        assert_eq!(tr.parse_day("2025-06-03T10:00:00Z").unwrap(), day("2025-06-03"));
        assert_eq!(tr.parse_day("2025-06-03T10:00:00.000Z").unwrap(), day("2025-06-03"));
        assert_eq!(tr.parse_day("2025-06-03T10:00:00").unwrap(), day("2025-06-03"));
        // Offset in the input is honored before normalizing to the reference day.
        assert_eq!(
            tr.parse_day("2025-06-03T01:00:00+05:00").unwrap(),
            day("2025-06-02")
        );
    }

    #[test]
    fn parse_rejects_garbage() {
        let tr = TimeReference::utc();
        assert_eq!(tr.parse("not a date"), Err(DateParseError));
        assert_eq!(tr.parse("2025-13-01"), Err(DateParseError));
        assert_eq!(tr.parse(""), Err(DateParseError));
    }

    #[test]
    fn parse_offset_forms() {
        assert_eq!(TimeReference::parse_offset("Z"), Some(TimeReference::utc()));
        assert_eq!(TimeReference::parse_offset("UTC"), Some(TimeReference::utc()));
        assert_eq!(
            TimeReference::parse_offset("-05:30").unwrap().offset().local_minus_utc(),
            -(5 * 3600 + 30 * 60)
        );
        assert!(TimeReference::parse_offset("+25:00").is_none());
        assert!(TimeReference::parse_offset("0200").is_none());
    }

    #[test]
    fn formatting() {
        assert_eq!(format_iso(day("2025-05-08")), "2025-05-08");
        assert_eq!(format_long(day("2025-05-08")), "May 8, 2025");
    }
}
