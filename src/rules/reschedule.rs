use chrono::NaiveDate;

use super::policy::{BookingPolicy, BookingValidationResult};

pub const SAME_DAY_REASON: &str = "New date cannot be the same as the original booking date";
pub const PAST_DATE_REASON: &str = "Cannot reschedule to a past date";

/// Validate moving a booking that starts on `original` to start on `requested`.
///
/// Order: booking policy, same-day, past-date. Whether the new day is free
/// is the caller's job (`is_date_booked` excluding the booking itself).
pub fn validate_reschedule(
    policy: &BookingPolicy,
    original: NaiveDate,
    requested: NaiveDate,
    today: NaiveDate,
) -> BookingValidationResult {
    let basic = policy.check(requested);
    if !basic.valid {
        return basic;
    }
    if original == requested {
        return BookingValidationResult::reject(SAME_DAY_REASON);
    }
    if requested < today {
        return BookingValidationResult::reject(PAST_DATE_REASON);
    }
    BookingValidationResult::ok()
}
