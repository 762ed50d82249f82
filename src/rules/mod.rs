//! Pure booking rules: day normalization, the start-date policy, overlap
//! detection, reschedule validation, and free-day enumeration.
//!
//! Nothing here touches I/O or locks; callers hand in the venue calendar
//! they already hold.

mod available;
mod dates;
mod overlap;
mod policy;
mod reschedule;

pub use available::{AvailableDate, AvailableDates, available_dates};
pub use dates::{DateParseError, TimeReference, format_iso, format_long, is_monday};
pub use overlap::{Reserved, conflicting, has_overlap, is_date_booked};
pub use policy::{BookingPolicy, BookingValidationResult, MONDAY_REASON};
pub use reschedule::{PAST_DATE_REASON, SAME_DAY_REASON, validate_reschedule};
