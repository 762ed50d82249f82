use chrono::{DateTime, Utc};
use tracing::error;

use crate::limits::*;
use crate::model::*;
use crate::rules::{conflicting, has_overlap, is_date_booked};

use super::EngineError;

pub const NOT_AVAILABLE_REASON: &str = "Venue not available for these dates";
pub const ALREADY_BOOKED_REASON: &str = "Venue is already booked for this date";

pub(crate) fn now() -> DateTime<Utc> {
    Utc::now()
}

pub(crate) fn validate_range(range: &DateRange) -> Result<(), EngineError> {
    if range.days() > MAX_BOOKING_SPAN_DAYS {
        return Err(EngineError::LimitExceeded("booking span too wide"));
    }
    Ok(())
}

/// Reject `range` if it shares a day with any calendar entry other than
/// `exclude`'s. When `exclude` is set, its start day is checked first with the
/// single-day test.
pub(crate) fn check_no_conflict(
    venue: &Venue,
    range: &DateRange,
    exclude: Option<ulid::Ulid>,
) -> Result<(), EngineError> {
    if exclude.is_some() && is_date_booked(&venue.bookings, range.start_date, exclude) {
        return Err(EngineError::rejected(NOT_AVAILABLE_REASON));
    }
    let others = venue
        .bookings
        .iter()
        .filter(|e| Some(e.booking_id) != exclude);
    if has_overlap(others, range) {
        return Err(EngineError::rejected(NOT_AVAILABLE_REASON));
    }
    Ok(())
}

/// The venue calendar must hold exactly one entry for a confirmed booking,
/// with the same dates. Anything else means the two copies drifted.
pub(crate) fn ensure_mirrored(venue: &Venue, booking: &Booking) -> Result<(), EngineError> {
    let detail = match venue.calendar_entry(&booking.id) {
        Some(entry) if entry.range() == booking.range() => return Ok(()),
        Some(entry) => format!(
            "booking {} spans {}..{} but calendar has {}..{}",
            booking.id, booking.start_date, booking.end_date, entry.start_date, entry.end_date
        ),
        None => format!("booking {} has no calendar entry", booking.id),
    };
    Err(fault(venue.id, detail))
}

/// Overlap verdicts from the calendar and from the booking store must agree.
pub(crate) fn cross_check_overlap(
    venue: &Venue,
    confirmed: &[Booking],
    range: &DateRange,
) -> Result<bool, EngineError> {
    let by_calendar = conflicting(&venue.bookings, range);
    let by_bookings = conflicting(confirmed, range);
    if by_calendar.is_empty() != by_bookings.is_empty() {
        return Err(fault(
            venue.id,
            format!(
                "overlap for {}..{}: calendar holds [{}], bookings hold [{}]",
                range.start_date,
                range.end_date,
                id_list(&by_calendar),
                id_list(&by_bookings)
            ),
        ));
    }
    Ok(!by_calendar.is_empty())
}

/// Every disagreement between a venue's calendar and its bookings.
pub(crate) fn integrity_faults(venue: &Venue, bookings: &[Booking]) -> Vec<EngineError> {
    let mut faults = Vec::new();
    for b in bookings.iter().filter(|b| b.is_confirmed()) {
        if let Err(e) = ensure_mirrored(venue, b) {
            faults.push(e);
        }
    }
    for entry in &venue.bookings {
        let owner = bookings.iter().find(|b| b.id == entry.booking_id);
        if !owner.is_some_and(|b| b.is_confirmed()) {
            faults.push(fault(
                venue.id,
                format!(
                    "calendar entry {} has no confirmed booking",
                    entry.booking_id
                ),
            ));
        }
    }
    faults
}

fn id_list(ids: &[ulid::Ulid]) -> String {
    ids.iter().map(ToString::to_string).collect::<Vec<_>>().join(", ")
}

fn fault(venue_id: ulid::Ulid, detail: String) -> EngineError {
    error!(%venue_id, "integrity fault: {detail}");
    metrics::counter!(crate::observability::CONSISTENCY_FAULTS_TOTAL).increment(1);
    EngineError::ConsistencyFault { venue_id, detail }
}
