use axum::Json;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use ulid::Ulid;

use super::auth::Caller;
use super::dto::*;
use super::error::*;
use super::state::AppState;
use crate::engine::{NewAmenity, NewBooking, NewVenue};
use crate::model::*;
use crate::rules::AvailableDate;

/// Result type for handlers.
pub type HandlerResult<T> = Result<Json<T>, AppError>;

type Created<T> = Result<(StatusCode, Json<T>), AppError>;

fn parse_id(raw: &str, msg: &str) -> Result<Ulid, AppError> {
    Ulid::from_string(raw.trim()).map_err(|_| AppError::bad_request(msg))
}

/// Parse both ends through the engine's time reference into a day range.
fn parse_range(state: &AppState, start: &str, end: &str) -> Result<DateRange, AppError> {
    let time = &state.engine.rules.time;
    let start = time.parse_day(start)?;
    let end = time.parse_day(end)?;
    Ok(DateRange::new(start, end)?)
}

// ── Health ───────────────────────────────────────────────

/// GET /api/test
pub async fn health_check() -> Json<MessageResponse> {
    Json(MessageResponse {
        message: "Backend is working!".into(),
    })
}

// ── Venues ───────────────────────────────────────────────

/// GET /api/venues
pub async fn list_venues(State(state): State<AppState>) -> HandlerResult<Vec<Venue>> {
    Ok(Json(state.engine.list_venues().await))
}

/// POST /api/venues
pub async fn create_venue(
    State(state): State<AppState>,
    body: Result<Json<NewVenue>, JsonRejection>,
) -> Created<Venue> {
    let Json(new) = body?;
    let venue = state.engine.create_venue(new).await?;
    Ok((StatusCode::CREATED, Json(venue)))
}

/// GET /api/venues/popular
pub async fn popular_venues(
    State(state): State<AppState>,
    query: Result<Query<PopularQuery>, QueryRejection>,
) -> HandlerResult<Vec<VenueDetails>> {
    let Query(q) = query?;
    Ok(Json(state.engine.popular_venues(&q.into()).await))
}

/// GET /api/venues/search?search=
pub async fn search_venues(
    State(state): State<AppState>,
    query: Result<Query<SearchQuery>, QueryRejection>,
) -> HandlerResult<Vec<Venue>> {
    let Query(q) = query?;
    let term = q.search.unwrap_or_default();
    Ok(Json(state.engine.search_venues(&term).await?))
}

/// GET /api/venues/nearby?lat&lng&radius
pub async fn venues_nearby(
    State(state): State<AppState>,
    query: Result<Query<NearbyQuery>, QueryRejection>,
) -> HandlerResult<Vec<VenueDetails>> {
    let Query(q) = query?;
    let (Some(lat), Some(lng)) = (q.lat, q.lng) else {
        return Err(AppError::bad_request(
            "Missing required parameters: lat and lng are required",
        ));
    };
    Ok(Json(state.engine.venues_near(lat, lng, q.radius).await?))
}

/// GET /api/venues/{id}
pub async fn get_venue(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> HandlerResult<VenueDetails> {
    let id = parse_id(&id, INVALID_VENUE_ID)?;
    Ok(Json(state.engine.get_venue(&id).await?))
}

/// GET /api/venues/{id}/available-dates?startDate&endDate
pub async fn available_dates(
    State(state): State<AppState>,
    Path(id): Path<String>,
    query: Result<Query<DateWindowQuery>, QueryRejection>,
) -> HandlerResult<Vec<AvailableDate>> {
    let id = parse_id(&id, INVALID_VENUE_ID)?;
    let Query(q) = query?;
    let (Some(start), Some(end)) = (q.start_date, q.end_date) else {
        return Err(AppError::bad_request(MISSING_DATE_PARAMS));
    };
    let window = parse_range(&state, &start, &end)?;
    Ok(Json(state.engine.available_dates(&id, &window).await?))
}

// ── Bookings ─────────────────────────────────────────────

/// GET /api/bookings/check-availability?venueId&startDate&endDate
pub async fn check_availability(
    State(state): State<AppState>,
    query: Result<Query<AvailabilityQuery>, QueryRejection>,
) -> HandlerResult<Availability> {
    let Query(q) = query?;
    let (Some(venue_id), Some(start), Some(end)) = (q.venue_id, q.start_date, q.end_date) else {
        return Err(AppError::bad_request(MISSING_BOOKING_PARAMS));
    };
    let venue_id = parse_id(&venue_id, INVALID_VENUE_ID)?;
    let range = parse_range(&state, &start, &end)?;
    Ok(Json(state.engine.check_availability(&venue_id, &range).await?))
}

/// POST /api/bookings
pub async fn create_booking(
    State(state): State<AppState>,
    caller: Caller,
    body: Result<Json<CreateBookingRequest>, JsonRejection>,
) -> Created<Booking> {
    let Json(req) = body?;
    let (Some(venue_id), Some(start), Some(end)) = (req.venue_id, req.start_date, req.end_date)
    else {
        return Err(AppError::bad_request(MISSING_BOOKING_PARAMS));
    };
    let venue_id = parse_id(&venue_id, INVALID_VENUE_ID)?;
    let range = parse_range(&state, &start, &end)?;
    // An explicit userId in the body wins over the header.
    let user_id = req.user_id.or(Some(caller.0));
    let booking = state
        .engine
        .create_booking(NewBooking {
            venue_id,
            user_id,
            range,
            guest_count: req.guest_count,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(booking)))
}

/// PUT /api/bookings/{id}/cancel
pub async fn cancel_booking(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> HandlerResult<BookingUpdateResponse> {
    let id = parse_id(&id, INVALID_BOOKING_ID)?;
    let booking = state.engine.cancel_booking(id).await?;
    Ok(Json(BookingUpdateResponse {
        message: "Booking cancelled".into(),
        booking,
    }))
}

/// PUT /api/bookings/{id}/reschedule
pub async fn reschedule_booking(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<RescheduleRequest>, JsonRejection>,
) -> HandlerResult<BookingUpdateResponse> {
    let id = parse_id(&id, INVALID_BOOKING_ID)?;
    let Json(req) = body?;
    let (Some(start), Some(end)) = (req.start_date, req.end_date) else {
        return Err(AppError::bad_request(MISSING_DATE_PARAMS));
    };
    let range = parse_range(&state, &start, &end)?;
    let booking = state.engine.reschedule_booking(id, range).await?;
    Ok(Json(BookingUpdateResponse {
        message: "Booking rescheduled successfully".into(),
        booking,
    }))
}

/// GET /api/bookings/user
pub async fn user_bookings(
    State(state): State<AppState>,
    Caller(user_id): Caller,
) -> HandlerResult<Vec<UserBooking>> {
    Ok(Json(state.engine.user_bookings(&user_id).await))
}

// ── Amenities ────────────────────────────────────────────

/// GET /api/amenities
pub async fn list_amenities(State(state): State<AppState>) -> HandlerResult<Vec<Amenity>> {
    Ok(Json(state.engine.list_amenities()))
}

/// GET /api/amenities/category/{category}
///
/// Unknown categories simply have no amenities.
pub async fn amenities_by_category(
    State(state): State<AppState>,
    Path(category): Path<String>,
) -> HandlerResult<Vec<Amenity>> {
    let hits = match AmenityCategory::parse(&category) {
        Some(c) => state.engine.amenities_by_category(c),
        None => Vec::new(),
    };
    Ok(Json(hits))
}

/// POST /api/amenities
pub async fn add_amenity(
    State(state): State<AppState>,
    body: Result<Json<NewAmenity>, JsonRejection>,
) -> Created<Amenity> {
    let Json(new) = body?;
    let amenity = state.engine.add_amenity(new).await?;
    Ok((StatusCode::CREATED, Json(amenity)))
}
