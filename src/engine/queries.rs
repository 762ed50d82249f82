use std::cmp::Ordering;

use ulid::Ulid;

use crate::limits::*;
use crate::model::*;
use crate::rules::{AvailableDate, available_dates};

use super::conflict::{ALREADY_BOOKED_REASON, cross_check_overlap, integrity_faults, validate_range};
use super::{Engine, EngineError};

const EARTH_RADIUS_M: f64 = 6_371_008.8;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PopularSort {
    #[default]
    Rating,
    Price,
    Capacity,
    Newest,
}

impl PopularSort {
    /// Unknown keys fall back to rating order.
    pub fn parse(s: &str) -> Self {
        match s {
            "price" => Self::Price,
            "capacity" => Self::Capacity,
            "newest" => Self::Newest,
            _ => Self::Rating,
        }
    }

    fn compare(self, a: &Venue, b: &Venue) -> Ordering {
        match self {
            Self::Rating => b.rating.total_cmp(&a.rating),
            Self::Price => a.daily_rate.total_cmp(&b.daily_rate),
            Self::Capacity => b.capacity.cmp(&a.capacity),
            Self::Newest => b.created_at.cmp(&a.created_at),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct PopularFilter {
    pub sort: PopularSort,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub min_capacity: Option<u32>,
    pub max_capacity: Option<u32>,
    pub limit: Option<usize>,
}

impl PopularFilter {
    fn admits(&self, v: &Venue) -> bool {
        v.availability
            && self.min_price.is_none_or(|p| v.daily_rate >= p)
            && self.max_price.is_none_or(|p| v.daily_rate <= p)
            && self.min_capacity.is_none_or(|c| v.capacity >= c)
            && self.max_capacity.is_none_or(|c| v.capacity <= c)
    }
}

/// Great-circle distance in metres between two `(lat, lng)` points.
fn haversine_m(lat1: f64, lng1: f64, lat2: f64, lng2: f64) -> f64 {
    let (p1, p2) = (lat1.to_radians(), lat2.to_radians());
    let dp = (lat2 - lat1).to_radians();
    let dl = (lng2 - lng1).to_radians();
    let a = (dp / 2.0).sin().powi(2) + p1.cos() * p2.cos() * (dl / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_M * a.sqrt().asin()
}

impl Engine {
    async fn snapshot_venues(&self) -> Vec<Venue> {
        let mut out = Vec::with_capacity(self.store.venue_count());
        for handle in self.store.venue_handles() {
            out.push(handle.read().await.clone());
        }
        out
    }

    fn with_amenities(&self, venue: Venue) -> VenueDetails {
        let amenity_details = venue
            .amenities
            .iter()
            .filter_map(|id| self.store.amenity(id))
            .collect();
        VenueDetails {
            venue,
            amenity_details,
        }
    }

    // ── Venues ───────────────────────────────────────────────

    pub async fn get_venue(&self, id: &Ulid) -> Result<VenueDetails, EngineError> {
        let handle = self
            .store
            .get_venue(id)
            .ok_or(EngineError::NotFound("Venue"))?;
        let venue = handle.read().await.clone();
        Ok(self.with_amenities(venue))
    }

    pub async fn list_venues(&self) -> Vec<Venue> {
        self.snapshot_venues().await
    }

    pub async fn search_venues(&self, term: &str) -> Result<Vec<Venue>, EngineError> {
        let term = term.trim();
        if term.chars().count() < MIN_SEARCH_LEN {
            return Err(EngineError::validation(
                "Search term must be at least 3 letters",
            ));
        }
        let needle = term.to_lowercase();
        Ok(self
            .snapshot_venues()
            .await
            .into_iter()
            .filter(|v| {
                v.name.to_lowercase().contains(&needle)
                    || v.description.to_lowercase().contains(&needle)
            })
            .take(SEARCH_RESULT_LIMIT)
            .collect())
    }

    pub async fn popular_venues(&self, filter: &PopularFilter) -> Vec<VenueDetails> {
        let limit = filter
            .limit
            .unwrap_or(DEFAULT_POPULAR_LIMIT)
            .min(MAX_POPULAR_LIMIT);
        let mut venues: Vec<Venue> = self
            .snapshot_venues()
            .await
            .into_iter()
            .filter(|v| filter.admits(v))
            .collect();
        venues.sort_by(|a, b| filter.sort.compare(a, b));
        venues
            .into_iter()
            .take(limit)
            .map(|v| self.with_amenities(v))
            .collect()
    }

    /// Venues within `radius_m` of `(lat, lng)`, nearest first.
    pub async fn venues_near(
        &self,
        lat: f64,
        lng: f64,
        radius_m: Option<f64>,
    ) -> Result<Vec<VenueDetails>, EngineError> {
        if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lng) {
            return Err(EngineError::validation("lat/lng out of range"));
        }
        let radius = radius_m.unwrap_or(DEFAULT_NEARBY_RADIUS_M);
        if !radius.is_finite() || radius < 0.0 {
            return Err(EngineError::validation("radius must be a non-negative number"));
        }
        let mut hits: Vec<(f64, Venue)> = self
            .snapshot_venues()
            .await
            .into_iter()
            .map(|v| {
                let d = haversine_m(lat, lng, v.location.latitude(), v.location.longitude());
                (d, v)
            })
            .filter(|(d, _)| *d <= radius)
            .collect();
        hits.sort_by(|a, b| a.0.total_cmp(&b.0));
        Ok(hits.into_iter().map(|(_, v)| self.with_amenities(v)).collect())
    }

    // ── Availability ─────────────────────────────────────────

    /// Policy on the start day, then overlap against the calendar, confirmed
    /// against the booking store.
    pub async fn check_availability(
        &self,
        venue_id: &Ulid,
        range: &DateRange,
    ) -> Result<Availability, EngineError> {
        validate_range(range)?;
        let handle = self
            .store
            .get_venue(venue_id)
            .ok_or(EngineError::NotFound("Venue"))?;
        let guard = handle.read().await;

        if let Err(reason) = self.rules.policy.check(range.start_date).into_result() {
            return Ok(Availability {
                available: false,
                reason: Some(reason),
            });
        }

        let confirmed: Vec<Booking> = self
            .store
            .bookings_for_venue(venue_id)
            .into_iter()
            .filter(Booking::is_confirmed)
            .collect();
        if cross_check_overlap(&guard, &confirmed, range)? {
            return Ok(Availability {
                available: false,
                reason: Some(ALREADY_BOOKED_REASON.to_string()),
            });
        }
        Ok(Availability {
            available: true,
            reason: None,
        })
    }

    pub async fn available_dates(
        &self,
        venue_id: &Ulid,
        window: &DateRange,
    ) -> Result<Vec<AvailableDate>, EngineError> {
        if window.days() > MAX_QUERY_WINDOW_DAYS {
            return Err(EngineError::LimitExceeded("query window too wide"));
        }
        let handle = self
            .store
            .get_venue(venue_id)
            .ok_or(EngineError::NotFound("Venue"))?;
        let guard = handle.read().await;
        Ok(available_dates(
            &self.rules.policy,
            &guard.bookings,
            window.start_date,
            window.end_date,
        )
        .collect())
    }

    // ── Bookings ─────────────────────────────────────────────

    pub fn get_booking(&self, id: &Ulid) -> Result<Booking, EngineError> {
        self.store.booking(id).ok_or(EngineError::NotFound("Booking"))
    }

    /// The caller's bookings, newest first, joined with venue name and price.
    pub async fn user_bookings(&self, user_id: &str) -> Vec<UserBooking> {
        let mut bookings = self.store.bookings_for_user(user_id);
        bookings.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));

        let mut out = Vec::with_capacity(bookings.len());
        for b in bookings {
            let (venue_name, venue_image, daily_rate) = match self.store.get_venue(&b.venue_id) {
                Some(handle) => {
                    let v = handle.read().await;
                    (v.name.clone(), v.image_url.clone(), v.daily_rate)
                }
                None => (String::new(), String::new(), 0.0),
            };
            out.push(UserBooking {
                id: b.id,
                venue_id: b.venue_id,
                venue_name,
                venue_image,
                start_date: b.start_date,
                end_date: b.end_date,
                guest_count: b.guest_count,
                total_price: daily_rate * b.range().days() as f64,
                status: b.status,
                created_at: b.created_at,
            });
        }
        out
    }

    // ── Amenities ────────────────────────────────────────────

    pub fn list_amenities(&self) -> Vec<Amenity> {
        let mut all = self.store.amenities();
        all.sort_by(|a, b| a.category.cmp(&b.category).then_with(|| a.name.cmp(&b.name)));
        all
    }

    pub fn amenities_by_category(&self, category: AmenityCategory) -> Vec<Amenity> {
        let mut hits: Vec<Amenity> = self
            .store
            .amenities()
            .into_iter()
            .filter(|a| a.category == category)
            .collect();
        hits.sort_by(|a, b| a.name.cmp(&b.name));
        hits
    }

    // ── Integrity ────────────────────────────────────────────

    /// Compare every venue calendar with its confirmed bookings. Each
    /// disagreement is logged and returned.
    pub async fn verify_integrity(&self) -> Vec<EngineError> {
        let mut faults = Vec::new();
        for handle in self.store.venue_handles() {
            let guard = handle.read().await;
            let bookings = self.store.bookings_for_venue(&guard.id);
            faults.extend(integrity_faults(&guard, &bookings));
        }
        faults
    }
}
