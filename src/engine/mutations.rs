use std::sync::Arc;

use serde::Deserialize;
use tokio::sync::{RwLock, oneshot};
use tracing::{debug, info};
use ulid::Ulid;

use crate::limits::*;
use crate::model::*;
use crate::observability::*;
use crate::rules::validate_reschedule;

use super::conflict::{
    NOT_AVAILABLE_REASON, check_no_conflict, cross_check_overlap, ensure_mirrored, now,
    validate_range,
};
use super::{Engine, EngineError, WalCommand};

pub const DEFAULT_USER_ID: &str = "guest-user";

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewVenue {
    pub name: String,
    pub description: String,
    pub location: Location,
    pub image_url: String,
    pub daily_rate: f64,
    pub capacity: u32,
    #[serde(default)]
    pub amenities: Vec<Ulid>,
    #[serde(default)]
    pub rating: f64,
    #[serde(default)]
    pub review_count: u32,
    #[serde(default)]
    pub is_popular: bool,
    #[serde(default = "default_true")]
    pub availability: bool,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAmenity {
    pub name: String,
    pub icon: Option<String>,
    #[serde(default)]
    pub category: AmenityCategory,
    pub description: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewBooking {
    pub venue_id: Ulid,
    pub user_id: Option<String>,
    pub range: DateRange,
    pub guest_count: Option<u32>,
}

/// Count and log a rule refusal, then hand it back as an error.
fn refuse(op: &'static str, reason: impl Into<String>) -> EngineError {
    let reason = reason.into();
    debug!(op, %reason, "booking request refused");
    metrics::counter!(BOOKING_REJECTIONS_TOTAL, "op" => op).increment(1);
    EngineError::Rejected(reason)
}

fn validate_new_venue(v: &NewVenue) -> Result<(), EngineError> {
    if v.name.trim().is_empty() {
        return Err(EngineError::validation("name is required"));
    }
    if v.name.len() > MAX_NAME_LEN {
        return Err(EngineError::LimitExceeded("venue name too long"));
    }
    if v.description.trim().is_empty() {
        return Err(EngineError::validation("description is required"));
    }
    if v.description.len() > MAX_DESCRIPTION_LEN {
        return Err(EngineError::LimitExceeded("venue description too long"));
    }
    if v.image_url.trim().is_empty() {
        return Err(EngineError::validation("imageUrl is required"));
    }
    if !v.daily_rate.is_finite() || v.daily_rate < 0.0 {
        return Err(EngineError::validation("dailyRate must be a non-negative number"));
    }
    if v.capacity == 0 {
        return Err(EngineError::validation("capacity must be at least 1"));
    }
    if !(0.0..=5.0).contains(&v.rating) {
        return Err(EngineError::validation("rating must be between 0 and 5"));
    }
    let [lng, lat] = v.location.coordinates;
    if !(-180.0..=180.0).contains(&lng) || !(-90.0..=90.0).contains(&lat) {
        return Err(EngineError::validation("coordinates must be [longitude, latitude]"));
    }
    Ok(())
}

impl Engine {
    // ── Catalog ──────────────────────────────────────────────

    pub async fn create_venue(&self, new: NewVenue) -> Result<Venue, EngineError> {
        validate_new_venue(&new)?;
        if self.store.venue_count() >= MAX_VENUES {
            return Err(EngineError::LimitExceeded("too many venues"));
        }
        if let Some(missing) = new.amenities.iter().find(|a| self.store.amenity(a).is_none()) {
            return Err(EngineError::validation(format!("Unknown amenity {missing}")));
        }

        let _gate = self.commit_gate.read().await;
        let at = now();
        let venue = Venue {
            id: Ulid::new(),
            name: new.name,
            description: new.description,
            location: new.location,
            image_url: new.image_url,
            daily_rate: new.daily_rate,
            capacity: new.capacity,
            amenities: new.amenities,
            rating: new.rating,
            review_count: new.review_count,
            is_popular: new.is_popular,
            availability: new.availability,
            bookings: Vec::new(),
            created_at: at,
            updated_at: at,
        };
        let event = Event::VenueCreated {
            venue: venue.clone(),
        };
        self.wal_append(&event).await?;
        self.store
            .insert_venue(venue.id, Arc::new(RwLock::new(venue.clone())));
        metrics::gauge!(VENUES_ACTIVE).set(self.store.venue_count() as f64);
        info!(venue_id = %venue.id, name = %venue.name, "venue created");
        Ok(venue)
    }

    pub async fn add_amenity(&self, new: NewAmenity) -> Result<Amenity, EngineError> {
        let name = new.name.trim();
        if name.is_empty() {
            return Err(EngineError::validation("name is required"));
        }
        if name.len() > MAX_NAME_LEN {
            return Err(EngineError::LimitExceeded("amenity name too long"));
        }

        let _names = self.amenity_lock.lock().await;
        if self.store.amenity_count() >= MAX_AMENITIES {
            return Err(EngineError::LimitExceeded("too many amenities"));
        }
        if self.store.amenity_name_taken(name) {
            return Err(EngineError::validation(format!(
                "Amenity '{name}' already exists"
            )));
        }

        let _gate = self.commit_gate.read().await;
        let at = now();
        let amenity = Amenity {
            id: Ulid::new(),
            name: name.to_string(),
            icon: new.icon,
            category: new.category,
            description: new.description,
            created_at: at,
            updated_at: at,
        };
        let event = Event::AmenityAdded {
            amenity: amenity.clone(),
        };
        self.wal_append(&event).await?;
        self.store.insert_amenity(amenity.clone());
        Ok(amenity)
    }

    // ── Bookings ─────────────────────────────────────────────

    pub async fn create_booking(&self, new: NewBooking) -> Result<Booking, EngineError> {
        validate_range(&new.range)?;
        let user_id = new
            .user_id
            .filter(|u| !u.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_USER_ID.to_string());
        if user_id.len() > MAX_USER_ID_LEN {
            return Err(EngineError::LimitExceeded("user id too long"));
        }
        let guest_count = new.guest_count.unwrap_or(1);
        if guest_count == 0 {
            return Err(EngineError::validation("guestCount must be at least 1"));
        }

        let _gate = self.commit_gate.read().await;
        let venue = self
            .store
            .get_venue(&new.venue_id)
            .ok_or(EngineError::NotFound("Venue"))?;
        let mut guard = venue.write().await;

        if let Err(reason) = self.rules.policy.check(new.range.start_date).into_result() {
            return Err(refuse("create", reason));
        }
        if guest_count > guard.capacity {
            return Err(EngineError::validation(format!(
                "guestCount exceeds venue capacity of {}",
                guard.capacity
            )));
        }
        if guard.bookings.len() >= MAX_BOOKINGS_PER_VENUE {
            return Err(EngineError::LimitExceeded("too many bookings on venue"));
        }

        let confirmed: Vec<Booking> = self
            .store
            .bookings_for_venue(&guard.id)
            .into_iter()
            .filter(Booking::is_confirmed)
            .collect();
        if cross_check_overlap(&guard, &confirmed, &new.range)? {
            return Err(refuse("create", NOT_AVAILABLE_REASON));
        }

        let at = now();
        let booking = Booking {
            id: Ulid::new(),
            venue_id: guard.id,
            user_id,
            start_date: new.range.start_date,
            end_date: new.range.end_date,
            guest_count,
            status: BookingStatus::Confirmed,
            created_at: at,
            updated_at: at,
        };
        let event = Event::BookingCreated {
            booking: booking.clone(),
        };
        self.persist_and_apply(&mut guard, &event).await?;
        metrics::counter!(BOOKINGS_CREATED_TOTAL).increment(1);
        info!(booking_id = %booking.id, venue_id = %booking.venue_id, "booking created");
        Ok(booking)
    }

    pub async fn cancel_booking(&self, id: Ulid) -> Result<Booking, EngineError> {
        let _gate = self.commit_gate.read().await;
        let (booking, mut guard) = self.resolve_booking_write(&id).await?;
        if !booking.is_confirmed() {
            return Err(refuse("cancel", "Booking is already cancelled"));
        }
        ensure_mirrored(&guard, &booking)?;

        let event = Event::BookingCancelled {
            id,
            venue_id: booking.venue_id,
            at: now(),
        };
        self.persist_and_apply(&mut guard, &event).await?;
        metrics::counter!(BOOKINGS_CANCELLED_TOTAL).increment(1);
        info!(booking_id = %id, venue_id = %booking.venue_id, "booking cancelled");
        self.store.booking(&id).ok_or(EngineError::NotFound("Booking"))
    }

    pub async fn reschedule_booking(
        &self,
        id: Ulid,
        range: DateRange,
    ) -> Result<Booking, EngineError> {
        validate_range(&range)?;
        let _gate = self.commit_gate.read().await;
        let (booking, mut guard) = self.resolve_booking_write(&id).await?;
        if !booking.is_confirmed() {
            return Err(refuse("reschedule", "Cannot reschedule a cancelled booking"));
        }

        let verdict = validate_reschedule(
            &self.rules.policy,
            booking.start_date,
            range.start_date,
            self.today(),
        );
        if let Err(reason) = verdict.into_result() {
            return Err(refuse("reschedule", reason));
        }

        ensure_mirrored(&guard, &booking)?;
        if let Err(e) = check_no_conflict(&guard, &range, Some(id)) {
            return Err(refuse("reschedule", e.to_string()));
        }

        let event = Event::BookingRescheduled {
            id,
            venue_id: booking.venue_id,
            range,
            at: now(),
        };
        self.persist_and_apply(&mut guard, &event).await?;
        metrics::counter!(BOOKINGS_RESCHEDULED_TOTAL).increment(1);
        info!(
            booking_id = %id,
            from = %booking.start_date,
            to = %range.start_date,
            "booking rescheduled"
        );
        self.store.booking(&id).ok_or(EngineError::NotFound("Booking"))
    }

    // ── WAL maintenance ──────────────────────────────────────

    /// Rewrite the WAL as the minimal event set that rebuilds current state:
    /// amenities, then each venue (empty calendar) followed by its bookings.
    pub async fn compact_wal(&self) -> Result<(), EngineError> {
        let _gate = self.commit_gate.write().await;

        let mut amenities = self.store.amenities();
        amenities.sort_by_key(|a| a.id);
        let mut events: Vec<Event> = amenities
            .into_iter()
            .map(|amenity| Event::AmenityAdded { amenity })
            .collect();

        for handle in self.store.venue_handles() {
            let mut venue = handle.read().await.clone();
            let mut bookings = self.store.bookings_for_venue(&venue.id);
            bookings.sort_by_key(|b| b.id);
            venue.bookings.clear();
            events.push(Event::VenueCreated { venue });
            events.extend(bookings.into_iter().map(|booking| Event::BookingCreated { booking }));
        }

        let count = events.len();
        let (tx, rx) = oneshot::channel();
        self.wal_tx
            .send(WalCommand::Compact {
                events,
                response: tx,
            })
            .await
            .map_err(|_| EngineError::WalError("WAL writer shut down".into()))?;
        rx.await
            .map_err(|_| EngineError::WalError("WAL writer dropped response".into()))?
            .map_err(|e| EngineError::WalError(e.to_string()))?;
        info!(events = count, "WAL compacted");
        Ok(())
    }

    pub async fn wal_appends_since_compact(&self) -> u64 {
        let (tx, rx) = oneshot::channel();
        if self
            .wal_tx
            .send(WalCommand::AppendsSinceCompact { response: tx })
            .await
            .is_err()
        {
            return 0;
        }
        rx.await.unwrap_or(0)
    }
}
