use dashmap::DashMap;
use ulid::Ulid;

use crate::model::*;

use super::SharedVenue;

/// In-memory state: venues (each behind its own lock), the booking store,
/// and amenities. Venue calendars and bookings are only ever changed
/// together, through [`InMemoryStore::apply_to_venue`].
pub struct InMemoryStore {
    venues: DashMap<Ulid, SharedVenue>,
    bookings: DashMap<Ulid, Booking>,
    /// Venue → booking ids index, so a venue's bookings are found without a full scan.
    venue_bookings: DashMap<Ulid, Vec<Ulid>>,
    amenities: DashMap<Ulid, Amenity>,
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            venues: DashMap::new(),
            bookings: DashMap::new(),
            venue_bookings: DashMap::new(),
            amenities: DashMap::new(),
        }
    }

    // ── Venues ───────────────────────────────────────────────

    pub fn venue_count(&self) -> usize {
        self.venues.len()
    }

    pub fn get_venue(&self, id: &Ulid) -> Option<SharedVenue> {
        self.venues.get(id).map(|e| e.value().clone())
    }

    pub fn insert_venue(&self, id: Ulid, venue: SharedVenue) {
        self.venues.insert(id, venue);
    }

    /// All venue handles, ordered by id (creation order for ULIDs).
    pub fn venue_handles(&self) -> Vec<SharedVenue> {
        let mut handles: Vec<(Ulid, SharedVenue)> = self
            .venues
            .iter()
            .map(|e| (*e.key(), e.value().clone()))
            .collect();
        handles.sort_by_key(|(id, _)| *id);
        handles.into_iter().map(|(_, v)| v).collect()
    }

    // ── Bookings ─────────────────────────────────────────────

    pub fn booking(&self, id: &Ulid) -> Option<Booking> {
        self.bookings.get(id).map(|e| e.value().clone())
    }

    pub fn booking_count(&self) -> usize {
        self.bookings.len()
    }

    /// Every booking recorded against `venue_id`, any status.
    pub fn bookings_for_venue(&self, venue_id: &Ulid) -> Vec<Booking> {
        let ids = self
            .venue_bookings
            .get(venue_id)
            .map(|e| e.value().clone())
            .unwrap_or_default();
        ids.iter().filter_map(|id| self.booking(id)).collect()
    }

    pub fn bookings_for_user(&self, user_id: &str) -> Vec<Booking> {
        self.bookings
            .iter()
            .filter(|e| e.value().user_id == user_id)
            .map(|e| e.value().clone())
            .collect()
    }

    // ── Amenities ────────────────────────────────────────────

    pub fn amenity(&self, id: &Ulid) -> Option<Amenity> {
        self.amenities.get(id).map(|e| e.value().clone())
    }

    pub fn amenity_count(&self) -> usize {
        self.amenities.len()
    }

    pub fn amenities(&self) -> Vec<Amenity> {
        self.amenities.iter().map(|e| e.value().clone()).collect()
    }

    pub fn amenity_name_taken(&self, name: &str) -> bool {
        self.amenities.iter().any(|e| e.value().name == name)
    }

    pub fn insert_amenity(&self, amenity: Amenity) {
        self.amenities.insert(amenity.id, amenity);
    }

    // ── Event application ────────────────────────────────────

    /// Apply a booking event to both copies (no locking; the caller holds the
    /// venue's write lock). Venue and amenity creation are handled at the
    /// map level, not here.
    pub fn apply_to_venue(&self, venue: &mut Venue, event: &Event) {
        match event {
            Event::BookingCreated { booking } => {
                if booking.is_confirmed() {
                    venue
                        .bookings
                        .push(CalendarEntry::new(booking.id, booking.range()));
                }
                self.venue_bookings
                    .entry(booking.venue_id)
                    .or_default()
                    .push(booking.id);
                self.bookings.insert(booking.id, booking.clone());
            }
            Event::BookingCancelled { id, at, .. } => {
                if let Some(mut b) = self.bookings.get_mut(id) {
                    b.status = BookingStatus::Cancelled;
                    b.updated_at = *at;
                }
                venue.remove_calendar_entry(id);
                venue.updated_at = *at;
            }
            Event::BookingRescheduled { id, range, at, .. } => {
                if let Some(mut b) = self.bookings.get_mut(id) {
                    b.start_date = range.start_date;
                    b.end_date = range.end_date;
                    b.updated_at = *at;
                }
                if let Some(entry) = venue.bookings.iter_mut().find(|e| e.booking_id == *id) {
                    *entry = CalendarEntry::new(*id, *range);
                }
                venue.updated_at = *at;
            }
            Event::VenueCreated { .. } | Event::AmenityAdded { .. } => {}
        }
    }
}
