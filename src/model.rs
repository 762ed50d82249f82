use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use ulid::Ulid;

/// Inclusive day range `[start_date, end_date]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DateRange {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("startDate must not be after endDate")]
pub struct ReversedRange;

impl DateRange {
    pub fn new(start_date: NaiveDate, end_date: NaiveDate) -> Result<Self, ReversedRange> {
        if start_date > end_date {
            return Err(ReversedRange);
        }
        Ok(Self {
            start_date,
            end_date,
        })
    }

    pub fn single(day: NaiveDate) -> Self {
        Self {
            start_date: day,
            end_date: day,
        }
    }

    /// Number of days covered, counting both ends.
    pub fn days(&self) -> i64 {
        (self.end_date - self.start_date).num_days() + 1
    }

    pub fn contains(&self, day: NaiveDate) -> bool {
        self.start_date <= day && day <= self.end_date
    }

    /// Closed-interval test: a shared boundary day counts as overlap.
    pub fn overlaps(&self, other: &DateRange) -> bool {
        self.start_date <= other.end_date && self.end_date >= other.start_date
    }
}

/// One entry of a venue's embedded calendar, keyed by the booking it mirrors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarEntry {
    pub booking_id: Ulid,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

impl CalendarEntry {
    pub fn new(booking_id: Ulid, range: DateRange) -> Self {
        Self {
            booking_id,
            start_date: range.start_date,
            end_date: range.end_date,
        }
    }

    pub fn range(&self) -> DateRange {
        DateRange {
            start_date: self.start_date,
            end_date: self.end_date,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    Confirmed,
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub id: Ulid,
    pub venue_id: Ulid,
    pub user_id: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub guest_count: u32,
    pub status: BookingStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Booking {
    pub fn range(&self) -> DateRange {
        DateRange {
            start_date: self.start_date,
            end_date: self.end_date,
        }
    }

    pub fn is_confirmed(&self) -> bool {
        self.status == BookingStatus::Confirmed
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    pub street: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
    pub zip_code: Option<String>,
}

/// GeoJSON-style point: `coordinates` is `[longitude, latitude]`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    pub coordinates: [f64; 2],
    #[serde(default)]
    pub address: Address,
    pub formatted_address: Option<String>,
}

impl Location {
    pub fn longitude(&self) -> f64 {
        self.coordinates[0]
    }

    pub fn latitude(&self) -> f64 {
        self.coordinates[1]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Venue {
    pub id: Ulid,
    pub name: String,
    pub description: String,
    pub location: Location,
    pub image_url: String,
    pub daily_rate: f64,
    pub capacity: u32,
    pub amenities: Vec<Ulid>,
    pub rating: f64,
    pub review_count: u32,
    pub is_popular: bool,
    pub availability: bool,
    /// Denormalized calendar, mirrored from the venue's confirmed bookings.
    pub bookings: Vec<CalendarEntry>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Venue {
    pub fn calendar_entry(&self, booking_id: &Ulid) -> Option<&CalendarEntry> {
        self.bookings.iter().find(|e| e.booking_id == *booking_id)
    }

    pub fn remove_calendar_entry(&mut self, booking_id: &Ulid) -> Option<CalendarEntry> {
        let pos = self.bookings.iter().position(|e| e.booking_id == *booking_id)?;
        Some(self.bookings.remove(pos))
    }
}

/// Variants are declared in alphabetical order so `Ord` matches the
/// lowercase names they are stored under.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AmenityCategory {
    #[default]
    Basic,
    Catering,
    Luxury,
    Other,
    Technical,
}

impl AmenityCategory {
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "basic" => Some(Self::Basic),
            "catering" => Some(Self::Catering),
            "luxury" => Some(Self::Luxury),
            "other" => Some(Self::Other),
            "technical" => Some(Self::Technical),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Amenity {
    pub id: Ulid,
    pub name: String,
    pub icon: Option<String>,
    pub category: AmenityCategory,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The event types. Flat, no nesting; this is the WAL record format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Event {
    VenueCreated {
        venue: Venue,
    },
    AmenityAdded {
        amenity: Amenity,
    },
    BookingCreated {
        booking: Booking,
    },
    BookingCancelled {
        id: Ulid,
        venue_id: Ulid,
        at: DateTime<Utc>,
    },
    BookingRescheduled {
        id: Ulid,
        venue_id: Ulid,
        range: DateRange,
        at: DateTime<Utc>,
    },
}

impl Event {
    /// Venue whose lock must be held while this event is applied.
    pub fn venue_id(&self) -> Option<Ulid> {
        match self {
            Event::VenueCreated { venue } => Some(venue.id),
            Event::BookingCreated { booking } => Some(booking.venue_id),
            Event::BookingCancelled { venue_id, .. }
            | Event::BookingRescheduled { venue_id, .. } => Some(*venue_id),
            Event::AmenityAdded { .. } => None,
        }
    }
}

// ── Query result types ───────────────────────────────────────────

/// A booking as listed for its owner, joined with venue details.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserBooking {
    pub id: Ulid,
    pub venue_id: Ulid,
    pub venue_name: String,
    pub venue_image: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub guest_count: u32,
    pub total_price: f64,
    pub status: BookingStatus,
    pub created_at: DateTime<Utc>,
}

/// Venue with its amenity ids resolved.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VenueDetails {
    #[serde(flatten)]
    pub venue: Venue,
    pub amenity_details: Vec<Amenity>,
}

/// Result of an availability check; `reason` is set only when unavailable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Availability {
    pub available: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn venue() -> Venue {
        let now = Utc::now();
        Venue {
            id: Ulid::new(),
            name: "Harbor Hall".into(),
            description: "Waterfront event space".into(),
            location: Location {
                coordinates: [-122.4, 37.8],
                address: Address::default(),
                formatted_address: None,
            },
            image_url: "https://img.example/harbor.jpg".into(),
            daily_rate: 500.0,
            capacity: 120,
            amenities: Vec::new(),
            rating: 4.5,
            review_count: 12,
            is_popular: true,
            availability: true,
            bookings: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn range_rejects_reversed_bounds() {
        assert_eq!(
            DateRange::new(day("2025-06-03"), day("2025-06-01")),
            Err(ReversedRange)
        );
        assert!(DateRange::new(day("2025-06-01"), day("2025-06-01")).is_ok());
    }

    #[test]
    fn range_days_and_contains() {
        let r = DateRange::new(day("2025-06-01"), day("2025-06-03")).unwrap();
        assert_eq!(r.days(), 3);
        assert!(r.contains(day("2025-06-01")));
        assert!(r.contains(day("2025-06-03")));
        assert!(!r.contains(day("2025-06-04")));
        assert_eq!(DateRange::single(day("2025-06-01")).days(), 1);
    }

    #[test]
    fn range_overlap_closed_interval() {
        let a = DateRange::new(day("2025-06-01"), day("2025-06-03")).unwrap();
        let touching = DateRange::new(day("2025-06-03"), day("2025-06-04")).unwrap();
        let adjacent = DateRange::new(day("2025-06-04"), day("2025-06-05")).unwrap();
        assert!(a.overlaps(&touching));
        assert!(!a.overlaps(&adjacent));
    }

    #[test]
    fn calendar_entry_remove_by_booking_id() {
        let mut v = venue();
        let range = DateRange::single(day("2025-06-10"));
        let (a, b) = (Ulid::new(), Ulid::new());
        // Identical dates, distinct bookings: removal must hit only the named one.
        v.bookings.push(CalendarEntry::new(a, range));
        v.bookings.push(CalendarEntry::new(b, range));
        let removed = v.remove_calendar_entry(&b).unwrap();
        assert_eq!(removed.booking_id, b);
        assert_eq!(v.bookings.len(), 1);
        assert_eq!(v.bookings[0].booking_id, a);
        assert!(v.remove_calendar_entry(&b).is_none());
    }

    #[test]
    fn amenity_category_parse() {
        assert_eq!(AmenityCategory::parse("Luxury"), Some(AmenityCategory::Luxury));
        assert_eq!(AmenityCategory::parse("catering"), Some(AmenityCategory::Catering));
        assert_eq!(AmenityCategory::parse("spa"), None);
        assert_eq!(AmenityCategory::default(), AmenityCategory::Basic);
    }

    #[test]
    fn venue_json_is_camel_case() {
        let json = serde_json::to_value(venue()).unwrap();
        assert!(json.get("imageUrl").is_some());
        assert!(json.get("dailyRate").is_some());
        assert!(json.get("isPopular").is_some());
        assert_eq!(json["location"]["coordinates"][1], 37.8);
    }

    #[test]
    fn booking_status_lowercase() {
        assert_eq!(
            serde_json::to_string(&BookingStatus::Cancelled).unwrap(),
            "\"cancelled\""
        );
    }

    #[test]
    fn event_serialization_roundtrip() {
        let event = Event::VenueCreated { venue: venue() };
        let bytes = bincode::serialize(&event).unwrap();
        let decoded: Event = bincode::deserialize(&bytes).unwrap();
        assert_eq!(event, decoded);

        let event = Event::BookingRescheduled {
            id: Ulid::new(),
            venue_id: Ulid::new(),
            range: DateRange::new(day("2025-06-10"), day("2025-06-12")).unwrap(),
            at: Utc::now(),
        };
        let bytes = bincode::serialize(&event).unwrap();
        let decoded: Event = bincode::deserialize(&bytes).unwrap();
        assert_eq!(event, decoded);
    }
}
