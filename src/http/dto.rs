use serde::{Deserialize, Serialize};

use crate::engine::{PopularFilter, PopularSort};
use crate::model::Booking;

// Request fields are optional so missing ones get the API's own message
// instead of a serde rejection.

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityQuery {
    pub venue_id: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBookingRequest {
    pub venue_id: Option<String>,
    pub user_id: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub guest_count: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RescheduleRequest {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DateWindowQuery {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    pub search: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct NearbyQuery {
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub radius: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PopularQuery {
    pub sort_by: Option<String>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub min_capacity: Option<u32>,
    pub max_capacity: Option<u32>,
    pub limit: Option<usize>,
}

impl From<PopularQuery> for PopularFilter {
    fn from(q: PopularQuery) -> Self {
        PopularFilter {
            sort: q.sort_by.as_deref().map(PopularSort::parse).unwrap_or_default(),
            min_price: q.min_price,
            max_price: q.max_price,
            min_capacity: q.min_capacity,
            max_capacity: q.max_capacity,
            limit: q.limit,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Cancel and reschedule reply with a message and the updated booking.
#[derive(Debug, Serialize)]
pub struct BookingUpdateResponse {
    pub message: String,
    pub booking: Booking,
}
