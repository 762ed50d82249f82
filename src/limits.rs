/// Hard ceilings applied before any state is touched.
pub const MAX_VENUES: usize = 100_000;
pub const MAX_BOOKINGS_PER_VENUE: usize = 10_000;
pub const MAX_AMENITIES: usize = 10_000;

pub const MAX_NAME_LEN: usize = 256;
pub const MAX_DESCRIPTION_LEN: usize = 8_192;
pub const MAX_USER_ID_LEN: usize = 256;

/// Widest window `available_dates` will enumerate, in days.
pub const MAX_QUERY_WINDOW_DAYS: i64 = 366;

/// Longest single booking, in days.
pub const MAX_BOOKING_SPAN_DAYS: i64 = 366;

pub const MIN_SEARCH_LEN: usize = 3;
pub const SEARCH_RESULT_LIMIT: usize = 10;
pub const DEFAULT_POPULAR_LIMIT: usize = 6;
pub const MAX_POPULAR_LIMIT: usize = 100;

/// Default radius for `venues_near`, in meters.
pub const DEFAULT_NEARBY_RADIUS_M: f64 = 10_000.0;
