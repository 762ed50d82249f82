//! Venue booking service: a pure date/availability rules module, an engine
//! that keeps bookings and venue calendars in step behind a write-ahead log,
//! and an axum REST surface.

pub mod compactor;
pub mod config;
pub mod engine;
pub mod http;
pub mod limits;
pub mod model;
pub mod observability;
pub mod rules;
pub mod wal;
