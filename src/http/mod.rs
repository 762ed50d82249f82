//! REST surface over the booking engine.
//!
//! ```text
//! axum router  (/api/..., CORS, tracing, request metrics)
//!     │
//! handlers     parse ids and dates, map EngineError to {"error": ...}
//!     │
//! Engine       per-venue locks, rules, WAL
//! ```

pub mod auth;
pub mod dto;
pub mod error;
pub mod handlers;
pub mod router;
pub mod state;

pub use router::create_router;
pub use state::AppState;
