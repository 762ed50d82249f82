use std::time::Instant;

use axum::Router;
use axum::extract::{MatchedPath, Request};
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::routing::{get, post, put};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::handlers;
use super::state::AppState;
use crate::observability::{HTTP_REQUEST_DURATION_SECONDS, HTTP_REQUESTS_TOTAL, status_label};

/// Create the main application router with all routes and middleware.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let venues = Router::new()
        .route("/", get(handlers::list_venues).post(handlers::create_venue))
        .route("/popular", get(handlers::popular_venues))
        .route("/search", get(handlers::search_venues))
        .route("/nearby", get(handlers::venues_nearby))
        .route("/{id}", get(handlers::get_venue))
        .route("/{id}/available-dates", get(handlers::available_dates));

    let bookings = Router::new()
        .route("/", post(handlers::create_booking))
        .route("/check-availability", get(handlers::check_availability))
        .route("/user", get(handlers::user_bookings))
        .route("/{id}/cancel", put(handlers::cancel_booking))
        .route("/{id}/reschedule", put(handlers::reschedule_booking));

    let amenities = Router::new()
        .route("/", get(handlers::list_amenities).post(handlers::add_amenity))
        .route("/category/{category}", get(handlers::amenities_by_category));

    let api = Router::new()
        .route("/test", get(handlers::health_check))
        .nest("/venues", venues)
        .nest("/bookings", bookings)
        .nest("/amenities", amenities);

    Router::new()
        .nest("/api", api)
        .route_layer(middleware::from_fn(track_metrics))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Count and time every matched request, labelled by route template.
async fn track_metrics(req: Request, next: Next) -> Response {
    let start = Instant::now();
    let route = req
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_owned())
        .unwrap_or_else(|| "unmatched".to_owned());
    let method = req.method().to_string();

    let response = next.run(req).await;

    let status = status_label(response.status().as_u16());
    metrics::counter!(
        HTTP_REQUESTS_TOTAL,
        "method" => method.clone(),
        "route" => route.clone(),
        "status" => status
    )
    .increment(1);
    metrics::histogram!(HTTP_REQUEST_DURATION_SECONDS, "method" => method, "route" => route)
        .record(start.elapsed().as_secs_f64());
    response
}
