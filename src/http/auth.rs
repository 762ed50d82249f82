use std::convert::Infallible;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::engine::DEFAULT_USER_ID;
use crate::limits::MAX_USER_ID_LEN;

pub const USER_ID_HEADER: &str = "x-user-id";

/// Who is calling. Taken from the `X-User-Id` header; anonymous callers
/// are the shared guest user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller(pub String);

impl Caller {
    pub fn from_parts(parts: &Parts) -> Self {
        let id = parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty() && v.len() <= MAX_USER_ID_LEN)
            .unwrap_or(DEFAULT_USER_ID);
        Caller(id.to_string())
    }
}

impl<S: Send + Sync> FromRequestParts<S> for Caller {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self::from_parts(parts))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    fn caller(header: Option<&str>) -> Caller {
        let mut req = Request::builder().uri("/api/bookings/user");
        if let Some(h) = header {
            req = req.header("X-User-Id", h);
        }
        let (parts, _) = req.body(()).unwrap().into_parts();
        Caller::from_parts(&parts)
    }

    #[test]
    fn header_or_guest() {
        assert_eq!(caller(Some("alice")), Caller("alice".into()));
        assert_eq!(caller(Some("   ")), Caller("guest-user".into()));
        assert_eq!(caller(None), Caller("guest-user".into()));
    }
}
