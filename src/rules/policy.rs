use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::dates::{format_long, is_monday};

pub const MONDAY_REASON: &str = "Venue is closed on Mondays";

/// Uniform outcome of every policy check. `reason` is set only when invalid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingValidationResult {
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl BookingValidationResult {
    pub fn ok() -> Self {
        Self {
            valid: true,
            reason: None,
        }
    }

    pub fn reject(reason: impl Into<String>) -> Self {
        Self {
            valid: false,
            reason: Some(reason.into()),
        }
    }

    pub fn is_valid(&self) -> bool {
        self.valid
    }

    /// `Err(reason)` when invalid, for `?`-style chaining.
    pub fn into_result(self) -> Result<(), String> {
        match self.reason {
            Some(reason) if !self.valid => Err(reason),
            _ => Ok(()),
        }
    }
}

/// Floor + Monday blackout, applied to a booking's start day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookingPolicy {
    min_bookable: NaiveDate,
    floor_reason: String,
}

impl BookingPolicy {
    pub fn new(min_bookable: NaiveDate) -> Self {
        Self {
            min_bookable,
            floor_reason: format!(
                "Bookings are only available from {} onwards",
                format_long(min_bookable)
            ),
        }
    }

    pub fn min_bookable(&self) -> NaiveDate {
        self.min_bookable
    }

    pub fn floor_reason(&self) -> &str {
        &self.floor_reason
    }

    /// Rules in fixed order, first failure wins: floor, then Monday.
    pub fn check(&self, day: NaiveDate) -> BookingValidationResult {
        if day < self.min_bookable {
            return BookingValidationResult::reject(self.floor_reason.clone());
        }
        if is_monday(day) {
            return BookingValidationResult::reject(MONDAY_REASON);
        }
        BookingValidationResult::ok()
    }

    pub fn is_bookable(&self, day: NaiveDate) -> bool {
        day >= self.min_bookable && !is_monday(day)
    }
}

impl Default for BookingPolicy {
    fn default() -> Self {
        Self::new(crate::config::DEFAULT_MIN_BOOKABLE_DATE)
    }
}
