use std::path::PathBuf;

use chrono::NaiveDate;

use crate::engine::BookingRules;
use crate::rules::{BookingPolicy, TimeReference};

/// Earliest bookable day unless `VENUEBOOK_MIN_BOOKABLE_DATE` says otherwise.
pub const DEFAULT_MIN_BOOKABLE_DATE: NaiveDate = match NaiveDate::from_ymd_opt(2025, 5, 8) {
    Some(d) => d,
    None => panic!("invalid default floor date"),
};

const DEFAULT_BIND: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 5000;
const DEFAULT_DATA_DIR: &str = "./data";
const DEFAULT_COMPACT_THRESHOLD: u64 = 1000;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("VENUEBOOK_MIN_BOOKABLE_DATE must be YYYY-MM-DD, got {0:?}")]
    MinBookableDate(String),
    #[error("VENUEBOOK_UTC_OFFSET must look like +HH:MM, got {0:?}")]
    UtcOffset(String),
}

/// Server settings, read from `VENUEBOOK_*` environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    pub bind: String,
    pub port: u16,
    pub data_dir: PathBuf,
    pub metrics_port: Option<u16>,
    /// WAL appends between automatic compactions.
    pub compact_threshold: u64,
    pub min_bookable_date: NaiveDate,
    pub time: TimeReference,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind: DEFAULT_BIND.into(),
            port: DEFAULT_PORT,
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            metrics_port: None,
            compact_threshold: DEFAULT_COMPACT_THRESHOLD,
            min_bookable_date: DEFAULT_MIN_BOOKABLE_DATE,
            time: TimeReference::default(),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup. Empty values count as unset; unparsable
    /// numbers fall back to their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|s| !s.trim().is_empty());
        let defaults = Self::default();

        let min_bookable_date = match get("VENUEBOOK_MIN_BOOKABLE_DATE") {
            Some(raw) => NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
                .map_err(|_| ConfigError::MinBookableDate(raw))?,
            None => defaults.min_bookable_date,
        };
        let time = match get("VENUEBOOK_UTC_OFFSET") {
            Some(raw) => TimeReference::parse_offset(raw.trim()).ok_or(ConfigError::UtcOffset(raw))?,
            None => defaults.time,
        };

        Ok(Self {
            bind: get("VENUEBOOK_BIND").unwrap_or(defaults.bind),
            port: get("VENUEBOOK_PORT")
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.port),
            data_dir: get("VENUEBOOK_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.data_dir),
            metrics_port: get("VENUEBOOK_METRICS_PORT").and_then(|s| s.parse().ok()),
            compact_threshold: get("VENUEBOOK_COMPACT_THRESHOLD")
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.compact_threshold),
            min_bookable_date,
            time,
        })
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.bind, self.port)
    }

    pub fn wal_path(&self) -> PathBuf {
        self.data_dir.join("venuebook.wal")
    }

    pub fn rules(&self) -> BookingRules {
        BookingRules {
            policy: BookingPolicy::new(self.min_bookable_date),
            time: self.time,
        }
    }
}
