//! # Temporal Types: UTC-Only Timestamps
//!
//! Defines `Timestamp`, a UTC timestamp truncated to seconds precision.
//! Ledger entries, task due times and completion times all use it.
//!
//! Core operations never read the wall clock on their own when ordering
//! matters: due-date queries take `now` from the caller, and the ledger
//! offers `append_at` next to `append`.

use chrono::{DateTime, TimeDelta, Timelike, Utc};
use serde::{Deserialize, Serialize};

use crate::error::StoreError;

/// A UTC-only timestamp, truncated to seconds precision.
///
/// # Construction
///
/// - [`Timestamp::now()`]: current UTC time, truncated.
/// - [`Timestamp::from_utc()`]: from a `DateTime<Utc>`, truncating sub-seconds.
/// - [`Timestamp::parse()`]: from an RFC 3339 string with a `Z` suffix.
/// - [`Timestamp::parse_lenient()`]: from any RFC 3339 offset, converted to UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Create a timestamp from the current UTC time, truncated to seconds.
    pub fn now() -> Self {
        Self(truncate_to_seconds(Utc::now()))
    }

    /// Create a timestamp from a `chrono::DateTime<Utc>`, truncating sub-seconds.
    pub fn from_utc(dt: DateTime<Utc>) -> Self {
        Self(truncate_to_seconds(dt))
    }

    /// Parse a timestamp from an RFC 3339 string.
    ///
    /// Only the `Z` suffix is accepted; explicit offsets (including
    /// `+00:00`) are rejected.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidInput`] if the string is not valid
    /// RFC 3339 or does not end in `Z`.
    pub fn parse(s: &str) -> Result<Self, StoreError> {
        if !s.ends_with('Z') {
            return Err(StoreError::InvalidInput(format!(
                "timestamp must use Z suffix (UTC only), got: {s:?}"
            )));
        }
        Self::parse_lenient(s)
    }

    /// Parse an RFC 3339 string with any offset, converting to UTC.
    pub fn parse_lenient(s: &str) -> Result<Self, StoreError> {
        let dt = DateTime::parse_from_rfc3339(s).map_err(|e| {
            StoreError::InvalidInput(format!("invalid RFC 3339 timestamp {s:?}: {e}"))
        })?;
        Ok(Self(truncate_to_seconds(dt.with_timezone(&Utc))))
    }

    /// Create a timestamp from Unix epoch seconds.
    pub fn from_epoch_secs(secs: i64) -> Result<Self, StoreError> {
        let dt = DateTime::from_timestamp(secs, 0)
            .ok_or_else(|| StoreError::InvalidInput(format!("invalid Unix timestamp: {secs}")))?;
        Ok(Self(dt))
    }

    /// Access the inner `DateTime<Utc>`.
    pub fn as_datetime(&self) -> &DateTime<Utc> {
        &self.0
    }

    /// Returns the Unix epoch timestamp in seconds.
    pub fn epoch_secs(&self) -> i64 {
        self.0.timestamp()
    }

    /// This timestamp shifted by a whole number of minutes (may be negative).
    ///
    /// # Errors
    ///
    /// `InvalidInput` when the offset or the result falls outside the
    /// representable date range.
    pub fn checked_plus_minutes(&self, minutes: i64) -> Result<Self, StoreError> {
        TimeDelta::try_minutes(minutes)
            .and_then(|delta| self.0.checked_add_signed(delta))
            .map(Self)
            .ok_or_else(|| {
                StoreError::InvalidInput(format!("{minutes} minutes from {self} is out of range"))
            })
    }

    /// Render as ISO 8601 with Z suffix (e.g., `2026-01-15T12:00:00Z`).
    pub fn to_iso8601(&self) -> String {
        self.0.format("%Y-%m-%dT%H:%M:%SZ").to_string()
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_iso8601())
    }
}

impl std::str::FromStr for Timestamp {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_lenient(s)
    }
}

fn truncate_to_seconds(dt: DateTime<Utc>) -> DateTime<Utc> {
    dt.with_nanosecond(0).unwrap_or(dt)
}
