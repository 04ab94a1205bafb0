//! Rendering of stored UTC instants in the configured civil time zone.

use chrono_tz::Tz;

use crate::error::CoreError;
use crate::types::Timestamp;

/// `YYYY-MM-DD HH:mm:ss`
pub const DISPLAY_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Zone used when none is configured.
pub const DEFAULT_DISPLAY_TIMEZONE: Tz = chrono_tz::America::Mexico_City;

/// Parse an IANA zone name such as `America/Mexico_City`.
pub fn parse_timezone(name: &str) -> Result<Tz, CoreError> {
    name.trim()
        .parse::<Tz>()
        .map_err(|_| CoreError::Validation(format!("Unknown time zone '{name}'")))
}

/// Format `instant` as local civil time in `tz`.
pub fn format_timestamp(instant: Timestamp, tz: Tz) -> String {
    instant.with_timezone(&tz).format(DISPLAY_FORMAT).to_string()
}
