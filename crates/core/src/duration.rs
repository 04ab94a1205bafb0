//! Session age / idle-time decomposition.
//!
//! Spans are broken into whole hours, minutes and seconds by successive
//! integer division of the total milliseconds. Components truncate; minutes
//! and seconds always stay within `0..60`.

use std::fmt;

use crate::types::Timestamp;

const MS_PER_SECOND: i64 = 1_000;
const MS_PER_MINUTE: i64 = 60 * MS_PER_SECOND;
const MS_PER_HOUR: i64 = 60 * MS_PER_MINUTE;

/// A non-negative span split into display components.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionDuration {
    pub total_ms: i64,
    pub hours: i64,
    pub minutes: i64,
    pub seconds: i64,
}

impl SessionDuration {
    /// Decompose a span given in milliseconds. Negative input clamps to zero.
    pub fn from_millis(total_ms: i64) -> Self {
        let total_ms = total_ms.max(0);
        Self {
            total_ms,
            hours: total_ms / MS_PER_HOUR,
            minutes: (total_ms % MS_PER_HOUR) / MS_PER_MINUTE,
            seconds: (total_ms % MS_PER_MINUTE) / MS_PER_SECOND,
        }
    }

    /// Span from `earlier` to `now`.
    pub fn between(earlier: Timestamp, now: Timestamp) -> Self {
        Self::from_millis(now.signed_duration_since(earlier).num_milliseconds())
    }
}

impl fmt::Display for SessionDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}, {}, {}",
            unit(self.hours, "hour"),
            unit(self.minutes, "minute"),
            unit(self.seconds, "second")
        )
    }
}

fn unit(value: i64, name: &str) -> String {
    if value == 1 {
        format!("{value} {name}")
    } else {
        format!("{value} {name}s")
    }
}
