//! Windows file-time values.
//!
//! NBU headers timestamp the backup with a 64-bit Windows file time: the
//! number of 100-nanosecond intervals since 1601-01-01 00:00 UTC, stored as
//! two 32-bit halves (high first). The decoder keeps the raw tick count;
//! conversion to a calendar date only happens for display.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;

/// 100-nanosecond ticks per second.
const TICKS_PER_SECOND: u64 = 10_000_000;

/// Ticks between 1601-01-01 and the Unix epoch.
const UNIX_EPOCH_TICKS: u64 = 116_444_736_000_000_000;

/// A raw Windows file time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct FileTime(pub u64);

impl FileTime {
    /// Combine the high and low 32-bit halves as stored on disk.
    pub fn from_parts(high: u32, low: u32) -> Self {
        FileTime((u64::from(high) << 32) | u64::from(low))
    }

    /// Raw tick count.
    pub fn ticks(self) -> u64 {
        self.0
    }

    /// Convert to a UTC timestamp.
    ///
    /// Returns `None` for times before the Unix epoch or beyond chrono's
    /// representable range.
    pub fn to_datetime(self) -> Option<DateTime<Utc>> {
        let since_unix = self.0.checked_sub(UNIX_EPOCH_TICKS)?;
        let secs = i64::try_from(since_unix / TICKS_PER_SECOND).ok()?;
        let nanos = ((since_unix % TICKS_PER_SECOND) * 100) as u32;
        DateTime::from_timestamp(secs, nanos)
    }
}

impl fmt::Display for FileTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_datetime() {
            Some(dt) => write!(f, "{}", dt.format("%Y-%m-%d %H:%M:%S UTC")),
            None => write!(f, "{} ticks", self.0),
        }
    }
}
