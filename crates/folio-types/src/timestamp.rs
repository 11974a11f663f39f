use std::fmt;

use chrono::{DateTime, FixedOffset, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Wall-clock commit time: whole seconds since the UNIX epoch plus the
/// author's fixed UTC offset.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Timestamp {
    pub seconds: i64,
    pub offset_minutes: i32,
}

impl Timestamp {
    pub fn new(seconds: i64, offset_minutes: i32) -> Result<Self, TypeError> {
        Self::offset(offset_minutes)?;
        Ok(Self {
            seconds,
            offset_minutes,
        })
    }

    /// The current time, recorded with the given offset.
    pub fn now(offset_minutes: i32) -> Result<Self, TypeError> {
        Self::new(Utc::now().timestamp(), offset_minutes)
    }

    /// The current time in UTC.
    pub fn now_utc() -> Self {
        Self {
            seconds: Utc::now().timestamp(),
            offset_minutes: 0,
        }
    }

    /// The time as a zoned datetime, if representable.
    pub fn to_datetime(&self) -> Option<DateTime<FixedOffset>> {
        let offset = Self::offset(self.offset_minutes).ok()?;
        offset.timestamp_opt(self.seconds, 0).single()
    }

    fn offset(offset_minutes: i32) -> Result<FixedOffset, TypeError> {
        offset_minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
            .ok_or(TypeError::InvalidOffset(offset_minutes))
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_datetime() {
            Some(dt) => write!(f, "{}", dt.format("%Y-%m-%d %H:%M:%S %z")),
            None => write!(f, "@{} {:+}m", self.seconds, self.offset_minutes),
        }
    }
}
