use serde::{Deserialize, Serialize};

use crate::clock;
use crate::error::ValidationError;

/// A closed interval of office presence, in epoch milliseconds.
///
/// Fields are private so `end > start` holds for every value that exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawSession")]
pub struct Session {
    start: i64,
    end: i64,
}

#[derive(Deserialize)]
struct RawSession {
    start: i64,
    end: i64,
}

impl TryFrom<RawSession> for Session {
    type Error = ValidationError;

    fn try_from(raw: RawSession) -> Result<Self, Self::Error> {
        Session::new(raw.start, raw.end)
    }
}

impl Session {
    /// # Errors
    /// Returns `InvalidValue` for a bound outside the representable date
    /// range and `InvalidTimeRange` unless `end > start`.
    pub fn new(start: i64, end: i64) -> Result<Self, ValidationError> {
        for (field, ms) in [("start", start), ("end", end)] {
            if !clock::is_representable(ms) {
                return Err(ValidationError::InvalidValue {
                    field: field.into(),
                    message: format!("{ms} is not a valid timestamp"),
                });
            }
        }
        if end <= start {
            return Err(ValidationError::InvalidTimeRange { start, end });
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> i64 {
        self.start
    }

    pub fn end(&self) -> i64 {
        self.end
    }

    pub fn duration_ms(&self) -> i64 {
        self.end.saturating_sub(self.start)
    }
}
