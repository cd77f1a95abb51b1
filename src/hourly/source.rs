use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;

use crate::feed::PositionRecord;
use crate::hourly::HourError;

pub const MAX_HOUR_OFFSET: u8 = 23;

/// Hours before now of an upstream snapshot; 0 is the most recent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct HourOffset(u8);

impl HourOffset {
    pub fn new(hours: u8) -> Option<Self> {
        (hours <= MAX_HOUR_OFFSET).then_some(Self(hours))
    }

    pub fn hours(self) -> u8 {
        self.0
    }

    /// Two-digit form used in feed file names.
    pub fn padded(self) -> String {
        format!("{:02}", self.0)
    }
}

impl fmt::Display for HourOffset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}", self.0)
    }
}

impl FromStr for HourOffset {
    type Err = HourError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<u8>()
            .ok()
            .and_then(HourOffset::new)
            .ok_or_else(|| HourError::InvalidHour(s.to_string()))
    }
}

/// Anything that can answer "which balloons were seen N hours ago".
#[async_trait]
pub trait HourSource: Send + Sync {
    async fn get_hour(&self, hour: HourOffset) -> Result<Vec<PositionRecord>, HourError>;
}
