use chrono::{DateTime, Utc};

/// Window granularities tracked per model
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Granularity {
    Minute,
    Day,
}

impl Granularity {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "minute" => Some(Self::Minute),
            "day" => Some(Self::Day),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Minute => "minute",
            Self::Day => "day",
        }
    }
}

/// Consumption counters for one (model, granularity) window.
///
/// `window_start` is the rolling anchor for minute windows and the provider's
/// wall-clock reset anchor for day windows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UsageWindow {
    pub window_start: DateTime<Utc>,
    pub request_count: u32,
    pub token_count: u64,
}

impl UsageWindow {
    /// A fresh window starting at the given instant with zeroed counters
    pub fn fresh(start: DateTime<Utc>) -> Self {
        Self {
            window_start: start,
            request_count: 0,
            token_count: 0,
        }
    }
}
