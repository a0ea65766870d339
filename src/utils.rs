use chrono::{DateTime, FixedOffset, Offset, TimeZone, Utc};
use std::env;

pub const MINUTE_WINDOW_SECONDS: i64 = 60;
pub const DAY_WINDOW_SECONDS: i64 = 86_400;

// The provider resets daily quotas at midnight Pacific time. The exact zone
// is configurable because the published docs disagree on the details; set
// GEMINI_RESET_UTC_OFFSET to a whole-hour UTC offset to override.
pub const DEFAULT_RESET_UTC_OFFSET_HOURS: i32 = -8;

/// UTC offset whose midnight anchors the daily quota window
pub fn reset_utc_offset() -> FixedOffset {
    let hours = env::var("GEMINI_RESET_UTC_OFFSET")
        .ok()
        .and_then(|s| s.trim().parse::<i32>().ok())
        .filter(|h| (-12..=14).contains(h))
        .unwrap_or(DEFAULT_RESET_UTC_OFFSET_HOURS);
    FixedOffset::east_opt(hours * 3600).unwrap_or_else(|| Utc.fix())
}

/// Most recent daily reset instant at or before `now`
pub fn day_anchor(now: DateTime<Utc>, offset: FixedOffset) -> DateTime<Utc> {
    let local = now.with_timezone(&offset);
    let midnight = local
        .date_naive()
        .and_hms_opt(0, 0, 0)
        .and_then(|naive| offset.from_local_datetime(&naive).single());
    match midnight {
        Some(dt) => dt.with_timezone(&Utc),
        // Unreachable for fixed offsets; fall back to a rolling anchor
        None => now,
    }
}

/// Rough token estimate for quota accounting: ~4 characters per prompt token
/// plus the full output budget, since the response size is unknown upfront
pub fn estimate_tokens(prompt: &str, max_output_tokens: u32) -> u64 {
    (prompt.chars().count() as u64).div_ceil(4) + u64::from(max_output_tokens)
}

/// Lowercase, hyphen-separated file name fragment derived from a title
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut pending_dash = false;
    for c in title.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
    }
    if slug.is_empty() {
        slug.push_str("post");
    }
    slug
}

pub fn format_count(n: u64) -> String {
    if n >= 1_000_000_000 {
        format!("{:.1}B", n as f64 / 1e9)
    } else if n >= 1_000_000 {
        format!("{:.1}M", n as f64 / 1e6)
    } else if n >= 1_000 {
        format!("{:.1}K", n as f64 / 1e3)
    } else {
        n.to_string()
    }
}
