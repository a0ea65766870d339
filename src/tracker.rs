//! # Quota Tracker
//!
//! Decides whether one more request to a model is currently permitted and
//! records consumption when it is.
//!
//! Three counters are evaluated per model: requests/minute, tokens/minute and
//! requests/day. They are independent; exceeding any single one denies the
//! request even when the others have headroom. The minute window rolls from
//! the first request in it, the day window is anchored to the provider's
//! wall-clock reset (see [`crate::utils::reset_utc_offset`]).
//!
//! Check-and-increment runs as one unit: inside the process a mutex guards
//! the connection, across processes an IMMEDIATE transaction serializes the
//! read-modify-write, so two near-simultaneous callers can never both pass a
//! stale check.

use anyhow::{anyhow, Result};
use chrono::{DateTime, TimeDelta, Utc};
use rusqlite::{Connection, TransactionBehavior};
use std::path::Path;
use std::sync::Mutex;

use crate::db;
use crate::models::{Granularity, ModelQuota, UsageWindow};
use crate::utils::{day_anchor, reset_utc_offset, DAY_WINDOW_SECONDS, MINUTE_WINDOW_SECONDS};

/// Outcome of a quota check. Denial is expected control flow, not an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuotaDecision {
    Allowed,
    Denied {
        reason: String,
        /// Seconds until the nearest violated counter's window resets
        retry_after_secs: i64,
    },
}

pub struct QuotaTracker {
    conn: Mutex<Connection>,
}

impl QuotaTracker {
    pub fn open(db_path: &Path) -> Result<Self> {
        Ok(Self {
            conn: Mutex::new(db::open(db_path)?),
        })
    }

    pub fn open_default() -> Result<Self> {
        Ok(Self {
            conn: Mutex::new(db::open(&db::default_db_path()?)?),
        })
    }

    pub fn in_memory() -> Result<Self> {
        Ok(Self {
            conn: Mutex::new(db::open_in_memory()?),
        })
    }

    /// Check all three counters and, if every one has room, consume a slot
    pub fn try_acquire(&self, quota: &ModelQuota, estimated_tokens: u64) -> Result<QuotaDecision> {
        self.try_acquire_at(quota, estimated_tokens, Utc::now())
    }

    /// Clock-injected variant of [`Self::try_acquire`]
    pub fn try_acquire_at(
        &self,
        quota: &ModelQuota,
        estimated_tokens: u64,
        now: DateTime<Utc>,
    ) -> Result<QuotaDecision> {
        let mut conn = self
            .conn
            .lock()
            .map_err(|_| anyhow!("quota store mutex poisoned"))?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let mut minute = current_minute_window(&tx, &quota.model, now)?;
        let mut day = current_day_window(&tx, &quota.model, now)?;

        // Each limit is checked on its own; the nearest reset among the
        // violated ones drives retry_after.
        let mut denial: Option<(String, i64)> = None;
        let mut deny = |reason: String, retry_after: i64| {
            let retry_after = retry_after.max(1);
            match &denial {
                Some((_, best)) if *best <= retry_after => {}
                _ => denial = Some((reason, retry_after)),
            }
        };

        let minute_reset = secs_until(minute.window_start, MINUTE_WINDOW_SECONDS, now);
        if minute.request_count >= quota.requests_per_minute {
            deny(
                format!(
                    "requests-per-minute limit ({}) reached for {}",
                    quota.requests_per_minute, quota.model
                ),
                minute_reset,
            );
        }
        if minute.token_count + estimated_tokens > quota.tokens_per_minute {
            deny(
                format!(
                    "tokens-per-minute limit ({}) would be exceeded for {}",
                    quota.tokens_per_minute, quota.model
                ),
                minute_reset,
            );
        }
        if day.request_count >= quota.requests_per_day {
            deny(
                format!(
                    "requests-per-day limit ({}) reached for {}",
                    quota.requests_per_day, quota.model
                ),
                secs_until(day.window_start, DAY_WINDOW_SECONDS, now),
            );
        }

        if let Some((reason, retry_after_secs)) = denial {
            tx.commit()?;
            return Ok(QuotaDecision::Denied {
                reason,
                retry_after_secs,
            });
        }

        // All three counters advance together or not at all
        minute.request_count += 1;
        minute.token_count += estimated_tokens;
        day.request_count += 1;
        day.token_count += estimated_tokens;
        db::put_window(&tx, &quota.model, Granularity::Minute, &minute)?;
        db::put_window(&tx, &quota.model, Granularity::Day, &day)?;
        tx.commit()?;

        Ok(QuotaDecision::Allowed)
    }

    /// Raw stored counters for a (model, granularity) pair, for reporting
    pub fn usage(&self, model: &str, granularity: Granularity) -> Result<Option<UsageWindow>> {
        let conn = self
            .conn
            .lock()
            .map_err(|_| anyhow!("quota store mutex poisoned"))?;
        db::get_window(&conn, model, granularity)
    }
}

/// Active minute window: the stored one while it is still live, otherwise a
/// fresh window rolling from `now`
fn current_minute_window(
    conn: &Connection,
    model: &str,
    now: DateTime<Utc>,
) -> Result<UsageWindow> {
    match db::get_window(conn, model, Granularity::Minute)? {
        Some(w)
            if now >= w.window_start
                && now < w.window_start + TimeDelta::seconds(MINUTE_WINDOW_SECONDS) =>
        {
            Ok(w)
        }
        _ => Ok(UsageWindow::fresh(now)),
    }
}

/// Active day window, anchored to the provider's fixed reset time rather than
/// rolling 24h from first use
fn current_day_window(conn: &Connection, model: &str, now: DateTime<Utc>) -> Result<UsageWindow> {
    let anchor = day_anchor(now, reset_utc_offset());
    match db::get_window(conn, model, Granularity::Day)? {
        Some(w) if w.window_start == anchor => Ok(w),
        _ => Ok(UsageWindow::fresh(anchor)),
    }
}

fn secs_until(window_start: DateTime<Utc>, duration_secs: i64, now: DateTime<Utc>) -> i64 {
    let end = window_start + TimeDelta::seconds(duration_secs);
    let ms = (end - now).num_milliseconds();
    (ms + 999).div_euclid(1000).max(0)
}
