//! Per-user daily upload quota.
//!
//! The count is recomputed from stored upload records on every call. Two
//! requests racing at the limit can both pass; callers that need a hard
//! limit must serialize check-and-record per user.

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use tracing::debug;

use super::policy::{DailyLimit, PolicyResolver};
use crate::datetime::day_window;
use crate::settings::SettingsSource;
use crate::Result;

/// Count of a user's past uploads within a time range.
#[allow(async_fn_in_trait)]
pub trait UploadHistory {
    /// Count uploads with `start <= created_at < end`.
    async fn count_uploads_between(
        &self,
        user_id: i64,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<u64>;
}

impl<T: UploadHistory + ?Sized> UploadHistory for &T {
    async fn count_uploads_between(
        &self,
        user_id: i64,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<u64> {
        (**self).count_uploads_between(user_id, start, end).await
    }
}

/// Decides whether pending uploads would push a user over the daily limit.
pub struct QuotaEnforcer<'a, S, H> {
    resolver: &'a PolicyResolver<S>,
    history: &'a H,
    policy_group: &'a str,
    timezone: Tz,
}

impl<'a, S: SettingsSource, H: UploadHistory> QuotaEnforcer<'a, S, H> {
    /// `timezone` decides where the calendar day starts.
    pub fn new(
        resolver: &'a PolicyResolver<S>,
        history: &'a H,
        policy_group: &'a str,
        timezone: Tz,
    ) -> Self {
        Self {
            resolver,
            history,
            policy_group,
            timezone,
        }
    }

    /// Whether `pending` more uploads today would exceed the limit.
    ///
    /// Settings and history failures are returned as errors; there is no
    /// fallback here.
    pub async fn would_exceed_daily_limit(&self, user_id: i64, pending: u64) -> Result<bool> {
        self.would_exceed_daily_limit_at(user_id, pending, Utc::now())
            .await
    }

    /// Same as [`Self::would_exceed_daily_limit`] with an explicit clock.
    pub async fn would_exceed_daily_limit_at(
        &self,
        user_id: i64,
        pending: u64,
        now: DateTime<Utc>,
    ) -> Result<bool> {
        let policy = self.resolver.fetch(self.policy_group).await?;
        let limit = match policy.daily_upload_limit {
            DailyLimit::Unlimited => return Ok(false),
            DailyLimit::PerDay(limit) => limit,
        };

        let (start, end) = day_window(now, &self.timezone);
        let today = self
            .history
            .count_uploads_between(user_id, start, end)
            .await?;

        let exceeded = today.saturating_add(pending) > limit;
        debug!(user_id, today, pending, limit, exceeded, "daily quota check");
        Ok(exceeded)
    }
}
