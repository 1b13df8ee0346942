//! Cache freshness decisions.

use time::Duration;

use crate::{CacheEntry, UtcDateTime};

/// `true` iff the entry is younger than `ttl` at `now`. An entry exactly `ttl` old is stale.
///
/// An entry stamped after `now` is stale as well, so a skewed clock cannot pin it.
pub fn is_fresh(entry: &CacheEntry, now: UtcDateTime, ttl: Duration) -> bool {
    let age = entry.last_updated.age_at(now);
    !age.is_negative() && age < ttl
}

/// TTL-based freshness window; defaults to 24 hours.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FreshnessPolicy {
    ttl: Duration,
}

impl Default for FreshnessPolicy {
    fn default() -> Self {
        Self::new(Duration::hours(crate::config::DEFAULT_TTL_HOURS))
    }
}

impl FreshnessPolicy {
    pub const fn new(ttl: Duration) -> Self {
        Self { ttl }
    }

    pub const fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn is_fresh(&self, entry: &CacheEntry, now: UtcDateTime) -> bool {
        is_fresh(entry, now, self.ttl)
    }
}
