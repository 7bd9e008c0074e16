use std::sync::RwLock;

use chrono::{DateTime, Duration, Utc};

use crate::domain::{Clock, SessionContext};

#[derive(Debug, Clone)]
struct Entry {
    context: SessionContext,
    stored_at: DateTime<Utc>,
}

/// Session metadata with a time-to-live
///
/// Entries expire `ttl` after they were stored, measured on the injected clock.
/// `invalidate` drops the entry immediately, e.g. after an authentication failure.
#[derive(Debug)]
pub struct SessionCache<C: Clock> {
    clock: C,
    ttl: Duration,
    entry: RwLock<Option<Entry>>,
}

impl<C: Clock> SessionCache<C> {
    pub fn new(clock: C, ttl: Duration) -> Self {
        Self {
            clock,
            ttl,
            entry: RwLock::new(None),
        }
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn get(&self) -> Option<SessionContext> {
        let guard = self.entry.read().unwrap_or_else(|e| e.into_inner());
        let entry = guard.as_ref()?;

        if self.clock.now() - entry.stored_at >= self.ttl {
            return None;
        }

        Some(entry.context.clone())
    }

    pub fn store(&self, context: SessionContext) {
        let mut guard = self.entry.write().unwrap_or_else(|e| e.into_inner());
        *guard = Some(Entry {
            context,
            stored_at: self.clock.now(),
        });
    }

    pub fn invalidate(&self) {
        let mut guard = self.entry.write().unwrap_or_else(|e| e.into_inner());
        *guard = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::FixedClock;
    use chrono::TimeZone;

    fn context() -> SessionContext {
        SessionContext {
            warehouse: Some("COMPUTE_WH".to_string()),
            database: Some("CALL_CENTER_ANALYTICS".to_string()),
            ..Default::default()
        }
    }

    fn cache() -> SessionCache<FixedClock> {
        let start = Utc.with_ymd_and_hms(2024, 6, 10, 9, 0, 0).unwrap();
        SessionCache::new(FixedClock::new(start), Duration::hours(8))
    }

    #[test]
    fn test_empty_cache() {
        assert_eq!(cache().get(), None);
    }

    #[test]
    fn test_entry_valid_until_ttl() {
        let cache = cache();
        cache.store(context());

        cache.clock().advance(Duration::hours(7) + Duration::minutes(59));
        assert_eq!(cache.get(), Some(context()));

        cache.clock().advance(Duration::minutes(1));
        assert_eq!(cache.get(), None);
    }

    #[test]
    fn test_invalidate() {
        let cache = cache();
        cache.store(context());
        cache.invalidate();

        assert_eq!(cache.get(), None);
    }

    #[test]
    fn test_store_resets_expiry() {
        let cache = cache();
        cache.store(context());
        cache.clock().advance(Duration::hours(6));
        cache.store(context());
        cache.clock().advance(Duration::hours(6));

        assert!(cache.get().is_some());
    }
}
