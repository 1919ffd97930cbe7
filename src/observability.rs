//! In-process counters for the film and account endpoints

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};

/// Metrics handle shared by all handlers
#[derive(Debug, Default)]
pub struct Metrics {
    films_created: AtomicU64,
    films_updated: AtomicU64,
    films_deleted: AtomicU64,
    users_registered: AtomicU64,
    logins_succeeded: AtomicU64,
    logins_failed: AtomicU64,
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn film_created(&self) {
        self.films_created.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(counter = "films_created", "Metric incremented");
    }

    pub fn film_updated(&self) {
        self.films_updated.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(counter = "films_updated", "Metric incremented");
    }

    pub fn film_deleted(&self) {
        self.films_deleted.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(counter = "films_deleted", "Metric incremented");
    }

    pub fn user_registered(&self) {
        self.users_registered.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(counter = "users_registered", "Metric incremented");
    }

    pub fn login_succeeded(&self) {
        self.logins_succeeded.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(counter = "logins_succeeded", "Metric incremented");
    }

    pub fn login_failed(&self) {
        self.logins_failed.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(counter = "logins_failed", "Metric incremented");
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            films_created: self.films_created.load(Ordering::Relaxed),
            films_updated: self.films_updated.load(Ordering::Relaxed),
            films_deleted: self.films_deleted.load(Ordering::Relaxed),
            users_registered: self.users_registered.load(Ordering::Relaxed),
            logins_succeeded: self.logins_succeeded.load(Ordering::Relaxed),
            logins_failed: self.logins_failed.load(Ordering::Relaxed),
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub films_created: u64,
    pub films_updated: u64,
    pub films_deleted: u64,
    pub users_registered: u64,
    pub logins_succeeded: u64,
    pub logins_failed: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters_accumulate() {
        let metrics = Metrics::new();
        metrics.film_created();
        metrics.film_created();
        metrics.login_failed();

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.films_created, 2);
        assert_eq!(snapshot.logins_failed, 1);
        assert_eq!(snapshot.users_registered, 0);
    }
}
