//! Notification expiry policy
//!
//! One timer guards the whole queue: it is armed for the head notification
//! and re-armed only when the head changes. Notifications queued behind the
//! head wait their turn, so a backed-up queue drains one entry per TTL,
//! oldest first.

use chrono::{DateTime, Duration, Utc};

use crate::config::MAX_DURATION;
use crate::types::{Notification, NotificationId};

/// Default time a notification stays at the head of the queue
pub const DEFAULT_NOTIFICATION_TTL_MS: i64 = 5_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Armed {
    id: NotificationId,
    deadline: DateTime<Utc>,
}

/// Single-timer expiry for the notification queue
#[derive(Debug, Clone)]
pub struct ExpiryTimer {
    ttl: Duration,
    armed: Option<Armed>,
}

impl ExpiryTimer {
    /// Timer for the given TTL, capped at `MAX_DURATION`
    ///
    /// Config loading rejects longer values; the cap only matters for
    /// hand-built `StoreOptions`.
    pub fn new(ttl: std::time::Duration) -> Self {
        let millis = ttl.min(MAX_DURATION).as_millis() as i64;
        Self {
            ttl: Duration::milliseconds(millis),
            armed: None,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Follow the queue after a transition
    ///
    /// Keeps the running timer when the head is unchanged, arms a fresh one
    /// when a different notification reached the head, and disarms on an
    /// empty queue.
    pub fn sync(&mut self, queue: &[Notification], now: DateTime<Utc>) {
        self.armed = match (queue.first(), self.armed) {
            (None, _) => None,
            (Some(head), Some(armed)) if armed.id == head.id => Some(armed),
            (Some(head), _) => Some(Armed {
                id: head.id,
                deadline: now + self.ttl,
            }),
        };
    }

    pub fn deadline(&self) -> Option<DateTime<Utc>> {
        self.armed.map(|a| a.deadline)
    }

    /// The head notification, once its deadline has passed
    pub fn due(&self, now: DateTime<Utc>) -> Option<NotificationId> {
        self.armed
            .filter(|armed| now >= armed.deadline)
            .map(|armed| armed.id)
    }
}

impl Default for ExpiryTimer {
    fn default() -> Self {
        Self {
            ttl: Duration::milliseconds(DEFAULT_NOTIFICATION_TTL_MS),
            armed: None,
        }
    }
}
