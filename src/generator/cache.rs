use std::collections::VecDeque;

use chrono::{DateTime, Duration, Utc};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CachedPassage {
    pub text: String,
    pub generated_at: DateTime<Utc>,
}

/// Passages generated during this run, oldest first, evicted by age.
pub struct PassageCache {
    entries: VecDeque<CachedPassage>,
    ttl: Duration,
    capacity: usize,
}

impl PassageCache {
    pub fn new(ttl_hours: u32, capacity: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            ttl: Duration::hours(i64::from(ttl_hours)),
            capacity: capacity.max(1),
        }
    }

    pub fn insert(&mut self, text: &str, now: DateTime<Utc>) {
        self.evict_expired(now);
        self.entries.retain(|e| e.text != text);
        self.entries.push_back(CachedPassage {
            text: text.to_string(),
            generated_at: now,
        });
        while self.entries.len() > self.capacity {
            self.entries.pop_front();
        }
    }

    /// Drops entries older than the TTL; returns how many were removed.
    pub fn evict_expired(&mut self, now: DateTime<Utc>) -> usize {
        let before = self.entries.len();
        let ttl = self.ttl;
        self.entries.retain(|e| now.signed_duration_since(e.generated_at) <= ttl);
        before - self.entries.len()
    }

    /// The passage generated just before `current`, or the newest one when
    /// `current` is not cached.
    pub fn before(&self, current: &str) -> Option<&CachedPassage> {
        match self.entries.iter().position(|e| e.text == current) {
            Some(0) => None,
            Some(idx) => self.entries.get(idx - 1),
            None => self.entries.back(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
