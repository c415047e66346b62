use chrono::{DateTime, TimeDelta, Utc};

pub const CONDITIONS_TTL_MINUTES: i64 = 5;

pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Remembers when a list was last fetched. Expiry is only checked on the
/// next load; nothing runs in the background, and every explicit refresh
/// must call `invalidate` first.
#[derive(Debug, Clone)]
pub struct TtlGate {
    loaded_at: Option<DateTime<Utc>>,
    ttl: TimeDelta,
}

impl TtlGate {
    pub fn new(ttl: TimeDelta) -> Self {
        Self { loaded_at: None, ttl }
    }

    pub fn conditions() -> Self {
        Self::new(TimeDelta::minutes(CONDITIONS_TTL_MINUTES))
    }

    pub fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        match self.loaded_at {
            Some(at) => now.signed_duration_since(at) < self.ttl,
            None => false,
        }
    }

    pub fn mark(&mut self, now: DateTime<Utc>) {
        self.loaded_at = Some(now);
    }

    pub fn invalidate(&mut self) {
        self.loaded_at = None;
    }

    #[cfg(test)]
    pub fn loaded_at(&self) -> Option<DateTime<Utc>> {
        self.loaded_at
    }
}
