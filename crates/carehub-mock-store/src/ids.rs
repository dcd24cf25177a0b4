//! Row id generation.
//!
//! Ids are decimal millisecond timestamps, matching the rows the real
//! backend's clients have always seen. Consecutive ids are strictly
//! increasing, so two inserts inside the same millisecond still get distinct
//! ids. A caller-supplied id bypasses the generator entirely.

use chrono::Utc;

#[derive(Debug, Default)]
pub struct IdGenerator {
    last: u64,
}

impl IdGenerator {
    /// Next id based on the wall clock.
    pub fn next_id(&mut self) -> String {
        let now_ms = u64::try_from(Utc::now().timestamp_millis()).unwrap_or(0);
        self.next_at(now_ms)
    }

    /// Next id for a clock reading of `now_ms`. Never repeats or goes backwards.
    pub fn next_at(&mut self, now_ms: u64) -> String {
        let id = now_ms.max(self.last.saturating_add(1));
        self.last = id;
        id.to_string()
    }
}
