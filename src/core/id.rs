use crate::core::clock::{Clock, SystemClock};
use crate::core::entity::EntityId;

/// Ids handed out within the same millisecond before the counter spills
/// into the next millisecond's range.
pub const IDS_PER_MS: u64 = 1000;

/// Time-ordered id generator: `floor(now_ms) * 1000 + counter`.
///
/// The counter resets whenever the millisecond advances. A clock that steps
/// backwards keeps counting inside the last millisecond seen. More than
/// [`IDS_PER_MS`] calls inside one millisecond overlap the next
/// millisecond's range; this is a known limitation of the scheme.
pub struct IdGenerator {
    clock: Box<dyn Clock>,
    last_ms: Option<u64>,
    counter: u64,
}

impl IdGenerator {
    pub fn new(clock: Box<dyn Clock>) -> Self {
        Self {
            clock,
            last_ms: None,
            counter: 0,
        }
    }

    /// Produce the next id
    pub fn gen(&mut self) -> EntityId {
        let now_ms = self.clock.now_ms().max(0.0).floor() as u64;
        let now_ms = self.last_ms.map_or(now_ms, |last| now_ms.max(last));
        if self.last_ms == Some(now_ms) {
            self.counter += 1;
        } else {
            self.last_ms = Some(now_ms);
            self.counter = 0;
        }
        now_ms * IDS_PER_MS + self.counter
    }
}

impl Default for IdGenerator {
    fn default() -> Self {
        Self::new(Box::new(SystemClock))
    }
}

impl std::fmt::Debug for IdGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdGenerator")
            .field("last_ms", &self.last_ms)
            .field("counter", &self.counter)
            .finish()
    }
}
