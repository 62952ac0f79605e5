use std::time::{Duration, Instant};

/// Upper bound on ticks replayed in one poll, so a stalled terminal does not
/// drop the word to the ground in a single frame.
pub const MAX_CATCH_UP_TICKS: u32 = 8;

/// Timer bookkeeping for the event loop: one repeating tick plus one-shot
/// deferred payloads. Nothing here fires on its own; the loop polls it.
pub struct Scheduler<T> {
    tick_interval: Duration,
    next_tick: Option<Instant>,
    pending: Vec<(Instant, T)>,
}

impl<T> Scheduler<T> {
    pub fn new(tick_interval: Duration) -> Self {
        Self {
            tick_interval: tick_interval.max(Duration::from_millis(1)),
            next_tick: None,
            pending: Vec::new(),
        }
    }

    pub fn tick_interval(&self) -> Duration {
        self.tick_interval
    }

    pub fn start_ticking(&mut self, now: Instant) {
        self.next_tick = Some(now + self.tick_interval);
    }

    pub fn stop_ticking(&mut self) {
        self.next_tick = None;
    }

    pub fn is_ticking(&self) -> bool {
        self.next_tick.is_some()
    }

    pub fn defer(&mut self, due: Instant, payload: T) {
        self.pending.push((due, payload));
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Drop the repeating tick and every deferred payload.
    pub fn cancel_all(&mut self) {
        self.next_tick = None;
        self.pending.clear();
    }

    /// Number of whole tick intervals elapsed since the last call, capped at
    /// [`MAX_CATCH_UP_TICKS`].
    pub fn due_ticks(&mut self, now: Instant) -> u32 {
        let Some(mut next) = self.next_tick else {
            return 0;
        };
        let mut count = 0;
        while next <= now {
            count += 1;
            next += self.tick_interval;
            if count == MAX_CATCH_UP_TICKS {
                // Resynchronise instead of accumulating debt.
                next = now + self.tick_interval;
                break;
            }
        }
        self.next_tick = Some(next);
        count
    }

    /// Remove and return payloads whose deadline has passed, earliest first.
    pub fn take_due(&mut self, now: Instant) -> Vec<T> {
        let mut due: Vec<(Instant, T)> = Vec::new();
        let mut i = 0;
        while i < self.pending.len() {
            if self.pending[i].0 <= now {
                due.push(self.pending.swap_remove(i));
            } else {
                i += 1;
            }
        }
        due.sort_by_key(|(at, _)| *at);
        due.into_iter().map(|(_, payload)| payload).collect()
    }

    /// Time until the next tick or deferred payload, for poll timeouts.
    pub fn time_until_next(&self, now: Instant) -> Option<Duration> {
        let deferred = self.pending.iter().map(|(at, _)| *at).min();
        let next = match (self.next_tick, deferred) {
            (Some(a), Some(b)) => a.min(b),
            (Some(a), None) => a,
            (None, Some(b)) => b,
            (None, None) => return None,
        };
        Some(next.saturating_duration_since(now))
    }
}
