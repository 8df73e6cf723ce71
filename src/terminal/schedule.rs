//! Virtual clock for staggered command output.
//!
//! Nothing here sleeps. The owner advances the clock (by frame time in the
//! console, or all at once in tests) and runs whatever became due.

use std::collections::VecDeque;

#[derive(Debug)]
struct Pending<T> {
    due_ms: u64,
    step: T,
}

#[derive(Debug)]
pub struct Scheduler<T> {
    now_ms: u64,
    // Sorted by due time; equal times keep insertion order.
    queue: VecDeque<Pending<T>>,
}

impl<T> Default for Scheduler<T> {
    fn default() -> Self {
        Self {
            now_ms: 0,
            queue: VecDeque::new(),
        }
    }
}

impl<T> Scheduler<T> {
    pub fn now_ms(&self) -> u64 {
        self.now_ms
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn schedule(&mut self, delay_ms: u64, step: T) {
        let due_ms = self.now_ms + delay_ms;
        let at = self
            .queue
            .iter()
            .position(|pending| pending.due_ms > due_ms)
            .unwrap_or(self.queue.len());
        self.queue.insert(at, Pending { due_ms, step });
    }

    /// Pops the earliest step due at or before `deadline_ms`, moving the
    /// clock to its due time.
    pub fn pop_due(&mut self, deadline_ms: u64) -> Option<T> {
        if self.queue.front()?.due_ms > deadline_ms {
            return None;
        }
        let pending = self.queue.pop_front()?;
        self.now_ms = self.now_ms.max(pending.due_ms);
        Some(pending.step)
    }

    /// Pops the earliest step whatever its due time.
    pub fn pop_next(&mut self) -> Option<T> {
        let pending = self.queue.pop_front()?;
        self.now_ms = self.now_ms.max(pending.due_ms);
        Some(pending.step)
    }

    pub fn settle(&mut self, now_ms: u64) {
        self.now_ms = self.now_ms.max(now_ms);
    }
}
