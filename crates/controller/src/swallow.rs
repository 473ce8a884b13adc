//! Coalescing of redraw notifications.
//!
//! The first change notification updates immediately and opens a cooling
//! window. Changes arriving inside the window are swallowed until `limit` of
//! them have piled up, at which point one update flushes them. If the window
//! elapses with swallowed changes still pending, a single deferred update
//! catches up. Forced changes always update and reset the count.
//!
//! The policy never reads the clock itself; callers pass `now`.

use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Update,
    Suppress,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwallowState {
    Idle,
    Cooling {
        counter: usize,
        pending: bool,
        deadline: Instant,
    },
}

#[derive(Debug, Clone)]
pub struct SwallowPolicy {
    limit: usize,
    window: Duration,
    state: SwallowState,
}

impl SwallowPolicy {
    pub fn new(limit: usize, window: Duration) -> Self {
        Self {
            limit,
            window,
            state: SwallowState::Idle,
        }
    }

    pub fn state(&self) -> SwallowState {
        self.state
    }

    pub fn counter(&self) -> usize {
        match self.state {
            SwallowState::Idle => 0,
            SwallowState::Cooling { counter, .. } => counter,
        }
    }

    /// When the consumer should wake up to close the cooling window.
    pub fn deadline(&self) -> Option<Instant> {
        match self.state {
            SwallowState::Idle => None,
            SwallowState::Cooling { deadline, .. } => Some(deadline),
        }
    }

    pub fn on_change(&mut self, now: Instant) -> Decision {
        match self.state {
            SwallowState::Cooling {
                counter, deadline, ..
            } if now < deadline => {
                let counter = counter + 1;
                if counter >= self.limit {
                    self.cool(now);
                    Decision::Update
                } else {
                    self.state = SwallowState::Cooling {
                        counter,
                        pending: true,
                        deadline: now + self.window,
                    };
                    Decision::Suppress
                }
            }
            // Idle, or a window that lapsed before the timeout was observed.
            // Either way this update also covers anything still pending.
            _ => {
                self.cool(now);
                Decision::Update
            }
        }
    }

    pub fn on_force_change(&mut self, now: Instant) -> Decision {
        self.cool(now);
        Decision::Update
    }

    /// Closes the window once `now` has reached the deadline. Returns
    /// `Update` if swallowed changes still need their deferred re-check.
    pub fn on_timeout(&mut self, now: Instant) -> Decision {
        match self.state {
            SwallowState::Cooling {
                pending, deadline, ..
            } if now >= deadline => {
                self.state = SwallowState::Idle;
                if pending {
                    Decision::Update
                } else {
                    Decision::Suppress
                }
            }
            _ => Decision::Suppress,
        }
    }

    fn cool(&mut self, now: Instant) {
        self.state = SwallowState::Cooling {
            counter: 0,
            pending: false,
            deadline: now + self.window,
        };
    }
}

#[cfg(test)]
#[path = "tests/swallow_tests.rs"]
mod tests;
