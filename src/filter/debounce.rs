//! Deadline-based debouncer driven by the logical clock.

use crate::domain::Millis;

/// Holds the latest pushed value until `delay` has passed without another push.
#[derive(Debug, Clone)]
pub struct Debouncer<T> {
    delay: Millis,
    pending: Option<(T, Millis)>,
}

impl<T> Debouncer<T> {
    #[must_use]
    pub fn new(delay: Millis) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    /// Replaces any pending value and restarts the quiet period at `now`.
    pub fn push(&mut self, value: T, now: Millis) {
        self.pending = Some((value, now.saturating_add(self.delay)));
    }

    /// Takes the pending value if its quiet period has elapsed by `now`.
    pub fn poll(&mut self, now: Millis) -> Option<T> {
        match self.pending {
            Some((_, deadline)) if deadline <= now => self.pending.take().map(|(value, _)| value),
            _ => None,
        }
    }

    /// Drops the pending value without delivering it.
    pub fn cancel(&mut self) -> Option<T> {
        self.pending.take().map(|(value, _)| value)
    }

    #[must_use]
    pub fn next_deadline(&self) -> Option<Millis> {
        self.pending.as_ref().map(|(_, deadline)| *deadline)
    }

    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}
