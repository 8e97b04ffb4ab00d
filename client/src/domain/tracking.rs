//! Shared bookkeeping for stores that run remote actions.
//!
//! Stores keep their state behind a `std::sync::Mutex` that is never held
//! across an await point. [`InFlight`] counts running actions so `loading`
//! stays true until the last one finishes, and [`Generation`] tickets let a
//! store drop replies that a newer request has superseded.

use std::sync::{Mutex, MutexGuard, PoisonError};

/// Loading counter and last error shared by every store.
#[derive(Debug, Default)]
pub(crate) struct Bookkeeping {
    in_flight: usize,
    last_error: Option<String>,
}

impl Bookkeeping {
    pub(crate) const fn is_loading(&self) -> bool {
        self.in_flight > 0
    }

    pub(crate) fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub(crate) fn record_error(&mut self, message: impl Into<String>) {
        self.last_error = Some(message.into());
    }

    pub(crate) fn clear_error(&mut self) {
        self.last_error = None;
    }
}

/// Store state that carries [`Bookkeeping`].
pub(crate) trait Tracked {
    fn bookkeeping(&mut self) -> &mut Bookkeeping;
}

/// Lock store state, recovering the data if a previous holder panicked.
pub(crate) fn lock_state<S>(state: &Mutex<S>) -> MutexGuard<'_, S> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Marks one action as running for as long as it lives.
pub(crate) struct InFlight<'a, S: Tracked> {
    state: &'a Mutex<S>,
}

impl<'a, S: Tracked> InFlight<'a, S> {
    /// Register a new action and clear the previous error.
    pub(crate) fn begin(state: &'a Mutex<S>) -> Self {
        let mut guard = lock_state(state);
        let book = guard.bookkeeping();
        book.in_flight = book.in_flight.saturating_add(1);
        book.clear_error();
        Self { state }
    }
}

impl<S: Tracked> Drop for InFlight<'_, S> {
    fn drop(&mut self) {
        let mut guard = lock_state(self.state);
        let book = guard.bookkeeping();
        book.in_flight = book.in_flight.saturating_sub(1);
    }
}

/// Monotonic request counter for last-dispatched-wins updates.
#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct Generation(u64);

impl Generation {
    /// Issue a ticket for a new request, superseding every older ticket.
    pub(crate) const fn advance(&mut self) -> u64 {
        self.0 = self.0.wrapping_add(1);
        self.0
    }

    /// Whether `ticket` belongs to the most recently dispatched request.
    pub(crate) const fn is_current(self, ticket: u64) -> bool {
        self.0 == ticket
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;

    #[derive(Default)]
    struct Probe {
        book: Bookkeeping,
    }

    impl Tracked for Probe {
        fn bookkeeping(&mut self) -> &mut Bookkeeping {
            &mut self.book
        }
    }

    #[test]
    fn loading_stays_true_until_last_action_finishes() {
        let state = Mutex::new(Probe::default());
        let first = InFlight::begin(&state);
        let second = InFlight::begin(&state);
        drop(first);
        assert!(lock_state(&state).book.is_loading());
        drop(second);
        assert!(!lock_state(&state).book.is_loading());
    }

    #[test]
    fn begin_clears_previous_error() {
        let state = Mutex::new(Probe::default());
        lock_state(&state).book.record_error("boom");
        let flight = InFlight::begin(&state);
        assert_eq!(lock_state(&state).book.last_error(), None);
        drop(flight);
    }

    #[test]
    fn newer_tickets_supersede_older_ones() {
        let mut generation = Generation::default();
        let first = generation.advance();
        let second = generation.advance();
        assert!(!generation.is_current(first));
        assert!(generation.is_current(second));
    }
}
