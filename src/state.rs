//! View state and in-flight bookkeeping.
//!
//! All state the page shows lives in [`ViewState`]. The two request flows
//! mark themselves busy through [`SharedState::acquire`], which hands out a
//! [`FlightGuard`] that clears the flag again when dropped, whether the flow
//! finished, failed, panicked or was abandoned mid-await. The guard is the only
//! thing that clears a flag, so a finished flight cannot release a newer one.

use std::sync::{Arc, Mutex, MutexGuard};

/// Answer shown when a query could not be completed.
pub const QUERY_FAILED_MESSAGE: &str = "Oops, something went wrong";

/// The two kinds of request that can be outstanding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flight {
    Query,
    Ingest,
}

/// Everything the view renders from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewState {
    query: String,
    answer: String,
    querying: bool,
    ingesting: bool,
}

impl ViewState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn answer(&self) -> &str {
        &self.answer
    }

    pub fn is_querying(&self) -> bool {
        self.querying
    }

    pub fn is_ingesting(&self) -> bool {
        self.ingesting
    }

    pub fn is_in_flight(&self, flight: Flight) -> bool {
        match flight {
            Flight::Query => self.querying,
            Flight::Ingest => self.ingesting,
        }
    }

    /// Replace the query text. The textbox stays editable while a query runs.
    pub fn set_query(&mut self, text: impl Into<String>) {
        self.query = text.into();
    }

    /// Store the answer of a completed query.
    ///
    /// The in-flight flag is left alone: it belongs to the query's
    /// [`FlightGuard`] and clears when that guard drops.
    pub fn finish_query_success(&mut self, answer: impl Into<String>) {
        self.answer = answer.into();
    }

    /// Show the failure message. The flag is cleared by the guard.
    pub fn finish_query_failure(&mut self) {
        self.answer = QUERY_FAILED_MESSAGE.to_string();
    }

    /// Set the flag for `flight`. Returns false if it is already set.
    pub(crate) fn begin(&mut self, flight: Flight) -> bool {
        if self.is_in_flight(flight) {
            return false;
        }
        match flight {
            Flight::Query => self.querying = true,
            Flight::Ingest => self.ingesting = true,
        }
        true
    }

    pub(crate) fn release(&mut self, flight: Flight) {
        match flight {
            Flight::Query => self.querying = false,
            Flight::Ingest => self.ingesting = false,
        }
    }
}

/// View state shared between the view and running flows.
#[derive(Debug, Clone, Default)]
pub struct SharedState {
    inner: Arc<Mutex<ViewState>>,
}

impl SharedState {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, ViewState> {
        // A panic elsewhere must not stop guards from releasing their flag
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Copy of the current state.
    pub fn snapshot(&self) -> ViewState {
        self.lock().clone()
    }

    /// Apply a transition. The lock is held only for the closure.
    pub fn update<R>(&self, f: impl FnOnce(&mut ViewState) -> R) -> R {
        f(&mut self.lock())
    }

    /// Set the in-flight flag for `flight`, returning a guard that clears it.
    ///
    /// Returns `None` if that flight is already outstanding.
    pub fn acquire(&self, flight: Flight) -> Option<FlightGuard> {
        if self.lock().begin(flight) {
            Some(FlightGuard {
                state: self.clone(),
                flight,
            })
        } else {
            None
        }
    }
}

/// Holds an in-flight flag set until dropped.
#[derive(Debug)]
#[must_use = "dropping the guard immediately clears the in-flight flag"]
pub struct FlightGuard {
    state: SharedState,
    flight: Flight,
}

impl FlightGuard {
    pub fn flight(&self) -> Flight {
        self.flight
    }
}

impl Drop for FlightGuard {
    fn drop(&mut self) {
        let flight = self.flight;
        self.state.update(|s| s.release(flight));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_state() {
        let state = ViewState::new();
        assert_eq!(state.query(), "");
        assert_eq!(state.answer(), "");
        assert!(!state.is_querying());
        assert!(!state.is_ingesting());
    }

    #[test]
    fn test_query_transitions() {
        let mut state = ViewState::new();
        assert!(state.begin(Flight::Query));
        assert!(!state.begin(Flight::Query));
        assert!(state.is_querying());

        state.finish_query_success("42");
        assert_eq!(state.answer(), "42");
        assert!(state.is_querying());

        state.finish_query_failure();
        assert_eq!(state.answer(), QUERY_FAILED_MESSAGE);
        assert!(state.is_querying());

        state.release(Flight::Query);
        assert!(!state.is_querying());
    }

    #[test]
    fn test_flows_are_independent() {
        let mut state = ViewState::new();
        assert!(state.begin(Flight::Query));
        assert!(state.begin(Flight::Ingest));
        state.release(Flight::Ingest);
        assert!(state.is_querying());
        assert!(!state.is_ingesting());
    }

    #[test]
    fn test_finished_query_keeps_flag_until_guard_drops() {
        let shared = SharedState::new();
        let first = shared.acquire(Flight::Query).unwrap();
        shared.update(|s| s.finish_query_success("first answer"));

        // the answer is in but the flight is not over yet
        assert!(shared.snapshot().is_querying());
        assert!(shared.acquire(Flight::Query).is_none());

        drop(first);
        assert!(!shared.snapshot().is_querying());

        let second = shared.acquire(Flight::Query).unwrap();
        shared.update(|s| s.finish_query_failure());
        assert!(shared.acquire(Flight::Query).is_none());
        assert!(shared.snapshot().is_querying());

        drop(second);
        assert!(!shared.snapshot().is_querying());
        assert_eq!(shared.snapshot().answer(), QUERY_FAILED_MESSAGE);
    }

    #[test]
    fn test_only_one_query_guard_alive_at_a_time() {
        let shared = SharedState::new();
        let mut held = Vec::new();
        for _ in 0..3 {
            if let Some(guard) = shared.acquire(Flight::Query) {
                shared.update(|s| s.finish_query_success("done"));
                held.push(guard);
            }
        }
        assert_eq!(held.len(), 1);

        held.clear();
        assert!(!shared.snapshot().is_querying());
    }

    #[test]
    fn test_guard_releases_on_drop() {
        let shared = SharedState::new();
        let guard = shared.acquire(Flight::Ingest).unwrap();
        assert_eq!(guard.flight(), Flight::Ingest);
        assert!(shared.snapshot().is_ingesting());
        assert!(shared.acquire(Flight::Ingest).is_none());

        drop(guard);
        assert!(!shared.snapshot().is_ingesting());
        assert!(shared.acquire(Flight::Ingest).is_some());
    }

    #[test]
    fn test_guard_releases_on_early_return() {
        fn flow(shared: &SharedState) -> Result<(), &'static str> {
            let _guard = shared.acquire(Flight::Query).ok_or("busy")?;
            Err("boom")
        }

        let shared = SharedState::new();
        assert_eq!(flow(&shared), Err("boom"));
        assert!(!shared.snapshot().is_querying());
    }

    #[test]
    fn test_guard_releases_on_panic() {
        let shared = SharedState::new();
        let cloned = shared.clone();
        let result = std::thread::spawn(move || {
            let _guard = cloned.acquire(Flight::Query).unwrap();
            panic!("handler blew up");
        })
        .join();

        assert!(result.is_err());
        assert!(!shared.snapshot().is_querying());
    }

    #[test]
    fn test_editing_query_keeps_answer() {
        let shared = SharedState::new();
        shared.update(|s| s.finish_query_success("old answer"));
        shared.update(|s| s.set_query("new question"));

        let snapshot = shared.snapshot();
        assert_eq!(snapshot.query(), "new question");
        assert_eq!(snapshot.answer(), "old answer");
    }
}
