//! Backward-load state machine for backscroll.
//!
//! This module provides a pure, side-effect-free state machine for the
//! single-flight `load_older` lifecycle. The state machine takes events as
//! input and produces a new state plus a list of actions to execute.
//!
//! The actual I/O (range reads, re-subscribing) is performed by
//! scroll-client, not by this module.
//!
//! ```text
//! Idle ──LoadRequested──▶ Loading ──PageArrived / QueryFailed──▶ Idle
//!   └──────────────── DisposeRequested (from anywhere) ───────▶ Disposed
//! ```

use crate::PageRequest;

/// Load state machine - NO I/O, just state transitions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadState {
    /// No backward read in flight.
    Idle,
    /// A backward read is in flight.
    Loading {
        /// The request that was issued.
        request: PageRequest,
    },
    /// The window was disposed; nothing happens any more.
    Disposed,
}

impl LoadState {
    /// Create a new state machine in the Idle state.
    pub fn new() -> Self {
        Self::Idle
    }

    /// Process an event and return the new state plus actions to execute.
    ///
    /// This is a pure function - no side effects. The caller (scroll-client)
    /// is responsible for executing the returned actions.
    pub fn on_event(self, event: LoadEvent) -> (Self, Vec<Action>) {
        match (self, event) {
            // Dispose wins from every state, once
            (Self::Disposed, LoadEvent::DisposeRequested) => (Self::Disposed, vec![]),
            (_, LoadEvent::DisposeRequested) => (Self::Disposed, vec![Action::TearDown]),

            // From Idle
            (Self::Idle, LoadEvent::LoadRequested { request }) => (
                Self::Loading {
                    request: request.clone(),
                },
                vec![Action::IssueRangeQuery(request)],
            ),

            // From Loading
            (Self::Loading { request }, LoadEvent::LoadRequested { .. }) => (
                Self::Loading { request },
                vec![Action::Reject(Rejection::Busy)],
            ),
            (Self::Loading { request }, LoadEvent::PageArrived) => (
                Self::Idle,
                vec![Action::SplicePage { request }, Action::Reanchor],
            ),
            (Self::Loading { .. }, LoadEvent::QueryFailed) => {
                (Self::Idle, vec![Action::ReportFailure])
            }

            // From Disposed
            (Self::Disposed, LoadEvent::LoadRequested { .. }) => {
                (Self::Disposed, vec![Action::Reject(Rejection::Disposed)])
            }

            // Invalid transitions - stay in current state
            (state, _) => (state, vec![]),
        }
    }

    /// Check if a backward read is in flight.
    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading { .. })
    }

    /// Check if the window was disposed.
    pub fn is_disposed(&self) -> bool {
        matches!(self, Self::Disposed)
    }
}

impl Default for LoadState {
    fn default() -> Self {
        Self::new()
    }
}

/// Events that can occur in the load lifecycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadEvent {
    /// The collaborator asked for older entries.
    LoadRequested {
        /// Request built against the window at call time.
        request: PageRequest,
    },
    /// The range read returned a page.
    PageArrived,
    /// The range read failed.
    QueryFailed,
    /// The collaborator disposed the window.
    DisposeRequested,
}

/// Why a load request was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// Another load is in flight.
    Busy,
    /// The window was disposed.
    Disposed,
}

/// Actions to be executed by scroll-client.
///
/// These are instructions, not side effects. The client interprets
/// these and performs the actual I/O.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Issue a range read for the given request.
    IssueRangeQuery(PageRequest),
    /// Splice the arrived page at the front, judged against `request`.
    SplicePage {
        /// The request the page answers.
        request: PageRequest,
    },
    /// Move the live subscription to the current tail.
    Reanchor,
    /// Surface the failed read to the listener.
    ReportFailure,
    /// Refuse the request.
    Reject(Rejection),
    /// Clear the window and cancel the live subscription.
    TearDown,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Boundary, Window};

    fn request(count: usize) -> PageRequest {
        PageRequest::older_than(&Window::new(), count)
    }

    #[test]
    fn starts_idle() {
        let state = LoadState::new();
        assert!(matches!(state, LoadState::Idle));
        assert!(!state.is_loading());
    }

    #[test]
    fn load_request_transitions_to_loading() {
        let (new_state, actions) = LoadState::Idle.on_event(LoadEvent::LoadRequested {
            request: request(30),
        });

        assert!(new_state.is_loading());
        assert_eq!(actions, vec![Action::IssueRangeQuery(request(30))]);
    }

    #[test]
    fn second_request_while_loading_is_rejected() {
        let state = LoadState::Loading {
            request: request(30),
        };
        let (new_state, actions) = state.on_event(LoadEvent::LoadRequested {
            request: request(10),
        });

        // Still waiting on the first request
        assert_eq!(
            new_state,
            LoadState::Loading {
                request: request(30)
            }
        );
        assert_eq!(actions, vec![Action::Reject(Rejection::Busy)]);
    }

    #[test]
    fn page_arrival_splices_then_reanchors() {
        let state = LoadState::Loading {
            request: request(3),
        };
        let (new_state, actions) = state.on_event(LoadEvent::PageArrived);

        assert!(matches!(new_state, LoadState::Idle));
        assert_eq!(
            actions,
            vec![
                Action::SplicePage {
                    request: request(3)
                },
                Action::Reanchor
            ]
        );
    }

    #[test]
    fn splice_carries_request_boundary() {
        let mut window = Window::new();
        window.append(scroll_types::Entry::bare("k08"));
        let request = PageRequest::older_than(&window, 3);

        let (_, actions) = LoadState::Loading { request }.on_event(LoadEvent::PageArrived);

        match &actions[0] {
            Action::SplicePage { request } => {
                assert_eq!(
                    request.boundary,
                    Boundary::Inclusive(scroll_types::Key::from("k08"))
                );
            }
            other => panic!("Expected SplicePage, got {:?}", other),
        }
    }

    #[test]
    fn query_failure_returns_to_idle() {
        let state = LoadState::Loading {
            request: request(3),
        };
        let (new_state, actions) = state.on_event(LoadEvent::QueryFailed);

        assert!(matches!(new_state, LoadState::Idle));
        assert_eq!(actions, vec![Action::ReportFailure]);
    }

    #[test]
    fn dispose_tears_down_from_idle_and_loading() {
        let (state, actions) = LoadState::Idle.on_event(LoadEvent::DisposeRequested);
        assert!(state.is_disposed());
        assert_eq!(actions, vec![Action::TearDown]);

        let loading = LoadState::Loading {
            request: request(3),
        };
        let (state, actions) = loading.on_event(LoadEvent::DisposeRequested);
        assert!(state.is_disposed());
        assert_eq!(actions, vec![Action::TearDown]);
    }

    #[test]
    fn dispose_is_idempotent() {
        let (state, actions) = LoadState::Disposed.on_event(LoadEvent::DisposeRequested);
        assert!(state.is_disposed());
        assert!(actions.is_empty());
    }

    #[test]
    fn late_page_after_dispose_does_nothing() {
        let (state, actions) = LoadState::Disposed.on_event(LoadEvent::PageArrived);
        assert!(state.is_disposed());
        assert!(actions.is_empty());

        let (state, actions) = state.on_event(LoadEvent::QueryFailed);
        assert!(state.is_disposed());
        assert!(actions.is_empty());
    }

    #[test]
    fn load_after_dispose_is_rejected() {
        let (state, actions) = LoadState::Disposed.on_event(LoadEvent::LoadRequested {
            request: request(3),
        });
        assert!(state.is_disposed());
        assert_eq!(actions, vec![Action::Reject(Rejection::Disposed)]);
    }

    #[test]
    fn stray_completion_while_idle_is_ignored() {
        let (state, actions) = LoadState::Idle.on_event(LoadEvent::PageArrived);
        assert!(matches!(state, LoadState::Idle));
        assert!(actions.is_empty());
    }
}
