//! Prefetch policy for scroll-driven loading.
//!
//! A view calls into the window as the user scrolls. The policy turns the
//! view's position into "load N older entries" or "do nothing":
//! - an empty window gets the (larger) initial page
//! - scrolling within `prefetch_threshold` of the oldest held entry gets a page
//! - nothing is requested while a load is in flight or history is exhausted

/// What the view currently shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewState {
    /// Entries held by the window.
    pub held: usize,
    /// Index of the first visible entry.
    pub first_visible: usize,
    /// Whether a backward load is in flight.
    pub loading: bool,
    /// Whether the last page came back short.
    pub exhausted: bool,
}

/// Decides when and how much older history to request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrefetchPolicy {
    /// Page size for the first load into an empty window.
    pub initial_load: usize,
    /// Page size for every later backward load.
    pub page_size: usize,
    /// Prefetch once the first visible index drops below this.
    pub prefetch_threshold: usize,
}

impl PrefetchPolicy {
    /// Create a policy.
    pub fn new(initial_load: usize, page_size: usize, prefetch_threshold: usize) -> Self {
        Self {
            initial_load,
            page_size,
            prefetch_threshold,
        }
    }

    /// How many older entries to request for `view`, if any.
    pub fn decide(&self, view: ViewState) -> Option<usize> {
        if view.loading || view.exhausted {
            return None;
        }
        if view.held == 0 {
            return Some(self.initial_load);
        }
        if view.first_visible < self.prefetch_threshold {
            return Some(self.page_size);
        }
        None
    }
}

impl Default for PrefetchPolicy {
    fn default() -> Self {
        Self::new(30, 10, 5)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn view(held: usize, first_visible: usize) -> ViewState {
        ViewState {
            held,
            first_visible,
            loading: false,
            exhausted: false,
        }
    }

    #[test]
    fn empty_window_gets_initial_page() {
        let policy = PrefetchPolicy::default();
        assert_eq!(policy.decide(view(0, 0)), Some(30));
    }

    #[test]
    fn near_top_gets_incremental_page() {
        let policy = PrefetchPolicy::default();
        assert_eq!(policy.decide(view(30, 4)), Some(10));
        assert_eq!(policy.decide(view(30, 0)), Some(10));
    }

    #[test]
    fn far_from_top_does_nothing() {
        let policy = PrefetchPolicy::default();
        assert_eq!(policy.decide(view(30, 5)), None);
        assert_eq!(policy.decide(view(30, 29)), None);
    }

    #[test]
    fn in_flight_load_suppresses_prefetch() {
        let policy = PrefetchPolicy::default();
        let mut state = view(0, 0);
        state.loading = true;
        assert_eq!(policy.decide(state), None);
    }

    #[test]
    fn exhausted_history_suppresses_prefetch() {
        let policy = PrefetchPolicy::new(20, 5, 3);
        let mut state = view(12, 0);
        state.exhausted = true;
        assert_eq!(policy.decide(state), None);
    }

    #[test]
    fn custom_sizes_are_used() {
        let policy = PrefetchPolicy::new(50, 25, 10);
        assert_eq!(policy.decide(view(0, 0)), Some(50));
        assert_eq!(policy.decide(view(50, 9)), Some(25));
    }
}
