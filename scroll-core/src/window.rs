//! The ordered local mirror.
//!
//! A [`Window`] holds entries strictly ascending by key with no duplicates.
//! It only grows at its two edges:
//! - [`Window::splice_front`] prepends an older page
//! - [`Window::append`] adds one newer entry at the tail
//!
//! Both operations refuse anything that would break the ordering, so the
//! invariant holds no matter how a page and a live delivery interleave.

use scroll_types::{Entry, Key};
use std::collections::VecDeque;

use crate::Boundary;

/// Result of [`Window::append`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Append {
    /// The entry became the new tail.
    Appended,
    /// The key equals the current tail; nothing changed.
    Echo,
    /// The key is older than the current tail; nothing changed.
    OutOfOrder,
}

/// Result of [`Window::splice_front`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Spliced {
    /// Entries added at the front.
    pub inserted: usize,
    /// Entries dropped because they matched the request boundary.
    pub echoed: usize,
    /// Entries dropped because they were not older than the current front
    /// or not ascending within the page.
    pub overlapping: usize,
}

/// Ordered sequence of entries, oldest first.
#[derive(Debug, Clone, Default)]
pub struct Window {
    entries: VecDeque<Entry>,
}

impl Window {
    /// Create an empty window.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of held entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the window holds nothing.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Positional read: 0 is the oldest held entry.
    pub fn get(&self, index: usize) -> Option<&Entry> {
        self.entries.get(index)
    }

    /// Key of the oldest held entry.
    pub fn oldest_key(&self) -> Option<&Key> {
        self.entries.front().map(|entry| &entry.key)
    }

    /// Key of the newest held entry (the live edge).
    pub fn newest_key(&self) -> Option<&Key> {
        self.entries.back().map(|entry| &entry.key)
    }

    /// Iterate entries oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &Entry> {
        self.entries.iter()
    }

    /// Prepend an older page.
    ///
    /// `page` is expected in ascending order. Entries matching `boundary`
    /// are already held and dropped; so is anything not strictly older than
    /// the current front, which covers tails appended while the page was in
    /// flight.
    pub fn splice_front(&mut self, page: Vec<Entry>, boundary: &Boundary) -> Spliced {
        let front = self.oldest_key().cloned();
        let mut spliced = Spliced::default();
        let mut accepted: Vec<Entry> = Vec::with_capacity(page.len());

        for entry in page {
            if boundary.is_echo(&entry.key) {
                spliced.echoed += 1;
                continue;
            }
            let older_than_front = front.as_ref().map_or(true, |front| entry.key < *front);
            let ascending = accepted.last().map_or(true, |last| last.key < entry.key);
            if !older_than_front || !ascending {
                spliced.overlapping += 1;
                continue;
            }
            accepted.push(entry);
        }

        spliced.inserted = accepted.len();
        for entry in accepted.into_iter().rev() {
            self.entries.push_front(entry);
        }
        spliced
    }

    /// Append one entry at the tail if it is newer than the current tail.
    pub fn append(&mut self, entry: Entry) -> Append {
        match self.newest_key() {
            Some(newest) if entry.key == *newest => Append::Echo,
            Some(newest) if entry.key < *newest => Append::OutOfOrder,
            _ => {
                self.entries.push_back(entry);
                Append::Appended
            }
        }
    }

    /// Drop every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys(window: &Window) -> Vec<String> {
        window.iter().map(|e| e.key.to_string()).collect()
    }

    fn page(keys: &[&str]) -> Vec<Entry> {
        keys.iter().map(|k| Entry::bare(*k)).collect()
    }

    // ===========================================
    // Front Splice Tests
    // ===========================================

    #[test]
    fn splice_into_empty_window() {
        let mut window = Window::new();
        let spliced = window.splice_front(page(&["k08", "k09", "k10"]), &Boundary::Open);

        assert_eq!(spliced.inserted, 3);
        assert_eq!(keys(&window), vec!["k08", "k09", "k10"]);
    }

    #[test]
    fn splice_drops_boundary_entry() {
        let mut window = Window::new();
        window.splice_front(page(&["k08", "k09", "k10"]), &Boundary::Open);

        let boundary = Boundary::Inclusive(Key::from("k08"));
        let spliced = window.splice_front(page(&["k05", "k06", "k07", "k08"]), &boundary);

        assert_eq!(spliced.inserted, 3);
        assert_eq!(spliced.echoed, 1);
        assert_eq!(
            keys(&window),
            vec!["k05", "k06", "k07", "k08", "k09", "k10"]
        );
    }

    #[test]
    fn splice_drops_entries_not_older_than_front() {
        let mut window = Window::new();
        window.splice_front(page(&["k05", "k06"]), &Boundary::Open);

        // Page captured against an empty window overlaps what is held now
        let spliced = window.splice_front(page(&["k03", "k04", "k05", "k06"]), &Boundary::Open);

        assert_eq!(spliced.inserted, 2);
        assert_eq!(spliced.overlapping, 2);
        assert_eq!(keys(&window), vec!["k03", "k04", "k05", "k06"]);
    }

    #[test]
    fn splice_skips_unordered_page_entries() {
        let mut window = Window::new();
        let spliced = window.splice_front(page(&["b", "a", "c", "c"]), &Boundary::Open);

        assert_eq!(spliced.inserted, 2);
        assert_eq!(spliced.overlapping, 2);
        assert_eq!(keys(&window), vec!["b", "c"]);
    }

    #[test]
    fn splice_empty_page_is_noop() {
        let mut window = Window::new();
        window.append(Entry::bare("a"));

        let spliced = window.splice_front(Vec::new(), &Boundary::Inclusive(Key::from("a")));

        assert_eq!(spliced, Spliced::default());
        assert_eq!(window.len(), 1);
    }

    // ===========================================
    // Tail Append Tests
    // ===========================================

    #[test]
    fn append_newer_entry() {
        let mut window = Window::new();
        assert_eq!(window.append(Entry::bare("a")), Append::Appended);
        assert_eq!(window.append(Entry::bare("b")), Append::Appended);
        assert_eq!(window.newest_key(), Some(&Key::from("b")));
    }

    #[test]
    fn append_echo_of_tail_is_ignored() {
        let mut window = Window::new();
        window.append(Entry::bare("a"));

        assert_eq!(window.append(Entry::bare("a")), Append::Echo);
        assert_eq!(window.len(), 1);
    }

    #[test]
    fn append_older_entry_is_refused() {
        let mut window = Window::new();
        window.append(Entry::bare("m"));

        assert_eq!(window.append(Entry::bare("c")), Append::OutOfOrder);
        assert_eq!(keys(&window), vec!["m"]);
    }

    // ===========================================
    // Accessor Tests
    // ===========================================

    #[test]
    fn positional_reads() {
        let mut window = Window::new();
        window.splice_front(page(&["a", "b", "c"]), &Boundary::Open);

        assert_eq!(window.get(0).map(|e| e.key.as_str()), Some("a"));
        assert_eq!(window.get(2).map(|e| e.key.as_str()), Some("c"));
        assert!(window.get(3).is_none());
        assert_eq!(window.oldest_key(), Some(&Key::from("a")));
        assert_eq!(window.newest_key(), Some(&Key::from("c")));
    }

    #[test]
    fn clear_empties_window() {
        let mut window = Window::new();
        window.splice_front(page(&["a", "b"]), &Boundary::Open);
        window.clear();

        assert!(window.is_empty());
        assert!(window.oldest_key().is_none());
        assert!(window.newest_key().is_none());
    }

    #[test]
    fn values_survive_splice() {
        let mut window = Window::new();
        let page = vec![Entry::new("a", serde_json::json!({"message": "hello"}))];
        window.splice_front(page, &Boundary::Open);

        assert_eq!(window.get(0).unwrap().value["message"], "hello");
    }
}
