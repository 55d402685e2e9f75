//! Row selection.

use std::collections::BTreeSet;

use crate::model::Row;
use crate::query::PageResult;

/// Header checkbox state for the rows on a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PageSelection {
    #[default]
    None,
    Partial,
    All,
}

/// Tracks selected rows by their identifiers.
///
/// Identifiers outlive the page they were selected on, so a row may stay
/// selected while a different page is displayed. Callers must [`clear`] the
/// set whenever the set of addressable rows changes (filter, search term or
/// page size).
///
/// [`clear`]: SelectionSet::clear
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionSet<K: Ord> {
    selected: BTreeSet<K>,
}

impl<K: Ord> Default for SelectionSet<K> {
    fn default() -> Self {
        Self {
            selected: BTreeSet::new(),
        }
    }
}

impl<K: Ord + Clone> SelectionSet<K> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flips membership of `id`. Returns whether it is now selected.
    pub fn toggle(&mut self, id: K) -> bool {
        if self.selected.remove(&id) {
            false
        } else {
            self.selected.insert(id);
            true
        }
    }

    /// Adds every row of `page`.
    pub fn select_page<T>(&mut self, page: &PageResult<T>)
    where
        T: Row<Id = K>,
    {
        self.selected.extend(page.ids());
    }

    /// Removes every row of `page`.
    pub fn deselect_page<T>(&mut self, page: &PageResult<T>)
    where
        T: Row<Id = K>,
    {
        for id in page.ids() {
            self.selected.remove(&id);
        }
    }

    pub fn clear(&mut self) {
        self.selected.clear();
    }

    pub fn contains(&self, id: &K) -> bool {
        self.selected.contains(id)
    }

    pub fn len(&self) -> usize {
        self.selected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    /// Selected identifiers in ascending order.
    pub fn ids(&self) -> Vec<K> {
        self.selected.iter().cloned().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &K> {
        self.selected.iter()
    }

    /// How many of `ids` are selected, as a header checkbox state.
    pub fn page_state<'a>(&self, ids: impl IntoIterator<Item = &'a K>) -> PageSelection
    where
        K: 'a,
    {
        let mut total = 0usize;
        let mut selected = 0usize;
        for id in ids {
            total += 1;
            if self.selected.contains(id) {
                selected += 1;
            }
        }
        match selected {
            0 => PageSelection::None,
            n if n == total => PageSelection::All,
            _ => PageSelection::Partial,
        }
    }

    /// Drops identifiers that are known to no longer exist.
    ///
    /// Never called implicitly: a page-local view cannot tell a deleted row
    /// from one on another page.
    pub fn prune(&mut self, gone: impl IntoIterator<Item = K>) -> usize {
        let before = self.selected.len();
        for id in gone {
            self.selected.remove(&id);
        }
        before - self.selected.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::QuerySpec;

    #[derive(Debug, Clone, PartialEq)]
    struct Item(u32);

    impl Row for Item {
        type Id = u32;

        fn id(&self) -> u32 {
            self.0
        }
    }

    fn page(ids: &[u32]) -> PageResult<Item> {
        PageResult::new(ids.iter().copied().map(Item).collect(), 100, QuerySpec::new(20))
    }

    #[test]
    fn test_toggle() {
        let mut selection = SelectionSet::new();
        assert!(selection.toggle(3));
        assert!(selection.contains(&3));
        assert!(!selection.toggle(3));
        assert!(selection.is_empty());
    }

    #[test]
    fn test_select_page_survives_navigation() {
        let mut selection = SelectionSet::new();
        selection.select_page(&page(&[1, 2, 3]));
        selection.select_page(&page(&[21, 22]));
        assert_eq!(selection.ids(), vec![1, 2, 3, 21, 22]);

        selection.deselect_page(&page(&[21, 22]));
        assert_eq!(selection.ids(), vec![1, 2, 3]);
    }

    #[test]
    fn test_ids_are_sorted() {
        let mut selection = SelectionSet::new();
        for id in [9, 2, 7, 1] {
            selection.toggle(id);
        }
        assert_eq!(selection.ids(), vec![1, 2, 7, 9]);
    }

    #[test]
    fn test_page_state() {
        let mut selection = SelectionSet::new();
        let ids = [1u32, 2, 3];
        assert_eq!(selection.page_state(&ids), PageSelection::None);
        selection.toggle(2);
        assert_eq!(selection.page_state(&ids), PageSelection::Partial);
        selection.select_page(&page(&ids));
        assert_eq!(selection.page_state(&ids), PageSelection::All);
        assert_eq!(selection.page_state(&[]), PageSelection::None);
    }

    #[test]
    fn test_prune() {
        let mut selection = SelectionSet::new();
        selection.select_page(&page(&[1, 2, 3]));
        assert_eq!(selection.prune([2, 8]), 1);
        assert_eq!(selection.ids(), vec![1, 3]);
    }
}
