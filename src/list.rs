//! The interactive list: items, filtered view, scroll window and selection.
//!
//! Index 0 is the newest item and is drawn at the top. Selection is tracked
//! both by position and by [`ItemId`], so a refresh that inserts or removes
//! items keeps the same story highlighted as long as it still exists.

use crate::feed::{Item, ItemId};

/// What the filter line is doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListMode {
    /// No filter.
    Browsing,
    /// The user is typing a filter; every keystroke re-filters.
    FilterEditing,
    /// A committed, non-empty filter is applied.
    FilterActive,
}

/// Single-owner list state. Every operation clamps its inputs, so none of
/// them fail.
///
/// Invariants after every public call:
/// - `selection_index < filtered_len()` whenever the filtered view is non-empty,
///   and `None` when it is empty
/// - `scroll_offset <= selection_index < scroll_offset + visible_count`
#[derive(Debug)]
pub struct ListController {
    items: Vec<Item>,
    /// Indices into `items`, in order.
    filtered: Vec<usize>,
    filter: String,
    mode: ListMode,
    selected_id: Option<ItemId>,
    selection: Option<usize>,
    scroll_offset: usize,
    visible_count: usize,
}

impl Default for ListController {
    fn default() -> Self {
        Self::new()
    }
}

impl ListController {
    pub fn new() -> Self {
        Self {
            items: Vec::new(),
            filtered: Vec::new(),
            filter: String::new(),
            mode: ListMode::Browsing,
            selected_id: None,
            selection: None,
            scroll_offset: 0,
            visible_count: 1,
        }
    }

    // ========================================================================
    // Operations
    // ========================================================================

    /// Replaces the item set with a fresh snapshot.
    ///
    /// The filter stays as it is. The previously selected item is looked up
    /// by ID in the new view; if it's gone the first item is selected.
    pub fn ingest(&mut self, items: Vec<Item>) {
        self.items = items;
        self.recompute_filtered();
        self.resolve_selection();
        self.clamp_scroll();
    }

    /// Applies `text` as the filter.
    ///
    /// `editing` selects [`ListMode::FilterEditing`]; otherwise an empty
    /// `text` means [`ListMode::Browsing`] and anything else
    /// [`ListMode::FilterActive`]. Matching is a case-insensitive substring
    /// search over title, description, source name and URL.
    pub fn set_filter(&mut self, text: &str, editing: bool) {
        self.mode = if editing {
            ListMode::FilterEditing
        } else if text.is_empty() {
            ListMode::Browsing
        } else {
            ListMode::FilterActive
        };
        self.filter = text.to_string();

        let before = self.filtered.len();
        self.recompute_filtered();

        match self.selection {
            Some(index) if self.filtered.len() == before => {
                self.selected_id = Some(self.items[self.filtered[index]].id.clone());
            }
            _ => self.resolve_selection(),
        }
        self.clamp_scroll();
    }

    /// Moves the selection by `delta` positions; positive moves toward the
    /// end of the list (older items).
    ///
    /// With `force`, a forward move from inside the first page first jumps to
    /// the first index past it, and a backward move from inside the last page
    /// first jumps to just before it, so the viewport actually scrolls.
    pub fn move_selection(&mut self, delta: isize, force: bool) {
        let len = self.filtered.len();
        if len == 0 {
            self.clear_selection();
            return;
        }

        let len = len as isize;
        let visible = self.visible_count as isize;
        let mut to = self.selection.unwrap_or(0) as isize;

        if force {
            if delta > 0 && to < visible {
                to = visible;
            }
            if delta < 0 && to >= len - visible {
                to = len - visible - 1;
            }
        }

        let to = to.saturating_add(delta).clamp(0, len - 1) as usize;
        self.select(to);
    }

    /// The item under the selection, if any.
    pub fn selected_item(&self) -> Option<&Item> {
        self.selection
            .and_then(|index| self.filtered.get(index))
            .map(|&i| &self.items[i])
    }

    /// Sets how many items fit in the viewport (at least one).
    pub fn set_visible_count(&mut self, count: usize) {
        self.visible_count = count.max(1);
        self.clamp_scroll();
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn filtered_len(&self) -> usize {
        self.filtered.len()
    }

    /// The filtered view in order.
    pub fn filtered_items(&self) -> impl Iterator<Item = &Item> {
        self.filtered.iter().map(|&i| &self.items[i])
    }

    /// Items inside the scroll window, paired with their filtered index.
    pub fn visible_items(&self) -> impl Iterator<Item = (usize, &Item)> {
        self.filtered
            .iter()
            .enumerate()
            .skip(self.scroll_offset)
            .take(self.visible_count)
            .map(|(index, &i)| (index, &self.items[i]))
    }

    pub fn filter(&self) -> &str {
        &self.filter
    }

    pub fn mode(&self) -> ListMode {
        self.mode
    }

    pub fn selection_index(&self) -> Option<usize> {
        self.selection
    }

    pub fn selected_id(&self) -> Option<&ItemId> {
        self.selected_id.as_ref()
    }

    pub fn scroll_offset(&self) -> usize {
        self.scroll_offset
    }

    pub fn visible_count(&self) -> usize {
        self.visible_count
    }

    // ========================================================================
    // Internals
    // ========================================================================

    fn recompute_filtered(&mut self) {
        let needle = self.filter.to_lowercase();
        self.filtered = self
            .items
            .iter()
            .enumerate()
            .filter(|(_, item)| item.matches(&needle))
            .map(|(i, _)| i)
            .collect();
    }

    /// Re-finds the selected ID in the filtered view, falling back to the
    /// first item.
    fn resolve_selection(&mut self) {
        if self.filtered.is_empty() {
            self.clear_selection();
            return;
        }

        let found = self.selected_id.as_ref().and_then(|id| {
            self.filtered
                .iter()
                .position(|&i| &self.items[i].id == id)
        });
        self.select(found.unwrap_or(0));
    }

    fn select(&mut self, index: usize) {
        self.selection = Some(index);
        self.selected_id = Some(self.items[self.filtered[index]].id.clone());
        self.clamp_scroll();
    }

    fn clear_selection(&mut self) {
        self.selection = None;
        self.selected_id = None;
        self.scroll_offset = 0;
    }

    fn clamp_scroll(&mut self) {
        let Some(index) = self.selection else {
            self.scroll_offset = 0;
            return;
        };
        if index < self.scroll_offset {
            self.scroll_offset = index;
        } else if index >= self.scroll_offset + self.visible_count {
            self.scroll_offset = index + 1 - self.visible_count;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::Source;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn item(n: usize) -> Item {
        let url = format!("https://example.com/{}", n);
        Item {
            id: ItemId::from_url(&url),
            source: Source::new(if n % 2 == 0 { "Even" } else { "Odd" }, "https://e.x/rss"),
            title: format!("Story number {}", n),
            description: url.clone(),
            url,
            image_url: None,
            published: None,
        }
    }

    fn items(range: std::ops::Range<usize>) -> Vec<Item> {
        range.map(item).collect()
    }

    fn controller(n: usize, visible: usize) -> ListController {
        let mut list = ListController::new();
        list.set_visible_count(visible);
        list.ingest(items(0..n));
        list
    }

    #[test]
    fn test_empty_list_has_no_selection() {
        let mut list = ListController::new();
        list.ingest(Vec::new());
        assert_eq!(list.selection_index(), None);
        assert!(list.selected_item().is_none());
        list.move_selection(3, false);
        assert_eq!(list.selection_index(), None);
    }

    #[test]
    fn test_ingest_selects_first_item() {
        let list = controller(5, 3);
        assert_eq!(list.selection_index(), Some(0));
        assert_eq!(list.selected_id(), Some(&item(0).id));
    }

    #[test]
    fn test_move_by_one_and_clamp() {
        let mut list = controller(5, 3);
        list.move_selection(1, false);
        assert_eq!(list.selection_index(), Some(1));
        list.move_selection(-10, false);
        assert_eq!(list.selection_index(), Some(0));
        list.move_selection(100, false);
        assert_eq!(list.selection_index(), Some(4));
        assert_eq!(list.selected_item().unwrap().url, "https://example.com/4");
    }

    #[test]
    fn test_scroll_follows_selection() {
        let mut list = controller(10, 3);
        list.move_selection(3, false);
        assert_eq!(list.selection_index(), Some(3));
        assert_eq!(list.scroll_offset(), 1);

        list.move_selection(5, false);
        assert_eq!(list.scroll_offset(), 6);

        // Moving back inside the window leaves the offset alone
        list.move_selection(-1, false);
        assert_eq!(list.scroll_offset(), 6);

        list.move_selection(-7, false);
        assert_eq!(list.selection_index(), Some(0));
        assert_eq!(list.scroll_offset(), 0);
    }

    #[test]
    fn test_force_skips_first_page() {
        let mut list = controller(20, 5);
        list.move_selection(1, true);
        assert_eq!(list.selection_index(), Some(6));
        assert_eq!(list.scroll_offset(), 2);
    }

    #[test]
    fn test_force_backward_from_last_page() {
        let mut list = controller(20, 5);
        list.move_selection(100, false);
        assert_eq!(list.selection_index(), Some(19));
        list.move_selection(-1, true);
        // Jumps to len - visible - 1 = 14, then one more step back
        assert_eq!(list.selection_index(), Some(13));
        assert_eq!(list.scroll_offset(), 13);
    }

    #[test]
    fn test_force_outside_boundary_pages_is_plain_move() {
        let mut list = controller(20, 5);
        list.move_selection(8, false);
        list.move_selection(1, true);
        assert_eq!(list.selection_index(), Some(9));
    }

    #[test]
    fn test_selection_stable_across_ingest() {
        let mut list = controller(5, 10);
        list.move_selection(2, false);
        let selected = list.selected_id().cloned();

        // Two newer items arrive at the front
        let mut fresh = vec![item(100), item(101)];
        fresh.extend(items(0..5));
        list.ingest(fresh);

        assert_eq!(list.selected_id().cloned(), selected);
        assert_eq!(list.selection_index(), Some(4));
    }

    #[test]
    fn test_selection_degrades_to_first_when_removed() {
        let mut list = controller(5, 10);
        list.move_selection(2, false);

        list.ingest(vec![item(7), item(8)]);
        assert_eq!(list.selection_index(), Some(0));
        assert_eq!(list.selected_id(), Some(&item(7).id));

        list.ingest(Vec::new());
        assert_eq!(list.selection_index(), None);
        assert_eq!(list.selected_id(), None);
    }

    #[test]
    fn test_ingest_shrink_reclamps_offset() {
        let mut list = controller(30, 5);
        list.move_selection(25, false);
        assert_eq!(list.scroll_offset(), 21);

        list.ingest(items(0..3));
        assert_eq!(list.selection_index(), Some(0));
        assert_eq!(list.scroll_offset(), 0);
    }

    #[test]
    fn test_filter_modes() {
        let mut list = controller(4, 10);
        assert_eq!(list.mode(), ListMode::Browsing);

        list.set_filter("", true);
        assert_eq!(list.mode(), ListMode::FilterEditing);
        assert_eq!(list.filtered_len(), 4);

        list.set_filter("odd", true);
        assert_eq!(list.mode(), ListMode::FilterEditing);

        list.set_filter("odd", false);
        assert_eq!(list.mode(), ListMode::FilterActive);
        assert_eq!(list.filter(), "odd");

        list.set_filter("", false);
        assert_eq!(list.mode(), ListMode::Browsing);
        assert_eq!(list.filtered_len(), 4);
    }

    #[test]
    fn test_filter_is_case_insensitive_and_ordered() {
        let mut list = controller(6, 10);
        list.set_filter("ODD", false);
        let urls: Vec<&str> = list.filtered_items().map(|i| i.url.as_str()).collect();
        assert_eq!(
            urls,
            vec![
                "https://example.com/1",
                "https://example.com/3",
                "https://example.com/5"
            ]
        );
    }

    #[test]
    fn test_filter_keeps_selected_item_when_it_matches() {
        let mut list = controller(6, 10);
        list.move_selection(3, false);
        list.set_filter("odd", false);
        assert_eq!(list.selected_item().unwrap().url, "https://example.com/3");
        assert_eq!(list.selection_index(), Some(1));

        list.set_filter("", false);
        assert_eq!(list.selection_index(), Some(3));
    }

    #[test]
    fn test_filter_same_size_keeps_index_and_resyncs_id() {
        let mut list = controller(6, 10);
        list.move_selection(1, false);
        list.set_filter("odd", false);
        assert_eq!(list.selection_index(), Some(0));

        // "even" yields the same count, so the index is kept
        list.set_filter("even", false);
        assert_eq!(list.selection_index(), Some(0));
        assert_eq!(list.selected_id(), Some(&item(0).id));
    }

    #[test]
    fn test_filter_with_no_matches_clears_selection() {
        let mut list = controller(6, 10);
        list.set_filter("nothing matches this", false);
        assert_eq!(list.filtered_len(), 0);
        assert_eq!(list.selection_index(), None);
        assert!(list.visible_items().next().is_none());

        list.set_filter("", false);
        assert_eq!(list.selection_index(), Some(0));
    }

    #[test]
    fn test_visible_items_window() {
        let mut list = controller(10, 3);
        list.move_selection(5, false);
        let window: Vec<usize> = list.visible_items().map(|(i, _)| i).collect();
        assert_eq!(window, vec![3, 4, 5]);
    }

    #[test]
    fn test_resize_reclamps_offset() {
        let mut list = controller(10, 5);
        list.move_selection(7, false);
        assert_eq!(list.scroll_offset(), 3);
        list.set_visible_count(2);
        assert_eq!(list.scroll_offset(), 6);
        list.set_visible_count(0);
        assert_eq!(list.visible_count(), 1);
        assert_eq!(list.scroll_offset(), 7);
    }

    #[derive(Debug, Clone)]
    enum Op {
        Move(isize, bool),
        Filter(String, bool),
        Ingest(Vec<usize>),
        Resize(usize),
    }

    fn op() -> impl Strategy<Value = Op> {
        prop_oneof![
            (-30isize..30, any::<bool>()).prop_map(|(d, f)| Op::Move(d, f)),
            ("[0-9odev]{0,3}", any::<bool>()).prop_map(|(s, e)| Op::Filter(s, e)),
            prop::collection::vec(0usize..40, 0..25).prop_map(Op::Ingest),
            (0usize..12).prop_map(Op::Resize),
        ]
    }

    fn check_invariants(list: &ListController) -> Result<(), TestCaseError> {
        let len = list.filtered_len();
        match list.selection_index() {
            None => prop_assert_eq!(len, 0),
            Some(index) => {
                prop_assert!(index < len);
                prop_assert!(list.scroll_offset() <= index);
                prop_assert!(index < list.scroll_offset() + list.visible_count());
                prop_assert_eq!(
                    list.selected_id(),
                    list.selected_item().map(|i| &i.id)
                );
            }
        }

        let needle = list.filter().to_lowercase();
        let expected: Vec<&ItemId> = list
            .items()
            .iter()
            .filter(|i| i.matches(&needle))
            .map(|i| &i.id)
            .collect();
        let actual: Vec<&ItemId> = list.filtered_items().map(|i| &i.id).collect();
        prop_assert_eq!(actual, expected);
        Ok(())
    }

    proptest! {
        #[test]
        fn prop_invariants_hold(ops in prop::collection::vec(op(), 1..40)) {
            let mut list = ListController::new();
            for op in ops {
                match op {
                    Op::Move(delta, force) => list.move_selection(delta, force),
                    Op::Filter(text, editing) => list.set_filter(&text, editing),
                    Op::Ingest(ns) => {
                        let mut ns = ns;
                        ns.sort_unstable();
                        ns.dedup();
                        list.ingest(ns.into_iter().map(item).collect());
                    }
                    Op::Resize(n) => list.set_visible_count(n),
                }
                check_invariants(&list)?;
            }
        }

        #[test]
        fn prop_selection_survives_superset_ingest(
            n in 1usize..30,
            pick in 0usize..30,
            extra in prop::collection::vec(100usize..200, 0..10),
        ) {
            let mut list = ListController::new();
            list.set_visible_count(5);
            list.ingest(items(0..n));
            list.move_selection((pick % n) as isize, false);
            let selected = list.selected_id().cloned();

            let mut extra = extra;
            extra.sort_unstable();
            extra.dedup();
            let mut fresh: Vec<Item> = extra.into_iter().map(item).collect();
            fresh.extend(items(0..n));
            list.ingest(fresh);

            prop_assert_eq!(list.selected_id().cloned(), selected);
        }
    }
}
