//! Tag-path state tracking.
//!
//! Keeps the path of open elements plus the flags that tell the accumulator
//! how to read the next text or CDATA event: inside an item, inside a
//! post-meta block, and the scratch value of an open `<category>` element.
//! A flag is only ever set by its own open event and cleared by the
//! matching close, or by a close further up the path that ends it
//! implicitly.

use crate::record::CategoryInProgress;

pub const ITEM_TAG: &str = "item";
pub const POST_META_TAG: &str = "wp:postmeta";
pub const CATEGORY_TAG: &str = "category";

/// What a close event did to the tracker state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CloseEffect {
    /// The matching `</item>`: the in-progress record must be finalized.
    ItemClosed,
    /// The matching `</wp:postmeta>`: the pending key/value may be committed.
    PostMetaClosed,
    /// The matching `</category>`, with its scratch value.
    CategoryClosed(CategoryInProgress),
    /// A close further up the path implicitly closed the open `<item>`.
    /// The in-progress record never saw its own close and must be dropped.
    ItemAbandoned,
    /// Any other element closed normally.
    Element,
    /// No matching open element; the event was ignored.
    Stray,
}

/// Tracker state seen by a text or CDATA event.
#[derive(Debug)]
pub struct TagContext<'a> {
    /// Innermost open element.
    pub tag: Option<&'a str>,
    pub inside_item: bool,
    pub inside_post_meta: bool,
    /// Scratch value of the open `<category>` element.
    pub category: Option<&'a mut CategoryInProgress>,
}

/// State machine over open/close events.
#[derive(Debug, Default)]
pub struct TagPathTracker {
    path: Vec<String>,
    inside_item: bool,
    inside_post_meta: bool,
    active_category: Option<CategoryInProgress>,
}

impl TagPathTracker {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Innermost open element.
    #[must_use]
    pub fn current(&self) -> Option<&str> {
        self.path.last().map(String::as_str)
    }

    /// Nesting depth of open elements.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.path.len()
    }

    #[must_use]
    pub fn inside_item(&self) -> bool {
        self.inside_item
    }

    #[must_use]
    pub fn inside_post_meta(&self) -> bool {
        self.inside_post_meta
    }

    /// The open category element's scratch value, if any.
    pub fn active_category_mut(&mut self) -> Option<&mut CategoryInProgress> {
        self.active_category.as_mut()
    }

    /// Borrow everything a text or CDATA event needs at once.
    pub fn context_mut(&mut self) -> TagContext<'_> {
        TagContext {
            tag: self.path.last().map(String::as_str),
            inside_item: self.inside_item,
            inside_post_meta: self.inside_post_meta,
            category: self.active_category.as_mut(),
        }
    }

    /// Record an open event. Returns `true` when this open starts an item.
    ///
    /// A nested `<item>` while one is already open is not a new item: the
    /// export format never nests items, so the inner tag is tracked as a
    /// plain element.
    pub fn open(&mut self, name: &str, attributes: &[(String, String)]) -> bool {
        self.path.push(name.to_string());

        match name {
            ITEM_TAG if !self.inside_item => {
                self.inside_item = true;
                return true;
            }
            POST_META_TAG if self.inside_item => {
                self.inside_post_meta = true;
            }
            CATEGORY_TAG if self.inside_item => {
                self.active_category = Some(CategoryInProgress::from_attributes(attributes));
            }
            _ => {}
        }
        false
    }

    /// Record a close event.
    ///
    /// A close with no matching open is ignored. A close that matches an
    /// element further up the path also closes everything opened inside it.
    pub fn close(&mut self, name: &str) -> CloseEffect {
        let Some(position) = self.path.iter().rposition(|open| open == name) else {
            return CloseEffect::Stray;
        };

        // Unclosed children of the matched element are implicitly closed.
        let unclosed: Vec<String> = self.path.drain(position + 1..).collect();
        for child in unclosed.iter().rev() {
            self.clear_flags(child);
        }
        self.path.truncate(position);

        if self.inside_item && !self.path.iter().any(|open| open == ITEM_TAG) {
            self.reset_item_scope();
            return if name == ITEM_TAG {
                CloseEffect::ItemClosed
            } else {
                CloseEffect::ItemAbandoned
            };
        }

        match name {
            POST_META_TAG if self.inside_post_meta => {
                self.inside_post_meta = false;
                CloseEffect::PostMetaClosed
            }
            CATEGORY_TAG => match self.active_category.take() {
                Some(category) => CloseEffect::CategoryClosed(category),
                None => CloseEffect::Element,
            },
            _ => CloseEffect::Element,
        }
    }

    /// Drop all item-scoped state, e.g. when the stream ends mid-item.
    pub fn reset_item_scope(&mut self) {
        self.inside_item = false;
        self.inside_post_meta = false;
        self.active_category = None;
    }

    fn clear_flags(&mut self, name: &str) {
        match name {
            POST_META_TAG => self.inside_post_meta = false,
            CATEGORY_TAG => self.active_category = None,
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attrs(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[test]
    fn item_flag_follows_open_and_close() {
        let mut tracker = TagPathTracker::new();
        tracker.open("rss", &[]);
        tracker.open("channel", &[]);
        assert!(!tracker.inside_item());

        assert!(tracker.open("item", &[]));
        assert!(tracker.inside_item());
        assert_eq!(tracker.current(), Some("item"));

        tracker.open("title", &[]);
        assert_eq!(tracker.current(), Some("title"));
        assert_eq!(tracker.close("title"), CloseEffect::Element);

        assert_eq!(tracker.close("item"), CloseEffect::ItemClosed);
        assert!(!tracker.inside_item());
        assert_eq!(tracker.current(), Some("channel"));
    }

    #[test]
    fn stray_item_close_is_ignored() {
        let mut tracker = TagPathTracker::new();
        tracker.open("channel", &[]);
        assert_eq!(tracker.close("item"), CloseEffect::Stray);
        assert!(!tracker.inside_item());
        assert_eq!(tracker.depth(), 1);
    }

    #[test]
    fn post_meta_flag_only_inside_item() {
        let mut tracker = TagPathTracker::new();
        tracker.open("wp:postmeta", &[]);
        assert!(!tracker.inside_post_meta());
        tracker.close("wp:postmeta");

        tracker.open("item", &[]);
        tracker.open("wp:postmeta", &[]);
        assert!(tracker.inside_post_meta());
        assert_eq!(tracker.close("wp:postmeta"), CloseEffect::PostMetaClosed);
        assert!(!tracker.inside_post_meta());
    }

    #[test]
    fn category_scratch_is_returned_on_close() {
        let mut tracker = TagPathTracker::new();
        tracker.open("item", &[]);
        tracker.open("category", &attrs(&[("domain", "category"), ("nicename", "news")]));
        tracker.active_category_mut().unwrap().name = "News".into();

        match tracker.close("category") {
            CloseEffect::CategoryClosed(category) => {
                assert_eq!(category.domain, "category");
                assert_eq!(category.nice_name_hint, "news");
                assert_eq!(category.name, "News");
            }
            other => panic!("unexpected {other:?}"),
        }
        assert!(tracker.active_category_mut().is_none());
    }

    #[test]
    fn channel_level_category_has_no_scratch() {
        let mut tracker = TagPathTracker::new();
        tracker.open("channel", &[]);
        tracker.open("category", &[]);
        assert!(tracker.active_category_mut().is_none());
        assert_eq!(tracker.close("category"), CloseEffect::Element);
    }

    #[test]
    fn closing_item_closes_unclosed_children() {
        let mut tracker = TagPathTracker::new();
        tracker.open("item", &[]);
        tracker.open("wp:postmeta", &[]);
        tracker.open("wp:meta_key", &[]);

        assert_eq!(tracker.close("item"), CloseEffect::ItemClosed);
        assert!(!tracker.inside_post_meta());
        assert_eq!(tracker.depth(), 0);
    }

    #[test]
    fn ancestor_close_abandons_open_item() {
        let mut tracker = TagPathTracker::new();
        tracker.open("rss", &[]);
        tracker.open("channel", &[]);
        assert!(tracker.open("item", &[]));
        tracker.open("wp:postmeta", &[]);

        assert_eq!(tracker.close("channel"), CloseEffect::ItemAbandoned);
        assert!(!tracker.inside_item());
        assert!(!tracker.inside_post_meta());
        assert_eq!(tracker.depth(), 1);

        assert!(tracker.open("item", &[]));
        assert_eq!(tracker.close("item"), CloseEffect::ItemClosed);
    }

    #[test]
    fn nested_item_does_not_restart() {
        let mut tracker = TagPathTracker::new();
        assert!(tracker.open("item", &[]));
        assert!(!tracker.open("item", &[]));
        assert_eq!(tracker.close("item"), CloseEffect::Element);
        assert!(tracker.inside_item());
        assert_eq!(tracker.close("item"), CloseEffect::ItemClosed);
    }
}
