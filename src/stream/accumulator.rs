//! Post accumulation.
//!
//! Builds one [`RawPostRecord`] from the text and CDATA events of an item
//! span. Body fields concatenate every fragment, since exporters split long
//! CDATA sections. Other scalar fields keep their first non-empty value.
//! Post-meta pairs and categories are committed only when their element
//! closes.

use tracing::trace;

use super::tracker::{TagContext, CATEGORY_TAG};
use crate::record::{CategoryInProgress, CategoryKind, PostField, RawPostRecord};

const META_KEY_TAG: &str = "wp:meta_key";
const META_VALUE_TAG: &str = "wp:meta_value";

/// Text and CDATA are routed identically except for category names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Delivery {
    Text,
    CData,
}

/// Builder for the record of the currently open item.
#[derive(Debug, Default)]
pub struct PostAccumulator {
    record: Option<RawPostRecord>,
    meta_key: String,
    meta_value: String,
}

impl PostAccumulator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a fresh record for a new item span.
    pub fn begin(&mut self) {
        self.record = Some(RawPostRecord::default());
        self.clear_meta();
    }

    /// The record being built, if an item is open.
    #[must_use]
    pub fn record(&self) -> Option<&RawPostRecord> {
        self.record.as_ref()
    }

    /// Handle a text node.
    pub fn on_text(&mut self, context: TagContext<'_>, value: &str) {
        self.deliver(context, value, Delivery::Text);
    }

    /// Handle a CDATA section.
    pub fn on_cdata(&mut self, context: TagContext<'_>, value: &str) {
        self.deliver(context, value, Delivery::CData);
    }

    fn deliver(&mut self, context: TagContext<'_>, value: &str, delivery: Delivery) {
        if !context.inside_item {
            return;
        }
        let Some(record) = self.record.as_mut() else {
            return;
        };
        let Some(tag) = context.tag else {
            return;
        };

        if tag == CATEGORY_TAG {
            match context.category {
                // The later delivery wins: some exporters send a placeholder
                // text node ahead of the real CDATA payload.
                Some(category) if !value.trim().is_empty() => {
                    category.name = value.trim().to_string();
                }
                Some(_) => {}
                // Defensive: CDATA with no open category scratch (out-of-order
                // events) is dropped rather than attached to an earlier element.
                None => trace!(?delivery, "dropping category payload without an open category"),
            }
            return;
        }

        if context.inside_post_meta {
            match tag {
                META_KEY_TAG => {
                    if self.meta_key.is_empty() {
                        value.trim().clone_into(&mut self.meta_key);
                    }
                }
                META_VALUE_TAG => self.meta_value.push_str(value),
                _ => {}
            }
            return;
        }

        let Some(field) = PostField::from_tag(tag) else {
            return;
        };
        let slot = field.slot(record);
        if field.appends() {
            slot.push_str(value);
        } else if slot.is_empty() && !value.trim().is_empty() {
            value.trim().clone_into(slot);
        }
    }

    /// Commit the pending post-meta pair at `</wp:postmeta>`.
    ///
    /// A pair missing its key or its value is dropped.
    pub fn commit_post_meta(&mut self) {
        let key = std::mem::take(&mut self.meta_key);
        let value = std::mem::take(&mut self.meta_value);
        let Some(record) = self.record.as_mut() else {
            return;
        };
        if key.is_empty() || value.trim().is_empty() {
            trace!(%key, "dropping incomplete post meta pair");
            return;
        }
        record.custom_fields.insert(key, value);
    }

    /// Route a finished category element into categories or tags.
    pub fn commit_category(&mut self, category: CategoryInProgress) {
        let Some(record) = self.record.as_mut() else {
            return;
        };
        if category.name.is_empty() {
            return;
        }
        match category.kind() {
            Some(CategoryKind::Category) => record.categories.push(category.name),
            Some(CategoryKind::Tag) => record.tags.push(category.name),
            None => trace!(domain = %category.domain, "ignoring category with unknown domain"),
        }
    }

    /// Take the finished record at `</item>`.
    pub fn finish(&mut self) -> Option<RawPostRecord> {
        self.clear_meta();
        self.record.take()
    }

    /// Drop the in-progress record without emitting it.
    pub fn discard(&mut self) {
        self.clear_meta();
        self.record = None;
    }

    fn clear_meta(&mut self) {
        self.meta_key.clear();
        self.meta_value.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stream::tracker::TagPathTracker;

    struct Harness {
        tracker: TagPathTracker,
        acc: PostAccumulator,
    }

    impl Harness {
        fn new() -> Self {
            let mut harness = Self {
                tracker: TagPathTracker::new(),
                acc: PostAccumulator::new(),
            };
            harness.tracker.open("item", &[]);
            harness.acc.begin();
            harness
        }

        fn open(&mut self, tag: &str, attrs: &[(&str, &str)]) {
            let attrs: Vec<(String, String)> = attrs
                .iter()
                .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
                .collect();
            self.tracker.open(tag, &attrs);
        }

        fn text(&mut self, value: &str) {
            self.acc.on_text(self.tracker.context_mut(), value);
        }

        fn cdata(&mut self, value: &str) {
            self.acc.on_cdata(self.tracker.context_mut(), value);
        }

        fn close(&mut self, tag: &str) {
            use crate::stream::tracker::CloseEffect;
            match self.tracker.close(tag) {
                CloseEffect::PostMetaClosed => self.acc.commit_post_meta(),
                CloseEffect::CategoryClosed(category) => self.acc.commit_category(category),
                _ => {}
            }
        }

        fn element(&mut self, tag: &str, value: &str) {
            self.open(tag, &[]);
            self.text(value);
            self.close(tag);
        }

        fn record(&self) -> &RawPostRecord {
            self.acc.record().unwrap()
        }
    }

    #[test]
    fn body_cdata_fragments_concatenate() {
        let mut h = Harness::new();
        h.open("content:encoded", &[]);
        h.cdata("<p>A</p>");
        h.cdata("<p>B</p>");
        h.close("content:encoded");
        assert_eq!(h.record().html_body, "<p>A</p><p>B</p>");
    }

    #[test]
    fn scalar_fields_keep_first_non_empty_value() {
        let mut h = Harness::new();
        h.open("title", &[]);
        h.text("  ");
        h.cdata("First");
        h.text("Second");
        h.close("title");
        assert_eq!(h.record().title, "First");

        h.element("wp:status", "draft");
        h.element("wp:status", "publish");
        assert_eq!(h.record().status, "draft");
    }

    #[test]
    fn fields_map_from_wxr_names() {
        let mut h = Harness::new();
        h.element("dc:creator", "admin");
        h.element("wp:post_date", "2024-03-05 10:00:00");
        h.element("wp:post_name", "hello-world");
        h.element("wp:post_type", "page");
        h.element("link", "https://example.com/hello-world/");
        h.element("excerpt:encoded", "Short");
        h.element("wp:post_id", "42");

        let post = h.record();
        assert_eq!(post.author, "admin");
        assert_eq!(post.published_at, "2024-03-05 10:00:00");
        assert_eq!(post.slug_hint, "hello-world");
        assert_eq!(post.post_type, "page");
        assert_eq!(post.permalink, "https://example.com/hello-world/");
        assert_eq!(post.excerpt, "Short");
        assert_eq!(post.source_id, "42");
    }

    #[test]
    fn post_meta_committed_on_close() {
        let mut h = Harness::new();
        h.open("wp:postmeta", &[]);
        h.element("wp:meta_key", "_thumbnail_id");
        h.open("wp:meta_value", &[]);
        h.cdata("17");
        h.close("wp:meta_value");
        assert!(h.record().custom_fields.is_empty());
        h.close("wp:postmeta");
        assert_eq!(h.record().custom_fields.get("_thumbnail_id").map(String::as_str), Some("17"));
    }

    #[test]
    fn incomplete_post_meta_is_dropped() {
        let mut h = Harness::new();
        h.open("wp:postmeta", &[]);
        h.element("wp:meta_key", "orphan");
        h.close("wp:postmeta");
        assert!(h.record().custom_fields.is_empty());

        // The dropped key must not leak into the next pair.
        h.open("wp:postmeta", &[]);
        h.element("wp:meta_key", "views");
        h.element("wp:meta_value", "9");
        h.close("wp:postmeta");
        assert_eq!(h.record().custom_fields.len(), 1);
        assert_eq!(h.record().custom_fields["views"], "9");
    }

    #[test]
    fn duplicate_meta_key_last_value_wins() {
        let mut h = Harness::new();
        for value in ["1", "2"] {
            h.open("wp:postmeta", &[]);
            h.element("wp:meta_key", "k");
            h.element("wp:meta_value", value);
            h.close("wp:postmeta");
        }
        assert_eq!(h.record().custom_fields["k"], "2");
    }

    #[test]
    fn meta_keys_outside_post_meta_are_ignored() {
        let mut h = Harness::new();
        h.open("wp:comment", &[]);
        h.open("wp:commentmeta", &[]);
        h.element("wp:meta_key", "akismet_result");
        h.element("wp:meta_value", "false");
        h.close("wp:commentmeta");
        h.close("wp:comment");
        assert!(h.record().custom_fields.is_empty());
    }

    #[test]
    fn categories_and_tags_route_by_domain() {
        let mut h = Harness::new();
        h.open("category", &[("domain", "category"), ("nicename", "news")]);
        h.cdata("News");
        h.close("category");
        h.open("category", &[("domain", "post_tag"), ("nicename", "rust")]);
        h.cdata("Rust");
        h.close("category");
        h.open("category", &[("domain", "post_format"), ("nicename", "post-format-video")]);
        h.cdata("Video");
        h.close("category");

        assert_eq!(h.record().categories, vec!["News"]);
        assert_eq!(h.record().tags, vec!["Rust"]);
    }

    #[test]
    fn category_cdata_overwrites_placeholder_text() {
        let mut h = Harness::new();
        h.open("category", &[("domain", "category")]);
        h.text("placeholder");
        h.cdata("Real Name");
        h.close("category");
        assert_eq!(h.record().categories, vec!["Real Name"]);
    }

    #[test]
    fn category_without_name_is_dropped() {
        let mut h = Harness::new();
        h.open("category", &[("domain", "post_tag")]);
        h.close("category");
        assert!(h.record().tags.is_empty());
    }

    #[test]
    fn finish_takes_the_record() {
        let mut h = Harness::new();
        h.element("title", "Done");
        let record = h.acc.finish().unwrap();
        assert_eq!(record.title, "Done");
        assert!(h.acc.record().is_none());
    }
}
