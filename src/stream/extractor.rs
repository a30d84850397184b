//! Incremental post extraction.
//!
//! [`PostExtractor`] owns one stream's tracker, accumulator and counters and
//! exposes the per-event callback contract: `open`, `text`, `cdata`,
//! `close`, `end` and `error`. A transport can drive it from any streaming
//! XML source. Each well-formed item span is finalized exactly once, at its
//! closing tag, and yields an [`ItemOutcome`].

use tracing::{debug, trace, warn};

use super::accumulator::PostAccumulator;
use super::source::XmlEvent;
use super::tracker::{CloseEffect, TagPathTracker};
use crate::decision::decide;
use crate::error::Error;
use crate::options::FilteringOptions;
use crate::record::RawPostRecord;
use crate::result::{QualityMetrics, SkippedPost};

/// A post that passed the filter.
#[derive(Debug, Clone, PartialEq)]
pub struct AcceptedPost {
    pub record: RawPostRecord,
    /// `None` when filtering is disabled.
    pub metrics: Option<QualityMetrics>,
}

/// What happened to a finalized item span.
#[derive(Debug, Clone, PartialEq)]
pub enum ItemOutcome {
    /// Complete and accepted; ready for rendering and storage.
    Accepted(Box<AcceptedPost>),
    /// Complete but rejected by the filter.
    Skipped(SkippedPost),
    /// Missing a title or body; discarded.
    Incomplete,
}

/// Counters for one stream.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExtractorStats {
    /// Item spans finalized, whatever their outcome.
    pub processed: u64,
    pub accepted: u64,
    pub skipped: u64,
    pub incomplete: u64,
    /// Stray close events that were ignored, plus items abandoned by a
    /// close further up the path.
    pub malformed_events: u64,
}

/// Per-stream extraction state machine.
#[derive(Debug)]
pub struct PostExtractor {
    options: FilteringOptions,
    tracker: TagPathTracker,
    accumulator: PostAccumulator,
    stats: ExtractorStats,
}

impl PostExtractor {
    #[must_use]
    pub fn new(options: FilteringOptions) -> Self {
        Self {
            options,
            tracker: TagPathTracker::new(),
            accumulator: PostAccumulator::new(),
            stats: ExtractorStats::default(),
        }
    }

    #[must_use]
    pub fn stats(&self) -> ExtractorStats {
        self.stats
    }

    #[must_use]
    pub fn options(&self) -> &FilteringOptions {
        &self.options
    }

    /// Dispatch one event to the matching callback.
    pub fn feed(&mut self, event: XmlEvent) -> Option<ItemOutcome> {
        match event {
            XmlEvent::Open { name, attributes } => {
                self.open(&name, &attributes);
                None
            }
            XmlEvent::Text(value) => {
                self.text(&value);
                None
            }
            XmlEvent::CData(value) => {
                self.cdata(&value);
                None
            }
            XmlEvent::Close(name) => self.close(&name),
        }
    }

    /// Element start.
    pub fn open(&mut self, name: &str, attributes: &[(String, String)]) {
        if self.tracker.open(name, attributes) {
            self.accumulator.begin();
        }
    }

    /// Character data inside the current element.
    pub fn text(&mut self, value: &str) {
        self.accumulator.on_text(self.tracker.context_mut(), value);
    }

    /// CDATA section inside the current element.
    pub fn cdata(&mut self, value: &str) {
        self.accumulator.on_cdata(self.tracker.context_mut(), value);
    }

    /// Element end. Returns the outcome when this closes an item span.
    pub fn close(&mut self, name: &str) -> Option<ItemOutcome> {
        match self.tracker.close(name) {
            CloseEffect::ItemClosed => Some(self.finalize()),
            CloseEffect::PostMetaClosed => {
                self.accumulator.commit_post_meta();
                None
            }
            CloseEffect::CategoryClosed(category) => {
                self.accumulator.commit_category(category);
                None
            }
            CloseEffect::ItemAbandoned => {
                self.stats.malformed_events += 1;
                debug!(element = name, "close implicitly ended an item; discarding partial post");
                self.accumulator.discard();
                None
            }
            CloseEffect::Element => None,
            CloseEffect::Stray => {
                self.stats.malformed_events += 1;
                trace!(element = name, "ignoring close without matching open");
                None
            }
        }
    }

    /// End of stream. An item still open is discarded without being
    /// counted.
    pub fn end(&mut self) -> ExtractorStats {
        if self.tracker.inside_item() {
            debug!("stream ended inside an item; discarding partial post");
            self.accumulator.discard();
            self.tracker.reset_item_scope();
        }
        self.stats
    }

    /// The source failed. Any partial item is discarded and the cause is
    /// handed back for propagation.
    pub fn error(&mut self, cause: Error) -> Error {
        warn!(error = %cause, "export stream failed");
        self.accumulator.discard();
        self.tracker.reset_item_scope();
        cause
    }

    fn finalize(&mut self) -> ItemOutcome {
        self.stats.processed += 1;

        let Some(record) = self.accumulator.finish() else {
            self.stats.incomplete += 1;
            return ItemOutcome::Incomplete;
        };
        if !record.is_complete() {
            self.stats.incomplete += 1;
            trace!(title = %record.title, "discarding item without title or body");
            return ItemOutcome::Incomplete;
        }

        let decision = decide(&record, record.body(), &self.options);
        if decision.accept {
            self.stats.accepted += 1;
            ItemOutcome::Accepted(Box::new(AcceptedPost {
                record,
                metrics: decision.metrics,
            }))
        } else {
            self.stats.skipped += 1;
            let reason = decision.skip_reason.unwrap_or_default();
            debug!(title = %record.title, %reason, "skipping post");
            ItemOutcome::Skipped(SkippedPost {
                title: record.title,
                reason,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(extractor: &mut PostExtractor, events: Vec<XmlEvent>) -> Vec<ItemOutcome> {
        events.into_iter().filter_map(|e| extractor.feed(e)).collect()
    }

    fn item(title: &str, body_fragments: &[&str], extra: Vec<XmlEvent>) -> Vec<XmlEvent> {
        let mut events = vec![
            XmlEvent::open("item"),
            XmlEvent::open("title"),
            XmlEvent::Text(title.into()),
            XmlEvent::Close("title".into()),
            XmlEvent::open("content:encoded"),
        ];
        events.extend(body_fragments.iter().map(|f| XmlEvent::CData((*f).into())));
        events.push(XmlEvent::Close("content:encoded".into()));
        events.extend(extra);
        events.push(XmlEvent::Close("item".into()));
        events
    }

    fn accepted(outcome: &ItemOutcome) -> &AcceptedPost {
        match outcome {
            ItemOutcome::Accepted(post) => post,
            other => panic!("expected accepted post, got {other:?}"),
        }
    }

    #[test]
    fn fragments_concatenate_into_one_body() {
        let mut extractor = PostExtractor::new(FilteringOptions::default());
        let outcomes = run(&mut extractor, item("T", &["<p>A</p>", "<p>B</p>"], vec![]));
        assert_eq!(outcomes.len(), 1);
        assert_eq!(accepted(&outcomes[0]).record.html_body, "<p>A</p><p>B</p>");
    }

    #[test]
    fn incomplete_items_are_counted_not_emitted() {
        let mut extractor = PostExtractor::new(FilteringOptions::default());
        let outcomes = run(&mut extractor, item("", &["<p>body</p>"], vec![]));
        assert_eq!(outcomes, vec![ItemOutcome::Incomplete]);

        let stats = extractor.end();
        assert_eq!(stats.processed, 1);
        assert_eq!(stats.incomplete, 1);
        assert_eq!(stats.accepted, 0);
    }

    #[test]
    fn plain_content_used_when_encoded_missing() {
        let mut extractor = PostExtractor::new(FilteringOptions::default());
        let events = vec![
            XmlEvent::open("item"),
            XmlEvent::open("title"),
            XmlEvent::Text("T".into()),
            XmlEvent::Close("title".into()),
            XmlEvent::open("content"),
            XmlEvent::Text("<p>plain</p>".into()),
            XmlEvent::Close("content".into()),
            XmlEvent::Close("item".into()),
        ];
        let outcomes = run(&mut extractor, events);
        assert_eq!(accepted(&outcomes[0]).record.body(), "<p>plain</p>");
    }

    #[test]
    fn stray_item_close_is_ignored() {
        let mut extractor = PostExtractor::new(FilteringOptions::default());
        let mut events = vec![XmlEvent::open("channel"), XmlEvent::Close("item".into())];
        events.extend(item("T", &["<p>x</p>"], vec![]));
        let outcomes = run(&mut extractor, events);

        assert_eq!(outcomes.len(), 1);
        let stats = extractor.stats();
        assert_eq!(stats.malformed_events, 1);
        assert_eq!(stats.processed, 1);
    }

    #[test]
    fn channel_title_does_not_leak_into_items() {
        let mut extractor = PostExtractor::new(FilteringOptions::default());
        let mut events = vec![
            XmlEvent::open("channel"),
            XmlEvent::open("title"),
            XmlEvent::Text("Site Title".into()),
            XmlEvent::Close("title".into()),
        ];
        events.extend(item("Post", &["<p>x</p>"], vec![]));
        let outcomes = run(&mut extractor, events);
        assert_eq!(accepted(&outcomes[0]).record.title, "Post");
    }

    #[test]
    fn stream_end_mid_item_discards_without_counting() {
        let mut extractor = PostExtractor::new(FilteringOptions::default());
        let mut events = item("T", &["<p>x</p>"], vec![]);
        events.pop();
        let outcomes = run(&mut extractor, events);
        assert!(outcomes.is_empty());

        let stats = extractor.end();
        assert_eq!(stats.processed, 0);

        // The machine is reusable after the discard.
        let outcomes = run(&mut extractor, item("Next", &["<p>y</p>"], vec![]));
        assert_eq!(accepted(&outcomes[0]).record.title, "Next");
    }

    #[test]
    fn ancestor_close_does_not_merge_items() {
        let mut extractor = PostExtractor::new(FilteringOptions::default());
        let mut events = vec![XmlEvent::open("rss"), XmlEvent::open("channel")];
        let mut cut = item("First", &["<p>x</p>"], vec![]);
        cut.pop();
        events.extend(cut);
        events.push(XmlEvent::Close("channel".into()));
        events.extend(item("Second", &["<p>y</p>"], vec![]));

        let outcomes = run(&mut extractor, events);
        assert_eq!(outcomes.len(), 1);
        let post = accepted(&outcomes[0]);
        assert_eq!(post.record.title, "Second");
        assert_eq!(post.record.html_body, "<p>y</p>");

        let stats = extractor.end();
        assert_eq!(stats.processed, 1);
        assert_eq!(stats.malformed_events, 1);
    }

    #[test]
    fn error_discards_partial_item() {
        let mut extractor = PostExtractor::new(FilteringOptions::default());
        let mut events = item("T", &["<p>x</p>"], vec![]);
        events.pop();
        run(&mut extractor, events);

        let err = extractor.error(Error::Xml("truncated".into()));
        assert!(err.is_stream_failure());
        assert_eq!(extractor.stats().processed, 0);
    }

    #[test]
    fn filter_rejections_carry_reason() {
        let options = FilteringOptions {
            filter_enabled: true,
            min_word_count: 10,
            min_text_to_markup_ratio: 0.0,
            ..FilteringOptions::default()
        };
        let mut extractor = PostExtractor::new(options);
        let outcomes = run(&mut extractor, item("Short", &["<p>two words</p>"], vec![]));

        match &outcomes[0] {
            ItemOutcome::Skipped(skipped) => {
                assert_eq!(skipped.title, "Short");
                assert!(skipped.reason.contains("2 words"));
            }
            other => panic!("expected skip, got {other:?}"),
        }
        assert_eq!(extractor.stats().skipped, 1);
        assert_eq!(extractor.stats().processed, 1);
    }

    #[test]
    fn metadata_survives_to_accepted_post() {
        let extra = vec![
            XmlEvent::Open {
                name: "category".into(),
                attributes: vec![("domain".into(), "post_tag".into())],
            },
            XmlEvent::CData("rust".into()),
            XmlEvent::Close("category".into()),
            XmlEvent::open("wp:postmeta"),
            XmlEvent::open("wp:meta_key"),
            XmlEvent::Text("subtitle".into()),
            XmlEvent::Close("wp:meta_key".into()),
            XmlEvent::open("wp:meta_value"),
            XmlEvent::CData("More".into()),
            XmlEvent::Close("wp:meta_value".into()),
            XmlEvent::Close("wp:postmeta".into()),
        ];
        let mut extractor = PostExtractor::new(FilteringOptions::default());
        let outcomes = run(&mut extractor, item("T", &["<p>x</p>"], extra));
        let post = accepted(&outcomes[0]);
        assert_eq!(post.record.tags, vec!["rust"]);
        assert_eq!(post.record.custom_fields["subtitle"], "More");
        assert!(post.metrics.is_none());
    }
}
