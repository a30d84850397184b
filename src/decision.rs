//! Filtering decision engine.
//!
//! Combines the quality analyzer, the system-page classifier and the
//! caller's thresholds into one accept/reject decision. Only the first
//! matching reason is reported.

use crate::classify::classify;
use crate::options::FilteringOptions;
use crate::quality::analyze_quality;
use crate::record::RawPostRecord;
use crate::result::{FilterDecision, QualityMetrics};

/// Decide whether a post is kept.
///
/// With filtering disabled every post is accepted and no metrics are
/// computed. Otherwise a low-value post is rejected first (naming the page
/// type for system pages, or citing the quality numbers), then drafts are
/// rejected when `exclude_draft_posts` is on.
///
/// # Examples
///
/// ```
/// use wxr2md::{decide, FilteringOptions, RawPostRecord};
///
/// let post = RawPostRecord { title: "Hi".into(), ..RawPostRecord::default() };
/// let decision = decide(&post, "<p>Hi</p>", &FilteringOptions::default());
/// assert!(decision.accept);
/// assert!(decision.metrics.is_none());
/// ```
#[must_use]
pub fn decide(post: &RawPostRecord, html: &str, options: &FilteringOptions) -> FilterDecision {
    if !options.filter_enabled {
        return FilterDecision::accepted(None);
    }

    let metrics = analyze_quality(html, options, Some(post));

    if metrics.is_low_value {
        let classification = classify(post);
        let reason = match classification.page_type {
            Some(page_type) if classification.is_system_page => {
                format!("system-generated {page_type} page")
            }
            _ => low_value_reason(&metrics, options),
        };
        return FilterDecision::rejected(metrics, reason);
    }

    if options.exclude_draft_posts && post.is_draft() {
        return FilterDecision::rejected(metrics, "draft post");
    }

    FilterDecision::accepted(Some(metrics))
}

fn low_value_reason(metrics: &QualityMetrics, options: &FilteringOptions) -> String {
    let mut reason = format!(
        "low-value content: {} words, text/markup ratio {:.2}",
        metrics.word_count, metrics.text_to_markup_ratio
    );
    if options.exclude_embed_only_posts && metrics.is_embed_heavy {
        reason.push_str(", embed-only");
    }
    if options.exclude_no_images && !metrics.has_images {
        reason.push_str(", no images");
    }
    reason
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strict() -> FilteringOptions {
        FilteringOptions {
            filter_enabled: true,
            min_word_count: 700,
            min_text_to_markup_ratio: 0.5,
            exclude_draft_posts: true,
            ..FilteringOptions::default()
        }
    }

    fn long_body(words: usize) -> String {
        format!("<p>{}</p>", "lorem ".repeat(words))
    }

    fn post(status: &str) -> RawPostRecord {
        RawPostRecord {
            title: "A post".into(),
            status: status.into(),
            post_type: "post".into(),
            slug_hint: "a-post".into(),
            ..RawPostRecord::default()
        }
    }

    #[test]
    fn disabled_filter_accepts_everything() {
        let options = FilteringOptions {
            filter_enabled: false,
            ..strict()
        };
        let decision = decide(&post("draft"), "", &options);
        assert!(decision.accept);
        assert!(decision.metrics.is_none());
        assert!(decision.skip_reason.is_none());
    }

    #[test]
    fn short_draft_is_rejected() {
        let decision = decide(&post("draft"), &long_body(50), &strict());
        assert!(!decision.accept);
        let reason = decision.skip_reason.unwrap();
        assert!(reason.starts_with("low-value content: 50 words"), "{reason}");
    }

    #[test]
    fn long_published_post_is_accepted() {
        let decision = decide(&post("publish"), &long_body(750), &strict());
        assert!(decision.accept);
        let metrics = decision.metrics.unwrap();
        assert!(!metrics.is_low_value);
        assert_eq!(metrics.word_count, 750);
    }

    #[test]
    fn high_quality_draft_is_rejected_as_draft() {
        let decision = decide(&post("draft"), &long_body(750), &strict());
        assert!(!decision.accept);
        assert_eq!(decision.skip_reason.as_deref(), Some("draft post"));
        assert!(!decision.metrics.unwrap().is_low_value);
    }

    #[test]
    fn draft_kept_when_toggle_off() {
        let options = FilteringOptions {
            exclude_draft_posts: false,
            ..strict()
        };
        assert!(decide(&post("draft"), &long_body(750), &options).accept);
    }

    #[test]
    fn system_page_reason_names_page_type() {
        let mut record = post("publish");
        record.post_type = "page".into();
        record.title = "Author: Jo".into();
        record.slug_hint = "jo".into();

        let decision = decide(&record, &long_body(750), &strict());
        assert!(!decision.accept);
        assert_eq!(
            decision.skip_reason.as_deref(),
            Some("system-generated author page")
        );
    }

    #[test]
    fn embed_only_reason_is_reported() {
        let options = FilteringOptions {
            min_word_count: 0,
            min_text_to_markup_ratio: 0.0,
            ..strict()
        };
        let decision = decide(&post("publish"), r#"<iframe src="v"></iframe>"#, &options);
        assert!(!decision.accept);
        assert!(decision.skip_reason.unwrap().ends_with("embed-only"));
    }

    #[test]
    fn decision_is_repeatable() {
        let body = long_body(120);
        let first = decide(&post("publish"), &body, &strict());
        let second = decide(&post("publish"), &body, &strict());
        assert_eq!(first, second);
    }
}
