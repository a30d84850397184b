//! Content quality analysis.
//!
//! Pure functions over an HTML-like post body. Nothing here parses a DOM:
//! the signals are deliberately cheap so they can run on every item of a
//! multi-gigabyte export.

use crate::classify::classify;
use crate::options::FilteringOptions;
use crate::patterns::{CHAR_REFERENCE, EMBED_TAG, IMAGE_TAG, MARKUP_TAG, PUNCTUATION};
use crate::record::RawPostRecord;
use crate::result::{PageType, QualityMetrics};

/// Bodies shorter than this (in characters) that contain an embed are
/// treated as embed-only.
pub const EMBED_ONLY_MAX_CHARS: usize = 1000;

/// Replace every markup tag with a single space.
///
/// Each tag becomes one separator so words on either side of a tag boundary
/// never merge.
#[must_use]
pub fn strip_tags(html: &str) -> String {
    MARKUP_TAG.replace_all(html, " ").into_owned()
}

/// Count words in an HTML body.
///
/// Tags and character references are stripped, remaining punctuation is
/// replaced with whitespace, and the non-empty tokens are counted.
///
/// # Examples
///
/// ```
/// use wxr2md::quality::count_words;
///
/// assert_eq!(count_words("<p>Hello world</p>"), 2);
/// assert_eq!(count_words("<div><h1>Test</h1><p>One two three</p></div>"), 4);
/// ```
#[must_use]
pub fn count_words(html: &str) -> usize {
    let text = strip_tags(html);
    let text = CHAR_REFERENCE.replace_all(&text, " ");
    let text = PUNCTUATION.replace_all(&text, " ");
    text.split_whitespace().count()
}

/// Ratio of visible text length to total body length.
///
/// Tags are removed outright here rather than replaced with a separator,
/// so markup never counts as visible text. Returns exactly `0.0` for an
/// empty body. The result is always in `[0, 1]`.
#[must_use]
pub fn text_to_markup_ratio(html: &str) -> f64 {
    let total = html.chars().count();
    if total == 0 {
        return 0.0;
    }
    let text = MARKUP_TAG.replace_all(html, "");
    let visible = text.trim().chars().count();
    (visible as f64 / total as f64).clamp(0.0, 1.0)
}

/// True if the body contains at least one `<img>` element.
#[must_use]
pub fn has_images(html: &str) -> bool {
    IMAGE_TAG.is_match(html)
}

/// True if the body contains at least one iframe, embed or object element.
#[must_use]
pub fn has_embeds(html: &str) -> bool {
    EMBED_TAG.is_match(html)
}

/// True if the post is essentially just an embed: it contains an embed
/// element and the whole body is shorter than [`EMBED_ONLY_MAX_CHARS`].
#[must_use]
pub fn is_embed_heavy(html: &str) -> bool {
    has_embeds(html) && html.chars().count() < EMBED_ONLY_MAX_CHARS
}

/// Compute quality metrics for a body.
///
/// When a post is supplied, its metadata also goes through the system-page
/// classifier; a system page whose exclusion toggle is on is always low
/// value, whatever its word count or ratio.
#[must_use]
pub fn analyze_quality(
    html: &str,
    options: &FilteringOptions,
    post: Option<&RawPostRecord>,
) -> QualityMetrics {
    let word_count = count_words(html);
    let ratio = text_to_markup_ratio(html);
    let images = has_images(html);
    let embeds = has_embeds(html);
    let embed_heavy = is_embed_heavy(html);

    let mut is_low_value = word_count < options.min_word_count
        || ratio < options.min_text_to_markup_ratio
        || (options.exclude_embed_only_posts && embed_heavy)
        || (options.exclude_no_images && !images);

    let page_type = post.and_then(|post| classify(post).page_type);
    if let Some(page_type) = page_type {
        if is_excluded(page_type, options) {
            is_low_value = true;
        }
    }

    QualityMetrics {
        word_count,
        text_to_markup_ratio: ratio,
        has_images: images,
        has_embeds: embeds,
        is_embed_heavy: embed_heavy,
        is_low_value,
        page_type,
    }
}

/// Whether the exclusion toggle for a page type is on.
#[must_use]
pub fn is_excluded(page_type: PageType, options: &FilteringOptions) -> bool {
    match page_type {
        PageType::Tag => options.exclude_tag_pages,
        PageType::Archive => options.exclude_archive_pages,
        PageType::Author => options.exclude_author_pages,
        PageType::Paginated => options.exclude_paginated_pages,
    }
}
