//! Compiled regex patterns used by the analyzer, classifier and renderer.
//!
//! All patterns are compiled once at first use with `LazyLock`.
//! Patterns are organized by the stage that consumes them.

#![allow(clippy::expect_used)]

use std::sync::LazyLock;

use regex::Regex;

// =============================================================================
// Body Analysis Patterns
// =============================================================================

/// Matches any markup tag, including comments and processing instructions.
pub static MARKUP_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]*>").expect("MARKUP_TAG regex"));

/// Matches named and numeric character references (`&nbsp;`, `&#8217;`).
pub static CHAR_REFERENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"&(?:[a-zA-Z][a-zA-Z0-9]*|#[0-9]+|#[xX][0-9a-fA-F]+);").expect("CHAR_REFERENCE regex")
});

/// Matches punctuation and symbols left over once tags are stripped.
/// Underscore counts as punctuation even though `\w` includes it.
pub static PUNCTUATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\w\s]|_").expect("PUNCTUATION regex"));

/// Matches an opening image element.
pub static IMAGE_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<img\b").expect("IMAGE_TAG regex"));

/// Matches an opening iframe, embed or object element.
pub static EMBED_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<(?:iframe|embed|object)\b").expect("EMBED_TAG regex"));

// =============================================================================
// System Page Patterns
// =============================================================================

/// Matches a year/month permalink segment such as `/2019/07` or `/2021/11`.
pub static ARCHIVE_DATE_PATH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/20\d{2}/[01]\d").expect("ARCHIVE_DATE_PATH regex"));

/// Matches a slug ending in a numeric suffix (`hello-world-2`).
pub static NUMERIC_SLUG_SUFFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"-\d+$").expect("NUMERIC_SLUG_SUFFIX regex"));

/// Matches `Page 3` style titles.
pub static PAGE_NUMBER_TITLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bpage\s+\d+\b").expect("PAGE_NUMBER_TITLE regex"));

// =============================================================================
// WordPress Markup Patterns
// =============================================================================

/// Matches a `[caption ...]inner[/caption]` shortcode.
pub static CAPTION_SHORTCODE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)\[caption[^\]]*\](.*?)\[/caption\]").expect("CAPTION_SHORTCODE regex")
});

/// Splits a caption body into its leading media markup (an image, optionally
/// wrapped in a link) and the caption text that follows.
pub static CAPTION_MEDIA: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)^\s*((?:<a\b[^>]*>\s*)?<img\b[^>]*>(?:\s*</a>)?)(.*)$").expect("CAPTION_MEDIA regex")
});

/// Matches `[embed]URL[/embed]`, capturing the URL.
pub static EMBED_SHORTCODE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)\[embed[^\]]*\]\s*(\S+?)\s*\[/embed\]").expect("EMBED_SHORTCODE regex")
});

/// Matches a `[video]` or `[audio]` shortcode with a source attribute,
/// capturing the media URL.
pub static MEDIA_SHORTCODE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?is)\[(?:video|audio)\b[^\]]*?\b(?:src|mp4|m4v|webm|ogv|mp3|ogg|wav)\s*=\s*["']([^"']+)["'][^\]]*\](?:\s*\[/(?:video|audio)\])?"#,
    )
    .expect("MEDIA_SHORTCODE regex")
});

/// Matches opening or closing tags of shortcodes that have no Markdown
/// rendering: galleries, forms and page-builder layout wrappers.
pub static SHORTCODE_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\[/?(?:gallery|playlist|audio|video|embed|contact-form-7|contact-form|wpforms|et_pb_[a-z_]+|vc_[a-z_]+)\b[^\]]*\]",
    )
    .expect("SHORTCODE_TAG regex")
});

/// Matches the `wp-image-123` class WordPress adds to inserted media.
pub static WP_IMAGE_CLASS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bwp-image-(\d+)\b").expect("WP_IMAGE_CLASS regex"));

/// Matches a resized-image suffix before the extension (`photo-300x200.jpg`).
pub static THUMBNAIL_SUFFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"-\d+x\d+(\.[a-zA-Z0-9]+)(\?.*)?$").expect("THUMBNAIL_SUFFIX regex")
});

/// Matches a block-level opening tag; bodies containing one already carry
/// their own paragraph structure.
pub static BLOCK_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)<(?:p|div|h[1-6]|ul|ol|li|table|blockquote|pre|figure|section|article)\b")
        .expect("BLOCK_TAG regex")
});

/// Matches two or more line breaks separating paragraphs.
pub static PARAGRAPH_BREAK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\r?\n\s*\r?\n").expect("PARAGRAPH_BREAK regex"));

// =============================================================================
// Naming Patterns
// =============================================================================

/// Matches runs of characters that are not allowed in a slug.
pub static SLUG_SEPARATOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-z0-9]+").expect("SLUG_SEPARATOR regex"));

/// Matches multiple consecutive newlines.
pub static MULTIPLE_NEWLINES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n{3,}").expect("MULTIPLE_NEWLINES regex"));
