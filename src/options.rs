//! Configuration options for filtering and conversion.
//!
//! `FilteringOptions` controls which reconstructed posts are kept. It uses
//! the same camelCase field names as the upload form, so a JSON options
//! payload deserializes directly. `ConvertOptions` wraps it together with the
//! pipeline and Markdown settings.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Caller-supplied thresholds and toggles for the filtering decision.
///
/// All fields are public for easy configuration. Use `Default::default()`
/// for standard settings.
///
/// # Example
///
/// ```rust
/// use wxr2md::FilteringOptions;
///
/// let options = FilteringOptions {
///     filter_enabled: true,
///     min_word_count: 300,
///     ..FilteringOptions::default()
/// };
/// assert!(options.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
#[allow(clippy::struct_excessive_bools)]
pub struct FilteringOptions {
    /// Master switch. When `false` every complete post is accepted and no
    /// quality metrics are computed.
    ///
    /// Default: `false`
    pub filter_enabled: bool,

    /// Minimum number of words in the post body.
    ///
    /// Default: `700`
    pub min_word_count: usize,

    /// Minimum ratio of visible text length to total body length (0.0 - 1.0).
    ///
    /// Default: `0.5`
    pub min_text_to_markup_ratio: f64,

    /// Reject short posts that consist of little more than an iframe,
    /// embed or object element.
    ///
    /// Default: `true`
    pub exclude_embed_only_posts: bool,

    /// Reject posts whose status is `draft`.
    ///
    /// Default: `true`
    pub exclude_draft_posts: bool,

    /// Reject posts without a single image.
    ///
    /// Default: `false`
    pub exclude_no_images: bool,

    /// Reject pages that look like tag or category listings.
    ///
    /// Default: `true`
    pub exclude_tag_pages: bool,

    /// Reject pages that look like date archives.
    ///
    /// Default: `true`
    pub exclude_archive_pages: bool,

    /// Reject pages that look like author archives.
    ///
    /// Default: `true`
    pub exclude_author_pages: bool,

    /// Reject posts or pages that look like paginated duplicates.
    ///
    /// Default: `true`
    pub exclude_paginated_pages: bool,
}

impl Default for FilteringOptions {
    fn default() -> Self {
        Self {
            filter_enabled: false,
            min_word_count: 700,
            min_text_to_markup_ratio: 0.5,
            exclude_embed_only_posts: true,
            exclude_draft_posts: true,
            exclude_no_images: false,
            exclude_tag_pages: true,
            exclude_archive_pages: true,
            exclude_author_pages: true,
            exclude_paginated_pages: true,
        }
    }
}

impl FilteringOptions {
    /// Parse options from the JSON payload submitted with an upload.
    ///
    /// Missing fields take their default. A negative `minWordCount` cannot be
    /// represented and is reported as `Error::InvalidOptions`, as is any
    /// ratio outside `[0, 1]`.
    pub fn from_json(json: &str) -> Result<Self> {
        let options: Self =
            serde_json::from_str(json).map_err(|e| Error::InvalidOptions(e.to_string()))?;
        options.validate()?;
        Ok(options)
    }

    /// Reject thresholds that can never be satisfied or are not numbers.
    pub fn validate(&self) -> Result<()> {
        let ratio = self.min_text_to_markup_ratio;
        if !ratio.is_finite() || !(0.0..=1.0).contains(&ratio) {
            return Err(Error::InvalidOptions(format!(
                "minTextToMarkupRatio must be between 0 and 1, got {ratio}"
            )));
        }
        Ok(())
    }
}

/// Markdown output settings handed to the renderer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MarkdownOptions {
    /// Prepend a YAML front matter block with the post metadata.
    ///
    /// Default: `true`
    pub include_front_matter: bool,

    /// Keep link targets in the Markdown body.
    ///
    /// Default: `true`
    pub include_links: bool,

    /// Keep images in the Markdown body.
    ///
    /// Default: `true`
    pub include_images: bool,

    /// Convert tables to GFM tables instead of flattening them.
    ///
    /// Default: `true`
    pub preserve_tables: bool,
}

impl Default for MarkdownOptions {
    fn default() -> Self {
        Self {
            include_front_matter: true,
            include_links: true,
            include_images: true,
            preserve_tables: true,
        }
    }
}

/// Options for one end-to-end conversion run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConvertOptions {
    /// Filtering thresholds.
    pub filtering: FilteringOptions,

    /// Markdown rendering settings.
    pub markdown: MarkdownOptions,

    /// Single-pass mode: the item total is published only once the stream
    /// ends instead of being counted in a separate pass first.
    ///
    /// Default: `false`
    pub single_pass: bool,
}
