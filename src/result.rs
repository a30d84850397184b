//! Result types produced by analysis, filtering and conversion.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Kind of system-generated listing page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageType {
    /// Tag or category index.
    Tag,
    /// Date archive.
    Archive,
    /// Author archive.
    Author,
    /// Paginated duplicate of another listing or post.
    Paginated,
}

impl PageType {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Tag => "tag",
            Self::Archive => "archive",
            Self::Author => "author",
            Self::Paginated => "paginated",
        }
    }
}

impl fmt::Display for PageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of the system-page classifier.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageClassification {
    pub is_system_page: bool,
    pub page_type: Option<PageType>,
}

impl PageClassification {
    /// Classification for regular authored content.
    #[must_use]
    pub fn content() -> Self {
        Self::default()
    }

    /// Classification for a system page of the given type.
    #[must_use]
    pub fn system(page_type: PageType) -> Self {
        Self {
            is_system_page: true,
            page_type: Some(page_type),
        }
    }
}

/// Quality signals computed from a post body.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QualityMetrics {
    /// Words left after stripping markup and punctuation.
    pub word_count: usize,

    /// Visible text length over total body length, in `[0, 1]`.
    pub text_to_markup_ratio: f64,

    /// At least one `<img>` element.
    pub has_images: bool,

    /// At least one iframe, embed or object element.
    pub has_embeds: bool,

    /// An embed element in a body shorter than the short-content threshold.
    pub is_embed_heavy: bool,

    /// Any configured quality threshold failed, or an excluded system page.
    pub is_low_value: bool,

    /// System page type, when the post metadata looks like one.
    pub page_type: Option<PageType>,
}

/// Accept/reject decision for one post.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterDecision {
    pub accept: bool,

    /// `None` when filtering is disabled.
    pub metrics: Option<QualityMetrics>,

    /// Human-readable reason for a rejection.
    pub skip_reason: Option<String>,
}

impl FilterDecision {
    #[must_use]
    pub fn accepted(metrics: Option<QualityMetrics>) -> Self {
        Self {
            accept: true,
            metrics,
            skip_reason: None,
        }
    }

    #[must_use]
    pub fn rejected(metrics: QualityMetrics, reason: impl Into<String>) -> Self {
        Self {
            accept: false,
            metrics: Some(metrics),
            skip_reason: Some(reason.into()),
        }
    }
}

/// A post that was dropped, with the reason recorded for observability.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkippedPost {
    pub title: String,
    pub reason: String,
}

/// Totals for a finished conversion.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversionSummary {
    /// Conversion id in the store.
    pub conversion_id: u64,

    /// Item spans finalized, whatever their fate.
    pub processed: u64,

    /// Posts accepted and stored.
    pub accepted: u64,

    /// Complete posts rejected by the filter.
    pub skipped: Vec<SkippedPost>,

    /// Items closed without a title or body.
    pub incomplete: u64,

    /// Stray events ignored by the tracker.
    pub malformed_events: u64,
}
