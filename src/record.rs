//! Post records reconstructed from a WordPress export.
//!
//! `RawPostRecord` is the explicit, typed replacement for a free-form
//! property bag: every field the accumulator may touch is named here, and
//! [`PostField`] decides whether a delivery appends or is first-wins.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Status assumed when an item carries no `wp:status`.
pub const DEFAULT_STATUS: &str = "publish";

/// Post type assumed when an item carries no `wp:post_type`.
pub const DEFAULT_POST_TYPE: &str = "post";

/// Category domain for real categories.
pub const CATEGORY_DOMAIN: &str = "category";

/// Category domain for tags.
pub const TAG_DOMAIN: &str = "post_tag";

/// A post being reconstructed from one `<item>` span.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawPostRecord {
    /// Post title.
    pub title: String,

    /// Body from `content:encoded`, concatenated across CDATA fragments.
    pub html_body: String,

    /// Body from a plain `content` element, used when `html_body` is empty.
    pub fallback_body: String,

    /// Excerpt from `excerpt:encoded`.
    pub excerpt: String,

    /// Publication date as written in the export (`wp:post_date`).
    pub published_at: String,

    /// RSS `pubDate`, used only when `wp:post_date` never arrived.
    pub pub_date: String,

    /// Raw status; see [`RawPostRecord::status`].
    pub status: String,

    /// Raw post type; see [`RawPostRecord::post_type`].
    pub post_type: String,

    /// Source-provided slug (`wp:post_name`), may be empty.
    pub slug_hint: String,

    /// Author login (`dc:creator`).
    pub author: String,

    /// Categories in document order (domain `category`).
    pub categories: Vec<String>,

    /// Tags in document order (domain `post_tag`).
    pub tags: Vec<String>,

    /// Custom fields from `wp:postmeta`; last value wins on duplicate keys.
    pub custom_fields: HashMap<String, String>,

    /// Permalink (`link`).
    pub permalink: String,

    /// WordPress post id (`wp:post_id`).
    pub source_id: String,
}

impl RawPostRecord {
    /// A record is complete when it has a title and a non-blank body.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        !self.title.trim().is_empty() && !self.body().trim().is_empty()
    }

    /// The resolved HTML body: `content:encoded` if present, else `content`.
    #[must_use]
    pub fn body(&self) -> &str {
        if self.html_body.is_empty() {
            &self.fallback_body
        } else {
            &self.html_body
        }
    }

    /// Status with the `publish` default applied.
    #[must_use]
    pub fn status(&self) -> &str {
        non_empty_or(&self.status, DEFAULT_STATUS)
    }

    /// Post type with the `post` default applied.
    #[must_use]
    pub fn post_type(&self) -> &str {
        non_empty_or(&self.post_type, DEFAULT_POST_TYPE)
    }

    /// Publication date, falling back to the RSS `pubDate`.
    #[must_use]
    pub fn date(&self) -> &str {
        non_empty_or(&self.published_at, &self.pub_date)
    }

    /// True if the status is `draft`.
    #[must_use]
    pub fn is_draft(&self) -> bool {
        self.status() == "draft"
    }
}

fn non_empty_or<'a>(value: &'a str, default: &'a str) -> &'a str {
    if value.trim().is_empty() {
        default
    } else {
        value
    }
}

/// Scratch state for one `<category>` element.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryInProgress {
    /// `domain` attribute: `category` or `post_tag`.
    pub domain: String,

    /// `nicename` attribute.
    pub nice_name_hint: String,

    /// Display name from the element's text or CDATA.
    pub name: String,
}

/// Where a finished category element is routed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CategoryKind {
    Category,
    Tag,
}

impl CategoryInProgress {
    /// Start a scratch value from the element's attributes.
    #[must_use]
    pub fn from_attributes(attributes: &[(String, String)]) -> Self {
        let mut category = Self::default();
        for (key, value) in attributes {
            match key.as_str() {
                "domain" => category.domain.clone_from(value),
                "nicename" => category.nice_name_hint.clone_from(value),
                _ => {}
            }
        }
        category
    }

    /// Classify by domain. Other domains (`post_format`, custom taxonomies)
    /// are not routed anywhere.
    #[must_use]
    pub fn kind(&self) -> Option<CategoryKind> {
        match self.domain.as_str() {
            CATEGORY_DOMAIN => Some(CategoryKind::Category),
            TAG_DOMAIN => Some(CategoryKind::Tag),
            _ => None,
        }
    }
}

/// Scalar or body field of a post, keyed by WXR element name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PostField {
    Title,
    EncodedBody,
    PlainBody,
    Excerpt,
    PostDate,
    PubDate,
    Status,
    PostType,
    SlugHint,
    Author,
    Permalink,
    SourceId,
}

impl PostField {
    /// Map a qualified element name to the field it fills.
    #[must_use]
    pub fn from_tag(tag: &str) -> Option<Self> {
        Some(match tag {
            "title" => Self::Title,
            "content:encoded" => Self::EncodedBody,
            "content" => Self::PlainBody,
            "excerpt:encoded" => Self::Excerpt,
            "wp:post_date" => Self::PostDate,
            "pubDate" => Self::PubDate,
            "wp:status" => Self::Status,
            "wp:post_type" => Self::PostType,
            "wp:post_name" => Self::SlugHint,
            "dc:creator" => Self::Author,
            "link" => Self::Permalink,
            "wp:post_id" => Self::SourceId,
            _ => return None,
        })
    }

    /// Body fields concatenate every delivery; the rest keep the first
    /// non-empty value.
    #[must_use]
    pub fn appends(self) -> bool {
        matches!(self, Self::EncodedBody | Self::PlainBody)
    }

    /// Mutable access to the backing string on a record.
    pub fn slot(self, record: &mut RawPostRecord) -> &mut String {
        match self {
            Self::Title => &mut record.title,
            Self::EncodedBody => &mut record.html_body,
            Self::PlainBody => &mut record.fallback_body,
            Self::Excerpt => &mut record.excerpt,
            Self::PostDate => &mut record.published_at,
            Self::PubDate => &mut record.pub_date,
            Self::Status => &mut record.status,
            Self::PostType => &mut record.post_type,
            Self::SlugHint => &mut record.slug_hint,
            Self::Author => &mut record.author,
            Self::Permalink => &mut record.permalink,
            Self::SourceId => &mut record.source_id,
        }
    }
}
