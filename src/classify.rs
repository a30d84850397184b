//! System-page classification.
//!
//! Detects listing pages that a WordPress export sometimes carries as real
//! pages: tag/category indexes, date archives, author archives and paginated
//! duplicates. Only post metadata is inspected, never the body.
//!
//! Checks run in priority order and the first match wins. The first three
//! only apply to `page` items. Pagination applies to any post type, since
//! pagination artifacts show up on posts as well as pages.

use crate::patterns::{ARCHIVE_DATE_PATH, NUMERIC_SLUG_SUFFIX, PAGE_NUMBER_TITLE};
use crate::record::RawPostRecord;
use crate::result::{PageClassification, PageType};

/// Classify a post as regular content or a system page.
///
/// # Examples
///
/// ```
/// use wxr2md::{classify, PageType, RawPostRecord};
///
/// let post = RawPostRecord {
///     title: "Tag: Example".into(),
///     post_type: "page".into(),
///     ..RawPostRecord::default()
/// };
/// assert_eq!(classify(&post).page_type, Some(PageType::Tag));
/// ```
#[must_use]
pub fn classify(post: &RawPostRecord) -> PageClassification {
    let title = post.title.to_lowercase();
    let slug = post.slug_hint.to_lowercase();
    let permalink = post.permalink.to_lowercase();
    let is_page = post.post_type() == "page";

    if is_page && is_tag_page(&title, &slug) {
        return PageClassification::system(PageType::Tag);
    }
    if is_page && is_archive_page(&title, &slug, &permalink) {
        return PageClassification::system(PageType::Archive);
    }
    if is_page && is_author_page(&title, &slug, &permalink) {
        return PageClassification::system(PageType::Author);
    }
    if is_paginated(&title, &slug, &permalink) {
        return PageClassification::system(PageType::Paginated);
    }

    PageClassification::content()
}

fn is_tag_page(title: &str, slug: &str) -> bool {
    title.contains("tag:")
        || title.contains("category:")
        || slug.contains("tag-")
        || slug.contains("category-")
}

fn is_archive_page(title: &str, slug: &str, permalink: &str) -> bool {
    title.contains("archive") || slug.contains("archive") || ARCHIVE_DATE_PATH.is_match(permalink)
}

fn is_author_page(title: &str, slug: &str, permalink: &str) -> bool {
    title.contains("author:") || slug.contains("author-") || permalink.contains("/author/")
}

fn is_paginated(title: &str, slug: &str, permalink: &str) -> bool {
    permalink.contains("/page/")
        || slug.contains("-page-")
        || NUMERIC_SLUG_SUFFIX.is_match(slug)
        || PAGE_NUMBER_TITLE.is_match(title)
}
