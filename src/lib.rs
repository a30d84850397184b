//! # wxr2md
//!
//! Streaming WordPress export (WXR) to Markdown converter with a
//! content-quality filter.
//!
//! An export is read as a stream of XML events. Each `<item>` is rebuilt
//! into a [`RawPostRecord`], scored by the quality analyzer, checked against
//! the system-page classifier and either accepted (rendered to Markdown and
//! stored) or skipped with a recorded reason. Memory use is bounded by the
//! largest single post, not by the size of the export.
//!
//! ## Quick Start
//!
//! ```rust
//! use std::io::Cursor;
//! use wxr2md::{ConvertOptions, Converter, ConversionStore, MemoryStore};
//!
//! let xml = r#"<rss><channel><item>
//!   <title>Hello</title>
//!   <content:encoded><![CDATA[<p>First post.</p>]]></content:encoded>
//! </item></channel></rss>"#;
//!
//! let store = MemoryStore::new();
//! let converter = Converter::new(ConvertOptions::default(), &store)?;
//! let summary = converter.convert_reader("export.xml", Cursor::new(xml))?;
//!
//! assert_eq!(summary.accepted, 1);
//! let posts = store.list_posts(summary.conversion_id)?;
//! assert!(posts[0].post.markdown.contains("First post."));
//! # Ok::<(), wxr2md::Error>(())
//! ```
//!
//! ## Features
//!
//! - **Streaming extraction**: tag-path tracking, CDATA concatenation,
//!   category/tag disambiguation, post meta
//! - **Quality filtering**: word count, text-to-markup ratio, images, embeds
//! - **System pages**: tag, archive, author and paginated listings
//! - **Markdown**: WordPress-aware HTML conversion with YAML front matter
//! - **Packaging**: ZIP archive of the converted posts

mod error;
mod options;
mod patterns;
mod record;
mod result;

/// Content quality analysis of post bodies.
pub mod quality;

/// Detection of system-generated listing pages.
pub mod classify;

/// Accept/reject decision for a post.
pub mod decision;

/// Streaming extraction (token source, tag tracker, accumulator, extractor).
pub mod stream;

/// Markdown rendering, front matter and file naming.
pub mod markdown;

/// Storage sink for conversions and accepted posts.
pub mod store;

/// Atomic progress counters.
pub mod progress;

/// End-to-end conversion pipeline.
pub mod convert;

/// ZIP packaging of converted posts.
pub mod package;

// Public API - re-exports
pub use classify::classify;
pub use convert::Converter;
pub use decision::decide;
pub use error::{Error, Result};
pub use markdown::{MarkdownRenderer, WordPressRenderer};
pub use options::{ConvertOptions, FilteringOptions, MarkdownOptions};
pub use progress::{ConversionProgress, ProgressSnapshot};
pub use quality::analyze_quality;
pub use record::{CategoryInProgress, CategoryKind, PostField, RawPostRecord};
pub use result::{
    ConversionSummary, FilterDecision, PageClassification, PageType, QualityMetrics, SkippedPost,
};
pub use store::{
    ConversionRecord, ConversionStatus, ConversionStore, MemoryStore, NewPost, StoredPost,
};
pub use stream::{ItemOutcome, PostExtractor, XmlEvent};
