//! Streaming extraction of posts from a WordPress export.
//!
//! # Module Structure
//!
//! - `source`: token source over quick-xml (open/text/CDATA/close events)
//! - `encoding`: charset sniffing from the XML declaration
//! - `tracker`: tag-path state (inside item, inside post meta, open category)
//! - `accumulator`: builds one post record from an item's events
//! - `extractor`: per-stream state machine, finalization and counters
//!
//! # Usage
//!
//! ```rust
//! use std::io::Cursor;
//! use wxr2md::stream::{ExportReader, ItemOutcome, PostExtractor};
//! use wxr2md::FilteringOptions;
//!
//! let xml = r#"<rss><channel><item>
//!   <title>Hello</title>
//!   <content:encoded><![CDATA[<p>World</p>]]></content:encoded>
//! </item></channel></rss>"#;
//!
//! let mut reader = ExportReader::new(Cursor::new(xml))?;
//! let mut extractor = PostExtractor::new(FilteringOptions::default());
//! let mut titles = Vec::new();
//! while let Some(event) = reader.next_event()? {
//!     if let Some(ItemOutcome::Accepted(post)) = extractor.feed(event) {
//!         titles.push(post.record.title);
//!     }
//! }
//! extractor.end();
//! assert_eq!(titles, vec!["Hello"]);
//! # Ok::<(), wxr2md::Error>(())
//! ```

pub mod accumulator;
pub mod encoding;
pub mod extractor;
pub mod source;
pub mod tracker;

pub use accumulator::PostAccumulator;
pub use extractor::{AcceptedPost, ExtractorStats, ItemOutcome, PostExtractor};
pub use source::{count_items, decompress_if_gzip, open_export, ExportReader, XmlEvent};
pub use tracker::{CloseEffect, TagPathTracker};
