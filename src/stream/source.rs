//! Token source over a WordPress export.
//!
//! Turns quick-xml events into owned [`XmlEvent`]s: open, text, CDATA and
//! close. Self-closing elements become an open followed by a close. End-name
//! checking is disabled and unmatched ends are allowed, so that malformed
//! closing tags reach the tracker, which ignores them, instead of aborting
//! the whole stream.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use encoding_rs::Encoding;
use flate2::bufread::MultiGzDecoder;
use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;

use super::encoding::{decode, detect_encoding};
use super::tracker::TagPathTracker;
use crate::error::Result;

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Buffer size for reading export files.
const READ_BUFFER_BYTES: usize = 1024 * 1024;

/// One structural event from the export, in document order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum XmlEvent {
    /// Element start with its qualified name and attributes.
    Open {
        name: String,
        attributes: Vec<(String, String)>,
    },
    /// Unescaped character data.
    Text(String),
    /// Raw CDATA section content.
    CData(String),
    /// Element end.
    Close(String),
}

impl XmlEvent {
    /// Convenience constructor for an open event without attributes.
    #[must_use]
    pub fn open(name: impl Into<String>) -> Self {
        Self::Open {
            name: name.into(),
            attributes: Vec::new(),
        }
    }
}

/// Streaming reader producing [`XmlEvent`]s.
pub struct ExportReader<R: BufRead> {
    reader: Reader<R>,
    buf: Vec<u8>,
    encoding: &'static Encoding,
    pending_close: Option<String>,
}

impl<R: BufRead> ExportReader<R> {
    /// Wrap a buffered byte source. The head of the stream is inspected for
    /// an XML declaration naming the charset.
    pub fn new(mut inner: R) -> Result<Self> {
        let encoding = detect_encoding(inner.fill_buf()?);

        let mut reader = Reader::from_reader(inner);
        let config = reader.config_mut();
        config.trim_text(false);
        config.check_end_names = false;
        config.allow_unmatched_ends = true;

        Ok(Self {
            reader,
            buf: Vec::with_capacity(8192),
            encoding,
            pending_close: None,
        })
    }

    /// Encoding used to decode the stream.
    #[must_use]
    pub fn encoding(&self) -> &'static Encoding {
        self.encoding
    }

    /// Next structural event, or `None` at end of stream.
    pub fn next_event(&mut self) -> Result<Option<XmlEvent>> {
        if let Some(name) = self.pending_close.take() {
            return Ok(Some(XmlEvent::Close(name)));
        }

        let encoding = self.encoding;
        loop {
            self.buf.clear();
            let event = match self.reader.read_event_into(&mut self.buf)? {
                Event::Start(ref e) => open_event(e, encoding),
                Event::Empty(ref e) => {
                    let event = open_event(e, encoding);
                    if let XmlEvent::Open { ref name, .. } = event {
                        self.pending_close = Some(name.clone());
                    }
                    event
                }
                Event::End(ref e) => XmlEvent::Close(decode(e.name().as_ref(), encoding).into_owned()),
                Event::Text(ref e) => {
                    let raw = decode(e, encoding);
                    // Exports often carry HTML entities (&nbsp;) that are not
                    // valid XML; keep the raw text when unescaping fails.
                    let text = quick_xml::escape::unescape(&raw)
                        .map_or_else(|_| raw.to_string(), std::borrow::Cow::into_owned);
                    XmlEvent::Text(text)
                }
                Event::CData(ref e) => XmlEvent::CData(decode(e, encoding).into_owned()),
                Event::Eof => return Ok(None),
                _ => continue,
            };
            return Ok(Some(event));
        }
    }
}

impl<R: BufRead> Iterator for ExportReader<R> {
    type Item = Result<XmlEvent>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_event().transpose()
    }
}

fn open_event(e: &BytesStart<'_>, encoding: &'static Encoding) -> XmlEvent {
    let name = decode(e.name().as_ref(), encoding).into_owned();
    let attributes = e
        .attributes()
        .flatten()
        .map(|attr| {
            let key = decode(attr.key.as_ref(), encoding).into_owned();
            let raw = decode(&attr.value, encoding);
            let value = quick_xml::escape::unescape(&raw)
                .map_or_else(|_| raw.to_string(), std::borrow::Cow::into_owned);
            (key, value)
        })
        .collect();
    XmlEvent::Open { name, attributes }
}

/// Wrap a byte source in a gzip decoder when it starts with the gzip magic.
pub fn decompress_if_gzip<'a, R: BufRead + 'a>(mut inner: R) -> Result<Box<dyn BufRead + 'a>> {
    let is_gzip = inner.fill_buf()?.starts_with(&GZIP_MAGIC);
    if is_gzip {
        let decoder = MultiGzDecoder::new(inner);
        Ok(Box::new(BufReader::with_capacity(READ_BUFFER_BYTES, decoder)))
    } else {
        Ok(Box::new(inner))
    }
}

/// Open an export file, transparently decompressing `.xml.gz` files.
pub fn open_export(path: impl AsRef<Path>) -> Result<ExportReader<Box<dyn BufRead>>> {
    let file = File::open(path.as_ref())?;
    let buffered = BufReader::with_capacity(READ_BUFFER_BYTES, file);
    ExportReader::new(decompress_if_gzip(buffered)?)
}

/// Count item spans in an export without building any records.
///
/// This is the pre-pass that provides the progress denominator.
pub fn count_items<R: BufRead>(reader: &mut ExportReader<R>) -> Result<u64> {
    let mut tracker = TagPathTracker::new();
    let mut total = 0;
    while let Some(event) = reader.next_event()? {
        match event {
            XmlEvent::Open { name, attributes } => {
                if tracker.open(&name, &attributes) {
                    total += 1;
                }
            }
            XmlEvent::Close(name) => {
                tracker.close(&name);
            }
            XmlEvent::Text(_) | XmlEvent::CData(_) => {}
        }
    }
    Ok(total)
}
