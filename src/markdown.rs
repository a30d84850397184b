//! Markdown rendering for accepted posts.
//!
//! This module turns a post's WordPress HTML into a Markdown document:
//! WordPress-specific pre-processing (auto-paragraphs, caption and media
//! shortcodes, resized attachment images), HTML to Markdown conversion via
//! `quick_html2md`, escaping of literal Markdown characters, and a YAML
//! front matter block carrying the post metadata. It also derives stable
//! slugs and file names for packaging.

use chrono::{DateTime, NaiveDateTime};
use dom_query::{Document, Selection};
use quick_html2md::{html_to_markdown_with_options, MarkdownOptions as Html2MdOptions};
use url::Url;

use crate::options::MarkdownOptions;
use crate::patterns::{
    BLOCK_TAG, CAPTION_MEDIA, CAPTION_SHORTCODE, EMBED_SHORTCODE, MEDIA_SHORTCODE,
    MULTIPLE_NEWLINES, PARAGRAPH_BREAK, SHORTCODE_TAG, SLUG_SEPARATOR, THUMBNAIL_SUFFIX,
    WP_IMAGE_CLASS,
};
use crate::record::RawPostRecord;

/// Characters that have special meaning in Markdown and need escaping.
const MARKDOWN_SPECIAL_CHARS: &[char] = &['\\', '*', '_', '[', ']', '<', '>'];

/// Slug used when nothing better can be derived.
const FALLBACK_SLUG: &str = "untitled";

/// Longest slug kept in file names.
const MAX_SLUG_CHARS: usize = 80;

/// Date layout WordPress uses for `wp:post_date`.
const WP_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Converts an accepted post's HTML body to Markdown.
///
/// Implementations must be deterministic and must not fail: markup they
/// cannot convert is dropped or passed through as text.
pub trait MarkdownRenderer {
    fn render(&self, html: &str) -> String;
}

/// Renderer that understands the markup WordPress stores in exports.
#[derive(Debug, Clone, Default)]
pub struct WordPressRenderer {
    options: MarkdownOptions,
}

impl WordPressRenderer {
    #[must_use]
    pub fn new(options: MarkdownOptions) -> Self {
        Self { options }
    }

    #[must_use]
    pub fn options(&self) -> &MarkdownOptions {
        &self.options
    }

    /// Apply the WordPress pre-processing steps without converting.
    #[must_use]
    pub fn prepare_html(&self, html: &str) -> String {
        let html = autop(html);
        let html = expand_captions(&html);
        let html = expand_shortcodes(&html);
        if self.options.include_images {
            full_size_images(&html)
        } else {
            html
        }
    }
}

impl MarkdownRenderer for WordPressRenderer {
    fn render(&self, html: &str) -> String {
        let prepared = self.prepare_html(html);

        let md_options = Html2MdOptions::new()
            .include_links(self.options.include_links)
            .include_images(self.options.include_images)
            .preserve_tables(self.options.preserve_tables);
        let raw_markdown = html_to_markdown_with_options(&prepared, &md_options);

        let processed = post_process_markdown(&raw_markdown);
        MULTIPLE_NEWLINES.replace_all(processed.trim(), "\n\n").into_owned()
    }
}

/// Render a complete Markdown document for a post.
///
/// With front matter enabled the metadata goes into a YAML block; otherwise
/// the title becomes a level-one heading.
#[must_use]
pub fn render_document(
    renderer: &dyn MarkdownRenderer,
    record: &RawPostRecord,
    include_front_matter: bool,
) -> String {
    let body = renderer.render(record.body());

    let mut document = String::with_capacity(body.len() + 256);
    if include_front_matter {
        document.push_str(&front_matter(record));
    } else {
        document.push_str("# ");
        document.push_str(&escape_markdown(record.title.trim(), false));
        document.push_str("\n\n");
    }
    document.push_str(&body);
    document.push('\n');
    document
}

/// Build the YAML front matter block for a post.
///
/// Scalars are written as JSON strings and lists as JSON arrays, both of
/// which are valid YAML flow values, so titles containing colons or quotes
/// need no further escaping.
#[must_use]
pub fn front_matter(record: &RawPostRecord) -> String {
    let mut out = String::from("---\n");
    push_scalar(&mut out, "title", record.title.trim());
    push_scalar(&mut out, "date", record.date());
    push_scalar(&mut out, "author", &record.author);
    push_scalar(&mut out, "status", record.status());
    push_scalar(&mut out, "type", record.post_type());
    push_scalar(&mut out, "slug", &post_slug(record));
    push_scalar(&mut out, "permalink", &record.permalink);
    push_list(&mut out, "categories", &record.categories);
    push_list(&mut out, "tags", &record.tags);
    out.push_str("---\n\n");
    out
}

fn push_scalar(out: &mut String, key: &str, value: &str) {
    if value.is_empty() {
        return;
    }
    out.push_str(key);
    out.push_str(": ");
    out.push_str(&serde_json::Value::String(value.to_string()).to_string());
    out.push('\n');
}

fn push_list(out: &mut String, key: &str, values: &[String]) {
    if values.is_empty() {
        return;
    }
    let items: Vec<serde_json::Value> = values
        .iter()
        .map(|v| serde_json::Value::String(v.clone()))
        .collect();
    out.push_str(key);
    out.push_str(": ");
    out.push_str(&serde_json::Value::Array(items).to_string());
    out.push('\n');
}

// =============================================================================
// WordPress pre-processing
// =============================================================================

/// Wrap plain-text bodies in paragraphs.
///
/// The classic editor stores paragraphs as blank-line separated text. Bodies
/// that already contain block-level markup are returned unchanged.
#[must_use]
pub fn autop(html: &str) -> String {
    if html.trim().is_empty() || BLOCK_TAG.is_match(html) {
        return html.to_string();
    }

    let mut out = String::with_capacity(html.len() + 64);
    for chunk in PARAGRAPH_BREAK.split(html.trim()) {
        let chunk = chunk.trim();
        if chunk.is_empty() {
            continue;
        }
        out.push_str("<p>");
        out.push_str(&chunk.replace("\r\n", "\n").replace('\n', "<br />\n"));
        out.push_str("</p>\n");
    }
    out
}

/// Replace `[caption]` shortcodes with `<figure>`/`<figcaption>` markup.
#[must_use]
pub fn expand_captions(html: &str) -> String {
    if !html.contains("[caption") {
        return html.to_string();
    }
    CAPTION_SHORTCODE
        .replace_all(html, |caps: &regex::Captures<'_>| {
            let inner = &caps[1];
            match CAPTION_MEDIA.captures(inner) {
                Some(parts) => {
                    let caption = parts[2].trim();
                    if caption.is_empty() {
                        format!("<figure>{}</figure>", &parts[1])
                    } else {
                        format!("<figure>{}<figcaption>{caption}</figcaption></figure>", &parts[1])
                    }
                }
                None => inner.to_string(),
            }
        })
        .into_owned()
}

/// Resolve the shortcodes that survive into exported bodies.
///
/// `[embed]` and sourced `[video]`/`[audio]` shortcodes become links to
/// their media. Gallery, form and page-builder tags have nothing to render
/// and are removed, keeping any text they wrap.
#[must_use]
pub fn expand_shortcodes(html: &str) -> String {
    if !html.contains('[') {
        return html.to_string();
    }
    let html = EMBED_SHORTCODE.replace_all(html, r#"<a href="$1">$1</a>"#);
    let html = MEDIA_SHORTCODE.replace_all(&html, r#"<a href="$1">$1</a>"#);
    SHORTCODE_TAG.replace_all(&html, "").into_owned()
}

/// Point resized attachment images at the original upload.
///
/// WordPress inserts `photo-300x200.jpg` for a `size-medium` image with class
/// `wp-image-N`; the full image is the same URL without the size suffix.
#[must_use]
pub fn full_size_images(html: &str) -> String {
    if !WP_IMAGE_CLASS.is_match(html) {
        return html.to_string();
    }

    let doc = Document::from(html);
    let mut changed = false;
    for node in doc.select("img").nodes() {
        let img = Selection::from(*node);
        let Some(class) = img.attr("class") else {
            continue;
        };
        if !WP_IMAGE_CLASS.is_match(&class) || class.contains("size-full") {
            continue;
        }
        let Some(src) = img.attr("src") else {
            continue;
        };
        if let Some(full) = strip_thumbnail_suffix(&src) {
            img.set_attr("src", &full);
            img.remove_attr("srcset");
            changed = true;
        }
    }

    if changed {
        doc.select("body").inner_html().to_string()
    } else {
        html.to_string()
    }
}

/// `photo-300x200.jpg?v=2` becomes `photo.jpg?v=2`; `None` if there is no
/// size suffix.
#[must_use]
pub fn strip_thumbnail_suffix(src: &str) -> Option<String> {
    THUMBNAIL_SUFFIX
        .is_match(src)
        .then(|| THUMBNAIL_SUFFIX.replace(src, "${1}${2}").into_owned())
}

// =============================================================================
// Slugs and file names
// =============================================================================

/// Lowercase ASCII slug with single dashes.
#[must_use]
pub fn slugify(text: &str) -> String {
    let lowered = text.to_lowercase();
    let slug = SLUG_SEPARATOR.replace_all(&lowered, "-");
    let slug = slug.trim_matches('-');
    let mut slug: String = slug.chars().take(MAX_SLUG_CHARS).collect();
    while slug.ends_with('-') {
        slug.pop();
    }
    slug
}

/// Slug for a post: the exported slug, else the permalink's last path
/// segment, else the title.
#[must_use]
pub fn post_slug(record: &RawPostRecord) -> String {
    let candidates = [
        record.slug_hint.clone(),
        permalink_segment(&record.permalink).unwrap_or_default(),
        record.title.clone(),
    ];
    candidates
        .iter()
        .map(|candidate| slugify(candidate))
        .find(|slug| !slug.is_empty())
        .unwrap_or_else(|| FALLBACK_SLUG.to_string())
}

fn permalink_segment(permalink: &str) -> Option<String> {
    let url = Url::parse(permalink.trim()).ok()?;
    let segment = url.path_segments()?.filter(|s| !s.is_empty()).last()?;
    Some(segment.to_string())
}

/// File name for a post: `YYYY-MM-DD-slug.md` when the date parses,
/// `slug.md` otherwise.
#[must_use]
pub fn post_file_name(record: &RawPostRecord) -> String {
    let slug = post_slug(record);
    match post_date(record) {
        Some(date) => format!("{}-{slug}.md", date.format("%Y-%m-%d")),
        None => format!("{slug}.md"),
    }
}

/// Parse the post date from `wp:post_date` or the RSS `pubDate`.
///
/// Unpublished drafts carry `0000-00-00 00:00:00`, which does not parse.
#[must_use]
pub fn post_date(record: &RawPostRecord) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(record.published_at.trim(), WP_DATE_FORMAT)
        .ok()
        .or_else(|| {
            DateTime::parse_from_rfc2822(record.pub_date.trim())
                .ok()
                .map(|dt| dt.naive_utc())
        })
}

// =============================================================================
// Escaping
// =============================================================================

/// Escape Markdown special characters in text content.
///
/// # Examples
///
/// ```
/// use wxr2md::markdown::escape_markdown;
///
/// assert_eq!(escape_markdown("*not italic*", false), r"\*not italic\*");
/// assert_eq!(escape_markdown("my_variable_name", false), r"my\_variable\_name");
/// assert_eq!(escape_markdown("*text*", true), "*text*");
/// ```
#[must_use]
pub fn escape_markdown(text: &str, in_code_block: bool) -> String {
    if in_code_block || text.is_empty() {
        return text.to_string();
    }

    let mut result = String::with_capacity(text.len() + text.len() / 4);

    for ch in text.chars() {
        if MARKDOWN_SPECIAL_CHARS.contains(&ch) {
            result.push('\\');
        }
        result.push(ch);
    }

    result
}

/// Escape special characters that appear as literal text in converted
/// Markdown.
///
/// Works line by line. Fenced code blocks pass through untouched. Each
/// other line keeps its block marker (heading, blockquote, list item) and
/// has its inline text escaped, except for code spans, converter-produced
/// links and paired emphasis.
#[must_use]
pub fn post_process_markdown(markdown: &str) -> String {
    let mut out = String::with_capacity(markdown.len() + markdown.len() / 8);
    let mut in_fence = false;

    for (index, line) in markdown.split('\n').enumerate() {
        if index > 0 {
            out.push('\n');
        }
        let trimmed = line.trim_start();
        if trimmed.starts_with("```") || trimmed.starts_with("~~~") {
            in_fence = !in_fence;
            out.push_str(line);
            continue;
        }
        if in_fence {
            out.push_str(line);
            continue;
        }

        let (marker, text) = split_block_marker(line);
        out.push_str(marker);
        escape_inline(text, &mut out);
    }

    out
}

/// Split a line into its leading block marker and the inline text.
fn split_block_marker(line: &str) -> (&str, &str) {
    let body = line.trim_start();
    let mut end = line.len() - body.len();
    let bytes = line.as_bytes();

    while bytes.get(end) == Some(&b'>') {
        end += 1;
        while bytes.get(end) == Some(&b' ') {
            end += 1;
        }
    }
    let rest = &line[end..];

    let hashes = rest.bytes().take_while(|&b| b == b'#').count();
    if (1..=6).contains(&hashes) && rest[hashes..].starts_with(' ') {
        end += hashes + 1;
    } else if let [b'-' | b'*' | b'+', b' ', ..] = rest.as_bytes() {
        end += 2;
    } else {
        let digits = rest.bytes().take_while(u8::is_ascii_digit).count();
        if digits > 0 && rest[digits..].starts_with(". ") {
            end += digits + 2;
        }
    }

    line.split_at(end)
}

fn escape_inline(text: &str, out: &mut String) {
    let mut chars = text.chars().peekable();
    let mut in_code = false;
    let mut prev: Option<char> = out.chars().last();

    while let Some(ch) = chars.next() {
        match ch {
            '`' => {
                in_code = !in_code;
                out.push(ch);
            }
            _ if in_code => out.push(ch),
            '\\' => {
                out.push(ch);
                if let Some(next) = chars.next_if(|c| MARKDOWN_SPECIAL_CHARS.contains(c)) {
                    out.push(next);
                }
            }
            '*' | '_' => {
                if chars.peek() == Some(&ch) {
                    chars.next();
                    out.push(ch);
                    out.push(ch);
                } else {
                    let next = chars.peek().copied();
                    if !is_emphasis_marker(ch, prev, next) {
                        out.push('\\');
                    }
                    out.push(ch);
                }
            }
            '[' => {
                if !has_link_close(chars.clone()) {
                    out.push('\\');
                }
                out.push(ch);
            }
            ']' => {
                if chars.peek() != Some(&'(') {
                    out.push('\\');
                }
                out.push(ch);
            }
            _ if MARKDOWN_SPECIAL_CHARS.contains(&ch) => {
                out.push('\\');
                out.push(ch);
            }
            _ => out.push(ch),
        }
        prev = out.chars().last();
    }
}

/// A single `*` or `_` is kept when it opens a word or closes one.
fn is_emphasis_marker(marker: char, prev: Option<char>, next: Option<char>) -> bool {
    let prev_is_space = prev.map_or(true, char::is_whitespace);
    let prev_is_word = prev.is_some_and(char::is_alphanumeric);
    let next_is_word = next.is_some_and(char::is_alphanumeric);
    let next_is_space = next.map_or(true, |c| c.is_whitespace() || c == marker);
    ((prev_is_space || prev_is_word) && next_is_word) || (prev_is_word && next_is_space)
}

/// True when the rest of the line contains `](`, closing a link label.
fn has_link_close(rest: impl Iterator<Item = char>) -> bool {
    let mut prev = None;
    for c in rest {
        if c == '\n' {
            return false;
        }
        if prev == Some(']') && c == '(' {
            return true;
        }
        prev = Some(c);
    }
    false
}
