//! End-to-end conversion pipeline.
//!
//! A [`Converter`] drives one export through the extractor, renders every
//! accepted post to Markdown and appends it to a [`ConversionStore`],
//! recording progress after each finalized item and the final status when
//! the stream ends or fails.

use std::io::BufRead;
use std::path::Path;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::error::Result;
use crate::markdown::{post_file_name, post_slug, render_document, MarkdownRenderer, WordPressRenderer};
use crate::options::ConvertOptions;
use crate::progress::ConversionProgress;
use crate::result::ConversionSummary;
use crate::store::{ConversionStatus, ConversionStore, NewPost};
use crate::stream::{
    count_items, decompress_if_gzip, open_export, AcceptedPost, ExportReader, ItemOutcome, PostExtractor,
};

/// Converts WordPress exports into stored Markdown posts.
pub struct Converter<'s> {
    options: ConvertOptions,
    store: &'s dyn ConversionStore,
    renderer: Box<dyn MarkdownRenderer>,
    progress: Arc<ConversionProgress>,
}

impl<'s> Converter<'s> {
    /// Create a converter writing into `store`.
    ///
    /// Options are validated here so that bad thresholds are rejected before
    /// any stream is opened.
    pub fn new(options: ConvertOptions, store: &'s dyn ConversionStore) -> Result<Self> {
        options.filtering.validate()?;
        let renderer = Box::new(WordPressRenderer::new(options.markdown.clone()));
        Ok(Self {
            options,
            store,
            renderer,
            progress: Arc::new(ConversionProgress::new()),
        })
    }

    /// Replace the Markdown renderer.
    #[must_use]
    pub fn with_renderer(mut self, renderer: impl MarkdownRenderer + 'static) -> Self {
        self.renderer = Box::new(renderer);
        self
    }

    /// Share progress counters with a poller.
    #[must_use]
    pub fn with_progress(mut self, progress: Arc<ConversionProgress>) -> Self {
        self.progress = progress;
        self
    }

    #[must_use]
    pub fn progress(&self) -> Arc<ConversionProgress> {
        Arc::clone(&self.progress)
    }

    #[must_use]
    pub fn options(&self) -> &ConvertOptions {
        &self.options
    }

    /// Convert an export file, `.xml` or gzip-compressed.
    ///
    /// Unless `single_pass` is set, the file is read twice: once to count
    /// items for the progress total, once to convert.
    pub fn convert_path(&self, path: impl AsRef<Path>) -> Result<ConversionSummary> {
        let path = path.as_ref();
        let filename = path
            .file_name()
            .map_or_else(|| path.display().to_string(), |name| name.to_string_lossy().into_owned());

        let id = self.store.create_conversion(&filename, &self.options.filtering)?;
        info!(conversion_id = id, file = %filename, single_pass = self.options.single_pass, "starting conversion");

        let result = self.convert_file(id, path);
        self.finish(id, result)
    }

    /// Convert an export from an arbitrary byte source.
    ///
    /// A reader cannot be rewound, so this is always single-pass: the total
    /// is published when the stream ends.
    pub fn convert_reader<R: BufRead>(&self, filename: &str, reader: R) -> Result<ConversionSummary> {
        let id = self.store.create_conversion(filename, &self.options.filtering)?;
        info!(conversion_id = id, file = %filename, "starting conversion");

        let result = decompress_if_gzip(reader)
            .and_then(ExportReader::new)
            .and_then(|mut reader| self.run(id, &mut reader, None));
        self.finish(id, result)
    }

    fn convert_file(&self, id: u64, path: &Path) -> Result<ConversionSummary> {
        let total = if self.options.single_pass {
            None
        } else {
            let total = count_items(&mut open_export(path)?)?;
            debug!(conversion_id = id, total, "counted items");
            Some(total)
        };
        self.run(id, &mut open_export(path)?, total)
    }

    fn finish(&self, id: u64, result: Result<ConversionSummary>) -> Result<ConversionSummary> {
        match result {
            Ok(summary) => {
                self.store.record_status(id, ConversionStatus::Completed)?;
                info!(
                    conversion_id = id,
                    processed = summary.processed,
                    accepted = summary.accepted,
                    skipped = summary.skipped.len(),
                    incomplete = summary.incomplete,
                    malformed = summary.malformed_events,
                    "conversion completed"
                );
                Ok(summary)
            }
            Err(err) => {
                if let Err(status_err) = self.store.record_status(id, ConversionStatus::Failed) {
                    warn!(conversion_id = id, error = %status_err, "could not record failed status");
                }
                warn!(conversion_id = id, error = %err, "conversion failed");
                Err(err)
            }
        }
    }

    fn run<R: BufRead>(
        &self,
        id: u64,
        reader: &mut ExportReader<R>,
        total: Option<u64>,
    ) -> Result<ConversionSummary> {
        if let Some(total) = total {
            self.progress.set_total(total);
            self.store.record_progress(id, 0, Some(total))?;
        }

        let mut extractor = PostExtractor::new(self.options.filtering.clone());
        let mut summary = ConversionSummary {
            conversion_id: id,
            ..ConversionSummary::default()
        };

        loop {
            let event = match reader.next_event() {
                Ok(Some(event)) => event,
                Ok(None) => break,
                Err(err) => return Err(extractor.error(err)),
            };
            let Some(outcome) = extractor.feed(event) else {
                continue;
            };

            match &outcome {
                ItemOutcome::Accepted(post) => {
                    self.store.append_post(id, self.new_post(post))?;
                }
                ItemOutcome::Skipped(skipped) => summary.skipped.push(skipped.clone()),
                ItemOutcome::Incomplete => {}
            }
            self.progress.record(&outcome);
            self.store.record_progress(id, extractor.stats().processed, None)?;
        }

        let stats = extractor.end();
        if total.is_none() {
            self.progress.set_total(stats.processed);
            self.store.record_progress(id, stats.processed, Some(stats.processed))?;
        }

        summary.processed = stats.processed;
        summary.accepted = stats.accepted;
        summary.incomplete = stats.incomplete;
        summary.malformed_events = stats.malformed_events;
        Ok(summary)
    }

    fn new_post(&self, post: &AcceptedPost) -> NewPost {
        let record = &post.record;
        NewPost {
            title: record.title.clone(),
            slug: post_slug(record),
            file_name: post_file_name(record),
            markdown: render_document(
                self.renderer.as_ref(),
                record,
                self.options.markdown.include_front_matter,
            ),
            excerpt: record.excerpt.clone(),
            published_at: record.date().to_string(),
            status: record.status().to_string(),
            post_type: record.post_type().to_string(),
            author: record.author.clone(),
            permalink: record.permalink.clone(),
            categories: record.categories.clone(),
            tags: record.tags.clone(),
            custom_fields: record
                .custom_fields
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
            metrics: post.metrics,
        }
    }
}
