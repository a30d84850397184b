//! Storage sink for conversions and their accepted posts.
//!
//! [`ConversionStore`] is the narrow interface the pipeline writes through.
//! [`MemoryStore`] keeps everything in process memory, which is enough for
//! the CLI and for tests; durability is not a concern here.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::options::FilteringOptions;
use crate::result::QualityMetrics;

/// Lifecycle state of a conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConversionStatus {
    Processing,
    Completed,
    Failed,
}

/// One conversion run as seen by a progress poller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversionRecord {
    pub id: u64,
    pub filename: String,
    pub options: FilteringOptions,
    pub status: ConversionStatus,
    pub processed: u64,
    /// `None` until the item total is known.
    pub total: Option<u64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields of an accepted post handed to the store.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPost {
    pub title: String,
    pub slug: String,
    pub file_name: String,
    pub markdown: String,
    pub excerpt: String,
    pub published_at: String,
    pub status: String,
    pub post_type: String,
    pub author: String,
    pub permalink: String,
    pub categories: Vec<String>,
    pub tags: Vec<String>,
    pub custom_fields: BTreeMap<String, String>,
    pub metrics: Option<QualityMetrics>,
}

/// A post as persisted, with its ids.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredPost {
    pub id: u64,
    pub conversion_id: u64,
    #[serde(flatten)]
    pub post: NewPost,
}

/// Operations the conversion pipeline needs from its storage.
pub trait ConversionStore {
    /// Register a new conversion in the `processing` state.
    fn create_conversion(&self, filename: &str, options: &FilteringOptions) -> Result<u64>;

    fn record_progress(&self, id: u64, processed: u64, total: Option<u64>) -> Result<()>;

    fn record_status(&self, id: u64, status: ConversionStatus) -> Result<()>;

    /// Store an accepted post and return its id.
    fn append_post(&self, conversion_id: u64, post: NewPost) -> Result<u64>;

    /// Posts of a conversion in the order they were appended.
    fn list_posts(&self, conversion_id: u64) -> Result<Vec<StoredPost>>;

    fn get_post(&self, id: u64) -> Result<StoredPost>;

    fn get_conversion(&self, id: u64) -> Result<ConversionRecord>;
}

#[derive(Debug, Default)]
struct Tables {
    next_conversion_id: u64,
    next_post_id: u64,
    conversions: BTreeMap<u64, ConversionRecord>,
    posts: BTreeMap<u64, StoredPost>,
}

/// In-memory store with monotonically increasing ids.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Tables>> {
        self.tables
            .lock()
            .map_err(|_| Error::Storage("memory store lock poisoned".into()))
    }

    fn with_conversion<T>(&self, id: u64, f: impl FnOnce(&mut ConversionRecord) -> T) -> Result<T> {
        let mut tables = self.lock()?;
        let record = tables
            .conversions
            .get_mut(&id)
            .ok_or(Error::ConversionNotFound(id))?;
        let value = f(record);
        record.updated_at = Utc::now();
        Ok(value)
    }
}

impl ConversionStore for MemoryStore {
    fn create_conversion(&self, filename: &str, options: &FilteringOptions) -> Result<u64> {
        let mut tables = self.lock()?;
        tables.next_conversion_id += 1;
        let id = tables.next_conversion_id;
        let now = Utc::now();
        tables.conversions.insert(
            id,
            ConversionRecord {
                id,
                filename: filename.to_string(),
                options: options.clone(),
                status: ConversionStatus::Processing,
                processed: 0,
                total: None,
                created_at: now,
                updated_at: now,
            },
        );
        Ok(id)
    }

    fn record_progress(&self, id: u64, processed: u64, total: Option<u64>) -> Result<()> {
        self.with_conversion(id, |record| {
            record.processed = processed;
            if total.is_some() {
                record.total = total;
            }
        })
    }

    fn record_status(&self, id: u64, status: ConversionStatus) -> Result<()> {
        self.with_conversion(id, |record| record.status = status)
    }

    fn append_post(&self, conversion_id: u64, post: NewPost) -> Result<u64> {
        let mut tables = self.lock()?;
        if !tables.conversions.contains_key(&conversion_id) {
            return Err(Error::ConversionNotFound(conversion_id));
        }
        tables.next_post_id += 1;
        let id = tables.next_post_id;
        tables.posts.insert(
            id,
            StoredPost {
                id,
                conversion_id,
                post,
            },
        );
        Ok(id)
    }

    fn list_posts(&self, conversion_id: u64) -> Result<Vec<StoredPost>> {
        let tables = self.lock()?;
        if !tables.conversions.contains_key(&conversion_id) {
            return Err(Error::ConversionNotFound(conversion_id));
        }
        Ok(tables
            .posts
            .values()
            .filter(|p| p.conversion_id == conversion_id)
            .cloned()
            .collect())
    }

    fn get_post(&self, id: u64) -> Result<StoredPost> {
        self.lock()?
            .posts
            .get(&id)
            .cloned()
            .ok_or(Error::PostNotFound(id))
    }

    fn get_conversion(&self, id: u64) -> Result<ConversionRecord> {
        self.lock()?
            .conversions
            .get(&id)
            .cloned()
            .ok_or(Error::ConversionNotFound(id))
    }
}
