//! ZIP packaging of converted posts.

use std::collections::HashSet;
use std::io::{Seek, Write};

use tracing::debug;
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::error::Result;
use crate::store::{ConversionStore, StoredPost};

/// Write every post of a conversion into a ZIP archive, one deflated `.md`
/// file per post. Returns the number of files written.
pub fn write_zip<W: Write + Seek>(
    store: &dyn ConversionStore,
    conversion_id: u64,
    writer: W,
) -> Result<usize> {
    let posts = store.list_posts(conversion_id)?;
    write_posts(&posts, writer)
}

/// Write the given posts into a ZIP archive.
pub fn write_posts<W: Write + Seek>(posts: &[StoredPost], writer: W) -> Result<usize> {
    let mut zip = ZipWriter::new(writer);
    let options = FileOptions::default().compression_method(CompressionMethod::Deflated);

    let mut names = UniqueNames::default();
    for post in posts {
        let name = names.claim(&post.post.file_name);
        zip.start_file(name.as_str(), options)?;
        zip.write_all(post.post.markdown.as_bytes())?;
    }
    zip.finish()?;

    debug!(files = posts.len(), "wrote zip package");
    Ok(posts.len())
}

/// Hands out file names, suffixing `-2`, `-3`... on collisions.
#[derive(Debug, Default)]
pub struct UniqueNames {
    taken: HashSet<String>,
}

impl UniqueNames {
    pub fn claim(&mut self, wanted: &str) -> String {
        let wanted = if wanted.trim().is_empty() { "post.md" } else { wanted };
        let (stem, ext) = match wanted.rsplit_once('.') {
            Some((stem, ext)) if !stem.is_empty() => (stem, format!(".{ext}")),
            _ => (wanted, String::new()),
        };

        let mut candidate = wanted.to_string();
        let mut n = 1;
        while self.taken.contains(&candidate) {
            n += 1;
            candidate = format!("{stem}-{n}{ext}");
        }
        self.taken.insert(candidate.clone());
        candidate
    }
}
