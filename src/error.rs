//! Error types for wxr2md.
//!
//! Only failures that end a conversion are represented here. Stray closing
//! tags and items missing a title or body are recovered inside the stream
//! machinery and surface as counters and log events instead.

/// Error type for conversion operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Filtering thresholds rejected before any stream processing.
    #[error("Invalid filtering options: {0}")]
    InvalidOptions(String),

    /// The underlying byte source failed (read error, corrupt gzip member).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The XML token stream could not be continued.
    #[error("XML stream error: {0}")]
    Xml(String),

    /// The storage sink refused an operation.
    #[error("Storage error: {0}")]
    Storage(String),

    /// No conversion with the given id exists in the store.
    #[error("Conversion {0} not found")]
    ConversionNotFound(u64),

    /// No post with the given id exists in the store.
    #[error("Post {0} not found")]
    PostNotFound(u64),

    /// Writing the ZIP package failed.
    #[error("Archive error: {0}")]
    Archive(String),
}

impl Error {
    /// True for failures of the source stream itself, which map to a
    /// `failed` conversion status.
    #[must_use]
    pub fn is_stream_failure(&self) -> bool {
        matches!(self, Self::Io(_) | Self::Xml(_))
    }
}

impl From<quick_xml::Error> for Error {
    fn from(e: quick_xml::Error) -> Self {
        match e {
            quick_xml::Error::Io(io) => Self::Io(std::io::Error::new(io.kind(), io.to_string())),
            other => Self::Xml(other.to_string()),
        }
    }
}

impl From<zip::result::ZipError> for Error {
    fn from(e: zip::result::ZipError) -> Self {
        Self::Archive(e.to_string())
    }
}

/// Result type alias for conversion operations.
pub type Result<T> = std::result::Result<T, Error>;
