//! Error types for the content pipeline
//!
//! The store, formatting and page layers return these typed errors so that
//! callers can tell a missing document apart from a broken connection. The
//! command layer wraps everything in `anyhow`.

use thiserror::Error;

/// Failures talking to the content store
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("request to content store failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("content store returned HTTP {status} for {url}")]
    Status { status: u16, url: String },

    #[error("no {doc_type} document with uid {uid:?}")]
    NotFound { doc_type: String, uid: String },

    #[error("failed to decode content store response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("invalid pagination cursor {0:?}")]
    InvalidCursor(String),

    #[error("content store API root has no master ref")]
    NoMasterRef,

    #[error("content store is not configured: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl StoreError {
    /// Whether the store answered but had no such document
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Failures turning a raw document into display data
#[derive(Debug, Error)]
pub enum FormatError {
    #[error("document {0} has no uid")]
    MissingUid(String),

    #[error("invalid publication date {value:?}: {source}")]
    InvalidDate {
        value: String,
        #[source]
        source: chrono::ParseError,
    },

    #[error("unexpected document data: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Failures building a listing or detail page
#[derive(Debug, Error)]
pub enum PageError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Format(#[from] FormatError),
}

impl PageError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Store(e) if e.is_not_found())
    }
}
