//! Content store client
//!
//! The blog treats its CMS as a paginated document store: search by
//! predicates with a field projection, follow the `next_page` cursor, or look
//! a single document up by uid. [`PrismicClient`] talks to a Prismic
//! repository over HTTP; [`MemoryStore`] serves documents from a local JSON
//! file.

mod memory;
mod prismic;
#[cfg(test)]
pub(crate) mod testing;

pub use memory::MemoryStore;
pub use prismic::PrismicClient;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::StoreError;

/// A paginated document store
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Search documents; returns the first page and a cursor for the next one
    async fn query(
        &self,
        predicates: &[Predicate],
        options: &QueryOptions,
    ) -> Result<SearchResponse, StoreError>;

    /// Follow a `next_page` cursor returned by an earlier search
    async fn fetch_page(&self, cursor: &str) -> Result<SearchResponse, StoreError>;

    /// Fetch the single document of `doc_type` whose uid is `uid`
    async fn get_by_uid(&self, doc_type: &str, uid: &str) -> Result<Document, StoreError>;
}

/// An `at(path, value)` predicate
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Predicate {
    pub path: String,
    pub value: String,
}

impl Predicate {
    pub fn at(path: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            value: value.into(),
        }
    }

    /// Documents of the given custom type
    pub fn document_type(doc_type: &str) -> Self {
        Self::at("document.type", doc_type)
    }

    /// The document of `doc_type` with the given uid
    pub fn uid(doc_type: &str, uid: &str) -> Self {
        Self::at(format!("my.{}.uid", doc_type), uid)
    }

    /// Whether a document satisfies this predicate
    pub fn matches(&self, doc: &Document) -> bool {
        match self.path.as_str() {
            "document.type" => doc.doc_type == self.value,
            "document.id" => doc.id == self.value,
            path => match path.strip_prefix("my.").and_then(|p| p.split_once('.')) {
                Some((doc_type, "uid")) => {
                    doc.doc_type == doc_type && doc.uid.as_deref() == Some(self.value.as_str())
                }
                Some((doc_type, field)) => {
                    doc.doc_type == doc_type
                        && doc.data.get(field).and_then(|v| v.as_str())
                            == Some(self.value.as_str())
                }
                None => false,
            },
        }
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = self.value.replace('\\', "\\\\").replace('"', "\\\"");
        write!(f, "[at({},\"{}\")]", self.path, value)
    }
}

/// Render predicates as a Prismic `q` parameter
pub fn query_string(predicates: &[Predicate]) -> String {
    let inner: String = predicates.iter().map(|p| p.to_string()).collect();
    format!("[{}]", inner)
}

/// Search options
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryOptions {
    /// Projected fields as `type.field`; empty means everything
    pub fetch: Vec<String>,
    pub page_size: usize,
}

impl QueryOptions {
    pub fn new(page_size: usize) -> Self {
        Self {
            fetch: Vec::new(),
            page_size,
        }
    }

    pub fn fetch<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fetch = fields.into_iter().map(Into::into).collect();
        self
    }
}

/// A raw document as returned by the store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    #[serde(default)]
    pub uid: Option<String>,
    #[serde(rename = "type")]
    pub doc_type: String,
    #[serde(default)]
    pub first_publication_date: Option<String>,
    #[serde(default)]
    pub last_publication_date: Option<String>,
    #[serde(default)]
    pub data: serde_json::Value,
}

impl Document {
    /// Deserialize the type-specific payload
    pub fn data_as<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        if self.data.is_null() {
            serde_json::from_value(serde_json::Value::Object(Default::default()))
        } else {
            T::deserialize(&self.data)
        }
    }
}

/// One page of search results
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResponse {
    #[serde(default = "first_page")]
    pub page: usize,
    #[serde(default)]
    pub results_per_page: usize,
    #[serde(default)]
    pub total_results_size: usize,
    #[serde(default)]
    pub total_pages: usize,
    #[serde(default)]
    pub next_page: Option<String>,
    #[serde(default)]
    pub results: Vec<Document>,
}

fn first_page() -> usize {
    1
}
