//! In-memory document store
//!
//! Serves documents from a JSON file (either a search response with a
//! `results` array or a bare array of documents). Used for offline builds and
//! in tests. Cursors look like `memory://search?page=2&pageSize=2&…`.

use async_trait::async_trait;
use serde_json::Value;
use std::path::Path;
use url::Url;

use super::{ContentStore, Document, Predicate, QueryOptions, SearchResponse};
use crate::error::StoreError;

const CURSOR_BASE: &str = "memory://search";

/// Documents held in insertion order
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    documents: Vec<Document>,
}

impl MemoryStore {
    pub fn new(documents: Vec<Document>) -> Self {
        Self { documents }
    }

    /// Load documents from a JSON fixture file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let value: Value = serde_json::from_str(&content)?;
        let documents: Vec<Document> = match value {
            Value::Object(mut obj) => match obj.remove("results") {
                Some(results) => serde_json::from_value(results)?,
                None => Vec::new(),
            },
            other => serde_json::from_value(other)?,
        };
        tracing::debug!("Loaded {} documents from {:?}", documents.len(), path.as_ref());
        Ok(Self::new(documents))
    }

    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    fn search(&self, predicates: &[Predicate], options: &QueryOptions, page: usize) -> SearchResponse {
        let page_size = options.page_size.max(1);
        let page = page.max(1);
        let matching: Vec<&Document> = self
            .documents
            .iter()
            .filter(|doc| predicates.iter().all(|p| p.matches(doc)))
            .collect();

        let total = matching.len();
        let total_pages = total.div_ceil(page_size);
        // A page past any addressable offset is empty
        let results = match (page - 1).checked_mul(page_size) {
            Some(offset) => matching
                .into_iter()
                .skip(offset)
                .take(page_size)
                .map(|doc| project(doc, &options.fetch))
                .collect(),
            None => Vec::new(),
        };

        let next_page = (page < total_pages).then(|| cursor(predicates, options, page + 1));

        SearchResponse {
            page,
            results_per_page: page_size,
            total_results_size: total,
            total_pages,
            next_page,
            results,
        }
    }
}

/// Keep only the fetched `type.field` entries of the data payload
fn project(doc: &Document, fetch: &[String]) -> Document {
    let mut projected = doc.clone();
    if fetch.is_empty() {
        return projected;
    }

    let keep: Vec<&str> = fetch
        .iter()
        .filter_map(|f| f.split_once('.'))
        .filter(|(doc_type, _)| *doc_type == doc.doc_type)
        .map(|(_, field)| field)
        .collect();
    if let Value::Object(data) = &mut projected.data {
        data.retain(|key, _| keep.contains(&key.as_str()));
    }
    projected
}

fn cursor(predicates: &[Predicate], options: &QueryOptions, page: usize) -> String {
    let mut pairs = url::form_urlencoded::Serializer::new(String::new());
    pairs.append_pair("page", &page.to_string());
    pairs.append_pair("pageSize", &options.page_size.to_string());
    if !options.fetch.is_empty() {
        pairs.append_pair("fetch", &options.fetch.join(","));
    }
    for p in predicates {
        pairs.append_pair("at", &format!("{}|{}", p.path, p.value));
    }
    format!("{}?{}", CURSOR_BASE, pairs.finish())
}

fn parse_cursor(cursor: &str) -> Result<(Vec<Predicate>, QueryOptions, usize), StoreError> {
    let invalid = || StoreError::InvalidCursor(cursor.to_string());
    let url = Url::parse(cursor).map_err(|_| invalid())?;
    if url.scheme() != "memory" {
        return Err(invalid());
    }

    let mut predicates = Vec::new();
    let mut options = QueryOptions::new(0);
    let mut page: Option<usize> = None;

    for (key, value) in url.query_pairs() {
        match key.as_ref() {
            "page" => page = Some(value.parse().map_err(|_| invalid())?),
            "pageSize" => options.page_size = value.parse().map_err(|_| invalid())?,
            "fetch" => options.fetch = value.split(',').map(str::to_string).collect(),
            "at" => {
                let (path, value) = value.split_once('|').ok_or_else(invalid)?;
                predicates.push(Predicate::at(path, value));
            }
            _ => {}
        }
    }

    let page = page.ok_or_else(invalid)?;
    Ok((predicates, options, page))
}

#[async_trait]
impl ContentStore for MemoryStore {
    async fn query(
        &self,
        predicates: &[Predicate],
        options: &QueryOptions,
    ) -> Result<SearchResponse, StoreError> {
        Ok(self.search(predicates, options, 1))
    }

    async fn fetch_page(&self, cursor: &str) -> Result<SearchResponse, StoreError> {
        let (predicates, options, page) = parse_cursor(cursor)?;
        Ok(self.search(&predicates, &options, page))
    }

    async fn get_by_uid(&self, doc_type: &str, uid: &str) -> Result<Document, StoreError> {
        let predicate = Predicate::uid(doc_type, uid);
        self.documents
            .iter()
            .find(|doc| predicate.matches(doc))
            .cloned()
            .ok_or_else(|| StoreError::NotFound {
                doc_type: doc_type.to_string(),
                uid: uid.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::testing::sample_store;
    use serde_json::json;

    #[tokio::test]
    async fn test_query_paginates_in_store_order() {
        let store = sample_store();
        let options = QueryOptions::new(2).fetch(["post.title"]);
        let first = store
            .query(&[Predicate::document_type("post")], &options)
            .await
            .unwrap();

        let uids: Vec<_> = first.results.iter().map(|d| d.uid.clone().unwrap()).collect();
        assert_eq!(uids, vec!["first-post", "second-post"]);
        assert_eq!(first.total_results_size, 3);
        assert_eq!(first.total_pages, 2);
        assert_eq!(first.results[0].data, json!({ "title": "First" }));

        let next = first.next_page.unwrap();
        let second = store.fetch_page(&next).await.unwrap();
        assert_eq!(second.page, 2);
        assert_eq!(second.results.len(), 1);
        assert_eq!(second.results[0].uid.as_deref(), Some("third-post"));
        assert_eq!(second.results[0].data, json!({ "title": "Third" }));
        assert!(second.next_page.is_none());
    }

    #[tokio::test]
    async fn test_get_by_uid() {
        let store = sample_store();
        let doc = store.get_by_uid("post", "second-post").await.unwrap();
        assert_eq!(doc.id, "P2");

        let err = store.get_by_uid("post", "about").await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_invalid_cursor() {
        let store = sample_store();
        for cursor in ["https://example.com/?page=2", "memory://search?pageSize=2", "%%"] {
            let err = store.fetch_page(cursor).await.unwrap_err();
            assert!(matches!(err, StoreError::InvalidCursor(_)), "{}", cursor);
        }
    }

    #[tokio::test]
    async fn test_cursor_past_the_end() {
        let store = sample_store();
        let cursor = format!(
            "memory://search?page={}&pageSize=2&at=document.type%7Cpost",
            usize::MAX
        );
        let response = store.fetch_page(&cursor).await.unwrap();
        assert!(response.results.is_empty());
        assert!(response.next_page.is_none());
        assert_eq!(response.total_results_size, 3);

        let response = store
            .fetch_page("memory://search?page=3&pageSize=2&at=document.type%7Cpost")
            .await
            .unwrap();
        assert!(response.results.is_empty());
        assert!(response.next_page.is_none());
    }

    #[test]
    fn test_load_fixture_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("posts.json");
        std::fs::write(
            &path,
            r#"{ "results": [ { "id": "X", "uid": "x", "type": "post", "data": {} } ] }"#,
        )
        .unwrap();
        let store = MemoryStore::load(&path).unwrap();
        assert_eq!(store.documents().len(), 1);

        std::fs::write(&path, r#"[ { "id": "Y", "type": "post" } ]"#).unwrap();
        let store = MemoryStore::load(&path).unwrap();
        assert_eq!(store.documents()[0].id, "Y");
    }

    #[tokio::test]
    async fn test_demo_fixture() {
        let response: SearchResponse =
            serde_json::from_str(include_str!("../../demos/site/posts.json")).unwrap();
        let store = MemoryStore::new(response.results);

        let first = store
            .query(&[Predicate::document_type("post")], &QueryOptions::new(2))
            .await
            .unwrap();
        assert_eq!(first.total_results_size, 3);
        assert!(first.next_page.is_some());
    }
}
