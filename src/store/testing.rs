//! Shared fixtures for tests

use async_trait::async_trait;
use serde_json::json;

use super::{ContentStore, Document, MemoryStore, Predicate, QueryOptions, SearchResponse};
use crate::error::StoreError;

/// Three posts and one page, in store order
pub(crate) fn sample_store() -> MemoryStore {
    let docs = json!([
        {
            "id": "P1", "uid": "first-post", "type": "post",
            "first_publication_date": "2021-03-15T19:25:28+0000",
            "data": {
                "title": "First", "subtitle": "One", "author": "Ana",
                "banner": {
                    "url": "https://images.prismic.io/b1.png",
                    "alt": "Rocket",
                    "dimensions": { "width": 1440, "height": 600 }
                },
                "content": [
                    {
                        "heading": "Intro",
                        "body": [{ "type": "paragraph", "text": "one two three", "spans": [] }]
                    }
                ]
            }
        },
        {
            "id": "P2", "uid": "second-post", "type": "post",
            "first_publication_date": "2021-03-20T10:00:00+0000",
            "data": {
                "title": "Second", "subtitle": "Two", "author": "Bruno",
                "banner": { "url": "https://images.prismic.io/b2.png" },
                "content": []
            }
        },
        { "id": "A1", "uid": "about", "type": "page", "data": { "title": "About" } },
        {
            "id": "P3", "uid": "third-post", "type": "post",
            "first_publication_date": null,
            "data": { "title": "Third", "subtitle": "Three", "author": "Carla" }
        }
    ]);
    MemoryStore::new(serde_json::from_value(docs).unwrap())
}

/// A store whose every call fails like a dropped connection
pub(crate) struct FailingStore;

#[async_trait]
impl ContentStore for FailingStore {
    async fn query(
        &self,
        _predicates: &[Predicate],
        _options: &QueryOptions,
    ) -> Result<SearchResponse, StoreError> {
        Err(unavailable())
    }

    async fn fetch_page(&self, _cursor: &str) -> Result<SearchResponse, StoreError> {
        Err(unavailable())
    }

    async fn get_by_uid(&self, _doc_type: &str, _uid: &str) -> Result<Document, StoreError> {
        Err(unavailable())
    }
}

fn unavailable() -> StoreError {
    StoreError::Status {
        status: 503,
        url: "https://spacetraveling.cdn.prismic.io/api/v2".to_string(),
    }
}
