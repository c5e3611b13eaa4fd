//! HTTP client for the Prismic document API

use async_trait::async_trait;
use reqwest::{header, Client};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tokio::sync::OnceCell;
use url::Url;

use super::{query_string, ContentStore, Document, Predicate, QueryOptions, SearchResponse};
use crate::config::PrismicConfig;
use crate::error::StoreError;

/// A thin wrapper around reqwest for a Prismic repository.
pub struct PrismicClient {
    client: Client,
    endpoint: Url,
    access_token: Option<String>,
    /// Master ref, fetched from the API root on first use
    master_ref: OnceCell<String>,
}

#[derive(Debug, Deserialize)]
struct ApiRoot {
    #[serde(default)]
    refs: Vec<ApiRef>,
}

#[derive(Debug, Deserialize)]
struct ApiRef {
    #[serde(rename = "ref")]
    reference: String,
    #[serde(rename = "isMasterRef", default)]
    is_master_ref: bool,
}

impl PrismicClient {
    /// Create a client for the repository API root in `config`
    pub fn new(config: &PrismicConfig) -> Result<Self, StoreError> {
        let endpoint = config.endpoint.as_deref().ok_or_else(|| {
            StoreError::Config(format!(
                "set prismic.endpoint or {}",
                crate::config::ENDPOINT_ENV
            ))
        })?;
        let endpoint = Url::parse(endpoint.trim_end_matches('/'))
            .map_err(|e| StoreError::Config(format!("invalid endpoint {:?}: {}", endpoint, e)))?;

        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::ACCEPT,
            header::HeaderValue::from_static("application/json"),
        );
        let client = Client::builder().default_headers(headers).build()?;

        Ok(Self {
            client,
            endpoint,
            access_token: config.access_token.clone().filter(|t| !t.is_empty()),
            master_ref: OnceCell::new(),
        })
    }

    /// Reuse an existing master ref instead of asking the API root
    pub fn with_master_ref(self, master_ref: impl Into<String>) -> Self {
        Self {
            master_ref: OnceCell::new_with(Some(master_ref.into())),
            ..self
        }
    }

    async fn master_ref(&self) -> Result<&str, StoreError> {
        let reference = self
            .master_ref
            .get_or_try_init(|| async {
                let url = self.with_token(self.endpoint.clone());
                let root: ApiRoot = self.get_json(url).await?;
                root.refs
                    .into_iter()
                    .find(|r| r.is_master_ref)
                    .map(|r| r.reference)
                    .ok_or(StoreError::NoMasterRef)
            })
            .await?;
        Ok(reference.as_str())
    }

    /// Build the search URL for a query
    pub(crate) fn search_url(
        &self,
        master_ref: &str,
        predicates: &[Predicate],
        options: &QueryOptions,
    ) -> Url {
        let mut url = self.endpoint.clone();
        url.path_segments_mut()
            .map(|mut segments| {
                segments.pop_if_empty().extend(["documents", "search"]);
            })
            .ok();
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("ref", master_ref);
            if !predicates.is_empty() {
                pairs.append_pair("q", &query_string(predicates));
            }
            if !options.fetch.is_empty() {
                pairs.append_pair("fetch", &options.fetch.join(","));
            }
            pairs.append_pair("pageSize", &options.page_size.to_string());
        }
        self.with_token(url)
    }

    /// Parse a `next_page` cursor, refusing URLs outside this repository
    pub(crate) fn cursor_url(&self, cursor: &str) -> Result<Url, StoreError> {
        let url = Url::parse(cursor).map_err(|_| StoreError::InvalidCursor(cursor.to_string()))?;
        if url.scheme() != self.endpoint.scheme() || url.host_str() != self.endpoint.host_str() {
            return Err(StoreError::InvalidCursor(cursor.to_string()));
        }
        let has_token = url.query_pairs().any(|(k, _)| k == "access_token");
        Ok(if has_token { url } else { self.with_token(url) })
    }

    fn with_token(&self, mut url: Url) -> Url {
        if let Some(token) = &self.access_token {
            url.query_pairs_mut().append_pair("access_token", token);
        }
        url
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, StoreError> {
        tracing::debug!("GET {}", redact(&url));
        let response = self.client.get(url.clone()).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(StoreError::Status {
                status: status.as_u16(),
                url: redact(&url),
            });
        }

        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }
}

#[async_trait]
impl ContentStore for PrismicClient {
    async fn query(
        &self,
        predicates: &[Predicate],
        options: &QueryOptions,
    ) -> Result<SearchResponse, StoreError> {
        let master_ref = self.master_ref().await?;
        let url = self.search_url(master_ref, predicates, options);
        self.get_json(url).await
    }

    async fn fetch_page(&self, cursor: &str) -> Result<SearchResponse, StoreError> {
        let url = self.cursor_url(cursor)?;
        self.get_json(url).await
    }

    async fn get_by_uid(&self, doc_type: &str, uid: &str) -> Result<Document, StoreError> {
        let response = self
            .query(&[Predicate::uid(doc_type, uid)], &QueryOptions::new(1))
            .await?;
        response
            .results
            .into_iter()
            .next()
            .ok_or_else(|| StoreError::NotFound {
                doc_type: doc_type.to_string(),
                uid: uid.to_string(),
            })
    }
}

/// URL without the access token, for logs and errors
fn redact(url: &Url) -> String {
    let mut clean = url.clone();
    let pairs: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(k, _)| k != "access_token")
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();
    if pairs.is_empty() {
        clean.set_query(None);
    } else {
        clean.query_pairs_mut().clear().extend_pairs(pairs);
    }
    clean.to_string()
}
