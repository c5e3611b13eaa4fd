//! Post detail pages

use crate::content::{Dimensions, PostDetail, PostFormatter};
use crate::error::PageError;
use crate::store::{ContentStore, Predicate, QueryOptions};

/// How the banner image gets its size
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BannerSize {
    /// The document carries the image dimensions
    Known(Dimensions),
    /// Render with `fallback`, then measure the container on the client
    Measured { fallback: Dimensions },
}

impl BannerSize {
    pub fn dimensions(&self) -> Dimensions {
        match self {
            Self::Known(d) => *d,
            Self::Measured { fallback } => *fallback,
        }
    }

    pub fn needs_measuring(&self) -> bool {
        matches!(self, Self::Measured { .. })
    }
}

/// Uids of every post to pre-render.
///
/// A single page of `page_size` results is read; posts beyond it are only
/// reachable through fallback rendering.
pub async fn static_paths(
    store: &dyn ContentStore,
    doc_type: &str,
    page_size: usize,
) -> Result<Vec<String>, PageError> {
    let options = QueryOptions::new(page_size).fetch([format!("{}.uid", doc_type)]);
    let response = store
        .query(&[Predicate::document_type(doc_type)], &options)
        .await?;

    if response.next_page.is_some() {
        tracing::warn!(
            "Only the first {} of {} posts are pre-rendered",
            response.results.len(),
            response.total_results_size
        );
    }

    let uids = response
        .results
        .into_iter()
        .filter_map(|doc| match doc.uid {
            Some(uid) if !uid.is_empty() => Some(uid),
            _ => {
                tracing::warn!("Skipping {} document {} without uid", doc_type, doc.id);
                None
            }
        })
        .collect();

    Ok(uids)
}

/// A resolved post page
#[derive(Debug, Clone, PartialEq)]
pub struct DetailPage {
    pub post: PostDetail,
    pub banner: BannerSize,
}

impl DetailPage {
    /// Fetch the post whose uid is `slug` and build its page
    pub async fn resolve(
        store: &dyn ContentStore,
        formatter: &PostFormatter,
        doc_type: &str,
        slug: &str,
        fallback_banner: Dimensions,
    ) -> Result<Self, PageError> {
        let doc = store.get_by_uid(doc_type, slug).await?;
        let post = formatter.detail(&doc)?;

        let banner = match post.banner_dimensions {
            Some(d) => BannerSize::Known(d),
            None => BannerSize::Measured {
                fallback: fallback_banner,
            },
        };

        Ok(Self { post, banner })
    }
}
