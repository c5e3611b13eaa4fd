//! Home page listing with "load more" pagination

use crate::content::{PostFormatter, PostSummary};
use crate::error::PageError;
use crate::store::{ContentStore, Predicate, QueryOptions};

/// Fields the listing needs from each post
pub fn summary_fields(doc_type: &str) -> Vec<String> {
    ["title", "subtitle", "author"]
        .iter()
        .map(|field| format!("{}.{}", doc_type, field))
        .collect()
}

/// Summaries shown so far and the cursor for the next page
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListingPage {
    posts: Vec<PostSummary>,
    next_cursor: Option<String>,
}

impl ListingPage {
    /// Query the first page of posts
    pub async fn build(
        store: &dyn ContentStore,
        formatter: &PostFormatter,
        doc_type: &str,
        page_size: usize,
    ) -> Result<Self, PageError> {
        let options = QueryOptions::new(page_size).fetch(summary_fields(doc_type));
        let response = store
            .query(&[Predicate::document_type(doc_type)], &options)
            .await?;

        let posts = response
            .results
            .iter()
            .map(|doc| formatter.summary(doc))
            .collect::<Result<Vec<_>, _>>()?;

        tracing::debug!(
            "Listing starts with {} of {} posts",
            posts.len(),
            response.total_results_size
        );

        Ok(Self {
            posts,
            next_cursor: response.next_page,
        })
    }

    /// A listing with nothing shown yet that continues from `cursor`
    pub fn resume(cursor: impl Into<String>) -> Self {
        Self {
            posts: Vec::new(),
            next_cursor: Some(cursor.into()),
        }
    }

    pub fn posts(&self) -> &[PostSummary] {
        &self.posts
    }

    pub fn next_cursor(&self) -> Option<&str> {
        self.next_cursor.as_deref()
    }

    /// Whether the "load more" control is offered
    pub fn can_load_more(&self) -> bool {
        self.next_cursor.is_some()
    }

    /// Fetch the next page and append it.
    ///
    /// Returns how many posts were appended. Without a cursor this does
    /// nothing. On error the listing is left exactly as it was.
    pub async fn load_more(
        &mut self,
        store: &dyn ContentStore,
        formatter: &PostFormatter,
    ) -> Result<usize, PageError> {
        let Some(cursor) = self.next_cursor.as_deref() else {
            return Ok(0);
        };

        let response = store.fetch_page(cursor).await?;
        let more = response
            .results
            .iter()
            .map(|doc| formatter.summary(doc))
            .collect::<Result<Vec<_>, _>>()?;

        let added = more.len();
        self.posts.extend(more);
        self.next_cursor = response.next_page;
        Ok(added)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::helpers::DateFormatter;
    use crate::i18n::I18n;
    use crate::store::testing::{sample_store, FailingStore};

    fn formatter() -> PostFormatter {
        let dates = DateFormatter::new("dd MMM yyyy", chrono_tz::UTC, I18n::default().months().clone());
        PostFormatter::new(dates, 200)
    }

    fn uids(page: &ListingPage) -> Vec<&str> {
        page.posts().iter().map(|p| p.uid.as_str()).collect()
    }

    #[tokio::test]
    async fn test_build_first_page() {
        let store = sample_store();
        let page = ListingPage::build(&store, &formatter(), "post", 2).await.unwrap();

        assert_eq!(uids(&page), vec!["first-post", "second-post"]);
        assert_eq!(page.posts()[0].publication_date.as_deref(), Some("15 Mar 2021"));
        assert_eq!(page.posts()[1].author, "Bruno");
        assert!(page.can_load_more());
    }

    #[tokio::test]
    async fn test_load_more_appends_in_order() {
        let store = sample_store();
        let formatter = formatter();
        let mut page = ListingPage::build(&store, &formatter, "post", 2).await.unwrap();
        let before = page.posts().to_vec();

        let added = page.load_more(&store, &formatter).await.unwrap();
        assert_eq!(added, 1);
        assert_eq!(&page.posts()[..2], before.as_slice());
        assert_eq!(uids(&page), vec!["first-post", "second-post", "third-post"]);
        assert_eq!(page.posts()[2].publication_date, None);
        assert!(!page.can_load_more());

        // No cursor left: nothing happens
        assert_eq!(page.load_more(&store, &formatter).await.unwrap(), 0);
        assert_eq!(page.posts().len(), 3);
    }

    #[tokio::test]
    async fn test_single_page_has_no_load_more() {
        let store = sample_store();
        let page = ListingPage::build(&store, &formatter(), "post", 10).await.unwrap();
        assert_eq!(page.posts().len(), 3);
        assert!(!page.can_load_more());
        assert_eq!(page.next_cursor(), None);
    }

    #[tokio::test]
    async fn test_failed_load_more_leaves_state_unchanged() {
        let store = sample_store();
        let formatter = formatter();
        let mut page = ListingPage::build(&store, &formatter, "post", 2).await.unwrap();
        let snapshot = page.clone();

        assert!(page.load_more(&FailingStore, &formatter).await.is_err());
        assert_eq!(page, snapshot);

        let mut bad_cursor = ListingPage::resume("memory://search?pageSize=2");
        assert!(bad_cursor.load_more(&store, &formatter).await.is_err());
        assert!(bad_cursor.posts().is_empty());
        assert_eq!(bad_cursor.next_cursor(), Some("memory://search?pageSize=2"));
    }

    #[tokio::test]
    async fn test_resume_from_cursor() {
        let store = sample_store();
        let formatter = formatter();
        let first = ListingPage::build(&store, &formatter, "post", 2).await.unwrap();

        let mut resumed = ListingPage::resume(first.next_cursor().unwrap());
        resumed.load_more(&store, &formatter).await.unwrap();
        assert_eq!(uids(&resumed), vec!["third-post"]);
    }

    #[test]
    fn test_summary_fields() {
        assert_eq!(
            summary_fields("post"),
            vec!["post.title", "post.subtitle", "post.author"]
        );
    }
}
