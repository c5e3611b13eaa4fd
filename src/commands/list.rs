//! List posts in the content store

use anyhow::Result;

use crate::content::PostSummary;
use crate::pages::ListingPage;
use crate::Blog;

/// Print every post the store returns, following all result pages
pub async fn run(blog: &Blog) -> Result<()> {
    let store = blog.store()?;
    let i18n = blog.i18n()?;
    let formatter = blog.formatter(&i18n);

    let mut listing = ListingPage::build(
        store.as_ref(),
        &formatter,
        &blog.config.prismic.document_type,
        blog.config.paths.page_size,
    )
    .await?;
    while listing.can_load_more() {
        listing.load_more(store.as_ref(), &formatter).await?;
    }

    println!("Posts ({}):", listing.posts().len());
    for post in listing.posts() {
        println!("{}", format_line(post));
    }

    Ok(())
}

fn format_line(post: &PostSummary) -> String {
    format!(
        "  {} - {} [{}]",
        post.publication_date.as_deref().unwrap_or("unpublished"),
        post.title,
        post.uid
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_line() {
        let mut post = PostSummary {
            uid: "hello".to_string(),
            publication_date: Some("15 Mar 2021".to_string()),
            title: "Hello".to_string(),
            subtitle: String::new(),
            author: "Ana".to_string(),
        };
        assert_eq!(format_line(&post), "  15 Mar 2021 - Hello [hello]");

        post.publication_date = None;
        assert_eq!(format_line(&post), "  unpublished - Hello [hello]");
    }
}
