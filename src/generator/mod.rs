//! Generator module - generates static HTML files using built-in Tera templates

use anyhow::Result;
use serde::Serialize;
use std::fs;
use std::path::PathBuf;

use tera::Context;
use walkdir::WalkDir;

use crate::content::{Dimensions, PostFormatter, PostSummary};
use crate::helpers::{full_url_for, post_output_path, url_for};
use crate::i18n::I18n;
use crate::pages::{static_paths, DetailPage, ListingPage};
use crate::store::ContentStore;
use crate::templates::{BannerData, SiteData, TemplateRenderer};
use crate::Blog;

/// Seconds before the loading placeholder reloads itself
const LOADING_REFRESH_SECONDS: u32 = 2;

/// Output directory of the listing pages fetched by "load more"
const LISTING_PAGES_DIR: &str = "api/posts";

/// One listing page after the first, as written to `api/posts/{n}.json`
#[derive(Debug, Serialize)]
struct ListingPageFile<'a> {
    results: &'a [PostSummary],
    /// URL of the following page file
    next_page: Option<String>,
    html: String,
}

/// Static site generator using Tera templates
pub struct Generator {
    blog: Blog,
    renderer: TemplateRenderer,
    formatter: PostFormatter,
    i18n: I18n,
}

impl Generator {
    /// Create a new generator
    pub fn new(blog: &Blog) -> Result<Self> {
        let renderer = TemplateRenderer::new(&blog.config)?;
        let i18n = blog.i18n()?;
        let formatter = blog.formatter(&i18n);

        Ok(Self {
            blog: blog.clone(),
            renderer,
            formatter,
            i18n,
        })
    }

    pub fn blog(&self) -> &Blog {
        &self.blog
    }

    pub fn formatter(&self) -> &PostFormatter {
        &self.formatter
    }

    /// Document type of posts in the store
    pub fn doc_type(&self) -> &str {
        &self.blog.config.prismic.document_type
    }

    /// Banner size used when a post has no dimensions
    pub fn fallback_banner(&self) -> Dimensions {
        Dimensions {
            width: self.blog.config.banner.fallback_width,
            height: self.blog.config.banner.fallback_height,
        }
    }

    /// Generate the entire site
    pub async fn generate(&self, store: &dyn ContentStore) -> Result<()> {
        // Ensure public directory exists
        fs::create_dir_all(&self.blog.public_dir)?;

        self.copy_static_assets()?;

        // Listing
        let listing = ListingPage::build(
            store,
            &self.formatter,
            self.doc_type(),
            self.blog.config.listing.page_size,
        )
        .await?;
        let index_path = self.blog.public_dir.join("index.html");
        fs::write(&index_path, self.render_listing(&listing)?)?;
        tracing::debug!("Generated: {:?}", index_path);
        let listing_pages = self.write_listing_pages(store, &listing).await?;

        // Post pages
        let uids = static_paths(store, self.doc_type(), self.blog.config.paths.page_size).await?;
        for uid in &uids {
            let page = DetailPage::resolve(
                store,
                &self.formatter,
                self.doc_type(),
                uid,
                self.fallback_banner(),
            )
            .await?;
            self.write_post(&page)?;
        }

        tracing::info!(
            "Generated listing with {} posts, {} more listing pages and {} post pages",
            listing.posts().len(),
            listing_pages,
            uids.len()
        );

        Ok(())
    }

    /// Write the pages after `listing` as JSON files, each naming the next.
    ///
    /// Page `n` of the listing lands in `api/posts/{n}.json`, so "load more"
    /// works from the plain output directory. Returns how many were written.
    async fn write_listing_pages(
        &self,
        store: &dyn ContentStore,
        listing: &ListingPage,
    ) -> Result<usize> {
        let dir = self.blog.public_dir.join(LISTING_PAGES_DIR);
        let mut cursor = listing.next_cursor().map(str::to_string);
        let mut number = 2;

        while let Some(current) = cursor.take() {
            let mut page = ListingPage::resume(current);
            // An empty page ends the chain even if the store offers a cursor
            if page.load_more(store, &self.formatter).await? > 0 {
                cursor = page.next_cursor().map(str::to_string);
            }

            let file = ListingPageFile {
                results: page.posts(),
                next_page: cursor.as_ref().map(|_| self.listing_page_url(number + 1)),
                html: self.render_summaries(page.posts())?,
            };
            fs::create_dir_all(&dir)?;
            let path = dir.join(format!("{}.json", number));
            fs::write(&path, serde_json::to_string(&file)?)?;
            tracing::debug!("Generated: {:?}", path);

            number += 1;
        }

        Ok(number - 2)
    }

    /// Public URL of listing page `number`
    fn listing_page_url(&self, number: usize) -> String {
        url_for(
            &self.blog.config,
            &format!("{}/{}.json", LISTING_PAGES_DIR, number),
        )
    }

    /// Create a base context with common variables
    fn create_base_context(&self) -> Context {
        let mut context = Context::new();
        context.insert("site", &SiteData::from_config(&self.blog.config));
        context.insert("t", &self.i18n.get_all_translations());
        context.insert("generator_version", env!("CARGO_PKG_VERSION"));
        context
    }

    /// Render the home page
    pub fn render_listing(&self, listing: &ListingPage) -> Result<String> {
        let mut context = self.create_base_context();
        context.insert("posts", listing.posts());
        context.insert(
            "next_page",
            &listing.can_load_more().then(|| self.listing_page_url(2)),
        );
        context.insert("canonical_url", &full_url_for(&self.blog.config, "/"));
        self.renderer.render("index.html", &context)
    }

    /// Render summaries alone, for appending to an existing listing
    pub fn render_summaries(&self, posts: &[PostSummary]) -> Result<String> {
        let mut context = Context::new();
        context.insert("posts", posts);
        self.renderer.render("summaries.html", &context)
    }

    /// Render a post page
    pub fn render_post(&self, page: &DetailPage) -> Result<String> {
        let mut context = self.create_base_context();
        context.insert("post", &page.post);
        context.insert(
            "canonical_url",
            &full_url_for(&self.blog.config, &format!("post/{}", page.post.uid)),
        );
        context.insert(
            "banner",
            &BannerData::new(page.post.banner_alt.as_deref(), page.banner),
        );
        context.insert("read_time", &self.i18n.read_time(page.post.read_time_minutes));
        self.renderer.render("post.html", &context)
    }

    /// Render the placeholder shown while a post is rendered on demand
    pub fn render_loading(&self) -> Result<String> {
        let mut context = self.create_base_context();
        context.insert("refresh_seconds", &LOADING_REFRESH_SECONDS);
        self.renderer.render("loading.html", &context)
    }

    pub fn render_not_found(&self) -> Result<String> {
        self.renderer
            .render("not_found.html", &self.create_base_context())
    }

    /// Render a post page into the output directory
    pub fn write_post(&self, page: &DetailPage) -> Result<PathBuf> {
        let html = self.render_post(page)?;
        let output_path = self
            .blog
            .public_dir
            .join(post_output_path(&page.post.uid));

        if let Some(parent) = output_path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&output_path, html)?;
        tracing::debug!("Generated post: {:?}", output_path);

        Ok(output_path)
    }

    /// Copy static assets (logo, images) to public directory
    fn copy_static_assets(&self) -> Result<()> {
        let static_dir = &self.blog.static_dir;
        if !static_dir.exists() {
            return Ok(());
        }

        for entry in WalkDir::new(static_dir)
            .follow_links(true)
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let path = entry.path();
            if !path.is_file() {
                continue;
            }

            let relative = path.strip_prefix(static_dir)?;
            let dest = self.blog.public_dir.join(relative);

            if let Some(parent) = dest.parent() {
                fs::create_dir_all(parent)?;
            }

            fs::copy(path, &dest)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ListingConfig, SiteConfig};
    use crate::store::testing::{sample_store, FailingStore};
    use crate::store::MemoryStore;
    use tempfile::TempDir;

    fn generator(dir: &TempDir, page_size: usize) -> Generator {
        let config = SiteConfig {
            listing: ListingConfig { page_size },
            ..Default::default()
        };
        Generator::new(&Blog::with_config(dir.path(), config)).unwrap()
    }

    fn load_more_button(html: &str) -> bool {
        html.contains(r#"class="load-more""#)
    }

    #[tokio::test]
    async fn test_generate_writes_listing_and_posts() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("static/img")).unwrap();
        fs::write(dir.path().join("static/img/logo.svg"), "<svg/>").unwrap();

        let generator = generator(&dir, 2);
        generator.generate(&sample_store()).await.unwrap();

        let public = dir.path().join("public");
        let index = fs::read_to_string(public.join("index.html")).unwrap();
        assert!(index.contains("First"));
        assert!(index.contains("Second"));
        assert!(!index.contains("Third"));
        assert!(index.contains("15 Mar 2021"));
        assert!(load_more_button(&index));

        for uid in ["first-post", "second-post", "third-post"] {
            assert!(public.join("post").join(uid).join("index.html").exists());
        }
        assert!(!public.join("post/about").exists());
        assert!(public.join("img/logo.svg").exists());
    }

    #[tokio::test]
    async fn test_load_more_button_only_with_cursor() {
        let dir = TempDir::new().unwrap();
        let generator = generator(&dir, 10);
        let store = sample_store();

        let listing = ListingPage::build(&store, generator.formatter(), "post", 10)
            .await
            .unwrap();
        assert!(!load_more_button(&generator.render_listing(&listing).unwrap()));

        let listing = ListingPage::build(&store, generator.formatter(), "post", 1)
            .await
            .unwrap();
        let html = generator.render_listing(&listing).unwrap();
        assert!(load_more_button(&html));
        assert!(html.contains(r#"data-next="/api/posts/2.json""#));
    }

    #[tokio::test]
    async fn test_generate_writes_chained_listing_pages() {
        let dir = TempDir::new().unwrap();
        let generator = generator(&dir, 1);
        generator.generate(&sample_store()).await.unwrap();

        let public = dir.path().join("public");
        let index = fs::read_to_string(public.join("index.html")).unwrap();
        assert!(index.contains(r#"data-next="/api/posts/2.json""#));

        let read = |n: usize| -> serde_json::Value {
            let path = public.join(format!("api/posts/{}.json", n));
            serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
        };

        let second = read(2);
        assert_eq!(second["next_page"], "/api/posts/3.json");
        assert_eq!(second["results"][0]["uid"], "second-post");
        assert!(second["html"].as_str().unwrap().contains("Second"));

        let third = read(3);
        assert!(third["next_page"].is_null());
        assert_eq!(third["results"][0]["uid"], "third-post");
        assert!(third["html"].as_str().unwrap().contains("Third"));

        assert!(!public.join("api/posts/4.json").exists());
    }

    #[tokio::test]
    async fn test_single_page_writes_no_listing_pages() {
        let dir = TempDir::new().unwrap();
        let generator = generator(&dir, 10);
        generator.generate(&sample_store()).await.unwrap();

        assert!(!dir.path().join("public/api/posts").exists());
    }

    #[tokio::test]
    async fn test_render_post_page() {
        let dir = TempDir::new().unwrap();
        let generator = generator(&dir, 2);
        let store = sample_store();

        let page = DetailPage::resolve(
            &store,
            generator.formatter(),
            "post",
            "first-post",
            generator.fallback_banner(),
        )
        .await
        .unwrap();
        let html = generator.render_post(&page).unwrap();

        assert!(html.contains("<title>first-post | spacetraveling</title>"));
        assert!(html.contains(r#"href="http://localhost:3000/post/first-post""#));
        assert!(html.contains("<h2>Intro</h2>"));
        assert!(html.contains("<p>one two three</p>"));
        assert!(html.contains("1 min"));
        assert!(html.contains(r#"width="1440" height="600""#));
        assert!(!html.contains("getElementById('banner')"));

        let page = DetailPage::resolve(
            &store,
            generator.formatter(),
            "post",
            "second-post",
            generator.fallback_banner(),
        )
        .await
        .unwrap();
        let html = generator.render_post(&page).unwrap();
        assert!(html.contains(r#"width="1120" height="400""#));
        assert!(html.contains("getElementById('banner')"));
    }

    #[tokio::test]
    async fn test_generate_fails_on_store_error() {
        let dir = TempDir::new().unwrap();
        let generator = generator(&dir, 2);
        assert!(generator.generate(&FailingStore).await.is_err());
    }

    #[tokio::test]
    async fn test_generate_empty_store() {
        let dir = TempDir::new().unwrap();
        let generator = generator(&dir, 2);
        generator.generate(&MemoryStore::new(Vec::new())).await.unwrap();

        let index = fs::read_to_string(dir.path().join("public/index.html")).unwrap();
        assert!(!load_more_button(&index));
    }

    #[test]
    fn test_loading_and_not_found_pages() {
        let dir = TempDir::new().unwrap();
        let generator = generator(&dir, 2);

        let loading = generator.render_loading().unwrap();
        assert!(loading.contains(r#"http-equiv="refresh""#));
        assert!(loading.contains("Loading..."));

        let not_found = generator.render_not_found().unwrap();
        assert!(not_found.contains("<h1>"));
    }
}
