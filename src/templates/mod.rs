//! Built-in blog templates using Tera template engine
//!
//! The theme is embedded directly in the binary.

use anyhow::Result;
use serde::Serialize;
use std::collections::HashMap;
use tera::{Context, Tera};

use crate::config::SiteConfig;
use crate::helpers::{html_escape, post_path, url_for};
use crate::pages::BannerSize;

/// Template renderer with the embedded theme
pub struct TemplateRenderer {
    tera: Tera,
}

impl TemplateRenderer {
    /// Create a new renderer with all templates loaded
    pub fn new(config: &SiteConfig) -> Result<Self> {
        let mut tera = Tera::default();

        tera.add_raw_templates(vec![
            ("layout.html", include_str!("theme/layout.html")),
            ("index.html", include_str!("theme/index.html")),
            ("summaries.html", include_str!("theme/summaries.html")),
            ("post.html", include_str!("theme/post.html")),
            ("loading.html", include_str!("theme/loading.html")),
            ("not_found.html", include_str!("theme/not_found.html")),
            // Partials
            (
                "partials/header.html",
                include_str!("theme/partials/header.html"),
            ),
            (
                "partials/post_summary.html",
                include_str!("theme/partials/post_summary.html"),
            ),
        ])?;

        // Register custom filters
        tera.register_filter(
            "post_url",
            PostUrlFilter {
                config: config.clone(),
            },
        );

        Ok(Self { tera })
    }

    /// Render a template with given context
    pub fn render(&self, template_name: &str, context: &Context) -> Result<String> {
        Ok(self.tera.render(template_name, context)?)
    }
}

/// Tera filter: link to a post page from its uid
struct PostUrlFilter {
    config: SiteConfig,
}

impl tera::Filter for PostUrlFilter {
    fn filter(
        &self,
        value: &tera::Value,
        _args: &HashMap<String, tera::Value>,
    ) -> tera::Result<tera::Value> {
        let uid = tera::try_get_value!("post_url", "value", String, value);
        Ok(tera::Value::String(html_escape(&post_path(
            &self.config,
            &uid,
        ))))
    }

    /// Output is escaped here, without turning `/` into an entity
    fn is_safe(&self) -> bool {
        true
    }
}

/// Data structures for template context

#[derive(Debug, Clone, Serialize)]
pub struct SiteData {
    pub title: String,
    pub language: String,
    pub home_url: String,
    pub logo_url: String,
}

impl SiteData {
    pub fn from_config(config: &SiteConfig) -> Self {
        Self {
            title: config.title.clone(),
            language: config.language.clone(),
            home_url: url_for(config, "/"),
            logo_url: url_for(config, &config.logo),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct BannerData {
    pub alt: String,
    pub width: u32,
    pub height: u32,
    /// Resize to the container once the image has loaded
    pub measure: bool,
}

impl BannerData {
    pub fn new(alt: Option<&str>, size: BannerSize) -> Self {
        let dimensions = size.dimensions();
        Self {
            alt: alt.unwrap_or_default().to_string(),
            width: dimensions.width,
            height: dimensions.height,
            measure: size.needs_measuring(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::{Dimensions, PostSummary};

    fn summary(uid: &str) -> PostSummary {
        PostSummary {
            uid: uid.to_string(),
            publication_date: None,
            title: "<Title>".to_string(),
            subtitle: "Sub".to_string(),
            author: "Ana".to_string(),
        }
    }

    #[test]
    fn test_post_url_filter_uses_root() {
        let config = SiteConfig {
            root: "/blog/".to_string(),
            ..Default::default()
        };
        let renderer = TemplateRenderer::new(&config).unwrap();

        let mut context = Context::new();
        context.insert("posts", &vec![summary("hello-world")]);
        let html = renderer.render("summaries.html", &context).unwrap();

        assert!(html.contains(r#"href="/blog/post/hello-world""#));
        // Autoescaping stays on for store text
        assert!(html.contains("&lt;Title&gt;"));
        assert!(!html.contains("<time>"));
    }

    #[test]
    fn test_post_url_filter_escapes_uid() {
        let renderer = TemplateRenderer::new(&SiteConfig::default()).unwrap();

        let mut context = Context::new();
        context.insert("posts", &vec![summary(r#"a"b"#)]);
        let html = renderer.render("summaries.html", &context).unwrap();

        assert!(html.contains(r#"href="/post/a&quot;b""#));
    }

    #[test]
    fn test_banner_data() {
        let known = BannerData::new(
            Some("Rocket"),
            BannerSize::Known(Dimensions {
                width: 1440,
                height: 600,
            }),
        );
        assert_eq!((known.width, known.height, known.measure), (1440, 600, false));
        assert_eq!(known.alt, "Rocket");

        let measured = BannerData::new(
            None,
            BannerSize::Measured {
                fallback: Dimensions {
                    width: 1120,
                    height: 400,
                },
            },
        );
        assert!(measured.measure);
        assert_eq!(measured.alt, "");
    }
}
