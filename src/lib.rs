//! spacetraveling: a statically generated blog over a headless CMS
//!
//! Posts live in a Prismic repository. This crate queries them, formats them
//! for display and renders the listing and post pages with embedded Tera
//! templates, with "load more" pages written as JSON beside them. A small
//! axum server serves the output and renders posts that were not pre-built.

pub mod commands;
pub mod config;
pub mod content;
pub mod error;
pub mod generator;
pub mod helpers;
pub mod i18n;
pub mod pages;
pub mod server;
pub mod store;
pub mod templates;

use anyhow::Result;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::content::PostFormatter;
use crate::helpers::DateFormatter;
use crate::i18n::I18n;
use crate::store::{ContentStore, MemoryStore, PrismicClient};

/// The blog application
#[derive(Clone)]
pub struct Blog {
    /// Site configuration
    pub config: config::SiteConfig,
    /// Base directory
    pub base_dir: PathBuf,
    /// Public (output) directory
    pub public_dir: PathBuf,
    /// Static assets copied verbatim into the output
    pub static_dir: PathBuf,
    /// Translation overrides
    pub languages_dir: PathBuf,
}

impl Blog {
    /// Create a new Blog instance from a directory
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        let config_path = base_dir.join("_config.yml");

        let mut config = if config_path.exists() {
            config::SiteConfig::load(&config_path)?
        } else {
            config::SiteConfig::default()
        };
        config.apply_env();

        Ok(Self::with_config(base_dir, config))
    }

    /// Create a Blog from an already loaded configuration
    pub fn with_config<P: AsRef<Path>>(base_dir: P, config: config::SiteConfig) -> Self {
        let base_dir = base_dir.as_ref().to_path_buf();
        let public_dir = base_dir.join(&config.public_dir);
        let static_dir = base_dir.join(&config.static_dir);
        let languages_dir = base_dir.join(&config.i18n_dir);

        Self {
            config,
            base_dir,
            public_dir,
            static_dir,
            languages_dir,
        }
    }

    /// The content store the configuration points at.
    ///
    /// A `fixtures` file takes precedence over the Prismic endpoint.
    pub fn store(&self) -> Result<Arc<dyn ContentStore>> {
        if let Some(fixtures) = &self.config.fixtures {
            let path = self.base_dir.join(fixtures);
            tracing::info!("Reading posts from {:?}", path);
            return Ok(Arc::new(MemoryStore::load(&path)?));
        }

        Ok(Arc::new(PrismicClient::new(&self.config.prismic)?))
    }

    /// Translations for the configured language, with local overrides
    pub fn i18n(&self) -> Result<I18n> {
        let mut i18n = I18n::new(&self.config.language);
        i18n.load_overrides(&self.languages_dir)?;
        Ok(i18n)
    }

    /// Formatter for summaries and details
    pub fn formatter(&self, i18n: &I18n) -> PostFormatter {
        let dates = DateFormatter::new(
            &self.config.date_format,
            self.config.time_zone(),
            i18n.months().clone(),
        );
        PostFormatter::new(dates, self.config.reading.words_per_minute)
    }

    /// Generate the static site
    pub async fn generate(&self) -> Result<()> {
        commands::generate::run(self).await
    }

    /// Clean the public directory
    pub fn clean(&self) -> Result<()> {
        commands::clean::run(self)
    }
}
