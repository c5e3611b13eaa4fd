//! Site configuration (_config.yml)

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Environment variable overriding `prismic.endpoint`
pub const ENDPOINT_ENV: &str = "PRISMIC_API_ENDPOINT";
/// Environment variable overriding `prismic.access_token`
pub const ACCESS_TOKEN_ENV: &str = "PRISMIC_ACCESS_TOKEN";

/// Main site configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    // Site
    pub title: String,
    pub language: String,
    pub timezone: String,
    pub logo: String,

    // URL
    pub url: String,
    pub root: String,

    // Directory
    pub public_dir: String,
    pub static_dir: String,
    pub i18n_dir: String,

    // Date format (date-fns style tokens)
    pub date_format: String,

    // Content source
    pub prismic: PrismicConfig,
    /// Serve documents from a local JSON file instead of Prismic
    pub fixtures: Option<PathBuf>,

    pub listing: ListingConfig,
    pub paths: PathsConfig,
    pub reading: ReadingConfig,
    pub banner: BannerConfig,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: "spacetraveling".to_string(),
            language: "en".to_string(),
            timezone: "UTC".to_string(),
            logo: "/logo.svg".to_string(),

            url: "http://localhost:3000".to_string(),
            root: "/".to_string(),

            public_dir: "public".to_string(),
            static_dir: "static".to_string(),
            i18n_dir: "languages".to_string(),

            date_format: "dd MMM yyyy".to_string(),

            prismic: PrismicConfig::default(),
            fixtures: None,

            listing: ListingConfig::default(),
            paths: PathsConfig::default(),
            reading: ReadingConfig::default(),
            banner: BannerConfig::default(),
        }
    }
}

impl SiteConfig {
    /// Load configuration from a file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {:?}", path))?;
        let config: SiteConfig = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config {:?}", path))?;
        Ok(config)
    }

    /// Apply `PRISMIC_API_ENDPOINT` / `PRISMIC_ACCESS_TOKEN` overrides
    pub fn apply_env(&mut self) {
        self.apply_overrides(
            std::env::var(ENDPOINT_ENV).ok(),
            std::env::var(ACCESS_TOKEN_ENV).ok(),
        );
    }

    fn apply_overrides(&mut self, endpoint: Option<String>, access_token: Option<String>) {
        if let Some(endpoint) = endpoint.filter(|v| !v.trim().is_empty()) {
            tracing::debug!("Using content store endpoint from {}", ENDPOINT_ENV);
            self.prismic.endpoint = Some(endpoint);
        }
        if let Some(token) = access_token.filter(|v| !v.trim().is_empty()) {
            self.prismic.access_token = Some(token);
        }
    }

    /// Parsed IANA time zone, falling back to UTC
    pub fn time_zone(&self) -> chrono_tz::Tz {
        match self.timezone.parse::<chrono_tz::Tz>() {
            Ok(tz) => tz,
            Err(_) => {
                tracing::warn!("Unknown timezone {:?}, using UTC", self.timezone);
                chrono_tz::UTC
            }
        }
    }
}

/// Prismic repository settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PrismicConfig {
    /// API root, e.g. `https://my-repo.cdn.prismic.io/api/v2`
    pub endpoint: Option<String>,
    pub access_token: Option<String>,
    pub document_type: String,
}

impl Default for PrismicConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            access_token: None,
            document_type: "post".to_string(),
        }
    }
}

/// Home page listing
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ListingConfig {
    pub page_size: usize,
}

impl Default for ListingConfig {
    fn default() -> Self {
        Self { page_size: 2 }
    }
}

/// Pre-rendered post paths
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    pub page_size: usize,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self { page_size: 100 }
    }
}

/// Reading time estimate
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReadingConfig {
    pub words_per_minute: usize,
}

impl Default for ReadingConfig {
    fn default() -> Self {
        Self {
            words_per_minute: 200,
        }
    }
}

/// Banner size used until the client measures the rendered image
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BannerConfig {
    pub fallback_width: u32,
    pub fallback_height: u32,
}

impl Default for BannerConfig {
    fn default() -> Self {
        Self {
            fallback_width: 1120,
            fallback_height: 400,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SiteConfig::default();
        assert_eq!(config.title, "spacetraveling");
        assert_eq!(config.date_format, "dd MMM yyyy");
        assert_eq!(config.listing.page_size, 2);
        assert_eq!(config.paths.page_size, 100);
        assert_eq!(config.reading.words_per_minute, 200);
        assert_eq!(config.prismic.document_type, "post");
    }

    #[test]
    fn test_parse_config() {
        let yaml = r#"
title: My Blog
language: pt-BR
timezone: America/Sao_Paulo
prismic:
  endpoint: https://my-blog.cdn.prismic.io/api/v2
listing:
  page_size: 5
"#;
        let config: SiteConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.title, "My Blog");
        assert_eq!(config.language, "pt-BR");
        assert_eq!(
            config.prismic.endpoint.as_deref(),
            Some("https://my-blog.cdn.prismic.io/api/v2")
        );
        assert_eq!(config.prismic.document_type, "post");
        assert_eq!(config.listing.page_size, 5);
        assert_eq!(config.banner.fallback_width, 1120);
        assert_eq!(config.time_zone(), chrono_tz::America::Sao_Paulo);
    }

    #[test]
    fn test_env_overrides() {
        let mut config = SiteConfig::default();
        config.apply_overrides(Some("https://x.cdn.prismic.io/api/v2".to_string()), None);
        assert_eq!(
            config.prismic.endpoint.as_deref(),
            Some("https://x.cdn.prismic.io/api/v2")
        );
        assert!(config.prismic.access_token.is_none());

        config.apply_overrides(Some("  ".to_string()), Some("secret".to_string()));
        assert_eq!(
            config.prismic.endpoint.as_deref(),
            Some("https://x.cdn.prismic.io/api/v2")
        );
        assert_eq!(config.prismic.access_token.as_deref(), Some("secret"));
    }

    #[test]
    fn test_unknown_timezone_falls_back_to_utc() {
        let config = SiteConfig {
            timezone: "Mars/Olympus".to_string(),
            ..SiteConfig::default()
        };
        assert_eq!(config.time_zone(), chrono_tz::UTC);
    }
}
