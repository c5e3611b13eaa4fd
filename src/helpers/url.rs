//! URL helper functions

use crate::config::SiteConfig;

/// Generate a URL with the root path
///
/// # Examples
/// ```ignore
/// url_for(&config, "/logo.svg") // -> "/blog/logo.svg"
/// ```
pub fn url_for(config: &SiteConfig, path: &str) -> String {
    if is_absolute(path) {
        return path.to_string();
    }

    let root = config.root.trim_end_matches('/');
    let path = path.trim_start_matches('/');

    if path.is_empty() {
        format!("{}/", root)
    } else {
        format!("{}/{}", root, path)
    }
}

/// Generate a full URL including the domain
///
/// # Examples
/// ```ignore
/// full_url_for(&config, "/post/hello/") // -> "https://example.com/blog/post/hello/"
/// ```
pub fn full_url_for(config: &SiteConfig, path: &str) -> String {
    if is_absolute(path) {
        return path.to_string();
    }
    let base = config.url.trim_end_matches('/');
    format!("{}{}", base, url_for(config, path))
}

/// Link target of a post detail page
///
/// # Examples
/// ```ignore
/// post_path(&config, "hello-world") // -> "/post/hello-world"
/// ```
pub fn post_path(config: &SiteConfig, uid: &str) -> String {
    url_for(config, &format!("post/{}", uid))
}

/// Relative output file of a post detail page
pub fn post_output_path(uid: &str) -> String {
    format!("post/{}/index.html", uid)
}

fn is_absolute(path: &str) -> bool {
    path.starts_with("http://") || path.starts_with("https://") || path.starts_with("//")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> SiteConfig {
        let mut config = SiteConfig::default();
        config.url = "https://example.com".to_string();
        config.root = "/blog/".to_string();
        config
    }

    #[test]
    fn test_url_for() {
        let config = test_config();
        assert_eq!(url_for(&config, "/logo.svg"), "/blog/logo.svg");
        assert_eq!(url_for(&config, ""), "/blog/");
        assert_eq!(
            url_for(&config, "https://images.prismic.io/a.png"),
            "https://images.prismic.io/a.png"
        );
    }

    #[test]
    fn test_full_url_for() {
        let config = test_config();
        assert_eq!(
            full_url_for(&config, "/post/hello/"),
            "https://example.com/blog/post/hello/"
        );
    }

    #[test]
    fn test_post_path() {
        assert_eq!(post_path(&SiteConfig::default(), "foo"), "/post/foo");
        assert_eq!(post_path(&test_config(), "foo"), "/blog/post/foo");
        assert_eq!(post_output_path("foo"), "post/foo/index.html");
    }
}
