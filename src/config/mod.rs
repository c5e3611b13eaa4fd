//! Configuration module

mod site;

pub use site::SiteConfig;
pub use site::BannerConfig;
pub use site::ListingConfig;
pub use site::PathsConfig;
pub use site::PrismicConfig;
pub use site::ReadingConfig;
pub use site::{ACCESS_TOKEN_ENV, ENDPOINT_ENV};
