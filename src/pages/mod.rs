//! Page data: what the listing and post pages show, independent of markup

pub mod detail;
pub mod listing;

pub use detail::{static_paths, BannerSize, DetailPage};
pub use listing::ListingPage;
