//! Content module - post views and rich text rendering

mod post;
pub mod rich_text;

pub use post::{
    count_words, read_time_minutes, Banner, ContentBlock, ContentSection, Dimensions, PostDetail,
    PostFields, PostFormatter, PostSummary,
};
pub use rich_text::RichText;
