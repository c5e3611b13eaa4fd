//! Helper functions for pages and templates
//!
//! Date formatting, URL generation and small HTML builders shared by the
//! rich text renderer, the generator and the server.

mod date;
mod html;
mod url;

pub use date::*;
pub use html::*;
pub use url::*;
