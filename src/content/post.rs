//! Post summaries and details
//!
//! Display-ready views derived from raw store documents on every render.
//! Nothing here is persisted.

use serde::{Deserialize, Serialize};

use super::rich_text::RichText;
use crate::error::FormatError;
use crate::helpers::DateFormatter;
use crate::store::Document;

/// Pixel size of an image
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

/// Banner image of a post
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Banner {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub alt: Option<String>,
    #[serde(default)]
    pub dimensions: Option<Dimensions>,
}

/// One `{heading, body}` group of a post
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContentBlock {
    #[serde(default)]
    pub heading: Option<String>,
    #[serde(default)]
    pub body: RichText,
}

/// The `data` payload of a post document
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct PostFields {
    pub title: Option<String>,
    pub subtitle: Option<String>,
    pub author: Option<String>,
    pub banner: Banner,
    pub content: Vec<ContentBlock>,
}

/// A post as shown in the listing
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PostSummary {
    pub uid: String,
    pub publication_date: Option<String>,
    pub title: String,
    pub subtitle: String,
    pub author: String,
}

/// A rendered section of a post page
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContentSection {
    pub heading: String,
    pub body_html: String,
}

/// A post as shown on its own page
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PostDetail {
    pub uid: String,
    pub publication_date: Option<String>,
    pub title: String,
    pub author: String,
    pub banner_url: Option<String>,
    pub banner_alt: Option<String>,
    pub banner_dimensions: Option<Dimensions>,
    pub content: Vec<ContentSection>,
    pub read_time_minutes: usize,
}

/// Number of whitespace-separated words
pub fn count_words(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Estimated reading time, rounded up to whole minutes
pub fn read_time_minutes(content: &[ContentBlock], words_per_minute: usize) -> usize {
    let words: usize = content
        .iter()
        .map(|block| {
            count_words(block.heading.as_deref().unwrap_or("")) + count_words(&block.body.as_text())
        })
        .sum();
    words.div_ceil(words_per_minute.max(1))
}

/// Maps raw documents into summaries and details
#[derive(Debug, Clone)]
pub struct PostFormatter {
    dates: DateFormatter,
    words_per_minute: usize,
}

impl PostFormatter {
    pub fn new(dates: DateFormatter, words_per_minute: usize) -> Self {
        Self {
            dates,
            words_per_minute,
        }
    }

    /// Build the listing view of a document
    pub fn summary(&self, doc: &Document) -> Result<PostSummary, FormatError> {
        let uid = require_uid(doc)?;
        let fields: PostFields = doc.data_as()?;

        Ok(PostSummary {
            uid,
            publication_date: self.publication_date(doc)?,
            title: fields.title.unwrap_or_default(),
            subtitle: fields.subtitle.unwrap_or_default(),
            author: fields.author.unwrap_or_default(),
        })
    }

    /// Build the page view of a document
    pub fn detail(&self, doc: &Document) -> Result<PostDetail, FormatError> {
        let uid = require_uid(doc)?;
        let fields: PostFields = doc.data_as()?;
        let read_time_minutes = read_time_minutes(&fields.content, self.words_per_minute);

        let content = fields
            .content
            .into_iter()
            .map(|block| ContentSection {
                body_html: block.body.as_html(),
                heading: block.heading.unwrap_or_default(),
            })
            .collect();

        Ok(PostDetail {
            uid,
            publication_date: self.publication_date(doc)?,
            title: fields.title.unwrap_or_default(),
            author: fields.author.unwrap_or_default(),
            banner_url: fields.banner.url.filter(|u| !u.is_empty()),
            banner_alt: fields.banner.alt,
            banner_dimensions: fields.banner.dimensions,
            content,
            read_time_minutes,
        })
    }

    /// Only documents that have a first publication date get one formatted
    fn publication_date(&self, doc: &Document) -> Result<Option<String>, FormatError> {
        doc.first_publication_date
            .as_deref()
            .map(|raw| self.dates.format(raw))
            .transpose()
    }
}

fn require_uid(doc: &Document) -> Result<String, FormatError> {
    doc.uid
        .clone()
        .filter(|uid| !uid.is_empty())
        .ok_or_else(|| FormatError::MissingUid(doc.id.clone()))
}
