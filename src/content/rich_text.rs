//! Prismic structured text
//!
//! A rich text field is an ordered list of blocks. Text blocks carry spans
//! (bold, italic, links, labels) addressed by UTF-16 offsets into the block
//! text, the same way the CMS editor counts them.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

use super::post::Dimensions;
use crate::helpers::{anchor, html_escape, image_tag};

/// A rich text field
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RichText(pub Vec<RichTextBlock>);

/// One block of a rich text field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum RichTextBlock {
    Paragraph(TextBlock),
    Heading1(TextBlock),
    Heading2(TextBlock),
    Heading3(TextBlock),
    Heading4(TextBlock),
    Heading5(TextBlock),
    Heading6(TextBlock),
    Preformatted(TextBlock),
    ListItem(TextBlock),
    OListItem(TextBlock),
    Image(ImageBlock),
    Embed(EmbedBlock),
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TextBlock {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub spans: Vec<Span>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
    #[serde(rename = "type")]
    pub kind: SpanKind,
    #[serde(default)]
    pub data: Option<SpanData>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpanKind {
    Strong,
    Em,
    Hyperlink,
    Label,
    #[serde(other)]
    Other,
}

/// Link target or label name attached to a span
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SpanData {
    #[serde(default)]
    pub link_type: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub target: Option<String>,
    /// Linked document uid and type for document links
    #[serde(default)]
    pub uid: Option<String>,
    #[serde(default, rename = "type")]
    pub doc_type: Option<String>,
    #[serde(default)]
    pub label: Option<String>,
}

impl SpanData {
    fn href(&self) -> Option<String> {
        if let Some(url) = self.url.as_deref().filter(|u| !u.is_empty()) {
            return Some(url.to_string());
        }
        match (self.doc_type.as_deref(), self.uid.as_deref()) {
            (Some(doc_type), Some(uid)) => Some(format!("/{}/{}", doc_type, uid)),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImageBlock {
    pub url: String,
    #[serde(default)]
    pub alt: Option<String>,
    #[serde(default)]
    pub dimensions: Option<Dimensions>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EmbedBlock {
    #[serde(default)]
    pub oembed: Oembed,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Oembed {
    #[serde(default)]
    pub embed_url: Option<String>,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub provider_name: Option<String>,
    #[serde(default)]
    pub html: Option<String>,
}

impl RichTextBlock {
    fn text_block(&self) -> Option<&TextBlock> {
        match self {
            Self::Paragraph(b)
            | Self::Heading1(b)
            | Self::Heading2(b)
            | Self::Heading3(b)
            | Self::Heading4(b)
            | Self::Heading5(b)
            | Self::Heading6(b)
            | Self::Preformatted(b)
            | Self::ListItem(b)
            | Self::OListItem(b) => Some(b),
            Self::Image(_) | Self::Embed(_) | Self::Unknown => None,
        }
    }
}

impl RichText {
    /// Plain text of every text block, joined with a space
    pub fn as_text(&self) -> String {
        self.0
            .iter()
            .filter_map(RichTextBlock::text_block)
            .map(|b| b.text.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// HTML markup for the whole field
    pub fn as_html(&self) -> String {
        let mut out = String::new();
        let mut open_list: Option<&'static str> = None;

        for block in &self.0 {
            let list_tag = match block {
                RichTextBlock::ListItem(_) => Some("ul"),
                RichTextBlock::OListItem(_) => Some("ol"),
                _ => None,
            };
            if open_list != list_tag {
                if let Some(tag) = open_list {
                    out.push_str(&format!("</{}>", tag));
                }
                if let Some(tag) = list_tag {
                    out.push_str(&format!("<{}>", tag));
                }
                open_list = list_tag;
            }
            out.push_str(&block_html(block));
        }

        if let Some(tag) = open_list {
            out.push_str(&format!("</{}>", tag));
        }
        out
    }
}

fn block_html(block: &RichTextBlock) -> String {
    match block {
        RichTextBlock::Paragraph(b) => wrap_text("p", b),
        RichTextBlock::Heading1(b) => wrap_text("h1", b),
        RichTextBlock::Heading2(b) => wrap_text("h2", b),
        RichTextBlock::Heading3(b) => wrap_text("h3", b),
        RichTextBlock::Heading4(b) => wrap_text("h4", b),
        RichTextBlock::Heading5(b) => wrap_text("h5", b),
        RichTextBlock::Heading6(b) => wrap_text("h6", b),
        RichTextBlock::Preformatted(b) => wrap_text("pre", b),
        RichTextBlock::ListItem(b) | RichTextBlock::OListItem(b) => wrap_text("li", b),
        RichTextBlock::Image(img) => format!(
            r#"<p class="block-img">{}</p>"#,
            image_tag(
                &img.url,
                img.alt.as_deref(),
                img.dimensions.map(|d| (d.width, d.height))
            )
        ),
        RichTextBlock::Embed(embed) => {
            let o = &embed.oembed;
            format!(
                r#"<div data-oembed="{}" data-oembed-type="{}" data-oembed-provider="{}">{}</div>"#,
                html_escape(o.embed_url.as_deref().unwrap_or("")),
                html_escape(o.kind.as_deref().unwrap_or("")),
                html_escape(o.provider_name.as_deref().unwrap_or("")),
                o.html.as_deref().unwrap_or("")
            )
        }
        RichTextBlock::Unknown => String::new(),
    }
}

fn wrap_text(tag: &str, block: &TextBlock) -> String {
    format!("<{tag}>{}</{tag}>", render_spans(&block.text, &block.spans))
}

/// Render text with its spans, nesting spans that lie inside others
fn render_spans(text: &str, spans: &[Span]) -> String {
    let units: Vec<u16> = text.encode_utf16().collect();
    let mut spans: Vec<Span> = spans
        .iter()
        .map(|s| Span {
            end: s.end.min(units.len()),
            ..s.clone()
        })
        .filter(|s| s.start < s.end)
        .collect();
    sort_spans(&mut spans);
    render_range(&units, 0, units.len(), spans)
}

fn sort_spans(spans: &mut [Span]) {
    spans.sort_by(|a, b| a.start.cmp(&b.start).then(b.end.cmp(&a.end)));
}

/// `spans` are sorted and lie within `start..end`
fn render_range(units: &[u16], start: usize, end: usize, spans: Vec<Span>) -> String {
    let mut out = String::new();
    let mut pos = start;
    let mut queue: VecDeque<Span> = spans.into();

    while let Some(span) = queue.pop_front() {
        out.push_str(&escape_text(&units[pos..span.start]));

        // Spans starting inside this one nest; the part of a span that runs
        // past this one's end continues after it.
        let mut inner = Vec::new();
        let mut after = Vec::new();
        for s in queue.drain(..) {
            if s.start >= span.end {
                after.push(s);
            } else if s.end <= span.end {
                inner.push(s);
            } else {
                inner.push(Span {
                    end: span.end,
                    ..s.clone()
                });
                after.push(Span {
                    start: span.end,
                    ..s
                });
            }
        }
        sort_spans(&mut inner);
        sort_spans(&mut after);
        queue = after.into();

        let inner_html = render_range(units, span.start, span.end, inner);
        out.push_str(&wrap_span(&span, &inner_html));
        pos = span.end;
    }

    out.push_str(&escape_text(&units[pos..end]));
    out
}

fn wrap_span(span: &Span, inner: &str) -> String {
    match span.kind {
        SpanKind::Strong => format!("<strong>{}</strong>", inner),
        SpanKind::Em => format!("<em>{}</em>", inner),
        SpanKind::Hyperlink => match span.data.as_ref().and_then(SpanData::href) {
            Some(href) => {
                let new_tab = span
                    .data
                    .as_ref()
                    .and_then(|d| d.target.as_deref())
                    == Some("_blank");
                anchor(&href, inner, new_tab)
            }
            None => inner.to_string(),
        },
        SpanKind::Label => {
            let class = span
                .data
                .as_ref()
                .and_then(|d| d.label.as_deref())
                .unwrap_or("label");
            format!(r#"<span class="{}">{}</span>"#, html_escape(class), inner)
        }
        SpanKind::Other => inner.to_string(),
    }
}

fn escape_text(units: &[u16]) -> String {
    html_escape(&String::from_utf16_lossy(units)).replace('\n', "<br />")
}
