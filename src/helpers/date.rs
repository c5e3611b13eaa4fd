//! Date helper functions

use chrono::{DateTime, Datelike, FixedOffset, TimeZone};
use std::fmt::Display;
use chrono_tz::Tz;

use crate::error::FormatError;
use crate::i18n::MonthNames;

/// Parse a publication timestamp as sent by the content store.
///
/// Prismic sends `2021-03-15T00:00:00+0000`; RFC 3339 is accepted as well.
pub fn parse_timestamp(value: &str) -> Result<DateTime<FixedOffset>, FormatError> {
    let value = value.trim();
    DateTime::parse_from_rfc3339(value)
        .or_else(|_| DateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%z"))
        .or_else(|_| DateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f%z"))
        .map_err(|source| FormatError::InvalidDate {
            value: value.to_string(),
            source,
        })
}

/// Formats publication dates with a fixed pattern, zone and month names
#[derive(Debug, Clone)]
pub struct DateFormatter {
    pattern: String,
    timezone: Tz,
    months: MonthNames,
}

impl DateFormatter {
    pub fn new(pattern: &str, timezone: Tz, months: MonthNames) -> Self {
        Self {
            pattern: pattern.to_string(),
            timezone,
            months,
        }
    }

    /// Parse and format a raw timestamp
    pub fn format(&self, raw: &str) -> Result<String, FormatError> {
        let date = parse_timestamp(raw)?;
        Ok(self.format_date(&date))
    }

    pub fn format_date<Z: TimeZone>(&self, date: &DateTime<Z>) -> String {
        let local = date.with_timezone(&self.timezone);
        format_date(&local, &self.pattern, &self.months)
    }
}

/// Format a date using date-fns style tokens
///
/// # Examples
/// ```ignore
/// format_date(&date, "dd MMM yyyy", &months) // -> "15 Mar 2021"
/// ```
pub fn format_date<Z: TimeZone>(date: &DateTime<Z>, pattern: &str, months: &MonthNames) -> String
where
    Z::Offset: Display,
{
    let chrono_format = to_chrono_format(pattern, months, date.month());
    date.format(&chrono_format).to_string()
}

/// Convert date-fns tokens to a chrono format string.
///
/// Month names come from `months` rather than chrono's English tables, so
/// they are written in as literal text for `month`.
fn to_chrono_format(pattern: &str, months: &MonthNames, month: u32) -> String {
    let mut out = String::with_capacity(pattern.len() * 2);

    for token in tokenize(pattern) {
        match token {
            Token::Literal(text) => push_literal(&mut out, &text),
            Token::Field(letter, width) => match specifier(letter, width) {
                Some(spec) => out.push_str(spec),
                None => match (letter, width) {
                    ('M', 3) => push_literal(&mut out, months.short_name(month)),
                    ('M', _) => push_literal(&mut out, months.long_name(month)),
                    (other, w) => push_literal(&mut out, &other.to_string().repeat(w)),
                },
            },
        }
    }

    out
}

fn push_literal(out: &mut String, text: &str) {
    out.push_str(&text.replace('%', "%%"));
}

/// chrono specifier for a numeric field
fn specifier(letter: char, width: usize) -> Option<&'static str> {
    let spec = match (letter, width) {
        ('y', 2) => "%y",
        ('y', _) => "%Y",
        ('M', 1) => "%-m",
        ('M', 2) => "%m",
        ('d', 1) => "%-d",
        ('d', _) => "%d",
        ('H', 1) => "%-H",
        ('H', _) => "%H",
        ('m', 1) => "%-M",
        ('m', _) => "%M",
        ('s', 1) => "%-S",
        ('s', _) => "%S",
        _ => return None,
    };
    Some(spec)
}

#[derive(Debug, PartialEq)]
enum Token {
    Literal(String),
    Field(char, usize),
}

/// Split a pattern into runs of the same letter and literal text.
/// Text between single quotes is literal; `''` is a quote.
fn tokenize(pattern: &str) -> Vec<Token> {
    let chars: Vec<char> = pattern.chars().collect();
    let mut tokens = Vec::new();
    let mut literal = String::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        if c == '\'' {
            if chars.get(i + 1) == Some(&'\'') {
                literal.push('\'');
                i += 2;
                continue;
            }
            i += 1;
            while i < chars.len() && chars[i] != '\'' {
                literal.push(chars[i]);
                i += 1;
            }
            i += 1;
        } else if c.is_ascii_alphabetic() {
            let start = i;
            while i < chars.len() && chars[i] == c {
                i += 1;
            }
            if !literal.is_empty() {
                tokens.push(Token::Literal(std::mem::take(&mut literal)));
            }
            tokens.push(Token::Field(c, i - start));
        } else {
            literal.push(c);
            i += 1;
        }
    }

    if !literal.is_empty() {
        tokens.push(Token::Literal(literal));
    }

    tokens
}
