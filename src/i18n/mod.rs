//! Internationalization (i18n) support
//!
//! Month names and the handful of UI strings the pages need. `en` and `pt-BR`
//! are built in; `languages/<lang>.yml` can override any key.

use anyhow::Result;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

const EN_MONTHS_SHORT: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];
const EN_MONTHS_LONG: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];
const EN_STRINGS: [(&str, &str); 5] = [
    ("load_more", "Load more posts"),
    ("loading", "Loading..."),
    ("retry", "Could not load posts, try again"),
    ("read_time", "{minutes} min"),
    ("not_found", "Post not found"),
];

const PT_BR_MONTHS_SHORT: [&str; 12] = [
    "jan", "fev", "mar", "abr", "mai", "jun", "jul", "ago", "set", "out", "nov", "dez",
];
const PT_BR_MONTHS_LONG: [&str; 12] = [
    "janeiro",
    "fevereiro",
    "março",
    "abril",
    "maio",
    "junho",
    "julho",
    "agosto",
    "setembro",
    "outubro",
    "novembro",
    "dezembro",
];
const PT_BR_STRINGS: [(&str, &str); 5] = [
    ("load_more", "Carregar mais posts"),
    ("loading", "Carregando..."),
    ("retry", "Falha ao carregar posts, tente novamente"),
    ("read_time", "{minutes} min"),
    ("not_found", "Post não encontrado"),
];

/// Month names for date formatting
#[derive(Debug, Clone, PartialEq)]
pub struct MonthNames {
    pub short: Vec<String>,
    pub long: Vec<String>,
}

impl MonthNames {
    fn from_static(short: &[&str; 12], long: &[&str; 12]) -> Self {
        Self {
            short: short.iter().map(|s| s.to_string()).collect(),
            long: long.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Abbreviated name of a 1-based month
    pub fn short_name(&self, month: u32) -> &str {
        lookup(&self.short, month)
    }

    /// Full name of a 1-based month
    pub fn long_name(&self, month: u32) -> &str {
        lookup(&self.long, month)
    }
}

fn lookup(names: &[String], month: u32) -> &str {
    month
        .checked_sub(1)
        .and_then(|i| names.get(i as usize))
        .map(String::as_str)
        .unwrap_or("")
}

/// Internationalization handler
#[derive(Debug, Clone)]
pub struct I18n {
    /// Current language
    language: String,
    months: MonthNames,
    /// UI strings: key -> translation
    strings: HashMap<String, String>,
}

impl I18n {
    /// Create a handler from the built-in tables
    pub fn new(language: &str) -> Self {
        let (months, strings) = match normalize(language).as_str() {
            "en" | "en-us" | "en-gb" => (
                MonthNames::from_static(&EN_MONTHS_SHORT, &EN_MONTHS_LONG),
                &EN_STRINGS,
            ),
            "pt-br" | "pt" => (
                MonthNames::from_static(&PT_BR_MONTHS_SHORT, &PT_BR_MONTHS_LONG),
                &PT_BR_STRINGS,
            ),
            other => {
                tracing::warn!("No built-in translations for {:?}, using English", other);
                (
                    MonthNames::from_static(&EN_MONTHS_SHORT, &EN_MONTHS_LONG),
                    &EN_STRINGS,
                )
            }
        };

        Self {
            language: language.to_string(),
            months,
            strings: strings
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }

    /// Apply overrides from `<dir>/<language>.yml` if it exists
    pub fn load_overrides<P: AsRef<Path>>(&mut self, dir: P) -> Result<()> {
        let path = dir.as_ref().join(format!("{}.yml", self.language));
        if !path.exists() {
            return Ok(());
        }

        let content = fs::read_to_string(&path)?;
        match serde_yaml::from_str::<HashMap<String, serde_yaml::Value>>(&content) {
            Ok(data) => {
                self.apply(data);
                tracing::debug!("Loaded language file: {:?}", path);
            }
            Err(e) => {
                tracing::warn!("Failed to parse language file {:?}: {}", path, e);
            }
        }

        Ok(())
    }

    fn apply(&mut self, data: HashMap<String, serde_yaml::Value>) {
        for (key, value) in data {
            match (key.as_str(), value) {
                ("months_short", serde_yaml::Value::Sequence(seq)) => {
                    if let Some(names) = month_list(&seq) {
                        self.months.short = names;
                    }
                }
                ("months_long", serde_yaml::Value::Sequence(seq)) => {
                    if let Some(names) = month_list(&seq) {
                        self.months.long = names;
                    }
                }
                (_, serde_yaml::Value::String(s)) => {
                    self.strings.insert(key, s);
                }
                (_, other) => {
                    tracing::warn!("Ignoring non-string translation {:?}: {:?}", key, other);
                }
            }
        }
    }

    /// Get the current language
    pub fn language(&self) -> &str {
        &self.language
    }

    pub fn months(&self) -> &MonthNames {
        &self.months
    }

    /// Get a translation by key, or the key itself when missing
    pub fn get(&self, key: &str) -> String {
        self.strings
            .get(key)
            .cloned()
            .unwrap_or_else(|| key.to_string())
    }

    /// Reading time label, e.g. "4 min"
    pub fn read_time(&self, minutes: usize) -> String {
        self.get("read_time")
            .replace("{minutes}", &minutes.to_string())
    }

    /// All UI strings, for the template context
    pub fn get_all_translations(&self) -> HashMap<String, String> {
        self.strings.clone()
    }
}

impl Default for I18n {
    fn default() -> Self {
        Self::new("en")
    }
}

fn normalize(language: &str) -> String {
    language.trim().replace('_', "-").to_lowercase()
}

/// Twelve strings, or nothing
fn month_list(seq: &[serde_yaml::Value]) -> Option<Vec<String>> {
    let names: Vec<String> = seq
        .iter()
        .filter_map(|v| v.as_str().map(str::to_string))
        .collect();
    if names.len() == 12 {
        Some(names)
    } else {
        tracing::warn!("Month list must have 12 entries, found {}", names.len());
        None
    }
}
