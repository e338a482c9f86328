//! User-facing strings, keyed by Discord locale.
//!
//! Tables are TOML files compiled into the binary. Nested tables flatten to
//! dotted keys, so `[perks] title = "…"` is looked up as `perks.title`.

use std::collections::HashMap;
use tracing::warn;

const EMBEDDED: &[(&str, &str)] = &[
    ("en-US", include_str!("../locales/en-US.toml")),
    ("de", include_str!("../locales/de.toml")),
];

#[derive(Debug, Clone)]
pub struct Locales {
    tables: HashMap<String, HashMap<String, String>>,
    default_locale: String,
}

impl Locales {
    /// Load the built-in tables. Falls back to `en-US` if `default_locale` has no table.
    pub fn embedded(default_locale: &str) -> anyhow::Result<Self> {
        let mut tables = HashMap::new();
        for (name, source) in EMBEDDED {
            tables.insert(name.to_string(), parse_table(source)?);
        }
        Ok(Self::from_tables(tables, default_locale))
    }

    fn from_tables(tables: HashMap<String, HashMap<String, String>>, default_locale: &str) -> Self {
        let default_locale = if tables.contains_key(default_locale) {
            default_locale.to_string()
        } else {
            warn!(
                "No strings for default locale {}, using en-US",
                default_locale
            );
            "en-US".to_string()
        };
        Self {
            tables,
            default_locale,
        }
    }

    pub fn default_locale(&self) -> &str {
        &self.default_locale
    }

    /// Look `key` up for `locale`, then its base language, then the default
    /// locale. Missing keys come back verbatim.
    pub fn get(&self, locale: &str, key: &str) -> String {
        self.lookup(locale, key)
            .unwrap_or(key)
            .to_string()
    }

    /// Like [`Locales::get`], replacing `{name}` placeholders with `args`.
    pub fn format(&self, locale: &str, key: &str, args: &[(&str, &str)]) -> String {
        let template = self.lookup(locale, key).unwrap_or(key);
        substitute(template, args)
    }

    fn lookup(&self, locale: &str, key: &str) -> Option<&str> {
        let base = locale.split('-').next().unwrap_or(locale);
        [locale, base, self.default_locale.as_str()]
            .into_iter()
            .filter_map(|name| self.tables.get(name))
            .find_map(|table| table.get(key))
            .map(String::as_str)
    }
}

fn parse_table(source: &str) -> anyhow::Result<HashMap<String, String>> {
    let table: toml::Table = toml::from_str(source)?;
    let mut flat = HashMap::new();
    flatten("", &table, &mut flat);
    Ok(flat)
}

fn flatten(prefix: &str, table: &toml::Table, out: &mut HashMap<String, String>) {
    for (key, value) in table {
        let path = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{}.{}", prefix, key)
        };
        match value {
            toml::Value::Table(inner) => flatten(&path, inner, out),
            toml::Value::String(text) => {
                out.insert(path, text.clone());
            }
            other => {
                out.insert(path, other.to_string());
            }
        }
    }
}

fn substitute(template: &str, args: &[(&str, &str)]) -> String {
    let mut output = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        output.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let Some(close) = after.find('}') else {
            output.push_str(&rest[open..]);
            return output;
        };

        let name = &after[..close];
        match args.iter().find(|(arg, _)| *arg == name) {
            Some((_, value)) => output.push_str(value),
            None => {
                output.push('{');
                output.push_str(name);
                output.push('}');
            }
        }
        rest = &after[close + 1..];
    }

    output.push_str(rest);
    output
}
