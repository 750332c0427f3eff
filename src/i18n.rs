use std::path::Path;

use anyhow::Context as _;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    Ar,
    En,
}

impl Language {
    pub fn code(self) -> &'static str {
        match self {
            Language::Ar => "ar",
            Language::En => "en",
        }
    }

    pub fn direction(self) -> TextDirection {
        match self {
            Language::Ar => TextDirection::Rtl,
            Language::En => TextDirection::Ltr,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum TextDirection {
    Ltr,
    Rtl,
}

impl TextDirection {
    pub fn as_str(self) -> &'static str {
        match self {
            TextDirection::Ltr => "ltr",
            TextDirection::Rtl => "rtl",
        }
    }

    /// Document language declared alongside the direction.
    pub fn lang(self) -> &'static str {
        match self {
            TextDirection::Ltr => "en",
            TextDirection::Rtl => "ar",
        }
    }
}

/// Dotted-key lookup into the locale document of one language.
#[derive(Debug, Clone)]
pub struct Translator {
    language: Language,
    strings: Option<Value>,
}

impl Translator {
    /// Loads `<dir>/<code>.json`. A missing or invalid file leaves every key untranslated.
    pub fn load(locales_dir: &Path, language: Language) -> Self {
        let strings = match read_locale(locales_dir, language) {
            Ok(value) => Some(value),
            Err(err) => {
                tracing::warn!(
                    language = language.code(),
                    error = %format!("{err:#}"),
                    "failed to load translations; falling back to keys"
                );
                None
            }
        };
        Self { language, strings }
    }

    pub fn from_value(language: Language, strings: Value) -> Self {
        Self {
            language,
            strings: Some(strings),
        }
    }

    pub fn untranslated(language: Language) -> Self {
        Self {
            language,
            strings: None,
        }
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn t(&self, key: &str) -> String {
        self.lookup(key).unwrap_or(key).to_owned()
    }

    pub fn t_or(&self, key: &str, fallback: &str) -> String {
        self.lookup(key).unwrap_or(fallback).to_owned()
    }

    fn lookup(&self, key: &str) -> Option<&str> {
        let mut node = self.strings.as_ref()?;
        for part in key.split('.') {
            node = match node.get(part) {
                Some(next) => next,
                None => {
                    tracing::debug!(key, language = self.language.code(), "translation key not found");
                    return None;
                }
            };
        }
        node.as_str()
    }
}

fn read_locale(locales_dir: &Path, language: Language) -> anyhow::Result<Value> {
    let path = locales_dir.join(format!("{}.json", language.code()));
    let raw = std::fs::read_to_string(&path)
        .with_context(|| format!("read locale: {}", path.display()))?;
    let value: Value = serde_json::from_str(&raw)
        .with_context(|| format!("parse locale: {}", path.display()))?;
    if !value.is_object() {
        anyhow::bail!("locale document must be a JSON object: {}", path.display());
    }
    Ok(value)
}
