//! English/Chinese string tables and the language selection.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::config::{ConfigResult, PreferenceStore, Preferences};

const EN_TABLE: &str = include_str!("../assets/i18n/en.toml");
const ZH_TABLE: &str = include_str!("../assets/i18n/zh.toml");

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Language {
    #[default]
    #[serde(rename = "en")]
    English,
    #[serde(rename = "zh")]
    Chinese,
}

impl Language {
    pub fn code(self) -> &'static str {
        match self {
            Language::English => "en",
            Language::Chinese => "zh",
        }
    }

    pub fn other(self) -> Language {
        match self {
            Language::English => Language::Chinese,
            Language::Chinese => Language::English,
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "en" => Ok(Language::English),
            "zh" => Ok(Language::Chinese),
            other => Err(format!("unsupported language '{other}', expected 'en' or 'zh'")),
        }
    }
}

fn parse_table(language: Language, source: &str) -> HashMap<String, String> {
    match toml::from_str(source) {
        Ok(table) => table,
        Err(e) => {
            warn!(%language, error = %e, "Failed to load translation table");
            HashMap::new()
        }
    }
}

/// Key to string lookup for the selected language.
#[derive(Debug, Clone)]
pub struct Translator {
    language: Language,
    tables: HashMap<Language, HashMap<String, String>>,
}

impl Translator {
    pub fn new(language: Language) -> Self {
        let tables = HashMap::from([
            (Language::English, parse_table(Language::English, EN_TABLE)),
            (Language::Chinese, parse_table(Language::Chinese, ZH_TABLE)),
        ]);
        Self { language, tables }
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn set_language(&mut self, language: Language) {
        self.language = language;
    }

    /// Translated string, or the key itself when it has no entry.
    pub fn t<'a>(&'a self, key: &'a str) -> &'a str {
        self.tables
            .get(&self.language)
            .and_then(|table| table.get(key))
            .map(String::as_str)
            .unwrap_or(key)
    }

    /// Every translated string in every language.
    pub fn all_strings(&self) -> impl Iterator<Item = &str> {
        self.tables.values().flat_map(|table| table.values().map(String::as_str))
    }
}

/// Translator plus the store its selection is persisted to.
#[derive(Debug, Clone)]
pub struct LanguageSession {
    translator: Translator,
    store: PreferenceStore,
}

impl LanguageSession {
    /// Load the saved selection once.
    pub fn load(store: PreferenceStore) -> Self {
        let prefs = store.load();
        info!(language = %prefs.language, "Language selected");
        Self { translator: Translator::new(prefs.language), store }
    }

    pub fn translator(&self) -> &Translator {
        &self.translator
    }

    pub fn language(&self) -> Language {
        self.translator.language()
    }

    pub fn t<'a>(&'a self, key: &'a str) -> &'a str {
        self.translator.t(key)
    }

    /// Switch language and persist the choice.
    pub fn set_language(&mut self, language: Language) -> ConfigResult<()> {
        self.translator.set_language(language);
        self.store.save(&Preferences { language })
    }

    pub fn toggle(&mut self) -> ConfigResult<Language> {
        let next = self.language().other();
        self.set_language(next)?;
        Ok(next)
    }
}
