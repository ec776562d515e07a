use serde::{Deserialize, Serialize};
use std::fmt;

/// Language tag used to key terminal lookups (e.g. `"en"`, `"art-x-carpet"`)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LanguageId(String);

impl LanguageId {
    pub fn new(tag: impl Into<String>) -> Self {
        LanguageId(tag.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LanguageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for LanguageId {
    fn from(tag: &str) -> Self {
        LanguageId::new(tag)
    }
}

impl From<String> for LanguageId {
    fn from(tag: String) -> Self {
        LanguageId(tag)
    }
}

/// Per-parse language settings, passed explicitly to every parse
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanguageContext {
    pub language: LanguageId,
}

impl LanguageContext {
    pub fn new(language: impl Into<LanguageId>) -> Self {
        LanguageContext {
            language: language.into(),
        }
    }
}
