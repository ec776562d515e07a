// Workbench: the lexicon, dictionary and store a session works against
use carpet_core::{LanguageContext, LanguageId, Lexicon, PhraseNode};
use carpet_notation::{Dictionary, DictionaryError, ParseError, ParseOptions, Parser};
use carpet_store::{load, save, MemoryStore, NodeId, StoreError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WorkbenchError {
    #[error("cannot read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Config(#[from] serde_json::Error),

    #[error("invalid lexicon {}: {source}", .path.display())]
    Lexicon {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    Dictionary(#[from] DictionaryError),
}

/// Session settings, usually read from a JSON file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkbenchConfig {
    /// Language every phrase is parsed in
    #[serde(default = "default_language")]
    pub language: LanguageId,

    /// Deepest group nesting accepted by the parser
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,

    /// Lexicon JSON file (`{ "<language>": ["word", ...] }`)
    #[serde(default)]
    pub lexicon: Option<PathBuf>,

    /// Extra words added to the lexicon for `language`
    #[serde(default)]
    pub words: Vec<String>,

    /// Dictionary YAML files or directories, loaded in order
    #[serde(default)]
    pub dictionaries: Vec<PathBuf>,
}

fn default_language() -> LanguageId {
    LanguageId::new("en")
}

fn default_max_depth() -> usize {
    ParseOptions::default().max_depth
}

impl Default for WorkbenchConfig {
    fn default() -> Self {
        Self {
            language: default_language(),
            max_depth: default_max_depth(),
            lexicon: None,
            words: Vec::new(),
            dictionaries: Vec::new(),
        }
    }
}

impl WorkbenchConfig {
    pub fn from_json(json: &str) -> Result<Self, WorkbenchError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read a config file; relative paths inside it are taken from the
    /// file's directory
    pub fn from_file(path: &Path) -> Result<Self, WorkbenchError> {
        let json = read(path)?;
        let mut config = Self::from_json(&json)?;
        if let Some(dir) = path.parent() {
            config.lexicon = config.lexicon.map(|p| dir.join(p));
            config.dictionaries = config.dictionaries.into_iter().map(|p| dir.join(p)).collect();
        }
        Ok(config)
    }

    pub fn parse_options(&self) -> ParseOptions {
        ParseOptions {
            max_depth: self.max_depth,
        }
    }
}

fn read(path: &Path) -> Result<String, WorkbenchError> {
    std::fs::read_to_string(path).map_err(|source| WorkbenchError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Everything needed to parse, normalize and persist phrases
pub struct Workbench {
    config: WorkbenchConfig,
    lexicon: Lexicon,
    dictionary: Dictionary,
    store: MemoryStore,
}

impl Workbench {
    /// Load the lexicon and then every dictionary the config names
    pub fn open(config: WorkbenchConfig) -> Result<Self, WorkbenchError> {
        let mut lexicon = match &config.lexicon {
            Some(path) => Lexicon::from_json(&read(path)?).map_err(|source| {
                WorkbenchError::Lexicon {
                    path: path.clone(),
                    source,
                }
            })?,
            None => Lexicon::new(),
        };
        for word in &config.words {
            lexicon.insert(&config.language, word);
        }

        let context = LanguageContext::new(config.language.clone());
        let mut dictionary = Dictionary::with_options(config.parse_options());
        for path in &config.dictionaries {
            dictionary.load_yaml_file(path, &lexicon, &context)?;
        }

        log::debug!(
            "workbench ready: {} words, {} definitions",
            lexicon.len(),
            dictionary.len()
        );
        Ok(Workbench {
            config,
            lexicon,
            dictionary,
            store: MemoryStore::new(),
        })
    }

    pub fn config(&self) -> &WorkbenchConfig {
        &self.config
    }

    pub fn context(&self) -> LanguageContext {
        LanguageContext::new(self.config.language.clone())
    }

    pub fn lexicon(&self) -> &Lexicon {
        &self.lexicon
    }

    pub fn dictionary(&self) -> &Dictionary {
        &self.dictionary
    }

    pub fn store(&self) -> &MemoryStore {
        &self.store
    }

    pub fn parser(&self) -> Parser<'_> {
        Parser::new(&self.lexicon, &self.dictionary).with_options(self.config.parse_options())
    }

    pub fn parse(&self, text: &str) -> Result<PhraseNode, ParseError> {
        self.parser().parse(text, &self.context())
    }

    pub fn save(&mut self, node: &PhraseNode) -> Result<NodeId, StoreError> {
        save(&mut self.store, node)
    }

    pub fn load(&self, id: NodeId) -> Result<PhraseNode, StoreError> {
        load(&self.store, id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use carpet_notation::format;

    fn temp_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("carpet-wb-{}-{}", name, std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_config_defaults() {
        let config = WorkbenchConfig::from_json("{}").unwrap();
        assert_eq!(config, WorkbenchConfig::default());
        assert_eq!(config.language.as_str(), "en");
        assert_eq!(config.max_depth, 64);
    }

    #[test]
    fn test_inline_words() {
        let config = WorkbenchConfig {
            words: vec!["dog".into(), "cat".into()],
            ..Default::default()
        };
        let mut bench = Workbench::open(config).unwrap();
        let node = bench.parse("dog cat*2").unwrap();
        let id = bench.save(&node).unwrap();
        assert_eq!(format(&bench.load(id).unwrap()), "(dog cat*2)");
        assert_eq!(bench.store().node_count(), 3);
    }

    #[test]
    fn test_open_from_files() {
        let dir = temp_dir("files");
        std::fs::write(dir.join("lexicon.json"), r#"{"en": ["big", "dog"], "fr": ["chien"]}"#).unwrap();
        std::fs::write(dir.join("animals.yaml"), "\"(big dog)\": [hound]\n").unwrap();
        std::fs::write(
            dir.join("carpet.json"),
            r#"{"lexicon": "lexicon.json", "dictionaries": ["animals.yaml"], "max_depth": 8}"#,
        )
        .unwrap();

        let config = WorkbenchConfig::from_file(&dir.join("carpet.json")).unwrap();
        assert_eq!(config.parse_options().max_depth, 8);

        let bench = Workbench::open(config).unwrap();
        assert_eq!(bench.lexicon().len(), 3);
        assert!(bench.dictionary().get("hound").is_some());
        assert_eq!(format(&bench.parse("@hound*2").unwrap()), "(big dog)*2");

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_missing_lexicon_file() {
        let config = WorkbenchConfig {
            lexicon: Some(PathBuf::from("/nonexistent/carpet-lexicon.json")),
            ..Default::default()
        };
        assert!(matches!(Workbench::open(config), Err(WorkbenchError::Io { .. })));
    }
}
