//! Named phrase definitions that other phrases can refer to with `@name`.
//!
//! Definitions are parsed once and kept behind an `Rc`, so every phrase that
//! refers to one shares the same subtree. Dictionary files are YAML mappings
//! from a phrase to the list of names it defines:
//!
//! ```yaml
//! requires:
//!   - animals
//! "(big dog)": [big_dog, hound]
//! "@big_dog*2": [two_hounds]
//! ```

use crate::error::ParseError;
use crate::parser::{ParseOptions, Parser};
use carpet_core::{LanguageContext, NotFound, PhraseNode, ReferenceLookup, TerminalLookup};
use serde_yaml::Value;
use std::collections::{BTreeSet, HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::rc::Rc;
use thiserror::Error;

const REQUIRES_KEY: &str = "requires";
const EXTENSIONS: [&str; 2] = ["yaml", "yml"];

#[derive(Debug, Error)]
pub enum DictionaryError {
    #[error("'{name}' is already defined")]
    Duplicate { name: String },

    #[error("cannot parse '{phrase}' in {origin}: {source}")]
    Parse {
        phrase: String,
        origin: String,
        #[source]
        source: ParseError,
    },

    #[error("invalid yaml: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("cannot read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{origin}: {message}")]
    Format { origin: String, message: String },
}

pub type DictionaryResult<T> = std::result::Result<T, DictionaryError>;

/// In-memory table of named definitions
#[derive(Debug, Default)]
pub struct Dictionary {
    entries: HashMap<String, Rc<PhraseNode>>,
    loaded: HashSet<PathBuf>,
    options: ParseOptions,
}

impl Dictionary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: ParseOptions) -> Self {
        Dictionary {
            options,
            ..Default::default()
        }
    }

    pub fn define(&mut self, name: impl Into<String>, node: Rc<PhraseNode>) -> DictionaryResult<()> {
        let name = name.into();
        if self.entries.contains_key(&name) {
            return Err(DictionaryError::Duplicate { name });
        }
        log::debug!("defined @{}", name);
        self.entries.insert(name, node);
        Ok(())
    }

    /// Parse `text` and define it as `name`
    ///
    /// The phrase may refer to anything already in the dictionary.
    pub fn define_text(
        &mut self,
        name: &str,
        text: &str,
        terminals: &dyn TerminalLookup,
        context: &LanguageContext,
    ) -> DictionaryResult<Rc<PhraseNode>> {
        let node = Rc::new(self.parse_definition(text, "<inline>", terminals, context)?);
        self.define(name, Rc::clone(&node))?;
        Ok(node)
    }

    pub fn get(&self, name: &str) -> Option<&Rc<PhraseNode>> {
        self.entries.get(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Defined names in sorted order
    pub fn names(&self) -> BTreeSet<&str> {
        self.entries.keys().map(String::as_str).collect()
    }

    /// Load definitions from YAML text
    ///
    /// Returns how many names were defined. A `requires` list cannot be
    /// resolved without a file to resolve it against and is rejected.
    pub fn load_yaml_str(
        &mut self,
        yaml: &str,
        origin: &str,
        terminals: &dyn TerminalLookup,
        context: &LanguageContext,
    ) -> DictionaryResult<usize> {
        let value: Value = serde_yaml::from_str(yaml)?;
        self.load_value(value, origin, None, terminals, context)
    }

    /// Load a dictionary file, or every dictionary file below a directory
    ///
    /// Files are loaded at most once per dictionary, whichever route reaches
    /// them. Files without a `.yaml`/`.yml` extension are skipped.
    pub fn load_yaml_file(
        &mut self,
        path: &Path,
        terminals: &dyn TerminalLookup,
        context: &LanguageContext,
    ) -> DictionaryResult<usize> {
        let path = path.canonicalize().map_err(|source| DictionaryError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        if self.loaded.contains(&path) {
            log::trace!("{} already loaded", path.display());
            return Ok(0);
        }

        if path.is_dir() {
            return self.load_dir(&path, terminals, context);
        }
        if !has_yaml_extension(&path) {
            log::warn!("skipping {}", path.display());
            return Ok(0);
        }

        self.loaded.insert(path.clone());
        let text = std::fs::read_to_string(&path).map_err(|source| DictionaryError::Io {
            path: path.clone(),
            source,
        })?;
        let value: Value = serde_yaml::from_str(&text)?;
        let origin = path.display().to_string();
        let defined = self.load_value(value, &origin, path.parent(), terminals, context)?;
        log::debug!("loaded {} definitions from {}", defined, origin);
        Ok(defined)
    }

    fn load_dir(
        &mut self,
        dir: &Path,
        terminals: &dyn TerminalLookup,
        context: &LanguageContext,
    ) -> DictionaryResult<usize> {
        let read = std::fs::read_dir(dir).map_err(|source| DictionaryError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
        let mut paths = Vec::new();
        for entry in read {
            let entry = entry.map_err(|source| DictionaryError::Io {
                path: dir.to_path_buf(),
                source,
            })?;
            paths.push(entry.path());
        }
        paths.sort();

        let mut defined = 0;
        for path in paths {
            defined += self.load_yaml_file(&path, terminals, context)?;
        }
        Ok(defined)
    }

    fn load_value(
        &mut self,
        value: Value,
        origin: &str,
        base_dir: Option<&Path>,
        terminals: &dyn TerminalLookup,
        context: &LanguageContext,
    ) -> DictionaryResult<usize> {
        let format_error = |message: String| DictionaryError::Format {
            origin: origin.to_string(),
            message,
        };

        let mut mapping = match value {
            Value::Mapping(mapping) => mapping,
            Value::Null => return Ok(0),
            _ => return Err(format_error("expected a mapping of phrases to names".into())),
        };

        let mut defined = 0;
        // requirements load before any definition, wherever the key sits
        if let Some(requires) = mapping.shift_remove(REQUIRES_KEY) {
            let Some(dir) = base_dir else {
                return Err(format_error("'requires' needs a dictionary file".into()));
            };
            for requirement in string_list(requires, REQUIRES_KEY).map_err(format_error)? {
                defined += self.load_requirement(dir, &requirement, origin, terminals, context)?;
            }
        }

        for (key, names) in mapping {
            let key = match key {
                Value::String(key) => key,
                other => return Err(format_error(format!("non-string key {:?}", other))),
            };

            let names = string_list(names, &key).map_err(format_error)?;
            let node = Rc::new(self.parse_definition(&key, origin, terminals, context)?);
            for name in names {
                self.define(name, Rc::clone(&node))?;
                defined += 1;
            }
        }
        Ok(defined)
    }

    fn load_requirement(
        &mut self,
        dir: &Path,
        requirement: &str,
        origin: &str,
        terminals: &dyn TerminalLookup,
        context: &LanguageContext,
    ) -> DictionaryResult<usize> {
        let stem = dir.join(requirement);
        let candidates: Vec<PathBuf> = EXTENSIONS
            .iter()
            .map(|ext| stem.with_extension(ext))
            .filter(|path| path.is_file())
            .collect();
        if candidates.is_empty() {
            return Err(DictionaryError::Format {
                origin: origin.to_string(),
                message: format!("required dictionary '{}' not found", requirement),
            });
        }

        let mut defined = 0;
        for path in candidates {
            defined += self.load_yaml_file(&path, terminals, context)?;
        }
        Ok(defined)
    }

    fn parse_definition(
        &self,
        text: &str,
        origin: &str,
        terminals: &dyn TerminalLookup,
        context: &LanguageContext,
    ) -> DictionaryResult<PhraseNode> {
        Parser::new(terminals, self)
            .with_options(self.options)
            .parse(text, context)
            .map_err(|source| DictionaryError::Parse {
                phrase: text.to_string(),
                origin: origin.to_string(),
                source,
            })
    }
}

impl ReferenceLookup for Dictionary {
    fn lookup_reference(&self, name: &str) -> Result<Rc<PhraseNode>, NotFound> {
        self.entries.get(name).cloned().ok_or_else(|| NotFound::new(name))
    }
}

fn has_yaml_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| EXTENSIONS.contains(&ext))
}

fn string_list(value: Value, key: &str) -> Result<Vec<String>, String> {
    let Value::Sequence(items) = value else {
        return Err(format!("'{}' must map to a list of names", key));
    };
    items
        .into_iter()
        .map(|item| match item {
            Value::String(s) => Ok(s),
            other => Err(format!("'{}' lists a non-string entry {:?}", key, other)),
        })
        .collect()
}
