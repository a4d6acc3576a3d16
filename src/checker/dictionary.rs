use crate::checker::matcher::{is_not_optimized_regex, CompileError, Matcher};
use crate::checker::typo::Typo;
use aho_corasick::AhoCorasick;
use std::collections::HashSet;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

/// Exceptions that are always in effect, appended after user sources.
pub const DEFAULT_EXCEPTIONS: &[&str] = &[
    "GitHub",
    "GitLab",
    "JavaScript",
    "TypeScript",
    "JSON",
    "YAML",
    "README",
    "changelog",
    "npm",
];

/// Failure to load a dictionary file. Always fatal for the run.
#[derive(Debug, Error)]
pub enum DictionaryError {
    #[error("Failed to read dictionary {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Dictionary {} is not valid UTF-8: {source}", path.display())]
    Encoding {
        path: PathBuf,
        #[source]
        source: std::string::FromUtf8Error,
    },

    #[error("Failed to parse dictionary {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Where an entry came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Origin {
    File(PathBuf),
    Inline,
    Builtin,
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Origin::File(path) => write!(f, "{}", path.display()),
            Origin::Inline => write!(f, "inline dictionary"),
            Origin::Builtin => write!(f, "built-in dictionary"),
        }
    }
}

/// An entry that was dropped while building the set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub origin: Origin,
    pub entry: String,
    pub error: CompileError,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: skipped \"{}\": {}", self.origin, self.entry, self.error)
    }
}

/// Compiled exception dictionary for one check run.
pub struct Dictionary {
    matchers: Vec<Matcher>,
    diagnostics: Vec<Diagnostic>,
    index: Index,
}

/// Lookup structures derived from `matchers`.
struct Index {
    // Every plain word; containment of any of them makes a word an exception
    stems: Option<AhoCorasick>,
    toggled: HashSet<String>,
    patterns: Vec<usize>,
}

impl Dictionary {
    /// Build the dictionary from files, then inline words, then the
    /// built-in exceptions.
    pub fn load<P: AsRef<Path>>(paths: &[P], words: &[String]) -> Result<Self, DictionaryError> {
        let mut builder = Builder::default();

        for path in paths {
            let path = path.as_ref();
            let entries = read_entries(path)?;
            debug!("Loaded {} entries from {}", entries.len(), path.display());
            builder.extend(Origin::File(path.to_path_buf()), &entries);
        }

        builder.extend(Origin::Inline, words);
        builder.extend(Origin::Builtin, DEFAULT_EXCEPTIONS);

        Ok(builder.finish())
    }

    /// Build a dictionary from raw entries only, without the built-in
    /// exceptions.
    pub fn from_entries<S: AsRef<str>>(entries: &[S]) -> Self {
        let mut builder = Builder::default();
        builder.extend(Origin::Inline, entries);
        builder.finish()
    }

    pub fn matchers(&self) -> &[Matcher] {
        &self.matchers
    }

    /// Entries that were dropped because they could not be compiled.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn len(&self) -> usize {
        self.matchers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.matchers.is_empty()
    }

    /// Whether `word` is covered by some entry and so is not a real typo.
    pub fn is_exception(&self, word: &str) -> bool {
        if word.is_empty() {
            return false;
        }

        let contains_stem = match &self.index.stems {
            Some(stems) => stems.is_match(word),
            None => self
                .matchers
                .iter()
                .any(|m| !m.is_pattern() && m.is_match(word)),
        };

        contains_stem
            || self.index.toggled.contains(word)
            || self
                .index
                .patterns
                .iter()
                .any(|&i| self.matchers[i].is_match(word))
    }

    pub fn is_typo(&self, word: &str) -> bool {
        !self.is_exception(word)
    }

    /// Drop the typos the dictionary declares acceptable, keeping order.
    pub fn remove_dict_words(&self, typos: &[Typo]) -> Vec<Typo> {
        typos
            .iter()
            .filter(|typo| !self.is_exception(&typo.word))
            .cloned()
            .collect()
    }
}

impl fmt::Debug for Dictionary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dictionary")
            .field("matchers", &self.matchers)
            .field("diagnostics", &self.diagnostics)
            .finish()
    }
}

#[derive(Default)]
struct Builder {
    matchers: Vec<Matcher>,
    diagnostics: Vec<Diagnostic>,
}

impl Builder {
    fn extend<S: AsRef<str>>(&mut self, origin: Origin, entries: &[S]) {
        for entry in entries {
            let entry = entry.as_ref();

            if is_not_optimized_regex(entry) {
                warn!(
                    "{}: \"{}\" contains regex metacharacters but is matched as a plain word",
                    origin, entry
                );
            }

            match Matcher::compile(entry) {
                Ok(matcher) => self.matchers.push(matcher),
                Err(error) => {
                    let diagnostic = Diagnostic {
                        origin: origin.clone(),
                        entry: entry.to_string(),
                        error,
                    };
                    warn!("{}", diagnostic);
                    self.diagnostics.push(diagnostic);
                }
            }
        }
    }

    fn finish(self) -> Dictionary {
        let mut words = Vec::new();
        let mut toggled = HashSet::new();
        let mut patterns = Vec::new();

        for (i, matcher) in self.matchers.iter().enumerate() {
            match matcher {
                Matcher::Exact { word, toggled: t } => {
                    words.push(word.as_str());
                    if let Some(t) = t {
                        toggled.insert(t.clone());
                    }
                }
                Matcher::Pattern { .. } => patterns.push(i),
            }
        }

        let stems = match AhoCorasick::new(&words) {
            Ok(ac) => Some(ac),
            Err(e) => {
                warn!("Falling back to linear dictionary scan: {}", e);
                None
            }
        };

        Dictionary {
            matchers: self.matchers,
            diagnostics: self.diagnostics,
            index: Index {
                stems,
                toggled,
                patterns,
            },
        }
    }
}

fn read_entries(path: &Path) -> Result<Vec<String>, DictionaryError> {
    let bytes = fs::read(path).map_err(|source| DictionaryError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let content = String::from_utf8(bytes).map_err(|source| DictionaryError::Encoding {
        path: path.to_path_buf(),
        source,
    })?;

    crate::jsonc::from_str(&content).map_err(|source| DictionaryError::Parse {
        path: path.to_path_buf(),
        source,
    })
}
