use crate::speller::{SpellerOptions, TextFormat};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

pub const DEFAULT_LANG: &str = "en,ru";

/// Name of the default config file, reported when nothing was found.
pub const DEFAULT_CONFIG_NAME: &str = ".spellexrc";

/// Files looked up in the working directory, first hit wins.
pub const SEARCH_PLACES: &[&str] = &[
    "package.json",
    ".spellexrc",
    ".spellex.json",
    ".spellex.toml",
];

/// Key holding the settings inside `package.json`.
const PACKAGE_JSON_KEY: &str = "spellex";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PropType {
    String,
    Array,
    Boolean,
}

impl PropType {
    fn of(value: &Value) -> &'static str {
        match value {
            Value::String(_) => "string",
            Value::Array(_) => "array",
            Value::Bool(_) => "boolean",
            Value::Number(_) => "number",
            Value::Object(_) => "object",
            Value::Null => "null",
        }
    }

    fn name(self) -> &'static str {
        match self {
            PropType::String => "string",
            PropType::Array => "array",
            PropType::Boolean => "boolean",
        }
    }
}

const KNOWN_PROPERTIES: &[(&str, PropType)] = &[
    ("lang", PropType::String),
    ("format", PropType::String),
    ("dictionary", PropType::Array),
    ("dictionaries", PropType::Array),
    ("ignoreDigits", PropType::Boolean),
    ("ignoreUrls", PropType::Boolean),
    ("ignoreCapitalization", PropType::Boolean),
    ("findRepeatWords", PropType::Boolean),
    ("ignoreUppercase", PropType::Boolean),
];

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON error in {}: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("TOML error in {}: {source}", path.display())]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    #[serde(default = "default_lang")]
    pub lang: String,

    #[serde(default)]
    pub format: TextFormat,

    /// Inline exception entries.
    #[serde(default)]
    pub dictionary: Vec<String>,

    /// Exception dictionary files.
    #[serde(default)]
    pub dictionaries: Vec<PathBuf>,

    #[serde(default)]
    pub ignore_digits: bool,

    #[serde(default)]
    pub ignore_urls: bool,

    #[serde(default)]
    pub ignore_capitalization: bool,

    #[serde(default)]
    pub find_repeat_words: bool,

    #[serde(default)]
    pub ignore_uppercase: bool,
}

fn default_lang() -> String {
    DEFAULT_LANG.to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            lang: default_lang(),
            format: TextFormat::Auto,
            dictionary: Vec::new(),
            dictionaries: Vec::new(),
            ignore_digits: false,
            ignore_urls: false,
            ignore_capitalization: false,
            find_repeat_words: false,
            ignore_uppercase: false,
        }
    }
}

/// Command-line values that take priority over the config file.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub lang: Option<String>,
    pub format: Option<TextFormat>,
    pub dictionaries: Vec<PathBuf>,
    pub words: Vec<String>,
    pub ignore_digits: bool,
    pub ignore_urls: bool,
    pub ignore_capitalization: bool,
    pub find_repeat_words: bool,
    pub ignore_uppercase: bool,
}

/// A config together with where it came from.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    /// Path relative to the search directory, or the default name.
    pub relative_path: PathBuf,
    pub path: Option<PathBuf>,
    pub config: Config,
    /// Unknown properties and properties of the wrong type or value.
    pub warnings: Vec<String>,
}

impl Config {
    /// Load configuration with priority: explicit file > local search places
    /// > global config > defaults
    pub fn load(file: Option<&Path>) -> Result<LoadedConfig, ConfigError> {
        Self::load_in(Path::new("."), file)
    }

    /// Same as [`Config::load`], searching `dir` instead of the working
    /// directory.
    pub fn load_in(dir: &Path, file: Option<&Path>) -> Result<LoadedConfig, ConfigError> {
        debug!("Get/check config.");

        let found = match file {
            Some(file) => Some((file.to_path_buf(), Self::read_value(file)?)),
            None => Self::search(dir)?,
        };

        let Some((path, value)) = found else {
            return Ok(LoadedConfig {
                relative_path: PathBuf::from(DEFAULT_CONFIG_NAME),
                path: None,
                config: Self::default(),
                warnings: Vec::new(),
            });
        };

        debug!("Using config: {}", path.display());
        let (config, warnings) = Self::from_value(&path, value)?;
        for warning in &warnings {
            warn!("{}", warning);
        }

        let relative_path = path
            .strip_prefix(dir)
            .map(Path::to_path_buf)
            .unwrap_or_else(|_| path.clone());

        Ok(LoadedConfig {
            relative_path,
            path: Some(path),
            config,
            warnings,
        })
    }

    fn search(dir: &Path) -> Result<Option<(PathBuf, Value)>, ConfigError> {
        for name in SEARCH_PLACES {
            let path = dir.join(name);
            if !path.is_file() {
                continue;
            }

            let value = Self::read_value(&path)?;
            if *name == "package.json" {
                match value {
                    Value::Object(mut map) => match map.remove(PACKAGE_JSON_KEY) {
                        Some(section) => return Ok(Some((path, section))),
                        None => continue,
                    },
                    _ => continue,
                }
            }

            return Ok(Some((path, value)));
        }

        if let Some(global_path) = Self::global_config_path() {
            if global_path.is_file() {
                let value = Self::read_value(&global_path)?;
                return Ok(Some((global_path, value)));
            }
        }

        Ok(None)
    }

    /// Parse a config file into a JSON value. `.toml` files go through the
    /// TOML parser, everything else is JSON with comments.
    fn read_value(path: &Path) -> Result<Value, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let is_toml = path.extension().and_then(|e| e.to_str()) == Some("toml");
        if is_toml {
            let value: toml::Value =
                toml::from_str(&contents).map_err(|source| ConfigError::Toml {
                    path: path.to_path_buf(),
                    source,
                })?;
            serde_json::to_value(value).map_err(|source| ConfigError::Json {
                path: path.to_path_buf(),
                source,
            })
        } else {
            crate::jsonc::from_str(&contents).map_err(|source| ConfigError::Json {
                path: path.to_path_buf(),
                source,
            })
        }
    }

    /// Validate properties, dropping unknown ones and ones of the wrong type
    /// or value with a warning each, then deserialize what is left.
    fn from_value(path: &Path, value: Value) -> Result<(Self, Vec<String>), ConfigError> {
        let mut warnings = Vec::new();
        let mut checked = Map::new();

        let props = match value {
            Value::Object(map) => map,
            other => {
                warnings.push(format!(
                    "The config \"{}\" should be an object, found {}.",
                    path.display(),
                    PropType::of(&other)
                ));
                Map::new()
            }
        };

        for (prop, value) in props {
            match KNOWN_PROPERTIES.iter().find(|(name, _)| *name == prop) {
                Some((_, expected)) => {
                    if PropType::of(&value) != expected.name() {
                        warnings.push(format!(
                            "The type for \"{}\" property should be {} in \"{}\" config.",
                            prop,
                            expected.name(),
                            path.display()
                        ));
                        continue;
                    }

                    // Right type, but the value itself may still be rejected,
                    // e.g. an unknown format or a non-string dictionary entry
                    let mut single = Map::new();
                    single.insert(prop.clone(), value.clone());
                    match serde_json::from_value::<Config>(Value::Object(single)) {
                        Ok(_) => {
                            checked.insert(prop, value);
                        }
                        Err(e) => warnings.push(format!(
                            "Invalid value for \"{}\" property in \"{}\" config: {}",
                            prop,
                            path.display(),
                            e
                        )),
                    }
                }
                None => warnings.push(format!(
                    "Unknown \"{}\" property in \"{}\" config.",
                    prop,
                    path.display()
                )),
            }
        }

        let config =
            serde_json::from_value(Value::Object(checked)).map_err(|source| ConfigError::Json {
                path: path.to_path_buf(),
                source,
            })?;

        Ok((config, warnings))
    }

    /// Apply command-line values on top of the file config.
    pub fn merge(mut self, cli: Overrides) -> Self {
        if let Some(lang) = cli.lang {
            self.lang = lang;
        }
        if let Some(format) = cli.format {
            self.format = format;
        }
        self.dictionaries.extend(cli.dictionaries);
        self.dictionary.extend(cli.words);
        self.ignore_digits |= cli.ignore_digits;
        self.ignore_urls |= cli.ignore_urls;
        self.ignore_capitalization |= cli.ignore_capitalization;
        self.find_repeat_words |= cli.find_repeat_words;
        self.ignore_uppercase |= cli.ignore_uppercase;
        self
    }

    /// Speller request settings for a file in the given format.
    pub fn speller_options(&self, format: TextFormat) -> SpellerOptions {
        SpellerOptions {
            lang: self.lang.clone(),
            format,
            ignore_digits: self.ignore_digits,
            ignore_urls: self.ignore_urls,
            find_repeat_words: self.find_repeat_words,
            ignore_capitalization: self.ignore_capitalization,
        }
    }

    pub fn global_config_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "spellex").map(|dirs| dirs.config_dir().join("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.lang, "en,ru");
        assert_eq!(config.format, TextFormat::Auto);
        assert!(config.dictionary.is_empty());
    }

    #[test]
    fn test_custom_config() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("no_comment.json");
        fs::write(&path, r#"{"lang": "ru", "dictionary": ["1"]}"#).unwrap();

        let loaded = Config::load_in(dir.path(), Some(path.as_path())).unwrap();
        assert_eq!(loaded.relative_path, PathBuf::from("no_comment.json"));
        assert_eq!(loaded.config.lang, "ru");
        assert_eq!(loaded.config.dictionary, vec!["1"]);
        assert!(loaded.warnings.is_empty());
    }

    #[test]
    fn test_custom_config_with_comments() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("comment.json");
        fs::write(
            &path,
            "{\n  // words\n  \"dictionary\": [\"1\"] /* trailing */\n}",
        )
        .unwrap();

        let loaded = Config::load_in(dir.path(), Some(path.as_path())).unwrap();
        assert_eq!(loaded.config.dictionary, vec!["1"]);
    }

    #[test]
    fn test_search_rc_file() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join(".spellexrc"), r#"{"ignoreUrls": true}"#).unwrap();

        let loaded = Config::load_in(dir.path(), None).unwrap();
        assert_eq!(loaded.relative_path, PathBuf::from(".spellexrc"));
        assert!(loaded.config.ignore_urls);
    }

    #[test]
    fn test_search_package_json() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join("package.json"),
            r#"{"name": "app", "spellex": {"lang": "be"}}"#,
        )
        .unwrap();
        fs::write(dir.path().join(".spellexrc"), r#"{"lang": "uk"}"#).unwrap();

        let loaded = Config::load_in(dir.path(), None).unwrap();
        assert_eq!(loaded.relative_path, PathBuf::from("package.json"));
        assert_eq!(loaded.config.lang, "be");
    }

    #[test]
    fn test_package_json_without_section_is_skipped() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("package.json"), r#"{"name": "app"}"#).unwrap();
        fs::write(dir.path().join(".spellex.json"), r#"{"lang": "uk"}"#).unwrap();

        let loaded = Config::load_in(dir.path(), None).unwrap();
        assert_eq!(loaded.relative_path, PathBuf::from(".spellex.json"));
        assert_eq!(loaded.config.lang, "uk");
    }

    #[test]
    fn test_toml_config() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join(".spellex.toml"),
            "lang = \"ru\"\nfindRepeatWords = true\ndictionary = [\"контрол\"]\n",
        )
        .unwrap();

        let loaded = Config::load_in(dir.path(), None).unwrap();
        assert_eq!(loaded.config.lang, "ru");
        assert!(loaded.config.find_repeat_words);
        assert_eq!(loaded.config.dictionary, vec!["контрол"]);
    }

    #[test]
    fn test_error_parsing() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("error_parsing.json");
        fs::write(&path, "{\"lang\": ").unwrap();

        let err = Config::load_in(dir.path(), Some(path.as_path())).unwrap_err();
        assert!(matches!(err, ConfigError::Json { .. }));
    }

    #[test]
    fn test_missing_explicit_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("missing.json");

        let err = Config::load_in(dir.path(), Some(path.as_path())).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn test_unknown_properties() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("unknown_properties.json");
        fs::write(&path, r#"{"lang": "ru", "foo": 1, "bar": true}"#).unwrap();

        let loaded = Config::load_in(dir.path(), Some(path.as_path())).unwrap();
        assert_eq!(loaded.warnings.len(), 2);
        assert_eq!(loaded.config.lang, "ru");
    }

    #[test]
    fn test_wrong_property_type() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("wrong_prop_type.json");
        fs::write(&path, r#"{"lang": ["ru"], "ignoreUrls": "yes"}"#).unwrap();

        let loaded = Config::load_in(dir.path(), Some(path.as_path())).unwrap();
        assert_eq!(loaded.warnings.len(), 2);
        assert_eq!(loaded.config.lang, DEFAULT_LANG);
        assert!(!loaded.config.ignore_urls);
    }

    #[test]
    fn test_invalid_format_value_falls_back() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("format.json");
        fs::write(&path, r#"{"lang": "ru", "format": "markdown"}"#).unwrap();

        let loaded = Config::load_in(dir.path(), Some(path.as_path())).unwrap();
        assert_eq!(loaded.warnings.len(), 1);
        assert!(loaded.warnings[0].contains("format"));
        assert_eq!(loaded.config.format, TextFormat::Auto);
        assert_eq!(loaded.config.lang, "ru");
    }

    #[test]
    fn test_format_value_is_case_insensitive() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("format.json");
        fs::write(&path, r#"{"format": "HTML"}"#).unwrap();

        let loaded = Config::load_in(dir.path(), Some(path.as_path())).unwrap();
        assert!(loaded.warnings.is_empty());
        assert_eq!(loaded.config.format, TextFormat::Html);
    }

    #[test]
    fn test_non_string_dictionary_entries_fall_back() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("dictionary.json");
        fs::write(&path, r#"{"dictionary": [1], "dictionaries": ["a.json"]}"#).unwrap();

        let loaded = Config::load_in(dir.path(), Some(path.as_path())).unwrap();
        assert_eq!(loaded.warnings.len(), 1);
        assert!(loaded.config.dictionary.is_empty());
        assert_eq!(loaded.config.dictionaries, vec![PathBuf::from("a.json")]);
    }

    #[test]
    fn test_merge_overrides() {
        let base = Config {
            lang: "ru".to_string(),
            dictionary: vec!["a".to_string()],
            ..Default::default()
        };
        let overrides = Overrides {
            lang: Some("en".to_string()),
            words: vec!["b".to_string()],
            dictionaries: vec![PathBuf::from("dict.json")],
            ignore_digits: true,
            ..Default::default()
        };

        let merged = base.merge(overrides);
        assert_eq!(merged.lang, "en");
        assert_eq!(merged.dictionary, vec!["a", "b"]);
        assert_eq!(merged.dictionaries, vec![PathBuf::from("dict.json")]);
        assert!(merged.ignore_digits);
        assert!(!merged.ignore_urls);
    }

    #[test]
    fn test_speller_options() {
        let config = Config {
            ignore_urls: true,
            ..Default::default()
        };
        let options = config.speller_options(TextFormat::Html);
        assert_eq!(options.lang, DEFAULT_LANG);
        assert_eq!(options.format, TextFormat::Html);
        assert!(options.ignore_urls);
    }
}
