//! Client for the remote spell-checking service.
//!
//! The service does the actual language work; everything here is request
//! plumbing. Callers depend on the [`Speller`] trait so the check pipeline
//! can run against a canned speller in tests.

use crate::checker::typo::Typo;
use indicatif::{ProgressBar, ProgressStyle};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

pub const DEFAULT_ENDPOINT: &str = "https://speller.yandex.net/services/spellservice.json/checkText";

/// Largest request body the service accepts, in bytes.
pub const MAX_CHUNK_LEN: usize = 10_000;

const IGNORE_DIGITS: u32 = 2;
const IGNORE_URLS: u32 = 4;
const FIND_REPEAT_WORDS: u32 = 8;
const IGNORE_CAPITALIZATION: u32 = 512;

#[derive(Debug, Error)]
pub enum SpellerError {
    #[error("Request to speller service failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Speller service returned HTTP {0}")]
    Status(reqwest::StatusCode),

    #[error("Failed to decode speller response: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Text markup understood by the service.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum TextFormat {
    #[default]
    Auto,
    Plain,
    Html,
}

impl TextFormat {
    /// Resolve `Auto` from the file extension.
    pub fn for_path(self, path: &Path) -> Self {
        match self {
            TextFormat::Auto => {
                let ext = path
                    .extension()
                    .and_then(|e| e.to_str())
                    .unwrap_or("")
                    .to_lowercase();
                match ext.as_str() {
                    "html" | "htm" | "xhtml" | "xml" | "svg" => TextFormat::Html,
                    _ => TextFormat::Plain,
                }
            }
            other => other,
        }
    }

    fn as_param(self) -> &'static str {
        match self {
            TextFormat::Html => "html",
            TextFormat::Auto | TextFormat::Plain => "plain",
        }
    }
}

impl FromStr for TextFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "auto" => Ok(TextFormat::Auto),
            "plain" => Ok(TextFormat::Plain),
            "html" => Ok(TextFormat::Html),
            _ => Err(format!("Unknown text format: {}", s)),
        }
    }
}

impl TryFrom<String> for TextFormat {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl fmt::Display for TextFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TextFormat::Auto => write!(f, "auto"),
            TextFormat::Plain => write!(f, "plain"),
            TextFormat::Html => write!(f, "html"),
        }
    }
}

/// Per-request settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpellerOptions {
    pub lang: String,
    pub format: TextFormat,
    pub ignore_digits: bool,
    pub ignore_urls: bool,
    pub find_repeat_words: bool,
    pub ignore_capitalization: bool,
}

impl Default for SpellerOptions {
    fn default() -> Self {
        Self {
            lang: crate::config::DEFAULT_LANG.to_string(),
            format: TextFormat::Plain,
            ignore_digits: false,
            ignore_urls: false,
            find_repeat_words: false,
            ignore_capitalization: false,
        }
    }
}

impl SpellerOptions {
    /// The service's `options` bit mask.
    pub fn bitmask(&self) -> u32 {
        let mut mask = 0;
        if self.ignore_digits {
            mask |= IGNORE_DIGITS;
        }
        if self.ignore_urls {
            mask |= IGNORE_URLS;
        }
        if self.find_repeat_words {
            mask |= FIND_REPEAT_WORDS;
        }
        if self.ignore_capitalization {
            mask |= IGNORE_CAPITALIZATION;
        }
        mask
    }
}

/// Anything that turns text into a list of typos.
pub trait Speller {
    fn check_text(&self, text: &str, options: &SpellerOptions) -> Result<Vec<Typo>, SpellerError>;
}

/// Yandex Speller `checkText` client.
pub struct YandexSpeller {
    client: reqwest::blocking::Client,
    endpoint: String,
    show_progress: bool,
}

impl YandexSpeller {
    pub fn new(show_progress: bool) -> Result<Self, SpellerError> {
        Self::with_endpoint(DEFAULT_ENDPOINT, show_progress)
    }

    pub fn with_endpoint(endpoint: &str, show_progress: bool) -> Result<Self, SpellerError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            client,
            endpoint: endpoint.to_string(),
            show_progress,
        })
    }

    fn request(&self, text: &str, options: &SpellerOptions) -> Result<Vec<Typo>, SpellerError> {
        let mask = options.bitmask().to_string();
        let response = self
            .client
            .post(&self.endpoint)
            .form(&[
                ("text", text),
                ("lang", options.lang.as_str()),
                ("options", mask.as_str()),
                ("format", options.format.as_param()),
            ])
            .send()?;

        if !response.status().is_success() {
            return Err(SpellerError::Status(response.status()));
        }

        let body = response.text()?;
        Ok(serde_json::from_str(&body)?)
    }
}

impl Speller for YandexSpeller {
    fn check_text(&self, text: &str, options: &SpellerOptions) -> Result<Vec<Typo>, SpellerError> {
        let chunks = split_chunks(text, MAX_CHUNK_LEN);

        let pb = if self.show_progress {
            let pb = ProgressBar::new(chunks.len() as u64);
            if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}") {
                pb.set_style(style);
            }
            pb.set_message("Checking...");
            pb
        } else {
            ProgressBar::hidden()
        };

        let mut typos = Vec::new();
        for chunk in &chunks {
            debug!(
                "Sending {} bytes starting at row {} to {}",
                chunk.text.len(),
                chunk.row,
                self.endpoint
            );
            let mut found = self.request(chunk.text, options)?;
            for typo in &mut found {
                typo.row += chunk.row;
            }
            typos.extend(found);
            pb.inc(1);
        }

        pb.finish_and_clear();
        Ok(typos)
    }
}

#[derive(Debug, PartialEq, Eq)]
struct Chunk<'a> {
    text: &'a str,
    row: usize,
}

/// Split on line boundaries into pieces of at most `max_len` bytes. A single
/// line longer than `max_len` becomes its own oversized chunk.
fn split_chunks(text: &str, max_len: usize) -> Vec<Chunk<'_>> {
    let mut chunks = Vec::new();
    let mut start = 0;
    let mut end = 0;
    let mut start_row = 0;
    let mut row = 0;

    for line in text.split_inclusive('\n') {
        if end > start && end - start + line.len() > max_len {
            chunks.push(Chunk {
                text: &text[start..end],
                row: start_row,
            });
            start = end;
            start_row = row;
        }
        end += line.len();
        row += 1;
    }

    if end > start {
        chunks.push(Chunk {
            text: &text[start..end],
            row: start_row,
        });
    }

    chunks
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_bitmask() {
        assert_eq!(SpellerOptions::default().bitmask(), 0);

        let options = SpellerOptions {
            ignore_digits: true,
            ignore_urls: true,
            find_repeat_words: true,
            ignore_capitalization: true,
            ..Default::default()
        };
        assert_eq!(options.bitmask(), 2 + 4 + 8 + 512);
    }

    #[test]
    fn test_format_for_path() {
        assert_eq!(
            TextFormat::Auto.for_path(&PathBuf::from("index.html")),
            TextFormat::Html
        );
        assert_eq!(
            TextFormat::Auto.for_path(&PathBuf::from("notes.md")),
            TextFormat::Plain
        );
        assert_eq!(
            TextFormat::Plain.for_path(&PathBuf::from("index.html")),
            TextFormat::Plain
        );
    }

    #[test]
    fn test_format_from_str() {
        assert_eq!("HTML".parse::<TextFormat>().unwrap(), TextFormat::Html);
        assert!("markdown".parse::<TextFormat>().is_err());
    }

    #[test]
    fn test_format_deserialize_matches_from_str() {
        let format: TextFormat = serde_json::from_str(r#""Html""#).unwrap();
        assert_eq!(format, TextFormat::Html);
        assert!(serde_json::from_str::<TextFormat>(r#""markdown""#).is_err());
        assert_eq!(serde_json::to_string(&TextFormat::Plain).unwrap(), r#""plain""#);
    }

    #[test]
    fn test_split_chunks_keeps_lines_whole() {
        let text = "aaaa\nbbbb\ncccc\n";
        let chunks = split_chunks(text, 10);
        assert_eq!(
            chunks,
            vec![
                Chunk { text: "aaaa\nbbbb\n", row: 0 },
                Chunk { text: "cccc\n", row: 2 },
            ]
        );
    }

    #[test]
    fn test_split_chunks_small_and_empty() {
        assert_eq!(
            split_chunks("one line", MAX_CHUNK_LEN),
            vec![Chunk { text: "one line", row: 0 }]
        );
        assert!(split_chunks("", MAX_CHUNK_LEN).is_empty());
    }

    #[test]
    fn test_split_chunks_oversized_line() {
        let long = "x".repeat(25);
        let text = format!("a\n{}\nb", long);
        let chunks = split_chunks(&text, 10);
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[1].row, 1);
        assert_eq!(chunks[1].text.len(), 26);
        assert_eq!(chunks[2], Chunk { text: "b", row: 2 });
    }
}
