pub mod dictionary;
pub mod matcher;
pub mod typo;

use crate::speller::{Speller, TextFormat};
use crate::{CheckResult, Config};
use anyhow::{Context, Result};
use dictionary::Dictionary;
use std::fs;
use std::path::Path;
use tracing::debug;
use typo::{remove_duplicates, Typo};

/// Runs text through the speller and filters the report through the
/// exception dictionary.
pub struct SpellChecker<S> {
    speller: S,
    dictionary: Dictionary,
    config: Config,
}

impl<S: Speller> SpellChecker<S> {
    pub fn new(speller: S, dictionary: Dictionary, config: &Config) -> Self {
        Self {
            speller,
            dictionary,
            config: config.clone(),
        }
    }

    pub fn dictionary(&self) -> &Dictionary {
        &self.dictionary
    }

    pub fn check(&self, file_path: &Path) -> Result<CheckResult> {
        let content = fs::read_to_string(file_path)
            .with_context(|| format!("Failed to read file: {}", file_path.display()))?;

        let format = self.config.format.for_path(file_path);
        let typos = self
            .check_text(&content, format)
            .with_context(|| format!("Failed to check file: {}", file_path.display()))?;

        Ok(CheckResult {
            path: file_path.to_path_buf(),
            typos,
        })
    }

    pub fn check_text(&self, text: &str, format: TextFormat) -> Result<Vec<Typo>> {
        let options = self.config.speller_options(format);
        let mut typos = self.speller.check_text(text, &options)?;
        let reported = typos.len();

        if self.config.ignore_uppercase {
            typos.retain(|typo| !is_uppercase(&typo.word));
        }

        let typos = remove_duplicates(&self.dictionary.remove_dict_words(&typos));
        debug!("{} typos reported, {} left after filtering", reported, typos.len());

        Ok(typos)
    }
}

fn is_uppercase(word: &str) -> bool {
    word.chars().any(char::is_alphabetic) && !word.chars().any(char::is_lowercase)
}
