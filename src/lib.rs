pub mod checker;
pub mod cli;
pub mod config;
pub mod exit_code;
pub mod jsonc;
pub mod speller;

pub use checker::dictionary::{Dictionary, DictionaryError};
pub use checker::typo::{remove_duplicates, ErrorCode, Typo};
pub use checker::SpellChecker;
pub use config::Config;
pub use exit_code::ExitCode;

use std::path::PathBuf;

/// Typos left for one file after filtering.
#[derive(Debug, Clone)]
pub struct CheckResult {
    pub path: PathBuf,
    pub typos: Vec<Typo>,
}

impl CheckResult {
    pub fn error_count(&self) -> usize {
        self.typos.len()
    }
}
