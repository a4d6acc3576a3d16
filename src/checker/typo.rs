use crate::checker::matcher::fold_first_case;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use thiserror::Error;

/// Classification reported by the speller service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum ErrorCode {
    UnknownWord = 1,
    RepeatWord = 2,
    Capitalization = 3,
    TooManyErrors = 4,
}

#[derive(Debug, Error)]
#[error("unknown speller error code {0}")]
pub struct UnknownErrorCode(pub u8);

impl TryFrom<u8> for ErrorCode {
    type Error = UnknownErrorCode;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            1 => Ok(ErrorCode::UnknownWord),
            2 => Ok(ErrorCode::RepeatWord),
            3 => Ok(ErrorCode::Capitalization),
            4 => Ok(ErrorCode::TooManyErrors),
            other => Err(UnknownErrorCode(other)),
        }
    }
}

impl From<ErrorCode> for u8 {
    fn from(code: ErrorCode) -> Self {
        code as u8
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorCode::UnknownWord => "unknown word",
            ErrorCode::RepeatWord => "repeat word",
            ErrorCode::Capitalization => "capitalization",
            ErrorCode::TooManyErrors => "too many errors",
        };
        f.write_str(name)
    }
}

/// One problem reported by the speller.
///
/// `row` and `col` are zero-based positions in the checked text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Typo {
    pub code: ErrorCode,
    pub word: String,
    #[serde(default, rename = "s")]
    pub suggestions: Vec<String>,
    #[serde(default)]
    pub row: usize,
    #[serde(default)]
    pub col: usize,
}

impl Typo {
    pub fn new(code: ErrorCode, word: impl Into<String>) -> Self {
        Self {
            code,
            word: word.into(),
            suggestions: Vec::new(),
            row: 0,
            col: 0,
        }
    }
}

/// Keep the first typo per word, treating words that differ only in the
/// case of their first letter as the same word.
pub fn remove_duplicates(typos: &[Typo]) -> Vec<Typo> {
    let mut seen = HashSet::new();
    typos
        .iter()
        .filter(|typo| seen.insert(fold_first_case(&typo.word)))
        .cloned()
        .collect()
}
