use crate::checker::dictionary::DictionaryError;
use crate::config::ConfigError;

/// Process exit statuses.
///
/// Dictionary and config failures get their own codes so scripts can tell
/// them apart from typos being found.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum ExitCode {
    Success,
    /// Typos survived filtering.
    Typos,
    /// An exception dictionary could not be read or parsed.
    Dictionary,
    /// An input file or the speller service failed.
    Loading,
    /// The config file could not be read or parsed.
    Config,
}

impl ExitCode {
    pub fn code(self) -> i32 {
        match self {
            Self::Success => 0,
            Self::Typos => 1,
            Self::Dictionary => 65,
            Self::Loading => 69,
            Self::Config => 78,
        }
    }

    /// Pick the status for a fatal error by looking through its causes.
    pub fn for_error(err: &anyhow::Error) -> Self {
        if err.chain().any(|cause| cause.is::<DictionaryError>()) {
            Self::Dictionary
        } else if err.chain().any(|cause| cause.is::<ConfigError>()) {
            Self::Config
        } else {
            Self::Loading
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checker::dictionary::Dictionary;
    use crate::config::Config;
    use anyhow::Context;
    use std::path::PathBuf;

    #[test]
    fn test_codes_are_distinct() {
        let codes = [
            ExitCode::Success,
            ExitCode::Typos,
            ExitCode::Dictionary,
            ExitCode::Loading,
            ExitCode::Config,
        ]
        .map(ExitCode::code);

        for (i, a) in codes.iter().enumerate() {
            for b in &codes[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn test_dictionary_error_maps_to_dictionary_code() {
        let err = Dictionary::load(&[PathBuf::from("/nonexistent/dict.json")], &[])
            .context("Failed to load dictionaries")
            .unwrap_err();
        assert_eq!(ExitCode::for_error(&err), ExitCode::Dictionary);
    }

    #[test]
    fn test_config_error_maps_to_config_code() {
        let missing = PathBuf::from("/nonexistent/.spellexrc");
        let err = anyhow::Error::from(Config::load(Some(missing.as_path())).unwrap_err());
        assert_eq!(ExitCode::for_error(&err), ExitCode::Config);
    }

    #[test]
    fn test_other_errors_map_to_loading() {
        let err = anyhow::anyhow!("speller unavailable");
        assert_eq!(ExitCode::for_error(&err), ExitCode::Loading);
    }
}
