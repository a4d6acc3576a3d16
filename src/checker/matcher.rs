use lazy_static::lazy_static;
use regex::{Regex, RegexBuilder};
use std::fmt;
use thiserror::Error;
use unicode_segmentation::UnicodeSegmentation;

lazy_static! {
    // `/body/flags`; the body is greedy so flags start after the last slash
    static ref DELIMITED: Regex = Regex::new(r"^/(.+)/([^/]*)$").unwrap();
    static ref ESCAPED: Regex = Regex::new(r"\\.").unwrap();
    // groups, empty classes and single-character classes
    static ref NOT_OPTIMIZED: Regex = Regex::new(r"[()]|\[[^\]]?\]").unwrap();
}

/// Why a dictionary entry could not be turned into a matcher.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompileError {
    #[error("empty entry")]
    Empty,

    #[error("invalid regular expression flags \"{0}\"")]
    InvalidFlags(String),

    #[error("invalid regular expression: {0}")]
    InvalidPattern(String),
}

/// Compiled form of one dictionary entry.
#[derive(Debug, Clone)]
pub enum Matcher {
    /// Plain word. `toggled` is the word with the case of its first letter
    /// flipped, absent when the first letter has no case.
    Exact {
        word: String,
        toggled: Option<String>,
    },
    /// `/body/flags` entry, anchored to the whole word.
    Pattern { source: String, regex: Regex },
}

impl Matcher {
    /// Compile a raw dictionary entry.
    pub fn compile(entry: &str) -> Result<Self, CompileError> {
        if entry.is_empty() {
            return Err(CompileError::Empty);
        }

        match DELIMITED.captures(entry) {
            Some(caps) => Self::pattern(entry, &caps[1], &caps[2]),
            None => Ok(Self::exact(entry)),
        }
    }

    fn exact(word: &str) -> Self {
        let toggled = toggle_first_case(word).filter(|toggled| toggled != word);
        Matcher::Exact {
            word: word.to_string(),
            toggled,
        }
    }

    fn pattern(entry: &str, body: &str, flags: &str) -> Result<Self, CompileError> {
        let flags = RegexFlags::parse(flags)?;
        let body = ascii_classes(body);

        // The body has to stand on its own, otherwise "a)(b" would sneak
        // through once wrapped in the anchoring group.
        flags
            .builder(&body)
            .build()
            .map_err(|e| CompileError::InvalidPattern(e.to_string()))?;

        let regex = flags
            .builder(&format!(r"\A(?:{})\z", body))
            .build()
            .map_err(|e| CompileError::InvalidPattern(e.to_string()))?;

        Ok(Matcher::Pattern {
            source: entry.to_string(),
            regex,
        })
    }

    /// The entry this matcher was compiled from.
    pub fn source(&self) -> &str {
        match self {
            Matcher::Exact { word, .. } => word,
            Matcher::Pattern { source, .. } => source,
        }
    }

    /// Whether `word` is covered by this entry.
    ///
    /// Plain words match themselves, their first-letter-toggled form, and any
    /// word containing them verbatim. Patterns must match the whole word.
    pub fn is_match(&self, word: &str) -> bool {
        if word.is_empty() {
            return false;
        }

        match self {
            Matcher::Exact { word: exact, toggled } => {
                !exact.is_empty()
                    && (word.contains(exact.as_str()) || toggled.as_deref() == Some(word))
            }
            Matcher::Pattern { regex, .. } => regex.is_match(word),
        }
    }

    pub fn is_pattern(&self) -> bool {
        matches!(self, Matcher::Pattern { .. })
    }
}

impl fmt::Display for Matcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.source())
    }
}

#[derive(Debug, Default)]
struct RegexFlags {
    case_insensitive: bool,
    multi_line: bool,
    dot_all: bool,
}

impl RegexFlags {
    fn parse(flags: &str) -> Result<Self, CompileError> {
        let mut parsed = Self::default();
        let mut seen = String::new();

        for flag in flags.chars() {
            if seen.contains(flag) {
                return Err(CompileError::InvalidFlags(flags.to_string()));
            }
            seen.push(flag);

            match flag {
                'i' => parsed.case_insensitive = true,
                'm' => parsed.multi_line = true,
                's' => parsed.dot_all = true,
                // global, unicode and sticky have no meaning for a single test
                'g' | 'u' | 'y' => {}
                _ => return Err(CompileError::InvalidFlags(flags.to_string())),
            }
        }

        Ok(parsed)
    }

    fn builder(&self, pattern: &str) -> RegexBuilder {
        let mut builder = RegexBuilder::new(pattern);
        builder
            .case_insensitive(self.case_insensitive)
            .multi_line(self.multi_line)
            .dot_matches_new_line(self.dot_all);
        builder
    }
}

/// Rewrite `\d`, `\w` and `\b` (and their negations) to their ASCII forms.
///
/// Dictionary patterns use the JavaScript dialect, where these escapes only
/// know ASCII letters and digits, so `/\w+ка/` must not swallow a whole
/// Cyrillic word. `\B` is left alone, an ASCII non-boundary could split a
/// multi-byte character.
fn ascii_classes(body: &str) -> String {
    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars();
    let mut depth = 0usize;

    while let Some(ch) = chars.next() {
        match ch {
            '\\' => match chars.next() {
                Some(escaped) => out.push_str(&ascii_escape(escaped, depth > 0)),
                None => out.push(ch),
            },
            '[' => {
                depth += 1;
                out.push(ch);
            }
            ']' if depth > 0 => {
                depth -= 1;
                out.push(ch);
            }
            _ => out.push(ch),
        }
    }

    out
}

fn ascii_escape(escaped: char, in_class: bool) -> String {
    let class = match escaped {
        'd' => "digit",
        'D' => "^digit",
        'w' => "word",
        'W' => "^word",
        'b' if !in_class => return r"(?-u:\b)".to_string(),
        _ => return format!("\\{}", escaped),
    };

    match (in_class, class.strip_prefix('^')) {
        (true, _) => format!("[:{}:]", class),
        (false, Some(name)) => format!("[^[:{}:]]", name),
        (false, None) => format!("[[:{}:]]", class),
    }
}

/// Flag entries that look like plain words written with regex metacharacters.
///
/// Advisory only: `/.../` entries are never flagged, and the result does not
/// change how an entry is compiled or matched.
pub fn is_not_optimized_regex(entry: &str) -> bool {
    if DELIMITED.is_match(entry) {
        return false;
    }

    NOT_OPTIMIZED.is_match(&ESCAPED.replace_all(entry, ""))
}

/// Flip the case of the first letter, leaving the rest untouched.
///
/// Returns `None` for an empty word.
pub fn toggle_first_case(word: &str) -> Option<String> {
    let first = word.graphemes(true).next()?;
    let rest = &word[first.len()..];

    let lower = first.to_lowercase();
    let toggled = if lower == first {
        first.to_uppercase()
    } else {
        lower
    };

    Some(toggled + rest)
}

/// Key under which words differing only in the case of their first letter
/// compare equal.
pub fn fold_first_case(word: &str) -> String {
    match word.graphemes(true).next() {
        Some(first) => first.to_lowercase() + &word[first.len()..],
        None => String::new(),
    }
}
