//! JSON with comments.
//!
//! Dictionary and config files may carry `//` line comments and `/* */`
//! block comments. They are blanked out before the text reaches `serde_json`,
//! keeping newlines so parse errors still point at the right line.

#[derive(Clone, Copy, PartialEq, Eq)]
enum State {
    Code,
    Str,
    StrEscape,
    LineComment,
    BlockComment,
}

/// Remove comments outside of string literals.
pub fn strip_comments(content: &str) -> String {
    let mut out = String::with_capacity(content.len());
    let mut state = State::Code;
    let mut chars = content.chars().peekable();

    while let Some(ch) = chars.next() {
        match state {
            State::Code => match ch {
                '"' => {
                    state = State::Str;
                    out.push(ch);
                }
                '/' if chars.peek() == Some(&'/') => {
                    chars.next();
                    state = State::LineComment;
                }
                '/' if chars.peek() == Some(&'*') => {
                    chars.next();
                    state = State::BlockComment;
                }
                _ => out.push(ch),
            },
            State::Str => {
                match ch {
                    '\\' => state = State::StrEscape,
                    '"' => state = State::Code,
                    _ => {}
                }
                out.push(ch);
            }
            State::StrEscape => {
                state = State::Str;
                out.push(ch);
            }
            State::LineComment => {
                if ch == '\n' {
                    state = State::Code;
                    out.push(ch);
                }
            }
            State::BlockComment => {
                if ch == '*' && chars.peek() == Some(&'/') {
                    chars.next();
                    state = State::Code;
                } else if ch == '\n' {
                    out.push(ch);
                }
            }
        }
    }

    out
}

/// Strip comments and deserialize.
pub fn from_str<T: serde::de::DeserializeOwned>(content: &str) -> serde_json::Result<T> {
    serde_json::from_str(&strip_comments(content))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_line_and_block_comments() {
        let input = "[\n  // leading\n  \"a\", /* inline */ \"b\"\n  /* multi\n  line */\n]";
        let words: Vec<String> = from_str(input).unwrap();
        assert_eq!(words, vec!["a", "b"]);
    }

    #[test]
    fn test_keeps_comment_markers_inside_strings() {
        let input = r#"["http://example.com", "/* not a comment */", "a\"//b"]"#;
        let words: Vec<String> = from_str(input).unwrap();
        assert_eq!(
            words,
            vec!["http://example.com", "/* not a comment */", "a\"//b"]
        );
    }

    #[test]
    fn test_preserves_line_numbers() {
        let stripped = strip_comments("1 // x\n/* a\nb */2");
        assert_eq!(stripped.lines().count(), 3);
    }

    #[test]
    fn test_regex_entries_survive() {
        let words: Vec<String> = from_str(r#"["/^ab+c$/i", "/x/"]"#).unwrap();
        assert_eq!(words, vec!["/^ab+c$/i", "/x/"]);
    }
}
