// SPDX-License-Identifier: GPL-3.0-or-later

//! Splitting a raw command line string into argument tokens.
//!
//! The captured invocations are plain strings, as the build tool would pass
//! them to the operating system. The compiler receives its `argv` only after
//! the platform tokenizer split that string, so every flag position depends
//! on replaying the same quoting rules here.
//!
//! Two grammars are supported:
//! - [`WindowsSplitter`]: the native Windows rules (`CommandLineToArgvW`).
//! - [`PosixSplitter`]: POSIX shell words, for event streams captured on
//!   other hosts.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Responsible for turning a command line into an ordered list of arguments.
pub trait ArgumentSplitter {
    fn split(&self, command_line: &str) -> Result<Vec<String>, SplitError>;
}

/// Represents the quoting grammar used to split the command lines.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SplitterKind {
    #[default]
    Windows,
    Posix,
}

impl SplitterKind {
    /// Creates the splitter implementing the grammar.
    pub fn create(self) -> Box<dyn ArgumentSplitter> {
        match self {
            SplitterKind::Windows => Box::new(WindowsSplitter),
            SplitterKind::Posix => Box::new(PosixSplitter),
        }
    }
}

/// Represents the failures of the argument tokenizers.
#[derive(Debug, Error, PartialEq)]
pub enum SplitError {
    #[error("Command line contains a NUL character at position {0}")]
    EmbeddedNul(usize),
    #[error("Command line is not a valid shell word list: {0}")]
    Shell(String),
}

/// Splits the command line the way a native Windows process parses its own
/// command line.
///
/// - The first argument is read like a program name: backslashes are literal
///   and a double quote only toggles the quoted section.
/// - Space and tab separate arguments, unless they are quoted.
/// - A double quote starts or ends a quoted section. In a quoted section two
///   consecutive double quotes produce one literal quote and end the section.
/// - `2n` backslashes followed by a double quote produce `n` backslashes and
///   the quote keeps its quoting role. `2n+1` backslashes followed by a double
///   quote produce `n` backslashes and a literal quote.
/// - Backslashes which are not followed by a double quote are literal.
/// - An unterminated quoted section runs until the end of the line.
#[derive(Debug, Default, Clone, Copy)]
pub struct WindowsSplitter;

const SPACE: char = ' ';
const TAB: char = '\t';
const QUOTE: char = '"';
const BACKSLASH: char = '\\';

impl ArgumentSplitter for WindowsSplitter {
    fn split(&self, command_line: &str) -> Result<Vec<String>, SplitError> {
        // The native tokenizer consumes a NUL terminated string.
        if let Some(position) = command_line.find('\0') {
            return Err(SplitError::EmbeddedNul(position));
        }

        let mut result = Vec::new();
        let mut current = String::new();
        let mut in_quotes = false;

        let mut chars = command_line
            .trim_start_matches([SPACE, TAB])
            .chars()
            .peekable();
        if chars.peek().is_none() {
            return Ok(result);
        }

        // The first argument has no escape characters.
        for c in chars.by_ref() {
            match c {
                QUOTE => in_quotes = !in_quotes,
                SPACE | TAB if !in_quotes => break,
                _ => current.push(c),
            }
        }
        result.push(std::mem::take(&mut current));
        while chars.next_if(|c| *c == SPACE || *c == TAB).is_some() {}
        in_quotes = false;

        while let Some(c) = chars.next() {
            match c {
                SPACE | TAB if !in_quotes => {
                    result.push(std::mem::take(&mut current));
                    while chars.next_if(|c| *c == SPACE || *c == TAB).is_some() {}
                }
                BACKSLASH => {
                    let mut count = 1;
                    while chars.next_if_eq(&BACKSLASH).is_some() {
                        count += 1;
                    }
                    if chars.peek() == Some(&QUOTE) {
                        current.extend(std::iter::repeat_n(BACKSLASH, count / 2));
                        if count % 2 == 1 {
                            chars.next();
                            current.push(QUOTE);
                        }
                    } else {
                        current.extend(std::iter::repeat_n(BACKSLASH, count));
                    }
                }
                QUOTE if in_quotes => match chars.peek() {
                    Some(&QUOTE) => {
                        current.push(QUOTE);
                        chars.next();
                        in_quotes = false;
                    }
                    Some(_) => in_quotes = false,
                    // Keep the quoted state, so the last (maybe empty) argument is pushed.
                    None => break,
                },
                QUOTE => in_quotes = true,
                _ => current.push(c),
            }
        }
        if !current.is_empty() || in_quotes {
            result.push(current);
        }

        Ok(result)
    }
}

/// Splits the command line following the POSIX shell quoting rules.
#[derive(Debug, Default, Clone, Copy)]
pub struct PosixSplitter;

impl ArgumentSplitter for PosixSplitter {
    fn split(&self, command_line: &str) -> Result<Vec<String>, SplitError> {
        shell_words::split(command_line).map_err(|err| SplitError::Shell(err.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn windows(command_line: &str) -> Vec<String> {
        WindowsSplitter.split(command_line).unwrap()
    }

    #[test]
    fn test_windows_simple_tokens() {
        assert_eq!(windows("/c /nologo main.cpp"), vec!["/c", "/nologo", "main.cpp"]);
        assert_eq!(windows("  /c \t  main.cpp  "), vec!["/c", "main.cpp"]);
        assert!(windows("").is_empty());
        assert!(windows("   ").is_empty());
    }

    #[test]
    fn test_windows_embedded_spaces() {
        assert_eq!(
            windows(r#"/I "C:\Program Files\include" "C:\my project\main.cpp""#),
            vec!["/I", r"C:\Program Files\include", r"C:\my project\main.cpp"]
        );
        assert_eq!(windows(r#"/I"C:\Program Files\inc""#), vec![r"/IC:\Program Files\inc"]);
    }

    #[test]
    fn test_windows_embedded_quotes() {
        assert_eq!(
            windows(r#"/c /D "MSG=\"hello world\"""#),
            vec!["/c", "/D", r#"MSG="hello world""#]
        );
        assert_eq!(
            windows(r#"/c /D"MSG=\"hello world\"""#),
            vec!["/c", r#"/DMSG="hello world""#]
        );
        assert_eq!(windows(r#"/c /DNAME=\"x\""#), vec!["/c", r#"/DNAME="x""#]);
    }

    #[test]
    fn test_windows_doubled_quote_ends_quoting() {
        assert_eq!(windows(r#"/D "A""B C" x"#), vec!["/D", r#"A"B"#, "C", "x"]);
        assert_eq!(windows(r#"/c """a b""#), vec!["/c", r#""a"#, "b"]);
        assert_eq!(windows(r#"/c "a""b" c"#), vec!["/c", r#"a"b c"#]);
    }

    #[test]
    fn test_windows_first_argument() {
        // Backslashes are literal and quotes only toggle.
        assert_eq!(windows(r#"/DNAME=\"x\" y"#), vec![r"/DNAME=\x\", "y"]);
        assert_eq!(windows(r#""C:\dir\\" next"#), vec![r"C:\dir\\", "next"]);
        assert_eq!(windows(r#""C:\my dir\a.c" b"#), vec![r"C:\my dir\a.c", "b"]);
    }

    #[test]
    fn test_windows_backslashes() {
        // Backslashes not followed by quotes are literal.
        assert_eq!(windows(r"C:\a\\b\c"), vec![r"C:\a\\b\c"]);
        // Even number before a quote: halved, quote is a delimiter.
        assert_eq!(windows(r#"/I "C:\dir\\" next"#), vec!["/I", r"C:\dir\", "next"]);
        // Odd number before a quote: halved, quote is literal.
        assert_eq!(windows(r#"/c a\\\"b"#), vec!["/c", r#"a\"b"#]);
    }

    #[test]
    fn test_windows_empty_arguments() {
        assert_eq!(windows(r#"a "" b"#), vec!["a", "", "b"]);
        assert_eq!(windows(r#""""#), vec![""]);
        assert_eq!(windows(r#"a """#), vec!["a", ""]);
    }

    #[test]
    fn test_windows_unterminated_quote() {
        assert_eq!(windows(r#"/I "C:\some path"#), vec!["/I", r"C:\some path"]);
    }

    #[test]
    fn test_windows_nul_is_an_error() {
        assert_eq!(WindowsSplitter.split("/c\0main.c"), Err(SplitError::EmbeddedNul(2)));
    }

    #[test]
    fn test_posix_splitter() {
        let sut = PosixSplitter;

        assert_eq!(
            sut.split(r#"-c "my file.c" 'single quoted' a\ b"#).unwrap(),
            vec!["-c", "my file.c", "single quoted", "a b"]
        );
        assert_eq!(sut.split(r#"a "" b"#).unwrap(), vec!["a", "", "b"]);
        assert!(matches!(sut.split(r#"-c "unbalanced"#), Err(SplitError::Shell(_))));
    }

    #[test]
    fn test_splitter_kind_creates_the_grammar() {
        let input = r#"a\b "c d""#;

        assert_eq!(SplitterKind::Windows.create().split(input).unwrap(), vec![r"a\b", "c d"]);
        assert_eq!(SplitterKind::Posix.create().split(input).unwrap(), vec!["ab", "c d"]);
    }
}
