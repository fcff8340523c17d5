// SPDX-License-Identifier: GPL-3.0-or-later

//! MSVC compiler flag recognition and translation to the clang dialect.
//!
//! The module separates HOW a flag consumes arguments from the command line
//! ([`FlagPattern`]) from WHAT it becomes in the clang dialect ([`Translation`]).
//! Only the flags listed in [`CL_FLAGS`] survive the translation, everything
//! else is dropped.

use super::source::normalize_path;

/// Flag pattern definitions that describe HOW to consume arguments from the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlagPattern {
    /// Match the flag exactly, without any value: "/std:c++17"
    Exactly(&'static str),

    /// Match with 1 required value, glued or separate: "/IC:\inc", "/I C:\inc"
    GluedOrSeparate(&'static str),
}

impl FlagPattern {
    /// Get the flag string from the pattern
    pub fn flag(&self) -> &'static str {
        match self {
            FlagPattern::Exactly(flag) => flag,
            FlagPattern::GluedOrSeparate(flag) => flag,
        }
    }
}

/// Describes WHAT the matched flag becomes in the clang dialect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Translation {
    /// Replace the flag with the given one: "/std:c++17" -> "-std=c++17"
    Replace(&'static str),

    /// Emit the flag and the path value as separate arguments: "-I" "C:/inc"
    SeparatePath(&'static str),

    /// Emit the flag and the value as a single argument: "-DNAME=value"
    Concatenated(&'static str),
}

/// A flag definition combining the MSVC flag pattern and its clang equivalent.
#[derive(Debug, Clone)]
pub struct FlagRule {
    pub pattern: FlagPattern,
    pub translation: Translation,
}

impl FlagRule {
    pub const fn new(pattern: FlagPattern, translation: Translation) -> Self {
        Self { pattern, translation }
    }
}

/// Result of matching a flag against command line arguments
#[derive(Debug, Clone, PartialEq)]
pub struct FlagMatch {
    /// The arguments consumed from the command line
    pub consumed: usize,

    /// The translated arguments
    pub arguments: Vec<String>,
}

/// The `cl.exe` flags which are translated, in both `/` and `-` spelling.
///
/// https://learn.microsoft.com/en-us/cpp/build/reference/compiler-options-listed-by-category
#[rustfmt::skip]
pub static CL_FLAGS: &[FlagRule] = &[
    // Include directories
    FlagRule::new(FlagPattern::GluedOrSeparate("/external:I"), Translation::SeparatePath("-isystem")),
    FlagRule::new(FlagPattern::GluedOrSeparate("-external:I"), Translation::SeparatePath("-isystem")),
    FlagRule::new(FlagPattern::GluedOrSeparate("/I"), Translation::SeparatePath("-I")),
    FlagRule::new(FlagPattern::GluedOrSeparate("-I"), Translation::SeparatePath("-I")),
    // Preprocessor definitions
    FlagRule::new(FlagPattern::GluedOrSeparate("/D"), Translation::Concatenated("-D")),
    FlagRule::new(FlagPattern::GluedOrSeparate("-D"), Translation::Concatenated("-D")),
    // Language standard
    FlagRule::new(FlagPattern::Exactly("/std:c++14"), Translation::Replace("-std=c++14")),
    FlagRule::new(FlagPattern::Exactly("-std:c++14"), Translation::Replace("-std=c++14")),
    FlagRule::new(FlagPattern::Exactly("/std:c++17"), Translation::Replace("-std=c++17")),
    FlagRule::new(FlagPattern::Exactly("-std:c++17"), Translation::Replace("-std=c++17")),
    FlagRule::new(FlagPattern::Exactly("/std:c++20"), Translation::Replace("-std=c++20")),
    FlagRule::new(FlagPattern::Exactly("-std:c++20"), Translation::Replace("-std=c++20")),
    FlagRule::new(FlagPattern::Exactly("/std:c++23"), Translation::Replace("-std=c++23")),
    FlagRule::new(FlagPattern::Exactly("-std:c++23"), Translation::Replace("-std=c++23")),
];

/// A flag matcher that contains flag definitions for a specific compiler
pub struct FlagAnalyzer {
    rules: &'static [FlagRule],
}

impl Default for FlagAnalyzer {
    fn default() -> Self {
        Self::new(CL_FLAGS)
    }
}

impl FlagAnalyzer {
    pub fn new(rules: &'static [FlagRule]) -> Self {
        Self { rules }
    }

    /// Translate the flags from left to right. Unrecognized flags are dropped.
    pub fn translate(&self, args: &[String]) -> Vec<String> {
        let mut result = Vec::new();

        let mut index = 0;
        while index < args.len() {
            match self.match_flag(&args[index..]) {
                Some(FlagMatch { consumed, arguments }) => {
                    result.extend(arguments);
                    index += consumed;
                }
                None => {
                    log::trace!("Flag dropped: {}", args[index]);
                    index += 1;
                }
            }
        }

        result
    }

    /// Try to match a flag against the remaining command line arguments
    pub fn match_flag(&self, args: &[String]) -> Option<FlagMatch> {
        self.rules
            .iter()
            .find_map(|rule| Self::try_match_definition(rule, args))
    }

    fn try_match_definition(rule: &FlagRule, args: &[String]) -> Option<FlagMatch> {
        let current = args.first()?;
        let flag = rule.pattern.flag();

        match rule.pattern {
            FlagPattern::Exactly(_) if current == flag => Some(FlagMatch {
                consumed: 1,
                arguments: rule.translation.apply(None),
            }),
            FlagPattern::Exactly(_) => None,
            FlagPattern::GluedOrSeparate(_) if current == flag => match args.get(1) {
                Some(value) => Some(FlagMatch {
                    consumed: 2,
                    arguments: rule.translation.apply(Some(value)),
                }),
                None => {
                    log::warn!("Flag {flag} is missing its value, dropped.");
                    None
                }
            },
            FlagPattern::GluedOrSeparate(_) => {
                let value = current.strip_prefix(flag).filter(|value| !value.is_empty())?;
                Some(FlagMatch {
                    consumed: 1,
                    arguments: rule.translation.apply(Some(value)),
                })
            }
        }
    }
}

impl Translation {
    fn apply(&self, value: Option<&str>) -> Vec<String> {
        match (self, value) {
            (Translation::Replace(flag), _) => vec![flag.to_string()],
            (Translation::SeparatePath(flag), Some(value)) => {
                vec![flag.to_string(), normalize_path(value)]
            }
            (Translation::Concatenated(flag), Some(value)) => vec![format!("{flag}{value}")],
            (_, None) => vec![],
        }
    }
}
