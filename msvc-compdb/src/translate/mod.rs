// SPDX-License-Identifier: GPL-3.0-or-later

//! Translation of captured `cl.exe` invocations into compilation database entries.
//!
//! A captured invocation is a single string: the compiler path followed by
//! the compiler switches and the source files in MSVC's flag dialect. The
//! translator splits it, finds the source files at the end of the argument
//! list, maps the switches to their clang equivalents and produces one
//! [`Entry`] per source file.
//!
//! # Assumption
//! The source files are the trailing, contiguous arguments of the invocation.
//! This holds for the command lines generated by MSBuild, but not for hand
//! written or reordered ones: a source file followed by a switch is not found.

mod flags;
mod source;

pub use flags::{CL_FLAGS, FlagAnalyzer, FlagMatch, FlagPattern, FlagRule, Translation};
pub use source::{Language, is_absolute_path, language_of, normalize_path};

use crate::config;
use crate::output::Entry;
use crate::split::{ArgumentSplitter, SplitError};
use std::path::Path;
use thiserror::Error;

/// Represents the failures of a single translation.
#[derive(Debug, Error)]
pub enum TranslateError {
    #[error("Failed to split the command line: {0}")]
    Split(#[from] SplitError),
    #[error("Unexpected lack of {executable} in {command_line}")]
    MalformedInvocation {
        executable: String,
        command_line: String,
    },
}

/// The result of the backward source file scan.
#[derive(Debug, PartialEq)]
pub struct SourceScan<'a> {
    /// The arguments before the source files (the boundary included).
    pub flags: &'a [String],
    /// The source files in command line order.
    pub sources: Vec<&'a str>,
}

/// Translates the `cl.exe` invocations of a build into compilation database entries.
pub struct Translator {
    task_name: String,
    executable: String,
    c_frontend: String,
    cxx_frontend: String,
    splitter: Box<dyn ArgumentSplitter>,
    analyzer: FlagAnalyzer,
    exists: Box<dyn Fn(&str) -> bool>,
}

impl From<&config::Main> for Translator {
    fn from(config: &config::Main) -> Self {
        Self {
            task_name: config.compiler.task.clone(),
            executable: config.compiler.executable.clone(),
            c_frontend: config.frontends.c.clone(),
            cxx_frontend: config.frontends.cxx.clone(),
            splitter: config.splitter.create(),
            analyzer: FlagAnalyzer::default(),
            exists: Box::new(|path| Path::new(path).is_file()),
        }
    }
}

impl Translator {
    /// Replace the function which checks the existence of source files.
    pub fn with_file_check(self, exists: impl Fn(&str) -> bool + 'static) -> Self {
        Self { exists: Box::new(exists), ..self }
    }

    /// Translate one captured invocation into compilation database entries.
    ///
    /// Invocations of other tasks are ignored and produce no entries.
    pub fn translate(
        &self,
        task_name: &str,
        command_line: &str,
        project_directory: &str,
    ) -> Result<Vec<Entry>, TranslateError> {
        if task_name != self.task_name {
            return Ok(vec![]);
        }

        let (compiler, arguments) = self.locate_compiler(command_line)?;
        log::debug!("Compiler found: {}", normalize_path(compiler));

        let arguments = self.splitter.split(arguments)?;
        let SourceScan { flags, sources } = scan_sources(&arguments, self.exists.as_ref());
        if sources.is_empty() {
            log::debug!("No source files found in: {command_line}");
            return Ok(vec![]);
        }

        let flags = self.analyzer.translate(flags);
        let directory = normalize_path(project_directory);
        let entries = sources
            .into_iter()
            .map(|source| {
                let file = normalize_path(source);
                let mut arguments = Vec::with_capacity(flags.len() + 2);
                arguments.push(self.frontend(source).to_string());
                arguments.extend(flags.iter().cloned());
                arguments.push(file.clone());

                Entry::new(directory.clone(), arguments, file)
            })
            .collect();

        Ok(entries)
    }

    /// Returns the compiler frontend name for the given source file.
    pub fn frontend(&self, source: &str) -> &str {
        match language_of(source) {
            Language::C => &self.c_frontend,
            Language::Cxx => &self.cxx_frontend,
        }
    }

    /// Split the command line into the compiler path and the argument string.
    ///
    /// The executable name is searched case-insensitively. It must be followed
    /// by a whitespace, a closing quote or the end of the command line.
    fn locate_compiler<'a>(
        &self,
        command_line: &'a str,
    ) -> Result<(&'a str, &'a str), TranslateError> {
        let haystack = command_line.to_ascii_lowercase();
        let needle = self.executable.to_ascii_lowercase();

        let found = haystack.match_indices(&needle).find_map(|(index, _)| {
            let end = index + needle.len();
            match haystack[end..].chars().next() {
                None => Some((end, end)),
                Some('"') => Some((end, end + 1)),
                Some(c) if c.is_whitespace() => Some((end, end)),
                Some(_) => None,
            }
        });

        match found {
            Some((compiler_end, arguments_start)) => Ok((
                command_line[..compiler_end].trim_start_matches('"'),
                command_line[arguments_start..].trim_start(),
            )),
            None => Err(TranslateError::MalformedInvocation {
                executable: self.executable.clone(),
                command_line: command_line.to_string(),
            }),
        }
    }
}

/// Find the source files at the end of the argument list.
///
/// The scan walks backwards from the last argument. Source files and source
/// type qualifiers (`/Tc`, `/Tp`) are consumed, the first other argument is
/// the boundary. The boundary and everything before it are the flags.
pub fn scan_sources<'a>(
    arguments: &'a [String],
    exists: &dyn Fn(&str) -> bool,
) -> SourceScan<'a> {
    let mut sources = Vec::new();

    let mut boundary = arguments.len();
    for argument in arguments.iter().rev() {
        if source::is_source_type_qualifier(argument) {
            boundary -= 1;
        } else if source::is_source_file(argument, exists) {
            sources.push(argument.as_str());
            boundary -= 1;
        } else {
            break;
        }
    }
    sources.reverse();

    SourceScan { flags: &arguments[..boundary], sources }
}
