// SPDX-License-Identifier: GPL-3.0-or-later

//! This module contains the command line interface of the application.
//!
//! The command line parsing is implemented using the `clap` library.
//! The `Arguments` type is the structured form of the program invocation.

use clap::{ArgMatches, Command, arg, command};
use std::fmt;

const DEFAULT_OUTPUT_FILE: &str = "compile_commands.json";
const STANDARD_INPUT: &str = "-";

/// Represents the command line arguments of the application.
#[derive(Debug, PartialEq)]
pub struct Arguments {
    /// The path of the configuration file.
    pub config: Option<String>,
    /// The build event stream, `None` is the standard input.
    pub input: Option<String>,
    /// The path of the compilation database.
    pub output: String,
}

impl TryFrom<ArgMatches> for Arguments {
    type Error = anyhow::Error;

    fn try_from(matches: ArgMatches) -> Result<Self, Self::Error> {
        let config = matches.get_one::<String>("config").cloned();
        let input = matches
            .get_one::<String>("input")
            .filter(|input| input.as_str() != STANDARD_INPUT)
            .cloned();
        let output = matches
            .get_one::<String>("output")
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("missing output file"))?;

        Ok(Arguments { config, input, output })
    }
}

impl fmt::Display for Arguments {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Arguments:")?;
        if let Some(config) = &self.config {
            writeln!(f, "  Configuration: {config}")?;
        }
        writeln!(f, "  Input: {}", self.input.as_deref().unwrap_or("<stdin>"))?;
        write!(f, "  Output: {}", self.output)
    }
}

/// Represents the command line interface of the application.
pub fn cli() -> Command {
    command!()
        .args(&[
            arg!(-c --config <FILE> "Path of the config file"),
            arg!(-i --input <FILE> "Path of the build event stream ('-' is the standard input)")
                .default_value(STANDARD_INPUT)
                .hide_default_value(false),
            arg!(-o --output <FILE> "Path of the result file")
                .default_value(DEFAULT_OUTPUT_FILE)
                .hide_default_value(false),
        ])
        .arg_required_else_help(false)
}
