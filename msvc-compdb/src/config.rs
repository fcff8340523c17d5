// SPDX-License-Identifier: GPL-3.0-or-later

//! This module defines the configuration of the application.
//!
//! The configuration is either loaded from a file or used with default
//! values, which are defined in the code. Every key is optional.
//!
//! The configuration file syntax is based on the YAML format.
//! The default configuration file name is `msvc-compdb.yml`, which is searched
//! in the current working directory.
//!
//! ```yaml
//! compiler:
//!   task: CL
//!   executable: cl.exe
//!
//! frontends:
//!   c: clang.exe
//!   cxx: clang++.exe
//!
//! splitter: windows
//! ```

pub use loader::{ConfigError, Loader};
pub use types::*;

mod types {
    use crate::split::SplitterKind;
    use serde::{Deserialize, Serialize};
    use std::fmt;

    /// Represents the application configuration.
    #[derive(Debug, Default, PartialEq, Deserialize, Serialize)]
    #[serde(deny_unknown_fields)]
    pub struct Main {
        #[serde(default)]
        pub compiler: Compiler,
        #[serde(default)]
        pub frontends: Frontends,
        #[serde(default)]
        pub splitter: SplitterKind,
    }

    impl fmt::Display for Main {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            writeln!(f, "Configuration:")?;
            match serde_yml::to_string(self) {
                Ok(yaml_string) => {
                    for line in yaml_string.lines() {
                        writeln!(f, "{line}")?;
                    }
                    Ok(())
                }
                Err(_) => Err(fmt::Error),
            }
        }
    }

    /// Identifies the compiler invocations among the build events.
    #[derive(Debug, PartialEq, Deserialize, Serialize)]
    #[serde(deny_unknown_fields)]
    pub struct Compiler {
        /// The name of the build task which runs the compiler.
        #[serde(default = "default_task")]
        pub task: String,
        /// The executable name searched in the captured command line.
        #[serde(default = "default_executable")]
        pub executable: String,
    }

    impl Default for Compiler {
        fn default() -> Self {
            Self { task: default_task(), executable: default_executable() }
        }
    }

    /// The compiler names written into the entries, selected by the source language.
    #[derive(Debug, PartialEq, Deserialize, Serialize)]
    #[serde(deny_unknown_fields)]
    pub struct Frontends {
        #[serde(default = "default_c_frontend")]
        pub c: String,
        #[serde(default = "default_cxx_frontend")]
        pub cxx: String,
    }

    impl Default for Frontends {
        fn default() -> Self {
            Self { c: default_c_frontend(), cxx: default_cxx_frontend() }
        }
    }

    fn default_task() -> String {
        String::from("CL")
    }

    fn default_executable() -> String {
        String::from("cl.exe")
    }

    fn default_c_frontend() -> String {
        String::from("clang.exe")
    }

    fn default_cxx_frontend() -> String {
        String::from("clang++.exe")
    }
}

pub mod loader {
    use super::Main;
    use std::fs::OpenOptions;
    use std::path::{Path, PathBuf};
    use thiserror::Error;

    pub const DEFAULT_CONFIG_FILE: &str = "msvc-compdb.yml";

    pub struct Loader {}

    impl Loader {
        /// Loads the configuration from the specified file or the default location.
        ///
        /// If the configuration file is specified, it must exist. Otherwise the
        /// default file is looked up in the given directory, and when it is not
        /// found the default configuration is returned.
        pub fn load(
            current_directory: &Path,
            filename: &Option<String>,
        ) -> Result<Main, ConfigError> {
            if let Some(path) = filename {
                return Self::from_file(Path::new(path));
            }

            let location = current_directory.join(DEFAULT_CONFIG_FILE);
            log::debug!("Checking configuration file: {}", location.display());
            if location.exists() {
                Self::from_file(&location)
            } else {
                log::debug!("Configuration file not found. Using the default configuration.");
                Ok(Main::default())
            }
        }

        /// Loads the configuration from the specified file.
        pub fn from_file(path: &Path) -> Result<Main, ConfigError> {
            log::info!("Loading configuration file: {}", path.display());

            let reader = OpenOptions::new()
                .read(true)
                .open(path)
                .map_err(|source| ConfigError::FileAccess { path: path.to_path_buf(), source })?;

            let content: Main = serde_yml::from_reader(reader)
                .map_err(|source| ConfigError::ParseError { path: path.to_path_buf(), source })?;

            Self::validate(&content).map_err(|reason| ConfigError::ValidationError {
                path: path.to_path_buf(),
                reason,
            })?;

            Ok(content)
        }

        fn validate(config: &Main) -> Result<(), String> {
            let names = [
                ("compiler.task", &config.compiler.task),
                ("compiler.executable", &config.compiler.executable),
                ("frontends.c", &config.frontends.c),
                ("frontends.cxx", &config.frontends.cxx),
            ];
            match names.iter().find(|(_, value)| value.trim().is_empty()) {
                Some((key, _)) => Err(format!("{key} must not be empty")),
                None => Ok(()),
            }
        }
    }

    /// Represents all possible configuration-related errors.
    #[derive(Debug, Error)]
    pub enum ConfigError {
        /// Error when opening or reading a configuration file.
        #[error("Failed to access configuration file '{path}': {source}")]
        FileAccess {
            path: PathBuf,
            #[source]
            source: std::io::Error,
        },
        /// Error when parsing the configuration file format.
        #[error("Failed to parse configuration from file '{path}': {source}")]
        ParseError {
            path: PathBuf,
            #[source]
            source: serde_yml::Error,
        },
        #[error("Invalid configuration in file '{path}': {reason}")]
        ValidationError { path: PathBuf, reason: String },
    }
}
