// SPDX-License-Identifier: GPL-3.0-or-later

//! This module is responsible for writing the JSON compilation database.
//!
//! A compilation database is a set of records which describe the compilation of the
//! source files in a given project. The definition of the JSON compilation database
//! files is done in the LLVM project
//! [documentation](https://clang.llvm.org/docs/JSONCompilationDatabase.html).
//!
//! The database is written as a stream: the entries are appended one by one while
//! the build runs, and the document is closed and published at the end of the build.

mod writer;

pub use writer::{DatabaseWriter, Publication};

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// Represents an entry of the compilation database.
///
/// The field order is the serialization order.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    /// The working directory of the compilation, with forward slashes.
    pub directory: String,
    /// The compile command argv. `arguments[0]` is the compiler frontend name,
    /// the last one is the source file.
    pub arguments: Vec<String>,
    /// The absolute path of the translation unit source, with forward slashes.
    pub file: String,
}

impl Entry {
    pub fn new(
        directory: impl Into<String>,
        arguments: Vec<String>,
        file: impl Into<String>,
    ) -> Self {
        Entry { directory: directory.into(), arguments, file: file.into() }
    }
}

/// Represents errors that can occur while writing the output.
#[derive(Error, Debug)]
pub enum WriterError {
    #[error("Failed to create {0}: {1}")]
    Create(PathBuf, std::io::Error),
    #[error("Failed to write {0}: {1}")]
    Write(PathBuf, std::io::Error),
    #[error("Failed to serialize entry into {0}: {1}")]
    Serialize(PathBuf, serde_json::Error),
    #[error("Failed to rename {0} to {1}: {2}")]
    Rename(PathBuf, PathBuf, std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_entry_serialization_has_the_three_keys_in_order() {
        let entry = Entry::new(
            "C:/proj",
            vec!["clang++.exe".into(), "-DX".into(), "C:/proj/main.cpp".into()],
            "C:/proj/main.cpp",
        );

        let serialized = serde_json::to_string(&entry).unwrap();

        assert_eq!(
            serialized,
            concat!(
                r#"{"directory":"C:/proj","#,
                r#""arguments":["clang++.exe","-DX","C:/proj/main.cpp"],"#,
                r#""file":"C:/proj/main.cpp"}"#,
            )
        );
    }

    #[test]
    fn test_entry_serialization_escapes_strings() {
        let entry = Entry::new(
            "C:/with \"quote\"",
            vec!["clang.exe".into(), "-DMSG=\"a\\b\"\t".into(), "C:/a.c".into()],
            "C:/a.c",
        );

        let value: serde_json::Value = serde_json::to_value(&entry).unwrap();
        let serialized = serde_json::to_string(&entry).unwrap();

        assert_eq!(
            value,
            json!({
                "directory": "C:/with \"quote\"",
                "arguments": ["clang.exe", "-DMSG=\"a\\b\"\t", "C:/a.c"],
                "file": "C:/a.c"
            })
        );
        assert!(serialized.contains(r#"-DMSG=\"a\\b\"\t"#));
    }
}
